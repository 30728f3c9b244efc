//! Summary counts over the terminology and its links
//!
//! Each field is computed on its own. A failing store call zeroes that field,
//! records it in [`Statistics::degraded`] and leaves the others intact.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, instrument, warn};

use crate::classify::{classify, effective_confidence, EquivalenceCategory};
use crate::engine::MappingEngine;
use crate::system::title_case;
use crate::Result;

/// A statistics field that can degrade independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticField {
    TotalTerms,
    TotalMappings,
    TotalEncounters,
    SystemDistribution,
    EquivalenceDistribution,
}

impl fmt::Display for StatisticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatisticField::TotalTerms => "total_terms",
            StatisticField::TotalMappings => "total_mappings",
            StatisticField::TotalEncounters => "total_encounters",
            StatisticField::SystemDistribution => "system_distribution",
            StatisticField::EquivalenceDistribution => "equivalence_distribution",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_terms: u64,
    pub total_mappings: u64,
    pub total_encounters: u64,
    /// Term count per title-cased system label.
    pub system_distribution: BTreeMap<String, u64>,
    pub equivalence_distribution: BTreeMap<EquivalenceCategory, u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<StatisticField>,
}

/// Count links per equivalence category.
///
/// `wider` is split after the fact: `narrower` gets half (rounded down) and
/// `wider` keeps the rest. Only categories that occur are present.
pub fn equivalence_histogram<I>(confidences: I) -> BTreeMap<EquivalenceCategory, u64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut histogram = BTreeMap::new();
    for confidence in confidences {
        *histogram
            .entry(classify(effective_confidence(confidence)))
            .or_insert(0) += 1;
    }

    if let Some(wider) = histogram.get(&EquivalenceCategory::Wider).copied() {
        let narrower = wider / 2;
        histogram.insert(EquivalenceCategory::Narrower, narrower);
        histogram.insert(EquivalenceCategory::Wider, wider - narrower);
    }
    histogram
}

fn degrade<T: Default>(
    field: StatisticField,
    outcome: Result<T>,
    degraded: &mut Vec<StatisticField>,
) -> T {
    outcome.unwrap_or_else(|err| {
        warn!(%field, error = %err, "Statistic unavailable, reporting zero");
        degraded.push(field);
        T::default()
    })
}

impl MappingEngine {
    #[instrument(skip(self))]
    pub async fn compute_statistics(&self) -> Statistics {
        let mut degraded = Vec::new();

        let total_terms = degrade(
            StatisticField::TotalTerms,
            self.terms.count_terms(None).await,
            &mut degraded,
        );
        let total_mappings = degrade(
            StatisticField::TotalMappings,
            self.links.count_links().await,
            &mut degraded,
        );

        let encounters = match &self.encounters {
            Some(store) => store.count_encounters().await.map(Option::unwrap_or_default),
            None => Ok(0),
        };
        let total_encounters = degrade(StatisticField::TotalEncounters, encounters, &mut degraded);

        let system_counts = self.terms.system_counts().await.map(|counts| {
            let mut distribution = BTreeMap::new();
            for (label, count) in counts {
                *distribution.entry(title_case(&label)).or_insert(0) += count;
            }
            distribution
        });
        let system_distribution = degrade(
            StatisticField::SystemDistribution,
            system_counts,
            &mut degraded,
        );

        let histogram = self
            .links
            .all_links()
            .await
            .map(|links| equivalence_histogram(links.iter().map(|link| link.confidence)));
        let equivalence_distribution = degrade(
            StatisticField::EquivalenceDistribution,
            histogram,
            &mut degraded,
        );

        info!(
            total_terms,
            total_mappings,
            total_encounters,
            degraded = degraded.len(),
            "Computed statistics"
        );
        Statistics {
            total_terms,
            total_mappings,
            total_encounters,
            system_distribution,
            equivalence_distribution,
            degraded,
        }
    }
}
