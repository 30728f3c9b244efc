//! Free-text search with per-concept grouping

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

use crate::engine::MappingEngine;
use crate::model::{AggregatedConcept, SearchRow, SkippedRow, TargetLink, Term};
use crate::store::TermQuery;
use crate::system::System;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub concepts: Vec<AggregatedConcept>,
    pub total_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRow>,
}

/// Fold flat (term, link) rows into one concept per source code.
///
/// Concepts keep the order in which their code first appears; links keep row
/// order within a concept. With `limit`, codes first seen after the limit is
/// reached are ignored while admitted concepts keep collecting links.
pub(crate) fn group_rows<I>(
    rows: I,
    limit: Option<usize>,
) -> (Vec<AggregatedConcept>, Vec<SkippedRow>)
where
    I: IntoIterator<Item = SearchRow>,
{
    let mut concepts: Vec<AggregatedConcept> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rejected: HashSet<String> = HashSet::new();
    let mut skipped = Vec::new();

    for row in rows {
        if rejected.contains(&row.term.code) {
            continue;
        }

        let slot = match index.get(&row.term.code) {
            Some(slot) => *slot,
            None => {
                if limit.is_some_and(|limit| concepts.len() >= limit) {
                    continue;
                }
                match Term::try_from(&row.term) {
                    Ok(term) => {
                        index.insert(row.term.code.clone(), concepts.len());
                        concepts.push(AggregatedConcept::from_term(term));
                        concepts.len() - 1
                    }
                    Err(issue) => {
                        warn!(code = %row.term.code, %issue, "Skipping malformed term");
                        skipped.push(SkippedRow::for_term(&row.term, &issue));
                        rejected.insert(row.term.code.clone());
                        continue;
                    }
                }
            }
        };

        if let Some(link) = row.link.as_ref() {
            match TargetLink::try_from(link) {
                Ok(target) => concepts[slot].mappings.push(target),
                Err(issue) => {
                    debug!(code = %row.term.code, %issue, "Skipping malformed link");
                    skipped.push(SkippedRow::for_link(link, &issue));
                }
            }
        }
    }

    (concepts, skipped)
}

impl MappingEngine {
    /// Case-insensitive search over code, display term and native term.
    ///
    /// `limit` bounds the number of concepts. A blank query returns nothing
    /// without touching the store.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        system: Option<System>,
        limit: usize,
    ) -> Result<SearchResult> {
        let text = query.trim();
        if text.is_empty() {
            return Ok(SearchResult::default());
        }

        let term_query = TermQuery {
            text: Some(text.to_string()),
            system,
            limit: Some(limit),
            offset: 0,
        };
        let rows = self.terms.find_terms(&term_query).await?;
        let (concepts, skipped) = group_rows(
            rows.into_iter().filter(|row| term_query.matches(&row.term)),
            Some(limit),
        );

        info!(query = text, concepts = concepts.len(), "Search complete");
        Ok(SearchResult {
            total_count: concepts.len(),
            concepts,
            skipped,
        })
    }
}
