//! Mapping engine - lookup, browse and validation queries
//!
//! `translate` lives in [`crate::translate`], `search` in [`crate::search`] and
//! `compute_statistics` in [`crate::statistics`]; they are all methods on
//! [`MappingEngine`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::classify::{effective_confidence, EquivalenceCategory};
use crate::codes::is_namaste_code;
use crate::model::{
    AggregatedConcept, MappingSummary, SkippedRow, TargetLink, Term, DIRECT_MAPPING,
};
use crate::relevance::relevance_verdict;
use crate::search::group_rows;
use crate::store::{EncounterStore, LinkPredicate, LinkQuery, LinkStore, TermQuery, TermStore};
use crate::system::System;
use crate::{Error, Result};

/// Canonical URL of the generated CodeSystem resource.
pub const CODE_SYSTEM_URL: &str = "http://namaste.ayush.gov.in/fhir/CodeSystem/ayush";

/// Entry point for every query. Cheap to clone; holds no per-call state.
#[derive(Clone)]
pub struct MappingEngine {
    pub(crate) terms: Arc<dyn TermStore>,
    pub(crate) links: Arc<dyn LinkStore>,
    pub(crate) encounters: Option<Arc<dyn EncounterStore>>,
}

/// Result of [`MappingEngine::lookup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub concept: AggregatedConcept,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRow>,
}

/// Browse/filter parameters for [`MappingEngine::list_mappings`].
#[derive(Debug, Clone, PartialEq)]
pub struct MappingFilter {
    pub system: Option<System>,
    pub min_confidence: f64,
    pub equivalence: Option<EquivalenceCategory>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for MappingFilter {
    fn default() -> Self {
        MappingFilter {
            system: None,
            min_confidence: 0.0,
            equivalence: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl MappingFilter {
    /// Build a filter from loosely-typed request parameters. Unrecognised
    /// system or equivalence values are ignored rather than rejected.
    pub fn from_params(
        system: Option<&str>,
        min_confidence: Option<f64>,
        equivalence: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Self {
        MappingFilter {
            system: System::parse_filter(system),
            min_confidence: min_confidence.unwrap_or(0.0),
            equivalence: equivalence.and_then(|e| e.parse().ok()),
            limit,
            offset,
        }
    }

    fn link_query(&self) -> LinkQuery {
        LinkQuery {
            system: self.system,
            code: None,
            predicate: LinkPredicate {
                require_target: true,
                min_confidence: Some(self.min_confidence),
                equivalence: self.equivalence,
            },
        }
    }
}

/// One page of [`MappingEngine::list_mappings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingPage {
    pub mappings: Vec<MappingSummary>,
    /// Rows matching the filter before pagination and relevance filtering.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRow>,
}

/// One page of [`MappingEngine::list_system_concepts`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptPage {
    pub concepts: Vec<AggregatedConcept>,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRow>,
}

/// Result of [`MappingEngine::validate_code`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeValidation {
    pub valid: bool,
    pub code: String,
    pub system: System,
    pub reason: String,
}

impl MappingEngine {
    pub fn new(terms: Arc<dyn TermStore>, links: Arc<dyn LinkStore>) -> Self {
        Self {
            terms,
            links,
            encounters: None,
        }
    }

    /// Use one backend for terms, links and encounters.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: TermStore + LinkStore + EncounterStore + 'static,
    {
        Self {
            terms: store.clone(),
            links: store.clone(),
            encounters: Some(store),
        }
    }

    pub fn with_encounters(mut self, encounters: Arc<dyn EncounterStore>) -> Self {
        self.encounters = Some(encounters);
        self
    }

    /// A concept with every one of its links, unfiltered.
    #[instrument(skip(self))]
    pub async fn lookup(&self, system: System, code: &str) -> Result<LookupResult> {
        let record = self
            .terms
            .get_term(system, code)
            .await?
            .ok_or_else(|| Error::NotFound {
                system,
                code: code.to_string(),
            })?;

        let term = Term::try_from(&record).map_err(|issue| {
            Error::StoreUnavailable(format!("term {} is malformed: {issue}", record.code))
        })?;

        let query = LinkQuery::for_concept(system, code);
        let mut rows = self.links.get_links(&query).await?;
        rows.retain(|row| query.matches(row));
        rows.sort_by(|a, b| {
            effective_confidence(b.link.confidence)
                .total_cmp(&effective_confidence(a.link.confidence))
        });

        let mut concept = AggregatedConcept::from_term(term);
        let mut skipped = Vec::new();
        for row in &rows {
            match TargetLink::try_from(&row.link) {
                Ok(link) => concept.mappings.push(link),
                Err(issue) => {
                    warn!(code, %issue, "Skipping malformed link");
                    skipped.push(SkippedRow::for_link(&row.link, &issue));
                }
            }
        }

        debug!(code, links = concept.mappings.len(), "Lookup complete");
        Ok(LookupResult { concept, skipped })
    }

    /// Browse links across all systems with filtering and pagination.
    #[instrument(skip(self))]
    pub async fn list_mappings(&self, filter: &MappingFilter) -> Result<MappingPage> {
        let query = filter.link_query();
        let mut rows = self.links.get_links(&query).await?;
        rows.retain(|row| query.matches(row));

        rows.sort_by(|a, b| {
            effective_confidence(b.link.confidence)
                .total_cmp(&effective_confidence(a.link.confidence))
                .then_with(|| a.term.system.cmp(&b.term.system))
                .then_with(|| a.term.code.cmp(&b.term.code))
        });

        let total = rows.len();
        let mut mappings = Vec::new();
        let mut skipped = Vec::new();

        for row in rows.iter().skip(filter.offset).take(filter.limit) {
            let converted = Term::try_from(&row.term)
                .and_then(|term| TargetLink::try_from(&row.link).map(|link| (term, link)));
            let (term, link) = match converted {
                Ok(pair) => pair,
                Err(issue) => {
                    warn!(code = %row.term.code, %issue, "Skipping malformed mapping row");
                    skipped.push(SkippedRow::for_link(&row.link, &issue));
                    continue;
                }
            };

            let verdict = relevance_verdict(&term.display, &link.target_title);
            if !verdict.is_informative() {
                debug!(
                    code = %term.code,
                    target_code = %link.target_code,
                    ?verdict,
                    "Dropping generic mapping"
                );
                continue;
            }

            mappings.push(MappingSummary {
                original_term: term.original_term().to_string(),
                source_code: term.code,
                source_term: term.display,
                system: term.system.display_name().to_string(),
                target_code: link.target_code,
                target_term: link.target_title,
                confidence: effective_confidence(link.confidence),
                equivalence: link.equivalence,
                mapping_type: DIRECT_MAPPING.to_string(),
            });
        }

        info!(returned = mappings.len(), total, "Listed mappings");
        Ok(MappingPage {
            has_more: filter.offset + mappings.len() < total,
            mappings,
            total,
            limit: filter.limit,
            offset: filter.offset,
            skipped,
        })
    }

    /// Browse one system's concepts ordered by display term.
    #[instrument(skip(self))]
    pub async fn list_system_concepts(
        &self,
        system: System,
        limit: usize,
        offset: usize,
    ) -> Result<ConceptPage> {
        let query = TermQuery {
            text: None,
            system: Some(system),
            limit: None,
            offset: 0,
        };
        let rows = self.terms.find_terms(&query).await?;
        let total = self.terms.count_terms(Some(system)).await?;

        let (mut concepts, skipped) =
            group_rows(rows.into_iter().filter(|row| query.matches(&row.term)), None);

        concepts.sort_by(|a, b| a.term.cmp(&b.term).then_with(|| a.code.cmp(&b.code)));
        let mut concepts: Vec<AggregatedConcept> =
            concepts.into_iter().skip(offset).take(limit).collect();
        for concept in &mut concepts {
            concept.mappings.sort_by(|a, b| {
                effective_confidence(b.confidence).total_cmp(&effective_confidence(a.confidence))
            });
        }

        info!(returned = concepts.len(), total, "Listed system concepts");
        Ok(ConceptPage {
            concepts,
            total,
            skipped,
        })
    }

    /// Whether `code` exists in `system`.
    #[instrument(skip(self))]
    pub async fn validate_code(&self, system: System, code: &str) -> Result<CodeValidation> {
        let exists = self.terms.get_term(system, code).await?.is_some();
        let reason = if exists {
            "Found"
        } else if !is_namaste_code(code) {
            "Malformed code"
        } else {
            "Code not found in system"
        };

        Ok(CodeValidation {
            valid: exists,
            code: code.to_string(),
            system,
            reason: reason.to_string(),
        })
    }

    /// FHIR R4 CodeSystem resource covering every term of the three systems.
    #[instrument(skip(self))]
    pub async fn code_system(&self) -> Result<JsonValue> {
        let records = self.terms.all_terms().await?;

        let mut terms = Vec::with_capacity(records.len());
        for record in &records {
            match Term::try_from(record) {
                Ok(term) => terms.push(term),
                Err(issue) => warn!(code = %record.code, %issue, "Leaving term out of CodeSystem"),
            }
        }
        terms.sort_by(|a, b| a.system.cmp(&b.system).then_with(|| a.code.cmp(&b.code)));

        let concepts = terms
            .iter()
            .map(|t| {
                json!({
                    "code": t.code,
                    "display": t.display,
                    "property": [{ "code": "ayush-system", "valueCode": t.system.as_str() }]
                })
            })
            .collect::<Vec<_>>();

        Ok(json!({
            "resourceType": "CodeSystem",
            "id": "ayush-terminology",
            "url": CODE_SYSTEM_URL,
            "version": env!("CARGO_PKG_VERSION"),
            "name": "AYUSHTerminology",
            "title": "AYUSH Standardized Terminologies",
            "status": "active",
            "experimental": false,
            "date": Utc::now().format("%Y-%m-%d").to_string(),
            "description": "Unified terminology system for Ayurveda, Siddha, and Unani.",
            "content": "complete",
            "count": concepts.len(),
            "property": [{
                "code": "ayush-system",
                "uri": format!("{CODE_SYSTEM_URL}/property/ayush-system"),
                "description": "The AYUSH system the concept belongs to.",
                "type": "code"
            }],
            "concept": concepts
        }))
    }
}
