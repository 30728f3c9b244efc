//! Storage traits consumed by the engine
//!
//! The engine only reads. Implementations may push query predicates down to
//! the backend, but are free to return a superset: the engine re-applies
//! [`LinkQuery::matches`] and [`TermQuery::matches`] to every row it receives.

use async_trait::async_trait;

use crate::classify::{effective_confidence, EquivalenceCategory};
use crate::model::{LinkRecord, MappingRow, SearchRow, TermRecord};
use crate::system::System;
use crate::Result;

/// Per-link filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPredicate {
    /// Only links with a non-blank target code.
    pub require_target: bool,
    /// Inclusive lower bound on the effective confidence.
    pub min_confidence: Option<f64>,
    /// Equivalence band the effective confidence must fall in.
    pub equivalence: Option<EquivalenceCategory>,
}

impl LinkPredicate {
    pub fn matches(&self, link: &LinkRecord) -> bool {
        if self.require_target
            && link
                .target_code
                .as_deref()
                .map_or(true, |code| code.trim().is_empty())
        {
            return false;
        }

        let confidence = effective_confidence(link.confidence);
        if let Some(min) = self.min_confidence {
            if confidence < min {
                return false;
            }
        }
        if let Some(equivalence) = self.equivalence {
            if !equivalence.contains(confidence) {
                return false;
            }
        }
        true
    }
}

/// Query for links joined with their terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkQuery {
    pub system: Option<System>,
    pub code: Option<String>,
    pub predicate: LinkPredicate,
}

impl LinkQuery {
    /// All links of one concept.
    pub fn for_concept(system: System, code: &str) -> Self {
        LinkQuery {
            system: Some(system),
            code: Some(code.to_string()),
            predicate: LinkPredicate::default(),
        }
    }

    pub fn matches(&self, row: &MappingRow) -> bool {
        if let Some(system) = self.system {
            if !system.as_str().eq_ignore_ascii_case(&row.term.system) {
                return false;
            }
        }
        if let Some(code) = self.code.as_deref() {
            if row.term.code != code || row.link.source_code != code {
                return false;
            }
        }
        self.predicate.matches(&row.link)
    }
}

/// Query for terms, each returned with its links (left join).
///
/// Rows come back grouped by term, terms ordered by display term, links of a
/// term ordered by confidence descending. `limit` and `offset` count distinct
/// terms and are hints: a store may return more rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermQuery {
    /// Case-insensitive substring matched against code, display and native term.
    pub text: Option<String>,
    pub system: Option<System>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl TermQuery {
    pub fn matches(&self, term: &TermRecord) -> bool {
        if let Some(system) = self.system {
            if !system.as_str().eq_ignore_ascii_case(&term.system) {
                return false;
            }
        }
        match self.text.as_deref() {
            Some(text) => {
                let needle = text.to_lowercase();
                term.code.to_lowercase().contains(&needle)
                    || term.display.to_lowercase().contains(&needle)
                    || term
                        .native_term
                        .as_deref()
                        .is_some_and(|native| native.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

/// Read access to source terms.
#[async_trait]
pub trait TermStore: Send + Sync {
    /// Exact lookup of one term.
    async fn get_term(&self, system: System, code: &str) -> Result<Option<TermRecord>>;

    /// Terms matching `query`, left-joined with their links.
    async fn find_terms(&self, query: &TermQuery) -> Result<Vec<SearchRow>>;

    /// Number of terms, optionally restricted to one system.
    async fn count_terms(&self, system: Option<System>) -> Result<u64>;

    /// Number of terms per raw system label.
    async fn system_counts(&self) -> Result<Vec<(String, u64)>>;

    /// Every term, in no particular order.
    async fn all_terms(&self) -> Result<Vec<TermRecord>>;
}

/// Read access to source → ICD-11 links.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Links joined with their terms, filtered by `query` where the backend can.
    async fn get_links(&self, query: &LinkQuery) -> Result<Vec<MappingRow>>;

    /// Every link record, including links whose term is missing.
    async fn all_links(&self) -> Result<Vec<LinkRecord>>;

    async fn count_links(&self) -> Result<u64>;
}

/// Read access to recorded clinical encounters.
#[async_trait]
pub trait EncounterStore: Send + Sync {
    /// `None` when the backend has no encounter data source at all.
    async fn count_encounters(&self) -> Result<Option<u64>>;
}
