//! In-memory terminology store
//!
//! Holds an immutable snapshot of terms and links and answers every store
//! query from it, pushing down all predicates.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::classify::effective_confidence;
use crate::model::{LinkRecord, MappingRow, SearchRow, TermRecord};
use crate::store::{EncounterStore, LinkQuery, LinkStore, TermQuery, TermStore};
use crate::system::System;
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    terms: Vec<TermRecord>,
    links: Vec<LinkRecord>,
    encounters: Option<u64>,
}

impl InMemoryStore {
    pub fn new(terms: Vec<TermRecord>, links: Vec<LinkRecord>) -> Self {
        Self {
            terms,
            links,
            encounters: None,
        }
    }

    /// Attach an encounter count; without one the store reports no encounter source.
    pub fn with_encounters(mut self, count: u64) -> Self {
        self.encounters = Some(count);
        self
    }

    fn term_by_code(&self) -> HashMap<&str, &TermRecord> {
        self.terms.iter().map(|t| (t.code.as_str(), t)).collect()
    }

    fn links_by_code(&self) -> HashMap<&str, Vec<&LinkRecord>> {
        let mut out: HashMap<&str, Vec<&LinkRecord>> = HashMap::new();
        for link in &self.links {
            out.entry(link.source_code.as_str()).or_default().push(link);
        }
        out
    }
}

fn by_confidence_desc(a: &&LinkRecord, b: &&LinkRecord) -> Ordering {
    effective_confidence(b.confidence).total_cmp(&effective_confidence(a.confidence))
}

#[async_trait]
impl TermStore for InMemoryStore {
    async fn get_term(&self, system: System, code: &str) -> Result<Option<TermRecord>> {
        Ok(self
            .terms
            .iter()
            .find(|t| t.code == code && system.as_str().eq_ignore_ascii_case(&t.system))
            .cloned())
    }

    async fn find_terms(&self, query: &TermQuery) -> Result<Vec<SearchRow>> {
        let mut terms: Vec<&TermRecord> = self.terms.iter().filter(|t| query.matches(t)).collect();
        terms.sort_by(|a, b| a.display.cmp(&b.display));

        let links = self.links_by_code();
        let mut rows = Vec::new();
        for term in terms
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
        {
            let mut term_links = links.get(term.code.as_str()).cloned().unwrap_or_default();
            term_links.sort_by(by_confidence_desc);

            if term_links.is_empty() {
                rows.push(SearchRow {
                    term: term.clone(),
                    link: None,
                });
            }
            for link in term_links {
                rows.push(SearchRow {
                    term: term.clone(),
                    link: Some(link.clone()),
                });
            }
        }
        Ok(rows)
    }

    async fn count_terms(&self, system: Option<System>) -> Result<u64> {
        let count = self
            .terms
            .iter()
            .filter(|t| system.map_or(true, |s| s.as_str().eq_ignore_ascii_case(&t.system)))
            .count();
        Ok(count as u64)
    }

    async fn system_counts(&self) -> Result<Vec<(String, u64)>> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for term in &self.terms {
            *counts.entry(term.system.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn all_terms(&self) -> Result<Vec<TermRecord>> {
        Ok(self.terms.clone())
    }
}

#[async_trait]
impl LinkStore for InMemoryStore {
    async fn get_links(&self, query: &LinkQuery) -> Result<Vec<MappingRow>> {
        let terms = self.term_by_code();
        Ok(self
            .links
            .iter()
            .filter_map(|link| {
                terms.get(link.source_code.as_str()).map(|term| MappingRow {
                    term: (*term).clone(),
                    link: link.clone(),
                })
            })
            .filter(|row| query.matches(row))
            .collect())
    }

    async fn all_links(&self) -> Result<Vec<LinkRecord>> {
        Ok(self.links.clone())
    }

    async fn count_links(&self) -> Result<u64> {
        Ok(self.links.len() as u64)
    }
}

#[async_trait]
impl EncounterStore for InMemoryStore {
    async fn count_encounters(&self) -> Result<Option<u64>> {
        Ok(self.encounters)
    }
}
