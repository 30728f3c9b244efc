use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use ayush_mapping::{
    EncounterStore, Error, InMemoryStore, LinkQuery, LinkRecord, LinkStore, MappingRow, Result,
    SearchRow, System, TermQuery, TermRecord, TermStore,
};

/// Answers every query with the full, unfiltered data set.
pub struct NoPushdownStore {
    inner: InMemoryStore,
}

impl NoPushdownStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl TermStore for NoPushdownStore {
    async fn get_term(&self, system: System, code: &str) -> Result<Option<TermRecord>> {
        self.inner.get_term(system, code).await
    }

    async fn find_terms(&self, _query: &TermQuery) -> Result<Vec<SearchRow>> {
        self.inner.find_terms(&TermQuery::default()).await
    }

    async fn count_terms(&self, system: Option<System>) -> Result<u64> {
        self.inner.count_terms(system).await
    }

    async fn system_counts(&self) -> Result<Vec<(String, u64)>> {
        self.inner.system_counts().await
    }

    async fn all_terms(&self) -> Result<Vec<TermRecord>> {
        self.inner.all_terms().await
    }
}

#[async_trait]
impl LinkStore for NoPushdownStore {
    async fn get_links(&self, _query: &LinkQuery) -> Result<Vec<MappingRow>> {
        self.inner.get_links(&LinkQuery::default()).await
    }

    async fn all_links(&self) -> Result<Vec<LinkRecord>> {
        self.inner.all_links().await
    }

    async fn count_links(&self) -> Result<u64> {
        self.inner.count_links().await
    }
}

#[async_trait]
impl EncounterStore for NoPushdownStore {
    async fn count_encounters(&self) -> Result<Option<u64>> {
        self.inner.count_encounters().await
    }
}

/// Counts term and link queries before delegating.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TermStore for CountingStore {
    async fn get_term(&self, system: System, code: &str) -> Result<Option<TermRecord>> {
        self.record();
        self.inner.get_term(system, code).await
    }

    async fn find_terms(&self, query: &TermQuery) -> Result<Vec<SearchRow>> {
        self.record();
        self.inner.find_terms(query).await
    }

    async fn count_terms(&self, system: Option<System>) -> Result<u64> {
        self.record();
        self.inner.count_terms(system).await
    }

    async fn system_counts(&self) -> Result<Vec<(String, u64)>> {
        self.record();
        self.inner.system_counts().await
    }

    async fn all_terms(&self) -> Result<Vec<TermRecord>> {
        self.record();
        self.inner.all_terms().await
    }
}

#[async_trait]
impl LinkStore for CountingStore {
    async fn get_links(&self, query: &LinkQuery) -> Result<Vec<MappingRow>> {
        self.record();
        self.inner.get_links(query).await
    }

    async fn all_links(&self) -> Result<Vec<LinkRecord>> {
        self.record();
        self.inner.all_links().await
    }

    async fn count_links(&self) -> Result<u64> {
        self.record();
        self.inner.count_links().await
    }
}

#[async_trait]
impl EncounterStore for CountingStore {
    async fn count_encounters(&self) -> Result<Option<u64>> {
        self.record();
        self.inner.count_encounters().await
    }
}

/// Every call fails as if the database were unreachable.
pub struct FailingStore;

fn unavailable<T>() -> Result<T> {
    Err(Error::store("connection refused"))
}

#[async_trait]
impl TermStore for FailingStore {
    async fn get_term(&self, _system: System, _code: &str) -> Result<Option<TermRecord>> {
        unavailable()
    }

    async fn find_terms(&self, _query: &TermQuery) -> Result<Vec<SearchRow>> {
        unavailable()
    }

    async fn count_terms(&self, _system: Option<System>) -> Result<u64> {
        unavailable()
    }

    async fn system_counts(&self) -> Result<Vec<(String, u64)>> {
        unavailable()
    }

    async fn all_terms(&self) -> Result<Vec<TermRecord>> {
        unavailable()
    }
}

#[async_trait]
impl LinkStore for FailingStore {
    async fn get_links(&self, _query: &LinkQuery) -> Result<Vec<MappingRow>> {
        unavailable()
    }

    async fn all_links(&self) -> Result<Vec<LinkRecord>> {
        unavailable()
    }

    async fn count_links(&self) -> Result<u64> {
        unavailable()
    }
}

#[async_trait]
impl EncounterStore for FailingStore {
    async fn count_encounters(&self) -> Result<Option<u64>> {
        unavailable()
    }
}
