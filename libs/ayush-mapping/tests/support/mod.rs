pub mod fixtures;
pub mod stores;

use std::sync::Arc;

use ayush_mapping::{InMemoryStore, MappingEngine};

pub use fixtures::*;
pub use stores::*;

/// Engine over an in-memory snapshot that pushes every predicate down.
pub fn engine_with(store: InMemoryStore) -> MappingEngine {
    MappingEngine::from_store(Arc::new(store))
}

/// Engine over the same snapshot through a store that pushes nothing down.
pub fn unfiltered_engine_with(store: InMemoryStore) -> MappingEngine {
    MappingEngine::from_store(Arc::new(NoPushdownStore::new(store)))
}

pub fn sample_engine() -> MappingEngine {
    engine_with(sample_store())
}
