//! AYUSH → ICD-11 concept mapping
//!
//! Read-only query engine over NAMASTE terms (Ayurveda, Siddha, Unani) and
//! their scored links to ICD-11. Storage is abstracted behind the
//! [`TermStore`], [`LinkStore`] and [`EncounterStore`] traits; everything
//! else is pure classification, filtering and grouping.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ayush_mapping::{InMemoryStore, MappingEngine, TranslateRequest};
//!
//! # async fn run() -> ayush_mapping::Result<()> {
//! let engine = MappingEngine::from_store(Arc::new(InMemoryStore::default()));
//! let request = TranslateRequest::new("http://namaste.gov.in/fhir/CodeSystem/ayurveda", "AAE-16");
//! let result = engine.translate(&request).await?;
//! println!("{} matches", result.matches.len());
//! # Ok(())
//! # }
//! ```

pub mod annotate;
pub mod classify;
pub mod codes;
pub mod engine;
pub mod error;
pub mod memory;
pub mod model;
pub mod relevance;
pub mod search;
pub mod statistics;
pub mod store;
pub mod system;
pub mod translate;

pub use annotate::annotate;
pub use classify::{classify, effective_confidence, EquivalenceCategory, DEFAULT_CONFIDENCE};
pub use codes::{is_icd11_code, is_namaste_code, system_for_code};
pub use engine::{
    CodeValidation, ConceptPage, LookupResult, MappingEngine, MappingFilter, MappingPage,
};
pub use error::{Error, Result};
pub use memory::InMemoryStore;
pub use model::{
    AggregatedConcept, ConceptMatch, LinkRecord, MappingRow, MappingSummary, SearchRow,
    SkippedRow, TargetLink, Term, TermRecord,
};
pub use relevance::{is_informative, relevance_verdict, Verdict};
pub use search::SearchResult;
pub use statistics::{equivalence_histogram, StatisticField, Statistics};
pub use store::{EncounterStore, LinkPredicate, LinkQuery, LinkStore, TermQuery, TermStore};
pub use system::System;
pub use translate::{TranslateOutcome, TranslateRequest, TranslationResult};
