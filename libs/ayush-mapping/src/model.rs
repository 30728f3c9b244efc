//! Store rows and response types
//!
//! Stores hand back raw records (`TermRecord`, `LinkRecord`, joined rows).
//! Conversion into the typed values the engine returns is fallible per row:
//! a malformed row becomes a [`SkippedRow`] next to the successful results
//! instead of disappearing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::{classify, effective_confidence, EquivalenceCategory};
use crate::system::System;

/// Mapping type reported for every link; the data has only direct mappings.
pub const DIRECT_MAPPING: &str = "direct";

/// Row of the `namaste_codes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    pub code: String,
    pub display: String,
    pub native_term: Option<String>,
    pub system: String,
}

/// Row of the `icd_mappings` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source_code: String,
    pub target_code: Option<String>,
    pub target_title: Option<String>,
    pub confidence: Option<f64>,
}

/// Inner join of a link with its term.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRow {
    pub term: TermRecord,
    pub link: LinkRecord,
}

/// Left join of a term with one of its links (or none).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRow {
    pub term: TermRecord,
    pub link: Option<LinkRecord>,
}

/// A source term with a recognised system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub code: String,
    pub display: String,
    pub native_term: Option<String>,
    pub system: System,
}

impl Term {
    /// Native-language term, falling back to the display term.
    pub fn original_term(&self) -> &str {
        self.native_term.as_deref().unwrap_or(&self.display)
    }
}

impl TryFrom<&TermRecord> for Term {
    type Error = RowIssue;

    fn try_from(record: &TermRecord) -> Result<Self, Self::Error> {
        let system = record
            .system
            .parse::<System>()
            .map_err(|_| RowIssue::UnknownSystem(record.system.clone()))?;
        Ok(Term {
            code: record.code.clone(),
            display: record.display.clone(),
            native_term: record.native_term.clone(),
            system,
        })
    }
}

/// One ICD-11 target nested under a concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLink {
    pub target_code: String,
    pub target_title: String,
    pub confidence: Option<f64>,
    pub equivalence: EquivalenceCategory,
}

impl TryFrom<&LinkRecord> for TargetLink {
    type Error = RowIssue;

    fn try_from(record: &LinkRecord) -> Result<Self, Self::Error> {
        let target_code =
            non_blank(record.target_code.as_deref()).ok_or(RowIssue::MissingTargetCode)?;
        let target_title =
            non_blank(record.target_title.as_deref()).ok_or(RowIssue::MissingTargetTitle)?;
        if let Some(confidence) = record.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(RowIssue::ConfidenceOutOfRange(confidence));
            }
        }
        Ok(TargetLink {
            target_code: target_code.to_string(),
            target_title: target_title.to_string(),
            confidence: record.confidence,
            equivalence: classify(effective_confidence(record.confidence)),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// One concept with all of its targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedConcept {
    pub code: String,
    pub term: String,
    pub system: System,
    pub native_term: Option<String>,
    pub mappings: Vec<TargetLink>,
}

impl AggregatedConcept {
    pub fn from_term(term: Term) -> Self {
        AggregatedConcept {
            code: term.code,
            term: term.display,
            system: term.system,
            native_term: term.native_term,
            mappings: Vec::new(),
        }
    }
}

/// A translated mapping with its classification and clinical note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMatch {
    pub source_code: String,
    pub source_term: String,
    pub original_term: String,
    pub system: String,
    pub target_code: String,
    pub target_title: String,
    pub equivalence: EquivalenceCategory,
    pub confidence: f64,
    pub mapping_type: String,
    pub clinical_note: String,
}

/// One row of the browse/filter listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSummary {
    pub source_code: String,
    pub source_term: String,
    pub original_term: String,
    pub system: String,
    pub target_code: String,
    pub target_term: String,
    pub confidence: f64,
    pub equivalence: EquivalenceCategory,
    pub mapping_type: String,
}

/// Reason a store row could not be turned into a result.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    UnknownSystem(String),
    MissingTargetCode,
    MissingTargetTitle,
    ConfidenceOutOfRange(f64),
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::UnknownSystem(s) => write!(f, "unknown system '{s}'"),
            RowIssue::MissingTargetCode => f.write_str("link has no target code"),
            RowIssue::MissingTargetTitle => f.write_str("link has no target title"),
            RowIssue::ConfidenceOutOfRange(c) => write!(f, "confidence {c} outside [0, 1]"),
        }
    }
}

/// Diagnostic for a row left out of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub source_code: String,
    pub target_code: Option<String>,
    pub reason: String,
}

impl SkippedRow {
    pub fn new(source_code: &str, target_code: Option<&str>, issue: &RowIssue) -> Self {
        SkippedRow {
            source_code: source_code.to_string(),
            target_code: target_code.map(str::to_string),
            reason: issue.to_string(),
        }
    }

    pub fn for_link(link: &LinkRecord, issue: &RowIssue) -> Self {
        Self::new(&link.source_code, link.target_code.as_deref(), issue)
    }

    pub fn for_term(term: &TermRecord, issue: &RowIssue) -> Self {
        Self::new(&term.code, None, issue)
    }
}
