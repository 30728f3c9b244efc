//! `$translate`: one source code to its informative ICD-11 targets
//!
//! Outcomes that are part of normal operation (bad parameters, unknown code,
//! no mapping) come back as a [`TranslationResult`] with `result = false`.
//! Only store failures surface as `Err`.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn};

use crate::annotate::annotate;
use crate::classify::effective_confidence;
use crate::engine::MappingEngine;
use crate::model::{ConceptMatch, SkippedRow, TargetLink, Term, DIRECT_MAPPING};
use crate::relevance::relevance_verdict;
use crate::store::LinkQuery;
use crate::system::System;
use crate::Result;

/// Input of a translate call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateRequest {
    /// Source code system URI, e.g. `http://namaste.gov.in/fhir/CodeSystem/ayurveda`.
    pub system: Option<String>,
    pub code: Option<String>,
    /// Target system URI. Only ICD-11 is served; recorded for logging.
    pub target: Option<String>,
}

impl TranslateRequest {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        TranslateRequest {
            system: Some(system.into()),
            code: Some(code.into()),
            target: None,
        }
    }

    /// Read a FHIR `Parameters` resource.
    ///
    /// `system` and `target` come from `valueUri`, `code` from `valueCode`
    /// (or `valueString`). Anything else is ignored.
    pub fn from_parameters(parameters: &JsonValue) -> Self {
        let mut request = TranslateRequest::default();
        let Some(entries) = parameters.get("parameter").and_then(JsonValue::as_array) else {
            return request;
        };

        for entry in entries {
            let value = |key: &str| entry.get(key).and_then(JsonValue::as_str).map(str::to_string);
            match entry.get("name").and_then(JsonValue::as_str) {
                Some("system") => request.system = value("valueUri"),
                Some("code") => request.code = value("valueCode").or_else(|| value("valueString")),
                Some("target") => request.target = value("valueUri"),
                _ => {}
            }
        }
        request
    }
}

/// Why a translate call ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslateOutcome {
    Matched,
    InvalidInput,
    UnsupportedSystem,
    UnknownCode,
    NoMappingFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub result: bool,
    pub outcome: TranslateOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub matches: Vec<ConceptMatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRow>,
}

impl TranslationResult {
    pub fn success(matches: Vec<ConceptMatch>, skipped: Vec<SkippedRow>) -> Self {
        TranslationResult {
            result: true,
            outcome: TranslateOutcome::Matched,
            message: None,
            matches,
            skipped,
        }
    }

    pub fn failure(outcome: TranslateOutcome, message: impl Into<String>) -> Self {
        TranslationResult {
            result: false,
            outcome,
            message: Some(message.into()),
            matches: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl MappingEngine {
    /// Translate one source code to its informative ICD-11 matches, in the
    /// order the link store returned them.
    #[instrument(skip(self, request), fields(system = ?request.system, code = ?request.code))]
    pub async fn translate(&self, request: &TranslateRequest) -> Result<TranslationResult> {
        let (Some(uri), Some(code)) = (
            present(request.system.as_deref()),
            present(request.code.as_deref()),
        ) else {
            return Ok(TranslationResult::failure(
                TranslateOutcome::InvalidInput,
                "Required parameters 'system' and 'code' must be provided",
            ));
        };

        let Some(system) = System::from_uri(uri) else {
            return Ok(TranslationResult::failure(
                TranslateOutcome::UnsupportedSystem,
                format!("Unsupported source system: {uri}"),
            ));
        };

        if let Some(target) = request.target.as_deref() {
            debug!(target_system = target, "Target system requested; serving ICD-11");
        }

        let query = LinkQuery::for_concept(system, code);
        let mut rows = self.links.get_links(&query).await?;
        rows.retain(|row| query.matches(row));

        if rows.is_empty() {
            return match self.terms.get_term(system, code).await? {
                None => Ok(TranslationResult::failure(
                    TranslateOutcome::UnknownCode,
                    format!("Unknown code '{code}' in system '{system}'"),
                )),
                Some(_) => Ok(TranslationResult::failure(
                    TranslateOutcome::NoMappingFound,
                    format!("No mapping found for code: {code}"),
                )),
            };
        }

        let mut matches = Vec::new();
        let mut skipped = Vec::new();
        for row in &rows {
            let converted = Term::try_from(&row.term)
                .and_then(|term| TargetLink::try_from(&row.link).map(|link| (term, link)));
            let (term, link) = match converted {
                Ok(pair) => pair,
                Err(issue) => {
                    warn!(code, %issue, "Skipping malformed mapping row");
                    skipped.push(SkippedRow::for_link(&row.link, &issue));
                    continue;
                }
            };

            let verdict = relevance_verdict(&term.display, &link.target_title);
            if !verdict.is_informative() {
                debug!(target_code = %link.target_code, ?verdict, "Dropping generic mapping");
                continue;
            }

            let confidence = effective_confidence(link.confidence);
            matches.push(ConceptMatch {
                clinical_note: annotate(
                    &term.display,
                    Some(term.system),
                    &link.target_title,
                    confidence,
                ),
                original_term: term.original_term().to_string(),
                source_code: term.code,
                source_term: term.display,
                system: term.system.display_name().to_string(),
                target_code: link.target_code,
                target_title: link.target_title,
                equivalence: link.equivalence,
                confidence,
                mapping_type: DIRECT_MAPPING.to_string(),
            });
        }

        info!(
            candidates = rows.len(),
            matches = matches.len(),
            skipped = skipped.len(),
            "Translation complete"
        );
        Ok(TranslationResult::success(matches, skipped))
    }
}
