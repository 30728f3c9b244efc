//! Confidence → equivalence classification
//!
//! Every surface that reports an equivalence (translate, browse, lookup/search
//! nested links, statistics) goes through [`classify`], so the bands below are
//! the only place the thresholds live.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Confidence assumed for a link that carries no score.
///
/// Links without a score are treated as informative rather than noise.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

pub const EQUIVALENT_THRESHOLD: f64 = 0.8;
pub const RELATED_THRESHOLD: f64 = 0.5;
pub const WIDER_THRESHOLD: f64 = 0.3;

/// Coarse equivalence bucket, spelled with FHIR ConceptMap equivalence codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquivalenceCategory {
    #[serde(rename = "equivalent")]
    Equivalent,
    #[serde(rename = "relatedto", alias = "related")]
    Related,
    #[serde(rename = "narrower")]
    Narrower,
    #[serde(rename = "wider")]
    Wider,
    #[serde(rename = "unmatched")]
    Unmatched,
}

impl EquivalenceCategory {
    pub fn code(&self) -> &'static str {
        match self {
            EquivalenceCategory::Equivalent => "equivalent",
            EquivalenceCategory::Related => "relatedto",
            EquivalenceCategory::Narrower => "narrower",
            EquivalenceCategory::Wider => "wider",
            EquivalenceCategory::Unmatched => "unmatched",
        }
    }

    /// Position in the fixed ordering; higher is a stronger match.
    /// `narrower` and `wider` share a rank.
    pub fn rank(&self) -> u8 {
        match self {
            EquivalenceCategory::Equivalent => 3,
            EquivalenceCategory::Related => 2,
            EquivalenceCategory::Narrower | EquivalenceCategory::Wider => 1,
            EquivalenceCategory::Unmatched => 0,
        }
    }

    /// Whether `confidence` falls inside this category's band.
    ///
    /// `narrower` has no signal of its own and selects the `wider` band.
    pub fn contains(&self, confidence: f64) -> bool {
        match (self, classify(confidence)) {
            (EquivalenceCategory::Narrower, EquivalenceCategory::Wider) => true,
            (wanted, actual) => *wanted == actual,
        }
    }
}

impl fmt::Display for EquivalenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for EquivalenceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equivalent" => Ok(EquivalenceCategory::Equivalent),
            "related" | "relatedto" => Ok(EquivalenceCategory::Related),
            "narrower" => Ok(EquivalenceCategory::Narrower),
            "wider" => Ok(EquivalenceCategory::Wider),
            "unmatched" => Ok(EquivalenceCategory::Unmatched),
            other => Err(format!("Unknown equivalence: {other}")),
        }
    }
}

/// Resolve an optional score to the confidence the engine works with.
pub fn effective_confidence(confidence: Option<f64>) -> f64 {
    confidence.unwrap_or(DEFAULT_CONFIDENCE)
}

/// Bucket a confidence. Never returns `Narrower`; NaN is `Unmatched`.
pub fn classify(confidence: f64) -> EquivalenceCategory {
    if confidence >= EQUIVALENT_THRESHOLD {
        EquivalenceCategory::Equivalent
    } else if confidence >= RELATED_THRESHOLD {
        EquivalenceCategory::Related
    } else if confidence >= WIDER_THRESHOLD {
        EquivalenceCategory::Wider
    } else {
        EquivalenceCategory::Unmatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_on_inclusive_lower_bounds() {
        assert_eq!(classify(1.0), EquivalenceCategory::Equivalent);
        assert_eq!(classify(0.8), EquivalenceCategory::Equivalent);
        assert_eq!(classify(0.79), EquivalenceCategory::Related);
        assert_eq!(classify(0.5), EquivalenceCategory::Related);
        assert_eq!(classify(0.49), EquivalenceCategory::Wider);
        assert_eq!(classify(0.3), EquivalenceCategory::Wider);
        assert_eq!(classify(0.29), EquivalenceCategory::Unmatched);
        assert_eq!(classify(0.0), EquivalenceCategory::Unmatched);
        assert_eq!(classify(f64::NAN), EquivalenceCategory::Unmatched);
    }

    #[test]
    fn missing_confidence_defaults_to_equivalent() {
        assert_eq!(effective_confidence(None), DEFAULT_CONFIDENCE);
        assert_eq!(effective_confidence(Some(0.1)), 0.1);
        assert_eq!(
            classify(effective_confidence(None)),
            EquivalenceCategory::Equivalent
        );
    }

    #[test]
    fn classification_is_monotonic() {
        let mut previous = classify(0.0).rank();
        for step in 0..=1000 {
            let rank = classify(step as f64 / 1000.0).rank();
            assert!(rank >= previous, "rank dropped at {step}");
            previous = rank;
        }
    }

    #[test]
    fn only_four_categories_are_produced() {
        for step in -10..=110 {
            let category = classify(step as f64 / 100.0);
            assert_ne!(category, EquivalenceCategory::Narrower);
        }
    }

    #[test]
    fn narrower_selects_the_wider_band() {
        assert!(EquivalenceCategory::Narrower.contains(0.4));
        assert!(EquivalenceCategory::Wider.contains(0.4));
        assert!(!EquivalenceCategory::Narrower.contains(0.6));
        assert!(EquivalenceCategory::Unmatched.contains(0.1));
        assert!(!EquivalenceCategory::Unmatched.contains(0.4));
    }

    #[test]
    fn parses_fhir_and_short_spellings() {
        assert_eq!(
            "relatedto".parse::<EquivalenceCategory>().unwrap(),
            EquivalenceCategory::Related
        );
        assert_eq!(
            "Related".parse::<EquivalenceCategory>().unwrap(),
            EquivalenceCategory::Related
        );
        assert!("disjoint".parse::<EquivalenceCategory>().is_err());
        assert_eq!(
            serde_json::to_string(&EquivalenceCategory::Related).unwrap(),
            "\"relatedto\""
        );
    }
}
