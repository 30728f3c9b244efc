//! Clinical note synthesis
//!
//! Notes are advisory text attached to each translated match. They never feed
//! back into ranking or filtering.

use crate::system::System;

/// Confidence tier of a note. Boundaries differ from the equivalence bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteTier {
    High,
    Moderate,
    Fair,
    Low,
}

impl NoteTier {
    pub fn for_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            NoteTier::High
        } else if confidence >= 0.6 {
            NoteTier::Moderate
        } else if confidence >= 0.4 {
            NoteTier::Fair
        } else {
            NoteTier::Low
        }
    }

    pub fn confidence_phrase(&self) -> &'static str {
        match self {
            NoteTier::High => "High confidence mapping",
            NoteTier::Moderate => "Moderate confidence mapping",
            NoteTier::Fair => "Fair confidence mapping",
            NoteTier::Low => "Low confidence mapping",
        }
    }

    pub fn relationship_phrase(&self) -> &'static str {
        match self {
            NoteTier::High => "Strong clinical correlation",
            NoteTier::Moderate => "Good clinical alignment",
            NoteTier::Fair => "Partial clinical overlap",
            NoteTier::Low => "Limited clinical correlation",
        }
    }
}

/// Build the clinical note for one mapping. `system = None` omits the
/// system-specific closing sentence.
pub fn annotate(
    term: &str,
    system: Option<System>,
    target_title: &str,
    confidence: f64,
) -> String {
    let tier = NoteTier::for_confidence(confidence);
    let mut note = format!(
        "{} (score: {:.2}). {} between '{}' and '{}'.",
        tier.confidence_phrase(),
        confidence,
        tier.relationship_phrase(),
        term,
        target_title
    );

    if let Some(system) = system {
        note.push(' ');
        note.push_str(system.clinical_insight());
    }

    note
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_confidence_ayurveda_note() {
        assert_eq!(
            annotate("Jvara", Some(System::Ayurveda), "Fever of unknown origin", 0.9),
            "High confidence mapping (score: 0.90). Strong clinical correlation between \
             'Jvara' and 'Fever of unknown origin'. Consider traditional Ayurvedic diagnostic \
             principles and constitutional factors."
        );
    }

    #[test]
    fn tiers_follow_note_boundaries() {
        assert!(annotate("a", None, "b", 0.8).starts_with("High confidence mapping"));
        assert!(annotate("a", None, "b", 0.65).starts_with("Moderate confidence mapping"));
        assert!(annotate("a", None, "b", 0.4).contains("Partial clinical overlap"));
        assert!(annotate("a", None, "b", 0.39).contains("Limited clinical correlation"));
    }

    #[test]
    fn echoes_score_to_two_decimals() {
        assert!(annotate("a", Some(System::Unani), "b", 0.456).contains("(score: 0.46)"));
    }

    #[test]
    fn unknown_system_has_no_closing_sentence() {
        assert_eq!(
            annotate("Kasa", None, "Cough", 0.5),
            "Fair confidence mapping (score: 0.50). Partial clinical overlap between 'Kasa' and 'Cough'."
        );
    }

    #[test]
    fn each_system_has_its_own_closing_sentence() {
        let siddha = annotate("x", Some(System::Siddha), "y", 0.7);
        let unani = annotate("x", Some(System::Unani), "y", 0.7);
        assert!(siddha.ends_with("bodily constituent assessment."));
        assert!(unani.ends_with("humoral balance principles."));
    }
}
