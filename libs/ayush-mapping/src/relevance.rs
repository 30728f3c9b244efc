//! Heuristic filter for low-information mappings
//!
//! A candidate link is dropped when the source term is a bare generic word or
//! the ICD-11 title is a residual category ("..., unspecified", "other
//! specified ..."). Applied per link, never per concept.

const GENERIC_SOURCE_TERMS: [&str; 9] = [
    "disorder",
    "disease",
    "condition",
    "-",
    "unspecified",
    "other",
    "general",
    "various",
    "multiple",
];

const GENERIC_SINGLE_TOKENS: [&str; 3] = ["disorder", "disease", "-"];

const GENERIC_TARGET_PATTERNS: [&str; 6] = [
    "unspecified",
    "other specified",
    "not otherwise specified",
    "not elsewhere classified",
    ", unspecified",
    ", other",
];

const GENERIC_TARGET_SUFFIXES: [&str; 2] = [", unspecified", ", other"];

/// Why a candidate was kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Informative,
    GenericSourceTerm,
    SingleGenericToken,
    GenericTargetPattern(&'static str),
    GenericTargetSuffix(&'static str),
}

impl Verdict {
    pub fn is_informative(&self) -> bool {
        matches!(self, Verdict::Informative)
    }
}

/// Evaluate the rules in order and report the first one that fires.
pub fn relevance_verdict(source_term: &str, target_title: &str) -> Verdict {
    let source = source_term.trim().to_lowercase();
    if GENERIC_SOURCE_TERMS.contains(&source.as_str()) {
        return Verdict::GenericSourceTerm;
    }

    let mut tokens = source.split_whitespace();
    if let (Some(token), None) = (tokens.next(), tokens.next()) {
        if GENERIC_SINGLE_TOKENS.contains(&token) {
            return Verdict::SingleGenericToken;
        }
    }

    let target = target_title.to_lowercase();
    if let Some(pattern) = GENERIC_TARGET_PATTERNS
        .into_iter()
        .find(|pattern| target.contains(*pattern))
    {
        return Verdict::GenericTargetPattern(pattern);
    }

    if let Some(suffix) = GENERIC_TARGET_SUFFIXES
        .into_iter()
        .find(|suffix| target.ends_with(*suffix))
    {
        return Verdict::GenericTargetSuffix(suffix);
    }

    Verdict::Informative
}

/// `false` when the mapping should not be surfaced.
pub fn is_informative(source_term: &str, target_title: &str) -> bool {
    relevance_verdict(source_term, target_title).is_informative()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_generic_source_terms() {
        assert_eq!(
            relevance_verdict("  Disorder ", "Cholera"),
            Verdict::GenericSourceTerm
        );
        assert_eq!(relevance_verdict("-", "Cholera"), Verdict::GenericSourceTerm);
        assert_eq!(
            relevance_verdict("Various", "Cholera"),
            Verdict::GenericSourceTerm
        );
        assert!(is_informative("Vataja jvara", "Fever of other known origin"));
    }

    #[test]
    fn drops_generic_target_titles() {
        assert_eq!(
            relevance_verdict("Jvara", "Fever, unspecified"),
            Verdict::GenericTargetPattern("unspecified")
        );
        assert_eq!(
            relevance_verdict("Jvara", "Other specified fever"),
            Verdict::GenericTargetPattern("other specified")
        );
        assert_eq!(
            relevance_verdict("Kasa", "Cough, other"),
            Verdict::GenericTargetPattern(", other")
        );
        assert!(!is_informative("Kasa", "Disorders NOT ELSEWHERE CLASSIFIED"));
    }

    #[test]
    fn keeps_specific_pairs() {
        assert!(is_informative("Amavata", "Rheumatoid arthritis"));
        assert!(is_informative("Disorder of vata", "Pattern of vata"));
        assert!(is_informative("Kasa", "Other cough"));
    }

    #[test]
    fn is_pure() {
        let inputs = [
            ("disease", "Anything"),
            ("Pandu", "Iron deficiency anaemia"),
            ("Pandu", "Anaemia, unspecified"),
        ];
        let first: Vec<bool> = inputs.iter().map(|(s, t)| is_informative(s, t)).collect();
        let second: Vec<bool> = inputs
            .iter()
            .rev()
            .map(|(s, t)| is_informative(s, t))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![false, true, false]);
    }
}
