use ayush_mapping::{InMemoryStore, LinkRecord, TermRecord};

pub mod constants {
    pub const AYURVEDA_URI: &str = "http://namaste.gov.in/fhir/CodeSystem/ayurveda";
    pub const SIDDHA_URI: &str = "http://namaste.gov.in/fhir/CodeSystem/siddha";
    pub const UNANI_URI: &str = "http://namaste.gov.in/fhir/CodeSystem/unani";
    pub const ICD11_URI: &str = "http://id.who.int/icd/release/11/mms";
}

pub fn term(code: &str, display: &str, system: &str) -> TermRecord {
    TermRecord {
        code: code.to_string(),
        display: display.to_string(),
        native_term: None,
        system: system.to_string(),
    }
}

pub fn native_term(code: &str, display: &str, native: &str, system: &str) -> TermRecord {
    TermRecord {
        native_term: Some(native.to_string()),
        ..term(code, display, system)
    }
}

pub fn link(source: &str, target: &str, title: &str, confidence: f64) -> LinkRecord {
    LinkRecord {
        source_code: source.to_string(),
        target_code: Some(target.to_string()),
        target_title: Some(title.to_string()),
        confidence: Some(confidence),
    }
}

pub fn unscored_link(source: &str, target: &str, title: &str) -> LinkRecord {
    LinkRecord {
        confidence: None,
        ..link(source, target, title, 0.0)
    }
}

/// Seven terms across the three systems and nine links.
///
/// | code  | display  | links (target, confidence)                                    |
/// |-------|----------|---------------------------------------------------------------|
/// | AAE-1 | Jvara    | 1D01 0.92, MG26 "Fever, unspecified" 0.85, 1D02 0.55          |
/// | AAE-2 | Kasa     | MD12 0.65, CA23 unscored                                      |
/// | AAE-3 | disorder | 8A00 0.95                                                     |
/// | AAE-4 | Atisara  | none                                                          |
/// | SSE-1 | Suram    | 1D03 0.45                                                     |
/// | UUE-1 | Humma    | 1D04 0.20                                                     |
/// | AYU-1 | Fever    | X1 "Fever, unspecified" 0.90                                  |
pub fn sample_terms() -> Vec<TermRecord> {
    vec![
        native_term("AAE-1", "Jvara", "ज्वर", "ayurveda"),
        term("AAE-2", "Kasa", "ayurveda"),
        term("AAE-3", "disorder", "ayurveda"),
        term("AAE-4", "Atisara", "ayurveda"),
        native_term("SSE-1", "Suram", "சுரம்", "siddha"),
        term("UUE-1", "Humma", "unani"),
        term("AYU-1", "Fever", "ayurveda"),
    ]
}

pub fn sample_links() -> Vec<LinkRecord> {
    vec![
        link("AAE-1", "1D01", "Fever of unknown origin", 0.92),
        link("AAE-1", "MG26", "Fever, unspecified", 0.85),
        link("AAE-1", "1D02", "Intermittent fever", 0.55),
        link("AAE-2", "MD12", "Cough", 0.65),
        unscored_link("AAE-2", "CA23", "Chronic cough"),
        link("AAE-3", "8A00", "Movement disorder", 0.95),
        link("SSE-1", "1D03", "Relapsing fever", 0.45),
        link("UUE-1", "1D04", "Continuous fever", 0.20),
        link("AYU-1", "X1", "Fever, unspecified", 0.90),
    ]
}

pub fn sample_store() -> InMemoryStore {
    InMemoryStore::new(sample_terms(), sample_links()).with_encounters(12)
}
