//! AYUSH coding systems
//!
//! The three source terminologies are a closed set. Everything that used to be
//! decided by comparing system strings (URI resolution, display names, the
//! closing sentence of a clinical note) goes through an exhaustive `match` on
//! [`System`] or through [`URI_MARKERS`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A source terminology system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum System {
    Ayurveda,
    Siddha,
    Unani,
}

/// URI substrings recognised by [`System::from_uri`], checked in order.
pub const URI_MARKERS: [(&str, System); 3] = [
    ("ayurveda", System::Ayurveda),
    ("siddha", System::Siddha),
    ("unani", System::Unani),
];

impl System {
    pub const ALL: [System; 3] = [System::Ayurveda, System::Siddha, System::Unani];

    /// Storage identifier (`ayurveda`, `siddha`, `unani`).
    pub fn as_str(&self) -> &'static str {
        match self {
            System::Ayurveda => "ayurveda",
            System::Siddha => "siddha",
            System::Unani => "unani",
        }
    }

    /// Title-cased name used in responses and statistics.
    pub fn display_name(&self) -> &'static str {
        match self {
            System::Ayurveda => "Ayurveda",
            System::Siddha => "Siddha",
            System::Unani => "Unani",
        }
    }

    /// Resolve a code system URI by substring match, e.g.
    /// `http://namaste.gov.in/fhir/CodeSystem/ayurveda`.
    pub fn from_uri(uri: &str) -> Option<System> {
        let uri = uri.to_lowercase();
        URI_MARKERS
            .iter()
            .find(|(marker, _)| uri.contains(marker))
            .map(|(_, system)| *system)
    }

    /// Lenient parse for optional filters: unknown or blank values mean "no filter".
    pub fn parse_filter(value: Option<&str>) -> Option<System> {
        value.and_then(|v| v.trim().parse().ok())
    }

    /// Canned closing sentence of a clinical note for this system.
    pub fn clinical_insight(&self) -> &'static str {
        match self {
            System::Ayurveda => {
                "Consider traditional Ayurvedic diagnostic principles and constitutional factors."
            }
            System::Siddha => {
                "Evaluate based on Siddha medicine's tridosha and bodily constituent assessment."
            }
            System::Unani => {
                "Apply Unani medicine's temperament (mizaj) and humoral balance principles."
            }
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSystem(pub String);

impl fmt::Display for UnknownSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid system: {}. Must be one of: ayurveda, siddha, unani",
            self.0
        )
    }
}

impl std::error::Error for UnknownSystem {}

impl FromStr for System {
    type Err = UnknownSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        System::ALL
            .into_iter()
            .find(|system| system.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSystem(s.to_string()))
    }
}

/// Title-case a raw system label the way statistics report it (`"SIDDHA"` -> `"Siddha"`).
pub fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
