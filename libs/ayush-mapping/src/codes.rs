//! Code format checks for NAMASTE source codes and ICD-11 targets

use once_cell::sync::Lazy;
use regex::Regex;

use crate::system::System;

/// `AAE-16`: three letters, a hyphen, digits.
static NAMASTE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{3})-(\d+)$").expect("NAMASTE code regex must compile"));

/// Known NAMASTE prefixes and the system each one belongs to.
const PREFIXES: [(&str, System); 6] = [
    ("AAE", System::Ayurveda),
    ("AYU", System::Ayurveda),
    ("SSE", System::Siddha),
    ("SID", System::Siddha),
    ("UUE", System::Unani),
    ("UNA", System::Unani),
];

/// System implied by the code prefix, if the code is well formed.
pub fn system_for_code(code: &str) -> Option<System> {
    let captures = NAMASTE_CODE.captures(code.trim())?;
    let prefix = captures.get(1)?.as_str().to_ascii_uppercase();
    PREFIXES
        .iter()
        .find(|(known, _)| *known == prefix)
        .map(|(_, system)| *system)
}

pub fn is_namaste_code(code: &str) -> bool {
    system_for_code(code).is_some()
}

/// Loose ICD-11 check: at least two characters, starting alphanumeric.
pub fn is_icd11_code(code: &str) -> bool {
    let code = code.trim();
    code.chars().count() >= 2 && code.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
}
