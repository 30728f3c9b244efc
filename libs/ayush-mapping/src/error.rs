//! Error types for the mapping engine

use thiserror::Error;

use crate::system::System;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Concept not found: {code} in system {system}")]
    NotFound { system: System, code: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Terminology store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Error {
    pub fn store(err: impl std::fmt::Display) -> Self {
        Error::StoreUnavailable(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
