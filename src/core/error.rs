//! Domain failures that callers are expected to branch on.
//!
//! Everything else travels as a plain `anyhow::Error`. These variants are wrapped into
//! `anyhow::Error` as well and can be recovered with `downcast_ref::<TripError>()`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TripError {
    #[error("Vacation not found: {0}")]
    VacationNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),
    #[error("Currency already exists in catalog: {0}")]
    DuplicateCurrency(String),
}

impl TripError {
    /// Returns the `TripError` carried by an `anyhow::Error`, if any.
    pub fn find(err: &anyhow::Error) -> Option<&TripError> {
        err.downcast_ref::<TripError>()
    }
}
