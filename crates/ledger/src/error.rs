//! The module contains the errors the ledger can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a mutation request carries invalid fields. It
//!   is raised before any remote call is issued.
//! - [`Remote`] thrown when the gateway call failed. The local cache is left
//!   untouched.
//!
//!  [`Validation`]: LedgerError::Validation
//!  [`Remote`]: LedgerError::Remote
use thiserror::Error;

/// Failures reported by a [`Gateway`](crate::Gateway) implementation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("\"{0}\" not found in the remote store")]
    NotFound(String),
    #[error("remote store error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed document: {0}")]
    Decode(String),
}

/// Ledger custom errors.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Remote call failed: {0}")]
    Remote(#[from] GatewayError),
}

impl LedgerError {
    /// Returns `true` for errors raised locally, before any remote call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` for errors coming from the remote store.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
