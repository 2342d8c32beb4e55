//! Shared error-code contract.
//!
//! Every error enum in the crate maps to a grepable `E_*` code so the CLI and
//! any embedding UI can report failures without matching on display text.

/// Grepable error code and retryable flag for surfaced failures.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
