//! Grepable error codes shared by every error enum in the crate.

/// Errors that surface to callers carry a stable code and a retry hint.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
