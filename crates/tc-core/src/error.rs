//! Engine error type.
//!
//! Cover-seeking *failures* (no cover found, unreachable slot, …) are not
//! errors: tasks report them as `TaskStatus::Failed` values.  `CoreError`
//! covers misconfiguration and malformed input only.

use thiserror::Error;

/// The top-level error type for `tc-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for all `tc-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
