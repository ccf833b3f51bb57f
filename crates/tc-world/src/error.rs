//! World-subsystem error type.

use thiserror::Error;

/// Errors produced by `tc-world`.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("unknown map glyph '{glyph}' at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },

    #[error("map has no rows")]
    EmptyMap,
}

pub type WorldResult<T> = Result<T, WorldError>;
