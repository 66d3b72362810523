//! FILENAME: model/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid resource path: {0}")]
    InvalidPath(String),

    #[error("Resource not found: {0}")]
    UnknownResource(String),
}

/// Failure to read a raw value under a constraint.
/// Never escapes a `DataValue`; it only decides `is_valid()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("value is empty")]
    Empty,

    #[error("not a number: {0}")]
    NotNumber(String),

    #[error("not a date: {0}")]
    NotDate(String),

    #[error("not a duration: {0}")]
    NotDuration(String),

    #[error("not a boolean: {0}")]
    NotBoolean(String),

    #[error("not a color: {0}")]
    NotColor(String),
}
