//! Error types shared by the layout and sync engines.
//!
//! Two families: `GridError` for shape-contract violations (bad sizes,
//! malformed tensors, diff indices outside the flattened state) and
//! `SyncError` for everything the sync engine can surface, which wraps
//! `GridError` alongside request failures.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Shape-contract violations. Always fatal to the current session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("dimension sizes must not be empty")]
    NoDimensions,

    #[error("dimension {dimension} has size 0")]
    ZeroSize { dimension: usize },

    #[error("grid of {cells} cells is too large")]
    TooLarge { cells: u128 },

    #[error("{dimensions} dimensions are too many to lay out in 3D")]
    TooWide { dimensions: usize },

    #[error("state tensor has nesting depth {found}, expected {expected}")]
    DepthMismatch { expected: usize, found: usize },

    #[error("state tensor dimension {dimension} has length {found}, expected {expected}")]
    LengthMismatch {
        dimension: usize,
        expected: usize,
        found: usize,
    },

    #[error("diff index {index} is outside the flattened state (length {len})")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("diff key `{key}` is not a cell index")]
    MalformedIndex { key: String },
}

/// Errors surfaced by the sync engine and its browser driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server responded with HTTP {status}")]
    Http { status: u16 },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("`{received}` reply does not match the session's pending request")]
    UnexpectedReply { received: &'static str },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("direction code {code} is invalid for a {dimensions}-dimensional level")]
    InvalidDirection { code: i32, dimensions: usize },

    #[error("dimension group {group} does not exist ({groups} groups available)")]
    InvalidGroup { group: usize, groups: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// Transport-level failures: the session keeps its phase and no state
    /// is mutated. Everything else is a contract violation.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            SyncError::Request(_) | SyncError::Http { .. } | SyncError::Decode(_)
        )
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Decode(e.to_string())
    }
}

impl From<SyncError> for JsValue {
    fn from(e: SyncError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failures_are_classified() {
        assert!(SyncError::Request("offline".into()).is_request_failure());
        assert!(SyncError::Http { status: 503 }.is_request_failure());
        assert!(SyncError::Decode("eof".into()).is_request_failure());
        let grid: SyncError = GridError::IndexOutOfRange { index: 9, len: 4 }.into();
        assert!(!grid.is_request_failure());
    }

    #[test]
    fn grid_error_message_is_transparent() {
        let e: SyncError = GridError::DepthMismatch {
            expected: 3,
            found: 2,
        }
        .into();
        assert_eq!(
            e.to_string(),
            "state tensor has nesting depth 2, expected 3"
        );
    }

    #[test]
    fn json_errors_become_decode_failures() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let e: SyncError = err.into();
        assert!(matches!(e, SyncError::Decode(_)));
    }
}
