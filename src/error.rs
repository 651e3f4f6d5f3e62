//! Error Taxonomy
//!
//! Two failure kinds reach the caller of a conditional update:
//! - **`InvalidInput`**: the request is malformed (mismatched sequence lengths, bad endpoint bytes,
//!   unknown partition). Detected before any row is touched.
//! - **`Conflict`**: a locally owned key carried a different version than the caller expected.
//!   The whole partition-local invocation is rolled back.
//!
//! A key that is not owned by the executing partition is not an error at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CasError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// First mismatching pair seen by the invocation.
    #[error("version conflict on key {key}: expected {expected}, found {actual}")]
    Conflict { key: i64, expected: i64, actual: i64 },
}

impl CasError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        CasError::InvalidInput(reason.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid port number: {0}")]
    InvalidPort(i32),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid encoded data: expected 6 or 18 bytes, got {0}")]
    InvalidLength(usize),

    /// The stored column is not a byte array at all.
    #[error("malformed endpoint column: {0}")]
    MalformedColumn(String),
}

impl From<CodecError> for CasError {
    fn from(err: CodecError) -> Self {
        CasError::InvalidInput(err.to_string())
    }
}
