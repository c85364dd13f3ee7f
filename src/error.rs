//! Domain errors for the task engine
//!
//! None of these are fatal: every failure leaves the task pool and the
//! active view selection in their last consistent state.

use crate::models::TaskKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XbitoError {
    /// A remote record could not be normalized; it is dropped from the pool
    #[error("malformed task record: {field} {detail}")]
    MalformedRecord { field: &'static str, detail: String },

    /// A mutation (complete/delete) was rejected by the remote service
    #[error("remote update failed: {0}")]
    RemoteUpdate(String),

    /// Fetching task lists or tasks failed
    #[error("remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("task {0} not found")]
    TaskNotFound(TaskKey),

    /// A refresh or mutation is already in flight
    #[error("a refresh is already in progress")]
    Busy,

    #[error("export to {0} is not supported")]
    UnsupportedExport(&'static str),
}

impl XbitoError {
    pub fn malformed(field: &'static str, detail: impl Into<String>) -> Self {
        XbitoError::MalformedRecord {
            field,
            detail: detail.into(),
        }
    }
}

pub type XbitoResult<T> = std::result::Result<T, XbitoError>;
