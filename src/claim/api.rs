use serde::Serialize;
use std::{future::Future, pin::Pin};
use thiserror::Error;

use crate::models::ClaimResponse;

/// Failure of a single claim attempt. Always recoverable: the coordinator
/// returns to `Idle` and waits for the next legitimate trigger.
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum ClaimError {
    #[error("claim request failed: {0}")]
    Network(String),
    #[error("claim request timed out")]
    Timeout,
    #[error("claim endpoint answered with HTTP {0}")]
    Http(u16),
    #[error("claim response could not be decoded: {0}")]
    Malformed(String),
    #[error("claim rejected by server: {0}")]
    Rejected(String),
}

pub type ClaimFuture =
    Pin<Box<dyn Future<Output = Result<ClaimResponse, ClaimError>> + Send + 'static>>;

/// The `completeTask` endpoint. The future must not borrow `self`, since it
/// outlives the call that created it.
pub trait ClaimApi: Send + Sync + 'static {
    fn complete_task(&self, task_id: &str) -> ClaimFuture;
}
