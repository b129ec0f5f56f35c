use serde::Serialize;
use tokio::sync::mpsc;

use crate::claim::ClaimError;
use crate::models::{RewardPayload, Violation};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PresentationEvent {
    #[serde(rename_all = "camelCase")]
    CoverageUpdated {
        percent: f64,
        display_percent: u8,
        visited_segments: usize,
        total_segments: Option<u64>,
    },
    Warning(Violation),
    #[serde(rename_all = "camelCase")]
    ClaimStarted { attempt: u32 },
    ClaimSucceeded(RewardPayload),
    #[serde(rename_all = "camelCase")]
    ClaimFailed { error: ClaimError, can_retry: bool },
}

impl PresentationEvent {
    /// Channel name used when forwarding to a UI event bus.
    pub fn event_name(&self) -> &'static str {
        match self {
            PresentationEvent::CoverageUpdated { .. } => "watch-coverage-updated",
            PresentationEvent::Warning(_) => "watch-integrity-warning",
            PresentationEvent::ClaimStarted { .. } => "reward-claim-started",
            PresentationEvent::ClaimSucceeded(_) => "reward-claim-succeeded",
            PresentationEvent::ClaimFailed { .. } => "reward-claim-failed",
        }
    }
}

pub trait PresentationSink: Send + Sync + 'static {
    fn emit(&self, event: &PresentationEvent);
}

/// Forwards every event into an unbounded channel. A closed receiver just
/// means nobody is watching anymore.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<PresentationEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresentationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PresentationSink for ChannelSink {
    fn emit(&self, event: &PresentationEvent) {
        let _ = self.tx.send(event.clone());
    }
}
