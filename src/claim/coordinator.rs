use serde::Serialize;

use super::{ClaimError, ClaimState, ClaimStatus};
use crate::models::{ClaimResponse, ClaimStatusField, RewardPayload};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Proof that the holder won the right to issue one claim request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimTicket {
    pub attempt: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClaimTrigger {
    Threshold,
    Ended,
    ManualRetry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ClaimOutcome {
    Claimed(RewardPayload),
    Failed { error: ClaimError },
}

/// Decides when the reward request goes out and tracks its result.
///
/// `Idle -> Claiming` only happens inside [`RewardClaimCoordinator::try_begin_claim`],
/// which checks and flips the state in one call. Every trigger goes through it,
/// so two triggers handled back to back can never both get a ticket.
#[derive(Debug, Clone)]
pub struct RewardClaimCoordinator {
    task_id: String,
    threshold_percent: f64,
    state: ClaimState,
    attempts: u32,
    in_flight: Option<ClaimTicket>,
    /// Coverage when the latest attempt started; a threshold retry needs more than this.
    attempt_coverage: Option<f64>,
    media_ended: bool,
    reward: Option<RewardPayload>,
    last_error: Option<ClaimError>,
}

impl RewardClaimCoordinator {
    pub fn new(task_id: impl Into<String>, threshold_percent: f64) -> Self {
        Self {
            task_id: task_id.into(),
            threshold_percent,
            state: ClaimState::Idle,
            attempts: 0,
            in_flight: None,
            attempt_coverage: None,
            media_ended: false,
            reward: None,
            last_error: None,
        }
    }

    /// Threshold trigger, evaluated after every accepted coverage update.
    pub fn on_coverage(&mut self, coverage_percent: f64) -> Option<ClaimTicket> {
        if coverage_percent < self.threshold_percent {
            return None;
        }
        if let Some(previous) = self.attempt_coverage {
            if coverage_percent <= previous {
                return None;
            }
        }
        self.try_begin_claim(ClaimTrigger::Threshold, coverage_percent)
    }

    /// End-of-stream trigger. Fires whenever nothing has been claimed yet,
    /// whatever the coverage.
    pub fn on_ended(&mut self, coverage_percent: f64) -> Option<ClaimTicket> {
        self.media_ended = true;
        self.try_begin_claim(ClaimTrigger::Ended, coverage_percent)
    }

    /// Explicit retry from the user after a failed attempt. Only honoured when
    /// the session had already earned the claim.
    pub fn request_retry(&mut self, coverage_percent: f64) -> Option<ClaimTicket> {
        if self.last_error.is_none() {
            log_debug!("Retry requested for task {} without a failed attempt", self.task_id);
            return None;
        }
        if coverage_percent < self.threshold_percent && !self.media_ended {
            log_debug!(
                "Retry requested for task {} below threshold ({:.1}%)",
                self.task_id,
                coverage_percent
            );
            return None;
        }
        self.try_begin_claim(ClaimTrigger::ManualRetry, coverage_percent)
    }

    /// Single-fire guard. Returns a ticket only when the machine was `Idle`,
    /// and leaves it in `Claiming` before returning.
    pub fn try_begin_claim(
        &mut self,
        trigger: ClaimTrigger,
        coverage_percent: f64,
    ) -> Option<ClaimTicket> {
        if self.state != ClaimState::Idle {
            log_debug!(
                "{:?} trigger ignored for task {}: claim is {}",
                trigger,
                self.task_id,
                self.state.as_str()
            );
            return None;
        }

        self.state = ClaimState::Claiming;
        self.attempts += 1;
        self.attempt_coverage = Some(coverage_percent);
        let ticket = ClaimTicket {
            attempt: self.attempts,
        };
        self.in_flight = Some(ticket);

        log_info!(
            "Claim attempt {} for task {} started by {:?} trigger at {:.1}% coverage",
            ticket.attempt,
            self.task_id,
            trigger,
            coverage_percent
        );
        Some(ticket)
    }

    /// Applies the response of the request identified by `ticket`. Responses
    /// for anything but the in-flight attempt are dropped.
    pub fn resolve(
        &mut self,
        ticket: ClaimTicket,
        result: Result<ClaimResponse, ClaimError>,
    ) -> Option<ClaimOutcome> {
        if self.state != ClaimState::Claiming || self.in_flight != Some(ticket) {
            log_debug!(
                "Dropping stale claim response for attempt {} (state {})",
                ticket.attempt,
                self.state.as_str()
            );
            return None;
        }
        self.in_flight = None;

        let result = result.and_then(|response| match response.status {
            ClaimStatusField::Success => Ok(response),
            ClaimStatusField::Error => Err(ClaimError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "no reason given".to_string()),
            )),
        });

        match result {
            Ok(response) => {
                let payload = RewardPayload::from_response(&self.task_id, &response);
                self.state = ClaimState::Claimed;
                self.reward = Some(payload.clone());
                self.last_error = None;
                log_info!(
                    "Task {} claimed on attempt {}: +{} (balance {})",
                    self.task_id,
                    ticket.attempt,
                    payload.reward_amount,
                    payload.new_balance
                );
                Some(ClaimOutcome::Claimed(payload))
            }
            Err(error) => {
                self.state = ClaimState::Failed;
                log_warn!(
                    "Claim attempt {} for task {} failed: {}",
                    ticket.attempt,
                    self.task_id,
                    error
                );
                self.last_error = Some(error.clone());
                self.state = ClaimState::Idle;
                Some(ClaimOutcome::Failed { error })
            }
        }
    }

    pub fn state(&self) -> ClaimState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reward(&self) -> Option<&RewardPayload> {
        self.reward.as_ref()
    }

    pub fn status(&self) -> ClaimStatus {
        ClaimStatus {
            state: self.state,
            attempts: self.attempts,
            reward: self.reward.clone(),
            last_error: self.last_error.clone(),
        }
    }
}
