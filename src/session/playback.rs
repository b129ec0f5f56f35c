use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{MediaEvent, PresentationEvent, SessionEffect, SessionInput};
use crate::{
    claim::{ClaimError, ClaimOutcome, ClaimStatus, ClaimTicket, RewardClaimCoordinator},
    coverage::CoverageTracker,
    integrity::{IntegrityGuard, SeekVerdict, TimeUpdateVerdict},
    models::{ClaimResponse, SessionInfo, Violation, ViolationTally},
    settings::WatchSettings,
};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub task_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_secs: Option<f64>,
    pub total_segments: Option<u64>,
    pub visited_segments: usize,
    pub coverage_percent: f64,
    pub display_percent: u8,
    pub last_known_good_time: f64,
    pub playing: bool,
    pub claim: ClaimStatus,
    pub violations: ViolationTally,
}

/// One watch attempt of one video: integrity filter, coverage and claim
/// machine behind a single synchronous entry point.
///
/// Every call runs to completion and returns the effects the driver has to
/// apply, so the whole session can be exercised without a runtime.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    info: SessionInfo,
    coverage: CoverageTracker,
    guard: IntegrityGuard,
    coordinator: RewardClaimCoordinator,
    violations: ViolationTally,
}

impl PlaybackSession {
    pub fn new(task_id: impl Into<String>, settings: &WatchSettings) -> Self {
        let info = SessionInfo::new(task_id, settings.segment_length_secs);
        let coordinator =
            RewardClaimCoordinator::new(info.task_id.clone(), settings.claim_threshold_percent);
        Self {
            coverage: CoverageTracker::new(settings.segment_length_secs),
            guard: IntegrityGuard::new(
                settings.seek_tolerance_secs,
                settings.expected_playback_rate,
            ),
            coordinator,
            violations: ViolationTally::default(),
            info,
        }
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn task_id(&self) -> &str {
        &self.info.task_id
    }

    pub fn coverage(&self) -> &CoverageTracker {
        &self.coverage
    }

    pub fn coordinator(&self) -> &RewardClaimCoordinator {
        &self.coordinator
    }

    pub fn handle(&mut self, input: SessionInput) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        match input {
            SessionInput::Media(event) => self.handle_media(event, &mut effects),
            SessionInput::VisibilityChanged { hidden } => {
                if let Some(violation) = self.guard.on_visibility_change(hidden) {
                    effects.push(SessionEffect::PauseMedia);
                    self.warn(violation, &mut effects);
                }
            }
            SessionInput::RetryClaim => {
                let ticket = self.coordinator.request_retry(self.coverage.percent());
                push_claim_start(ticket, &mut effects);
            }
        }
        effects
    }

    /// Feeds back the response of a claim started by an earlier `BeginClaim`.
    pub fn resolve_claim(
        &mut self,
        ticket: ClaimTicket,
        result: Result<ClaimResponse, ClaimError>,
    ) -> Vec<SessionEffect> {
        match self.coordinator.resolve(ticket, result) {
            Some(ClaimOutcome::Claimed(payload)) => vec![SessionEffect::Present(
                PresentationEvent::ClaimSucceeded(payload),
            )],
            Some(ClaimOutcome::Failed { error }) => {
                vec![SessionEffect::Present(PresentationEvent::ClaimFailed {
                    error,
                    can_retry: true,
                })]
            }
            None => Vec::new(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let integrity = self.guard.state();
        SessionSnapshot {
            session_id: self.info.id.clone(),
            task_id: self.info.task_id.clone(),
            started_at: self.info.started_at,
            duration_secs: self.info.duration_secs,
            total_segments: self.coverage.total_segments(),
            visited_segments: self.coverage.visited_count(),
            coverage_percent: self.coverage.percent(),
            display_percent: self.coverage.display_percent(),
            last_known_good_time: integrity.last_known_good_time,
            playing: integrity.playing,
            claim: self.coordinator.status(),
            violations: self.violations,
        }
    }

    fn handle_media(&mut self, event: MediaEvent, effects: &mut Vec<SessionEffect>) {
        match event {
            MediaEvent::LoadedMetadata { duration } => {
                if self.coverage.capture_duration(duration) {
                    self.info.fix_duration(duration);
                    effects.push(self.coverage_event());
                }
            }
            MediaEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                if self.guard.on_time_update(current_time) == TimeUpdateVerdict::CorrectionEcho {
                    return;
                }
                self.record_progress(current_time, duration, effects);
            }
            MediaEvent::Seeking { target } => match self.guard.on_seeking(target) {
                SeekVerdict::Accepted { position } => {
                    log_debug!("Accepted seek to {:.2}s", position);
                }
                SeekVerdict::Corrected(violation) => {
                    effects.push(SessionEffect::SeekMedia(violation.corrected_to));
                    self.warn(violation, effects);
                }
            },
            MediaEvent::RateChange { rate } => {
                if let Some(violation) = self.guard.on_rate_change(rate) {
                    effects.push(SessionEffect::SetPlaybackRate(violation.corrected_to));
                    self.warn(violation, effects);
                }
            }
            MediaEvent::Play { position } => self.guard.on_play(position),
            MediaEvent::Pause => self.guard.on_pause(),
            MediaEvent::Ended => {
                self.guard.on_ended();
                let ticket = self.coordinator.on_ended(self.coverage.percent());
                push_claim_start(ticket, effects);
            }
        }
    }

    fn record_progress(
        &mut self,
        current_time: f64,
        reported_duration: Option<f64>,
        effects: &mut Vec<SessionEffect>,
    ) {
        let duration = reported_duration
            .or(self.info.duration_secs)
            .unwrap_or(f64::NAN);

        let before = self.coverage.percent();
        let had_total = self.coverage.total_segments().is_some();
        let percent = self.coverage.observe(current_time, duration);
        let captured = !had_total && self.coverage.total_segments().is_some();
        if captured {
            self.info.fix_duration(duration);
        }

        if percent != before || captured {
            effects.push(self.coverage_event());
        }

        if self.coverage.total_segments().is_some() {
            let ticket = self.coordinator.on_coverage(percent);
            push_claim_start(ticket, effects);
        }
    }

    fn coverage_event(&self) -> SessionEffect {
        SessionEffect::Present(PresentationEvent::CoverageUpdated {
            percent: self.coverage.percent(),
            display_percent: self.coverage.display_percent(),
            visited_segments: self.coverage.visited_count(),
            total_segments: self.coverage.total_segments(),
        })
    }

    fn warn(&mut self, violation: Violation, effects: &mut Vec<SessionEffect>) {
        self.violations.record(violation.kind);
        effects.push(SessionEffect::Present(PresentationEvent::Warning(violation)));
    }
}

fn push_claim_start(ticket: Option<ClaimTicket>, effects: &mut Vec<SessionEffect>) {
    if let Some(ticket) = ticket {
        effects.push(SessionEffect::Present(PresentationEvent::ClaimStarted {
            attempt: ticket.attempt,
        }));
        effects.push(SessionEffect::BeginClaim(ticket));
    }
}
