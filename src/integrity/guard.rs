use serde::Serialize;

use crate::models::{Violation, ViolationKind};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Playback rates within this distance of the expected rate are treated as equal.
const RATE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityState {
    pub last_known_good_time: f64,
    pub playing: bool,
    /// Position we forced the media back to; the next `timeupdate` is its echo.
    #[serde(skip)]
    pending_correction: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeekVerdict {
    Accepted { position: f64 },
    /// The media must be moved back to `violation.corrected_to`.
    Corrected(Violation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUpdateVerdict {
    /// Genuine progress; feed it to coverage.
    Progress,
    /// First sample after a forced seek-back. Not new progress.
    CorrectionEcho,
}

/// Filters raw media events and decides which state changes the user is
/// allowed to make. Every violation is corrected on the spot and reported;
/// none of them ends the session.
#[derive(Debug, Clone)]
pub struct IntegrityGuard {
    seek_tolerance_secs: f64,
    expected_rate: f64,
    state: IntegrityState,
}

impl IntegrityGuard {
    pub fn new(seek_tolerance_secs: f64, expected_rate: f64) -> Self {
        Self {
            seek_tolerance_secs,
            expected_rate,
            state: IntegrityState::default(),
        }
    }

    pub fn on_play(&mut self, position: f64) {
        self.state.playing = true;
        if position.is_finite() && position >= 0.0 {
            self.state.last_known_good_time = position;
        }
    }

    pub fn on_pause(&mut self) {
        self.state.playing = false;
    }

    pub fn on_ended(&mut self) {
        self.state.playing = false;
    }

    pub fn on_seeking(&mut self, target: f64) -> SeekVerdict {
        let limit = self.state.last_known_good_time + self.seek_tolerance_secs;
        if target.is_nan() || target > limit {
            let corrected_to = self.state.last_known_good_time;
            self.state.pending_correction = Some(corrected_to);
            log_warn!(
                "Seek to {:.2}s exceeds allowed {:.2}s; forcing back to {:.2}s",
                target,
                limit,
                corrected_to
            );
            return SeekVerdict::Corrected(Violation::new(
                ViolationKind::SeekViolation,
                target,
                corrected_to,
            ));
        }

        self.state.last_known_good_time = target;
        SeekVerdict::Accepted { position: target }
    }

    pub fn on_time_update(&mut self, current_time: f64) -> TimeUpdateVerdict {
        if let Some(corrected_to) = self.state.pending_correction.take() {
            log_debug!(
                "Ignoring timeupdate at {:.2}s following correction to {:.2}s",
                current_time,
                corrected_to
            );
            return TimeUpdateVerdict::CorrectionEcho;
        }

        if current_time.is_finite() && current_time >= 0.0 {
            self.state.last_known_good_time = current_time;
        }
        TimeUpdateVerdict::Progress
    }

    /// Returns the violation when the new rate has to be forced back.
    pub fn on_rate_change(&mut self, rate: f64) -> Option<Violation> {
        if (rate - self.expected_rate).abs() <= RATE_EPSILON {
            return None;
        }
        log_warn!(
            "Playback rate {} rejected; forcing back to {}",
            rate,
            self.expected_rate
        );
        Some(Violation::new(
            ViolationKind::RateViolation,
            rate,
            self.expected_rate,
        ))
    }

    /// Returns the violation when playback has to be paused because the page
    /// went to the background.
    pub fn on_visibility_change(&mut self, hidden: bool) -> Option<Violation> {
        if !hidden || !self.state.playing {
            return None;
        }
        self.state.playing = false;
        let position = self.state.last_known_good_time;
        log_warn!("Page hidden during playback at {:.2}s; pausing", position);
        Some(Violation::new(
            ViolationKind::VisibilityViolation,
            position,
            position,
        ))
    }

    pub fn last_known_good_time(&self) -> f64 {
        self.state.last_known_good_time
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn state(&self) -> IntegrityState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard_at(position: f64) -> IntegrityGuard {
        let mut guard = IntegrityGuard::new(1.5, 1.0);
        guard.on_play(0.0);
        guard.on_time_update(position);
        guard
    }

    #[test]
    fn large_forward_seek_is_corrected() {
        let mut guard = guard_at(10.0);
        match guard.on_seeking(20.0) {
            SeekVerdict::Corrected(violation) => {
                assert_eq!(violation.kind, ViolationKind::SeekViolation);
                assert_eq!(violation.attempted, 20.0);
                assert_eq!(violation.corrected_to, 10.0);
            }
            other => panic!("expected correction, got {:?}", other),
        }
        assert_eq!(guard.last_known_good_time(), 10.0);
    }

    #[test]
    fn small_forward_seek_is_accepted() {
        let mut guard = guard_at(10.0);
        assert_eq!(
            guard.on_seeking(11.0),
            SeekVerdict::Accepted { position: 11.0 }
        );
        assert_eq!(guard.last_known_good_time(), 11.0);
    }

    #[test]
    fn seek_exactly_at_tolerance_is_accepted() {
        let mut guard = guard_at(10.0);
        assert_eq!(
            guard.on_seeking(11.5),
            SeekVerdict::Accepted { position: 11.5 }
        );
    }

    #[test]
    fn backward_seek_is_always_accepted() {
        let mut guard = guard_at(80.0);
        assert_eq!(guard.on_seeking(2.0), SeekVerdict::Accepted { position: 2.0 });
        assert_eq!(guard.last_known_good_time(), 2.0);
    }

    #[test]
    fn correction_echo_does_not_count_as_progress() {
        let mut guard = guard_at(10.0);
        assert!(matches!(guard.on_seeking(60.0), SeekVerdict::Corrected(_)));

        assert_eq!(guard.on_time_update(10.0), TimeUpdateVerdict::CorrectionEcho);
        assert_eq!(guard.last_known_good_time(), 10.0);

        assert_eq!(guard.on_time_update(10.25), TimeUpdateVerdict::Progress);
        assert_eq!(guard.last_known_good_time(), 10.25);
    }

    #[test]
    fn rate_change_is_forced_back() {
        let mut guard = IntegrityGuard::new(1.5, 1.0);
        let violation = guard.on_rate_change(2.0).expect("violation");
        assert_eq!(violation.kind, ViolationKind::RateViolation);
        assert_eq!(violation.corrected_to, 1.0);

        assert!(guard.on_rate_change(1.0).is_none());
        assert!(guard.on_rate_change(0.5).is_some());
        assert!(guard.on_rate_change(f64::NAN).is_some());
    }

    #[test]
    fn hiding_while_playing_pauses_once() {
        let mut guard = guard_at(30.0);
        let violation = guard.on_visibility_change(true).expect("violation");
        assert_eq!(violation.kind, ViolationKind::VisibilityViolation);
        assert!(!guard.is_playing());

        // Already paused by the first hide.
        assert!(guard.on_visibility_change(true).is_none());
    }

    #[test]
    fn hiding_while_paused_is_noop() {
        let mut guard = guard_at(30.0);
        guard.on_pause();
        assert!(guard.on_visibility_change(true).is_none());
        assert!(guard.on_visibility_change(false).is_none());
    }

    #[test]
    fn play_moves_good_time_to_start_position() {
        let mut guard = IntegrityGuard::new(1.5, 1.0);
        guard.on_play(42.0);
        assert!(guard.is_playing());
        assert_eq!(guard.last_known_good_time(), 42.0);
        assert_eq!(guard.on_seeking(43.0), SeekVerdict::Accepted { position: 43.0 });
    }
}
