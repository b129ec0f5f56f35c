use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    SeekViolation,
    RateViolation,
    VisibilityViolation,
}

/// A self-corrected manipulation attempt, surfaced to the user as a warning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    /// Value the media reported (seek target, playback rate, or position when hidden).
    pub attempted: f64,
    /// Value the guard forced back onto the media.
    pub corrected_to: f64,
    pub detected_at: DateTime<Utc>,
}

impl Violation {
    pub fn new(kind: ViolationKind, attempted: f64, corrected_to: f64) -> Self {
        Self {
            kind,
            attempted,
            corrected_to,
            detected_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViolationTally {
    pub seek: u32,
    pub rate: u32,
    pub visibility: u32,
}

impl ViolationTally {
    pub fn record(&mut self, kind: ViolationKind) {
        match kind {
            ViolationKind::SeekViolation => self.seek += 1,
            ViolationKind::RateViolation => self.rate += 1,
            ViolationKind::VisibilityViolation => self.visibility += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.seek + self.rate + self.visibility
    }
}
