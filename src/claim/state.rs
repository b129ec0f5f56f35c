use serde::{Deserialize, Serialize};

use super::ClaimError;
use crate::models::RewardPayload;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ClaimState {
    Idle,
    Claiming,
    Claimed,
    Failed,
}

impl Default for ClaimState {
    fn default() -> Self {
        ClaimState::Idle
    }
}

impl ClaimState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimState::Idle => "Idle",
            ClaimState::Claiming => "Claiming",
            ClaimState::Claimed => "Claimed",
            ClaimState::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimState::Claimed)
    }
}

/// Read-only view of the coordinator for snapshots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatus {
    pub state: ClaimState,
    pub attempts: u32,
    pub reward: Option<RewardPayload>,
    pub last_error: Option<ClaimError>,
}
