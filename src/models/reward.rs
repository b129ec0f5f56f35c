use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatusField {
    Success,
    Error,
}

/// Body returned by the `completeTask` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub status: ClaimStatusField,
    #[serde(default)]
    pub reward_amount: f64,
    #[serde(default)]
    pub new_balance: f64,
    #[serde(default)]
    pub today_tasks_completed: u32,
    #[serde(default)]
    pub total_tasks_completed: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// What the presentation layer shows after a successful claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewardPayload {
    pub task_id: String,
    pub reward_amount: f64,
    pub new_balance: f64,
    pub today_tasks_completed: u32,
    pub total_tasks_completed: u32,
    pub claimed_at: DateTime<Utc>,
}

impl RewardPayload {
    pub fn from_response(task_id: &str, response: &ClaimResponse) -> Self {
        Self {
            task_id: task_id.to_string(),
            reward_amount: response.reward_amount,
            new_balance: response.new_balance,
            today_tasks_completed: response.today_tasks_completed,
            total_tasks_completed: response.total_tasks_completed,
            claimed_at: Utc::now(),
        }
    }
}
