use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one watch attempt of one video. The duration is filled in once
/// the media reports it and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub task_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_secs: Option<f64>,
    pub segment_length_secs: f64,
}

impl SessionInfo {
    pub fn new(task_id: impl Into<String>, segment_length_secs: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            started_at: Utc::now(),
            duration_secs: None,
            segment_length_secs,
        }
    }

    /// Records the duration on first call; returns false when it was already set.
    pub fn fix_duration(&mut self, duration_secs: f64) -> bool {
        if self.duration_secs.is_some() {
            return false;
        }
        self.duration_secs = Some(duration_secs);
        true
    }
}
