use serde::{Deserialize, Serialize};

use super::PresentationEvent;
use crate::claim::ClaimTicket;

/// Events emitted by the media element. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MediaEvent {
    LoadedMetadata {
        duration: f64,
    },
    /// `duration` is whatever the element reports alongside the position;
    /// `None` falls back to the duration captured from metadata.
    #[serde(rename_all = "camelCase")]
    TimeUpdate {
        current_time: f64,
        #[serde(default)]
        duration: Option<f64>,
    },
    Seeking {
        target: f64,
    },
    RateChange {
        rate: f64,
    },
    Play {
        position: f64,
    },
    Pause,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionInput {
    Media(MediaEvent),
    VisibilityChanged { hidden: bool },
    RetryClaim,
}

impl From<MediaEvent> for SessionInput {
    fn from(event: MediaEvent) -> Self {
        SessionInput::Media(event)
    }
}

/// Side effects requested by the session, applied by whoever drives it.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    SeekMedia(f64),
    SetPlaybackRate(f64),
    PauseMedia,
    Present(PresentationEvent),
    BeginClaim(ClaimTicket),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_media_events_from_player_json() {
        let event: MediaEvent =
            serde_json::from_str(r#"{ "type": "timeUpdate", "currentTime": 12.5 }"#).unwrap();
        assert_eq!(
            event,
            MediaEvent::TimeUpdate {
                current_time: 12.5,
                duration: None
            }
        );

        let ended: MediaEvent = serde_json::from_str(r#"{ "type": "ended" }"#).unwrap();
        assert_eq!(ended, MediaEvent::Ended);
    }

    #[test]
    fn decodes_session_inputs() {
        let input: SessionInput =
            serde_json::from_str(r#"{ "visibilityChanged": { "hidden": true } }"#).unwrap();
        assert_eq!(input, SessionInput::VisibilityChanged { hidden: true });

        let input: SessionInput = serde_json::from_str(
            r#"{ "media": { "type": "seeking", "target": 40.0 } }"#,
        )
        .unwrap();
        assert_eq!(input, SessionInput::Media(MediaEvent::Seeking { target: 40.0 }));

        let retry: SessionInput = serde_json::from_str(r#""retryClaim""#).unwrap();
        assert_eq!(retry, SessionInput::RetryClaim);
    }
}
