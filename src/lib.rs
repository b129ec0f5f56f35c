//! Watch-integrity tracking and exactly-once reward claiming for video tasks.
//!
//! A [`session::PlaybackSession`] turns raw media events into coverage,
//! integrity corrections and at most one in-flight reward claim. The
//! [`session::SessionController`] drives it on a tokio task and talks to the
//! media element, the claim endpoint and the presentation layer.

pub mod claim;
pub mod coverage;
pub mod integrity;
pub mod models;
pub mod session;
pub mod settings;
mod utils;

pub use claim::{ClaimApi, ClaimError, ClaimState, HttpClaimApi, RewardClaimCoordinator};
pub use coverage::CoverageTracker;
pub use integrity::IntegrityGuard;
pub use models::{RewardPayload, Violation, ViolationKind};
pub use session::{
    ChannelSink, MediaElement, MediaEvent, PlaybackSession, PresentationEvent, PresentationSink,
    SessionController, SessionInput, SessionSnapshot,
};
pub use settings::{SettingsStore, WatchSettings};
pub use utils::init_logging;
