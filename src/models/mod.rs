pub mod reward;
pub mod session;
pub mod violation;

pub use reward::{ClaimResponse, ClaimStatusField, RewardPayload};
pub use session::SessionInfo;
pub use violation::{Violation, ViolationKind, ViolationTally};
