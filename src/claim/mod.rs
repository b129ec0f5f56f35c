pub mod api;
pub mod coordinator;
pub mod http;
pub mod state;

pub use api::{ClaimApi, ClaimError, ClaimFuture};
pub use coordinator::{ClaimOutcome, ClaimTicket, ClaimTrigger, RewardClaimCoordinator};
pub use http::HttpClaimApi;
pub use state::{ClaimState, ClaimStatus};
