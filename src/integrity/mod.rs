pub mod guard;

pub use guard::{IntegrityGuard, IntegrityState, SeekVerdict, TimeUpdateVerdict};
