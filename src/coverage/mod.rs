pub mod tracker;

pub use tracker::{CoverageState, CoverageTracker};
