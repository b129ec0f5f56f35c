//! Per-module switchable logging.
//!
//! The macros below forward to the `log` crate only when the calling module
//! declares `const ENABLE_LOGS: bool = true;`. Handlers that run on every
//! `timeupdate` can be silenced wholesale without touching `RUST_LOG`.
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::{log_debug, log_info, log_warn};
//!
//! log_warn!("seek to {:.2}s rejected", target);
//! ```

use log::LevelFilter;

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Used for integrity violations and failed claims: both are expected in
/// normal operation and recoverable.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Installs the global `env_logger`, honouring `RUST_LOG` on top of an `info`
/// baseline. Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
