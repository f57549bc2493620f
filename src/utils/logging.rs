//! Logging macros gated by a per-module `ENABLE_LOGS` flag.
//!
//! Collectors see hundreds of entries per page; the flag lets a module keep
//! its per-entry logging in place but silent unless it is being debugged.
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_warn};
//!
//! log_debug!("layout shift {:.4}", value);
//! ```

/// Startup logger, reads `RUST_LOG` with `info` as the floor.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

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

/// Warnings that are expected on some browsers (unsupported entry types)
/// and only worth printing while debugging that module.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
