//! Conditional logging macros gated on a module-level `ENABLE_LOGS` const.
//!
//! Each module using these defines its own flag:
//! ```rust
//! const ENABLE_LOGS: bool = true;
//! use tryoutdesk::{log_error, log_info, log_warn};
//! ```

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
