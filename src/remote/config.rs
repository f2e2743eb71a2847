use std::time::Duration;

/// A call not settled within this bound is rejected with a timeout error.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY_MS: u64 = 2000;

/// Background refresh cadence.
pub const DASHBOARD_REFRESH_SECS: u64 = 60;
pub const ROSTER_REFRESH_SECS: u64 = 180;

/// Photo capture limits.
pub const PHOTO_JPEG_QUALITY: u8 = 80;
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Deployment configuration for the remote call layer.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Script endpoint answering `?action=...` queries with JSON.
    pub base_url: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}
