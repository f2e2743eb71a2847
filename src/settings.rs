//! Cached tryout schedule settings.
//!
//! Settings come from the remote store but the app must render without them,
//! so the cache starts on the built-in fallback and swaps in fetched values
//! when a load succeeds.

use std::sync::RwLock;

use log::info;

use crate::models::{TryoutSchedule, TryoutSettings};
use crate::remote::TryoutApi;

pub struct SettingsCache {
    schedule: RwLock<TryoutSchedule>,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self {
            schedule: RwLock::new(TryoutSchedule::from(TryoutSettings::fallback())),
        }
    }

    /// Fetches current settings and replaces the cached schedule. The fetch
    /// itself never fails; a remote error already degraded to the fallback
    /// inside the call layer.
    pub async fn load(&self, api: &TryoutApi) {
        let settings = api.get_settings().await;
        let schedule = TryoutSchedule::from(settings);
        info!(
            "settings loaded: {} ({} north dates, {} south dates)",
            schedule.name,
            schedule.north.len(),
            schedule.south.len()
        );
        *self.schedule.write().unwrap() = schedule;
    }

    pub fn schedule(&self) -> TryoutSchedule {
        self.schedule.read().unwrap().clone()
    }

    pub fn tryout_name(&self) -> String {
        self.schedule.read().unwrap().name.clone()
    }

    pub fn dates_for(&self, location: &str) -> Vec<crate::models::DateInfo> {
        self.schedule.read().unwrap().dates_for(location).to_vec()
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new()
    }
}
