//! Staff-side core for running volleyball tryout check-in: remote calls to
//! the spreadsheet-backed service, roster reconciliation, the group-photo
//! workflow with pinny recognition, and background dashboard refresh.

pub mod auth;
pub mod error;
pub mod models;
pub mod photo;
pub mod refresh;
pub mod remote;
pub mod roster;
pub mod settings;
mod utils;

pub use auth::StaffSession;
pub use error::{Error, Result};
pub use refresh::RefreshController;
pub use remote::{RemoteClient, RemoteConfig, TryoutApi};
pub use settings::SettingsCache;

/// Reads RUST_LOG, defaults to info.
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

/// Everything a frontend needs, wired together once at startup.
pub struct TryoutDesk {
    pub api: TryoutApi,
    pub auth: StaffSession,
    pub settings: SettingsCache,
    pub refresh: RefreshController,
}

impl TryoutDesk {
    pub fn new(config: RemoteConfig, staff_password: impl Into<String>) -> Self {
        let api = TryoutApi::new(RemoteClient::with_http(config));
        Self {
            api,
            auth: StaffSession::new(staff_password),
            settings: SettingsCache::new(),
            refresh: RefreshController::new(),
        }
    }

    /// Loads settings and starts the dashboard poller.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.settings.load(&self.api).await;
        self.refresh.start(self.api.clone())?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.refresh.stop().await
    }
}
