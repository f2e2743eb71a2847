use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Player, TryoutSettings};

use super::client::RemoteClient;

/// Dashboard totals across both locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub expected: u32,
    pub checked_in: u32,
    #[serde(default)]
    pub checkin_percent: u32,
    #[serde(default)]
    pub selfies: u32,
    #[serde(default)]
    pub missing: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroupStats {
    pub expected: u32,
    pub checked_in: u32,
    #[serde(default)]
    pub checkin_percent: u32,
    #[serde(default)]
    pub selfies: u32,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStats {
    pub total: u32,
    #[serde(default)]
    pub ages: HashMap<String, AgeGroupStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub totals: DashboardTotals,
    #[serde(default)]
    pub by_location: HashMap<String, LocationStats>,
}

/// One location+age session the roster screen can switch to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub location: String,
    pub age: String,
    pub label: String,
    #[serde(default)]
    pub player_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPage {
    #[serde(default)]
    pub total_players: u32,
    #[serde(default)]
    pub with_photos: u32,
    pub players: Vec<Player>,
}

/// A stored group-photo record as listed by the gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPhotoRecord {
    pub location: String,
    pub age: String,
    #[serde(default)]
    pub position: String,
    /// Comma-separated display names, as stored by the service.
    #[serde(default)]
    pub player_names: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub display_url: Option<String>,
    #[serde(default)]
    pub formatted_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPhoto {
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One confirmed player inside an attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPlayerRef {
    #[serde(rename = "playerID")]
    pub player_id: String,
    pub pinny: String,
    pub name: String,
}

/// Attendance record persisted alongside the encoded photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPhotoMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub age: String,
    pub position: String,
    pub players: Vec<PhotoPlayerRef>,
    pub photo_number: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Name,
    Pinny,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Name => "name",
            SortOrder::Pinny => "pinny",
        }
    }
}

/// Typed surface over the remote actions. Reads go through the retry wrapper;
/// writes are issued once so a flaky network can't mint duplicate records —
/// the user-facing retry affordance covers those.
#[derive(Clone)]
pub struct TryoutApi {
    client: RemoteClient,
}

impl TryoutApi {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RemoteClient {
        &self.client
    }

    pub async fn get_dashboard(&self) -> Result<DashboardData> {
        let value = self.client.call_with_retry("getDashboard", &[]).await?;
        decode("getDashboard", value)
    }

    pub async fn get_players(
        &self,
        location: &str,
        age: &str,
        sort: SortOrder,
    ) -> Result<PlayerPage> {
        let params = vec![
            ("location".to_string(), location.to_string()),
            ("age".to_string(), age.to_string()),
            ("sort".to_string(), sort.as_str().to_string()),
        ];
        let value = self.client.call_with_retry("getPlayers", &params).await?;
        decode("getPlayers", value)
    }

    pub async fn get_available_tabs(&self) -> Result<Vec<TabInfo>> {
        let value = self.client.call_with_retry("getAvailableTabs", &[]).await?;
        decode("getAvailableTabs", value)
    }

    pub async fn check_in_player(&self, player: &Player, location: &str, age: &str) -> Result<()> {
        let params = vec![
            ("playerID".to_string(), player.player_id.clone()),
            ("firstName".to_string(), player.first.clone()),
            ("lastName".to_string(), player.last.clone()),
            ("location".to_string(), location.to_string()),
            ("age".to_string(), age.to_string()),
        ];
        self.client.call("checkInPlayer", &params).await?;
        Ok(())
    }

    /// Settings are non-critical: a failed fetch logs and falls back to the
    /// built-in schedule so the roster screen keeps rendering.
    pub async fn get_settings(&self) -> TryoutSettings {
        match self.client.call_with_retry("getSettings", &[]).await {
            Ok(value) => decode("getSettings", value).unwrap_or_else(|err| {
                warn!("unusable settings payload: {err}");
                TryoutSettings::fallback()
            }),
            Err(err) => {
                warn!("settings fetch failed, using fallback: {err}");
                TryoutSettings::fallback()
            }
        }
    }

    pub async fn get_group_photos(
        &self,
        location: Option<&str>,
        age: Option<&str>,
        position: Option<&str>,
    ) -> Result<Vec<GroupPhotoRecord>> {
        let mut params = Vec::new();
        if let Some(location) = location {
            params.push(("location".to_string(), location.to_string()));
        }
        if let Some(age) = age {
            params.push(("age".to_string(), age.to_string()));
        }
        if let Some(position) = position {
            params.push(("position".to_string(), position.to_string()));
        }
        let value = self.client.call_with_retry("getGroupPhotos", &params).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        decode("getGroupPhotos", value)
    }

    /// Persists one attendance record plus the encoded photo. Issued once;
    /// see the duplicate-record note on [`TryoutApi`].
    pub async fn save_group_photo(
        &self,
        photo_data: &str,
        metadata: &GroupPhotoMetadata,
    ) -> Result<SavedPhoto> {
        let params = vec![
            ("photoData".to_string(), photo_data.to_string()),
            (
                "metadata".to_string(),
                serde_json::to_string(metadata)
                    .map_err(|err| Error::Validation(format!("unencodable metadata: {err}")))?,
            ),
        ];
        let value = self.client.call("saveGroupPhoto", &params).await?;
        decode("saveGroupPhoto", value)
    }
}

fn decode<T: DeserializeOwned>(action: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|err| Error::Transport(format!("unexpected {action} payload: {err}")))
}
