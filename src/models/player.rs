use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sort key for pinnies that can't be parsed as numbers ("N/A", blanks,
/// free-text). They sort after every real number.
const UNNUMBERED: u32 = u32::MAX;

/// A tryout participant as served by the remote roster.
///
/// The client holds a read-through snapshot; the remote store is the only
/// writer apart from the local check-in echo in [`Player::check_in`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(rename = "playerID")]
    pub player_id: String,
    pub first: String,
    pub last: String,
    /// Assigned jersey number. Sparse: may be empty or an "N/A" placeholder.
    #[serde(default)]
    pub pinny: String,
    /// Free-text position as entered by registration staff.
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<String>,
    #[serde(default)]
    pub has_selfie: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selfie_url: Option<String>,
    /// Check-in timestamps keyed by `M/D` date label. Grows monotonically.
    #[serde(default)]
    pub checkin_dates: HashMap<String, DateTime<Utc>>,
}

impl Player {
    /// True when the pinny is usable as a photo identifier: non-empty and not
    /// the "N/A" placeholder.
    pub fn has_pinny(&self) -> bool {
        let pinny = self.pinny.trim();
        !pinny.is_empty() && pinny != "N/A"
    }

    /// Ascending numeric pinny order; unparsable pinnies sort last.
    pub fn pinny_sort_key(&self) -> u32 {
        self.pinny.trim().parse().unwrap_or(UNNUMBERED)
    }

    /// "Last, First" as used on roster cards.
    pub fn last_first(&self) -> String {
        format!("{}, {}", self.last, self.first)
    }

    /// "First Last" as used on photo chips and attendance records.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    pub fn checked_in_on(&self, date_label: &str) -> Option<DateTime<Utc>> {
        self.checkin_dates.get(date_label).copied()
    }

    /// Records a check-in for a date. First write wins; the map never shrinks.
    pub fn check_in(&mut self, date_label: &str, at: DateTime<Utc>) -> DateTime<Utc> {
        *self
            .checkin_dates
            .entry(date_label.to_string())
            .or_insert(at)
    }
}

/// Total order over pinnies: ascending numeric, unnumbered last, ties broken
/// by the raw pinny string so the order is stable.
pub fn sort_by_pinny(players: &mut [Player]) {
    players.sort_by(|a, b| {
        (a.pinny_sort_key(), a.pinny.as_str()).cmp(&(b.pinny_sort_key(), b.pinny.as_str()))
    });
}
