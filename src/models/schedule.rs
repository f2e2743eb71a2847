use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::player::Player;

/// One dated session from the settings tab, e.g. `{ "North Tryout", "1/20" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInfo {
    pub description: String,
    /// `M/D` label, no padding. Used as the check-in map key.
    pub date: String,
}

impl DateInfo {
    pub fn new(description: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            date: date.into(),
        }
    }
}

/// Raw settings payload from the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryoutSettings {
    #[serde(default)]
    pub tryout_name: String,
    #[serde(default)]
    pub tryout_dates: Vec<DateInfo>,
}

impl TryoutSettings {
    /// Built-in schedule used when the settings call fails. Matches the
    /// deployment defaults so the roster screen still renders chips.
    pub fn fallback() -> Self {
        Self {
            tryout_name: "MGA Volleyball Tryouts".to_string(),
            tryout_dates: vec![
                DateInfo::new("North Tryout", "1/20"),
                DateInfo::new("North Callback", "1/22"),
                DateInfo::new("North Makeup", "1/24"),
                DateInfo::new("South Tryout", "1/20"),
                DateInfo::new("South Callback", "1/22"),
                DateInfo::new("South Makeup", "1/24"),
            ],
        }
    }
}

/// Settings partitioned per location. Dates whose description names a
/// location go to that location's timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryoutSchedule {
    pub name: String,
    pub north: Vec<DateInfo>,
    pub south: Vec<DateInfo>,
}

impl From<TryoutSettings> for TryoutSchedule {
    fn from(settings: TryoutSettings) -> Self {
        let north = settings
            .tryout_dates
            .iter()
            .filter(|d| d.description.to_lowercase().contains("north"))
            .cloned()
            .collect();
        let south = settings
            .tryout_dates
            .iter()
            .filter(|d| d.description.to_lowercase().contains("south"))
            .cloned()
            .collect();
        Self {
            name: if settings.tryout_name.is_empty() {
                TryoutSettings::fallback().tryout_name
            } else {
                settings.tryout_name
            },
            north,
            south,
        }
    }
}

impl TryoutSchedule {
    pub fn dates_for(&self, location: &str) -> &[DateInfo] {
        match location {
            "NORTH" => &self.north,
            "SOUTH" => &self.south,
            _ => &[],
        }
    }
}

impl Default for TryoutSchedule {
    fn default() -> Self {
        TryoutSettings::fallback().into()
    }
}

/// Today's `M/D` label in local time; the key the remote store uses.
pub fn current_date_label() -> String {
    let today = Local::now().date_naive();
    date_label(today)
}

pub fn date_label(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

fn parse_date_label(label: &str, year: i32) -> Option<NaiveDate> {
    let (month, day) = label.split_once('/')?;
    NaiveDate::from_ymd_opt(year, month.trim().parse().ok()?, day.trim().parse().ok()?)
}

/// Whether a `M/D` label falls strictly before `today` (same-year semantics,
/// like the roster chips). Unparsable labels are never "past".
pub fn is_past_label(label: &str, today: NaiveDate) -> bool {
    parse_date_label(label, today.year()).is_some_and(|date| date < today)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionBucket {
    None,
    Partial,
    Complete,
}

/// Per-player progress over one location's scheduled dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatus {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
    pub bucket: CompletionBucket,
}

pub fn completion_for(player: &Player, dates: &[DateInfo]) -> CompletionStatus {
    let completed = dates
        .iter()
        .filter(|d| player.checked_in_on(&d.date).is_some())
        .count();
    let total = dates.len();
    let percentage = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };
    let bucket = match percentage {
        100 => CompletionBucket::Complete,
        0 => CompletionBucket::None,
        _ => CompletionBucket::Partial,
    };
    CompletionStatus {
        completed,
        total,
        percentage,
        bucket,
    }
}
