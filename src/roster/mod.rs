//! Roster reconciliation: which players a filter selects, why a filter came
//! back empty, and the staff's working selection for the next group photo.

pub mod position;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{sort_by_pinny, Player};
use crate::remote::TryoutApi;

pub use position::position_matches;

/// The (location, age, position) triple narrowing the player pool.
/// `position: None` means "all positions" (used by the upload path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterFilter {
    pub location: String,
    pub age: String,
    pub position: Option<String>,
}

impl RosterFilter {
    pub fn new(location: impl Into<String>, age: impl Into<String>, position: Option<String>) -> Self {
        Self {
            location: location.into(),
            age: age.into(),
            position: position.filter(|p| !p.trim().is_empty()),
        }
    }
}

/// Why a filter produced no eligible players. Each cause carries enough to
/// build a distinct, actionable message: staff fix data instead of losing
/// players silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyRoster {
    /// Nothing at all for this location + age.
    NoPlayers { location: String, age: String },
    /// Players exist but none match the requested position.
    NoPositionMatch {
        position: String,
        available: Vec<String>,
    },
    /// Position matches exist but every one lacks a usable pinny.
    MissingPinnies {
        position: String,
        matched: usize,
        missing: Vec<String>,
    },
}

impl EmptyRoster {
    pub fn message(&self) -> String {
        match self {
            EmptyRoster::NoPlayers { location, age } => {
                format!("No players found for {location} {age}. Please check your data.")
            }
            EmptyRoster::NoPositionMatch {
                position,
                available,
            } => format!(
                "No {position} players found. Available positions: {}",
                available.join(", ")
            ),
            EmptyRoster::MissingPinnies {
                position,
                matched,
                missing,
            } => format!(
                "Found {matched} {position} players, but {} don't have pinny numbers assigned \
                 ({}). Please assign pinny numbers first.",
                missing.len(),
                missing.join(", ")
            ),
        }
    }
}

impl From<EmptyRoster> for Error {
    fn from(reason: EmptyRoster) -> Self {
        Error::Validation(reason.message())
    }
}

/// Outcome of reconciling a player list against a filter.
#[derive(Debug, Clone)]
pub struct RosterSelection {
    /// Position match + usable pinny, ordered by ascending numeric pinny.
    pub eligible: Vec<Player>,
    /// Position match but no usable pinny; reported, never silently dropped.
    pub missing_pinny: Vec<Player>,
}

/// Partitions `players` into eligible and missing-pinny sets for `filter`,
/// or explains which of the three empty-roster causes applies.
pub fn reconcile(
    players: &[Player],
    filter: &RosterFilter,
) -> std::result::Result<RosterSelection, EmptyRoster> {
    if players.is_empty() {
        return Err(EmptyRoster::NoPlayers {
            location: filter.location.clone(),
            age: filter.age.clone(),
        });
    }

    let matched: Vec<&Player> = match &filter.position {
        Some(position) => players
            .iter()
            .filter(|p| position_matches(position, &p.position))
            .collect(),
        None => players.iter().collect(),
    };

    if matched.is_empty() {
        let position = filter.position.clone().unwrap_or_default();
        let mut available: Vec<String> = players
            .iter()
            .map(|p| p.position.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        available.sort();
        available.dedup();
        return Err(EmptyRoster::NoPositionMatch {
            position,
            available,
        });
    }

    let (with_pinny, without_pinny): (Vec<&Player>, Vec<&Player>) =
        matched.iter().partition(|p| p.has_pinny());

    if with_pinny.is_empty() {
        return Err(EmptyRoster::MissingPinnies {
            position: filter.position.clone().unwrap_or_default(),
            matched: matched.len(),
            missing: without_pinny.iter().map(|p| p.full_name()).collect(),
        });
    }

    let mut eligible: Vec<Player> = with_pinny.into_iter().cloned().collect();
    sort_by_pinny(&mut eligible);
    Ok(RosterSelection {
        eligible,
        missing_pinny: without_pinny.into_iter().cloned().collect(),
    })
}

/// The staff's working subset of an eligible candidate list. One source of
/// truth: every rendered checkbox is a projection of this set.
#[derive(Debug, Clone)]
pub struct SessionSelection {
    candidates: Vec<Player>,
    selected: BTreeSet<String>,
}

impl SessionSelection {
    /// Starts with every candidate selected, matching the checklist default.
    pub fn new(candidates: Vec<Player>) -> Self {
        let selected = candidates.iter().map(|p| p.player_id.clone()).collect();
        Self {
            candidates,
            selected,
        }
    }

    pub fn candidates(&self) -> &[Player] {
        &self.candidates
    }

    pub fn is_selected(&self, player_id: &str) -> bool {
        self.selected.contains(player_id)
    }

    /// Flips one player; unknown ids are ignored. Returns the new state.
    pub fn toggle(&mut self, player_id: &str) -> bool {
        if !self.candidates.iter().any(|p| p.player_id == player_id) {
            return false;
        }
        if self.selected.remove(player_id) {
            false
        } else {
            self.selected.insert(player_id.to_string());
            true
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self
            .candidates
            .iter()
            .map(|p| p.player_id.clone())
            .collect();
    }

    pub fn clear_all(&mut self) {
        self.selected.clear();
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn total(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected players in candidate (pinny) order.
    pub fn selected_players(&self) -> Vec<&Player> {
        self.candidates
            .iter()
            .filter(|p| self.selected.contains(&p.player_id))
            .collect()
    }
}

/// Records a check-in with the remote store, then echoes it into the local
/// snapshot so the card re-renders without waiting for the next poll.
pub async fn check_in_for_date(
    api: &TryoutApi,
    player: &mut Player,
    date_label: &str,
    location: &str,
    age: &str,
) -> Result<DateTime<Utc>> {
    if let Some(at) = player.checked_in_on(date_label) {
        return Ok(at);
    }
    api.check_in_player(player, location, age).await?;
    Ok(player.check_in(date_label, Utc::now()))
}
