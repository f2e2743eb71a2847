//! Group-photo session state machine.
//!
//! One run walks filters -> checklist -> camera -> confirm -> results. Every
//! step owns its legal operations; calling out of step is a validation error,
//! never a silent state change. Recognition only assists: the staff's
//! confirmation set is what gets persisted, and a failed recognition pass
//! degrades to "confirm everyone" so attendance is never under-counted by a
//! blurry frame.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use log::warn;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{sort_by_pinny, Player};
use crate::remote::{GroupPhotoMetadata, PhotoPlayerRef, SavedPhoto, SortOrder, TryoutApi};
use crate::roster::{reconcile, RosterFilter, SessionSelection};

use super::camera::{Camera, CameraConstraints, CameraHandle};
use super::capture::Capture;
use super::recognize::{detect_pinnies, Recognizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Filters,
    Checklist,
    Camera,
    Confirm,
    Results,
}

pub struct GroupPhotoWorkflow {
    api: TryoutApi,
    camera: Arc<dyn Camera>,
    recognizer: Arc<dyn Recognizer>,

    run_id: Uuid,
    step: Step,
    filter: Option<RosterFilter>,
    selection: Option<SessionSelection>,
    missing_pinny: Vec<Player>,

    /// Players expected in the current frame, pinny order.
    expected: Vec<Player>,
    camera_handle: Option<Box<dyn CameraHandle>>,
    capture: Option<Capture>,
    /// Pinnies recognition found among the expected ones.
    detected: BTreeSet<String>,
    /// Player ids staff will persist with this photo.
    confirmed: BTreeSet<String>,
    /// Ids already saved in earlier photos of this run.
    photographed: BTreeSet<String>,
    photo_number: u32,
}

impl GroupPhotoWorkflow {
    pub fn new(api: TryoutApi, camera: Arc<dyn Camera>, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            api,
            camera,
            recognizer,
            run_id: Uuid::new_v4(),
            step: Step::Filters,
            filter: None,
            selection: None,
            missing_pinny: Vec::new(),
            expected: Vec::new(),
            camera_handle: None,
            capture: None,
            detected: BTreeSet::new(),
            confirmed: BTreeSet::new(),
            photographed: BTreeSet::new(),
            photo_number: 1,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selection(&self) -> Option<&SessionSelection> {
        self.selection.as_ref()
    }

    pub fn missing_pinny(&self) -> &[Player] {
        &self.missing_pinny
    }

    pub fn capture(&self) -> Option<&Capture> {
        self.capture.as_ref()
    }

    pub fn detected(&self) -> &BTreeSet<String> {
        &self.detected
    }

    pub fn photo_number(&self) -> u32 {
        self.photo_number
    }

    pub fn is_confirmed(&self, player_id: &str) -> bool {
        self.confirmed.contains(player_id)
    }

    /// Fetches the roster for the chosen filters and opens the checklist.
    /// All three fields are required for a group photo.
    pub async fn apply_filters(&mut self, location: &str, age: &str, position: &str) -> Result<()> {
        self.require_step(Step::Filters, "apply filters")?;
        if location.trim().is_empty() || age.trim().is_empty() || position.trim().is_empty() {
            return Err(Error::Validation(
                "location, age group and position are all required".to_string(),
            ));
        }

        let filter = RosterFilter::new(location, age, Some(position.to_string()));
        let page = self
            .api
            .get_players(&filter.location, &filter.age, SortOrder::Pinny)
            .await?;
        let roster = reconcile(&page.players, &filter)?;

        self.filter = Some(filter);
        self.selection = Some(SessionSelection::new(roster.eligible));
        self.missing_pinny = roster.missing_pinny;
        self.step = Step::Checklist;
        Ok(())
    }

    pub fn toggle_player(&mut self, player_id: &str) -> Result<bool> {
        self.require_step(Step::Checklist, "toggle a player")?;
        Ok(self.require_selection_mut()?.toggle(player_id))
    }

    pub fn select_all(&mut self) -> Result<()> {
        self.require_step(Step::Checklist, "select all")?;
        self.require_selection_mut()?.select_all();
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.require_step(Step::Checklist, "clear all")?;
        self.require_selection_mut()?.clear_all();
        Ok(())
    }

    /// Locks the checklist and moves to the camera. The expected lineup is
    /// snapshotted here so checkbox churn can't race the recognition pass.
    pub fn begin_capture(&mut self) -> Result<()> {
        self.require_step(Step::Checklist, "start the camera")?;
        let selection = self.require_selection()?;
        if selection.is_empty() {
            return Err(Error::Validation(
                "select at least one player for the photo".to_string(),
            ));
        }
        let mut expected: Vec<Player> =
            selection.selected_players().into_iter().cloned().collect();
        sort_by_pinny(&mut expected);
        self.expected = expected;
        self.step = Step::Camera;
        Ok(())
    }

    pub fn start_camera(&mut self) -> Result<()> {
        self.require_step(Step::Camera, "open the camera")?;
        // Release any stream from an earlier photo before acquiring again.
        self.release_camera();
        let handle = self.camera.acquire(CameraConstraints::group_photo())?;
        self.camera_handle = Some(handle);
        Ok(())
    }

    /// Grabs a frame; a retake simply replaces the previous capture.
    pub fn take_photo(&mut self) -> Result<()> {
        self.require_step(Step::Camera, "take a photo")?;
        let handle = self
            .camera_handle
            .as_mut()
            .ok_or_else(|| Error::Camera("camera is not running".to_string()))?;
        let frame = handle.capture_frame()?;
        self.capture = Some(Capture::from_frame(&frame, Utc::now())?);
        self.detected.clear();
        self.confirmed.clear();
        Ok(())
    }

    pub fn retake(&mut self) -> Result<()> {
        self.require_step(Step::Camera, "retake")?;
        self.capture = None;
        self.detected.clear();
        self.confirmed.clear();
        Ok(())
    }

    /// Runs recognition over the capture and opens the confirm step.
    ///
    /// Success pre-confirms exactly the expected players whose pinny was
    /// detected. Failure pre-confirms everyone expected instead: staff
    /// looking at a real lineup should untick absentees, not rebuild the
    /// list because a model stumbled.
    pub async fn analyze(&mut self) -> Result<()> {
        self.require_step(Step::Camera, "analyze the photo")?;
        let capture = self
            .capture
            .as_ref()
            .ok_or_else(|| Error::Validation("take a photo before analyzing".to_string()))?;

        let recognizer = Arc::clone(&self.recognizer);
        let jpeg = capture.jpeg_bytes().to_vec();
        let outcome = tokio::task::spawn_blocking(move || recognizer.recognize(&jpeg)).await;

        let expected_pinnies: BTreeSet<String> =
            self.expected.iter().map(|p| p.pinny.clone()).collect();
        match outcome {
            Ok(Ok(result)) => {
                self.detected = detect_pinnies(&result.text, &expected_pinnies);
                self.confirmed = self
                    .expected
                    .iter()
                    .filter(|p| self.detected.contains(&p.pinny))
                    .map(|p| p.player_id.clone())
                    .collect();
            }
            Ok(Err(err)) => {
                warn!("pinny recognition failed, confirming full lineup: {err}");
                self.confirm_all_expected();
            }
            Err(err) => {
                warn!("recognition task panicked, confirming full lineup: {err}");
                self.confirm_all_expected();
            }
        }
        self.step = Step::Confirm;
        Ok(())
    }

    fn confirm_all_expected(&mut self) {
        self.detected.clear();
        self.confirmed = self.expected.iter().map(|p| p.player_id.clone()).collect();
    }

    /// Flips one expected player in the confirmation set. Ids outside the
    /// expected lineup are rejected, so the persisted set can never grow
    /// beyond the checklist selection.
    pub fn toggle_confirmed(&mut self, player_id: &str) -> Result<bool> {
        self.require_step(Step::Confirm, "adjust confirmations")?;
        if !self.expected.iter().any(|p| p.player_id == player_id) {
            return Err(Error::Validation(format!(
                "player {player_id} is not part of this photo"
            )));
        }
        if self.confirmed.remove(player_id) {
            Ok(false)
        } else {
            self.confirmed.insert(player_id.to_string());
            Ok(true)
        }
    }

    pub fn back_to_camera(&mut self) -> Result<()> {
        self.require_step(Step::Confirm, "go back to the camera")?;
        self.capture = None;
        self.detected.clear();
        self.confirmed.clear();
        self.step = Step::Camera;
        Ok(())
    }

    /// Persists the photo with the confirmed lineup. On failure the workflow
    /// stays on the confirm step with everything intact, ready for a retry.
    pub async fn save(&mut self) -> Result<SavedPhoto> {
        self.require_step(Step::Confirm, "save the photo")?;
        if self.confirmed.is_empty() {
            return Err(Error::Validation(
                "confirm at least one player before saving".to_string(),
            ));
        }
        let capture = self
            .capture
            .as_ref()
            .ok_or_else(|| Error::Validation("no photo to save".to_string()))?;
        let filter = self
            .filter
            .as_ref()
            .ok_or_else(|| Error::Validation("no active filter".to_string()))?;

        let mut players: Vec<&Player> = self
            .expected
            .iter()
            .filter(|p| self.confirmed.contains(&p.player_id))
            .collect();
        players.sort_by_key(|p| (p.pinny_sort_key(), p.pinny.clone()));

        let metadata = GroupPhotoMetadata {
            kind: "group".to_string(),
            location: filter.location.clone(),
            age: filter.age.clone(),
            position: filter.position.clone().unwrap_or_default(),
            players: players
                .iter()
                .map(|p| PhotoPlayerRef {
                    player_id: p.player_id.clone(),
                    pinny: p.pinny.clone(),
                    name: p.full_name(),
                })
                .collect(),
            photo_number: self.photo_number,
            timestamp: capture.taken_at,
            source: None,
        };

        let saved = self
            .api
            .save_group_photo(&capture.to_data_url(), &metadata)
            .await?;

        self.photographed.extend(self.confirmed.iter().cloned());
        self.step = Step::Results;
        Ok(saved)
    }

    /// Selected players not yet saved in any photo of this run, pinny order.
    /// Checklist deselections stay out: the pool narrows from the staff's
    /// selection, never the full eligible roster.
    pub fn remaining_players(&self) -> Vec<&Player> {
        match &self.selection {
            Some(selection) => selection
                .selected_players()
                .into_iter()
                .filter(|p| !self.photographed.contains(&p.player_id))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn can_take_another(&self) -> bool {
        self.step == Step::Results && !self.remaining_players().is_empty()
    }

    /// Starts the next photo of the same run, pre-selecting everyone still
    /// unphotographed.
    pub fn take_another(&mut self) -> Result<()> {
        self.require_step(Step::Results, "take another photo")?;
        let remaining: Vec<Player> = self.remaining_players().into_iter().cloned().collect();
        if remaining.is_empty() {
            return Err(Error::Validation(
                "everyone in this group has been photographed".to_string(),
            ));
        }
        self.selection = Some(SessionSelection::new(remaining.clone()));
        self.expected = remaining;
        self.capture = None;
        self.detected.clear();
        self.confirmed.clear();
        self.photo_number += 1;
        self.step = Step::Camera;
        Ok(())
    }

    /// Ends the run: camera released, counters and sets back to a fresh run.
    pub fn finish(&mut self) {
        self.release_camera();
        self.run_id = Uuid::new_v4();
        self.step = Step::Filters;
        self.filter = None;
        self.selection = None;
        self.missing_pinny.clear();
        self.expected.clear();
        self.capture = None;
        self.detected.clear();
        self.confirmed.clear();
        self.photographed.clear();
        self.photo_number = 1;
    }

    fn release_camera(&mut self) {
        if let Some(mut handle) = self.camera_handle.take() {
            handle.release();
        }
    }

    fn require_step(&self, step: Step, operation: &str) -> Result<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "cannot {operation} at the {:?} step",
                self.step
            )))
        }
    }

    fn require_selection(&self) -> Result<&SessionSelection> {
        self.selection
            .as_ref()
            .ok_or_else(|| Error::Validation("no roster loaded".to_string()))
    }

    fn require_selection_mut(&mut self) -> Result<&mut SessionSelection> {
        self.selection
            .as_mut()
            .ok_or_else(|| Error::Validation("no roster loaded".to_string()))
    }
}

impl Drop for GroupPhotoWorkflow {
    fn drop(&mut self) {
        self.release_camera();
    }
}
