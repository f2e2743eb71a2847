//! Camera access behind a trait so the workflow can run headless in tests.

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Front camera, for selfies.
    User,
    /// Rear camera, for group shots across a gym.
    Environment,
}

/// Requested capture geometry. The device may hand back something close
/// rather than exact; these are preferences, not guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: Facing,
}

impl CameraConstraints {
    /// Wide landscape frame so a full lineup fits.
    pub fn group_photo() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing: Facing::Environment,
        }
    }
}

/// A camera device. Acquiring returns a live handle; errors surface as
/// [`crate::error::Error::Camera`].
pub trait Camera: Send + Sync + 'static {
    fn acquire(&self, constraints: CameraConstraints) -> Result<Box<dyn CameraHandle>>;
}

/// A live camera stream. Dropping without [`CameraHandle::release`] is legal
/// but keeps the device indicator lit on some platforms, so the workflow
/// releases explicitly on every exit path.
pub trait CameraHandle: Send {
    /// Grabs the current frame as an encoded image (any format the `image`
    /// crate can decode).
    fn capture_frame(&mut self) -> Result<Vec<u8>>;

    fn release(&mut self);
}
