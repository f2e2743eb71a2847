//! Group-photo capture, recognition and the staff workflow around them.

pub mod camera;
pub mod capture;
pub mod recognize;
pub mod workflow;

pub use camera::{Camera, CameraConstraints, CameraHandle, Facing};
pub use capture::Capture;
pub use recognize::{detect_pinnies, extract_numbers, OcrResult, Recognizer};
pub use workflow::{GroupPhotoWorkflow, Step};
