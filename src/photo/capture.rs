//! Frame encoding: raw camera frame to a bounded JPEG plus a data URL for
//! upload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;

use crate::error::{Error, Result};
use crate::remote::config::{MAX_PHOTO_BYTES, PHOTO_JPEG_QUALITY};

/// One captured, re-encoded photo.
#[derive(Debug, Clone)]
pub struct Capture {
    pub taken_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    jpeg: Vec<u8>,
}

impl Capture {
    /// Decodes a camera frame and re-encodes it as a quality-bounded JPEG.
    /// Frames that still exceed the upload cap after re-encoding are
    /// rejected rather than silently degraded further.
    pub fn from_frame(frame: &[u8], taken_at: DateTime<Utc>) -> Result<Self> {
        let decoded = image::load_from_memory(frame)
            .map_err(|err| Error::Camera(format!("undecodable frame: {err}")))?;
        let rgb = decoded.to_rgb8();

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, PHOTO_JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(|err| Error::Camera(format!("jpeg encode failed: {err}")))?;

        if jpeg.len() > MAX_PHOTO_BYTES {
            return Err(Error::Camera(format!(
                "photo is {} bytes, over the {} byte upload limit",
                jpeg.len(),
                MAX_PHOTO_BYTES
            )));
        }

        Ok(Self {
            taken_at,
            width: rgb.width(),
            height: rgb.height(),
            jpeg,
        })
    }

    pub fn jpeg_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    /// `data:image/jpeg;base64,...` form expected by the save action.
    pub fn to_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", STANDARD.encode(&self.jpeg))
    }
}
