//! The accumulating output image.

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, GrayImage, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use super::error::{TrajectoryError, TrajectoryResult};
use super::motion::{self, ensure_same_size};

/// JPEG quality for `.jpg`/`.jpeg` output, matching OpenCV's `imwrite`.
pub const JPEG_QUALITY: u8 = 95;

/// Seeded from the first frame; moving regions are overwritten in place
/// as sampled frames arrive, everything else keeps its previous value.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(first_frame: &RgbImage) -> Self {
        Self {
            image: first_frame.clone(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Overlay the enhanced moving pixels of `frame` selected by `mask`.
    pub fn apply(&mut self, frame: &RgbImage, mask: &GrayImage, enhance_factor: f64) -> TrajectoryResult<()> {
        ensure_same_size(self.dimensions(), frame.dimensions())?;

        let mut moving = motion::extract_motion(frame, mask)?;
        motion::enhance(&mut moving, enhance_factor);
        let background = motion::static_background(&self.image, mask)?;
        self.composite(&background, &moving)
    }

    /// Replace the canvas with `background + motion`, saturating per channel.
    ///
    /// The operands are zero on disjoint pixel sets, so the sum acts as a
    /// masked overwrite.
    pub fn composite(&mut self, background: &RgbImage, motion: &RgbImage) -> TrajectoryResult<()> {
        ensure_same_size(self.dimensions(), background.dimensions())?;
        ensure_same_size(self.dimensions(), motion.dimensions())?;

        for ((dst, &b), &m) in self
            .image
            .iter_mut()
            .zip(background.as_raw())
            .zip(motion.as_raw())
        {
            *dst = b.saturating_add(m);
        }
        Ok(())
    }

    /// Encode to `path`; the extension selects the format.
    pub fn save(&self, path: &Path) -> TrajectoryResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                return Err(TrajectoryError::encode(
                    path,
                    format!("directory {} does not exist", parent.display()),
                ));
            }
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => self.save_jpeg(path)?,
            _ => self
                .image
                .save(path)
                .map_err(|e| TrajectoryError::encode(path, e.to_string()))?,
        }

        debug!(path = %path.display(), width = self.width(), height = self.height(), "Canvas encoded");
        Ok(())
    }

    fn save_jpeg(&self, path: &Path) -> TrajectoryResult<()> {
        let encode_err = |msg: String| TrajectoryError::encode(path, msg);

        let file = File::create(path).map_err(|e| encode_err(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
            .encode(
                self.image.as_raw(),
                self.width(),
                self.height(),
                ColorType::Rgb8,
            )
            .map_err(|e| encode_err(e.to_string()))?;
        writer.flush().map_err(|e| encode_err(e.to_string()))
    }
}
