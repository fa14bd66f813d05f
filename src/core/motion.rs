//! Motion extraction: grayscale, frame differencing and masked pixel ops.
//!
//! All images here are tightly packed 8-bit buffers of identical size.
//! The mask is single channel with values 0 (static) or 255 (moving).

use image::{GrayImage, RgbImage};

use super::error::{TrajectoryError, TrajectoryResult};

pub const MASK_MOVING: u8 = 255;
pub const MASK_STATIC: u8 = 0;

/// Constant added to every channel after scaling.
pub const ENHANCE_OFFSET: f64 = 0.1;

// 14-bit fixed point luma weights, sum to 1 << 14.
const R2Y: u32 = 4899;
const G2Y: u32 = 9617;
const B2Y: u32 = 1868;
const GRAY_SHIFT: u32 = 14;

/// Per-frame motion summary, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStats {
    pub moving_pixels: u64,
    pub total_pixels: u64,
}

impl MotionStats {
    pub fn from_mask(mask: &GrayImage) -> Self {
        let moving_pixels = mask.as_raw().iter().filter(|&&m| m == MASK_MOVING).count() as u64;
        Self {
            moving_pixels,
            total_pixels: mask.as_raw().len() as u64,
        }
    }

    pub fn moving_ratio(&self) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        self.moving_pixels as f64 / self.total_pixels as f64
    }
}

pub fn to_grayscale(frame: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(frame.width(), frame.height());
    for (dst, rgb) in gray.iter_mut().zip(frame.as_raw().chunks_exact(3)) {
        let y = rgb[0] as u32 * R2Y
            + rgb[1] as u32 * G2Y
            + rgb[2] as u32 * B2Y
            + (1 << (GRAY_SHIFT - 1));
        *dst = (y >> GRAY_SHIFT) as u8;
    }
    gray
}

/// Binary mask: moving where `|current - previous| > threshold`.
pub fn diff_mask(
    current: &GrayImage,
    previous: &GrayImage,
    threshold: u8,
) -> TrajectoryResult<GrayImage> {
    ensure_same_size(current.dimensions(), previous.dimensions())?;

    let mut mask = GrayImage::new(current.width(), current.height());
    for ((dst, &a), &b) in mask
        .iter_mut()
        .zip(current.as_raw())
        .zip(previous.as_raw())
    {
        *dst = if a.abs_diff(b) > threshold {
            MASK_MOVING
        } else {
            MASK_STATIC
        };
    }
    Ok(mask)
}

/// Color pixels of `frame` where the mask is moving, zero elsewhere.
pub fn extract_motion(frame: &RgbImage, mask: &GrayImage) -> TrajectoryResult<RgbImage> {
    masked_copy(frame, mask, MASK_MOVING)
}

/// Canvas pixels where the mask is static, zero elsewhere.
pub fn static_background(canvas: &RgbImage, mask: &GrayImage) -> TrajectoryResult<RgbImage> {
    masked_copy(canvas, mask, MASK_STATIC)
}

/// Saturating affine transform `v * factor + 0.1` on every channel.
///
/// Zero channels stay zero: `round(0.1)` is 0.
pub fn enhance(image: &mut RgbImage, factor: f64) {
    for v in image.iter_mut() {
        *v = enhance_channel(*v, factor);
    }
}

pub fn enhance_channel(value: u8, factor: f64) -> u8 {
    let scaled = (value as f64 * factor + ENHANCE_OFFSET).round_ties_even();
    scaled.clamp(0.0, 255.0) as u8
}

fn masked_copy(image: &RgbImage, mask: &GrayImage, keep: u8) -> TrajectoryResult<RgbImage> {
    ensure_same_size(mask.dimensions(), image.dimensions())?;

    let mut out = RgbImage::new(image.width(), image.height());
    for ((dst, src), &m) in out
        .chunks_exact_mut(3)
        .zip(image.as_raw().chunks_exact(3))
        .zip(mask.as_raw())
    {
        if m == keep {
            dst.copy_from_slice(src);
        }
    }
    Ok(out)
}

pub(crate) fn ensure_same_size(expected: (u32, u32), actual: (u32, u32)) -> TrajectoryResult<()> {
    if expected != actual {
        return Err(TrajectoryError::FrameSizeMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            width: actual.0,
            height: actual.1,
        });
    }
    Ok(())
}
