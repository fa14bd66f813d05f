//! Build a single still image that traces motion through a video.
//!
//! Frames are read in order; every Nth frame is differenced against the
//! previously sampled one, and the pixels that changed are copied, with an
//! intensity gain, onto a canvas seeded from the first frame. The result is
//! one image in which the moving subject appears along its whole path.

pub mod core;
pub mod decoder;
pub mod logging;

pub use crate::core::compositor::Canvas;
pub use crate::core::config::TrajectoryConfig;
pub use crate::core::error::{TrajectoryError, TrajectoryResult};
pub use crate::core::trajectory::{
    build_trajectory_image, CompositeOutcome, FrameCounters, TrajectoryCompositor,
    TrajectorySummary,
};
pub use crate::decoder::{open_source, FrameSource, ImageSequence};
