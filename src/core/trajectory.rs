//! Frame loop: sample, diff against the last sampled frame, composite.

use image::{GrayImage, RgbImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::compositor::Canvas;
use super::config::TrajectoryConfig;
use super::error::{TrajectoryError, TrajectoryResult};
use super::motion::{self, MotionStats};
use crate::decoder::{self, FrameSource};

/// Read frames between progress events.
pub const PROGRESS_EVERY: u64 = 100;

/// Counts frames read after the seed frame, and how many were sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameCounters {
    pub frames_read: u64,
    pub frames_sampled: u64,
}

impl FrameCounters {
    /// Sampling decision for the frame about to be counted.
    pub fn should_sample(&self, sample_interval: u32) -> bool {
        self.frames_read % u64::from(sample_interval.max(1)) == 0
    }

    pub fn record_read(&mut self) {
        self.frames_read += 1;
    }

    pub fn record_sampled(&mut self) {
        self.frames_sampled += 1;
    }

    fn at_progress_mark(&self) -> bool {
        self.frames_read > 0 && self.frames_read % PROGRESS_EVERY == 0
    }
}

/// Result of running the loop over a source, before anything is written.
#[derive(Debug, Clone)]
pub struct CompositeOutcome {
    pub canvas: Canvas,
    pub counters: FrameCounters,
}

/// Reported after a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub frames_read: u64,
    pub frames_sampled: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryCompositor {
    sample_interval: u32,
    diff_threshold: u8,
    enhance_factor: f64,
}

impl TrajectoryCompositor {
    pub fn new(sample_interval: u32, diff_threshold: u8, enhance_factor: f64) -> Self {
        Self {
            sample_interval,
            diff_threshold,
            enhance_factor,
        }
    }

    pub fn from_config(config: &TrajectoryConfig) -> Self {
        Self::new(
            config.sample_interval,
            config.diff_threshold,
            config.enhance_factor,
        )
    }

    /// Consume `source` to exhaustion and return the finished canvas.
    ///
    /// `origin` only labels the `EmptySource` error.
    pub fn run<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        origin: &Path,
    ) -> TrajectoryResult<CompositeOutcome> {
        let first = source.next_frame()?.ok_or_else(|| TrajectoryError::EmptySource {
            path: origin.to_path_buf(),
        })?;

        let mut previous_gray = motion::to_grayscale(&first);
        let mut canvas = Canvas::new(&first);
        drop(first);
        let mut counters = FrameCounters::default();

        while let Some(frame) = source.next_frame()? {
            motion::ensure_same_size(canvas.dimensions(), frame.dimensions())?;
            if counters.should_sample(self.sample_interval) {
                previous_gray = self.process_sampled(&mut canvas, &frame, &previous_gray)?;
                counters.record_sampled();
            }

            counters.record_read();
            if counters.at_progress_mark() {
                info!(
                    frames_read = counters.frames_read,
                    frames_sampled = counters.frames_sampled,
                    "Compositing progress"
                );
            }
        }

        Ok(CompositeOutcome { canvas, counters })
    }

    /// Returns this frame's grayscale, the next diff reference.
    fn process_sampled(
        &self,
        canvas: &mut Canvas,
        frame: &RgbImage,
        previous_gray: &GrayImage,
    ) -> TrajectoryResult<GrayImage> {
        let gray = motion::to_grayscale(frame);
        let mask = motion::diff_mask(&gray, previous_gray, self.diff_threshold)?;

        let stats = MotionStats::from_mask(&mask);
        debug!(
            moving_pixels = stats.moving_pixels,
            moving_ratio = stats.moving_ratio(),
            "Sampled frame"
        );

        canvas.apply(frame, &mask, self.enhance_factor)?;
        Ok(gray)
    }
}

/// Open the input, composite every sampled frame, write the result.
///
/// Nothing is written when opening fails or the input has no frames. The
/// frame source is dropped (and its handle released) before the output is
/// encoded and on every error path.
pub fn build_trajectory_image(config: &TrajectoryConfig) -> TrajectoryResult<TrajectorySummary> {
    config.validate()?;

    info!(
        input = %config.input.display(),
        sample_interval = config.sample_interval,
        diff_threshold = config.diff_threshold,
        enhance_factor = config.enhance_factor,
        "Building trajectory image"
    );

    let outcome = {
        let mut source = decoder::open_source(&config.input)?;
        TrajectoryCompositor::from_config(config).run(&mut source, &config.input)?
    };

    outcome.canvas.save(&config.output)?;

    let summary = TrajectorySummary {
        input: config.input.clone(),
        output: config.output.clone(),
        width: outcome.canvas.width(),
        height: outcome.canvas.height(),
        frames_read: outcome.counters.frames_read,
        frames_sampled: outcome.counters.frames_sampled,
    };

    info!(
        output = %summary.output.display(),
        frames_read = summary.frames_read,
        frames_sampled = summary.frames_sampled,
        "Trajectory image saved"
    );
    Ok(summary)
}
