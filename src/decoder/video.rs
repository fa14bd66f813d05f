use image::RgbImage;
use opencv::{core, imgproc, prelude::*, videoio};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::FrameSource;
use crate::core::error::{TrajectoryError, TrajectoryResult};

/// Stream properties as reported by the backend. Frame count is a
/// container estimate and may be zero or wrong for some codecs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VideoInfo {
    pub fps: f64,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
}

pub struct VideoDecoder {
    capture: videoio::VideoCapture,
    path: PathBuf,
    info: VideoInfo,
}

impl VideoDecoder {
    pub fn open(path: &Path) -> TrajectoryResult<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| TrajectoryError::source_open(path, "path is not valid UTF-8"))?;

        debug!(video = %path.display(), "Opening video with OpenCV");

        // CAP_ANY lets OpenCV choose the backend for the platform.
        let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .map_err(|e| TrajectoryError::source_open(path, e.to_string()))?;

        let opened = capture
            .is_opened()
            .map_err(|e| TrajectoryError::source_open(path, e.to_string()))?;
        if !opened {
            return Err(TrajectoryError::source_open(path, "VideoCapture could not open the file"));
        }

        let prop = |id: i32| {
            capture
                .get(id)
                .map_err(|e| TrajectoryError::source_open(path, e.to_string()))
        };
        let info = VideoInfo {
            fps: prop(videoio::CAP_PROP_FPS)?,
            frame_count: prop(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as u64,
            width: prop(videoio::CAP_PROP_FRAME_WIDTH)? as u32,
            height: prop(videoio::CAP_PROP_FRAME_HEIGHT)? as u32,
        };

        info!(
            video = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            frames = info.frame_count,
            "Opened video"
        );

        Ok(Self {
            capture,
            path: path.to_path_buf(),
            info,
        })
    }

    pub fn info(&self) -> VideoInfo {
        self.info
    }

    pub fn read_frame(&mut self) -> TrajectoryResult<Option<RgbImage>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? {
            return Ok(None); // EOF
        }
        if frame.empty() {
            return Ok(None);
        }

        if frame.typ() != core::CV_8UC3 {
            return Err(TrajectoryError::decode(format!(
                "expected 8-bit 3-channel frames, got {} channel(s) of depth {}",
                frame.channels(),
                frame.depth()
            )));
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&frame, &mut rgb, imgproc::COLOR_BGR2RGB)?;

        if !rgb.is_continuous() {
            return Err(TrajectoryError::decode("frame data is not continuous"));
        }

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let data = rgb.data_bytes()?.to_vec();
        RgbImage::from_raw(width, height, data)
            .map(Some)
            .ok_or_else(|| TrajectoryError::decode("frame buffer shorter than width * height * 3"))
    }
}

impl FrameSource for VideoDecoder {
    fn next_frame(&mut self) -> TrajectoryResult<Option<RgbImage>> {
        self.read_frame()
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!(video = %self.path.display(), error = %e, "Failed to release video capture");
        } else {
            debug!(video = %self.path.display(), "Released video capture");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = VideoDecoder::open(&dir.path().join("missing.mp4")).err().unwrap();
        assert!(matches!(err, TrajectoryError::SourceOpen { .. }));
    }

    #[test]
    fn test_open_non_video_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.mp4");
        std::fs::write(&path, b"definitely not a video").unwrap();
        let err = VideoDecoder::open(&path).err().unwrap();
        assert!(matches!(err, TrajectoryError::SourceOpen { .. }));
    }
}
