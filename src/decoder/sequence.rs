//! A directory of still images played back as a frame stream.

use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::FrameSource;
use crate::core::error::{TrajectoryError, TrajectoryResult};

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Frames are the directory's image files in file-name order, decoded
/// one at a time.
pub struct ImageSequence {
    dir: PathBuf,
    pending: VecDeque<PathBuf>,
}

impl ImageSequence {
    pub fn open(dir: &Path) -> TrajectoryResult<Self> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| TrajectoryError::source_open(dir, e.to_string()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| TrajectoryError::source_open(dir, e.to_string()))?
                .path();
            if path.is_file() && is_frame_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        info!(dir = %dir.display(), frames = files.len(), "Opened image sequence");
        Ok(Self {
            dir: dir.to_path_buf(),
            pending: files.into(),
        })
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> TrajectoryResult<Option<RgbImage>> {
        let Some(path) = self.pending.pop_front() else {
            debug!(dir = %self.dir.display(), "Image sequence exhausted");
            return Ok(None);
        };
        let frame = image::open(&path)
            .map_err(|e| TrajectoryError::decode(format!("{}: {}", path.display(), e)))?
            .to_rgb8();
        Ok(Some(frame))
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            FRAME_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_frames_come_back_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("frame_002.png", 20u8), ("frame_000.png", 0), ("frame_001.png", 10)] {
            RgbImage::from_pixel(2, 2, Rgb([value, value, value]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut seq = ImageSequence::open(dir.path()).unwrap();
        assert_eq!(seq.remaining(), 3);

        let mut seen = Vec::new();
        while let Some(frame) = seq.next_frame().unwrap() {
            seen.push(frame.get_pixel(0, 0)[0]);
        }
        assert_eq!(seen, vec![0, 10, 20]);
        assert!(seq.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut seq = ImageSequence::open(dir.path()).unwrap();
        assert!(seq.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_frame_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0.png"), b"garbage").unwrap();

        let mut seq = ImageSequence::open(dir.path()).unwrap();
        assert!(matches!(seq.next_frame(), Err(TrajectoryError::Decode { .. })));
    }

    #[test]
    fn test_missing_directory_is_source_open() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageSequence::open(&dir.path().join("absent")).err().unwrap();
        assert!(matches!(err, TrajectoryError::SourceOpen { .. }));
    }
}
