//! Forward-only frame sources.

pub mod sequence;
#[cfg(feature = "video")]
pub mod video;

use image::RgbImage;
use std::path::Path;

use crate::core::error::TrajectoryResult;

pub use sequence::ImageSequence;
#[cfg(feature = "video")]
pub use video::{VideoDecoder, VideoInfo};

/// Sequential reader of equally sized RGB frames.
///
/// `Ok(None)` means the stream is exhausted; there is no other end signal.
pub trait FrameSource {
    fn next_frame(&mut self) -> TrajectoryResult<Option<RgbImage>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> TrajectoryResult<Option<RgbImage>> {
        (**self).next_frame()
    }
}

/// Directories are read as image sequences, anything else as a video file.
pub fn open_source(path: &Path) -> TrajectoryResult<Box<dyn FrameSource>> {
    if path.is_dir() {
        return Ok(Box::new(ImageSequence::open(path)?));
    }
    open_video(path)
}

#[cfg(feature = "video")]
fn open_video(path: &Path) -> TrajectoryResult<Box<dyn FrameSource>> {
    Ok(Box::new(VideoDecoder::open(path)?))
}

#[cfg(not(feature = "video"))]
fn open_video(path: &Path) -> TrajectoryResult<Box<dyn FrameSource>> {
    Err(crate::core::error::TrajectoryError::source_open(
        path,
        "video decoding requires the `video` feature; pass a directory of frames instead",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TrajectoryError;

    #[test]
    fn test_open_missing_path_fails_with_source_open() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.mp4");
        let err = open_source(&missing).err().unwrap();
        assert!(matches!(err, TrajectoryError::SourceOpen { .. }));
    }

    #[test]
    fn test_open_directory_reads_frames() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::new(3, 2).save(dir.path().join("0001.png")).unwrap();

        let mut source = open_source(dir.path()).unwrap();
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.dimensions(), (3, 2));
        assert!(source.next_frame().unwrap().is_none());
    }
}
