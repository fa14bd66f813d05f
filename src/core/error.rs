//! Error taxonomy for trajectory compositing.

use std::path::PathBuf;

/// Every failure aborts the whole operation; there is no partial output.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("Failed to open frame source {path}: {message}")]
    SourceOpen { path: PathBuf, message: String },

    #[error("Frame source {path} yielded no frames")]
    EmptySource { path: PathBuf },

    #[error("Failed to write output image {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Frame size changed from {expected_width}x{expected_height} to {width}x{height}")]
    FrameSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type TrajectoryResult<T> = Result<T, TrajectoryError>;

impl TrajectoryError {
    pub fn source_open(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::SourceOpen {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn encode(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Encode {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

#[cfg(feature = "video")]
impl From<opencv::Error> for TrajectoryError {
    fn from(err: opencv::Error) -> Self {
        Self::decode(err.to_string())
    }
}
