//! Run configuration: two paths and the numeric knobs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{TrajectoryError, TrajectoryResult};

pub const DEFAULT_SAMPLE_INTERVAL: u32 = 5;
pub const DEFAULT_DIFF_THRESHOLD: u8 = 30;
pub const DEFAULT_ENHANCE_FACTOR: f64 = 2.0;
pub const DEFAULT_OUTPUT: &str = "drone_trajectory.jpg";

/// Everything one compositing run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrajectoryConfig {
    /// Video file, or a directory of still frames.
    #[serde(alias = "inputPath")]
    pub input: PathBuf,

    /// Result image; the extension picks the encoder.
    #[serde(alias = "outputPath")]
    pub output: PathBuf,

    /// Process every Nth frame (1 = every frame).
    pub sample_interval: u32,

    /// Minimum grayscale delta that counts as motion (strictly greater).
    pub diff_threshold: u8,

    /// Gain applied to motion pixels before compositing.
    pub enhance_factor: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            enhance_factor: DEFAULT_ENHANCE_FACTOR,
        }
    }
}

impl TrajectoryConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> TrajectoryResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> TrajectoryResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(TrajectoryError::config("input path is empty"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(TrajectoryError::config("output path is empty"));
        }
        if self.sample_interval == 0 {
            return Err(TrajectoryError::config("sample interval must be at least 1"));
        }
        if !self.enhance_factor.is_finite() || self.enhance_factor <= 0.0 {
            return Err(TrajectoryError::config(format!(
                "enhance factor must be a positive number, got {}",
                self.enhance_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate_once_input_set() {
        let config = TrajectoryConfig::default();
        assert!(config.validate().is_err());

        let config = TrajectoryConfig::new("flight.mp4", "out.jpg");
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_interval, 5);
        assert_eq!(config.diff_threshold, 30);
        assert_eq!(config.enhance_factor, 2.0);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let config = TrajectoryConfig {
            sample_interval: 0,
            ..TrajectoryConfig::new("a.mp4", "b.jpg")
        };
        assert!(matches!(
            config.validate(),
            Err(TrajectoryError::Config { .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        for factor in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let config = TrajectoryConfig {
                enhance_factor: factor,
                ..TrajectoryConfig::new("a.mp4", "b.jpg")
            };
            assert!(config.validate().is_err(), "factor {factor} accepted");
        }
    }

    #[test]
    fn test_json_uses_camel_case_and_defaults() {
        let json = r#"{"inputPath": "clip.mp4", "outputPath": "t.png", "sampleInterval": 2, "enhanceFactor": 1.2}"#;
        let config: TrajectoryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.input, PathBuf::from("clip.mp4"));
        assert_eq!(config.output, PathBuf::from("t.png"));
        assert_eq!(config.sample_interval, 2);
        assert_eq!(config.diff_threshold, DEFAULT_DIFF_THRESHOLD);
        assert_eq!(config.enhance_factor, 1.2);
    }

    #[test]
    fn test_threshold_above_byte_range_is_rejected_by_serde() {
        let json = r#"{"input": "clip.mp4", "diffThreshold": 300}"#;
        assert!(serde_json::from_str::<TrajectoryConfig>(json).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"input": "v.mp4", "diffThreshold": 100}"#).unwrap();

        let config = TrajectoryConfig::from_json_file(&path).unwrap();
        assert_eq!(config.input, PathBuf::from("v.mp4"));
        assert_eq!(config.diff_threshold, 100);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
    }
}
