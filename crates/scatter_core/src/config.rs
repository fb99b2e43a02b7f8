//! Motion blur configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::motion::{is_motion_backward, shutter_offsets};

/// Errors that can occur while loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid motion configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// How motion samples are chosen for an invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Current evaluation time (frame)
    pub current_time: f64,

    /// Explicit frame-relative offsets; overrides the shutter settings
    pub motion_sample_offsets: Option<Vec<f64>>,

    /// Shutter open, relative to the current frame
    pub shutter_open: f64,

    /// Shutter close, relative to the current frame
    pub shutter_close: f64,

    /// Number of samples spread across the shutter interval
    pub max_samples: usize,

    /// Force the backward-motion flag instead of deriving it from the offsets
    pub backward: Option<bool>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            motion_sample_offsets: None,
            shutter_open: 0.0,
            shutter_close: 0.0,
            max_samples: 1,
            backward: None,
        }
    }
}

impl MotionConfig {
    /// A config sampling exactly `offsets` around `current_time`.
    pub fn with_offsets(current_time: f64, offsets: Vec<f64>) -> Self {
        Self {
            current_time,
            motion_sample_offsets: Some(offsets),
            ..Default::default()
        }
    }

    /// Load from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse from JSON and validate.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: MotionConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.current_time.is_finite() {
            return Err(ConfigError::Invalid("current_time must be finite".into()));
        }
        if let Some(offsets) = &self.motion_sample_offsets {
            if offsets.iter().any(|t| !t.is_finite()) {
                return Err(ConfigError::Invalid("motion sample offsets must be finite".into()));
            }
        } else if self.max_samples == 0 {
            return Err(ConfigError::Invalid("max_samples must be at least 1".into()));
        } else if !self.shutter_open.is_finite() || !self.shutter_close.is_finite() {
            return Err(ConfigError::Invalid("shutter bounds must be finite".into()));
        }
        Ok(())
    }

    /// The frame-relative offsets this config samples at, in order.
    pub fn offsets(&self) -> Vec<f64> {
        match &self.motion_sample_offsets {
            Some(offsets) if !offsets.is_empty() => offsets.clone(),
            Some(_) => vec![0.0],
            None => {
                let offsets = shutter_offsets(self.shutter_open, self.shutter_close, self.max_samples);
                if offsets.is_empty() {
                    vec![0.0]
                } else {
                    offsets
                }
            }
        }
    }

    pub fn is_backward(&self) -> bool {
        self.backward
            .unwrap_or_else(|| is_motion_backward(&self.offsets()))
    }
}
