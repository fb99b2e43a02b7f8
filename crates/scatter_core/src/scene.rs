//! Scene files: a motion configuration plus the instancers to cook.
//!
//! The JSON form is what the CLI and integration tests load:
//!
//! ```json
//! {
//!   "motion": { "current_time": 10.0, "motion_sample_offsets": [-0.5, 0.5] },
//!   "instancers": [ { "path": "/World/Forest", "prototypes": [...], ... } ]
//! }
//! ```

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, MotionConfig};
use crate::context::InvocationContext;
use crate::host::RecordingInterface;
use crate::instancer::PointInstancer;
use crate::op::{CookOutcome, PointInstancerOp};
use crate::reader::PointInstancerReader;
use crate::transforms::PointInstancerTransforms;

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for scene loading.
pub type SceneResult<T> = Result<T, SceneError>;

/// A set of point instancers sharing one motion configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    /// Location the instancer paths are placed under
    pub root_location: String,

    pub motion: MotionConfig,

    pub instancers: Vec<PointInstancer>,
}

impl Default for SceneFile {
    fn default() -> Self {
        Self {
            root_location: "/root/world".to_string(),
            motion: MotionConfig::default(),
            instancers: Vec::new(),
        }
    }
}

/// One cooked instancer.
#[derive(Debug)]
pub struct CookedNode {
    /// Scene path of the instancer
    pub path: String,

    pub outcome: CookOutcome,

    /// Everything the cook wrote to its node
    pub node: RecordingInterface,
}

impl SceneFile {
    /// Load a scene file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a scene file and validate its motion settings.
    pub fn from_json_str(content: &str) -> SceneResult<Self> {
        let scene: SceneFile = serde_json::from_str(content)?;
        scene.motion.validate()?;
        Ok(scene)
    }

    /// Location an instancer is cooked at.
    pub fn location_for(&self, instancer: &PointInstancer) -> String {
        format!("{}{}", self.root_location.trim_end_matches('/'), instancer.path)
    }

    /// Cook every instancer independently, in parallel, preserving order.
    pub fn cook_all(&self) -> Vec<CookedNode> {
        let op = PointInstancerOp::new(PointInstancerTransforms::new(), PointInstancerReader::new());
        let ctx = InvocationContext::from_config(&self.motion);

        self.instancers
            .par_iter()
            .map(|instancer| {
                let mut node = RecordingInterface::new(self.location_for(instancer));
                let outcome = op.cook(instancer, &ctx, &mut node);
                CookedNode {
                    path: instancer.path.clone(),
                    outcome,
                    node,
                }
            })
            .collect()
    }
}
