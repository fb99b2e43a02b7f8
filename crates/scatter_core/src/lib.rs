//! Scatter Core - point instancer translation for scene-graph hosts.
//!
//! This crate turns a point instancer (many repeated prototype instances)
//! into the attribute trees a host needs to build its scene graph:
//!
//! - **Motion samples**: frame-relative offsets resolved to absolute times,
//!   with time-key reversal for backward motion
//! - **Instance transforms**: per-sample, per-instance matrices flattened into a
//!   time-keyed `instanceMatrix` attribute
//! - **Cook**: the [`PointInstancerOp`] that reports errors, exits quietly when
//!   there is nothing to instance, or emits source and instance-array children
//!
//! # Example
//!
//! ```ignore
//! use scatter_core::{
//!     InvocationContext, PointInstancerOp, PointInstancerReader, PointInstancerTransforms,
//!     RecordingInterface,
//! };
//!
//! let op = PointInstancerOp::new(PointInstancerTransforms::new(), PointInstancerReader::new());
//! let mut node = RecordingInterface::new("/root/world/forest");
//! let outcome = op.cook(&instancer, &InvocationContext::default(), &mut node);
//! println!("{:?}: {} children", outcome, node.children().len());
//! ```

pub mod attr;
pub mod config;
pub mod context;
pub mod host;
pub mod instancer;
pub mod motion;
pub mod op;
pub mod reader;
pub mod scene;
pub mod transforms;

// Re-export commonly used types
pub use attr::{Attr, AttrError, AttrMap, DataAttr, GroupAttr, GroupBuilder};
pub use config::MotionConfig;
pub use context::InvocationContext;
pub use host::{ChildContext, ChildDescriptor, ChildKind, CookInterface, RecordingInterface};
pub use instancer::{InstancerPrim, PointInstancer, Sampled};
pub use motion::{resolve_motion_samples, reverse_time_sample, MotionSample};
pub use op::{CookOutcome, PointInstancerOp};
pub use reader::{InstancerOutputs, InstancerReader, PointInstancerReader};
pub use scene::{CookedNode, SceneFile};
pub use transforms::{PointInstancerTransforms, TransformBatch, TransformBatchComputer};
