//! Attribute trees handed to the host scene graph.
//!
//! Attributes are immutable once built. Data attributes may carry several
//! time samples, each keyed by a frame-relative time; groups nest attributes
//! by name and preserve insertion order.
//!
//! - [`Attr`], [`DataAttr`], [`GroupAttr`]: built, immutable values
//! - [`GroupBuilder`], [`DoubleBuilder`]: accumulate values, then `build()`
//! - [`AttrMap`]: the per-invocation map that readers fill in

mod builder;
mod map;
mod value;

pub use builder::*;
pub use map::*;
pub use value::*;

use thiserror::Error;

/// Errors raised while accumulating attribute values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttrError {
    #[error("instance {index} appended out of order to '{name}' at time {time_key} (expected {expected})")]
    OutOfOrderInstance {
        name: String,
        time_key: f64,
        index: usize,
        expected: usize,
    },

    #[error("instance {index} out of range for '{name}' ({count} instances)")]
    InstanceOutOfRange {
        name: String,
        index: usize,
        count: usize,
    },

    #[error("sample {sample} has {found} instances, expected {expected}")]
    InstanceCountMismatch {
        sample: usize,
        expected: usize,
        found: usize,
    },
}

/// Result type for attribute operations.
pub type AttrResult<T> = Result<T, AttrError>;
