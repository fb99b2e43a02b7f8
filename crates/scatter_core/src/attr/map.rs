//! Per-invocation attribute map.

use scatter_math::{DMat4, DMat4Ext};

use super::builder::{DoubleBuilder, GroupBuilder};
use super::value::{Attr, GroupAttr};
use super::{AttrError, AttrResult};
use crate::host::CookInterface;

/// Number of scalar components in one flattened matrix.
pub const MATRIX_COMPONENTS: usize = 16;

/// A map of named attributes, filled in by one invocation and built once.
///
/// Plain values go through [`AttrMap::set`]; time-keyed matrix buffers go
/// through [`AttrMap::append_time_keyed_sample`] and surface at build time as
/// one double attribute per name with a sample per time key.
///
/// A map can be invalidated, which makes [`AttrMap::build`] return `None`.
/// That is distinct from a valid map whose groups happen to be empty.
#[derive(Clone, Debug)]
pub struct AttrMap {
    group: GroupBuilder,
    time_keyed: Vec<(String, DoubleBuilder)>,
    valid: bool,
}

impl Default for AttrMap {
    fn default() -> Self {
        Self {
            group: GroupBuilder::new(),
            time_keyed: Vec::new(),
            valid: true,
        }
    }
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite-or-insert a value. Dotted names nest.
    pub fn set(&mut self, name: &str, attr: impl Into<Attr>) -> &mut Self {
        self.group.set(name, attr);
        self
    }

    /// Get-or-create the buffer for `(name, time_key)`.
    pub fn time_keyed_buffer(&mut self, name: &str, time_key: f64, capacity: usize) -> &mut Vec<f64> {
        let index = match self.time_keyed.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.time_keyed
                    .push((name.to_string(), DoubleBuilder::new(MATRIX_COMPONENTS)));
                self.time_keyed.len() - 1
            }
        };
        self.time_keyed[index].1.get(time_key, capacity)
    }

    /// Append one instance's matrix to the buffer for `(name, time_key)`.
    ///
    /// The buffer is sized for `instance_count` matrices when first created.
    /// Instances must arrive in order, starting at 0.
    pub fn append_time_keyed_sample(
        &mut self,
        name: &str,
        time_key: f64,
        instance_index: usize,
        instance_count: usize,
        matrix: &DMat4,
    ) -> AttrResult<()> {
        if instance_index >= instance_count {
            return Err(AttrError::InstanceOutOfRange {
                name: name.to_string(),
                index: instance_index,
                count: instance_count,
            });
        }

        let buffer = self.time_keyed_buffer(name, time_key, MATRIX_COMPONENTS * instance_count);
        let expected = buffer.len() / MATRIX_COMPONENTS;
        if expected != instance_index {
            return Err(AttrError::OutOfOrderInstance {
                name: name.to_string(),
                time_key,
                index: instance_index,
                expected,
            });
        }

        buffer.extend_from_slice(&matrix.to_scene_array());
        Ok(())
    }

    /// Mark the map as unusable; [`AttrMap::build`] will return `None`.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty() && self.time_keyed.is_empty()
    }

    /// Freeze the map. `None` if it was invalidated or never written to.
    pub fn build(&self) -> Option<GroupAttr> {
        if !self.valid || self.is_empty() {
            return None;
        }

        let mut group = self.group.clone();
        for (name, builder) in &self.time_keyed {
            group.set(name, builder.build());
        }
        Some(group.build())
    }

    /// Write every top-level attribute to the host interface.
    pub fn to_interface(&self, interface: &mut dyn CookInterface) {
        if let Some(group) = self.build() {
            for (name, attr) in group.iter() {
                interface.set_attr(name, attr.clone());
            }
        }
    }
}
