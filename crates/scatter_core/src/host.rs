//! Host scene-graph interface.
//!
//! The assembler never builds scene nodes itself. It writes attributes to a
//! [`CookInterface`] and emits [`ChildDescriptor`]s; the host decides how each
//! kind of child is executed and owns any per-child state from then on.

use crate::attr::{Attr, GroupAttr};
use crate::context::InvocationContext;

/// Attribute telling the host not to populate this location's default children.
pub const SKIP_ALL_CHILDREN_ATTR: &str = "__skipAllChildren";

/// Immutable context handed to an intermediate child.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildContext {
    /// Location of the node that created the child
    pub parent_location: String,

    /// Current evaluation time of the parent
    pub current_time: f64,

    /// Motion sample offsets of the parent
    pub motion_sample_offsets: Vec<f64>,

    /// Backward-motion flag of the parent
    pub motion_backward: bool,
}

impl ChildContext {
    pub fn from_invocation(parent_location: impl Into<String>, ctx: &InvocationContext) -> Self {
        Self {
            parent_location: parent_location.into(),
            current_time: ctx.current_time,
            motion_sample_offsets: ctx.motion_sample_offsets.clone(),
            motion_backward: ctx.motion_backward,
        }
    }
}

/// The two kinds of child construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildKind {
    /// Continues the build process recursively
    Intermediate,
    /// Realizes a flattened, static subtree directly
    Final,
}

/// A child the host should create.
#[derive(Clone, Debug, PartialEq)]
pub enum ChildDescriptor {
    Intermediate {
        name: String,
        /// The parent's op args merged with the child's subtree
        args: GroupAttr,
        context: ChildContext,
    },
    Final {
        scene: GroupAttr,
    },
}

impl ChildDescriptor {
    pub fn kind(&self) -> ChildKind {
        match self {
            ChildDescriptor::Intermediate { .. } => ChildKind::Intermediate,
            ChildDescriptor::Final { .. } => ChildKind::Final,
        }
    }

    /// Child name; final builds are named by their own subtree.
    pub fn name(&self) -> Option<&str> {
        match self {
            ChildDescriptor::Intermediate { name, .. } => Some(name),
            ChildDescriptor::Final { .. } => None,
        }
    }

    /// The attribute tree the child is built from.
    pub fn attrs(&self) -> &GroupAttr {
        match self {
            ChildDescriptor::Intermediate { args, .. } => args,
            ChildDescriptor::Final { scene } => scene,
        }
    }
}

/// Operations the assembler performs on the host's scene node.
pub trait CookInterface {
    /// Location path of the node being cooked.
    fn output_location_path(&self) -> &str;

    /// Arguments the node was cooked with.
    fn op_args(&self) -> GroupAttr;

    /// Overwrite-or-insert a top-level attribute on the node.
    fn set_attr(&mut self, name: &str, attr: Attr);

    /// Read back an attribute written to the node.
    fn output_attr(&self, name: &str) -> Option<Attr>;

    /// Create an intermediate child that continues the build process.
    fn create_child(&mut self, name: &str, args: GroupAttr, context: ChildContext);

    /// Build the given static subtree under this node.
    fn exec_final_build(&mut self, scene: GroupAttr);

    /// Dispatch a descriptor to the matching operation.
    fn emit(&mut self, child: ChildDescriptor) {
        match child {
            ChildDescriptor::Intermediate { name, args, context } => self.create_child(&name, args, context),
            ChildDescriptor::Final { scene } => self.exec_final_build(scene),
        }
    }
}

/// In-memory host that records everything written to it.
#[derive(Clone, Debug, Default)]
pub struct RecordingInterface {
    location: String,
    op_args: GroupAttr,
    attrs: Vec<(String, Attr)>,
    children: Vec<ChildDescriptor>,
}

impl RecordingInterface {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn with_op_args(mut self, op_args: GroupAttr) -> Self {
        self.op_args = op_args;
        self
    }

    /// Attributes in the order they were first written.
    pub fn attrs(&self) -> &[(String, Attr)] {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, attr)| attr)
    }

    /// Every emitted child, in emission order.
    pub fn children(&self) -> &[ChildDescriptor] {
        &self.children
    }

    pub fn intermediate_children(&self) -> impl Iterator<Item = &ChildDescriptor> {
        self.children.iter().filter(|c| c.kind() == ChildKind::Intermediate)
    }

    pub fn final_builds(&self) -> impl Iterator<Item = &GroupAttr> {
        self.children.iter().filter_map(|c| match c {
            ChildDescriptor::Final { scene } => Some(scene),
            ChildDescriptor::Intermediate { .. } => None,
        })
    }

    pub fn skips_default_children(&self) -> bool {
        self.attr(SKIP_ALL_CHILDREN_ATTR).and_then(Attr::as_int) == Some(1)
    }
}

impl CookInterface for RecordingInterface {
    fn output_location_path(&self) -> &str {
        &self.location
    }

    fn op_args(&self) -> GroupAttr {
        self.op_args.clone()
    }

    fn set_attr(&mut self, name: &str, attr: Attr) {
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            slot.1 = attr;
        } else {
            self.attrs.push((name.to_string(), attr));
        }
    }

    fn output_attr(&self, name: &str) -> Option<Attr> {
        self.attr(name).cloned()
    }

    fn create_child(&mut self, name: &str, args: GroupAttr, context: ChildContext) {
        self.children.push(ChildDescriptor::Intermediate {
            name: name.to_string(),
            args,
            context,
        });
    }

    fn exec_final_build(&mut self, scene: GroupAttr) {
        self.children.push(ChildDescriptor::Final { scene });
    }
}
