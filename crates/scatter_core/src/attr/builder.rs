//! Builders that accumulate attribute values before freezing them.

use super::value::{Attr, DataAttr, GroupAttr};

#[derive(Clone, Debug)]
enum Node {
    Value(Attr),
    Group(GroupBuilder),
}

/// Accumulates a nested attribute tree.
///
/// Paths are dotted (`"geometry.instanceIndex"`); intermediate groups are
/// created on demand. Setting an existing name overwrites it in place, so the
/// original insertion order is kept.
#[derive(Clone, Debug, Default)]
pub struct GroupBuilder {
    entries: Vec<(String, Node)>,
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrite-or-insert `attr` at `path`.
    pub fn set(&mut self, path: &str, attr: impl Into<Attr>) -> &mut Self {
        let attr = attr.into();
        match path.split_once('.') {
            None => {
                if path.is_empty() {
                    log::warn!("Ignoring attribute with empty name");
                    return self;
                }
                let node = match attr {
                    Attr::Group(group) => Node::Group(GroupBuilder::from(&group)),
                    other => Node::Value(other),
                };
                self.put(path, node);
            }
            Some((head, rest)) => {
                if head.is_empty() {
                    log::warn!("Ignoring attribute path with empty segment: {}", path);
                    return self;
                }
                self.group_mut(head).set(rest, attr);
            }
        }
        self
    }

    /// Shallow merge: every top-level child of `group` overwrites ours.
    pub fn update(&mut self, group: &GroupAttr) -> &mut Self {
        for (name, attr) in group.iter() {
            self.set(name, attr.clone());
        }
        self
    }

    /// Freeze into an immutable group.
    pub fn build(&self) -> GroupAttr {
        let children = self
            .entries
            .iter()
            .map(|(name, node)| {
                let attr = match node {
                    Node::Value(attr) => attr.clone(),
                    Node::Group(builder) => Attr::Group(builder.build()),
                };
                (name.clone(), attr)
            })
            .collect();

        GroupAttr::from_children(children)
    }

    fn put(&mut self, name: &str, node: Node) {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| n == name) {
            slot.1 = node;
        } else {
            self.entries.push((name.to_string(), node));
        }
    }

    fn group_mut(&mut self, name: &str) -> &mut GroupBuilder {
        let index = match self.entries.iter().position(|(n, _)| n == name) {
            Some(index) => {
                // A plain value in the way is replaced by a fresh group.
                if let Node::Value(_) = self.entries[index].1 {
                    self.entries[index].1 = Node::Group(GroupBuilder::new());
                }
                index
            }
            None => {
                self.entries.push((name.to_string(), Node::Group(GroupBuilder::new())));
                self.entries.len() - 1
            }
        };

        match &mut self.entries[index].1 {
            Node::Group(builder) => builder,
            Node::Value(_) => unreachable!("slot was just made a group"),
        }
    }
}

impl From<&GroupAttr> for GroupBuilder {
    fn from(group: &GroupAttr) -> Self {
        let mut builder = GroupBuilder::new();
        builder.update(group);
        builder
    }
}

/// Accumulates a time-sampled double attribute.
///
/// Each time key owns one growable buffer; keys keep the order in which they
/// were first requested.
#[derive(Clone, Debug)]
pub struct DoubleBuilder {
    tuple_size: usize,
    samples: Vec<(f64, Vec<f64>)>,
}

impl DoubleBuilder {
    pub fn new(tuple_size: usize) -> Self {
        Self {
            tuple_size,
            samples: Vec::new(),
        }
    }

    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Get-or-create the buffer for `time_key`, reserving `capacity` values on creation.
    pub fn get(&mut self, time_key: f64, capacity: usize) -> &mut Vec<f64> {
        let index = match self.samples.iter().position(|(t, _)| *t == time_key) {
            Some(index) => index,
            None => {
                self.samples.push((time_key, Vec::with_capacity(capacity)));
                self.samples.len() - 1
            }
        };
        &mut self.samples[index].1
    }

    pub fn build(&self) -> Attr {
        Attr::Double(DataAttr::from_samples(self.samples.clone(), self.tuple_size))
    }
}
