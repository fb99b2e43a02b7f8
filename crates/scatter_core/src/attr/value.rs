//! Built attribute values.

use std::sync::Arc;

/// One time sample of a data attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSample<T> {
    /// Frame-relative time key
    pub time: f64,

    /// Flat values (tuple_size components per element)
    pub values: Vec<T>,
}

/// An immutable, possibly time-sampled array attribute.
///
/// Samples keep the order they were added in. Cloning shares the buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct DataAttr<T> {
    tuple_size: usize,
    samples: Arc<Vec<TimeSample<T>>>,
}

impl<T> DataAttr<T> {
    /// A single-sample attribute at time 0.
    pub fn new(values: Vec<T>) -> Self {
        Self::from_samples(vec![(0.0, values)], 1)
    }

    /// Build from ordered `(time_key, values)` pairs.
    pub fn from_samples(samples: Vec<(f64, Vec<T>)>, tuple_size: usize) -> Self {
        let samples = samples
            .into_iter()
            .map(|(time, values)| TimeSample { time, values })
            .collect();

        Self {
            tuple_size: tuple_size.max(1),
            samples: Arc::new(samples),
        }
    }

    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    pub fn samples(&self) -> &[TimeSample<T>] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Time keys in sample order.
    pub fn time_keys(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Values stored at exactly `time`.
    pub fn sample_at(&self, time: f64) -> Option<&[T]> {
        self.samples
            .iter()
            .find(|s| s.time == time)
            .map(|s| s.values.as_slice())
    }

    /// Values of the first sample (empty if there are none).
    pub fn values(&self) -> &[T] {
        self.samples.first().map(|s| s.values.as_slice()).unwrap_or(&[])
    }

    /// First value of the first sample.
    pub fn value(&self) -> Option<&T> {
        self.values().first()
    }
}

/// An attribute value: typed data or a nested group.
#[derive(Clone, Debug, PartialEq)]
pub enum Attr {
    Int(DataAttr<i64>),
    Double(DataAttr<f64>),
    String(DataAttr<String>),
    Group(GroupAttr),
}

impl Attr {
    pub fn int(value: i64) -> Self {
        Attr::Int(DataAttr::new(vec![value]))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Attr::String(DataAttr::new(vec![value.into()]))
    }

    pub fn ints(values: Vec<i64>) -> Self {
        Attr::Int(DataAttr::new(values))
    }

    pub fn doubles(values: Vec<f64>) -> Self {
        Attr::Double(DataAttr::new(values))
    }

    pub fn strings(values: Vec<String>) -> Self {
        Attr::String(DataAttr::new(values))
    }

    /// First string value, if this is a string attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attr::String(data) => data.value().map(String::as_str),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Attr::Int(data) => data.value().copied(),
            _ => None,
        }
    }

    pub fn as_doubles(&self) -> Option<&DataAttr<f64>> {
        match self {
            Attr::Double(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupAttr> {
        match self {
            Attr::Group(group) => Some(group),
            _ => None,
        }
    }
}

impl From<GroupAttr> for Attr {
    fn from(group: GroupAttr) -> Self {
        Attr::Group(group)
    }
}

/// An immutable, ordered name -> attribute tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupAttr {
    children: Arc<Vec<(String, Attr)>>,
}

impl GroupAttr {
    pub(crate) fn from_children(children: Vec<(String, Attr)>) -> Self {
        Self {
            children: Arc::new(children),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Direct child by name.
    pub fn child(&self, name: &str) -> Option<&Attr> {
        self.children
            .iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, attr)| attr)
    }

    /// Nested child by dotted path (e.g. `"c.instances.type"`).
    pub fn get(&self, path: &str) -> Option<&Attr> {
        let mut segments = path.split('.');
        let mut current = self.child(segments.next()?)?;
        for segment in segments {
            current = current.as_group()?.child(segment)?;
        }
        Some(current)
    }

    /// Nested group by dotted path.
    pub fn group(&self, path: &str) -> Option<&GroupAttr> {
        self.get(path).and_then(Attr::as_group)
    }

    pub fn child_name(&self, index: usize) -> Option<&str> {
        self.children.get(index).map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attr)> {
        self.children.iter().map(|(name, attr)| (name.as_str(), attr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_attr_single_sample() {
        let data = DataAttr::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(data.sample_count(), 1);
        assert_eq!(data.time_keys(), vec![0.0]);
        assert_eq!(data.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(data.tuple_size(), 1);
    }

    #[test]
    fn test_data_attr_keeps_sample_order() {
        let data = DataAttr::from_samples(vec![(0.5, vec![1.0]), (-0.5, vec![2.0])], 1);
        assert_eq!(data.time_keys(), vec![0.5, -0.5]);
        assert_eq!(data.sample_at(-0.5), Some(&[2.0][..]));
        assert_eq!(data.sample_at(0.25), None);
    }

    #[test]
    fn test_attr_accessors() {
        assert_eq!(Attr::string("error").as_str(), Some("error"));
        assert_eq!(Attr::int(1).as_int(), Some(1));
        assert_eq!(Attr::int(1).as_str(), None);
        assert!(Attr::doubles(vec![]).as_doubles().is_some());
    }

    #[test]
    fn test_group_lookup_by_path() {
        let inner = GroupAttr::from_children(vec![("type".to_string(), Attr::string("instance array"))]);
        let group = GroupAttr::from_children(vec![("c".to_string(), Attr::Group(inner))]);

        assert_eq!(group.get("c.type").and_then(Attr::as_str), Some("instance array"));
        assert!(group.group("c").is_some());
        assert!(group.get("c.missing").is_none());
        assert!(group.get("c.type.deeper").is_none());
        assert_eq!(group.child_name(0), Some("c"));
    }
}
