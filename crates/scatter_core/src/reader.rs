//! Instancer reading: turn an instancer plus precomputed inputs into the
//! three output attribute maps.
//!
//! - instancer map: attributes of the instancer location itself
//! - sources map: one entry per prototype under the `c` child group
//! - instances map: the instance array child

use std::collections::HashSet;

use crate::attr::{Attr, AttrMap, GroupAttr};
use crate::context::InvocationContext;
use crate::instancer::{prim_name, PointInstancer};
use crate::op::{
    CHILD_GROUP, ERROR_MESSAGE_ATTR, ERROR_TYPE, INSTANCE_MATRIX_ATTR, OUTPUT_LOCATION_PATH_ATTR,
    TYPE_ATTR,
};

/// Name of the instance array child.
pub const INSTANCES_CHILD: &str = "instances";

/// The three maps produced by an [`InstancerReader`].
#[derive(Clone, Debug, Default)]
pub struct InstancerOutputs {
    pub instancer: AttrMap,
    pub sources: AttrMap,
    pub instances: AttrMap,
}

/// Derives output attribute maps for an instancer.
///
/// A reader reports a fatal problem by setting `type = "error"` and
/// `errorMessage` on the instancer map. It reports "nothing to instantiate"
/// by invalidating the sources or instances map.
pub trait InstancerReader<I: ?Sized>: Send + Sync {
    fn read(&self, instancer: &I, ctx: &InvocationContext, input: &GroupAttr) -> InstancerOutputs;
}

/// Reference reader for [`PointInstancer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PointInstancerReader;

impl PointInstancerReader {
    pub fn new() -> Self {
        Self
    }
}

impl InstancerReader<PointInstancer> for PointInstancerReader {
    fn read(&self, instancer: &PointInstancer, ctx: &InvocationContext, input: &GroupAttr) -> InstancerOutputs {
        let mut outputs = InstancerOutputs::default();
        outputs.instancer.set(TYPE_ATTR, Attr::string("point instancer"));

        let proto_indices = instancer
            .proto_indices
            .sample_at(ctx.current_time)
            .map(|(_, indices)| indices.as_slice())
            .unwrap_or(&[]);

        if instancer.prototypes.is_empty() && proto_indices.is_empty() {
            log::debug!("{}: no prototypes and no instances", instancer.path);
            outputs.sources.invalidate();
            outputs.instances.invalidate();
            return outputs;
        }

        if let Some(bad) = proto_indices
            .iter()
            .find(|&&index| index < 0 || index as usize >= instancer.prototypes.len())
        {
            set_error(
                &mut outputs.instancer,
                format!(
                    "Proto index {} out of range ({} prototypes)",
                    bad,
                    instancer.prototypes.len()
                ),
            );
            return outputs;
        }

        let location = input
            .child(OUTPUT_LOCATION_PATH_ATTR)
            .and_then(Attr::as_str)
            .unwrap_or_default()
            .to_string();

        // Sources: one child per prototype, named after the prototype prim.
        let source_names = unique_names(&instancer.prototypes);
        outputs.sources.set(CHILD_GROUP, GroupAttr::default());
        for (name, path) in source_names.iter().zip(&instancer.prototypes) {
            outputs
                .sources
                .set(&format!("{CHILD_GROUP}.{name}.a.{TYPE_ATTR}"), Attr::string("instance source"))
                .set(&format!("{CHILD_GROUP}.{name}.a.prototypePath"), Attr::string(path.clone()));
        }

        // Instances: a single instance array child.
        let prefix = format!("{CHILD_GROUP}.{INSTANCES_CHILD}.a");
        let instance_sources = source_names
            .iter()
            .map(|name| format!("{location}/{name}"))
            .collect();

        outputs
            .instances
            .set(&format!("{prefix}.{TYPE_ATTR}"), Attr::string("instance array"))
            .set(&format!("{prefix}.geometry.instanceSource"), Attr::strings(instance_sources))
            .set(
                &format!("{prefix}.geometry.instanceIndex"),
                Attr::ints(proto_indices.iter().map(|&i| i as i64).collect()),
            );

        if let Some(matrices) = input.child(INSTANCE_MATRIX_ATTR) {
            outputs
                .instances
                .set(&format!("{prefix}.geometry.{INSTANCE_MATRIX_ATTR}"), matrices.clone());
        }

        outputs
    }
}

/// Mark a map as describing an error location.
pub fn set_error(map: &mut AttrMap, message: impl Into<String>) {
    map.set(TYPE_ATTR, Attr::string(ERROR_TYPE))
        .set(ERROR_MESSAGE_ATTR, Attr::string(message));
}

/// Prim names for `paths`, with `_1`, `_2`, ... appended to repeats.
fn unique_names(paths: &[String]) -> Vec<String> {
    let mut used = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let base = prim_name(path);
            let mut name = base.to_string();
            let mut suffix = 1;
            while !used.insert(name.clone()) {
                name = format!("{base}_{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::GroupBuilder;
    use crate::instancer::Sampled;

    fn input(location: &str) -> GroupAttr {
        let mut builder = GroupBuilder::new();
        builder.set(OUTPUT_LOCATION_PATH_ATTR, Attr::string(location));
        builder.set(INSTANCE_MATRIX_ATTR, Attr::doubles(vec![0.0; 16]));
        builder.build()
    }

    fn forest() -> PointInstancer {
        PointInstancer {
            path: "/World/Forest".to_string(),
            prototypes: vec!["/World/Protos/Tree".to_string(), "/World/Protos/Rock".to_string()],
            proto_indices: Sampled::Static(vec![0, 1, 0]),
            ..Default::default()
        }
    }

    #[test]
    fn test_reads_sources_and_instances() {
        let outputs = PointInstancerReader.read(&forest(), &InvocationContext::default(), &input("/root/forest"));

        let instancer = outputs.instancer.build().unwrap();
        assert_eq!(instancer.child(TYPE_ATTR).and_then(Attr::as_str), Some("point instancer"));

        let sources = outputs.sources.build().unwrap();
        let children = sources.group(CHILD_GROUP).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children.child_name(1), Some("Rock"));
        assert_eq!(
            sources.get("c.Tree.a.prototypePath").and_then(Attr::as_str),
            Some("/World/Protos/Tree")
        );

        let instances = outputs.instances.build().unwrap();
        let geometry = instances.group("c.instances.a.geometry").unwrap();
        let Some(Attr::String(sources)) = geometry.child("instanceSource") else {
            panic!("instanceSource missing");
        };
        assert_eq!(sources.values(), &["/root/forest/Tree".to_string(), "/root/forest/Rock".to_string()]);
        let Some(Attr::Int(indices)) = geometry.child("instanceIndex") else {
            panic!("instanceIndex missing");
        };
        assert_eq!(indices.values(), &[0, 1, 0]);
        assert!(geometry.child(INSTANCE_MATRIX_ATTR).is_some());
    }

    #[test]
    fn test_out_of_range_index_is_reported() {
        let mut instancer = forest();
        instancer.proto_indices = Sampled::Static(vec![0, 2]);

        let outputs = PointInstancerReader.read(&instancer, &InvocationContext::default(), &input("/root"));
        let attrs = outputs.instancer.build().unwrap();

        assert_eq!(attrs.child(TYPE_ATTR).and_then(Attr::as_str), Some(ERROR_TYPE));
        assert!(attrs.child(ERROR_MESSAGE_ATTR).is_some());
    }

    #[test]
    fn test_empty_instancer_invalidates_outputs() {
        let instancer = PointInstancer {
            path: "/World/Empty".to_string(),
            ..Default::default()
        };

        let outputs = PointInstancerReader.read(&instancer, &InvocationContext::default(), &input("/root"));
        assert!(outputs.instancer.build().is_some());
        assert!(outputs.sources.build().is_none());
        assert!(outputs.instances.build().is_none());
    }

    #[test]
    fn test_prototypes_without_instances_keep_empty_array() {
        let mut instancer = forest();
        instancer.proto_indices = Sampled::Static(Vec::new());

        let outputs = PointInstancerReader.read(&instancer, &InvocationContext::default(), &input("/root"));
        let instances = outputs.instances.build().unwrap();
        let Some(Attr::Int(indices)) = instances.get("c.instances.a.geometry.instanceIndex") else {
            panic!("instanceIndex missing");
        };
        assert!(indices.values().is_empty());
    }

    #[test]
    fn test_unique_names() {
        let names = unique_names(&[
            "/a/Tree".to_string(),
            "/b/Tree".to_string(),
            "/c/Tree".to_string(),
        ]);
        assert_eq!(names, vec!["Tree", "Tree_1", "Tree_2"]);
    }
}
