//! Point instancer cook: the output assembler.
//!
//! One call to [`PointInstancerOp::cook`] runs a single invocation:
//!
//! 1. resolve motion samples and compute instance transforms
//! 2. flatten them into a time-keyed `instanceMatrix` input attribute
//! 3. let the reader derive the instancer, sources and instances maps
//! 4. write the instancer map to the node, then emit children
//!
//! Every invocation ends in exactly one [`CookOutcome`]. Problems are reported
//! through the node's attributes (`type = "error"` plus `errorMessage`), never
//! as a Rust error, and nothing is retried.

use crate::attr::{Attr, AttrError, AttrMap, AttrResult, GroupBuilder, MATRIX_COMPONENTS};
use crate::context::InvocationContext;
use crate::host::{ChildContext, ChildDescriptor, CookInterface, SKIP_ALL_CHILDREN_ATTR};
use crate::instancer::InstancerPrim;
use crate::motion::{resolve_motion_samples, MotionSample};
use crate::reader::{set_error, InstancerReader};
use crate::transforms::{TransformBatch, TransformBatchComputer};

/// Attribute naming the location type.
pub const TYPE_ATTR: &str = "type";

/// `type` value marking an error location.
pub const ERROR_TYPE: &str = "error";

/// Attribute carrying the error description.
pub const ERROR_MESSAGE_ATTR: &str = "errorMessage";

/// Flattened per-instance matrices, 16 doubles per instance per time key.
pub const INSTANCE_MATRIX_ATTR: &str = "instanceMatrix";

/// Input attribute carrying the node's location path.
pub const OUTPUT_LOCATION_PATH_ATTR: &str = "outputLocationPath";

/// Child group of the sources map.
pub const CHILD_GROUP: &str = "c";

/// Op arg an intermediate child receives its subtree under.
pub const STATIC_SCENE_ARG: &str = "staticScene";

/// Message written when no transform samples could be computed.
pub const NO_SAMPLES_MESSAGE: &str =
    "Could not compute sample/topology-invarying instance transform matrix";

/// Terminal state of a cook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CookOutcome {
    /// The transform computer produced no samples; an error was reported.
    NoTransformSamples,
    /// The reader marked the instancer as an error.
    ReaderError,
    /// Sources or instances were invalid or empty; nothing was instantiated.
    /// Not an error: an instancer may legitimately have nothing to instance.
    EmptyBuild,
    /// Children were emitted: one per source plus the instance array.
    Emitted { sources: usize },
}

impl CookOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, CookOutcome::NoTransformSamples | CookOutcome::ReaderError)
    }
}

/// Cooks point instancers using a transform computer and an instancer reader.
///
/// Holds no per-invocation state; one op can serve many concurrent cooks.
#[derive(Clone, Debug, Default)]
pub struct PointInstancerOp<C, R> {
    computer: C,
    reader: R,
}

impl<C, R> PointInstancerOp<C, R> {
    pub fn new(computer: C, reader: R) -> Self {
        Self { computer, reader }
    }

    pub fn computer(&self) -> &C {
        &self.computer
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Run one invocation against `interface`.
    pub fn cook<I>(&self, instancer: &I, ctx: &InvocationContext, interface: &mut dyn CookInterface) -> CookOutcome
    where
        I: InstancerPrim + ?Sized,
        C: TransformBatchComputer<I>,
        R: InstancerReader<I>,
    {
        let location = interface.output_location_path().to_string();

        let mut input = AttrMap::new();
        input.set(OUTPUT_LOCATION_PATH_ATTR, Attr::string(location.clone()));

        // Compute the instance transforms at every motion sample.
        let offsets = ctx.motion_offsets_for(instancer.is_motion_varying());
        let samples = resolve_motion_samples(ctx.current_time, &offsets);
        let times: Vec<f64> = samples.iter().map(|s| s.time).collect();

        let batch = self.computer.compute(instancer, &times, ctx.current_time);
        if batch.is_empty() {
            return report_no_samples(interface, instancer.path(), None);
        }

        if let Err(err) = flatten_instance_matrices(&mut input, &samples, &batch, ctx) {
            return report_no_samples(interface, instancer.path(), Some(err));
        }

        log::debug!(
            "{}: {} instances at {} of {} samples",
            instancer.path(),
            batch.instance_count(),
            batch.produced(),
            samples.len()
        );

        // Derive the output maps and send the instancer's own attrs straight out.
        let input = input.build().unwrap_or_default();
        let outputs = self.reader.read(instancer, ctx, &input);
        outputs.instancer.to_interface(interface);

        let is_error = interface
            .output_attr(TYPE_ATTR)
            .is_some_and(|attr| attr.as_str() == Some(ERROR_TYPE));
        if is_error {
            log::warn!(
                "{}: {}",
                instancer.path(),
                interface
                    .output_attr(ERROR_MESSAGE_ATTR)
                    .as_ref()
                    .and_then(Attr::as_str)
                    .unwrap_or("reader reported an error")
            );
            return CookOutcome::ReaderError;
        }

        let (Some(sources), Some(instances)) = (outputs.sources.build(), outputs.instances.build()) else {
            // TODO: flag upstream readers that invalidate maps for non-empty instancers
            log::debug!("{}: nothing to instance", instancer.path());
            return CookOutcome::EmptyBuild;
        };
        let Some(source_children) = sources.group(CHILD_GROUP) else {
            log::debug!("{}: sources have no '{}' group", instancer.path(), CHILD_GROUP);
            return CookOutcome::EmptyBuild;
        };

        // Children are created here instead of by the host.
        interface.set_attr(SKIP_ALL_CHILDREN_ATTR, Attr::int(1));

        let op_args = interface.op_args();
        for (name, subtree) in source_children.iter() {
            let mut args = GroupBuilder::from(&op_args);
            args.set(STATIC_SCENE_ARG, subtree.clone());

            interface.emit(ChildDescriptor::Intermediate {
                name: name.to_string(),
                args: args.build(),
                context: ChildContext::from_invocation(location.clone(), ctx),
            });
        }
        interface.emit(ChildDescriptor::Final { scene: instances });

        CookOutcome::Emitted {
            sources: source_children.len(),
        }
    }
}

/// Append every produced sample to `instanceMatrix`, keyed by frame-relative time.
///
/// A time key that repeats keeps the first sample written under it.
fn flatten_instance_matrices(
    input: &mut AttrMap,
    samples: &[MotionSample],
    batch: &TransformBatch,
    ctx: &InvocationContext,
) -> AttrResult<()> {
    let instance_count = batch.instance_count();
    let mut written: Vec<f64> = Vec::with_capacity(batch.produced());

    for (index, (sample, transforms)) in samples.iter().zip(batch.samples()).enumerate() {
        let time_key = sample.time_key(ctx.motion_backward, ctx.time_reversal);
        if written.contains(&time_key) {
            log::debug!("skipping repeated time key {} at sample {}", time_key, index);
            continue;
        }

        if transforms.len() != instance_count {
            return Err(AttrError::InstanceCountMismatch {
                sample: index,
                expected: instance_count,
                found: transforms.len(),
            });
        }

        input.time_keyed_buffer(INSTANCE_MATRIX_ATTR, time_key, MATRIX_COMPONENTS * instance_count);
        for (i, matrix) in transforms.iter().enumerate() {
            input.append_time_keyed_sample(INSTANCE_MATRIX_ATTR, time_key, i, instance_count, matrix)?;
        }
        written.push(time_key);
    }

    Ok(())
}

fn report_no_samples(interface: &mut dyn CookInterface, path: &str, cause: Option<AttrError>) -> CookOutcome {
    match cause {
        Some(err) => log::warn!("{}: {} ({})", path, NO_SAMPLES_MESSAGE, err),
        None => log::warn!("{}: {}", path, NO_SAMPLES_MESSAGE),
    }

    let mut attrs = AttrMap::new();
    set_error(&mut attrs, NO_SAMPLES_MESSAGE);
    attrs.to_interface(interface);

    CookOutcome::NoTransformSamples
}
