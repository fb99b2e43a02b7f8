//! Cook every point instancer in a scene file and print the resulting nodes.
//!
//! Run with: cargo run --bin scatter -- demos/forest.json
//! Set RUST_LOG=debug to see each cook's terminal state.

use std::env;

use anyhow::{Context, Result};
use scatter_core::attr::{Attr, GroupAttr};
use scatter_core::{ChildDescriptor, CookedNode, SceneFile};

/// Longest value list printed in full.
const MAX_VALUES: usize = 8;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: scatter <scene.json>");
        println!("\nExamples:");
        println!("  cargo run --bin scatter -- demos/forest.json");
        return Ok(());
    }

    let path = &args[1];
    let scene = SceneFile::load(path).with_context(|| format!("Failed to load scene file '{}'", path))?;
    log::info!("Loaded {} instancer(s) from {}", scene.instancers.len(), path);

    for cooked in scene.cook_all() {
        for line in describe(&cooked) {
            println!("{}", line);
        }
    }

    Ok(())
}

fn describe(cooked: &CookedNode) -> Vec<String> {
    let mut lines = vec![
        format!("\n=== {} ===", cooked.path),
        format!("Outcome: {:?}", cooked.outcome),
        "\n--- Attributes ---".to_string(),
    ];
    for (name, attr) in cooked.node.attrs() {
        push_attr(&mut lines, name, attr, 1);
    }

    lines.push("\n--- Children ---".to_string());
    for child in cooked.node.children() {
        match child {
            ChildDescriptor::Intermediate { name, args, .. } => {
                lines.push(format!("  [intermediate] {}", name));
                push_group(&mut lines, args, 2);
            }
            ChildDescriptor::Final { scene } => {
                lines.push("  [final]".to_string());
                push_group(&mut lines, scene, 2);
            }
        }
    }

    lines
}

fn push_group(lines: &mut Vec<String>, group: &GroupAttr, depth: usize) {
    for (name, attr) in group.iter() {
        push_attr(lines, name, attr, depth);
    }
}

fn push_attr(lines: &mut Vec<String>, name: &str, attr: &Attr, depth: usize) {
    let indent = "  ".repeat(depth);
    match attr {
        Attr::Group(group) => {
            lines.push(format!("{}{}:", indent, name));
            push_group(lines, group, depth + 1);
        }
        Attr::Int(data) => lines.push(format!("{}{} = {}", indent, name, summarize(data.values()))),
        Attr::String(data) => lines.push(format!("{}{} = {}", indent, name, summarize(data.values()))),
        Attr::Double(data) if data.sample_count() == 1 => {
            lines.push(format!("{}{} = {}", indent, name, summarize(data.values())));
        }
        Attr::Double(data) => {
            lines.push(format!("{}{} ({} time samples):", indent, name, data.sample_count()));
            for sample in data.samples() {
                lines.push(format!("{}  @{} = {}", indent, sample.time, summarize(&sample.values)));
            }
        }
    }
}

fn summarize<T: std::fmt::Debug>(values: &[T]) -> String {
    match values {
        [single] => format!("{:?}", single),
        _ if values.len() <= MAX_VALUES => format!("{:?}", values),
        _ => format!("{:?} ... ({} values)", &values[..MAX_VALUES], values.len()),
    }
}
