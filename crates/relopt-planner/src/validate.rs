//! Final-plan validation.
//!
//! A chosen plan is implementable when every node carries a real (non-NONE)
//! convention whose interface admits the node, every trait set matches the
//! session's layout, and every converter keeps the single-slot law against
//! its actual input.

use std::collections::HashSet;

use relopt_core::error::{Error, Result};
use relopt_core::id::RelId;
use relopt_rel::converter::check_single_slot;
use relopt_rel::{RelNode, TraitDefRegistry};

pub fn validate_plan(registry: &TraitDefRegistry, root: &dyn RelNode) -> Result<()> {
    let mut seen = HashSet::new();
    validate_node(registry, root, &mut seen)
}

fn validate_node(
    registry: &TraitDefRegistry,
    rel: &dyn RelNode,
    seen: &mut HashSet<RelId>,
) -> Result<()> {
    if !seen.insert(rel.id()) {
        return Ok(());
    }
    let traits = rel.trait_set();
    if !registry.conforms(traits) {
        return Err(not_implementable(rel, &format!("trait set {traits} has the wrong layout")));
    }
    let Some(convention) = traits.convention() else {
        return Err(not_implementable(rel, "no convention"));
    };
    if convention.is_none() {
        return Err(not_implementable(rel, "still in the NONE convention"));
    }
    if !convention.interface().admits(rel.category()) {
        return Err(not_implementable(
            rel,
            &format!(
                "category '{}' is not legal under {convention} (interface '{}')",
                rel.category(),
                convention.interface()
            ),
        ));
    }
    if let Some(converter) = rel.as_converter() {
        let input = converter.input();
        if input.trait_set() != converter.input_traits() {
            return Err(not_implementable(
                rel,
                &format!(
                    "declares input traits {} but its input has {}",
                    converter.input_traits(),
                    input.trait_set()
                ),
            ));
        }
        check_single_slot(converter.input_traits(), traits, converter.trait_def())
            .map_err(|e| not_implementable(rel, &e.to_string()))?;
    }
    for input in rel.inputs() {
        validate_node(registry, input.as_ref(), seen)?;
    }
    Ok(())
}

fn not_implementable(rel: &dyn RelNode, why: &str) -> Error {
    #[cfg(feature = "tracing")]
    tracing::debug!(rel = rel.name(), id = %rel.id(), why, "plan validation failed");
    Error::NotImplementable(format!("{} {}: {why}", rel.name(), rel.id()))
}
