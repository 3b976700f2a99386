//! The relational expression abstraction that traits are attached to.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use relopt_core::id::RelId;
use relopt_core::schema::Schema;
use relopt_rex::RexNode;

use crate::convention::RelCategory;
use crate::converter::Converter;
use crate::plan::ExplainTerms;
use crate::trait_set::RelTraitSet;

/// A node of a relational plan.
///
/// Nodes are immutable: the trait set is fixed at construction and a node
/// with different traits is a different node with a new id.
pub trait RelNode: fmt::Debug + Send + Sync + 'static {
    fn id(&self) -> RelId;

    /// Operator name used in digests and explain output.
    fn name(&self) -> &'static str;

    /// Shape category, checked against the convention's interface when a
    /// final plan is validated.
    fn category(&self) -> RelCategory;

    fn trait_set(&self) -> &RelTraitSet;

    fn row_type(&self) -> &Schema;

    fn inputs(&self) -> Vec<RelRef>;

    /// Scalar expressions this node carries, for rules and cost models.
    fn exprs(&self) -> Vec<&RexNode> {
        Vec::new()
    }

    /// Node-specific attributes; inputs and traits are added by the caller.
    fn explain_terms(&self, _terms: &mut ExplainTerms) {}

    fn as_converter(&self) -> Option<&dyn Converter> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

pub type RelRef = Arc<dyn RelNode>;

/// Canonical content string of a relational expression:
/// `Name.TRAITS(term=value, ..., input#0=<digest>)`.
///
/// Two nodes with equal digests compute the same rows with the same
/// physical traits. The node id is not part of the digest.
pub fn rel_digest(rel: &dyn RelNode) -> String {
    let mut terms = ExplainTerms::default();
    rel.explain_terms(&mut terms);
    let mut out = format!("{}.{}(", rel.name(), rel.trait_set());
    let mut first = true;
    for (name, value) in terms.items() {
        if !first {
            out.push_str(", ");
        }
        first = false;
        out.push_str(name);
        out.push('=');
        out.push_str(value);
    }
    for (i, input) in rel.inputs().iter().enumerate() {
        if !first {
            out.push_str(", ");
        }
        first = false;
        out.push_str(&format!("input#{i}={}", rel_digest(input.as_ref())));
    }
    out.push(')');
    out
}

/// Downcast a node to its concrete type.
pub fn downcast_rel<T: RelNode>(rel: &dyn RelNode) -> Option<&T> {
    rel.as_any().downcast_ref::<T>()
}
