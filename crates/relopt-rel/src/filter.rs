//! Filter node: keeps the rows for which a boolean condition holds.

use std::any::Any;

use relopt_core::error::{Error, Result};
use relopt_core::id::RelId;
use relopt_core::schema::Schema;
use relopt_rex::util::input_refs;
use relopt_rex::RexNode;

use crate::convention::RelCategory;
use crate::plan::ExplainTerms;
use crate::rel::{RelNode, RelRef};
use crate::trait_set::RelTraitSet;

#[derive(Debug)]
pub struct Filter {
    id: RelId,
    input: RelRef,
    condition: RexNode,
    traits: RelTraitSet,
    category: RelCategory,
}

impl Filter {
    /// Logical filter carrying its input's traits.
    pub fn new(input: RelRef, condition: RexNode) -> Result<Self> {
        let traits = input.trait_set().clone();
        Self::with_traits(input, condition, traits, RelCategory::LOGICAL)
    }

    pub fn with_traits(
        input: RelRef,
        condition: RexNode,
        traits: RelTraitSet,
        category: RelCategory,
    ) -> Result<Self> {
        if !condition.ty().is_boolean() {
            return Err(Error::Expr(format!(
                "filter condition {condition} has type {}, expected BOOLEAN",
                condition.ty()
            )));
        }
        check_input_refs(&condition, input.row_type())?;
        Ok(Self {
            id: RelId::next(),
            input,
            condition,
            traits,
            category,
        })
    }

    pub fn condition(&self) -> &RexNode {
        &self.condition
    }

    pub fn input(&self) -> &RelRef {
        &self.input
    }
}

/// Reject expressions that reference fields the row does not have.
pub(crate) fn check_input_refs(expr: &RexNode, row: &Schema) -> Result<()> {
    match input_refs(expr).into_iter().find(|&i| i >= row.len()) {
        Some(i) => Err(Error::Expr(format!(
            "{expr} references ${i} but the input has {} field(s)",
            row.len()
        ))),
        None => Ok(()),
    }
}

impl RelNode for Filter {
    fn id(&self) -> RelId {
        self.id
    }

    fn name(&self) -> &'static str {
        "Filter"
    }

    fn category(&self) -> RelCategory {
        self.category
    }

    fn trait_set(&self) -> &RelTraitSet {
        &self.traits
    }

    fn row_type(&self) -> &Schema {
        self.input.row_type()
    }

    fn inputs(&self) -> Vec<RelRef> {
        vec![RelRef::clone(&self.input)]
    }

    fn exprs(&self) -> Vec<&RexNode> {
        vec![&self.condition]
    }

    fn explain_terms(&self, terms: &mut ExplainTerms) {
        terms.item("condition", &self.condition);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
