//! Project node: computes one output field per expression, with renaming.

use std::any::Any;

use relopt_core::error::{Error, Result};
use relopt_core::id::RelId;
use relopt_core::schema::{Field, Schema};
use relopt_rex::RexNode;

use crate::convention::RelCategory;
use crate::filter::check_input_refs;
use crate::plan::ExplainTerms;
use crate::rel::{RelNode, RelRef};
use crate::trait_set::RelTraitSet;

#[derive(Debug)]
pub struct Project {
    id: RelId,
    input: RelRef,
    exprs: Vec<RexNode>,
    row_type: Schema,
    traits: RelTraitSet,
    category: RelCategory,
}

impl Project {
    /// Logical projection; see [`Project::with_category`].
    pub fn new(input: RelRef, exprs: Vec<RexNode>, names: Vec<String>) -> Result<Self> {
        Self::with_category(input, exprs, names, RelCategory::LOGICAL)
    }

    /// `names` gives the output field names; an empty list names fields
    /// `$f0`, `$f1`, ... Input references keep their input field's name.
    ///
    /// Collation and distribution are carried over through the input
    /// references; see [`project_traits`].
    pub fn with_category(
        input: RelRef,
        exprs: Vec<RexNode>,
        names: Vec<String>,
        category: RelCategory,
    ) -> Result<Self> {
        if !names.is_empty() && names.len() != exprs.len() {
            return Err(Error::Expr(format!(
                "project has {} expression(s) but {} name(s)",
                exprs.len(),
                names.len()
            )));
        }
        let mut fields = Vec::with_capacity(exprs.len());
        for (i, expr) in exprs.iter().enumerate() {
            check_input_refs(expr, input.row_type())?;
            let name = match (names.get(i), expr) {
                (Some(name), _) => name.clone(),
                (None, RexNode::InputRef(r)) => input
                    .row_type()
                    .field(r.index())
                    .map_or_else(|| format!("$f{i}"), |f| f.name.clone()),
                (None, _) => format!("$f{i}"),
            };
            if fields.iter().any(|f: &Field| f.name == name) {
                return Err(Error::Expr(format!("duplicate output field '{name}'")));
            }
            let ty = expr.ty();
            fields.push(Field::new(name, ty.data_type, ty.nullable));
        }
        let traits = project_traits(input.trait_set(), &exprs);
        Ok(Self {
            id: RelId::next(),
            input,
            exprs,
            row_type: Schema::new(fields),
            traits,
            category,
        })
    }

    pub fn input(&self) -> &RelRef {
        &self.input
    }

    pub fn projects(&self) -> &[RexNode] {
        &self.exprs
    }
}

/// Input traits renumbered onto the output fields. Input field `$i` maps to
/// the first output position that is a plain reference to it; collation
/// keeps its longest mapped prefix and a keyed distribution with an unmapped
/// key falls back to `Any`.
pub fn project_traits(input: &RelTraitSet, exprs: &[RexNode]) -> RelTraitSet {
    let target = |field: usize| {
        exprs
            .iter()
            .position(|e| matches!(e, RexNode::InputRef(r) if r.index() == field))
    };
    let mut traits = input.clone();
    if let Some(collation) = input.collation() {
        traits = traits.replace_if_present(collation.apply_mapping(target).into_trait());
    }
    if let Some(distribution) = input.distribution() {
        traits = traits.replace_if_present(distribution.apply_mapping(target).into_trait());
    }
    traits
}

impl RelNode for Project {
    fn id(&self) -> RelId {
        self.id
    }

    fn name(&self) -> &'static str {
        "Project"
    }

    fn category(&self) -> RelCategory {
        self.category
    }

    fn trait_set(&self) -> &RelTraitSet {
        &self.traits
    }

    fn row_type(&self) -> &Schema {
        &self.row_type
    }

    fn inputs(&self) -> Vec<RelRef> {
        vec![RelRef::clone(&self.input)]
    }

    fn exprs(&self) -> Vec<&RexNode> {
        self.exprs.iter().collect()
    }

    fn explain_terms(&self, terms: &mut ExplainTerms) {
        for (expr, field) in self.exprs.iter().zip(&self.row_type.fields) {
            terms.item(&field.name, expr);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
