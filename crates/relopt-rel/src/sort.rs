//! Sort node: imposes a collation on its input.

use std::any::Any;

use relopt_core::error::{Error, Result};
use relopt_core::id::RelId;
use relopt_core::schema::Schema;

use crate::collation::RelCollation;
use crate::convention::RelCategory;
use crate::plan::ExplainTerms;
use crate::rel::{RelNode, RelRef};
use crate::trait_set::RelTraitSet;

#[derive(Debug)]
pub struct Sort {
    id: RelId,
    input: RelRef,
    collation: RelCollation,
    traits: RelTraitSet,
    category: RelCategory,
}

impl Sort {
    /// The output carries the input's traits with the collation slot set to
    /// `collation`.
    pub fn new(input: RelRef, collation: RelCollation, category: RelCategory) -> Result<Self> {
        if let Some(bad) = collation
            .fields()
            .iter()
            .find(|fc| fc.field >= input.row_type().len())
        {
            return Err(Error::Expr(format!(
                "sort key {} is out of range for a row with {} field(s)",
                bad.field,
                input.row_type().len()
            )));
        }
        let traits = input.trait_set().replace(collation.clone().into_trait())?;
        Ok(Self {
            id: RelId::next(),
            input,
            collation,
            traits,
            category,
        })
    }

    pub fn collation(&self) -> &RelCollation {
        &self.collation
    }

    pub fn input(&self) -> &RelRef {
        &self.input
    }
}

impl RelNode for Sort {
    fn id(&self) -> RelId {
        self.id
    }

    fn name(&self) -> &'static str {
        "Sort"
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

    fn explain_terms(&self, terms: &mut ExplainTerms) {
        terms.item("collation", &self.collation);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
