//! Leaf node reading a named table.

use std::any::Any;

use relopt_core::id::RelId;
use relopt_core::schema::Schema;

use crate::convention::RelCategory;
use crate::plan::ExplainTerms;
use crate::rel::{RelNode, RelRef};
use crate::trait_set::RelTraitSet;

#[derive(Debug)]
pub struct Scan {
    id: RelId,
    table: String,
    row_type: Schema,
    traits: RelTraitSet,
    category: RelCategory,
}

impl Scan {
    pub fn new(table: impl Into<String>, row_type: Schema, traits: RelTraitSet) -> Self {
        Self {
            id: RelId::next(),
            table: table.into(),
            row_type,
            traits,
            category: RelCategory::LOGICAL,
        }
    }

    pub fn with_category(mut self, category: RelCategory) -> Self {
        self.category = category;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl RelNode for Scan {
    fn id(&self) -> RelId {
        self.id
    }

    fn name(&self) -> &'static str {
        "Scan"
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
        Vec::new()
    }

    fn explain_terms(&self, terms: &mut ExplainTerms) {
        terms.item("table", &self.table);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
