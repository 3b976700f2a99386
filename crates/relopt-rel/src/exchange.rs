//! Exchange node: redistributes rows between workers.

use std::any::Any;

use relopt_core::error::{Error, Result};
use relopt_core::id::RelId;
use relopt_core::schema::Schema;

use crate::collation::RelCollation;
use crate::convention::RelCategory;
use crate::distribution::RelDistribution;
use crate::plan::ExplainTerms;
use crate::rel::{RelNode, RelRef};
use crate::trait_set::RelTraitSet;

#[derive(Debug)]
pub struct Exchange {
    id: RelId,
    input: RelRef,
    distribution: RelDistribution,
    traits: RelTraitSet,
    category: RelCategory,
}

impl Exchange {
    pub fn new(
        input: RelRef,
        distribution: RelDistribution,
        category: RelCategory,
    ) -> Result<Self> {
        if distribution == RelDistribution::Any {
            return Err(Error::Expr(
                "an exchange must produce a concrete distribution".to_string(),
            ));
        }
        let width = input.row_type().len();
        if let Some(&key) = distribution.keys().iter().find(|&&k| k >= width) {
            return Err(Error::Expr(format!(
                "distribution key {key} is out of range for a row with {width} field(s)"
            )));
        }
        // redistributed rows arrive in no particular order
        let traits = input
            .trait_set()
            .replace(distribution.clone().into_trait())?
            .replace_if_present(RelCollation::empty().into_trait());
        Ok(Self {
            id: RelId::next(),
            input,
            distribution,
            traits,
            category,
        })
    }

    pub fn distribution(&self) -> &RelDistribution {
        &self.distribution
    }
}

impl RelNode for Exchange {
    fn id(&self) -> RelId {
        self.id
    }

    fn name(&self) -> &'static str {
        "Exchange"
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
        terms.item("distribution", &self.distribution);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
