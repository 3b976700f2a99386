//! Node-construction callbacks a convention hands to rules and enforcers.

use std::fmt;
use std::sync::Arc;

use relopt_core::error::Result;
use relopt_rex::RexNode;

use crate::collation::RelCollation;
use crate::convention::RelCategory;
use crate::distribution::RelDistribution;
use crate::exchange::Exchange;
use crate::filter::Filter;
use crate::project::Project;
use crate::rel::RelRef;
use crate::sort::Sort;

pub type FilterFactory = Arc<dyn Fn(RelRef, RexNode) -> Result<RelRef> + Send + Sync>;
pub type ProjectFactory =
    Arc<dyn Fn(RelRef, Vec<RexNode>, Vec<String>) -> Result<RelRef> + Send + Sync>;
pub type SortFactory = Arc<dyn Fn(RelRef, RelCollation) -> Result<RelRef> + Send + Sync>;
pub type ExchangeFactory = Arc<dyn Fn(RelRef, RelDistribution) -> Result<RelRef> + Send + Sync>;

/// Every factory keeps its input's trait set apart from the slot the node
/// itself imposes (collation for sort, distribution for exchange).
#[derive(Clone)]
pub struct RelFactories {
    pub filter: FilterFactory,
    pub project: ProjectFactory,
    pub sort: SortFactory,
    pub exchange: ExchangeFactory,
}

impl RelFactories {
    /// Factories building nodes of the given category.
    pub fn for_category(category: RelCategory) -> Self {
        Self {
            filter: Arc::new(move |input: RelRef, condition: RexNode| -> Result<RelRef> {
                let traits = input.trait_set().clone();
                Ok(Arc::new(Filter::with_traits(input, condition, traits, category)?) as RelRef)
            }),
            project: Arc::new(
                move |input: RelRef, exprs: Vec<RexNode>, names: Vec<String>| -> Result<RelRef> {
                    let project = Project::with_category(input, exprs, names, category)?;
                    Ok(Arc::new(project) as RelRef)
                },
            ),
            sort: Arc::new(move |input: RelRef, collation: RelCollation| -> Result<RelRef> {
                Ok(Arc::new(Sort::new(input, collation, category)?) as RelRef)
            }),
            exchange: Arc::new(
                move |input: RelRef, distribution: RelDistribution| -> Result<RelRef> {
                    Ok(Arc::new(Exchange::new(input, distribution, category)?) as RelRef)
                },
            ),
        }
    }
}

/// Logical nodes.
impl Default for RelFactories {
    fn default() -> Self {
        Self::for_category(RelCategory::LOGICAL)
    }
}

impl fmt::Debug for RelFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelFactories").finish_non_exhaustive()
    }
}
