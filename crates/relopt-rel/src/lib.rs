#![forbid(unsafe_code)]
//! relopt-rel: physical traits of relational expressions and the nodes that
//! carry them.
//!
//! Layout:
//! - `traits`, `registry`, `trait_set`: the generic trait abstraction, the
//!   session-owned registry of trait kinds, and fixed-arity trait sets.
//! - `convention`, `collation`, `distribution`: the trait kinds shipped here.
//! - `rel`, `converter`: the `RelNode` abstraction and single-slot converters.
//! - `scan`, `filter`, `project`, `sort`, `exchange`, `factories`: a small
//!   node catalog used as trait carriers and enforcers.

pub mod collation;
pub mod convention;
pub mod converter;
pub mod distribution;
pub mod exchange;
pub mod factories;
pub mod filter;
pub mod plan;
pub mod project;
pub mod registry;
pub mod rel;
pub mod scan;
pub mod sort;
pub mod trait_set;
pub mod traits;

pub use collation::{FieldCollation, RelCollation, RelCollationTraitDef};
pub use convention::{
    Convention, ConventionPolicy, ConventionRef, ConventionTraitDef, PhysicalPolicy, RelCategory,
};
pub use converter::{Converter, ConverterRel};
pub use distribution::{RelDistribution, RelDistributionTraitDef};
pub use factories::RelFactories;
pub use plan::{explain, ExplainTerms, PlanNode};
pub use registry::TraitDefRegistry;
pub use rel::{rel_digest, RelNode, RelRef};
pub use trait_set::RelTraitSet;
pub use traits::{RelTrait, RelTraitDef, TraitKind, TraitRef};
