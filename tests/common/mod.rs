//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use relopt_core::config::PlannerConfig;
use relopt_core::schema::{DataType, Field, Schema};
use relopt_planner::PlanningSession;
use relopt_rel::collation::RelCollationTraitDef;
use relopt_rel::convention::{Convention, ConventionRef, ConventionTraitDef, PhysicalPolicy};
use relopt_rel::distribution::RelDistributionTraitDef;
use relopt_rel::scan::Scan;
use relopt_rel::{RelCategory, RelRef, RelTraitSet, TraitDefRegistry, TraitRef};

pub fn row() -> Schema {
    Schema::new(vec![
        Field::new("x", DataType::Int32, false),
        Field::new("y", DataType::Int32, false),
        Field::new("name", DataType::Utf8, true),
    ])
}

/// Convention `A`: no enforcement paths, may be converted to `B`.
pub fn conv_a() -> ConventionRef {
    Arc::new(Convention::new(
        "A",
        RelCategory::new("a"),
        PhysicalPolicy::new().converts_to("B"),
    ))
}

/// Convention `B`: converts to nothing.
pub fn conv_b() -> ConventionRef {
    Arc::new(Convention::simple("B", RelCategory::new("b")))
}

/// Physical convention `P` that enforces with sorts and exchanges.
pub fn conv_p() -> ConventionRef {
    Arc::new(Convention::new(
        "P",
        RelCategory::new("p"),
        PhysicalPolicy::new().sorts().exchanges(),
    ))
}

pub fn as_trait(conv: &ConventionRef) -> TraitRef {
    Arc::clone(conv) as TraitRef
}

/// Session with the standard kinds and the given conventions, already
/// searching.
pub fn session_with(config: PlannerConfig, conventions: &[ConventionRef]) -> PlanningSession {
    let mut session = PlanningSession::with_standard_traits(config).unwrap();
    for conv in conventions {
        session.add_convention(Arc::clone(conv)).unwrap();
    }
    session.begin_search().unwrap();
    session
}

pub fn session(conventions: &[ConventionRef]) -> PlanningSession {
    session_with(PlannerConfig::default(), conventions)
}

/// Table scan whose traits are the defaults with `conv` as convention.
pub fn scan_in(session: &PlanningSession, conv: &ConventionRef) -> RelRef {
    let traits = session.trait_set([as_trait(conv)]).unwrap();
    scan_with(traits, conv.interface())
}

pub fn scan_with(traits: RelTraitSet, category: RelCategory) -> RelRef {
    Arc::new(Scan::new("t", row(), traits).with_category(category))
}

/// Frozen registry with convention, collation and distribution slots.
pub fn standard_registry() -> TraitDefRegistry {
    let mut registry = TraitDefRegistry::new();
    registry.register(Arc::new(ConventionTraitDef::new())).unwrap();
    registry.register(Arc::new(RelCollationTraitDef)).unwrap();
    registry.register(Arc::new(RelDistributionTraitDef)).unwrap();
    registry.freeze().unwrap();
    registry
}
