//! Trait resolution through a planning session.

mod common;

use std::sync::Arc;

use common::{
    as_trait, conv_a, conv_b, conv_p, row, scan_in, scan_with, session, session_with,
};
use relopt_core::config::PlannerConfig;
use relopt_core::error::Error;
use relopt_planner::{Phase, PlanningSession, Resolution};
use relopt_rel::convention::{Convention, ConventionPolicy, PhysicalPolicy};
use relopt_rel::rel::downcast_rel;
use relopt_rel::sort::Sort;
use relopt_rel::{
    Converter, RelCategory, RelCollation, RelDistribution, RelNode, RelRef, RelTraitSet,
    TraitKind,
};

#[test]
fn test_converter_bridges_a_to_b() {
    let (a, b) = (conv_a(), conv_b());
    let session = session(&[Arc::clone(&a), Arc::clone(&b)]);
    let e = scan_in(&session, &a);
    let required = session.trait_set([as_trait(&b)]).unwrap();

    let Resolution::Converted(converted) = session.resolve(&e, &required).unwrap() else {
        panic!("expected a converter");
    };
    let converter = converted.as_converter().expect("converter node");
    assert_eq!(converter.trait_def(), Some(TraitKind::CONVENTION));
    assert_eq!(converter.input().id(), e.id());
    assert_eq!(converter.input_traits(), e.trait_set());
    assert_eq!(converted.trait_set().convention().unwrap().name(), "B");
    assert_eq!(session.stats().converters_created, 1);

    // asking the converter's output for B again needs nothing more
    let again = session.resolve(&converted, &required).unwrap();
    assert!(matches!(again, Resolution::Satisfied(ref rel) if rel.id() == converted.id()));
    assert_eq!(session.stats().converters_created, 1);

    // B opts out of every conversion, so going back to A is pruned
    let back = session.trait_set([as_trait(&a)]).unwrap();
    assert!(matches!(
        session.resolve(&converted, &back).unwrap(),
        Resolution::Unsatisfiable { .. }
    ));
    assert_eq!(session.stats().pruned, 1);
}

#[test]
fn test_none_is_neither_source_nor_target() {
    let a = conv_a();
    let session = session(&[Arc::clone(&a)]);
    let logical = scan_in(&session, &Convention::none());
    let in_a = scan_in(&session, &a);

    let want_a = session.trait_set([as_trait(&a)]).unwrap();
    let resolution = session.resolve(&logical, &want_a).unwrap();
    assert!(!resolution.is_satisfiable());

    let want_none = session.default_trait_set().unwrap();
    let Resolution::Unsatisfiable { reason } = session.resolve(&in_a, &want_none).unwrap() else {
        panic!("NONE must not be reachable");
    };
    assert!(reason.contains("NONE"), "{reason}");

    // NONE satisfies itself
    assert!(matches!(
        session.resolve(&logical, &want_none).unwrap(),
        Resolution::Satisfied(_)
    ));
}

#[test]
fn test_enforcement_inserts_exchange_and_sort() {
    let p = conv_p();
    let mut session = session(&[Arc::clone(&p)]);
    let input = scan_in(&session, &p);
    let required = session
        .trait_set([
            as_trait(&p),
            RelCollation::of(&[0]).into_trait(),
            RelDistribution::hash_distributed(vec![1]).into_trait(),
        ])
        .unwrap();

    let Resolution::Enforced(enforced) = session.resolve(&input, &required).unwrap() else {
        panic!("expected enforcement");
    };
    let sort = downcast_rel::<Sort>(enforced.as_ref()).expect("sort on top");
    assert_eq!(sort.collation(), &RelCollation::of(&[0]));
    assert_eq!(sort.category(), p.interface());
    assert_eq!(enforced.inputs()[0].name(), "Exchange");
    assert!(enforced.trait_set().satisfies(&required));
    assert_eq!(enforced.row_type(), &row());
    assert_eq!(session.stats().enforced, 1);

    let plan = session.finish(enforced.as_ref()).unwrap();
    assert_eq!(session.phase(), Phase::Finished);
    let text = plan.render();
    assert!(text.starts_with("Sort.P.[0].hash[1](collation=[0])\n"), "{text}");
    assert!(text.contains("    Scan.P.[].any(table=t)"), "{text}");
}

#[test]
fn test_exchange_forgets_input_order() {
    let p = conv_p();
    let session = session(&[Arc::clone(&p)]);
    let sorted = session
        .trait_set([as_trait(&p), RelCollation::of(&[0]).into_trait()])
        .unwrap();
    let input = scan_with(sorted, p.interface());
    let required = session
        .trait_set([
            as_trait(&p),
            RelCollation::of(&[0]).into_trait(),
            RelDistribution::hash_distributed(vec![1]).into_trait(),
        ])
        .unwrap();

    let Resolution::Enforced(enforced) = session.resolve(&input, &required).unwrap() else {
        panic!("expected enforcement");
    };
    // the input was sorted, but the exchange shuffles it, so a sort is needed on top
    assert_eq!(enforced.name(), "Sort");
    let exchange = &enforced.inputs()[0];
    assert_eq!(exchange.name(), "Exchange");
    assert_eq!(exchange.trait_set().collation(), Some(&RelCollation::empty()));
    assert!(enforced.trait_set().satisfies(&required));
}

#[test]
fn test_unconfigured_convention_surfaces_unsupported() {
    let bare = Arc::new(Convention::with_defaults("BARE", RelCategory::new("bare")));
    let session = session(&[Arc::clone(&bare)]);
    let input = scan_in(&session, &bare);
    let required = session
        .trait_set([as_trait(&bare), RelCollation::of(&[0]).into_trait()])
        .unwrap();
    let err = session.resolve(&input, &required).unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }));
    assert!(err.is_configuration());

    // already satisfied requests never reach enforce
    let plain = session.trait_set([as_trait(&bare)]).unwrap();
    assert!(session.resolve(&input, &plain).unwrap().is_satisfiable());
}

#[test]
fn test_configured_convention_without_path_prunes() {
    let b = conv_b();
    let session = session(&[Arc::clone(&b)]);
    let input = scan_in(&session, &b);
    let required = session
        .trait_set([as_trait(&b), RelCollation::of(&[0]).into_trait()])
        .unwrap();
    assert!(matches!(
        session.resolve(&input, &required).unwrap(),
        Resolution::Unsatisfiable { .. }
    ));
}

fn abstract_convention() -> Arc<Convention> {
    Arc::new(Convention::new(
        "Q",
        RelCategory::new("q"),
        PhysicalPolicy::new().abstract_converters(),
    ))
}

fn want_hash(session: &PlanningSession, q: &Arc<Convention>) -> RelTraitSet {
    session
        .trait_set([
            as_trait(q),
            RelDistribution::hash_distributed(vec![0]).into_trait(),
        ])
        .unwrap()
}

#[test]
fn test_abstract_converters_need_config_and_convention() {
    let q = abstract_convention();
    let session = session(&[Arc::clone(&q)]);
    let input = scan_in(&session, &q);
    let required = want_hash(&session, &q);

    let Resolution::Converted(converted) = session.resolve(&input, &required).unwrap() else {
        panic!("expected an abstract converter");
    };
    let converter = converted.as_converter().expect("converter node");
    assert_eq!(converter.trait_def(), Some(TraitKind::DISTRIBUTION));
    assert!(converted.trait_set().satisfies(&required));

    // collation cannot be converted generically
    let sorted = session
        .trait_set([as_trait(&q), RelCollation::of(&[0]).into_trait()])
        .unwrap();
    assert!(!session.resolve(&input, &sorted).unwrap().is_satisfiable());

    // the session-wide gate wins over the convention's opt-in
    let config = PlannerConfig {
        allow_abstract_converters: false,
        ..Default::default()
    };
    let gated = session_with(config, &[Arc::clone(&q)]);
    let input = scan_in(&gated, &q);
    let required = want_hash(&gated, &q);
    assert!(!gated.resolve(&input, &required).unwrap().is_satisfiable());
}

#[test]
fn test_conversion_then_enforcement() {
    let p = Arc::new(Convention::new(
        "P",
        RelCategory::new("p"),
        PhysicalPolicy::new().sorts(),
    ));
    let b = conv_b();
    let mut setup = PlanningSession::with_standard_traits(PlannerConfig::default()).unwrap();
    setup.add_convention(Arc::clone(&p)).unwrap();
    setup.add_conversion(&b, &p).unwrap();
    setup.begin_search().unwrap();

    let input = scan_in(&setup, &b);
    let required = setup
        .trait_set([as_trait(&p), RelCollation::of(&[2]).into_trait()])
        .unwrap();
    let Resolution::Enforced(rel) = setup.resolve(&input, &required).unwrap() else {
        panic!("expected conversion followed by enforcement");
    };
    assert_eq!(rel.name(), "Sort");
    assert_eq!(rel.inputs()[0].name(), "Converter");
    let stats = setup.stats();
    assert_eq!((stats.converters_created, stats.enforced), (1, 1));
}

#[test]
fn test_enforcer_must_meet_the_requirement() {
    struct Liar;
    impl ConventionPolicy for Liar {
        fn enforce(
            &self,
            _: &Convention,
            input: &RelRef,
            _: &RelTraitSet,
        ) -> relopt_core::error::Result<Option<RelRef>> {
            Ok(Some(Arc::clone(input)))
        }
    }
    let liar = Arc::new(Convention::new("LIAR", RelCategory::new("liar"), Liar));
    let session = session(&[Arc::clone(&liar)]);
    let input = scan_in(&session, &liar);
    let required = session
        .trait_set([as_trait(&liar), RelCollation::of(&[0]).into_trait()])
        .unwrap();
    assert!(matches!(
        session.resolve(&input, &required),
        Err(Error::Invariant(_))
    ));
}

#[test]
fn test_lifecycle_is_enforced() {
    let a = conv_a();
    let mut session = PlanningSession::with_standard_traits(PlannerConfig::default()).unwrap();
    assert_eq!(session.phase(), Phase::Registering);
    assert!(matches!(session.default_trait_set(), Err(Error::Config(_))));
    assert!(matches!(
        session.add_conversion(&Convention::none(), &a),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        session.register_trait_def(Arc::new(relopt_rel::ConventionTraitDef::new())),
        Err(Error::Config(_))
    ));
    assert!(!session
        .register_trait_def(Arc::new(relopt_rel::RelCollationTraitDef))
        .unwrap());

    session.add_convention(Arc::clone(&a)).unwrap();
    assert!(session.convention("A").is_some());
    session.begin_search().unwrap();
    assert_eq!(session.phase(), Phase::Searching);
    assert_eq!(session.convention("A").as_deref(), Some(a.as_ref()));
    assert!(session.convention("NONE").is_some_and(|c| c.is_none()));
    assert!(session.convention("B").is_none());
    assert_eq!(session.registry().len(), 3);
    assert!(session.add_convention(conv_b()).unwrap_err().is_configuration());
    assert!(matches!(
        session.register_trait_def(Arc::new(relopt_rel::RelDistributionTraitDef)),
        Err(Error::Config(_))
    ));
    assert!(matches!(session.begin_search(), Err(Error::Config(_))));
}

#[test]
fn test_foreign_trait_set_is_rejected() {
    let a = conv_a();
    let session = session(&[Arc::clone(&a)]);
    let narrow = PlanningSession::new(PlannerConfig::default())
        .and_then(|mut s| {
            s.begin_search()?;
            Ok(s)
        })
        .unwrap();
    let input = scan_in(&session, &a);
    let foreign = narrow.default_trait_set().unwrap();
    assert!(matches!(
        session.resolve(&input, &foreign),
        Err(Error::Registry(_))
    ));
}
