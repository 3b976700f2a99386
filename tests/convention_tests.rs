//! Conventions: NONE, policy defaults, and the conversion graph.

mod common;

use std::sync::Arc;

use common::{conv_a, conv_b, conv_p, row, scan_with, standard_registry};
use relopt_core::error::Error;
use relopt_rel::convention::{Convention, ConventionPolicy, ConventionTraitDef};
use relopt_rel::{RelCategory, RelCollation, RelNode, RelTrait, RelTraitDef, RelTraitSet, RelRef};

#[test]
fn test_none_converts_to_nothing() {
    let none = Convention::none();
    for target in [conv_a(), conv_b(), conv_p(), Convention::none()] {
        assert!(!none.can_convert_convention(&target), "NONE -> {target}");
        assert!(!target.can_convert_convention(&none), "{target} -> NONE");
    }
    assert!(none.is_none());
    assert_eq!(none.interface(), RelCategory::ANY);
    assert!(Arc::ptr_eq(&none, &Convention::none()));
}

#[test]
fn test_none_name_is_reserved() {
    let impostor = Arc::new(Convention::simple("NONE", RelCategory::new("x")));
    assert!(!impostor.is_none());
    let mut def = ConventionTraitDef::new();
    assert!(matches!(
        def.add_convention(Arc::clone(&impostor)),
        Err(Error::Config(_))
    ));
    // the real one is always known
    def.add_convention(Convention::none()).unwrap();
    assert!(def.lookup("NONE").is_some_and(|c| c.is_none()));
}

#[test]
fn test_convertibility_is_opt_in() {
    let (a, b) = (conv_a(), conv_b());
    assert!(a.can_convert_convention(&b));
    assert!(!b.can_convert_convention(&a));
    assert!(!a.can_convert_convention(&conv_p()));
}

#[test]
fn test_convention_satisfies_only_itself() {
    let (a, b) = (conv_a(), conv_b());
    assert!(a.satisfies(a.as_ref()));
    assert!(!a.satisfies(b.as_ref()));
    assert!(!a.satisfies(&RelCollation::empty()));
    let other_interface = Convention::simple("A", RelCategory::new("other"));
    assert_ne!(*a, other_interface);
}

#[test]
fn test_unconfigured_enforce_fails_loudly() {
    let registry = standard_registry();
    let bare = Arc::new(Convention::with_defaults("BARE", RelCategory::new("bare")));
    let traits = registry
        .trait_set([Arc::clone(&bare) as Arc<dyn RelTrait>])
        .unwrap();
    let input = scan_with(traits.clone(), bare.interface());
    let required = traits.replace(RelCollation::of(&[0]).into_trait()).unwrap();

    let err = bare.enforce(&input, &required).unwrap_err();
    assert!(matches!(err, Error::Unsupported { ref convention } if convention == "BARE"));
    assert_eq!(err.to_string(), "BARE#enforce() is not implemented");
    assert!(!bare.can_convert_convention(&conv_a()));
    assert!(!bare.use_abstract_converters_for_conversion(&traits, &required));
}

#[test]
fn test_configured_convention_without_path_returns_none() {
    let registry = standard_registry();
    let b = conv_b();
    let traits = registry.trait_set([Arc::clone(&b) as Arc<dyn RelTrait>]).unwrap();
    let input = scan_with(traits.clone(), b.interface());
    let required = traits.replace(RelCollation::of(&[0]).into_trait()).unwrap();
    assert!(b.enforce(&input, &required).unwrap().is_none());
}

#[test]
fn test_custom_policy_overrides_single_default() {
    struct OnlyConverts;
    impl ConventionPolicy for OnlyConverts {
        fn can_convert_convention(&self, _: &Convention, target: &Convention) -> bool {
            target.name() == "B"
        }
    }
    let c = Convention::new("C", RelCategory::new("c"), OnlyConverts);
    assert!(c.can_convert_convention(&conv_b()));

    // enforce keeps the loud default
    let registry = standard_registry();
    let set = registry.default_trait_set();
    let input: RelRef = scan_with(set.clone(), RelCategory::LOGICAL);
    assert!(matches!(
        c.enforce(&input, &set),
        Err(Error::Unsupported { .. })
    ));
}

#[test]
fn test_conversion_graph() {
    let mut def = ConventionTraitDef::new();
    let (a, b, p) = (conv_a(), conv_b(), conv_p());
    def.add_conversion(&b, &p).unwrap();

    // B opts out, but an edge exists
    assert!(def.can_convert(b.as_ref(), p.as_ref()));
    // A opts in, no edge needed
    assert!(def.can_convert(a.as_ref(), b.as_ref()));
    assert!(!def.can_convert(p.as_ref(), b.as_ref()));
    assert!(!def.can_convert(Convention::none().as_ref(), p.as_ref()));
    assert!(def.can_convert(a.as_ref(), a.as_ref()));

    assert!(matches!(
        def.add_conversion(&Convention::none(), &a),
        Err(Error::Config(_))
    ));
    assert_eq!(def.lookup("P").map(|c| c.name()), Some("P"));
    assert_eq!(def.default_trait().to_string(), "NONE");
}

#[test]
fn test_physical_policy_enforces_sort() {
    let registry = standard_registry();
    let p = conv_p();
    let traits = registry
        .trait_set([Arc::clone(&p) as Arc<dyn RelTrait>])
        .unwrap();
    let input = scan_with(traits.clone(), p.interface());
    let required: RelTraitSet = traits.replace(RelCollation::of(&[1]).into_trait()).unwrap();

    let sorted = p.enforce(&input, &required).unwrap().unwrap();
    assert_eq!(sorted.name(), "Sort");
    assert_eq!(sorted.category(), p.interface());
    assert!(sorted.trait_set().satisfies(&required));
    assert_eq!(sorted.row_type(), &row());

    // the input must already be in the enforcing convention
    let logical = scan_with(registry.default_trait_set(), RelCategory::LOGICAL);
    assert!(p.enforce(&logical, &required).unwrap().is_none());
}
