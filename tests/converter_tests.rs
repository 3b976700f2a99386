//! Converters and the single-slot law.

mod common;

use std::sync::Arc;

use common::{as_trait, conv_a, conv_b, scan_with, standard_registry};
use relopt_core::error::Error;
use relopt_rel::convention::Convention;
use relopt_rel::converter::check_single_slot;
use relopt_rel::{
    Converter, ConverterRel, RelCategory, RelCollation, RelDistribution, RelNode, RelRef,
    RelTraitSet, TraitKind, TraitRef,
};

/// Every combination of two conventions, two collations and two
/// distributions over the standard layout.
fn pool() -> Vec<RelTraitSet> {
    let registry = standard_registry();
    let conventions = [as_trait(&conv_a()), as_trait(&conv_b())];
    let collations: [TraitRef; 2] = [
        RelCollation::empty().into_trait(),
        RelCollation::of(&[0]).into_trait(),
    ];
    let distributions: [TraitRef; 2] = [
        RelDistribution::Any.into_trait(),
        RelDistribution::Singleton.into_trait(),
    ];
    let mut sets = Vec::new();
    for c in &conventions {
        for o in &collations {
            for d in &distributions {
                sets.push(
                    registry
                        .trait_set([Arc::clone(c), Arc::clone(o), Arc::clone(d)])
                        .unwrap(),
                );
            }
        }
    }
    sets
}

#[test]
fn test_single_slot_law_over_all_pairs() {
    let sets = pool();
    let kinds = [
        TraitKind::CONVENTION,
        TraitKind::COLLATION,
        TraitKind::DISTRIBUTION,
    ];
    for from in &sets {
        let input = scan_with(from.clone(), RelCategory::ANY);
        for to in &sets {
            let changed = from.difference(to);
            for kind in kinds {
                let built = ConverterRel::with_traits(Arc::clone(&input), Some(kind), to.clone());
                let legal = changed.is_empty() || changed == [kind];
                assert_eq!(built.is_ok(), legal, "{from} -> {to} via {kind}");
                match built {
                    Ok(conv) => {
                        // every slot but `kind` passes through
                        for other in kinds.iter().filter(|k| **k != kind) {
                            assert_eq!(conv.trait_set().get(*other), from.get(*other));
                        }
                        assert_eq!(conv.input_traits(), from);
                    }
                    Err(err) => assert!(matches!(err, Error::Converter(_)), "{err}"),
                }
            }
        }
    }
}

#[test]
fn test_two_slot_change_is_rejected() {
    let registry = standard_registry();
    let from = registry.trait_set([as_trait(&conv_a())]).unwrap();
    let to = registry
        .trait_set([as_trait(&conv_b()), RelCollation::of(&[0]).into_trait()])
        .unwrap();
    assert!(check_single_slot(&from, &to, Some(TraitKind::CONVENTION)).is_err());
    assert!(check_single_slot(&from, &to, Some(TraitKind::COLLATION)).is_err());
    assert!(check_single_slot(&from, &from, None).is_ok());
}

#[test]
fn test_converter_to_target_value() {
    let registry = standard_registry();
    let input = scan_with(
        registry.trait_set([as_trait(&conv_a())]).unwrap(),
        RelCategory::new("a"),
    );
    let conv = ConverterRel::new(Arc::clone(&input), as_trait(&conv_b())).unwrap();
    assert_eq!(conv.trait_def(), Some(TraitKind::CONVENTION));
    assert_eq!(conv.trait_set().convention().unwrap().name(), "B");
    assert_eq!(conv.input().id(), input.id());
    assert_eq!(conv.row_type(), input.row_type());
    assert_eq!(conv.category(), RelCategory::new("b"));
    assert!(conv.as_converter().is_some());
    assert_eq!(conv.inputs().len(), 1);
}

#[test]
fn test_no_converter_targets_none() {
    let registry = standard_registry();
    let input = scan_with(
        registry.trait_set([as_trait(&conv_a())]).unwrap(),
        RelCategory::ANY,
    );
    let none: TraitRef = Convention::none();
    let err = ConverterRel::new(input, none).unwrap_err();
    assert!(matches!(err, Error::Converter(_)));
}

#[test]
fn test_no_op_converter_names_no_kind() {
    let registry = standard_registry();
    let input: RelRef = scan_with(
        registry.trait_set([as_trait(&conv_a())]).unwrap(),
        RelCategory::ANY,
    );
    let conv = ConverterRel::no_op(Arc::clone(&input)).unwrap();
    assert_eq!(conv.trait_def(), None);
    assert_eq!(conv.trait_set(), input.trait_set());

    let changed = input
        .trait_set()
        .replace(RelDistribution::Singleton.into_trait())
        .unwrap();
    assert!(ConverterRel::with_traits(input, None, changed).is_err());
}

#[test]
fn test_missing_slot_is_a_registry_error() {
    let mut registry = relopt_rel::TraitDefRegistry::new();
    registry
        .register(Arc::new(relopt_rel::ConventionTraitDef::new()))
        .unwrap();
    registry.freeze().unwrap();
    let input = scan_with(registry.default_trait_set(), RelCategory::ANY);
    let err = ConverterRel::new(input, RelCollation::of(&[0]).into_trait()).unwrap_err();
    assert!(matches!(err, Error::Registry(_)));
}
