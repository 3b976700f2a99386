use criterion::{criterion_group, criterion_main, Criterion};
use relopt_core::config::PlannerConfig;
use relopt_core::schema::{DataType, Field, Schema};
use relopt_rel::{RelCollation, RelDistribution};
use relopt_planner::PlanningSession;
use relopt_rex::{RexBuilder, RexNode};

fn wide_row(width: usize) -> Schema {
    Schema::new(
        (0..width)
            .map(|i| Field::new(format!("c{i}"), DataType::Int64, i % 2 == 0))
            .collect(),
    )
}

/// `($0 = 0) AND ($1 = 1) AND ...` over `width` fields.
fn conjunction(rex: &RexBuilder, row: &Schema) -> RexNode {
    let terms = (0..row.len())
        .map(|i| {
            let field = rex.input_ref(row, i).unwrap();
            rex.equals(field, rex.literal(i as i64)).unwrap()
        })
        .collect();
    rex.and(terms).unwrap()
}

fn bench_expression_digest(c: &mut Criterion) {
    let row = wide_row(64);
    let rex = RexBuilder::new(&PlannerConfig::default());
    c.bench_function("rex_conjunction_64", |b| {
        b.iter(|| {
            let expr = conjunction(&rex, &row);
            assert_eq!(expr.node_count(), 1 + 64 * 3);
        })
    });
    let expr = conjunction(&rex, &row);
    c.bench_function("rex_fingerprint_64", |b| b.iter(|| expr.fingerprint()));
}

fn bench_trait_set_satisfaction(c: &mut Criterion) {
    let mut session = PlanningSession::with_standard_traits(PlannerConfig::default()).unwrap();
    session.begin_search().unwrap();
    let provided = session
        .trait_set([
            RelCollation::of(&[0, 1, 2, 3]).into_trait(),
            RelDistribution::hash_distributed(vec![0, 1]).into_trait(),
        ])
        .unwrap();
    let required = session
        .trait_set([
            RelCollation::of(&[0, 1]).into_trait(),
            RelDistribution::Random.into_trait(),
        ])
        .unwrap();
    c.bench_function("trait_set_satisfies", |b| {
        b.iter(|| assert!(provided.satisfies(&required)))
    });
}

criterion_group!(planner, bench_expression_digest, bench_trait_set_satisfaction);
criterion_main!(planner);
