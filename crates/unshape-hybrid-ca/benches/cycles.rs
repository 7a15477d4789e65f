//! Benchmarks for state-space analysis and replacement search.
//!
//! Run with: cargo bench -p unshape-hybrid-ca

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use unshape_hybrid_ca::{
    AnalysisConfig, Boundary, RuleVector, StateGraph, analyze_all, evolve, find_cycle,
    hybrid_sweep, search_maximal,
};

fn bench_evolve(c: &mut Criterion) {
    let rules = RuleVector::uniform(30, 16).unwrap();

    c.bench_function("evolve_16_cells_all_states", |b| {
        b.iter(|| {
            for state in 0..1u32 << 16 {
                black_box(evolve(black_box(state), &rules, Boundary::Periodic));
            }
        });
    });
}

fn bench_find_cycle(c: &mut Criterion) {
    // Cycles through all 1023 nonzero states from 1.
    let rules: Vec<u8> = (0..10)
        .map(|i| if i % 2 == 0 { 90 } else { 150 })
        .collect();
    let rules = RuleVector::new(rules).unwrap();

    c.bench_function("find_cycle_hybrid_10_null", |b| {
        b.iter(|| find_cycle(black_box(1), &rules, Boundary::Null, 1 << 10))
    });
}

fn bench_analyze_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_all");

    for width in [8, 10, 12] {
        let rules: Vec<u8> = (0..width)
            .map(|i| if i % 2 == 0 { 90 } else { 150 })
            .collect();
        let rules = RuleVector::new(rules).unwrap();
        group.bench_function(format!("hybrid_{width}_null"), |b| {
            b.iter(|| analyze_all(black_box(&rules), Boundary::Null))
        });
    }

    group.finish();
}

fn bench_state_graph(c: &mut Criterion) {
    let rules = RuleVector::uniform(110, 12).unwrap();

    c.bench_function("state_graph_rule_110_12", |b| {
        b.iter(|| StateGraph::build(black_box(&rules), Boundary::Periodic))
    });
}

fn bench_hybrid_sweep(c: &mut Criterion) {
    c.bench_function("hybrid_sweep_8_periodic", |b| {
        b.iter(|| hybrid_sweep(black_box(8), Boundary::Periodic))
    });
}

fn bench_search(c: &mut Criterion) {
    let base = RuleVector::new(vec![90, 90, 90, 90, 90]).unwrap();
    let config = AnalysisConfig::new(Boundary::Periodic);

    c.bench_function("search_maximal_two_positions", |b| {
        b.iter(|| search_maximal(black_box(&base), &config))
    });
}

criterion_group!(
    benches,
    bench_evolve,
    bench_find_cycle,
    bench_analyze_all,
    bench_state_graph,
    bench_hybrid_sweep,
    bench_search,
);
criterion_main!(benches);
