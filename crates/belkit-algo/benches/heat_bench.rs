//! Criterion benchmarks for the diffusion engine.
//!
//! Run with:
//! ```bash
//! cargo bench -p belkit-algo
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use belkit_algo::{generate_mechanism, summarize_stability, Runner, RunnerConfig};
use belkit_graph::{BelGraph, BelNode, Relation};

// ── helpers ─────────────────────────────────────────────────────────────────

fn protein(i: usize) -> BelNode {
    BelNode::protein("HGNC", format!("P{i}"))
}

/// A layered DAG: `layers` layers of `width` proteins, each node feeding
/// every node of the next layer, converging on one bioprocess sink. The
/// first layer carries measurements.
fn layered_graph(layers: usize, width: usize) -> (BelGraph, BelNode) {
    let mut graph = BelGraph::new();
    let sink = BelNode::bioprocess("GO", "sink");

    for layer in 0..layers.saturating_sub(1) {
        for i in 0..width {
            for j in 0..width {
                let relation =
                    if (i + j) % 3 == 0 { Relation::Decreases } else { Relation::Increases };
                graph.connect(
                    protein(layer * width + i),
                    protein((layer + 1) * width + j),
                    relation,
                );
            }
        }
    }
    for i in 0..width {
        graph.connect(protein((layers - 1) * width + i), sink.clone(), Relation::Increases);
    }
    for i in 0..width {
        let id = graph.node_id(&protein(i)).unwrap();
        graph.set_value(id, "weight", (i as f64) - (width as f64) / 2.0).unwrap();
    }
    (graph, sink)
}

// ── runner ───────────────────────────────────────────────────────────────────

fn bench_runner(c: &mut Criterion) {
    let mut group = c.benchmark_group("heat/run");

    for &(layers, width) in &[(4usize, 4usize), (6, 6), (8, 8)] {
        let (graph, sink) = layered_graph(layers, width);
        let mechanism = generate_mechanism(&graph, &sink, Some("weight")).unwrap();

        group.bench_with_input(
            BenchmarkId::new("layered", layers * width),
            &mechanism,
            |b, mechanism| {
                b.iter(|| {
                    let config = RunnerConfig { seed: Some(42), ..Default::default() };
                    let mut runner = Runner::new(mechanism, &sink, config).unwrap();
                    runner.run().unwrap();
                    runner.final_score().unwrap()
                });
            },
        );
    }

    group.finish();
}

// ── mechanism generation ─────────────────────────────────────────────────────

fn bench_generate_mechanism(c: &mut Criterion) {
    let (graph, sink) = layered_graph(6, 6);
    c.bench_function("generation/mechanism", |b| {
        b.iter(|| generate_mechanism(&graph, &sink, Some("weight")).unwrap())
    });
}

// ── stability summary ────────────────────────────────────────────────────────

fn bench_summarize_stability(c: &mut Criterion) {
    let (graph, _) = layered_graph(6, 6);
    c.bench_function("stability/summarize", |b| b.iter(|| summarize_stability(&graph)));
}

// ── criterion wiring ─────────────────────────────────────────────────────────

criterion_group!(benches, bench_runner, bench_generate_mechanism, bench_summarize_stability);
criterion_main!(benches);
