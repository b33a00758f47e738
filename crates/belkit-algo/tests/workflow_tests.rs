//! End-to-end workflow tests: overlay → mechanism generation → diffusion →
//! aggregation, plus cross-module determinism checks.

use std::collections::HashMap;

use belkit_algo::{
    generate_bioprocess_mechanisms, summarize_stability, workflow_mean, MultirunConfig, Runner,
    RunnerConfig,
};
use belkit_graph::{overlay_measurements, BelGraph, BelNode, Relation};

fn p(name: &str) -> BelNode {
    BelNode::protein("HGNC", name)
}

fn bp(name: &str) -> BelNode {
    BelNode::bioprocess("GO", name)
}

/// A -> B -> D and A -> C -> D with causal increases throughout; A carries
/// the only measurement (2.0).
fn two_path_graph() -> BelGraph {
    let mut graph = BelGraph::new();
    graph.connect(p("A"), p("B"), Relation::Increases);
    graph.connect(p("B"), bp("D"), Relation::Increases);
    graph.connect(p("A"), p("C"), Relation::Increases);
    graph.connect(p("C"), bp("D"), Relation::Increases);

    let mut measurements = HashMap::new();
    measurements.insert(p("A"), 2.0);
    assert_eq!(overlay_measurements(&mut graph, &measurements, "weight"), 1);
    graph
}

#[test]
fn end_to_end_two_path_score_is_four() {
    let graph = two_path_graph();
    let mechanisms = generate_bioprocess_mechanisms(&graph, "weight").unwrap();
    let mechanism = mechanisms.get(&bp("D")).expect("D is the only bioprocess");
    assert_eq!(mechanism.node_count(), 4);

    let mut runner = Runner::new(mechanism, &bp("D"), RunnerConfig::default()).unwrap();
    runner.run().unwrap();
    assert_eq!(runner.final_score().unwrap(), 4.0);
}

#[test]
fn workflow_mean_matches_single_run_on_acyclic_graph() {
    let graph = two_path_graph();
    let config = MultirunConfig {
        runner: RunnerConfig { seed: Some(7), ..Default::default() },
        runs: 25,
        deadline: None,
    };
    assert_eq!(workflow_mean(&graph, &bp("D"), &config).unwrap(), Some(4.0));
}

#[test]
fn workflow_on_unmeasured_graph_degrades_gracefully() {
    // no measurements at all: pruning empties the mechanism, scoring is
    // skipped, and the caller sees None rather than an error
    let mut graph = BelGraph::new();
    graph.connect(p("A"), bp("D"), Relation::Increases);

    let mean = workflow_mean(&graph, &bp("D"), &MultirunConfig::default()).unwrap();
    assert_eq!(mean, None);
}

#[test]
fn seeded_workflow_is_reproducible_on_cycles() {
    let mut graph = BelGraph::new();
    graph.connect(p("A"), p("B"), Relation::Increases);
    graph.connect(p("B"), p("A"), Relation::Increases);
    graph.connect(p("A"), bp("D"), Relation::Increases);
    graph.connect(p("B"), bp("D"), Relation::Decreases);
    for name in ["A", "B"] {
        let id = graph.node_id(&p(name)).unwrap();
        graph.set_value(id, "weight", 1.0).unwrap();
    }

    let config = MultirunConfig {
        runner: RunnerConfig { seed: Some(13), ..Default::default() },
        runs: 50,
        deadline: None,
    };
    let first = workflow_mean(&graph, &bp("D"), &config).unwrap();
    let second = workflow_mean(&graph, &bp("D"), &config).unwrap();
    assert_eq!(first, second);
    assert!(first.is_some());
}

#[test]
fn stability_summary_is_stable_across_calls() {
    let mut graph = two_path_graph();
    graph.connect(p("B"), p("C"), Relation::NegativeCorrelation);
    graph.connect(p("X"), p("Y"), Relation::Increases);
    graph.connect(p("X"), p("Y"), Relation::Decreases);

    let first = summarize_stability(&graph);
    let second = summarize_stability(&graph);
    assert_eq!(first, second);

    // A increases both B and C, which are negatively correlated
    assert_eq!(first.increase_mismatch_triples, 1);
    assert_eq!(first.contradictory_pairs, 1);
}
