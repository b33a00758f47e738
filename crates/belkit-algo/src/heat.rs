//! The heat-diffusion scoring engine.
//!
//! A [`Runner`] owns an exclusive mutable copy of a candidate-mechanism
//! subgraph and drives it to a terminal state in which the target node
//! carries a score. Nodes are scored in leaf order — a node is ready once
//! every causal predecessor is scored — and cycles are broken by deleting
//! incoming edges of the node with the smallest in/out-degree ratio, chosen
//! uniformly at random. Edge removal makes the run stochastic; see
//! `multirun` for aggregation over repeated trials.

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::trace;
use uuid::Uuid;

use belkit_graph::{BelGraph, BelNode};

use crate::error::AlgoError;

// ─────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────

/// Configuration for a diffusion run.
///
/// `key` and `tag` name the per-node data slots for the pre-loaded
/// experimental measurement and the computed score. The NPA-style and
/// heat-style engines differ only in these names, so one parameterized
/// runner serves both.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Node-data key holding the experimental measurement.
    pub key: String,
    /// Node-data key the computed score is written to.
    pub tag: String,
    /// Fallback for nodes without a measurement.
    pub default_score: f64,
    /// Optional RNG seed for reproducible cycle breaking.
    pub seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            key: "weight".to_string(),
            tag: "score".to_string(),
            default_score: 0.0,
            seed: None,
        }
    }
}

// ─────────────────────────────────────────────
// Runner
// ─────────────────────────────────────────────

/// One diffusion trial over a private copy of a subgraph.
///
/// Create a fresh runner per trial; a runner is spent once [`final_score`]
/// has been read. A node's score is written exactly once per run and never
/// modified afterwards.
///
/// [`final_score`]: Runner::final_score
pub struct Runner {
    graph: BelGraph,
    target: Uuid,
    config: RunnerConfig,
    rng: StdRng,
}

impl Runner {
    /// Clone `graph` and prepare a run toward `target`.
    pub fn new(graph: &BelGraph, target: &BelNode, config: RunnerConfig) -> Result<Self, AlgoError> {
        let target_id = graph
            .node_id(target)
            .ok_or_else(|| AlgoError::TargetNotFound(target.to_string()))?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { graph: graph.clone(), target: target_id, config, rng })
    }

    /// The runner's private working graph.
    pub fn graph(&self) -> &BelGraph {
        &self.graph
    }

    /// True once the target node is scored.
    pub fn done(&self) -> bool {
        self.is_scored(self.target)
    }

    fn is_scored(&self, id: Uuid) -> bool {
        self.graph.value(id, &self.config.tag).is_some()
    }

    /// Unscored nodes whose causal inputs are all settled. Vacuously
    /// includes unscored roots (in-degree 0), which is how initial
    /// measurements enter the diffusion.
    fn leaves(&self) -> Vec<Uuid> {
        self.graph
            .iter_nodes()
            .map(|(id, _)| id)
            .filter(|&id| !self.is_scored(id))
            .filter(|&id| self.graph.in_edges(id).iter().all(|e| self.is_scored(e.from)))
            .collect()
    }

    /// The score-propagation rule: the node's own measurement (or the
    /// default), plus each causal-increase predecessor's score, minus each
    /// causal-decrease predecessor's score. Other relations contribute
    /// nothing.
    fn compute_score(&self, id: Uuid) -> f64 {
        let mut score = self
            .graph
            .value(id, &self.config.key)
            .unwrap_or(self.config.default_score);
        for edge in self.graph.in_edges(id) {
            let Some(upstream) = self.graph.value(edge.from, &self.config.tag) else {
                continue;
            };
            if edge.relation.is_causal_increase() {
                score += upstream;
            } else if edge.relation.is_causal_decrease() {
                score -= upstream;
            }
        }
        score
    }

    /// Score every current leaf simultaneously: all scores are computed
    /// against the same state, then written in one batch. Returns how many
    /// nodes were scored.
    fn score_leaves(&mut self) -> usize {
        let batch: Vec<(Uuid, f64)> = self
            .leaves()
            .into_iter()
            .map(|id| (id, self.compute_score(id)))
            .collect();
        for &(id, score) in &batch {
            debug_assert!(!self.is_scored(id), "a node must be scored at most once");
            // id was produced by leaves(), so set_value cannot fail
            let _ = self.graph.set_value(id, &self.config.tag, score);
        }
        batch.len()
    }

    /// Break a cycle: among unscored non-target nodes, take the one with
    /// the minimum in/out-degree ratio (canonical node order breaks ties)
    /// and delete one of its incoming edges uniformly at random.
    fn remove_random_in_edge(&mut self) -> Result<(), AlgoError> {
        let mut candidates: Vec<(Uuid, f64)> = self
            .graph
            .iter_nodes()
            .map(|(id, _)| id)
            .filter(|&id| id != self.target && !self.is_scored(id))
            .filter(|&id| self.graph.in_degree(id) > 0)
            .map(|id| (id, self.graph.in_degree(id) as f64 / self.graph.out_degree(id) as f64))
            .collect();
        candidates.sort_by_key(|&(id, _)| id);

        let &(chosen, _) = candidates
            .iter()
            .min_by_key(|&&(_, ratio)| OrderedFloat(ratio))
            .ok_or(AlgoError::NoRemovableEdge)?;

        let mut in_edge_ids: Vec<Uuid> = self.graph.in_edges(chosen).iter().map(|e| e.id).collect();
        in_edge_ids.sort();
        let &victim = in_edge_ids.choose(&mut self.rng).ok_or(AlgoError::NoRemovableEdge)?;

        trace!(node = %chosen, edge = %victim, "removed an incoming edge to break a cycle");
        self.graph.remove_edge(victim)?;
        Ok(())
    }

    /// Drive the state machine to its terminal state. Terminates on any
    /// finite graph: every iteration either scores at least one node or
    /// removes exactly one edge.
    pub fn run(&mut self) -> Result<(), AlgoError> {
        while !self.done() {
            if self.score_leaves() == 0 {
                self.remove_random_in_edge()?;
            }
        }
        Ok(())
    }

    /// The target's score. Fails with [`AlgoError::NotComplete`] if the
    /// run has not reached its terminal state.
    pub fn final_score(&self) -> Result<f64, AlgoError> {
        self.graph
            .value(self.target, &self.config.tag)
            .ok_or(AlgoError::NotComplete)
    }

    /// The score of an arbitrary node, if it has been scored.
    pub fn score_of(&self, node: &BelNode) -> Option<f64> {
        let id = self.graph.node_id(node)?;
        self.graph.value(id, &self.config.tag)
    }

    /// Consume the runner into a step-by-step sequence of graph snapshots,
    /// one per scoring batch and per cycle-breaking edge removal. Intended
    /// for visualization and debugging; create a new runner to restart.
    pub fn into_steps(self) -> Steps {
        Steps { runner: self, finished: false }
    }
}

// ─────────────────────────────────────────────
// Step iterator
// ─────────────────────────────────────────────

/// Finite lazy sequence of intermediate graphs from a single run.
pub struct Steps {
    runner: Runner,
    finished: bool,
}

impl Iterator for Steps {
    type Item = BelGraph;

    fn next(&mut self) -> Option<BelGraph> {
        if self.finished || self.runner.done() {
            self.finished = true;
            return None;
        }
        if self.runner.score_leaves() == 0 && self.runner.remove_random_in_edge().is_err() {
            self.finished = true;
            return None;
        }
        Some(self.runner.graph.clone())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
