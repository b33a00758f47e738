//! Multi-run aggregation of stochastic diffusion trials.
//!
//! Cycle breaking makes a single run a sample, not an answer. The functions
//! here run N independent trials — each over its own private copy of the
//! candidate mechanism — and reduce the resulting score distribution.
//! Trials run in parallel; a failed trial is excluded and logged, never
//! propagated.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, warn};

use belkit_graph::{BelGraph, BelNode};

use crate::error::AlgoError;
use crate::generation::{generate_bioprocess_mechanisms, generate_mechanism};
use crate::heat::{Runner, RunnerConfig};
use crate::stats;

// ─────────────────────────────────────────────
// Config / result records
// ─────────────────────────────────────────────

/// Configuration for a batch of diffusion trials.
#[derive(Debug, Clone)]
pub struct MultirunConfig {
    pub runner: RunnerConfig,
    /// Number of independent trials.
    pub runs: usize,
    /// Wall-clock limit for the whole batch. Trials that would start after
    /// the deadline fail with [`AlgoError::DeadlineExceeded`] and are
    /// excluded like any other failed trial.
    pub deadline: Option<Duration>,
}

impl Default for MultirunConfig {
    fn default() -> Self {
        Self { runner: RunnerConfig::default(), runs: 100, deadline: None }
    }
}

/// Fixed-width summary of one target's score distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub average: f64,
    pub stddev: f64,
    /// D'Agostino–Pearson omnibus p-value; `None` for small or degenerate
    /// samples.
    pub normality: Option<f64>,
    pub median: f64,
    /// In-degree of the target within its candidate mechanism.
    pub neighbors: usize,
    /// Node count of the candidate mechanism.
    pub subgraph_size: usize,
}

// ─────────────────────────────────────────────
// Trials
// ─────────────────────────────────────────────

/// Run `config.runs` independent trials of `target` over `graph`.
///
/// Each trial clones the graph and runs to termination. With a base seed
/// set, trial `i` uses `seed.wrapping_add(i)`, so a seeded batch is
/// reproducible while its trials stay mutually independent. Every trial's
/// outcome is kept, success or failure; callers filter.
pub fn multirun(
    graph: &BelGraph,
    target: &BelNode,
    config: &MultirunConfig,
) -> Vec<Result<Runner, AlgoError>> {
    let started = Instant::now();
    (0..config.runs)
        .into_par_iter()
        .map(|trial| {
            if let Some(limit) = config.deadline {
                let elapsed = started.elapsed();
                if elapsed > limit {
                    return Err(AlgoError::DeadlineExceeded(elapsed));
                }
            }
            let mut runner_config = config.runner.clone();
            runner_config.seed = config.runner.seed.map(|s| s.wrapping_add(trial as u64));
            let mut runner = Runner::new(graph, target, runner_config)?;
            runner.run()?;
            Ok(runner)
        })
        .collect()
}

/// Successful trial scores from a multirun batch; failures are logged at
/// debug level and dropped.
fn successful_scores(results: Vec<Result<Runner, AlgoError>>) -> Vec<f64> {
    let mut scores = Vec::with_capacity(results.len());
    for result in results {
        match result.and_then(|r| r.final_score()) {
            Ok(score) => scores.push(score),
            Err(error) => debug!(%error, "scoring trial excluded"),
        }
    }
    scores
}

// ─────────────────────────────────────────────
// Workflows
// ─────────────────────────────────────────────

/// Generate the candidate mechanism for `target` and run a trial batch
/// over it. A mechanism of ≤ 1 node yields an empty vector (nothing to
/// diffuse), not an error.
pub fn workflow(
    graph: &BelGraph,
    target: &BelNode,
    config: &MultirunConfig,
) -> Result<Vec<Runner>, AlgoError> {
    let mechanism = generate_mechanism(graph, target, Some(&config.runner.key))?;
    if mechanism.node_count() <= 1 {
        debug!(target = %target, "candidate mechanism is trivial, skipping scoring");
        return Ok(Vec::new());
    }

    let mut runners = Vec::new();
    for result in multirun(&mechanism, target, config) {
        match result {
            Ok(runner) => runners.push(runner),
            Err(error) => debug!(%error, target = %target, "scoring trial excluded"),
        }
    }
    Ok(runners)
}

/// Reduce a workflow's final scores with `aggregate` (commonly the mean).
/// Returns `None` — with a warning — when no trial succeeded.
pub fn workflow_aggregate<F>(
    graph: &BelGraph,
    target: &BelNode,
    config: &MultirunConfig,
    aggregate: F,
) -> Result<Option<f64>, AlgoError>
where
    F: Fn(&[f64]) -> f64,
{
    let runners = workflow(graph, target, config)?;
    let scores: Vec<f64> = runners.iter().filter_map(|r| r.final_score().ok()).collect();
    if scores.is_empty() {
        warn!(target = %target, "no successful scoring runs");
        return Ok(None);
    }
    Ok(Some(aggregate(&scores)))
}

/// [`workflow_aggregate`] with the arithmetic mean.
pub fn workflow_mean(
    graph: &BelGraph,
    target: &BelNode,
    config: &MultirunConfig,
) -> Result<Option<f64>, AlgoError> {
    workflow_aggregate(graph, target, config, stats::mean)
}

// ─────────────────────────────────────────────
// Batch summaries
// ─────────────────────────────────────────────

/// Score every pre-built candidate mechanism and summarize each target's
/// distribution. Trivial mechanisms and targets with zero successful runs
/// map to `None`.
pub fn calculate_average_scores_on_subgraphs(
    mechanisms: &BTreeMap<BelNode, BelGraph>,
    config: &MultirunConfig,
) -> BTreeMap<BelNode, Option<ScoreSummary>> {
    mechanisms
        .iter()
        .map(|(target, mechanism)| {
            let summary = summarize_target(mechanism, target, config);
            (target.clone(), summary)
        })
        .collect()
}

/// Build per-bioprocess candidate mechanisms and summarize each one.
pub fn calculate_average_scores_on_graph(
    graph: &BelGraph,
    config: &MultirunConfig,
) -> Result<BTreeMap<BelNode, Option<ScoreSummary>>, AlgoError> {
    let mechanisms = generate_bioprocess_mechanisms(graph, &config.runner.key)?;
    Ok(calculate_average_scores_on_subgraphs(&mechanisms, config))
}

fn summarize_target(
    mechanism: &BelGraph,
    target: &BelNode,
    config: &MultirunConfig,
) -> Option<ScoreSummary> {
    if mechanism.node_count() <= 1 {
        debug!(target = %target, "candidate mechanism is trivial, skipping scoring");
        return None;
    }

    let scores = successful_scores(multirun(mechanism, target, config));
    if scores.is_empty() {
        warn!(target = %target, "no successful scoring runs");
        return None;
    }

    let target_id = mechanism.node_id(target)?;
    Some(ScoreSummary {
        average: stats::mean(&scores),
        stddev: stats::stddev(&scores),
        normality: stats::normality_p(&scores),
        median: stats::median(&scores),
        neighbors: mechanism.in_degree(target_id),
        subgraph_size: mechanism.node_count(),
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use belkit_graph::Relation;

    fn p(name: &str) -> BelNode {
        BelNode::protein("HGNC", name)
    }

    fn bp(name: &str) -> BelNode {
        BelNode::bioprocess("GO", name)
    }

    /// A(2) -> B -> D and A -> C -> D, all increases. D's score is 4 on
    /// every trial.
    fn two_path_graph() -> BelGraph {
        let mut g = BelGraph::new();
        g.connect(p("A"), p("B"), Relation::Increases);
        g.connect(p("B"), bp("D"), Relation::Increases);
        g.connect(p("A"), p("C"), Relation::Increases);
        g.connect(p("C"), bp("D"), Relation::Increases);
        let a = g.node_id(&p("A")).unwrap();
        g.set_value(a, "weight", 2.0).unwrap();
        g
    }

    fn small_config(runs: usize) -> MultirunConfig {
        MultirunConfig {
            runner: RunnerConfig { seed: Some(42), ..Default::default() },
            runs,
            deadline: None,
        }
    }

    #[test]
    fn multirun_produces_one_result_per_trial() {
        let g = two_path_graph();
        let results = multirun(&g, &bp("D"), &small_config(10));
        assert_eq!(results.len(), 10);
        assert!(results.iter().all(Result::is_ok));
    }

    #[test]
    fn multirun_scores_agree_on_acyclic_input() {
        let g = two_path_graph();
        for result in multirun(&g, &bp("D"), &small_config(5)) {
            assert_eq!(result.unwrap().final_score().unwrap(), 4.0);
        }
    }

    #[test]
    fn workflow_skips_trivial_mechanisms() {
        let mut g = BelGraph::new();
        g.add_node(bp("lonely"));
        let runners = workflow(&g, &bp("lonely"), &small_config(5)).unwrap();
        assert!(runners.is_empty());
    }

    #[test]
    fn workflow_mean_on_deterministic_graph() {
        let g = two_path_graph();
        let mean = workflow_mean(&g, &bp("D"), &small_config(20)).unwrap();
        assert_eq!(mean, Some(4.0));
    }

    #[test]
    fn workflow_aggregate_accepts_custom_reducers() {
        let g = two_path_graph();
        let max = workflow_aggregate(&g, &bp("D"), &small_config(5), |scores| {
            scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
        })
        .unwrap();
        assert_eq!(max, Some(4.0));
    }

    #[test]
    fn zero_runs_degrade_to_none() {
        let g = two_path_graph();
        let mean = workflow_mean(&g, &bp("D"), &small_config(0)).unwrap();
        assert_eq!(mean, None);
    }

    #[test]
    fn expired_deadline_fails_every_trial() {
        let g = two_path_graph();
        let config = MultirunConfig { deadline: Some(Duration::ZERO), ..small_config(5) };
        let results = multirun(&g, &bp("D"), &config);
        assert!(results
            .iter()
            .all(|r| matches!(r, Err(AlgoError::DeadlineExceeded(_)))));
    }

    #[test]
    fn summaries_report_the_fixed_record() {
        let g = two_path_graph();
        let mut mechanisms = BTreeMap::new();
        mechanisms.insert(
            bp("D"),
            crate::generation::generate_mechanism(&g, &bp("D"), Some("weight")).unwrap(),
        );

        let summaries = calculate_average_scores_on_subgraphs(&mechanisms, &small_config(10));
        let summary = summaries.get(&bp("D")).unwrap().as_ref().unwrap();

        assert_eq!(summary.average, 4.0);
        assert_eq!(summary.stddev, 0.0);
        assert_eq!(summary.median, 4.0);
        assert_eq!(summary.neighbors, 2);
        assert_eq!(summary.subgraph_size, 4);
        // constant sample: the normality statistic is undefined
        assert_eq!(summary.normality, None);
    }

    #[test]
    fn bioprocess_sweep_covers_all_targets() {
        let g = two_path_graph();
        let summaries = calculate_average_scores_on_graph(&g, &small_config(5)).unwrap();
        assert_eq!(summaries.len(), 1);
        assert!(summaries.get(&bp("D")).unwrap().is_some());
    }
}
