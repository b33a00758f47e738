//! # belkit-algo
//!
//! Analysis algorithms over BEL knowledge graphs:
//!
//! - **Candidate mechanism generation** ([`generation`]) — extract and
//!   simplify the causal upstream of a target node.
//! - **Heat diffusion** ([`heat`]) — the stochastic scoring engine that
//!   drives a candidate mechanism to a scalar score for its target.
//! - **Multi-run aggregation** ([`multirun`]) — repeat the stochastic
//!   engine and summarize the score distribution.
//! - **Stability analysis** ([`stability`]) — deterministic detection of
//!   contradictory and unstable causal/correlative motifs.
//!
//! The data model lives in `belkit-graph`; this crate never owns I/O.

pub mod error;
pub mod generation;
pub mod heat;
pub mod multirun;
pub mod stability;
pub mod stats;

pub use error::AlgoError;
pub use generation::{
    collapse_central_dogma, collapse_consistent_edges, expand_upstream_causal_subgraph,
    generate_bioprocess_mechanisms, generate_mechanism, remove_inconsistent_edges,
    remove_unweighted_leaves, remove_unweighted_sources, upstream_causal_subgraph,
};
pub use heat::{Runner, RunnerConfig, Steps};
pub use multirun::{
    calculate_average_scores_on_graph, calculate_average_scores_on_subgraphs, multirun,
    workflow, workflow_aggregate, workflow_mean, MultirunConfig, ScoreSummary,
};
pub use stability::{
    directed_triangles, get_chaotic_pairs, get_chaotic_triplets, get_contradictory_pairs,
    get_dampened_pairs, get_dampened_triplets, get_decrease_mismatch_triplets,
    get_increase_mismatch_triplets, get_jens_unstable,
    get_mutually_unstable_correlation_triples, get_regulatory_pairs,
    get_separate_unstable_correlation_triples, jens_transformation_alpha,
    jens_transformation_beta, relation_set_has_contradictions, summarize_stability, Digraph,
    StabilitySummary,
};
