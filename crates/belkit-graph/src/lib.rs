//! # belkit-graph
//!
//! The BEL (Biological Expression Language) knowledge-graph data model:
//! - [`model::BelNode`]  — typed biological entities, one variant per BEL function
//! - [`model::Relation`] — the closed causal/correlative relation vocabulary
//! - [`model::BelEdge`]  — keyed, provenance-carrying multi-edges
//! - [`graph::BelGraph`] — directed multigraph with structural node interning
//!   and a per-node numeric data stash for measurements and computed scores
//!
//! The analysis algorithms over this model live in `belkit-algo`.

pub mod error;
pub mod graph;
pub mod model;
pub mod overlay;

pub use error::GraphError;
pub use graph::BelGraph;
pub use model::{BelEdge, BelNode, Citation, Reference, Relation, Variant};
pub use overlay::overlay_measurements;
