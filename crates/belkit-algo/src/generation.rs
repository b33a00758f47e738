//! Candidate mechanism generation.
//!
//! A candidate mechanism is the subgraph of entities causally upstream of a
//! target node, simplified until the diffusion engine can operate on it:
//! contradictory pairs are dropped, redundant multi-edges collapsed, and
//! nodes that carry no information pruned.

use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use belkit_graph::{BelEdge, BelGraph, BelNode};

use crate::error::AlgoError;

// ─────────────────────────────────────────────
// Upstream extraction
// ─────────────────────────────────────────────

/// The subgraph of immediate causal upstream edges of `target`.
///
/// Only edges directly into the target are taken; use
/// [`expand_upstream_causal_subgraph`] to close over further ancestors.
/// The target itself is always present, even with no upstream.
pub fn upstream_causal_subgraph(
    graph: &BelGraph,
    target: &BelNode,
) -> Result<BelGraph, AlgoError> {
    let target_id = graph
        .node_id(target)
        .ok_or_else(|| AlgoError::TargetNotFound(target.to_string()))?;

    let mut sub = BelGraph::new();
    sub.import_node(graph, target_id)?;
    for edge in graph.in_edges(target_id) {
        if edge.relation.is_causal() {
            sub.import_edge(graph, edge.id)?;
        }
    }
    Ok(sub)
}

/// Left-join causal in-edges from `universe` onto `subgraph` until closure:
/// every causal ancestor of a member node becomes a member.
pub fn expand_upstream_causal_subgraph(
    universe: &BelGraph,
    subgraph: &mut BelGraph,
) -> Result<(), AlgoError> {
    loop {
        let members: Vec<Uuid> = subgraph.iter_nodes().map(|(id, _)| id).collect();
        let before = subgraph.edge_count();
        for id in members {
            for edge in universe.in_edges(id) {
                if edge.relation.is_causal() {
                    subgraph.import_edge(universe, edge.id)?;
                }
            }
        }
        if subgraph.edge_count() == before {
            return Ok(());
        }
    }
}

// ─────────────────────────────────────────────
// Simplification
// ─────────────────────────────────────────────

/// Delete every edge between node pairs whose causal edges disagree on
/// sign (some increase, some decrease).
///
/// All-or-nothing: the pair loses all of its edges, including consistent
/// ones — partial evidence on a contradictory pair is discarded rather than
/// adjudicated. Returns the number of edges removed.
pub fn remove_inconsistent_edges(graph: &mut BelGraph) -> usize {
    let mut pairs: BTreeMap<(Uuid, Uuid), (bool, bool)> = BTreeMap::new();
    for edge in graph.iter_edges() {
        let entry = pairs.entry((edge.from, edge.to)).or_default();
        entry.0 |= edge.relation.is_causal_increase();
        entry.1 |= edge.relation.is_causal_decrease();
    }

    let mut doomed: Vec<Uuid> = Vec::new();
    for (&(from, to), &(inc, dec)) in &pairs {
        if inc && dec {
            doomed.extend(graph.edges_between(from, to).iter().map(|e| e.id));
        }
    }

    let removed = doomed.len();
    for id in doomed {
        let _ = graph.remove_edge(id);
    }
    removed
}

/// Replace each multi-edge whose relations all agree with a single
/// representative edge. Provenance (citations, evidence, annotations) on
/// the collapsed edges is dropped. Returns the number of pairs collapsed.
pub fn collapse_consistent_edges(graph: &mut BelGraph) -> usize {
    let mut pairs: BTreeMap<(Uuid, Uuid), Vec<Uuid>> = BTreeMap::new();
    for edge in graph.iter_edges() {
        pairs.entry((edge.from, edge.to)).or_default().push(edge.id);
    }

    let mut collapsed = 0usize;
    for ((from, to), edge_ids) in pairs {
        if edge_ids.len() < 2 {
            continue;
        }
        let relations: Vec<_> = graph
            .edges_between(from, to)
            .iter()
            .map(|e| e.relation)
            .collect();
        let first = relations[0];
        if !relations.iter().all(|&r| r == first) {
            continue;
        }
        for id in edge_ids {
            let _ = graph.remove_edge(id);
        }
        // endpoints untouched above, so the insert cannot fail
        let _ = graph.add_edge(BelEdge::new(from, to, first));
        collapsed += 1;
    }
    collapsed
}

// ─────────────────────────────────────────────
// Pruning
// ─────────────────────────────────────────────

/// Iteratively delete leaves that cannot contribute to a score: in-degree
/// 0, out-degree 1, and no measurement under `key`. Returns the number of
/// nodes removed.
pub fn remove_unweighted_leaves(graph: &mut BelGraph, key: &str) -> usize {
    let mut removed = 0usize;
    loop {
        let victims: Vec<Uuid> = graph
            .iter_nodes()
            .map(|(id, _)| id)
            .filter(|&id| {
                graph.in_degree(id) == 0
                    && graph.out_degree(id) == 1
                    && graph.value(id, key).is_none()
            })
            .collect();
        if victims.is_empty() {
            return removed;
        }
        for id in victims {
            let _ = graph.remove_node(id);
            removed += 1;
        }
    }
}

/// Iteratively delete source nodes (in-degree 0) with no measurement under
/// `key`. Returns the number of nodes removed.
pub fn remove_unweighted_sources(graph: &mut BelGraph, key: &str) -> usize {
    let mut removed = 0usize;
    loop {
        let victims: Vec<Uuid> = graph
            .iter_nodes()
            .map(|(id, _)| id)
            .filter(|&id| graph.in_degree(id) == 0 && graph.value(id, key).is_none())
            .collect();
        if victims.is_empty() {
            return removed;
        }
        for id in victims {
            let _ = graph.remove_node(id);
            removed += 1;
        }
    }
}

// ─────────────────────────────────────────────
// Pipelines
// ─────────────────────────────────────────────

/// Build the candidate mechanism for `target`: upstream extraction, closure
/// expansion, contradiction removal, multi-edge collapsing, and — when a
/// measurement `key` is given — unweighted leaf/source pruning.
///
/// A result with ≤ 1 node is not an error; callers skip scoring for it.
pub fn generate_mechanism(
    graph: &BelGraph,
    target: &BelNode,
    key: Option<&str>,
) -> Result<BelGraph, AlgoError> {
    let mut sub = upstream_causal_subgraph(graph, target)?;
    expand_upstream_causal_subgraph(graph, &mut sub)?;
    remove_inconsistent_edges(&mut sub);
    collapse_consistent_edges(&mut sub);
    if let Some(key) = key {
        remove_unweighted_leaves(&mut sub, key);
        remove_unweighted_sources(&mut sub, key);
    }
    debug!(
        target = %target,
        nodes = sub.node_count(),
        edges = sub.edge_count(),
        "candidate mechanism generated"
    );
    Ok(sub)
}

/// One candidate mechanism per biological-process node in the graph.
pub fn generate_bioprocess_mechanisms(
    graph: &BelGraph,
    key: &str,
) -> Result<BTreeMap<BelNode, BelGraph>, AlgoError> {
    let targets: Vec<BelNode> = graph
        .iter_nodes()
        .filter(|(_, node)| matches!(node, BelNode::BiologicalProcess { .. }))
        .map(|(_, node)| node.clone())
        .collect();

    let mut mechanisms = BTreeMap::new();
    for target in targets {
        let mechanism = generate_mechanism(graph, &target, Some(key))?;
        mechanisms.insert(target, mechanism);
    }
    Ok(mechanisms)
}

/// Merge each variant-free gene, RNA, and miRNA node into the protein node
/// with the same reference, where that protein exists in the graph. Edges
/// are redirected; measurements already on the protein win. Returns the
/// number of nodes merged.
pub fn collapse_central_dogma(graph: &mut BelGraph) -> usize {
    let merges: Vec<(Uuid, Uuid)> = graph
        .iter_nodes()
        .filter_map(|(id, node)| {
            let protein = node.central_dogma_protein()?;
            let protein_id = graph.node_id(&protein)?;
            Some((id, protein_id))
        })
        .collect();

    let merged = merges.len();
    for (source, target) in merges {
        let _ = graph.merge_nodes(source, target);
    }
    merged
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
