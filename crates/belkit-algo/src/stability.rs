//! Stability and contradiction analysis.
//!
//! Pure topology-plus-relation-type analysis: no experimental data, no
//! randomness, no graph mutation. Pairwise checks read the multi-edge
//! relation sets directly; the triple-wise checks rewrite the combined
//! causal/correlative subgraph into a plain digraph (the alpha and beta
//! sign transforms) so that every instability class reduces to directed
//! 3-cycle enumeration. All results are canonically ordered sets, so
//! repeated invocations on the same graph are identical.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use belkit_graph::{BelGraph, BelNode, Relation};

// ─────────────────────────────────────────────
// Pairwise analysis
// ─────────────────────────────────────────────

/// True iff the relation set mixes more than one of {causal increase,
/// causal decrease, causes-no-change}.
pub fn relation_set_has_contradictions<I>(relations: I) -> bool
where
    I: IntoIterator<Item = Relation>,
{
    let mut increase = false;
    let mut decrease = false;
    let mut no_change = false;
    for relation in relations {
        increase |= relation.is_causal_increase();
        decrease |= relation.is_causal_decrease();
        no_change |= relation == Relation::CausesNoChange;
    }
    increase as u8 + decrease as u8 + no_change as u8 > 1
}

fn directed_pair_relations(graph: &BelGraph) -> BTreeMap<(Uuid, Uuid), BTreeSet<Relation>> {
    let mut pairs: BTreeMap<(Uuid, Uuid), BTreeSet<Relation>> = BTreeMap::new();
    for edge in graph.iter_edges() {
        pairs.entry((edge.from, edge.to)).or_default().insert(edge.relation);
    }
    pairs
}

fn node_pair(graph: &BelGraph, u: Uuid, v: Uuid) -> Option<(BelNode, BelNode)> {
    Some((graph.node(u)?.clone(), graph.node(v)?.clone()))
}

fn sorted_node_pair(graph: &BelGraph, u: Uuid, v: Uuid) -> Option<(BelNode, BelNode)> {
    let (a, b) = node_pair(graph, u, v)?;
    Some(if a <= b { (a, b) } else { (b, a) })
}

/// Ordered node pairs whose multi-edge relation set is self-contradictory.
pub fn get_contradictory_pairs(graph: &BelGraph) -> BTreeSet<(BelNode, BelNode)> {
    directed_pair_relations(graph)
        .into_iter()
        .filter(|(_, relations)| relation_set_has_contradictions(relations.iter().copied()))
        .filter_map(|((u, v), _)| node_pair(graph, u, v))
        .collect()
}

/// Pairs where `A increases B` and `B decreases A` — a negative feedback
/// motif. Returned as `(A, B)` with `A` the increasing side.
pub fn get_regulatory_pairs(graph: &BelGraph) -> BTreeSet<(BelNode, BelNode)> {
    let pairs = directed_pair_relations(graph);
    let mut result = BTreeSet::new();
    for (&(u, v), relations) in &pairs {
        if !relations.iter().any(|r| r.is_causal_increase()) {
            continue;
        }
        let Some(reverse) = pairs.get(&(v, u)) else { continue };
        if reverse.iter().any(|r| r.is_causal_decrease()) {
            if let Some(pair) = node_pair(graph, u, v) {
                result.insert(pair);
            }
        }
    }
    result
}

fn mutual_pairs(
    graph: &BelGraph,
    predicate: impl Fn(Relation) -> bool,
) -> BTreeSet<(BelNode, BelNode)> {
    let pairs = directed_pair_relations(graph);
    let mut result = BTreeSet::new();
    for (&(u, v), relations) in &pairs {
        if u >= v {
            continue;
        }
        if !relations.iter().any(|&r| predicate(r)) {
            continue;
        }
        let Some(reverse) = pairs.get(&(v, u)) else { continue };
        if reverse.iter().any(|&r| predicate(r)) {
            if let Some(pair) = sorted_node_pair(graph, u, v) {
                result.insert(pair);
            }
        }
    }
    result
}

/// Pairs that mutually increase each other — a runaway positive feedback
/// loop. Canonically ordered.
pub fn get_chaotic_pairs(graph: &BelGraph) -> BTreeSet<(BelNode, BelNode)> {
    mutual_pairs(graph, Relation::is_causal_increase)
}

/// Pairs that mutually decrease each other. Canonically ordered.
pub fn get_dampened_pairs(graph: &BelGraph) -> BTreeSet<(BelNode, BelNode)> {
    mutual_pairs(graph, Relation::is_causal_decrease)
}

// ─────────────────────────────────────────────
// Correlation graph
// ─────────────────────────────────────────────

/// Undirected simple view of the positive/negative correlation edges.
struct CorrelationGraph {
    adj: BTreeMap<Uuid, BTreeMap<Uuid, BTreeSet<Relation>>>,
}

impl CorrelationGraph {
    fn build(graph: &BelGraph) -> Self {
        let mut adj: BTreeMap<Uuid, BTreeMap<Uuid, BTreeSet<Relation>>> = BTreeMap::new();
        for edge in graph.iter_edges() {
            if !edge.relation.is_correlative() || edge.from == edge.to {
                continue;
            }
            adj.entry(edge.from).or_default().entry(edge.to).or_default().insert(edge.relation);
            adj.entry(edge.to).or_default().entry(edge.from).or_default().insert(edge.relation);
        }
        Self { adj }
    }

    fn relations(&self, u: Uuid, v: Uuid) -> Option<&BTreeSet<Relation>> {
        self.adj.get(&u).and_then(|n| n.get(&v))
    }

    fn has(&self, u: Uuid, v: Uuid, relation: Relation) -> bool {
        self.relations(u, v).is_some_and(|r| r.contains(&relation))
    }

    /// All unordered triangles, as sorted id triples.
    fn triangles(&self) -> BTreeSet<(Uuid, Uuid, Uuid)> {
        let mut result = BTreeSet::new();
        for (&u, neighbors) in &self.adj {
            for &v in neighbors.keys() {
                if v <= u {
                    continue;
                }
                for &w in neighbors.keys() {
                    if w <= v {
                        continue;
                    }
                    if self.relations(v, w).is_some() {
                        result.insert((u, v, w));
                    }
                }
            }
        }
        result
    }
}

/// Triangles in the correlation graph with two positive edges and one
/// negative edge. The triple is `(apex, u, v)`: the apex joins the two
/// positive edges, and `(u, v)` — in canonical order — is the negatively
/// correlated pair.
pub fn get_separate_unstable_correlation_triples(
    graph: &BelGraph,
) -> BTreeSet<(BelNode, BelNode, BelNode)> {
    let cg = CorrelationGraph::build(graph);
    let mut result = BTreeSet::new();
    for (a, b, c) in cg.triangles() {
        let rotations = [(a, b, c), (b, a, c), (c, a, b)];
        for (apex, u, v) in rotations {
            let positive = Relation::PositiveCorrelation;
            let negative = Relation::NegativeCorrelation;
            if cg.has(apex, u, positive) && cg.has(apex, v, positive) && cg.has(u, v, negative) {
                let Some(apex_node) = graph.node(apex) else { continue };
                let Some((x, y)) = sorted_node_pair(graph, u, v) else { continue };
                result.insert((apex_node.clone(), x, y));
            }
        }
    }
    result
}

/// Triangles whose three correlation edges are all negative. Sorted
/// triples.
pub fn get_mutually_unstable_correlation_triples(
    graph: &BelGraph,
) -> BTreeSet<(BelNode, BelNode, BelNode)> {
    let cg = CorrelationGraph::build(graph);
    let negative = Relation::NegativeCorrelation;
    let mut result = BTreeSet::new();
    for (a, b, c) in cg.triangles() {
        if cg.has(a, b, negative) && cg.has(b, c, negative) && cg.has(a, c, negative) {
            let mut nodes: Vec<BelNode> = match (graph.node(a), graph.node(b), graph.node(c)) {
                (Some(x), Some(y), Some(z)) => vec![x.clone(), y.clone(), z.clone()],
                _ => continue,
            };
            nodes.sort();
            let mut it = nodes.into_iter();
            if let (Some(x), Some(y), Some(z)) = (it.next(), it.next(), it.next()) {
                result.insert((x, y, z));
            }
        }
    }
    result
}

// ─────────────────────────────────────────────
// Sign-rewriting transforms
// ─────────────────────────────────────────────

/// A bare directed simple graph over node ids — the output domain of the
/// sign-rewriting transforms and the input of the shared 3-cycle finder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digraph {
    succ: BTreeMap<Uuid, BTreeSet<Uuid>>,
}

impl Digraph {
    pub fn add_edge(&mut self, from: Uuid, to: Uuid) {
        if from != to {
            self.succ.entry(from).or_default().insert(to);
        }
    }

    pub fn successors(&self, node: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.succ.get(&node).into_iter().flatten().copied()
    }

    pub fn has_edge(&self, from: Uuid, to: Uuid) -> bool {
        self.succ.get(&from).is_some_and(|s| s.contains(&to))
    }

    pub fn nodes(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.succ.keys().copied()
    }
}

/// Rotate a 3-cycle so its smallest element leads, preserving cycle order.
fn canonical_cycle<T: Ord>(a: T, b: T, c: T) -> (T, T, T) {
    if a <= b && a <= c {
        (a, b, c)
    } else if b <= a && b <= c {
        (b, c, a)
    } else {
        (c, a, b)
    }
}

/// All directed 3-cycles of `graph`, canonically rotated.
pub fn directed_triangles(graph: &Digraph) -> BTreeSet<(Uuid, Uuid, Uuid)> {
    let mut result = BTreeSet::new();
    for a in graph.nodes() {
        for b in graph.successors(a) {
            if b == a {
                continue;
            }
            for c in graph.successors(b) {
                if c == a || c == b {
                    continue;
                }
                if graph.has_edge(c, a) {
                    result.insert(canonical_cycle(a, b, c));
                }
            }
        }
    }
    result
}

/// The alpha sign-rewriting transform: positive correlations become
/// bidirectional edges, causal increases keep their direction, causal
/// decreases are reversed. A directed 3-cycle in the result witnesses an
/// unstable causal/correlative triangle in the source graph.
pub fn jens_transformation_alpha(graph: &BelGraph) -> Digraph {
    let mut digraph = Digraph::default();
    for edge in graph.iter_edges() {
        match edge.relation {
            Relation::PositiveCorrelation => {
                digraph.add_edge(edge.from, edge.to);
                digraph.add_edge(edge.to, edge.from);
            }
            r if r.is_causal_increase() => digraph.add_edge(edge.from, edge.to),
            r if r.is_causal_decrease() => digraph.add_edge(edge.to, edge.from),
            _ => {}
        }
    }
    digraph
}

/// The beta transform — the dual of alpha: negative correlations become
/// bidirectional, causal decreases keep their direction, causal increases
/// are reversed.
pub fn jens_transformation_beta(graph: &BelGraph) -> Digraph {
    let mut digraph = Digraph::default();
    for edge in graph.iter_edges() {
        match edge.relation {
            Relation::NegativeCorrelation => {
                digraph.add_edge(edge.from, edge.to);
                digraph.add_edge(edge.to, edge.from);
            }
            r if r.is_causal_decrease() => digraph.add_edge(edge.from, edge.to),
            r if r.is_causal_increase() => digraph.add_edge(edge.to, edge.from),
            _ => {}
        }
    }
    digraph
}

fn cycle_nodes(
    graph: &BelGraph,
    cycles: BTreeSet<(Uuid, Uuid, Uuid)>,
) -> BTreeSet<(BelNode, BelNode, BelNode)> {
    cycles
        .into_iter()
        .filter_map(|(a, b, c)| {
            let a = graph.node(a)?.clone();
            let b = graph.node(b)?.clone();
            let c = graph.node(c)?.clone();
            Some(canonical_cycle(a, b, c))
        })
        .collect()
}

/// Unstable triples found via the alpha transform, e.g. `A -> B`,
/// `A -| C`, `B posCorr C`. Triples preserve cycle order, smallest node
/// first.
pub fn get_jens_unstable(graph: &BelGraph) -> BTreeSet<(BelNode, BelNode, BelNode)> {
    cycle_nodes(graph, directed_triangles(&jens_transformation_alpha(graph)))
}

fn causal_digraph(graph: &BelGraph, predicate: impl Fn(Relation) -> bool) -> Digraph {
    let mut digraph = Digraph::default();
    for edge in graph.iter_edges() {
        if predicate(edge.relation) {
            digraph.add_edge(edge.from, edge.to);
        }
    }
    digraph
}

/// Three-cycles of causal increases (`A -> B -> C -> A`).
pub fn get_chaotic_triplets(graph: &BelGraph) -> BTreeSet<(BelNode, BelNode, BelNode)> {
    cycle_nodes(
        graph,
        directed_triangles(&causal_digraph(graph, Relation::is_causal_increase)),
    )
}

/// Three-cycles of causal decreases.
pub fn get_dampened_triplets(graph: &BelGraph) -> BTreeSet<(BelNode, BelNode, BelNode)> {
    cycle_nodes(
        graph,
        directed_triangles(&causal_digraph(graph, Relation::is_causal_decrease)),
    )
}

// ─────────────────────────────────────────────
// Mismatch triplets
// ─────────────────────────────────────────────

fn mismatch_triplets(
    graph: &BelGraph,
    predicate: impl Fn(Relation) -> bool,
) -> BTreeSet<(BelNode, BelNode, BelNode)> {
    let cg = CorrelationGraph::build(graph);
    let mut result = BTreeSet::new();
    for (a, _) in graph.iter_nodes() {
        let downstream: BTreeSet<Uuid> = graph
            .out_edges(a)
            .iter()
            .filter(|e| predicate(e.relation))
            .map(|e| e.to)
            .filter(|&to| to != a)
            .collect();
        for &b in &downstream {
            for &c in &downstream {
                if c <= b {
                    continue;
                }
                if cg.has(b, c, Relation::NegativeCorrelation) {
                    let Some(a_node) = graph.node(a) else { continue };
                    let Some((x, y)) = sorted_node_pair(graph, b, c) else { continue };
                    result.insert((a_node.clone(), x, y));
                }
            }
        }
    }
    result
}

/// Nodes with two causal-increase targets that are negatively correlated
/// with each other. The triple is `(source, u, v)` with `(u, v)` sorted.
pub fn get_increase_mismatch_triplets(graph: &BelGraph) -> BTreeSet<(BelNode, BelNode, BelNode)> {
    mismatch_triplets(graph, Relation::is_causal_increase)
}

/// Nodes with two causal-decrease targets that are negatively correlated
/// with each other.
pub fn get_decrease_mismatch_triplets(graph: &BelGraph) -> BTreeSet<(BelNode, BelNode, BelNode)> {
    mismatch_triplets(graph, Relation::is_causal_decrease)
}

// ─────────────────────────────────────────────
// Summary
// ─────────────────────────────────────────────

/// Fixed-key counts of every instability category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilitySummary {
    pub contradictory_pairs: usize,
    pub regulatory_pairs: usize,
    pub chaotic_pairs: usize,
    pub dampened_pairs: usize,
    pub separately_unstable_triples: usize,
    pub mutually_unstable_triples: usize,
    pub jens_unstable_triples: usize,
    pub increase_mismatch_triples: usize,
    pub decrease_mismatch_triples: usize,
    pub chaotic_triples: usize,
    pub dampened_triples: usize,
}

impl StabilitySummary {
    pub fn to_map(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("contradictory_pairs", self.contradictory_pairs),
            ("regulatory_pairs", self.regulatory_pairs),
            ("chaotic_pairs", self.chaotic_pairs),
            ("dampened_pairs", self.dampened_pairs),
            ("separately_unstable_triples", self.separately_unstable_triples),
            ("mutually_unstable_triples", self.mutually_unstable_triples),
            ("jens_unstable_triples", self.jens_unstable_triples),
            ("increase_mismatch_triples", self.increase_mismatch_triples),
            ("decrease_mismatch_triples", self.decrease_mismatch_triples),
            ("chaotic_triples", self.chaotic_triples),
            ("dampened_triples", self.dampened_triples),
        ])
    }
}

/// Count every instability category. Deterministic for a fixed graph.
pub fn summarize_stability(graph: &BelGraph) -> StabilitySummary {
    StabilitySummary {
        contradictory_pairs: get_contradictory_pairs(graph).len(),
        regulatory_pairs: get_regulatory_pairs(graph).len(),
        chaotic_pairs: get_chaotic_pairs(graph).len(),
        dampened_pairs: get_dampened_pairs(graph).len(),
        separately_unstable_triples: get_separate_unstable_correlation_triples(graph).len(),
        mutually_unstable_triples: get_mutually_unstable_correlation_triples(graph).len(),
        jens_unstable_triples: get_jens_unstable(graph).len(),
        increase_mismatch_triples: get_increase_mismatch_triplets(graph).len(),
        decrease_mismatch_triples: get_decrease_mismatch_triplets(graph).len(),
        chaotic_triples: get_chaotic_triplets(graph).len(),
        dampened_triples: get_dampened_triplets(graph).len(),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
