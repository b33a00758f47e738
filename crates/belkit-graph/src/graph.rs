use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::error::GraphError;
use crate::model::{BelEdge, BelNode, Relation};

// ─────────────────────────────────────────────
// BelGraph
// ─────────────────────────────────────────────

#[derive(Debug, Clone)]
struct NodeEntry {
    node: BelNode,
    /// Per-node numeric stash: experimental measurements and computed
    /// scores, addressed by caller-chosen key names.
    data: HashMap<String, f64>,
}

/// A directed multigraph over BEL entities.
///
/// Nodes are interned structurally: inserting an equal node twice yields the
/// same id. Edges are keyed, so several relations may connect the same
/// ordered node pair. `Clone` produces the deep copy that the diffusion
/// runner takes exclusive ownership of — mutating a clone never affects the
/// original.
#[derive(Debug, Clone, Default)]
pub struct BelGraph {
    nodes: HashMap<Uuid, NodeEntry>,
    index: HashMap<BelNode, Uuid>,
    edges: HashMap<Uuid, BelEdge>,
    /// node id → outgoing edge ids
    outgoing: HashMap<Uuid, Vec<Uuid>>,
    /// node id → incoming edge ids
    incoming: HashMap<Uuid, Vec<Uuid>>,
}

impl BelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Nodes ──────────────────────────────────────────

    /// Insert a node, returning its id. An equal node that is already
    /// present is not duplicated; its existing id is returned.
    pub fn add_node(&mut self, node: BelNode) -> Uuid {
        if let Some(&id) = self.index.get(&node) {
            return id;
        }
        let id = Uuid::new_v4();
        self.index.insert(node.clone(), id);
        self.nodes.insert(id, NodeEntry { node, data: HashMap::new() });
        id
    }

    pub fn node(&self, id: Uuid) -> Option<&BelNode> {
        self.nodes.get(&id).map(|e| &e.node)
    }

    /// Resolve a node value to its id, if present.
    pub fn node_id(&self, node: &BelNode) -> Option<Uuid> {
        self.index.get(node).copied()
    }

    pub fn contains_node(&self, node: &BelNode) -> bool {
        self.index.contains_key(node)
    }

    /// Remove a node and every edge incident to it.
    pub fn remove_node(&mut self, id: Uuid) -> Result<BelNode, GraphError> {
        let entry = self.nodes.remove(&id).ok_or(GraphError::NodeNotFound(id))?;
        self.index.remove(&entry.node);

        let mut incident: Vec<Uuid> = self.outgoing.remove(&id).unwrap_or_default();
        incident.extend(self.incoming.remove(&id).unwrap_or_default());
        for edge_id in incident {
            if let Some(edge) = self.edges.remove(&edge_id) {
                self.detach(&edge);
            }
        }
        Ok(entry.node)
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (Uuid, &BelNode)> {
        self.nodes.iter().map(|(&id, e)| (id, &e.node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ── Per-node data ──────────────────────────────────

    /// Read a numeric value stashed on a node under `key`.
    pub fn value(&self, id: Uuid, key: &str) -> Option<f64> {
        self.nodes.get(&id).and_then(|e| e.data.get(key)).copied()
    }

    /// Write a numeric value on a node under `key`, overwriting any
    /// previous value for that key.
    pub fn set_value(&mut self, id: Uuid, key: &str, value: f64) -> Result<(), GraphError> {
        let entry = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        entry.data.insert(key.to_string(), value);
        Ok(())
    }

    // ── Edges ──────────────────────────────────────────

    /// Insert an edge. Both endpoints must already be in the graph.
    /// Re-inserting an edge id that is already present is a no-op.
    pub fn add_edge(&mut self, edge: BelEdge) -> Result<Uuid, GraphError> {
        if !self.nodes.contains_key(&edge.from) || !self.nodes.contains_key(&edge.to) {
            return Err(GraphError::DanglingEdge { from: edge.from, to: edge.to });
        }
        if self.edges.contains_key(&edge.id) {
            return Ok(edge.id);
        }
        let id = edge.id;
        self.outgoing.entry(edge.from).or_default().push(id);
        self.incoming.entry(edge.to).or_default().push(id);
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Insert both endpoint nodes and a bare edge between them.
    pub fn connect(&mut self, from: BelNode, to: BelNode, relation: Relation) -> Uuid {
        let from_id = self.add_node(from);
        let to_id = self.add_node(to);
        // endpoints were just inserted, so this cannot fail
        self.add_edge(BelEdge::new(from_id, to_id, relation))
            .unwrap_or_else(|_| unreachable!("endpoints inserted above"))
    }

    pub fn edge(&self, id: Uuid) -> Option<&BelEdge> {
        self.edges.get(&id)
    }

    pub fn remove_edge(&mut self, id: Uuid) -> Result<BelEdge, GraphError> {
        let edge = self.edges.remove(&id).ok_or(GraphError::EdgeNotFound(id))?;
        self.detach(&edge);
        Ok(edge)
    }

    fn detach(&mut self, edge: &BelEdge) {
        if let Some(out) = self.outgoing.get_mut(&edge.from) {
            out.retain(|&e| e != edge.id);
        }
        if let Some(inc) = self.incoming.get_mut(&edge.to) {
            inc.retain(|&e| e != edge.id);
        }
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = &BelEdge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges into `id`.
    pub fn in_edges(&self, id: Uuid) -> Vec<&BelEdge> {
        self.incoming
            .get(&id)
            .map(|ids| ids.iter().filter_map(|e| self.edges.get(e)).collect())
            .unwrap_or_default()
    }

    /// All edges out of `id`.
    pub fn out_edges(&self, id: Uuid) -> Vec<&BelEdge> {
        self.outgoing
            .get(&id)
            .map(|ids| ids.iter().filter_map(|e| self.edges.get(e)).collect())
            .unwrap_or_default()
    }

    pub fn in_degree(&self, id: Uuid) -> usize {
        self.incoming.get(&id).map(Vec::len).unwrap_or(0)
    }

    pub fn out_degree(&self, id: Uuid) -> usize {
        self.outgoing.get(&id).map(Vec::len).unwrap_or(0)
    }

    /// All edges from `from` to `to` (the multi-edge lookup).
    pub fn edges_between(&self, from: Uuid, to: Uuid) -> Vec<&BelEdge> {
        self.outgoing
            .get(&from)
            .map(|ids| {
                ids.iter()
                    .filter_map(|e| self.edges.get(e))
                    .filter(|e| e.to == to)
                    .collect()
            })
            .unwrap_or_default()
    }

    // ── Subgraphs ──────────────────────────────────────

    /// The subgraph induced by `keep`: those nodes (with their data) and
    /// every edge whose endpoints are both kept. Node and edge ids are
    /// preserved, so results can be mapped back onto the universe graph.
    pub fn induced_subgraph(&self, keep: &HashSet<Uuid>) -> BelGraph {
        let mut sub = BelGraph::new();
        for id in keep {
            if let Some(entry) = self.nodes.get(id) {
                sub.index.insert(entry.node.clone(), *id);
                sub.nodes.insert(*id, entry.clone());
            }
        }
        for edge in self.edges.values() {
            if keep.contains(&edge.from) && keep.contains(&edge.to) {
                let _ = sub.add_edge(edge.clone());
            }
        }
        sub
    }

    /// Copy a node (with its data) from `universe`, preserving its id.
    /// No-op if the id is already present. Intended for building subgraphs
    /// of a single universe graph, where ids are consistent.
    pub fn import_node(&mut self, universe: &BelGraph, id: Uuid) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Ok(());
        }
        let entry = universe.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))?;
        self.index.insert(entry.node.clone(), id);
        self.nodes.insert(id, entry.clone());
        Ok(())
    }

    /// Copy an edge and both its endpoints from `universe`, preserving ids.
    /// The left-join primitive behind upstream-subgraph expansion.
    pub fn import_edge(&mut self, universe: &BelGraph, edge_id: Uuid) -> Result<(), GraphError> {
        if self.edges.contains_key(&edge_id) {
            return Ok(());
        }
        let edge = universe.edges.get(&edge_id).ok_or(GraphError::EdgeNotFound(edge_id))?;
        self.import_node(universe, edge.from)?;
        self.import_node(universe, edge.to)?;
        self.add_edge(edge.clone())?;
        Ok(())
    }

    // ── Node merging ───────────────────────────────────

    /// Merge `source` into `target`: every edge touching `source` is
    /// redirected to `target` (keeping its id and provenance), data keys
    /// missing on `target` are adopted from `source`, and `source` is
    /// removed. Edges that would become self-loops on `target` are dropped.
    pub fn merge_nodes(&mut self, source: Uuid, target: Uuid) -> Result<(), GraphError> {
        if source == target {
            return Err(GraphError::SelfMerge(source));
        }
        if !self.nodes.contains_key(&target) {
            return Err(GraphError::NodeNotFound(target));
        }

        let mut incident: Vec<Uuid> = self.outgoing.get(&source).cloned().unwrap_or_default();
        incident.extend(self.incoming.get(&source).cloned().unwrap_or_default());
        incident.sort();
        incident.dedup();

        for edge_id in incident {
            let mut edge = self.remove_edge(edge_id)?;
            if edge.from == source {
                edge.from = target;
            }
            if edge.to == source {
                edge.to = target;
            }
            if edge.from == edge.to {
                continue;
            }
            self.add_edge(edge)?;
        }

        let entry = self.nodes.remove(&source).ok_or(GraphError::NodeNotFound(source))?;
        self.index.remove(&entry.node);
        self.outgoing.remove(&source);
        self.incoming.remove(&source);

        let dst = self.nodes.get_mut(&target).ok_or(GraphError::NodeNotFound(target))?;
        for (key, value) in entry.data {
            dst.data.entry(key).or_insert(value);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BelNode;

    fn p(name: &str) -> BelNode {
        BelNode::protein("HGNC", name)
    }

    #[test]
    fn add_node_interns_structurally() {
        let mut g = BelGraph::new();
        let a = g.add_node(p("AKT1"));
        let b = g.add_node(p("AKT1"));
        assert_eq!(a, b);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn connect_builds_nodes_and_edge() {
        let mut g = BelGraph::new();
        g.connect(p("A"), p("B"), Relation::Increases);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);

        let a = g.node_id(&p("A")).unwrap();
        let b = g.node_id(&p("B")).unwrap();
        assert_eq!(g.out_degree(a), 1);
        assert_eq!(g.in_degree(b), 1);
    }

    #[test]
    fn multi_edges_between_same_pair() {
        let mut g = BelGraph::new();
        g.connect(p("A"), p("B"), Relation::Increases);
        g.connect(p("A"), p("B"), Relation::Decreases);

        let a = g.node_id(&p("A")).unwrap();
        let b = g.node_id(&p("B")).unwrap();
        let edges = g.edges_between(a, b);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().any(|e| e.relation == Relation::Increases));
        assert!(edges.iter().any(|e| e.relation == Relation::Decreases));
    }

    #[test]
    fn add_edge_rejects_unknown_endpoints() {
        let mut g = BelGraph::new();
        let ghost = BelEdge::new(Uuid::new_v4(), Uuid::new_v4(), Relation::Increases);
        assert!(matches!(g.add_edge(ghost), Err(GraphError::DanglingEdge { .. })));
    }

    #[test]
    fn remove_edge_cleans_adjacency() {
        let mut g = BelGraph::new();
        let e = g.connect(p("A"), p("B"), Relation::Increases);
        g.remove_edge(e).unwrap();

        let a = g.node_id(&p("A")).unwrap();
        let b = g.node_id(&p("B")).unwrap();
        assert_eq!(g.out_degree(a), 0);
        assert_eq!(g.in_degree(b), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut g = BelGraph::new();
        g.connect(p("A"), p("B"), Relation::Increases);
        g.connect(p("B"), p("C"), Relation::Increases);

        let b = g.node_id(&p("B")).unwrap();
        g.remove_node(b).unwrap();

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 0);
        assert!(!g.contains_node(&p("B")));
    }

    #[test]
    fn values_are_overwritable_per_key() {
        let mut g = BelGraph::new();
        let a = g.add_node(p("A"));
        g.set_value(a, "weight", 2.0).unwrap();
        g.set_value(a, "score", -1.0).unwrap();

        assert_eq!(g.value(a, "weight"), Some(2.0));
        assert_eq!(g.value(a, "score"), Some(-1.0));
        assert_eq!(g.value(a, "missing"), None);
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let mut g = BelGraph::new();
        let e = g.connect(p("A"), p("B"), Relation::Increases);
        let a = g.node_id(&p("A")).unwrap();
        g.set_value(a, "weight", 1.0).unwrap();

        let mut copy = g.clone();
        copy.remove_edge(e).unwrap();
        copy.set_value(a, "weight", 9.0).unwrap();

        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.value(a, "weight"), Some(1.0));
    }

    #[test]
    fn induced_subgraph_preserves_ids_and_data() {
        let mut g = BelGraph::new();
        g.connect(p("A"), p("B"), Relation::Increases);
        g.connect(p("B"), p("C"), Relation::Increases);
        let a = g.node_id(&p("A")).unwrap();
        let b = g.node_id(&p("B")).unwrap();
        g.set_value(a, "weight", 3.0).unwrap();

        let keep: HashSet<Uuid> = [a, b].into_iter().collect();
        let sub = g.induced_subgraph(&keep);

        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
        assert_eq!(sub.node_id(&p("A")), Some(a));
        assert_eq!(sub.value(a, "weight"), Some(3.0));
    }

    #[test]
    fn import_edge_copies_endpoints_once() {
        let mut g = BelGraph::new();
        let e1 = g.connect(p("A"), p("B"), Relation::Increases);
        let e2 = g.connect(p("C"), p("B"), Relation::Decreases);

        let mut sub = BelGraph::new();
        sub.import_edge(&g, e1).unwrap();
        sub.import_edge(&g, e2).unwrap();
        sub.import_edge(&g, e1).unwrap(); // idempotent

        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 2);
        assert_eq!(sub.node_id(&p("B")), g.node_id(&p("B")));
    }

    #[test]
    fn merge_nodes_redirects_edges_and_adopts_data() {
        let mut g = BelGraph::new();
        g.connect(p("U"), BelNode::gene("HGNC", "X"), Relation::Increases);
        g.connect(BelNode::gene("HGNC", "X"), p("D"), Relation::Decreases);
        let gene = g.node_id(&BelNode::gene("HGNC", "X")).unwrap();
        let prot = g.add_node(p("X"));
        g.set_value(gene, "weight", 5.0).unwrap();

        g.merge_nodes(gene, prot).unwrap();

        assert!(!g.contains_node(&BelNode::gene("HGNC", "X")));
        assert_eq!(g.in_degree(prot), 1);
        assert_eq!(g.out_degree(prot), 1);
        assert_eq!(g.value(prot, "weight"), Some(5.0));
    }

    #[test]
    fn merge_nodes_drops_would_be_self_loops() {
        let mut g = BelGraph::new();
        g.connect(BelNode::gene("HGNC", "X"), p("X"), Relation::Increases);
        let gene = g.node_id(&BelNode::gene("HGNC", "X")).unwrap();
        let prot = g.node_id(&p("X")).unwrap();

        g.merge_nodes(gene, prot).unwrap();
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn merge_into_missing_target_fails() {
        let mut g = BelGraph::new();
        let a = g.add_node(p("A"));
        assert!(g.merge_nodes(a, Uuid::new_v4()).is_err());
        assert!(g.merge_nodes(a, a).is_err());
    }
}
