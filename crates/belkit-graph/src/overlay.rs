//! Merging experimental measurements onto a graph's per-node data.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::graph::BelGraph;
use crate::model::BelNode;

/// Write a measurement mapping onto the graph under `key`.
///
/// Returns the number of nodes that received a value. Measurements for
/// entities absent from the graph are counted and logged, never an error —
/// expression panels routinely cover more entities than any one graph.
pub fn overlay_measurements(
    graph: &mut BelGraph,
    measurements: &HashMap<BelNode, f64>,
    key: &str,
) -> usize {
    let mut hit = 0usize;
    let mut missed = 0usize;

    for (node, &value) in measurements {
        match graph.node_id(node) {
            Some(id) => {
                // node id came from the graph itself, so set_value cannot fail
                let _ = graph.set_value(id, key, value);
                hit += 1;
            }
            None => missed += 1,
        }
    }

    if missed > 0 {
        debug!(missed, "measurements for entities absent from the graph were skipped");
    }
    info!(overlaid = hit, key, "experimental measurements overlaid");
    hit
}
