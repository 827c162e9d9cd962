//! Visibility graph construction over buffered restricted zones.

use crate::geometry::BufferedZone;

/// Graph of mutually-visible candidate waypoints.
///
/// Node 0 is the start, node 1 the end; the remainder are buffered
/// ring vertices. Ephemeral: rebuilt for every planning request and
/// never persisted.
#[derive(Debug)]
pub struct VisibilityGraph {
    pub nodes: Vec<[f64; 2]>,
    pub adjacency: Vec<Vec<usize>>,
}

pub const START_NODE: usize = 0;
pub const END_NODE: usize = 1;

impl VisibilityGraph {
    /// Build the graph for a start/end pair against the buffered zones.
    ///
    /// Every unordered node pair gets an edge iff the connecting
    /// segment clears all zones. This is O(N^2) segment tests against
    /// O(M) zones each; fine for the tens of zones/vertices this
    /// system deals in, and a deliberate design ceiling.
    pub fn build(start: [f64; 2], end: [f64; 2], zones: &[BufferedZone]) -> Self {
        let mut nodes = vec![start, end];
        for zone in zones {
            nodes.extend(zone.ring.iter().copied());
        }

        let n = nodes.len();
        let mut adjacency = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                if segment_clear(nodes[i], nodes[j], zones) {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }

        Self { nodes, adjacency }
    }
}

/// Whether the segment a-b clears every buffered zone.
pub fn segment_clear(a: [f64; 2], b: [f64; 2], zones: &[BufferedZone]) -> bool {
    zones.iter().all(|zone| !zone.blocks_segment(a, b))
}
