//! Route planner: direct-path fast check with a visibility-graph
//! Dijkstra fallback.

use crate::geometry::buffer_zones;
use crate::models::{PathPoint, RestrictedZone, Route, RouteRequest};
use crate::spatial::haversine_distance;
use crate::visibility::{segment_clear, VisibilityGraph, END_NODE, START_NODE};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Outward buffer applied to every zone before clearance tests.
    pub safety_buffer_m: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            safety_buffer_m: 55.0,
        }
    }
}

/// Plan a collision-free route from start to end at the given cruise
/// altitude, around the supplied restricted zones.
///
/// Geometric dead ends are not errors: when no path exists the result
/// is [`Route::blocked`] and the caller must check for it. Coordinate
/// validation is the caller's job.
pub fn plan_route(
    start: [f64; 2],
    end: [f64; 2],
    altitude_ft: f64,
    zones: &[RestrictedZone],
    config: &PlannerConfig,
) -> Route {
    let buffered = buffer_zones(zones, altitude_ft, config.safety_buffer_m);

    // Fast path: the direct segment clears everything.
    if segment_clear(start, end, &buffered) {
        return Route::from_points(vec![
            PathPoint::new(start[0], start[1], altitude_ft),
            PathPoint::new(end[0], end[1], altitude_ft),
        ]);
    }

    let graph = VisibilityGraph::build(start, end, &buffered);
    let Some(node_path) = dijkstra(&graph, START_NODE, END_NODE) else {
        return Route::blocked();
    };

    let points = node_path
        .into_iter()
        .map(|idx| {
            let node = graph.nodes[idx];
            PathPoint::new(node[0], node[1], altitude_ft)
        })
        .collect();
    Route::from_points(points)
}

/// Plan from a transport-layer request.
pub fn plan_route_request(
    request: &RouteRequest,
    zones: &[RestrictedZone],
    config: &PlannerConfig,
) -> Route {
    plan_route(
        [request.start_lat, request.start_lon],
        [request.end_lat, request.end_lon],
        request.altitude_ft,
        zones,
        config,
    )
}

/// Total-order wrapper so f64 path costs can live in the binary heap.
#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    cost: FloatOrd,
    node: usize,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.cmp(&other.cost).then_with(|| self.node.cmp(&other.node))
    }
}

/// Dijkstra over the visibility graph with true-distance edge weights.
/// Stale heap entries are skipped when their recorded cost has been
/// beaten since they were pushed.
fn dijkstra(graph: &VisibilityGraph, source: usize, target: usize) -> Option<Vec<usize>> {
    let n = graph.nodes.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut open: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();

    dist[source] = 0.0;
    open.push(Reverse(OpenNode {
        cost: FloatOrd(0.0),
        node: source,
    }));

    while let Some(Reverse(current)) = open.pop() {
        if current.cost.0 > dist[current.node] {
            continue;
        }
        if current.node == target {
            break;
        }

        let here = graph.nodes[current.node];
        for &neighbor in &graph.adjacency[current.node] {
            let there = graph.nodes[neighbor];
            let weight = haversine_distance(here[0], here[1], there[0], there[1]);
            let tentative = dist[current.node] + weight;
            if tentative < dist[neighbor] {
                dist[neighbor] = tentative;
                prev[neighbor] = Some(current.node);
                open.push(Reverse(OpenNode {
                    cost: FloatOrd(tentative),
                    node: neighbor,
                }));
            }
        }
    }

    if !dist[target].is_finite() {
        return None;
    }

    let mut path = vec![target];
    let mut cursor = target;
    while let Some(parent) = prev[cursor] {
        path.push(parent);
        cursor = parent;
    }
    path.reverse();
    if path[0] != source {
        return None;
    }
    Some(path)
}
