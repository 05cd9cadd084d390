//! Multi-criteria Dijkstra search.
//!
//! # States
//!
//! Each node is *unvisited* (score ∞), on the *frontier* (in the heap with a
//! tentative score) or *settled* (score final).  A settled node is never
//! reopened; every edge score is strictly positive, so Dijkstra's invariant
//! holds and a node's predecessors all settle before it does.
//!
//! # Determinism
//!
//! - The heap orders by `(score, NodeId)`, so equal-score pops are ordered.
//! - When two paths reach a node with the same score, the one arriving via
//!   the lower `EdgeId` is kept.
//!
//! Together these make the returned edge sequence a pure function of the
//! network, the cost model, and the endpoints.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use tracing::debug;

use eco_core::{EdgeId, NodeId};
use eco_spatial::RoadNetwork;

use crate::cost::{CostModel, CostVector};
use crate::{CancelToken, RouteError, RouteResult};

// ── Instrumentation ───────────────────────────────────────────────────────────

/// Hook called as the search finalises nodes.
pub trait SearchObserver {
    /// `node` was settled with cumulative `score`.
    fn on_settle(&mut self, _node: NodeId, _score: f64) {}
}

/// Observer that does nothing.
pub struct NoopSearchObserver;

impl SearchObserver for NoopSearchObserver {}

/// Counters collected during one search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes whose score was finalised.
    pub settled: usize,
    /// Edge relaxations attempted on feasible edges.
    pub relaxed: usize,
    /// Edges skipped because a zone restriction bars the vehicle.
    pub zone_pruned: usize,
}

/// A successful search: the edge sequence with each edge's cost.
#[derive(Clone, Debug)]
pub struct PathResult {
    pub edges: Vec<EdgeId>,
    /// `legs[i]` is the cost of `edges[i]` under the search's model.
    pub legs: Vec<CostVector>,
    /// Cumulative scalar score of the path.
    pub score: f64,
    pub stats: SearchStats,
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Find the minimum-score path from `from` to `to` over feasible edges.
///
/// `cancel` is polled once per heap pop.  `from == to` yields an empty path.
pub fn shortest_path<M, O>(
    network: &RoadNetwork,
    model: &M,
    from: NodeId,
    to: NodeId,
    cancel: &CancelToken,
    observer: &mut O,
) -> RouteResult<PathResult>
where
    M: CostModel + ?Sized,
    O: SearchObserver + ?Sized,
{
    for node in [from, to] {
        if !network.contains_node(node) {
            return Err(RouteError::NodeNotFound(node));
        }
    }

    let mut stats = SearchStats::default();
    if from == to {
        observer.on_settle(from, 0.0);
        stats.settled = 1;
        return Ok(PathResult { edges: vec![], legs: vec![], score: 0.0, stats });
    }

    let n = network.node_count();
    // best[v] = best known cumulative score to reach v.
    let mut best     = vec![f64::INFINITY; n];
    // prev_edge[v] / prev_leg[v] = edge that reached v and its cost.
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut prev_leg  = vec![CostVector::ZERO; n];
    let mut settled   = vec![false; n];

    best[from.index()] = 0.0;

    // Min-heap via Reverse; NodeId is the secondary key for equal scores.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), from)));

    while let Some(Reverse((OrderedFloat(score), node))) = heap.pop() {
        if cancel.is_cancelled() {
            debug!(%from, %to, settled = stats.settled, "search cancelled");
            return Err(RouteError::Cancelled);
        }

        // Skip stale heap entries.
        if settled[node.index()] || score > best[node.index()] {
            continue;
        }
        settled[node.index()] = true;
        stats.settled += 1;
        observer.on_settle(node, score);

        if node == to {
            let (edges, legs) = reconstruct(network, &prev_edge, &prev_leg, from, to);
            debug!(
                %from, %to, score, edges = edges.len(),
                settled = stats.settled, relaxed = stats.relaxed, zone_pruned = stats.zone_pruned,
                "route found"
            );
            return Ok(PathResult { edges, legs, score, stats });
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            if settled[neighbor.index()] {
                continue;
            }

            let leg = model.cost(network, edge);
            if !leg.feasible {
                stats.zone_pruned += 1;
                continue;
            }
            stats.relaxed += 1;

            let candidate = score + model.score(network, edge, &leg);
            let current = best[neighbor.index()];
            let better = candidate < current
                || (candidate == current && edge < prev_edge[neighbor.index()]);

            if better {
                best[neighbor.index()]      = candidate;
                prev_edge[neighbor.index()] = edge;
                prev_leg[neighbor.index()]  = leg;
                if candidate < current {
                    heap.push(Reverse((OrderedFloat(candidate), neighbor)));
                }
            }
        }
    }

    if stats.zone_pruned > 0 {
        debug!(%from, %to, zone_pruned = stats.zone_pruned, "frontier exhausted; zone restrictions pruned edges");
    } else {
        debug!(%from, %to, "frontier exhausted; endpoints disconnected");
    }
    Err(RouteError::NoRouteFound { from, to, zone_pruned: stats.zone_pruned })
}

fn reconstruct(
    network: &RoadNetwork,
    prev_edge: &[EdgeId],
    prev_leg: &[CostVector],
    from: NodeId,
    to: NodeId,
) -> (Vec<EdgeId>, Vec<CostVector>) {
    let mut edges = Vec::new();
    let mut legs = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        edges.push(e);
        legs.push(prev_leg[cur.index()]);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();
    legs.reverse();
    (edges, legs)
}
