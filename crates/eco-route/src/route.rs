//! The immutable search result.

use serde::Serialize;

use eco_core::{EdgeId, GeoPoint, NodeId};
use eco_spatial::RoadNetwork;

use crate::cost::CostVector;
use crate::pathfinder::PathResult;

/// A route from `origin` to `destination`.
///
/// Totals are the sums of `legs`; nothing is computed independently.
/// Built once by [`Route::from_path`] and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub origin: NodeId,
    pub destination: NodeId,
    pub edges: Vec<EdgeId>,
    pub legs: Vec<CostVector>,
    /// Node coordinates from origin to destination, `edges.len() + 1` long.
    pub waypoints: Vec<GeoPoint>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub emissions_g: f64,
    pub score: f64,
    pub graph_version: u64,
    pub snapshot_version: u64,
}

impl Route {
    /// Assemble a route from a search result over `network`.
    pub fn from_path(
        network: &RoadNetwork,
        path: PathResult,
        origin: NodeId,
        destination: NodeId,
        snapshot_version: u64,
    ) -> Self {
        let mut waypoints = Vec::with_capacity(path.edges.len() + 1);
        waypoints.push(network.node_pos[origin.index()]);
        waypoints.extend(path.edges.iter().map(|e| network.node_pos[network.edge_to[e.index()].index()]));

        let total = path.legs.iter().fold(CostVector::ZERO, |acc, leg| acc + *leg);

        Self {
            origin,
            destination,
            edges: path.edges,
            legs: path.legs,
            waypoints,
            distance_m: total.distance_m,
            duration_s: total.duration_s,
            emissions_g: total.emissions_g,
            score: path.score,
            graph_version: network.version,
            snapshot_version,
        }
    }

    /// Origin and destination snapped to the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every edge starts where the previous one ended, and the chain runs
    /// from `origin` to `destination`.
    pub fn is_contiguous(&self, network: &RoadNetwork) -> bool {
        let mut at = self.origin;
        for e in &self.edges {
            if network.edge_from[e.index()] != at {
                return false;
            }
            at = network.edge_to[e.index()];
        }
        at == self.destination
    }
}
