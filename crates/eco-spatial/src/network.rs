//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges are the `EdgeId`s
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All edge arrays are sorted by source node and indexed by `EdgeId`.  The
//! sort is stable, so edges leaving the same node keep the order they were
//! added in and edge ids are reproducible for a given input.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over `[lat, lon]` finds snap candidates; the final
//! choice is made by haversine distance with ties going to the lower `NodeId`.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use eco_core::{EdgeId, GeoPoint, NodeId};

use crate::{RoadClass, SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Only used to find a first
    /// candidate; [`RoadNetwork::nearest_node`] re-ranks by haversine.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Views ─────────────────────────────────────────────────────────────────────

/// A road-network node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub pos: GeoPoint,
}

/// A directed road segment, assembled from the CSR arrays on demand.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Physical length in metres.
    pub length_m: f64,
    /// Free-flow traversal time in seconds.
    pub base_duration_s: f64,
    pub class: RoadClass,
    /// Point used for zone and weather lookups.
    pub midpoint: GeoPoint,
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a spatial index for node snapping.
///
/// Immutable once built.  Do not construct directly; use
/// [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    /// Publication version, assigned by [`GraphStore`](crate::GraphStore).
    /// Zero for networks that were never published.
    pub version: u64,

    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source node of each edge.  Redundant with CSR but required for
    /// route reconstruction (trace predecessor edges back to the origin).
    pub edge_from: Vec<NodeId>,

    pub edge_to: Vec<NodeId>,

    pub edge_length_m: Vec<f64>,

    pub edge_duration_s: Vec<f64>,

    pub edge_class: Vec<RoadClass>,

    /// Precomputed midpoint of each edge.
    pub edge_midpoint: Vec<GeoPoint>,

    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    ///
    /// Useful as a placeholder before the first graph is published; any
    /// search against it fails and the service refuses to start on it.
    pub fn empty() -> Self {
        Self {
            version: 0,
            node_pos: Vec::new(),
            node_out_start: vec![0],
            edge_from: Vec::new(),
            edge_to: Vec::new(),
            edge_length_m: Vec::new(),
            edge_duration_s: Vec::new(),
            edge_class: Vec::new(),
            edge_midpoint: Vec::new(),
            spatial_idx: RTree::new(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    // ── Element access ────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> SpatialResult<Node> {
        self.node_pos
            .get(id.index())
            .map(|&pos| Node { id, pos })
            .ok_or(SpatialError::NodeNotFound(id))
    }

    /// Assemble the [`Edge`] view for `id`.
    ///
    /// # Panics
    /// Panics if `id` is out of range; edge ids only come from this network.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> Edge {
        let i = id.index();
        Edge {
            id,
            source: self.edge_from[i],
            target: self.edge_to[i],
            length_m: self.edge_length_m[i],
            base_duration_s: self.edge_duration_s[i],
            class: self.edge_class[i],
            midpoint: self.edge_midpoint[i],
        }
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`, in
    /// ascending id order.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()];
        let end   = self.node_out_start[node.index() + 1];
        (start..end).map(EdgeId)
    }

    /// Outgoing edges of `node` paired with the node each one leads to.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (Edge, Node)> + '_ {
        self.out_edges(node).map(move |e| {
            let edge = self.edge(e);
            let to = Node { id: edge.target, pos: self.node_pos[edge.target.index()] };
            (edge, to)
        })
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node nearest to `pos` by haversine distance, with its distance in
    /// metres.  Equidistant nodes resolve to the lowest `NodeId`.
    ///
    /// Returns `None` only if the network has no nodes.
    pub fn nearest_node(&self, pos: GeoPoint) -> Option<(Node, f64)> {
        let query = [pos.lat, pos.lon];
        let first = self.spatial_idx.nearest_neighbor(&query)?;
        let bound = pos.distance_m(self.node_pos[first.id.index()]);

        // Every node at haversine distance <= bound lies inside these boxes
        // (two of them across the antimeridian), so scanning them finds the
        // exact winner.
        let mut best = (bound, first.id);
        for (lo, hi) in pos.covering_boxes(bound * (1.0 + 1e-9) + 1e-6) {
            let envelope = AABB::from_corners(lo, hi);
            for entry in self.spatial_idx.locate_in_envelope(&envelope) {
                let d = pos.distance_m(self.node_pos[entry.id.index()]);
                if d < best.0 || (d == best.0 && entry.id < best.1) {
                    best = (d, entry.id);
                }
            }
        }
        let (dist, id) = best;
        Some((Node { id, pos: self.node_pos[id.index()] }, dist))
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use eco_core::GeoPoint;
/// use eco_spatial::{RoadClass, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(28.61, 77.20));
/// let c = b.add_node(GeoPoint::new(28.62, 77.21));
/// b.add_road(a, c, 1_400.0, 100.0, RoadClass::Arterial);
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
#[derive(Default)]
pub struct RoadNetworkBuilder {
    nodes:     Vec<GeoPoint>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:       NodeId,
    to:         NodeId,
    length_m:   f64,
    duration_s: f64,
    class:      RoadClass,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        length_m: f64,
        duration_s: f64,
        class: RoadClass,
    ) {
        self.raw_edges.push(RawEdge { from, to, length_m, duration_s, class });
    }

    /// Add edges in **both directions** for a two-way road segment.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64, duration_s: f64, class: RoadClass) {
        self.add_directed_edge(a, b, length_m, duration_s, class);
        self.add_directed_edge(b, a, length_m, duration_s, class);
    }

    /// Position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.get(id.index()).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Validate and consume the builder, producing a [`RoadNetwork`].
    ///
    /// Fails if any edge references a missing node or carries a length or
    /// duration that is not a positive finite number.  Time complexity: O(E log E) for the
    /// edge sort + O(N log N) for the R-tree bulk load.
    pub fn build(self) -> SpatialResult<RoadNetwork> {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();
        if u32::try_from(node_count).is_err() || node_count == u32::MAX as usize {
            return Err(SpatialError::TooLarge("nodes"));
        }
        if u32::try_from(edge_count).is_err() || edge_count == u32::MAX as usize {
            return Err(SpatialError::TooLarge("edges"));
        }

        if let Some(&bad) = self.nodes.iter().find(|p| !p.is_valid()) {
            return Err(SpatialError::InvalidPosition(bad));
        }
        for e in &self.raw_edges {
            if e.from.index() >= node_count || e.to.index() >= node_count {
                return Err(SpatialError::DanglingEdge { from: e.from, to: e.to });
            }
            for (what, value) in [("length", e.length_m), ("duration", e.duration_s)] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(SpatialError::InvalidEdge { from: e.from, to: e.to, what, value });
                }
            }
        }

        // Stable sort keeps per-node insertion order, making EdgeIds reproducible.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:       Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:         Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_length_m:   Vec<f64>       = raw.iter().map(|e| e.length_m).collect();
        let edge_duration_s: Vec<f64>       = raw.iter().map(|e| e.duration_s).collect();
        let edge_class:      Vec<RoadClass> = raw.iter().map(|e| e.class).collect();
        let edge_midpoint:   Vec<GeoPoint>  = raw
            .iter()
            .map(|e| self.nodes[e.from.index()].midpoint(self.nodes[e.to.index()]))
            .collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.lat, pos.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Ok(RoadNetwork {
            version: 0,
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_duration_s,
            edge_class,
            edge_midpoint,
            spatial_idx,
        })
    }
}
