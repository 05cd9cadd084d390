//! CSV road-network loader.
//!
//! # CSV format
//!
//! Two files.  `nodes.csv` lists every node with an external integer id:
//!
//! ```csv
//! id,lat,lon
//! 1001,28.6139,77.2090
//! 1002,28.6150,77.2110
//! ```
//!
//! `edges.csv` lists road segments between external ids:
//!
//! ```csv
//! from,to,length_m,duration_s,road_class,oneway
//! 1001,1002,240,,arterial,false
//! ```
//!
//! | Column       | Meaning                                                      |
//! |--------------|--------------------------------------------------------------|
//! | `length_m`   | Optional; empty → haversine distance between the endpoints   |
//! | `duration_s` | Optional; empty → length / class default speed               |
//! | `road_class` | Optional; class name or OSM `highway` value, default `local` |
//! | `oneway`     | Optional; `true`/`yes`/`1` adds only the forward edge        |
//!
//! External ids are remapped to dense `NodeId`s in file order.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::info;

use eco_core::{GeoPoint, NodeId};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::{RoadClass, SpatialError, SpatialResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id:  u64,
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:       u64,
    to:         u64,
    #[serde(default)]
    length_m:   Option<f64>,
    #[serde(default)]
    duration_s: Option<f64>,
    #[serde(default)]
    road_class: Option<String>,
    #[serde(default)]
    oneway:     Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a road network from a pair of CSV files.
pub fn load_network_csv(nodes: &Path, edges: &Path) -> SpatialResult<RoadNetwork> {
    let nodes_file = std::fs::File::open(nodes)?;
    let edges_file = std::fs::File::open(edges)?;
    let network = load_network_readers(nodes_file, edges_file)?;
    info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        path = %nodes.display(),
        "road network loaded"
    );
    Ok(network)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading embedded data.
pub fn load_network_readers<N: Read, E: Read>(nodes: N, edges: E) -> SpatialResult<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    let mut ext_to_id: FxHashMap<u64, NodeId> = FxHashMap::default();

    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut reader = csv::Reader::from_reader(nodes);
    for result in reader.deserialize::<NodeRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let id = builder.add_node(GeoPoint::new(row.lat, row.lon));
        if ext_to_id.insert(row.id, id).is_some() {
            return Err(SpatialError::Parse(format!("duplicate node id {}", row.id)));
        }
    }

    // ── Edges ─────────────────────────────────────────────────────────────
    let mut reader = csv::Reader::from_reader(edges);
    for result in reader.deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let lookup = |ext: u64| {
            ext_to_id
                .get(&ext)
                .copied()
                .ok_or_else(|| SpatialError::Parse(format!("edge references unknown node id {ext}")))
        };
        let (from, to) = (lookup(row.from)?, lookup(row.to)?);

        let class = match row.road_class.as_deref().map(str::trim) {
            None | Some("") => RoadClass::Local,
            Some(s) => s.parse()?,
        };
        let length_m = match row.length_m {
            Some(len) => len,
            None => match (builder.node_pos(from), builder.node_pos(to)) {
                (Some(a), Some(b)) => a.distance_m(b),
                _ => return Err(SpatialError::DanglingEdge { from, to }),
            },
        };
        let duration_s = row
            .duration_s
            .unwrap_or_else(|| length_m / class.default_speed_mps());

        if parse_oneway(row.oneway.as_deref())? {
            builder.add_directed_edge(from, to, length_m, duration_s, class);
        } else {
            builder.add_road(from, to, length_m, duration_s, class);
        }
    }

    builder.build()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_oneway(s: Option<&str>) -> SpatialResult<bool> {
    match s.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("no") | Some("0") => Ok(false),
        Some("true") | Some("yes") | Some("1") => Ok(true),
        Some(other) => Err(SpatialError::Parse(format!(
            "invalid oneway value {other:?}: expected true/false, yes/no, or 1/0"
        ))),
    }
}
