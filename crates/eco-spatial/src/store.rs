//! Versioned, atomically swapped road network.
//!
//! A rebuilt graph is constructed off to the side and swapped in with a
//! single pointer replacement, exactly like constraint snapshots.  Requests
//! that already hold the previous `Arc<RoadNetwork>` finish on it.

use std::sync::Arc;

use tracing::info;

use eco_core::SnapshotCell;

use crate::RoadNetwork;

/// Holder of the current road network.
pub struct GraphStore {
    cell: SnapshotCell<RoadNetwork>,
}

impl GraphStore {
    /// Publish `network` as version 1.
    pub fn new(mut network: RoadNetwork) -> Self {
        network.version = 1;
        Self { cell: SnapshotCell::new(network) }
    }

    /// The current network.  O(1).
    pub fn current(&self) -> Arc<RoadNetwork> {
        self.cell.load()
    }

    /// Swap in a rebuilt network; its version becomes the previous one + 1.
    pub fn replace(&self, mut network: RoadNetwork) -> Arc<RoadNetwork> {
        let next = self.cell.publish_with(move |prev| {
            network.version = prev.version + 1;
            network
        });
        info!(
            version = next.version,
            nodes = next.node_count(),
            edges = next.edge_count(),
            "road network published"
        );
        next
    }
}
