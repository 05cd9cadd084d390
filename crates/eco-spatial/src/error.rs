//! Spatial-subsystem error type.

use thiserror::Error;

use eco_core::NodeId;

/// Errors produced by `eco-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("edge {from} -> {to} references a node outside the network")]
    DanglingEdge { from: NodeId, to: NodeId },

    #[error("edge {from} -> {to} has invalid {what}: {value}")]
    InvalidEdge {
        from:  NodeId,
        to:    NodeId,
        what:  &'static str,
        value: f64,
    },

    #[error("node position {0} is not a valid WGS-84 coordinate")]
    InvalidPosition(eco_core::GeoPoint),

    #[error("network has more than u32::MAX {0}")]
    TooLarge(&'static str),

    #[error("graph parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
