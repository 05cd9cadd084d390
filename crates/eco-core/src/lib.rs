//! `eco-core` — foundational types for the eco-route engine.
//!
//! This crate is a dependency of every other `eco-*` crate.  It has no
//! `eco-*` dependencies and only small external ones (`thiserror`, `serde`,
//! `rustc-hash`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `NodeId`, `EdgeId`                                      |
//! | [`geo`]       | `GeoPoint`, haversine distance, midpoints               |
//! | [`time`]      | `Timestamp`, `TimeWindow`, `DailyWindow`                |
//! | [`vehicle`]   | `Powertrain`, `VehicleProfile`, `VehicleRegistry`       |
//! | [`cell`]      | `SnapshotCell` — atomically replaceable `Arc<T>`        |
//! | [`error`]     | `CoreError`, `CoreResult`                               |

pub mod cell;
pub mod error;
pub mod geo;
pub mod ids;
pub mod time;
pub mod vehicle;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::SnapshotCell;
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId};
pub use time::{DailyWindow, TimeWindow, Timestamp};
pub use vehicle::{Powertrain, VehicleProfile, VehicleRegistry};
