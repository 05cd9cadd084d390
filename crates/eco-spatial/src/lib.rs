//! `eco-spatial` — road network, spatial indexing, and graph loading.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`, `Edge`  |
//! | [`class`]   | `RoadClass` and its default speeds                          |
//! | [`store`]   | `GraphStore` — versioned, atomically swapped network        |
//! | [`loader`]  | `load_network_csv` / `load_network_readers`                 |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |

pub mod class;
pub mod error;
pub mod loader;
pub mod network;
pub mod store;


pub use class::RoadClass;
pub use error::{SpatialError, SpatialResult};
pub use loader::{load_network_csv, load_network_readers};
pub use network::{Edge, Node, RoadNetwork, RoadNetworkBuilder};
pub use store::GraphStore;
