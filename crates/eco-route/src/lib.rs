//! `eco-route` — cost model and pathfinder.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`cost`]       | `CostVector`, `CostWeights`, `Objective`, `RoutePreferences`, `CostModel`, `EmissionCostModel` |
//! | [`pathfinder`] | `shortest_path`, `SearchObserver`, `SearchStats`         |
//! | [`route`]      | `Route` — the immutable search result                    |
//! | [`cancel`]     | `CancelToken`                                            |
//! | [`error`]      | `RouteError`, `RouteResult<T>`                           |
//!
//! # Pluggability
//!
//! The pathfinder is generic over [`CostModel`], so alternative models (for
//! example a congestion-aware one) can be used without touching the search.

pub mod cancel;
pub mod cost;
pub mod error;
pub mod pathfinder;
pub mod route;


pub use cancel::CancelToken;
pub use cost::{
    CostModel, CostVector, CostWeights, EmissionCostModel, Objective, RoutePreferences,
    HIGHWAY_AVOIDANCE_FACTOR,
};
pub use error::{RouteError, RouteResult};
pub use pathfinder::{shortest_path, NoopSearchObserver, PathResult, SearchObserver, SearchStats};
pub use route::Route;
