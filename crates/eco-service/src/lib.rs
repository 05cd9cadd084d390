//! `eco-service` — request orchestration for the eco-route engine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`service`]  | `OptimizationService`, its builder, request and result types  |
//! | [`estimate`] | `estimate_emissions`, `emission_alternatives`, `CargoPolicy`  |
//! | [`impact`]   | `RouteSink`, `ImpactLedger`, `CsvRouteLog`                    |
//! | [`config`]   | `EngineConfig`                                                |
//! | [`error`]    | `OptimizeError`, `ServiceResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                         |
//! |------------|------------------------------------------------|
//! | `parallel` | `optimize_batch` runs on Rayon (default on)    |

pub mod config;
pub mod error;
pub mod estimate;
pub mod impact;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use error::{OptimizeError, ServiceResult};
pub use estimate::{emission_alternatives, estimate_emissions, CargoPolicy, EmissionAlternative, EmissionEstimate};
pub use impact::{CsvRouteLog, ImpactLedger, ImpactTotals, RouteSink};
pub use service::{OptimizationRequest, OptimizationResult, OptimizationService, OptimizationServiceBuilder};
