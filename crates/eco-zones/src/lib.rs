//! `eco-zones` — the spatial constraint store.
//!
//! Green zones and weather conditions are bundled into immutable, versioned
//! [`ConstraintSnapshot`]s.  A [`ConstraintStore`] hands out the latest one
//! in O(1) and replaces it wholesale on publish; nothing is ever mutated in
//! place, so a search that grabbed version N sees version N to the end.
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`zone`]     | `GreenZone`, `ZoneGeometry`, `Restriction`, `Access`      |
//! | [`weather`]  | `WeatherCondition`                                        |
//! | [`snapshot`] | `ConstraintSnapshot` and its R-tree lookups               |
//! | [`store`]    | `ConstraintStore` — publish / refresh / staleness         |
//! | [`source`]   | `ConstraintSource` trait, `JsonConstraintSource`          |
//! | [`error`]    | `ZoneError`, `ZoneResult<T>`                              |

pub mod error;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod weather;
pub mod zone;

#[cfg(test)]
mod tests;

pub use error::{ZoneError, ZoneResult};
pub use snapshot::ConstraintSnapshot;
pub use source::{ConstraintBundle, ConstraintSource, JsonConstraintSource};
pub use store::ConstraintStore;
pub use weather::WeatherCondition;
pub use zone::{Access, GreenZone, Restriction, RestrictionRule, ZoneGeometry};
