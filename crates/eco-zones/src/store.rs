//! The constraint store: one current snapshot, replaced atomically.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use eco_core::{SnapshotCell, Timestamp};

use crate::snapshot::ConstraintSnapshot;
use crate::source::ConstraintSource;
use crate::weather::WeatherCondition;
use crate::zone::GreenZone;
use crate::{ZoneError, ZoneResult};

/// Holder of the current [`ConstraintSnapshot`].
///
/// Refresh failures never remove the last good snapshot.  After
/// `max_failures` consecutive failures the store reports itself stale until
/// the next successful publish.
pub struct ConstraintStore {
    cell:         SnapshotCell<ConstraintSnapshot>,
    failures:     AtomicU32,
    stale:        AtomicBool,
    max_failures: u32,
}

impl ConstraintStore {
    /// Start with an empty version-0 snapshot.
    pub fn new(max_failures: u32) -> Self {
        Self {
            cell:         SnapshotCell::new(ConstraintSnapshot::empty(Timestamp::EPOCH)),
            failures:     AtomicU32::new(0),
            stale:        AtomicBool::new(false),
            max_failures: max_failures.max(1),
        }
    }

    /// The latest snapshot.  O(1); callers keep it for a whole request.
    pub fn current_snapshot(&self) -> Arc<ConstraintSnapshot> {
        self.cell.load()
    }

    /// Build a snapshot from `zones` and `weather` and make it current.
    ///
    /// Validation and indexing happen before the swap, so a rejected bundle
    /// leaves the current snapshot untouched.
    pub fn publish(
        &self,
        zones: Vec<GreenZone>,
        weather: Vec<WeatherCondition>,
        as_of: Timestamp,
    ) -> ZoneResult<Arc<ConstraintSnapshot>> {
        let mut snapshot = ConstraintSnapshot::build(zones, weather, as_of)?;
        let next = self.cell.publish_with(move |prev| {
            snapshot.version = prev.version + 1;
            snapshot
        });
        self.failures.store(0, Ordering::Release);
        self.stale.store(false, Ordering::Release);
        info!(
            version = next.version,
            zones = next.zones().len(),
            weather = next.weather().len(),
            "constraint snapshot published"
        );
        Ok(next)
    }

    /// Fetch from `source` and publish.  On failure the current snapshot is
    /// kept; once consecutive failures reach the limit the store turns stale
    /// and this returns [`ZoneError::Stale`].
    pub fn refresh_from(&self, source: &dyn ConstraintSource, as_of: Timestamp) -> ZoneResult<Arc<ConstraintSnapshot>> {
        let result = source
            .fetch()
            .and_then(|bundle| self.publish(bundle.zones, bundle.weather, as_of));

        match result {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                let failures = self.failures.fetch_add(1, Ordering::AcqRel) + 1;
                let current = self.cell.load().version;
                warn!(failures, serving_version = current, error = %e, "constraint refresh failed");
                if failures >= self.max_failures {
                    if !self.stale.swap(true, Ordering::AcqRel) {
                        warn!(failures, serving_version = current, "constraint data marked stale");
                    }
                    return Err(ZoneError::Stale { failures, last: e.to_string() });
                }
                Err(e)
            }
        }
    }

    /// `true` while repeated refresh failures leave old data in service.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures.load(Ordering::Acquire)
    }
}
