//! Request orchestration.
//!
//! # One request
//!
//! 1. Resolve the vehicle profile.
//! 2. Load the current road network and snap both endpoints.
//! 3. Load the current constraint snapshot; it is used for the whole call.
//! 4. Search with an [`EmissionCostModel`] built from the profile, the
//!    snapshot, the request's objective and its highway preference.
//! 5. Assemble the [`Route`], enforce any emission ceiling, and hand it to
//!    the sinks.
//!
//! Nothing is retried.  Results depend only on the request, the graph
//! version, the snapshot version and the registry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use eco_core::{GeoPoint, NodeId, Timestamp, VehicleProfile, VehicleRegistry};
use eco_route::{
    shortest_path, CancelToken, EmissionCostModel, NoopSearchObserver, Objective, Route, RouteError,
    RoutePreferences, SearchObserver,
};
use eco_spatial::{load_network_csv, GraphStore, RoadNetwork};
use eco_zones::{ConstraintSnapshot, ConstraintSource, ConstraintStore, GreenZone, JsonConstraintSource, WeatherCondition};

use crate::config::EngineConfig;
use crate::estimate::{self, EmissionAlternative, EmissionEstimate};
use crate::impact::{CsvRouteLog, ImpactLedger, ImpactTotals, RouteSink};
use crate::{OptimizeError, ServiceResult};

// ── Request / result ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub vehicle_type: String,
    /// Falls back to the configured default objective.
    #[serde(default)]
    pub objective: Option<Objective>,
    /// Instant at which zone rules and weather are evaluated; defaults to now.
    #[serde(default)]
    pub departure: Option<Timestamp>,
    #[serde(default)]
    pub preferences: RoutePreferences,
}

impl OptimizationRequest {
    pub fn new(origin: GeoPoint, destination: GeoPoint, vehicle_type: &str) -> Self {
        Self {
            origin,
            destination,
            vehicle_type: vehicle_type.to_owned(),
            objective: None,
            departure: None,
            preferences: RoutePreferences::default(),
        }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn departing_at(mut self, at: Timestamp) -> Self {
        self.departure = Some(at);
        self
    }

    pub fn with_preferences(mut self, preferences: RoutePreferences) -> Self {
        self.preferences = preferences;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub route: Route,
    pub vehicle_type: String,
    pub objective: Objective,
    /// The constraint data behind this route is older than it should be.
    pub stale_constraints: bool,
}

// ── Service ───────────────────────────────────────────────────────────────────

/// The engine's request entry point.  `Sync`; share it behind an `Arc`.
///
/// Create via [`OptimizationServiceBuilder`] or [`OptimizationService::from_config`].
pub struct OptimizationService {
    config:      EngineConfig,
    registry:    VehicleRegistry,
    graph:       GraphStore,
    constraints: ConstraintStore,
    ledger:      ImpactLedger,
    sinks:       Vec<Box<dyn RouteSink>>,
}

impl OptimizationService {
    /// Load everything `config` points at: road network CSVs (required),
    /// the constraint JSON and the route log (both optional).
    pub fn from_config(config: EngineConfig) -> ServiceResult<Self> {
        let (Some(nodes), Some(edges)) = (config.nodes_csv.clone(), config.edges_csv.clone()) else {
            return Err(OptimizeError::GraphUnavailable);
        };
        let network = load_network_csv(&nodes, &edges)?;

        let mut builder = OptimizationServiceBuilder::new(config.clone()).network(network);
        if let Some(path) = &config.route_log_csv {
            builder = builder.sink(Box::new(CsvRouteLog::create(path)?));
        }
        let service = builder.build()?;

        if let Some(path) = &config.constraints_json {
            service.refresh_constraints(&JsonConstraintSource::new(path))?;
        }
        Ok(service)
    }

    // ── Optimisation ──────────────────────────────────────────────────────

    pub fn optimize(&self, request: &OptimizationRequest) -> ServiceResult<OptimizationResult> {
        self.optimize_observed(request, &CancelToken::new(), &mut NoopSearchObserver)
    }

    /// As [`optimize`](Self::optimize); `cancel` stops the search early.
    pub fn optimize_with_cancel(
        &self,
        request: &OptimizationRequest,
        cancel: &CancelToken,
    ) -> ServiceResult<OptimizationResult> {
        self.optimize_observed(request, cancel, &mut NoopSearchObserver)
    }

    /// Full form: `observer` sees every settled node.
    pub fn optimize_observed(
        &self,
        request: &OptimizationRequest,
        cancel: &CancelToken,
        observer: &mut dyn SearchObserver,
    ) -> ServiceResult<OptimizationResult> {
        let objective = request.objective.unwrap_or(self.config.objective);
        let span = info_span!("optimize", vehicle = %request.vehicle_type, %objective);
        let _enter = span.enter();

        let profile = self.registry.get_profile(&request.vehicle_type)?;
        let max_emissions_g = request.preferences.max_emissions_g;
        if let Some(limit) = max_emissions_g {
            if !(limit.is_finite() && limit >= 0.0) {
                return Err(OptimizeError::InvalidInput {
                    field: "max_emissions",
                    reason: format!("must be a non-negative number, got {limit}"),
                });
            }
        }

        let graph = self.graph.current();
        let from = self.snap(&graph, request.origin, "origin")?;
        let to = self.snap(&graph, request.destination, "destination")?;

        let snapshot = self.constraints.current_snapshot();
        let stale = self.constraints.is_stale();
        if stale {
            warn!(snapshot = snapshot.version, "serving route from stale constraint data");
        }

        let at = request.departure.unwrap_or_else(Timestamp::now);
        let model = EmissionCostModel::new(profile, &snapshot, at, objective.weights())
            .avoiding_highways(request.preferences.avoid_highways);

        let path = match shortest_path(&graph, &model, from, to, cancel, observer) {
            Ok(path) => path,
            Err(RouteError::NoRouteFound { from, to, zone_pruned }) => {
                if zone_pruned > 0 {
                    warn!(%from, %to, zone_pruned, snapshot = snapshot.version, "no route: green zones block every path");
                } else {
                    info!(%from, %to, "no route: endpoints are disconnected");
                }
                return Err(OptimizeError::NoRouteFound { from, to });
            }
            Err(e) => return Err(e.into()),
        };

        let route = Route::from_path(&graph, path, from, to, snapshot.version);
        debug!(
            edges = route.edges.len(),
            distance_m = route.distance_m,
            duration_s = route.duration_s,
            emissions_g = route.emissions_g,
            graph = route.graph_version,
            snapshot = route.snapshot_version,
            "route assembled"
        );
        if let Some(limit) = max_emissions_g {
            if route.emissions_g > limit {
                info!(emissions_g = route.emissions_g, limit, "route rejected: emission ceiling exceeded");
                return Err(OptimizeError::EmissionsLimitExceeded {
                    emissions_g: route.emissions_g,
                    max_emissions_g: limit,
                });
            }
        }
        self.record(&route, profile);

        Ok(OptimizationResult {
            route,
            vehicle_type: profile.key.clone(),
            objective,
            stale_constraints: stale,
        })
    }

    /// Optimise independent requests, in parallel with the `parallel`
    /// feature.  Results come back in request order.
    pub fn optimize_batch(&self, requests: &[OptimizationRequest]) -> Vec<ServiceResult<OptimizationResult>> {
        #[cfg(not(feature = "parallel"))]
        {
            requests.iter().map(|r| self.optimize(r)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            requests.par_iter().map(|r| self.optimize(r)).collect()
        }
    }

    fn snap(&self, graph: &RoadNetwork, pos: GeoPoint, endpoint: &'static str) -> ServiceResult<NodeId> {
        if !pos.is_valid() {
            return Err(OptimizeError::InvalidInput {
                field: endpoint,
                reason: format!("({}, {}) is not a valid coordinate", pos.lat, pos.lon),
            });
        }
        let (node, distance_m) = graph.nearest_node(pos).ok_or(OptimizeError::GraphUnavailable)?;
        let max_snap_m = self.config.max_snap_distance_m;
        if distance_m > max_snap_m {
            return Err(OptimizeError::UnreachableLocation { endpoint, distance_m, max_snap_m });
        }
        Ok(node.id)
    }

    fn record(&self, route: &Route, profile: &VehicleProfile) {
        let mut sinks: Vec<&dyn RouteSink> = Vec::with_capacity(self.sinks.len() + 1);
        sinks.push(&self.ledger);
        sinks.extend(self.sinks.iter().map(|s| &**s as &dyn RouteSink));
        for sink in sinks {
            if let Err(e) = sink.record(route, profile) {
                warn!(error = %e, "route sink failed");
            }
        }
    }

    // ── Emissions ─────────────────────────────────────────────────────────

    pub fn estimate_emissions(
        &self,
        vehicle_type: &str,
        distance_m: f64,
        cargo_kg: f64,
    ) -> ServiceResult<EmissionEstimate> {
        let profile = self.registry.get_profile(vehicle_type)?;
        estimate::estimate_emissions(profile, distance_m, cargo_kg, &self.config.cargo)
    }

    pub fn emission_alternatives(&self, vehicle_type: &str, distance_m: f64) -> ServiceResult<Vec<EmissionAlternative>> {
        let profile = self.registry.get_profile(vehicle_type)?;
        estimate::emission_alternatives(&self.registry, profile, distance_m)
    }

    // ── Data updates ──────────────────────────────────────────────────────

    /// Publish a new constraint snapshot; returns its version.
    pub fn publish_constraints(
        &self,
        zones: Vec<GreenZone>,
        weather: Vec<WeatherCondition>,
        as_of: Timestamp,
    ) -> ServiceResult<u64> {
        Ok(self.constraints.publish(zones, weather, as_of)?.version)
    }

    /// Pull fresh constraints from `source`.  Failures keep the current
    /// snapshot in service; repeated failures yield
    /// [`OptimizeError::StaleSnapshot`].
    pub fn refresh_constraints(&self, source: &dyn ConstraintSource) -> ServiceResult<u64> {
        Ok(self.constraints.refresh_from(source, Timestamp::now())?.version)
    }

    /// Swap in a rebuilt road network; returns its version.
    pub fn replace_graph(&self, network: RoadNetwork) -> ServiceResult<u64> {
        if network.is_empty() {
            return Err(OptimizeError::GraphUnavailable);
        }
        Ok(self.graph.replace(network).version)
    }

    // ── Read paths ────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &VehicleRegistry {
        &self.registry
    }

    pub fn graph(&self) -> Arc<RoadNetwork> {
        self.graph.current()
    }

    pub fn constraints(&self) -> &ConstraintStore {
        &self.constraints
    }

    pub fn snapshot(&self) -> Arc<ConstraintSnapshot> {
        self.constraints.current_snapshot()
    }

    /// Zones in `city` from the current snapshot, ordered by id.
    pub fn green_zones(&self, city: &str) -> Vec<GreenZone> {
        self.snapshot().zones_in_city(city).into_iter().cloned().collect()
    }

    /// Weather in force at `pos` and `at`, if any region covers it.
    pub fn weather_at(&self, pos: GeoPoint, at: Timestamp) -> Option<WeatherCondition> {
        self.snapshot().weather_at(pos, at).cloned()
    }

    pub fn impact(&self) -> ImpactTotals {
        self.ledger.totals()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`OptimizationService`].
///
/// | Method           | Default                               |
/// |------------------|---------------------------------------|
/// | `.network(n)`    | none; `build` fails `GraphUnavailable` |
/// | `.registry(r)`   | built from `config.vehicles`          |
/// | `.constraints(s)`| empty store, version 0                |
/// | `.sink(s)`       | impact ledger only                    |
pub struct OptimizationServiceBuilder {
    config:      EngineConfig,
    network:     Option<RoadNetwork>,
    registry:    Option<VehicleRegistry>,
    constraints: Option<ConstraintStore>,
    sinks:       Vec<Box<dyn RouteSink>>,
}

impl OptimizationServiceBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            network:     None,
            registry:    None,
            constraints: None,
            sinks:       Vec::new(),
        }
    }

    pub fn network(mut self, network: RoadNetwork) -> Self {
        self.network = Some(network);
        self
    }

    pub fn registry(mut self, registry: VehicleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn constraints(mut self, store: ConstraintStore) -> Self {
        self.constraints = Some(store);
        self
    }

    pub fn sink(mut self, sink: Box<dyn RouteSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn build(self) -> ServiceResult<OptimizationService> {
        self.config.validate()?;

        let network = match self.network {
            Some(n) if !n.is_empty() => n,
            _ => return Err(OptimizeError::GraphUnavailable),
        };
        let registry = match self.registry {
            Some(r) => r,
            None => self.config.registry()?,
        };
        let baseline = registry.get_profile(&self.config.baseline_vehicle).map_err(|_| {
            OptimizeError::Config(format!("baseline vehicle {:?} is not registered", self.config.baseline_vehicle))
        })?;
        let ledger = ImpactLedger::new(baseline);
        let constraints = self
            .constraints
            .unwrap_or_else(|| ConstraintStore::new(self.config.max_refresh_failures));

        info!(
            nodes = network.node_count(),
            edges = network.edge_count(),
            vehicles = registry.len(),
            "optimization service ready"
        );

        Ok(OptimizationService {
            graph: GraphStore::new(network),
            config: self.config,
            registry,
            constraints,
            ledger,
            sinks: self.sinks,
        })
    }
}
