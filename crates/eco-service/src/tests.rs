//! Unit tests for eco-service.

#[cfg(test)]
pub(crate) mod helpers {
    use eco_core::{GeoPoint, Timestamp};
    use eco_spatial::{RoadClass, RoadNetwork, RoadNetworkBuilder};
    use eco_zones::{GreenZone, RestrictionRule, ZoneGeometry};

    use crate::{EngineConfig, OptimizationRequest, OptimizationService, OptimizationServiceBuilder};

    pub const A: GeoPoint = GeoPoint::new(0.0, 0.0);
    pub const B: GeoPoint = GeoPoint::new(0.0, 0.01);
    pub const C: GeoPoint = GeoPoint::new(0.01, 0.01);
    pub const D: GeoPoint = GeoPoint::new(0.01, 0.0);
    pub const NOON: Timestamp = Timestamp(12 * 3600);

    /// Square A-B-C-D, equal two-way sides of 1 km.
    pub fn square() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let ids: Vec<_> = [A, B, C, D].into_iter().map(|p| b.add_node(p)).collect();
        for (x, y) in [(0, 1), (1, 2), (0, 3), (3, 2)] {
            b.add_road(ids[x], ids[y], 1_000.0, 60.0, RoadClass::Local);
        }
        b.build().unwrap()
    }

    pub fn service() -> OptimizationService {
        OptimizationServiceBuilder::new(EngineConfig::default())
            .network(square())
            .build()
            .unwrap()
    }

    pub fn request(vehicle: &str, from: GeoPoint, to: GeoPoint) -> OptimizationRequest {
        OptimizationRequest::new(from, to, vehicle).departing_at(NOON)
    }

    /// Bans diesel on every edge of the square.
    pub fn diesel_ban_everywhere() -> GreenZone {
        GreenZone::new("lez", "Low emission zone", ZoneGeometry::circle(GeoPoint::new(0.005, 0.005), 2_000.0))
            .in_city("Testville")
            .with_rule(RestrictionRule::deny("diesel"))
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::io::Cursor;

    use eco_core::{CoreError, Powertrain, VehicleProfile};
    use eco_route::Objective;

    use crate::EngineConfig;

    #[test]
    fn empty_document_is_default() {
        let c = EngineConfig::from_reader(Cursor::new("{}")).unwrap();
        assert_eq!(c, EngineConfig::default());
        assert_eq!(c.max_snap_distance_m, 500.0);
        assert_eq!(c.objective, Objective::Balanced);
        assert_eq!(c.cargo.free_capacity_kg, 100.0);
        assert_eq!(c.max_refresh_failures, 3);
        assert_eq!(c.vehicles.len(), 8);
    }

    #[test]
    fn partial_document() {
        let json = r#"{
            "max_snap_distance_m": 250,
            "objective": "greenest",
            "cargo": { "surcharge_rate": 0.5 },
            "places": { "depot": { "lat": 1.0, "lon": 2.0 } }
        }"#;
        let c = EngineConfig::from_reader(Cursor::new(json)).unwrap();
        assert_eq!(c.max_snap_distance_m, 250.0);
        assert_eq!(c.objective, Objective::Greenest);
        assert_eq!(c.cargo.surcharge_rate, 0.5);
        assert_eq!(c.cargo.free_capacity_kg, 100.0);
        assert_eq!(c.places["depot"].lon, 2.0);
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            r#"{ "max_snap_distance_m": 0 }"#,
            r#"{ "cargo": { "free_capacity_kg": -1 } }"#,
            r#"{ "nodes_csv": "n.csv" }"#,
            r#"{ "baseline_vehicle": "hovercraft" }"#,
            r#"{ "vehicles": [] }"#,
        ];
        for json in bad {
            assert!(
                matches!(EngineConfig::from_reader(Cursor::new(json)), Err(CoreError::Config(_))),
                "{json} accepted"
            );
        }
        assert!(matches!(EngineConfig::from_reader(Cursor::new("{")), Err(CoreError::Parse(_))));
    }

    #[test]
    fn duplicate_vehicle_keys_rejected() {
        let v = VehicleProfile::new("van", "Van", Powertrain::Diesel, 0.2, 1.0, 800.0);
        let c = EngineConfig { vehicles: vec![v.clone(), v], baseline_vehicle: "van".into(), ..Default::default() };
        assert!(matches!(c.validate(), Err(CoreError::DuplicateVehicle(k)) if k == "van"));
    }

    #[test]
    fn custom_fleet_from_json() {
        let json = r#"{
            "baseline_vehicle": "truck",
            "vehicles": [
                { "key": "truck", "name": "Truck", "powertrain": "diesel",
                  "emission_factor": 0.4, "speed_factor": 1.3, "cargo_capacity_kg": 8000 },
                { "key": "ebike", "name": "E-bike", "powertrain": "electric",
                  "emission_factor": 0.005, "speed_factor": 2.0, "cargo_capacity_kg": 50,
                  "exempt_zones": ["old-town"] }
            ]
        }"#;
        let c = EngineConfig::from_reader(Cursor::new(json)).unwrap();
        let reg = c.registry().unwrap();
        assert_eq!(reg.len(), 2);
        assert!(reg.get_profile("ebike").unwrap().is_exempt_from("old-town"));
    }
}

// ── Emission estimates ────────────────────────────────────────────────────────

#[cfg(test)]
mod estimate {
    use eco_core::VehicleRegistry;

    use crate::{emission_alternatives, estimate_emissions, CargoPolicy, OptimizeError};

    #[test]
    fn no_surcharge_under_free_capacity() {
        let reg = VehicleRegistry::builtin();
        let electric = reg.get_profile("electric").unwrap();
        let e = estimate_emissions(electric, 10_000.0, 50.0, &CargoPolicy::default()).unwrap();
        assert!((e.emissions_g - 10_000.0 * electric.emission_factor).abs() < 1e-9);
        assert_eq!(e.cargo_factor, 1.0);
        assert_eq!(e.efficiency_score, 100.0);
    }

    #[test]
    fn linear_surcharge_above_free_capacity() {
        let reg = VehicleRegistry::builtin();
        let diesel = reg.get_profile("diesel").unwrap();
        // 250 kg excess on a 500 kg vehicle at 20 % → factor 1.1.
        let e = estimate_emissions(diesel, 10_000.0, 350.0, &CargoPolicy::default()).unwrap();
        assert!((e.cargo_factor - 1.1).abs() < 1e-12);
        assert!((e.emissions_g - 1_710.0 * 1.1).abs() < 1e-9);
        assert!((e.base_emissions_g - 1_710.0).abs() < 1e-9);
        assert!((e.efficiency_score - 97.0).abs() < 1e-9);
    }

    #[test]
    fn efficiency_floors_at_zero() {
        let reg = VehicleRegistry::builtin();
        let bike = reg.get_profile("cargo_bike").unwrap();
        let policy = CargoPolicy { free_capacity_kg: 0.0, surcharge_rate: 10.0 };
        let e = estimate_emissions(bike, 1_000.0, 100.0, &policy).unwrap();
        assert_eq!(e.cargo_factor, 11.0);
        assert_eq!(e.efficiency_score, 0.0);
    }

    #[test]
    fn invalid_inputs_name_the_field() {
        let reg = VehicleRegistry::builtin();
        let diesel = reg.get_profile("diesel").unwrap();
        let err = estimate_emissions(diesel, -5.0, 0.0, &CargoPolicy::default()).unwrap_err();
        assert_eq!(err.field(), Some("distance"));
        let err = estimate_emissions(diesel, 5.0, f64::NAN, &CargoPolicy::default()).unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidInput { field: "cargo_weight", .. }));
    }

    #[test]
    fn alternatives_are_cleaner_and_sorted() {
        let reg = VehicleRegistry::builtin();
        let diesel = reg.get_profile("diesel").unwrap();
        let alts = emission_alternatives(&reg, diesel, 10_000.0).unwrap();
        let keys: Vec<&str> = alts.iter().map(|a| a.vehicle_type.as_str()).collect();
        assert_eq!(keys, ["cargo_bike", "electric", "electric_van", "hybrid", "petrol"]);
        assert!(alts.iter().all(|a| a.savings_g > 0.0));
        assert!((alts[1].savings_g - 10_000.0 * (0.171 - 0.053)).abs() < 1e-6);

        let bike = reg.get_profile("cargo_bike").unwrap();
        assert!(emission_alternatives(&reg, bike, 10_000.0).unwrap().is_empty());
    }
}

// ── Error mapping ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod errors {
    use eco_core::{CoreError, NodeId};
    use eco_route::RouteError;
    use eco_zones::ZoneError;

    use crate::OptimizeError;

    #[test]
    fn kinds_and_fields() {
        let e = OptimizeError::from(CoreError::UnknownVehicle("hovercraft".into()));
        assert_eq!(e.kind(), "invalid_vehicle_type");
        assert_eq!(e.field(), Some("vehicle_type"));

        let e = OptimizeError::UnreachableLocation { endpoint: "destination", distance_m: 900.0, max_snap_m: 500.0 };
        assert_eq!(e.kind(), "unreachable_location");
        assert_eq!(e.field(), Some("destination"));
        assert!(e.to_string().contains("900 m"));

        assert_eq!(OptimizeError::GraphUnavailable.field(), None);

        let e = OptimizeError::EmissionsLimitExceeded { emissions_g: 342.0, max_emissions_g: 300.0 };
        assert_eq!(e.kind(), "emissions_limit_exceeded");
        assert_eq!(e.field(), Some("max_emissions"));
        assert!(e.to_string().contains("342 g"));
    }

    #[test]
    fn route_errors_hide_pruning_detail() {
        let e = OptimizeError::from(RouteError::NoRouteFound { from: NodeId(1), to: NodeId(2), zone_pruned: 7 });
        assert!(matches!(e, OptimizeError::NoRouteFound { from: NodeId(1), to: NodeId(2) }));
        assert_eq!(OptimizeError::from(RouteError::Cancelled).kind(), "cancelled");
    }

    #[test]
    fn stale_zone_error_becomes_stale_snapshot() {
        let e = OptimizeError::from(ZoneError::Stale { failures: 3, last: "timeout".into() });
        assert!(matches!(e, OptimizeError::StaleSnapshot { failures: 3 }));
        let e = OptimizeError::from(ZoneError::Source("down".into()));
        assert_eq!(e.kind(), "constraint_source");
    }
}

// ── Optimisation ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod optimize {
    use eco_core::{GeoPoint, NodeId, Timestamp};
    use eco_route::{CancelToken, Objective, RoutePreferences};
    use eco_spatial::RoadNetwork;
    use eco_zones::{ConstraintBundle, ConstraintSource, ZoneError, ZoneResult};

    use super::helpers::{diesel_ban_everywhere, request, service, square, A, B, C, NOON};
    use crate::{EngineConfig, OptimizationRequest, OptimizationServiceBuilder, OptimizeError};

    #[test]
    fn square_route_is_two_edges_with_summed_totals() {
        let svc = service();
        let res = svc.optimize(&request("diesel", A, C)).unwrap();
        let r = &res.route;
        assert_eq!(r.edges.len(), 2);
        assert_eq!(r.distance_m, 2_000.0);
        assert_eq!(r.duration_s, 120.0);
        assert!((r.emissions_g - 2_000.0 * 0.171).abs() < 1e-9);
        assert_eq!(r.waypoints.first(), Some(&A));
        assert_eq!(r.waypoints.last(), Some(&C));
        // Lower edge id into C comes from B.
        assert_eq!(r.waypoints[1], B);
        assert!(r.is_contiguous(&svc.graph()));
        assert_eq!(res.objective, Objective::Balanced);
        assert!(!res.stale_constraints);
    }

    #[test]
    fn repeated_requests_are_identical() {
        let svc = service();
        let req = request("hybrid", A, C);
        let first = svc.optimize(&req).unwrap();
        for _ in 0..5 {
            assert_eq!(svc.optimize(&req).unwrap().route, first.route);
        }
    }

    #[test]
    fn unknown_vehicle() {
        let svc = service();
        let err = svc.optimize(&request("hovercraft", A, C)).unwrap_err();
        assert!(matches!(&err, OptimizeError::InvalidVehicleType { key } if key == "hovercraft"));
    }

    #[test]
    fn far_coordinates_are_unreachable() {
        let svc = service();
        let err = svc.optimize(&request("diesel", A, GeoPoint::new(0.5, 0.5))).unwrap_err();
        match err {
            OptimizeError::UnreachableLocation { endpoint, distance_m, max_snap_m } => {
                assert_eq!(endpoint, "destination");
                assert!(distance_m > max_snap_m);
                assert_eq!(max_snap_m, 500.0);
            }
            other => panic!("expected UnreachableLocation, got {other}"),
        }
        // 0.003° ≈ 330 m: inside the snap radius.
        assert!(svc.optimize(&request("diesel", GeoPoint::new(0.003, 0.0), C)).is_ok());
    }

    #[test]
    fn invalid_coordinate_names_endpoint() {
        let svc = service();
        let err = svc.optimize(&request("diesel", GeoPoint::new(95.0, 0.0), C)).unwrap_err();
        assert_eq!(err.field(), Some("origin"));
    }

    #[test]
    fn zone_ban_yields_no_route_for_diesel_only() {
        let svc = service();
        svc.publish_constraints(vec![diesel_ban_everywhere()], vec![], NOON).unwrap();
        assert!(matches!(
            svc.optimize(&request("diesel", A, B)),
            Err(OptimizeError::NoRouteFound { .. })
        ));
        let ok = svc.optimize(&request("electric", A, B)).unwrap();
        assert_eq!(ok.route.snapshot_version, 1);
    }

    #[test]
    fn emission_ceiling_rejects_without_recording() {
        let svc = service();
        let capped = |limit: f64| RoutePreferences { max_emissions_g: Some(limit), ..Default::default() };

        // Diesel A→C emits 2 km × 0.171 g/m = 342 g.
        let err = svc.optimize(&request("diesel", A, C).with_preferences(capped(300.0))).unwrap_err();
        match err {
            OptimizeError::EmissionsLimitExceeded { emissions_g, max_emissions_g } => {
                assert!((emissions_g - 342.0).abs() < 1e-9);
                assert_eq!(max_emissions_g, 300.0);
            }
            other => panic!("expected EmissionsLimitExceeded, got {other}"),
        }
        assert_eq!(svc.impact().routes, 0);

        assert!(svc.optimize(&request("diesel", A, C).with_preferences(capped(400.0))).is_ok());
        assert!(svc.optimize(&request("electric", A, C).with_preferences(capped(300.0))).is_ok());
        assert_eq!(svc.impact().routes, 2);

        let err = svc.optimize(&request("electric", A, C).with_preferences(capped(-1.0))).unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidInput { field: "max_emissions", .. }));
    }

    #[test]
    fn preferences_are_optional_in_json() {
        let json = r#"{"origin":{"lat":0,"lon":0},"destination":{"lat":0.01,"lon":0.01},"vehicle_type":"diesel"}"#;
        let req: OptimizationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.preferences, RoutePreferences::default());

        let json = r#"{"origin":{"lat":0,"lon":0},"destination":{"lat":0.01,"lon":0.01},
                       "vehicle_type":"diesel","preferences":{"avoid_highways":true}}"#;
        let req: OptimizationRequest = serde_json::from_str(json).unwrap();
        assert!(req.preferences.avoid_highways);
        assert_eq!(req.preferences.max_emissions_g, None);
    }

    #[test]
    fn same_point_is_trivial_route() {
        let svc = service();
        let res = svc.optimize(&request("diesel", C, C)).unwrap();
        assert!(res.route.is_trivial());
        assert_eq!(res.route.emissions_g, 0.0);
    }

    #[test]
    fn objective_defaults_to_config() {
        let config = EngineConfig { objective: Objective::Fastest, ..Default::default() };
        let svc = OptimizationServiceBuilder::new(config).network(square()).build().unwrap();
        let res = svc.optimize(&request("diesel", A, C)).unwrap();
        assert_eq!(res.objective, Objective::Fastest);
        let res = svc.optimize(&request("diesel", A, C).with_objective(Objective::Shortest)).unwrap();
        assert_eq!(res.objective, Objective::Shortest);
        assert_eq!(res.route.score, 2_000.0);
    }

    #[test]
    fn cancelled_request() {
        let svc = service();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(matches!(
            svc.optimize_with_cancel(&request("diesel", A, C), &cancel),
            Err(OptimizeError::Cancelled)
        ));
    }

    #[test]
    fn batch_keeps_request_order() {
        let svc = service();
        let reqs: Vec<OptimizationRequest> = vec![
            request("diesel", A, C),
            request("hovercraft", A, C),
            request("electric", C, A),
        ];
        let out = svc.optimize_batch(&reqs);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].as_ref().unwrap().vehicle_type, "diesel");
        assert!(matches!(out[1], Err(OptimizeError::InvalidVehicleType { .. })));
        assert_eq!(out[2].as_ref().unwrap().route.origin, NodeId(2));
    }

    #[test]
    fn empty_graph_is_unavailable() {
        let res = OptimizationServiceBuilder::new(EngineConfig::default())
            .network(RoadNetwork::empty())
            .build();
        assert!(matches!(res, Err(OptimizeError::GraphUnavailable)));
        let res = OptimizationServiceBuilder::new(EngineConfig::default()).build();
        assert!(matches!(res, Err(OptimizeError::GraphUnavailable)));
    }

    #[test]
    fn replacing_the_graph_bumps_version() {
        let svc = service();
        assert_eq!(svc.graph().version, 1);
        assert_eq!(svc.replace_graph(square()).unwrap(), 2);
        assert_eq!(svc.optimize(&request("diesel", A, C)).unwrap().route.graph_version, 2);
        assert!(matches!(svc.replace_graph(RoadNetwork::empty()), Err(OptimizeError::GraphUnavailable)));
    }

    struct Down;

    impl ConstraintSource for Down {
        fn fetch(&self) -> ZoneResult<ConstraintBundle> {
            Err(ZoneError::Source("connection refused".into()))
        }
    }

    #[test]
    fn repeated_refresh_failures_flag_stale_but_keep_serving() {
        let svc = service();
        svc.publish_constraints(vec![], vec![], NOON).unwrap();

        assert!(matches!(svc.refresh_constraints(&Down), Err(OptimizeError::Constraints(_))));
        assert!(matches!(svc.refresh_constraints(&Down), Err(OptimizeError::Constraints(_))));
        assert!(matches!(svc.refresh_constraints(&Down), Err(OptimizeError::StaleSnapshot { failures: 3 })));

        let res = svc.optimize(&request("diesel", A, C)).unwrap();
        assert!(res.stale_constraints);
        assert_eq!(res.route.snapshot_version, 1);

        svc.publish_constraints(vec![], vec![], Timestamp(NOON.0 + 60)).unwrap();
        assert!(!svc.optimize(&request("diesel", A, C)).unwrap().stale_constraints);
    }
}

// ── Snapshot isolation ────────────────────────────────────────────────────────

#[cfg(test)]
mod isolation {
    use eco_core::NodeId;
    use eco_route::{CancelToken, SearchObserver};

    use super::helpers::{diesel_ban_everywhere, request, service, A, C, NOON};
    use crate::{OptimizationService, OptimizeError};

    /// Publishes a diesel ban the first time the search settles a node.
    struct PublishMidSearch<'a> {
        svc: &'a OptimizationService,
        published: Option<u64>,
    }

    impl SearchObserver for PublishMidSearch<'_> {
        fn on_settle(&mut self, _node: NodeId, _score: f64) {
            if self.published.is_none() {
                let v = self.svc.publish_constraints(vec![diesel_ban_everywhere()], vec![], NOON).unwrap();
                self.published = Some(v);
            }
        }
    }

    #[test]
    fn in_flight_search_keeps_its_snapshot() {
        let svc = service();
        let before = svc.optimize(&request("diesel", A, C)).unwrap();

        let mut obs = PublishMidSearch { svc: &svc, published: None };
        let during = svc.optimize_observed(&request("diesel", A, C), &CancelToken::new(), &mut obs).unwrap();
        assert_eq!(obs.published, Some(1));
        assert_eq!(during.route.snapshot_version, 0);
        assert_eq!(during.route.edges, before.route.edges);

        // Requests started after publication see the ban.
        assert!(matches!(
            svc.optimize(&request("diesel", A, C)),
            Err(OptimizeError::NoRouteFound { .. })
        ));
    }
}

// ── Read paths and sinks ──────────────────────────────────────────────────────

#[cfg(test)]
mod reads {
    use eco_core::{GeoPoint, Timestamp, TimeWindow};
    use eco_zones::{WeatherCondition, ZoneGeometry};

    use super::helpers::{diesel_ban_everywhere, service, NOON};

    #[test]
    fn green_zones_by_city() {
        let svc = service();
        svc.publish_constraints(vec![diesel_ban_everywhere()], vec![], NOON).unwrap();
        assert_eq!(svc.green_zones("testville").len(), 1);
        assert!(svc.green_zones("elsewhere").is_empty());
    }

    #[test]
    fn weather_lookup_respects_validity() {
        let svc = service();
        let mut rain = WeatherCondition::new("rain", ZoneGeometry::circle(GeoPoint::new(0.0, 0.0), 5_000.0), 1.1, 1.15);
        rain.valid = TimeWindow::between(Timestamp(0), Timestamp(3_600));
        svc.publish_constraints(vec![], vec![rain], NOON).unwrap();
        assert_eq!(svc.weather_at(GeoPoint::new(0.0, 0.0), Timestamp(60)).unwrap().region, "rain");
        assert!(svc.weather_at(GeoPoint::new(0.0, 0.0), NOON).is_none());
        assert!(svc.weather_at(GeoPoint::new(1.0, 1.0), Timestamp(60)).is_none());
    }
}

#[cfg(test)]
mod impact {
    use eco_core::VehicleRegistry;

    use super::helpers::{request, square, A, C};
    use crate::{CsvRouteLog, EngineConfig, ImpactLedger, OptimizationServiceBuilder, RouteSink};

    #[test]
    fn ledger_accumulates_against_diesel_baseline() {
        let svc = super::helpers::service();
        svc.optimize(&request("electric", A, C)).unwrap();
        svc.optimize(&request("electric", A, C)).unwrap();
        svc.optimize(&request("diesel", A, C)).unwrap();
        let _ = svc.optimize(&request("hovercraft", A, C));

        let t = svc.impact();
        assert_eq!(t.routes, 3);
        assert_eq!(t.distance_m, 6_000.0);
        assert!((t.baseline_emissions_g - 6_000.0 * 0.171).abs() < 1e-9);
        assert!((t.emissions_g - (4_000.0 * 0.053 + 2_000.0 * 0.171)).abs() < 1e-9);
        assert!((t.savings_g - 4_000.0 * (0.171 - 0.053)).abs() < 1e-9);
        assert_eq!(t.routes_by_vehicle["electric"], 2);
        assert_eq!(t.routes_by_vehicle["diesel"], 1);
    }

    #[test]
    fn ledger_is_shareable_across_threads() {
        let reg = VehicleRegistry::builtin();
        let ledger = ImpactLedger::new(reg.get_profile("diesel").unwrap());
        assert_eq!(ledger.baseline_vehicle(), "diesel");
        let svc = super::helpers::service();
        let route = svc.optimize(&request("electric", A, C)).unwrap().route;
        let electric = reg.get_profile("electric").unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..25 {
                        ledger.record(&route, electric).unwrap();
                    }
                });
            }
        });
        assert_eq!(ledger.totals().routes, 100);
    }

    #[test]
    fn csv_log_writes_one_row_per_route() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.csv");
        let svc = OptimizationServiceBuilder::new(EngineConfig::default())
            .network(square())
            .sink(Box::new(CsvRouteLog::create(&path).unwrap()))
            .build()
            .unwrap();
        svc.optimize(&request("diesel", A, C)).unwrap();
        svc.optimize(&request("cargo_bike", C, A)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("recorded_at,vehicle_type"));
        assert!(lines[2].contains(",cargo_bike,"));
    }
}

// ── Loading from configuration ────────────────────────────────────────────────

#[cfg(test)]
mod from_config {
    use eco_core::GeoPoint;

    use crate::{EngineConfig, OptimizationRequest, OptimizationService, OptimizeError};

    #[test]
    fn loads_network_constraints_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let p = |name: &str| dir.path().join(name);
        std::fs::write(p("nodes.csv"), "id,lat,lon\n1,0.0,0.0\n2,0.0,0.01\n3,0.01,0.01\n").unwrap();
        std::fs::write(
            p("edges.csv"),
            "from,to,length_m,duration_s,road_class,oneway\n1,2,1000,60,local,\n2,3,1000,60,local,\n",
        )
        .unwrap();
        std::fs::write(
            p("constraints.json"),
            r#"{ "zones": [ { "id": "z", "name": "Z", "city": "Here",
                 "geometry": { "type": "circle", "center": { "lat": 0.0, "lon": 0.005 }, "radius_m": 200 },
                 "restriction": { "rules": [ { "vehicle": "petrol", "access": "deny" } ] } } ] }"#,
        )
        .unwrap();

        let config = EngineConfig {
            nodes_csv: Some(p("nodes.csv")),
            edges_csv: Some(p("edges.csv")),
            constraints_json: Some(p("constraints.json")),
            route_log_csv: Some(p("routes.csv")),
            ..Default::default()
        };
        let svc = OptimizationService::from_config(config).unwrap();
        assert_eq!(svc.graph().node_count(), 3);
        assert_eq!(svc.snapshot().version, 1);
        assert_eq!(svc.green_zones("here").len(), 1);

        let req = OptimizationRequest::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.01, 0.01), "diesel");
        assert_eq!(svc.optimize(&req).unwrap().route.edges.len(), 2);
        let req = OptimizationRequest::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.01, 0.01), "petrol");
        assert!(matches!(svc.optimize(&req), Err(OptimizeError::NoRouteFound { .. })));
        assert!(p("routes.csv").exists());
    }

    #[test]
    fn missing_graph_paths() {
        assert!(matches!(
            OptimizationService::from_config(EngineConfig::default()),
            Err(OptimizeError::GraphUnavailable)
        ));
    }
}
