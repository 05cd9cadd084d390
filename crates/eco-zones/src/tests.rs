//! Unit tests for eco-zones.

#[cfg(test)]
pub(crate) mod helpers {
    use eco_core::GeoPoint;
    use crate::{GreenZone, RestrictionRule, ZoneGeometry};

    pub const CENTER: GeoPoint = GeoPoint::new(28.6139, 77.2090);

    /// 1 km circle around `CENTER` banning diesel vehicles.
    pub fn diesel_ban() -> GreenZone {
        GreenZone::new("central-park", "Central Park", ZoneGeometry::circle(CENTER, 1_000.0))
            .in_city("Delhi")
            .with_rule(RestrictionRule::deny("diesel"))
    }

    /// Unit square in lat/lon around (0.5, 0.5).
    pub fn square() -> ZoneGeometry {
        ZoneGeometry::polygon(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ])
    }
}

#[cfg(test)]
mod geometry {
    use eco_core::GeoPoint;
    use crate::ZoneGeometry;
    use super::helpers::{square, CENTER};

    #[test]
    fn circle_uses_haversine_radius() {
        let g = ZoneGeometry::circle(CENTER, 1_000.0);
        // 0.008° of latitude ≈ 890 m; 0.01° ≈ 1112 m.
        assert!(g.contains(GeoPoint::new(CENTER.lat + 0.008, CENTER.lon)));
        assert!(!g.contains(GeoPoint::new(CENTER.lat + 0.010, CENTER.lon)));
    }

    #[test]
    fn polygon_contains_interior_and_boundary() {
        let g = square();
        assert!(g.contains(GeoPoint::new(0.5, 0.5)));
        assert!(g.contains(GeoPoint::new(0.0, 0.5)));
        assert!(!g.contains(GeoPoint::new(1.5, 0.5)));
    }

    #[test]
    fn bounding_boxes() {
        assert_eq!(square().bounding_boxes(), vec![([0.0, 0.0], [1.0, 1.0])]);
        let boxes = ZoneGeometry::circle(CENTER, 1_000.0).bounding_boxes();
        assert_eq!(boxes.len(), 1);
        let (lo, hi) = boxes[0];
        assert!(lo[0] < CENTER.lat && hi[0] > CENTER.lat);
        assert!(lo[1] < CENTER.lon && hi[1] > CENTER.lon);
    }

    #[test]
    fn serde_tagged() {
        let json = r#"{"type":"circle","center":{"lat":1.0,"lon":2.0},"radius_m":50.0}"#;
        let g: ZoneGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(g, ZoneGeometry::circle(GeoPoint::new(1.0, 2.0), 50.0));
    }
}

#[cfg(test)]
mod restriction {
    use eco_core::{TimeWindow, Timestamp, VehicleRegistry};
    use crate::{Access, RestrictionRule};
    use super::helpers::diesel_ban;

    #[test]
    fn deny_by_powertrain() {
        let reg = VehicleRegistry::builtin();
        let zone = diesel_ban();
        let t = Timestamp(0);
        assert!(zone.denies(reg.get_profile("diesel").unwrap(), t));
        // box_truck is a diesel powertrain too.
        assert!(zone.denies(reg.get_profile("box_truck").unwrap(), t));
        assert!(!zone.denies(reg.get_profile("electric").unwrap(), t));
    }

    #[test]
    fn exemption_overrides_deny() {
        let reg = VehicleRegistry::builtin();
        let truck = reg.get_profile("diesel").unwrap().clone().with_exemption("central-park");
        assert!(!diesel_ban().denies(&truck, Timestamp(0)));
    }

    #[test]
    fn first_matching_rule_wins() {
        let reg = VehicleRegistry::builtin();
        let mut zone = diesel_ban();
        zone.restriction.rules.insert(0, RestrictionRule::allow("sprinter_van"));
        assert!(!zone.denies(reg.get_profile("sprinter_van").unwrap(), Timestamp(0)));
        assert!(zone.denies(reg.get_profile("box_truck").unwrap(), Timestamp(0)));
    }

    #[test]
    fn daily_window_limits_rule() {
        let reg = VehicleRegistry::builtin();
        let mut zone = diesel_ban();
        zone.restriction.rules = vec![RestrictionRule::deny("*").during("07:00-19:00".parse().unwrap())];
        let bike = reg.get_profile("cargo_bike").unwrap();
        assert!(zone.denies(bike, Timestamp(8 * 3600)));
        assert!(!zone.denies(bike, Timestamp(20 * 3600)));
    }

    #[test]
    fn inactive_zone_never_denies() {
        let reg = VehicleRegistry::builtin();
        let zone = diesel_ban().active_during(TimeWindow::between(Timestamp(100), Timestamp(200)));
        let diesel = reg.get_profile("diesel").unwrap();
        assert!(!zone.denies(diesel, Timestamp(50)));
        assert!(zone.denies(diesel, Timestamp(150)));
    }

    #[test]
    fn default_access_applies_without_rules() {
        let reg = VehicleRegistry::builtin();
        let mut zone = diesel_ban();
        zone.restriction.rules.clear();
        zone.restriction.default_access = Access::Deny;
        assert!(zone.denies(reg.get_profile("electric").unwrap(), Timestamp(0)));
    }
}

#[cfg(test)]
mod weather {
    use eco_core::TimeWindow;
    use crate::WeatherCondition;
    use super::helpers::square;

    #[test]
    fn observation_multipliers_compound() {
        let w = WeatherCondition::from_observation("r", square(), TimeWindow::ALWAYS, -5.0, 2.0, 0.0);
        assert!((w.emission_multiplier - 1.2 * 1.15).abs() < 1e-12);
        assert!((w.duration_multiplier - 1.1).abs() < 1e-12);
        assert_eq!(w.summary, "cold, rain");
    }

    #[test]
    fn clear_is_neutral() {
        let w = WeatherCondition::from_observation("r", square(), TimeWindow::ALWAYS, 20.0, 0.0, 0.0);
        assert_eq!(w.emission_multiplier, 1.0);
        assert_eq!(w.duration_multiplier, 1.0);
        assert_eq!(w.summary, "clear");
    }

    #[test]
    fn multipliers_default_to_one_in_json() {
        let json = r#"{"region":"north","area":{"type":"circle","center":{"lat":0,"lon":0},"radius_m":10}}"#;
        let w: WeatherCondition = serde_json::from_str(json).unwrap();
        assert_eq!(w.duration_multiplier, 1.0);
        assert_eq!(w.emission_multiplier, 1.0);
    }
}

#[cfg(test)]
mod snapshot {
    use eco_core::{GeoPoint, TimeWindow, Timestamp, VehicleRegistry};
    use crate::{ConstraintSnapshot, GreenZone, WeatherCondition, ZoneError, ZoneGeometry};
    use super::helpers::{diesel_ban, square, CENTER};

    #[test]
    fn zones_covering_sorted_by_id() {
        let b = GreenZone::new("b", "B", ZoneGeometry::circle(CENTER, 500.0));
        let a = GreenZone::new("a", "A", ZoneGeometry::circle(CENTER, 800.0));
        let far = GreenZone::new("c", "C", ZoneGeometry::circle(GeoPoint::new(0.0, 0.0), 500.0));
        let snap = ConstraintSnapshot::build(vec![b, far, a], vec![], Timestamp(0)).unwrap();
        let ids: Vec<_> = snap.zones_covering(CENTER).iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn blocking_zone_respects_vehicle() {
        let reg = VehicleRegistry::builtin();
        let snap = ConstraintSnapshot::build(vec![diesel_ban()], vec![], Timestamp(0)).unwrap();
        let t = Timestamp(0);
        assert!(snap.blocking_zone(CENTER, reg.get_profile("diesel").unwrap(), t).is_some());
        assert!(snap.blocking_zone(CENTER, reg.get_profile("hybrid").unwrap(), t).is_none());
    }

    #[test]
    fn weather_lowest_region_wins_and_validity() {
        let later = WeatherCondition::new("b-region", square(), 1.5, 1.5);
        let mut early = WeatherCondition::new("a-region", square(), 1.2, 1.1);
        early.valid = TimeWindow::between(Timestamp(0), Timestamp(100));
        let snap = ConstraintSnapshot::build(vec![], vec![later, early], Timestamp(0)).unwrap();

        let p = GeoPoint::new(0.5, 0.5);
        assert_eq!(snap.weather_at(p, Timestamp(50)).unwrap().region, "a-region");
        assert_eq!(snap.weather_at(p, Timestamp(150)).unwrap().region, "b-region");
        assert!(snap.weather_at(GeoPoint::new(5.0, 5.0), Timestamp(50)).is_none());
    }

    #[test]
    fn circle_across_antimeridian_covers_both_sides() {
        let reg = VehicleRegistry::builtin();
        let zone = GreenZone::new("dateline", "Dateline", ZoneGeometry::circle(GeoPoint::new(0.0, 179.9999), 200.0))
            .with_rule(crate::RestrictionRule::deny("diesel"));
        let snap = ConstraintSnapshot::build(vec![zone], vec![], Timestamp(0)).unwrap();
        // ~67 m east of the centre, on the far side of ±180°.
        let across = GeoPoint::new(0.0, -179.9995);
        let ids: Vec<_> = snap.zones_covering(across).iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["dateline"]);
        assert!(snap.blocking_zone(across, reg.get_profile("diesel").unwrap(), Timestamp(0)).is_some());
        assert_eq!(snap.zones_covering(GeoPoint::new(0.0, 179.99995)).len(), 1);
        assert!(snap.zones_covering(GeoPoint::new(0.0, -179.99)).is_empty());
    }

    #[test]
    fn duplicate_zone_rejected() {
        let result = ConstraintSnapshot::build(vec![diesel_ban(), diesel_ban()], vec![], Timestamp(0));
        assert!(matches!(result, Err(ZoneError::DuplicateZone(id)) if id == "central-park"));
    }

    #[test]
    fn bad_geometry_rejected() {
        let z = GreenZone::new("z", "Z", ZoneGeometry::circle(CENTER, -1.0));
        let result = ConstraintSnapshot::build(vec![z], vec![], Timestamp(0));
        assert!(matches!(result, Err(ZoneError::InvalidGeometry { .. })));
    }

    #[test]
    fn zones_in_city_case_insensitive() {
        let snap = ConstraintSnapshot::build(vec![diesel_ban()], vec![], Timestamp(0)).unwrap();
        assert_eq!(snap.zones_in_city("delhi").len(), 1);
        assert!(snap.zones_in_city("Mumbai").is_empty());
    }
}

#[cfg(test)]
mod store {
    use std::sync::atomic::{AtomicBool, Ordering};

    use eco_core::Timestamp;
    use crate::{ConstraintBundle, ConstraintSource, ConstraintStore, JsonConstraintSource, ZoneError, ZoneResult};
    use super::helpers::diesel_ban;

    struct Flaky {
        fail: AtomicBool,
    }

    impl ConstraintSource for Flaky {
        fn fetch(&self) -> ZoneResult<ConstraintBundle> {
            if self.fail.load(Ordering::SeqCst) {
                Err(ZoneError::Source("upstream timeout".into()))
            } else {
                Ok(ConstraintBundle { zones: vec![diesel_ban()], weather: vec![] })
            }
        }
    }

    #[test]
    fn publish_increments_version_and_isolates_readers() {
        let store = ConstraintStore::new(3);
        assert_eq!(store.current_snapshot().version, 0);

        let held = store.current_snapshot();
        let v1 = store.publish(vec![diesel_ban()], vec![], Timestamp(10)).unwrap();
        assert_eq!(v1.version, 1);
        assert_eq!(held.version, 0);
        assert!(held.zones().is_empty());
        assert_eq!(store.current_snapshot().zones().len(), 1);
    }

    #[test]
    fn rejected_bundle_keeps_current() {
        let store = ConstraintStore::new(3);
        store.publish(vec![diesel_ban()], vec![], Timestamp(0)).unwrap();
        assert!(store.publish(vec![diesel_ban(), diesel_ban()], vec![], Timestamp(1)).is_err());
        assert_eq!(store.current_snapshot().version, 1);
    }

    #[test]
    fn repeated_failures_turn_stale_then_recover() {
        let store = ConstraintStore::new(2);
        let source = Flaky { fail: AtomicBool::new(false) };
        store.refresh_from(&source, Timestamp(0)).unwrap();

        source.fail.store(true, Ordering::SeqCst);
        assert!(matches!(store.refresh_from(&source, Timestamp(1)), Err(ZoneError::Source(_))));
        assert!(!store.is_stale());
        assert!(matches!(store.refresh_from(&source, Timestamp(2)), Err(ZoneError::Stale { failures: 2, .. })));
        assert!(store.is_stale());
        // Last good snapshot is still served.
        assert_eq!(store.current_snapshot().version, 1);

        source.fail.store(false, Ordering::SeqCst);
        store.refresh_from(&source, Timestamp(3)).unwrap();
        assert!(!store.is_stale());
        assert_eq!(store.consecutive_failures(), 0);
    }

    #[test]
    fn json_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constraints.json");
        let json = r#"{
            "zones": [{
                "id": "z1", "name": "Old Town", "city": "Delhi",
                "geometry": {"type": "circle", "center": {"lat": 28.61, "lon": 77.2}, "radius_m": 800},
                "restriction": {"rules": [{"vehicle": "diesel", "access": "deny", "window": "07:00-19:00"}]}
            }],
            "weather": []
        }"#;
        std::fs::write(&path, json).unwrap();

        let store = ConstraintStore::new(3);
        let snap = store.refresh_from(&JsonConstraintSource::new(&path), Timestamp(0)).unwrap();
        assert_eq!(snap.zones()[0].id, "z1");
        assert!(snap.zones()[0].restriction.rules[0].window.is_some());
    }
}
