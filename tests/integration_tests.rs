use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trajectory_segments::{
    constant_rocd, constant_speed_level, fly_segment, AccelerationExtent, AccelerationTarget,
    AircraftState, ConventionalAirplane, ConventionalRotorcraft, DiagnosticKind,
    ElectricRotorcraft, EngineRating, FlightPhase, HighFidelityAirplane, LevelExtent,
    NavigationSetup, Position, SegmentConfig, SegmentContext, SegmentTarget, Speed, StepClimbSettings,
    Termination, Trajectory, TrajectoryError, VerticalExtent,
};

// Standard medium jet used by most scenarios
fn create_test_jet() -> ConventionalAirplane {
    ConventionalAirplane::medium_twin_jet()
}

#[test]
fn test_short_level_segment() {
    let aircraft = create_test_jet();
    let config = SegmentConfig {
        distance_step: Some(100.0),
        ..SegmentConfig::default()
    };
    let ctx = SegmentContext::new(&aircraft).with_config(config);

    let result = constant_speed_level(
        &ctx,
        AircraftState::new(10_000.0, 60_000.0),
        Speed::Mach(0.78),
        LevelExtent::Distance(200.0),
    )
    .unwrap();

    assert_eq!(result.trajectory.len(), 3);
    let last = result.trajectory.last().unwrap();
    assert_eq!(last.distance, 200.0);
    assert!(last.mass < 60_000.0);
    assert!(last.fuel_consumed > 0.0);
}

#[test]
fn test_rocd_climb_time_is_height_over_rate() {
    let aircraft = create_test_jet();
    let config = SegmentConfig {
        altitude_step: Some(1_000.0),
        ..SegmentConfig::default()
    };
    let ctx = SegmentContext::new(&aircraft).with_config(config);

    let result = constant_rocd(
        &ctx,
        AircraftState::new(1_000.0, 60_000.0),
        Speed::Cas(140.0),
        5.0,
        VerticalExtent::Altitude(3_000.0),
    )
    .unwrap();

    let points = result.trajectory.points();
    assert_eq!(points.len(), 3);
    assert_eq!(points[2].altitude, 3_000.0);
    for pair in points.windows(2) {
        let dt = pair[1].time - pair[0].time;
        assert_relative_eq!(dt, 1_000.0 / 5.0, epsilon = 1e-6);
    }
}

#[test]
fn test_heavy_climb_stops_below_target() {
    let aircraft = create_test_jet();
    let config = SegmentConfig {
        min_rocd: Some(4.0),
        ..SegmentConfig::default()
    };
    let ctx = SegmentContext::new(&aircraft).with_config(config);

    let result = constant_rocd(
        &ctx,
        AircraftState::new(10_000.0, 75_000.0),
        Speed::Mach(0.78),
        10.0,
        VerticalExtent::Altitude(13_000.0),
    )
    .unwrap();

    assert_eq!(result.termination, Termination::Ceiling);
    assert!(result.diagnostics.has(DiagnosticKind::CeilingReached));
    // a clamped climb is not a level-flight envelope problem
    assert!(!result.diagnostics.has(DiagnosticKind::EnvelopeExceeded));
    let last = result.trajectory.last().unwrap();
    assert!(last.altitude < 13_000.0);
    assert!(last.rocd >= 4.0);
}

#[test]
fn test_acceleration_with_explicit_rate() {
    let aircraft = ConventionalAirplane::medium_twin_jet();
    let ctx = SegmentContext::new(&aircraft);

    let target = SegmentTarget::Acceleration {
        initial_speed: Speed::Cas(130.0),
        final_speed: Speed::Cas(150.0),
        target: AccelerationTarget {
            acceleration: Some(0.4),
            rocd: Some(0.0),
            ..AccelerationTarget::default()
        },
        phase: FlightPhase::Cruise,
        extent: AccelerationExtent::Speed,
    };
    let result = fly_segment(&ctx, AircraftState::new(2_000.0, 60_000.0), &target).unwrap();

    assert_eq!(result.termination, Termination::TargetReached);
    for point in result.trajectory.iter() {
        assert!(point.esf.is_finite());
        assert!(point.acceleration > 0.0);
        assert_eq!(point.altitude, 2_000.0);
    }
    assert_relative_eq!(result.trajectory.last().unwrap().cas, 150.0, epsilon = 1e-6);
}

#[test]
fn test_step_climb_keeps_segment_totals() {
    let aircraft = create_test_jet();
    let config = SegmentConfig {
        distance_step: Some(25_000.0),
        step_climb: Some(StepClimbSettings {
            increment: 600.0,
            max_altitude: Some(10_500.0),
        }),
        ..SegmentConfig::default()
    };
    let ctx = SegmentContext::new(&aircraft).with_config(config);

    let result = constant_speed_level(
        &ctx,
        AircraftState::new(8_000.0, 62_000.0),
        Speed::Mach(0.78),
        LevelExtent::Distance(600_000.0),
    )
    .unwrap();

    assert!(!result.step_climbs.is_empty());
    let points = result.trajectory.points();
    assert_abs_diff_eq!(points.last().unwrap().distance, 600_000.0, epsilon = 1e-6);
    assert!(points.windows(2).all(|w| w[1].time >= w[0].time));
    assert!(points.windows(2).all(|w| w[1].distance >= w[0].distance));
    assert!(points
        .windows(2)
        .all(|w| w[1].fuel_consumed >= w[0].fuel_consumed));

    let last = points.last().unwrap();
    assert_relative_eq!(62_000.0 - last.mass, last.fuel_consumed, epsilon = 1e-6);
    for record in &result.step_climbs {
        assert!(record.to_altitude > record.from_altitude);
        assert!(record.to_altitude <= 10_500.0);

        let before = &points[record.start_index - 1];
        let top = &points[record.end_index];
        assert_relative_eq!(top.distance, before.distance + record.distance, epsilon = 1e-6);
        assert_relative_eq!(top.time, before.time + record.time, epsilon = 1e-6);
        assert_relative_eq!(top.altitude, record.to_altitude, epsilon = 1e-9);

        // cruise resumes from the totals at the top of the climb
        let resumed = &points[record.end_index + 1];
        assert_relative_eq!(resumed.distance, top.distance, epsilon = 1e-6);
        assert_relative_eq!(resumed.time, top.time, epsilon = 1e-6);
    }
}

#[test]
fn test_idle_descent_is_monotonic() {
    let aircraft = HighFidelityAirplane::medium_twin_jet();
    let ctx = SegmentContext::new(&aircraft);

    let target = SegmentTarget::Rating {
        speed: Speed::Cas(135.0),
        rating: EngineRating::Idle,
        extent: VerticalExtent::Altitude(2_000.0),
    };
    let result = fly_segment(&ctx, AircraftState::new(8_000.0, 58_000.0), &target).unwrap();

    assert_eq!(result.termination, Termination::TargetReached);
    let points = result.trajectory.points();
    assert!(points.windows(2).all(|w| w[1].altitude < w[0].altitude));
    assert!(points.iter().all(|p| p.engine_setting == "LIDL"));
    assert_eq!(points.last().unwrap().altitude, 2_000.0);
}

#[test]
fn test_electric_cruise_drains_battery() {
    let aircraft = ElectricRotorcraft::light_electric();
    let ctx = SegmentContext::new(&aircraft);

    let result = constant_speed_level(
        &ctx,
        AircraftState::new(300.0, 600.0).with_soc(80.0),
        Speed::Tas(30.0),
        LevelExtent::Distance(10_000.0),
    )
    .unwrap();

    let socs: Vec<f64> = result.trajectory.iter().filter_map(|p| p.soc).collect();
    assert_eq!(socs.len(), result.trajectory.len());
    assert!(socs.windows(2).all(|w| w[1] < w[0]));
    assert!(result.trajectory.iter().all(|p| p.fuel_flow == 0.0));
    assert!(result.trajectory.iter().all(|p| p.mass == 600.0));
}

#[test]
fn test_electric_aircraft_needs_state_of_charge() {
    let aircraft = ElectricRotorcraft::light_electric();
    let ctx = SegmentContext::new(&aircraft);

    let result = constant_speed_level(
        &ctx,
        AircraftState::new(300.0, 600.0),
        Speed::Tas(30.0),
        LevelExtent::Distance(1_000.0),
    );
    assert!(matches!(result, Err(TrajectoryError::InvalidInput(_))));
}

#[test]
fn test_unknown_configuration_label_is_reported() {
    let aircraft = create_test_jet();
    let config = SegmentConfig {
        config: Some(String::from("FLAPS99")),
        ..SegmentConfig::default()
    };
    let ctx = SegmentContext::new(&aircraft).with_config(config);

    let result = constant_speed_level(
        &ctx,
        AircraftState::new(5_000.0, 60_000.0),
        Speed::Cas(140.0),
        LevelExtent::Time(120.0),
    )
    .unwrap();

    assert_eq!(result.diagnostics.count(DiagnosticKind::UnknownConfiguration), 1);
    assert_eq!(result.trajectory.len(), 3);
}

#[test]
fn test_navigation_without_heading_skips_position() {
    let aircraft = create_test_jet();
    let config = SegmentConfig {
        navigation: Some(NavigationSetup {
            latitude: 48.0,
            longitude: 11.0,
            true_heading: None,
            magnetic_heading: None,
            reference: Default::default(),
            path: Default::default(),
        }),
        ..SegmentConfig::default()
    };
    let ctx = SegmentContext::new(&aircraft).with_config(config);

    let result = constant_speed_level(
        &ctx,
        AircraftState::new(10_000.0, 60_000.0),
        Speed::Mach(0.78),
        LevelExtent::Distance(50_000.0),
    )
    .unwrap();

    assert_eq!(result.termination, Termination::TargetReached);
    assert!(result.trajectory.len() > 1);
    for point in result.trajectory.iter() {
        assert!(point.latitude.is_none());
        assert!(point.longitude.is_none());
        assert!(point.true_heading.is_none());
    }
}

#[test]
fn test_navigation_tracks_position() {
    let aircraft = create_test_jet();
    let config = SegmentConfig {
        navigation: Some(NavigationSetup {
            latitude: 0.0,
            longitude: 0.0,
            true_heading: Some(90.0),
            magnetic_heading: None,
            reference: Default::default(),
            path: Default::default(),
        }),
        ..SegmentConfig::default()
    };
    let ctx = SegmentContext::new(&aircraft).with_config(config);

    let result = constant_speed_level(
        &ctx,
        AircraftState::new(10_000.0, 60_000.0),
        Speed::Mach(0.78),
        LevelExtent::Distance(111_195.0),
    )
    .unwrap();

    let last = result.trajectory.last().unwrap();
    assert_abs_diff_eq!(last.latitude.unwrap(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(last.longitude.unwrap(), 1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(last.true_heading.unwrap(), 90.0, epsilon = 1e-6);
}

#[test]
fn test_navigation_continues_from_state_position() {
    let aircraft = create_test_jet();
    let config = SegmentConfig {
        navigation: Some(NavigationSetup {
            latitude: 0.0,
            longitude: 0.0,
            true_heading: Some(90.0),
            magnetic_heading: None,
            reference: Default::default(),
            path: Default::default(),
        }),
        ..SegmentConfig::default()
    };
    let ctx = SegmentContext::new(&aircraft).with_config(config);
    let state = AircraftState::new(10_000.0, 60_000.0).with_position(Position {
        latitude: 0.0,
        longitude: 1.0,
        true_heading: 90.0,
        magnetic_heading: 90.0,
    });

    let result = constant_speed_level(
        &ctx,
        state,
        Speed::Mach(0.78),
        LevelExtent::Distance(111_195.0),
    )
    .unwrap();

    let first = result.trajectory.first().unwrap();
    assert_abs_diff_eq!(first.longitude.unwrap(), 1.0, epsilon = 1e-12);
    let last = result.trajectory.last().unwrap();
    assert_abs_diff_eq!(last.latitude.unwrap(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(last.longitude.unwrap(), 2.0, epsilon = 1e-3);
}

#[test]
fn test_empty_battery_interrupts_segment() {
    let aircraft = ElectricRotorcraft::light_electric();
    let ctx = SegmentContext::new(&aircraft);

    let result = constant_speed_level(
        &ctx,
        AircraftState::new(300.0, 600.0).with_soc(1.0),
        Speed::Tas(30.0),
        LevelExtent::Time(3_600.0),
    )
    .unwrap();

    assert_eq!(result.termination, Termination::Interrupted);
    assert!(result.diagnostics.has(DiagnosticKind::SegmentInterrupted));
    assert!(!result.diagnostics.has(DiagnosticKind::CeilingReached));
    let last = result.trajectory.last().unwrap();
    assert!(last.time < 3_600.0);
    assert!(last.soc.unwrap() >= 0.0);
}

#[test]
fn test_tailwind_shortens_cruise() {
    let aircraft = ConventionalAirplane::medium_twin_jet();
    let still = SegmentContext::new(&aircraft);
    let windy = SegmentContext::new(&aircraft).with_config(SegmentConfig {
        wind: 30.0,
        ..SegmentConfig::default()
    });
    let state = AircraftState::new(10_000.0, 60_000.0);
    let extent = LevelExtent::Distance(200_000.0);

    let calm = constant_speed_level(&still, state, Speed::Mach(0.78), extent).unwrap();
    let tail = constant_speed_level(&windy, state, Speed::Mach(0.78), extent).unwrap();

    let calm_last = calm.trajectory.last().unwrap();
    let tail_last = tail.trajectory.last().unwrap();
    assert!(tail_last.time < calm_last.time);
    assert!(tail_last.fuel_consumed < calm_last.fuel_consumed);
    assert_relative_eq!(tail_last.ground_speed, tail_last.tas + 30.0, epsilon = 1e-9);
}

#[test]
fn test_segments_chain_into_one_trajectory() {
    let aircraft = ConventionalRotorcraft::light_twin();
    let ctx = SegmentContext::new(&aircraft);

    let profile = [
        SegmentTarget::Rocd {
            speed: Speed::Tas(35.0),
            rocd: 3.0,
            extent: VerticalExtent::Altitude(450.0),
        },
        SegmentTarget::Level {
            speed: Speed::Tas(60.0),
            extent: LevelExtent::Distance(8_000.0),
        },
        SegmentTarget::Slope {
            speed: Speed::Tas(35.0),
            slope: -4.0,
            extent: VerticalExtent::Altitude(150.0),
        },
    ];

    let mut trajectory = Trajectory::new();
    let mut state = AircraftState::new(150.0, 3_000.0);
    for target in &profile {
        let result = fly_segment(&ctx, state, target).unwrap();
        assert_eq!(result.termination, Termination::TargetReached);
        state = result.last_state().unwrap();
        trajectory.append(result.trajectory);
    }

    let points = trajectory.points();
    assert!(points.windows(2).all(|w| w[1].time > w[0].time));
    assert_eq!(points.last().unwrap().altitude, 150.0);
    let summary = trajectory.summary().unwrap();
    assert_relative_eq!(summary.max_altitude, 450.0);
    assert!(summary.fuel_consumed > 0.0);
}

#[test]
fn test_segment_target_from_json() {
    let json = r#"{"Level": {"speed": {"Mach": 0.78}, "extent": {"Time": 300.0}}}"#;
    let target: SegmentTarget = serde_json::from_str(json).unwrap();

    let aircraft = ConventionalAirplane::medium_twin_jet();
    let ctx = SegmentContext::new(&aircraft);
    let result = fly_segment(&ctx, AircraftState::new(10_000.0, 60_000.0), &target).unwrap();

    assert_relative_eq!(result.trajectory.last().unwrap().time, 300.0);
}

#[test]
fn test_segment_target_json_round_trip() {
    let targets = [
        SegmentTarget::Rocd {
            speed: Speed::Cas(140.0),
            rocd: -7.5,
            extent: VerticalExtent::Time(90.0),
        },
        SegmentTarget::Acceleration {
            initial_speed: Speed::Mach(0.70),
            final_speed: Speed::Mach(0.78),
            target: AccelerationTarget {
                esf: Some(0.3),
                rating: Some(EngineRating::MaxClimb),
                ..AccelerationTarget::default()
            },
            phase: FlightPhase::Climb,
            extent: AccelerationExtent::Speed,
        },
    ];

    for target in &targets {
        let json = serde_json::to_string(target).unwrap();
        let back: SegmentTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, target);
    }
}

#[test]
fn test_random_level_segments_hold_invariants() {
    let mut rng = StdRng::seed_from_u64(7);
    let aircraft = ConventionalAirplane::medium_twin_jet();
    let ctx = SegmentContext::new(&aircraft);

    for _ in 0..20 {
        let altitude = rng.gen_range(6_000.0..11_000.0);
        let mass = rng.gen_range(50_000.0..70_000.0);
        let mach = rng.gen_range(0.70..0.80);
        let length = rng.gen_range(10_000.0..120_000.0);

        let result = constant_speed_level(
            &ctx,
            AircraftState::new(altitude, mass),
            Speed::Mach(mach),
            LevelExtent::Distance(length),
        )
        .unwrap();

        let points = result.trajectory.points();
        assert_abs_diff_eq!(points.last().unwrap().distance, length, epsilon = 1e-6);
        for pair in points.windows(2) {
            assert!(pair[1].time > pair[0].time);
            assert!(pair[1].mass < pair[0].mass);
            assert!(pair[1].fuel_consumed > pair[0].fuel_consumed);
        }
        for point in points {
            assert_eq!(point.altitude, altitude);
            assert_relative_eq!(point.mach, mach, epsilon = 1e-9);
            assert_relative_eq!(point.ground_speed, point.tas, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_random_rocd_segments_reach_target() {
    let mut rng = StdRng::seed_from_u64(11);
    let aircraft = ConventionalRotorcraft::light_twin();
    let ctx = SegmentContext::new(&aircraft);

    for _ in 0..10 {
        let start = rng.gen_range(100.0..600.0);
        let end = rng.gen_range(100.0..600.0);
        let rocd = rng.gen_range(1.0..4.0);

        let result = constant_rocd(
            &ctx,
            AircraftState::new(start, 2_800.0),
            Speed::Tas(40.0),
            rocd,
            VerticalExtent::Altitude(end),
        )
        .unwrap();

        assert_eq!(result.termination, Termination::TargetReached);
        assert_abs_diff_eq!(result.trajectory.last().unwrap().altitude, end, epsilon = 1e-9);
        let duration = result.trajectory.last().unwrap().time;
        assert_relative_eq!(duration, (end - start).abs() / rocd, epsilon = 1e-6);
    }
}
