//! Tests that drive a vehicle around a closed track using the planner's output.

use frenet_planner::{
    cartesian_to_frenet,
    cgmath::prelude::*,
    math::Point2d,
    telemetry::{FusionRow, MPH_TO_MPS},
    CartesianPose, PathMessage, Planner, PlannerConfig, PlannerState, StepOutcome, TelemetryTick,
    WaypointMap,
};
use std::f64::consts::{FRAC_PI_2, PI};

const RADIUS: f64 = 200.0; // m
const WAYPOINTS: usize = 180;
const TICK: f64 = 0.02; // s

/// A circular track in map file format, driven anticlockwise with normals pointing outwards.
fn circle_track() -> WaypointMap {
    let step = 2.0 * PI / WAYPOINTS as f64;
    let chord = 2.0 * RADIUS * (0.5 * step).sin();
    let text = (0..WAYPOINTS)
        .map(|i| {
            let theta = i as f64 * step;
            format!(
                "{} {} {} {} {}",
                RADIUS * theta.cos(),
                RADIUS * theta.sin(),
                i as f64 * chord,
                theta.cos(),
                theta.sin()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    WaypointMap::parse(&text, WAYPOINTS as f64 * chord).unwrap()
}

/// Builds the telemetry the simulator would send for a vehicle at `pose`.
fn telemetry(
    map: &WaypointMap,
    pose: CartesianPose,
    speed: f64,
    remaining: &[Point2d],
) -> TelemetryTick {
    let frenet = cartesian_to_frenet(&pose, map);
    TelemetryTick {
        x: pose.x,
        y: pose.y,
        s: frenet.s,
        d: frenet.d,
        yaw: pose.heading.to_degrees(),
        speed: speed / MPH_TO_MPS,
        previous_path_x: remaining.iter().map(|p| p.x).collect(),
        previous_path_y: remaining.iter().map(|p| p.y).collect(),
        end_path_s: 0.0,
        end_path_d: 0.0,
        sensor_fusion: vec![FusionRow(3, 0.0, 210.0, -10.0, 0.0, 300.0, 10.0)],
    }
}

/// Test that a vehicle following the issued path drives smoothly round several laps.
#[test]
fn vehicle_completes_laps() {
    let map = circle_track();
    let mut planner = Planner::new(&map, PlannerConfig::default());

    let mut pose = CartesianPose::new(RADIUS + 6.0, 0.0, FRAC_PI_2);
    let mut speed = 0.0;
    let mut issued: Vec<Point2d> = Vec::new();
    let mut driven = vec![pose.position()];

    // The simulator advances three points between messages
    for _ in 0..3000 {
        let consumed = usize::min(3, issued.len());
        for point in &issued[..consumed] {
            let last = *driven.last().unwrap();
            let delta = *point - last;
            if delta.magnitude() > 1e-9 {
                pose = CartesianPose::new(point.x, point.y, delta.y.atan2(delta.x));
                speed = delta.magnitude() / TICK;
            }
            driven.push(*point);
        }

        let tick = telemetry(&map, pose, speed, &issued[consumed..]);
        let tick = TelemetryTick::from_json(&serde_json::to_string(&tick).unwrap()).unwrap();
        let outcome = planner.on_telemetry(&tick);
        assert_ne!(outcome, StepOutcome::Fallback);
        assert!(planner.buffer().len() >= 50);
        assert_eq!(planner.tracker().fused_vehicles().len(), 1);

        let msg = PathMessage::from(planner.buffer());
        issued = msg
            .next_x
            .iter()
            .zip(&msg.next_y)
            .map(|(x, y)| Point2d::new(*x, *y))
            .collect();
    }

    let steps = driven
        .windows(2)
        .map(|w| (w[1] - w[0]).magnitude())
        .collect::<Vec<_>>();
    // Never faster than the cruise speed on the outer lane
    assert!(steps.iter().all(|step| *step < 20.0 * TICK * 1.05));
    // Up to speed once the first segment is done
    assert!(steps[300..].iter().all(|step| *step > 20.0 * TICK * 0.95));

    let distance: f64 = steps.iter().sum();
    let lap = 2.0 * PI * (RADIUS + 6.0);
    assert!(distance > 2.0 * lap, "only drove {} m", distance);

    // Still in the target lane
    for point in &driven[300..] {
        let offset = point.to_vec().magnitude() - RADIUS;
        assert!((offset - 6.0).abs() < 0.1, "offset {}", offset);
    }
}

/// Test that a tick the planner cannot use leaves it ready to seed again.
#[test]
fn unusable_tick_falls_back() {
    let map = circle_track();
    let mut planner = Planner::new(&map, PlannerConfig::default());

    let mut tick = telemetry(&map, CartesianPose::new(RADIUS, 0.0, FRAC_PI_2), 0.0, &[]);
    tick.s = f64::NAN;
    assert_eq!(planner.on_telemetry(&tick), StepOutcome::Fallback);
    assert_eq!(planner.state(), &PlannerState::Uninitialized);
    assert!(planner.buffer().is_empty());

    let tick = telemetry(&map, CartesianPose::new(RADIUS, 0.0, FRAC_PI_2), 0.0, &[]);
    assert!(matches!(
        planner.on_telemetry(&tick),
        StepOutcome::Seeded { appended: 225, .. }
    ));
    assert_eq!(planner.buffer().len(), 225);
}
