//! Conversion between world space and road relative (Frenet) coordinates.

use crate::map::{Axis, WaypointMap};
use crate::math::{heading_of, normalize_angle, project_local, rot90, Point2d, Vector2d};
use cgmath::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// A road relative position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrenetCoordinate {
    /// The longitudinal position along the centre line in m, in `[0, max_s)`.
    pub s: f64,
    /// The signed lateral offset from the centre line in m.
    /// Positive offsets lie on the side the map normals point to.
    pub d: f64,
}

/// A world space pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartesianPose {
    pub x: f64,
    pub y: f64,
    /// The heading in radians, anticlockwise from the x-axis.
    pub heading: f64,
}

impl FrenetCoordinate {
    pub const fn new(s: f64, d: f64) -> Self {
        Self { s, d }
    }
}

impl CartesianPose {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// The world space position of the pose.
    pub fn position(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }
}

/// The index of the first waypoint ahead of the pose.
///
/// This is the closest waypoint, unless it lies more than 90 degrees away from
/// the pose's heading, in which case it is the one after.
pub fn next_waypoint(pose: &CartesianPose, map: &WaypointMap) -> usize {
    let pos = pose.position();
    let closest = map.closest_waypoint(pos);
    let bearing = heading_of(map.waypoints()[closest].position() - pos);
    let angle = normalize_angle(pose.heading - bearing).abs();
    if angle > FRAC_PI_2 {
        (closest + 1) % map.len()
    } else {
        closest
    }
}

/// Converts a world space pose into road relative coordinates.
///
/// The pose is projected onto the chord between the waypoints either side of it.
/// Accuracy degrades with distance from the centre line and with curvature.
pub fn cartesian_to_frenet(pose: &CartesianPose, map: &WaypointMap) -> FrenetCoordinate {
    let n = map.len();
    let next = next_waypoint(pose, map);
    let prev = (next + n - 1) % n;
    let prev_wp = &map.waypoints()[prev];
    let next_wp = &map.waypoints()[next];

    let chord = next_wp.position() - prev_wp.position();
    let chord_len = chord.magnitude();
    let (along, lateral) = if chord_len > 0.0 {
        let dir = chord / chord_len;
        let local = project_local(pose.position(), prev_wp.position(), dir, rot90(dir));
        // Orient the lateral axis so positive `d` lies on the normal's side
        let side = if prev_wp.normal().dot(rot90(dir)) < 0.0 { -1.0 } else { 1.0 };
        (local.x, side * local.y)
    } else {
        let offset = pose.position() - prev_wp.position();
        (0.0, offset.dot(prev_wp.normal().normalize()))
    };

    FrenetCoordinate {
        s: map.wrap_s(map.segment_start(prev) + along),
        d: lateral,
    }
}

/// Converts road relative coordinates into a world space pose.
///
/// The pose is offset from the interpolated centre line along the interpolated
/// normal. The heading is that of the centre line at `s`.
pub fn frenet_to_cartesian(coord: &FrenetCoordinate, map: &WaypointMap) -> CartesianPose {
    let s = map.wrap_s(coord.s);
    let centre = Point2d::new(map.interpolate(Axis::X, s), map.interpolate(Axis::Y, s));
    let normal = Vector2d::new(
        map.interpolate(Axis::NormalX, s),
        map.interpolate(Axis::NormalY, s),
    );
    let pos = centre + normal * coord.d;
    CartesianPose {
        x: pos.x,
        y: pos.y,
        heading: heading_of(map.tangent(s)),
    }
}
