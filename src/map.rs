//! The waypoint map describing the road centre line of a closed track.

use crate::math::{CubicSpline, Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;
use itertools::Itertools;
use log::info;
use std::path::Path;
use thiserror::Error;

/// An error that occurs while loading a waypoint map.
#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("Cannot read the map file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: expected 5 numeric fields `x y s dx dy`, found {found:?}")]
    Parse { line: usize, found: String },

    #[error("Line {line}: field is not a finite number")]
    NotFinite { line: usize },

    #[error("The map needs at least 2 waypoints, found {0}")]
    TooFewWaypoints(usize),

    #[error("The track length must be positive and finite, found {0}")]
    InvalidTrackLength(f64),

    #[error("Waypoint {index}: arc length {s} lies outside [0, {max_s})")]
    ArcLengthOutOfRange { index: usize, s: f64, max_s: f64 },

    #[error("Waypoint {index}: arc length does not increase")]
    ArcLengthNotIncreasing { index: usize },

    #[error("Waypoint {index}: normal vector has zero length")]
    ZeroNormal { index: usize },
}

/// A reference point on the road centre line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    /// The arc length along the centre line in m.
    pub arc_length: f64,
    /// The world space x coordinate in m.
    pub x: f64,
    /// The world space y coordinate in m.
    pub y: f64,
    /// The x component of the unit lateral normal.
    pub normal_x: f64,
    /// The y component of the unit lateral normal.
    pub normal_y: f64,
}

impl Waypoint {
    /// The world space position of the waypoint.
    pub fn position(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }

    /// The lateral normal of the waypoint.
    pub fn normal(&self) -> Vector2d {
        Vector2d::new(self.normal_x, self.normal_y)
    }
}

/// A quantity that can be interpolated along the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    NormalX,
    NormalY,
}

/// An immutable map of the centre line of a closed track.
#[derive(Clone, Debug)]
pub struct WaypointMap {
    /// The waypoints in order of increasing arc length.
    waypoints: Vec<Waypoint>,
    /// The arc length at which the track wraps back to zero.
    track: Interval<f64>,
    /// Summed chord lengths of all segments before each waypoint.
    segment_starts: Vec<f64>,
    /// One spline per [Axis], indexed by [Axis::index].
    splines: [CubicSpline; 4],
}

impl Axis {
    const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::NormalX, Axis::NormalY];

    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::NormalX => 2,
            Axis::NormalY => 3,
        }
    }

    fn of(self, waypoint: &Waypoint) -> f64 {
        match self {
            Axis::X => waypoint.x,
            Axis::Y => waypoint.y,
            Axis::NormalX => waypoint.normal_x,
            Axis::NormalY => waypoint.normal_y,
        }
    }
}

impl WaypointMap {
    /// Creates a map from waypoints ordered by arc length.
    ///
    /// # Parameters
    /// * `waypoints` - The waypoints; arc lengths must strictly increase within `[0, max_s)`
    /// * `max_s` - The arc length at which the track wraps back to zero
    pub fn new(waypoints: Vec<Waypoint>, max_s: f64) -> Result<Self, MapLoadError> {
        if !(max_s.is_finite() && max_s > 0.0) {
            return Err(MapLoadError::InvalidTrackLength(max_s));
        }
        if waypoints.len() < 2 {
            return Err(MapLoadError::TooFewWaypoints(waypoints.len()));
        }
        let track = Interval::new(0.0, max_s);
        for (index, wp) in waypoints.iter().enumerate() {
            if !track.contains_half_open(wp.arc_length) {
                return Err(MapLoadError::ArcLengthOutOfRange {
                    index,
                    s: wp.arc_length,
                    max_s,
                });
            }
            if wp.normal().magnitude2() == 0.0 {
                return Err(MapLoadError::ZeroNormal { index });
            }
        }
        if let Some((index, _)) = waypoints
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (a, b))| a.arc_length >= b.arc_length)
        {
            return Err(MapLoadError::ArcLengthNotIncreasing { index: index + 1 });
        }

        let segment_starts = std::iter::once(0.0)
            .chain(
                waypoints
                    .iter()
                    .tuple_windows()
                    .map(|(a, b)| a.position().distance(b.position()))
                    .scan(0.0, |total, len| {
                        *total += len;
                        Some(*total)
                    }),
            )
            .take(waypoints.len())
            .collect();

        let knots = waypoints.iter().map(|wp| wp.arc_length).collect::<Vec<_>>();
        let splines = Axis::ALL.map(|axis| {
            let values = waypoints.iter().map(|wp| axis.of(wp)).collect::<Vec<_>>();
            CubicSpline::periodic(&knots, &values, max_s)
        });
        let [x, y, nx, ny] = splines;
        let splines = match (x, y, nx, ny) {
            (Some(x), Some(y), Some(nx), Some(ny)) => [x, y, nx, ny],
            // Knots were validated as strictly increasing within one period above
            _ => return Err(MapLoadError::ArcLengthNotIncreasing { index: 0 }),
        };

        Ok(Self {
            waypoints,
            track,
            segment_starts,
            splines,
        })
    }

    /// Parses a map from text rows of whitespace separated `x y s dx dy` values.
    pub fn parse(text: &str, max_s: f64) -> Result<Self, MapLoadError> {
        let mut waypoints = vec![];
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields = line
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>();
            let fields = match fields {
                Ok(fields) if fields.len() == 5 => fields,
                _ => {
                    return Err(MapLoadError::Parse {
                        line: line_no,
                        found: line.to_string(),
                    })
                }
            };
            if fields.iter().any(|v| !v.is_finite()) {
                return Err(MapLoadError::NotFinite { line: line_no });
            }
            waypoints.push(Waypoint {
                x: fields[0],
                y: fields[1],
                arc_length: fields[2],
                normal_x: fields[3],
                normal_y: fields[4],
            });
        }
        Self::new(waypoints, max_s)
    }

    /// Loads a map file of `x y s dx dy` rows.
    pub fn load(path: impl AsRef<Path>, max_s: f64) -> Result<Self, MapLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let map = Self::parse(&text, max_s)?;
        info!(
            "Loaded {} waypoints from {} (track length {:.3} m)",
            map.len(),
            path.display(),
            max_s
        );
        Ok(map)
    }

    /// The number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; a map holds at least two waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The waypoints in order of increasing arc length.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// The arc length at which the track wraps back to zero.
    pub fn max_s(&self) -> f64 {
        self.track.max
    }

    /// The arc length range `[0, max_s)` of the track.
    pub fn track(&self) -> Interval<f64> {
        self.track
    }

    /// Normalises an arc length into `[0, max_s)`.
    pub fn wrap_s(&self, s: f64) -> f64 {
        self.track.wrap(s)
    }

    /// The summed chord lengths of all segments before waypoint `idx`.
    pub fn segment_start(&self, idx: usize) -> f64 {
        self.segment_starts[idx]
    }

    /// Smoothly interpolates a quantity at arc length `s`.
    /// `s` is wrapped onto the track before the lookup.
    pub fn interpolate(&self, axis: Axis, s: f64) -> f64 {
        self.splines[axis.index()].sample(self.wrap_s(s))
    }

    /// The derivative of the centre line position with respect to arc length at `s`.
    pub fn tangent(&self, s: f64) -> Vector2d {
        let s = self.wrap_s(s);
        Vector2d::new(
            self.splines[Axis::X.index()].sample_dx(s),
            self.splines[Axis::Y.index()].sample_dx(s),
        )
    }

    /// The index of the waypoint closest to `point`.
    pub fn closest_waypoint(&self, point: Point2d) -> usize {
        self.waypoints
            .iter()
            .map(|wp| wp.position().distance2(point))
            .position_min_by(|a, b| a.total_cmp(b))
            .unwrap_or(0)
    }
}

/// A closed circular track used by the unit tests.
///
/// Waypoint arc lengths are the summed chord lengths, and normals point outwards,
/// which is to the right of the anticlockwise direction of travel.
#[cfg(test)]
pub(crate) fn circle_map(radius: f64, count: usize) -> WaypointMap {
    let step = 2.0 * std::f64::consts::PI / count as f64;
    let chord = 2.0 * radius * (0.5 * step).sin();
    let waypoints = (0..count)
        .map(|i| {
            let theta = i as f64 * step;
            Waypoint {
                arc_length: i as f64 * chord,
                x: radius * theta.cos(),
                y: radius * theta.sin(),
                normal_x: theta.cos(),
                normal_y: theta.sin(),
            }
        })
        .collect();
    WaypointMap::new(waypoints, count as f64 * chord).unwrap()
}
