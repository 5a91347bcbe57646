pub use cgmath;
pub use config::{Config, ConfigError, PlannerConfig};
pub use frenet::{cartesian_to_frenet, frenet_to_cartesian, CartesianPose, FrenetCoordinate};
pub use map::{Axis, MapLoadError, Waypoint, WaypointMap};
pub use planner::{
    FrenetSegment, FrenetState, PlanBuffer, PlanError, Planner, PlannerState, StepOutcome,
};
pub use telemetry::{PathMessage, TelemetryError, TelemetryTick};
pub use tracker::{HostState, TrackedVehicle, VehicleTracker};
pub use trajectory::{BoundaryState, JerkMinimalTrajectory, SynthesisError};
pub use util::Interval;

mod config;
mod frenet;
mod map;
pub mod math;
mod planner;
pub mod telemetry;
mod tracker;
pub mod trajectory;
mod util;
