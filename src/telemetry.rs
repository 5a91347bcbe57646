//! The messages exchanged with the vehicle simulator.

use crate::frenet::CartesianPose;
use crate::planner::PlanBuffer;
use crate::tracker::TrackedVehicle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The number of m/s in one mph.
pub const MPH_TO_MPS: f64 = 0.44704;

/// An error that occurs while reading a telemetry message.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Cannot parse telemetry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed telemetry: {0}")]
    Malformed(String),
}

/// One row of sensor fusion data: `[id, x, y, vx, vy, s, d]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FusionRow(pub u32, pub f64, pub f64, pub f64, pub f64, pub f64, pub f64);

/// A telemetry message sent by the simulator once per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryTick {
    /// The host vehicle's world space position in m.
    pub x: f64,
    pub y: f64,
    /// The host vehicle's road relative position in m, as computed by the simulator.
    pub s: f64,
    pub d: f64,
    /// The heading in degrees.
    pub yaw: f64,
    /// The speed in mph.
    pub speed: f64,
    /// The unconsumed points of the previously issued path.
    pub previous_path_x: Vec<f64>,
    pub previous_path_y: Vec<f64>,
    /// The road relative position of the end of the previously issued path.
    pub end_path_s: f64,
    pub end_path_d: f64,
    #[serde(default)]
    pub sensor_fusion: Vec<FusionRow>,
}

impl TelemetryTick {
    /// Parses and validates a telemetry message.
    pub fn from_json(text: &str) -> Result<Self, TelemetryError> {
        let tick: Self = serde_json::from_str(text)?;
        tick.validate()?;
        Ok(tick)
    }

    fn validate(&self) -> Result<(), TelemetryError> {
        if self.previous_path_x.len() != self.previous_path_y.len() {
            return Err(TelemetryError::Malformed(format!(
                "previous path has {} x values but {} y values",
                self.previous_path_x.len(),
                self.previous_path_y.len()
            )));
        }
        let scalars = [
            self.x,
            self.y,
            self.s,
            self.d,
            self.yaw,
            self.speed,
            self.end_path_s,
            self.end_path_d,
        ];
        if !scalars.iter().all(|v| v.is_finite()) {
            return Err(TelemetryError::Malformed(
                "host state is not finite".to_string(),
            ));
        }
        Ok(())
    }

    /// The host vehicle's pose, with the heading in radians.
    pub fn host_pose(&self) -> CartesianPose {
        CartesianPose::new(self.x, self.y, self.yaw.to_radians())
    }

    /// The host vehicle's speed in m/s.
    pub fn speed_mps(&self) -> f64 {
        self.speed * MPH_TO_MPS
    }

    /// The number of issued path points the vehicle has not yet reached.
    pub fn remaining_points(&self) -> usize {
        self.previous_path_x.len()
    }

    /// The vehicles reported by sensor fusion.
    pub fn fused_vehicles(&self) -> impl Iterator<Item = TrackedVehicle> + '_ {
        self.sensor_fusion
            .iter()
            .map(|&FusionRow(id, _x, _y, vx, vy, s, d)| TrackedVehicle {
                id,
                s,
                d,
                speed: vx.hypot(vy),
            })
    }
}

/// The path sent back to the simulator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathMessage {
    pub next_x: Vec<f64>,
    pub next_y: Vec<f64>,
}

impl From<&PlanBuffer> for PathMessage {
    fn from(buffer: &PlanBuffer) -> Self {
        let (next_x, next_y) = buffer.iter().map(|p| (p.x, p.y)).unzip();
        Self { next_x, next_y }
    }
}
