//! Jerk minimising trajectories along a single axis.

use cgmath::{Matrix3, SquareMatrix, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The shortest trajectory duration that can be synthesised, in s.
///
/// The boundary value system grows ill-conditioned as the duration shrinks.
pub const MIN_DURATION: f64 = 0.01; // s

/// An error that occurs while synthesising a trajectory.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SynthesisError {
    #[error("Trajectory duration must be at least 0.01 s, found {0}")]
    InvalidDuration(f64),

    #[error("Boundary state is not finite: {0:?}")]
    NonFiniteBoundary(BoundaryState),

    #[error("The boundary value system is singular for duration {0}")]
    SingularSystem(f64),
}

/// The position, velocity and acceleration at one end of a trajectory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl BoundaryState {
    pub const fn new(position: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.acceleration.is_finite()
    }

    /// A copy of this state with the position replaced.
    pub fn with_position(self, position: f64) -> Self {
        Self { position, ..self }
    }
}

/// A quintic position profile `x(t) = a0 + a1 t + ... + a5 t^5` which minimises
/// the integrated squared jerk between two boundary states.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JerkMinimalTrajectory {
    coeffs: [f64; 6],
    duration: f64,
}

impl JerkMinimalTrajectory {
    /// Solves for the trajectory from `start` to `end` over `duration` seconds.
    ///
    /// The first three coefficients follow directly from `start`; the remaining
    /// three solve the 3x3 system matching `end` at `t = duration`.
    pub fn solve(
        start: BoundaryState,
        end: BoundaryState,
        duration: f64,
    ) -> Result<Self, SynthesisError> {
        if !(duration.is_finite() && duration >= MIN_DURATION) {
            return Err(SynthesisError::InvalidDuration(duration));
        }
        for state in [start, end] {
            if !state.is_finite() {
                return Err(SynthesisError::NonFiniteBoundary(state));
            }
        }

        let t = duration;
        let (t2, t3, t4, t5) = (t * t, t * t * t, t * t * t * t, t * t * t * t * t);

        // Columns hold the contribution of a3, a4 and a5 to position, velocity and acceleration
        let system = Matrix3::from_cols(
            Vector3::new(t3, 3.0 * t2, 6.0 * t),
            Vector3::new(t4, 4.0 * t3, 12.0 * t2),
            Vector3::new(t5, 5.0 * t4, 20.0 * t3),
        );
        let residual = Vector3::new(
            end.position - (start.position + start.velocity * t + 0.5 * start.acceleration * t2),
            end.velocity - (start.velocity + start.acceleration * t),
            end.acceleration - start.acceleration,
        );
        let upper = system
            .invert()
            .map(|inv| inv * residual)
            .filter(|c| c.x.is_finite() && c.y.is_finite() && c.z.is_finite())
            .ok_or(SynthesisError::SingularSystem(duration))?;

        Ok(Self {
            coeffs: [
                start.position,
                start.velocity,
                0.5 * start.acceleration,
                upper.x,
                upper.y,
                upper.z,
            ],
            duration,
        })
    }

    /// The polynomial coefficients `[a0, a1, a2, a3, a4, a5]`.
    pub fn coefficients(&self) -> [f64; 6] {
        self.coeffs
    }

    /// The duration the trajectory was solved over, in s.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn position(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        c[0] + t * (c[1] + t * (c[2] + t * (c[3] + t * (c[4] + t * c[5]))))
    }

    pub fn velocity(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        c[1] + t * (2.0 * c[2] + t * (3.0 * c[3] + t * (4.0 * c[4] + t * 5.0 * c[5])))
    }

    pub fn acceleration(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        2.0 * c[2] + t * (6.0 * c[3] + t * (12.0 * c[4] + t * 20.0 * c[5]))
    }

    pub fn jerk(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        6.0 * c[3] + t * (24.0 * c[4] + t * 60.0 * c[5])
    }

    /// The position, velocity and acceleration at time `t`.
    pub fn state_at(&self, t: f64) -> BoundaryState {
        BoundaryState::new(self.position(t), self.velocity(t), self.acceleration(t))
    }

    pub fn start_state(&self) -> BoundaryState {
        self.state_at(0.0)
    }

    pub fn end_state(&self) -> BoundaryState {
        self.state_at(self.duration)
    }

    /// Samples positions at `t = dt, 2 dt, ..., count * dt`.
    pub fn samples(&self, dt: f64, count: usize) -> impl Iterator<Item = f64> + '_ {
        (1..=count).map(move |i| self.position(i as f64 * dt))
    }
}
