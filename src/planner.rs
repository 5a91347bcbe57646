//! The planning loop which keeps the vehicle supplied with path points.

use crate::config::PlannerConfig;
use crate::frenet::{cartesian_to_frenet, frenet_to_cartesian, FrenetCoordinate};
use crate::map::WaypointMap;
use crate::math::Point2d;
use crate::telemetry::{PathMessage, TelemetryTick};
use crate::tracker::VehicleTracker;
use crate::trajectory::{BoundaryState, JerkMinimalTrajectory, SynthesisError};
use log::{debug, info, warn};
use thiserror::Error;

pub use buffer::PlanBuffer;

mod buffer;

/// The longitudinal and lateral boundary states of the vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrenetState {
    pub s: BoundaryState,
    pub d: BoundaryState,
}

/// A pair of trajectories, one along the road and one across it, over the same duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrenetSegment {
    pub s: JerkMinimalTrajectory,
    pub d: JerkMinimalTrajectory,
}

/// The state of the planner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlannerState {
    /// No path has been issued.
    Uninitialized,
    /// The first segment is being synthesised from the host vehicle's state.
    Seeding,
    /// A path has been issued and ends in `terminal`.
    SteadyState { terminal: FrenetState },
}

/// What a planning step did to the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// The buffer was replaced by the first segment.
    Seeded { segment: FrenetSegment, appended: usize },
    /// A segment was appended to the end of the buffer.
    Extended { segment: FrenetSegment, appended: usize },
    /// The buffer held enough points.
    Unchanged,
    /// Planning failed and the buffer was left as it was.
    Fallback,
}

/// An error that occurs during a planning step.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PlanError {
    #[error("No host vehicle state has been received")]
    NoHostState,

    #[error("Failed to synthesise trajectory: {0}")]
    Synthesis(#[from] SynthesisError),
}

impl FrenetState {
    pub const fn new(s: BoundaryState, d: BoundaryState) -> Self {
        Self { s, d }
    }

    /// The road relative position of the state.
    pub fn coordinate(&self) -> FrenetCoordinate {
        FrenetCoordinate::new(self.s.position, self.d.position)
    }
}

impl FrenetSegment {
    /// Synthesises both trajectories from `start` to `end` over `duration` seconds.
    pub fn solve(
        start: FrenetState,
        end: FrenetState,
        duration: f64,
    ) -> Result<Self, SynthesisError> {
        Ok(Self {
            s: JerkMinimalTrajectory::solve(start.s, end.s, duration)?,
            d: JerkMinimalTrajectory::solve(start.d, end.d, duration)?,
        })
    }

    pub fn duration(&self) -> f64 {
        self.s.duration()
    }

    pub fn state_at(&self, t: f64) -> FrenetState {
        FrenetState::new(self.s.state_at(t), self.d.state_at(t))
    }

    pub fn start_state(&self) -> FrenetState {
        self.state_at(0.0)
    }

    pub fn end_state(&self) -> FrenetState {
        self.state_at(self.duration())
    }
}

impl PlannerState {
    fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Seeding => "seeding",
            Self::SteadyState { .. } => "steady state",
        }
    }
}

/// Generates a smooth path for the vehicle, one segment at a time.
///
/// The planner is driven by telemetry ticks. Each tick reports how much of the
/// issued path is still unconsumed; once that falls below the configured threshold a
/// new segment is synthesised starting from the exact end state of the last one.
pub struct Planner<'a> {
    map: &'a WaypointMap,
    config: PlannerConfig,
    state: PlannerState,
    buffer: PlanBuffer,
    tracker: VehicleTracker,
}

impl<'a> Planner<'a> {
    pub fn new(map: &'a WaypointMap, config: PlannerConfig) -> Self {
        Self {
            map,
            config,
            state: PlannerState::Uninitialized,
            buffer: PlanBuffer::new(),
            tracker: VehicleTracker::new(),
        }
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    /// The state at the end of the issued path, once there is one.
    pub fn terminal_state(&self) -> Option<FrenetState> {
        match self.state {
            PlannerState::SteadyState { terminal } => Some(terminal),
            _ => None,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn map(&self) -> &'a WaypointMap {
        self.map
    }

    /// The unconsumed path points.
    pub fn buffer(&self) -> &PlanBuffer {
        &self.buffer
    }

    pub fn tracker(&self) -> &VehicleTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut VehicleTracker {
        &mut self.tracker
    }

    /// Drops the points the vehicle has passed, given the number it has not.
    pub fn consume(&mut self, remaining: usize) {
        if remaining > self.buffer.len() {
            warn!(
                "Vehicle reports {} unconsumed points but only {} are buffered",
                remaining,
                self.buffer.len()
            );
        }
        let consumed = self.buffer.consume_to(remaining);
        debug!("Vehicle consumed {} points", consumed);
    }

    /// Runs a single planning step.
    ///
    /// On error the buffer is left untouched.
    pub fn step(&mut self) -> Result<StepOutcome, PlanError> {
        match self.state {
            PlannerState::Uninitialized | PlannerState::Seeding => self.seed(),
            PlannerState::SteadyState { terminal } => self.extend(terminal),
        }
    }

    /// Processes a telemetry tick: updates the tracked vehicles, reconciles the
    /// buffer with the vehicle's progress and plans if needed.
    pub fn on_telemetry(&mut self, tick: &TelemetryTick) -> StepOutcome {
        let host = if self.config.recompute_host_frenet {
            cartesian_to_frenet(&tick.host_pose(), self.map)
        } else {
            FrenetCoordinate::new(tick.s, tick.d)
        };
        self.tracker.update_host(host.s, host.d, tick.speed_mps());
        self.tracker.update_fused_vehicles(tick.fused_vehicles());
        self.consume(tick.remaining_points());

        match self.step() {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("Planning step failed, keeping current path: {}", err);
                StepOutcome::Fallback
            }
        }
    }

    /// Handles one raw telemetry message and returns the path to send back.
    ///
    /// A malformed message is skipped and answered with the buffer as it stands.
    pub fn on_message(&mut self, text: &str) -> PathMessage {
        match TelemetryTick::from_json(text) {
            Ok(tick) => {
                self.on_telemetry(&tick);
            }
            Err(err) => warn!("Skipping tick: {}", err),
        }
        PathMessage::from(&self.buffer)
    }

    fn seed(&mut self) -> Result<StepOutcome, PlanError> {
        self.transition(PlannerState::Seeding);
        match self.synthesise_seed() {
            Ok((segment, points, terminal)) => {
                let appended = points.len();
                self.buffer.clear();
                self.buffer.extend(points);
                self.transition(PlannerState::SteadyState { terminal });
                Ok(StepOutcome::Seeded { segment, appended })
            }
            Err(err) => {
                self.transition(PlannerState::Uninitialized);
                Err(err)
            }
        }
    }

    fn synthesise_seed(&self) -> Result<(FrenetSegment, Vec<Point2d>, FrenetState), PlanError> {
        let host = self.tracker.host().ok_or(PlanError::NoHostState)?;
        let config = &self.config;
        let start = FrenetState::new(
            BoundaryState::new(host.s, host.speed, 0.0),
            BoundaryState::new(host.d, 0.0, 0.0),
        );
        let end = FrenetState::new(
            BoundaryState::new(host.s + config.seed_distance, config.cruise_speed, 0.0),
            BoundaryState::new(config.target_d, 0.0, 0.0),
        );
        debug!("Seeding from s = {:.2}, d = {:.2}", host.s, host.d);

        let segment = FrenetSegment::solve(start, end, config.seed_horizon())?;
        let (points, terminal) = self.sample(&segment, config.seed_points);
        Ok((segment, points, terminal))
    }

    fn extend(&mut self, terminal: FrenetState) -> Result<StepOutcome, PlanError> {
        let config = &self.config;
        if self.buffer.len() >= config.min_buffer_points {
            return Ok(StepOutcome::Unchanged);
        }
        debug!(
            "{} points left, extending from s = {:.2}",
            self.buffer.len(),
            terminal.s.position
        );

        let end = FrenetState::new(
            BoundaryState::new(
                terminal.s.position + config.replan_distance,
                config.cruise_speed,
                0.0,
            ),
            BoundaryState::new(config.target_d, 0.0, 0.0),
        );
        let segment = FrenetSegment::solve(terminal, end, config.replan_horizon())?;
        let (points, terminal) = self.sample(&segment, config.replan_points);

        let appended = points.len();
        self.buffer.extend(points);
        self.state = PlannerState::SteadyState { terminal };
        Ok(StepOutcome::Extended { segment, appended })
    }

    /// Samples `count` points of the segment, one per tick, and returns them with
    /// the state at the last one.
    fn sample(&self, segment: &FrenetSegment, count: usize) -> (Vec<Point2d>, FrenetState) {
        let dt = self.config.tick_interval;
        let points = segment
            .s
            .samples(dt, count)
            .zip(segment.d.samples(dt, count))
            .map(|(s, d)| frenet_to_cartesian(&FrenetCoordinate::new(s, d), self.map).position())
            .collect();

        let last = segment.state_at(count as f64 * dt);
        let terminal = FrenetState::new(
            last.s.with_position(self.map.wrap_s(last.s.position)),
            last.d,
        );
        (points, terminal)
    }

    fn transition(&mut self, state: PlannerState) {
        if self.state.name() != state.name() {
            info!("Planner {} -> {}", self.state.name(), state.name());
        }
        self.state = state;
    }
}
