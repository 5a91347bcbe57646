//! The latest kinematic snapshot of the host and surrounding vehicles.

use smallvec::SmallVec;

/// The kinematic state of the host vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HostState {
    /// The longitudinal position along the track in m.
    pub s: f64,
    /// The lateral offset from the centre line in m.
    pub d: f64,
    /// The speed in m/s.
    pub speed: f64,
}

/// A snapshot of a nearby vehicle reported by sensor fusion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedVehicle {
    /// The vehicle's ID, unique within one tick.
    pub id: u32,
    /// The longitudinal position along the track in m.
    pub s: f64,
    /// The lateral offset from the centre line in m.
    pub d: f64,
    /// The speed in m/s.
    pub speed: f64,
}

/// Holds the most recent kinematic state of the host and the fused vehicles.
///
/// Every update replaces the previous snapshot wholesale.
#[derive(Clone, Debug, Default)]
pub struct VehicleTracker {
    host: Option<HostState>,
    fused: SmallVec<[TrackedVehicle; 16]>,
}

impl VehicleTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the host vehicle's state.
    pub fn update_host(&mut self, s: f64, d: f64, speed: f64) {
        self.host = Some(HostState { s, d, speed });
    }

    /// Replaces the set of fused vehicles.
    pub fn update_fused_vehicles(&mut self, vehicles: impl IntoIterator<Item = TrackedVehicle>) {
        self.fused.clear();
        self.fused.extend(vehicles);
    }

    /// The host vehicle's state, if any has been reported.
    pub fn host(&self) -> Option<&HostState> {
        self.host.as_ref()
    }

    /// The fused vehicles from the latest update.
    pub fn fused_vehicles(&self) -> &[TrackedVehicle] {
        &self.fused
    }

    /// Gets the fused vehicle with the given ID.
    pub fn get(&self, id: u32) -> Option<&TrackedVehicle> {
        self.fused.iter().find(|v| v.id == id)
    }
}
