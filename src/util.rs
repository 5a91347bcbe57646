//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true if the value lies in the half-open range `[min, max)`.
    pub fn contains_half_open(&self, value: T) -> bool {
        value >= self.min && value < self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// Wraps `value` into `[min, max)`, treating the interval as periodic.
    pub fn wrap(&self, value: T) -> T {
        let len = self.length();
        let wrapped = self.min + (value - self.min) % len;
        let wrapped = if wrapped < self.min { wrapped + len } else { wrapped };
        // `-tiny % len + len` rounds to `len` itself
        if wrapped >= self.max {
            self.min
        } else {
            wrapped
        }
    }

    /// The shortest signed distance from `from` to `to` on the periodic interval.
    pub fn periodic_delta(&self, from: T, to: T) -> T {
        let len = self.length();
        let half = len / (T::one() + T::one());
        let delta = (to - from) % len;
        if delta > half {
            delta - len
        } else if delta < -half {
            delta + len
        } else {
            delta
        }
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::Interval;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn wrap_is_periodic() {
        let track = Interval::<f64>::new(0.0, 100.0);
        assert_approx_eq!(track.wrap(0.0), 0.0);
        assert_approx_eq!(track.wrap(42.5), 42.5);
        assert_approx_eq!(track.wrap(100.0), 0.0);
        assert_approx_eq!(track.wrap(250.0), 50.0);
        assert_approx_eq!(track.wrap(-10.0), 90.0);
        assert_approx_eq!(track.wrap(-310.0), 90.0);
        assert!(track.wrap(-1e-18) < 100.0);
    }

    #[test]
    fn periodic_delta_takes_short_way_round() {
        let track = Interval::<f64>::new(0.0, 100.0);
        assert_approx_eq!(track.periodic_delta(10.0, 20.0), 10.0);
        assert_approx_eq!(track.periodic_delta(95.0, 5.0), 10.0);
        assert_approx_eq!(track.periodic_delta(5.0, 95.0), -10.0);
    }

    #[test]
    fn containment() {
        let range = Interval::<f64>::new(50.0, 200.0);
        assert!(range.contains(200.0));
        assert!(!range.contains_half_open(200.0));
        assert!(range.contains_half_open(50.0));
        assert_approx_eq!(range.length(), 150.0);
    }
}
