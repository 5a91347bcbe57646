use crate::math::Point2d;
use std::collections::VecDeque;

/// The path points issued to the vehicle which it has not yet reached.
///
/// Points are consumed from the front by the vehicle and appended to the back by
/// the planner.
#[derive(Clone, Debug, Default)]
pub struct PlanBuffer {
    points: VecDeque<Point2d>,
}

impl PlanBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Default::default()
    }

    /// The number of unconsumed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the points in the order the vehicle will reach them.
    pub fn iter(&self) -> impl Iterator<Item = &Point2d> + '_ {
        self.points.iter()
    }

    /// The last point of the path, if there is one.
    pub fn last(&self) -> Option<Point2d> {
        self.points.back().copied()
    }

    /// Drops points from the front until only `remaining` are left.
    /// Returns the number of points dropped.
    pub fn consume_to(&mut self, remaining: usize) -> usize {
        let consumed = self.points.len().saturating_sub(remaining);
        self.points.drain(..consumed);
        consumed
    }

    /// Appends points to the end of the path.
    pub fn extend(&mut self, points: impl IntoIterator<Item = Point2d>) {
        self.points.extend(points);
    }

    /// Discards every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn buffer(count: usize) -> PlanBuffer {
        let mut buffer = PlanBuffer::new();
        buffer.extend((0..count).map(|i| Point2d::new(i as f64, 0.0)));
        buffer
    }

    #[test]
    fn consumes_from_the_front() {
        let mut buffer = buffer(10);
        assert_eq!(buffer.consume_to(4), 6);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.iter().next(), Some(&Point2d::new(6.0, 0.0)));
        assert_eq!(buffer.last(), Some(Point2d::new(9.0, 0.0)));
    }

    #[test]
    fn cannot_consume_more_than_issued() {
        let mut buffer = buffer(3);
        assert_eq!(buffer.consume_to(5), 0);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.consume_to(0), 3);
        assert!(buffer.is_empty());
        assert_eq!(buffer.last(), None);
    }
}
