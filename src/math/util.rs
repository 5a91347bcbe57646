use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use std::f64::consts::PI;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees anticlockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Wraps an angle in radians into the range `(-pi, pi]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

/// The heading in radians of a direction vector, measured anticlockwise from the x-axis.
pub fn heading_of(dir: Vector2d) -> f64 {
    dir.y.atan2(dir.x)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn project_onto_rotated_axes() {
        let x_axis = Vector2d::new(0.0, 1.0);
        let local = project_local(
            Point2d::new(3.0, 5.0),
            Point2d::new(1.0, 1.0),
            x_axis,
            rot90(x_axis),
        );
        assert_approx_eq!(local.x, 4.0);
        assert_approx_eq!(local.y, -2.0);
    }

    #[test]
    fn angles_wrap() {
        assert_approx_eq!(normalize_angle(0.25 * PI), 0.25 * PI);
        assert_approx_eq!(normalize_angle(1.5 * PI), -0.5 * PI);
        assert_approx_eq!(normalize_angle(-1.5 * PI), 0.5 * PI);
        assert_approx_eq!(normalize_angle(2.25 * PI), 0.25 * PI);
        assert_approx_eq!(heading_of(Vector2d::new(0.0, 2.0)), 0.5 * PI);
    }
}
