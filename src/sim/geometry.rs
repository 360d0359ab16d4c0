//! Coordinate transforms and triangle primitives
//!
//! Screen convention: y grows downward, so a positive rotation in degrees
//! turns a point anticlockwise on screen (straight down goes to the right).

use glam::Vec2;

/// Absolute slack allowed when comparing triangle areas.
/// Rocks are built from integer-jittered vertices and f32 maths; exact
/// equality would reject points sitting on shared fan edges.
pub const CONTAINMENT_TOLERANCE: f32 = 1.0;

/// Move a point by `delta`
#[inline]
pub fn translate(point: Vec2, delta: Vec2) -> Vec2 {
    point + delta
}

/// Scale a point toward/away from the origin
#[inline]
pub fn scale(point: Vec2, factor: f32) -> Vec2 {
    point * factor
}

/// Rotate a point around the origin
///
/// Rotation of axes: `x' = x cos θ + y sin θ`, `y' = -x sin θ + y cos θ`
pub fn rotate_around_origin(point: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(
        point.x * cos + point.y * sin,
        -point.x * sin + point.y * cos,
    )
}

/// Rotate a point around an arbitrary pivot
pub fn rotate_around_pivot(point: Vec2, pivot: Vec2, degrees: f32) -> Vec2 {
    let moved = translate(point, -pivot);
    let rotated = rotate_around_origin(moved, degrees);
    translate(rotated, pivot)
}

/// Area of the triangle `abc` (shoelace formula)
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    ((a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)) / 2.0).abs()
}

/// Is `p` inside (or on the edge of) the triangle `abc`?
///
/// The three sub-triangles formed with `p` cover the whole triangle exactly
/// when `p` is inside it.
pub fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let area = triangle_area(a, b, c);
    let a1 = triangle_area(p, b, c);
    let a2 = triangle_area(p, a, c);
    let a3 = triangle_area(p, a, b);

    (a1 + a2 + a3 - area).abs() < CONTAINMENT_TOLERANCE
}

/// Round to whole pixel coordinates (for renderers that want integers)
#[inline]
pub fn to_pixel(point: Vec2) -> (i32, i32) {
    (point.x.round() as i32, point.y.round() as i32)
}
