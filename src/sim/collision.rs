//! Point-vs-polygon hit testing
//!
//! Rocks and ships are star-shaped around their position, so a polygon is
//! split into a fan of triangles (previous vertex, vertex, centre) and the
//! point is tested against each. A cheap bounding box check runs first since
//! most points are nowhere near most polygons.

use glam::Vec2;

use super::geometry::point_in_triangle;

/// Strict axis-aligned box test around `centre`
#[inline]
pub fn within_bounds(point: Vec2, centre: Vec2, half_extent: f32) -> bool {
    point.x > centre.x - half_extent
        && point.x < centre.x + half_extent
        && point.y > centre.y - half_extent
        && point.y < centre.y + half_extent
}

/// Exact test: is `point` inside any fan triangle of `vertices` around `centre`?
///
/// Vertices are world-space and ordered; the last vertex pairs with the first.
pub fn point_in_fan(point: Vec2, centre: Vec2, vertices: &[Vec2]) -> bool {
    let Some(&last) = vertices.last() else {
        return false;
    };

    let mut prev = last;
    for &vertex in vertices {
        if point_in_triangle(point, prev, vertex, centre) {
            return true;
        }
        prev = vertex;
    }
    false
}

/// Bounding box reject, then the exact fan test
pub fn point_hits_polygon(point: Vec2, centre: Vec2, vertices: &[Vec2], half_extent: f32) -> bool {
    within_bounds(point, centre, half_extent) && point_in_fan(point, centre, vertices)
}
