//! Support mapping
//!
//! The support point of a shape in direction `d` is the point of the shape with
//! the greatest projection onto `d`. For the Minkowski difference `A - B` it is
//! `farthest(A, d) - farthest(B, -d)`, which is all GJK and EPA ever ask for.

use glam::Vec2;

/// Shapes that can report their extreme point along a direction
pub trait SupportMap {
    /// World-space point of the shape farthest along `direction`
    fn farthest_point(&self, direction: Vec2) -> Vec2;
}

/// Support point of the Minkowski difference `a - b` along `direction`
///
/// Each side dispatches on its own shape: a circle paired with a polygon uses
/// the closed form for the circle and the vertex scan for the polygon.
#[inline]
pub fn support<A, B>(direction: Vec2, a: &A, b: &B) -> Vec2
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    a.farthest_point(direction) - b.farthest_point(-direction)
}

/// Closed-form circle support; a zero direction yields the center
#[inline]
pub fn circle_support(center: Vec2, radius: f32, direction: Vec2) -> Vec2 {
    center + direction.normalize_or_zero() * radius
}

/// Vertex with the greatest dot product along `direction`
///
/// Linear scan; on ties the earliest vertex wins. `None` for an empty slice.
pub fn polygon_support(points: &[Vec2], direction: Vec2) -> Option<Vec2> {
    let (&first, rest) = points.split_first()?;
    let mut best = first;
    let mut best_dot = first.dot(direction);
    for &p in rest {
        let d = p.dot(direction);
        if d > best_dot {
            best = p;
            best_dot = d;
        }
    }
    Some(best)
}
