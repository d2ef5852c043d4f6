//! GJK intersection test
//!
//! Grows a simplex of Minkowski-difference support points (1 -> 2 -> 3) until
//! it either encloses the origin (the shapes overlap) or a support point fails
//! to pass the origin along the search direction (they don't).
//!
//! Touching shapes (origin exactly on the Minkowski boundary) count as
//! overlapping.

use std::ops::Index;

use glam::Vec2;

use super::support::{SupportMap, support};
use crate::consts::DIRECTION_EPSILON;
use crate::orient_toward;

/// Minkowski-difference points, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Simplex {
    points: Vec<Vec2>,
}

impl Simplex {
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(3),
        }
    }

    pub fn from_points(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Vec2) {
        self.points.push(point);
    }

    /// Replace the contents with `points` (oldest first)
    fn set(&mut self, points: &[Vec2]) {
        self.points.clear();
        self.points.extend_from_slice(points);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Vec2> {
        self.points
    }
}

impl Index<usize> for Simplex {
    type Output = Vec2;

    fn index(&self, index: usize) -> &Vec2 {
        &self.points[index]
    }
}

/// Outcome of a GJK query
#[derive(Debug, Clone, PartialEq)]
pub enum GjkResult {
    /// A separating direction was found
    Separated { iterations: u32 },
    /// The final triangle encloses the origin
    Intersecting { simplex: Simplex, iterations: u32 },
    /// The iteration cap ran out before a decision
    Undecided { iterations: u32 },
}

impl GjkResult {
    #[inline]
    pub fn is_intersecting(&self) -> bool {
        matches!(self, GjkResult::Intersecting { .. })
    }

    pub fn iterations(&self) -> u32 {
        match self {
            GjkResult::Separated { iterations }
            | GjkResult::Intersecting { iterations, .. }
            | GjkResult::Undecided { iterations } => *iterations,
        }
    }
}

/// Run GJK on the Minkowski difference `a - b`
///
/// `initial_direction` is normally `position(a) - position(b)`; a zero vector
/// falls back to +X. Every loop pass counts as one iteration.
pub fn gjk<A, B>(a: &A, b: &B, initial_direction: Vec2, max_iterations: u32) -> GjkResult
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let mut direction = if initial_direction.length_squared() > DIRECTION_EPSILON {
        initial_direction
    } else {
        Vec2::X
    };
    let mut simplex = Simplex::new();

    for iteration in 1..=max_iterations {
        match simplex.len() {
            0 => {
                let first = support(direction, a, b);
                simplex.push(first);
                // Search back toward the origin
                direction = -first;
            }
            1 => {
                let next = support(direction, a, b);
                simplex.push(next);
                if next.dot(direction) < 0.0 {
                    return GjkResult::Separated { iterations: iteration };
                }
            }
            2 => {
                let newest = simplex[1];
                let ab = simplex[0] - newest;
                direction = orient_toward(ab.perp(), -newest);

                let next = support(direction, a, b);
                simplex.push(next);
                if next.dot(direction) < 0.0 {
                    return GjkResult::Separated { iterations: iteration };
                }
            }
            _ => {
                let (c, b_pt, a_pt) = (simplex[0], simplex[1], simplex[2]);
                let ab = b_pt - a_pt;
                let ac = c - a_pt;
                let ao = -a_pt;

                // Edge normals pointing away from the opposite vertex
                let ab_norm = orient_toward(ab.perp(), -ac);
                let ac_norm = orient_toward(ac.perp(), -ab);

                if ab_norm.dot(ao) > 0.0 {
                    // Origin beyond AB: drop C
                    direction = ab_norm;
                    simplex.set(&[b_pt, a_pt]);
                } else if ac_norm.dot(ao) > 0.0 {
                    // Origin beyond AC: drop B
                    direction = ac_norm;
                    simplex.set(&[c, a_pt]);
                } else if (-ab_norm).dot(ao) >= 0.0 && (-ac_norm).dot(ao) >= 0.0 {
                    return GjkResult::Intersecting {
                        simplex,
                        iterations: iteration,
                    };
                } else {
                    // Only reachable with non-finite input
                    return GjkResult::Separated { iterations: iteration };
                }

                let next = support(direction, a, b);
                simplex.push(next);
                if next.dot(direction) < 0.0 {
                    return GjkResult::Separated { iterations: iteration };
                }
            }
        }
    }

    GjkResult::Undecided {
        iterations: max_iterations,
    }
}
