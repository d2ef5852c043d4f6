//! EPA penetration resolver
//!
//! Starting from the GJK triangle that encloses the origin, repeatedly pushes
//! the polytope edge closest to the origin outward to the Minkowski boundary.
//! When the edge stops moving (or its normal stops changing) that edge's normal
//! is the minimum-translation direction.

use glam::Vec2;

use super::gjk::Simplex;
use super::support::{SupportMap, support};
use crate::settings::{CollisionSettings, EdgeMetric};
use crate::{centroid, edge_normal, orient_toward};

/// Resolution result for the first shape of the pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Unit direction that moves the first shape out of the second
    pub normal: Vec2,
    /// Overlap along `normal`
    pub depth: f32,
    /// Expansions performed
    pub iterations: u32,
    /// False when the iteration cap was hit and `normal` is the last candidate
    pub converged: bool,
}

/// Polytope edge picked for expansion
#[derive(Debug, Clone, Copy)]
struct Edge {
    /// Index of the edge's first vertex; the edge runs to the next one
    index: usize,
    /// Outward unit normal (zero for a degenerate edge)
    normal: Vec2,
    /// Distance from the origin to the edge's supporting line
    distance: f32,
}

fn closest_edge(polytope: &[Vec2], metric: EdgeMetric) -> Option<Edge> {
    let interior = centroid(polytope);
    let n = polytope.len();
    let mut best: Option<(f32, Edge)> = None;

    for i in 0..n {
        let p = polytope[i];
        let q = polytope[(i + 1) % n];
        let normal = orient_toward(edge_normal(q - p), p - interior).normalize_or_zero();
        let distance = normal.dot(p);
        let score = match metric {
            EdgeMetric::EndpointDot => p.dot(q),
            EdgeMetric::Distance => distance,
        };
        if best.as_ref().is_none_or(|(s, _)| score < *s) {
            best = Some((
                score,
                Edge {
                    index: i,
                    normal,
                    distance,
                },
            ));
        }
    }

    best.map(|(_, edge)| edge)
}

/// Extent of the Minkowski difference along `normal`
///
/// Moving the first shape by this much along `-normal` separates the pair.
fn boundary_depth<A, B>(normal: Vec2, a: &A, b: &B) -> f32
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    support(normal, a, b).dot(normal).max(0.0)
}

/// Expand `simplex` (which must enclose the origin) into a penetration normal
///
/// `fallback` is used when the closest edge is degenerate; callers pass the
/// normalized vector from the second shape's reference point to the first's.
pub fn epa<A, B>(
    simplex: Simplex,
    a: &A,
    b: &B,
    fallback: Vec2,
    settings: &CollisionSettings,
) -> Penetration
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let fallback = Penetration {
        normal: fallback,
        depth: 0.0,
        iterations: 0,
        converged: true,
    };

    let mut polytope = simplex.into_points();
    if polytope.len() < 2 {
        return fallback;
    }

    let threshold = settings.normal_convergence;
    let mut prev = Vec2::splat(f32::INFINITY);

    for iteration in 1..=settings.max_epa_iterations {
        let Some(edge) = closest_edge(&polytope, settings.edge_metric) else {
            return fallback;
        };

        // Zero-length edge: no usable direction
        if edge.normal == Vec2::ZERO {
            return Penetration {
                iterations: iteration,
                ..fallback
            };
        }

        let diff = edge.normal - prev;
        if diff.x * diff.x < threshold && diff.y * diff.y < threshold {
            return Penetration {
                normal: -prev,
                depth: boundary_depth(prev, a, b),
                iterations: iteration,
                converged: true,
            };
        }

        let point = support(edge.normal, a, b);
        if point.dot(edge.normal) - edge.distance < settings.epa_tolerance {
            // Edge already lies on the Minkowski boundary
            return Penetration {
                normal: -edge.normal,
                depth: edge.distance,
                iterations: iteration,
                converged: true,
            };
        }

        prev = edge.normal;
        polytope.insert(edge.index + 1, point);
    }

    log::debug!(
        "EPA hit {} iterations, using last candidate normal",
        settings.max_epa_iterations
    );
    if prev.is_finite() {
        Penetration {
            normal: -prev,
            depth: boundary_depth(prev, a, b),
            iterations: settings.max_epa_iterations,
            converged: false,
        }
    } else {
        Penetration {
            converged: false,
            ..fallback
        }
    }
}
