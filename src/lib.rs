//! narrowphase2d - Narrow-phase 2D collision detection and resolution
//!
//! Core modules:
//! - `collide`: Shapes, support mapping, GJK, EPA, colliders and the frame driver
//! - `settings`: Tunable iteration caps and tolerances
//! - `error`: Construction and configuration errors

pub mod collide;
pub mod error;
pub mod settings;

pub use collide::{
    Body, BodyId, BroadPhase, Collider, ColliderId, CollisionWorld, Contact, Owner, Shape,
};
pub use error::{Error, Result};
pub use settings::{CollisionSettings, EdgeMetric, PrecisionPreset};

use glam::Vec2;

/// Collision configuration constants
pub mod consts {
    /// Default cap on GJK loop passes before the pair is declared undecided
    pub const MAX_GJK_ITERATIONS: u32 = 32;
    /// Default cap on EPA expansions before the best candidate normal is used
    pub const MAX_EPA_ITERATIONS: u32 = 32;

    /// Squared per-axis difference under which two successive EPA normals are equal
    pub const NORMAL_CONVERGENCE: f32 = 0.01;
    /// Minimum polytope growth along the candidate normal for EPA to keep expanding
    pub const EPA_TOLERANCE: f32 = 1.0e-4;

    /// Squared length below which a direction is treated as zero
    pub const DIRECTION_EPSILON: f32 = 1.0e-12;
}

/// Edge normal of `edge`, rotated clockwise: (y, -x)
#[inline]
pub fn edge_normal(edge: Vec2) -> Vec2 {
    Vec2::new(edge.y, -edge.x)
}

/// Flip `v` so that it points along `toward` (ties keep `v`)
#[inline]
pub fn orient_toward(v: Vec2, toward: Vec2) -> Vec2 {
    if v.dot(toward) < 0.0 { -v } else { v }
}

/// Mean of a point set (interior reference for convex polygons)
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orient_toward() {
        let v = Vec2::new(0.0, 1.0);
        assert_eq!(orient_toward(v, Vec2::new(0.0, -3.0)), Vec2::new(0.0, -1.0));
        assert_eq!(orient_toward(v, Vec2::new(0.0, 2.0)), v);
        // Perpendicular target keeps the original orientation
        assert_eq!(orient_toward(v, Vec2::new(5.0, 0.0)), v);
    }

    #[test]
    fn test_centroid() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        assert_eq!(centroid(&square), Vec2::new(1.0, 1.0));
        assert_eq!(centroid(&[]), Vec2::ZERO);
    }

    #[test]
    fn test_edge_normal_is_perpendicular() {
        let edge = Vec2::new(3.0, 4.0);
        assert_eq!(edge_normal(edge).dot(edge), 0.0);
        assert_eq!(edge_normal(Vec2::new(2.0, 0.0)), Vec2::new(0.0, -2.0));
    }
}
