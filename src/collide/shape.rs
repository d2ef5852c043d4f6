//! Convex shape geometry
//!
//! A shape is either a circle or a polygon whose vertices are stored as offsets
//! from the collider position. The variant is fixed at construction.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A convex 2D shape in collider-local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Circle centered on the collider position
    Circle { radius: f32 },
    /// Convex polygon, vertices relative to the collider position
    Polygon { offsets: Vec<Vec2> },
}

impl Shape {
    pub fn circle(radius: f32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidRadius(radius));
        }
        Ok(Shape::Circle { radius })
    }

    /// Polygon from ordered convex vertices (not re-hulled)
    pub fn polygon(offsets: Vec<Vec2>) -> Result<Self> {
        if offsets.is_empty() {
            return Err(Error::EmptyPolygon);
        }
        if let Some(i) = offsets.iter().position(|p| !p.is_finite()) {
            return Err(Error::NonFiniteVertex(i));
        }
        Ok(Shape::Polygon { offsets })
    }

    /// Axis-aligned box centered on the collider position
    pub fn rect(half_width: f32, half_height: f32) -> Result<Self> {
        Self::polygon(vec![
            Vec2::new(-half_width, -half_height),
            Vec2::new(half_width, -half_height),
            Vec2::new(half_width, half_height),
            Vec2::new(-half_width, half_height),
        ])
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`
    pub fn regular(sides: usize, radius: f32, rotation: f32) -> Result<Self> {
        let offsets = (0..sides)
            .map(|i| {
                let theta = rotation + i as f32 * std::f32::consts::TAU / sides as f32;
                Vec2::new(theta.cos(), theta.sin()) * radius
            })
            .collect();
        Self::polygon(offsets)
    }

    /// Polygon from the convex hull of an arbitrary point cloud
    pub fn convex_hull(points: &[Vec2]) -> Result<Self> {
        Self::polygon(convex_hull(points))
    }

    #[inline]
    pub fn is_circle(&self) -> bool {
        matches!(self, Shape::Circle { .. })
    }

    /// Circle radius (0 for polygons)
    #[inline]
    pub fn radius(&self) -> f32 {
        match self {
            Shape::Circle { radius } => *radius,
            Shape::Polygon { .. } => 0.0,
        }
    }

    /// Local vertex offsets (empty for circles)
    #[inline]
    pub fn offsets(&self) -> &[Vec2] {
        match self {
            Shape::Circle { .. } => &[],
            Shape::Polygon { offsets } => offsets,
        }
    }

    /// Radius of a circle around the collider position enclosing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Shape::Circle { radius } => *radius,
            Shape::Polygon { offsets } => offsets
                .iter()
                .map(|p| p.length())
                .fold(0.0, f32::max),
        }
    }
}

/// Counter-clockwise convex hull (monotone chain), collinear points dropped
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut sorted: Vec<Vec2> = points.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: Vec2, a: Vec2, b: Vec2| (a - o).perp_dot(b - o);

    let mut hull: Vec<Vec2> = Vec::with_capacity(sorted.len() * 2);
    // Lower chain
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    // Upper chain
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}
