//! Collider owners
//!
//! The narrow phase only needs a handful of things from whatever owns a
//! collider: where it is, whether it is kinematic, and somewhere to put the
//! frame's results.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable handle of a collider owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// What a collider reads from, and writes to, its owner
pub trait Owner {
    fn id(&self) -> BodyId;

    /// Current world position of the owner
    fn position(&self) -> Vec2;

    /// Kinematic owners report collisions but never resolve them
    fn is_kinematic(&self) -> bool;

    /// Add `other` to this frame's collided owners (no duplicates)
    fn record_collision(&mut self, other: BodyId);

    /// Add a resolution normal to this frame's accumulated normal
    fn accumulate_normal(&mut self, normal: Vec2);

    /// Sum of this frame's resolution normals (push-out direction)
    fn collision_normal(&self) -> Vec2;

    /// Clear the collided owners and the accumulated normal
    ///
    /// Runs once per frame before any collider reports to this owner; reports
    /// only ever add.
    fn begin_frame(&mut self);
}

/// A minimal game object: position, velocity and per-frame collision output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub kinematic: bool,
    /// Owners collided with this frame
    #[serde(skip)]
    pub collided: Vec<BodyId>,
    /// Sum of resolution normals this frame (push-out direction)
    #[serde(skip)]
    pub collision_normal: Vec2,
}

impl Body {
    pub fn new(id: BodyId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            kinematic: false,
            collided: Vec::new(),
            collision_normal: Vec2::ZERO,
        }
    }

    pub fn kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    /// Advance by velocity
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Move out along the accumulated normal (kinematic bodies stay put)
    pub fn push_out(&mut self, distance: f32) {
        if !self.kinematic {
            self.pos += self.collision_normal.normalize_or_zero() * distance;
        }
    }

    pub fn has_collided_with(&self, other: BodyId) -> bool {
        self.collided.contains(&other)
    }
}

impl Owner for Body {
    fn id(&self) -> BodyId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    fn record_collision(&mut self, other: BodyId) {
        if !self.collided.contains(&other) {
            self.collided.push(other);
        }
    }

    fn accumulate_normal(&mut self, normal: Vec2) {
        self.collision_normal += normal;
    }

    fn collision_normal(&self) -> Vec2 {
        self.collision_normal
    }

    fn begin_frame(&mut self) {
        self.collided.clear();
        self.collision_normal = Vec2::ZERO;
    }
}
