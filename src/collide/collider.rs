//! Collision records
//!
//! A collider is a shape attached to an owner at a fixed offset. Each frame it
//! is moved with its owner (`update`), its world mesh is rebuilt
//! (`refresh_mesh`), and it is tested against its broad-phase group (`check`).

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyId, Owner};
use super::broad_phase::BroadPhase;
use super::epa::{Penetration, epa};
use super::gjk::{GjkResult, gjk};
use super::shape::Shape;
use super::support::{SupportMap, circle_support, polygon_support};
use crate::settings::CollisionSettings;

/// Stable handle of a collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

/// Outcome of one pairwise narrow-phase test
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    Separated,
    /// Overlap that is reported but not resolved (trigger or kinematic)
    Touching,
    /// Overlap with a penetration normal for the testing collider's owner
    Resolved(Penetration),
}

impl Contact {
    #[inline]
    pub fn is_hit(&self) -> bool {
        !matches!(self, Contact::Separated)
    }
}

/// Everything `check` reads besides the collider itself
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub broad_phase: &'a BroadPhase,
    pub colliders: &'a BTreeMap<ColliderId, Collider>,
    pub settings: &'a CollisionSettings,
}

/// Result of one collider's narrow-phase pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    /// Owners hit this frame, in test order, no duplicates
    pub collided: Vec<BodyId>,
    /// One entry per resolved collision
    pub resolutions: Vec<Penetration>,
    /// A trigger (on either side) reported an overlap
    pub triggered: bool,
    /// Pairwise tests run
    pub tested: usize,
}

impl CheckReport {
    /// Hand the frame's results to the owner (additive, never overwrites)
    pub fn apply_to<O: Owner + ?Sized>(&self, owner: &mut O) {
        for &other in &self.collided {
            owner.record_collision(other);
        }
        for pen in &self.resolutions {
            owner.accumulate_normal(pen.normal);
        }
    }

    /// Sum of all resolution normals
    pub fn normal(&self) -> Vec2 {
        self.resolutions.iter().map(|p| p.normal).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    id: ColliderId,
    owner: BodyId,
    shape: Shape,
    /// Fixed offset from the owner's position
    offset: Vec2,
    is_trigger: bool,

    // === Per-frame state ===
    #[serde(skip)]
    position: Vec2,
    #[serde(skip)]
    world_points: Vec<Vec2>,
    #[serde(skip)]
    collided: Vec<BodyId>,
    #[serde(skip)]
    triggered: bool,
}

impl Collider {
    pub fn new(id: ColliderId, owner: BodyId, shape: Shape) -> Self {
        Self {
            id,
            owner,
            shape,
            offset: Vec2::ZERO,
            is_trigger: false,
            position: Vec2::ZERO,
            world_points: Vec::new(),
            collided: Vec::new(),
            triggered: false,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// Bind to `owner` and build the initial world mesh
    pub fn on_create<O: Owner + ?Sized>(&mut self, owner: &O) {
        self.owner = owner.id();
        self.position = owner.position() + self.offset;
        self.world_points = self
            .shape
            .offsets()
            .iter()
            .map(|&p| p + self.position)
            .collect();
    }

    /// Follow the owner; the mesh is rebuilt separately by `refresh_mesh`
    pub fn update<O: Owner + ?Sized>(&mut self, owner: &O) {
        self.position = owner.position() + self.offset;
    }

    /// Rebuild world-space vertices from the current position
    pub fn refresh_mesh(&mut self) {
        let position = self.position;
        let offsets = self.shape.offsets();
        self.world_points.resize(offsets.len(), Vec2::ZERO);
        for (world, &local) in self.world_points.iter_mut().zip(offsets) {
            *world = local + position;
        }
    }

    /// Narrow-phase test against `other`
    ///
    /// `resolve` is false for kinematic owners. Triggers on either side never
    /// resolve.
    pub fn has_collided(&self, other: &Collider, resolve: bool, settings: &CollisionSettings) -> Contact {
        let direction = self.position - other.position;
        match gjk(self, other, direction, settings.max_gjk_iterations) {
            GjkResult::Separated { .. } => Contact::Separated,
            GjkResult::Undecided { iterations } => {
                log::debug!(
                    "GJK undecided for {:?} vs {:?} after {} iterations",
                    self.id,
                    other.id,
                    iterations
                );
                Contact::Separated
            }
            GjkResult::Intersecting { simplex, .. } => {
                if self.is_trigger || other.is_trigger || !resolve {
                    Contact::Touching
                } else {
                    let fallback = direction.normalize_or_zero();
                    Contact::Resolved(epa(simplex, self, other, fallback, settings))
                }
            }
        }
    }

    /// Test this collider against the group the broad phase built around it
    ///
    /// Index 0 of the group is this collider and is skipped, as are colliders
    /// sharing this collider's owner. Without a group nothing is tested.
    pub fn check<O: Owner + ?Sized>(&self, ctx: &CheckContext<'_>, owner: &O) -> CheckReport {
        let mut report = CheckReport::default();
        let Some(group) = ctx.broad_phase.group_for(self.id) else {
            return report;
        };

        let resolve = !owner.is_kinematic();
        for candidate in group.iter().skip(1).filter(|&&c| c != self.id) {
            let Some(other) = ctx.colliders.get(candidate) else {
                log::warn!("Broad phase group of {:?} names unknown {:?}", self.id, candidate);
                continue;
            };
            // Colliders of one owner never collide with each other
            if other.owner == self.owner {
                continue;
            }

            report.tested += 1;
            let contact = self.has_collided(other, resolve, ctx.settings);
            if !contact.is_hit() {
                continue;
            }

            if !report.collided.contains(&other.owner) {
                report.collided.push(other.owner);
            }
            if self.is_trigger || other.is_trigger {
                report.triggered = true;
            }
            if let Contact::Resolved(pen) = contact {
                report.resolutions.push(pen);
            }
        }

        report
    }

    /// Store this frame's check results (replaces the previous frame's)
    pub fn apply_report(&mut self, report: &CheckReport) {
        self.collided.clear();
        self.collided.extend_from_slice(&report.collided);
        self.triggered = report.triggered;
    }

    pub fn id(&self) -> ColliderId {
        self.id
    }

    pub fn owner(&self) -> BodyId {
        self.owner
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn world_points(&self) -> &[Vec2] {
        &self.world_points
    }

    pub fn radius(&self) -> f32 {
        self.shape.radius()
    }

    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }

    /// Owners hit during the last applied check
    pub fn collided(&self) -> &[BodyId] {
        &self.collided
    }
}

impl SupportMap for Collider {
    fn farthest_point(&self, direction: Vec2) -> Vec2 {
        match &self.shape {
            Shape::Circle { radius } => circle_support(self.position, *radius, direction),
            Shape::Polygon { .. } => {
                polygon_support(&self.world_points, direction).unwrap_or(self.position)
            }
        }
    }
}
