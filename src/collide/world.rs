//! Per-frame collision driver
//!
//! Owns bodies and colliders and runs one narrow-phase frame:
//! owner reset -> collider update -> mesh refresh -> grouping -> check -> apply.
//! Every check in a frame sees the same snapshot, so collider order never
//! changes the outcome.

use std::collections::BTreeMap;

use glam::Vec2;

use super::body::{Body, BodyId, Owner};
use super::broad_phase::BroadPhase;
use super::collider::{CheckContext, CheckReport, Collider, ColliderId};
use super::shape::Shape;
use crate::error::{Error, Result};
use crate::settings::{BroadPhaseMode, CollisionSettings};

/// Summary of one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub frame: u64,
    /// Pairwise narrow-phase tests run
    pub tested: usize,
    /// Tests that found an overlap
    pub contacts: usize,
    /// Overlaps that produced a resolution normal
    pub resolved: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    pub settings: CollisionSettings,
    bodies: BTreeMap<BodyId, Body>,
    colliders: BTreeMap<ColliderId, Collider>,
    broad_phase: BroadPhase,
    next_body_id: u32,
    next_collider_id: u32,
    frame: u64,
}

impl CollisionWorld {
    pub fn new(settings: CollisionSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn spawn_body(&mut self, pos: Vec2) -> BodyId {
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        self.bodies.insert(id, Body::new(id, pos));
        id
    }

    pub fn spawn_kinematic(&mut self, pos: Vec2) -> BodyId {
        let id = self.spawn_body(pos);
        if let Some(body) = self.bodies.get_mut(&id) {
            body.kinematic = true;
        }
        id
    }

    /// Attach a shape to `body` and bind it (`on_create`)
    pub fn attach(&mut self, body: BodyId, shape: Shape, offset: Vec2, trigger: bool) -> Result<ColliderId> {
        let owner = self.bodies.get(&body).ok_or(Error::UnknownBody(body))?;
        let id = ColliderId(self.next_collider_id);
        self.next_collider_id += 1;

        let mut collider = Collider::new(id, body, shape)
            .with_offset(offset)
            .trigger(trigger);
        collider.on_create(owner);
        self.colliders.insert(id, collider);
        Ok(id)
    }

    /// Remove a body together with its colliders
    pub fn despawn(&mut self, body: BodyId) -> Option<Body> {
        let removed = self.bodies.remove(&body)?;
        self.colliders.retain(|_, c| c.owner() != body);
        Some(removed)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.values_mut()
    }

    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(&id)
    }

    pub fn colliders(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.values()
    }

    pub fn colliders_of(&self, body: BodyId) -> impl Iterator<Item = &Collider> {
        self.colliders.values().filter(move |c| c.owner() == body)
    }

    /// Supply this frame's groups (used in `BroadPhaseMode::External`)
    pub fn set_broad_phase(&mut self, broad_phase: BroadPhase) {
        self.broad_phase = broad_phase;
    }

    pub fn broad_phase(&self) -> &BroadPhase {
        &self.broad_phase
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run one narrow-phase frame
    pub fn step(&mut self) -> StepReport {
        self.frame += 1;

        for body in self.bodies.values_mut() {
            body.begin_frame();
        }

        for collider in self.colliders.values_mut() {
            match self.bodies.get(&collider.owner()) {
                Some(owner) => collider.update(owner),
                None => log::warn!("{:?} has no owner {:?}", collider.id(), collider.owner()),
            }
            collider.refresh_mesh();
        }

        if self.settings.broad_phase == BroadPhaseMode::Bounds {
            self.broad_phase = BroadPhase::from_bounds(self.colliders.values());
        }

        let ctx = CheckContext {
            broad_phase: &self.broad_phase,
            colliders: &self.colliders,
            settings: &self.settings,
        };
        let reports: Vec<(ColliderId, CheckReport)> = self
            .colliders
            .values()
            .filter_map(|collider| {
                let owner = self.bodies.get(&collider.owner())?;
                Some((collider.id(), collider.check(&ctx, owner)))
            })
            .collect();

        let mut summary = StepReport {
            frame: self.frame,
            ..Default::default()
        };
        for (id, report) in &reports {
            summary.tested += report.tested;
            summary.contacts += report.collided.len();
            summary.resolved += report.resolutions.len();

            let Some(collider) = self.colliders.get_mut(id) else {
                continue;
            };
            collider.apply_report(report);
            if let Some(owner) = self.bodies.get_mut(&collider.owner()) {
                report.apply_to(owner);
            }
        }

        log::debug!(
            "Frame {}: {} tests, {} contacts, {} resolved",
            summary.frame,
            summary.tested,
            summary.contacts,
            summary.resolved
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Shape {
        Shape::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
        .unwrap()
    }

    fn circle(radius: f32) -> Shape {
        Shape::circle(radius).unwrap()
    }

    #[test]
    fn test_overlapping_circles_collide_and_push_apart() {
        let mut world = CollisionWorld::default();
        let a = world.spawn_body(Vec2::ZERO);
        let b = world.spawn_body(Vec2::new(1.5, 0.0));
        world.attach(a, circle(1.0), Vec2::ZERO, false).unwrap();
        world.attach(b, circle(1.0), Vec2::ZERO, false).unwrap();

        let summary = world.step();
        assert_eq!(summary.tested, 2);
        assert_eq!(summary.resolved, 2);

        let body_a = world.body(a).unwrap();
        let body_b = world.body(b).unwrap();
        assert_eq!(body_a.collided, vec![b]);
        assert_eq!(body_b.collided, vec![a]);
        assert!(body_a.collision_normal.x < -0.99);
        assert!(body_b.collision_normal.x > 0.99);
    }

    #[test]
    fn test_offset_squares_converge_to_x_axis() {
        let mut world = CollisionWorld::default();
        let a = world.spawn_body(Vec2::ZERO);
        let b = world.spawn_body(Vec2::new(0.5, 0.0));
        world.attach(a, unit_square(), Vec2::ZERO, false).unwrap();
        world.attach(b, unit_square(), Vec2::ZERO, false).unwrap();
        world.step();

        let na = world.body(a).unwrap().collision_normal;
        let nb = world.body(b).unwrap().collision_normal;
        assert!((na - Vec2::new(-1.0, 0.0)).length() < 0.1, "{:?}", na);
        assert!((nb - Vec2::new(1.0, 0.0)).length() < 0.1, "{:?}", nb);
    }

    #[test]
    fn test_trigger_reports_both_sides_without_normals() {
        let mut world = CollisionWorld::default();
        let a = world.spawn_body(Vec2::ZERO);
        let b = world.spawn_body(Vec2::new(1.5, 0.0));
        let ca = world.attach(a, circle(1.0), Vec2::ZERO, true).unwrap();
        let cb = world.attach(b, circle(1.0), Vec2::ZERO, false).unwrap();
        world.step();

        assert_eq!(world.body(a).unwrap().collided, vec![b]);
        assert_eq!(world.body(b).unwrap().collided, vec![a]);
        assert_eq!(world.body(a).unwrap().collision_normal, Vec2::ZERO);
        assert_eq!(world.body(b).unwrap().collision_normal, Vec2::ZERO);
        assert!(world.collider(ca).unwrap().triggered());
        assert!(world.collider(cb).unwrap().triggered());
    }

    #[test]
    fn test_kinematic_owner_keeps_its_normal() {
        let mut world = CollisionWorld::default();
        let a = world.spawn_kinematic(Vec2::ZERO);
        let b = world.spawn_body(Vec2::new(1.5, 0.0));
        world.attach(a, circle(1.0), Vec2::ZERO, false).unwrap();
        world.attach(b, circle(1.0), Vec2::ZERO, false).unwrap();
        world.step();

        let body_a = world.body(a).unwrap();
        assert_eq!(body_a.collided, vec![b]);
        assert_eq!(body_a.collision_normal, Vec2::ZERO);
        // The dynamic side still resolves
        assert!(world.body(b).unwrap().collision_normal.x > 0.99);
    }

    #[test]
    fn test_never_collides_with_itself() {
        let mut world = CollisionWorld::new(CollisionSettings {
            broad_phase: BroadPhaseMode::External,
            ..Default::default()
        });
        let a = world.spawn_body(Vec2::ZERO);
        let ca = world.attach(a, circle(1.0), Vec2::ZERO, false).unwrap();
        world.set_broad_phase(BroadPhase::from_groups(vec![vec![ca, ca]]));

        let summary = world.step();
        assert_eq!(summary.tested, 0);
        assert!(world.body(a).unwrap().collided.is_empty());
    }

    #[test]
    fn test_external_groups_are_used_as_given() {
        let mut world = CollisionWorld::new(CollisionSettings {
            broad_phase: BroadPhaseMode::External,
            ..Default::default()
        });
        let a = world.spawn_body(Vec2::ZERO);
        let b = world.spawn_body(Vec2::new(1.5, 0.0));
        let ca = world.attach(a, circle(1.0), Vec2::ZERO, false).unwrap();
        let cb = world.attach(b, circle(1.0), Vec2::ZERO, false).unwrap();

        // Only A's group is supplied: B runs no tests
        world.set_broad_phase(BroadPhase::from_groups(vec![vec![ca, cb]]));
        world.step();
        assert_eq!(world.body(a).unwrap().collided, vec![b]);
        assert!(world.body(b).unwrap().collided.is_empty());
        assert_eq!(world.collider(cb).unwrap().collided(), &[] as &[BodyId]);
    }

    #[test]
    fn test_collided_list_is_rebuilt_each_frame() {
        let mut world = CollisionWorld::default();
        let a = world.spawn_body(Vec2::ZERO);
        let b = world.spawn_body(Vec2::new(1.5, 0.0));
        world.attach(a, circle(1.0), Vec2::ZERO, false).unwrap();
        world.attach(b, circle(1.0), Vec2::ZERO, false).unwrap();

        world.step();
        assert_eq!(world.body(a).unwrap().collided, vec![b]);

        world.body_mut(b).unwrap().pos = Vec2::new(5.0, 0.0);
        let summary = world.step();
        assert_eq!(summary.frame, 2);
        assert!(world.body(a).unwrap().collided.is_empty());
        assert_eq!(world.body(a).unwrap().collision_normal, Vec2::ZERO);
    }

    #[test]
    fn test_multiple_colliders_accumulate_on_one_owner() {
        let mut world = CollisionWorld::default();
        let a = world.spawn_body(Vec2::ZERO);
        let left = world.spawn_body(Vec2::new(-1.5, 0.0));
        let right = world.spawn_body(Vec2::new(1.5, 0.0));
        // Two colliders on A, one reaching each neighbour
        world.attach(a, circle(0.5), Vec2::new(-0.5, 0.0), false).unwrap();
        world.attach(a, circle(0.5), Vec2::new(0.5, 0.0), false).unwrap();
        world.attach(left, circle(0.75), Vec2::ZERO, false).unwrap();
        world.attach(right, circle(0.75), Vec2::ZERO, false).unwrap();
        world.step();

        let body_a = world.body(a).unwrap();
        assert!(body_a.has_collided_with(left));
        assert!(body_a.has_collided_with(right));
        // Opposite pushes roughly cancel out
        assert!(body_a.collision_normal.length() < 0.2, "{:?}", body_a.collision_normal);
    }

    #[test]
    fn test_attach_to_unknown_body_fails() {
        let mut world = CollisionWorld::default();
        let err = world.attach(BodyId(42), circle(1.0), Vec2::ZERO, false);
        assert!(matches!(err, Err(Error::UnknownBody(BodyId(42)))));
    }

    #[test]
    fn test_despawn_drops_colliders() {
        let mut world = CollisionWorld::default();
        let a = world.spawn_body(Vec2::ZERO);
        let b = world.spawn_body(Vec2::new(1.5, 0.0));
        world.attach(a, circle(1.0), Vec2::ZERO, false).unwrap();
        world.attach(a, unit_square(), Vec2::ZERO, false).unwrap();
        world.attach(b, circle(1.0), Vec2::ZERO, false).unwrap();

        assert!(world.despawn(a).is_some());
        assert_eq!(world.colliders_of(a).count(), 0);
        assert_eq!(world.colliders().count(), 1);

        world.step();
        assert!(world.body(b).unwrap().collided.is_empty());
        assert!(world.despawn(a).is_none());
    }

    #[test]
    fn test_collider_follows_owner_with_offset() {
        let mut world = CollisionWorld::default();
        let a = world.spawn_body(Vec2::ZERO);
        let ca = world.attach(a, unit_square(), Vec2::new(2.0, 0.0), false).unwrap();

        world.body_mut(a).unwrap().pos = Vec2::new(1.0, 1.0);
        world.step();
        let collider = world.collider(ca).unwrap();
        assert_eq!(collider.position(), Vec2::new(3.0, 1.0));
        assert_eq!(collider.world_points()[0], Vec2::new(3.0, 1.0));
    }
}
