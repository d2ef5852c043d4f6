//! Narrow-phase collision module
//!
//! Everything between "these shapes might touch" and "these owners collided":
//! - Shapes are immutable tagged variants, positioned by their owner each frame
//! - Support mapping is the only geometric primitive GJK and EPA use
//! - Stable iteration order (by collider ID)
//! - No rendering or platform dependencies

pub mod body;
pub mod broad_phase;
pub mod collider;
pub mod epa;
pub mod gjk;
pub mod shape;
pub mod support;
pub mod world;

pub use body::{Body, BodyId, Owner};
pub use broad_phase::BroadPhase;
pub use collider::{CheckContext, CheckReport, Collider, ColliderId, Contact};
pub use epa::{Penetration, epa};
pub use gjk::{GjkResult, Simplex, gjk};
pub use shape::Shape;
pub use support::{SupportMap, support};
pub use world::{CollisionWorld, StepReport};
