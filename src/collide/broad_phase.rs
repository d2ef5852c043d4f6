//! Broad-phase grouping
//!
//! The narrow phase consumes candidate groups: each group is built around one
//! collider (its first element) and lists the colliders that might touch it.
//! A caller's own broad phase can supply the groups directly; `from_bounds`
//! builds them by brute force from bounding circles.

use serde::{Deserialize, Serialize};

use super::collider::{Collider, ColliderId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadPhase {
    groups: Vec<Vec<ColliderId>>,
}

impl BroadPhase {
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    pub fn from_groups(groups: Vec<Vec<ColliderId>>) -> Self {
        Self { groups }
    }

    /// Group every collider with the colliders whose bounding circles reach it
    ///
    /// Isolated colliders get no group.
    pub fn from_bounds<'a>(colliders: impl IntoIterator<Item = &'a Collider>) -> Self {
        let bounds: Vec<_> = colliders
            .into_iter()
            .map(|c| (c.id(), c.position(), c.shape().bounding_radius()))
            .collect();

        let mut groups = Vec::new();
        for &(id, pos, radius) in &bounds {
            let mut group = vec![id];
            group.extend(
                bounds
                    .iter()
                    .filter(|(other, other_pos, other_radius)| {
                        *other != id && pos.distance(*other_pos) <= radius + other_radius
                    })
                    .map(|(other, _, _)| *other),
            );
            if group.len() > 1 {
                groups.push(group);
            }
        }

        Self { groups }
    }

    pub fn push_group(&mut self, group: Vec<ColliderId>) {
        self.groups.push(group);
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn groups(&self) -> &[Vec<ColliderId>] {
        &self.groups
    }

    /// The group built around `id`: more than one member, `id` first
    pub fn group_for(&self, id: ColliderId) -> Option<&[ColliderId]> {
        self.groups
            .iter()
            .find(|group| group.len() > 1 && group[0] == id)
            .map(Vec::as_slice)
    }
}
