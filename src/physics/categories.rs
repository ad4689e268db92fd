//! Collision categories
//!
//! Every collider belongs to one or more categories and names the categories
//! it collides with. Both sides must accept each other for a contact to form.

use bitflags::bitflags;
use rapier3d::prelude::{Group, InteractionGroups};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Category bits assigned to colliders
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CollisionCategories: u32 {
        const ENVIRONMENT = 0x01;
        const BALL = 0x02;
        const CAMERA = 0x04;
        const FLOOR = 0x08;
        const NET = 0x10;
    }
}

impl CollisionCategories {
    /// Default collides-with mask for a collider in these categories
    pub fn default_mask(self) -> CollisionCategories {
        if self.contains(Self::BALL) {
            Self::BALL | Self::ENVIRONMENT | Self::CAMERA
        } else if self.contains(Self::CAMERA) {
            Self::BALL | Self::ENVIRONMENT
        } else {
            Self::BALL | Self::CAMERA
        }
    }

    pub fn group(self) -> Group {
        Group::from_bits_truncate(self.bits())
    }

    /// Rapier interaction groups for a collider in `self` that collides with `mask`
    pub fn interaction_groups(self, mask: CollisionCategories) -> InteractionGroups {
        InteractionGroups::new(self.group(), mask.group())
    }

    pub fn from_group(group: Group) -> Self {
        Self::from_bits_truncate(group.bits())
    }
}
