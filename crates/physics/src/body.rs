//! Bodies and collision categories.

use crate::Aabb;
use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Collision category bitmask used to filter queries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Categories: u32 {
        /// Boundary walls around the playable area.
        const WALL = 1 << 1;
        /// Placed blocks.
        const BLOCK = 1 << 2;
        /// The player.
        const PLAYER = 1 << 3;
        /// Free dropped items.
        const ITEM = 1 << 4;
        /// Mobs.
        const CREATURE = 1 << 5;
        /// Every category.
        const ALL = Self::WALL.bits()
            | Self::BLOCK.bits()
            | Self::PLAYER.bits()
            | Self::ITEM.bits()
            | Self::CREATURE.bits();
    }
}

/// What family of thing a body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CollisionKind {
    /// Boundary wall.
    Wall,
    /// Placed block.
    Block,
    /// The player.
    Player,
    /// Dropped item.
    Item,
    /// Mob.
    Creature,
}

impl CollisionKind {
    /// The category bit this kind occupies.
    pub fn category(self) -> Categories {
        match self {
            CollisionKind::Wall => Categories::WALL,
            CollisionKind::Block => Categories::BLOCK,
            CollisionKind::Player => Categories::PLAYER,
            CollisionKind::Item => Categories::ITEM,
            CollisionKind::Creature => Categories::CREATURE,
        }
    }
}

/// Stable handle for a body owned by a [`crate::Space`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub(crate) u64);

impl BodyId {
    /// Raw numeric value, for logging.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Whether a body moves under integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyKind {
    /// Never moves; immovable during resolution.
    Static,
    /// Integrated each step.
    Dynamic {
        /// Mass in arbitrary units; only relative magnitude matters.
        mass: f32,
    },
}

/// A rectangular rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Centre position.
    pub position: Vec2,
    /// Linear velocity; ignored for static bodies.
    pub velocity: Vec2,
    /// Half extents of the collision box.
    pub half_extents: Vec2,
    /// Tangential velocity retained on contact, in `0.0..=1.0`.
    pub friction: f32,
    /// Static or dynamic.
    pub kind: BodyKind,
    /// Category for collision filtering.
    pub collision: CollisionKind,
}

impl Body {
    /// Immovable body.
    pub fn fixed(position: Vec2, half_extents: Vec2, collision: CollisionKind) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            half_extents,
            friction: 1.0,
            kind: BodyKind::Static,
            collision,
        }
    }

    /// Body integrated under gravity.
    pub fn dynamic(position: Vec2, half_extents: Vec2, mass: f32, collision: CollisionKind) -> Self {
        debug_assert!(mass > 0.0);
        Self {
            position,
            velocity: Vec2::ZERO,
            half_extents,
            friction: 1.0,
            kind: BodyKind::Dynamic { mass },
            collision,
        }
    }

    /// Whether the body is integrated each step.
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, BodyKind::Dynamic { .. })
    }

    /// Collision box at the current position.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_centre(self.position, self.half_extents)
    }
}
