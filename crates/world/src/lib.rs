#![warn(missing_docs)]
//! The simulation layer: a physics-backed registry of every live thing in
//! the game world, from grid-aligned blocks to free-falling dropped items.

pub mod entity;
pub mod mob;
pub mod world;

pub use entity::{DroppedItem, Entity, EntityKind, Player, WallSide};
pub use mob::{Mob, MobKind};
pub use world::{
    CollisionActions, CollisionEvent, CollisionHandler, EntityId, GridCoord, World, GRAVITY,
    WALL_THICKNESS,
};
