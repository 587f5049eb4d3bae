//! Entity variants and their capability lookups.
//!
//! Everything registered with a [`crate::World`] is one of these tagged
//! variants; capabilities (mineable, useable, attackable) are matches on the
//! variant rather than a class hierarchy.

use crate::mob::{Mob, MobKind};
use flatcraft_core::{Block, BlockKind, Effect, Item};
use serde::{Deserialize, Serialize};

/// Default food and health maximum for a new player.
pub const PLAYER_MAX_STAT: f32 = 20.0;

/// Which edge of the play area a boundary wall guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    /// Above the play area.
    Top,
    /// Below the play area.
    Bottom,
    /// Left of the play area.
    Left,
    /// Right of the play area.
    Right,
}

/// A free item entity wrapping exactly one item; items only merge into
/// stacks once collected into a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedItem {
    item: Item,
}

impl DroppedItem {
    /// Wrap an item for dropping into the world.
    pub fn new(item: Item) -> Self {
        Self { item }
    }

    /// The wrapped item.
    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Unwrap the item, consuming the entity.
    pub fn into_item(self) -> Item {
        self.item
    }
}

/// The player's stats; position and velocity live on the physics body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    food: f32,
    health: f32,
    max_food: f32,
    max_health: f32,
}

impl Player {
    /// New player at full food and health.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            food: PLAYER_MAX_STAT,
            health: PLAYER_MAX_STAT,
            max_food: PLAYER_MAX_STAT,
            max_health: PLAYER_MAX_STAT,
        }
    }

    /// Player name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current food.
    pub fn food(&self) -> f32 {
        self.food
    }

    /// Current health.
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Food ceiling.
    pub fn max_food(&self) -> f32 {
        self.max_food
    }

    /// Health ceiling.
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Adjust food, clamped to `[0, max]`.
    pub fn change_food(&mut self, change: f32) {
        self.food = (self.food + change).clamp(0.0, self.max_food);
    }

    /// Adjust health, clamped to `[0, max]`.
    pub fn change_health(&mut self, change: f32) {
        self.health = (self.health + change).clamp(0.0, self.max_health);
    }

    /// Whether the player has run out of health.
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Discriminant used for draw-style routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Ordinary placed block.
    Block,
    /// The staged mayhem block, drawn distinctly.
    MayhemBlock,
    /// Free dropped item.
    DroppedItem,
    /// The player.
    Player,
    /// Flying mob.
    Bird,
    /// Grazing mob.
    Sheep,
    /// Boundary wall.
    Wall,
}

/// Anything that lives in the world, attached to exactly one physics body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// Grid-aligned block.
    Block(Block),
    /// Free item with implicit quantity 1.
    DroppedItem(DroppedItem),
    /// The player.
    Player(Player),
    /// A mob.
    Mob(Mob),
    /// Boundary wall.
    Wall(WallSide),
}

impl Entity {
    /// Draw-routing discriminant for this variant.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Block(block) => match block.kind() {
                BlockKind::Mayhem { .. } => EntityKind::MayhemBlock,
                _ => EntityKind::Block,
            },
            Entity::DroppedItem(_) => EntityKind::DroppedItem,
            Entity::Player(_) => EntityKind::Player,
            Entity::Mob(mob) => match mob.kind() {
                MobKind::Bird => EntityKind::Bird,
                MobKind::Sheep => EntityKind::Sheep,
            },
            Entity::Wall(_) => EntityKind::Wall,
        }
    }

    /// Whether mining applies to this entity.
    pub fn is_mineable(&self) -> bool {
        matches!(self, Entity::Block(_))
    }

    /// Whether right-clicking this entity invokes a use policy.
    pub fn is_useable(&self) -> bool {
        matches!(self, Entity::Block(block) if block.is_useable())
    }

    /// Whether this entity can be attacked.
    pub fn is_attackable(&self) -> bool {
        matches!(self, Entity::Mob(_))
    }

    /// Use policy: an optional effect for the controller to apply.
    pub fn activate(&self) -> Option<Effect> {
        match self {
            Entity::Block(block) => block.activate(),
            _ => None,
        }
    }

    /// Borrow the block, if this is one.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Entity::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Mutably borrow the block, if this is one.
    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Entity::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Borrow the dropped item, if this is one.
    pub fn as_dropped_item(&self) -> Option<&DroppedItem> {
        match self {
            Entity::DroppedItem(dropped) => Some(dropped),
            _ => None,
        }
    }

    /// Borrow the player, if this is one.
    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Mutably borrow the player, if this is one.
    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Mutably borrow the mob, if this is one.
    pub fn as_mob_mut(&mut self) -> Option<&mut Mob> {
        match self {
            Entity::Mob(mob) => Some(mob),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatcraft_core::{create_block, create_item, ThingId};

    #[test]
    fn player_stats_clamp_to_bounds() {
        let mut player = Player::new("Allan");
        player.change_food(5.0);
        assert_eq!(player.food(), PLAYER_MAX_STAT);
        player.change_food(-100.0);
        assert_eq!(player.food(), 0.0);

        player.change_health(-25.0);
        assert_eq!(player.health(), 0.0);
        assert!(player.is_dead());
        player.change_health(3.0);
        assert!(!player.is_dead());
    }

    #[test]
    fn capabilities_follow_the_variant() {
        let dirt = Entity::Block(create_block(&ThingId::new("dirt")).unwrap());
        assert!(dirt.is_mineable());
        assert!(!dirt.is_useable());
        assert!(dirt.activate().is_none());

        let table = Entity::Block(create_block(&ThingId::new("crafting_table")).unwrap());
        assert!(table.is_useable());
        assert!(table.activate().is_some());

        let item = Entity::DroppedItem(DroppedItem::new(
            create_item(&ThingId::new("apple")).unwrap(),
        ));
        assert!(!item.is_mineable());
        assert!(!item.is_useable());

        let sheep = Entity::Mob(Mob::new(MobKind::Sheep));
        assert!(sheep.is_attackable());
    }

    #[test]
    fn draw_kinds_distinguish_staged_blocks_and_mobs() {
        let mayhem = Entity::Block(create_block(&ThingId::parse("mayhem:0").unwrap()).unwrap());
        assert_eq!(mayhem.kind(), EntityKind::MayhemBlock);

        let stone = Entity::Block(create_block(&ThingId::new("stone")).unwrap());
        assert_eq!(stone.kind(), EntityKind::Block);

        assert_eq!(Entity::Mob(Mob::new(MobKind::Bird)).kind(), EntityKind::Bird);
        assert_eq!(Entity::Wall(WallSide::Top).kind(), EntityKind::Wall);
    }
}
