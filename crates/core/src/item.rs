//! Item definitions and the tuple-keyed item factory.
//!
//! Items are tagged variants rather than a class hierarchy: the [`ItemKind`]
//! carries the per-variant state (tool durability, food strength) and the
//! capability checks are lookups on it.

use crate::registry::{FactoryError, ThingId};
use serde::{Deserialize, Serialize};

/// Default maximum stack size for stackable items.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// Default attack range, in grid cells.
pub const DEFAULT_ATTACK_RANGE: f32 = 10.0;

/// Durability per tool material.
pub const TOOL_DURABILITIES: [(&str, u32); 5] = [
    ("wood", 60),
    ("stone", 132),
    ("iron", 251),
    ("gold", 33),
    ("diamond", 1562),
];

/// Tool types that exist for every material.
pub const MATERIAL_TOOL_TYPES: [&str; 5] = ["axe", "shovel", "hoe", "pickaxe", "sword"];

/// Food strength restored by an apple.
pub const APPLE_STRENGTH: f32 = 2.0;

/// Which crafting bench an effect asks to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchKind {
    /// The player's built-in 2x2 bench.
    Basic,
    /// A placed crafting table's 3x3 bench.
    CraftingTable,
}

impl BenchKind {
    /// Side length of the bench grid.
    pub fn size(self) -> usize {
        match self {
            BenchKind::Basic => 2,
            BenchKind::CraftingTable => 3,
        }
    }
}

/// An effect descriptor produced by using or placing something.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Request to open a crafting menu.
    OpenCrafting(BenchKind),
    /// Food delta (spills into health when food is already full).
    Food(f32),
    /// Health delta.
    Health(f32),
}

/// A (category, payload) pair produced by mining or placing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Drop {
    /// Spawn a free dropped-item entity.
    Item(ThingId),
    /// Place a new block.
    Block(ThingId),
    /// Apply an effect to the player.
    Effect(Effect),
}

/// Per-variant item state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Plain material (stick, coal, ...); cannot attack or place.
    Simple,
    /// The player's bare hands; always able to attack, never depletes.
    Hand,
    /// Places a block form of itself.
    Block,
    /// Consumable restoring food (or health when food is full).
    Food {
        /// Stat points restored on consumption.
        strength: f32,
    },
    /// Tool with finite durability; durability 0 disables attacking.
    Tool {
        /// Tool family (axe, pickaxe, ...).
        tool_type: String,
        /// Remaining uses; decremented on successful attacks.
        durability: u32,
    },
}

/// An item definition plus its mutable tool state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ThingId,
    kind: ItemKind,
    max_stack_size: u32,
    attack_range: f32,
}

impl Item {
    /// Plain stackable item.
    pub fn simple(id: ThingId) -> Self {
        Self {
            id,
            kind: ItemKind::Simple,
            max_stack_size: DEFAULT_MAX_STACK,
            attack_range: DEFAULT_ATTACK_RANGE,
        }
    }

    /// The hand pseudo-item; unstackable.
    pub fn hand() -> Self {
        Self {
            id: ThingId::new("hands"),
            kind: ItemKind::Hand,
            max_stack_size: 1,
            attack_range: DEFAULT_ATTACK_RANGE,
        }
    }

    /// Item that places a block form of itself.
    pub fn block(id: ThingId) -> Self {
        Self {
            id,
            kind: ItemKind::Block,
            max_stack_size: DEFAULT_MAX_STACK,
            attack_range: DEFAULT_ATTACK_RANGE,
        }
    }

    /// Consumable food item.
    pub fn food(id: ThingId, strength: f32) -> Self {
        Self {
            id,
            kind: ItemKind::Food { strength },
            max_stack_size: DEFAULT_MAX_STACK,
            attack_range: DEFAULT_ATTACK_RANGE,
        }
    }

    /// Tool item; unstackable.
    pub fn tool(id: ThingId, tool_type: &str, durability: u32) -> Self {
        Self {
            id,
            kind: ItemKind::Tool {
                tool_type: tool_type.to_string(),
                durability,
            },
            max_stack_size: 1,
            attack_range: DEFAULT_ATTACK_RANGE,
        }
    }

    /// Item identifier.
    pub fn id(&self) -> &ThingId {
        &self.id
    }

    /// Variant state.
    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Maximum quantity a single stack of this item may hold.
    pub fn max_stack_size(&self) -> u32 {
        self.max_stack_size
    }

    /// Whether more than one of this item fits in a stack.
    pub fn is_stackable(&self) -> bool {
        self.max_stack_size != 1
    }

    /// Attack range in grid cells.
    pub fn attack_range(&self) -> f32 {
        self.attack_range
    }

    /// Remaining durability, if this is a tool.
    pub fn durability(&self) -> Option<u32> {
        match &self.kind {
            ItemKind::Tool { durability, .. } => Some(*durability),
            _ => None,
        }
    }

    /// Whether this item can currently attack.
    pub fn can_attack(&self) -> bool {
        match &self.kind {
            ItemKind::Hand => true,
            ItemKind::Tool { durability, .. } => *durability > 0,
            _ => false,
        }
    }

    /// Notify the item of an attack outcome. Successful attacks wear tools
    /// down by one; hands never deplete.
    pub fn attack(&mut self, successful: bool) {
        if let ItemKind::Tool { durability, .. } = &mut self.kind {
            if successful {
                *durability = durability.saturating_sub(1);
            }
        }
    }

    /// Drops produced by placing this item. Empty when the item is not
    /// placeable.
    pub fn place(&self) -> Vec<Drop> {
        match &self.kind {
            ItemKind::Block => vec![Drop::Block(self.id.clone())],
            ItemKind::Food { strength } => vec![Drop::Effect(Effect::Food(*strength))],
            _ => Vec::new(),
        }
    }
}

/// Create an item from its identifier tuple.
///
/// Single-part identifiers name simple, block and food items; two-part
/// identifiers of the form `(tool_type, material)` name tools, e.g.
/// `pickaxe:stone` becomes the item `stone_pickaxe`.
pub fn create_item(id: &ThingId) -> Result<Item, FactoryError> {
    match id.parts() {
        [head] => match head.as_str() {
            "hands" => Ok(Item::hand()),
            "dirt" | "stone" | "wood" | "crafting_table" => Ok(Item::block(id.clone())),
            "apple" => Ok(Item::food(id.clone(), APPLE_STRENGTH)),
            "stick" | "coal" | "torch" | "wool" | "feather" => Ok(Item::simple(id.clone())),
            _ => Err(FactoryError::UnknownItem(id.clone())),
        },
        [tool_type, material] => {
            let durability = TOOL_DURABILITIES
                .iter()
                .find(|(name, _)| name == material)
                .map(|(_, durability)| *durability);
            match durability {
                Some(durability)
                    if MATERIAL_TOOL_TYPES.contains(&tool_type.as_str()) =>
                {
                    let tool_id = ThingId::new(&format!("{material}_{tool_type}"));
                    Ok(Item::tool(tool_id, tool_type, durability))
                }
                _ => Err(FactoryError::UnknownItem(id.clone())),
            }
        }
        _ => Err(FactoryError::UnknownItem(id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_basic_items() {
        let dirt = create_item(&ThingId::new("dirt")).unwrap();
        assert_eq!(dirt.kind(), &ItemKind::Block);
        assert!(dirt.is_stackable());
        assert!(!dirt.can_attack());

        let stick = create_item(&ThingId::new("stick")).unwrap();
        assert_eq!(stick.kind(), &ItemKind::Simple);
        assert!(stick.place().is_empty());
    }

    #[test]
    fn creates_tools_from_two_part_ids() {
        let id = ThingId::parse("pickaxe:stone").unwrap();
        let pickaxe = create_item(&id).unwrap();
        assert_eq!(pickaxe.id().to_string(), "stone_pickaxe");
        assert_eq!(pickaxe.durability(), Some(132));
        assert!(!pickaxe.is_stackable());
    }

    #[test]
    fn unknown_items_fail() {
        assert!(matches!(
            create_item(&ThingId::new("plutonium")),
            Err(FactoryError::UnknownItem(_))
        ));
        assert!(create_item(&ThingId::parse("pickaxe:cheese").unwrap()).is_err());
        assert!(create_item(&ThingId::parse("hammer:stone").unwrap()).is_err());
    }

    #[test]
    fn tool_durability_wears_on_successful_attacks_only() {
        let mut axe = Item::tool(ThingId::new("wood_axe"), "axe", 2);
        assert!(axe.can_attack());
        axe.attack(false);
        assert_eq!(axe.durability(), Some(2));
        axe.attack(true);
        axe.attack(true);
        assert_eq!(axe.durability(), Some(0));
        assert!(!axe.can_attack());
        // further successful attacks must not underflow
        axe.attack(true);
        assert_eq!(axe.durability(), Some(0));
    }

    #[test]
    fn hands_always_attack() {
        let mut hands = Item::hand();
        assert!(hands.can_attack());
        hands.attack(true);
        assert!(hands.can_attack());
    }

    #[test]
    fn placement_drops_match_variant() {
        let dirt = create_item(&ThingId::new("dirt")).unwrap();
        assert_eq!(dirt.place(), vec![Drop::Block(ThingId::new("dirt"))]);

        let apple = create_item(&ThingId::new("apple")).unwrap();
        assert_eq!(
            apple.place(),
            vec![Drop::Effect(Effect::Food(APPLE_STRENGTH))]
        );

        let hands = Item::hand();
        assert!(hands.place().is_empty());
    }
}
