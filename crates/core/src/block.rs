//! Block definitions, break tables and the tuple-keyed block factory.

use crate::item::{BenchKind, Drop, Effect};
use crate::registry::{FactoryError, ThingId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed mining power; damage per hit is `MINING_CONSTANT / time`.
pub const MINING_CONSTANT: f32 = 10.0;

/// Hitpoints a freshly placed block starts with.
pub const DEFAULT_HITPOINTS: f32 = 20.0;

/// Chance that an unsuccessful leaf break drops an apple.
pub const APPLE_DROP_CHANCE: f32 = 0.3;

/// Number of colour stages the mayhem block cycles through.
pub const MAYHEM_STAGES: u8 = 3;

/// One break-table entry: (seconds to break, tool-is-correct).
pub type BreakEntry = (f32, bool);

/// Tool id -> break entry mapping for one block kind. Every table carries a
/// `"hand"` entry as the fallback.
pub type BreakTable = BTreeMap<String, BreakEntry>;

/// Drop policy selector for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Drops one item of its own id, but only on correct-tool breaks.
    Resource,
    /// Probabilistically drops an apple, only on unsuccessful breaks.
    Leaf,
    /// Useable bench; always drops itself.
    CraftingTable,
    /// Always drops its own next-stage block variant.
    Mayhem {
        /// Current colour stage, in `0..MAYHEM_STAGES`.
        stage: u8,
    },
}

/// A grid-aligned block with hitpoints and a break table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    id: ThingId,
    kind: BlockKind,
    break_table: BreakTable,
    hitpoints: f32,
    max_hitpoints: f32,
}

impl Block {
    /// Create a block. The break table must contain a `"hand"` entry.
    pub fn new(id: ThingId, kind: BlockKind, break_table: BreakTable, hitpoints: f32) -> Self {
        debug_assert!(break_table.contains_key("hand"));
        Self {
            id,
            kind,
            break_table,
            hitpoints,
            max_hitpoints: hitpoints,
        }
    }

    /// Block identifier.
    pub fn id(&self) -> &ThingId {
        &self.id
    }

    /// Drop policy selector.
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Remaining hitpoints; monotonically non-increasing.
    pub fn hitpoints(&self) -> f32 {
        self.hitpoints
    }

    /// Hitpoints the block started with.
    pub fn max_hitpoints(&self) -> f32 {
        self.max_hitpoints
    }

    /// Blocks are always mineable.
    pub fn is_mineable(&self) -> bool {
        true
    }

    /// Whether the block has a use policy.
    pub fn is_useable(&self) -> bool {
        matches!(self.kind, BlockKind::CraftingTable)
    }

    /// Use the block, returning the effect it produces, if any.
    pub fn activate(&self) -> Option<Effect> {
        match self.kind {
            BlockKind::CraftingTable => Some(Effect::OpenCrafting(BenchKind::CraftingTable)),
            _ => None,
        }
    }

    /// Break entry for a tool id, falling back to the `"hand"` entry for
    /// tools the table does not list.
    pub fn break_entry(&self, tool_id: &str) -> BreakEntry {
        match self.break_table.get(tool_id) {
            Some(entry) => *entry,
            // Block::new guarantees a hand entry exists.
            None => self.break_table["hand"],
        }
    }

    /// Apply one mining hit with the given tool.
    ///
    /// Returns `(correct_tool, mined)`: whether the tool was the right one
    /// for this block, and whether the block's hitpoints reached zero.
    pub fn mine(&mut self, tool_id: &str) -> (bool, bool) {
        let (time, correct_tool) = self.break_entry(tool_id);
        let damage = MINING_CONSTANT / time;
        self.hitpoints -= damage;
        (correct_tool, self.is_mined())
    }

    /// Whether the block has been mined out.
    pub fn is_mined(&self) -> bool {
        self.hitpoints <= 0.0
    }

    /// Resolve the block's drop policy.
    ///
    /// `luck` is a roll in `[0, 1)`; `correct_tool` is the break-table flag
    /// from the final hit.
    pub fn drops(&self, luck: f32, correct_tool: bool) -> Vec<Drop> {
        match self.kind {
            BlockKind::Resource => {
                if correct_tool {
                    vec![Drop::Item(self.id.clone())]
                } else {
                    Vec::new()
                }
            }
            BlockKind::Leaf => {
                if !correct_tool && luck < APPLE_DROP_CHANCE {
                    vec![Drop::Item(ThingId::new("apple"))]
                } else {
                    Vec::new()
                }
            }
            BlockKind::CraftingTable => vec![Drop::Item(self.id.clone())],
            BlockKind::Mayhem { stage } => {
                let next = (stage + 1) % MAYHEM_STAGES;
                vec![Drop::Block(
                    ThingId::from_parts(["mayhem".to_string(), next.to_string()])
                        .unwrap_or_else(|_| ThingId::new("mayhem")),
                )]
            }
        }
    }
}

/// Break tables for the standard resource blocks.
pub fn standard_break_tables() -> BTreeMap<&'static str, BreakTable> {
    let mut tables = BTreeMap::new();

    tables.insert(
        "dirt",
        BreakTable::from([
            ("hand".to_string(), (0.75, true)),
            ("wood_shovel".to_string(), (0.4, true)),
            ("stone_shovel".to_string(), (0.2, true)),
            ("iron_shovel".to_string(), (0.15, true)),
            ("diamond_shovel".to_string(), (0.1, true)),
            ("gold_shovel".to_string(), (0.1, true)),
        ]),
    );

    tables.insert(
        "wood",
        BreakTable::from([
            ("hand".to_string(), (3.0, true)),
            ("wood_axe".to_string(), (1.5, true)),
            ("stone_axe".to_string(), (0.75, true)),
            ("iron_axe".to_string(), (0.5, true)),
            ("diamond_axe".to_string(), (0.4, true)),
            ("gold_axe".to_string(), (0.25, true)),
        ]),
    );

    tables.insert(
        "stone",
        BreakTable::from([
            ("hand".to_string(), (7.5, false)),
            ("wood_pickaxe".to_string(), (1.15, true)),
            ("stone_pickaxe".to_string(), (0.6, true)),
            ("iron_pickaxe".to_string(), (0.4, true)),
            ("diamond_pickaxe".to_string(), (0.3, true)),
            ("gold_pickaxe".to_string(), (0.2, true)),
        ]),
    );

    tables
}

fn leaf_break_table() -> BreakTable {
    BreakTable::from([
        ("hand".to_string(), (0.35, false)),
        ("shears".to_string(), (0.4, true)),
        ("sword".to_string(), (0.2, false)),
    ])
}

fn crafting_table_break_table() -> BreakTable {
    BreakTable::from([("hand".to_string(), (0.35, false))])
}

fn mayhem_break_table() -> BreakTable {
    BreakTable::from([("hand".to_string(), (5.0, true))])
}

/// Create a block from its identifier tuple.
///
/// Known identifiers: `leaf`/`leaves`, `crafting_table`, the standard
/// resource blocks (`dirt`, `wood`, `stone`) and `mayhem:<stage>`.
pub fn create_block(id: &ThingId) -> Result<Block, FactoryError> {
    match id.parts() {
        [head] => match head.as_str() {
            "leaf" | "leaves" => Ok(Block::new(
                ThingId::new("leaves"),
                BlockKind::Leaf,
                leaf_break_table(),
                DEFAULT_HITPOINTS,
            )),
            "crafting_table" => Ok(Block::new(
                id.clone(),
                BlockKind::CraftingTable,
                crafting_table_break_table(),
                DEFAULT_HITPOINTS,
            )),
            head => match standard_break_tables().get(head) {
                Some(table) => Ok(Block::new(
                    id.clone(),
                    BlockKind::Resource,
                    table.clone(),
                    DEFAULT_HITPOINTS,
                )),
                None => Err(FactoryError::UnknownBlock(id.clone())),
            },
        },
        [head, stage] if head == "mayhem" => match stage.parse::<u8>() {
            Ok(stage) if stage < MAYHEM_STAGES => Ok(Block::new(
                id.clone(),
                BlockKind::Mayhem { stage },
                mayhem_break_table(),
                DEFAULT_HITPOINTS,
            )),
            _ => Err(FactoryError::UnknownBlock(id.clone())),
        },
        _ => Err(FactoryError::UnknownBlock(id.clone())),
    }
}
