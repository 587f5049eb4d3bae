//! Built-in starting terrain: weighted dirt/stone ground, one tree, one
//! mayhem block and a bird.

use anyhow::Result;
use flatcraft_core::{create_block, ThingId};
use flatcraft_world::{GridCoord, Mob, MobKind, World};
use glam::Vec2;
use rand::distributions::WeightedIndex;
use rand::prelude::*;

/// Relative weights for ground block kinds.
const BLOCK_WEIGHTS: [(u32, &str); 2] = [(100, "dirt"), (30, "stone")];

/// Whether a cell is part of the starting terrain: a flat plain on the
/// left rising into a slope on the right.
fn is_ground(column: u32, row: u32) -> bool {
    if column < 22 {
        row > 8
    } else {
        column + row >= 30
    }
}

/// Fill a fresh world with the starting terrain.
pub fn load_simple_world<R: Rng>(world: &mut World, rng: &mut R) -> Result<()> {
    let (columns, rows) = world.grid_size();

    let weights = WeightedIndex::new(BLOCK_WEIGHTS.iter().map(|(weight, _)| *weight))?;
    for column in 0..columns {
        for row in 0..rows {
            if !is_ground(column, row) {
                continue;
            }
            let (_, kind) = BLOCK_WEIGHTS[weights.sample(rng)];
            let block = create_block(&ThingId::new(kind))?;
            world.add_block_to_grid(block, GridCoord::new(column as i32, row as i32));
        }
    }

    // a single tree: trunk plus a 3x3 leaf canopy
    for row in 5..=8 {
        let trunk = create_block(&ThingId::new("wood"))?;
        world.add_block_to_grid(trunk, GridCoord::new(3, row));
    }
    for column in 2..=4 {
        for row in 2..=4 {
            let leaf = create_block(&ThingId::new("leaf"))?;
            world.add_block_to_grid(leaf, GridCoord::new(column, row));
        }
    }

    let mayhem = create_block(&ThingId::parse("mayhem:0")?)?;
    world.add_block_to_grid(mayhem, GridCoord::new(14, 8));

    world.add_mob(Mob::new(MobKind::Bird), Vec2::new(400.0, 100.0));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatcraft_core::BlockKind;
    use flatcraft_world::Entity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generated_world() -> World {
        let mut world = World::with_rng((32, 16), 32.0, StdRng::seed_from_u64(1));
        let mut rng = StdRng::seed_from_u64(2);
        load_simple_world(&mut world, &mut rng).unwrap();
        world
    }

    #[test]
    fn terrain_shape_matches_the_plain_and_slope() {
        assert!(!is_ground(0, 0));
        assert!(!is_ground(0, 8));
        assert!(is_ground(0, 9));
        assert!(is_ground(22, 8));
        assert!(!is_ground(25, 4));
        assert!(is_ground(25, 5));
    }

    #[test]
    fn ground_cells_hold_resource_blocks() {
        let world = generated_world();
        let centre = world.grid_to_xy_centre(GridCoord::new(0, 9));
        let id = world.block_at(centre).expect("ground block");
        let Some(Entity::Block(block)) = world.entity(id) else {
            panic!("not a block");
        };
        let name = block.id().to_string();
        assert!(name == "dirt" || name == "stone");

        // the sky is empty
        let sky = world.grid_to_xy_centre(GridCoord::new(10, 2));
        assert!(world.block_at(sky).is_none());
    }

    #[test]
    fn the_mayhem_block_and_bird_are_placed() {
        let world = generated_world();
        let centre = world.grid_to_xy_centre(GridCoord::new(14, 8));
        let id = world.block_at(centre).expect("mayhem block");
        let Some(Entity::Block(block)) = world.entity(id) else {
            panic!("not a block");
        };
        assert!(matches!(block.kind(), BlockKind::Mayhem { stage: 0 }));

        let birds = world
            .all_things()
            .filter(|(_, entity)| matches!(entity, Entity::Mob(mob) if mob.kind() == MobKind::Bird))
            .count();
        assert_eq!(birds, 1);
    }
}
