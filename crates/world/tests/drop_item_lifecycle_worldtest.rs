//! Worldtest: dropped item lifecycle
//!
//! Validates, through the public world API only:
//! - item spawning and gravity simulation
//! - settling onto placed blocks
//! - collection through a collision handler with deferred removal
//! - ids staying dead after removal

use flatcraft_core::{create_block, create_item, ThingId};
use flatcraft_physics::CollisionKind;
use flatcraft_world::{
    CollisionActions, CollisionEvent, CollisionHandler, EntityId, GridCoord, World,
};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct Collector {
    collected: Vec<EntityId>,
}

impl CollisionHandler for Collector {
    fn begin(&mut self, event: CollisionEvent<'_>, actions: &mut CollisionActions) -> bool {
        if event.entity_b.as_dropped_item().is_some() {
            self.collected.push(event.b);
            actions.remove(event.b);
            return false;
        }
        true
    }
}

#[test]
fn drop_item_lifecycle_worldtest() {
    let mut world = World::with_rng((16, 16), 32.0, StdRng::seed_from_u64(11));

    // a one-row floor across the bottom
    for column in 0..16 {
        let block = create_block(&ThingId::new("dirt")).expect("dirt block");
        world.add_block_to_grid(block, GridCoord::new(column, 15));
    }

    // items scattered in the air above the floor
    let mut items = Vec::new();
    for i in 0..10 {
        let item = create_item(&ThingId::new("stick")).expect("stick item");
        let position = Vec2::new(40.0 + i as f32 * 40.0, 60.0 + (i % 3) as f32 * 20.0);
        items.push(world.add_item(item, position));
    }

    // let everything fall and settle
    let mut handler = ();
    for _ in 0..600 {
        world.step(DT, &mut handler);
    }

    let floor_top = 15.0 * 32.0;
    for &id in &items {
        let position = world.position(id).expect("item still alive");
        assert!(
            position.y <= floor_top,
            "item {id} fell through the floor: {position}"
        );
        let velocity = world.velocity(id).expect("item still alive");
        assert!(
            velocity.y.abs() < 1.0,
            "item {id} still moving after settling: {velocity}"
        );
    }

    // drop the player straight down onto the item resting at x = 80
    let player = world.add_player(
        flatcraft_world::Player::new("Allan"),
        Vec2::new(80.0, 60.0),
    );
    world.watch_collisions(CollisionKind::Player, CollisionKind::Item);

    let mut collector = Collector::default();
    for _ in 0..600 {
        world.step(DT, &mut collector);
    }

    assert!(
        !collector.collected.is_empty(),
        "the falling player never touched an item"
    );
    for &id in &collector.collected {
        assert!(world.entity(id).is_none(), "collected item {id} survived");
        assert!(world.position(id).is_none());
    }

    // the player is unaffected by collection
    assert!(world.entity(player).is_some());
}
