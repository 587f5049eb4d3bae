//! The interaction controller: per-tick stepping, range-gated targeting,
//! mining, using, placing and item pickup.

use crate::config::GameConfig;
use crate::input::{Button, InputEvent, Key};
use crate::recipes;
use crate::render::{draw_frame, RenderRouter, RenderSink};
use crate::worldgen;
use anyhow::{bail, Result};
use flatcraft_core::{
    create_block, create_item, BenchKind, CategoryTable, Crafter, Drop, Effect, Grid, Item,
    Recipe, SelectableGrid, Stack, ThingId,
};
use flatcraft_physics::CollisionKind;
use flatcraft_world::{
    CollisionActions, CollisionEvent, CollisionHandler, EntityId, Player, World,
};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// Horizontal/vertical walk impulse per key press.
const WALK_IMPULSE: f32 = 80.0;

/// Upward jump impulse; horizontal speed is halved on jump.
const JUMP_IMPULSE: f32 = 150.0;

/// Food (or, when starved, health) consumed by mining a block.
const MINING_EXERTION: f32 = 1.0;

/// Collects dropped items into the hotbar, then the inventory; the
/// collision is rejected so collected items never bounce the player.
struct PickupHandler<'a> {
    hot_bar: &'a mut SelectableGrid,
    inventory: &'a mut Grid,
}

impl CollisionHandler for PickupHandler<'_> {
    fn begin(&mut self, event: CollisionEvent<'_>, actions: &mut CollisionActions) -> bool {
        let Some(dropped) = event.entity_b.as_dropped_item() else {
            return true;
        };
        let item = dropped.item().clone();
        if self.hot_bar.add_item(item.clone()) {
            debug!(item = %item.id(), "picked up into hotbar");
        } else if self.inventory.add_item(item.clone()) {
            debug!(item = %item.id(), "picked up into inventory");
        } else {
            debug!(item = %item.id(), "hotbar and inventory full");
            return true;
        }
        actions.remove(event.b);
        false
    }
}

/// High-level game state: the world plus the player's containers and the
/// current pointer target.
pub struct Game {
    world: World,
    player: EntityId,
    hands: Item,
    hot_bar: SelectableGrid,
    inventory: Grid,
    crafter: Option<Crafter>,
    recipes_basic: Vec<Recipe>,
    recipes_bench: Vec<Recipe>,
    categories: CategoryTable,
    router: RenderRouter,
    target: Vec2,
    target_in_range: bool,
    rng: StdRng,
}

impl Game {
    /// Build a game from configuration: generate the starting world, spawn
    /// the player with the starting containers, and load the recipe tables.
    pub fn new(config: &GameConfig) -> Result<Self> {
        let mut rng = match config.world_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut world = World::with_rng(
            config.grid_size(),
            config.cell_expanse,
            StdRng::seed_from_u64(rng.gen()),
        );
        worldgen::load_simple_world(&mut world, &mut rng)?;

        let player = world.add_player(Player::new("Allan"), Vec2::new(250.0, 150.0));
        world.watch_collisions(CollisionKind::Player, CollisionKind::Item);

        let mut hot_bar = SelectableGrid::new(1, 10);
        let starting_hotbar = [
            Stack::new(create_item(&ThingId::new("dirt"))?, 20),
            Stack::new(create_item(&ThingId::new("apple"))?, 4),
            Stack::new(create_item(&ThingId::new("crafting_table"))?, 1),
        ];
        for (column, stack) in starting_hotbar.into_iter().enumerate() {
            hot_bar.set(0, column, Some(stack))?;
        }
        hot_bar.select(0, 0)?;

        let mut inventory = Grid::new(3, 10);
        let starting_inventory = [
            ((1, 5), Stack::new(create_item(&ThingId::new("dirt"))?, 10)),
            ((0, 2), Stack::new(create_item(&ThingId::new("wood"))?, 10)),
            ((0, 0), Stack::new(create_item(&ThingId::new("coal"))?, 4)),
        ];
        for ((row, column), stack) in starting_inventory {
            inventory.set(row, column, Some(stack))?;
        }

        let recipes_basic = match &config.recipes_path {
            Some(path) => recipes::load_recipes(path)?,
            None => recipes::default_recipes_2x2()?,
        };
        let recipes_bench = recipes::default_recipes_3x3()?;
        let categories = match &config.categories_path {
            Some(path) => recipes::load_categories(path)?,
            None => recipes::default_categories(),
        };

        info!(player = %player, "game ready");
        Ok(Self {
            world,
            player,
            hands: create_item(&ThingId::new("hands"))?,
            hot_bar,
            inventory,
            crafter: None,
            recipes_basic,
            recipes_bench,
            categories,
            router: RenderRouter::standard(),
            target: Vec2::ZERO,
            target_in_range: false,
            rng,
        })
    }

    /// The simulated world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access, for the windowing shell and scenario setup.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player's hotbar.
    pub fn hot_bar(&self) -> &SelectableGrid {
        &self.hot_bar
    }

    /// The player's inventory.
    pub fn inventory(&self) -> &Grid {
        &self.inventory
    }

    /// The currently open crafting bench, if any.
    pub fn crafter_mut(&mut self) -> Option<&mut Crafter> {
        self.crafter.as_mut()
    }

    /// Close the crafting bench.
    pub fn close_crafting(&mut self) {
        self.crafter = None;
    }

    /// The player's stats.
    pub fn player(&self) -> Option<&Player> {
        self.world.entity(self.player)?.as_player()
    }

    /// Whether the current pointer target is within attack range.
    pub fn target_in_range(&self) -> bool {
        self.target_in_range
    }

    /// Whether the run is over (the player is dead).
    pub fn is_over(&self) -> bool {
        self.player().map_or(true, Player::is_dead)
    }

    /// Advance the simulation by `dt` seconds and redraw into `sink`.
    pub fn tick(&mut self, dt: f32, sink: &mut dyn RenderSink) {
        let Game {
            world,
            hot_bar,
            inventory,
            ..
        } = self;
        let mut pickup = PickupHandler { hot_bar, inventory };
        world.step(dt, &mut pickup);
        draw_frame(&self.world, &self.router, sink);
    }

    /// Dispatch one input event.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::PointerMove { x, y } => {
                self.target = Vec2::new(x, y);
                self.check_target();
            }
            InputEvent::PointerLeave => {
                self.target_in_range = false;
            }
            InputEvent::PointerClick {
                button: Button::Left,
                x,
                y,
            } => {
                self.target = Vec2::new(x, y);
                self.check_target();
                if self.target_in_range {
                    if let Some(block_id) = self.world.block_at(self.target) {
                        self.mine_block(block_id)?;
                    }
                }
            }
            InputEvent::PointerClick {
                button: Button::Right,
                x,
                y,
            } => {
                self.target = Vec2::new(x, y);
                self.check_target();
                self.use_or_place()?;
            }
            InputEvent::KeyPress(key) => match key {
                Key::MoveLeft => self.move_player(-1.0, 0.0),
                Key::MoveRight => self.move_player(1.0, 0.0),
                Key::MoveDown => self.move_player(0.0, 1.0),
                Key::Jump => self.jump(),
                Key::OpenCrafting => self.run_effect(Effect::OpenCrafting(BenchKind::Basic))?,
                Key::Digit(digit) => self.hotbar_select(digit)?,
            },
        }
        Ok(())
    }

    /// Toggle a hotbar slot from a digit key; `1..=9` map to the first nine
    /// slots and `0` to the last. Pressing the selected slot's digit again
    /// deselects it, returning the player to bare hands.
    fn hotbar_select(&mut self, digit: u8) -> Result<()> {
        let slot = if digit == 0 { 9 } else { usize::from(digit) - 1 };
        self.hot_bar.toggle_selection(0, slot)?;
        Ok(())
    }

    fn move_player(&mut self, dx: f32, dy: f32) {
        self.check_target();
        if let Some(velocity) = self.world.velocity(self.player) {
            self.world.set_velocity(
                self.player,
                velocity + Vec2::new(dx * WALK_IMPULSE, dy * WALK_IMPULSE),
            );
        }
    }

    fn jump(&mut self) {
        if let Some(velocity) = self.world.velocity(self.player) {
            self.world.set_velocity(
                self.player,
                Vec2::new(velocity.x * 0.5, velocity.y - JUMP_IMPULSE),
            );
        }
    }

    /// The selected hotbar item, falling back to bare hands on empty slots.
    fn active_item(&self) -> Item {
        self.hot_bar
            .selected_stack()
            .map(|stack| stack.item().clone())
            .unwrap_or_else(|| self.hands.clone())
    }

    /// The item that actually attacks: the active item when it can, bare
    /// hands otherwise (worn-out tools, block items, food).
    fn effective_item(&self) -> Item {
        let active = self.active_item();
        if active.can_attack() {
            active
        } else {
            self.hands.clone()
        }
    }

    /// Recompute whether the pointer target is within the active item's
    /// attack range of the player.
    fn check_target(&mut self) {
        let range = self.active_item().attack_range() * self.world.cell_expanse();
        self.target_in_range = self
            .world
            .position(self.player)
            .is_some_and(|position| position.distance(self.target) <= range);
    }

    /// Mine one hit on a block. On the mining hit: exertion is charged, the
    /// drop policy resolves exactly once, item drops spawn at jittered
    /// offsets and block drops are placed at the pointer target.
    fn mine_block(&mut self, block_id: EntityId) -> Result<()> {
        let luck: f32 = self.rng.gen();
        let effective = self.effective_item();
        let tool_id = effective.id().to_string();

        let Some(position) = self.world.position(block_id) else {
            return Ok(());
        };
        let (mined, drops) = {
            let Some(block) = self
                .world
                .entity_mut(block_id)
                .and_then(|entity| entity.as_block_mut())
            else {
                return Ok(());
            };
            let (correct_tool, mined) = block.mine(&tool_id);
            debug!(
                block = %block.id(),
                tool = %tool_id,
                hitpoints = block.hitpoints(),
                "mined"
            );
            let drops = if mined {
                block.drops(luck, correct_tool)
            } else {
                Vec::new()
            };
            (mined, drops)
        };

        // a tool wears one durability point per mined block, never per hit
        if let Some(stack) = self.hot_bar.selected_stack_mut() {
            if stack.item().can_attack() {
                stack.item_mut().attack(mined);
            }
        }

        if !mined {
            return Ok(());
        }

        self.world.remove_entity(block_id);

        // mining is tiring: food first, health once starved
        if let Some(player) = self
            .world
            .entity_mut(self.player)
            .and_then(|entity| entity.as_player_mut())
        {
            if player.food() > 0.0 {
                player.change_food(-MINING_EXERTION);
            } else {
                player.change_health(-MINING_EXERTION);
            }
        }

        let expanse = self.world.cell_expanse();
        for (index, drop) in drops.into_iter().enumerate() {
            match drop {
                Drop::Item(id) => {
                    let item = create_item(&id)?;
                    let i = index as f32;
                    let jitter_x = self.rng.gen_range(0.0..=2.0);
                    let jitter_y = self.rng.gen_range(0.0..=2.0);
                    let spawn = Vec2::new(
                        position.x - expanse / 2.0 + 5.0 + (i % 3.0) * 11.0 + jitter_x,
                        position.y - expanse / 2.0 + 5.0 + ((i / 3.0).floor() % 3.0) * 11.0
                            + jitter_y,
                    );
                    self.world.add_item(item, spawn);
                }
                Drop::Block(id) => {
                    let block = create_block(&id)?;
                    self.world.add_block(block, self.target);
                }
                Drop::Effect(effect) => {
                    bail!("block drop produced an effect {effect:?}, which has no drop handling")
                }
            }
        }
        Ok(())
    }

    /// Right-click: use the thing under the pointer, or place the selected
    /// item when the target is empty.
    fn use_or_place(&mut self) -> Result<()> {
        if let Some(target_id) = self.world.thing_at(self.target) {
            let effect = self
                .world
                .entity(target_id)
                .filter(|entity| entity.is_useable())
                .and_then(|entity| entity.activate());
            if let Some(effect) = effect {
                debug!(target = %target_id, ?effect, "used");
                self.run_effect(effect)?;
            }
            return Ok(());
        }
        self.place_selected()
    }

    /// Place the selected stack's item at the pointer target.
    fn place_selected(&mut self) -> Result<()> {
        let Some((row, column)) = self.hot_bar.selected() else {
            return Ok(());
        };
        let Some(stack) = self.hot_bar.selected_stack() else {
            return Ok(());
        };
        let drops = stack.item().place();

        // handling multiple simultaneous placement drops would be finicky
        if drops.len() > 1 {
            bail!(
                "placing {} produced {} drops; only one is supported",
                stack.item().id(),
                drops.len()
            );
        }

        match drops.into_iter().next() {
            None => self.consume_selected(row, column)?,
            Some(Drop::Block(id)) => {
                if !self.target_in_range {
                    return Ok(());
                }
                if self.world.block_at(self.target).is_some() {
                    warn!(block = %id, "target cell is already occupied");
                    return Ok(());
                }
                self.consume_selected(row, column)?;
                let block = create_block(&id)?;
                self.world.add_block(block, self.target);
            }
            Some(Drop::Effect(effect)) => {
                self.consume_selected(row, column)?;
                self.run_effect(effect)?;
            }
            Some(Drop::Item(id)) => {
                bail!("placing produced a free item drop {id}, which has no placement handling")
            }
        }
        Ok(())
    }

    /// Remove one unit from the selected stack, clearing the slot when it
    /// depletes.
    fn consume_selected(&mut self, row: usize, column: usize) -> Result<()> {
        if let Some(stack) = self.hot_bar.selected_stack_mut() {
            if stack.decrement() {
                self.hot_bar.set(row, column, None)?;
            }
        }
        Ok(())
    }

    /// Apply an effect descriptor: open a crafting bench, or adjust the
    /// player's food (spilling into health once food is full) or health.
    pub fn run_effect(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::OpenCrafting(bench) => {
                let recipes = match bench {
                    BenchKind::Basic => self.recipes_basic.clone(),
                    BenchKind::CraftingTable => self.recipes_bench.clone(),
                };
                info!(?bench, "opened crafting bench");
                self.crafter = Some(Crafter::new(bench.size(), recipes, self.categories.clone()));
            }
            Effect::Food(strength) => {
                if let Some(player) = self
                    .world
                    .entity_mut(self.player)
                    .and_then(|entity| entity.as_player_mut())
                {
                    if player.food() < player.max_food() {
                        player.change_food(strength);
                    } else {
                        player.change_health(strength);
                    }
                }
            }
            Effect::Health(strength) => {
                if let Some(player) = self
                    .world
                    .entity_mut(self.player)
                    .and_then(|entity| entity.as_player_mut())
                {
                    player.change_health(strength);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullSink;
    use flatcraft_world::GridCoord;

    fn test_game() -> Game {
        let config = GameConfig {
            world_seed: Some(7),
            ..GameConfig::default()
        };
        Game::new(&config).unwrap()
    }

    fn click(game: &mut Game, button: Button, at: Vec2) {
        game.handle_input(InputEvent::PointerClick {
            button,
            x: at.x,
            y: at.y,
        })
        .unwrap();
    }

    #[test]
    fn mining_dirt_by_hand_takes_two_hits_and_drops_one_dirt() {
        let mut game = test_game();
        // a fresh dirt block in reach of the player spawn at (250, 150)
        let coord = GridCoord::new(8, 4);
        let block = create_block(&ThingId::new("dirt")).unwrap();
        let id = game.world_mut().add_block_to_grid(block, coord);
        let centre = game.world().grid_to_xy_centre(coord);

        game.handle_input(InputEvent::PointerMove {
            x: centre.x,
            y: centre.y,
        })
        .unwrap();
        assert!(game.target_in_range());

        // the selected dirt stack cannot attack, so the hand entry
        // (0.75 s, correct) applies: 20 hp / (10 / 0.75) = 2 hits
        click(&mut game, Button::Left, centre);
        assert!(game.world().entity(id).is_some());

        click(&mut game, Button::Left, centre);
        assert!(game.world().entity(id).is_none());
        assert!(game.world().block_at(centre).is_none());

        let items = game.world().items_near(centre, game.world().cell_expanse());
        assert_eq!(items.len(), 1);
        let dropped = game.world().entity(items[0]).unwrap();
        assert_eq!(
            dropped.as_dropped_item().unwrap().item().id().to_string(),
            "dirt"
        );

        // mining one block costs one food
        assert_eq!(game.player().unwrap().food(), 19.0);
    }

    #[test]
    fn placing_dirt_consumes_the_stack_and_fills_the_cell() {
        let mut game = test_game();
        let coord = GridCoord::new(8, 4);
        let centre = game.world().grid_to_xy_centre(coord);

        game.handle_input(InputEvent::PointerMove {
            x: centre.x,
            y: centre.y,
        })
        .unwrap();
        click(&mut game, Button::Right, centre);

        assert!(game.world().block_at(centre).is_some());
        assert_eq!(game.hot_bar().get(0, 0).unwrap().quantity(), 19);

        // the cell is now occupied: a second placement is rejected
        click(&mut game, Button::Right, centre);
        assert_eq!(game.hot_bar().get(0, 0).unwrap().quantity(), 19);
    }

    #[test]
    fn eating_an_apple_with_full_food_spills_into_health() {
        let mut game = test_game();
        game.handle_input(InputEvent::KeyPress(Key::Digit(2))).unwrap();
        assert_eq!(game.hot_bar().selected(), Some((0, 1)));

        let coord = GridCoord::new(8, 4);
        let centre = game.world().grid_to_xy_centre(coord);
        game.handle_input(InputEvent::PointerMove {
            x: centre.x,
            y: centre.y,
        })
        .unwrap();
        click(&mut game, Button::Right, centre);

        // food and health were already full; the apple is still consumed
        assert_eq!(game.hot_bar().get(0, 1).unwrap().quantity(), 3);
        assert_eq!(game.player().unwrap().food(), 20.0);
        assert_eq!(game.player().unwrap().health(), 20.0);
    }

    #[test]
    fn tools_wear_one_point_per_mined_block() {
        let mut game = test_game();
        let pickaxe = create_item(&ThingId::parse("pickaxe:wood").unwrap()).unwrap();
        game.hot_bar.set(0, 3, Some(Stack::new(pickaxe, 1))).unwrap();
        game.hot_bar.select(0, 3).unwrap();

        let coord = GridCoord::new(8, 4);
        let block = create_block(&ThingId::new("stone")).unwrap();
        let id = game.world_mut().add_block_to_grid(block, coord);
        let centre = game.world().grid_to_xy_centre(coord);
        game.handle_input(InputEvent::PointerMove {
            x: centre.x,
            y: centre.y,
        })
        .unwrap();

        // stone takes ceil(20 / (10 / 1.15)) = 3 pickaxe hits; the first
        // two leave the block standing and the durability untouched
        click(&mut game, Button::Left, centre);
        click(&mut game, Button::Left, centre);
        assert!(game.world().entity(id).is_some());
        let worn = game.hot_bar.selected_stack().unwrap().item().durability();
        assert_eq!(worn, Some(60));

        click(&mut game, Button::Left, centre);
        assert!(game.world().entity(id).is_none());
        let worn = game.hot_bar.selected_stack().unwrap().item().durability();
        assert_eq!(worn, Some(59));
    }

    #[test]
    fn reselecting_the_active_slot_clears_back_to_bare_hands() {
        let mut game = test_game();
        assert_eq!(game.hot_bar().selected(), Some((0, 0)));

        game.handle_input(InputEvent::KeyPress(Key::Digit(1))).unwrap();
        assert_eq!(game.hot_bar().selected(), None);
        assert_eq!(game.active_item().id().to_string(), "hands");

        game.handle_input(InputEvent::KeyPress(Key::Digit(1))).unwrap();
        assert_eq!(game.hot_bar().selected(), Some((0, 0)));
        assert_eq!(game.active_item().id().to_string(), "dirt");
    }

    #[test]
    fn the_crafting_key_opens_a_basic_bench() {
        let mut game = test_game();
        assert!(game.crafter_mut().is_none());
        game.handle_input(InputEvent::KeyPress(Key::OpenCrafting))
            .unwrap();
        let crafter = game.crafter_mut().unwrap();
        assert_eq!(crafter.size(), 2);
        game.close_crafting();
        assert!(game.crafter_mut().is_none());
    }

    #[test]
    fn overlapping_items_are_picked_up_into_the_hotbar() {
        let mut game = test_game();
        let player_position = {
            let player = game.world().all_things().find_map(|(id, entity)| {
                entity.as_player().map(|_| id)
            });
            game.world().position(player.unwrap()).unwrap()
        };
        let item = create_item(&ThingId::new("dirt")).unwrap();
        let item_id = game.world_mut().add_item(item, player_position);

        let mut sink = NullSink::default();
        game.tick(1.0 / 60.0, &mut sink);

        assert!(game.world().entity(item_id).is_none());
        // merged into the starting dirt stack
        assert_eq!(game.hot_bar().get(0, 0).unwrap().quantity(), 21);
    }

    #[test]
    fn out_of_range_targets_are_not_mined() {
        let mut game = test_game();
        let coord = GridCoord::new(30, 14);
        let centre = game.world().grid_to_xy_centre(coord);
        let Some(block_id) = game.world().block_at(centre) else {
            panic!("expected terrain at the far corner");
        };
        let hitpoints_before = game
            .world()
            .entity(block_id)
            .and_then(|entity| entity.as_block())
            .unwrap()
            .hitpoints();

        game.handle_input(InputEvent::PointerMove {
            x: centre.x,
            y: centre.y,
        })
        .unwrap();
        assert!(!game.target_in_range());
        click(&mut game, Button::Left, centre);

        let hitpoints_after = game
            .world()
            .entity(block_id)
            .and_then(|entity| entity.as_block())
            .unwrap()
            .hitpoints();
        assert_eq!(hitpoints_before, hitpoints_after);
    }
}
