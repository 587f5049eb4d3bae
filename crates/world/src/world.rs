//! The physics-backed entity registry.
//!
//! The world owns the simulation space and the sole mapping from physics
//! bodies back to entities; entities never hold simulation handles
//! themselves. Collision pairs of interest are registered by category and
//! surfaced to a handler as structured events.

use crate::entity::{DroppedItem, Entity, Player, WallSide};
use crate::mob::Mob;
use flatcraft_core::{Block, Item};
use flatcraft_physics::{Aabb, Body, BodyId, Categories, CollisionGate, CollisionKind, Space};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Downward gravity, in pixels per second squared.
pub const GRAVITY: Vec2 = Vec2::new(0.0, 300.0);

/// Thickness of the boundary walls surrounding the play area.
pub const WALL_THICKNESS: f32 = 50.0;

/// Integer (column, row) grid cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    /// Cell column, growing rightward.
    pub column: i32,
    /// Cell row, growing downward.
    pub row: i32,
}

impl GridCoord {
    /// Cell at (column, row).
    pub fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }
}

/// Stable handle for an entity registered with a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(BodyId);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0.raw())
    }
}

/// A collision between two watched entities, ordered to match the watched
/// pair registration.
#[derive(Debug)]
pub struct CollisionEvent<'a> {
    /// First participant.
    pub a: EntityId,
    /// Second participant.
    pub b: EntityId,
    /// First participant's entity state.
    pub entity_a: &'a Entity,
    /// Second participant's entity state.
    pub entity_b: &'a Entity,
    /// Opaque user data supplied when the pair was registered.
    pub data: u64,
}

/// Mutations a collision handler may request; applied after the physics
/// step completes, never mid-iteration.
#[derive(Debug, Default)]
pub struct CollisionActions {
    removals: Vec<EntityId>,
}

impl CollisionActions {
    /// Request removal of an entity once the step finishes.
    pub fn remove(&mut self, id: EntityId) {
        self.removals.push(id);
    }
}

/// Receiver for collision events between watched category pairs.
pub trait CollisionHandler {
    /// A watched pair has started touching. Return `false` to make the
    /// simulation ignore the physical response for this contact.
    fn begin(&mut self, event: CollisionEvent<'_>, actions: &mut CollisionActions) -> bool {
        let _ = (event, actions);
        true
    }

    /// A touching watched pair is about to be resolved this step. Return
    /// `false` to suppress the physical response for this step only.
    fn pre_solve(&mut self, event: CollisionEvent<'_>, actions: &mut CollisionActions) -> bool {
        let _ = (event, actions);
        true
    }

    /// A touching watched pair was resolved this step.
    fn post_solve(&mut self, event: CollisionEvent<'_>) {
        let _ = event;
    }

    /// A watched pair has separated.
    fn separate(&mut self, event: CollisionEvent<'_>) {
        let _ = event;
    }
}

/// Handler that watches nothing and accepts everything.
impl CollisionHandler for () {}

/// One registered category-pair watch.
#[derive(Debug, Clone, Copy)]
struct Watch {
    a: CollisionKind,
    b: CollisionKind,
    data: u64,
}

fn entity_category(entity: &Entity) -> CollisionKind {
    match entity {
        Entity::Block(_) => CollisionKind::Block,
        Entity::DroppedItem(_) => CollisionKind::Item,
        Entity::Player(_) => CollisionKind::Player,
        Entity::Mob(_) => CollisionKind::Creature,
        Entity::Wall(_) => CollisionKind::Wall,
    }
}

/// The game world: simulation space plus the body-to-entity arena.
pub struct World {
    space: Space,
    entities: BTreeMap<EntityId, Entity>,
    grid_size: (u32, u32),
    cell_expanse: f32,
    watched: Vec<Watch>,
    rng: StdRng,
}

impl World {
    /// World of `grid_size` cells, each `cell_expanse` pixels wide, bounded
    /// by four static walls just outside the play area.
    pub fn new(grid_size: (u32, u32), cell_expanse: f32) -> Self {
        Self::with_rng(grid_size, cell_expanse, StdRng::from_entropy())
    }

    /// World with a caller-supplied RNG, for deterministic runs.
    pub fn with_rng(grid_size: (u32, u32), cell_expanse: f32, rng: StdRng) -> Self {
        let mut world = Self {
            space: Space::new(GRAVITY),
            entities: BTreeMap::new(),
            grid_size,
            cell_expanse,
            watched: Vec::new(),
            rng,
        };

        let (width, height) = world.pixel_size();
        let t = WALL_THICKNESS;
        let walls = [
            (WallSide::Top, Vec2::new(width / 2.0, -t), Vec2::new(width / 2.0 + 2.0 * t, t)),
            (
                WallSide::Bottom,
                Vec2::new(width / 2.0, height + t),
                Vec2::new(width / 2.0 + 2.0 * t, t),
            ),
            (WallSide::Left, Vec2::new(-t, height / 2.0), Vec2::new(t, height / 2.0 + 2.0 * t)),
            (
                WallSide::Right,
                Vec2::new(width + t, height / 2.0),
                Vec2::new(t, height / 2.0 + 2.0 * t),
            ),
        ];
        for (side, centre, half) in walls {
            world.insert(Entity::Wall(side), Body::fixed(centre, half, CollisionKind::Wall));
        }

        info!(
            columns = grid_size.0,
            rows = grid_size.1,
            cell_expanse,
            "created world"
        );
        world
    }

    fn insert(&mut self, entity: Entity, body: Body) -> EntityId {
        let id = EntityId(self.space.add_body(body));
        debug!(%id, kind = ?entity.kind(), "added entity");
        self.entities.insert(id, entity);
        id
    }

    /// Grid dimensions in cells.
    pub fn grid_size(&self) -> (u32, u32) {
        self.grid_size
    }

    /// Width of one grid cell in pixels.
    pub fn cell_expanse(&self) -> f32 {
        self.cell_expanse
    }

    /// Play area dimensions in pixels.
    pub fn pixel_size(&self) -> (f32, f32) {
        (
            self.grid_size.0 as f32 * self.cell_expanse,
            self.grid_size.1 as f32 * self.cell_expanse,
        )
    }

    /// Grid cell containing a pixel position.
    pub fn xy_to_grid(&self, position: Vec2) -> GridCoord {
        GridCoord::new(
            (position.x / self.cell_expanse).floor() as i32,
            (position.y / self.cell_expanse).floor() as i32,
        )
    }

    /// Top-left pixel corner of a grid cell.
    pub fn grid_to_xy(&self, coord: GridCoord) -> Vec2 {
        Vec2::new(
            coord.column as f32 * self.cell_expanse,
            coord.row as f32 * self.cell_expanse,
        )
    }

    /// Pixel centre of a grid cell.
    pub fn grid_to_xy_centre(&self, coord: GridCoord) -> Vec2 {
        Vec2::new(
            (coord.column as f32 + 0.5) * self.cell_expanse,
            (coord.row as f32 + 0.5) * self.cell_expanse,
        )
    }

    /// Add the player as a dynamic body at a pixel position.
    pub fn add_player(&mut self, player: Player, position: Vec2) -> EntityId {
        let half = (self.cell_expanse * 0.4 - 2.0).floor();
        let mut body = Body::dynamic(position, Vec2::splat(half), 50.0, CollisionKind::Player);
        body.friction = 0.5;
        self.insert(Entity::Player(player), body)
    }

    /// Place a block as a static body filling a grid cell exactly.
    pub fn add_block_to_grid(&mut self, block: Block, coord: GridCoord) -> EntityId {
        let centre = self.grid_to_xy_centre(coord);
        let half = Vec2::splat(self.cell_expanse / 2.0);
        self.insert(
            Entity::Block(block),
            Body::fixed(centre, half, CollisionKind::Block),
        )
    }

    /// Place a block into whichever grid cell contains a pixel position.
    pub fn add_block(&mut self, block: Block, position: Vec2) -> EntityId {
        let coord = self.xy_to_grid(position);
        self.add_block_to_grid(block, coord)
    }

    /// Drop an item as a small dynamic body at a pixel position.
    pub fn add_item(&mut self, item: Item, position: Vec2) -> EntityId {
        let body = Body::dynamic(position, Vec2::splat(4.0), 2.0, CollisionKind::Item);
        self.insert(Entity::DroppedItem(DroppedItem::new(item)), body)
    }

    /// Spawn a mob as a dynamic body at a pixel position.
    pub fn add_mob(&mut self, mob: Mob, position: Vec2) -> EntityId {
        let body = Body::dynamic(position, Vec2::new(16.0, 8.0), 20.0, CollisionKind::Creature);
        self.insert(Entity::Mob(mob), body)
    }

    /// Remove an entity, fully detaching its body from the space.
    /// Subsequent queries never return the removed id.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.space.remove_body(id.0);
        let entity = self.entities.remove(&id);
        if entity.is_some() {
            debug!(%id, "removed entity");
        }
        entity
    }

    /// Borrow an entity.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutably borrow an entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Every live entity, in id order.
    pub fn all_things(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    /// Pixel position of an entity's body centre.
    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        self.space.body(id.0).map(|body| body.position)
    }

    /// Velocity of an entity's body.
    pub fn velocity(&self, id: EntityId) -> Option<Vec2> {
        self.space.body(id.0).map(|body| body.velocity)
    }

    /// Overwrite the velocity of an entity's body; ignored for removed ids.
    pub fn set_velocity(&mut self, id: EntityId, velocity: Vec2) {
        if let Some(body) = self.space.body_mut(id.0) {
            body.velocity = velocity;
        }
    }

    /// Bounding box of an entity's body, for drawing.
    pub fn bounds(&self, id: EntityId) -> Option<Aabb> {
        self.space.body(id.0).map(|body| body.aabb())
    }

    /// The block at a pixel position, if any.
    pub fn block_at(&self, position: Vec2) -> Option<EntityId> {
        self.space
            .point_query(position, 0.0, Categories::BLOCK)
            .first()
            .map(|id| EntityId(*id))
    }

    /// The nearest entity of any category except walls at a pixel position.
    pub fn thing_at(&self, position: Vec2) -> Option<EntityId> {
        self.space
            .point_query(position, 0.0, Categories::ALL & !Categories::WALL)
            .first()
            .map(|id| EntityId(*id))
    }

    /// Dropped items within `max_distance` of a point, nearest first.
    pub fn items_near(&self, position: Vec2, max_distance: f32) -> Vec<EntityId> {
        self.space
            .point_query(position, max_distance, Categories::ITEM)
            .into_iter()
            .map(EntityId)
            .collect()
    }

    /// Creatures within `max_distance` of a point, nearest first.
    pub fn creatures_near(&self, position: Vec2, max_distance: f32) -> Vec<EntityId> {
        self.space
            .point_query(position, max_distance, Categories::CREATURE)
            .into_iter()
            .map(EntityId)
            .collect()
    }

    /// Watch collisions between two categories; touching pairs of these
    /// categories are surfaced to the step handler as events, ordered to
    /// match this registration.
    pub fn watch_collisions(&mut self, a: CollisionKind, b: CollisionKind) {
        self.watch_collisions_with(a, b, 0);
    }

    /// Like [`World::watch_collisions`], tagging every event for this pair
    /// with opaque user data the handler can dispatch on.
    pub fn watch_collisions_with(&mut self, a: CollisionKind, b: CollisionKind, data: u64) {
        self.watched.push(Watch { a, b, data });
    }

    /// Advance the world by `dt` seconds.
    ///
    /// Runs each mob's wander policy, then the physics step (dispatching
    /// watched collision events to `handler`), then any removals the
    /// handler requested.
    pub fn step(&mut self, dt: f32, handler: &mut dyn CollisionHandler) {
        let World {
            space,
            entities,
            watched,
            rng,
            ..
        } = self;

        for (id, entity) in entities.iter_mut() {
            if let Entity::Mob(mob) = entity {
                if let Some(impulse) = mob.wander(rng) {
                    if let Some(body) = space.body_mut(id.0) {
                        body.velocity += impulse;
                    }
                }
            }
        }

        let mut gate = EventGate {
            entities,
            watched,
            handler,
            actions: CollisionActions::default(),
        };
        space.step(dt, &mut gate);

        let removals = gate.actions.removals;
        for id in removals {
            self.remove_entity(id);
        }
    }
}

/// Adapts raw contact callbacks into entity-level events for watched pairs.
struct EventGate<'a> {
    entities: &'a BTreeMap<EntityId, Entity>,
    watched: &'a [Watch],
    handler: &'a mut dyn CollisionHandler,
    actions: CollisionActions,
}

/// Event for a watched body pair, ordered per the first matching
/// registration; `None` when the pair is unwatched or either entity is gone.
fn event_for<'a>(
    entities: &'a BTreeMap<EntityId, Entity>,
    watched: &[Watch],
    a: BodyId,
    b: BodyId,
) -> Option<CollisionEvent<'a>> {
    let id_a = EntityId(a);
    let id_b = EntityId(b);
    let entity_a = entities.get(&id_a)?;
    let entity_b = entities.get(&id_b)?;
    let kinds = (entity_category(entity_a), entity_category(entity_b));

    watched.iter().find_map(|watch| {
        if (watch.a, watch.b) == kinds {
            Some(CollisionEvent {
                a: id_a,
                b: id_b,
                entity_a,
                entity_b,
                data: watch.data,
            })
        } else if (watch.b, watch.a) == kinds {
            Some(CollisionEvent {
                a: id_b,
                b: id_a,
                entity_a: entity_b,
                entity_b: entity_a,
                data: watch.data,
            })
        } else {
            None
        }
    })
}

impl CollisionGate for EventGate<'_> {
    fn begin(&mut self, a: BodyId, b: BodyId) -> bool {
        let Some(event) = event_for(self.entities, self.watched, a, b) else {
            return true;
        };
        // the handler may not touch the space mid-step; removals are queued
        let mut actions = CollisionActions::default();
        let accept = self.handler.begin(event, &mut actions);
        self.actions.removals.extend(actions.removals);
        accept
    }

    fn pre_solve(&mut self, a: BodyId, b: BodyId) -> bool {
        let Some(event) = event_for(self.entities, self.watched, a, b) else {
            return true;
        };
        let mut actions = CollisionActions::default();
        let accept = self.handler.pre_solve(event, &mut actions);
        self.actions.removals.extend(actions.removals);
        accept
    }

    fn post_solve(&mut self, a: BodyId, b: BodyId) {
        if let Some(event) = event_for(self.entities, self.watched, a, b) {
            self.handler.post_solve(event);
        }
    }

    fn separate(&mut self, a: BodyId, b: BodyId) {
        if let Some(event) = event_for(self.entities, self.watched, a, b) {
            self.handler.separate(event);
        }
    }
}
