//! Render sink interface and draw-style routing.
//!
//! The routing table is resolved once at startup into a direct kind lookup;
//! the actual drawing surface is an external collaborator behind
//! [`RenderSink`].

use flatcraft_physics::Aabb;
use flatcraft_world::{EntityKind, World};
use std::collections::BTreeMap;

/// Handle to a primitive created on the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveId(pub u64);

/// Primitive shape a kind is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rectangle,
    /// Axis-aligned oval.
    Oval,
}

/// How one entity kind is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawStyle {
    /// Primitive shape.
    pub shape: Shape,
    /// Fill colour, as understood by the surface.
    pub colour: &'static str,
}

/// Draw-style lookup keyed by entity kind.
#[derive(Debug, Clone)]
pub struct RenderRouter {
    styles: BTreeMap<EntityKind, DrawStyle>,
}

impl RenderRouter {
    /// The standard routing table.
    pub fn standard() -> Self {
        let styles = BTreeMap::from([
            (
                EntityKind::Block,
                DrawStyle {
                    shape: Shape::Rectangle,
                    colour: "#552015",
                },
            ),
            (
                EntityKind::MayhemBlock,
                DrawStyle {
                    shape: Shape::Rectangle,
                    colour: "red",
                },
            ),
            (
                EntityKind::DroppedItem,
                DrawStyle {
                    shape: Shape::Rectangle,
                    colour: "yellow",
                },
            ),
            (
                EntityKind::Player,
                DrawStyle {
                    shape: Shape::Rectangle,
                    colour: "blue",
                },
            ),
            (
                EntityKind::Bird,
                DrawStyle {
                    shape: Shape::Oval,
                    colour: "black",
                },
            ),
            (
                EntityKind::Sheep,
                DrawStyle {
                    shape: Shape::Oval,
                    colour: "white",
                },
            ),
            (
                EntityKind::Wall,
                DrawStyle {
                    shape: Shape::Rectangle,
                    colour: "grey",
                },
            ),
        ]);
        Self { styles }
    }

    /// Style for a kind; the table covers every kind.
    pub fn style(&self, kind: EntityKind) -> Option<&DrawStyle> {
        self.styles.get(&kind)
    }
}

/// The drawing surface the game renders into each tick.
pub trait RenderSink {
    /// Discard the previous frame's primitives.
    fn clear(&mut self);

    /// Draw one entity, returning the primitives created for it.
    fn draw(&mut self, kind: EntityKind, style: &DrawStyle, bounds: Aabb) -> Vec<PrimitiveId>;
}

/// Sink that discards everything; used by headless runs.
#[derive(Debug, Default)]
pub struct NullSink {
    next_id: u64,
}

impl RenderSink for NullSink {
    fn clear(&mut self) {}

    fn draw(&mut self, _kind: EntityKind, _style: &DrawStyle, _bounds: Aabb) -> Vec<PrimitiveId> {
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        vec![id]
    }
}

/// Draw every live entity through the router. Returns how many entities
/// were drawn.
pub fn draw_frame(world: &World, router: &RenderRouter, sink: &mut dyn RenderSink) -> usize {
    sink.clear();
    let mut drawn = 0;
    for (id, entity) in world.all_things() {
        let kind = entity.kind();
        let (Some(style), Some(bounds)) = (router.style(kind), world.bounds(id)) else {
            continue;
        };
        sink.draw(kind, style, bounds);
        drawn += 1;
    }
    drawn
}
