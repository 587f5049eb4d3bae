//! The simulation space: body storage, integration, collision gating and
//! positional resolution.

use crate::body::{Body, BodyId, BodyKind, Categories};
use glam::Vec2;
use std::collections::{BTreeMap, BTreeSet};

/// Observer consulted as collisions start, persist and end.
///
/// Returning `false` from [`CollisionGate::begin`] ignores the pair until the
/// bodies separate: no physical response and no further callbacks. Returning
/// `false` from [`CollisionGate::pre_solve`] suppresses the physical response
/// for this step only.
pub trait CollisionGate {
    /// A pair of bodies has started touching.
    fn begin(&mut self, a: BodyId, b: BodyId) -> bool {
        let _ = (a, b);
        true
    }

    /// A touching pair is about to be resolved this step.
    fn pre_solve(&mut self, a: BodyId, b: BodyId) -> bool {
        let _ = (a, b);
        true
    }

    /// A touching pair was resolved this step.
    fn post_solve(&mut self, a: BodyId, b: BodyId) {
        let _ = (a, b);
    }

    /// A previously touching pair has separated.
    fn separate(&mut self, a: BodyId, b: BodyId) {
        let _ = (a, b);
    }
}

/// Gate that accepts every collision.
impl CollisionGate for () {}

/// A stepped 2D space owning rectangular bodies.
#[derive(Debug)]
pub struct Space {
    bodies: BTreeMap<BodyId, Body>,
    next_id: u64,
    gravity: Vec2,
    // pairs currently touching whose begin was accepted
    overlaps: BTreeSet<(BodyId, BodyId)>,
    // pairs whose begin was rejected; dormant until separation
    ignored: BTreeSet<(BodyId, BodyId)>,
}

impl Space {
    /// Empty space with the given gravity vector.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_id: 1,
            gravity,
            overlaps: BTreeSet::new(),
            ignored: BTreeSet::new(),
        }
    }

    /// Current gravity vector.
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Replace the gravity vector.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Insert a body and return its handle.
    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.insert(id, body);
        id
    }

    /// Remove a body, dropping any contact bookkeeping that involves it.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        self.overlaps.retain(|&(a, b)| a != id && b != id);
        self.ignored.retain(|&(a, b)| a != id && b != id);
        self.bodies.remove(&id)
    }

    /// Borrow a body.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    /// Mutably borrow a body.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    /// Iterate over every body in id order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    /// Number of bodies in the space.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the space holds no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Bodies whose box lies within `max_distance` of `point` and whose
    /// category intersects `mask`, nearest first.
    pub fn point_query(&self, point: Vec2, max_distance: f32, mask: Categories) -> Vec<BodyId> {
        let mut found: Vec<(BodyId, f32)> = self
            .bodies
            .iter()
            .filter(|(_, body)| mask.intersects(body.collision.category()))
            .map(|(id, body)| (*id, body.aabb().distance_to(point)))
            .filter(|(_, distance)| *distance <= max_distance)
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1));
        found.into_iter().map(|(id, _)| id).collect()
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Dynamic bodies are integrated under gravity, then touching pairs are
    /// reported to `gate` and, where accepted, pushed apart along the axis of
    /// least penetration.
    pub fn step(&mut self, dt: f32, gate: &mut dyn CollisionGate) {
        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            if let BodyKind::Dynamic { .. } = body.kind {
                body.velocity += gravity * dt;
                body.position += body.velocity * dt;
            }
        }

        let ids: Vec<BodyId> = self.bodies.keys().copied().collect();
        let mut touching = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let aabb_a = self.bodies[&a].aabb();
                if aabb_a.intersects(&self.bodies[&b].aabb()) {
                    touching.push((a, b));
                }
            }
        }

        let mut current = BTreeSet::new();
        for (a, b) in touching {
            current.insert((a, b));
            if self.ignored.contains(&(a, b)) {
                continue;
            }
            if !self.overlaps.contains(&(a, b)) {
                if !gate.begin(a, b) {
                    self.ignored.insert((a, b));
                    continue;
                }
                self.overlaps.insert((a, b));
            }
            if gate.pre_solve(a, b) {
                self.resolve(a, b);
                gate.post_solve(a, b);
            }
        }

        let gone: Vec<(BodyId, BodyId)> = self
            .overlaps
            .iter()
            .filter(|pair| !current.contains(pair))
            .copied()
            .collect();
        for (a, b) in gone {
            self.overlaps.remove(&(a, b));
            gate.separate(a, b);
        }
        self.ignored.retain(|pair| current.contains(pair));
    }

    /// Push a touching pair apart along the axis of least penetration and
    /// kill the velocity components driving them together.
    fn resolve(&mut self, a: BodyId, b: BodyId) {
        let (Some(body_a), Some(body_b)) = (self.bodies.get(&a), self.bodies.get(&b)) else {
            return;
        };
        let depth = body_a.aabb().penetration(&body_b.aabb());
        if depth.x <= 0.0 || depth.y <= 0.0 {
            return;
        }
        let a_dynamic = body_a.is_dynamic();
        let b_dynamic = body_b.is_dynamic();
        if !a_dynamic && !b_dynamic {
            return;
        }

        // unit vector pointing from a towards b along the shallow axis
        let offset = body_b.position - body_a.position;
        let (normal, push) = if depth.x <= depth.y {
            (Vec2::new(if offset.x >= 0.0 { 1.0 } else { -1.0 }, 0.0), depth.x)
        } else {
            (Vec2::new(0.0, if offset.y >= 0.0 { 1.0 } else { -1.0 }), depth.y)
        };
        let friction = body_a.friction * body_b.friction;
        let share = if a_dynamic && b_dynamic { 0.5 } else { 1.0 };

        if a_dynamic {
            if let Some(body) = self.bodies.get_mut(&a) {
                body.position -= normal * push * share;
                let along = body.velocity.dot(normal);
                if along > 0.0 {
                    body.velocity -= normal * along;
                    body.velocity *= friction;
                }
            }
        }
        if b_dynamic {
            if let Some(body) = self.bodies.get_mut(&b) {
                body.position += normal * push * share;
                let along = body.velocity.dot(normal);
                if along < 0.0 {
                    body.velocity -= normal * along;
                    body.velocity *= friction;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::CollisionKind;

    #[derive(Default)]
    struct Recorder {
        begins: Vec<(BodyId, BodyId)>,
        separates: Vec<(BodyId, BodyId)>,
        accept: bool,
    }

    impl CollisionGate for Recorder {
        fn begin(&mut self, a: BodyId, b: BodyId) -> bool {
            self.begins.push((a, b));
            self.accept
        }

        fn separate(&mut self, a: BodyId, b: BodyId) {
            self.separates.push((a, b));
        }
    }

    fn floor(space: &mut Space) -> BodyId {
        space.add_body(Body::fixed(
            Vec2::new(0.0, 125.0),
            Vec2::new(500.0, 25.0),
            CollisionKind::Wall,
        ))
    }

    #[test]
    fn gravity_accelerates_dynamic_bodies() {
        let mut space = Space::new(Vec2::new(0.0, 300.0));
        let id = space.add_body(Body::dynamic(
            Vec2::ZERO,
            Vec2::splat(4.0),
            2.0,
            CollisionKind::Item,
        ));
        space.step(0.5, &mut ());
        let body = space.body(id).unwrap();
        assert_eq!(body.velocity, Vec2::new(0.0, 150.0));
        assert_eq!(body.position, Vec2::new(0.0, 75.0));
    }

    #[test]
    fn static_bodies_never_move() {
        let mut space = Space::new(Vec2::new(0.0, 300.0));
        let id = floor(&mut space);
        space.step(1.0, &mut ());
        assert_eq!(space.body(id).unwrap().position, Vec2::new(0.0, 125.0));
    }

    #[test]
    fn dynamic_body_comes_to_rest_on_a_static_floor() {
        let mut space = Space::new(Vec2::new(0.0, 300.0));
        floor(&mut space);
        let item = space.add_body(Body::dynamic(
            Vec2::new(0.0, 50.0),
            Vec2::splat(4.0),
            2.0,
            CollisionKind::Item,
        ));
        for _ in 0..120 {
            space.step(1.0 / 60.0, &mut ());
        }
        let body = space.body(item).unwrap();
        // resting on top of the floor (floor top edge is y = 100)
        assert!((body.position.y - 96.0).abs() < 1.0, "y = {}", body.position.y);
        assert!(body.velocity.y.abs() < 6.0);
    }

    #[test]
    fn rejected_begin_suppresses_the_physical_response() {
        let mut space = Space::new(Vec2::new(0.0, 300.0));
        floor(&mut space);
        let item = space.add_body(Body::dynamic(
            Vec2::new(0.0, 50.0),
            Vec2::splat(4.0),
            2.0,
            CollisionKind::Item,
        ));
        let mut gate = Recorder {
            accept: false,
            ..Recorder::default()
        };
        for _ in 0..120 {
            space.step(1.0 / 60.0, &mut gate);
        }
        // the item fell straight through the floor
        assert!(space.body(item).unwrap().position.y > 150.0);
        assert_eq!(gate.begins.len(), 1);
        assert!(gate.separates.is_empty());
    }

    #[test]
    fn separation_is_reported_once() {
        let mut space = Space::new(Vec2::ZERO);
        let a = space.add_body(Body::fixed(
            Vec2::ZERO,
            Vec2::splat(10.0),
            CollisionKind::Block,
        ));
        let b = space.add_body(Body::dynamic(
            Vec2::new(5.0, 0.0),
            Vec2::splat(10.0),
            1.0,
            CollisionKind::Player,
        ));
        let mut gate = Recorder {
            accept: true,
            ..Recorder::default()
        };
        space.step(1.0 / 60.0, &mut gate);
        assert_eq!(gate.begins, vec![(a, b)]);

        // fling the dynamic body far away
        space.body_mut(b).unwrap().velocity = Vec2::new(10_000.0, 0.0);
        space.step(1.0, &mut gate);
        space.step(1.0, &mut gate);
        assert_eq!(gate.separates, vec![(a, b)]);
    }

    #[test]
    fn removing_a_body_drops_its_contacts() {
        let mut space = Space::new(Vec2::ZERO);
        let a = space.add_body(Body::fixed(
            Vec2::ZERO,
            Vec2::splat(10.0),
            CollisionKind::Block,
        ));
        let b = space.add_body(Body::dynamic(
            Vec2::new(5.0, 0.0),
            Vec2::splat(10.0),
            1.0,
            CollisionKind::Item,
        ));
        let mut gate = Recorder {
            accept: true,
            ..Recorder::default()
        };
        space.step(1.0 / 60.0, &mut gate);
        assert!(space.remove_body(b).is_some());
        space.step(1.0 / 60.0, &mut gate);
        // no phantom separation for the removed pair
        assert!(gate.separates.is_empty());
        assert!(space.body(a).is_some());
        assert!(space.body(b).is_none());
    }

    #[test]
    fn point_query_is_nearest_first_and_mask_filtered() {
        let mut space = Space::new(Vec2::ZERO);
        let near = space.add_body(Body::fixed(
            Vec2::new(10.0, 0.0),
            Vec2::splat(4.0),
            CollisionKind::Block,
        ));
        let far = space.add_body(Body::fixed(
            Vec2::new(40.0, 0.0),
            Vec2::splat(4.0),
            CollisionKind::Block,
        ));
        let wall = space.add_body(Body::fixed(
            Vec2::new(20.0, 0.0),
            Vec2::splat(4.0),
            CollisionKind::Wall,
        ));

        let hits = space.point_query(Vec2::ZERO, 100.0, Categories::ALL & !Categories::WALL);
        assert_eq!(hits, vec![near, far]);
        assert!(!hits.contains(&wall));

        let close_only = space.point_query(Vec2::ZERO, 10.0, Categories::ALL);
        assert_eq!(close_only, vec![near]);
    }
}
