//! Mobs and their wander policies.

use flatcraft_core::ThingId;
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Steps between wander impulses.
pub const WANDER_PERIOD: u32 = 20;

/// Golden-ratio horizontal stretch applied to the sheep's wander circle.
pub const SHEEP_X_SCALE: f32 = 1.61803;

/// Upward bias added to each bird wander impulse so it stays airborne.
pub const BIRD_LIFT: f32 = 50.0;

/// Mob species; selects wander shape and drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MobKind {
    /// Flies on a circular wander with upward lift.
    Bird,
    /// Grazes on a horizontally stretched wander.
    Sheep,
}

impl MobKind {
    fn tempo(self) -> f32 {
        match self {
            MobKind::Bird => 40.0,
            MobKind::Sheep => 20.0,
        }
    }

    fn max_health(self) -> f32 {
        match self {
            MobKind::Bird => 10.0,
            MobKind::Sheep => 16.0,
        }
    }
}

/// A creature entity; position and velocity live on its physics body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mob {
    kind: MobKind,
    health: f32,
    max_health: f32,
    tempo: f32,
    steps: u32,
}

impl Mob {
    /// New mob at full health with its species' default tempo.
    pub fn new(kind: MobKind) -> Self {
        Self {
            kind,
            health: kind.max_health(),
            max_health: kind.max_health(),
            tempo: kind.tempo(),
            steps: 0,
        }
    }

    /// Species.
    pub fn kind(&self) -> MobKind {
        self.kind
    }

    /// Remaining health.
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Whether the mob has run out of health.
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Apply damage, floored at zero. Returns true when this kills the mob.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.is_dead()
    }

    /// Items released when the mob dies.
    pub fn drops(&self) -> Vec<ThingId> {
        match self.kind {
            MobKind::Bird => vec![ThingId::new("feather")],
            MobKind::Sheep => vec![ThingId::new("wool")],
        }
    }

    /// Advance the wander policy by one step.
    ///
    /// Every [`WANDER_PERIOD`] steps the mob picks a random point on a
    /// circle whose radius is its tempo scaled by remaining health, and
    /// returns it as a velocity impulse.
    pub fn wander<R: Rng>(&mut self, rng: &mut R) -> Option<Vec2> {
        let due = self.steps % WANDER_PERIOD == 0;
        self.steps = self.steps.wrapping_add(1);
        if !due {
            return None;
        }

        let health_fraction = self.health / self.max_health;
        let radius = self.tempo * health_fraction;
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let (sin, cos) = angle.sin_cos();

        let impulse = match self.kind {
            MobKind::Sheep => Vec2::new(cos * radius * SHEEP_X_SCALE, sin * radius),
            MobKind::Bird => Vec2::new(cos * radius, sin * radius - BIRD_LIFT),
        };
        Some(impulse)
    }
}
