#![warn(missing_docs)]
//! 2D rigid-body physics: AABBs, categorised bodies and a stepped space
//! with gated collision callbacks.

pub mod body;
pub mod space;

pub use body::{Body, BodyId, BodyKind, Categories, CollisionKind};
pub use space::{CollisionGate, Space};

use glam::Vec2;

/// Axis-aligned bounding box used for collisions and queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Aabb {
    /// Create a new AABB ensuring min <= max per axis.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y);
        Self { min, max }
    }

    /// AABB centred on `centre` extending `half_extents` either side.
    pub fn from_centre(centre: Vec2, half_extents: Vec2) -> Self {
        Self::new(centre - half_extents, centre + half_extents)
    }

    /// Box centre point.
    pub fn centre(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Tests intersection with another AABB.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Whether a point lies inside (or on the boundary of) the box.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Distance from a point to the box; zero when the point is inside.
    pub fn distance_to(&self, point: Vec2) -> f32 {
        let clamped = point.clamp(self.min, self.max);
        point.distance(clamped)
    }

    /// Penetration depth along each axis when the boxes intersect.
    ///
    /// Both components are positive iff the boxes overlap.
    pub fn penetration(&self, other: &Self) -> Vec2 {
        Vec2::new(
            (self.max.x.min(other.max.x)) - (self.min.x.max(other.min.x)),
            (self.max.y.min(other.max.y)) - (self.min.y.max(other.min.y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_intersection_and_containment() {
        let a = Aabb::from_centre(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_centre(Vec2::new(15.0, 0.0), Vec2::splat(10.0));
        let c = Aabb::from_centre(Vec2::new(100.0, 0.0), Vec2::splat(10.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(Vec2::new(9.9, -9.9)));
        assert!(!a.contains(Vec2::new(10.1, 0.0)));
    }

    #[test]
    fn distance_is_zero_inside_the_box() {
        let a = Aabb::from_centre(Vec2::ZERO, Vec2::splat(5.0));
        assert_eq!(a.distance_to(Vec2::new(1.0, 1.0)), 0.0);
        assert_eq!(a.distance_to(Vec2::new(8.0, 0.0)), 3.0);
    }

    #[test]
    fn penetration_depths() {
        let a = Aabb::from_centre(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_centre(Vec2::new(18.0, 5.0), Vec2::splat(10.0));
        let depth = a.penetration(&b);
        assert_eq!(depth, Vec2::new(2.0, 15.0));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn aabb_strategy() -> impl Strategy<Value = Aabb> {
            (-100.0f32..100.0, -100.0f32..100.0, 0.1f32..50.0, 0.1f32..50.0)
                .prop_map(|(x, y, hx, hy)| Aabb::from_centre(Vec2::new(x, y), Vec2::new(hx, hy)))
        }

        proptest! {
            #[test]
            fn distance_is_zero_exactly_inside(
                aabb in aabb_strategy(),
                x in -200.0f32..200.0,
                y in -200.0f32..200.0,
            ) {
                let point = Vec2::new(x, y);
                prop_assert_eq!(aabb.distance_to(point) == 0.0, aabb.contains(point));
            }

            #[test]
            fn positive_penetration_matches_intersection(
                a in aabb_strategy(),
                b in aabb_strategy(),
            ) {
                let depth = a.penetration(&b);
                prop_assert_eq!(depth.x >= 0.0 && depth.y >= 0.0, a.intersects(&b));
            }
        }
    }
}
