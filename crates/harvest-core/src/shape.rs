//! Collision shapes.
//!
//! Every entity owns one [`CollisionShape`], sized from its sprite when it
//! spawns. The resolver never moves that authoritative shape: it asks for a
//! translated copy with [`CollisionShape::with_position`] and tests the copy.
//!
//! The reference point of every shape is the top-left corner of its bounding
//! box, which is also the convention for entity positions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its top-left corner and extents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Extent along X.
    pub width: f32,
    /// Extent along Y.
    pub height: f32,
}

impl Aabb {
    /// Creates a rectangle from its top-left corner and extents.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a corner and a size vector.
    #[must_use]
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self::new(min.x, min.y, size.x, size.y)
    }

    /// Top-left corner.
    #[must_use]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bottom-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns this rectangle shrunk by `margin` on every side.
    ///
    /// Extents never go negative; an over-shrunk rectangle collapses to its center.
    #[must_use]
    pub fn shrink(&self, margin: f32) -> Self {
        let m_x = margin.min(self.width * 0.5);
        let m_y = margin.min(self.height * 0.5);
        Self::new(
            self.x + m_x,
            self.y + m_y,
            self.width - 2.0 * m_x,
            self.height - 2.0 * m_y,
        )
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Closest point inside the rectangle to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }
}

/// Bounding volume of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    /// Circle given by its center and radius.
    Circle {
        /// Center point.
        center: Vec2,
        /// Radius.
        radius: f32,
    },
    /// Axis-aligned rectangle.
    Rectangle(Aabb),
}

impl CollisionShape {
    /// Rectangle shape covering `size` at `position`.
    #[must_use]
    pub fn rectangle(position: Vec2, size: Vec2) -> Self {
        Self::Rectangle(Aabb::from_min_size(position, size))
    }

    /// Circle inscribed in the square of side `2 * radius` whose corner is `position`.
    #[must_use]
    pub fn circle(position: Vec2, radius: f32) -> Self {
        Self::Circle {
            center: position + Vec2::splat(radius),
            radius,
        }
    }

    /// Reference point: top-left corner of the bounding box.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Circle { center, radius } => *center - Vec2::splat(*radius),
            Self::Rectangle(rect) => rect.min(),
        }
    }

    /// Center of the shape.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        match self {
            Self::Circle { center, .. } => *center,
            Self::Rectangle(rect) => rect.center(),
        }
    }

    /// Axis-aligned bounding box.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        match self {
            Self::Circle { center, radius } => Aabb::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            ),
            Self::Rectangle(rect) => *rect,
        }
    }

    /// Returns a copy of this shape whose reference point is `position`.
    #[must_use]
    pub fn with_position(&self, position: Vec2) -> Self {
        match self {
            Self::Circle { radius, .. } => Self::circle(position, *radius),
            Self::Rectangle(rect) => Self::Rectangle(Aabb::new(
                position.x,
                position.y,
                rect.width,
                rect.height,
            )),
        }
    }

    /// Symmetric overlap test against another shape.
    #[must_use]
    pub fn collides_with(&self, other: &CollisionShape) -> bool {
        match (self, other) {
            (
                Self::Circle { center: a, radius: ra },
                Self::Circle { center: b, radius: rb },
            ) => a.distance_squared(*b) <= (ra + rb) * (ra + rb),
            (Self::Circle { center, radius }, Self::Rectangle(rect))
            | (Self::Rectangle(rect), Self::Circle { center, radius }) => {
                circle_hits_rect(*center, *radius, rect)
            }
            (Self::Rectangle(a), Self::Rectangle(b)) => a.overlaps(b),
        }
    }

    /// Overlap test against a bare rectangle (tile bounds).
    #[must_use]
    pub fn collides_with_aabb(&self, rect: &Aabb) -> bool {
        self.collides_with(&Self::Rectangle(*rect))
    }
}

fn circle_hits_rect(center: Vec2, radius: f32, rect: &Aabb) -> bool {
    center.distance_squared(rect.closest_point(center)) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn circles_touching_collide() {
        let a = CollisionShape::Circle {
            center: Vec2::ZERO,
            radius: 5.0,
        };
        let b = CollisionShape::Circle {
            center: Vec2::new(10.0, 0.0),
            radius: 5.0,
        };
        let c = CollisionShape::Circle {
            center: Vec2::new(10.1, 0.0),
            radius: 5.0,
        };
        assert!(a.collides_with(&b));
        assert!(!a.collides_with(&c));
    }

    #[test]
    fn circle_against_rectangle_uses_closest_point() {
        let rect = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let near_corner = CollisionShape::Circle {
            center: Vec2::new(13.0, 14.0),
            radius: 5.0,
        };
        let far_corner = CollisionShape::Circle {
            center: Vec2::new(14.0, 14.0),
            radius: 5.0,
        };
        assert!(near_corner.collides_with_aabb(&rect));
        assert!(!far_corner.collides_with_aabb(&rect));
    }

    #[test]
    fn rectangles_sharing_an_edge_do_not_overlap() {
        let a = CollisionShape::rectangle(Vec2::ZERO, Vec2::splat(10.0));
        let b = CollisionShape::rectangle(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        let c = CollisionShape::rectangle(Vec2::new(9.0, 9.0), Vec2::splat(10.0));
        assert!(!a.collides_with(&b));
        assert!(a.collides_with(&c));
    }

    #[test]
    fn with_position_translates_without_mutating() {
        let original = CollisionShape::circle(Vec2::new(10.0, 10.0), 8.0);
        let moved = original.with_position(Vec2::new(40.0, 0.0));

        assert_eq!(original.position(), Vec2::new(10.0, 10.0));
        assert_eq!(moved.position(), Vec2::new(40.0, 0.0));
        assert_eq!(moved.center(), Vec2::new(48.0, 8.0));
        assert!(matches!(moved, CollisionShape::Circle { radius, .. } if (radius - 8.0).abs() < f32::EPSILON));
    }

    #[test]
    fn shrink_never_inverts() {
        let rect = Aabb::new(0.0, 0.0, 6.0, 64.0).shrink(5.0);
        assert!((rect.width - 0.0).abs() < f32::EPSILON);
        assert!((rect.height - 54.0).abs() < f32::EPSILON);
        assert!((rect.x - 3.0).abs() < f32::EPSILON);
    }

    fn any_shape() -> impl Strategy<Value = CollisionShape> {
        prop_oneof![
            (-50.0f32..50.0, -50.0f32..50.0, 1.0f32..30.0).prop_map(|(x, y, r)| {
                CollisionShape::Circle {
                    center: Vec2::new(x, y),
                    radius: r,
                }
            }),
            (-50.0f32..50.0, -50.0f32..50.0, 1.0f32..40.0, 1.0f32..40.0)
                .prop_map(|(x, y, w, h)| CollisionShape::Rectangle(Aabb::new(x, y, w, h))),
        ]
    }

    proptest! {
        #[test]
        fn collision_is_symmetric(a in any_shape(), b in any_shape()) {
            prop_assert_eq!(a.collides_with(&b), b.collides_with(&a));
        }

        #[test]
        fn with_position_round_trips_reference_point(s in any_shape(), x in -100.0f32..100.0, y in -100.0f32..100.0) {
            let moved = s.with_position(Vec2::new(x, y));
            prop_assert!((moved.position() - Vec2::new(x, y)).length() < 1e-3);
            prop_assert!((moved.bounds().width - s.bounds().width).abs() < 1e-4);
        }
    }
}
