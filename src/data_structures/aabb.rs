//! Axis-aligned bounding boxes.
//!
//! Meshes keep the bounds of their vertex positions in local space. The scene
//! graph transforms those bounds into world space to answer "how big is this
//! object" for camera fitting and "what did the cursor hit" for picking.

use cgmath::{EuclideanSpace, Matrix4, Point3, Transform, Vector3};

/// Minimal box enclosing a set of points, aligned with the world axes.
///
/// An empty box has `min = +inf` and `max = -inf` so that expanding it by any
/// point yields that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Box of the given edge lengths centred at the origin.
    pub fn centered(size: Vector3<f32>) -> Self {
        let half = size / 2.0;
        Self {
            min: Point3::from_vec(-half),
            max: Point3::from_vec(half),
        }
    }

    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        points.into_iter().fold(Self::empty(), |mut aabb, p| {
            aabb.expand_by_point(p);
            aabb
        })
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand_by_point(&mut self, p: Point3<f32>) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        out.expand_by_point(other.min);
        out.expand_by_point(other.max);
        out
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// World-space box enclosing this box after `matrix` is applied.
    ///
    /// Rotations grow the box; the result is the AABB of the eight transformed
    /// corners, not the tightest box around the original geometry.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::from_points(self.corners().iter().map(|c| matrix.transform_point(*c)))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

/// Anything that can report a world-space bounding box.
pub trait Bounded {
    fn bounding_box(&self) -> Aabb;
}

impl Bounded for Aabb {
    fn bounding_box(&self) -> Aabb {
        *self
    }
}
