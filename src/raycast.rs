//! Cursor rays and ray/box intersection.
//!
//! The cursor position is unprojected through the inverse view-projection
//! into a world-space ray. Pickable objects are tested as boxes in their own
//! local space, so a rotated and scaled cube is hit exactly rather than via
//! its world AABB.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Transform, Vector3, Vector4};

use crate::{
    camera::{Camera, Projection},
    data_structures::aabb::Aabb,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Unit length.
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray through the pixel at `cursor` (physical pixels, origin top-left)
    /// of a `width` x `height` viewport.
    pub fn from_screen(
        cursor: (f64, f64),
        viewport: (u32, u32),
        camera: &Camera,
        projection: &Projection,
    ) -> Option<Self> {
        let (width, height) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
        let ndc_x = 2.0 * cursor.0 as f32 / width - 1.0;
        let ndc_y = 1.0 - 2.0 * cursor.1 as f32 / height;

        let view_proj = projection.calc_matrix() * camera.calc_matrix();
        let inverse = view_proj.invert()?;

        // wgpu clip space: z in 0..1
        let unproject = |z: f32| {
            let p = inverse * Vector4::new(ndc_x, ndc_y, z, 1.0);
            Point3::from_vec(p.truncate() / p.w)
        };
        let near = unproject(0.0);
        let far = unproject(1.0);
        Some(Self::new(near, far - near))
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first intersection with `aabb`, using
    /// the slab method. A ray starting inside the box hits at distance 0.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        slab(self.origin, self.direction, aabb)
    }

    /// Like [`Ray::intersect_aabb`] for a box given in the local space of
    /// `world`. The returned distance is measured in world space.
    pub fn intersect_transformed(&self, aabb: &Aabb, world: &Matrix4<f32>) -> Option<f32> {
        let inverse = world.invert()?;
        let origin = inverse.transform_point(self.origin);
        // not normalized: keeps t comparable with world distances
        let direction = inverse.transform_vector(self.direction);
        slab(origin, direction, aabb)
    }
}

fn slab(origin: Point3<f32>, direction: Vector3<f32>, aabb: &Aabb) -> Option<f32> {
    if aabb.is_empty() {
        return None;
    }
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (o, d) = (origin[axis], direction[axis]);
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (t0, t1) = {
            let a = (lo - o) * inv;
            let b = (hi - o) * inv;
            if a < b { (a, b) } else { (b, a) }
        };
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_max < t_min {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}
