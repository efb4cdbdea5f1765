//! Fit the camera to an object's bounding box.

use cgmath::Point3;

use crate::{
    camera::{Camera, Projection},
    controls::OrbitControls,
    data_structures::aabb::Bounded,
};

/// Zoom-out multiplier used when the caller passes no offset.
pub const DEFAULT_FIT_OFFSET: f32 = 1.25;

/// What [`fit_camera_to_object`] computed and applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFit {
    pub center: Point3<f32>,
    pub camera_z: f32,
    pub camera_to_far_edge: f32,
    pub far: f32,
}

/// Move the camera back along z until `object` fits the view, and adjust the
/// far plane so the whole object stays inside the frustum.
///
/// The distance derives from the largest extent of the object's bounding box
/// and the vertical field of view, then is multiplied by `offset` (defaults
/// to [`DEFAULT_FIT_OFFSET`]). Only `camera.position.z` is changed.
///
/// With `controls`, the controls orbit around the box center, may not zoom
/// out past twice the far-edge distance, and the result becomes their saved
/// state. Without controls the camera looks straight at the center.
///
/// An empty bounding box produces non-finite values; callers are expected
/// to pass objects with geometry.
pub fn fit_camera_to_object<B>(
    camera: &mut Camera,
    projection: &mut Projection,
    object: &B,
    offset: Option<f32>,
    controls: Option<&mut OrbitControls>,
) -> CameraFit
where
    B: Bounded + ?Sized,
{
    let offset = offset.unwrap_or(DEFAULT_FIT_OFFSET);
    let bounding_box = object.bounding_box();

    let center = bounding_box.center();
    let size = bounding_box.size();

    // fits to width, height or depth, whichever is largest
    let max_dim = size.x.max(size.y).max(size.z);
    let fov = projection.fovy.0;
    let camera_z = ((max_dim / 4.0) * (fov * 2.0).tan()).abs() * offset;

    camera.position.z = camera_z;

    let min_z = bounding_box.min.z;
    let camera_to_far_edge = if min_z < 0.0 {
        -min_z + camera_z
    } else {
        camera_z - min_z
    };

    projection.zfar = camera_to_far_edge * 3.0;
    projection.update_projection_matrix();

    match controls {
        Some(controls) => {
            controls.target = center;
            // keep the far plane from cutting the object when zooming out
            controls.max_distance = camera_to_far_edge * 2.0;
            controls.save_state(camera);
        }
        None => camera.look_at(center),
    }

    log::debug!(
        "Fitted camera to {:?}: z = {}, far = {}",
        bounding_box,
        camera_z,
        projection.zfar
    );

    CameraFit {
        center,
        camera_z,
        camera_to_far_edge,
        far: projection.zfar,
    }
}
