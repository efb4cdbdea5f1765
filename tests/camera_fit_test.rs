use cgmath::{Deg, Point3};
use orbit_scene::{
    camera::{Camera, Projection},
    controls::OrbitControls,
    data_structures::aabb::Aabb,
    fit::{DEFAULT_FIT_OFFSET, fit_camera_to_object},
};

macro_rules! assert_close {
    ($left:expr, $right:expr) => {{
        let (l, r): (f32, f32) = ($left, $right);
        assert!((l - r).abs() < 1e-4, "{} is not close to {}", l, r);
    }};
}

fn projection() -> Projection {
    Projection::new(800, 600, Deg(75.0), 0.1, 1000.0)
}

fn unit_cube() -> Aabb {
    Aabb::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5))
}

fn expected_camera_z(max_dim: f32, offset: f32) -> f32 {
    let fov = 75.0_f32.to_radians();
    ((max_dim / 4.0) * (fov * 2.0).tan()).abs() * offset
}

#[test]
fn should_place_camera_on_z_from_largest_dimension() {
    let mut camera = Camera::default();
    let mut projection = projection();
    let object = Aabb::new(Point3::new(-1.0, -0.5, -0.25), Point3::new(1.0, 0.5, 0.25));

    let fit = fit_camera_to_object(&mut camera, &mut projection, &object, None, None);

    let camera_z = expected_camera_z(2.0, DEFAULT_FIT_OFFSET);
    assert_close!(fit.camera_z, camera_z);
    assert_close!(camera.position.z, camera_z);
}

#[test]
fn should_fit_unit_cube_with_fifty_degree_fov() {
    let mut camera = Camera::default();
    let mut projection = Projection::new(800, 600, Deg(50.0), 0.1, 1000.0);

    let fit = fit_camera_to_object(&mut camera, &mut projection, &unit_cube(), None, None);

    let fov = 50.0_f32.to_radians();
    let camera_z = ((1.0 / 4.0) * (fov * 2.0).tan()).abs() * 1.25;
    assert_close!(fit.camera_z, camera_z);
    assert_close!(camera.position.z, 1.772_28);
    // min.z is negative, so the far edge is 0.5 behind the origin
    assert_close!(fit.camera_to_far_edge, 0.5 + camera_z);
    assert_close!(projection.zfar, 3.0 * (0.5 + camera_z));
    assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn should_only_change_the_z_coordinate() {
    let mut camera = Camera::new((3.0, 4.0, 5.0), (0.0, 0.0, 0.0));
    let mut projection = projection();

    fit_camera_to_object(&mut camera, &mut projection, &unit_cube(), None, None);

    assert_close!(camera.position.x, 3.0);
    assert_close!(camera.position.y, 4.0);
}

#[test]
fn should_scale_distance_with_offset() {
    let mut camera = Camera::default();
    let mut projection = projection();

    let fit = fit_camera_to_object(&mut camera, &mut projection, &unit_cube(), Some(2.0), None);

    assert_close!(fit.camera_z, expected_camera_z(1.0, 2.0));
}

#[test]
fn should_set_far_plane_for_object_behind_origin() {
    let mut camera = Camera::default();
    let mut projection = projection();

    let fit = fit_camera_to_object(&mut camera, &mut projection, &unit_cube(), None, None);

    let camera_z = expected_camera_z(1.0, DEFAULT_FIT_OFFSET);
    assert_close!(fit.camera_to_far_edge, 0.5 + camera_z);
    assert_close!(fit.far, 3.0 * (0.5 + camera_z));
    assert_close!(projection.zfar, fit.far);
}

#[test]
fn should_set_far_plane_for_object_in_front_of_origin() {
    let mut camera = Camera::default();
    let mut projection = projection();
    let object = Aabb::new(Point3::new(0.0, 0.0, 1.0), Point3::new(2.0, 2.0, 3.0));

    let fit = fit_camera_to_object(&mut camera, &mut projection, &object, None, None);

    let camera_z = expected_camera_z(2.0, DEFAULT_FIT_OFFSET);
    assert_close!(fit.camera_to_far_edge, camera_z - 1.0);
    assert_close!(fit.far, 3.0 * (camera_z - 1.0));
}

#[test]
fn should_look_at_center_without_controls() {
    let mut camera = Camera::default();
    let mut projection = projection();
    let object = Aabb::new(Point3::new(1.0, 1.0, -1.0), Point3::new(3.0, 2.0, 1.0));

    let fit = fit_camera_to_object(&mut camera, &mut projection, &object, None, None);

    assert_eq!(fit.center, Point3::new(2.0, 1.5, 0.0));
    assert_eq!(camera.target, fit.center);
}

#[test]
fn should_configure_controls_and_save_their_state() {
    let mut camera = Camera::default();
    let mut projection = projection();
    let mut controls = OrbitControls::new(&camera);
    let object = Aabb::new(Point3::new(1.0, 1.0, -1.0), Point3::new(3.0, 2.0, 1.0));

    let fit = fit_camera_to_object(&mut camera, &mut projection, &object, None, Some(&mut controls));

    assert_eq!(controls.target, fit.center);
    assert_close!(controls.max_distance, 2.0 * fit.camera_to_far_edge);
    assert_eq!(controls.saved_target(), fit.center);
    assert_eq!(controls.saved_position(), camera.position);
}
