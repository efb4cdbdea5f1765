use std::f32::consts::PI;

use cgmath::{Deg, InnerSpace, MetricSpace, Point3};
use orbit_scene::{
    camera::{Camera, Projection},
    controls::OrbitControls,
};

fn setup() -> (Camera, Projection, OrbitControls) {
    let camera = Camera::default();
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    let controls = OrbitControls::new(&camera);
    (camera, projection, controls)
}

fn distance(camera: &Camera, controls: &OrbitControls) -> f32 {
    camera.position.distance(controls.target)
}

#[test]
fn should_keep_distance_when_rotating() {
    let (mut camera, projection, mut controls) = setup();

    controls.rotate_left(PI / 2.0);
    let moved = controls.update(&mut camera, &projection, 600.0);

    assert!(moved);
    assert!((distance(&camera, &controls) - 5.0).abs() < 1e-4);
    assert!((camera.position.x + 5.0).abs() < 1e-4, "{:?}", camera.position);
    assert_eq!(camera.target, controls.target);
}

#[test]
fn should_not_flip_over_the_pole() {
    let (mut camera, projection, mut controls) = setup();

    controls.rotate_up(2.0 * PI);
    controls.update(&mut camera, &projection, 600.0);

    let offset = camera.position - controls.target;
    assert!(offset.x.is_finite() && offset.y.is_finite() && offset.z.is_finite());
    assert!(offset.y > 4.99, "{:?}", offset);
    assert!((offset.magnitude() - 5.0).abs() < 1e-4);
}

#[test]
fn should_clamp_dolly_to_distance_limits() {
    let (mut camera, projection, mut controls) = setup();
    controls.max_distance = 6.0;
    controls.min_distance = 2.0;

    controls.dolly_out(0.5);
    controls.update(&mut camera, &projection, 600.0);
    assert!((distance(&camera, &controls) - 6.0).abs() < 1e-4);

    controls.dolly_in(0.01);
    controls.update(&mut camera, &projection, 600.0);
    assert!((distance(&camera, &controls) - 2.0).abs() < 1e-4);
}

#[test]
fn should_move_closer_when_dollying_in() {
    let (mut camera, projection, mut controls) = setup();

    controls.dolly_in(0.5);
    controls.update(&mut camera, &projection, 600.0);

    assert!((distance(&camera, &controls) - 2.5).abs() < 1e-4);
}

#[test]
fn should_pan_target_and_camera_together() {
    let (mut camera, projection, mut controls) = setup();

    controls.pan(100.0, 0.0);
    controls.update(&mut camera, &projection, 600.0);

    assert!(controls.target.x < 0.0, "{:?}", controls.target);
    assert!(controls.target.y.abs() < 1e-5);
    assert!((distance(&camera, &controls) - 5.0).abs() < 1e-4);
}

#[test]
fn should_restore_saved_state_on_reset() {
    let (mut camera, projection, mut controls) = setup();
    controls.save_state(&camera);

    controls.rotate_left(1.0);
    controls.pan(10.0, 10.0);
    controls.update(&mut camera, &projection, 600.0);
    assert_ne!(camera.position, Point3::new(0.0, 0.0, 5.0));

    controls.reset(&mut camera);

    assert_eq!(camera.position, Point3::new(0.0, 0.0, 5.0));
    assert_eq!(controls.target, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(camera.target, controls.target);
}

#[test]
fn should_ignore_input_when_disabled() {
    let (mut camera, projection, mut controls) = setup();
    controls.enabled = false;

    controls.rotate_left(1.0);
    let moved = controls.update(&mut camera, &projection, 600.0);

    assert!(!moved);
    assert_eq!(camera.position, Point3::new(0.0, 0.0, 5.0));

    // pending input is dropped, not replayed once enabled
    controls.enabled = true;
    assert!(!controls.update(&mut camera, &projection, 600.0));
}
