use cgmath::{Deg, InnerSpace, Matrix4, Point3, Vector3};
use orbit_scene::{
    camera::{Camera, Projection},
    data_structures::{aabb::Aabb, instance::Instance, model::ModelVertex, shapes::box_geometry},
    raycast::Ray,
};

fn unit_cube() -> Aabb {
    Aabb::centered(Vector3::new(1.0, 1.0, 1.0))
}

#[test]
fn should_cast_center_ray_along_view_direction() {
    let camera = Camera::default();
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);

    let ray = Ray::from_screen((400.0, 300.0), (800, 600), &camera, &projection).expect("invertible");

    assert!((ray.direction - camera.direction()).magnitude() < 1e-4);
    let t = ray.intersect_aabb(&unit_cube()).expect("the cube is in the middle");
    assert!((ray.at(t).z - 0.5).abs() < 1e-3, "{:?}", ray.at(t));
}

#[test]
fn should_miss_from_the_screen_corner() {
    let camera = Camera::default();
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);

    let ray = Ray::from_screen((0.0, 0.0), (800, 600), &camera, &projection).expect("invertible");

    assert!(ray.direction.x < 0.0 && ray.direction.y > 0.0);
    assert!(ray.intersect_aabb(&unit_cube()).is_none());
}

#[test]
fn should_report_zero_distance_from_inside() {
    let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(ray.intersect_aabb(&unit_cube()), Some(0.0));
}

#[test]
fn should_not_hit_boxes_behind_the_origin() {
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
    assert!(ray.intersect_aabb(&unit_cube()).is_none());
}

#[test]
fn should_not_hit_empty_boxes() {
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    assert!(ray.intersect_aabb(&Aabb::empty()).is_none());
}

#[test]
fn should_measure_transformed_hits_in_world_space() {
    let ray = Ray::new(Point3::new(3.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    let world = Instance {
        position: Vector3::new(3.0, 0.0, 0.0),
        scale: Vector3::new(2.0, 2.0, 2.0),
        ..Instance::new()
    }
    .to_matrix();

    let t = ray.intersect_transformed(&unit_cube(), &world).expect("hit");

    assert!((t - 4.0).abs() < 1e-4);
    assert!(ray.intersect_transformed(&unit_cube(), &Matrix4::from_translation(Vector3::new(-3.0, 0.0, 0.0))).is_none());
}

#[test]
fn should_build_unit_box_geometry() {
    let (vertices, indices): (Vec<ModelVertex>, Vec<u32>) = box_geometry(1.0, 1.0, 1.0);

    assert_eq!(vertices.len(), 24);
    assert_eq!(indices.len(), 36);
    assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));

    let bounds = Aabb::from_points(vertices.iter().map(|v| v.position.into()));
    assert_eq!(bounds, unit_cube());
    for v in &vertices {
        let normal = Vector3::from(v.normal);
        assert!((normal.magnitude() - 1.0).abs() < 1e-6);
        // every vertex lies on the face its normal points out of
        assert!((Vector3::from(v.position).dot(normal) - 0.5).abs() < 1e-6);
    }
}

#[test]
fn should_wind_box_faces_counter_clockwise() {
    let (vertices, indices) = box_geometry(2.0, 1.0, 0.5);
    for triangle in indices.chunks(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]]
            .map(|i| Vector3::from(vertices[i as usize].position));
        let face_normal = (b - a).cross(c - a);
        let normal = Vector3::from(vertices[triangle[0] as usize].normal);
        assert!(face_normal.dot(normal) > 0.0);
    }
}
