use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn viewport() -> Viewport {
    Viewport::new(800.0, 600.0).unwrap()
}

#[test]
fn target_projects_to_viewport_center() {
    let cam = Camera::look_at(Vec3::new(7.0, 6.0, 10.0), Vec3::ZERO, 45.0);
    let pr = cam.projector(viewport());
    let p = pr.project(Vec3::ZERO).unwrap();
    assert!(approx(p.point.x, 400.0));
    assert!(approx(p.point.y, 300.0));
    assert!(approx(p.depth, Vec3::new(7.0, 6.0, 10.0).length()));
}

#[test]
fn up_is_up_on_screen_and_right_is_right() {
    let cam = Camera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 90.0);
    let pr = cam.projector(viewport());
    let above = pr.project(Vec3::new(0.0, 1.0, 0.0)).unwrap();
    assert!(above.point.y < 300.0);
    let right = pr.project(Vec3::new(1.0, 0.0, 0.0)).unwrap();
    assert!(right.point.x > 400.0);
    // 90 degree fov: focal length is half the viewport height.
    assert!(approx(right.point.x, 400.0 + 300.0 / 10.0));
}

#[test]
fn points_behind_the_camera_are_rejected() {
    let cam = Camera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 45.0);
    let pr = cam.projector(viewport());
    assert!(pr.project(Vec3::new(0.0, 0.0, 11.0)).is_none());
    assert!(pr.depth(Vec3::new(0.0, 0.0, 11.0)) < 0.0);
    assert!(pr.project(Vec3::new(f64::NAN, 0.0, 0.0)).is_none());
}

#[test]
fn nearer_points_have_smaller_depth() {
    let cam = Camera::orbit(10.0, 4.0, 0.3, 45.0);
    let pr = cam.projector(viewport());
    let toward = (pr.eye() - Vec3::ZERO).try_normalize().unwrap();
    assert!(pr.depth(toward) < pr.depth(-toward));
}

#[test]
fn degenerate_cameras_still_project() {
    // Looking straight down: forward is parallel to +Y.
    let cam = Camera::look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, 45.0);
    let p = cam.projector(viewport()).project(Vec3::ZERO).unwrap();
    assert!(p.point.x.is_finite() && p.point.y.is_finite());

    // Eye on target.
    let cam = Camera::look_at(Vec3::ZERO, Vec3::ZERO, 45.0);
    let p = cam.projector(viewport()).project(Vec3::new(0.0, 0.0, -5.0));
    assert!(p.is_some());
}

#[test]
fn orbit_places_eye_on_circle() {
    let cam = Camera::orbit(10.5, 4.8, std::f64::consts::FRAC_PI_2, 45.0);
    assert!(approx(cam.eye.x, 0.0));
    assert!(approx(cam.eye.z, 10.5));
    assert!(approx(cam.eye.y, 4.8));
}

#[test]
fn isometric_matches_reference_axes() {
    let o = Point::new(100.0, 100.0);
    let p = isometric(Vec3::new(10.0, 0.0, 0.0), 1.0, o);
    assert!(approx(p.x, 108.66));
    assert!(approx(p.y, 105.0));
    let p = isometric(Vec3::new(0.0, 0.0, 10.0), 2.0, o);
    assert!(approx(p.x, 100.0));
    assert!(approx(p.y, 80.0));
    assert!(isometric_depth(Vec3::new(0.0, 0.0, -5.0)) > isometric_depth(Vec3::new(0.0, 0.0, 5.0)));
}
