use super::*;
use crate::foundation::core::Viewport;
use crate::render::record::{DrawOp, RecordingSurface};
use crate::scene::camera::Camera;

fn flat_lighting() -> Lighting {
    Lighting {
        ambient: Rgba8::opaque(255, 255, 255),
        ambient_intensity: 1.0,
        lights: Vec::new(),
        fog: None,
    }
}

fn view_from(eye: Vec3, lighting: Lighting) -> SolidView {
    SolidView {
        projector: Camera::look_at(eye, Vec3::ZERO, 45.0)
            .projector(Viewport::new(400.0, 300.0).unwrap()),
        lighting,
        group: Transform3::IDENTITY,
    }
}

fn cube() -> Solid {
    Solid::new(
        EntityVariant::Cube { size: 1.0 },
        Pose::IDENTITY,
        Rgba8::opaque(200, 200, 200),
    )
}

#[test]
fn head_on_cube_shows_one_face() {
    let mut s = RecordingSurface::new(400, 300);
    cube().draw(&mut s, &view_from(Vec3::new(0.0, 0.0, 10.0), flat_lighting()));
    assert_eq!(s.fill_count(), 1);
}

#[test]
fn corner_view_shows_three_faces() {
    let mut s = RecordingSurface::new(400, 300);
    cube().draw(&mut s, &view_from(Vec3::new(7.0, 6.0, 10.0), flat_lighting()));
    assert_eq!(s.fill_count(), 3);
}

#[test]
fn pyramid_tail_never_shows_all_faces() {
    let tail = Solid::new(
        EntityVariant::Tail {
            radius: 1.0,
            height: 2.0,
            sides: 4,
            twist: 0.0,
        },
        Pose::IDENTITY,
        Rgba8::opaque(255, 255, 255),
    );
    let mut s = RecordingSurface::new(400, 300);
    tail.draw(&mut s, &view_from(Vec3::new(0.0, 10.0, 0.1), flat_lighting()));
    // From above only the four sloped sides face the eye.
    assert_eq!(s.fill_count(), 4);
}

#[test]
fn transparent_solids_draw_nothing() {
    let mut c = cube();
    c.opacity = 0.0;
    let mut s = RecordingSurface::new(400, 300);
    c.draw(&mut s, &view_from(Vec3::new(7.0, 6.0, 10.0), flat_lighting()));
    assert!(s.ops().is_empty());
}

#[test]
fn eye_is_a_single_disc() {
    let eye = Solid::new(
        EntityVariant::Eye { radius: 0.2 },
        Pose::at(Vec3::new(0.5, 0.5, 0.5)),
        Rgba8::opaque(5, 5, 7),
    );
    let mut s = RecordingSurface::new(400, 300);
    eye.draw(&mut s, &view_from(Vec3::new(0.0, 0.0, 10.0), flat_lighting()));
    assert_eq!(s.fill_count(), 1);
    assert!(matches!(s.ops()[0], DrawOp::FillPath { .. }));
}

#[test]
fn light_facing_surfaces_are_brighter() {
    let lighting = Lighting {
        ambient: Rgba8::opaque(255, 255, 255),
        ambient_intensity: 0.2,
        lights: vec![Light::new(
            Vec3::new(0.0, 1.0, 0.0),
            Rgba8::opaque(255, 255, 255),
            0.8,
        )],
        fog: None,
    };
    let base = Rgba8::opaque(200, 200, 200);
    let top = lighting.shade(base, Vec3::UP, 0.0);
    let side = lighting.shade(base, Vec3::new(1.0, 0.0, 0.0), 0.0);
    assert_eq!(top, Rgba8::opaque(200, 200, 200));
    assert_eq!(side, Rgba8::opaque(40, 40, 40));
}

#[test]
fn fog_pulls_distant_colors_to_fog_color() {
    let fog = Fog {
        color: Rgba8::opaque(5, 5, 7),
        density: 0.12,
    };
    assert_eq!(fog.factor(0.0), 0.0);
    assert!(fog.factor(100.0) > 0.999);
    let mut lighting = flat_lighting();
    lighting.fog = Some(fog);
    let far = lighting.shade(Rgba8::new(255, 255, 255, 128), Vec3::UP, 1000.0);
    assert_eq!(far, Rgba8::new(5, 5, 7, 128));
}

#[test]
fn y_axis_to_aligns_the_up_axis() {
    for dir in [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(0.3, -0.2, 0.9),
    ] {
        let got = y_axis_to(dir).rotate(Vec3::UP);
        let want = dir.try_normalize().unwrap();
        assert!((got - want).length() < 1e-9, "{dir:?} -> {got:?}");
    }
    assert_eq!(y_axis_to(Vec3::ZERO), Euler::default());
}

#[test]
fn nested_groups_compose_inner_first() {
    let outer = Pose {
        position: Vec3::new(1.0, 0.0, 0.0),
        rotation: Euler::new(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        scale: 2.0,
    };
    let inner = Pose::at(Vec3::new(1.0, 0.0, 0.0));
    let chained = Transform3::from(outer).then(&inner.into());
    let p = chained.apply(Vec3::ZERO);
    assert!((p - outer.apply(inner.apply(Vec3::ZERO))).length() < 1e-12);
    assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-12);
    let n = chained.apply_normal(Vec3::new(1.0, 0.0, 0.0));
    assert!((n - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-12);
}
