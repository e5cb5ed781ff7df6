use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn viewport_rejects_degenerate_sizes() {
    assert!(Viewport::new(0.0, 10.0).is_err());
    assert!(Viewport::new(10.0, f64::NAN).is_err());
    let v = Viewport::new(800.0, 600.0).unwrap();
    assert_eq!(v.center(), Point::new(400.0, 300.0));
    assert_eq!(v.min_side(), 600.0);
}

#[test]
fn hex_colors_parse() {
    assert_eq!(Rgba8::from_hex("#050507").unwrap(), Rgba8::opaque(5, 5, 7));
    assert_eq!(
        Rgba8::from_hex("#ff000080").unwrap(),
        Rgba8::new(255, 0, 0, 128)
    );
    assert!(Rgba8::from_hex("050507").is_err());
    assert!(Rgba8::from_hex("#12345").is_err());
}

#[test]
fn color_offset_saturates() {
    let c = Rgba8::opaque(250, 10, 128).offset(40);
    assert_eq!(c, Rgba8::opaque(255, 50, 168));
    let d = Rgba8::opaque(250, 10, 128).offset(-40);
    assert_eq!(d, Rgba8::opaque(210, 0, 88));
}

#[test]
fn zero_vector_has_no_direction() {
    assert!(Vec3::ZERO.try_normalize().is_none());
    let n = Vec3::new(3.0, 0.0, 4.0).try_normalize().unwrap();
    assert!(approx(n.length(), 1.0));
    assert!(approx(n.x, 0.6));
}

#[test]
fn euler_rotates_about_y() {
    let r = Euler::new(0.0, std::f64::consts::FRAC_PI_2, 0.0);
    let v = r.rotate(Vec3::new(1.0, 0.0, 0.0));
    assert!(approx(v.x, 0.0));
    assert!(approx(v.z, -1.0));
}

#[test]
fn euler_applies_z_before_x() {
    let r = Euler::new(std::f64::consts::FRAC_PI_2, 0.0, std::f64::consts::FRAC_PI_2);
    // Rz maps +X to +Y, then Rx maps +Y to +Z.
    let v = r.rotate(Vec3::new(1.0, 0.0, 0.0));
    assert!(approx(v.x, 0.0));
    assert!(approx(v.y, 0.0));
    assert!(approx(v.z, 1.0));
}
