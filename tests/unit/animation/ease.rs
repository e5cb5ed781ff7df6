use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert!(ease.apply(0.0).abs() < 1e-12, "{ease:?}(0)");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?}(1)");
    }
}

#[test]
fn in_out_cubic_is_symmetric_at_midpoint() {
    assert_eq!(Ease::InOutCubic.apply(0.5), 0.5);
    assert_eq!(Ease::InOutCubic.apply(0.25), 4.0 * 0.25 * 0.25 * 0.25);
}

#[test]
fn out_quad_matches_closed_form() {
    assert_eq!(Ease::OutQuad.apply(0.0), 0.0);
    assert_eq!(Ease::OutQuad.apply(1.0), 1.0);
    assert_eq!(Ease::OutQuad.apply(0.5), 0.75);
}

#[test]
fn in_cubic_is_monotonic() {
    let mut prev = Ease::InCubic.apply(0.0);
    for i in 1..=1000 {
        let v = Ease::InCubic.apply(f64::from(i) / 1000.0);
        assert!(v >= prev);
        prev = v;
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in Ease::ALL.into_iter().filter(|e| !e.overshoots()) {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease:?}");
        assert!(b < c, "{ease:?}");
    }
}

#[test]
fn non_overshooting_curves_stay_in_unit_range() {
    for ease in Ease::ALL.into_iter().filter(|e| !e.overshoots()) {
        for i in 0..=100 {
            let v = ease.apply(f64::from(i) / 100.0);
            assert!((0.0..=1.0).contains(&v), "{ease:?} -> {v}");
        }
    }
}

#[test]
fn out_back_overshoots_then_settles() {
    let peak = (1..100)
        .map(|i| Ease::OutBack.apply(f64::from(i) / 100.0))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.0);
    assert!(peak < 1.2);
    assert!((Ease::OutBack.apply(1.0) - 1.0).abs() < 1e-12);
}

#[test]
fn inputs_are_clamped() {
    assert_eq!(Ease::InCubic.apply(-3.0), 0.0);
    assert_eq!(Ease::InCubic.apply(9.0), 1.0);
    assert_eq!(Ease::Linear.apply(f64::NAN), 0.0);
}
