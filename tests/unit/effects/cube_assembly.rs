use super::*;
use crate::render::record::RecordingSurface;

fn scene() -> CubeAssembly {
    CubeAssembly::new(
        &CubeAssemblyParams::default(),
        Viewport::new(800.0, 600.0).unwrap(),
        11,
    )
    .unwrap()
}

fn visible(a: &CubeAssembly) -> usize {
    a.pieces().iter().filter(|p| p.state().is_some()).count()
}

#[test]
fn body_has_a_dark_eye_and_a_tail_placed_last() {
    let a = scene();
    assert_eq!(a.pieces().len(), 28);
    let dark = a
        .pieces()
        .iter()
        .filter(|p| p.shape().color == DEEP_BACKGROUND)
        .count();
    assert_eq!(dark, 1);
    assert!(matches!(
        a.pieces()[27].shape().variant,
        EntityVariant::Tail { sides: 4, .. }
    ));
    assert_eq!(a.machine().order().last(), Some(&27));
}

#[test]
fn targets_form_a_centered_grid() {
    let a = scene();
    let targets = a.machine().targets();
    assert!((targets[0] - Vec3::new(-0.66, -0.66, -0.66)).length() < 1e-12);
    let center = targets[..27]
        .iter()
        .fold(Vec3::ZERO, |acc, &t| acc + t)
        * (1.0 / 27.0);
    assert!(center.length() < 1e-9);
    // The tail sits beyond the (-,-,-) corner.
    assert!(targets[27].x < -0.96 && targets[27].y < -0.96 && targets[27].z < -0.96);
}

#[test]
fn pieces_appear_one_at_a_time() {
    let mut a = scene();
    let mut s = RecordingSurface::new(800, 600);
    a.tick(0.0, &mut s);
    assert_eq!(a.state(), AssemblyState::Falling);
    assert_eq!(visible(&a), 1);

    // fall 600 + wait 120 per piece.
    a.tick(720.0, &mut s);
    assert_eq!(a.state(), AssemblyState::Falling);
    assert_eq!(visible(&a), 2);
    assert_eq!(a.machine().placed(), 1);
}

#[test]
fn full_cycle_returns_to_falling_with_a_new_order() {
    let mut a = scene();
    let first = a.machine().order().to_vec();
    let mut s = RecordingSurface::new(800, 600);

    // 27 fall+wait pairs, then the final fall.
    let complete_at = 27.0 * 720.0 + 600.0;
    a.tick(complete_at, &mut s);
    assert_eq!(a.state(), AssemblyState::Complete);
    assert_eq!(visible(&a), 28);

    a.tick(complete_at + 3000.0, &mut s);
    assert_eq!(a.state(), AssemblyState::Exploding);

    a.tick(complete_at + 3600.0, &mut s);
    assert!(a.pieces().iter().all(|p| p.state().is_some_and(|st| st.opacity < 1.0)));

    a.tick(complete_at + 4200.0, &mut s);
    assert_eq!(a.state(), AssemblyState::Falling);
    assert_eq!(a.machine().cycles(), 1);
    assert_ne!(a.machine().order(), first.as_slice());
    assert_eq!(a.machine().order().last(), Some(&27));
}

#[test]
fn reset_restarts_at_time_zero() {
    let mut a = scene();
    let mut s = RecordingSurface::new(800, 600);
    a.tick(5000.0, &mut s);
    assert!(a.machine().placed() > 0);
    a.reset();
    assert_eq!(a.machine().placed(), 0);
    assert_eq!(a.state(), AssemblyState::Falling);
    assert_eq!(a.machine().state_since_ms(), 0.0);
}

#[test]
fn tick_paints_something_over_the_background() {
    let mut a = scene();
    let mut s = RecordingSurface::new(800, 600);
    a.tick(20_000.0, &mut s);
    assert!(s.fill_count() > 1);
}

#[test]
fn pieces_keep_the_pose_the_scene_gave_them() {
    let mut a = scene();
    let mut s = RecordingSurface::new(800, 600);
    a.tick(300.0, &mut s);
    let posed: Vec<_> = a.pieces().iter().map(|p| p.state().copied()).collect();

    for piece in a.pieces.entities_mut() {
        piece.update(5_000.0);
    }
    let after: Vec<_> = a.pieces().iter().map(|p| p.state().copied()).collect();
    assert_eq!(posed, after);
}
