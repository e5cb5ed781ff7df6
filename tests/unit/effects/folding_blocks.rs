use super::*;
use crate::render::record::RecordingSurface;

fn schedule() -> Arc<PhaseSchedule<FoldPhase>> {
    Arc::new(FoldingBlocksParams::default().schedule().unwrap())
}

fn marks_at(now_ms: f64) -> Vec<&'static str> {
    let mut block = FoldingBlock::new(Vec2::ZERO, 60.0, 0, schedule());
    block.update(now_ms);
    let mut s = RecordingSurface::new(400, 300);
    block.draw(&mut s, &Point::new(200.0, 150.0));
    s.marks()
}

#[test]
fn progress_follows_fold_hold_unfold_rest() {
    let p = |ms: f64| {
        let mut b = FoldingBlock::new(Vec2::ZERO, 60.0, 0, schedule());
        b.update(ms);
        b.progress().get()
    };
    assert_eq!(p(0.0), 0.0);
    assert!((p(1000.0) - 0.5).abs() < 1e-12);
    assert_eq!(p(2000.0), 1.0);
    assert_eq!(p(3999.0), 1.0);
    assert!((p(5000.0) - 0.5).abs() < 1e-12);
    assert_eq!(p(6000.0), 0.0);
    assert_eq!(p(7999.0), 0.0);
    assert_eq!(p(8000.0), 0.0);
}

#[test]
fn exact_boundaries_select_discrete_variants() {
    assert_eq!(marks_at(0.0), vec!["fold.flat"]);
    assert_eq!(marks_at(6500.0), vec!["fold.flat"]);
    assert_eq!(marks_at(1000.0), vec!["fold.origami"]);
    assert_eq!(marks_at(5000.0), vec!["fold.origami"]);
    assert_eq!(marks_at(2000.0), vec!["fold.cube"]);
    assert_eq!(marks_at(3000.0), vec!["fold.cube"]);
}

#[test]
fn variants_issue_different_primitive_sets() {
    let draw = |ms: f64| {
        let mut b = FoldingBlock::new(Vec2::ZERO, 60.0, 0, schedule());
        b.update(ms);
        let mut s = RecordingSurface::new(400, 300);
        b.draw(&mut s, &Point::ZERO);
        (s.fill_count(), s.stroke_count())
    };
    assert_eq!(draw(0.0), (5, 5));
    assert_eq!(draw(1000.0), (5, 6));
    assert_eq!(draw(2000.0), (2, 3));
}

#[test]
fn update_is_idempotent() {
    let mut b = FoldingBlock::new(Vec2::ZERO, 60.0, 3, schedule());
    b.update(1234.0);
    let once = b.progress();
    b.update(1234.0);
    assert_eq!(b.progress(), once);
}

#[test]
fn stagger_delays_later_blocks() {
    let mut first = FoldingBlock::new(Vec2::ZERO, 60.0, 0, schedule());
    let mut tenth = FoldingBlock::new(Vec2::ZERO, 60.0, 10, schedule());
    first.update(1000.0);
    tenth.update(1000.0);
    assert!(first.progress().get() > 0.0);
    // Index 10 starts at 2000 ms.
    assert_eq!(tenth.progress(), Progress::START);
    tenth.update(3000.0);
    assert_eq!(tenth.progress().get(), first.progress().get());
}

#[test]
fn grid_layout_offsets_odd_rows() {
    let vp = Viewport::new(1200.0, 800.0).unwrap();
    let scene = FoldingBlocks::new(&FoldingBlocksParams::default(), vp, 1).unwrap();
    assert_eq!(scene.blocks().len(), 48);
    assert_eq!(scene.blocks()[0].offset, Vec2::new(-480.0, -360.0));
    assert_eq!(scene.blocks()[8].offset, Vec2::new(-420.0, -240.0));
}

#[test]
fn tick_clears_then_draws_every_block() {
    let vp = Viewport::new(1200.0, 800.0).unwrap();
    let mut scene = FoldingBlocks::new(&FoldingBlocksParams::default(), vp, 1).unwrap();
    let mut s = RecordingSurface::new(1200, 800);
    scene.tick(0.0, &mut s);
    let marks = s.marks();
    assert_eq!(marks.len(), 48);
    assert!(marks.iter().all(|m| *m == "fold.flat"));
    assert_eq!(scene.name(), "folding_blocks");
}
