use std::collections::HashSet;

use super::*;
use crate::render::record::RecordingSurface;

fn puzzle() -> SlidingPuzzle {
    SlidingPuzzle::new(
        &SlidingPuzzleParams::default(),
        Viewport::new(1280.0, 720.0).unwrap(),
        5,
    )
    .unwrap()
}

fn assert_consistent(p: &SlidingPuzzle) {
    assert_eq!(p.board().empties().len(), 8);
    assert_eq!(p.board().cube_count(), p.cubes().len());
    let mut seen = HashSet::new();
    for (id, cube) in p.cubes().iter().enumerate() {
        assert!(seen.insert(cube.cell()), "two cubes claim {:?}", cube.cell());
        if !cube.is_sliding() {
            assert_eq!(p.board().occupant(cube.cell()), Some(id));
        }
    }
}

#[test]
fn board_numbers_cubes_around_the_holes() {
    let b = Board::new(3, 2, &[(0, 1), (1, 2)]);
    assert_eq!(b.cube_count(), 4);
    assert_eq!(b.empties(), vec![(0, 1), (1, 2)]);
    assert_eq!(b.occupant((0, 0)), Some(0));
    assert_eq!(b.occupant((0, 2)), Some(1));
    assert_eq!(b.occupant((1, 1)), Some(3));
    assert_eq!(b.occupant((5, 5)), None);
}

#[test]
fn neighbors_skip_edges_and_holes() {
    let b = Board::new(3, 2, &[(0, 1)]);
    let n: Vec<Cell> = b.neighbors((0, 0)).into_iter().map(|(c, _)| c).collect();
    assert_eq!(n, vec![(1, 0)]);
    let n: Vec<Cell> = b.neighbors((0, 1)).into_iter().map(|(c, _)| c).collect();
    assert_eq!(n, vec![(1, 1), (0, 0), (0, 2)]);
}

#[test]
fn commit_moves_a_cube_in_one_step() {
    let mut b = Board::new(3, 2, &[(0, 1)]);
    let slide = Slide {
        cube: 0,
        from: (0, 0),
        to: (0, 1),
        start_ms: 0.0,
    };
    assert!(b.commit(&slide));
    assert_eq!(b.occupant((0, 1)), Some(0));
    assert_eq!(b.occupant((0, 0)), None);
    assert_eq!(b.empties(), vec![(0, 0)]);
    // Stale slides are refused without touching the board.
    let before = b.clone();
    assert!(!b.commit(&slide));
    assert_eq!(b, before);
}

#[test]
fn planned_slides_never_collide() {
    let b = Board::new(20, 14, &[(0, 0), (5, 5), (5, 6), (13, 19)]);
    let a = plan_slides(&b, &[], 3, 100.0, &mut Rng64::new(2));
    let again = plan_slides(&b, &[], 3, 100.0, &mut Rng64::new(2));
    assert_eq!(a, again);
    assert_eq!(a.len(), 3);

    let cubes: HashSet<usize> = a.iter().map(|s| s.cube).collect();
    let targets: HashSet<Cell> = a.iter().map(|s| s.to).collect();
    assert_eq!(cubes.len(), 3);
    assert_eq!(targets.len(), 3);
    for s in &a {
        assert_eq!(b.occupant(s.from), Some(s.cube));
        assert_eq!(b.occupant(s.to), None);
        let d = s.from.0.abs_diff(s.to.0) + s.from.1.abs_diff(s.to.1);
        assert_eq!(d, 1);
        assert_eq!(s.start_ms, 100.0);
    }
}

#[test]
fn planning_respects_slides_in_flight() {
    let b = Board::new(3, 1, &[(0, 1)]);
    let in_flight = [Slide {
        cube: 0,
        from: (0, 0),
        to: (0, 1),
        start_ms: 0.0,
    }];
    assert!(plan_slides(&b, &in_flight, 3, 50.0, &mut Rng64::new(1)).is_empty());
}

#[test]
fn slides_start_in_bursts_and_commit_when_done() {
    let mut p = puzzle();
    assert_eq!(p.cubes().len(), 272);
    p.advance(199.0);
    assert!(p.active_slides().is_empty());
    p.advance(200.0);
    assert_eq!(p.active_slides().len(), 3);
    let first: Vec<Slide> = p.active_slides().to_vec();

    p.advance(399.0);
    assert_eq!(p.active_slides().len(), 3);
    p.advance(600.0);
    for s in &first {
        assert_eq!(p.board().occupant(s.to), Some(s.cube));
        assert!(!p.active_slides().iter().any(|a| a.cube == s.cube && a.start_ms == 200.0));
    }
    assert_consistent(&p);
}

#[test]
fn long_runs_keep_the_board_consistent() {
    let mut p = puzzle();
    let mut s = RecordingSurface::new(1280, 720);
    let mut now = 0.0;
    while now < 6000.0 {
        p.tick(now, &mut s);
        assert_consistent(&p);
        assert!(p.active_slides().len() <= 8);
        now += 1000.0 / 60.0;
    }
}

#[test]
fn sliding_cubes_pop_out_of_the_wall() {
    let mut p = puzzle();
    p.advance(200.0);
    let slide = p.active_slides()[0];
    let mut cube = p.cubes()[slide.cube].clone();
    cube.update(400.0);
    assert!((cube.position().z - 0.3).abs() < 1e-9);
    let mid = p.cell_position(slide.from).lerp(p.cell_position(slide.to), 0.5);
    assert!((cube.position().x - mid.x).abs() < 1e-9);
    assert!((cube.position().y - mid.y).abs() < 1e-9);
}
