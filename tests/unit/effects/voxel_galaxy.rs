use super::*;
use crate::render::record::RecordingSurface;

fn scene() -> VoxelGalaxy {
    VoxelGalaxy::new(
        &VoxelGalaxyParams::default(),
        Viewport::new(1280.0, 720.0).unwrap(),
        42,
    )
    .unwrap()
}

#[test]
fn voxel_counts_match_bodies() {
    let g = scene();
    let planet_voxels: usize = PLANETS.iter().map(|p| (p.size * 3.0) as usize).sum();
    assert_eq!(g.voxels().len(), 150 + planet_voxels);
}

#[test]
fn progress_is_zero_then_linear_then_one() {
    let g = scene();
    assert_eq!(g.progress_at(0.0), Progress::START);
    assert_eq!(g.progress_at(4999.0), Progress::START);
    assert_eq!(g.progress_at(5000.0), Progress::START);
    assert!((g.progress_at(7500.0).get() - 0.5).abs() < 1e-12);
    assert_eq!(g.progress_at(10_000.0), Progress::END);
    assert_eq!(g.progress_at(14_999.0), Progress::END);
    assert_eq!(g.progress_at(15_000.0), Progress::START);
}

#[test]
fn scattered_voxels_sit_on_their_targets() {
    let mut g = scene();
    let mut s = RecordingSurface::new(1280, 720);
    g.tick(12_000.0, &mut s);
    for v in g.voxels() {
        assert!((v.position() - v.target()).length() < 1e-9);
    }
}

#[test]
fn voxels_are_painted_low_to_high() {
    let mut g = scene();
    let mut s = RecordingSurface::new(1280, 720);
    g.tick(1000.0, &mut s);
    let view = IsoView {
        origin: Point::new(640.0, 360.0),
        scale: 1.0,
    };
    let order = g.voxels.back_to_front(&view);
    let zs: Vec<f64> = order.iter().map(|&i| g.voxels()[i].position().z).collect();
    assert!(zs.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn orbit_rings_fade_out_halfway_through_the_transform() {
    let rings = |now: f64| {
        let mut g = scene();
        let mut s = RecordingSurface::new(1280, 720);
        g.tick(now, &mut s);
        s.stroke_count()
    };
    assert_eq!(rings(1000.0), PLANETS.len());
    assert_eq!(rings(6000.0), PLANETS.len());
    assert_eq!(rings(8000.0), 0);
    assert_eq!(rings(12_000.0), 0);
}

#[test]
fn same_seed_same_layout() {
    let a = scene();
    let b = scene();
    let pa: Vec<Vec3> = a.voxels().iter().map(Voxel::target).collect();
    let pb: Vec<Vec3> = b.voxels().iter().map(Voxel::target).collect();
    assert_eq!(pa, pb);
}
