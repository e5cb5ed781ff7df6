use super::*;
use crate::render::record::RecordingSurface;

fn fish(seed: u64) -> VoxelFish {
    VoxelFish::new(
        &VoxelFishParams::default(),
        Viewport::new(640.0, 480.0).unwrap(),
        seed,
    )
    .unwrap()
}

#[test]
fn body_leaves_one_cell_out_and_adds_fin_and_eye() {
    let f = fish(1);
    assert_eq!(f.parts().len(), 28);
    assert_eq!(f.parts().iter().filter(|p| p.breathes()).count(), 26);

    let hole = Vec3::new(0.0, 0.0, 0.62);
    assert!(
        f.parts()
            .iter()
            .filter(|p| p.breathes())
            .all(|p| (p.rest() - hole).length() > 1e-9)
    );
    assert!(matches!(
        f.parts()[26].solid().variant,
        EntityVariant::Tail { sides: 3, .. }
    ));
    assert!(matches!(
        f.parts()[27].solid().variant,
        EntityVariant::Eye { .. }
    ));
}

#[test]
fn breathing_is_a_pure_function_of_time() {
    let mut a = fish(3);
    let mut b = fish(3);
    let mut s = RecordingSurface::new(640, 480);
    a.tick(0.0, &mut s);
    a.tick(4321.0, &mut s);
    b.tick(4321.0, &mut s);
    for (pa, pb) in a.parts().iter().zip(b.parts()) {
        assert_eq!(pa.solid().pose.position, pb.solid().pose.position);
    }
}

#[test]
fn breathing_stays_close_to_rest() {
    let mut f = fish(5);
    let mut s = RecordingSurface::new(640, 480);
    for frame in 0..40 {
        f.tick(frame as f64 * 250.0, &mut s);
        for part in f.parts() {
            assert!((part.solid().pose.position - part.rest()).length() < 0.04);
        }
    }
}

#[test]
fn fin_and_eye_do_not_move() {
    let mut f = fish(7);
    let mut s = RecordingSurface::new(640, 480);
    f.tick(2500.0, &mut s);
    for part in f.parts().iter().filter(|p| !p.breathes()) {
        assert_eq!(part.solid().pose.position, part.rest());
    }
}

#[test]
fn every_frame_paints_the_whole_fish() {
    let mut f = fish(9);
    let mut s = RecordingSurface::new(640, 480);
    f.tick(1000.0, &mut s);
    assert!(s.fill_count() > 28);
}
