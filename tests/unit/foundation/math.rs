use super::*;

#[test]
fn rng_is_deterministic_per_seed() {
    let mut a = Rng64::new(7);
    let mut b = Rng64::new(7);
    for _ in 0..16 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
    let mut c = Rng64::new(8);
    assert_ne!(Rng64::new(7).next_u64(), c.next_u64());
}

#[test]
fn unit_floats_stay_in_range() {
    let mut rng = Rng64::new(42);
    for _ in 0..1000 {
        let v = rng.next_f64();
        assert!((0.0..1.0).contains(&v));
        let k = rng.below(5);
        assert!(k < 5);
    }
    assert_eq!(rng.below(0), 0);
}

#[test]
fn permutation_covers_every_index_once() {
    let mut rng = Rng64::new(3);
    let mut p = permutation(27, &mut rng);
    p.sort_unstable();
    assert_eq!(p, (0..27).collect::<Vec<_>>());
}

#[test]
fn successive_permutations_differ() {
    let mut rng = Rng64::new(11);
    let a = permutation(27, &mut rng);
    let b = permutation(27, &mut rng);
    assert_ne!(a, b);
}

#[test]
fn clamp01_maps_nan_to_zero() {
    assert_eq!(clamp01(f64::NAN), 0.0);
    assert_eq!(clamp01(-1.0), 0.0);
    assert_eq!(clamp01(2.0), 1.0);
}
