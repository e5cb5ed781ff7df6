use super::*;
use crate::foundation::core::{Point, Rgba8};
use crate::render::record::{DrawOp, RecordingSurface};

#[derive(Debug)]
struct Dot {
    id: f64,
    depth: f64,
    updates: u32,
    last_now: f64,
}

impl Dot {
    fn new(id: f64, depth: f64) -> Self {
        Self {
            id,
            depth,
            updates: 0,
            last_now: f64::NAN,
        }
    }
}

impl Entity for Dot {
    type View = ();

    fn update(&mut self, now_ms: f64) {
        self.updates += 1;
        self.last_now = now_ms;
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &()) {
        surface.fill_circle(Point::new(self.id, 0.0), 1.0, Rgba8::opaque(255, 255, 255));
    }
}

impl Depth for Dot {
    fn depth(&self, _view: &()) -> f64 {
        self.depth
    }
}

fn drawn_ids(s: &RecordingSurface) -> Vec<f64> {
    s.ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::FillPath { path, .. } => {
                let b = kurbo::Shape::bounding_box(path);
                Some(((b.x0 + b.x1) / 2.0).round())
            }
            _ => None,
        })
        .collect()
}

#[test]
fn tick_updates_all_then_draws_in_insertion_order() {
    let mut c: Composer<Dot> = [Dot::new(1.0, 0.0), Dot::new(2.0, 0.0), Dot::new(3.0, 0.0)]
        .into_iter()
        .collect();
    let mut s = RecordingSurface::new(10, 10);
    c.tick(16.0, &mut s, &());

    assert!(c.entities().iter().all(|d| d.updates == 1 && d.last_now == 16.0));
    assert_eq!(drawn_ids(&s), vec![1.0, 2.0, 3.0]);
}

#[test]
fn depth_sorted_tick_draws_farthest_first_and_is_stable() {
    let mut c = Composer::new(vec![
        Dot::new(1.0, 5.0),
        Dot::new(2.0, 9.0),
        Dot::new(3.0, 5.0),
        Dot::new(4.0, -1.0),
    ]);
    assert_eq!(c.back_to_front(&()), vec![1, 0, 2, 3]);

    let mut s = RecordingSurface::new(10, 10);
    c.tick_depth_sorted(0.0, &mut s, &());
    assert_eq!(drawn_ids(&s), vec![2.0, 1.0, 3.0, 4.0]);
}

#[test]
fn nan_depths_do_not_panic() {
    let c = Composer::new(vec![Dot::new(1.0, f64::NAN), Dot::new(2.0, 1.0)]);
    assert_eq!(c.back_to_front(&()).len(), 2);
}

#[test]
fn replace_all_swaps_the_whole_set() {
    let mut c = Composer::new(vec![Dot::new(1.0, 0.0)]);
    let old = c.replace_all(vec![Dot::new(7.0, 0.0), Dot::new(8.0, 0.0)]);
    assert_eq!(old.len(), 1);
    assert_eq!(c.len(), 2);
    assert_eq!(c.entities()[0].id, 7.0);
}

#[test]
fn default_is_empty_for_any_entity_type() {
    #[allow(dead_code)]
    struct NoDefault(u8);

    let c: Composer<NoDefault> = Composer::default();
    assert!(c.is_empty());
    assert_eq!(c.len(), 0);
}
