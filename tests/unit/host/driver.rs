use super::*;
use crate::host::scheduler::ManualScheduler;
use crate::render::record::RecordingSurface;

#[derive(Debug, Default)]
struct Probe {
    ticks: u32,
    last_now: f64,
    resized: Vec<Viewport>,
}

impl Scene for Probe {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.resized.push(viewport);
    }

    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        self.ticks += 1;
        self.last_now = now_ms;
        surface.mark("probe");
    }
}

fn vp(w: f64, h: f64) -> Viewport {
    Viewport::new(w, h).unwrap()
}

fn mounted() -> FrameLoop<Probe, RecordingSurface> {
    let mut lp = FrameLoop::new(Probe::default(), vp(800.0, 600.0));
    lp.mount(RecordingSurface::new(1, 1));
    lp
}

#[test]
fn start_without_surface_or_scheduler_is_not_ready() {
    let mut sched = ManualScheduler::new();
    let mut lp: FrameLoop<Probe, RecordingSurface> = FrameLoop::new(Probe::default(), vp(8.0, 8.0));
    assert_eq!(
        lp.start(Some(&mut sched), None),
        StartOutcome::NotReady(NotReady::NoSurface)
    );
    lp.mount(RecordingSurface::new(1, 1));
    assert_eq!(
        lp.start(None::<&mut ManualScheduler>, None),
        StartOutcome::NotReady(NotReady::NoScheduler)
    );
    assert!(!lp.is_running());
    assert_eq!(sched.requested(), 0);
}

#[test]
fn start_sizes_surface_and_schedules_one_frame() {
    let mut sched = ManualScheduler::new();
    let mut lp = mounted();
    assert_eq!(lp.start(Some(&mut sched), Some(2.0)), StartOutcome::Started);
    assert_eq!(lp.surface().unwrap().size_px(), (1600, 1200));
    assert_eq!(lp.scene().resized, vec![vp(800.0, 600.0)]);
    assert_eq!(sched.pending(), 1);

    assert_eq!(lp.start(Some(&mut sched), Some(2.0)), StartOutcome::AlreadyRunning);
    assert_eq!(sched.pending(), 1);
}

#[test]
fn elapsed_time_is_relative_to_first_frame_and_monotonic() {
    let mut sched = ManualScheduler::new();
    let mut lp = mounted();
    lp.start(Some(&mut sched), None);

    for ts in [1000.0, 1016.0, 1008.0, f64::NAN, 1050.0] {
        let h = sched.take_due()[0];
        assert_eq!(lp.on_frame(h, ts, &mut sched), FrameOutcome::Rendered);
    }
    assert_eq!(lp.scene().ticks, 5);
    assert_eq!(lp.scene().last_now, 50.0);
    assert_eq!(lp.elapsed_ms(), 50.0);
    assert_eq!(lp.surface().unwrap().frames_begun(), 5);
    assert_eq!(lp.surface().unwrap().frames_ended(), 5);
}

#[test]
fn unknown_handles_are_ignored() {
    let mut sched = ManualScheduler::new();
    let mut lp = mounted();
    lp.start(Some(&mut sched), None);
    assert_eq!(
        lp.on_frame(FrameHandle(999), 0.0, &mut sched),
        FrameOutcome::Ignored
    );
    assert_eq!(lp.scene().ticks, 0);
}

#[test]
fn stop_is_idempotent_and_safe_before_start() {
    let mut sched = ManualScheduler::new();
    let mut lp = mounted();
    lp.stop(&mut sched);
    lp.stop(&mut sched);
    assert!(!lp.is_running());

    lp.start(Some(&mut sched), None);
    lp.stop(&mut sched);
    lp.stop(&mut sched);
    assert_eq!(sched.cancelled(), 1);
    assert_eq!(sched.pending(), 0);
    assert!(lp.pending().is_none());
}

#[test]
fn callback_queued_before_stop_does_not_update() {
    let mut sched = ManualScheduler::new();
    let mut lp = mounted();
    lp.start(Some(&mut sched), None);
    let h = sched.take_due()[0];
    lp.on_frame(h, 0.0, &mut sched);

    // The host already dequeued the next callback when stop runs.
    let queued = sched.take_due()[0];
    lp.stop(&mut sched);
    assert_eq!(lp.on_frame(queued, 16.0, &mut sched), FrameOutcome::Ignored);
    assert_eq!(lp.scene().ticks, 1);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn published_resize_is_applied_at_next_frame() {
    let mut sched = ManualScheduler::new();
    let signal = ResizeSignal::new(vp(800.0, 600.0));
    let mut lp = mounted().with_resize_signal(signal.clone());
    lp.start(Some(&mut sched), Some(2.0));

    signal.publish(vp(400.0, 300.0), None);
    let h = sched.take_due()[0];
    lp.on_frame(h, 0.0, &mut sched);
    assert_eq!(lp.adapter().current_size(), (400.0, 300.0));
    assert_eq!(lp.surface().unwrap().size_px(), (800, 600));
    assert_eq!(lp.scene().resized.last(), Some(&vp(400.0, 300.0)));

    // Same generation is not re-applied.
    let h = sched.take_due()[0];
    lp.on_frame(h, 16.0, &mut sched);
    assert_eq!(lp.scene().resized.len(), 2);

    lp.stop(&mut sched);
    assert!(!signal.is_attached());
    assert!(!signal.publish(vp(10.0, 10.0), None));
}

#[test]
fn unmount_stops_before_releasing_surface() {
    let mut sched = ManualScheduler::new();
    let mut lp = mounted();
    lp.start(Some(&mut sched), None);
    let surface = lp.unmount(&mut sched);
    assert!(surface.is_some());
    assert!(!lp.is_running());
    assert_eq!(sched.pending(), 0);
    assert!(lp.surface().is_none());
}

#[test]
fn resize_the_surface_refuses_leaves_scene_and_buffer_in_step() {
    use crate::render::cpu::CpuSurface;

    let mut sched = ManualScheduler::new();
    let signal = ResizeSignal::new(vp(400.0, 300.0));
    let mut lp = FrameLoop::new(Probe::default(), vp(400.0, 300.0))
        .with_resize_signal(signal.clone());
    lp.mount(CpuSurface::new(1, 1, 1.0).unwrap());
    lp.start(Some(&mut sched), None);

    signal.publish(vp(70_000.0, 300.0), None);
    let h = sched.take_due()[0];
    assert_eq!(lp.on_frame(h, 0.0, &mut sched), FrameOutcome::Rendered);

    assert_eq!(lp.adapter().current_size(), (400.0, 300.0));
    assert_eq!(lp.adapter().backing_size(), lp.surface().unwrap().size_px());
    assert_eq!(lp.scene().resized, vec![vp(400.0, 300.0)]);
    assert_eq!(lp.scene().ticks, 1);

    // A later, acceptable resize still goes through.
    signal.publish(vp(200.0, 100.0), None);
    let h = sched.take_due()[0];
    lp.on_frame(h, 16.0, &mut sched);
    assert_eq!(lp.surface().unwrap().size_px(), (200, 100));
    assert_eq!(lp.scene().resized.last(), Some(&vp(200.0, 100.0)));
}
