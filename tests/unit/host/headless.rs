use super::*;
use crate::foundation::core::Viewport;
use crate::host::driver::StartOutcome;
use crate::render::record::RecordingSurface;

#[derive(Debug, Default)]
struct Clock {
    seen: Vec<f64>,
}

impl Scene for Clock {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn resize(&mut self, _viewport: Viewport) {}

    fn tick(&mut self, now_ms: f64, _surface: &mut dyn Surface) {
        self.seen.push(now_ms);
    }
}

fn started(host: &mut HeadlessHost) -> FrameLoop<Clock, RecordingSurface> {
    let mut lp = FrameLoop::new(Clock::default(), Viewport::new(64.0, 48.0).unwrap());
    lp.mount(RecordingSurface::new(1, 1));
    assert_eq!(lp.start(Some(host), None), StartOutcome::Started);
    lp
}

#[test]
fn rejects_non_positive_fps() {
    assert!(HeadlessHost::new(0.0).is_err());
    assert!(HeadlessHost::new(f64::NAN).is_err());
}

#[test]
fn run_delivers_fixed_rate_timestamps() {
    let mut host = HeadlessHost::new(50.0).unwrap();
    let mut lp = started(&mut host);
    let mut calls = Vec::new();
    let n = host
        .run(&mut lp, 4, |i, _| {
            calls.push(i);
            Ok(())
        })
        .unwrap();
    assert_eq!(n, 4);
    assert_eq!(calls, vec![0, 1, 2, 3]);
    assert_eq!(lp.scene().seen, vec![0.0, 20.0, 40.0, 60.0]);
}

#[test]
fn run_ends_once_loop_is_stopped() {
    let mut host = HeadlessHost::new(60.0).unwrap();
    let mut lp = started(&mut host);
    host.step(&mut lp);
    host.stop(&mut lp);
    assert_eq!(host.step(&mut lp), FrameOutcome::Ignored);
    assert_eq!(host.run(&mut lp, 10, |_, _| Ok(())).unwrap(), 0);
    assert_eq!(lp.frames_rendered(), 1);
}

#[test]
fn callback_errors_propagate() {
    let mut host = HeadlessHost::new(60.0).unwrap();
    let mut lp = started(&mut host);
    let err = host
        .run(&mut lp, 3, |_, _| Err(LoopError::surface("disk full")))
        .unwrap_err();
    assert!(matches!(err, LoopError::Surface(_)));
}
