use crate::foundation::error::{LoopError, LoopResult};
use crate::host::driver::{FrameLoop, FrameOutcome};
use crate::host::scheduler::{FrameHandle, ManualScheduler, RefreshScheduler};
use crate::render::surface::Surface;
use crate::scene::composer::Scene;

/// A display stand-in that fires refresh callbacks at a fixed rate.
#[derive(Clone, Debug)]
pub struct HeadlessHost {
    scheduler: ManualScheduler,
    fps: f64,
    frame_index: u64,
}

impl HeadlessHost {
    pub fn new(fps: f64) -> LoopResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(LoopError::config(format!("fps must be positive, got {fps}")));
        }
        Ok(Self {
            scheduler: ManualScheduler::new(),
            fps,
            frame_index: 0,
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn scheduler(&mut self) -> &mut ManualScheduler {
        &mut self.scheduler
    }

    /// Host timestamp of the next refresh.
    pub fn next_timestamp_ms(&self) -> f64 {
        self.frame_index as f64 * 1000.0 / self.fps
    }

    /// Fire one refresh: deliver every due callback at the next timestamp.
    pub fn step<Sc: Scene, Sf: Surface>(&mut self, lp: &mut FrameLoop<Sc, Sf>) -> FrameOutcome {
        let ts = self.next_timestamp_ms();
        self.frame_index += 1;
        let mut outcome = FrameOutcome::Ignored;
        for handle in self.scheduler.take_due() {
            if lp.on_frame(handle, ts, &mut self.scheduler) == FrameOutcome::Rendered {
                outcome = FrameOutcome::Rendered;
            }
        }
        outcome
    }

    /// Fire `frames` refreshes, calling `each` after every rendered frame.
    ///
    /// Stops early once the loop no longer has a pending callback.
    pub fn run<Sc: Scene, Sf: Surface>(
        &mut self,
        lp: &mut FrameLoop<Sc, Sf>,
        frames: u64,
        mut each: impl FnMut(u64, &FrameLoop<Sc, Sf>) -> LoopResult<()>,
    ) -> LoopResult<u64> {
        let mut rendered = 0;
        for _ in 0..frames {
            if self.scheduler.pending() == 0 {
                break;
            }
            if self.step(lp) == FrameOutcome::Rendered {
                each(rendered, lp)?;
                rendered += 1;
            }
        }
        Ok(rendered)
    }

    /// Cancel whatever the loop has pending.
    pub fn stop<Sc: Scene, Sf: Surface>(&mut self, lp: &mut FrameLoop<Sc, Sf>) {
        lp.stop(&mut self.scheduler);
    }
}

impl RefreshScheduler for HeadlessHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.scheduler.request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.scheduler.cancel_frame(handle);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/headless.rs"]
mod tests;
