use crate::foundation::core::Viewport;
use crate::host::adapter::{ResizeSignal, SurfaceAdapter};
use crate::host::scheduler::{FrameHandle, RefreshScheduler};
use crate::render::surface::Surface;
use crate::scene::composer::Scene;

/// Why [`FrameLoop::start`] declined to start. None of these are errors: the host simply tries
/// again once the missing piece is available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotReady {
    NoSurface,
    NoScheduler,
    /// The surface refused the backing size.
    SurfaceUnavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
    NotReady(NotReady),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// Stale or post-teardown callback; nothing was touched.
    Ignored,
}

/// Drives one scene on one surface: update, draw, reschedule.
///
/// All loop state (start reference, elapsed time, pending callback) lives here and is scoped to
/// a single mount. At most one callback is pending at any time, and a callback whose handle is
/// not the pending one is ignored, so a frame queued by the host just before [`FrameLoop::stop`]
/// never reaches the scene.
#[derive(Debug)]
pub struct FrameLoop<Sc, Sf> {
    scene: Sc,
    surface: Option<Sf>,
    adapter: SurfaceAdapter,
    resize: Option<ResizeSignal>,
    applied_generation: u64,
    live: bool,
    pending: Option<FrameHandle>,
    start_ref_ms: Option<f64>,
    elapsed_ms: f64,
    frames_rendered: u64,
}

impl<Sc: Scene, Sf: Surface> FrameLoop<Sc, Sf> {
    pub fn new(scene: Sc, viewport: Viewport) -> Self {
        Self {
            scene,
            surface: None,
            adapter: SurfaceAdapter::new(viewport),
            resize: None,
            applied_generation: 0,
            live: false,
            pending: None,
            start_ref_ms: None,
            elapsed_ms: 0.0,
            frames_rendered: 0,
        }
    }

    /// Follow viewport changes published on `signal`.
    pub fn with_resize_signal(mut self, signal: ResizeSignal) -> Self {
        self.applied_generation = signal.snapshot().map_or(0, |s| s.generation);
        self.resize = Some(signal);
        self
    }

    /// Hand the loop its drawing surface (the host's "surface is ready").
    pub fn mount(&mut self, surface: Sf) {
        self.surface = Some(surface);
    }

    /// Schedule the first frame.
    ///
    /// Returns [`StartOutcome::NotReady`] without side effects when the surface or the scheduler
    /// is missing.
    #[tracing::instrument(level = "debug", skip_all, fields(scene = self.scene.name()))]
    pub fn start<R: RefreshScheduler + ?Sized>(
        &mut self,
        scheduler: Option<&mut R>,
        density: Option<f64>,
    ) -> StartOutcome {
        if self.live {
            return StartOutcome::AlreadyRunning;
        }
        let Some(surface) = self.surface.as_mut() else {
            tracing::debug!("no surface yet, not starting");
            return StartOutcome::NotReady(NotReady::NoSurface);
        };
        let Some(scheduler) = scheduler else {
            tracing::debug!("no refresh scheduler, not starting");
            return StartOutcome::NotReady(NotReady::NoScheduler);
        };
        if let Err(err) = self.adapter.sync_surface_scale(density, surface) {
            tracing::warn!(error = %err, "surface unavailable, not starting");
            return StartOutcome::NotReady(NotReady::SurfaceUnavailable);
        }
        // Elapsed time restarts at zero, so time-keyed scene state must too.
        self.scene.reset();
        self.scene.resize(self.adapter.viewport());

        self.live = true;
        self.start_ref_ms = None;
        self.elapsed_ms = 0.0;
        self.pending = Some(scheduler.request_frame());
        tracing::debug!(handle = ?self.pending, "frame loop started");
        StartOutcome::Started
    }

    /// Deliver a refresh callback.
    pub fn on_frame<R: RefreshScheduler + ?Sized>(
        &mut self,
        handle: FrameHandle,
        timestamp_ms: f64,
        scheduler: &mut R,
    ) -> FrameOutcome {
        if !self.live || self.pending != Some(handle) {
            tracing::trace!(?handle, live = self.live, "ignoring stale frame callback");
            return FrameOutcome::Ignored;
        }
        self.pending = None;

        if timestamp_ms.is_finite() {
            let start = *self.start_ref_ms.get_or_insert(timestamp_ms);
            self.elapsed_ms = self.elapsed_ms.max(timestamp_ms - start);
        }
        self.apply_resize();

        if let Some(surface) = self.surface.as_mut() {
            surface.begin_frame();
            self.scene.tick(self.elapsed_ms, surface);
            surface.end_frame();
            self.frames_rendered += 1;
        }
        tracing::trace!(elapsed_ms = self.elapsed_ms, frame = self.frames_rendered, "frame");

        self.pending = Some(scheduler.request_frame());
        FrameOutcome::Rendered
    }

    fn apply_resize(&mut self) {
        let Some(snapshot) = self.resize.as_ref().and_then(ResizeSignal::snapshot) else {
            return;
        };
        if snapshot.generation == self.applied_generation {
            return;
        }
        self.applied_generation = snapshot.generation;
        let density = snapshot.density.or(Some(self.adapter.density()));
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Err(err) = self.adapter.resize_to(snapshot.viewport, density, surface) {
            tracing::warn!(error = %err, "resize rejected by surface, keeping previous buffer");
            return;
        }
        self.scene.resize(snapshot.viewport);
    }

    /// Cancel the pending callback and detach the resize listener. Safe to call at any time,
    /// any number of times.
    #[tracing::instrument(level = "debug", skip_all, fields(scene = self.scene.name()))]
    pub fn stop<R: RefreshScheduler + ?Sized>(&mut self, scheduler: &mut R) {
        if !self.live && self.pending.is_none() {
            return;
        }
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.live = false;
        if let Some(signal) = self.resize.take() {
            signal.detach();
        }
        tracing::debug!(frames = self.frames_rendered, "frame loop stopped");
    }

    /// Stop, then release the surface.
    pub fn unmount<R: RefreshScheduler + ?Sized>(&mut self, scheduler: &mut R) -> Option<Sf> {
        self.stop(scheduler);
        self.surface.take()
    }

    pub fn is_running(&self) -> bool {
        self.live
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Milliseconds since the first delivered frame.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn adapter(&self) -> &SurfaceAdapter {
        &self.adapter
    }

    pub fn scene(&self) -> &Sc {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Sc {
        &mut self.scene
    }

    pub fn surface(&self) -> Option<&Sf> {
        self.surface.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/driver.rs"]
mod tests;
