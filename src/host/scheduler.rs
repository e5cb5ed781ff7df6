use std::collections::VecDeque;

/// Opaque handle to one scheduled refresh callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// The host's refresh-synchronized scheduling primitive.
///
/// `request_frame` asks for exactly one callback on the next display refresh; the host later
/// delivers it to [`FrameLoop::on_frame`](crate::FrameLoop::on_frame) together with the handle.
/// Cancelling an unknown or already-delivered handle must be harmless.
pub trait RefreshScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Queue-backed scheduler for headless hosts and tests.
///
/// Requests wait in the queue until the host drains them with [`ManualScheduler::take_due`].
/// Drained handles are out of the scheduler's hands: cancelling them no longer has any effect,
/// which mirrors a callback the display already queued.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every pending request, oldest first.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        self.pending.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Requests actually removed by `cancel_frame`.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl RefreshScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/scheduler.rs"]
mod tests;
