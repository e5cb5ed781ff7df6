use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::foundation::core::Viewport;
use crate::foundation::error::LoopResult;
use crate::render::surface::Surface;

/// Keeps a surface's backing buffer at `logical size × density`.
///
/// Effects always see the logical viewport; only the surface knows about device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceAdapter {
    logical: Viewport,
    density: f64,
}

/// Missing, zero, negative or non-finite densities mean 1.
pub fn sanitize_density(density: Option<f64>) -> f64 {
    match density {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => 1.0,
    }
}

impl SurfaceAdapter {
    pub fn new(logical: Viewport) -> Self {
        Self {
            logical,
            density: 1.0,
        }
    }

    /// Logical viewport size.
    pub fn current_size(&self) -> (f64, f64) {
        (self.logical.width, self.logical.height)
    }

    pub fn viewport(&self) -> Viewport {
        self.logical
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Backing buffer size in device pixels for the current density.
    pub fn backing_size(&self) -> (u32, u32) {
        backing_px(self.logical, self.density)
    }

    /// Resize `surface` to the backing size for `density` (default 1).
    pub fn sync_surface_scale<S: Surface + ?Sized>(
        &mut self,
        density: Option<f64>,
        surface: &mut S,
    ) -> LoopResult<()> {
        self.resize_to(self.logical, density, surface)
    }

    /// Move to a new logical viewport and density.
    ///
    /// The adapter only takes the new values once `surface` accepted the matching backing size;
    /// on error both stay as they were.
    pub fn resize_to<S: Surface + ?Sized>(
        &mut self,
        logical: Viewport,
        density: Option<f64>,
        surface: &mut S,
    ) -> LoopResult<()> {
        let density = sanitize_density(density);
        let (w, h) = backing_px(logical, density);
        tracing::debug!(
            logical_w = logical.width,
            logical_h = logical.height,
            density,
            w,
            h,
            "sync surface scale"
        );
        surface.resize(w, h, density)?;
        self.logical = logical;
        self.density = density;
        Ok(())
    }
}

fn backing_px(logical: Viewport, density: f64) -> (u32, u32) {
    let px = |v: f64| (v * density).round().clamp(1.0, f64::from(u32::MAX)) as u32;
    (px(logical.width), px(logical.height))
}

/// Latest viewport published by a host resize source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeSnapshot {
    pub viewport: Viewport,
    pub density: Option<f64>,
    /// Monotonic publish counter; lets readers skip snapshots they already applied.
    pub generation: u64,
}

#[derive(Debug)]
struct ResizeShared {
    /// `width` in the high 32 bits, `height` in the low 32 bits (logical units, f32 bits).
    size: AtomicU64,
    density_bits: AtomicU64,
    generation: AtomicU64,
    attached: AtomicBool,
}

/// A resize notification channel that may be published into from another thread.
///
/// Width and height are packed into one atomic word so a reader never observes the width of one
/// resize with the height of another.
#[derive(Clone, Debug)]
pub struct ResizeSignal {
    shared: Arc<ResizeShared>,
}

fn pack(viewport: Viewport) -> u64 {
    let w = (viewport.width as f32).to_bits();
    let h = (viewport.height as f32).to_bits();
    (u64::from(w) << 32) | u64::from(h)
}

fn unpack(bits: u64) -> (f64, f64) {
    let w = f32::from_bits((bits >> 32) as u32);
    let h = f32::from_bits(bits as u32);
    (f64::from(w), f64::from(h))
}

const NO_DENSITY: u64 = u64::MAX;

impl ResizeSignal {
    pub fn new(initial: Viewport) -> Self {
        Self {
            shared: Arc::new(ResizeShared {
                size: AtomicU64::new(pack(initial)),
                density_bits: AtomicU64::new(NO_DENSITY),
                generation: AtomicU64::new(0),
                attached: AtomicBool::new(true),
            }),
        }
    }

    /// Publish a new viewport. Returns `false` once the listener was detached.
    pub fn publish(&self, viewport: Viewport, density: Option<f64>) -> bool {
        if !self.is_attached() {
            return false;
        }
        let density_bits = density.map_or(NO_DENSITY, f64::to_bits);
        self.shared.density_bits.store(density_bits, Ordering::Release);
        self.shared.size.store(pack(viewport), Ordering::Release);
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Most recent published viewport, or `None` when detached or unusable.
    pub fn snapshot(&self) -> Option<ResizeSnapshot> {
        if !self.is_attached() {
            return None;
        }
        let generation = self.shared.generation.load(Ordering::Acquire);
        let (w, h) = unpack(self.shared.size.load(Ordering::Acquire));
        let density = match self.shared.density_bits.load(Ordering::Acquire) {
            NO_DENSITY => None,
            bits => Some(f64::from_bits(bits)),
        };
        let viewport = Viewport::new(w, h).ok()?;
        Some(ResizeSnapshot {
            viewport,
            density,
            generation,
        })
    }

    /// Stop listening. Later publishes are ignored.
    pub fn detach(&self) {
        self.shared.attached.store(false, Ordering::Release);
    }

    pub fn is_attached(&self) -> bool {
        self.shared.attached.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/adapter.rs"]
mod tests;
