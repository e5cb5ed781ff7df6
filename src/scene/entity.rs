use crate::render::surface::Surface;

/// How far an entity is through its current visual transformation, always in [0,1].
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Progress(f64);

impl Progress {
    pub const START: Self = Self(0.0);
    pub const END: Self = Self(1.0);

    /// Clamp `v` into [0,1]; NaN maps to 0.
    pub fn new(v: f64) -> Self {
        Self(crate::foundation::math::clamp01(v))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Discrete rendering branch for this progress value.
    ///
    /// Exactly 0 selects [`Variant::Initial`], exactly 1 selects [`Variant::Final`], anything
    /// else is [`Variant::Between`].
    pub fn variant(self) -> Variant {
        if self.0 == 0.0 {
            Variant::Initial
        } else if self.0 == 1.0 {
            Variant::Final
        } else {
            Variant::Between(self.0)
        }
    }
}

/// Qualitatively different draw routines selected by [`Progress::variant`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Variant {
    Initial,
    Between(f64),
    Final,
}

/// One animated visual primitive.
///
/// `update` recomputes all derived state from `now_ms` alone, so calling it twice with the same
/// time is idempotent. `draw` only issues primitives.
pub trait Entity {
    /// Per-frame drawing context (an origin offset for 2D entities, a projector for 3D ones).
    type View;

    fn update(&mut self, now_ms: f64);

    fn draw(&self, surface: &mut dyn Surface, view: &Self::View);
}

/// Entities that may overlap in projected space and must be painted back to front.
pub trait Depth: Entity {
    /// Larger is farther from the viewer.
    fn depth(&self, view: &Self::View) -> f64;
}

#[cfg(test)]
#[path = "../../tests/unit/scene/entity.rs"]
mod tests;
