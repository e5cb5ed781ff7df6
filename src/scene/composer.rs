use crate::foundation::core::Viewport;
use crate::render::surface::Surface;
use crate::scene::entity::{Depth, Entity};

/// A complete looping effect as seen by the frame loop driver.
///
/// A scene owns all of its animation state. The driver hands it the elapsed time since the loop
/// started and a surface to draw into; nothing else is shared.
pub trait Scene {
    /// Stable effect name (used by the preview binary and in logs).
    fn name(&self) -> &'static str;

    /// The logical viewport changed. Layouts that depend on the viewport are rebuilt here.
    fn resize(&mut self, viewport: Viewport);

    /// Advance every entity to `now_ms` and draw the frame.
    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface);

    /// Rebuild randomized layouts from scratch. Defaults to a no-op for fixed layouts.
    fn reset(&mut self) {}
}

impl<S: Scene + ?Sized> Scene for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resize(&mut self, viewport: Viewport) {
        (**self).resize(viewport);
    }

    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        (**self).tick(now_ms, surface);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Ordered collection of entities. Insertion order is draw order unless depth sorting is
/// requested.
#[derive(Clone, Debug)]
pub struct Composer<E> {
    entities: Vec<E>,
}

impl<E> Default for Composer<E> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<E> Composer<E> {
    pub fn new(entities: Vec<E>) -> Self {
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [E] {
        &mut self.entities
    }

    /// Swap in a whole new working set, returning the previous one.
    ///
    /// Used by reshuffling effects: the new layout is built completely off to the side and
    /// installed in one move, so no entity is ever observed half-migrated.
    pub fn replace_all(&mut self, entities: Vec<E>) -> Vec<E> {
        std::mem::replace(&mut self.entities, entities)
    }
}

impl<E> FromIterator<E> for Composer<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<E: Entity> Composer<E> {
    pub fn update_all(&mut self, now_ms: f64) {
        for e in &mut self.entities {
            e.update(now_ms);
        }
    }

    pub fn draw_all(&self, surface: &mut dyn Surface, view: &E::View) {
        for e in &self.entities {
            e.draw(surface, view);
        }
    }

    /// Update every entity, then draw them in insertion order.
    pub fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface, view: &E::View) {
        self.update_all(now_ms);
        self.draw_all(surface, view);
    }
}

impl<E: Depth> Composer<E> {
    /// Indices of the entities, farthest first. Ties keep insertion order.
    pub fn back_to_front(&self, view: &E::View) -> Vec<usize> {
        let depths: Vec<f64> = self.entities.iter().map(|e| e.depth(view)).collect();
        let mut order: Vec<usize> = (0..self.entities.len()).collect();
        order.sort_by(|&a, &b| depths[b].total_cmp(&depths[a]));
        order
    }

    /// Update every entity, then draw them back to front (painter's algorithm).
    pub fn tick_depth_sorted(&mut self, now_ms: f64, surface: &mut dyn Surface, view: &E::View) {
        self.update_all(now_ms);
        for i in self.back_to_front(view) {
            self.entities[i].draw(surface, view);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composer.rs"]
mod tests;
