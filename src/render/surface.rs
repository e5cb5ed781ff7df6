use kurbo::{Circle, Shape};

use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8};
use crate::foundation::error::LoopResult;

const SHAPE_TOLERANCE: f64 = 0.1;

/// A drawing target an effect renders into.
///
/// Coordinates are logical viewport units; the surface owns the device-pixel scale. Only the
/// four required methods touch the backend, everything else is built from them.
pub trait Surface {
    /// Backing buffer size in device pixels.
    fn size_px(&self) -> (u32, u32);

    /// Reallocate the backing buffer and set the logical-to-device scale.
    fn resize(&mut self, width_px: u32, height_px: u32, device_scale: f64) -> LoopResult<()>;

    fn fill_path(&mut self, path: &BezPath, transform: Affine, color: Rgba8);

    fn stroke_path(&mut self, path: &BezPath, transform: Affine, color: Rgba8, width: f64);

    /// Called once before an effect draws a frame.
    fn begin_frame(&mut self) {}

    /// Called once after an effect finished drawing a frame.
    fn end_frame(&mut self) {}

    /// Label the draw routine that is about to issue primitives. Backends ignore it; recording
    /// surfaces keep it so routine selection is observable without pixels.
    fn mark(&mut self, _label: &'static str) {}

    /// Fill the whole logical area with `color`.
    fn clear(&mut self, color: Rgba8) {
        let (w, h) = self.size_px();
        let path = Rect::new(0.0, 0.0, f64::from(w), f64::from(h)).to_path(SHAPE_TOLERANCE);
        self.fill_path(&path, Affine::IDENTITY, color);
    }

    fn fill_rect(&mut self, rect: Rect, transform: Affine, color: Rgba8) {
        self.fill_path(&rect.to_path(SHAPE_TOLERANCE), transform, color);
    }

    fn stroke_rect(&mut self, rect: Rect, transform: Affine, color: Rgba8, width: f64) {
        self.stroke_path(&rect.to_path(SHAPE_TOLERANCE), transform, color, width);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        let path = Circle::new(center, radius).to_path(SHAPE_TOLERANCE);
        self.fill_path(&path, Affine::IDENTITY, color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba8, width: f64) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        let path = Circle::new(center, radius).to_path(SHAPE_TOLERANCE);
        self.stroke_path(&path, Affine::IDENTITY, color, width);
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba8) {
        if let Some(path) = polygon_path(points) {
            self.fill_path(&path, Affine::IDENTITY, color);
        }
    }

    fn stroke_polygon(&mut self, points: &[Point], color: Rgba8, width: f64) {
        if let Some(path) = polygon_path(points) {
            self.stroke_path(&path, Affine::IDENTITY, color, width);
        }
    }
}

/// Closed path through `points`, or `None` for fewer than three points.
pub fn polygon_path(points: &[Point]) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    if rest.len() < 2 {
        return None;
    }
    let mut path = BezPath::new();
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    path.close_path();
    Some(path)
}

/// Rounded rectangle path (used by grid cells).
pub fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    kurbo::RoundedRect::from_rect(rect, radius).to_path(SHAPE_TOLERANCE)
}
