use crate::foundation::core::{Affine, BezPath, Point, Rgba8};
use crate::foundation::error::{LoopError, LoopResult};
use crate::render::surface::Surface;

/// A rendered frame as RGBA8 pixels.
///
/// Frames read back from [`CpuSurface`] are **premultiplied alpha**; the flag makes this explicit
/// at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data, suitable for image encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// CPU raster surface powered by `vello_cpu`.
///
/// Draw commands are buffered in a render context between `begin_frame` and `end_frame`, then
/// rasterized into the backing pixmap. All transforms are pre-multiplied by the device scale so
/// effects draw in logical units.
pub struct CpuSurface {
    width: u16,
    height: u16,
    device_scale: f64,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("device_scale", &self.device_scale)
            .finish_non_exhaustive()
    }
}

fn px_to_u16(what: &str, v: u32) -> LoopResult<u16> {
    if v == 0 {
        return Err(LoopError::surface(format!("surface {what} must be > 0")));
    }
    v.try_into()
        .map_err(|_| LoopError::surface(format!("surface {what} exceeds u16: {v}")))
}

impl CpuSurface {
    pub fn new(width_px: u32, height_px: u32, device_scale: f64) -> LoopResult<Self> {
        let width = px_to_u16("width", width_px)?;
        let height = px_to_u16("height", height_px)?;
        Ok(Self {
            width,
            height,
            device_scale: sanitize_scale(device_scale),
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    pub fn device_scale(&self) -> f64 {
        self.device_scale
    }

    /// Copy the last rasterized frame out of the pixmap.
    pub fn readback(&self) -> FrameRGBA {
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn device_transform(&self, transform: Affine) -> vello_cpu::kurbo::Affine {
        affine_to_cpu(Affine::scale(self.device_scale) * transform)
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

impl Surface for CpuSurface {
    fn size_px(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn resize(&mut self, width_px: u32, height_px: u32, device_scale: f64) -> LoopResult<()> {
        let width = px_to_u16("width", width_px)?;
        let height = px_to_u16("height", height_px)?;
        self.device_scale = sanitize_scale(device_scale);
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.ctx = vello_cpu::RenderContext::new(width, height);
            self.pixmap = vello_cpu::Pixmap::new(width, height);
        }
        Ok(())
    }

    fn fill_path(&mut self, path: &BezPath, transform: Affine, color: Rgba8) {
        if color.a == 0 {
            return;
        }
        self.ctx.set_transform(self.device_transform(transform));
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn stroke_path(&mut self, path: &BezPath, transform: Affine, color: Rgba8, width: f64) {
        if color.a == 0 || width <= 0.0 {
            return;
        }
        self.ctx.set_transform(self.device_transform(transform));
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }

    fn begin_frame(&mut self) {
        self.ctx.reset();
    }

    fn end_frame(&mut self) {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
    }

    fn clear(&mut self, color: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
