use crate::foundation::core::{Affine, BezPath, Rgba8};
use crate::foundation::error::{LoopError, LoopResult};
use crate::render::surface::Surface;

/// Backend-agnostic draw command, as issued by an effect.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FillPath {
        path: BezPath,
        transform: Affine,
        color: Rgba8,
    },
    StrokePath {
        path: BezPath,
        transform: Affine,
        color: Rgba8,
        width: f64,
    },
    /// Draw-routine label, see [`Surface::mark`].
    Mark(&'static str),
}

/// A surface that records commands instead of rasterizing them.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    width_px: u32,
    height_px: u32,
    device_scale: f64,
    frames_begun: u64,
    frames_ended: u64,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
            device_scale: 1.0,
            frames_begun: 0,
            frames_ended: 0,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain recorded commands.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn device_scale(&self) -> f64 {
        self.device_scale
    }

    pub fn frames_begun(&self) -> u64 {
        self.frames_begun
    }

    pub fn frames_ended(&self) -> u64 {
        self.frames_ended
    }

    /// Labels recorded via [`Surface::mark`], in order.
    pub fn marks(&self) -> Vec<&'static str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Mark(label) => Some(*label),
                _ => None,
            })
            .collect()
    }

    pub fn fill_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillPath { .. }))
            .count()
    }

    pub fn stroke_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::StrokePath { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn size_px(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    fn resize(&mut self, width_px: u32, height_px: u32, device_scale: f64) -> LoopResult<()> {
        if width_px == 0 || height_px == 0 {
            return Err(LoopError::surface("surface size must be non-zero"));
        }
        self.width_px = width_px;
        self.height_px = height_px;
        self.device_scale = device_scale;
        Ok(())
    }

    fn fill_path(&mut self, path: &BezPath, transform: Affine, color: Rgba8) {
        self.ops.push(DrawOp::FillPath {
            path: path.clone(),
            transform,
            color,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, transform: Affine, color: Rgba8, width: f64) {
        self.ops.push(DrawOp::StrokePath {
            path: path.clone(),
            transform,
            color,
            width,
        });
    }

    fn begin_frame(&mut self) {
        self.frames_begun += 1;
        self.ops.clear();
    }

    fn end_frame(&mut self) {
        self.frames_ended += 1;
    }

    fn mark(&mut self, label: &'static str) {
        self.ops.push(DrawOp::Mark(label));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/record.rs"]
mod tests;
