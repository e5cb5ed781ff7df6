use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::animation::ease::Ease;
use crate::animation::phase::PhaseSchedule;
use crate::effects::{DriftParticle, radial_vignette};
use crate::foundation::core::{Affine, Point, Rect, Rgba8, Vec2, Viewport};
use crate::foundation::error::LoopResult;
use crate::foundation::math::Rng64;
use crate::render::surface::Surface;
use crate::scene::composer::{Composer, Scene};
use crate::scene::entity::{Entity, Progress, Variant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FoldPhase {
    Fold,
    Hold,
    Unfold,
    Rest,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FoldingBlocksParams {
    pub cols: u32,
    pub rows: u32,
    pub spacing: f64,
    pub block_size: f64,
    pub stagger_ms: f64,
    pub fold_ms: f64,
    pub hold_ms: f64,
    pub unfold_ms: f64,
    pub rest_ms: f64,
    pub particles: u32,
}

impl Default for FoldingBlocksParams {
    fn default() -> Self {
        Self {
            cols: 8,
            rows: 6,
            spacing: 120.0,
            block_size: 60.0,
            stagger_ms: 200.0,
            fold_ms: 2000.0,
            hold_ms: 2000.0,
            unfold_ms: 2000.0,
            rest_ms: 2000.0,
            particles: 50,
        }
    }
}

impl FoldingBlocksParams {
    pub fn schedule(&self) -> LoopResult<PhaseSchedule<FoldPhase>> {
        PhaseSchedule::new([
            (FoldPhase::Fold, self.fold_ms),
            (FoldPhase::Hold, self.hold_ms),
            (FoldPhase::Unfold, self.unfold_ms),
            (FoldPhase::Rest, self.rest_ms),
        ])?
        .with_stagger_ms(self.stagger_ms)
    }
}

/// A square that folds up into a cube and back down, offset from the viewport center.
#[derive(Clone, Debug)]
pub struct FoldingBlock {
    offset: Vec2,
    size: f64,
    index: usize,
    schedule: Arc<PhaseSchedule<FoldPhase>>,
    progress: Progress,
}

/// Fold amount for a phase sample: eased up, held, eased down, rest.
pub fn fold_progress(phase: FoldPhase, t: f64) -> Progress {
    match phase {
        FoldPhase::Fold => Progress::new(Ease::InOutCubic.apply(t)),
        FoldPhase::Hold => Progress::END,
        FoldPhase::Unfold => Progress::new(1.0 - Ease::InOutCubic.apply(t)),
        FoldPhase::Rest => Progress::START,
    }
}

impl FoldingBlock {
    pub fn new(
        offset: Vec2,
        size: f64,
        index: usize,
        schedule: Arc<PhaseSchedule<FoldPhase>>,
    ) -> Self {
        Self {
            offset,
            size,
            index,
            schedule,
            progress: Progress::START,
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    fn draw_flat_net(&self, surface: &mut dyn Surface, at: Affine) {
        surface.mark("fold.flat");
        let s = self.size;
        let h = s / 2.0;
        let edge = Rgba8::with_alpha(180, 180, 190, 0.35);
        let square = |surface: &mut dyn Surface, rect: Rect, fill: Rgba8| {
            surface.fill_rect(rect, at, fill);
            surface.stroke_rect(rect, at, edge, 1.0);
        };

        square(
            surface,
            Rect::new(-h, -h, h, h),
            Rgba8::with_alpha(110, 110, 120, 0.15),
        );
        let flap = Rgba8::with_alpha(130, 130, 140, 0.12);
        square(surface, Rect::new(-h, -h - s, h, -h), flap);
        square(surface, Rect::new(-h, h, h, h + s), flap);
        square(surface, Rect::new(-h - s, -h, -h, h), flap);
        square(surface, Rect::new(h, -h, h + s, h), flap);
    }

    fn draw_folded_cube(&self, surface: &mut dyn Surface, at: Affine) {
        surface.mark("fold.cube");
        let s = self.size;
        let h = s / 2.0;
        let depth = s * 0.5;

        let top = [
            Point::new(-h, -h - depth),
            Point::new(h, -h - depth),
            Point::new(h, -h),
            Point::new(-h, -h),
        ];
        if let Some(path) = crate::render::surface::polygon_path(&top) {
            surface.fill_path(&path, at, Rgba8::with_alpha(160, 160, 170, 0.20));
            surface.stroke_path(&path, at, Rgba8::with_alpha(200, 200, 210, 0.4), 1.0);
        }

        let front = Rect::new(-h, -h, h, h);
        surface.fill_rect(front, at, Rgba8::with_alpha(120, 120, 130, 0.18));
        surface.stroke_rect(front, at, Rgba8::with_alpha(180, 180, 190, 0.35), 1.0);

        surface.stroke_rect(
            Rect::new(-h - 2.0, -h - depth - 2.0, h + 2.0, h + 2.0),
            at,
            Rgba8::with_alpha(200, 200, 220, 0.2),
            1.0,
        );
    }

    fn draw_origami(&self, surface: &mut dyn Surface, at: Affine, progress: f64) {
        surface.mark("fold.origami");
        let s = self.size;
        let h = s / 2.0;
        let angle = FRAC_PI_2 * Ease::InOutCubic.apply(progress);
        let edge = Rgba8::with_alpha(190, 190, 200, 0.4);

        let center = Rect::new(-h, -h, h, h);
        surface.fill_rect(center, at, Rgba8::with_alpha(120, 120, 130, 0.18));
        surface.stroke_rect(center, at, edge, 1.0);

        // (hinge, rotation, flap rect in hinge space, fill)
        let flaps = [
            (
                Vec2::new(-h, -h),
                angle,
                Rect::new(0.0, -s, s, 0.0),
                Rgba8::with_alpha(160, 160, 175, 0.20),
            ),
            (
                Vec2::new(-h, h),
                -angle,
                Rect::new(0.0, -s, s, 0.0),
                Rgba8::with_alpha(110, 110, 120, 0.16),
            ),
            (
                Vec2::new(-h, -h),
                -angle,
                Rect::new(-s, 0.0, 0.0, s),
                Rgba8::with_alpha(135, 135, 145, 0.18),
            ),
            (
                Vec2::new(h, -h),
                angle,
                Rect::new(0.0, 0.0, s, s),
                Rgba8::with_alpha(105, 105, 115, 0.16),
            ),
        ];
        for (hinge, rot, rect, fill) in flaps {
            let flap_at = at * Affine::translate(hinge) * Affine::rotate(rot);
            surface.fill_rect(rect, flap_at, fill);
            surface.stroke_rect(rect, flap_at, edge, 1.0);
        }

        surface.stroke_rect(
            center,
            at,
            Rgba8::with_alpha(210, 210, 225, 0.25 * progress),
            1.0,
        );
    }
}

impl Entity for FoldingBlock {
    /// Viewport center.
    type View = Point;

    fn update(&mut self, now_ms: f64) {
        let sample = self.schedule.sample(now_ms, self.index);
        self.progress = fold_progress(sample.phase, sample.progress);
    }

    fn draw(&self, surface: &mut dyn Surface, center: &Point) {
        let at = Affine::translate(center.to_vec2() + self.offset);
        match self.progress.variant() {
            Variant::Initial => self.draw_flat_net(surface, at),
            Variant::Final => self.draw_folded_cube(surface, at),
            Variant::Between(p) => self.draw_origami(surface, at, p),
        }
    }
}

/// A staggered grid of blocks folding into cubes over drifting dust.
#[derive(Clone, Debug)]
pub struct FoldingBlocks {
    viewport: Viewport,
    background: Rgba8,
    blocks: Composer<FoldingBlock>,
    particles: Vec<DriftParticle>,
}

impl FoldingBlocks {
    pub const NAME: &'static str = "folding_blocks";
    pub const BACKGROUND: Rgba8 = Rgba8::opaque(0x0f, 0x0f, 0x12);

    #[tracing::instrument(level = "debug", skip(params))]
    pub fn new(params: &FoldingBlocksParams, viewport: Viewport, seed: u64) -> LoopResult<Self> {
        let schedule = Arc::new(params.schedule()?);
        let (cols, rows) = (f64::from(params.cols), f64::from(params.rows));

        let mut blocks = Vec::with_capacity((params.cols * params.rows) as usize);
        for row in 0..params.rows {
            for col in 0..params.cols {
                // Odd rows shift right by half a cell.
                let stagger_x = if row % 2 == 0 { 0.0 } else { params.spacing / 2.0 };
                let offset = Vec2::new(
                    (f64::from(col) - cols / 2.0) * params.spacing + stagger_x,
                    (f64::from(row) - rows / 2.0) * params.spacing,
                );
                let index = blocks.len();
                blocks.push(FoldingBlock::new(
                    offset,
                    params.block_size,
                    index,
                    Arc::clone(&schedule),
                ));
            }
        }

        let mut rng = Rng64::new(seed);
        let particles = (0..params.particles)
            .map(|_| DriftParticle::random(&mut rng))
            .collect();

        Ok(Self {
            viewport,
            background: Self::BACKGROUND,
            blocks: Composer::new(blocks),
            particles,
        })
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    pub fn blocks(&self) -> &[FoldingBlock] {
        self.blocks.entities()
    }
}

impl Scene for FoldingBlocks {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        let vp = self.viewport;
        surface.clear(self.background);
        radial_vignette(
            surface,
            vp.center(),
            vp.max_side(),
            Rgba8::with_alpha(5, 5, 8, 0.5),
            12,
        );
        for p in &self.particles {
            p.draw(surface, now_ms, vp, Rgba8::opaque(180, 180, 200));
        }
        self.blocks.tick(now_ms, surface, &vp.center());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/folding_blocks.rs"]
mod tests;
