use std::f64::consts::TAU;

use crate::animation::ease::Ease;
use crate::foundation::core::{Affine, Point, Rect, Rgba8, Viewport};
use crate::foundation::error::{LoopError, LoopResult};
use crate::foundation::math::{Rng64, clamp01, permutation, shuffle};
use crate::render::surface::{Surface, rounded_rect_path};
use crate::scene::composer::{Composer, Scene};
use crate::scene::entity::Entity;

const CORNER_RADIUS: f64 = 3.0;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShiftingGridParams {
    /// Cells per side.
    pub grid: usize,
    pub shift_interval_ms: f64,
    pub morph_interval_ms: f64,
    pub morph_ms: f64,
    pub hold_ms: f64,
    /// Upper bound of the random per-cell morph start delay.
    pub max_stagger_ms: f64,
    /// Largest share of all cells that may join the shape.
    pub active_fraction: f64,
    /// Side of the hollow gate as a share of the grid side.
    pub gate_fraction: f64,
}

impl Default for ShiftingGridParams {
    fn default() -> Self {
        Self {
            grid: 18,
            shift_interval_ms: 3500.0,
            morph_interval_ms: 9000.0,
            morph_ms: 1800.0,
            hold_ms: 1300.0,
            max_stagger_ms: 300.0,
            active_fraction: 0.4,
            gate_fraction: 0.5,
        }
    }
}

impl ShiftingGridParams {
    pub fn validate(&self) -> LoopResult<()> {
        if self.grid == 0 {
            return Err(LoopError::validation("shifting grid needs at least one cell"));
        }
        for (name, v) in [
            ("shift_interval_ms", self.shift_interval_ms),
            ("morph_interval_ms", self.morph_interval_ms),
            ("morph_ms", self.morph_ms),
            ("hold_ms", self.hold_ms),
            ("max_stagger_ms", self.max_stagger_ms),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(LoopError::validation(format!(
                    "shifting grid {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.active_fraction) || !unit.contains(&self.gate_fraction) {
            return Err(LoopError::validation("shifting grid fractions must lie in [0,1]"));
        }
        Ok(())
    }
}

/// Border cells of a hollow square centered in a `grid`×`grid` board, row-major.
pub fn gate_mask(grid: usize, gate_size: usize) -> Vec<(usize, usize)> {
    let size = gate_size.min(grid);
    if size == 0 {
        return Vec::new();
    }
    let start = (grid - size) / 2;
    let mut cells = Vec::new();
    for r in 0..size {
        for c in 0..size {
            if r == 0 || r == size - 1 || c == 0 || c == size - 1 {
                cells.push((start + r, start + c));
            }
        }
    }
    cells
}

/// One cell's move into the shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphTarget {
    pub cell: usize,
    pub row: usize,
    pub col: usize,
    pub delay_ms: f64,
}

/// Pick which cells form the shape and where each one goes.
///
/// Mask slots are shuffled, at most `floor(cell_count * active_fraction)` distinct cells are
/// drawn, and each gets a start delay in `[0, max_delay_ms)`. No cell is touched; the caller
/// applies the whole result at once.
pub fn morph_assignment(
    cell_count: usize,
    mask: &[(usize, usize)],
    active_fraction: f64,
    max_delay_ms: f64,
    rng: &mut Rng64,
) -> Vec<MorphTarget> {
    let mut slots = mask.to_vec();
    shuffle(&mut slots, rng);
    let budget = (cell_count as f64 * active_fraction).floor() as usize;
    let count = slots.len().min(budget);
    let cells = permutation(cell_count, rng);
    cells
        .into_iter()
        .zip(slots)
        .take(count)
        .map(|(cell, (row, col))| MorphTarget {
            cell,
            row,
            col,
            delay_ms: rng.next_f64() * max_delay_ms,
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Morph {
    to_row: usize,
    to_col: usize,
    start_ms: f64,
}

/// Per-frame layout shared by every cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub origin: Point,
    pub cell: f64,
    pub gap: f64,
    /// Cells are forming or holding the shape.
    pub shaping: bool,
}

impl GridLayout {
    fn inner(&self) -> f64 {
        self.cell - self.gap
    }
}

/// One rounded square of the grid.
#[derive(Clone, Debug)]
pub struct GridCell {
    row: usize,
    col: usize,
    jitter_seed: f64,
    active: bool,
    morph: Option<Morph>,
    morph_ms: f64,
    shown_row: f64,
    shown_col: f64,
    jitter_phase: f64,
    pulse: f64,
}

impl GridCell {
    fn new(row: usize, col: usize, morph_ms: f64, rng: &mut Rng64) -> Self {
        Self {
            row,
            col,
            jitter_seed: rng.range(0.0, TAU),
            active: false,
            morph: None,
            morph_ms,
            shown_row: row as f64,
            shown_col: col as f64,
            jitter_phase: 0.0,
            pulse: 1.0,
        }
    }

    pub fn slot(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_morphing(&self) -> bool {
        self.morph.is_some()
    }

    pub fn shown(&self) -> (f64, f64) {
        (self.shown_row, self.shown_col)
    }

    fn morph_fraction(&self, morph: Morph, now_ms: f64) -> f64 {
        if self.morph_ms > 0.0 {
            clamp01((now_ms - morph.start_ms) / self.morph_ms)
        } else {
            1.0
        }
    }

    /// Land on the target slot if the move is over.
    fn settle(&mut self, now_ms: f64) {
        if let Some(m) = self.morph
            && self.morph_fraction(m, now_ms) >= 1.0
        {
            self.row = m.to_row;
            self.col = m.to_col;
            self.morph = None;
        }
    }
}

impl Entity for GridCell {
    type View = GridLayout;

    fn update(&mut self, now_ms: f64) {
        let (row, col) = (self.row as f64, self.col as f64);
        (self.shown_row, self.shown_col) = match self.morph {
            Some(m) => {
                let e = Ease::InOutQuad.apply(self.morph_fraction(m, now_ms));
                (
                    row + (m.to_row as f64 - row) * e,
                    col + (m.to_col as f64 - col) * e,
                )
            }
            None => (row, col),
        };
        self.jitter_phase = now_ms * 0.0004 + self.jitter_seed;
        self.pulse = 0.9 + 0.1 * (now_ms * 0.004 + self.jitter_seed).sin();
    }

    fn draw(&self, surface: &mut dyn Surface, layout: &GridLayout) {
        let inner = layout.inner();
        let amp = inner * 0.06;
        let dx = self.jitter_phase.sin() * amp;
        let dy = (self.jitter_phase * 0.8).cos() * amp;

        let (color, size) = match (self.active, layout.shaping) {
            (true, true) => (Rgba8::with_alpha(210, 215, 235, 0.9), 1.05 * self.pulse),
            (true, false) => (Rgba8::with_alpha(130, 135, 150, 0.14), 0.95),
            (false, _) => (Rgba8::with_alpha(90, 95, 110, 0.10), 0.85),
        };

        let inset = layout.gap / 2.0 + inner / 2.0;
        let cx = layout.origin.x + self.shown_col * layout.cell + inset + dx;
        let cy = layout.origin.y + self.shown_row * layout.cell + inset + dy;
        let half = inner * size / 2.0;
        let rect = Rect::new(cx - half, cy - half, cx + half, cy + half);
        surface.fill_path(&rounded_rect_path(rect, CORNER_RADIUS), Affine::IDENTITY, color);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GridMode {
    /// Free flow with periodic row/column shifts.
    Flow,
    /// Cells moving into the shape.
    Morphing,
    /// Every cell arrived; holding since the given time.
    Holding { since_ms: f64 },
}

/// A grid of cells that shuffle rows and columns and periodically gather into a gate outline.
#[derive(Clone, Debug)]
pub struct ShiftingGrid {
    viewport: Viewport,
    background: Rgba8,
    params: ShiftingGridParams,
    mask: Vec<(usize, usize)>,
    seed: u64,
    rng: Rng64,
    cells: Composer<GridCell>,
    mode: GridMode,
    last_shift_ms: f64,
    last_morph_ms: f64,
}

impl ShiftingGrid {
    pub const NAME: &'static str = "shifting_grid";
    pub const BACKGROUND: Rgba8 = super::DEEP_BACKGROUND;

    #[tracing::instrument(level = "debug", skip(params))]
    pub fn new(params: &ShiftingGridParams, viewport: Viewport, seed: u64) -> LoopResult<Self> {
        params.validate()?;
        let gate = (params.grid as f64 * params.gate_fraction).floor() as usize;
        let mut scene = Self {
            viewport,
            background: Self::BACKGROUND,
            params: params.clone(),
            mask: gate_mask(params.grid, gate),
            seed,
            rng: Rng64::new(seed),
            cells: Composer::default(),
            mode: GridMode::Flow,
            last_shift_ms: 0.0,
            last_morph_ms: 0.0,
        };
        scene.populate();
        Ok(scene)
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    fn populate(&mut self) {
        self.rng = Rng64::new(self.seed);
        let n = self.params.grid;
        let morph_ms = self.params.morph_ms;
        let rng = &mut self.rng;
        let cells = (0..n * n)
            .map(|i| GridCell::new(i / n, i % n, morph_ms, rng))
            .collect();
        self.cells.replace_all(cells);
        self.mode = GridMode::Flow;
        self.last_shift_ms = 0.0;
        self.last_morph_ms = 0.0;
    }

    pub fn cells(&self) -> &[GridCell] {
        self.cells.entities()
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    pub fn mask(&self) -> &[(usize, usize)] {
        &self.mask
    }

    /// Install a complete morph assignment in one move.
    pub fn apply_morph(&mut self, targets: &[MorphTarget], now_ms: f64) {
        for cell in self.cells.entities_mut() {
            cell.active = false;
            cell.morph = None;
        }
        let cells = self.cells.entities_mut();
        for t in targets {
            if let Some(cell) = cells.get_mut(t.cell) {
                cell.active = true;
                cell.morph = Some(Morph {
                    to_row: t.row,
                    to_col: t.col,
                    start_ms: now_ms + t.delay_ms,
                });
            }
        }
        self.mode = GridMode::Morphing;
        self.last_morph_ms = now_ms;
        tracing::debug!(now_ms, active = targets.len(), "grid morph started");
    }

    fn shift_line(&mut self) {
        let n = self.params.grid;
        let rows = self.rng.coin();
        let line = self.rng.below(n);
        let forward = self.rng.coin();
        let step = |v: usize| if forward { (v + 1) % n } else { (v + n - 1) % n };
        for cell in self.cells.entities_mut() {
            if cell.morph.is_some() {
                continue;
            }
            if rows && cell.row == line {
                cell.col = step(cell.col);
            } else if !rows && cell.col == line {
                cell.row = step(cell.row);
            }
        }
    }

    /// Apply every time-driven transition due at `now_ms`.
    pub fn advance(&mut self, now_ms: f64) {
        let flowing = self.mode == GridMode::Flow;
        if flowing && now_ms - self.last_shift_ms >= self.params.shift_interval_ms {
            self.shift_line();
            self.last_shift_ms = now_ms;
        }
        if flowing && now_ms - self.last_morph_ms >= self.params.morph_interval_ms {
            let targets = morph_assignment(
                self.cells.len(),
                &self.mask,
                self.params.active_fraction,
                self.params.max_stagger_ms,
                &mut self.rng,
            );
            self.apply_morph(&targets, now_ms);
        }

        match self.mode {
            GridMode::Flow => {}
            GridMode::Morphing => {
                for cell in self.cells.entities_mut() {
                    cell.settle(now_ms);
                }
                if self.cells.entities().iter().all(|c| !c.is_morphing()) {
                    tracing::debug!(now_ms, "grid shape formed");
                    self.mode = GridMode::Holding { since_ms: now_ms };
                }
            }
            GridMode::Holding { since_ms } => {
                if now_ms - since_ms >= self.params.hold_ms {
                    tracing::debug!(now_ms, "grid shape released");
                    self.mode = GridMode::Flow;
                    self.last_morph_ms = now_ms;
                }
            }
        }
    }

    fn layout(&self) -> GridLayout {
        let vp = self.viewport;
        let side = vp.min_side() * 0.9;
        let cell = side / self.params.grid as f64;
        GridLayout {
            origin: Point::new((vp.width - side) / 2.0, (vp.height - side) / 2.0),
            cell,
            gap: cell * 0.2,
            shaping: self.mode != GridMode::Flow,
        }
    }
}

impl Scene for ShiftingGrid {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        self.advance(now_ms);
        let layout = self.layout();
        surface.clear(self.background);
        self.cells.tick(now_ms, surface, &layout);
    }

    fn reset(&mut self) {
        self.populate();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/shifting_grid.rs"]
mod tests;
