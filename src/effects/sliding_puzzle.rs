use std::f64::consts::PI;

use crate::animation::ease::Ease;
use crate::effects::{DEEP_BACKGROUND, seconds};
use crate::foundation::core::{Rgba8, Vec3, Viewport};
use crate::foundation::error::{LoopError, LoopResult};
use crate::foundation::math::{Rng64, clamp01};
use crate::render::surface::Surface;
use crate::scene::camera::Camera;
use crate::scene::composer::{Composer, Scene};
use crate::scene::entity::{Depth, Entity};
use crate::scene::solid::{EntityVariant, Fog, Light, Lighting, Pose, Solid, SolidView, Transform3};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SlidingPuzzleParams {
    pub cols: usize,
    pub rows: usize,
    pub cube_size: f64,
    pub gap: f64,
    pub empty_slots: usize,
    pub slide_ms: f64,
    pub slide_interval_ms: f64,
    /// Most slides started per interval.
    pub burst: usize,
    pub fog_density: f64,
}

impl Default for SlidingPuzzleParams {
    fn default() -> Self {
        Self {
            cols: 20,
            rows: 14,
            cube_size: 3.0,
            gap: 0.12,
            empty_slots: 8,
            slide_ms: 400.0,
            slide_interval_ms: 200.0,
            burst: 3,
            fog_density: 0.018,
        }
    }
}

impl SlidingPuzzleParams {
    pub fn validate(&self) -> LoopResult<()> {
        let cells = self.cols * self.rows;
        if cells == 0 {
            return Err(LoopError::validation("sliding puzzle needs at least one cell"));
        }
        if self.empty_slots >= cells {
            return Err(LoopError::validation(format!(
                "sliding puzzle has {cells} cells, cannot leave {} empty",
                self.empty_slots
            )));
        }
        for (name, v) in [
            ("slide_ms", self.slide_ms),
            ("slide_interval_ms", self.slide_interval_ms),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(LoopError::validation(format!(
                    "sliding puzzle {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Grid coordinate, row first.
pub type Cell = (usize, usize);

/// Which cube occupies each cell of the wall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    rows: usize,
    cells: Vec<Option<usize>>,
}

impl Board {
    /// Fill every cell with cubes `0..`, leaving `empties` unoccupied.
    pub fn new(cols: usize, rows: usize, empties: &[Cell]) -> Self {
        let mut cells = vec![Some(0); cols * rows];
        for &(r, c) in empties {
            if r < rows && c < cols {
                cells[r * cols + c] = None;
            }
        }
        let mut next = 0;
        for slot in cells.iter_mut().flatten() {
            *slot = next;
            next += 1;
        }
        Self { cols, rows, cells }
    }

    pub fn occupant(&self, (r, c): Cell) -> Option<usize> {
        if r < self.rows && c < self.cols {
            self.cells[r * self.cols + c]
        } else {
            None
        }
    }

    pub fn empties(&self) -> Vec<Cell> {
        (0..self.cells.len())
            .filter(|&i| self.cells[i].is_none())
            .map(|i| (i / self.cols, i % self.cols))
            .collect()
    }

    pub fn cube_count(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    /// Occupied orthogonal neighbours of `cell`.
    pub fn neighbors(&self, (r, c): Cell) -> Vec<(Cell, usize)> {
        let mut out = Vec::with_capacity(4);
        let candidates = [
            r.checked_sub(1).map(|r| (r, c)),
            Some((r + 1, c)),
            c.checked_sub(1).map(|c| (r, c)),
            Some((r, c + 1)),
        ];
        for cell in candidates.into_iter().flatten() {
            if let Some(cube) = self.occupant(cell) {
                out.push((cell, cube));
            }
        }
        out
    }

    /// Move the slide's cube into its empty cell in one step.
    pub fn commit(&mut self, slide: &Slide) -> bool {
        if self.occupant(slide.from) != Some(slide.cube) || self.occupant(slide.to).is_some() {
            return false;
        }
        self.cells[slide.from.0 * self.cols + slide.from.1] = None;
        self.cells[slide.to.0 * self.cols + slide.to.1] = Some(slide.cube);
        true
    }
}

/// One cube moving into an adjacent empty cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slide {
    pub cube: usize,
    pub from: Cell,
    pub to: Cell,
    pub start_ms: f64,
}

/// Choose up to `count` new slides given the slides already in flight.
///
/// Each pick takes a random empty cell that nothing is sliding into and that has a resting
/// neighbour, then a random resting neighbour of it. The board is only read.
pub fn plan_slides(
    board: &Board,
    active: &[Slide],
    count: usize,
    now_ms: f64,
    rng: &mut Rng64,
) -> Vec<Slide> {
    let mut planned: Vec<Slide> = Vec::with_capacity(count);
    for _ in 0..count {
        let busy = |cube: usize| active.iter().chain(&planned).any(|s| s.cube == cube);
        let filling = |cell: Cell| active.iter().chain(&planned).any(|s| s.to == cell);
        let open: Vec<(Cell, Vec<(Cell, usize)>)> = board
            .empties()
            .into_iter()
            .filter(|&e| !filling(e))
            .map(|e| {
                let movers = board
                    .neighbors(e)
                    .into_iter()
                    .filter(|&(_, cube)| !busy(cube))
                    .collect::<Vec<_>>();
                (e, movers)
            })
            .filter(|(_, movers)| !movers.is_empty())
            .collect();
        if open.is_empty() {
            break;
        }
        let (to, movers) = &open[rng.below(open.len())];
        let (from, cube) = movers[rng.below(movers.len())];
        planned.push(Slide {
            cube,
            from,
            to: *to,
            start_ms: now_ms,
        });
    }
    planned
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Motion {
    from: Vec3,
    to: Vec3,
    start_ms: f64,
    duration_ms: f64,
}

/// One cube of the wall.
#[derive(Clone, Debug)]
pub struct WallCube {
    solid: Solid,
    cell: Cell,
    base: Vec3,
    motion: Option<Motion>,
}

impl WallCube {
    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn position(&self) -> Vec3 {
        self.solid.pose.position
    }

    pub fn is_sliding(&self) -> bool {
        self.motion.is_some()
    }
}

impl Entity for WallCube {
    type View = SolidView;

    fn update(&mut self, now_ms: f64) {
        self.solid.pose.position = match self.motion {
            Some(m) => {
                let t = if m.duration_ms > 0.0 {
                    clamp01((now_ms - m.start_ms) / m.duration_ms)
                } else {
                    1.0
                };
                let mut p = m.from.lerp(m.to, Ease::InOutCubic.apply(t));
                p.z = (t * PI).sin() * 0.3;
                p
            }
            None => {
                let (row, col) = (self.cell.0 as f64, self.cell.1 as f64);
                let noise = seconds(now_ms) * 0.8 + row * 0.3 + col * 0.2;
                Vec3::new(self.base.x, self.base.y, 0.08 * noise.sin())
            }
        };
    }

    fn draw(&self, surface: &mut dyn Surface, view: &SolidView) {
        self.solid.draw(surface, view);
    }
}

impl Depth for WallCube {
    fn depth(&self, view: &SolidView) -> f64 {
        self.solid.depth(view)
    }
}

fn wall_lighting(fog_density: f64) -> Lighting {
    Lighting {
        ambient: Rgba8::opaque(0x90, 0x99, 0xb0),
        ambient_intensity: 0.6,
        lights: vec![
            Light::new(Vec3::new(10.0, 20.0, 30.0), Rgba8::opaque(0xdd, 0xe2, 0xf5), 0.9),
            Light::new(Vec3::new(-15.0, -10.0, 20.0), Rgba8::opaque(0x80, 0x90, 0xb0), 0.4),
            Light::new(Vec3::new(0.0, 0.0, -20.0), Rgba8::opaque(0x60, 0x70, 0xa0), 0.3),
        ],
        fog: Some(Fog {
            color: DEEP_BACKGROUND,
            density: fog_density,
        }),
    }
}

/// A wall of cubes with a few holes; neighbours keep sliding into the holes.
#[derive(Clone, Debug)]
pub struct SlidingPuzzle {
    viewport: Viewport,
    background: Rgba8,
    params: SlidingPuzzleParams,
    seed: u64,
    rng: Rng64,
    board: Board,
    cubes: Composer<WallCube>,
    active: Vec<Slide>,
    last_burst_ms: f64,
}

impl SlidingPuzzle {
    pub const NAME: &'static str = "sliding_puzzle";

    #[tracing::instrument(level = "debug", skip(params))]
    pub fn new(params: &SlidingPuzzleParams, viewport: Viewport, seed: u64) -> LoopResult<Self> {
        params.validate()?;
        let mut scene = Self {
            viewport,
            background: DEEP_BACKGROUND,
            params: params.clone(),
            seed,
            rng: Rng64::new(seed),
            board: Board::new(params.cols, params.rows, &[]),
            cubes: Composer::default(),
            active: Vec::new(),
            last_burst_ms: 0.0,
        };
        scene.populate();
        Ok(scene)
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    fn unit(&self) -> f64 {
        self.params.cube_size + self.params.gap
    }

    /// Resting position of `cell`, wall centered on the origin.
    pub fn cell_position(&self, (row, col): Cell) -> Vec3 {
        let unit = self.unit();
        let ox = -((self.params.cols - 1) as f64 * unit) / 2.0;
        let oy = -((self.params.rows - 1) as f64 * unit) / 2.0;
        Vec3::new(ox + col as f64 * unit, oy + row as f64 * unit, 0.0)
    }

    fn populate(&mut self) {
        let (cols, rows) = (self.params.cols, self.params.rows);
        let mut rng = Rng64::new(self.seed);
        let mut empties: Vec<Cell> = Vec::with_capacity(self.params.empty_slots);
        while empties.len() < self.params.empty_slots {
            let cell = (rng.below(rows), rng.below(cols));
            if !empties.contains(&cell) {
                empties.push(cell);
            }
        }
        self.board = Board::new(cols, rows, &empties);

        let mut cubes = Vec::with_capacity(self.board.cube_count());
        for r in 0..rows {
            for c in 0..cols {
                if self.board.occupant((r, c)).is_none() {
                    continue;
                }
                let base = self.cell_position((r, c));
                let tint = rng.range(0.88, 1.0);
                let channel = |k: f64| (255.0 * k).round().min(255.0) as u8;
                let color = Rgba8::opaque(channel(tint), channel(tint), channel(tint * 1.02));
                let solid = Solid::new(
                    EntityVariant::Cube {
                        size: self.params.cube_size,
                    },
                    Pose::at(base),
                    color,
                );
                cubes.push(WallCube {
                    solid,
                    cell: (r, c),
                    base,
                    motion: None,
                });
            }
        }
        self.cubes.replace_all(cubes);
        self.rng = rng;
        self.active.clear();
        self.last_burst_ms = 0.0;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cubes(&self) -> &[WallCube] {
        self.cubes.entities()
    }

    pub fn active_slides(&self) -> &[Slide] {
        &self.active
    }

    fn start(&mut self, slide: Slide) {
        let (from, to) = (self.cell_position(slide.from), self.cell_position(slide.to));
        let duration_ms = self.params.slide_ms;
        if let Some(cube) = self.cubes.entities_mut().get_mut(slide.cube) {
            cube.motion = Some(Motion {
                from,
                to,
                start_ms: slide.start_ms,
                duration_ms,
            });
        }
        self.active.push(slide);
    }

    fn finish(&mut self, slide: &Slide) {
        if !self.board.commit(slide) {
            tracing::warn!(cube = slide.cube, "slide no longer matches the board, dropped");
        }
        let base = self.cell_position(slide.to);
        if let Some(cube) = self.cubes.entities_mut().get_mut(slide.cube) {
            cube.motion = None;
            cube.cell = slide.to;
            cube.base = base;
        }
    }

    /// Start a burst of slides when one is due, then commit every slide that has finished.
    pub fn advance(&mut self, now_ms: f64) {
        if now_ms - self.last_burst_ms >= self.params.slide_interval_ms {
            let room = self.params.empty_slots.saturating_sub(self.active.len());
            let count = self.params.burst.min(room);
            let planned = plan_slides(&self.board, &self.active, count, now_ms, &mut self.rng);
            for slide in planned {
                self.start(slide);
            }
            self.last_burst_ms = now_ms;
        }

        let slide_ms = self.params.slide_ms;
        let (done, running): (Vec<Slide>, Vec<Slide>) = self
            .active
            .drain(..)
            .partition(|s| now_ms - s.start_ms >= slide_ms);
        self.active = running;
        for slide in &done {
            self.finish(slide);
        }
        if !done.is_empty() {
            tracing::trace!(committed = done.len(), now_ms, "slides committed");
        }
    }
}

impl Scene for SlidingPuzzle {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        self.advance(now_ms);

        let t = seconds(now_ms);
        let eye = Vec3::new(
            25.0 + 3.0 * (t * 0.1).sin(),
            18.0 + 2.0 * (t * 0.08 + 0.5).sin(),
            55.0 + 2.0 * (t * 0.06).sin(),
        );
        let view = SolidView {
            projector: Camera::look_at(eye, Vec3::ZERO, 60.0).projector(self.viewport),
            lighting: wall_lighting(self.params.fog_density),
            group: Transform3::IDENTITY,
        };
        surface.clear(self.background);
        self.cubes.tick_depth_sorted(now_ms, surface, &view);
    }

    fn reset(&mut self) {
        self.populate();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/sliding_puzzle.rs"]
mod tests;
