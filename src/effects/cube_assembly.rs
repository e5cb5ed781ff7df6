use std::f64::consts::FRAC_PI_4;

use crate::effects::{DEEP_BACKGROUND, seconds, studio_lighting};
use crate::foundation::core::{Euler, Rgba8, Vec3, Viewport};
use crate::foundation::error::LoopResult;
use crate::foundation::math::Rng64;
use crate::render::surface::Surface;
use crate::scene::camera::Camera;
use crate::scene::composer::{Composer, Scene};
use crate::scene::entity::{Depth, Entity};
use crate::scene::reshuffle::{AssemblyMachine, AssemblyState, AssemblyTimings, PieceState};
use crate::scene::solid::{EntityVariant, Pose, Solid, SolidView, Transform3, y_axis_to};

/// Grid cell of the dark eye cube.
const EYE_CELL: (usize, usize, usize) = (2, 2, 2);

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CubeAssemblyParams {
    pub timings: AssemblyTimings,
    pub cube_size: f64,
    pub gap: f64,
    pub fog_density: f64,
}

impl Default for CubeAssemblyParams {
    fn default() -> Self {
        Self {
            timings: AssemblyTimings::default(),
            cube_size: 0.6,
            gap: 0.06,
            fog_density: 0.08,
        }
    }
}

/// One placeable piece: its shape at rest plus where the machine currently has it.
///
/// Pieces do not follow the time-driven [`Entity::update`] contract. The machine owns every
/// piece's placement, and [`CubeAssembly`] copies it onto the pieces before each draw, so
/// `update` leaves a piece as it is.
#[derive(Clone, Debug)]
pub struct AssemblyPiece {
    shape: Solid,
    state: Option<PieceState>,
}

impl AssemblyPiece {
    pub fn shape(&self) -> &Solid {
        &self.shape
    }

    pub fn state(&self) -> Option<&PieceState> {
        self.state.as_ref()
    }

    fn placement(state: &PieceState) -> Pose {
        Pose {
            position: state.position,
            rotation: state.rotation,
            scale: 1.0,
        }
    }
}

impl Entity for AssemblyPiece {
    type View = SolidView;

    fn update(&mut self, _now_ms: f64) {}

    fn draw(&self, surface: &mut dyn Surface, view: &SolidView) {
        let Some(state) = &self.state else {
            return;
        };
        let shape = Solid {
            opacity: state.opacity,
            ..self.shape
        };
        shape.draw(surface, &view.nested(Self::placement(state)));
    }
}

impl Depth for AssemblyPiece {
    fn depth(&self, view: &SolidView) -> f64 {
        match &self.state {
            Some(state) => view.projector.depth(view.world(state.position)),
            None => f64::NEG_INFINITY,
        }
    }
}

/// Slot targets and rest shapes: 27 body cubes (one of them the eye) and the tail fin, last.
fn build_pieces(params: &CubeAssemblyParams, rng: &mut Rng64) -> (Vec<Vec3>, Vec<Solid>) {
    let unit = params.cube_size + params.gap;
    let offset = -unit;
    let mut targets = Vec::with_capacity(28);
    let mut shapes = Vec::with_capacity(28);
    for x in 0..3 {
        for y in 0..3 {
            for z in 0..3 {
                targets.push(Vec3::new(
                    offset + x as f64 * unit,
                    offset + y as f64 * unit,
                    offset + z as f64 * unit,
                ));
                let color = if (x, y, z) == EYE_CELL {
                    DEEP_BACKGROUND
                } else {
                    Rgba8::opaque(255, 255, 255).shade(rng.range(0.92, 1.0))
                };
                shapes.push(Solid::new(
                    EntityVariant::Cube {
                        size: params.cube_size,
                    },
                    Pose::IDENTITY,
                    color,
                ));
            }
        }
    }

    let base = unit * 3.0;
    let height = 1.4 * base;
    let tip = Vec3::new(1.0, 1.0, 1.0);
    let corner = Vec3::new(offset - 0.3, offset - 0.3, offset - 0.3);
    let back = (-tip).try_normalize().unwrap_or(Vec3::UP);
    targets.push(corner + back * (height / 2.0));
    shapes.push(Solid::new(
        EntityVariant::Tail {
            radius: base / 2.0,
            height,
            sides: 4,
            twist: FRAC_PI_4,
        },
        Pose {
            rotation: y_axis_to(tip),
            ..Pose::IDENTITY
        },
        Rgba8::opaque(255, 255, 255).shade(0.96),
    ));
    (targets, shapes)
}

/// Group sway of the assembled fish.
fn group_pose(t: f64) -> Pose {
    Pose {
        position: Vec3::new(0.0, 0.12 * (0.7 * t).sin(), 0.0),
        rotation: Euler::new(
            -(1.0 / 2.0_f64.sqrt()).atan() + 0.05 * (0.4 * t).sin(),
            -FRAC_PI_4 + t * 0.1 + 0.06 * (0.5 * t).sin(),
            0.04 * (0.6 * t).sin(),
        ),
        scale: 1.0,
    }
}

fn camera(t: f64) -> Camera {
    Camera::orbit(
        11.0 + 0.5 * (0.25 * t).sin(),
        5.0 + 0.4 * (0.3 * t + 0.8).sin(),
        0.08 * t,
        45.0,
    )
}

/// Cubes drop one by one into a 3×3×3 body, the tail lands last, the whole thing holds, bursts
/// apart and starts over in a new order.
#[derive(Clone, Debug)]
pub struct CubeAssembly {
    viewport: Viewport,
    background: Rgba8,
    params: CubeAssemblyParams,
    seed: u64,
    machine: AssemblyMachine,
    pieces: Composer<AssemblyPiece>,
}

impl CubeAssembly {
    pub const NAME: &'static str = "cube_assembly";

    #[tracing::instrument(level = "debug", skip(params))]
    pub fn new(params: &CubeAssemblyParams, viewport: Viewport, seed: u64) -> LoopResult<Self> {
        let (machine, pieces) = Self::build(params, seed)?;
        Ok(Self {
            viewport,
            background: DEEP_BACKGROUND,
            params: params.clone(),
            seed,
            machine,
            pieces,
        })
    }

    fn build(
        params: &CubeAssemblyParams,
        seed: u64,
    ) -> LoopResult<(AssemblyMachine, Composer<AssemblyPiece>)> {
        let mut rng = Rng64::new(seed);
        let (targets, shapes) = build_pieces(params, &mut rng);
        let tail = targets.len() - 1;
        let machine_seed = rng.next_u64();
        let machine =
            AssemblyMachine::new(targets, Some(tail), params.timings, machine_seed, 0.0)?;
        let pieces = shapes
            .into_iter()
            .map(|shape| AssemblyPiece { shape, state: None })
            .collect();
        Ok((machine, pieces))
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    pub fn machine(&self) -> &AssemblyMachine {
        &self.machine
    }

    pub fn pieces(&self) -> &[AssemblyPiece] {
        self.pieces.entities()
    }

    pub fn state(&self) -> AssemblyState {
        self.machine.state()
    }

    fn pose_pieces(&mut self, now_ms: f64) {
        let states = self.machine.pieces(now_ms);
        let pieces = self.pieces.entities_mut();
        for piece in pieces.iter_mut() {
            piece.state = None;
        }
        for state in states {
            if let Some(piece) = pieces.get_mut(state.slot) {
                piece.state = Some(state);
            }
        }
    }
}

impl Scene for CubeAssembly {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        self.machine.advance(now_ms);
        self.pose_pieces(now_ms);

        let t = seconds(now_ms);
        let key = Vec3::new(5.0, 10.0, 7.0);
        let view = SolidView {
            projector: camera(t).projector(self.viewport),
            lighting: studio_lighting(0.8, 0.5, key, self.params.fog_density),
            group: Transform3::from(group_pose(t)),
        };
        surface.clear(self.background);
        self.pieces.tick_depth_sorted(now_ms, surface, &view);
    }

    fn reset(&mut self) {
        // Same inputs as construction, which already validated them.
        if let Ok((machine, pieces)) = Self::build(&self.params, self.seed) {
            self.machine = machine;
            self.pieces = pieces;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/cube_assembly.rs"]
mod tests;
