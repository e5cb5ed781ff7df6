use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, FRAC_PI_8};

use crate::effects::{DEEP_BACKGROUND, seconds, studio_lighting};
use crate::foundation::core::{Euler, Rgba8, Vec3, Viewport};
use crate::foundation::error::{LoopError, LoopResult};
use crate::foundation::math::Rng64;
use crate::render::surface::Surface;
use crate::scene::camera::Camera;
use crate::scene::composer::{Composer, Scene};
use crate::scene::entity::{Depth, Entity};
use crate::scene::solid::{EntityVariant, Pose, Solid, SolidView, Transform3};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VoxelFishParams {
    pub cube_size: f64,
    pub spacing: f64,
    /// Grid cell (0..3 per axis) left out of the body.
    pub hole: [usize; 3],
    pub scale: f64,
    pub fog_density: f64,
}

impl Default for VoxelFishParams {
    fn default() -> Self {
        Self {
            cube_size: 0.55,
            spacing: 0.62,
            hole: [1, 1, 2],
            scale: 1.1,
            fog_density: 0.12,
        }
    }
}

impl VoxelFishParams {
    pub fn validate(&self) -> LoopResult<()> {
        if !(self.cube_size > 0.0 && self.spacing > 0.0 && self.scale > 0.0) {
            return Err(LoopError::validation("voxel fish sizes must be positive"));
        }
        Ok(())
    }
}

/// A piece of the fish. Body cubes breathe around their rest position; fin and eye stay put.
#[derive(Clone, Debug)]
pub struct FishPart {
    solid: Solid,
    rest: Vec3,
    /// Breathing phase offset, for body cubes.
    breath: Option<f64>,
}

impl FishPart {
    fn fixed(solid: Solid) -> Self {
        Self {
            rest: solid.pose.position,
            solid,
            breath: None,
        }
    }

    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    pub fn rest(&self) -> Vec3 {
        self.rest
    }

    pub fn breathes(&self) -> bool {
        self.breath.is_some()
    }
}

impl Entity for FishPart {
    type View = SolidView;

    fn update(&mut self, now_ms: f64) {
        let Some(phase) = self.breath else {
            return;
        };
        let n = seconds(now_ms) * 1.1 + phase;
        let offset = 0.02 * n.sin();
        let drift = Vec3::new(offset, 0.018 * (n * 1.3).cos(), -offset * 0.7);
        self.solid.pose.position = self.rest + drift;
    }

    fn draw(&self, surface: &mut dyn Surface, view: &SolidView) {
        self.solid.draw(surface, view);
    }
}

impl Depth for FishPart {
    fn depth(&self, view: &SolidView) -> f64 {
        self.solid.depth(view)
    }
}

fn build_parts(params: &VoxelFishParams, rng: &mut Rng64) -> Vec<FishPart> {
    let s = params.spacing;
    let mut parts = Vec::with_capacity(28);
    for x in 0..3 {
        for y in 0..3 {
            for z in 0..3 {
                if [x, y, z] == params.hole {
                    continue;
                }
                let at = Vec3::new(
                    (x as f64 - 1.0) * s,
                    (y as f64 - 1.0) * s,
                    (z as f64 - 1.0) * s,
                );
                let tint = rng.range(0.93, 1.0);
                let id = parts.len();
                parts.push(FishPart {
                    solid: Solid::new(
                        EntityVariant::Cube {
                            size: params.cube_size,
                        },
                        Pose::at(at),
                        Rgba8::opaque(255, 255, 255).shade(tint),
                    ),
                    rest: at,
                    breath: Some((id % 13) as f64 * 0.37),
                });
            }
        }
    }

    parts.push(FishPart::fixed(Solid::new(
        EntityVariant::Tail {
            radius: 0.55,
            height: 1.3,
            sides: 3,
            twist: 0.0,
        },
        Pose {
            position: Vec3::new(-s * 1.9, s * 0.35, 0.0),
            rotation: Euler::new(0.0, FRAC_PI_6, FRAC_PI_2),
            scale: 1.0,
        },
        Rgba8::opaque(255, 255, 255),
    )));
    parts.push(FishPart::fixed(Solid::new(
        EntityVariant::Eye { radius: 0.12 },
        Pose::at(Vec3::new(s * 1.35, 0.0, s * 0.68)),
        DEEP_BACKGROUND,
    )));
    parts
}

fn group_pose(t: f64, scale: f64) -> Pose {
    Pose {
        position: Vec3::new(0.0, 0.12 * (t * 0.9).sin(), 0.0),
        rotation: Euler::new(
            -FRAC_PI_8 + 0.04 * (t * 0.5).sin(),
            -FRAC_PI_4 + 0.07 * (t * 0.7).sin(),
            0.0,
        ),
        scale,
    }
}

/// A voxel fish idling in place while the camera circles it.
#[derive(Clone, Debug)]
pub struct VoxelFish {
    viewport: Viewport,
    background: Rgba8,
    params: VoxelFishParams,
    parts: Composer<FishPart>,
}

impl VoxelFish {
    pub const NAME: &'static str = "voxel_fish";

    #[tracing::instrument(level = "debug", skip(params))]
    pub fn new(params: &VoxelFishParams, viewport: Viewport, seed: u64) -> LoopResult<Self> {
        params.validate()?;
        let parts = build_parts(params, &mut Rng64::new(seed));
        Ok(Self {
            viewport,
            background: DEEP_BACKGROUND,
            params: params.clone(),
            parts: Composer::new(parts),
        })
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    pub fn parts(&self) -> &[FishPart] {
        self.parts.entities()
    }
}

impl Scene for VoxelFish {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        let t = seconds(now_ms);
        let camera = Camera::orbit(
            10.5 + 0.35 * (t * 0.35).sin(),
            4.8 + 0.35 * (t * 0.42 + 1.4).sin(),
            t * 0.12,
            45.0,
        );
        let key = Vec3::new(5.0, 8.0, 7.0);
        let view = SolidView {
            projector: camera.projector(self.viewport),
            lighting: studio_lighting(0.8, 0.6, key, self.params.fog_density),
            group: Transform3::from(group_pose(t, self.params.scale)),
        };
        surface.clear(self.background);
        self.parts.tick_depth_sorted(now_ms, surface, &view);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/voxel_fish.rs"]
mod tests;
