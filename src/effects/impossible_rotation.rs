use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

use crate::effects::{DEEP_BACKGROUND, seconds, studio_lighting};
use crate::foundation::core::{Euler, Rgba8, Vec3, Viewport};
use crate::foundation::error::{LoopError, LoopResult};
use crate::render::surface::Surface;
use crate::scene::camera::Camera;
use crate::scene::composer::{Composer, Scene};
use crate::scene::entity::{Depth, Entity};
use crate::scene::solid::{EntityVariant, Pose, Solid, SolidView, Transform3};

const EDGE_COLOR: Rgba8 = Rgba8::opaque(0xcf, 0xd3, 0xe4);
const DIAGONAL_COLOR: Rgba8 = Rgba8::opaque(0xd8, 0xdf, 0xf5);

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImpossibleRotationParams {
    pub cube_size: f64,
    pub edge_length: f64,
    pub edge_thickness: f64,
    /// How far the inner frame's edges sit inside the outer ones.
    pub inset: f64,
    pub fog_density: f64,
}

impl Default for ImpossibleRotationParams {
    fn default() -> Self {
        Self {
            cube_size: 2.4,
            edge_length: 2.62,
            edge_thickness: 0.11,
            inset: 0.35,
            fog_density: 0.12,
        }
    }
}

impl ImpossibleRotationParams {
    pub fn validate(&self) -> LoopResult<()> {
        if !(self.cube_size > 0.0 && self.edge_length > 0.0 && self.edge_thickness > 0.0) {
            return Err(LoopError::validation(
                "impossible rotation sizes must be positive",
            ));
        }
        if !(0.0..self.edge_length / 2.0).contains(&self.inset) {
            return Err(LoopError::validation(
                "inset must be below half the edge length",
            ));
        }
        Ok(())
    }
}

/// Which rotating group a part belongs to. Outer and inner frames both hang off the root, not
/// off each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Frame {
    Root,
    Outer,
    Inner,
}

/// One view per group, rebuilt every frame.
#[derive(Clone, Debug)]
pub struct FrameViews {
    pub root: SolidView,
    pub outer: SolidView,
    pub inner: SolidView,
}

impl FrameViews {
    pub fn get(&self, frame: Frame) -> &SolidView {
        match frame {
            Frame::Root => &self.root,
            Frame::Outer => &self.outer,
            Frame::Inner => &self.inner,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FramePart {
    solid: Solid,
    frame: Frame,
}

impl FramePart {
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }
}

impl Entity for FramePart {
    type View = FrameViews;

    /// Parts are rigid; all motion lives in the group poses.
    fn update(&mut self, _now_ms: f64) {}

    fn draw(&self, surface: &mut dyn Surface, view: &FrameViews) {
        self.solid.draw(surface, view.get(self.frame));
    }
}

impl Depth for FramePart {
    fn depth(&self, view: &FrameViews) -> f64 {
        self.solid.depth(view.get(self.frame))
    }
}

fn edge(frame: Frame, size: Vec3, color: Rgba8, position: Vec3, rotation: Euler) -> FramePart {
    FramePart {
        solid: Solid::new(
            EntityVariant::Panel { size },
            Pose {
                position,
                rotation,
                scale: 1.0,
            },
            color,
        ),
        frame,
    }
}

fn build_parts(params: &ImpossibleRotationParams) -> Vec<FramePart> {
    let half = params.edge_length / 2.0;
    let k = params.edge_thickness;
    let bar = Vec3::new(params.edge_length, k, k);
    let mut parts = vec![FramePart {
        solid: Solid::new(
            EntityVariant::Cube {
                size: params.cube_size,
            },
            Pose::IDENTITY,
            Rgba8::opaque(255, 255, 255),
        ),
        frame: Frame::Root,
    }];

    let outer = [
        (Vec3::new(0.0, half, 0.0), Euler::default()),
        (Vec3::new(0.0, -half, 0.0), Euler::default()),
        (Vec3::new(0.0, 0.0, half), Euler::new(0.0, FRAC_PI_2, 0.0)),
        (Vec3::new(0.0, 0.0, -half), Euler::new(0.0, FRAC_PI_2, 0.0)),
        (Vec3::new(half, 0.0, 0.0), Euler::new(0.0, 0.0, FRAC_PI_2)),
        (Vec3::new(-half, 0.0, 0.0), Euler::new(0.0, 0.0, FRAC_PI_2)),
    ];
    for (at, rot) in outer {
        parts.push(edge(Frame::Outer, bar, EDGE_COLOR, at, rot));
    }

    // Slightly skewed so the inner frame never lines up with the outer one.
    let h = half - params.inset;
    let inner = [
        (Vec3::new(0.0, h, 0.0), Euler::new(0.18, 0.12, 0.05)),
        (Vec3::new(0.0, -h, 0.0), Euler::new(-0.18, -0.12, -0.03)),
        (Vec3::new(0.0, 0.0, h), Euler::new(0.1, FRAC_PI_2 + 0.18, 0.08)),
        (Vec3::new(0.0, 0.0, -h), Euler::new(-0.12, FRAC_PI_2 - 0.16, -0.07)),
        (Vec3::new(h, 0.0, 0.0), Euler::new(0.14, 0.06, FRAC_PI_2 + 0.16)),
        (Vec3::new(-h, 0.0, 0.0), Euler::new(-0.16, -0.08, FRAC_PI_2 - 0.16)),
    ];
    for (at, rot) in inner {
        parts.push(edge(Frame::Inner, bar, EDGE_COLOR, at, rot));
    }

    let diagonal = Vec3::new(k, k, params.edge_length * 0.9);
    let d = half * 0.6;
    parts.push(edge(
        Frame::Inner,
        diagonal,
        DIAGONAL_COLOR,
        Vec3::new(d, d, 0.0),
        Euler::new(FRAC_PI_4, 0.0, FRAC_PI_4),
    ));
    parts.push(edge(
        Frame::Inner,
        diagonal,
        DIAGONAL_COLOR,
        Vec3::new(-d, -d, 0.0),
        Euler::new(-FRAC_PI_4, 0.0, -FRAC_PI_4),
    ));
    parts
}

/// Group rotations at `t` seconds: root, outer, inner.
pub fn frame_rotations(t: f64) -> [Euler; 3] {
    [
        Euler::new(
            -FRAC_PI_6 + 0.2 * (t * 0.175 + 1.2).sin(),
            FRAC_PI_4 + 0.3 * (t * 0.25).sin(),
            0.0,
        ),
        Euler::new(0.1 * (t * 0.4).sin(), 0.15 * (t * 0.5 + 0.8).sin(), 0.0),
        Euler::new(
            -0.15 * (t * 0.5 + 0.3).sin(),
            -0.25 * (t * 0.6 + 1.4).sin(),
            0.0,
        ),
    ]
}

/// A solid cube wrapped in two wire frames that turn against each other, so the edges seem to
/// pass through one another.
#[derive(Clone, Debug)]
pub struct ImpossibleRotation {
    viewport: Viewport,
    background: Rgba8,
    params: ImpossibleRotationParams,
    parts: Composer<FramePart>,
}

impl ImpossibleRotation {
    pub const NAME: &'static str = "impossible_rotation";

    #[tracing::instrument(level = "debug", skip(params))]
    pub fn new(params: &ImpossibleRotationParams, viewport: Viewport) -> LoopResult<Self> {
        params.validate()?;
        Ok(Self {
            viewport,
            background: DEEP_BACKGROUND,
            params: params.clone(),
            parts: Composer::new(build_parts(params)),
        })
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    pub fn parts(&self) -> &[FramePart] {
        self.parts.entities()
    }

    pub fn views(&self, now_ms: f64) -> FrameViews {
        let t = seconds(now_ms);
        let camera = Camera::orbit(
            10.5 + 0.3 * (t * 0.3).sin(),
            4.8 + 0.3 * (t * 0.4 + 1.1).sin(),
            t * 0.1,
            45.0,
        );
        let [root_rot, outer_rot, inner_rot] = frame_rotations(t);
        let key = Vec3::new(5.0, 8.0, 7.0);
        let root = SolidView {
            projector: camera.projector(self.viewport),
            lighting: studio_lighting(0.85, 0.6, key, self.params.fog_density),
            group: Transform3::from(Pose {
                rotation: root_rot,
                ..Pose::IDENTITY
            }),
        };
        let outer = root.nested(Pose {
            rotation: outer_rot,
            ..Pose::IDENTITY
        });
        let inner = root.nested(Pose {
            rotation: inner_rot,
            ..Pose::IDENTITY
        });
        FrameViews { root, outer, inner }
    }
}

impl Scene for ImpossibleRotation {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        let views = self.views(now_ms);
        surface.clear(self.background);
        self.parts.tick_depth_sorted(now_ms, surface, &views);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/impossible_rotation.rs"]
mod tests;
