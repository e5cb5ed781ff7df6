//! Concrete looping effects. Each one is an entity factory, a phase table and a draw routine
//! plugged into [`Scene`](crate::Scene).

pub(crate) mod cube_assembly;
pub(crate) mod folding_blocks;
pub(crate) mod impossible_rotation;
pub(crate) mod shifting_grid;
pub(crate) mod sliding_puzzle;
pub(crate) mod voxel_fish;
pub(crate) mod voxel_galaxy;

use std::f64::consts::TAU;

use crate::foundation::core::{Point, Rgba8, Vec3, Viewport};
use crate::foundation::math::Rng64;
use crate::render::surface::Surface;
use crate::scene::solid::{Fog, Light, Lighting};

/// Milliseconds per frame of the 60 Hz display the per-frame rates below are tuned for.
pub(crate) const FRAME_MS: f64 = 1000.0 / 60.0;

/// Near-black backdrop shared by the 3D effects.
pub(crate) const DEEP_BACKGROUND: Rgba8 = Rgba8::opaque(5, 5, 7);

/// A dust mote drifting downward and wrapping around, positioned purely from time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DriftParticle {
    /// Horizontal position as a fraction of the viewport width.
    pub x: f64,
    /// Vertical position at time zero, as a fraction of the viewport height.
    pub y0: f64,
    pub radius: f64,
    /// Viewport heights per millisecond.
    pub speed: f64,
    pub opacity: f64,
}

impl DriftParticle {
    pub fn random(rng: &mut Rng64) -> Self {
        Self {
            x: rng.next_f64(),
            y0: rng.next_f64(),
            radius: rng.range(0.5, 2.5),
            speed: rng.range(0.00005, 0.00015) / FRAME_MS,
            opacity: rng.range(0.1, 0.4),
        }
    }

    pub fn position(&self, now_ms: f64, viewport: Viewport) -> Point {
        let y = (self.y0 + self.speed * now_ms.max(0.0)).rem_euclid(1.0);
        Point::new(self.x * viewport.width, y * viewport.height)
    }

    pub fn draw(&self, surface: &mut dyn Surface, now_ms: f64, viewport: Viewport, tint: Rgba8) {
        surface.fill_circle(
            self.position(now_ms, viewport),
            self.radius,
            Rgba8 {
                a: (self.opacity * 255.0).round() as u8,
                ..tint
            },
        );
    }
}

/// A fixed background star whose brightness oscillates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TwinkleStar {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub brightness: f64,
    /// Radians per millisecond.
    pub rate: f64,
}

impl TwinkleStar {
    pub fn random(rng: &mut Rng64) -> Self {
        Self {
            x: rng.next_f64(),
            y: rng.next_f64(),
            radius: rng.range(0.0, 2.0),
            brightness: rng.next_f64(),
            rate: rng.range(0.001, 0.003),
        }
    }

    pub fn alpha(&self, now_ms: f64) -> f64 {
        let twinkle = (now_ms * self.rate + self.brightness * TAU).sin() * 0.5 + 0.5;
        self.brightness * twinkle * 0.6
    }

    pub fn draw(&self, surface: &mut dyn Surface, now_ms: f64, viewport: Viewport) {
        surface.fill_circle(
            Point::new(self.x * viewport.width, self.y * viewport.height),
            self.radius,
            Rgba8::with_alpha(255, 255, 255, self.alpha(now_ms)),
        );
    }
}

/// Darken the edges with concentric rings whose alpha grows toward `radius`.
pub(crate) fn radial_vignette(
    surface: &mut dyn Surface,
    center: Point,
    radius: f64,
    edge: Rgba8,
    steps: u32,
) {
    if steps == 0 || radius <= 0.0 {
        return;
    }
    let band = radius / f64::from(steps);
    for i in 0..steps {
        let t = (f64::from(i) + 0.5) / f64::from(steps);
        let color = edge.fade(t);
        surface.stroke_circle(center, band * (f64::from(i) + 0.5), color, band);
    }
}

/// Soft ambient fill plus a cool key light and a dim rim light from below.
pub(crate) fn studio_lighting(
    ambient: f64,
    rim: f64,
    key_from: Vec3,
    fog_density: f64,
) -> Lighting {
    Lighting {
        ambient: Rgba8::opaque(0xb0, 0xb3, 0xc0),
        ambient_intensity: ambient,
        lights: vec![
            Light::new(key_from, Rgba8::opaque(0xdd, 0xe2, 0xf5), 1.0),
            Light::new(Vec3::new(-5.0, -6.0, -6.0), Rgba8::opaque(0x7f, 0x83, 0xa0), rim),
        ],
        fog: Some(Fog {
            color: DEEP_BACKGROUND,
            density: fog_density,
        }),
    }
}

/// Seconds, as the oscillation rates of the 3D effects are expressed.
pub(crate) fn seconds(now_ms: f64) -> f64 {
    now_ms / 1000.0
}

#[cfg(test)]
#[path = "../../tests/unit/effects/shared.rs"]
mod tests;
