use std::f64::consts::TAU;
use std::sync::Arc;

use crate::animation::ease::Ease;
use crate::animation::phase::PhaseSchedule;
use crate::effects::TwinkleStar;
use crate::foundation::core::{Affine, Point, Rect, Rgba8, Vec3, Viewport};
use crate::foundation::error::LoopResult;
use crate::foundation::math::Rng64;
use crate::render::surface::Surface;
use crate::scene::camera::{isometric, isometric_depth};
use crate::scene::composer::{Composer, Scene};
use crate::scene::entity::{Depth, Entity, Progress};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GalaxyPhase {
    /// Bodies intact, planets orbiting.
    Solar,
    /// Voxels drifting from their bodies to scattered targets.
    Transform,
    /// Fully scattered voxel cloud.
    Voxel,
}

/// One orbiting body of the solar system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Planet {
    pub distance: f64,
    pub size: f64,
    /// Relative angular speed.
    pub speed: f64,
    pub color: Rgba8,
}

pub const PLANETS: [Planet; 8] = [
    Planet {
        distance: 80.0,
        size: 8.0,
        speed: 0.8,
        color: Rgba8::opaque(0x8c, 0x78, 0x53),
    },
    Planet {
        distance: 120.0,
        size: 12.0,
        speed: 0.6,
        color: Rgba8::opaque(0xff, 0xc6, 0x49),
    },
    Planet {
        distance: 160.0,
        size: 13.0,
        speed: 0.5,
        color: Rgba8::opaque(0x4a, 0x90, 0xe2),
    },
    Planet {
        distance: 200.0,
        size: 10.0,
        speed: 0.4,
        color: Rgba8::opaque(0xe7, 0x4c, 0x3c),
    },
    Planet {
        distance: 280.0,
        size: 24.0,
        speed: 0.2,
        color: Rgba8::opaque(0xf3, 0x9c, 0x12),
    },
    Planet {
        distance: 360.0,
        size: 22.0,
        speed: 0.15,
        color: Rgba8::opaque(0xe6, 0xc7, 0x9c),
    },
    Planet {
        distance: 440.0,
        size: 18.0,
        speed: 0.1,
        color: Rgba8::opaque(0x4f, 0xd0, 0xe7),
    },
    Planet {
        distance: 520.0,
        size: 17.0,
        speed: 0.08,
        color: Rgba8::opaque(0x41, 0x66, 0xf5),
    },
];

const SUN_COLOR: Rgba8 = Rgba8::opaque(0xff, 0x8c, 0x00);
const SUN_VOXEL_SIZE: f64 = 4.0;
const PLANET_VOXEL_SIZE: f64 = 3.0;
/// Radians per millisecond per unit of planet speed.
const ORBIT_RATE: f64 = 0.0001;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VoxelGalaxyParams {
    pub solar_ms: f64,
    pub transform_ms: f64,
    pub voxel_ms: f64,
    pub sun_voxels: u32,
    pub sun_radius: f64,
    pub stars: u32,
}

impl Default for VoxelGalaxyParams {
    fn default() -> Self {
        Self {
            solar_ms: 5000.0,
            transform_ms: 5000.0,
            voxel_ms: 5000.0,
            sun_voxels: 150,
            sun_radius: 35.0,
            stars: 200,
        }
    }
}

impl VoxelGalaxyParams {
    pub fn schedule(&self) -> LoopResult<PhaseSchedule<GalaxyPhase>> {
        PhaseSchedule::new([
            (GalaxyPhase::Solar, self.solar_ms),
            (GalaxyPhase::Transform, self.transform_ms),
            (GalaxyPhase::Voxel, self.voxel_ms),
        ])
    }
}

/// Transformation amount: 0 through the solar phase, linear during the transform, then 1.
pub fn galaxy_progress(phase: GalaxyPhase, t: f64) -> Progress {
    match phase {
        GalaxyPhase::Solar => Progress::START,
        GalaxyPhase::Transform => Progress::new(t),
        GalaxyPhase::Voxel => Progress::END,
    }
}

/// Where a voxel's home body is.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Body {
    Sun,
    Planet { index: usize },
}

impl Body {
    fn center(self, now_ms: f64) -> Vec3 {
        match self {
            Body::Sun => Vec3::ZERO,
            Body::Planet { index } => {
                let planet = PLANETS[index];
                let angle = index as f64 * 0.5 + now_ms * ORBIT_RATE * planet.speed;
                Vec3::new(angle.cos() * planet.distance, angle.sin() * planet.distance, 0.0)
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Look {
    size: f64,
    color: Rgba8,
}

/// Isometric placement shared by every voxel in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsoView {
    pub origin: Point,
    pub scale: f64,
}

/// One isometric cube, attached to a body or scattered.
#[derive(Clone, Debug)]
pub struct Voxel {
    body: Body,
    /// Offset from the body center.
    local: Vec3,
    /// Scattered position.
    target: Vec3,
    size: f64,
    color: Rgba8,
    twinkle_phase: f64,
    /// Radians per millisecond.
    twinkle_rate: f64,
    schedule: Arc<PhaseSchedule<GalaxyPhase>>,
    position: Vec3,
    twinkle: f64,
    progress: Progress,
}

impl Voxel {
    fn sun(radius: f64, schedule: &Arc<PhaseSchedule<GalaxyPhase>>, rng: &mut Rng64) -> Self {
        let angle = rng.range(0.0, TAU);
        let r = rng.next_f64() * radius;
        let local = Vec3::new(angle.cos() * r, angle.sin() * r, rng.centered(radius * 0.25));
        let scatter = rng.range(0.0, TAU);
        let dist = rng.next_f64() * radius * 1.5;
        let target = Vec3::new(
            scatter.cos() * dist,
            scatter.sin() * dist,
            rng.centered(radius * 0.5),
        );
        let look = Look {
            size: SUN_VOXEL_SIZE,
            color: SUN_COLOR,
        };
        Self::new(Body::Sun, local, target, look, schedule, rng)
    }

    fn planet(index: usize, schedule: &Arc<PhaseSchedule<GalaxyPhase>>, rng: &mut Rng64) -> Self {
        let planet = PLANETS[index];
        let theta = rng.range(0.0, TAU);
        let phi = rng.range(0.0, std::f64::consts::PI);
        let r = planet.size / 2.0;
        let local = Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        );
        let scatter = rng.range(0.0, TAU);
        let dist = planet.distance * 0.8 + rng.centered(planet.size);
        let target = Vec3::new(scatter.cos() * dist, scatter.sin() * dist, rng.centered(50.0));
        let look = Look {
            size: PLANET_VOXEL_SIZE,
            color: planet.color,
        };
        Self::new(Body::Planet { index }, local, target, look, schedule, rng)
    }

    fn new(
        body: Body,
        local: Vec3,
        target: Vec3,
        look: Look,
        schedule: &Arc<PhaseSchedule<GalaxyPhase>>,
        rng: &mut Rng64,
    ) -> Self {
        let twinkle_phase = rng.range(0.0, TAU);
        let twinkle_rate = rng.range(0.01, 0.02) * TAU / super::FRAME_MS;
        Self {
            body,
            local,
            target,
            size: look.size,
            color: look.color,
            twinkle_phase,
            twinkle_rate,
            schedule: Arc::clone(schedule),
            position: local,
            twinkle: 1.0,
            progress: Progress::START,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }
}

impl Entity for Voxel {
    type View = IsoView;

    fn update(&mut self, now_ms: f64) {
        let sample = self.schedule.sample(now_ms, 0);
        self.progress = galaxy_progress(sample.phase, sample.progress);
        let home = self.body.center(now_ms) + self.local;
        self.position = home.lerp(self.target, Ease::InOutCubic.apply(self.progress.get()));
        self.twinkle = (self.twinkle_phase + now_ms * self.twinkle_rate).sin() * 0.3 + 0.7;
    }

    fn draw(&self, surface: &mut dyn Surface, view: &IsoView) {
        let depth_factor = (1.0 - (self.position.z / 300.0) * 0.3).clamp(0.0, 1.0);
        let alpha = depth_factor * self.twinkle;
        let h = self.size / 2.0;
        let corner = |dx: f64, dy: f64, dz: f64| {
            isometric(
                self.position + Vec3::new(dx * h, dy * h, dz * h),
                view.scale,
                view.origin,
            )
        };

        let glow = isometric(self.position, view.scale, view.origin);
        let g = self.size * view.scale;
        surface.fill_rect(
            Rect::new(glow.x - g, glow.y - g, glow.x + g, glow.y + g),
            Affine::IDENTITY,
            self.color.fade(0.3 * alpha),
        );

        let top = [
            corner(-1., -1., 1.),
            corner(1., -1., 1.),
            corner(1., 1., 1.),
            corner(-1., 1., 1.),
        ];
        let left = [
            corner(-1., 1., 1.),
            corner(1., 1., 1.),
            corner(1., 1., -1.),
            corner(-1., 1., -1.),
        ];
        let right = [
            corner(1., -1., 1.),
            corner(1., 1., 1.),
            corner(1., 1., -1.),
            corner(1., -1., -1.),
        ];
        surface.fill_polygon(&top, self.color.offset(40).fade(alpha));
        surface.fill_polygon(&left, self.color.fade(alpha));
        surface.fill_polygon(&right, self.color.offset(-40).fade(alpha));
    }
}

impl Depth for Voxel {
    fn depth(&self, _view: &IsoView) -> f64 {
        isometric_depth(self.position)
    }
}

/// A voxel solar system that dissolves into a scattered cloud and reforms.
#[derive(Clone, Debug)]
pub struct VoxelGalaxy {
    viewport: Viewport,
    background: Rgba8,
    schedule: Arc<PhaseSchedule<GalaxyPhase>>,
    voxels: Composer<Voxel>,
    stars: Vec<TwinkleStar>,
    params: VoxelGalaxyParams,
    seed: u64,
    last_phase: Option<GalaxyPhase>,
}

impl VoxelGalaxy {
    pub const NAME: &'static str = "voxel_galaxy";
    pub const BACKGROUND: Rgba8 = Rgba8::opaque(0x0a, 0x0a, 0x0f);

    #[tracing::instrument(level = "debug", skip(params))]
    pub fn new(params: &VoxelGalaxyParams, viewport: Viewport, seed: u64) -> LoopResult<Self> {
        let schedule = Arc::new(params.schedule()?);
        let mut scene = Self {
            viewport,
            background: Self::BACKGROUND,
            schedule,
            voxels: Composer::default(),
            stars: Vec::new(),
            params: params.clone(),
            seed,
            last_phase: None,
        };
        scene.populate();
        Ok(scene)
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    fn populate(&mut self) {
        let mut rng = Rng64::new(self.seed);
        let mut voxels: Vec<Voxel> = (0..self.params.sun_voxels)
            .map(|_| Voxel::sun(self.params.sun_radius, &self.schedule, &mut rng))
            .collect();
        for (index, planet) in PLANETS.iter().enumerate() {
            let count = (planet.size * 3.0).floor() as usize;
            voxels.extend((0..count).map(|_| Voxel::planet(index, &self.schedule, &mut rng)));
        }
        self.voxels.replace_all(voxels);
        self.stars = (0..self.params.stars)
            .map(|_| TwinkleStar::random(&mut rng))
            .collect();
    }

    pub fn voxels(&self) -> &[Voxel] {
        self.voxels.entities()
    }

    pub fn progress_at(&self, now_ms: f64) -> Progress {
        let sample = self.schedule.sample(now_ms, 0);
        galaxy_progress(sample.phase, sample.progress)
    }

    fn draw_orbits(&self, surface: &mut dyn Surface, view: &IsoView, progress: f64) {
        if progress >= 0.5 {
            return;
        }
        let color = Rgba8::with_alpha(255, 255, 255, 0.1 * (1.0 - progress * 2.0));
        for planet in &PLANETS {
            let ring: Vec<Point> = (0..64)
                .map(|i| {
                    let a = TAU * f64::from(i) / 64.0;
                    isometric(
                        Vec3::new(a.cos() * planet.distance, a.sin() * planet.distance, 0.0),
                        view.scale,
                        view.origin,
                    )
                })
                .collect();
            surface.stroke_polygon(&ring, color, 1.0);
        }
    }
}

impl Scene for VoxelGalaxy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn tick(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        let sample = self.schedule.sample(now_ms, 0);
        if self.last_phase != Some(sample.phase) {
            tracing::debug!(phase = ?sample.phase, now_ms, "galaxy phase");
            self.last_phase = Some(sample.phase);
        }
        let progress = galaxy_progress(sample.phase, sample.progress);
        tracing::trace!(now_ms, progress = progress.get(), "galaxy frame");
        let view = IsoView {
            origin: self.viewport.center(),
            scale: 1.0,
        };

        surface.clear(self.background);
        for star in &self.stars {
            star.draw(surface, now_ms, self.viewport);
        }
        self.draw_orbits(surface, &view, progress.get());

        self.voxels.tick_depth_sorted(now_ms, surface, &view);
    }

    fn reset(&mut self) {
        self.populate();
        self.last_phase = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/voxel_galaxy.rs"]
mod tests;
