use std::f64::consts::TAU;

use crate::foundation::core::{Euler, Point, Rgba8, Vec3};
use crate::render::surface::Surface;
use crate::scene::camera::Projector;

/// Placement of a solid: uniform scale, then rotation, then translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Euler,
    pub scale: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Euler::new(0.0, 0.0, 0.0),
        scale: 1.0,
    };

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        self.position + self.rotation.rotate(v * self.scale)
    }

    pub fn apply_normal(&self, n: Vec3) -> Vec3 {
        self.rotation.rotate(n)
    }
}

/// Affine transform of 3D space with a uniform or non-uniform linear part, used to chain
/// nested groups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3 {
    x: Vec3,
    y: Vec3,
    z: Vec3,
    translation: Vec3,
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform3 {
    pub const IDENTITY: Self = Self {
        x: Vec3::new(1.0, 0.0, 0.0),
        y: Vec3::new(0.0, 1.0, 0.0),
        z: Vec3::new(0.0, 0.0, 1.0),
        translation: Vec3::ZERO,
    };

    fn linear(&self, v: Vec3) -> Vec3 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        self.linear(v) + self.translation
    }

    /// Direction of a surface normal after the transform (unit length).
    pub fn apply_normal(&self, n: Vec3) -> Vec3 {
        self.linear(n).try_normalize().unwrap_or(n)
    }

    /// `self ∘ inner`: apply `inner` first.
    pub fn then(&self, inner: &Self) -> Self {
        Self {
            x: self.linear(inner.x),
            y: self.linear(inner.y),
            z: self.linear(inner.z),
            translation: self.apply(inner.translation),
        }
    }
}

impl From<Pose> for Transform3 {
    fn from(p: Pose) -> Self {
        Self {
            x: p.rotation.rotate(Vec3::new(p.scale, 0.0, 0.0)),
            y: p.rotation.rotate(Vec3::new(0.0, p.scale, 0.0)),
            z: p.rotation.rotate(Vec3::new(0.0, 0.0, p.scale)),
            translation: p.position,
        }
    }
}

/// Rotation taking the local +Y axis onto `dir`. Zero `dir` yields no rotation.
pub fn y_axis_to(dir: Vec3) -> Euler {
    let Some(d) = dir.try_normalize() else {
        return Euler::default();
    };
    Euler::new(d.z.atan2(d.y), 0.0, -d.x.clamp(-1.0, 1.0).asin())
}

/// What a 3D entity looks like. Each variant carries only its own geometry parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntityVariant {
    /// Axis-aligned cube with edge `size`.
    Cube { size: f64 },
    /// Cone along local +Y (apex up) with a `sides`-gon base, rotated by `twist` around Y.
    Tail {
        radius: f64,
        height: f64,
        sides: u8,
        twist: f64,
    },
    /// Sphere, drawn as a shaded disc.
    Eye { radius: f64 },
    /// Box with independent extents.
    Panel { size: Vec3 },
    /// Small unlit disc (dust, stars).
    Particle { radius: f64 },
}

/// Directional light; `direction` points from the scene toward the light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub direction: Vec3,
    pub color: Rgba8,
    pub intensity: f64,
}

impl Light {
    pub fn new(toward: Vec3, color: Rgba8, intensity: f64) -> Self {
        Self {
            direction: toward.try_normalize().unwrap_or(Vec3::UP),
            color,
            intensity,
        }
    }
}

/// Exponential-squared distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Rgba8,
    pub density: f64,
}

impl Fog {
    /// Blend factor toward the fog color, in [0,1].
    pub fn factor(&self, distance: f64) -> f64 {
        let d = self.density * distance.max(0.0);
        (1.0 - (-d * d).exp()).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: Rgba8,
    pub ambient_intensity: f64,
    pub lights: Vec<Light>,
    pub fog: Option<Fog>,
}

impl Lighting {
    /// Lambert-shade `base` for a surface with `normal`, then apply fog at `distance`.
    pub fn shade(&self, base: Rgba8, normal: Vec3, distance: f64) -> Rgba8 {
        let unit = |c: u8| f64::from(c) / 255.0;
        let mut sum = [
            unit(self.ambient.r) * self.ambient_intensity,
            unit(self.ambient.g) * self.ambient_intensity,
            unit(self.ambient.b) * self.ambient_intensity,
        ];
        for l in &self.lights {
            let k = normal.dot(l.direction).max(0.0) * l.intensity;
            sum[0] += unit(l.color.r) * k;
            sum[1] += unit(l.color.g) * k;
            sum[2] += unit(l.color.b) * k;
        }
        let ch = |c: u8, s: f64| (f64::from(c) * s).round().clamp(0.0, 255.0) as u8;
        let lit = Rgba8::new(
            ch(base.r, sum[0]),
            ch(base.g, sum[1]),
            ch(base.b, sum[2]),
            base.a,
        );
        match self.fog {
            Some(fog) => {
                let f = fog.factor(distance);
                Rgba8 {
                    a: lit.a,
                    ..lit.mix(fog.color, f)
                }
            }
            None => lit,
        }
    }
}

/// Everything a 3D entity needs to draw itself for one frame.
#[derive(Clone, Debug)]
pub struct SolidView {
    pub projector: Projector,
    pub lighting: Lighting,
    /// Parent transform shared by all solids drawn with this view.
    pub group: Transform3,
}

impl SolidView {
    pub fn world(&self, local: Vec3) -> Vec3 {
        self.group.apply(local)
    }

    /// The same view nested one group deeper.
    pub fn nested(&self, inner: Pose) -> Self {
        Self {
            projector: self.projector,
            lighting: self.lighting.clone(),
            group: self.group.then(&inner.into()),
        }
    }
}

/// A posed, colored instance of an [`EntityVariant`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solid {
    pub variant: EntityVariant,
    pub pose: Pose,
    pub color: Rgba8,
    /// Multiplies the color alpha, in [0,1].
    pub opacity: f64,
}

struct Face {
    points: Vec<Vec3>,
    normal: Vec3,
}

fn box_faces(h: Vec3) -> Vec<Face> {
    let v = |x: f64, y: f64, z: f64| Vec3::new(x * h.x, y * h.y, z * h.z);
    vec![
        Face {
            points: vec![v(1., -1., -1.), v(1., 1., -1.), v(1., 1., 1.), v(1., -1., 1.)],
            normal: Vec3::new(1.0, 0.0, 0.0),
        },
        Face {
            points: vec![v(-1., -1., 1.), v(-1., 1., 1.), v(-1., 1., -1.), v(-1., -1., -1.)],
            normal: Vec3::new(-1.0, 0.0, 0.0),
        },
        Face {
            points: vec![v(-1., 1., -1.), v(-1., 1., 1.), v(1., 1., 1.), v(1., 1., -1.)],
            normal: Vec3::new(0.0, 1.0, 0.0),
        },
        Face {
            points: vec![v(-1., -1., 1.), v(-1., -1., -1.), v(1., -1., -1.), v(1., -1., 1.)],
            normal: Vec3::new(0.0, -1.0, 0.0),
        },
        Face {
            points: vec![v(-1., -1., 1.), v(1., -1., 1.), v(1., 1., 1.), v(-1., 1., 1.)],
            normal: Vec3::new(0.0, 0.0, 1.0),
        },
        Face {
            points: vec![v(1., -1., -1.), v(-1., -1., -1.), v(-1., 1., -1.), v(1., 1., -1.)],
            normal: Vec3::new(0.0, 0.0, -1.0),
        },
    ]
}

fn cone_faces(radius: f64, height: f64, sides: u8, twist: f64) -> Vec<Face> {
    let n = usize::from(sides.max(3));
    let apex = Vec3::new(0.0, height / 2.0, 0.0);
    let ring: Vec<Vec3> = (0..n)
        .map(|i| {
            let a = twist + TAU * i as f64 / n as f64;
            Vec3::new(a.sin() * radius, -height / 2.0, a.cos() * radius)
        })
        .collect();

    let mut faces = Vec::with_capacity(n + 1);
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        let mut normal = (a - apex).cross(b - apex);
        let centroid = (apex + a + b) * (1.0 / 3.0);
        if normal.dot(centroid) < 0.0 {
            normal = -normal;
        }
        faces.push(Face {
            points: vec![apex, a, b],
            normal: normal.try_normalize().unwrap_or(Vec3::UP),
        });
    }
    faces.push(Face {
        points: ring.into_iter().rev().collect(),
        normal: Vec3::new(0.0, -1.0, 0.0),
    });
    faces
}

impl Solid {
    pub fn new(variant: EntityVariant, pose: Pose, color: Rgba8) -> Self {
        Self {
            variant,
            pose,
            color,
            opacity: 1.0,
        }
    }

    /// World-space center after the group transform.
    pub fn center(&self, view: &SolidView) -> Vec3 {
        view.world(self.pose.position)
    }

    /// View depth of the center (painter's key).
    pub fn depth(&self, view: &SolidView) -> f64 {
        view.projector.depth(self.center(view))
    }

    fn faces(&self) -> Option<Vec<Face>> {
        match self.variant {
            EntityVariant::Cube { size } => Some(box_faces(Vec3::new(size, size, size) * 0.5)),
            EntityVariant::Panel { size } => Some(box_faces(size * 0.5)),
            EntityVariant::Tail {
                radius,
                height,
                sides,
                twist,
            } => Some(cone_faces(radius, height, sides, twist)),
            EntityVariant::Eye { .. } | EntityVariant::Particle { .. } => None,
        }
    }

    /// Project, cull, shade and paint this solid.
    pub fn draw(&self, surface: &mut dyn Surface, view: &SolidView) {
        let base = self.color.fade(self.opacity.clamp(0.0, 1.0));
        if base.a == 0 || self.pose.scale <= 0.0 {
            return;
        }
        match self.variant {
            EntityVariant::Eye { radius } => self.draw_disc(surface, view, radius, base, true),
            EntityVariant::Particle { radius } => {
                self.draw_disc(surface, view, radius, base, false);
            }
            EntityVariant::Cube { .. }
            | EntityVariant::Panel { .. }
            | EntityVariant::Tail { .. } => {
                self.draw_faces(surface, view, base);
            }
        }
    }

    fn draw_faces(&self, surface: &mut dyn Surface, view: &SolidView, base: Rgba8) {
        let Some(faces) = self.faces() else {
            return;
        };
        let eye = view.projector.eye();
        let mut visible: Vec<(f64, Vec<Point>, Rgba8)> = Vec::with_capacity(faces.len());
        for face in faces {
            let world: Vec<Vec3> = face
                .points
                .iter()
                .map(|&p| view.world(self.pose.apply(p)))
                .collect();
            let normal = view.group.apply_normal(self.pose.apply_normal(face.normal));
            let centroid =
                world.iter().fold(Vec3::ZERO, |acc, &p| acc + p) * (1.0 / world.len() as f64);
            if normal.dot(eye - centroid) <= 0.0 {
                continue;
            }
            let projected: Option<Vec<Point>> = world
                .iter()
                .map(|&p| view.projector.project(p).map(|pr| pr.point))
                .collect();
            let Some(points) = projected else {
                continue;
            };
            let distance = (centroid - eye).length();
            let color = view.lighting.shade(base, normal, distance);
            visible.push((view.projector.depth(centroid), points, color));
        }
        visible.sort_by(|a, b| b.0.total_cmp(&a.0));
        for (_, points, color) in &visible {
            surface.fill_polygon(points, *color);
        }
    }

    fn draw_disc(
        &self,
        surface: &mut dyn Surface,
        view: &SolidView,
        radius: f64,
        base: Rgba8,
        lit: bool,
    ) {
        let center = self.center(view);
        let Some(p) = view.projector.project(center) else {
            return;
        };
        let r_px = radius * self.pose.scale * view.projector.pixels_per_unit(p.depth);
        let color = if lit {
            let toward_eye = (view.projector.eye() - center)
                .try_normalize()
                .unwrap_or(Vec3::UP);
            view.lighting.shade(base, toward_eye, p.depth)
        } else {
            match view.lighting.fog {
                Some(fog) => base.fade(1.0 - fog.factor(p.depth)),
                None => base,
            }
        };
        surface.fill_circle(p.point, r_px, color);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/solid.rs"]
mod tests;
