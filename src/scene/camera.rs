use crate::foundation::core::{Point, Vec3, Viewport};

const NEAR_PLANE: f64 = 0.1;

/// Perspective camera looking from `eye` at `target` (+Y up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f64,
}

impl Camera {
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_deg: f64) -> Self {
        Self {
            eye,
            target,
            fov_y_deg,
        }
    }

    /// Camera on a horizontal circle around the origin, looking at the origin.
    pub fn orbit(radius: f64, height: f64, angle: f64, fov_y_deg: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::look_at(
            Vec3::new(c * radius, height, s * radius),
            Vec3::ZERO,
            fov_y_deg,
        )
    }

    /// Freeze the camera against a viewport.
    pub fn projector(&self, viewport: Viewport) -> Projector {
        let forward = (self.target - self.eye)
            .try_normalize()
            .unwrap_or(Vec3::new(0.0, 0.0, -1.0));
        let right = forward
            .cross(Vec3::UP)
            .try_normalize()
            .unwrap_or(Vec3::new(1.0, 0.0, 0.0));
        let up = right.cross(forward);

        let fov = self.fov_y_deg.clamp(1.0, 179.0).to_radians();
        let focal = (viewport.height / 2.0) / (fov / 2.0).tan();
        Projector {
            eye: self.eye,
            forward,
            right,
            up,
            focal,
            center: viewport.center(),
        }
    }
}

/// A world-space point mapped into logical viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub point: Point,
    /// Distance along the view direction. Larger is farther.
    pub depth: f64,
}

/// A camera bound to a viewport, ready to project points.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    eye: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    focal: f64,
    center: Point,
}

impl Projector {
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// View-space depth of `p` (may be negative behind the camera).
    pub fn depth(&self, p: Vec3) -> f64 {
        (p - self.eye).dot(self.forward)
    }

    /// Screen pixels covered by one world unit at view depth `depth`.
    pub fn pixels_per_unit(&self, depth: f64) -> f64 {
        if depth > NEAR_PLANE {
            self.focal / depth
        } else {
            0.0
        }
    }

    /// Project `p`, or `None` when it lies behind the near plane.
    pub fn project(&self, p: Vec3) -> Option<Projected> {
        let d = p - self.eye;
        let z = d.dot(self.forward);
        if !(z > NEAR_PLANE) {
            return None;
        }
        let k = self.focal / z;
        Some(Projected {
            point: Point::new(
                self.center.x + d.dot(self.right) * k,
                self.center.y - d.dot(self.up) * k,
            ),
            depth: z,
        })
    }
}

const ISO_COS: f64 = 0.866;

/// 2:1 isometric projection of world `(x, y, z)` (z up), scaled and placed at `origin`.
pub fn isometric(p: Vec3, scale: f64, origin: Point) -> Point {
    Point::new(
        origin.x + (p.x - p.y) * ISO_COS * scale,
        origin.y + ((p.x + p.y) * 0.5 - p.z) * scale,
    )
}

/// Painter's depth for [`isometric`]: lower voxels are farther, so larger is farther.
pub fn isometric_depth(p: Vec3) -> f64 {
    -p.z
}

#[cfg(test)]
#[path = "../../tests/unit/scene/camera.rs"]
mod tests;
