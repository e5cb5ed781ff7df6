use crate::foundation::error::{LoopError, LoopResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Logical viewport size, in CSS-like units (not device pixels).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> LoopResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(LoopError::validation(format!(
                "viewport must be positive and finite, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(self) -> f64 {
        self.width.min(self.height)
    }

    pub fn max_side(self) -> f64 {
        self.width.max(self.height)
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `rgba(r, g, b, alpha)` with a CSS-style float alpha.
    pub fn with_alpha(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: unit_to_u8(alpha),
        }
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Multiply alpha by `k` (clamped).
    pub fn fade(self, k: f64) -> Self {
        Self {
            a: (f64::from(self.a) * k).round().clamp(0.0, 255.0) as u8,
            ..self
        }
    }

    /// Multiply rgb by `k` (clamped), keeping alpha.
    pub fn shade(self, k: f64) -> Self {
        let f = |c: u8| (f64::from(c) * k).round().clamp(0.0, 255.0) as u8;
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            a: self.a,
        }
    }

    /// Add `delta` to each channel with saturation, keeping alpha.
    pub fn offset(self, delta: i16) -> Self {
        let f = |c: u8| (i16::from(c) + delta).clamp(0, 255) as u8;
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            a: self.a,
        }
    }

    /// Linear blend toward `other` by `t` in [0,1].
    pub fn mix(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let f = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Self {
            r: f(self.r, other.r),
            g: f(self.g, other.g),
            b: f(self.b, other.b),
            a: f(self.a, other.a),
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> LoopResult<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| LoopError::validation(format!("color '{s}' must start with '#'")))?;
        let byte = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| LoopError::validation(format!("invalid hex color '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(LoopError::validation(format!("invalid hex color '{s}'"))),
        }
    }
}

pub(crate) fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// A point or direction in 3D world space (right-handed, +Y up).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, o: Self) -> f64 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Self) -> Self {
        Self::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near-)zero vector.
    pub fn try_normalize(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > 1e-12 {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    pub fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Intrinsic XYZ Euler rotation in radians (matches the usual scene-graph convention).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Euler {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn scaled(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    /// Rotate `v` by this rotation (Rx · Ry · Rz applied to v).
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let (sz, cz) = self.z.sin_cos();
        let v = Vec3::new(v.x * cz - v.y * sz, v.x * sz + v.y * cz, v.z);
        let (sy, cy) = self.y.sin_cos();
        let v = Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);
        let (sx, cx) = self.x.sin_cos();
        Vec3::new(v.x, v.y * cx - v.z * sx, v.y * sx + v.z * cx)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
