//! Planar math shared by every stage.
//!
//! These are the canonical coordinates of a generated city: one unit is
//! roughly one meter, the origin is the city center.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Closed polygon or open polyline, depending on context.
pub type Polygon = Vec<Point>;

/// 2D point / vector
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Point {
    /// Creates a new point
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Point at `radius` from the origin in direction `angle` (radians).
    #[inline]
    #[must_use]
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Dot product
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product
    #[inline]
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Length squared (avoids sqrt)
    #[inline]
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Length
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Distance squared (avoids sqrt)
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        (self - other).length_squared()
    }

    /// Same direction, given length. Zero vectors stay zero.
    #[must_use]
    pub fn normalized(self, length: f64) -> Self {
        let len = self.length();
        if len == 0.0 {
            self
        } else {
            self * (length / len)
        }
    }

    /// Rotated 90 degrees counter-clockwise.
    #[inline]
    #[must_use]
    pub const fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Rotated by `angle` radians around the origin.
    #[must_use]
    pub fn rotate(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.rotate_yx(sin, cos)
    }

    /// Rotated by an angle given as its sine and cosine.
    #[inline]
    #[must_use]
    pub fn rotate_yx(self, sin: f64, cos: f64) -> Self {
        Self::new(self.x * cos - self.y * sin, self.y * cos + self.x * sin)
    }

    /// Angle of the vector in radians.
    #[inline]
    #[must_use]
    pub fn atan2(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Linear interpolation, `t = 0` gives `a`.
    #[inline]
    #[must_use]
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }

    /// Midpoint of two points.
    #[inline]
    #[must_use]
    pub fn midpoint(a: Self, b: Self) -> Self {
        Self::lerp(a, b, 0.5)
    }

    /// Bitwise identity of both coordinates, stable across runs.
    #[inline]
    #[must_use]
    pub fn bits(self) -> (u64, u64) {
        (self.x.to_bits(), self.y.to_bits())
    }

    /// Reinterprets a point slice as flat `[x0, y0, x1, y1, ..]` coordinates.
    #[must_use]
    pub fn flatten(points: &[Self]) -> &[f64] {
        bytemuck::cast_slice(points)
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_and_length() {
        let p = Point::polar(2.0, std::f64::consts::FRAC_PI_2);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
        assert!((p.length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_matches_rotate_yx() {
        let p = Point::new(3.0, -1.0);
        let a = 0.7_f64;
        let r1 = p.rotate(a);
        let r2 = p.rotate_yx(a.sin(), a.cos());
        assert!(r1.distance(r2) < 1e-12);
        assert!((r1.length() - p.length()).abs() < 1e-12);
    }

    #[test]
    fn test_flatten() {
        let pts = [Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        assert_eq!(Point::flatten(&pts), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_normalized_zero() {
        assert_eq!(Point::ZERO.normalized(5.0), Point::ZERO);
        let n = Point::new(3.0, 4.0).normalized(10.0);
        assert!((n.x - 6.0).abs() < 1e-12 && (n.y - 8.0).abs() < 1e-12);
    }
}
