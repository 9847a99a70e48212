use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// World-space point or vector. `z` is carried through untouched so pieces keep their depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn xy(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    #[inline(always)]
    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline(always)]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Linear interpolation with `t` clamped to [0, 1].
    pub fn lerp(self, target: Vec3, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        self + (target - self) * t
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Axis-aligned box on the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_w: f32, half_h: f32) -> Self {
        Self {
            min_x: center.x - half_w,
            min_y: center.y - half_h,
            max_x: center.x + half_w,
            max_y: center.y + half_h,
        }
    }

    /// Moves every edge inward by `amount` (negative amounts are ignored).
    pub fn shrink(&self, amount: f32) -> Self {
        let s = amount.max(0.0);
        Self {
            min_x: self.min_x + s,
            min_y: self.min_y + s,
            max_x: self.max_x - s,
            max_y: self.max_y - s,
        }
    }

    /// Closed-interval overlap: boxes that only touch still overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        if self.max_x < other.min_x || self.min_x > other.max_x {
            return false;
        }
        if self.max_y < other.min_y || self.min_y > other.max_y {
            return false;
        }
        true
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Placement of the board in the world: a translation plus a uniform scale, no rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardTransform {
    pub origin: Vec3,
    pub scale: f32,
}

impl Default for BoardTransform {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl BoardTransform {
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.origin + local * self.scale
    }

    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        local * self.scale
    }
}
