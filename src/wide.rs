//! A fixed-width lane abstraction for the cluster-fit inner loop.
//!
//! The search evaluates `N` partition candidates per iteration. Lanes are
//! plain float arrays with the handful of operations the loop needs
//! (broadcast, multiply-add, saturate, grid rounding, compare, select,
//! per-lane table gather), which the autovectorizer maps onto whatever the
//! target offers. Results are bit-identical for every lane count: the running
//! minimum uses a strict comparison and keeps the earliest winning lane.

use glam::Vec3A;

use crate::tables::Tables;

#[derive(Debug, Clone, Copy)]
pub(crate) struct WideF32<const N: usize>(pub [f32; N]);

#[derive(Debug, Clone, Copy)]
pub(crate) struct WideMask<const N: usize>([bool; N]);

impl<const N: usize> WideMask<N> {
    pub fn lane(&self, i: usize) -> bool {
        self.0[i]
    }
}

impl<const N: usize> WideF32<N> {
    pub const ZERO: Self = Self([0.0; N]);

    pub fn splat(value: f32) -> Self {
        Self([value; N])
    }

    pub fn mul_add(self, mul: Self, add: Self) -> Self {
        Self(std::array::from_fn(|i| {
            self.0[i].mul_add(mul.0[i], add.0[i])
        }))
    }

    pub fn saturate(self) -> Self {
        Self(self.0.map(|x| x.clamp(0.0, 1.0)))
    }

    pub fn recip(self) -> Self {
        Self(self.0.map(|x| 1.0 / x))
    }

    /// Per-lane `self < other`.
    pub fn lt(self, other: Self) -> WideMask<N> {
        WideMask(std::array::from_fn(|i| self.0[i] < other.0[i]))
    }

    pub fn is_finite(self) -> WideMask<N> {
        WideMask(std::array::from_fn(|i| self.0[i].is_finite()))
    }

    /// Per-lane `if mask { taken } else { self }`.
    pub fn select(self, mask: WideMask<N>, taken: Self) -> Self {
        Self(std::array::from_fn(|i| {
            if mask.0[i] {
                taken.0[i]
            } else {
                self.0[i]
            }
        }))
    }
}

impl<const N: usize> std::ops::Add for WideF32<N> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}
impl<const N: usize> std::ops::Sub for WideF32<N> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}
impl<const N: usize> std::ops::Mul for WideF32<N> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] * rhs.0[i]))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct WideVec3<const N: usize> {
    pub x: WideF32<N>,
    pub y: WideF32<N>,
    pub z: WideF32<N>,
}

impl<const N: usize> WideVec3<N> {
    pub const ZERO: Self = Self {
        x: WideF32::ZERO,
        y: WideF32::ZERO,
        z: WideF32::ZERO,
    };

    pub fn splat(v: Vec3A) -> Self {
        Self {
            x: WideF32::splat(v.x),
            y: WideF32::splat(v.y),
            z: WideF32::splat(v.z),
        }
    }

    pub fn lane(&self, i: usize) -> Vec3A {
        Vec3A::new(self.x.0[i], self.y.0[i], self.z.0[i])
    }

    pub fn mul_add(self, mul: WideF32<N>, add: Self) -> Self {
        Self {
            x: self.x.mul_add(mul, add.x),
            y: self.y.mul_add(mul, add.y),
            z: self.z.mul_add(mul, add.z),
        }
    }

    pub fn saturate(self) -> Self {
        Self {
            x: self.x.saturate(),
            y: self.y.saturate(),
            z: self.z.saturate(),
        }
    }

    /// Snaps each channel to its 5:6:5 grid value in `[0, 1]`, rounding by
    /// the bit-expanded midpoints. Inputs must already be saturated.
    pub fn round_565(self, tables: &Tables) -> Self {
        fn round<const N: usize>(v: WideF32<N>, scale: f32, midpoints: &[f32]) -> WideF32<N> {
            WideF32(std::array::from_fn(|i| {
                let x = v.0[i];
                let mut q = (x * scale) as usize;
                q += (x > midpoints[q]) as usize;
                q as f32 / scale
            }))
        }

        Self {
            x: round(self.x, 31.0, &tables.midpoints5),
            y: round(self.y, 63.0, &tables.midpoints6),
            z: round(self.z, 31.0, &tables.midpoints5),
        }
    }

    pub fn dot(self, rhs: Self) -> WideF32<N> {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn select(self, mask: WideMask<N>, taken: Self) -> Self {
        Self {
            x: self.x.select(mask, taken.x),
            y: self.y.select(mask, taken.y),
            z: self.z.select(mask, taken.z),
        }
    }
}

impl<const N: usize> std::ops::Add for WideVec3<N> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}
impl<const N: usize> std::ops::Sub for WideVec3<N> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}
impl<const N: usize> std::ops::Mul for WideVec3<N> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            x: self.x * rhs.x,
            y: self.y * rhs.y,
            z: self.z * rhs.z,
        }
    }
}
impl<const N: usize> std::ops::Mul<WideF32<N>> for WideVec3<N> {
    type Output = Self;
    fn mul(self, rhs: WideF32<N>) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}
