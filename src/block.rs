//! The on-disk pieces of a BC1 block: packed 5:6:5 endpoints, the 2-bit
//! index word, and the 8-byte block layout.

use glam::Vec3A;

use crate::norm::{n5, n6, n8};
use crate::tables;

/// A BC1 endpoint color with 5 bits red, 6 bits green, and 5 bits blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct R5G6B5Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
impl R5G6B5Color {
    /// Quantizes a color in `[0, 1]` to the 5:6:5 grid.
    ///
    /// Truncates to the grid and then rounds up iff the value lies above the
    /// midpoint of the adjacent *bit-expanded* grid values. This matches what
    /// the decoder materializes, which plain round-to-nearest of the scaled
    /// coordinate does not.
    pub fn from_color(color: Vec3A) -> Self {
        let t = tables::get();

        let r = (color.x * 31.0).clamp(0.0, 31.0) as u8;
        let g = (color.y * 63.0).clamp(0.0, 63.0) as u8;
        let b = (color.z * 31.0).clamp(0.0, 31.0) as u8;

        Self {
            r: r + (color.x > t.midpoints5[r as usize]) as u8,
            g: g + (color.y > t.midpoints6[g as usize]) as u8,
            b: b + (color.z > t.midpoints5[b as usize]) as u8,
        }
    }

    /// The bit-expanded 8-bit color the hardware decoder materializes.
    pub fn expand(self) -> [u8; 4] {
        self.debug_check();
        [n5::n8(self.r), n6::n8(self.g), n5::n8(self.b), 0xFF]
    }

    pub fn from_u16(q: u16) -> Self {
        Self {
            r: ((q >> 11) & 0b11111) as u8,
            g: ((q >> 5) & 0b111111) as u8,
            b: (q & 0b11111) as u8,
        }
    }
    pub fn to_u16(self) -> u16 {
        self.debug_check();
        (self.r as u16) << 11 | (self.g as u16) << 5 | self.b as u16
    }

    /// Adds a per-channel delta, wrapping within each channel's bit width.
    pub fn wrapping_add(self, delta: [i8; 3]) -> Self {
        Self {
            r: (self.r as i16 + delta[0] as i16) as u8 & 0b11111,
            g: (self.g as i16 + delta[1] as i16) as u8 & 0b111111,
            b: (self.b as i16 + delta[2] as i16) as u8 & 0b11111,
        }
    }

    fn debug_check(&self) {
        debug_assert!(self.r < 32);
        debug_assert!(self.g < 64);
        debug_assert!(self.b < 32);
    }
}

/// Saturating conversion from `[0, 1]` float color to 8-bit RGBA.
pub(crate) fn color_to_rgba8(color: Vec3A) -> [u8; 4] {
    [
        n8::from_f32(color.x),
        n8::from_f32(color.y),
        n8::from_f32(color.z),
        0xFF,
    ]
}

pub(crate) fn rgba8_to_color(rgba: [u8; 4]) -> Vec3A {
    Vec3A::new(n8::f32(rgba[0]), n8::f32(rgba[1]), n8::f32(rgba[2]))
}

/// The 32-bit index word of a BC1 block. Texel `i` occupies bits `2i..2i+2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IndexList {
    pub data: u32,
}
impl IndexList {
    pub fn new_empty() -> Self {
        Self { data: 0 }
    }
    /// All 16 indexes set to the same value.
    pub fn new_all(value: u8) -> Self {
        debug_assert!(value < 4);
        Self {
            data: value as u32 * 0x5555_5555,
        }
    }

    pub fn get(&self, index: usize) -> u8 {
        debug_assert!(index < 16);
        ((self.data >> (index * 2)) & 0b11) as u8
    }
    pub fn set(&mut self, index: usize, value: u8) {
        debug_assert!(index < 16);
        debug_assert!(value < 4);
        debug_assert!(self.get(index) == 0, "Cannot set an index twice.");
        self.data |= (value as u32) << (index * 2);
    }

    /// Swaps the roles of the two endpoints: 0 <-> 1 and 2 <-> 3.
    ///
    /// Only meaningful in 4-color mode, where the palette is symmetric under
    /// endpoint exchange.
    pub fn invert(self) -> Self {
        Self {
            data: self.data ^ 0x5555_5555,
        }
    }
}

/// A BC1 block in its decoded representation: two packed endpoints and the
/// index word. The ordering of `col0` and `col1` selects the sub-mode:
/// `col0 > col1` is 4-color mode, otherwise 3-color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bc1Block {
    pub col0: R5G6B5Color,
    pub col1: R5G6B5Color,
    pub indices: IndexList,
}
impl Bc1Block {
    pub const ZERO: Self = Self {
        col0: R5G6B5Color { r: 0, g: 0, b: 0 },
        col1: R5G6B5Color { r: 0, g: 0, b: 0 },
        indices: IndexList { data: 0 },
    };

    pub fn to_bytes(self) -> [u8; 8] {
        let c0 = self.col0.to_u16().to_le_bytes();
        let c1 = self.col1.to_u16().to_le_bytes();
        let [i0, i1, i2, i3] = self.indices.data.to_le_bytes();

        [c0[0], c0[1], c1[0], c1[1], i0, i1, i2, i3]
    }

    pub fn from_bytes(data: &[u8; 8]) -> Self {
        let col0 = u16::from_le_bytes([data[0], data[1]]);
        let col1 = u16::from_le_bytes([data[2], data[3]]);
        let indices = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

        Self {
            col0: R5G6B5Color::from_u16(col0),
            col1: R5G6B5Color::from_u16(col1),
            indices: IndexList { data: indices },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantization_is_idempotent_on_grid_points() {
        for r in 0..32_u8 {
            let v = r as f32 / 31.0;
            let q = R5G6B5Color::from_color(Vec3A::splat(v));
            assert_eq!(q.r, r);
            assert_eq!(q.b, r);
        }
        for g in 0..64_u8 {
            let v = g as f32 / 63.0;
            let q = R5G6B5Color::from_color(Vec3A::new(0.0, v, 0.0));
            assert_eq!(q.g, g);
        }
    }

    #[test]
    fn quantization_rounds_by_expanded_midpoint() {
        let t = tables::get();
        for r in 0..31_usize {
            let just_below = t.midpoints5[r] - 1e-4;
            let just_above = t.midpoints5[r] + 1e-4;
            assert_eq!(
                R5G6B5Color::from_color(Vec3A::splat(just_below)).r,
                r as u8
            );
            assert_eq!(
                R5G6B5Color::from_color(Vec3A::splat(just_above)).r,
                r as u8 + 1
            );
        }
    }

    #[test]
    fn block_round_trips_through_bytes() {
        let block = Bc1Block {
            col0: R5G6B5Color { r: 31, g: 0, b: 7 },
            col1: R5G6B5Color { r: 0, g: 63, b: 1 },
            indices: IndexList { data: 0xDEAD_BEEF },
        };
        let bytes = block.to_bytes();
        assert_eq!(Bc1Block::from_bytes(&bytes), block);

        // endpoint 0 sits in the first two bytes, little endian
        assert_eq!(
            u16::from_le_bytes([bytes[0], bytes[1]]),
            block.col0.to_u16()
        );
    }

    #[test]
    fn wrapping_add_stays_within_channel_width() {
        let c = R5G6B5Color { r: 0, g: 63, b: 31 };
        let moved = c.wrapping_add([-1, 1, 1]);
        assert_eq!(moved, R5G6B5Color { r: 31, g: 0, b: 0 });
    }

    #[test]
    fn index_list_inversion() {
        let mut indices = IndexList::new_empty();
        indices.set(0, 2);
        indices.set(5, 1);
        let inverted = indices.invert();
        assert_eq!(inverted.get(0), 3);
        assert_eq!(inverted.get(5), 0);
        assert_eq!(inverted.get(1), 1);
    }
}
