#![allow(unused)]

use rand::{Rng, SeedableRng};

pub fn create_rng() -> impl rand::Rng {
    rand_chacha::ChaChaRng::seed_from_u64(123456789)
}

/// A 4x4 block of 8-bit RGBA texels as the float input the encoder takes.
pub fn block_from_rgba8(rgba: &[[u8; 4]; 16]) -> [[f32; 4]; 16] {
    rgba.map(|p| p.map(|v| v as f32 / 255.0))
}

/// 16 random opaque texels.
pub fn random_rgba8(rng: &mut impl Rng) -> [[u8; 4]; 16] {
    std::array::from_fn(|_| [rng.gen(), rng.gen(), rng.gen(), 255])
}

/// A random block whose colors come from a small palette, which makes both
/// sub-modes and the reducer's merge path likely.
pub fn random_low_entropy_rgba8(rng: &mut impl Rng) -> [[u8; 4]; 16] {
    let palette: [[u8; 4]; 4] = std::array::from_fn(|_| [rng.gen(), rng.gen(), rng.gen(), 255]);
    std::array::from_fn(|_| palette[rng.gen_range(0..4)])
}

pub const UNIFORM_WEIGHTS: [f32; 16] = [1.0; 16];
pub const UNIFORM_CHANNELS: [f32; 3] = [1.0, 1.0, 1.0];

/// Endpoint 0 of an encoded block.
pub fn endpoint0(block: &[u8; 8]) -> u16 {
    u16::from_le_bytes([block[0], block[1]])
}
/// Endpoint 1 of an encoded block.
pub fn endpoint1(block: &[u8; 8]) -> u16 {
    u16::from_le_bytes([block[2], block[3]])
}
/// The 2-bit palette index of texel `i`.
pub fn index_of(block: &[u8; 8], i: usize) -> u8 {
    let word = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);
    ((word >> (2 * i)) & 0b11) as u8
}
