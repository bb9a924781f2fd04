//! A high-quality BC1 (DXT1) block encoder.
//!
//! BC1 stores a 4x4 block of colors in 8 bytes: two 5:6:5 endpoints and a
//! 2-bit palette index per texel. This crate compresses one block at a time,
//! searching for the endpoint pair that minimizes a weighted squared error
//! against the input:
//!
//! 1. Near-identical texels are merged, accumulating their weights.
//! 2. The samples are ordered along the principal axis of their covariance.
//! 3. Every partition of that ordering into 3 or 4 contiguous clusters is
//!    solved in closed form for its least-squares endpoints ("cluster fit"),
//!    with summed-area tables making each candidate O(1).
//! 4. Optionally, a local perturbation search refines the winning endpoints.
//!
//! The companion [`evaluate_bc1_error`] measures how a finished block decodes
//! against a reference image under one of three hardware [`Decoder`] models;
//! [`decode_bc1_block`] exposes the decoded texels themselves.
//!
//! Blocks are encoded deterministically: the same input always produces the
//! same 8 bytes. Encoding never fails and needs no allocation; degenerate
//! inputs (all weights zero, a single color, zero covariance) take dedicated
//! paths. All lookup tables are built once and shared, so any number of
//! threads may encode concurrently.
//!
//! ```
//! bc1::init();
//!
//! let red = [[1.0, 0.0, 0.0, 1.0]; 16];
//! let weights = [1.0; 16];
//! let (block, error) = bc1::compress_bc1_block(
//!     &red,
//!     &weights,
//!     [1.0, 1.0, 1.0],
//!     bc1::Bc1Options::default(),
//! );
//!
//! assert_eq!(error, 0.0);
//! assert_eq!([block[0], block[1]], 0xF800_u16.to_le_bytes());
//! ```

#![forbid(unsafe_code)]

mod block;
mod encode;
mod fit;
mod metric;
mod norm;
mod palette;
mod pca;
mod reduce;
mod sat;
mod tables;
mod wide;

use glam::Vec3A;

use block::Bc1Block;

pub use encode::Bc1Options;
pub use palette::Decoder;

/// Builds the static lookup tables.
///
/// Call once before encoding. The tables are also built on first use, so
/// skipping this only moves the one-time cost into the first block.
pub fn init() {
    tables::get();
}

fn to_vec3(colors: &[[f32; 4]; 16]) -> [Vec3A; 16] {
    // clamp to [0, 1]; alpha is dropped
    colors.map(|[r, g, b, _]| Vec3A::new(r, g, b).clamp(Vec3A::ZERO, Vec3A::ONE))
}

/// Compresses a 4x4 block of RGBA colors into a BC1 block.
///
/// `colors` are RGBA in `[0, 1]`; alpha is ignored. `weights` scale each
/// texel's contribution to the error, and a weight of zero removes the texel
/// from consideration entirely. `channel_weights` scale the importance of
/// the R, G, and B channels in the error metric.
///
/// Returns the block and its weighted squared reconstruction error in 8-bit
/// scale, as measured by the reference decoder.
pub fn compress_bc1_block(
    colors: &[[f32; 4]; 16],
    weights: &[f32; 16],
    channel_weights: [f32; 3],
    options: Bc1Options,
) -> ([u8; 8], f32) {
    let (block, error) = encode::compress(
        &to_vec3(colors),
        weights,
        Vec3A::from_array(channel_weights),
        options,
    );
    (block.to_bytes(), error)
}

/// Compresses a block with the bounding-box heuristic only.
///
/// Roughly an order of magnitude faster than [`compress_bc1_block`], at a
/// noticeable quality cost. Always produces a 4-color-mode block.
pub fn compress_bc1_block_fast(
    colors: &[[f32; 4]; 16],
    weights: &[f32; 16],
    channel_weights: [f32; 3],
) -> ([u8; 8], f32) {
    let (block, error) = encode::compress_fast(
        &to_vec3(colors),
        weights,
        Vec3A::from_array(channel_weights),
    );
    (block.to_bytes(), error)
}

/// Compresses a block of 8-bit RGBA texels with the bounding-box heuristic.
///
/// Like [`compress_bc1_block_fast`] with uniform texel and channel weights;
/// skips the error computation.
pub fn compress_bc1_block_fast_u8(colors: &[[u8; 4]; 16]) -> [u8; 8] {
    let vec_colors = colors.map(block::rgba8_to_color);
    encode::compress_fast_u8(&vec_colors).to_bytes()
}

/// Computes the sum of squared per-channel differences between `rgba` and
/// the block as the given decoder would reconstruct it.
///
/// Differences are measured in 8-bit space and alpha is excluded.
pub fn evaluate_bc1_error(rgba: &[[u8; 4]; 16], block: &[u8; 8], decoder: Decoder) -> f32 {
    metric::decode_error(rgba, &Bc1Block::from_bytes(block), decoder)
}

/// Decodes a BC1 block into its 16 RGBA texels under the given decoder model.
///
/// Texels are returned in row-major order. In 3-color mode, index 3 decodes
/// to transparent black.
pub fn decode_bc1_block(block: &[u8; 8], decoder: Decoder) -> [[u8; 4]; 16] {
    palette::decode_block(&Bc1Block::from_bytes(block), decoder)
}
