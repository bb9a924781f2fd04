//! Squared-error metrics.
//!
//! All float-space errors are scaled into 8-bit units before squaring so the
//! numbers the encoder reports line up with the integer sums of the
//! standalone block evaluator.

use glam::Vec3A;

use crate::block::Bc1Block;
use crate::palette::{evaluate_palette, evaluate_palette_f32, Decoder};

/// Squared distance between two colors under per-channel importance weights,
/// in 8-bit-scaled units.
pub(crate) fn color_error_sq(p: Vec3A, c: Vec3A, channel_weights: Vec3A) -> f32 {
    let d = (p - c) * channel_weights * 255.0;
    d.dot(d)
}

fn rgb_error_sq(p: [u8; 4], c: [u8; 4]) -> i32 {
    let dr = p[0] as i32 - c[0] as i32;
    let dg = p[1] as i32 - c[1] as i32;
    let db = p[2] as i32 - c[2] as i32;
    dr * dr + dg * dg + db * db
}

/// The weighted reconstruction error of a block against the input it was
/// encoded from, using the indices stored in the block.
pub(crate) fn block_error(
    input_colors: &[Vec3A; 16],
    input_weights: &[f32; 16],
    channel_weights: Vec3A,
    block: &Bc1Block,
) -> f32 {
    let palette = evaluate_palette_f32(block.col0, block.col1, Decoder::Reference);

    let mut error = 0.0;
    for i in 0..16 {
        let index = block.indices.get(i) as usize;
        error += input_weights[i] * color_error_sq(palette[index], input_colors[i], channel_weights);
    }
    error
}

/// Sum of squared per-channel differences between a decoded block and a
/// reference image, in 8-bit space. Alpha is excluded.
pub(crate) fn decode_error(rgba: &[[u8; 4]; 16], block: &Bc1Block, decoder: Decoder) -> f32 {
    let palette = evaluate_palette(block.col0, block.col1, decoder);

    let mut error = 0;
    for (i, pixel) in rgba.iter().enumerate() {
        let index = block.indices.get(i) as usize;
        error += rgb_error_sq(palette[index], *pixel);
    }
    error as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{IndexList, R5G6B5Color};

    #[test]
    fn color_error_is_scaled_to_8_bit_units() {
        let a = Vec3A::new(1.0, 0.0, 0.0);
        let b = Vec3A::ZERO;
        assert_eq!(color_error_sq(a, b, Vec3A::ONE), 255.0 * 255.0);

        // channel weights scale the per-channel difference before squaring
        assert_eq!(
            color_error_sq(a, b, Vec3A::new(0.5, 1.0, 1.0)),
            127.5 * 127.5
        );
    }

    #[test]
    fn decode_error_of_an_exact_block_is_zero() {
        let white = R5G6B5Color {
            r: 31,
            g: 63,
            b: 31,
        };
        let black = R5G6B5Color { r: 0, g: 0, b: 0 };
        // texels 0..8 use entry 0 (white), texels 8..16 use entry 1 (black)
        let block = Bc1Block {
            col0: white,
            col1: black,
            indices: IndexList { data: 0x5555_0000 },
        };

        let mut image = [[255, 255, 255, 255]; 16];
        for pixel in image.iter_mut().skip(8) {
            *pixel = [0, 0, 0, 255];
        }

        assert_eq!(decode_error(&image, &block, Decoder::Reference), 0.0);
    }

    #[test]
    fn decode_error_counts_every_texel() {
        let gray = R5G6B5Color { r: 15, g: 31, b: 15 };
        let block = Bc1Block {
            col0: gray,
            col1: gray,
            indices: IndexList { data: 0 },
        };
        let expanded = gray.expand();
        let off_by_one = [
            expanded[0] + 1,
            expanded[1],
            expanded[2],
            255,
        ];

        let image = [off_by_one; 16];
        assert_eq!(decode_error(&image, &block, Decoder::Reference), 16.0);
    }

    #[test]
    fn block_error_follows_stored_indices() {
        // index word sends every texel to palette entry 1 (black)
        let block = Bc1Block {
            col0: R5G6B5Color {
                r: 31,
                g: 63,
                b: 31,
            },
            col1: R5G6B5Color { r: 0, g: 0, b: 0 },
            indices: IndexList::new_all(1),
        };

        let colors = [Vec3A::ONE; 16];
        let weights = [1.0; 16];
        let expected = 16.0 * 3.0 * 255.0 * 255.0;
        let error = block_error(&colors, &weights, Vec3A::ONE, &block);
        assert!((error - expected).abs() < expected * 1e-6);
    }

    #[test]
    fn alpha_is_excluded_from_the_error() {
        let a = [10, 20, 30, 0];
        let b = [10, 20, 30, 255];
        assert_eq!(rgb_error_sq(a, b), 0);
    }
}
