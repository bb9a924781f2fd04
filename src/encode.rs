//! Block compression: everything between raw input texels and the final
//! 8-byte block.
//!
//! The high-quality path runs, in order: input reduction, a bounding-box
//! endpoint guess, a least-squares refit of that guess, the cluster-fit
//! search (4-color, and optionally 3-color), and a local perturbation search
//! over the quantized endpoints. Every stage only replaces the current best
//! block when it strictly lowers the weighted reconstruction error.

use glam::Vec3A;

use crate::block::{color_to_rgba8, Bc1Block, IndexList, R5G6B5Color};
use crate::fit::{cluster_fit_three, cluster_fit_four};
use crate::metric::{block_error, color_error_sq};
use crate::palette::{evaluate_palette_f32, Decoder};
use crate::reduce::{reduce_colors, skip_blacks, ReducedColors};
use crate::sat::compute_sat;
use crate::tables;

#[derive(Debug, Clone, Copy)]
pub struct Bc1Options {
    /// Permit the 3-color + transparent-black sub-mode. The encoder only
    /// takes it when it wins, and only uses the transparent entry for
    /// near-black texels.
    pub three_color_mode: bool,
    /// Run the endpoint refinement search after cluster fit.
    pub high_quality: bool,
}
impl Default for Bc1Options {
    fn default() -> Self {
        Self {
            three_color_mode: true,
            high_quality: false,
        }
    }
}

/// The axis-aligned bounding box of the samples: `(max corner, min corner)`.
fn fit_colors_bbox(colors: &[Vec3A]) -> (Vec3A, Vec3A) {
    let mut c0 = Vec3A::ZERO;
    let mut c1 = Vec3A::ONE;
    for &color in colors {
        c0 = c0.max(color);
        c1 = c1.min(color);
    }
    (c0, c1)
}

/// Pulls both corners towards the center. Endpoints on the palette are
/// interpolated towards each other, so the best endpoints usually sit inside
/// the bounding box.
fn inset_bbox(c0: Vec3A, c1: Vec3A) -> (Vec3A, Vec3A) {
    let bias = (8.0 / 255.0) / 16.0;
    let inset = (c0 - c1) / 16.0 - Vec3A::splat(bias);
    (
        (c0 - inset).clamp(Vec3A::ZERO, Vec3A::ONE),
        (c1 + inset).clamp(Vec3A::ZERO, Vec3A::ONE),
    )
}

/// Picks the box diagonal that follows the point cloud, by flipping the x
/// and y coordinates of the corners to match the sign of the covariance
/// against the z axis.
fn select_diagonal(colors: &[Vec3A], c0: Vec3A, c1: Vec3A) -> (Vec3A, Vec3A) {
    let center = (c0 + c1) * 0.5;

    let mut cov_xz = 0.0;
    let mut cov_yz = 0.0;
    for &color in colors {
        let t = color - center;
        cov_xz += t.x * t.z;
        cov_yz += t.y * t.z;
    }

    let (mut x0, mut x1) = (c0.x, c1.x);
    let (mut y0, mut y1) = (c0.y, c1.y);
    if cov_xz < 0.0 {
        std::mem::swap(&mut x0, &mut x1);
    }
    if cov_yz < 0.0 {
        std::mem::swap(&mut y0, &mut y1);
    }

    (Vec3A::new(x0, y0, c0.z), Vec3A::new(x1, y1, c1.z))
}

/// Nearest-palette-entry assignment for a 4-color palette.
///
/// The four distances collapse into an index through five pairwise
/// comparisons combined with bit operations.
fn compute_indices4(
    colors: &[Vec3A; 16],
    channel_weights: Vec3A,
    palette: &[Vec3A; 4],
) -> IndexList {
    let mut indices = IndexList::new_empty();
    for (i, &color) in colors.iter().enumerate() {
        let d0 = color_error_sq(palette[0], color, channel_weights);
        let d1 = color_error_sq(palette[1], color, channel_weights);
        let d2 = color_error_sq(palette[2], color, channel_weights);
        let d3 = color_error_sq(palette[3], color, channel_weights);

        let b0 = (d0 > d3) as u8;
        let b1 = (d1 > d2) as u8;
        let b2 = (d0 > d2) as u8;
        let b3 = (d1 > d3) as u8;
        let b4 = (d2 > d3) as u8;

        let x0 = b1 & b2;
        let x1 = b0 & b3;
        let x2 = b0 & b4;

        indices.set(i, x2 | ((x0 | x1) << 1));
    }

    indices
}

/// Nearest-palette-entry assignment as a plain four-way comparison. Unlike
/// [`compute_indices4`] this also hands texels to the transparent entry of a
/// 3-color palette, which decodes as black.
fn compute_indices(
    colors: &[Vec3A; 16],
    channel_weights: Vec3A,
    palette: &[Vec3A; 4],
) -> IndexList {
    let mut indices = IndexList::new_empty();
    for (i, &color) in colors.iter().enumerate() {
        let d0 = color_error_sq(palette[0], color, channel_weights);
        let d1 = color_error_sq(palette[1], color, channel_weights);
        let d2 = color_error_sq(palette[2], color, channel_weights);
        let d3 = color_error_sq(palette[3], color, channel_weights);

        let index = if d0 < d1 && d0 < d2 && d0 < d3 {
            0
        } else if d1 < d2 && d1 < d3 {
            1
        } else if d2 < d3 {
            2
        } else {
            3
        };

        indices.set(i, index);
    }

    indices
}

/// Least-squares endpoints for a fixed 4-color index assignment.
///
/// Returns `None` when all texels landed in interpolated entries in a way
/// that makes the normal equations singular.
fn optimize_end_points4(indices: IndexList, colors: &[Vec3A; 16]) -> Option<(Vec3A, Vec3A)> {
    let mut alpha2_sum = 0.0;
    let mut beta2_sum = 0.0;
    let mut alphabeta_sum = 0.0;
    let mut alphax_sum = Vec3A::ZERO;
    let mut betax_sum = Vec3A::ZERO;

    for (i, &color) in colors.iter().enumerate() {
        let bits = indices.get(i);

        let mut beta = (bits & 1) as f32;
        if bits & 2 != 0 {
            beta = (1.0 + beta) / 3.0;
        }
        let alpha = 1.0 - beta;

        alpha2_sum += alpha * alpha;
        beta2_sum += beta * beta;
        alphabeta_sum += alpha * beta;
        alphax_sum += color * alpha;
        betax_sum += color * beta;
    }

    let denom = alpha2_sum * beta2_sum - alphabeta_sum * alphabeta_sum;
    if denom.abs() < 1e-4 {
        return None;
    }

    let factor = 1.0 / denom;
    let a = (alphax_sum * beta2_sum - betax_sum * alphabeta_sum) * factor;
    let b = (betax_sum * alpha2_sum - alphax_sum * alphabeta_sum) * factor;

    Some((
        a.clamp(Vec3A::ZERO, Vec3A::ONE),
        b.clamp(Vec3A::ZERO, Vec3A::ONE),
    ))
}

/// Quantizes a pair of endpoints and emits a 4-color-mode block.
///
/// Equal quantized endpoints are left as-is; such a block decodes through the
/// 3-color palette whose transparent entry the index search only picks for
/// texels that are actually closest to black.
fn output_block4(
    colors: &[Vec3A; 16],
    channel_weights: Vec3A,
    v0: Vec3A,
    v1: Vec3A,
) -> Bc1Block {
    let mut color0 = R5G6B5Color::from_color(v0);
    let mut color1 = R5G6B5Color::from_color(v1);

    if color0.to_u16() < color1.to_u16() {
        std::mem::swap(&mut color0, &mut color1);
    }

    let palette = evaluate_palette_f32(color0, color1, Decoder::Reference);
    Bc1Block {
        col0: color0,
        col1: color1,
        indices: compute_indices4(colors, channel_weights, &palette),
    }
}

/// Quantizes a pair of endpoints and emits a 3-color-mode block.
fn output_block3(
    colors: &[Vec3A; 16],
    channel_weights: Vec3A,
    v0: Vec3A,
    v1: Vec3A,
) -> Bc1Block {
    let mut color0 = R5G6B5Color::from_color(v0);
    let mut color1 = R5G6B5Color::from_color(v1);

    if color0.to_u16() > color1.to_u16() {
        std::mem::swap(&mut color0, &mut color1);
    }

    let palette = evaluate_palette_f32(color0, color1, Decoder::Reference);
    Bc1Block {
        col0: color0,
        col1: color1,
        indices: compute_indices(colors, channel_weights, &palette),
    }
}

/// The best block for a single color, from the precomputed per-channel
/// tables. Every texel uses palette entry 2, the 2:1 interpolation.
fn single_color_optimal(color: [u8; 4]) -> Bc1Block {
    let t = tables::get();

    let [r0, r1] = t.match5[color[0] as usize];
    let [g0, g1] = t.match6[color[1] as usize];
    let [b0, b1] = t.match5[color[2] as usize];

    let mut block = Bc1Block {
        col0: R5G6B5Color { r: r0, g: g0, b: b0 },
        col1: R5G6B5Color { r: r1, g: g1, b: b1 },
        indices: IndexList::new_all(2),
    };

    // the tables do not order the pair; force 4-color mode
    if block.col0.to_u16() < block.col1.to_u16() {
        std::mem::swap(&mut block.col0, &mut block.col1);
        block.indices = block.indices.invert();
    }

    block
}

/// Runs the cluster-fit search and returns the best block it found.
fn compress_cluster_fit(
    input_colors: &[Vec3A; 16],
    input_weights: &[f32; 16],
    reduced: &ReducedColors,
    channel_weights: Vec3A,
    three_color_mode: bool,
) -> (Bc1Block, f32) {
    let metric_sqr = channel_weights * channel_weights;

    let sat = compute_sat(reduced.colors(), reduced.weights(), reduced.count);

    let (start, end) = cluster_fit_four(&sat, reduced.count, metric_sqr);
    let mut output = output_block4(input_colors, channel_weights, start, end);
    let mut best_error = block_error(input_colors, input_weights, channel_weights, &output);

    if three_color_mode {
        let mut sat = sat;
        let mut sat_count = reduced.count;

        // Near-black texels are served by the transparent entry, so fit the
        // remaining colors without them. Without blacks the 4-color SAT is
        // reused as-is.
        if reduced.any_black {
            let (colors, weights, count) = skip_blacks(reduced.colors(), reduced.weights());
            if count == 0 {
                return (output, best_error);
            }
            sat = compute_sat(&colors, &weights, count);
            sat_count = count;
        }

        let (start, end) = cluster_fit_three(&sat, sat_count, metric_sqr);
        let three_color_block = output_block3(input_colors, channel_weights, start, end);
        let three_color_error =
            block_error(input_colors, input_weights, channel_weights, &three_color_block);

        if three_color_error < best_error {
            best_error = three_color_error;
            output = three_color_block;
        }
    }

    (output, best_error)
}

/// Single-step moves in 5:6:5 endpoint space tried by the refiner.
const REFINE_DELTAS: [[i8; 3]; 16] = [
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [-1, 0, 0],
    [0, -1, 0],
    [0, 0, -1],
    [1, 1, 0],
    [1, 0, 1],
    [0, 1, 1],
    [-1, -1, 0],
    [-1, 0, -1],
    [0, -1, -1],
    [-1, 1, 0],
    [1, -1, 0],
    [0, -1, 1],
    [0, 1, -1],
];

/// Local search around the best block: perturb one endpoint by one grid step
/// along one of 16 directions, keep any candidate that lowers the error.
fn refine_endpoints(
    input_colors: &[Vec3A; 16],
    input_weights: &[f32; 16],
    channel_weights: Vec3A,
    three_color_mode: bool,
    input_error: f32,
    output: &mut Bc1Block,
) -> f32 {
    let mut best_error = input_error;

    let mut last_improvement = 0;
    for i in 0..256_u32 {
        let mut refined = *output;
        let delta = REFINE_DELTAS[(i % 16) as usize];

        if (i / 16) & 1 != 0 {
            refined.col0 = refined.col0.wrapping_add(delta);
        } else {
            refined.col1 = refined.col1.wrapping_add(delta);
        }

        if !three_color_mode {
            if refined.col0.to_u16() == refined.col1.to_u16() {
                refined.col1 = refined.col1.wrapping_add([0, 1, 0]);
            }
            if refined.col0.to_u16() < refined.col1.to_u16() {
                std::mem::swap(&mut refined.col0, &mut refined.col1);
            }
        }

        // Indices are assigned under the palette of the current best block
        // rather than the perturbed one. The error below still scores the
        // candidate against its own palette, so accepted candidates are
        // always genuine improvements.
        let palette = evaluate_palette_f32(output.col0, output.col1, Decoder::Reference);
        refined.indices = compute_indices(input_colors, channel_weights, &palette);

        let refined_error = block_error(input_colors, input_weights, channel_weights, &refined);
        if refined_error < best_error {
            best_error = refined_error;
            *output = refined;
            last_improvement = i;
        }

        // stop once a whole window of moves has gone nowhere
        if i - last_improvement > 32 {
            break;
        }
    }

    best_error
}

pub(crate) fn compress(
    input_colors: &[Vec3A; 16],
    input_weights: &[f32; 16],
    channel_weights: Vec3A,
    options: Bc1Options,
) -> (Bc1Block, f32) {
    let reduced = reduce_colors(input_colors, input_weights);

    if reduced.count == 0 {
        return (Bc1Block::ZERO, 0.0);
    }

    // The cluster fit degenerates on a single sample; the table-driven
    // encoding is optimal there.
    if reduced.count == 1 {
        let block = single_color_optimal(color_to_rgba8(reduced.colors[0]));
        let error = block_error(input_colors, input_weights, channel_weights, &block);
        return (block, error);
    }

    // quick endpoint guess from the bounding box
    let (c0, c1) = fit_colors_bbox(reduced.colors());
    let (c0, c1) = inset_bbox(c0, c1);
    let (c0, c1) = select_diagonal(reduced.colors(), c0, c1);
    let mut output = output_block4(input_colors, channel_weights, c0, c1);
    let mut error = block_error(input_colors, input_weights, channel_weights, &output);

    // refit the endpoints to the indices the guess produced
    if let Some((c0, c1)) = optimize_end_points4(output.indices, input_colors) {
        let optimized = output_block4(input_colors, channel_weights, c0, c1);
        let optimized_error = block_error(input_colors, input_weights, channel_weights, &optimized);
        if optimized_error < error {
            error = optimized_error;
            output = optimized;
        }
    }

    let (cluster_block, cluster_error) = compress_cluster_fit(
        input_colors,
        input_weights,
        &reduced,
        channel_weights,
        options.three_color_mode,
    );
    if cluster_error < error {
        error = cluster_error;
        output = cluster_block;
    }

    if options.high_quality {
        error = refine_endpoints(
            input_colors,
            input_weights,
            channel_weights,
            options.three_color_mode,
            error,
            &mut output,
        );
    }

    (output, error)
}

/// The fast path: bounding-box guess plus one least-squares refit, no
/// cluster fit.
pub(crate) fn compress_fast(
    input_colors: &[Vec3A; 16],
    input_weights: &[f32; 16],
    channel_weights: Vec3A,
) -> (Bc1Block, f32) {
    let reduced = reduce_colors(input_colors, input_weights);

    if reduced.count == 0 {
        return (Bc1Block::ZERO, 0.0);
    }
    if reduced.count == 1 {
        let block = single_color_optimal(color_to_rgba8(reduced.colors[0]));
        let error = block_error(input_colors, input_weights, channel_weights, &block);
        return (block, error);
    }

    let (c0, c1) = fit_colors_bbox(reduced.colors());
    let (c0, c1) = inset_bbox(c0, c1);
    let (c0, c1) = select_diagonal(reduced.colors(), c0, c1);
    let mut output = output_block4(input_colors, channel_weights, c0, c1);
    let mut error = block_error(input_colors, input_weights, channel_weights, &output);

    if let Some((c0, c1)) = optimize_end_points4(output.indices, input_colors) {
        let optimized = output_block4(input_colors, channel_weights, c0, c1);
        let optimized_error = block_error(input_colors, input_weights, channel_weights, &optimized);
        if optimized_error < error {
            error = optimized_error;
            output = optimized;
        }
    }

    (output, error)
}

/// The 8-bit fast path: like [`compress_fast`] with uniform texel and
/// channel weights, skipping the error computation entirely.
pub(crate) fn compress_fast_u8(input_colors: &[Vec3A; 16]) -> Bc1Block {
    let (c0, c1) = fit_colors_bbox(input_colors);
    if c0 == c1 {
        return single_color_optimal(color_to_rgba8(c0));
    }

    let (c0, c1) = inset_bbox(c0, c1);
    let (c0, c1) = select_diagonal(input_colors, c0, c1);
    let mut output = output_block4(input_colors, Vec3A::ONE, c0, c1);

    if let Some((c0, c1)) = optimize_end_points4(output.indices, input_colors) {
        output = output_block4(input_colors, Vec3A::ONE, c0, c1);
    }

    output
}
