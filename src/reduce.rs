//! Input reduction: merging near-identical texels before the endpoint search.
//!
//! The cluster-fit search cost grows with the number of distinct samples, and
//! blocks very often repeat colors, so texels within 1/256 of an existing
//! sample are folded into it by accumulating weight.

use glam::Vec3A;

/// Threshold under which two colors count as the same sample.
const MERGE_THRESHOLD: f32 = 1.0 / 256.0;

/// Texels with all channels below this are treated as black for the purposes
/// of 3-color mode. The threshold is deliberately large: such texels can be
/// served by the transparent-black palette entry, so excluding them from the
/// principal-axis fit improves the remaining colors.
const BLACK_THRESHOLD: f32 = 1.0 / 8.0;

pub(crate) fn is_black(c: Vec3A) -> bool {
    c.x < BLACK_THRESHOLD && c.y < BLACK_THRESHOLD && c.z < BLACK_THRESHOLD
}

fn nearly_equal(a: Vec3A, b: Vec3A) -> bool {
    let d = a - b;
    d.x.abs() < MERGE_THRESHOLD && d.y.abs() < MERGE_THRESHOLD && d.z.abs() < MERGE_THRESHOLD
}

#[derive(Debug, Clone)]
pub(crate) struct ReducedColors {
    pub colors: [Vec3A; 16],
    pub weights: [f32; 16],
    pub count: usize,
    pub any_black: bool,
}

impl ReducedColors {
    pub fn colors(&self) -> &[Vec3A] {
        &self.colors[..self.count]
    }
    pub fn weights(&self) -> &[f32] {
        &self.weights[..self.count]
    }
}

/// Deduplicates the input texels, accumulating the weights of merged ones.
/// Zero-weight texels are dropped entirely.
pub(crate) fn reduce_colors(input_colors: &[Vec3A; 16], input_weights: &[f32; 16]) -> ReducedColors {
    let mut reduced = ReducedColors {
        colors: [Vec3A::ZERO; 16],
        weights: [0.0; 16],
        count: 0,
        any_black: false,
    };

    for (&color, &weight) in input_colors.iter().zip(input_weights) {
        if weight <= 0.0 {
            continue;
        }

        match reduced.colors[..reduced.count]
            .iter()
            .position(|&c| nearly_equal(c, color))
        {
            Some(j) => reduced.weights[j] += weight,
            None => {
                reduced.colors[reduced.count] = color;
                reduced.weights[reduced.count] = weight;
                reduced.count += 1;
            }
        }

        if is_black(color) {
            reduced.any_black = true;
        }
    }

    debug_assert!(reduced.count <= 16);
    reduced
}

/// The subset of samples that are not near-black, for fitting the 3-color
/// mode where black texels map to the transparent palette entry instead.
pub(crate) fn skip_blacks(colors: &[Vec3A], weights: &[f32]) -> ([Vec3A; 16], [f32; 16], usize) {
    let mut out_colors = [Vec3A::ZERO; 16];
    let mut out_weights = [0.0; 16];
    let mut n = 0;

    for (&color, &weight) in colors.iter().zip(weights) {
        if is_black(color) {
            continue;
        }
        out_colors[n] = color;
        out_weights[n] = weight;
        n += 1;
    }

    (out_colors, out_weights, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_near_identical_colors() {
        let mut colors = [Vec3A::splat(0.5); 16];
        colors[7] = Vec3A::splat(0.5 + 0.9 / 256.0);
        colors[8] = Vec3A::new(1.0, 0.0, 0.0);
        let weights = [1.0; 16];

        let reduced = reduce_colors(&colors, &weights);
        assert_eq!(reduced.count, 2);
        assert_eq!(reduced.weights()[0], 15.0);
        assert_eq!(reduced.weights()[1], 1.0);
        assert!(!reduced.any_black);
    }

    #[test]
    fn drops_zero_weight_texels() {
        let colors = [Vec3A::ONE; 16];
        let mut weights = [0.0; 16];
        weights[3] = 2.0;

        let reduced = reduce_colors(&colors, &weights);
        assert_eq!(reduced.count, 1);
        assert_eq!(reduced.weights()[0], 2.0);
    }

    #[test]
    fn detects_near_black_texels() {
        let mut colors = [Vec3A::ONE; 16];
        colors[0] = Vec3A::splat(0.1);
        let reduced = reduce_colors(&colors, &[1.0; 16]);
        assert!(reduced.any_black);

        // a texel with one bright channel is not black
        let mut colors = [Vec3A::ONE; 16];
        colors[0] = Vec3A::new(0.1, 0.5, 0.1);
        let reduced = reduce_colors(&colors, &[1.0; 16]);
        assert!(!reduced.any_black);
    }

    #[test]
    fn skip_blacks_preserves_order() {
        let colors = [
            Vec3A::splat(0.05),
            Vec3A::splat(0.9),
            Vec3A::splat(0.01),
            Vec3A::splat(0.4),
        ];
        let weights = [1.0, 2.0, 3.0, 4.0];
        let (out_colors, out_weights, n) = skip_blacks(&colors, &weights);
        assert_eq!(n, 2);
        assert_eq!(out_colors[0], Vec3A::splat(0.9));
        assert_eq!(out_weights[0], 2.0);
        assert_eq!(out_colors[1], Vec3A::splat(0.4));
        assert_eq!(out_weights[1], 4.0);
    }
}
