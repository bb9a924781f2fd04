//! The summed-area table over the principal-axis ordering of the samples.
//!
//! Entry `i` holds the weighted sums of the first `i + 1` samples in
//! projection order, so any contiguous cluster's moments are two lookups.
//! Entries past the real sample count are `+INFINITY`: a partition candidate
//! that indexes them produces a non-winning error, which lets the search loop
//! run over padded descriptor groups without bounds checks.

use glam::Vec3A;

use crate::pca::compute_principal_component;

pub(crate) struct SummedAreaTable {
    pub r: [f32; 16],
    pub g: [f32; 16],
    pub b: [f32; 16],
    pub w: [f32; 16],
}

impl SummedAreaTable {
    /// The weighted sum over the first `k` samples, `k > 0`.
    pub fn prefix(&self, k: usize) -> (Vec3A, f32) {
        debug_assert!(k >= 1);
        (
            Vec3A::new(self.r[k - 1], self.g[k - 1], self.b[k - 1]),
            self.w[k - 1],
        )
    }
}

/// Projects the samples onto their principal axis, sorts, and prefix-sums.
pub(crate) fn compute_sat(colors: &[Vec3A], weights: &[f32], count: usize) -> SummedAreaTable {
    debug_assert!(count >= 1 && count <= 16);

    let principal = compute_principal_component(&colors[..count], &weights[..count]);

    let mut order = [0_usize; 16];
    let mut projections = [0.0_f32; 16];
    for i in 0..count {
        order[i] = i;
        projections[i] = colors[i].dot(principal);
    }

    // Insertion sort, stable so that a degenerate (all-equal) projection
    // leaves the input order untouched.
    for i in 0..count {
        let mut j = i;
        while j > 0 && projections[j] < projections[j - 1] {
            projections.swap(j, j - 1);
            order.swap(j, j - 1);
            j -= 1;
        }
    }

    let mut sat = SummedAreaTable {
        r: [f32::INFINITY; 16],
        g: [f32::INFINITY; 16],
        b: [f32::INFINITY; 16],
        w: [f32::INFINITY; 16],
    };

    let mut sum = Vec3A::ZERO;
    let mut w_sum = 0.0;
    for i in 0..count {
        let p = order[i];
        sum += colors[p] * weights[p];
        w_sum += weights[p];

        sat.r[i] = sum.x;
        sat.g[i] = sum.y;
        sat.b[i] = sum.z;
        sat.w[i] = w_sum;
    }

    sat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_prefix_is_non_decreasing() {
        let colors = [
            Vec3A::new(0.9, 0.1, 0.0),
            Vec3A::new(0.1, 0.8, 0.2),
            Vec3A::new(0.5, 0.5, 0.5),
            Vec3A::new(0.0, 0.0, 1.0),
        ];
        let weights = [1.0, 0.5, 2.0, 0.25];
        let sat = compute_sat(&colors, &weights, 4);

        for i in 1..4 {
            assert!(sat.w[i] >= sat.w[i - 1]);
        }
        assert_eq!(sat.w[3], 3.75);
    }

    #[test]
    fn padding_is_infinite() {
        let colors = [Vec3A::ZERO, Vec3A::ONE];
        let sat = compute_sat(&colors, &[1.0, 1.0], 2);

        for i in 2..16 {
            assert_eq!(sat.r[i], f32::INFINITY);
            assert_eq!(sat.g[i], f32::INFINITY);
            assert_eq!(sat.b[i], f32::INFINITY);
            assert_eq!(sat.w[i], f32::INFINITY);
        }
    }

    #[test]
    fn samples_are_ordered_along_the_principal_axis() {
        // a red-to-blue ramp listed out of order
        let colors = [
            Vec3A::new(0.5, 0.0, 0.5),
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(0.0, 0.0, 1.0),
            Vec3A::new(0.75, 0.0, 0.25),
        ];
        let sat = compute_sat(&colors, &[1.0; 4], 4);

        // after sorting, consecutive red prefix sums differ by one ramp step
        let mut reds = [sat.r[0], 0.0, 0.0, 0.0];
        for i in 1..4 {
            reds[i] = sat.r[i] - sat.r[i - 1];
        }
        let mut sorted = reds;
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        if reds[0] > reds[3] {
            sorted.reverse();
        }
        assert_eq!(reds, sorted, "projection order must be monotone in red");
    }

    #[test]
    fn degenerate_axis_keeps_input_order() {
        // identical colors give a zero principal axis and zero projections
        let colors = [Vec3A::splat(0.5); 3];
        let weights = [1.0, 2.0, 4.0];
        let sat = compute_sat(&colors, &weights, 3);

        assert_eq!(sat.w[0], 1.0);
        assert_eq!(sat.w[1], 3.0);
        assert_eq!(sat.w[2], 7.0);
    }
}
