//! Principal-axis estimation for the cluster ordering.
//!
//! The samples are projected onto the dominant eigenvector of their weighted
//! covariance, found by power iteration. The eigenvector's magnitude is
//! irrelevant to the projection ordering, so normalization uses the largest
//! component instead of the vector length and skips the square root.

use glam::Vec3A;

const POWER_ITERATIONS: u32 = 8;

/// The upper triangle of a symmetric 3x3 matrix:
/// `[xx, xy, xz, yy, yz, zz]`.
type Covariance = [f32; 6];

fn compute_centroid(colors: &[Vec3A], weights: &[f32]) -> Vec3A {
    let mut centroid = Vec3A::ZERO;
    let mut total = 0.0;

    for (&color, &weight) in colors.iter().zip(weights) {
        total += weight;
        centroid += color * weight;
    }

    centroid * (1.0 / total)
}

fn compute_covariance(colors: &[Vec3A], weights: &[f32]) -> Covariance {
    let centroid = compute_centroid(colors, weights);

    let mut covariance = [0.0; 6];
    for (&color, &weight) in colors.iter().zip(weights) {
        let a = color - centroid;
        let b = a * weight;

        covariance[0] += a.x * b.x;
        covariance[1] += a.x * b.y;
        covariance[2] += a.x * b.z;
        covariance[3] += a.y * b.y;
        covariance[4] += a.y * b.z;
        covariance[5] += a.z * b.z;
    }

    covariance
}

/// Seeds the iteration with the covariance row of greatest squared length.
fn estimate_principal_component(m: &Covariance) -> Vec3A {
    let row0 = Vec3A::new(m[0], m[1], m[2]);
    let row1 = Vec3A::new(m[1], m[3], m[4]);
    let row2 = Vec3A::new(m[2], m[4], m[5]);

    let r0 = row0.length_squared();
    let r1 = row1.length_squared();
    let r2 = row2.length_squared();

    if r0 > r1 && r0 > r2 {
        row0
    } else if r1 > r2 {
        row1
    } else {
        row2
    }
}

fn first_eigenvector(m: &Covariance) -> Vec3A {
    if m[0] == 0.0 && m[3] == 0.0 && m[5] == 0.0 {
        // all samples coincide; the caller treats a zero axis as "any axis"
        return Vec3A::ZERO;
    }

    let mut v = estimate_principal_component(m);
    for _ in 0..POWER_ITERATIONS {
        let x = v.x * m[0] + v.y * m[1] + v.z * m[2];
        let y = v.x * m[1] + v.y * m[3] + v.z * m[4];
        let z = v.x * m[2] + v.y * m[4] + v.z * m[5];

        let norm = x.max(y).max(z);

        v = Vec3A::new(x, y, z) * (1.0 / norm);
    }

    v
}

/// The principal axis of the weighted point cloud, or the zero vector when
/// the covariance is degenerate.
pub(crate) fn compute_principal_component(colors: &[Vec3A], weights: &[f32]) -> Vec3A {
    let covariance = compute_covariance(colors, weights);
    first_eigenvector(&covariance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_color_is_degenerate() {
        let colors = [Vec3A::splat(0.25); 4];
        let weights = [1.0; 4];
        assert_eq!(compute_principal_component(&colors, &weights), Vec3A::ZERO);
    }

    #[test]
    fn axis_aligned_spread_yields_that_axis() {
        let colors = [
            Vec3A::new(0.0, 0.5, 0.5),
            Vec3A::new(0.25, 0.5, 0.5),
            Vec3A::new(0.75, 0.5, 0.5),
            Vec3A::new(1.0, 0.5, 0.5),
        ];
        let weights = [1.0; 4];
        let axis = compute_principal_component(&colors, &weights);

        assert!(axis.x.abs() > 100.0 * axis.y.abs());
        assert!(axis.x.abs() > 100.0 * axis.z.abs());
    }

    #[test]
    fn weights_shift_the_centroid() {
        let colors = [Vec3A::ZERO, Vec3A::ONE];
        assert_eq!(
            compute_centroid(&colors, &[1.0, 3.0]),
            Vec3A::splat(0.75)
        );
    }

    #[test]
    fn gray_diagonal_spread_yields_the_diagonal() {
        let colors: [Vec3A; 4] = std::array::from_fn(|i| Vec3A::splat(i as f32 / 3.0));
        let axis = compute_principal_component(&colors, &[1.0; 4]);

        // all three components equal up to float noise
        assert!((axis.x - axis.y).abs() < 1e-4);
        assert!((axis.y - axis.z).abs() < 1e-4);
    }
}
