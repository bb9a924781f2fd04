//! The cluster-fit endpoint search.
//!
//! For every partition of the principal-axis ordering into 3 or 4 contiguous
//! clusters, the weighted least-squares endpoints have a closed form in the
//! cluster moments, and so does their reconstruction error. The moments come
//! from two summed-area-table lookups per cluster, so each candidate costs a
//! constant amount of work, and candidates are independent, so the loop
//! walks the descriptor table `N` lanes at a time.

use glam::Vec3A;

use crate::sat::SummedAreaTable;
use crate::tables::{self, LANES};
use crate::wide::{WideF32, WideVec3};

/// Interpolation weights of the four palette slots in 4-color mode.
const THIRD: f32 = 1.0 / 3.0;
const TWO_THIRDS: f32 = 2.0 / 3.0;

/// Picks the winning lane: lowest error, and on exact ties the lane whose
/// candidate came earliest in the descriptor table. The index tie-break makes
/// the result independent of the lane count.
fn best_lane<const N: usize>(error: &WideF32<N>, index: &[usize; N]) -> usize {
    let mut best = 0;
    for l in 1..N {
        if error.0[l] < error.0[best] || (error.0[l] == error.0[best] && index[l] < index[best]) {
            best = l;
        }
    }
    best
}

pub(crate) fn cluster_fit_four(
    sat: &SummedAreaTable,
    count: usize,
    metric_sqr: Vec3A,
) -> (Vec3A, Vec3A) {
    cluster_fit_four_wide::<LANES>(sat, count, metric_sqr)
}

pub(crate) fn cluster_fit_three(
    sat: &SummedAreaTable,
    count: usize,
    metric_sqr: Vec3A,
) -> (Vec3A, Vec3A) {
    cluster_fit_three_wide::<LANES>(sat, count, metric_sqr)
}

fn cluster_fit_four_wide<const N: usize>(
    sat: &SummedAreaTable,
    count: usize,
    metric_sqr: Vec3A,
) -> (Vec3A, Vec3A) {
    let t = tables::get();
    let (color_sum, w_sum) = sat.prefix(count);

    let mut best_error = WideF32::<N>::splat(f32::INFINITY);
    let mut best_start = WideVec3::<N>::ZERO;
    let mut best_end = WideVec3::<N>::ZERO;
    let mut best_index = [0_usize; N];

    let total = t.four_cluster_total[count - 1] as usize;

    let mut i = 0;
    while i < total {
        let mut x0 = WideVec3::<N>::ZERO;
        let mut x1 = WideVec3::<N>::ZERO;
        let mut x2 = WideVec3::<N>::ZERO;
        let mut w0 = WideF32::<N>::ZERO;
        let mut w1 = WideF32::<N>::ZERO;
        let mut w2 = WideF32::<N>::ZERO;

        // Gather the cumulative sums for each lane's descriptor. Boundary 0
        // selects the empty prefix; descriptors past this count's group read
        // the infinite padding and can never win.
        for l in 0..N {
            let p = &t.four_cluster[i + l];
            if p.c0 > 0 {
                let k = p.c0 as usize - 1;
                x0.x.0[l] = sat.r[k];
                x0.y.0[l] = sat.g[k];
                x0.z.0[l] = sat.b[k];
                w0.0[l] = sat.w[k];
            }
            if p.c01 > 0 {
                let k = p.c01 as usize - 1;
                x1.x.0[l] = sat.r[k];
                x1.y.0[l] = sat.g[k];
                x1.z.0[l] = sat.b[k];
                w1.0[l] = sat.w[k];
            }
            if p.c012 > 0 {
                let k = p.c012 as usize - 1;
                x2.x.0[l] = sat.r[k];
                x2.y.0[l] = sat.g[k];
                x2.z.0[l] = sat.b[k];
                w2.0[l] = sat.w[k];
            }
        }

        // turn cumulative sums into per-cluster sums (the fourth cluster is
        // implicit in the totals)
        let w3 = WideF32::splat(w_sum) - w2;
        let x2 = x2 - x1;
        let x1 = x1 - x0;
        let w2 = w2 - w1;
        let w1 = w1 - w0;

        let alpha2_sum = w2.mul_add(
            WideF32::splat(1.0 / 9.0),
            w1.mul_add(WideF32::splat(4.0 / 9.0), w0),
        );
        let beta2_sum = w1.mul_add(
            WideF32::splat(1.0 / 9.0),
            w2.mul_add(WideF32::splat(4.0 / 9.0), w3),
        );
        let alphabeta_sum = (w1 + w2) * WideF32::splat(2.0 / 9.0);
        let factor = (alpha2_sum * beta2_sum - alphabeta_sum * alphabeta_sum).recip();

        let alphax_sum = x2.mul_add(
            WideF32::splat(THIRD),
            x1.mul_add(WideF32::splat(TWO_THIRDS), x0),
        );
        let betax_sum = WideVec3::splat(color_sum) - alphax_sum;

        let a = (alphax_sum * beta2_sum - betax_sum * alphabeta_sum) * factor;
        let b = (betax_sum * alpha2_sum - alphax_sum * alphabeta_sum) * factor;

        // clamp to the quantization grid
        let a = a.saturate().round_565(t);
        let b = b.saturate().round_565(t);

        // closed-form error, minus the constant sum(w * c^2) term which is
        // identical across candidates
        let e1 = (a * a).mul_add(
            alpha2_sum,
            (b * b).mul_add(
                beta2_sum,
                (a * b * alphabeta_sum - a * alphax_sum - b * betax_sum)
                    * WideF32::splat(2.0),
            ),
        );
        let error = e1.dot(WideVec3::splat(metric_sqr));

        // a vanishing least-squares denominator invalidates the candidate
        let error = WideF32::splat(f32::INFINITY).select(factor.is_finite(), error);

        let improved = error.lt(best_error);
        best_error = best_error.select(improved, error);
        best_start = best_start.select(improved, a);
        best_end = best_end.select(improved, b);
        for l in 0..N {
            if improved.lane(l) {
                best_index[l] = i + l;
            }
        }

        i += N;
    }

    let lane = best_lane(&best_error, &best_index);
    (best_start.lane(lane), best_end.lane(lane))
}

fn cluster_fit_three_wide<const N: usize>(
    sat: &SummedAreaTable,
    count: usize,
    metric_sqr: Vec3A,
) -> (Vec3A, Vec3A) {
    let t = tables::get();
    let (color_sum, w_sum) = sat.prefix(count);

    let mut best_error = WideF32::<N>::splat(f32::INFINITY);
    let mut best_start = WideVec3::<N>::ZERO;
    let mut best_end = WideVec3::<N>::ZERO;
    let mut best_index = [0_usize; N];

    let total = t.three_cluster_total[count - 1] as usize;

    let mut i = 0;
    while i < total {
        let mut x0 = WideVec3::<N>::ZERO;
        let mut x1 = WideVec3::<N>::ZERO;
        let mut w0 = WideF32::<N>::ZERO;
        let mut w1 = WideF32::<N>::ZERO;

        for l in 0..N {
            let p = &t.three_cluster[i + l];
            if p.c0 > 0 {
                let k = p.c0 as usize - 1;
                x0.x.0[l] = sat.r[k];
                x0.y.0[l] = sat.g[k];
                x0.z.0[l] = sat.b[k];
                w0.0[l] = sat.w[k];
            }
            if p.c01 > 0 {
                let k = p.c01 as usize - 1;
                x1.x.0[l] = sat.r[k];
                x1.y.0[l] = sat.g[k];
                x1.z.0[l] = sat.b[k];
                w1.0[l] = sat.w[k];
            }
        }

        let w2 = WideF32::splat(w_sum) - w1;
        let x1 = x1 - x0;
        let w1 = w1 - w0;

        // the middle cluster interpolates at 1/2
        let alphabeta_sum = w1 * WideF32::splat(0.25);
        let alpha2_sum = w0 + alphabeta_sum;
        let beta2_sum = w2 + alphabeta_sum;
        let factor = (alpha2_sum * beta2_sum - alphabeta_sum * alphabeta_sum).recip();

        let alphax_sum = x1.mul_add(WideF32::splat(0.5), x0);
        let betax_sum = WideVec3::splat(color_sum) - alphax_sum;

        let a = (alphax_sum * beta2_sum - betax_sum * alphabeta_sum) * factor;
        let b = (betax_sum * alpha2_sum - alphax_sum * alphabeta_sum) * factor;

        let a = a.saturate().round_565(t);
        let b = b.saturate().round_565(t);

        let e1 = (a * a).mul_add(
            alpha2_sum,
            (b * b).mul_add(
                beta2_sum,
                (a * b * alphabeta_sum - a * alphax_sum - b * betax_sum)
                    * WideF32::splat(2.0),
            ),
        );
        let error = e1.dot(WideVec3::splat(metric_sqr));
        let error = WideF32::splat(f32::INFINITY).select(factor.is_finite(), error);

        let improved = error.lt(best_error);
        best_error = best_error.select(improved, error);
        best_start = best_start.select(improved, a);
        best_end = best_end.select(improved, b);
        for l in 0..N {
            if improved.lane(l) {
                best_index[l] = i + l;
            }
        }

        i += N;
    }

    let lane = best_lane(&best_error, &best_index);
    (best_start.lane(lane), best_end.lane(lane))
}
