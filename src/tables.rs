//! Lookup tables shared by every block encode.
//!
//! All of them are pure functions of nothing: quantization midpoints, the
//! single-color optimal endpoint pairs, and the cluster partition tables the
//! endpoint search enumerates. They are built once behind a [`OnceLock`] and
//! are immutable afterwards, so encoding is safe from any number of threads.

use std::sync::OnceLock;

use crate::norm::{n5, n6};

/// Number of partition descriptors processed per inner-loop iteration.
///
/// The descriptor tables are padded so that a full group of `LANES` can always
/// be loaded. Any value >= 1 produces bit-identical blocks; see `wide`.
pub(crate) const LANES: usize = 8;

/// Count of distinct `(c0, c01, c012)` descriptors over up to 16 samples,
/// excluding the all-zero one.
const FOUR_CLUSTER_COUNT: usize = 968;
/// Count of distinct `(c0, c01)` descriptors over up to 16 samples.
const THREE_CLUSTER_COUNT: usize = 152;

/// Cumulative cluster boundaries within the total ordering of the samples.
///
/// A boundary of 0 selects the empty prefix; boundary `k > 0` selects the
/// first `k` sorted samples, i.e. summed-area-table entry `k - 1`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Partition4 {
    pub c0: u8,
    pub c01: u8,
    pub c012: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Partition3 {
    pub c0: u8,
    pub c01: u8,
}

pub(crate) struct Tables {
    /// Rounding midpoints of adjacent 5-bit grid values in bit-expanded
    /// 8-bit-normalized space. `midpoints5[31] == 1.0`.
    pub midpoints5: [f32; 32],
    pub midpoints6: [f32; 64],

    /// For each 8-bit value, the `(max, min)` 5-bit endpoint pair whose
    /// 2:1 interpolation is closest to it.
    pub match5: [[u8; 2]; 256],
    pub match6: [[u8; 2]; 256],

    /// Descriptors valid for sample count `t` are the prefix of length
    /// `four_cluster_total[t - 1]`. The trailing `LANES` entries replicate
    /// the last descriptor so a partial group never reads uninitialized data.
    pub four_cluster: [Partition4; FOUR_CLUSTER_COUNT + LANES],
    pub four_cluster_total: [u16; 16],

    pub three_cluster: [Partition3; THREE_CLUSTER_COUNT + LANES],
    pub three_cluster_total: [u16; 16],
}

static TABLES: OnceLock<Box<Tables>> = OnceLock::new();

/// Builds all tables if this is the first call, otherwise returns them.
pub(crate) fn get() -> &'static Tables {
    TABLES.get_or_init(build)
}

fn build() -> Box<Tables> {
    let mut midpoints5 = [0.0; 32];
    for i in 0..31 {
        let lo = n5::n8(i) as f32;
        let hi = n5::n8(i + 1) as f32;
        midpoints5[i as usize] = (lo + hi) * 0.5 / 255.0;
    }
    midpoints5[31] = 1.0;

    let mut midpoints6 = [0.0; 64];
    for i in 0..63 {
        let lo = n6::n8(i) as f32;
        let hi = n6::n8(i + 1) as f32;
        midpoints6[i as usize] = (lo + hi) * 0.5 / 255.0;
    }
    midpoints6[63] = 1.0;

    let (four_cluster, four_cluster_total) = build_four_cluster();
    let (three_cluster, three_cluster_total) = build_three_cluster();

    Box::new(Tables {
        midpoints5,
        midpoints6,
        match5: build_match_table(31, n5::n8),
        match6: build_match_table(63, n6::n8),
        four_cluster,
        four_cluster_total,
        three_cluster,
        three_cluster_total,
    })
}

/// For every 8-bit target, finds the endpoint pair whose 2/3:1/3 interpolation
/// lands closest, with a penalty on distant pairs since hardware is only
/// required to interpolate within 3% of the exact result.
fn build_match_table(max_value: u8, expand: fn(u8) -> u8) -> [[u8; 2]; 256] {
    let mut table = [[0_u8; 2]; 256];

    for (target, entry) in table.iter_mut().enumerate() {
        let mut best_err = i32::MAX;

        for min in 0..=max_value {
            for max in 0..=max_value {
                let interpolated = (expand(max) as i32 * 2 + expand(min) as i32) / 3;

                let mut err = (interpolated - target as i32).abs() * 100;
                err += (max as i32 - min as i32).abs() * 3;

                if err < best_err {
                    best_err = err;
                    *entry = [max, min];
                }
            }
        }
    }

    table
}

fn build_four_cluster() -> ([Partition4; FOUR_CLUSTER_COUNT + LANES], [u16; 16]) {
    let mut table = [Partition4::default(); FOUR_CLUSTER_COUNT + LANES];
    let mut totals = [0_u16; 16];

    // A descriptor is valid for every count >= its last boundary, so grouping
    // by the count where it first becomes valid makes the groups cumulative.
    let mut i = 0;
    for t in 1..=16_u8 {
        for c0 in 0..=t {
            for c01 in c0..=t {
                table[i] = Partition4 {
                    c0,
                    c01,
                    c012: t,
                };
                i += 1;
            }
        }
        totals[t as usize - 1] = i as u16;
    }
    debug_assert_eq!(i, FOUR_CLUSTER_COUNT);

    for pad in 0..LANES {
        table[FOUR_CLUSTER_COUNT + pad] = table[FOUR_CLUSTER_COUNT - 1];
    }

    (table, totals)
}

fn build_three_cluster() -> ([Partition3; THREE_CLUSTER_COUNT + LANES], [u16; 16]) {
    let mut table = [Partition3::default(); THREE_CLUSTER_COUNT + LANES];
    let mut totals = [0_u16; 16];

    let mut i = 0;
    for t in 1..=16_u8 {
        for c0 in 0..=t {
            table[i] = Partition3 { c0, c01: t };
            i += 1;
        }
        totals[t as usize - 1] = i as u16;
    }
    debug_assert_eq!(i, THREE_CLUSTER_COUNT);

    for pad in 0..LANES {
        table[THREE_CLUSTER_COUNT + pad] = table[THREE_CLUSTER_COUNT - 1];
    }

    (table, totals)
}
