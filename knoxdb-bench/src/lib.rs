//! Shared input generators of bitpacking benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bit widths covering the specialized and generic kernels.
pub const BENCH_BITS: [u8; 9] = [1, 3, 7, 8, 13, 16, 31, 32, 59];

/// Number of values per benchmarked block.
pub const BENCH_ROWS: usize = 64 * 1024;

/// Random values which need exactly `bits` bits after FOR conversion.
pub fn gen_values(n: usize, bits: u8, seed: u64) -> Vec<u64> {
    let mask = u64::MAX >> (64 - bits as u32);
    let base = 1000;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values: Vec<u64> = (0..n).map(|_| base + (rng.gen::<u64>() & mask)).collect();
    if n > 1 {
        values[0] = base;
        values[n - 1] = base + mask;
    }
    values
}

/// Picks a threshold code which selects about given fraction of rows
/// with a less-than predicate.
pub fn threshold_for(bits: u8, selectivity: f64) -> u64 {
    let mask = u64::MAX >> (64 - bits as u32);
    (mask as f64 * selectivity) as u64
}
