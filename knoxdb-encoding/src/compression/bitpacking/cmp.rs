//! Compare kernels on packed data.
//!
//! Kernels take thresholds as codes, i.e. with the FOR minimum already
//! subtracted, and set the bit of every matching row in the output bitset.
//! Bits of non-matching rows are left untouched, so output is expected to
//! be cleared by caller.

use super::fast;
use super::unpack::read_code;
use crate::bitset::Bitset;
use std::ops::Range;

/// Predicate evaluated on a single code.
pub trait Predicate: Copy {
    fn test(self, code: u64) -> bool;
}

macro_rules! impl_predicate {
    ($($name:ident => $op:tt),*) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name(pub u64);

            impl Predicate for $name {
                #[inline(always)]
                fn test(self, code: u64) -> bool {
                    code $op self.0
                }
            }
        )*
    }
}

impl_predicate!(
    Equal => ==,
    NotEqual => !=,
    Less => <,
    LessEqual => <=,
    Greater => >,
    GreaterEqual => >=
);

/// Inclusive range `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Between {
    pub lo: u64,
    pub hi: u64,
}

impl Predicate for Between {
    #[inline(always)]
    fn test(self, code: u64) -> bool {
        wrapping_in_range(code, self.lo, self.hi)
    }
}

/// Single-branch range test.
/// Values below `lo` wrap around to large numbers and fail the bound.
/// Requires `lo <= hi`.
#[inline(always)]
pub fn wrapping_in_range(code: u64, lo: u64, hi: u64) -> bool {
    code.wrapping_sub(lo) <= hi.wrapping_sub(lo)
}

/// Comparison kind of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// Inclusive range of two values.
    Range,
}

#[inline]
pub fn compare_eq(buf: &[u8], bits: u8, val: u64, n: usize, out: &mut Bitset) {
    scan(buf, bits, Equal(val), 0..n, out)
}

#[inline]
pub fn compare_ne(buf: &[u8], bits: u8, val: u64, n: usize, out: &mut Bitset) {
    scan(buf, bits, NotEqual(val), 0..n, out)
}

#[inline]
pub fn compare_lt(buf: &[u8], bits: u8, val: u64, n: usize, out: &mut Bitset) {
    scan(buf, bits, Less(val), 0..n, out)
}

#[inline]
pub fn compare_le(buf: &[u8], bits: u8, val: u64, n: usize, out: &mut Bitset) {
    scan(buf, bits, LessEqual(val), 0..n, out)
}

#[inline]
pub fn compare_gt(buf: &[u8], bits: u8, val: u64, n: usize, out: &mut Bitset) {
    scan(buf, bits, Greater(val), 0..n, out)
}

#[inline]
pub fn compare_ge(buf: &[u8], bits: u8, val: u64, n: usize, out: &mut Bitset) {
    scan(buf, bits, GreaterEqual(val), 0..n, out)
}

/// Matches codes in `[lo, hi]`. Nothing matches if `lo > hi`.
#[inline]
pub fn compare_between(buf: &[u8], bits: u8, lo: u64, hi: u64, n: usize, out: &mut Bitset) {
    if lo > hi {
        return;
    }
    scan(buf, bits, Between { lo, hi }, 0..n, out)
}

/// Dispatches to the kernel of given mode. `val2` is only used by range.
/// Output must be zeroed over scanned rows.
#[inline]
pub fn compare(mode: FilterMode, buf: &[u8], bits: u8, val: u64, val2: u64, n: usize, out: &mut Bitset) {
    compare_rows(mode, buf, bits, val, val2, 0..n, out)
}

/// Same as [`compare`], restricted to rows in given range.
/// Range start must be a multiple of 8.
pub(crate) fn compare_rows(
    mode: FilterMode,
    buf: &[u8],
    bits: u8,
    val: u64,
    val2: u64,
    rows: Range<usize>,
    out: &mut Bitset,
) {
    match mode {
        FilterMode::Equal => scan(buf, bits, Equal(val), rows, out),
        FilterMode::NotEqual => scan(buf, bits, NotEqual(val), rows, out),
        FilterMode::Less => scan(buf, bits, Less(val), rows, out),
        FilterMode::LessEqual => scan(buf, bits, LessEqual(val), rows, out),
        FilterMode::Greater => scan(buf, bits, Greater(val), rows, out),
        FilterMode::GreaterEqual => scan(buf, bits, GreaterEqual(val), rows, out),
        FilterMode::Range => {
            if val <= val2 {
                scan(buf, bits, Between { lo: val, hi: val2 }, rows, out)
            }
        }
    }
}

/// Evaluates predicate on rows and sets matches in output.
/// Output bits of scanned rows must be zero on entry: kernels may either
/// merge into or overwrite whole output bytes.
#[inline]
pub(crate) fn scan<P: Predicate>(buf: &[u8], bits: u8, pred: P, rows: Range<usize>, out: &mut Bitset) {
    debug_assert!((1..=64).contains(&bits));
    debug_assert!(rows.start & 7 == 0);
    debug_assert!(out.len() >= rows.end);
    if rows.is_empty() {
        return;
    }
    match bits {
        1 => fast::scan_b1(buf, pred, rows, out),
        8 => fast::scan_u8(buf, pred, rows, out),
        16 => fast::scan_aligned::<P, 2>(buf, pred, rows, out),
        24 => fast::scan_aligned::<P, 3>(buf, pred, rows, out),
        32 => fast::scan_aligned::<P, 4>(buf, pred, rows, out),
        40 => fast::scan_aligned::<P, 5>(buf, pred, rows, out),
        48 => fast::scan_aligned::<P, 6>(buf, pred, rows, out),
        56 => fast::scan_aligned::<P, 7>(buf, pred, rows, out),
        64 => fast::scan_aligned::<P, 8>(buf, pred, rows, out),
        _ => scan_packed(buf, bits, pred, rows, out),
    }
}

/// Generic kernel for any bit width.
/// Full groups of 8 rows are collected into one output byte.
pub(crate) fn scan_packed<P: Predicate>(buf: &[u8], bits: u8, pred: P, rows: Range<usize>, out: &mut Bitset) {
    let full_end = rows.start + (rows.len() & !7);
    let bytes = out.bytes_mut();
    for i in (rows.start..full_end).step_by(8) {
        let mut acc = 0u8;
        for j in 0..8 {
            acc |= (pred.test(read_code(buf, i + j, bits)) as u8) << (7 - j);
        }
        if acc != 0 {
            bytes[i >> 3] = acc;
        }
    }
    for i in full_end..rows.end {
        if pred.test(read_code(buf, i, bits)) {
            out.set(i);
        }
    }
}
