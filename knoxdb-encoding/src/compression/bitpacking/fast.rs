//! Specialized compare kernels for 1-bit and byte-aligned widths.

use super::cmp::Predicate;
use super::unpack::read_code;
use crate::bitset::Bitset;
use std::ops::Range;

/// 1-bit packed data shares bit order with bitset, so bytes are copied
/// directly, or negated if only code 0 matches.
pub(crate) fn scan_b1<P: Predicate>(buf: &[u8], pred: P, rows: Range<usize>, out: &mut Bitset) {
    let invert = match (pred.test(0), pred.test(1)) {
        (false, false) => return,
        (true, true) => {
            out.set_range(rows);
            return;
        }
        (false, true) => 0u8,
        (true, false) => 0xffu8,
    };
    let first = rows.start >> 3;
    let last = rows.end.div_ceil(8);
    let tail_mask = match rows.end & 7 {
        0 => 0xff,
        r => 0xffu8 << (8 - r),
    };
    let bytes = out.bytes_mut();
    for i in first..last {
        let mut b = buf.get(i).copied().unwrap_or(0) ^ invert;
        if i + 1 == last {
            b &= tail_mask;
        }
        bytes[i] |= b;
    }
}

/// 8-bit codes are plain bytes.
pub(crate) fn scan_u8<P: Predicate>(buf: &[u8], pred: P, rows: Range<usize>, out: &mut Bitset) {
    let end = rows.end.min(buf.len()).max(rows.start);
    let codes = buf.get(rows.start..end).unwrap_or(&[]);
    scan_words(codes, rows.start, |c| pred.test(*c as u64), out);
    scan_padded(buf, 8, pred, end..rows.end, out);
}

/// Codes of `NB` big-endian bytes.
pub(crate) fn scan_aligned<P: Predicate, const NB: usize>(buf: &[u8], pred: P, rows: Range<usize>, out: &mut Bitset)
where
    [u8; NB]: bytemuck::Pod,
{
    let avail = buf.len() / NB;
    let end = rows.end.min(avail).max(rows.start);
    let codes: &[[u8; NB]] = bytemuck::cast_slice(&buf[..avail * NB]);
    let codes = codes.get(rows.start..end).unwrap_or(&[]);
    scan_words(codes, rows.start, |c| pred.test(be_code(c)), out);
    scan_padded(buf, (NB * 8) as u8, pred, end..rows.end, out);
}

#[inline(always)]
fn be_code<const NB: usize>(src: &[u8; NB]) -> u64 {
    let mut word = [0u8; 8];
    word[8 - NB..].copy_from_slice(src);
    u64::from_be_bytes(word)
}

/// Evaluates codes starting at row `start`, which is a multiple of 8.
#[inline(always)]
fn scan_words<C, F>(codes: &[C], start: usize, f: F, out: &mut Bitset)
where
    F: Fn(&C) -> bool,
{
    let chunks = codes.chunks_exact(8);
    let rem = chunks.remainder();
    let bytes = out.bytes_mut();
    for (k, chunk) in chunks.enumerate() {
        let mut acc = 0u8;
        for (j, c) in chunk.iter().enumerate() {
            acc |= (f(c) as u8) << (7 - j);
        }
        if acc != 0 {
            bytes[(start >> 3) + k] = acc;
        }
    }
    let base = start + codes.len() - rem.len();
    for (j, c) in rem.iter().enumerate() {
        if f(c) {
            out.set(base + j);
        }
    }
}

/// Rows past the end of a truncated buffer read as zero-padded codes.
#[inline]
fn scan_padded<P: Predicate>(buf: &[u8], bits: u8, pred: P, rows: Range<usize>, out: &mut Bitset) {
    for i in rows {
        if pred.test(read_code(buf, i, bits)) {
            out.set(i);
        }
    }
}
