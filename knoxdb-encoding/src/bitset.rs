//! Packed boolean array, the output target of the bitpack compare kernels.
//!
//! Position `i` is stored at bit `i % 8` of byte `i / 8`, counting from the
//! most significant bit, which is the same order as a 1-bit packed stream.
//! Bits at positions `>= len` are always zero.
//! Population count is cached and recomputed lazily after bulk writes.

use std::cell::Cell;
use std::fmt;
use std::ops::Range;

pub struct Bitset {
    buf: Vec<u8>,
    len: usize,
    // None if bytes were modified without tracking.
    count: Cell<Option<usize>>,
}

impl Bitset {
    /// Create a new bitset with all zeros.
    #[inline]
    pub fn new(len: usize) -> Self {
        Bitset {
            buf: vec![0u8; len.div_ceil(8)],
            len,
            count: Cell::new(Some(0)),
        }
    }

    /// Create a bitset from raw bytes in bitset order.
    /// Missing bytes are zero, bits beyond `len` are dropped.
    #[inline]
    pub fn from_bytes(bytes: &[u8], len: usize) -> Self {
        let mut buf = vec![0u8; len.div_ceil(8)];
        let n = buf.len().min(bytes.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        let mut res = Bitset {
            buf,
            len,
            count: Cell::new(None),
        };
        res.mask_tail();
        res
    }

    /// Create a bitset with given positions set.
    #[inline]
    pub fn from_indexes(len: usize, idxs: impl IntoIterator<Item = usize>) -> Self {
        let mut res = Bitset::new(len);
        for i in idxs {
            res.set(i);
        }
        res
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set bit at given position, returns false if it was already set.
    /// Positions out of range are ignored.
    #[inline]
    pub fn set(&mut self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        let mask = 0x80u8 >> (idx & 7);
        let b = &mut self.buf[idx >> 3];
        if *b & mask != 0 {
            return false;
        }
        *b |= mask;
        if let Some(c) = self.count.get() {
            self.count.set(Some(c + 1));
        }
        true
    }

    /// Unset bit at given position, returns false if it was not set.
    #[inline]
    pub fn unset(&mut self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        let mask = 0x80u8 >> (idx & 7);
        let b = &mut self.buf[idx >> 3];
        if *b & mask == 0 {
            return false;
        }
        *b &= !mask;
        if let Some(c) = self.count.get() {
            self.count.set(Some(c - 1));
        }
        true
    }

    /// Returns whether given position is set, false if out of range.
    #[inline]
    pub fn contains(&self, idx: usize) -> bool {
        idx < self.len && self.buf[idx >> 3] & (0x80u8 >> (idx & 7)) != 0
    }

    /// Set all bits within the range. The end is clamped to `len`.
    #[inline]
    pub fn set_range(&mut self, range: Range<usize>) -> &mut Self {
        let start = range.start;
        let end = range.end.min(self.len);
        if start >= end {
            return self;
        }
        let (first, last) = (start >> 3, (end - 1) >> 3);
        let head = 0xffu8 >> (start & 7);
        let tail = 0xffu8 << (7 - ((end - 1) & 7));
        if first == last {
            self.buf[first] |= head & tail;
        } else {
            self.buf[first] |= head;
            self.buf[first + 1..last].fill(0xff);
            self.buf[last] |= tail;
        }
        self.count.set(None);
        self
    }

    /// Returns number of set bits.
    #[inline]
    pub fn count(&self) -> usize {
        match self.count.get() {
            Some(c) => c,
            None => {
                let c = self.buf.iter().map(|b| b.count_ones() as usize).sum();
                self.count.set(Some(c));
                c
            }
        }
    }

    /// Mark cached count as dirty.
    #[inline]
    pub fn invalidate_count(&mut self) {
        self.count.set(None);
    }

    /// Clear all bits.
    #[inline]
    pub fn zero(&mut self) -> &mut Self {
        if self.count.get() != Some(0) {
            self.buf.fill(0);
            self.count.set(Some(0));
        }
        self
    }

    /// Set all bits.
    #[inline]
    pub fn one(&mut self) -> &mut Self {
        self.buf.fill(0xff);
        self.mask_tail();
        self.count.set(Some(self.len));
        self
    }

    /// Flip all bits.
    #[inline]
    pub fn neg(&mut self) -> &mut Self {
        self.buf.iter_mut().for_each(|b| *b = !*b);
        self.mask_tail();
        if let Some(c) = self.count.get() {
            self.count.set(Some(self.len - c));
        }
        self
    }

    #[inline]
    pub fn and(&mut self, other: &Bitset) -> &mut Self {
        self.merge(other, |a, b| a & b)
    }

    #[inline]
    pub fn and_not(&mut self, other: &Bitset) -> &mut Self {
        self.merge(other, |a, b| a & !b)
    }

    #[inline]
    pub fn or(&mut self, other: &Bitset) -> &mut Self {
        self.merge(other, |a, b| a | b)
    }

    #[inline]
    pub fn xor(&mut self, other: &Bitset) -> &mut Self {
        self.merge(other, |a, b| a ^ b)
    }

    #[inline]
    fn merge<F: Fn(u8, u8) -> u8>(&mut self, other: &Bitset, f: F) -> &mut Self {
        debug_assert_eq!(self.len, other.len);
        self.buf
            .iter_mut()
            .zip(&other.buf)
            .for_each(|(a, b)| *a = f(*a, *b));
        self.mask_tail();
        self.count.set(None);
        self
    }

    /// Returns true if no bit is set.
    #[inline]
    pub fn none(&self) -> bool {
        match self.count.get() {
            Some(c) => c == 0,
            None => self.buf.iter().all(|b| *b == 0),
        }
    }

    #[inline]
    pub fn any(&self) -> bool {
        !self.none()
    }

    /// Returns true if all bits are set. False on empty set.
    #[inline]
    pub fn all(&self) -> bool {
        self.len > 0 && self.count() == self.len
    }

    /// Change length. New positions are zero.
    #[inline]
    pub fn resize(&mut self, len: usize) -> &mut Self {
        self.buf.resize(len.div_ceil(8), 0);
        self.len = len;
        self.mask_tail();
        self.count.set(None);
        self
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns mutable bytes and marks count as dirty.
    /// Caller must keep bits beyond `len` zero.
    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.count.set(None);
        &mut self.buf
    }

    /// Returns iterator of runs as (flag, repeat number).
    #[inline]
    pub fn range_iter(&self) -> BitsetRangeIter<'_> {
        if self.len == 0 {
            return BitsetRangeIter {
                bytes: &[],
                last_word_len: 0,
                word: 0,
                word_bits: 0,
                prev: false,
                n: 0,
            };
        }
        let last_word_len = if self.len & 63 == 0 {
            64
        } else {
            self.len & 63
        };
        BitsetRangeIter {
            bytes: &self.buf,
            last_word_len,
            word: 0,
            word_bits: 0,
            prev: self.buf[0] & 0x80 != 0, // pre-read first value
            n: 0,
        }
    }

    /// Returns iterator of all set positions in ascending order.
    #[inline]
    pub fn iter_ones(&self) -> BitsetOnesIter<'_> {
        BitsetOnesIter {
            range_iter: self.range_iter(),
            start: 0,
            end: 0,
        }
    }

    #[inline]
    fn mask_tail(&mut self) {
        let r = self.len & 7;
        if r != 0 {
            if let Some(b) = self.buf.last_mut() {
                *b &= 0xffu8 << (8 - r);
            }
        }
    }
}

impl Clone for Bitset {
    #[inline]
    fn clone(&self) -> Self {
        Bitset {
            buf: self.buf.clone(),
            len: self.len,
            count: Cell::new(self.count.get()),
        }
    }
}

impl PartialEq for Bitset {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.buf == other.buf
    }
}

impl Eq for Bitset {}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitset")
            .field("len", &self.len)
            .field("ones", &self.iter_ones().collect::<Vec<_>>())
            .finish()
    }
}

/// Loads up to 8 bytes as big-endian word, so the first position
/// is the most significant bit.
#[inline]
fn load_be_word(bytes: &[u8]) -> u64 {
    match bytes.first_chunk::<8>() {
        Some(b) => u64::from_be_bytes(*b),
        None => {
            let mut tmp = [0u8; 8];
            tmp[..bytes.len()].copy_from_slice(bytes);
            u64::from_be_bytes(tmp)
        }
    }
}

#[derive(Debug, Clone)]
pub struct BitsetRangeIter<'a> {
    bytes: &'a [u8],      // bytes not loaded yet
    last_word_len: usize, // length of last word
    word: u64,            // current word to scan
    word_bits: usize,     // remaining bits in current word
    prev: bool,           // flag of pending run
    n: usize,             // length of pending run
}

impl BitsetRangeIter<'_> {
    /// Consumes leading bits equal to flag in current word.
    #[inline]
    fn consume(&mut self, flag: bool) -> usize {
        let run = if flag {
            self.word.leading_ones()
        } else {
            self.word.leading_zeros()
        };
        let bits = self.word_bits.min(run as usize);
        self.word = if bits == 64 { 0 } else { self.word << bits };
        self.word_bits -= bits;
        bits
    }

    /// Extends pending run with current word.
    #[inline]
    fn continue_run(&mut self) {
        self.n += self.consume(self.prev);
        if self.n == 0 {
            self.prev = !self.prev;
            self.n += self.consume(self.prev);
        }
    }

    /// Starts a new run with opposite flag.
    #[inline]
    fn break_run(&mut self) {
        self.prev = !self.prev;
        self.n = self.consume(self.prev);
    }
}

impl Iterator for BitsetRangeIter<'_> {
    type Item = (bool, usize);

    /// Returns flag with its repeat number.
    /// Scans on word level first and falls back to bit level
    /// on mixed words.
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.word_bits == 0 {
            loop {
                if self.bytes.is_empty() {
                    if self.n == 0 {
                        return None;
                    }
                    let rg = (self.prev, self.n);
                    self.n = 0;
                    return Some(rg);
                }
                if self.bytes.len() <= 8 {
                    self.word = load_be_word(self.bytes);
                    self.word_bits = self.last_word_len;
                    self.bytes = &[];
                    self.continue_run();
                    break;
                }
                self.word = load_be_word(self.bytes);
                self.bytes = &self.bytes[8..];
                match (self.word, self.prev) {
                    (0, false) | (u64::MAX, true) => self.n += 64,
                    (0, true) | (u64::MAX, false) => {
                        let rg = (self.prev, self.n);
                        self.prev = !self.prev;
                        self.n = 64;
                        return Some(rg);
                    }
                    _ => {
                        self.word_bits = 64;
                        self.continue_run();
                        break;
                    }
                }
            }
        }
        let ret = (self.prev, self.n);
        self.break_run();
        Some(ret)
    }
}

pub struct BitsetOnesIter<'a> {
    range_iter: BitsetRangeIter<'a>,
    start: usize,
    end: usize,
}

impl Iterator for BitsetOnesIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.start < self.end {
            let idx = self.start;
            self.start += 1;
            return Some(idx);
        }
        for (flag, n) in self.range_iter.by_ref() {
            if flag {
                self.end += n;
                if self.start < self.end {
                    let idx = self.start;
                    self.start += 1;
                    return Some(idx);
                }
            } else {
                self.start += n;
                self.end += n;
            }
        }
        None
    }
}
