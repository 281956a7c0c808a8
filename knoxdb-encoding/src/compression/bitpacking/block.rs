use super::cmp::{FilterMode, compare_rows};
use super::cursor::{packed_len, value_mask};
use super::pack::encode;
use super::unpack::{CHUNK_SIZE, read_code, unpack};
use super::{BitPackable, prepare_for_bitpacking};
use crate::bitset::Bitset;
use crate::error::{Error, Result, check_bit_width};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

/// Number of header bytes of serialized block:
/// bit width (1), number of values (8) and minimum (8).
pub const BLOCK_HEADER_LEN: usize = 17;

/// Read access of compressed primitive data.
pub trait PackedData {
    type Value;
    type Iter: Iterator<Item = Self::Value>;

    /// Returns total number of values.
    #[allow(clippy::len_without_is_empty)]
    fn len(&self) -> usize;

    /// Returns value at given position.
    /// None if index is out of range.
    fn value(&self, idx: usize) -> Option<Self::Value>;

    /// Extend all values to target collection.
    fn extend_to<E: Extend<Self::Value>>(&self, target: &mut E);

    /// Returns the iterator over all values.
    fn iter(&self) -> Self::Iter;
}

/// Borrowed view of FOR+bitpacking data.
#[derive(Debug, Clone, Copy)]
pub struct ForBitpacked<'a, T> {
    len: usize,
    min: T,
    bits: u8,
    data: &'a [u8],
}

impl<'a, T: BitPackable> ForBitpacked<'a, T> {
    /// Creates a view on packed data.
    /// Data must contain all packed bytes of given number of values.
    #[inline]
    pub fn new(data: &'a [u8], bits: u8, min: T, len: usize) -> Result<Self> {
        check_bit_width(bits)?;
        let need = len
            .checked_mul(bits as usize)
            .map(|n| n.div_ceil(8))
            .ok_or(Error::InvalidCompressedData)?;
        if data.len() < need {
            return Err(Error::InvalidCompressedData);
        }
        Ok(ForBitpacked { len, min, bits, data })
    }

    /// Parses a serialized block, see [`PackedBlock::to_bytes`].
    #[inline]
    pub fn from_bytes(input: &'a [u8]) -> Result<Self> {
        let (bits, input) = read_u8(input)?;
        let (len, input) = read_le_u64(input)?;
        let (min, data) = read_le_u64(input)?;
        let len = usize::try_from(len).map_err(|_| Error::InvalidCompressedData)?;
        Self::new(data, bits, T::ZERO.add_from_u64(min), len)
    }

    #[inline]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    #[inline]
    pub fn min(&self) -> T {
        self.min
    }

    /// Largest value representable with current bit width,
    /// capped at maximum of the type.
    #[inline]
    pub fn upper_bound(&self) -> T {
        let room = T::MAX.sub_to_u64(self.min);
        self.min.add_from_u64(value_mask(self.bits).min(room))
    }

    /// Packed bytes, without trailing data beyond last value.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        &self.data[..packed_len(self.len, self.bits)]
    }

    /// Decodes leading values into dst. Returns number of decoded values.
    #[inline]
    pub fn decode_into(&self, dst: &mut [T]) -> usize {
        let n = dst.len().min(self.len);
        unpack(&mut dst[..n], self.data, self.bits, self.min);
        n
    }

    /// Decodes the chunk starting at row `ofs`, which must be a multiple
    /// of chunk size. Returns number of decoded values, 0 at the end.
    #[inline]
    pub fn decode_chunk(&self, dst: &mut [T; CHUNK_SIZE], ofs: usize) -> usize {
        if ofs >= self.len {
            return 0;
        }
        debug_assert!(ofs % CHUNK_SIZE == 0);
        let n = CHUNK_SIZE.min(self.len - ofs);
        // chunk boundary is byte aligned for every width
        let start = ofs * self.bits as usize / 8;
        unpack(&mut dst[..n], &self.data[start..], self.bits, self.min);
        n
    }

    /// Sets bits of all rows matching the filter.
    ///
    /// Thresholds are plain values. Those outside of `[min, upper_bound]`
    /// are resolved without scanning.
    #[inline]
    pub fn filter(&self, mode: FilterMode, val: T, val2: T, out: &mut Bitset) -> Result<()> {
        if out.len() < self.len {
            return Err(Error::InvalidArgument);
        }
        self.run(self.plan(mode, val, val2), 0..self.len, out);
        Ok(())
    }

    /// Same as [`filter`](Self::filter), but scans in chunks of rows and
    /// checks the cancel flag between chunks.
    pub fn filter_chunked(
        &self,
        mode: FilterMode,
        val: T,
        val2: T,
        out: &mut Bitset,
        chunk_rows: usize,
        cancel: &AtomicBool,
    ) -> Result<()> {
        if out.len() < self.len {
            return Err(Error::InvalidArgument);
        }
        let plan = self.plan(mode, val, val2);
        let chunk_rows = (chunk_rows & !7).max(8);
        let mut start = 0;
        while start < self.len {
            if cancel.load(Ordering::Relaxed) {
                log::debug!("bitpacking scan cancelled at row {} of {}", start, self.len);
                return Err(Error::ScanCancelled);
            }
            let end = (start + chunk_rows).min(self.len);
            self.run(plan, start..end, out);
            start = end;
        }
        Ok(())
    }

    #[inline]
    fn run(&self, plan: ScanPlan, rows: Range<usize>, out: &mut Bitset) {
        match plan {
            ScanPlan::Empty => (),
            ScanPlan::Full => {
                out.set_range(rows);
            }
            ScanPlan::Scan(mode, val, val2) => {
                compare_rows(mode, self.data, self.bits, val, val2, rows, out)
            }
        }
    }

    /// Converts typed thresholds to codes.
    fn plan(&self, mode: FilterMode, val: T, val2: T) -> ScanPlan {
        use ScanPlan::{Empty, Full, Scan};
        use Threshold::*;
        match mode {
            FilterMode::Equal => match self.threshold(val) {
                Within(c) => Scan(mode, c, 0),
                _ => Empty,
            },
            FilterMode::NotEqual => match self.threshold(val) {
                Within(c) => Scan(mode, c, 0),
                _ => Full,
            },
            FilterMode::Less | FilterMode::LessEqual => match self.threshold(val) {
                Below => Empty,
                Within(c) => Scan(mode, c, 0),
                Above => Full,
            },
            FilterMode::Greater | FilterMode::GreaterEqual => match self.threshold(val) {
                Below => Full,
                Within(c) => Scan(mode, c, 0),
                Above => Empty,
            },
            FilterMode::Range => {
                if val > val2 {
                    return Empty;
                }
                let lo = match self.threshold(val) {
                    Below => 0,
                    Within(c) => c,
                    Above => return Empty,
                };
                let hi = match self.threshold(val2) {
                    Below => return Empty,
                    Within(c) => c,
                    Above => value_mask(self.bits),
                };
                Scan(mode, lo, hi)
            }
        }
    }

    #[inline]
    fn threshold(&self, val: T) -> Threshold {
        if val < self.min {
            return Threshold::Below;
        }
        let code = val.sub_to_u64(self.min);
        if code > value_mask(self.bits) {
            Threshold::Above
        } else {
            Threshold::Within(code)
        }
    }
}

impl<'a, T: BitPackable> PackedData for ForBitpacked<'a, T> {
    type Value = T;
    type Iter = ForBitpackedIter<'a, T>;

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn value(&self, idx: usize) -> Option<T> {
        if idx >= self.len {
            return None;
        }
        Some(self.min.add_from_u64(read_code(self.data, idx, self.bits)))
    }

    #[inline]
    fn extend_to<E: Extend<T>>(&self, target: &mut E) {
        target.extend(self.iter())
    }

    #[inline]
    fn iter(&self) -> Self::Iter {
        ForBitpackedIter {
            view: *self,
            idx: 0,
        }
    }
}

pub struct ForBitpackedIter<'a, T> {
    view: ForBitpacked<'a, T>,
    idx: usize,
}

impl<T: BitPackable> Iterator for ForBitpackedIter<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        let v = self.view.value(self.idx)?;
        self.idx += 1;
        Some(v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.view.len - self.idx;
        (n, Some(n))
    }
}

impl<T: BitPackable> ExactSizeIterator for ForBitpackedIter<'_, T> {}

/// Owned FOR+bitpacking data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBlock<T> {
    data: Vec<u8>,
    min: T,
    bits: u8,
    len: usize,
}

impl<T: BitPackable> PackedBlock<T> {
    /// Packs values with minimum as bias and smallest possible bit width.
    #[inline]
    pub fn encode(values: &[T]) -> Self {
        let Some((_, min, max)) = prepare_for_bitpacking(values) else {
            return PackedBlock {
                data: vec![],
                min: T::ZERO,
                bits: 1,
                len: 0,
            };
        };
        let (data, bits) = encode(values, min, max);
        log::debug!(
            "bitpacked {} values into {} bytes with {} bits, min={:?}, max={:?}",
            values.len(),
            data.len(),
            bits,
            min,
            max
        );
        PackedBlock {
            data,
            min,
            bits,
            len: values.len(),
        }
    }

    #[inline]
    pub fn view(&self) -> ForBitpacked<'_, T> {
        ForBitpacked {
            len: self.len,
            min: self.min,
            bits: self.bits,
            data: &self.data,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    #[inline]
    pub fn min(&self) -> T {
        self.min
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Total length of serialized block.
    #[inline]
    pub fn ser_len(&self) -> usize {
        BLOCK_HEADER_LEN + self.data.len()
    }

    /// Serializes block as below:
    ///
    /// 1. bit width as u8.
    /// 2. number of values as u64 in little endian.
    /// 3. minimum as u64 in little endian, widened with wrapping conversion.
    /// 4. packed data.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.ser_len());
        res.push(self.bits);
        res.extend_from_slice(&(self.len as u64).to_le_bytes());
        res.extend_from_slice(&self.min.sub_to_u64(T::ZERO).to_le_bytes());
        res.extend_from_slice(&self.data);
        res
    }

    #[inline]
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        let view = ForBitpacked::<T>::from_bytes(input)?;
        Ok(PackedBlock {
            data: view.data().to_vec(),
            min: view.min,
            bits: view.bits,
            len: view.len,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Threshold {
    Below,
    Within(u64),
    Above,
}

#[derive(Debug, Clone, Copy)]
enum ScanPlan {
    Empty,
    Full,
    Scan(FilterMode, u64, u64),
}

#[inline]
fn read_u8(input: &[u8]) -> Result<(u8, &[u8])> {
    match input.split_first() {
        Some((v, rest)) => Ok((*v, rest)),
        None => Err(Error::InvalidCompressedData),
    }
}

#[inline]
fn read_le_u64(input: &[u8]) -> Result<(u64, &[u8])> {
    match input.split_first_chunk::<8>() {
        Some((v, rest)) => Ok((u64::from_le_bytes(*v), rest)),
        None => Err(Error::InvalidCompressedData),
    }
}
