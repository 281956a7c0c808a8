//! FOR+bitpacking of integers with 1 to 64 bits per value.
//!
//! Values are converted with Frame-Of-Reference using the minimum as bias
//! (MinFOR), so only unsigned codes are packed. Codes are concatenated
//! without padding, most significant bit first, within each value and
//! within the byte stream:
//!
//! ```text
//! bits=7: [aaaa aaab] [bbbb bbcc] [cccc cddd] ...
//! ```
//!
//! The packed buffer carries no header: number of values, bit width and
//! minimum are stored alongside by the enclosing block format.
//!
//! Compare kernels evaluate predicates on the packed bytes directly and
//! write matches into a [`Bitset`](crate::bitset::Bitset).

mod block;
mod cmp;
pub mod cursor;
mod fast;
mod pack;
mod scratch;
mod unpack;


pub use block::*;
pub use cmp::*;
pub use cursor::{bit_width, packed_len};
pub use pack::*;
pub use scratch::*;
pub use unpack::*;

use std::fmt;

/// Data type that supports bitpacking.
/// Arithmetic is wrapping so full-range signed values map to
/// unsigned codes without overflow.
pub trait BitPackable: Copy + Ord + fmt::Debug {
    const ZERO: Self;
    const MAX: Self;

    /// Returns `self - min` as unsigned code.
    fn sub_to_u64(self, min: Self) -> u64;

    /// Returns `self + delta`, truncating delta to the type width.
    fn add_from_u64(self, delta: u64) -> Self;
}

macro_rules! impl_bit_packable {
    ($($t:ty => $u:ty),*) => {
        $(
            impl BitPackable for $t {
                const ZERO: Self = 0;
                const MAX: Self = <$t>::MAX;

                #[inline(always)]
                fn sub_to_u64(self, min: Self) -> u64 {
                    self.wrapping_sub(min) as $u as u64
                }

                #[inline(always)]
                fn add_from_u64(self, delta: u64) -> Self {
                    self.wrapping_add(delta as Self)
                }
            }
        )*
    }
}

impl_bit_packable!(
    i8 => u8, u8 => u8,
    i16 => u16, u16 => u16,
    i32 => u32, u32 => u32,
    i64 => u64, u64 => u64,
    isize => usize, usize => usize
);

/// Returns number of bits, minimum and maximum value on input data.
/// Returns None if input is empty.
#[inline]
pub fn prepare_for_bitpacking<T: BitPackable>(input: &[T]) -> Option<(u8, T, T)> {
    let (first, rest) = input.split_first()?;
    let (mut min, mut max) = (*first, *first);
    rest.iter().for_each(|v| {
        min = min.min(*v);
        max = max.max(*v);
    });
    Some((bit_width(max.sub_to_u64(min)), min, max))
}
