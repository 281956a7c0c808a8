//! Position arithmetic of a value inside the packed stream.
//!
//! Value `i` with width `w` occupies stream bits `[i*w, (i+1)*w)`.
//! A value touches at most 9 bytes, which only happens when `w >= 59`.

/// Minimal bit width to hold delta, at least 1.
#[inline(always)]
pub const fn bit_width(delta: u64) -> u8 {
    let bits = u64::BITS - delta.leading_zeros();
    if bits == 0 { 1 } else { bits as u8 }
}

/// Number of bytes to pack n values with given bit width.
#[inline(always)]
pub const fn packed_len(n: usize, bits: u8) -> usize {
    (n * bits as usize).div_ceil(8)
}

/// Mask of all valid code bits.
#[inline(always)]
pub const fn value_mask(bits: u8) -> u64 {
    u64::MAX >> (64 - bits as u32)
}

#[inline(always)]
pub const fn bit_offset(index: usize, bits: u8) -> usize {
    index * bits as usize
}

/// First byte touched by value at index.
#[inline(always)]
pub const fn byte_offset(index: usize, bits: u8) -> usize {
    bit_offset(index, bits) >> 3
}

/// Bits in the first byte owned by preceding values.
#[inline(always)]
pub const fn lead_bits(index: usize, bits: u8) -> u32 {
    (bit_offset(index, bits) & 7) as u32
}

/// Bits in the last byte owned by following values,
/// i.e. the right shift that aligns the value after loading its bytes.
#[inline(always)]
pub const fn intra_shift(index: usize, bits: u8) -> u32 {
    ((8 - (bit_offset(index + 1, bits) & 7)) & 7) as u32
}

/// Number of bytes touched by value at index, between 1 and 9.
#[inline(always)]
pub const fn span_bytes(index: usize, bits: u8) -> usize {
    ((bits as usize + intra_shift(index, bits) as usize - 1) >> 3) + 1
}

/// Location of a single value in packed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub byte: usize,
    pub lead: u32,
    pub shift: u32,
    pub span: usize,
}

impl Cursor {
    #[inline]
    pub const fn new(index: usize, bits: u8) -> Self {
        Cursor {
            byte: byte_offset(index, bits),
            lead: lead_bits(index, bits),
            shift: intra_shift(index, bits),
            span: span_bytes(index, bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_width() {
        assert_eq!(bit_width(0), 1);
        assert_eq!(bit_width(1), 1);
        assert_eq!(bit_width(2), 2);
        assert_eq!(bit_width(255), 8);
        assert_eq!(bit_width(256), 9);
        assert_eq!(bit_width(u64::MAX >> 1), 63);
        assert_eq!(bit_width(u64::MAX), 64);
    }

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(0, 7), 0);
        assert_eq!(packed_len(1, 1), 1);
        assert_eq!(packed_len(8, 1), 1);
        assert_eq!(packed_len(9, 1), 2);
        assert_eq!(packed_len(3, 7), 3);
        assert_eq!(packed_len(10, 64), 80);
        assert_eq!(value_mask(1), 1);
        assert_eq!(value_mask(13), 0x1fff);
        assert_eq!(value_mask(64), u64::MAX);
    }

    #[test]
    fn test_cursor_7bits() {
        assert_eq!(
            Cursor::new(0, 7),
            Cursor {
                byte: 0,
                lead: 0,
                shift: 1,
                span: 1
            }
        );
        assert_eq!(
            Cursor::new(1, 7),
            Cursor {
                byte: 0,
                lead: 7,
                shift: 2,
                span: 2
            }
        );
        // bits 14..21
        assert_eq!(
            Cursor::new(2, 7),
            Cursor {
                byte: 1,
                lead: 6,
                shift: 3,
                span: 2
            }
        );
        // ends on byte boundary at bit 56
        assert_eq!(
            Cursor::new(7, 7),
            Cursor {
                byte: 6,
                lead: 1,
                shift: 0,
                span: 1
            }
        );
    }

    #[test]
    fn test_cursor_span_identity() {
        for bits in 1..=64u8 {
            for i in 0..64 {
                let c = Cursor::new(i, bits);
                assert_eq!(c.span, (c.lead + bits as u32 + c.shift) as usize / 8);
                assert_eq!((c.lead + bits as u32 + c.shift) % 8, 0);
                assert!(c.span <= 9);
                if c.span == 9 {
                    assert!(bits >= 59);
                }
            }
        }
        assert_eq!(Cursor::new(1, 63).span, 9);
        assert_eq!(Cursor::new(3, 64).span, 8);
    }
}
