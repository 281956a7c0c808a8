use super::cursor::{bit_width, packed_len, value_mask};
use super::BitPackable;

/// Packs values with minimum as bias into a new buffer.
/// Returns packed bytes and bit width.
///
/// `minv` and `maxv` must bound all values, otherwise codes are
/// truncated to the derived bit width.
#[inline]
pub fn encode<T: BitPackable>(values: &[T], minv: T, maxv: T) -> (Vec<u8>, u8) {
    let bits = bit_width(maxv.sub_to_u64(minv));
    let mut buf = vec![0u8; packed_len(values.len(), bits)];
    pack(values, minv, bits, &mut buf);
    (buf, bits)
}

/// Packs values into the head of given buffer, which must hold at least
/// `packed_len(values.len(), bits)` bytes.
/// Returns number of bytes written and bit width.
#[inline]
pub fn encode_into<T: BitPackable>(buf: &mut [u8], values: &[T], minv: T, maxv: T) -> (usize, u8) {
    let bits = bit_width(maxv.sub_to_u64(minv));
    let len = packed_len(values.len(), bits);
    let dst = &mut buf[..len];
    dst.fill(0);
    pack(values, minv, bits, dst);
    (len, bits)
}

/// Packs codes of values into zeroed buffer.
pub(crate) fn pack<T: BitPackable>(values: &[T], minv: T, bits: u8, buf: &mut [u8]) {
    debug_assert!((1..=64).contains(&bits));
    debug_assert!(buf.len() >= packed_len(values.len(), bits));
    if bits & 7 == 0 {
        let nb = (bits >> 3) as usize;
        for (v, dst) in values.iter().zip(buf.chunks_exact_mut(nb)) {
            dst.copy_from_slice(&v.sub_to_u64(minv).to_be_bytes()[8 - nb..]);
        }
        return;
    }
    let mask = value_mask(bits);
    for (i, v) in values.iter().enumerate() {
        pack_code(buf, i, bits, v.sub_to_u64(minv) & mask);
    }
}

/// Writes a single code at given index.
///
/// The first byte is merged with bits of the preceding value and
/// the remaining bytes are overwritten, so values must be written
/// in ascending order into a zeroed buffer.
#[inline(always)]
pub(crate) fn pack_code(buf: &mut [u8], index: usize, bits: u8, code: u64) {
    let bit = index * bits as usize;
    let pos = bit >> 3;
    let total = (bit & 7) as u32 + bits as u32;
    if total <= 64 {
        let span = total.div_ceil(8) as usize;
        let word = (code << (64 - total)).to_be_bytes();
        buf[pos] |= word[0];
        buf[pos + 1..pos + span].copy_from_slice(&word[1..span]);
    } else {
        // 9 bytes, low bits spill into the last byte.
        let extra = total - 64;
        let word = (code >> extra).to_be_bytes();
        buf[pos] |= word[0];
        buf[pos + 1..pos + 8].copy_from_slice(&word[1..]);
        buf[pos + 8] = (code << (8 - extra)) as u8;
    }
}
