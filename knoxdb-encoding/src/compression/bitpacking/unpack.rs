use super::BitPackable;
use crate::error::{Result, check_bit_width};

/// Number of values in one decode chunk.
pub const CHUNK_SIZE: usize = 128;

/// Unpacks `dst.len()` values from packed buffer, adding minimum back.
/// Returns number of decoded values.
///
/// Bytes missing at the end of buffer are read as zero.
#[inline]
pub fn decode<T: BitPackable>(dst: &mut [T], buf: &[u8], bits: u8, minv: T) -> Result<usize> {
    check_bit_width(bits)?;
    unpack(dst, buf, bits, minv);
    Ok(dst.len())
}

pub(crate) fn unpack<T: BitPackable>(dst: &mut [T], buf: &[u8], bits: u8, minv: T) {
    if bits & 7 == 0 {
        let nb = (bits >> 3) as usize;
        let n = dst.len().min(buf.len() / nb);
        for (d, src) in dst[..n].iter_mut().zip(buf.chunks_exact(nb)) {
            let mut word = [0u8; 8];
            word[8 - nb..].copy_from_slice(src);
            *d = minv.add_from_u64(u64::from_be_bytes(word));
        }
        for (i, d) in dst.iter_mut().enumerate().skip(n) {
            *d = minv.add_from_u64(read_code(buf, i, bits));
        }
        return;
    }
    for (i, d) in dst.iter_mut().enumerate() {
        *d = minv.add_from_u64(read_code(buf, i, bits));
    }
}

/// Loads 8 bytes as big-endian word, zero-padded on the right.
#[inline(always)]
pub(crate) fn load_be_u64(buf: &[u8], pos: usize) -> u64 {
    let tail = buf.get(pos..).unwrap_or(&[]);
    match tail.first_chunk::<8>() {
        Some(b) => u64::from_be_bytes(*b),
        None => {
            let mut word = [0u8; 8];
            word[..tail.len()].copy_from_slice(tail);
            u64::from_be_bytes(word)
        }
    }
}

/// Extracts code of value at index.
#[inline(always)]
pub(crate) fn read_code(buf: &[u8], index: usize, bits: u8) -> u64 {
    let bit = index * bits as usize;
    let pos = bit >> 3;
    let lead = (bit & 7) as u32;
    let bits = bits as u32;
    let code = (load_be_u64(buf, pos) << lead) >> (64 - bits);
    if lead + bits <= 64 {
        code
    } else {
        let extra = lead + bits - 64;
        code | (buf.get(pos + 8).copied().unwrap_or(0) >> (8 - extra)) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::bitpacking::{encode, packed_len};
    use crate::error::Error;

    #[test]
    fn test_decode_7bits() {
        let buf = [0b0000_0010, 0b0000_1000, 0b0001_1111, 0b1111_0000];
        let mut dst = [0u8; 4];
        assert_eq!(decode(&mut dst, &buf, 7, 0).unwrap(), 4);
        assert_eq!(dst, [1, 2, 3, 127]);

        let mut dst = [0i16; 4];
        decode(&mut dst, &buf, 7, -100).unwrap();
        assert_eq!(dst, [-99, -98, -97, 27]);
    }

    #[test]
    fn test_decode_invalid_width() {
        let mut dst = [0u32; 2];
        assert_eq!(decode(&mut dst, &[0u8; 16], 0, 0), Err(Error::InvalidBitWidth(0)));
        assert_eq!(decode(&mut dst, &[0u8; 16], 65, 0), Err(Error::InvalidBitWidth(65)));
        assert_eq!(decode(&mut [] as &mut [u32], &[], 3, 0), Ok(0));
    }

    #[test]
    fn test_decode_wide() {
        let v: Vec<u64> = (0..100).map(|i| u64::MAX - i * 0x0101_0101_0101).collect();
        let min = *v.iter().min().unwrap();
        let (buf, bits) = encode(&v, min, u64::MAX);
        assert!(bits < 64);
        let mut dst = vec![0u64; v.len()];
        decode(&mut dst, &buf, bits, min).unwrap();
        assert_eq!(dst, v);

        let (buf, bits) = encode(&v, 0, u64::MAX);
        assert_eq!(bits, 64);
        let mut dst = vec![0u64; v.len()];
        decode(&mut dst, &buf, bits, 0).unwrap();
        assert_eq!(dst, v);
    }

    #[test]
    fn test_load_short_tail() {
        let buf = [0x12, 0x34, 0x56];
        assert_eq!(load_be_u64(&buf, 0), 0x1234_5600_0000_0000);
        assert_eq!(load_be_u64(&buf, 2), 0x5600_0000_0000_0000);
        assert_eq!(load_be_u64(&buf, 3), 0);
        assert_eq!(load_be_u64(&buf, 10), 0);
    }

    #[test]
    fn test_read_code_at_buffer_end() {
        // trailing values are read with fewer than 8 bytes left
        for bits in 1..=64u8 {
            let n = 17;
            let v: Vec<u64> = (0..n as u64).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15) >> (64 - bits)).collect();
            let max = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
            let (buf, b) = encode(&v, 0, max);
            assert_eq!(b, bits);
            assert_eq!(buf.len(), packed_len(n, bits));
            for (i, x) in v.iter().enumerate() {
                assert_eq!(read_code(&buf, i, bits), *x);
            }
        }
    }
}
