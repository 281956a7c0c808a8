use super::BitPackable;
use super::cursor::{bit_width, packed_len};
use super::pack::encode_into;
use crate::conf::BitpackConfig;

/// Reusable output buffer of packing, owned by caller.
///
/// Capacity above the retain limit is released by [`PackScratch::release`].
#[derive(Debug, Default)]
pub struct PackScratch {
    buf: Vec<u8>,
    retain: usize,
}

impl PackScratch {
    #[inline]
    pub fn new(retain: usize) -> Self {
        PackScratch {
            buf: Vec::new(),
            retain,
        }
    }

    #[inline]
    pub fn with_config(config: &BitpackConfig) -> Self {
        Self::new(config.scratch_retain_bytes())
    }

    /// Packs values into scratch buffer.
    /// Returns packed bytes and bit width.
    #[inline]
    pub fn encode<T: BitPackable>(&mut self, values: &[T], minv: T, maxv: T) -> (&[u8], u8) {
        let len = packed_len(values.len(), bit_width(maxv.sub_to_u64(minv)));
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }
        let (len, bits) = encode_into(&mut self.buf, values, minv, maxv);
        (&self.buf[..len], bits)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Shrinks buffer to retain limit.
    #[inline]
    pub fn release(&mut self) {
        if self.buf.capacity() > self.retain {
            log::debug!(
                "release pack scratch from {} to {} bytes",
                self.buf.capacity(),
                self.retain
            );
            self.buf.truncate(self.retain);
            self.buf.shrink_to(self.retain);
        }
    }
}
