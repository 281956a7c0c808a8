use crate::error::{Error, Result};
use byte_unit::Byte;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCAN_CHUNK_ROWS: usize = 64 * 1024;
pub const MIN_SCAN_CHUNK_ROWS: usize = 8;
pub const DEFAULT_SCRATCH_RETAIN: Byte = Byte::from_u64(1024 * 1024); // 1MB

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitpackConfig {
    // Number of rows scanned between two checks of the cancel flag.
    // Rounded down to multiple of 8.
    pub scan_chunk_rows: usize,
    // Capacity of pack scratch buffer kept after use.
    // Larger buffer is released.
    pub scratch_retain: Byte,
}

impl BitpackConfig {
    #[inline]
    pub fn scan_chunk_rows(mut self, scan_chunk_rows: usize) -> Self {
        self.scan_chunk_rows = scan_chunk_rows;
        self
    }

    #[inline]
    pub fn scratch_retain<T>(mut self, scratch_retain: T) -> Self
    where
        Byte: From<T>,
    {
        self.scratch_retain = Byte::from(scratch_retain);
        self
    }

    /// Chunk rows aligned to output bytes.
    #[inline]
    pub fn chunk_rows(&self) -> usize {
        (self.scan_chunk_rows & !7).max(MIN_SCAN_CHUNK_ROWS)
    }

    #[inline]
    pub fn scratch_retain_bytes(&self) -> usize {
        usize::try_from(self.scratch_retain.as_u64()).unwrap_or(usize::MAX)
    }

    /// Parses config in toml format. Missing fields use default values.
    pub fn from_toml(s: &str) -> Result<Self> {
        let conf: BitpackConfig = toml::from_str(s)?;
        if conf.scan_chunk_rows < MIN_SCAN_CHUNK_ROWS {
            return Err(Error::InvalidConfig(format!(
                "scan_chunk_rows must be at least {}, got {}",
                MIN_SCAN_CHUNK_ROWS, conf.scan_chunk_rows
            )));
        }
        Ok(conf)
    }
}

impl Default for BitpackConfig {
    #[inline]
    fn default() -> Self {
        BitpackConfig {
            scan_chunk_rows: DEFAULT_SCAN_CHUNK_ROWS,
            scratch_retain: DEFAULT_SCRATCH_RETAIN,
        }
    }
}
