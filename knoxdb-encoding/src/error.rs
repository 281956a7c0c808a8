use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("invalid bit width {0}")]
    InvalidBitWidth(u8),
    #[error("invalid compressed data")]
    InvalidCompressedData,
    #[error("scan cancelled")]
    ScanCancelled,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl From<toml::de::Error> for Error {
    #[inline]
    fn from(src: toml::de::Error) -> Self {
        Error::InvalidConfig(src.message().to_string())
    }
}

/// Validates a bit width read from an enclosing format.
#[inline]
pub fn check_bit_width(bits: u8) -> Result<u8> {
    if bits == 0 || bits > 64 {
        return Err(Error::InvalidBitWidth(bits));
    }
    Ok(bits)
}
