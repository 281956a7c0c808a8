pub mod bitset;
pub mod compression;
pub mod conf;
pub mod error;

pub mod prelude {
    pub use crate::bitset::*;
    pub use crate::compression::bitpacking::*;
    pub use crate::conf::*;
    pub use crate::error::*;
}
