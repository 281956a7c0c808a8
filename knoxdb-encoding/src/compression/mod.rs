//! Compression algorithms.
//!
//! This module includes compression algorithms used by column blocks.
//! Lightweight columnar compression is supposed to be enough, e.g.
//! FOR+bitpacking, which also supports predicate evaluation without
//! decompression.
pub mod bitpacking;
