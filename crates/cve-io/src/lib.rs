#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access, header parsing and
/// sample decoding failures.
pub mod error;

/// Netpbm header parsing and sample decoding shared by the PGM and PPM codecs.
pub mod pnm;

/// Grayscale PGM (`P2`, `P5`) reading and `P5` writing.
pub mod pgm;

/// Color PPM (`P3`, `P6`) reading and `P6` writing.
pub mod ppm;

pub use crate::error::IoError;
