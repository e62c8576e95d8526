#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Numeric sample types and the cast applied between them.
pub mod dtype;

/// Error types for the image module.
pub mod error;

/// image representation for computer vision purposes.
pub mod image;

/// Elementwise image operations.
pub mod ops;

pub use crate::dtype::ImageDtype;
pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
