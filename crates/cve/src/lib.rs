#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use cve_image as image;

#[doc(inline)]
pub use cve_imgproc as imgproc;

#[doc(inline)]
pub use cve_io as io;
