//! Filter operations
//!
//! Border handling, the kernel applicator and the gradient filters built on it.

mod border;
pub use border::BorderMode;

mod convolution;
pub use convolution::*;

mod gradient;
pub use gradient::*;

mod kernel;
pub use kernel::{Kernel, KernelScalar};

/// Filter kernels
pub mod kernels;
