#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// nonlinear (anisotropic) diffusion module.
pub mod diffusion;

/// image filtering module.
pub mod filter;

/// module containing parallization utilities.
pub mod parallel;
