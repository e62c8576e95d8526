mod diffusivity;
pub use diffusivity::*;

mod filter;
pub use filter::{DiffusionFilter, DEFAULT_FLOW_FACTOR, DEFAULT_ITERATIONS};
