//! Elementwise vector math and activations.
//!
//! Simple streaming operations built on the same 4-lane chunking as the
//! dot product. Each checks operand lengths before computing.

pub mod activation;
pub mod elementwise;

pub use activation::relu;
pub use elementwise::{add, mul, scalar_mul, sub};
