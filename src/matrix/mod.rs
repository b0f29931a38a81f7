//! Naive matrix multiplication.
//!
//! Provides the correctness baseline the blocked SIMD engine is checked
//! against.

pub mod reference;
