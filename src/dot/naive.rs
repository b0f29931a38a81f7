use crate::error::{Result, check_len};

/// Dot product with a single scalar accumulator, summed left to right.
///
/// This is the baseline the unrolled SIMD versions are compared against.
///
/// # Errors
///
/// [`KernelError::DimensionMismatch`](crate::KernelError::DimensionMismatch)
/// if the lengths differ.
pub fn dot_naive(a: &[f32], b: &[f32]) -> Result<f32> {
    check_len("dot_naive", a.len(), b.len())?;

    let mut sum = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        sum += x * y;
    }
    Ok(sum)
}
