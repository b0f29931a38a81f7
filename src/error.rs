//! Error types for the compute kernels.

use crate::simd::Backend;
use thiserror::Error;

/// Errors that can occur in dot product, elementwise and configuration calls.
///
/// GEMM itself never returns these: shape compatibility is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// Operand lengths differ.
    #[error("{op}: dimension mismatch ({left} vs {right})")]
    DimensionMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },

    /// The allocator could not hand out an aligned block.
    #[error("failed to allocate {len} floats aligned to {align} bytes")]
    Allocation { len: usize, align: usize },

    /// Blocking or threading parameters are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested instruction set is not available on this CPU.
    #[error("backend {0} is not supported on this CPU")]
    UnsupportedBackend(Backend),
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Fails with [`KernelError::DimensionMismatch`] unless `left == right`.
pub(crate) fn check_len(op: &'static str, left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(KernelError::DimensionMismatch { op, left, right });
    }
    Ok(())
}
