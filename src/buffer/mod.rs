//! Aligned memory for vectors, matrices and pack buffers.
//!
//! Everything that needs SIMD-friendly storage goes through
//! [`AlignedBuffer`]. The free functions mirror an allocator service:
//! ask for N aligned zeroed floats, hand the buffer back when done.

pub mod aligned;

pub use aligned::AlignedBuffer;

use crate::error::Result;

/// Allocate `n` zeroed floats aligned to the vector width.
pub fn allocate(n: usize) -> Result<AlignedBuffer> {
    AlignedBuffer::zeroed(n)
}

/// Release a buffer obtained from [`allocate`].
pub fn deallocate(buffer: AlignedBuffer) {
    drop(buffer);
}
