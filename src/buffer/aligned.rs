//! Heap buffer of f32 whose base address is a multiple of the vector width.

use crate::error::{KernelError, Result};
use crate::simd::{ALIGNMENT, LANES};
use std::alloc::{self, Layout};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// One vector register worth of floats. Only used to get a well-aligned
/// dangling pointer for empty buffers.
#[repr(C, align(16))]
struct Lane([f32; LANES]);

const _: () = assert!(std::mem::align_of::<Lane>() == ALIGNMENT);

/// Owns `len` contiguous f32 values aligned to [`ALIGNMENT`] bytes.
///
/// Cloning allocates a new block and copies the contents. Moving the value
/// transfers ownership; [`AlignedBuffer::take`] does the same through a
/// `&mut` and leaves an empty buffer behind. Memory is released exactly once,
/// on drop, and dropping an empty buffer does nothing.
pub struct AlignedBuffer {
    ptr: NonNull<f32>,
    len: usize,
}

// SAFETY: the buffer uniquely owns its allocation, like a Vec<f32>.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

fn layout_for(len: usize) -> Result<Layout> {
    Layout::array::<f32>(len)
        .and_then(|l| l.align_to(ALIGNMENT))
        .map_err(|_| KernelError::Allocation {
            len,
            align: ALIGNMENT,
        })
}

impl AlignedBuffer {
    /// An empty buffer. Does not allocate.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::<Lane>::dangling().cast::<f32>(),
            len: 0,
        }
    }

    /// Allocate `len` zero-initialized floats.
    ///
    /// Fails with [`KernelError::Allocation`] if the size overflows or the
    /// allocator returns null. There is no retry.
    pub fn zeroed(len: usize) -> Result<Self> {
        if len == 0 {
            return Ok(Self::new());
        }

        let layout = layout_for(len)?;
        // SAFETY: layout has non-zero size since len > 0.
        let raw = unsafe { alloc::alloc_zeroed(layout) } as *mut f32;
        let ptr = NonNull::new(raw).ok_or(KernelError::Allocation {
            len,
            align: ALIGNMENT,
        })?;

        Ok(Self { ptr, len })
    }

    /// Allocate a buffer holding a copy of `src`.
    pub fn from_slice(src: &[f32]) -> Result<Self> {
        let mut buf = Self::zeroed(src.len())?;
        buf.copy_from_slice(src);
        Ok(buf)
    }

    /// Deep copy that reports allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        Self::from_slice(self)
    }

    /// Move the contents out, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut f32 {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[f32] {
        // SAFETY: ptr is valid for len reads (or dangling and aligned with len == 0).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        // SAFETY: as above, and &mut self gives exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Default for AlignedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        if let Ok(layout) = layout_for(self.len) {
            // SAFETY: ptr came from alloc_zeroed with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
        self.len = 0;
    }
}

impl Clone for AlignedBuffer {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            // The layout was valid for `self`, so only the allocator can have failed.
            Err(_) => alloc::handle_alloc_error(
                layout_for(self.len).unwrap_or(Layout::new::<Lane>()),
            ),
        }
    }
}

impl Deref for AlignedBuffer {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        self.as_slice()
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut [f32] {
        self.as_mut_slice()
    }
}

impl PartialEq for AlignedBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 10;
        let shown = &self.as_slice()[..self.len.min(PREVIEW)];
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("head", &shown)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_aligned(ptr: *const f32) -> bool {
        (ptr as usize) % ALIGNMENT == 0
    }

    #[test]
    fn test_alignment_and_zeroed() {
        for n in [0, 1, 3, 10, 17, 1024, 100_003] {
            let buf = AlignedBuffer::zeroed(n).unwrap();
            assert!(is_aligned(buf.as_ptr()), "size {} not aligned", n);
            assert_eq!(buf.len(), n);
            assert!(buf.iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = AlignedBuffer::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let b = a.clone();
        assert_ne!(a.as_ptr(), b.as_ptr());
        assert!(is_aligned(b.as_ptr()));

        a[0] = 42.0;
        assert_eq!(b[0], 1.0);
        assert_eq!(&b[..], &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_take_leaves_empty() {
        let mut a = AlignedBuffer::from_slice(&[7.0; 9]).unwrap();
        let ptr = a.as_ptr();

        let b = a.take();
        assert!(a.is_empty());
        assert_eq!(b.as_ptr(), ptr);
        assert_eq!(b.len(), 9);

        // dropping both must free the block exactly once
        drop(a);
        drop(b);
    }

    #[test]
    fn test_empty_buffer() {
        let empty = AlignedBuffer::new();
        assert!(empty.is_empty());
        assert!(is_aligned(empty.as_ptr()));
        assert_eq!(empty.as_slice(), &[] as &[f32]);
        assert_eq!(empty.clone(), AlignedBuffer::default());
    }

    #[test]
    fn test_overflow_is_allocation_error() {
        let err = AlignedBuffer::zeroed(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            KernelError::Allocation {
                len: usize::MAX,
                align: ALIGNMENT
            }
        );
    }

    #[test]
    fn test_debug_preview() {
        let buf = AlignedBuffer::zeroed(32).unwrap();
        let s = format!("{:?}", buf);
        assert!(s.contains("len: 32"));
    }
}
