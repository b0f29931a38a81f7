//! Output tile descriptors.

use crate::config::{MR, NR};

/// A micro-tile of C: origin plus how many of its MR×NR slots are inside
/// the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Tile {
    pub fn new(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        debug_assert!(rows <= MR && cols <= NR);
        Self {
            row,
            col,
            rows,
            cols,
        }
    }

    /// Full MR×NR tile that the kernel can write straight into C.
    pub fn is_interior(&self) -> bool {
        self.rows == MR && self.cols == NR
    }

    /// Add the valid part of an MR×NR scratch tile (stride NR) into C.
    ///
    /// # Safety
    ///
    /// `c` must be valid for reads and writes of row `self.row + r`,
    /// columns `self.col..self.col + self.cols`, stride `ldc`, for every
    /// `r < self.rows`.
    #[allow(unsafe_op_in_unsafe_fn)]
    pub unsafe fn add_into(&self, scratch: &[f32; MR * NR], c: *mut f32, ldc: usize) {
        for r in 0..self.rows {
            let dst = std::slice::from_raw_parts_mut(c.add((self.row + r) * ldc + self.col), self.cols);
            for (d, &s) in dst.iter_mut().zip(&scratch[r * NR..r * NR + self.cols]) {
                *d += s;
            }
        }
    }
}
