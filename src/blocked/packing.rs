//! Packing: copy sub-matrices of A and B into the layout the 4×4 kernel reads.
//!
//! A is packed depth-major in strips of 4 rows: for each depth step the 4
//! row values sit next to each other, so the kernel broadcasts them one by
//! one walking forward through memory.
//!
//! ```text
//! A strip (4 × depth, row-major)     packed
//! a00 a01 a02 ...                    a00 a10 a20 a30 | a01 a11 a21 a31 | ...
//! a10 a11 a12 ...
//! a20 a21 a22 ...
//! a30 a31 a32 ...
//! ```
//!
//! B is packed as one 4-wide row per depth step, i.e. exactly one vector
//! load per step. Rows or columns past the edge of the matrix are written
//! as zeros, so the kernel always sees a full 4×4 problem and never reads
//! outside A or B.

use crate::config::{MR, NR};

/// Pack one strip of up to [`MR`] rows of A.
///
/// * `depth` - Number of columns (depth steps) to pack
/// * `a` - A, starting at the strip's top-left element
/// * `lda` - Row stride of A
/// * `rows` - Valid rows in this strip (1..=MR); the rest are zero-filled
/// * `out` - Destination, at least `depth * MR` floats
#[allow(clippy::identity_op)]
#[allow(clippy::erasing_op)]
pub fn pack_a(depth: usize, a: &[f32], lda: usize, rows: usize, out: &mut [f32]) {
    debug_assert!(rows <= MR);
    let out = &mut out[..depth * MR];

    if rows == MR {
        for (p, dst) in out.chunks_exact_mut(MR).enumerate() {
            dst[0] = a[0 * lda + p];
            dst[1] = a[1 * lda + p];
            dst[2] = a[2 * lda + p];
            dst[3] = a[3 * lda + p];
        }
    } else {
        for (p, dst) in out.chunks_exact_mut(MR).enumerate() {
            for (i, slot) in dst.iter_mut().enumerate() {
                *slot = if i < rows { a[i * lda + p] } else { 0.0 };
            }
        }
    }
}

/// Pack a whole row block of A (`rows` rows) as consecutive [`MR`]-row strips.
///
/// Strip `s` lands at `out[s * MR * depth..]`, so the kernel for rows
/// `ir..ir + MR` of the block reads from `out[ir * depth..]`.
pub fn pack_a_block(depth: usize, a: &[f32], lda: usize, rows: usize, out: &mut [f32]) {
    for ir in (0..rows).step_by(MR) {
        let strip_rows = MR.min(rows - ir);
        pack_a(
            depth,
            &a[ir * lda..],
            lda,
            strip_rows,
            &mut out[ir * depth..(ir + MR) * depth],
        );
    }
}

/// Pack one strip of up to [`NR`] columns of B.
///
/// * `depth` - Number of rows (depth steps) to pack
/// * `b` - B, starting at the strip's top-left element
/// * `ldb` - Row stride of B
/// * `cols` - Valid columns in this strip (1..=NR); the rest are zero-filled
/// * `out` - Destination, at least `depth * NR` floats
pub fn pack_b(depth: usize, b: &[f32], ldb: usize, cols: usize, out: &mut [f32]) {
    debug_assert!(cols <= NR);
    let out = &mut out[..depth * NR];

    for (p, dst) in out.chunks_exact_mut(NR).enumerate() {
        let row = &b[p * ldb..p * ldb + cols];
        dst[..cols].copy_from_slice(row);
        dst[cols..].fill(0.0);
    }
}
