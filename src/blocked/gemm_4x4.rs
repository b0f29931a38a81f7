//! 4×4 blocked GEMM: the loop nest for one worker.

use crate::blocked::packing::{pack_a_block, pack_b};
use crate::blocked::tile::Tile;
use crate::buffer::AlignedBuffer;
use crate::config::{BlockConfig, MR, NR};
use crate::error::Result;
use crate::kernels::MicroKernel;

/// Scratch space for packed panels. One per worker, never shared.
pub struct PackBuffers {
    a: AlignedBuffer,
    b: AlignedBuffer,
}

impl PackBuffers {
    /// Room for one A row block and one B strip of an `m`×`k` A.
    ///
    /// Capped at `mc * kc` and `kc * NR`, and shrunk to the problem when it
    /// is smaller than one block. Rows are rounded up to [`MR`] for the
    /// zero-padded last strip.
    pub fn new(blocks: &BlockConfig, m: usize, k: usize) -> Result<Self> {
        let rows = blocks.mc().min(m.next_multiple_of(MR));
        let depth = blocks.kc().min(k);
        Ok(Self {
            a: AlignedBuffer::zeroed(rows * depth)?,
            b: AlignedBuffer::zeroed(depth * NR)?,
        })
    }
}

/// Cache-blocked C += A * B over the columns `col_start..col_end` of C.
///
/// Loop order, outer to inner:
/// - column panels of width `nc`
/// - depth blocks of `kc`: every block adds into the same part of C, which
///   is why the kernel accumulates
/// - row blocks of `mc`: A is packed once here and reused for every strip
///   of the panel
/// - column strips of `NR`: B packed once, reused for every row strip
/// - row strips of `MR`: one kernel call
///
/// Full 4×4 tiles are written straight into C. Tiles hanging over the
/// bottom or right edge go through a zeroed 4×4 scratch tile and only the
/// valid part is added into C, so the kernel shape never changes.
///
/// # Safety
///
/// Caller must ensure:
/// - `a.len() == m * k`, `b.len() == k * n`
/// - `c` is valid for reads and writes of `m * n` f32 (row stride `n`)
/// - `kernel` can run on this CPU
/// - `packs` came from `PackBuffers::new` with this `m` and `k` (or larger)
/// - no one else accesses columns `col_start..col_end` of C during the call
///
/// # Arguments
///
/// * `col_start`, `col_end` - Column range of C owned by this worker
#[allow(unsafe_op_in_unsafe_fn)]
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm_blocked_4x4(
    kernel: MicroKernel,
    blocks: &BlockConfig,
    packs: &mut PackBuffers,
    a: &[f32],
    b: &[f32],
    c: *mut f32,
    m: usize,
    n: usize,
    k: usize,
    col_start: usize,
    col_end: usize,
) {
    let (mc, kc, nc) = (blocks.mc(), blocks.kc(), blocks.nc());

    for jc in (col_start..col_end).step_by(nc) {
        let nc_cur = nc.min(col_end - jc);

        for pc in (0..k).step_by(kc) {
            let kc_cur = kc.min(k - pc);

            for ic in (0..m).step_by(mc) {
                let mc_cur = mc.min(m - ic);

                // Pack the whole row block once, reuse it for every strip of the panel
                pack_a_block(kc_cur, &a[ic * k + pc..], k, mc_cur, &mut packs.a);

                for jr in (0..nc_cur).step_by(NR) {
                    let col = jc + jr;
                    let cols = NR.min(nc_cur - jr);

                    pack_b(kc_cur, &b[pc * n + col..], n, cols, &mut packs.b);

                    for ir in (0..mc_cur).step_by(MR) {
                        let tile = Tile::new(ic + ir, col, MR.min(mc_cur - ir), cols);
                        let a_strip = packs.a.as_ptr().add(ir * kc_cur);

                        if tile.is_interior() {
                            kernel(
                                a_strip,
                                packs.b.as_ptr(),
                                c.add(tile.row * n + tile.col),
                                kc_cur,
                                n,
                            );
                        } else {
                            let mut scratch = [0.0f32; MR * NR];
                            kernel(a_strip, packs.b.as_ptr(), scratch.as_mut_ptr(), kc_cur, NR);
                            tile.add_into(&scratch, c, n);
                        }
                    }
                }
            }
        }
    }
}
