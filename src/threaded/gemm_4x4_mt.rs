//! Multi-threaded 4×4 blocked GEMM.

use crate::blocked::gemm_4x4::{PackBuffers, gemm_blocked_4x4};
use crate::config::GemmConfig;
use crate::error::Result;
use crate::kernels::micro_kernel;
use std::ops::Range;

/// Below this many flops a single worker is faster than waking the pool.
const SINGLE_THREAD_THRESHOLD: f64 = 1_000_000.0;

/// Multi-threaded C += A * B using the 4×4 kernel.
///
/// Column panels of width `nc` write disjoint columns of C, so they are
/// split into contiguous ranges, one per worker, with no locking. Each
/// worker allocates its own pack buffers and runs the blocked loop nest on
/// its range to completion; the call returns once every worker has joined.
/// Worker count is capped by `config.threads()`, by the panel count, and
/// drops to one for small problems.
///
/// # Panics
///
/// Panics if the slice sizes don't match m, n, k.
pub fn gemm_4x4_mt(
    config: &GemmConfig,
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
) -> Result<()> {
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);

    if m == 0 || n == 0 || k == 0 {
        return Ok(());
    }

    let blocks = config.blocks();
    let kernel = micro_kernel(config.backend());
    let panels = n.div_ceil(blocks.nc());
    let workers = choose_thread_count(m, n, k, panels, config.threads());

    log::debug!(
        "gemm {}x{}x{}: {} panels of {} columns on {} worker(s), backend {}",
        m,
        n,
        k,
        panels,
        blocks.nc(),
        workers,
        config.backend()
    );

    if workers == 1 {
        let mut packs = PackBuffers::new(blocks, m, k)?;
        // SAFETY: lengths checked above, backend validated by GemmConfig,
        // and we hold the only reference to C.
        unsafe {
            gemm_blocked_4x4(kernel, blocks, &mut packs, a, b, c.as_mut_ptr(), m, n, k, 0, n);
        }
        return Ok(());
    }

    let ranges = column_ranges(panels, workers, blocks.nc(), n);
    let mut results: Vec<Result<()>> = vec![Ok(()); ranges.len()];
    let c_ptr = c.as_mut_ptr() as usize;

    rayon::scope(|s| {
        for (slot, cols) in results.iter_mut().zip(ranges) {
            s.spawn(move |_| {
                log::trace!("worker columns {:?}", cols);
                *slot = PackBuffers::new(blocks, m, k).map(|mut packs| {
                    // SAFETY: column ranges are disjoint, so no two workers
                    // touch the same element of C; `c` outlives the scope.
                    unsafe {
                        let c_base = c_ptr as *mut f32;
                        gemm_blocked_4x4(
                            kernel, blocks, &mut packs, a, b, c_base, m, n, k, cols.start, cols.end,
                        );
                    }
                });
            });
        }
    });

    results.into_iter().collect()
}

fn choose_thread_count(m: usize, n: usize, k: usize, panels: usize, max_threads: usize) -> usize {
    let flops = 2.0 * m as f64 * n as f64 * k as f64;

    if flops < SINGLE_THREAD_THRESHOLD {
        return 1;
    }

    max_threads.min(panels).max(1)
}

/// Split `panels` column panels into `workers` contiguous groups whose sizes
/// differ by at most one, as column ranges clipped to `n`.
fn column_ranges(panels: usize, workers: usize, nc: usize, n: usize) -> Vec<Range<usize>> {
    let base = panels / workers;
    let extra = panels % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut first = 0;
    for w in 0..workers {
        let count = base + usize::from(w < extra);
        if count == 0 {
            continue;
        }
        let start = first * nc;
        let end = ((first + count) * nc).min(n);
        ranges.push(start..end);
        first += count;
    }
    ranges
}
