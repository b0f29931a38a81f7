/// Reference matrix multiplication: C = A * B.
///
/// Textbook i-j-k triple loop. Each output element is summed in a local
/// f32 with `p` ascending, then stored, so C is overwritten and the result
/// is bit-for-bit reproducible. Slow (B is walked with stride `n`) and only
/// meant as the correctness oracle for the optimized paths.
///
/// # Arguments
///
/// * `m` - Rows of A and C
/// * `n` - Columns of B and C
/// * `k` - Columns of A, rows of B
/// * `a` - Matrix A (m × k), row-major
/// * `b` - Matrix B (k × n), row-major
/// * `c` - Matrix C (m × n), row-major, overwritten
pub fn gemm_ref(m: usize, n: usize, k: usize, a: &[f32], b: &[f32], c: &mut [f32]) {
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}
