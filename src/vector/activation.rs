use crate::error::{Result, check_len};
use crate::simd::LANES;
use rayon::prelude::*;

/// Inputs shorter than this are done on the calling thread.
const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Elements per parallel task. A multiple of the lane width.
const CHUNK: usize = 1 << 14;

/// ReLU: `dst[i] = max(src[i], 0)`.
///
/// NaN inputs stay NaN.
///
/// Large inputs are cut into lane-aligned chunks and processed in parallel;
/// the chunks don't overlap, so no synchronization is needed.
pub fn relu(src: &[f32], dst: &mut [f32]) -> Result<()> {
    check_len("relu", src.len(), dst.len())?;

    if src.len() < PARALLEL_THRESHOLD {
        relu_chunk(src, dst);
        return Ok(());
    }

    dst.par_chunks_mut(CHUNK)
        .zip(src.par_chunks(CHUNK))
        .for_each(|(d, s)| relu_chunk(s, d));
    Ok(())
}

fn relu_chunk(src: &[f32], dst: &mut [f32]) {
    let mut out = dst.chunks_exact_mut(LANES);
    let mut input = src.chunks_exact(LANES);
    for (d, s) in (&mut out).zip(&mut input) {
        d[0] = relu_one(s[0]);
        d[1] = relu_one(s[1]);
        d[2] = relu_one(s[2]);
        d[3] = relu_one(s[3]);
    }

    // Tail
    for (d, &s) in out.into_remainder().iter_mut().zip(input.remainder()) {
        *d = relu_one(s);
    }
}

// `f32::max` would turn NaN into 0
#[inline(always)]
fn relu_one(x: f32) -> f32 {
    if x < 0.0 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_small() {
        let src = [-2.0, -0.5, 0.0, 0.5, 3.0, -1.0, 7.0];
        let mut dst = [9.0; 7];

        relu(&src, &mut dst).unwrap();
        assert_eq!(dst, [0.0, 0.0, 0.0, 0.5, 3.0, 0.0, 7.0]);
    }

    #[test]
    fn test_relu_parallel_path() {
        let n = PARALLEL_THRESHOLD * 2 + 3;
        let src: Vec<f32> = (0..n).map(|i| i as f32 - (n / 2) as f32).collect();
        let mut dst = vec![0.0; n];

        relu(&src, &mut dst).unwrap();
        for i in 0..n {
            assert_eq!(dst[i], src[i].max(0.0), "index {}", i);
        }
    }

    #[test]
    fn test_relu_keeps_nan() {
        let src = [f32::NAN, -1.0, 2.0];
        let mut dst = [9.0; 3];

        relu(&src, &mut dst).unwrap();
        assert!(dst[0].is_nan());
        assert_eq!(&dst[1..], &[0.0, 2.0]);
    }

    #[test]
    fn test_relu_keeps_nan_parallel_path() {
        let n = PARALLEL_THRESHOLD + 5;
        let mut src: Vec<f32> = (0..n).map(|i| if i % 2 == 0 { -1.0 } else { 2.0 }).collect();
        // One NaN in a full lane group, one in the tail
        src[CHUNK + 1] = f32::NAN;
        src[n - 1] = f32::NAN;
        let mut dst = vec![0.0; n];

        relu(&src, &mut dst).unwrap();
        for i in 0..n {
            if src[i].is_nan() {
                assert!(dst[i].is_nan(), "index {}", i);
            } else {
                assert_eq!(dst[i], src[i].max(0.0), "index {}", i);
            }
        }
    }

    #[test]
    fn test_relu_mismatch() {
        let mut dst = [0.0; 2];
        assert!(relu(&[1.0; 3], &mut dst).is_err());
    }
}
