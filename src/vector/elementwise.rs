//! Elementwise arithmetic: `out[i] = a[i] op b[i]`.
//!
//! Main loop works on 4-lane chunks, the last 0-3 elements are done one by
//! one. All operands must have the same length.

use crate::error::{Result, check_len};
use crate::simd::LANES;

fn zip_with<F>(op: &'static str, a: &[f32], b: &[f32], out: &mut [f32], f: F) -> Result<()>
where
    F: Fn(f32, f32) -> f32,
{
    check_len(op, a.len(), b.len())?;
    check_len(op, a.len(), out.len())?;

    let mut dst = out.chunks_exact_mut(LANES);
    let mut xs = a.chunks_exact(LANES);
    let mut ys = b.chunks_exact(LANES);

    for ((d, x), y) in (&mut dst).zip(&mut xs).zip(&mut ys) {
        d[0] = f(x[0], y[0]);
        d[1] = f(x[1], y[1]);
        d[2] = f(x[2], y[2]);
        d[3] = f(x[3], y[3]);
    }

    for ((d, &x), &y) in dst
        .into_remainder()
        .iter_mut()
        .zip(xs.remainder())
        .zip(ys.remainder())
    {
        *d = f(x, y);
    }
    Ok(())
}

/// `out = a + b`
pub fn add(a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
    zip_with("add", a, b, out, |x, y| x + y)
}

/// `out = a - b`
pub fn sub(a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
    zip_with("sub", a, b, out, |x, y| x - y)
}

/// `out = a * b`, elementwise.
pub fn mul(a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
    zip_with("mul", a, b, out, |x, y| x * y)
}

/// `out = a * scalar`
pub fn scalar_mul(a: &[f32], scalar: f32, out: &mut [f32]) -> Result<()> {
    check_len("scalar_mul", a.len(), out.len())?;

    let mut dst = out.chunks_exact_mut(LANES);
    let mut xs = a.chunks_exact(LANES);
    for (d, x) in (&mut dst).zip(&mut xs) {
        d[0] = x[0] * scalar;
        d[1] = x[1] * scalar;
        d[2] = x[2] * scalar;
        d[3] = x[3] * scalar;
    }
    for (d, &x) in dst.into_remainder().iter_mut().zip(xs.remainder()) {
        *d = x * scalar;
    }
    Ok(())
}
