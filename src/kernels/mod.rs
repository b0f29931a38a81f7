//! SIMD microkernels for the inner loop of matrix multiplication.
//!
//! Each kernel computes a 4×4 tile of C += A × B from packed panels. The
//! blocked driver asks [`micro_kernel`] for the variant matching its
//! [`Backend`] once per call and then only goes through the pointer.
//!
//! Available kernels (`kernel_4x4`):
//! - scalar: portable fallback
//! - SSE2 and SSE+FMA: x86_64
//! - NEON: aarch64

pub mod kernel_4x4;

use crate::simd::Backend;

/// `(a_pack, b_pack, c, k, ldc)`; see [`kernel_4x4`] for the contract.
pub type MicroKernel = unsafe fn(*const f32, *const f32, *mut f32, usize, usize);

/// The 4×4 kernel for `backend`.
///
/// Backends that don't exist on this architecture fall back to the scalar
/// kernel; [`GemmConfig`](crate::config::GemmConfig) never hands those out.
pub fn micro_kernel(backend: Backend) -> MicroKernel {
    match backend {
        #[cfg(target_arch = "x86_64")]
        Backend::Sse2 => kernel_4x4::kernel_4x4_sse2,
        #[cfg(target_arch = "x86_64")]
        Backend::Fma => kernel_4x4::kernel_4x4_fma,
        #[cfg(target_arch = "aarch64")]
        Backend::Neon => kernel_4x4::kernel_4x4_neon,
        _ => kernel_4x4::kernel_4x4_scalar,
    }
}
