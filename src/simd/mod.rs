//! Lane-width strategy.
//!
//! Every kernel in this crate works on 4-wide f32 vectors. A [`Backend`]
//! names the instruction set used to execute them: a portable scalar
//! version that emulates the four lanes with arrays, SSE2 / SSE+FMA on
//! x86_64, and NEON on aarch64. The blocking and packing code never looks
//! at which one is active; it just calls through the function pointers the
//! backend hands out.

use crate::error::KernelError;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Number of f32 lanes in one vector register.
pub const LANES: usize = 4;

/// Alignment in bytes of one vector register (4 × f32).
pub const ALIGNMENT: usize = LANES * std::mem::size_of::<f32>();

/// Instruction set used by the micro-kernel and the dot product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Plain Rust, four lanes emulated with arrays.
    Scalar,
    /// SSE2 (baseline on x86_64), multiply then add.
    Sse2,
    /// SSE with fused multiply-add.
    Fma,
    /// ARM NEON (baseline on aarch64).
    Neon,
}

impl Backend {
    /// All backends, best first.
    pub const ALL: [Backend; 4] = [Backend::Fma, Backend::Neon, Backend::Sse2, Backend::Scalar];

    /// Detect the best available backend at runtime.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("fma") {
                return Backend::Fma;
            }
            // SSE2 is always available on x86-64
            Backend::Sse2
        }

        #[cfg(target_arch = "aarch64")]
        {
            Backend::Neon
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Backend::Scalar
        }
    }

    /// Whether this backend can run on the current CPU.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Scalar => true,
            #[cfg(target_arch = "x86_64")]
            Backend::Sse2 => true,
            #[cfg(target_arch = "x86_64")]
            Backend::Fma => is_x86_feature_detected!("fma"),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => true,
            _ => false,
        }
    }

    /// Backends that can run here, best first.
    pub fn available() -> Vec<Backend> {
        Self::ALL.into_iter().filter(|b| b.is_available()).collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Sse2 => "sse2",
            Backend::Fma => "fma",
            Backend::Neon => "neon",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(Backend::Scalar),
            "sse2" => Ok(Backend::Sse2),
            "fma" => Ok(Backend::Fma),
            "neon" => Ok(Backend::Neon),
            other => Err(KernelError::InvalidConfig(format!(
                "unknown backend '{other}'"
            ))),
        }
    }
}

static BACKEND: OnceLock<Backend> = OnceLock::new();

/// The detected backend (cached after the first call).
pub fn backend() -> Backend {
    *BACKEND.get_or_init(|| {
        let detected = Backend::detect();
        log::debug!("detected SIMD backend: {detected}");
        detected
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_available() {
        let level = Backend::detect();
        assert!(level.is_available());

        #[cfg(target_arch = "x86_64")]
        assert!(matches!(level, Backend::Sse2 | Backend::Fma));

        #[cfg(target_arch = "aarch64")]
        assert_eq!(level, Backend::Neon);
    }

    #[test]
    fn test_scalar_always_available() {
        assert!(Backend::Scalar.is_available());
        assert!(Backend::available().contains(&Backend::Scalar));
    }

    #[test]
    fn test_available_excludes_other_arch() {
        #[cfg(target_arch = "x86_64")]
        assert!(!Backend::Neon.is_available());

        #[cfg(target_arch = "aarch64")]
        {
            assert!(!Backend::Sse2.is_available());
            assert!(!Backend::Fma.is_available());
        }
    }

    #[test]
    fn test_parse_and_display() {
        for b in Backend::ALL {
            assert_eq!(b.to_string().parse::<Backend>(), Ok(b));
        }
        assert_eq!(" NEON ".parse::<Backend>(), Ok(Backend::Neon));
        assert!("avx9000".parse::<Backend>().is_err());
    }

    #[test]
    fn test_alignment() {
        assert_eq!(LANES, 4);
        assert_eq!(ALIGNMENT, 16);
    }

    #[test]
    fn test_backend_cached() {
        assert_eq!(backend(), backend());
    }
}
