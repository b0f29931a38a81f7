//! Blocking and threading parameters for the GEMM engine.

use crate::error::{KernelError, Result};
use crate::simd::{self, Backend, LANES};

/// Micro-tile height: rows of C produced by one kernel call.
pub const MR: usize = LANES;

/// Micro-tile width: columns of C produced by one kernel call. One vector.
pub const NR: usize = LANES;

/// Cache blocking sizes.
///
/// - `mc` rows of A are packed at once and reused across a whole column panel.
/// - `kc` is the depth of every packed panel. Larger values mean fewer passes
///   over C but a bigger working set (`mc * kc + kc * NR` floats).
/// - `nc` is the width of a column panel, the unit of parallel work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConfig {
    mc: usize,
    kc: usize,
    nc: usize,
}

impl BlockConfig {
    pub const DEFAULT: Self = Self {
        mc: 256,
        kc: 128,
        nc: 128,
    };

    /// Create and validate block sizes.
    ///
    /// All sizes must be non-zero, `mc` a multiple of [`MR`] and `nc` a
    /// multiple of [`NR`].
    pub fn new(mc: usize, kc: usize, nc: usize) -> Result<Self> {
        if mc == 0 || kc == 0 || nc == 0 {
            return Err(KernelError::InvalidConfig(format!(
                "block sizes must be non-zero (mc={mc}, kc={kc}, nc={nc})"
            )));
        }
        if !mc.is_multiple_of(MR) {
            return Err(KernelError::InvalidConfig(format!(
                "mc={mc} must be a multiple of {MR}"
            )));
        }
        if !nc.is_multiple_of(NR) {
            return Err(KernelError::InvalidConfig(format!(
                "nc={nc} must be a multiple of {NR}"
            )));
        }
        Ok(Self { mc, kc, nc })
    }

    pub fn mc(&self) -> usize {
        self.mc
    }

    pub fn kc(&self) -> usize {
        self.kc
    }

    pub fn nc(&self) -> usize {
        self.nc
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything a GEMM call needs to know besides the operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemmConfig {
    blocks: BlockConfig,
    threads: Option<usize>,
    backend: Backend,
}

impl GemmConfig {
    /// Default blocks, rayon's pool size, detected backend.
    pub fn new() -> Self {
        Self {
            blocks: BlockConfig::DEFAULT,
            threads: None,
            backend: simd::backend(),
        }
    }

    pub fn with_blocks(mut self, blocks: BlockConfig) -> Self {
        self.blocks = blocks;
        self
    }

    /// Cap the number of workers. Zero is rejected.
    pub fn with_threads(mut self, threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(KernelError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }
        self.threads = Some(threads);
        Ok(self)
    }

    /// Force a backend. Fails if this CPU can't run it.
    pub fn with_backend(mut self, backend: Backend) -> Result<Self> {
        if !backend.is_available() {
            return Err(KernelError::UnsupportedBackend(backend));
        }
        self.backend = backend;
        Ok(self)
    }

    /// Defaults overridden by `LANEMATH_MC`, `LANEMATH_KC`, `LANEMATH_NC`,
    /// `LANEMATH_THREADS` and `LANEMATH_BACKEND`.
    ///
    /// Values that don't parse are logged and ignored. A combination that
    /// parses but is invalid is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read_usize = |key: &str| -> Option<usize> {
            let raw = lookup(key)?;
            match raw.trim().parse::<usize>() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("ignoring {key}={raw:?}: not a number");
                    None
                }
            }
        };

        let defaults = BlockConfig::DEFAULT;
        let blocks = BlockConfig::new(
            read_usize("LANEMATH_MC").unwrap_or(defaults.mc),
            read_usize("LANEMATH_KC").unwrap_or(defaults.kc),
            read_usize("LANEMATH_NC").unwrap_or(defaults.nc),
        )?;

        let mut config = Self::new().with_blocks(blocks);

        if let Some(threads) = read_usize("LANEMATH_THREADS") {
            config = config.with_threads(threads)?;
        }

        if let Some(raw) = lookup("LANEMATH_BACKEND") {
            match raw.parse::<Backend>() {
                Ok(backend) => config = config.with_backend(backend)?,
                Err(err) => log::warn!("ignoring LANEMATH_BACKEND: {err}"),
            }
        }

        Ok(config)
    }

    pub fn blocks(&self) -> &BlockConfig {
        &self.blocks
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Worker cap: the configured value, or the size of rayon's pool.
    pub fn threads(&self) -> usize {
        self.threads.unwrap_or_else(rayon::current_num_threads)
    }
}

impl Default for GemmConfig {
    fn default() -> Self {
        Self::new()
    }
}
