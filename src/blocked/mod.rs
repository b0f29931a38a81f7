//! Cache-blocked GEMM.
//!
//! Breaks the multiplication into blocks that fit in L1/L2, packs A and B
//! for sequential access, then calls the 4×4 microkernel for the inner
//! computation.
//!
//! - `packing`: A/B panel layouts
//! - `tile`: boundary tiles and the scratch-tile scatter
//! - `gemm_4x4`: the loop nest for one worker

pub mod gemm_4x4;
pub mod packing;
pub mod tile;
