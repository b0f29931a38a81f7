//! Multi-threaded GEMM.
//!
//! Wraps the blocked GEMM with parallel execution across column panels.
//! Panels write disjoint parts of C, so workers never need a lock. Thread
//! count adapts to problem size: small problems run on one worker.

pub mod gemm_4x4_mt;
