//! # Momoto Compute
//!
//! Batch evaluation for the Momoto materials engine. The
//! [`ComputeBackend`](backend::ComputeBackend) trait keeps the physics in
//! `momoto-core` independent of how a batch of evaluations is scheduled.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Status |
//! |---------|-------------|--------|
//! | Serial | always | Implemented |
//! | CPU (Rayon) | `cpu` (default) | Implemented |
//!
//! Every backend returns results in input order.

pub mod backend;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use backend::{select_backend, BackendType, ComputeBackend, ComputeError, DeviceInfo, SerialBackend};

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;
