//! # Momoto Materials
//!
//! Optical-constant providers for the Momoto materials engine. Every data
//! source implements the [`MaterialProvider`](provider::MaterialProvider)
//! trait, which returns the complex refractive index $\tilde{n} = n + ik$ at
//! a given wavelength.
//!
//! ## Available data sources
//!
//! | Source | Module | Materials |
//! |--------|--------|-----------|
//! | Tabulated metals | [`metals`] | Au, Ag, Cu, Al |
//! | Cauchy dispersion | [`dispersion`] | crown glass, fused silica, water, soap film, oil, MgF₂, TiO₂, or any constant (n, k) |
//! //!
//! ## Interpolation
//!
//! Tabulated metal data is interpolated with natural cubic splines
//! ([`spline::CubicSpline`]), separately for $n$ and $k$, so the provider
//! reproduces the table exactly at every knot.

pub mod dispersion;
pub mod metals;
pub mod provider;
pub mod spline;

pub use dispersion::CauchyDielectric;
pub use metals::TabulatedMetal;
pub use provider::{MaterialError, MaterialProvider};
