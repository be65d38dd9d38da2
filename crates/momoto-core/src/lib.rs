//! # Momoto Core
//!
//! The physics backbone of the Momoto materials engine. Given a material
//! description, viewing geometry and wavelength, this crate computes how
//! much light is reflected, transmitted and absorbed, and exposes the
//! result as spectra that rendering backends turn into colour.
//!
//! ## Architecture
//!
//! Every material model implements the [`bsdf::Bsdf`] trait. The closed
//! [`bsdf::Material`] enum dispatches over the built-in variants and is the
//! type most callers hold. Responses are always energy-accounted:
//! $R + T + A = 1$ within the tolerance of the active
//! [`types::QualityTier`].
//!
//! ## Modules
//!
//! - [`types`]: Shared value types (contexts, responses, quality tiers).
//! - [`error`]: Domain and construction errors.
//! - [`optics`]: Pure kernels: Fresnel, Beer–Lambert, Henyey–Greenstein, Mie.
//! - [`thin_film`]: Airy single-film formula and the transfer-matrix solver.
//! - [`bsdf`]: Material models built on the kernels.
//! - [`spectrum`]: Sampled spectra, CIE colorimetry and RGB upsampling.
//! - [`pipeline`]: Multi-stage spectral evaluation.
//! - [`validation`]: Energy, reciprocity, neural-audit and drift checks.
//! - [`config`]: TOML engine configuration.

pub mod bsdf;
pub mod config;
pub mod error;
pub mod optics;
pub mod pipeline;
pub mod spectrum;
pub mod thin_film;
pub mod types;
pub mod validation;

pub use bsdf::{Bsdf, Material};
pub use error::{BuildError, OpticsError};
pub use spectrum::Spectrum;
pub use types::{
    BsdfContext, CertificationLevel, ComplexIor, EvalMaterialContext, MaterialResponse,
    Polarization, QualityTier, SpectralMode,
};
