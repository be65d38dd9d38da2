//! Bidirectional scattering models.
//!
//! The [`Bsdf`] trait is the uniform interface over every material model.
//! Its two questions are:
//!
//! - [`Bsdf::evaluate`]: given a [`BsdfContext`], what fractions of the
//!   incident energy are reflected, transmitted and absorbed?
//! - [`Bsdf::evaluate_f`]: what is the scattering density between two
//!   directions? This value is symmetric under swapping the directions.
//!
//! | Variant | Model | Module |
//! |---------|-------|--------|
//! | [`Dielectric`] | Fresnel slab, Beer–Lambert bulk | [`dielectric`] |
//! | [`Conductor`] | complex-index Fresnel | [`conductor`] |
//! | [`AnisotropicGgx`] | anisotropic GGX microfacets | [`ggx`] |
//! | [`Subsurface`] | Jensen dipole diffusion | [`subsurface`] |
//! | [`ThinFilm`] | TMM interference stack | [`thin_film`] |
//! | [`NeuralCorrected`] | SIREN residual over any base | [`neural`] |
//! | [`Temporal`] | drift-tracked wrapper | [`temporal`] |
//! | [`MieMedium`] | particle suspension (pipeline only) | [`medium`] |
//!
//! Implementations only need to answer a single wavelength;
//! [`SpectralMode::Rgb`] is handled once, here, by luminance-weighting three
//! single-wavelength evaluations.

pub mod conductor;
pub mod dielectric;
pub mod ggx;
pub mod material;
pub mod medium;
pub mod microfacet;
pub mod neural;
pub mod subsurface;
pub mod temporal;
pub mod thin_film;

pub use conductor::Conductor;
pub use dielectric::Dielectric;
pub use ggx::AnisotropicGgx;
pub use material::Material;
pub use medium::MieMedium;
pub use neural::{CorrectionSample, NeuralCorrected, SirenConfig, SirenMlp};
pub use subsurface::Subsurface;
pub use temporal::{DriftStatus, DriftTracker, SharedDriftTracker, Temporal};
pub use thin_film::ThinFilm;

use crate::error::OpticsError;
use crate::types::{
    BsdfContext, MaterialResponse, SpectralMode, Vec3, LUMINANCE_WEIGHTS, REFERENCE_WAVELENGTH_NM,
    RGB_WAVELENGTHS_NM,
};

/// The core trait every material model implements.
pub trait Bsdf: Send + Sync {
    /// Human-readable name of the model.
    fn name(&self) -> &str;

    /// Energy response at a single wavelength, using the geometry,
    /// polarisation and environment in `ctx`.
    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError>;

    /// Scattering density from `wi` to `wo` at a wavelength.
    ///
    /// Returns NaN for inputs outside the model's domain.
    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64;

    /// Energy response for the spectral sampling in `ctx`.
    fn evaluate(&self, ctx: &BsdfContext) -> Result<MaterialResponse, OpticsError> {
        match ctx.spectral() {
            SpectralMode::Wavelength(nm) => self.evaluate_at(ctx, nm),
            SpectralMode::Rgb => {
                let mut parts = [(0.0, MaterialResponse::default()); 3];
                for (part, (&nm, &w)) in parts
                    .iter_mut()
                    .zip(RGB_WAVELENGTHS_NM.iter().zip(LUMINANCE_WEIGHTS.iter()))
                {
                    *part = (w, self.evaluate_at(ctx, nm)?);
                }
                Ok(MaterialResponse::weighted_sum(&parts))
            }
        }
    }

    /// Scattering density at the reference wavelength (550 nm).
    fn evaluate_f(&self, wi: &Vec3, wo: &Vec3) -> f64 {
        self.evaluate_f_at(wi, wo, REFERENCE_WAVELENGTH_NM)
    }
}

impl<B: Bsdf + ?Sized> Bsdf for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        (**self).evaluate_at(ctx, wavelength_nm)
    }

    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        (**self).evaluate_f_at(wi, wo, wavelength_nm)
    }

    fn evaluate(&self, ctx: &BsdfContext) -> Result<MaterialResponse, OpticsError> {
        (**self).evaluate(ctx)
    }
}
