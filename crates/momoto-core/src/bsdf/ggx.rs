//! Anisotropic GGX surface (brushed metals, satin finishes).
//!
//! Hemispherical reflectance is the directional albedo of the microfacet
//! lobe, integrated on a stratified visible-normal grid whose resolution
//! follows the quality tier. The single-scattering deficit $1 - E$ is
//! booked as absorption; for a dielectric base the Fresnel-transmitted
//! share $E - R$ is transmittance.

use std::sync::Arc;

use momoto_materials::TabulatedMetal;

use crate::error::{domain, BuildError, OpticsError};
use crate::optics::fresnel::{
    conductor_f0, conductor_fresnel, fresnel_full, fresnel_schlick, schlick_with_f0,
};
use crate::types::{BsdfContext, ComplexIor, FresnelModel, IndexModel, MaterialResponse, Vec3};

use super::microfacet::{directional_albedo, microfacet_reflection, MIN_ALPHA};
use super::Bsdf;

/// An anisotropic microfacet surface.
#[derive(Debug, Clone)]
pub struct AnisotropicGgx {
    alpha_x: f64,
    alpha_y: f64,
    base: IndexModel,
}

impl AnisotropicGgx {
    /// # Errors
    /// Fails unless both alphas lie in `[MIN_ALPHA, 1]`.
    pub fn new(alpha_x: f64, alpha_y: f64, base: impl Into<IndexModel>) -> Result<Self, BuildError> {
        for (name, a) in [("alpha_x", alpha_x), ("alpha_y", alpha_y)] {
            if !(a.is_finite() && (MIN_ALPHA..=1.0).contains(&a)) {
                return Err(BuildError::InvalidParameter {
                    name,
                    value: a,
                    reason: "must lie in [0.001, 1]",
                });
            }
        }
        Ok(Self {
            alpha_x,
            alpha_y,
            base: base.into(),
        })
    }

    /// Aluminium brushed along x.
    pub fn brushed_aluminium() -> Self {
        Self {
            alpha_x: 0.35,
            alpha_y: 0.05,
            base: IndexModel::Tabulated(Arc::new(TabulatedMetal::aluminium())),
        }
    }

    /// Gold brushed along x.
    pub fn brushed_gold() -> Self {
        Self {
            alpha_x: 0.3,
            alpha_y: 0.06,
            base: IndexModel::Tabulated(Arc::new(TabulatedMetal::gold())),
        }
    }

    /// Satin-finish lacquer: a lossless dielectric with a broad lobe.
    pub fn satin_lacquer() -> Self {
        Self {
            alpha_x: 0.25,
            alpha_y: 0.25,
            base: IndexModel::Constant(ComplexIor { n: 1.5, k: 0.0 }),
        }
    }

    pub fn alphas(&self) -> (f64, f64) {
        (self.alpha_x, self.alpha_y)
    }

    /// Fresnel factor at a microfacet for the given model.
    fn facet_fresnel(&self, n: f64, k: f64, model: FresnelModel) -> impl Fn(f64) -> f64 {
        let metal = self.base.is_absorbing() && k > 0.0;
        let f0 = if metal { conductor_f0(n, k) } else { 0.0 };
        move |c: f64| match (metal, model) {
            (true, FresnelModel::Schlick) => schlick_with_f0(c, f0),
            (true, _) => conductor_fresnel(n, k, c).unwrap_or(f64::NAN),
            (false, FresnelModel::Schlick) => fresnel_schlick(c, 1.0, n).unwrap_or(f64::NAN),
            (false, _) => fresnel_full(c, 1.0, n).map(|f| f.average()).unwrap_or(f64::NAN),
        }
    }
}

impl Bsdf for AnisotropicGgx {
    fn name(&self) -> &str {
        "anisotropic_ggx"
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        let wi = ctx.wi();
        if wi[2] <= 0.0 {
            return Err(domain("cos_theta_i", wi[2], "(0, 1]"));
        }
        let m = self.base.at(wavelength_nm)?;
        let tier = ctx.quality();
        let fresnel = self.facet_fresnel(m.re, m.im, tier.fresnel_model());
        let albedo = directional_albedo(
            wi,
            self.alpha_x,
            self.alpha_y,
            tier.ggx_samples_per_axis(),
            fresnel,
        );
        if !albedo.reflected.is_finite() {
            return Err(domain("fresnel", albedo.reflected, "finite"));
        }

        let white = albedo.white.clamp(0.0, 1.0);
        let reflectance = albedo.reflected.clamp(0.0, white);
        let transmittance = if self.base.is_absorbing() { 0.0 } else { white - reflectance };
        Ok(MaterialResponse::from_reflectance_transmittance(reflectance, transmittance))
    }

    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        let Ok(m) = self.base.at(wavelength_nm) else {
            return f64::NAN;
        };
        let fresnel = self.facet_fresnel(m.re, m.im, FresnelModel::Exact);
        microfacet_reflection(wi, wo, self.alpha_x, self.alpha_y, fresnel)
    }
}
