//! Opaque metals.
//!
//! Reflectance comes from the complex-index Fresnel equations; nothing is
//! transmitted, so $A = 1 - R$. The Fast tier substitutes Schlick's
//! polynomial seeded with the exact normal-incidence reflectance.

use std::sync::Arc;

use momoto_materials::TabulatedMetal;

use crate::error::{self, BuildError, OpticsError};
use crate::optics::fresnel::{conductor_f0, conductor_fresnel, conductor_fresnel_polarized, schlick_with_f0};
use crate::types::{
    BsdfContext, FresnelModel, IndexModel, MaterialResponse, Vec3, REFERENCE_WAVELENGTH_NM,
    ROOM_TEMPERATURE_K,
};

use super::microfacet::{microfacet_reflection, roughness_to_alpha};
use super::Bsdf;

/// A metal surface.
#[derive(Debug, Clone)]
pub struct Conductor {
    name: String,
    index: IndexModel,
    roughness: f64,
    /// Fractional change of $k$ per kelvin above room temperature.
    k_temperature_coefficient: f64,
    f0: f64,
}

impl Conductor {
    pub fn builder() -> ConductorBuilder {
        ConductorBuilder::default()
    }

    pub fn gold() -> Self {
        Self::tabulated(TabulatedMetal::gold())
    }

    pub fn silver() -> Self {
        Self::tabulated(TabulatedMetal::silver())
    }

    pub fn copper() -> Self {
        Self::tabulated(TabulatedMetal::copper())
    }

    pub fn aluminium() -> Self {
        Self::tabulated(TabulatedMetal::aluminium())
    }

    fn tabulated(metal: TabulatedMetal) -> Self {
        let name = momoto_materials::MaterialProvider::name(&metal).to_string();
        let index = IndexModel::Tabulated(Arc::new(metal));
        // Every embedded table covers the reference wavelength.
        let f0 = normal_reflectance(&index, REFERENCE_WAVELENGTH_NM).unwrap_or(f64::NAN);
        Self {
            name,
            index,
            roughness: 0.0,
            k_temperature_coefficient: 0.0,
            f0,
        }
    }

    /// Same metal with a different roughness.
    ///
    /// # Errors
    /// Fails when `roughness` is outside [0, 1] or not finite.
    pub fn with_roughness(mut self, roughness: f64) -> Result<Self, BuildError> {
        self.roughness = error::require_unit_interval("roughness", roughness)?;
        Ok(self)
    }

    pub fn metal_name(&self) -> &str {
        &self.name
    }

    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    /// Normal-incidence reflectance at 550 nm, computed once at construction.
    pub fn f0(&self) -> f64 {
        self.f0
    }

    /// $(n, k)$ at a wavelength and temperature.
    pub fn index_at(&self, wavelength_nm: f64, temperature_k: f64) -> Result<(f64, f64), OpticsError> {
        let m = self.index.at(wavelength_nm)?;
        let scale = 1.0 + self.k_temperature_coefficient * (temperature_k - ROOM_TEMPERATURE_K);
        Ok((m.re, (m.im * scale).max(0.0)))
    }
}

fn normal_reflectance(index: &IndexModel, wavelength_nm: f64) -> Result<f64, OpticsError> {
    let m = index.at(wavelength_nm)?;
    Ok(conductor_f0(m.re, m.im))
}

impl Bsdf for Conductor {
    fn name(&self) -> &str {
        "conductor"
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        let (n, k) = self.index_at(wavelength_nm, ctx.material().temperature_k)?;
        let cos_i = ctx.cos_theta_i().abs();
        let reflectance = match ctx.quality().fresnel_model() {
            FresnelModel::Schlick => schlick_with_f0(cos_i, conductor_f0(n, k)),
            _ => conductor_fresnel_polarized(n, k, cos_i)?.select(ctx.polarization()),
        };
        Ok(MaterialResponse::opaque(reflectance))
    }

    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        let Ok((n, k)) = self.index_at(wavelength_nm, ROOM_TEMPERATURE_K) else {
            return f64::NAN;
        };
        let alpha = roughness_to_alpha(self.roughness);
        microfacet_reflection(wi, wo, alpha, alpha, |c| {
            conductor_fresnel(n, k, c).unwrap_or(f64::NAN)
        })
    }
}

/// Builder for [`Conductor`] from arbitrary optical constants.
#[derive(Debug, Clone, Default)]
pub struct ConductorBuilder {
    name: Option<String>,
    index: Option<IndexModel>,
    roughness: f64,
    k_temperature_coefficient: f64,
}

impl ConductorBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn index(mut self, index: impl Into<IndexModel>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn roughness(mut self, roughness: f64) -> Self {
        self.roughness = roughness;
        self
    }

    /// Fractional change of the extinction coefficient per kelvin.
    pub fn k_temperature_coefficient(mut self, coefficient: f64) -> Self {
        self.k_temperature_coefficient = coefficient;
        self
    }

    pub fn build(self) -> Result<Conductor, BuildError> {
        let index = self.index.ok_or(BuildError::InvalidParameter {
            name: "index",
            value: f64::NAN,
            reason: "a conductor needs optical constants",
        })?;
        error::require_unit_interval("roughness", self.roughness)?;
        if !self.k_temperature_coefficient.is_finite() {
            return Err(BuildError::InvalidParameter {
                name: "k_temperature_coefficient",
                value: self.k_temperature_coefficient,
                reason: "must be finite",
            });
        }
        let f0 = normal_reflectance(&index, REFERENCE_WAVELENGTH_NM)?;
        Ok(Conductor {
            name: self.name.unwrap_or_else(|| index.name().to_string()),
            index,
            roughness: self.roughness,
            k_temperature_coefficient: self.k_temperature_coefficient,
            f0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComplexIor, QualityTier};
    use approx::assert_abs_diff_eq;

    fn ctx(angle_deg: f64, wl: f64) -> BsdfContext {
        BsdfContext::at_incidence(angle_deg, wl).unwrap()
    }

    #[test]
    fn test_gold_golden_value() {
        let gold = Conductor::gold();
        assert_abs_diff_eq!(gold.f0(), 0.912, epsilon = 0.002);
        let r = gold.evaluate(&ctx(0.0, 550.0)).unwrap();
        assert_abs_diff_eq!(r.reflectance, 0.912, epsilon = 0.002);
        assert_eq!(r.transmittance, 0.0);
        assert_abs_diff_eq!(r.total(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_gold_is_yellow() {
        let gold = Conductor::gold();
        let red = gold.evaluate(&ctx(0.0, 650.0)).unwrap().reflectance;
        let blue = gold.evaluate(&ctx(0.0, 450.0)).unwrap().reflectance;
        assert!(red > blue + 0.3, "red {red} blue {blue}");
    }

    #[test]
    fn test_silver_is_bright_across_band() {
        let silver = Conductor::silver();
        for &wl in &[450.0, 550.0, 650.0] {
            assert!(silver.evaluate(&ctx(0.0, wl)).unwrap().reflectance > 0.9);
        }
    }

    #[test]
    fn test_schlick_tier_close_to_exact() {
        let copper = Conductor::copper();
        for &deg in &[0.0, 45.0, 70.0] {
            let exact = copper.evaluate(&ctx(deg, 600.0)).unwrap().reflectance;
            let fast = copper
                .evaluate(&ctx(deg, 600.0).with_quality(QualityTier::Fast))
                .unwrap()
                .reflectance;
            assert!((fast - exact).abs() < QualityTier::Fast.reflectance_budget());
        }
    }

    #[test]
    fn test_heating_lowers_reflectance() {
        let hot_metal = Conductor::builder()
            .index(ComplexIor::new(0.2, 3.0).unwrap())
            .k_temperature_coefficient(-1e-3)
            .build()
            .unwrap();
        let cold = hot_metal.evaluate(&ctx(0.0, 550.0)).unwrap().reflectance;
        let hot_ctx = ctx(0.0, 550.0).with_material_context(
            crate::types::EvalMaterialContext::default()
                .with_temperature(593.15)
                .unwrap(),
        );
        let hot = hot_metal.evaluate(&hot_ctx).unwrap().reflectance;
        assert!(hot < cold, "hot {hot} cold {cold}");
    }

    #[test]
    fn test_out_of_range_wavelength_is_error() {
        assert!(Conductor::gold().evaluate(&ctx(0.0, 1200.0)).is_err());
        assert!(Conductor::gold().evaluate_f(&[0.0, 0.0, 1.0], &[0.0, 0.0, 1.0]).is_finite());
        assert!(Conductor::gold()
            .evaluate_f_at(&[0.0, 0.0, 1.0], &[0.0, 0.0, 1.0], 1200.0)
            .is_nan());
    }

    #[test]
    fn test_with_roughness_rejects_out_of_range() {
        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let err = Conductor::gold().with_roughness(bad).unwrap_err();
            assert!(
                matches!(err, BuildError::InvalidParameter { name: "roughness", .. }),
                "{bad}: {err:?}"
            );
        }
        assert_eq!(Conductor::gold().with_roughness(1.0).unwrap().roughness(), 1.0);
    }

    #[test]
    fn test_builder_requires_index() {
        assert!(Conductor::builder().build().is_err());
        assert!(Conductor::builder()
            .index(ComplexIor::new(0.2, 3.0).unwrap())
            .roughness(2.0)
            .build()
            .is_err());
    }
}
