//! Transparent dielectric slab (glass, water, plastics).
//!
//! The hemispherical response treats the material as a plane-parallel slab:
//! a Fresnel interface on each side and Beer–Lambert attenuation in between,
//! summed over all internal reflections,
//!
//! $$R = R_1 + \frac{R_1 (1 - R_1)^2 T_i^2}{1 - R_1^2 T_i^2},\qquad
//!   T = \frac{(1 - R_1)^2 T_i}{1 - R_1^2 T_i^2}$$
//!
//! with $T_i = e^{-\alpha d / \cos\theta_t}$. Absorption is the remainder.
//! Roughness shapes the directional lobe returned by `evaluate_f`.

use momoto_materials::CauchyDielectric;

use crate::error::{self, BuildError, OpticsError};
use crate::optics::fresnel::{
    fresnel_full, fresnel_schlick, transmission_cos, FresnelLut, DEFAULT_LUT_SIZE,
};
use crate::optics::{absorption_coefficient, beer_lambert_transmittance};
use crate::spectrum::interpolate;
use crate::types::{
    BsdfContext, FresnelModel, IndexModel, MaterialResponse, Polarization, Vec3,
    REFERENCE_WAVELENGTH_NM, ROOM_TEMPERATURE_K,
};

use super::microfacet::{microfacet_reflection, roughness_to_alpha};
use super::Bsdf;

/// Thermo-optic coefficient of borosilicate crown glass (1/K).
pub const CROWN_DN_DT: f64 = 2.4e-6;

/// Largest index mismatch for which the precomputed Fresnel table stands in
/// for the exact equations. Dispersion and dn/dT beyond this use
/// [`fresnel_full`].
pub const LUT_INDEX_TOLERANCE: f64 = 1e-3;

/// A dielectric slab.
#[derive(Debug, Clone)]
pub struct Dielectric {
    ior: IndexModel,
    roughness: f64,
    thickness_mm: f64,
    absorption_per_mm: f64,
    /// Extra absorption (1/mm) at the blue, green and red sample wavelengths.
    tint: Option<[(f64, f64); 3]>,
    dn_dt: f64,
    lut: Option<FresnelLut>,
}

impl Dielectric {
    pub fn builder() -> DielectricBuilder {
        DielectricBuilder::default()
    }

    /// Clear window glass: smooth, 2 mm, no bulk absorption.
    pub fn clear() -> Self {
        Self::preset(0.0, 2.0, 0.0, None)
    }

    /// Everyday float glass: slightly rough, 4 mm, faint green tint.
    pub fn regular() -> Self {
        Self::preset(0.05, 4.0, 0.002, Some([0.004, 0.001, 0.003]))
    }

    /// Thick architectural glass, 10 mm.
    pub fn thick() -> Self {
        Self::preset(0.02, 10.0, 0.004, Some([0.004, 0.001, 0.003]))
    }

    /// Acid-etched glass with a broad lobe.
    pub fn frosted() -> Self {
        Self::preset(0.6, 3.0, 0.001, None)
    }

    fn preset(roughness: f64, thickness_mm: f64, absorption_per_mm: f64, tint: Option<[f64; 3]>) -> Self {
        let glass = CauchyDielectric::crown_glass();
        let n550 = glass.real_index(REFERENCE_WAVELENGTH_NM);
        Self {
            ior: glass.into(),
            roughness,
            thickness_mm,
            absorption_per_mm,
            tint: tint.map(tint_table),
            dn_dt: CROWN_DN_DT,
            lut: FresnelLut::new(1.0, n550, DEFAULT_LUT_SIZE).ok(),
        }
    }

    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    pub fn thickness_mm(&self) -> f64 {
        self.thickness_mm
    }

    pub fn ior(&self) -> &IndexModel {
        &self.ior
    }

    /// Real index at a wavelength and temperature.
    pub fn index_at(&self, wavelength_nm: f64, temperature_k: f64) -> Result<f64, OpticsError> {
        let n = self.ior.at(wavelength_nm)?.re + self.dn_dt * (temperature_k - ROOM_TEMPERATURE_K);
        error::check_positive("n", n)
    }

    /// Bulk absorption coefficient (1/mm) at a wavelength.
    pub fn absorption_at(&self, wavelength_nm: f64) -> Result<f64, OpticsError> {
        // Extinction coefficient k contributes 4πk/λ, converted from 1/nm.
        let from_k = absorption_coefficient(self.ior.at(wavelength_nm)?.im, wavelength_nm)? * 1e6;
        let from_tint = match &self.tint {
            Some(table) => {
                let (xs, ys): (Vec<f64>, Vec<f64>) = table.iter().copied().unzip();
                interpolate(&xs, &ys, wavelength_nm)
            }
            None => 0.0,
        };
        Ok(self.absorption_per_mm + from_tint + from_k)
    }

    /// Single-interface reflectance under the tier's Fresnel model.
    fn interface_reflectance(
        &self,
        cos_i: f64,
        n: f64,
        model: FresnelModel,
        polarization: Polarization,
    ) -> Result<f64, OpticsError> {
        match (model, polarization, &self.lut) {
            (FresnelModel::Schlick, _, _) => fresnel_schlick(cos_i, 1.0, n),
            (FresnelModel::Lut, Polarization::Unpolarized, Some(lut))
                if (lut.indices().1 - n).abs() <= LUT_INDEX_TOLERANCE =>
            {
                lut.lookup(cos_i)
            }
            _ => Ok(fresnel_full(cos_i, 1.0, n)?.select(polarization)),
        }
    }
}

/// Pair tint values given as (red, green, blue) with their wavelengths,
/// ordered by increasing wavelength.
fn tint_table(rgb: [f64; 3]) -> [(f64, f64); 3] {
    [(450.0, rgb[2]), (532.0, rgb[1]), (650.0, rgb[0])]
}

/// Slab response for interface reflectance `r1` and single-pass internal
/// transmittance `ti`.
pub(crate) fn slab_response(r1: f64, ti: f64) -> MaterialResponse {
    if r1 >= 1.0 {
        return MaterialResponse::opaque(1.0);
    }
    let denom = 1.0 - r1 * r1 * ti * ti;
    let one_minus = (1.0 - r1) * (1.0 - r1);
    let reflectance = r1 + r1 * one_minus * ti * ti / denom;
    let transmittance = one_minus * ti / denom;
    MaterialResponse::from_reflectance_transmittance(reflectance, transmittance)
}

impl Bsdf for Dielectric {
    fn name(&self) -> &str {
        "dielectric"
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        let n = self.index_at(wavelength_nm, ctx.material().temperature_k)?;
        let cos_i = ctx.cos_theta_i().abs();
        let r1 = self.interface_reflectance(
            cos_i,
            n,
            ctx.quality().fresnel_model(),
            ctx.polarization(),
        )?;

        let ti = match transmission_cos(cos_i, 1.0, n) {
            Some(cos_t) if cos_t > 0.0 => {
                let alpha = self.absorption_at(wavelength_nm)?;
                beer_lambert_transmittance(alpha, self.thickness_mm / cos_t)?
            }
            _ => 0.0,
        };
        Ok(slab_response(r1, ti))
    }

    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        let Ok(n) = self.index_at(wavelength_nm, ROOM_TEMPERATURE_K) else {
            return f64::NAN;
        };
        let alpha = roughness_to_alpha(self.roughness);
        microfacet_reflection(wi, wo, alpha, alpha, |c| {
            fresnel_full(c, 1.0, n).map(|f| f.average()).unwrap_or(f64::NAN)
        })
    }
}

/// Builder for [`Dielectric`].
#[derive(Debug, Clone)]
pub struct DielectricBuilder {
    ior: Option<IndexModel>,
    roughness: f64,
    thickness_mm: f64,
    absorption_per_mm: f64,
    tint: Option<[f64; 3]>,
    dn_dt: f64,
}

impl Default for DielectricBuilder {
    fn default() -> Self {
        Self {
            ior: None,
            roughness: 0.0,
            thickness_mm: 2.0,
            absorption_per_mm: 0.0,
            tint: None,
            dn_dt: 0.0,
        }
    }
}

impl DielectricBuilder {
    pub fn ior(mut self, ior: impl Into<IndexModel>) -> Self {
        self.ior = Some(ior.into());
        self
    }

    pub fn roughness(mut self, roughness: f64) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn thickness_mm(mut self, thickness_mm: f64) -> Self {
        self.thickness_mm = thickness_mm;
        self
    }

    pub fn absorption_per_mm(mut self, absorption: f64) -> Self {
        self.absorption_per_mm = absorption;
        self
    }

    /// Additional absorption per mm at red, green and blue.
    pub fn tint(mut self, rgb_absorption_per_mm: [f64; 3]) -> Self {
        self.tint = Some(rgb_absorption_per_mm);
        self
    }

    /// Thermo-optic coefficient dn/dT (1/K).
    pub fn thermo_optic(mut self, dn_dt: f64) -> Self {
        self.dn_dt = dn_dt;
        self
    }

    pub fn build(self) -> Result<Dielectric, BuildError> {
        let ior = match self.ior {
            Some(IndexModel::Tabulated(_)) => {
                return Err(BuildError::InvalidParameter {
                    name: "ior",
                    value: f64::NAN,
                    reason: "tabulated metal data describes a conductor",
                })
            }
            Some(ior) => ior,
            None => CauchyDielectric::crown_glass().into(),
        };
        error::require_unit_interval("roughness", self.roughness)?;
        error::require_non_negative("thickness_mm", self.thickness_mm)?;
        error::require_non_negative("absorption_per_mm", self.absorption_per_mm)?;
        if !self.dn_dt.is_finite() {
            return Err(BuildError::InvalidParameter {
                name: "dn_dt",
                value: self.dn_dt,
                reason: "must be finite",
            });
        }
        if let Some(tint) = self.tint {
            for t in tint {
                error::require_non_negative("tint", t)?;
            }
        }
        let n550 = ior.at(REFERENCE_WAVELENGTH_NM)?.re;
        Ok(Dielectric {
            lut: Some(FresnelLut::new(1.0, n550, DEFAULT_LUT_SIZE)?),
            ior,
            roughness: self.roughness,
            thickness_mm: self.thickness_mm,
            absorption_per_mm: self.absorption_per_mm,
            tint: self.tint.map(tint_table),
            dn_dt: self.dn_dt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComplexIor, QualityTier, SpectralMode};
    use approx::assert_abs_diff_eq;

    fn ctx(angle_deg: f64, wl: f64, tier: QualityTier) -> BsdfContext {
        BsdfContext::at_incidence(angle_deg, wl).unwrap().with_quality(tier)
    }

    #[test]
    fn test_lossless_slab_conserves_energy() {
        let glass = Dielectric::clear();
        for &deg in &[0.0, 30.0, 60.0, 85.0] {
            let r = glass.evaluate(&ctx(deg, 550.0, QualityTier::High)).unwrap();
            assert_abs_diff_eq!(r.total(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(r.absorption, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_clear_glass_normal_incidence() {
        // Two interfaces of about 4.2 % each, with multiple reflections.
        let r = Dielectric::clear().evaluate(&ctx(0.0, 550.0, QualityTier::High)).unwrap();
        assert!(r.reflectance > 0.078 && r.reflectance < 0.084, "R = {}", r.reflectance);
    }

    #[test]
    fn test_tinted_glass_absorbs() {
        let r = Dielectric::thick().evaluate(&ctx(0.0, 650.0, QualityTier::High)).unwrap();
        assert!(r.absorption > 0.05, "A = {}", r.absorption);
        assert_abs_diff_eq!(r.total(), 1.0, epsilon = 1e-12);
        let green = Dielectric::thick().evaluate(&ctx(0.0, 532.0, QualityTier::High)).unwrap();
        assert!(green.transmittance > r.transmittance);
    }

    #[test]
    fn test_tiers_stay_within_budget() {
        let glass = Dielectric::clear();
        for &deg in &[0.0, 30.0, 60.0, 75.0] {
            let reference = glass.evaluate(&ctx(deg, 550.0, QualityTier::Reference)).unwrap();
            for tier in QualityTier::ALL {
                let r = glass.evaluate(&ctx(deg, 550.0, tier)).unwrap();
                assert!(
                    (r.reflectance - reference.reflectance).abs() <= tier.reflectance_budget() + 1e-12,
                    "{tier:?} at {deg}°: {} vs {}",
                    r.reflectance,
                    reference.reflectance
                );
            }
        }
    }

    #[test]
    fn test_standard_tier_follows_index_away_from_table() {
        let tio2 = CauchyDielectric::titanium_dioxide();
        let slab = Dielectric::builder().ior(tio2).build().unwrap();
        for &wl in &[400.0, 700.0] {
            let standard = slab.evaluate(&ctx(45.0, wl, QualityTier::Standard)).unwrap();
            let exact = slab.evaluate(&ctx(45.0, wl, QualityTier::High)).unwrap();
            assert_eq!(standard, exact, "at {wl} nm");
        }

        let hot = crate::types::EvalMaterialContext::new(QualityTier::Standard)
            .with_temperature(900.0)
            .unwrap();
        let glass = Dielectric::builder().thermo_optic(1e-4).build().unwrap();
        let base = BsdfContext::at_incidence(30.0, 550.0).unwrap();
        let standard = glass.evaluate(&base.with_material_context(hot)).unwrap();
        let exact = glass
            .evaluate(&base.with_material_context(hot).with_quality(QualityTier::High))
            .unwrap();
        assert_eq!(standard, exact);
    }

    #[test]
    fn test_temperature_raises_index() {
        let glass = Dielectric::clear();
        let cold = glass.index_at(550.0, 273.15).unwrap();
        let hot = glass.index_at(550.0, 373.15).unwrap();
        assert!(hot > cold);
        assert_abs_diff_eq!(hot - cold, 100.0 * CROWN_DN_DT, epsilon = 1e-12);
    }

    #[test]
    fn test_rgb_mode_is_luminance_weighted() {
        let glass = Dielectric::regular();
        let base = BsdfContext::at_incidence(20.0, 550.0).unwrap();
        let rgb = glass.evaluate(&base.with_spectral(SpectralMode::Rgb).unwrap()).unwrap();
        let g = glass.evaluate_at(&base, 532.0).unwrap();
        assert!((rgb.reflectance - g.reflectance).abs() < 0.005);
        assert_abs_diff_eq!(rgb.total(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_builder_validation() {
        assert!(Dielectric::builder().roughness(1.5).build().is_err());
        assert!(Dielectric::builder().thickness_mm(-1.0).build().is_err());
        assert!(Dielectric::builder().tint([0.1, -0.1, 0.0]).build().is_err());
        let water = Dielectric::builder()
            .ior(ComplexIor::real(1.333).unwrap())
            .thickness_mm(5.0)
            .build()
            .unwrap();
        assert_eq!(water.thickness_mm(), 5.0);
    }

    #[test]
    fn test_lobe_is_reciprocal() {
        let glass = Dielectric::frosted();
        let wi = crate::types::spherical_direction(0.7, 0.2);
        let wo = crate::types::spherical_direction(0.3, 2.9);
        let a = glass.evaluate_f(&wi, &wo);
        let b = glass.evaluate_f(&wo, &wi);
        assert_abs_diff_eq!(a, b, epsilon = 1e-12 * a.abs().max(1.0));
        assert!(a > 0.0);
    }
}
