//! Core types shared across the Momoto engine.
//!
//! This module defines the value types that flow through every evaluation:
//! complex indices, quality tiers, evaluation contexts and the
//! [`MaterialResponse`] energy triple.
//!
//! ## Conventions
//!
//! Directions are `[f64; 3]` unit vectors in the local shading frame with the
//! surface normal along $+z$. Both the incident direction `wi` and the
//! outgoing direction `wo` point away from the surface. Wavelengths are in
//! nanometres and angles in radians unless a name says `_deg`.

use std::fmt;
use std::sync::Arc;

use momoto_materials::{CauchyDielectric, MaterialProvider, TabulatedMetal};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{self, BuildError, OpticsError};

/// A 3-vector in the local shading frame.
pub type Vec3 = [f64; 3];

/// Wavelengths sampled by [`SpectralMode::Rgb`] (nm): red, green, blue.
pub const RGB_WAVELENGTHS_NM: [f64; 3] = [650.0, 532.0, 450.0];

/// Rec. 709 luminance weights for the red, green and blue samples.
pub const LUMINANCE_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Wavelength at which single-valued quantities (F0, `evaluate_f`) are taken.
pub const REFERENCE_WAVELENGTH_NM: f64 = 550.0;

/// Room temperature (K), the default evaluation temperature.
pub const ROOM_TEMPERATURE_K: f64 = 293.15;

/// Tolerance used when checking that a direction has unit length.
const UNIT_LENGTH_TOLERANCE: f64 = 1e-6;

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn length(v: &Vec3) -> f64 {
    dot(v, v).sqrt()
}

/// Normalise a vector. Returns `None` for zero or non-finite input.
pub fn normalize(v: &Vec3) -> Option<Vec3> {
    let len = length(v);
    if len.is_finite() && len > 0.0 {
        Some([v[0] / len, v[1] / len, v[2] / len])
    } else {
        None
    }
}

/// Unit vector from polar angle `theta` (from +z) and azimuth `phi`.
pub fn spherical_direction(theta: f64, phi: f64) -> Vec3 {
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    [sin_t * cos_p, sin_t * sin_p, cos_t]
}

/// Specular mirror of `v` about the surface normal.
pub fn mirror(v: &Vec3) -> Vec3 {
    [-v[0], -v[1], v[2]]
}

// ─── Refractive index ───────────────────────────────────────────────────────

/// Complex refractive index $\tilde{n} = n + ik$.
///
/// $n > 0$ is the real index, $k \ge 0$ the extinction coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexIor {
    pub n: f64,
    pub k: f64,
}

impl ComplexIor {
    pub fn new(n: f64, k: f64) -> Result<Self, BuildError> {
        error::require_positive("n", n)?;
        error::require_non_negative("k", k)?;
        Ok(Self { n, k })
    }

    /// A lossless index.
    pub fn real(n: f64) -> Result<Self, BuildError> {
        Self::new(n, 0.0)
    }

    pub fn to_complex(self) -> Complex64 {
        Complex64::new(self.n, self.k)
    }

    pub fn is_absorbing(self) -> bool {
        self.k > 0.0
    }
}

impl From<ComplexIor> for Complex64 {
    fn from(ior: ComplexIor) -> Self {
        ior.to_complex()
    }
}

/// Where a material's refractive index comes from.
///
/// Dispersive sources are evaluated per wavelength; a constant index is the
/// same at every wavelength.
#[derive(Clone)]
pub enum IndexModel {
    Constant(ComplexIor),
    Cauchy(CauchyDielectric),
    Tabulated(Arc<TabulatedMetal>),
}

impl IndexModel {
    /// A constant lossless index, validated.
    pub fn real(n: f64) -> Result<Self, BuildError> {
        Ok(Self::Constant(ComplexIor::real(n)?))
    }

    /// Complex index at a wavelength.
    pub fn at(&self, wavelength_nm: f64) -> Result<Complex64, OpticsError> {
        error::check_positive("wavelength_nm", wavelength_nm)?;
        match self {
            Self::Constant(ior) => Ok(ior.to_complex()),
            Self::Cauchy(d) => Ok(d.refractive_index(wavelength_nm)?),
            Self::Tabulated(m) => Ok(m.refractive_index(wavelength_nm)?),
        }
    }

    /// True when the index carries absorption anywhere in its description.
    pub fn is_absorbing(&self) -> bool {
        match self {
            Self::Constant(ior) => ior.is_absorbing(),
            Self::Cauchy(d) => d.k > 0.0,
            Self::Tabulated(_) => true,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Constant(_) => "constant",
            Self::Cauchy(d) => d.name(),
            Self::Tabulated(m) => m.name(),
        }
    }
}

impl fmt::Debug for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(ior) => write!(f, "Constant(n={}, k={})", ior.n, ior.k),
            Self::Cauchy(d) => write!(f, "Cauchy({})", d.name()),
            Self::Tabulated(m) => write!(f, "Tabulated({})", m.name()),
        }
    }
}

impl From<ComplexIor> for IndexModel {
    fn from(ior: ComplexIor) -> Self {
        Self::Constant(ior)
    }
}

impl From<CauchyDielectric> for IndexModel {
    fn from(d: CauchyDielectric) -> Self {
        Self::Cauchy(d)
    }
}

impl From<TabulatedMetal> for IndexModel {
    fn from(m: TabulatedMetal) -> Self {
        Self::Tabulated(Arc::new(m))
    }
}

// ─── Spectral sampling and polarisation ─────────────────────────────────────

/// How a single evaluation samples the spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpectralMode {
    /// A single wavelength (nm).
    Wavelength(f64),
    /// Three samples at [`RGB_WAVELENGTHS_NM`], luminance-weighted.
    Rgb,
}

/// Polarisation of the incident light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarization {
    #[default]
    Unpolarized,
    S,
    P,
}

// ─── Quality tiers ──────────────────────────────────────────────────────────

/// Fresnel evaluation strategy used by a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FresnelModel {
    /// Schlick's approximation.
    Schlick,
    /// Precomputed table of the full Fresnel equations.
    Lut,
    /// Closed-form full Fresnel equations.
    Exact,
}

/// Accuracy/performance trade-off for an evaluation.
///
/// | Tier | Fresnel | Bands | GGX grid | Energy tol. | Reflectance budget |
/// |------|---------|-------|----------|-------------|--------------------|
/// | Fast | Schlick | 1 | 4×4 | 1e-4 | 0.04 |
/// | Standard | LUT (128) | 3 | 8×8 | 1e-5 | 0.01 |
/// | High | exact | 31 | 16×16 | 1e-6 | 1e-3 |
/// | UltraHigh | exact | 31 | 32×32 | 1e-6 | 1e-4 |
/// | Experimental | exact | 31 | 16×16 | 1e-3 | 0.2 |
/// | Reference | exact | 31 | 64×64 | 1e-6 | 0 |
///
/// The reflectance budget is the largest absolute deviation from the
/// Reference tier a tier may show on the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Fast,
    Standard,
    #[default]
    High,
    UltraHigh,
    Experimental,
    Reference,
}

impl QualityTier {
    /// Every tier, from cheapest to most exact.
    pub const ALL: [QualityTier; 6] = [
        Self::Fast,
        Self::Standard,
        Self::High,
        Self::UltraHigh,
        Self::Experimental,
        Self::Reference,
    ];

    pub fn fresnel_model(self) -> FresnelModel {
        match self {
            Self::Fast => FresnelModel::Schlick,
            Self::Standard => FresnelModel::Lut,
            _ => FresnelModel::Exact,
        }
    }

    /// Number of wavelengths sampled by spectral pipelines.
    pub fn spectral_bands(self) -> usize {
        match self {
            Self::Fast => 1,
            Self::Standard => 3,
            _ => 31,
        }
    }

    /// Samples per axis of the stratified GGX albedo integration.
    pub fn ggx_samples_per_axis(self) -> usize {
        match self {
            Self::Fast => 4,
            Self::Standard => 8,
            Self::High | Self::Experimental => 16,
            Self::UltraHigh => 32,
            Self::Reference => 64,
        }
    }

    /// Radial quadrature samples for subsurface profiles. `None` selects the
    /// closed-form total diffuse reflectance.
    pub fn subsurface_samples(self) -> Option<usize> {
        match self {
            Self::Fast => None,
            Self::Standard => Some(64),
            Self::High | Self::Experimental => Some(256),
            Self::UltraHigh => Some(1024),
            Self::Reference => Some(4096),
        }
    }

    /// Allowed $|1 - (R + T + A)|$.
    pub fn energy_tolerance(self) -> f64 {
        match self {
            Self::Fast => 1e-4,
            Self::Standard => 1e-5,
            Self::Experimental => 1e-3,
            Self::High | Self::UltraHigh | Self::Reference => 1e-6,
        }
    }

    /// Allowed absolute reflectance deviation from the Reference tier.
    pub fn reflectance_budget(self) -> f64 {
        match self {
            Self::Fast => 0.04,
            Self::Standard => 0.01,
            Self::High => 1e-3,
            Self::UltraHigh => 1e-4,
            Self::Experimental => 0.2,
            Self::Reference => 0.0,
        }
    }

    /// True for tiers whose thin-film path may use the Airy shortcut.
    pub fn allows_airy_shortcut(self) -> bool {
        matches!(self, Self::Fast | Self::Standard)
    }
}

// ─── Certification ──────────────────────────────────────────────────────────

/// Certification level and the neural-correction ceiling it enforces.
///
/// | Level | Max correction share |
/// |-------|----------------------|
/// | Experimental | 20 % |
/// | Research | 10 % |
/// | Industrial | 5 % |
/// | Reference | 2 % |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationLevel {
    Experimental,
    Research,
    #[default]
    Industrial,
    Reference,
}

impl CertificationLevel {
    pub fn max_correction_share(self) -> f64 {
        match self {
            Self::Experimental => 0.20,
            Self::Research => 0.10,
            Self::Industrial => 0.05,
            Self::Reference => 0.02,
        }
    }
}

// ─── Contexts ───────────────────────────────────────────────────────────────

/// Environmental context of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMaterialContext {
    /// Temperature (K).
    pub temperature_k: f64,
    /// Time since the material was created (s). Drives drainage and drift.
    pub time_s: f64,
    pub quality: QualityTier,
}

impl Default for EvalMaterialContext {
    fn default() -> Self {
        Self {
            temperature_k: ROOM_TEMPERATURE_K,
            time_s: 0.0,
            quality: QualityTier::default(),
        }
    }
}

impl EvalMaterialContext {
    pub fn new(quality: QualityTier) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature_k: f64) -> Result<Self, BuildError> {
        self.temperature_k = error::require_positive("temperature_k", temperature_k)?;
        Ok(self)
    }

    pub fn with_time(mut self, time_s: f64) -> Result<Self, BuildError> {
        self.time_s = error::require_non_negative("time_s", time_s)?;
        Ok(self)
    }
}

/// Geometry, spectral sampling and environment for one BSDF evaluation.
///
/// Deserialisation goes through [`BsdfContext::new`], so a context read
/// from JSON or TOML is validated like one built in code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBsdfContext")]
pub struct BsdfContext {
    wi: Vec3,
    wo: Vec3,
    spectral: SpectralMode,
    polarization: Polarization,
    material: EvalMaterialContext,
}

#[derive(Deserialize)]
struct RawBsdfContext {
    wi: Vec3,
    wo: Vec3,
    spectral: SpectralMode,
    polarization: Polarization,
    material: EvalMaterialContext,
}

impl TryFrom<RawBsdfContext> for BsdfContext {
    type Error = BuildError;

    fn try_from(raw: RawBsdfContext) -> Result<Self, Self::Error> {
        let material = EvalMaterialContext::new(raw.material.quality)
            .with_temperature(raw.material.temperature_k)?
            .with_time(raw.material.time_s)?;
        Ok(Self::new(raw.wi, raw.wo, raw.spectral)?
            .with_polarization(raw.polarization)
            .with_material_context(material))
    }
}

impl BsdfContext {
    /// Build a context from explicit directions.
    ///
    /// # Errors
    /// Fails if either direction is not unit length, or a wavelength is not
    /// finite and positive.
    pub fn new(wi: Vec3, wo: Vec3, spectral: SpectralMode) -> Result<Self, BuildError> {
        check_unit("wi", &wi)?;
        check_unit("wo", &wo)?;
        check_spectral(spectral)?;
        Ok(Self {
            wi,
            wo,
            spectral,
            polarization: Polarization::Unpolarized,
            material: EvalMaterialContext::default(),
        })
    }

    /// Incidence at `angle_deg` from the normal in the x–z plane, observed
    /// in the mirror direction.
    pub fn at_incidence(angle_deg: f64, wavelength_nm: f64) -> Result<Self, BuildError> {
        if !angle_deg.is_finite() || !(0.0..90.0).contains(&angle_deg) {
            return Err(BuildError::InvalidParameter {
                name: "angle_deg",
                value: angle_deg,
                reason: "must lie in [0, 90)",
            });
        }
        let wi = spherical_direction(angle_deg.to_radians(), 0.0);
        Self::new(wi, mirror(&wi), SpectralMode::Wavelength(wavelength_nm))
    }

    pub fn with_quality(mut self, quality: QualityTier) -> Self {
        self.material.quality = quality;
        self
    }

    pub fn with_polarization(mut self, polarization: Polarization) -> Self {
        self.polarization = polarization;
        self
    }

    pub fn with_material_context(mut self, material: EvalMaterialContext) -> Self {
        self.material = material;
        self
    }

    pub fn with_spectral(mut self, spectral: SpectralMode) -> Result<Self, BuildError> {
        check_spectral(spectral)?;
        self.spectral = spectral;
        Ok(self)
    }

    pub fn wi(&self) -> &Vec3 {
        &self.wi
    }

    pub fn wo(&self) -> &Vec3 {
        &self.wo
    }

    pub fn spectral(&self) -> SpectralMode {
        self.spectral
    }

    pub fn polarization(&self) -> Polarization {
        self.polarization
    }

    pub fn material(&self) -> &EvalMaterialContext {
        &self.material
    }

    pub fn quality(&self) -> QualityTier {
        self.material.quality
    }

    /// Cosine of the incident direction with the normal.
    pub fn cos_theta_i(&self) -> f64 {
        self.wi[2]
    }

    pub fn cos_theta_o(&self) -> f64 {
        self.wo[2]
    }
}

fn check_unit(name: &'static str, v: &Vec3) -> Result<(), BuildError> {
    let len = length(v);
    if len.is_finite() && (len - 1.0).abs() <= UNIT_LENGTH_TOLERANCE {
        Ok(())
    } else {
        Err(BuildError::InvalidParameter {
            name,
            value: len,
            reason: "direction must have unit length",
        })
    }
}

fn check_spectral(spectral: SpectralMode) -> Result<(), BuildError> {
    match spectral {
        SpectralMode::Wavelength(nm) => error::require_positive("wavelength_nm", nm).map(|_| ()),
        SpectralMode::Rgb => Ok(()),
    }
}

// ─── Responses ──────────────────────────────────────────────────────────────

/// Fractions of incident energy reflected, transmitted and absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialResponse {
    pub reflectance: f64,
    pub transmittance: f64,
    pub absorption: f64,
}

impl MaterialResponse {
    /// Derive absorption as the remainder $A = 1 - R - T$.
    ///
    /// Round-off below zero is clamped; anything larger is kept so that
    /// energy validation can see it.
    pub fn from_reflectance_transmittance(reflectance: f64, transmittance: f64) -> Self {
        let mut absorption = 1.0 - reflectance - transmittance;
        if absorption < 0.0 && absorption > -1e-12 {
            absorption = 0.0;
        }
        Self {
            reflectance,
            transmittance,
            absorption,
        }
    }

    /// An opaque response: nothing transmitted.
    pub fn opaque(reflectance: f64) -> Self {
        Self::from_reflectance_transmittance(reflectance, 0.0)
    }

    /// $R + T + A$.
    pub fn total(&self) -> f64 {
        self.reflectance + self.transmittance + self.absorption
    }

    /// $|1 - (R + T + A)|$.
    pub fn energy_error(&self) -> f64 {
        (1.0 - self.total()).abs()
    }

    pub fn is_finite(&self) -> bool {
        self.reflectance.is_finite() && self.transmittance.is_finite() && self.absorption.is_finite()
    }

    /// Component-wise weighted sum of responses.
    pub fn weighted_sum(parts: &[(f64, MaterialResponse)]) -> Self {
        parts.iter().fold(Self::default(), |acc, (w, r)| Self {
            reflectance: acc.reflectance + w * r.reflectance,
            transmittance: acc.transmittance + w * r.transmittance,
            absorption: acc.absorption + w * r.absorption,
        })
    }
}
