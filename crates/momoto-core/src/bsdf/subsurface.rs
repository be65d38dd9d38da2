//! Subsurface scattering with the dipole diffusion approximation.
//!
//! Light entering a turbid medium (skin, marble, milk, jade) diffuses before
//! exiting. The classical dipole places a real source at depth $z_r$ and an
//! image source at height $z_v$, giving the radial profile
//!
//! $$R_d(r) = \frac{\alpha'}{4\pi}\left[z_r(1 + \sigma_{tr} d_r)\frac{e^{-\sigma_{tr} d_r}}{d_r^3}
//!          + z_v(1 + \sigma_{tr} d_v)\frac{e^{-\sigma_{tr} d_v}}{d_v^3}\right]$$
//!
//! whose integral has the closed form
//! $\frac{\alpha'}{2}\left(1 + e^{-\frac{4}{3}A\sqrt{3(1-\alpha')}}\right)e^{-\sqrt{3(1-\alpha')}}$.
//!
//! # Reference
//! Jensen et al., "A Practical Model for Subsurface Light Transport" (2001).

use std::f64::consts::PI;

use crate::error::{self, BuildError, OpticsError};
use crate::optics::fresnel::{fresnel_full, fresnel_schlick};
use crate::optics::beer_lambert_transmittance;
use crate::spectrum::interpolate;
use crate::types::{BsdfContext, FresnelModel, MaterialResponse, Vec3};

use super::Bsdf;

/// Wavelengths (nm) at which per-channel coefficients are given, ascending.
const CHANNEL_WAVELENGTHS: [f64; 3] = [450.0, 550.0, 650.0];

/// Diffusion parameters at one wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipoleParams {
    /// Reduced albedo $\alpha' = \sigma_s' / \sigma_t'$.
    pub albedo: f64,
    /// Effective transport coefficient $\sigma_{tr}$ (1/mm).
    pub sigma_tr: f64,
    /// Real source depth (mm).
    pub z_r: f64,
    /// Image source height (mm).
    pub z_v: f64,
    /// Boundary mismatch factor $A$.
    pub boundary: f64,
}

impl DipoleParams {
    /// Diffuse reflectance profile $R_d(r)$ at radius `r_mm`.
    pub fn profile(&self, r_mm: f64) -> f64 {
        let dr = (r_mm * r_mm + self.z_r * self.z_r).sqrt();
        let dv = (r_mm * r_mm + self.z_v * self.z_v).sqrt();
        let s = self.sigma_tr;
        self.albedo / (4.0 * PI)
            * (self.z_r * (1.0 + s * dr) * (-s * dr).exp() / dr.powi(3)
                + self.z_v * (1.0 + s * dv) * (-s * dv).exp() / dv.powi(3))
    }

    /// Closed-form total diffuse reflectance.
    pub fn total_reflectance(&self) -> f64 {
        let q = (3.0 * (1.0 - self.albedo)).sqrt();
        0.5 * self.albedo * (1.0 + (-4.0 / 3.0 * self.boundary * q).exp()) * (-q).exp()
    }

    /// Total diffuse reflectance by radial quadrature with `samples` points.
    ///
    /// Radii follow $r = -\ln(1 - u)/\sigma_{tr}$ at midpoints in $u$, which
    /// concentrates samples where the profile is large. Falls back to the
    /// closed form when the medium does not absorb.
    pub fn integrated_reflectance(&self, samples: usize) -> f64 {
        if self.sigma_tr < 1e-12 || samples == 0 {
            return self.total_reflectance();
        }
        let n = samples as f64;
        let sum: f64 = (0..samples)
            .map(|i| {
                let u = (i as f64 + 0.5) / n;
                let r = -(1.0 - u).ln() / self.sigma_tr;
                self.profile(r) * 2.0 * PI * r / (self.sigma_tr * (1.0 - u))
            })
            .sum();
        let rd = sum / n;
        if rd.is_finite() && rd <= self.albedo {
            rd
        } else {
            self.total_reflectance()
        }
    }
}

/// Diffuse Fresnel reflectance (polynomial fit).
fn diffuse_fresnel(eta: f64) -> f64 {
    -1.440 / (eta * eta) + 0.710 / eta + 0.668 + 0.0636 * eta
}

/// A translucent slab described by per-channel scattering coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Subsurface {
    /// Absorption coefficient (1/mm) at red, green, blue.
    sigma_a: [f64; 3],
    /// Reduced scattering coefficient (1/mm) at red, green, blue.
    sigma_s_prime: [f64; 3],
    eta: f64,
    thickness_mm: f64,
}

impl Subsurface {
    /// # Errors
    /// Fails on negative coefficients, a non-positive extinction, a
    /// non-positive index or a negative thickness. An infinite thickness
    /// describes a semi-infinite medium.
    pub fn new(
        sigma_a: [f64; 3],
        sigma_s_prime: [f64; 3],
        eta: f64,
        thickness_mm: f64,
    ) -> Result<Self, BuildError> {
        for i in 0..3 {
            error::require_non_negative("sigma_a", sigma_a[i])?;
            error::require_non_negative("sigma_s_prime", sigma_s_prime[i])?;
            error::require_positive("sigma_t", sigma_a[i] + sigma_s_prime[i])?;
        }
        error::require_positive("eta", eta)?;
        if thickness_mm.is_nan() || thickness_mm < 0.0 {
            return Err(BuildError::InvalidParameter {
                name: "thickness_mm",
                value: thickness_mm,
                reason: "must be non-negative",
            });
        }
        Ok(Self {
            sigma_a,
            sigma_s_prime,
            eta,
            thickness_mm,
        })
    }

    /// Caucasian skin.
    pub fn skin() -> Self {
        Self {
            sigma_a: [0.032, 0.17, 0.48],
            sigma_s_prime: [0.74, 0.88, 1.01],
            eta: 1.3,
            thickness_mm: 3.0,
        }
    }

    /// White marble.
    pub fn marble() -> Self {
        Self {
            sigma_a: [0.0021, 0.0041, 0.0071],
            sigma_s_prime: [2.19, 2.62, 3.00],
            eta: 1.5,
            thickness_mm: 20.0,
        }
    }

    /// Whole milk.
    pub fn milk() -> Self {
        Self {
            sigma_a: [0.0011, 0.0024, 0.014],
            sigma_s_prime: [2.55, 3.21, 3.77],
            eta: 1.3,
            thickness_mm: 10.0,
        }
    }

    /// Green nephrite jade.
    pub fn jade() -> Self {
        Self {
            sigma_a: [0.12, 0.02, 0.09],
            sigma_s_prime: [0.45, 0.55, 0.60],
            eta: 1.61,
            thickness_mm: 5.0,
        }
    }

    pub fn eta(&self) -> f64 {
        self.eta
    }

    pub fn thickness_mm(&self) -> f64 {
        self.thickness_mm
    }

    /// Dipole parameters at a wavelength, interpolating the channel
    /// coefficients.
    pub fn params_at(&self, wavelength_nm: f64) -> Result<DipoleParams, OpticsError> {
        error::check_positive("wavelength_nm", wavelength_nm)?;
        let channel = |rgb: &[f64; 3]| {
            interpolate(&CHANNEL_WAVELENGTHS, &[rgb[2], rgb[1], rgb[0]], wavelength_nm)
        };
        let sigma_a = channel(&self.sigma_a);
        let sigma_s = channel(&self.sigma_s_prime);
        let sigma_t = sigma_a + sigma_s;
        let fdr = diffuse_fresnel(self.eta);
        let boundary = (1.0 + fdr) / (1.0 - fdr);
        let z_r = 1.0 / sigma_t;
        Ok(DipoleParams {
            albedo: sigma_s / sigma_t,
            sigma_tr: (3.0 * sigma_a * sigma_t).sqrt(),
            z_r,
            z_v: z_r * (1.0 + 4.0 * boundary / 3.0),
            boundary,
        })
    }

    fn surface_fresnel(&self, cos_i: f64, ctx: &BsdfContext) -> Result<f64, OpticsError> {
        match ctx.quality().fresnel_model() {
            FresnelModel::Schlick => fresnel_schlick(cos_i, 1.0, self.eta),
            _ => Ok(fresnel_full(cos_i, 1.0, self.eta)?.select(ctx.polarization())),
        }
    }
}

impl Bsdf for Subsurface {
    fn name(&self) -> &str {
        "subsurface"
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        let params = self.params_at(wavelength_nm)?;
        let fs = self.surface_fresnel(ctx.cos_theta_i().abs(), ctx)?;
        let rd = match ctx.quality().subsurface_samples() {
            Some(n) => params.integrated_reflectance(n),
            None => params.total_reflectance(),
        };
        let ti = if self.thickness_mm.is_infinite() {
            0.0
        } else {
            beer_lambert_transmittance(params.sigma_tr, self.thickness_mm)?
        };
        let reflectance = fs + (1.0 - fs) * rd;
        let transmittance = (1.0 - fs) * (1.0 - rd) * ti;
        Ok(MaterialResponse::from_reflectance_transmittance(reflectance, transmittance))
    }

    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        if wi[2] <= 0.0 || wo[2] <= 0.0 {
            return 0.0;
        }
        let Ok(params) = self.params_at(wavelength_nm) else {
            return f64::NAN;
        };
        let ft = |c: f64| {
            fresnel_full(c, 1.0, self.eta)
                .map(|f| 1.0 - f.average())
                .unwrap_or(f64::NAN)
        };
        params.total_reflectance() * ft(wi[2]) * ft(wo[2]) / PI
    }
}
