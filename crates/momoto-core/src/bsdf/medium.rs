//! Participating media: a slab of suspended spherical particles.
//!
//! Mie theory gives the per-particle extinction cross-section $C_{ext}$,
//! the single-scattering albedo $\omega$ and asymmetry $g$. Along a path of
//! length $L$ through $N$ particles per unit volume,
//!
//! $$T_d = e^{-N C_{ext} L / \cos\theta}$$
//!
//! survives unscattered. Of the intercepted light a share $\omega$ is
//! scattered, split between backward and forward hemispheres by the
//! Henyey–Greenstein backscatter fraction $F_b(g)$; the rest is absorbed.

use crate::error::{self, BuildError, OpticsError};
use crate::optics::{henyey_greenstein, hg_backscatter_fraction, mie_cross_sections, MieCrossSections};
use crate::types::{dot, BsdfContext, ComplexIor, IndexModel, MaterialResponse, Vec3};

use super::Bsdf;

/// nm² to µm².
const NM2_TO_UM2: f64 = 1e-6;

/// Largest |g| passed to the phase function.
const MAX_ASYMMETRY: f64 = 0.999_999;

/// A layer of particles suspended in a host medium.
#[derive(Debug, Clone)]
pub struct MieMedium {
    particle: IndexModel,
    radius_nm: f64,
    medium_n: f64,
    number_density_per_um3: f64,
    path_length_um: f64,
}

impl MieMedium {
    /// # Errors
    /// Fails unless radius, host index, density and path length are all
    /// positive.
    pub fn new(
        particle: impl Into<IndexModel>,
        radius_nm: f64,
        medium_n: f64,
        number_density_per_um3: f64,
        path_length_um: f64,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            particle: particle.into(),
            radius_nm: error::require_positive("radius_nm", radius_nm)?,
            medium_n: error::require_positive("medium_n", medium_n)?,
            number_density_per_um3: error::require_positive(
                "number_density_per_um3",
                number_density_per_um3,
            )?,
            path_length_um: error::require_positive("path_length_um", path_length_um)?,
        })
    }

    /// 2 µm water droplets over 200 m of air.
    pub fn fog() -> Self {
        Self {
            particle: IndexModel::Constant(ComplexIor { n: 1.333, k: 0.0 }),
            radius_nm: 2000.0,
            medium_n: 1.0,
            number_density_per_um3: 1e-10,
            path_length_um: 2e8,
        }
    }

    /// Fat globules in 1 mm of water.
    pub fn dilute_milk() -> Self {
        Self {
            particle: IndexModel::Constant(ComplexIor { n: 1.46, k: 0.0 }),
            radius_nm: 250.0,
            medium_n: 1.33,
            number_density_per_um3: 0.01,
            path_length_um: 1000.0,
        }
    }

    /// Soot aggregates in 1 mm of air.
    pub fn smoke() -> Self {
        Self {
            particle: IndexModel::Constant(ComplexIor { n: 1.75, k: 0.44 }),
            radius_nm: 60.0,
            medium_n: 1.0,
            number_density_per_um3: 0.1,
            path_length_um: 1000.0,
        }
    }

    /// Fine non-absorbing aerosol, much smaller than the wavelength.
    pub fn haze() -> Self {
        Self {
            particle: IndexModel::Constant(ComplexIor { n: 1.5, k: 0.0 }),
            radius_nm: 20.0,
            medium_n: 1.0,
            number_density_per_um3: 1.0,
            path_length_um: 1e5,
        }
    }

    pub fn radius_nm(&self) -> f64 {
        self.radius_nm
    }

    pub fn path_length_um(&self) -> f64 {
        self.path_length_um
    }

    /// Single-particle cross-sections at a wavelength.
    pub fn cross_sections(&self, wavelength_nm: f64) -> Result<MieCrossSections, OpticsError> {
        let m = self.particle.at(wavelength_nm)?;
        mie_cross_sections(self.radius_nm, wavelength_nm, m, self.medium_n)
    }

    /// Optical depth at normal incidence.
    pub fn optical_depth(&self, wavelength_nm: f64) -> Result<f64, OpticsError> {
        let c = self.cross_sections(wavelength_nm)?;
        Ok(self.number_density_per_um3 * c.extinction * NM2_TO_UM2 * self.path_length_um)
    }

    fn albedo(c: &MieCrossSections) -> f64 {
        if c.extinction > 0.0 {
            (c.scattering / c.extinction).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Bsdf for MieMedium {
    fn name(&self) -> &str {
        "mie_medium"
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        let c = self.cross_sections(wavelength_nm)?;
        let cos_i = ctx.cos_theta_i().abs().max(1e-6);
        let tau = self.number_density_per_um3 * c.extinction * NM2_TO_UM2 * self.path_length_um
            / cos_i;
        let direct = (-tau).exp();
        let omega = Self::albedo(&c);
        let back = hg_backscatter_fraction(c.asymmetry.clamp(-MAX_ASYMMETRY, MAX_ASYMMETRY))?;
        let scattered = (1.0 - direct) * omega;
        Ok(MaterialResponse::from_reflectance_transmittance(
            scattered * back,
            direct + scattered * (1.0 - back),
        ))
    }

    /// Single-scattering albedo times the phase function at the angle
    /// between the propagation direction $-\omega_i$ and $\omega_o$.
    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        let Ok(c) = self.cross_sections(wavelength_nm) else {
            return f64::NAN;
        };
        let cos = (-dot(wi, wo)).clamp(-1.0, 1.0);
        let g = c.asymmetry.clamp(-MAX_ASYMMETRY, MAX_ASYMMETRY);
        henyey_greenstein(cos, g).map_or(f64::NAN, |p| Self::albedo(&c) * p)
    }
}
