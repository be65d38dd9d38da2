//! Interference coatings and structural colour.
//!
//! Wraps a [`TmmSolver`]. At the Fast and Standard tiers a single lossless
//! film in air is evaluated with the Airy closed form instead of the
//! matrix product; both give the same answer.
//!
//! A free-standing liquid film drains under gravity. With a drainage time
//! constant $\tau$ every layer thins as $d(t) = d_0 e^{-t/\tau}$, where $t$
//! is the evaluation time carried by the context.

use num_complex::Complex64;

use crate::error::{self, BuildError, OpticsError};
use crate::thin_film::{thin_film_reflectance_polarized, TmmSolver};
use crate::types::{BsdfContext, MaterialResponse, Polarization, Vec3};

use super::microfacet::{microfacet_reflection, roughness_to_alpha};
use super::Bsdf;

/// Smallest incidence cosine handed to the solver; grazing light is
/// reflected completely.
const GRAZING_COS: f64 = 1e-9;

/// A thin-film coated surface.
#[derive(Debug, Clone)]
pub struct ThinFilm {
    solver: TmmSolver,
    roughness: f64,
    drainage_time_s: Option<f64>,
}

impl ThinFilm {
    pub fn new(solver: TmmSolver) -> Self {
        Self {
            solver,
            roughness: 0.0,
            drainage_time_s: None,
        }
    }

    pub fn soap_bubble() -> Self {
        Self::new(TmmSolver::soap_bubble())
    }

    pub fn oil_slick() -> Self {
        Self::new(TmmSolver::oil_slick())
    }

    pub fn morpho() -> Self {
        Self::new(TmmSolver::morpho())
    }

    pub fn nacre() -> Self {
        Self::new(TmmSolver::nacre())
    }

    pub fn ar_coating() -> Self {
        Self::new(TmmSolver::ar_coating())
    }

    /// # Errors
    /// Fails when `roughness` is outside [0, 1].
    pub fn with_roughness(mut self, roughness: f64) -> Result<Self, BuildError> {
        self.roughness = error::require_unit_interval("roughness", roughness)?;
        Ok(self)
    }

    /// Enable drainage with time constant `tau_s` seconds.
    pub fn with_drainage(mut self, tau_s: f64) -> Result<Self, BuildError> {
        self.drainage_time_s = Some(error::require_positive("drainage_time_s", tau_s)?);
        Ok(self)
    }

    pub fn solver(&self) -> &TmmSolver {
        &self.solver
    }

    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    /// Layer thickness multiplier at time `time_s`.
    pub fn thickness_scale(&self, time_s: f64) -> f64 {
        match self.drainage_time_s {
            Some(tau) if time_s > 0.0 => (-time_s / tau).exp(),
            _ => 1.0,
        }
    }

    /// Reflectance and transmittance for one polarisation state.
    fn reflect_transmit(
        &self,
        wavelength_nm: f64,
        cos_theta: f64,
        scale: f64,
        polarization: Polarization,
        airy: bool,
    ) -> Result<(f64, f64), OpticsError> {
        if airy {
            if let Some((film, substrate)) = self.solver.single_lossless_film() {
                let n_film = film.index().at(wavelength_nm)?;
                let n_sub = substrate.at(wavelength_nm)?;
                let f = thin_film_reflectance_polarized(
                    film.thickness_nm() * scale,
                    Complex64::new(n_film.re, 0.0),
                    Complex64::new(n_sub.re, 0.0),
                    wavelength_nm,
                    cos_theta,
                )?;
                let r = f.select(polarization);
                return Ok((r, 1.0 - r));
            }
        }
        let result = self.solver.solve_scaled(wavelength_nm, cos_theta, scale)?;
        let transmittance = if self.solver.substrate_absorbs() {
            0.0
        } else {
            result.transmittance(polarization)
        };
        Ok((result.reflectance(polarization), transmittance))
    }
}

impl Bsdf for ThinFilm {
    fn name(&self) -> &str {
        "thin_film"
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        error::check_positive("wavelength_nm", wavelength_nm)?;
        let cos_i = ctx.cos_theta_i().abs();
        if cos_i < GRAZING_COS {
            return Ok(MaterialResponse::opaque(1.0));
        }
        let scale = self.thickness_scale(ctx.material().time_s);
        let (r, t) = self.reflect_transmit(
            wavelength_nm,
            cos_i,
            scale,
            ctx.polarization(),
            ctx.quality().allows_airy_shortcut(),
        )?;
        Ok(MaterialResponse::from_reflectance_transmittance(r, t))
    }

    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        let alpha = roughness_to_alpha(self.roughness);
        microfacet_reflection(wi, wo, alpha, alpha, |c| {
            self.solver
                .solve_cos(wavelength_nm, c.clamp(GRAZING_COS, 1.0))
                .map(|r| r.reflectance(Polarization::Unpolarized))
                .unwrap_or(f64::NAN)
        })
    }
}
