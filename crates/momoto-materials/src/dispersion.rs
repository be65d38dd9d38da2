//! Analytic dispersion models for transparent dielectrics.
//!
//! Glasses, liquids, and coating materials are described by the Cauchy
//! relation
//!
//! $$ n(\lambda) = A + \frac{B}{\lambda^2} + \frac{C}{\lambda^4}, \qquad \lambda \text{ in µm} $$
//!
//! with an optional constant extinction coefficient $k$ for weakly
//! absorbing media.
//!
//! ## Available materials
//!
//! | Method | n at 587.6 nm |
//! |--------|---------------|
//! | [`CauchyDielectric::crown_glass()`] | 1.517 |
//! | [`CauchyDielectric::fused_silica()`] | 1.459 |
//! | [`CauchyDielectric::water()`] | 1.333 |
//! | [`CauchyDielectric::soap_film()`] | 1.330 (non-dispersive) |
//! | [`CauchyDielectric::mineral_oil()`] | 1.472 |
//! | [`CauchyDielectric::magnesium_fluoride()`] | 1.384 |
//! | [`CauchyDielectric::titanium_dioxide()`] | 2.55 |
//! | [`CauchyDielectric::chitin()`] | 1.557 |
//! | [`CauchyDielectric::aragonite()`] | 1.678 |

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::provider::{MaterialError, MaterialProvider};

/// Visible-band validity range shared by the Cauchy presets (nm).
const VISIBLE_RANGE_NM: (f64, f64) = (380.0, 780.0);

/// A dielectric described by Cauchy coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauchyDielectric {
    name: String,
    /// Constant term.
    pub a: f64,
    /// Coefficient of $\lambda^{-2}$ (µm²).
    pub b: f64,
    /// Coefficient of $\lambda^{-4}$ (µm⁴).
    pub c: f64,
    /// Extinction coefficient, constant across the band.
    pub k: f64,
    range_nm: (f64, f64),
}

impl CauchyDielectric {
    /// Construct a dielectric from Cauchy coefficients.
    ///
    /// # Errors
    /// Fails if any coefficient is non-finite, `a` is not positive, or `k`
    /// is negative.
    pub fn new(name: impl Into<String>, a: f64, b: f64, c: f64) -> Result<Self, MaterialError> {
        if !(a.is_finite() && b.is_finite() && c.is_finite()) || a <= 0.0 {
            return Err(MaterialError::DataError(format!(
                "invalid Cauchy coefficients A={a}, B={b}, C={c}"
            )));
        }
        Ok(Self {
            name: name.into(),
            a,
            b,
            c,
            k: 0.0,
            range_nm: VISIBLE_RANGE_NM,
        })
    }

    /// A non-dispersive dielectric with index `n`.
    pub fn constant(name: impl Into<String>, n: f64) -> Result<Self, MaterialError> {
        Self::new(name, n, 0.0, 0.0)
    }

    /// Add a constant extinction coefficient.
    pub fn with_extinction(mut self, k: f64) -> Result<Self, MaterialError> {
        if !k.is_finite() || k < 0.0 {
            return Err(MaterialError::DataError(format!(
                "extinction coefficient {k} must be finite and non-negative"
            )));
        }
        self.k = k;
        Ok(self)
    }

    fn preset(name: &str, a: f64, b: f64) -> Self {
        Self {
            name: name.into(),
            a,
            b,
            c: 0.0,
            k: 0.0,
            range_nm: VISIBLE_RANGE_NM,
        }
    }

    /// Borosilicate crown glass (BK7-like).
    pub fn crown_glass() -> Self {
        Self::preset("crown glass", 1.5046, 0.00420)
    }

    /// Fused silica (amorphous SiO₂).
    pub fn fused_silica() -> Self {
        Self::preset("fused silica", 1.4484, 0.00354)
    }

    /// Liquid water at room temperature.
    pub fn water() -> Self {
        Self::preset("water", 1.3240, 0.00313)
    }

    /// Soap film, treated as non-dispersive at n = 1.33.
    pub fn soap_film() -> Self {
        Self::preset("soap film", 1.33, 0.0)
    }

    /// Light mineral oil, as found in oil-on-water films.
    pub fn mineral_oil() -> Self {
        Self::preset("mineral oil", 1.4600, 0.00420)
    }

    /// Magnesium fluoride, the classic single-layer anti-reflection coating.
    pub fn magnesium_fluoride() -> Self {
        Self::preset("MgF2", 1.3770, 0.00250)
    }

    /// Titanium dioxide (rutile), the high-index layer of dielectric mirrors.
    pub fn titanium_dioxide() -> Self {
        Self::preset("TiO2", 2.3250, 0.07760)
    }

    /// Chitin, the cuticle material of butterfly-wing scales.
    pub fn chitin() -> Self {
        Self::preset("chitin", 1.5400, 0.00600)
    }

    /// Aragonite (CaCO₃), the platelet material of nacre.
    pub fn aragonite() -> Self {
        Self::preset("aragonite", 1.6650, 0.00450)
    }

    /// Real part of the index at a wavelength, without range checking.
    pub fn real_index(&self, wavelength_nm: f64) -> f64 {
        let lam_um = wavelength_nm * 1e-3;
        let lam2 = lam_um * lam_um;
        self.a + self.b / lam2 + self.c / (lam2 * lam2)
    }
}

impl MaterialProvider for CauchyDielectric {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        self.range_nm
    }

    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        self.check_range(wavelength_nm)?;
        Ok(Complex64::new(self.real_index(wavelength_nm), self.k))
    }
}
