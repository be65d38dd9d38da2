//! Sampled spectra and colorimetry.
//!
//! A [`Spectrum`] is a sequence of `(wavelength, value)` samples with
//! strictly increasing wavelengths. Values are non-negative unless the
//! spectrum was built with [`Spectrum::new_signed`].
//!
//! The canonical grid is 31 bands from 400 to 700 nm at 10 nm spacing;
//! colour conversion resamples onto it and integrates against the CIE 1931
//! colour-matching functions in [`cie`].

pub mod cie;
pub mod upsample;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

pub use upsample::{rgb_to_spectrum, srgb_to_spectrum};

/// First wavelength of the canonical grid (nm).
pub const CANONICAL_START_NM: f64 = 400.0;
/// Spacing of the canonical grid (nm).
pub const CANONICAL_STEP_NM: f64 = 10.0;
/// Number of canonical bands.
pub const CANONICAL_BANDS: usize = 31;

/// The canonical wavelengths, 400..=700 nm.
pub fn canonical_wavelengths() -> Vec<f64> {
    (0..CANONICAL_BANDS)
        .map(|i| CANONICAL_START_NM + CANONICAL_STEP_NM * i as f64)
        .collect()
}

/// A sampled spectral distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    wavelengths: Vec<f64>,
    values: Vec<f64>,
    signed: bool,
}

impl Spectrum {
    /// A non-negative spectrum.
    ///
    /// # Errors
    /// Fails on length mismatch, an empty sample set, non-increasing or
    /// non-positive wavelengths, and negative or non-finite values.
    pub fn new(wavelengths: Vec<f64>, values: Vec<f64>) -> Result<Self, BuildError> {
        Self::validated(wavelengths, values, false)
    }

    /// A spectrum whose values may be negative (difference spectra, basis
    /// functions).
    pub fn new_signed(wavelengths: Vec<f64>, values: Vec<f64>) -> Result<Self, BuildError> {
        Self::validated(wavelengths, values, true)
    }

    fn validated(wavelengths: Vec<f64>, values: Vec<f64>, signed: bool) -> Result<Self, BuildError> {
        if wavelengths.len() != values.len() {
            return Err(BuildError::InvalidSpectrum(format!(
                "{} wavelengths but {} values",
                wavelengths.len(),
                values.len()
            )));
        }
        if wavelengths.is_empty() {
            return Err(BuildError::InvalidSpectrum("no samples".into()));
        }
        if let Some(w) = wavelengths.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(BuildError::InvalidSpectrum(format!("wavelength {w} nm is not positive")));
        }
        if let Some(pair) = wavelengths.windows(2).find(|p| p[1] <= p[0]) {
            return Err(BuildError::InvalidSpectrum(format!(
                "wavelengths must be strictly increasing ({} then {})",
                pair[0], pair[1]
            )));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite() || (!signed && **v < 0.0)) {
            return Err(BuildError::InvalidSpectrum(format!("invalid sample value {v}")));
        }
        Ok(Self {
            wavelengths,
            values,
            signed,
        })
    }

    /// Construct without validation; callers guarantee the invariants.
    pub(crate) fn from_parts(wavelengths: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            wavelengths,
            values,
            signed: false,
        }
    }

    /// A spectrum on the canonical grid.
    pub fn canonical(values: Vec<f64>) -> Result<Self, BuildError> {
        if values.len() != CANONICAL_BANDS {
            return Err(BuildError::InvalidSpectrum(format!(
                "canonical spectra have {CANONICAL_BANDS} bands, got {}",
                values.len()
            )));
        }
        Self::new(canonical_wavelengths(), values)
    }

    /// A flat spectrum on the canonical grid.
    pub fn constant(value: f64) -> Result<Self, BuildError> {
        Self::canonical(vec![value; CANONICAL_BANDS])
    }

    /// The equal-energy illuminant E.
    pub fn equal_energy() -> Self {
        Self::from_parts(canonical_wavelengths(), vec![1.0; CANONICAL_BANDS])
    }

    /// CIE D65, scaled to 100 at 560 nm.
    pub fn d65() -> Self {
        Self::from_parts(canonical_wavelengths(), cie::D65.to_vec())
    }

    /// Sample `f` on the canonical grid.
    pub fn from_fn(f: impl Fn(f64) -> f64) -> Result<Self, BuildError> {
        let wavelengths = canonical_wavelengths();
        let values = wavelengths.iter().map(|&w| f(w)).collect();
        Self::new(wavelengths, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.wavelengths.iter().copied().zip(self.values.iter().copied())
    }

    /// Linear interpolation, clamped to the end samples outside the range.
    pub fn value_at(&self, wavelength_nm: f64) -> f64 {
        interpolate(&self.wavelengths, &self.values, wavelength_nm)
    }

    /// Resample onto the canonical grid.
    pub fn resample_canonical(&self) -> Self {
        let wavelengths = canonical_wavelengths();
        let values = wavelengths.iter().map(|&w| self.value_at(w)).collect();
        Self {
            wavelengths,
            values,
            signed: self.signed,
        }
    }

    /// Pointwise product with another spectrum sampled on the same grid.
    pub fn multiply(&self, other: &Spectrum) -> Result<Self, BuildError> {
        if self.wavelengths != other.wavelengths {
            return Err(BuildError::InvalidSpectrum(
                "cannot multiply spectra on different grids".into(),
            ));
        }
        let values = self.values.iter().zip(&other.values).map(|(a, b)| a * b).collect();
        Ok(Self {
            wavelengths: self.wavelengths.clone(),
            values,
            signed: self.signed || other.signed,
        })
    }

    /// Multiply every sample by `factor`.
    pub fn scaled(&self, factor: f64) -> Result<Self, BuildError> {
        let values = self.values.iter().map(|v| v * factor).collect();
        Self::validated(self.wavelengths.clone(), values, self.signed)
    }

    /// CIE XYZ, normalised so that a flat unit spectrum has $Y = 1$.
    pub fn to_xyz(&self) -> [f64; 3] {
        let norm: f64 = cie::CIE_Y.iter().sum();
        let mut xyz = [0.0; 3];
        for i in 0..CANONICAL_BANDS {
            let v = self.value_at(CANONICAL_START_NM + CANONICAL_STEP_NM * i as f64);
            xyz[0] += cie::CIE_X[i] * v;
            xyz[1] += cie::CIE_Y[i] * v;
            xyz[2] += cie::CIE_Z[i] * v;
        }
        xyz.map(|c| c / norm)
    }

    /// Colour of a reflectance spectrum seen under `illuminant`, normalised
    /// so that a perfect white reflector has $Y = 1$.
    pub fn reflected_xyz(&self, illuminant: &Spectrum) -> [f64; 3] {
        let mut xyz = [0.0; 3];
        let mut norm = 0.0;
        for i in 0..CANONICAL_BANDS {
            let w = CANONICAL_START_NM + CANONICAL_STEP_NM * i as f64;
            let e = illuminant.value_at(w);
            let v = self.value_at(w) * e;
            xyz[0] += cie::CIE_X[i] * v;
            xyz[1] += cie::CIE_Y[i] * v;
            xyz[2] += cie::CIE_Z[i] * v;
            norm += cie::CIE_Y[i] * e;
        }
        if norm > 0.0 {
            xyz.map(|c| c / norm)
        } else {
            [0.0; 3]
        }
    }

    /// Linear sRGB from [`to_xyz`](Self::to_xyz). Components may fall
    /// outside [0, 1] for out-of-gamut spectra.
    pub fn to_linear_rgb(&self) -> [f64; 3] {
        cie::mat3_mul_vec(&cie::XYZ_TO_LINEAR_SRGB, &self.to_xyz())
    }

    /// Gamma-encoded sRGB, clipped to [0, 1].
    pub fn to_srgb(&self) -> [f64; 3] {
        self.to_linear_rgb().map(|c| cie::srgb_encode(c.clamp(0.0, 1.0)))
    }
}

/// Piecewise-linear interpolation over increasing `xs`, clamped at the ends.
pub(crate) fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    match xs.len() {
        0 => 0.0,
        1 => ys[0],
        n => {
            if x <= xs[0] {
                return ys[0];
            }
            if x >= xs[n - 1] {
                return ys[n - 1];
            }
            let hi = xs.partition_point(|&w| w < x);
            let lo = hi - 1;
            let t = (x - xs[lo]) / (xs[hi] - xs[lo]);
            ys[lo] + t * (ys[hi] - ys[lo])
        }
    }
}
