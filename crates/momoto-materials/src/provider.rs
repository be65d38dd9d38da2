//! Material property provider trait.
//!
//! All optical-constant sources implement [`MaterialProvider`], which returns
//! the wavelength-dependent complex refractive index. The dielectric function
//! is derived from it.

use num_complex::Complex64;
use thiserror::Error;

/// Errors from material providers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaterialError {
    #[error("Wavelength {wavelength_nm} nm is outside the data range [{min}, {max}] nm")]
    OutOfRange {
        wavelength_nm: f64,
        min: f64,
        max: f64,
    },

    #[error("Material not found: {0}")]
    NotFound(String),

    #[error("Data error: {0}")]
    DataError(String),
}

/// Provides wavelength-dependent optical constants.
///
/// Implementations include tabulated measurements (metals) and analytic
/// dispersion formulas (glasses, liquids, coatings).
pub trait MaterialProvider: Send + Sync {
    /// Human-readable name of this material.
    fn name(&self) -> &str;

    /// Wavelength range over which data is available (nm).
    fn wavelength_range(&self) -> (f64, f64);

    /// Complex refractive index $\tilde{n} = n + ik$ at a given wavelength.
    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError>;

    /// Complex dielectric function $\epsilon = \tilde{n}^2$.
    fn dielectric_function(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        let n = self.refractive_index(wavelength_nm)?;
        Ok(n * n)
    }

    /// Check that a wavelength lies inside [`wavelength_range`](Self::wavelength_range).
    fn check_range(&self, wavelength_nm: f64) -> Result<(), MaterialError> {
        let (min, max) = self.wavelength_range();
        if !wavelength_nm.is_finite() || wavelength_nm < min || wavelength_nm > max {
            return Err(MaterialError::OutOfRange {
                wavelength_nm,
                min,
                max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CauchyDielectric;

    #[test]
    fn test_dielectric_function_is_square_of_index() {
        let m = CauchyDielectric::constant("absorber", 0.5)
            .unwrap()
            .with_extinction(2.0)
            .unwrap();
        let eps = m.dielectric_function(550.0).unwrap();
        // ε₁ = n² − k², ε₂ = 2nk
        assert!((eps.re - (0.25 - 4.0)).abs() < 1e-12);
        assert!((eps.im - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_wavelength_is_out_of_range() {
        let m = CauchyDielectric::constant("n = 1.5", 1.5).unwrap();
        assert!(matches!(
            m.refractive_index(f64::NAN),
            Err(MaterialError::OutOfRange { .. })
        ));
        assert!(matches!(
            m.refractive_index(f64::INFINITY),
            Err(MaterialError::OutOfRange { .. })
        ));
    }
}
