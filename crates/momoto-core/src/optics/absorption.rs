//! Bulk attenuation.
//!
//! Beer–Lambert law $T = e^{-\alpha d}$ and the conversion from the
//! extinction coefficient $k$ to an absorption coefficient
//! $\alpha = 4\pi k / \lambda$.

use std::f64::consts::PI;

use crate::error::{check_non_negative, check_positive, OpticsError};

/// Fraction of light surviving a path of length `distance` through a medium
/// with absorption coefficient `alpha`.
///
/// Units are the caller's choice as long as they agree (1/mm with mm, 1/nm
/// with nm). Zero distance or zero absorption transmits everything.
pub fn beer_lambert_transmittance(alpha: f64, distance: f64) -> Result<f64, OpticsError> {
    check_non_negative("alpha", alpha)?;
    check_non_negative("distance", distance)?;
    Ok((-alpha * distance).exp())
}

/// Absorption coefficient in 1/nm for extinction coefficient `k`.
pub fn absorption_coefficient(k: f64, wavelength_nm: f64) -> Result<f64, OpticsError> {
    check_non_negative("k", k)?;
    check_positive("wavelength_nm", wavelength_nm)?;
    Ok(4.0 * PI * k / wavelength_nm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_one_absorption_length() {
        let t = beer_lambert_transmittance(0.5, 2.0).unwrap();
        assert_abs_diff_eq!(t, (-1.0_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn test_zero_path_is_transparent() {
        assert_eq!(beer_lambert_transmittance(3.0, 0.0).unwrap(), 1.0);
        assert_eq!(beer_lambert_transmittance(0.0, 10.0).unwrap(), 1.0);
    }

    #[test]
    fn test_negative_inputs_rejected() {
        assert!(beer_lambert_transmittance(-0.1, 1.0).is_err());
        assert!(beer_lambert_transmittance(0.1, -1.0).is_err());
        assert!(absorption_coefficient(0.1, 0.0).is_err());
    }

    #[test]
    fn test_gold_skin_depth_scale() {
        // Gold at 550 nm: 1/alpha is a few tens of nanometres.
        let alpha = absorption_coefficient(2.92, 550.0).unwrap();
        let depth = 1.0 / alpha;
        assert!(depth > 10.0 && depth < 20.0, "penetration depth {depth} nm");
    }
}
