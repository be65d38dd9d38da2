//! Henyey–Greenstein phase function.
//!
//! $$p(\cos\theta) = \frac{1}{4\pi}\,\frac{1 - g^2}{(1 + g^2 - 2g\cos\theta)^{3/2}}$$
//!
//! normalised over the sphere, with asymmetry parameter $g \in (-1, 1)$.

use std::f64::consts::PI;

use crate::error::{check_cosine, domain, OpticsError};

fn check_asymmetry(g: f64) -> Result<f64, OpticsError> {
    if g.is_finite() && g > -1.0 && g < 1.0 {
        Ok(g)
    } else {
        Err(domain("g", g, "(-1, 1)"))
    }
}

/// Phase function value per steradian.
pub fn henyey_greenstein(cos_theta: f64, g: f64) -> Result<f64, OpticsError> {
    check_cosine("cos_theta", cos_theta)?;
    check_asymmetry(g)?;
    let denom = 1.0 + g * g - 2.0 * g * cos_theta;
    Ok((1.0 - g * g) / (4.0 * PI * denom * denom.sqrt()))
}

/// Fraction of scattered energy sent into the backward hemisphere
/// ($\cos\theta < 0$).
///
/// $$F_b = \frac{1 - g^2}{2g}\left(\frac{1}{\sqrt{1 + g^2}} - \frac{1}{1 + g}\right)$$
pub fn hg_backscatter_fraction(g: f64) -> Result<f64, OpticsError> {
    check_asymmetry(g)?;
    if g.abs() < 1e-8 {
        return Ok(0.5);
    }
    Ok((1.0 - g * g) / (2.0 * g) * (1.0 / (1.0 + g * g).sqrt() - 1.0 / (1.0 + g)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Midpoint integral of the phase function over the sphere.
    fn sphere_integral(g: f64, lo: f64, hi: f64) -> f64 {
        let n = 20_000;
        let h = (hi - lo) / n as f64;
        (0..n)
            .map(|i| {
                let mu = lo + (i as f64 + 0.5) * h;
                2.0 * PI * henyey_greenstein(mu, g).unwrap() * h
            })
            .sum()
    }

    #[test]
    fn test_normalised_over_sphere() {
        for &g in &[-0.7, -0.2, 0.0, 0.3, 0.85] {
            assert_abs_diff_eq!(sphere_integral(g, -1.0, 1.0), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_isotropic_when_g_is_zero() {
        let p = henyey_greenstein(0.3, 0.0).unwrap();
        assert_abs_diff_eq!(p, 1.0 / (4.0 * PI), epsilon = 1e-15);
    }

    #[test]
    fn test_forward_peak() {
        let fwd = henyey_greenstein(1.0, 0.8).unwrap();
        let back = henyey_greenstein(-1.0, 0.8).unwrap();
        assert!(fwd > 100.0 * back);
    }

    #[test]
    fn test_backscatter_fraction_matches_integral() {
        for &g in &[-0.5, 0.1, 0.6, 0.9] {
            let numeric = sphere_integral(g, -1.0, 0.0);
            assert_abs_diff_eq!(hg_backscatter_fraction(g).unwrap(), numeric, epsilon = 1e-4);
        }
        assert_eq!(hg_backscatter_fraction(0.0).unwrap(), 0.5);
    }

    #[test]
    fn test_asymmetry_domain() {
        assert!(henyey_greenstein(0.5, 1.0).is_err());
        assert!(henyey_greenstein(0.5, -1.0).is_err());
        assert!(henyey_greenstein(1.5, 0.2).is_err());
        assert!(hg_backscatter_fraction(f64::NAN).is_err());
    }
}
