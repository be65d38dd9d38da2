//! Lorenz–Mie theory for homogeneous spheres.
//!
//! Computes extinction, scattering and absorption efficiencies together with
//! the asymmetry parameter $g = \langle\cos\theta\rangle$. The Riccati–Bessel
//! functions are generated by upward recurrence and the logarithmic
//! derivative $D_n(mx)$ by downward recurrence, which stays stable for
//! absorbing spheres.
//!
//! # Reference
//! Bohren & Huffman, *Absorption and Scattering of Light by Small Particles*
//! (1983), Appendix A.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{check_positive, domain, OpticsError};

/// Largest size parameter accepted; the series length grows with `x`.
pub const MAX_SIZE_PARAMETER: f64 = 20_000.0;

/// Dimensionless Mie efficiencies (cross-section over geometric area).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MieEfficiencies {
    pub q_ext: f64,
    pub q_sca: f64,
    pub q_abs: f64,
    /// Asymmetry parameter $\langle\cos\theta\rangle$.
    pub g: f64,
}

impl MieEfficiencies {
    /// Single-scattering albedo $\omega = Q_{sca}/Q_{ext}$.
    pub fn albedo(&self) -> f64 {
        if self.q_ext > 0.0 {
            (self.q_sca / self.q_ext).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Physical cross-sections of a sphere in nm².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MieCrossSections {
    pub extinction: f64,
    pub scattering: f64,
    pub absorption: f64,
    pub asymmetry: f64,
}

/// Size parameter $x = 2\pi n_{med} r / \lambda$.
pub fn size_parameter(radius_nm: f64, wavelength_nm: f64, n_medium: f64) -> Result<f64, OpticsError> {
    check_positive("radius_nm", radius_nm)?;
    check_positive("wavelength_nm", wavelength_nm)?;
    check_positive("n_medium", n_medium)?;
    Ok(2.0 * PI * n_medium * radius_nm / wavelength_nm)
}

/// Mie efficiencies for size parameter `x` and relative index `m`.
pub fn mie_efficiencies(x: f64, m: Complex64) -> Result<MieEfficiencies, OpticsError> {
    if !(x.is_finite() && x > 0.0 && x <= MAX_SIZE_PARAMETER) {
        return Err(domain("size_parameter", x, "(0, 20000]"));
    }
    if !(m.re.is_finite() && m.re > 0.0) {
        return Err(domain("m.re", m.re, "(0, inf)"));
    }
    if !(m.im.is_finite() && m.im >= 0.0) {
        return Err(domain("m.im", m.im, "[0, inf)"));
    }

    let n_stop = (x + 4.0 * x.cbrt() + 2.0) as usize;
    let y = m * x;
    let n_max = (n_stop as f64).max(y.norm()) as usize + 15;

    // Logarithmic derivative D_n(y), downward from D_{n_max} = 0.
    let mut d = vec![Complex64::new(0.0, 0.0); n_max + 1];
    for n in (2..=n_max).rev() {
        let en = Complex64::new(n as f64, 0.0) / y;
        d[n - 1] = en - 1.0 / (d[n] + en);
    }

    let mut psi0 = x.cos();
    let mut psi1 = x.sin();
    let mut chi0 = -x.sin();
    let mut chi1 = x.cos();
    let mut xi1 = Complex64::new(psi1, -chi1);

    let mut q_sca = 0.0;
    let mut q_ext = 0.0;
    let mut g_sum = 0.0;
    let mut prev: Option<(Complex64, Complex64)> = None;

    for n in 1..=n_stop {
        let en = n as f64;
        let psi = (2.0 * en - 1.0) * psi1 / x - psi0;
        let chi = (2.0 * en - 1.0) * chi1 / x - chi0;
        let xi = Complex64::new(psi, -chi);

        let da = d[n] / m + en / x;
        let db = m * d[n] + en / x;
        let an = (da * psi - psi1) / (da * xi - xi1);
        let bn = (db * psi - psi1) / (db * xi - xi1);

        q_sca += (2.0 * en + 1.0) * (an.norm_sqr() + bn.norm_sqr());
        q_ext += (2.0 * en + 1.0) * (an + bn).re;
        g_sum += (2.0 * en + 1.0) / (en * (en + 1.0)) * (an * bn.conj()).re;
        if let Some((a_prev, b_prev)) = prev {
            g_sum += (en - 1.0) * (en + 1.0) / en * (a_prev * an.conj() + b_prev * bn.conj()).re;
        }

        psi0 = psi1;
        psi1 = psi;
        chi0 = chi1;
        chi1 = chi;
        xi1 = Complex64::new(psi1, -chi1);
        prev = Some((an, bn));
    }

    let g = if q_sca > 0.0 { 2.0 * g_sum / q_sca } else { 0.0 };
    let scale = 2.0 / (x * x);
    let q_sca = q_sca * scale;
    let q_ext = q_ext * scale;
    Ok(MieEfficiencies {
        q_ext,
        q_sca,
        q_abs: (q_ext - q_sca).max(0.0),
        g,
    })
}

/// Cross-sections of a sphere of radius `radius_nm` with complex index
/// `m_particle`, embedded in a medium of real index `n_medium`.
pub fn mie_cross_sections(
    radius_nm: f64,
    wavelength_nm: f64,
    m_particle: Complex64,
    n_medium: f64,
) -> Result<MieCrossSections, OpticsError> {
    let x = size_parameter(radius_nm, wavelength_nm, n_medium)?;
    let q = mie_efficiencies(x, m_particle / n_medium)?;
    let area = PI * radius_nm * radius_nm;
    Ok(MieCrossSections {
        extinction: q.q_ext * area,
        scattering: q.q_sca * area,
        absorption: q.q_abs * area,
        asymmetry: q.g,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn rayleigh_factor(m: Complex64) -> Complex64 {
        (m * m - 1.0) / (m * m + 2.0)
    }

    #[test]
    fn test_rayleigh_limit_scattering() {
        let x = 0.05;
        let m = Complex64::new(1.5, 0.0);
        let q = mie_efficiencies(x, m).unwrap();
        let expected = 8.0 / 3.0 * x.powi(4) * rayleigh_factor(m).norm_sqr();
        assert_relative_eq!(q.q_sca, expected, max_relative = 0.01);
        assert_abs_diff_eq!(q.g, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_rayleigh_limit_absorption() {
        let x = 0.1;
        let m = Complex64::new(1.5, 0.5);
        let q = mie_efficiencies(x, m).unwrap();
        let expected = 4.0 * x * rayleigh_factor(m).im;
        assert_relative_eq!(q.q_abs, expected, max_relative = 0.02);
    }

    #[test]
    fn test_lossless_sphere_does_not_absorb() {
        let q = mie_efficiencies(1.0, Complex64::new(1.33, 0.0)).unwrap();
        assert!(q.q_abs < 1e-10, "q_abs = {}", q.q_abs);
        assert_abs_diff_eq!(q.albedo(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extinction_paradox_for_large_spheres() {
        let q = mie_efficiencies(50.0, Complex64::new(1.33, 0.0)).unwrap();
        assert!(q.q_ext > 1.9 && q.q_ext < 2.1, "q_ext = {}", q.q_ext);
        assert!(q.g > 0.8, "large droplets scatter forward, g = {}", q.g);
    }

    #[test]
    fn test_absorbing_sphere_partition() {
        let q = mie_efficiencies(3.0, Complex64::new(1.5, 0.1)).unwrap();
        assert_relative_eq!(q.q_ext, q.q_sca + q.q_abs, max_relative = 1e-12);
        assert!(q.q_abs > 0.5 && q.q_abs < 1.3);
        assert!(q.g > 0.6 && q.g < 0.95);
    }

    #[test]
    fn test_cross_sections_scale_with_area() {
        let m = Complex64::new(1.5, 0.0);
        let cs = mie_cross_sections(100.0, 550.0, m, 1.0).unwrap();
        let x = size_parameter(100.0, 550.0, 1.0).unwrap();
        let q = mie_efficiencies(x, m).unwrap();
        assert_relative_eq!(cs.extinction, q.q_ext * PI * 1e4, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_input() {
        assert!(mie_efficiencies(0.0, Complex64::new(1.5, 0.0)).is_err());
        assert!(mie_efficiencies(1.0, Complex64::new(1.5, -0.1)).is_err());
        assert!(mie_efficiencies(f64::NAN, Complex64::new(1.5, 0.0)).is_err());
        assert!(mie_cross_sections(-1.0, 550.0, Complex64::new(1.5, 0.0), 1.0).is_err());
    }
}
