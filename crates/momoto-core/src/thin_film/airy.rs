//! Airy summation for one film between air and a substrate.
//!
//! $$r = \frac{r_{01} + r_{12} e^{i\delta}}{1 + r_{01} r_{12} e^{i\delta}},\qquad
//!   \delta = \frac{4\pi n_1 d \cos\theta_1}{\lambda}$$
//!
//! The ambient medium is air ($n_0 = 1$). Indices may be complex so that an
//! absorbing substrate (a metal under a coating) is handled without a
//! separate code path.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::{check_non_negative, check_positive, domain, OpticsError};
use crate::optics::FresnelCoefficients;

/// Complex cosine of the propagation angle inside a medium of index `n`,
/// for light entering from air with $\sin\theta_0$ = `sin0`.
///
/// The branch is chosen so that $\mathrm{Im}(n\cos\theta) \ge 0$, i.e. the
/// field decays into the medium.
pub(crate) fn complex_cos(n: Complex64, n0: Complex64, sin0: f64) -> Complex64 {
    let s = n0 * sin0 / n;
    let c = (Complex64::new(1.0, 0.0) - s * s).sqrt();
    if (n * c).im < 0.0 {
        -c
    } else {
        c
    }
}

/// Unpolarised reflectance of a single film.
///
/// # Arguments
/// * `thickness_nm` - Film thickness; zero collapses to the bare substrate.
/// * `film_ior` - Real index of the film.
/// * `substrate_ior` - Real index of the substrate (1.0 for a free film).
/// * `wavelength_nm` - Vacuum wavelength.
/// * `cos_theta` - Cosine of the incidence angle in air, in [0, 1].
pub fn thin_film_reflectance(
    thickness_nm: f64,
    film_ior: f64,
    substrate_ior: f64,
    wavelength_nm: f64,
    cos_theta: f64,
) -> Result<f64, OpticsError> {
    let f = thin_film_reflectance_polarized(
        thickness_nm,
        Complex64::new(film_ior, 0.0),
        Complex64::new(substrate_ior, 0.0),
        wavelength_nm,
        cos_theta,
    )?;
    Ok(f.average())
}

/// Polarised reflectance of a single film with complex indices.
pub fn thin_film_reflectance_polarized(
    thickness_nm: f64,
    film_ior: Complex64,
    substrate_ior: Complex64,
    wavelength_nm: f64,
    cos_theta: f64,
) -> Result<FresnelCoefficients, OpticsError> {
    check_non_negative("thickness_nm", thickness_nm)?;
    check_positive("film_ior", film_ior.re)?;
    check_positive("substrate_ior", substrate_ior.re)?;
    check_non_negative("film_k", film_ior.im)?;
    check_non_negative("substrate_k", substrate_ior.im)?;
    check_positive("wavelength_nm", wavelength_nm)?;
    if !(cos_theta.is_finite() && (0.0..=1.0).contains(&cos_theta)) {
        return Err(domain("cos_theta", cos_theta, "[0, 1]"));
    }

    let n0 = Complex64::new(1.0, 0.0);
    let n1 = film_ior;
    let n2 = substrate_ior;
    let c0 = Complex64::new(cos_theta, 0.0);
    let sin0 = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let c1 = complex_cos(n1, n0, sin0);
    let c2 = complex_cos(n2, n0, sin0);

    let phase = Complex64::new(0.0, 4.0 * PI * thickness_nm / wavelength_nm) * n1 * c1;
    let e = phase.exp();

    let rs01 = (n0 * c0 - n1 * c1) / (n0 * c0 + n1 * c1);
    let rs12 = (n1 * c1 - n2 * c2) / (n1 * c1 + n2 * c2);
    let rp01 = (n1 * c0 - n0 * c1) / (n1 * c0 + n0 * c1);
    let rp12 = (n2 * c1 - n1 * c2) / (n2 * c1 + n1 * c2);

    let airy = |r01: Complex64, r12: Complex64| {
        let r = (r01 + r12 * e) / (1.0 + r01 * r12 * e);
        r.norm_sqr().min(1.0)
    };

    Ok(FresnelCoefficients {
        reflectance_s: airy(rs01, rs12),
        reflectance_p: airy(rp01, rp12),
    })
}
