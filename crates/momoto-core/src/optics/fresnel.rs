//! Fresnel reflectance at dielectric and conducting interfaces.
//!
//! # Conventions
//! `cos_theta` is the cosine between the incident direction and the surface
//! normal on the side of medium 1. A negative cosine means light arrives
//! from the medium-2 side; the dielectric kernels then swap the media.
//!
//! # References
//! - Born & Wolf, *Principles of Optics*, §1.5.
//! - Schlick, "An Inexpensive BRDF Model for Physically-based Rendering" (1994).

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{check_cosine, check_non_negative, check_positive, domain, OpticsError};
use crate::types::Polarization;

/// Default number of entries in a [`FresnelLut`].
pub const DEFAULT_LUT_SIZE: usize = 128;

/// Polarised power reflectances $(R_s, R_p)$.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FresnelCoefficients {
    pub reflectance_s: f64,
    pub reflectance_p: f64,
}

impl FresnelCoefficients {
    /// Total internal reflection.
    pub const TOTAL: Self = Self {
        reflectance_s: 1.0,
        reflectance_p: 1.0,
    };

    /// Unpolarised reflectance $(R_s + R_p)/2$.
    pub fn average(&self) -> f64 {
        0.5 * (self.reflectance_s + self.reflectance_p)
    }

    pub fn select(&self, polarization: Polarization) -> f64 {
        match polarization {
            Polarization::Unpolarized => self.average(),
            Polarization::S => self.reflectance_s,
            Polarization::P => self.reflectance_p,
        }
    }
}

/// Orient an incidence so that light always travels from `n1` into `n2`
/// with a non-negative cosine.
fn orient(cos_theta: f64, n1: f64, n2: f64) -> (f64, f64, f64) {
    if cos_theta < 0.0 {
        (-cos_theta, n2, n1)
    } else {
        (cos_theta, n1, n2)
    }
}

/// Cosine of the refracted angle, or `None` under total internal reflection.
///
/// Expects an oriented, non-negative `cos_i`.
pub fn transmission_cos(cos_i: f64, n1: f64, n2: f64) -> Option<f64> {
    let sin_i2 = (1.0 - cos_i * cos_i).max(0.0);
    let sin_t2 = (n1 / n2).powi(2) * sin_i2;
    if sin_t2 >= 1.0 {
        None
    } else {
        Some((1.0 - sin_t2).sqrt())
    }
}

/// Schlick's approximation to unpolarised dielectric reflectance.
///
/// $R \approx F_0 + (1 - F_0)(1 - \cos\theta)^5$ with
/// $F_0 = ((n_1 - n_2)/(n_1 + n_2))^2$. Going from the denser medium the
/// transmitted cosine is used, and total internal reflection returns 1.
pub fn fresnel_schlick(cos_theta: f64, ior1: f64, ior2: f64) -> Result<f64, OpticsError> {
    check_cosine("cos_theta", cos_theta)?;
    check_positive("ior1", ior1)?;
    check_positive("ior2", ior2)?;
    let (cos_i, n1, n2) = orient(cos_theta, ior1, ior2);

    let cos = if n1 > n2 {
        match transmission_cos(cos_i, n1, n2) {
            Some(cos_t) => cos_t,
            None => return Ok(1.0),
        }
    } else {
        cos_i
    };
    Ok(schlick_with_f0(cos, normal_incidence_reflectance(n1, n2)))
}

/// Schlick's polynomial for a known normal-incidence reflectance.
pub fn schlick_with_f0(cos_theta: f64, f0: f64) -> f64 {
    f0 + (1.0 - f0) * (1.0 - cos_theta.clamp(0.0, 1.0)).powi(5)
}

/// $F_0 = ((n_1 - n_2)/(n_1 + n_2))^2$ for two real indices.
pub fn normal_incidence_reflectance(n1: f64, n2: f64) -> f64 {
    ((n1 - n2) / (n1 + n2)).powi(2)
}

/// Normal-incidence reflectance from air onto a complex index.
pub fn conductor_f0(n: f64, k: f64) -> f64 {
    ((1.0 - n).powi(2) + k * k) / ((1.0 + n).powi(2) + k * k)
}

/// Full Fresnel equations for a dielectric interface.
///
/// Returns $(R_s, R_p)$; both are 1 under total internal reflection.
pub fn fresnel_full(
    cos_theta: f64,
    ior1: f64,
    ior2: f64,
) -> Result<FresnelCoefficients, OpticsError> {
    check_cosine("cos_theta", cos_theta)?;
    check_positive("ior1", ior1)?;
    check_positive("ior2", ior2)?;
    let (cos_i, n1, n2) = orient(cos_theta, ior1, ior2);

    let Some(cos_t) = transmission_cos(cos_i, n1, n2) else {
        return Ok(FresnelCoefficients::TOTAL);
    };

    let rs = (n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t);
    let rp = (n2 * cos_i - n1 * cos_t) / (n2 * cos_i + n1 * cos_t);
    Ok(FresnelCoefficients {
        reflectance_s: rs * rs,
        reflectance_p: rp * rp,
    })
}

/// Unpolarised reflectance of a conductor seen from vacuum.
pub fn conductor_fresnel(n: f64, k: f64, cos_theta: f64) -> Result<f64, OpticsError> {
    Ok(conductor_fresnel_polarized(n, k, cos_theta)?.average())
}

/// Polarised reflectance of a conductor with complex index $n + ik$.
///
/// Uses the complex refracted cosine
/// $\cos\theta_t = \sqrt{1 - \sin^2\theta_i / \tilde{n}^2}$:
///
/// $$r_s = \frac{\cos\theta_i - \tilde{n}\cos\theta_t}{\cos\theta_i + \tilde{n}\cos\theta_t},\qquad
///   r_p = \frac{\tilde{n}\cos\theta_i - \cos\theta_t}{\tilde{n}\cos\theta_i + \cos\theta_t}$$
pub fn conductor_fresnel_polarized(
    n: f64,
    k: f64,
    cos_theta: f64,
) -> Result<FresnelCoefficients, OpticsError> {
    check_cosine("cos_theta", cos_theta)?;
    check_non_negative("n", n)?;
    check_non_negative("k", k)?;
    if n == 0.0 && k == 0.0 {
        return Err(domain("n + ik", 0.0, "non-zero complex index"));
    }

    let cos_i = cos_theta.abs();
    let eta = Complex64::new(n, k);
    let sin_i2 = (1.0 - cos_i * cos_i).max(0.0);
    let cos_t = (Complex64::new(1.0, 0.0) - sin_i2 / (eta * eta)).sqrt();

    let rs = power_ratio(cos_i - eta * cos_t, cos_i + eta * cos_t);
    let rp = power_ratio(eta * cos_i - cos_t, eta * cos_i + cos_t);
    Ok(FresnelCoefficients {
        reflectance_s: rs,
        reflectance_p: rp,
    })
}

/// $|a/b|^2$, taking a vanishing denominator as full reflection.
fn power_ratio(num: Complex64, den: Complex64) -> f64 {
    let den2 = den.norm_sqr();
    if den2 == 0.0 {
        1.0
    } else {
        (num.norm_sqr() / den2).min(1.0)
    }
}

/// Tabulated unpolarised dielectric reflectance over $\cos\theta \in [0, 1]$.
///
/// Lookups interpolate linearly between equally spaced entries. Incidence
/// from the medium-2 side falls back to [`fresnel_full`].
#[derive(Debug, Clone, PartialEq)]
pub struct FresnelLut {
    ior1: f64,
    ior2: f64,
    table: Vec<f64>,
}

impl FresnelLut {
    pub fn new(ior1: f64, ior2: f64, size: usize) -> Result<Self, OpticsError> {
        if size < 2 {
            return Err(domain("size", size as f64, "[2, inf)"));
        }
        let step = 1.0 / (size - 1) as f64;
        let table = (0..size)
            .map(|i| fresnel_full(i as f64 * step, ior1, ior2).map(|f| f.average()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ior1, ior2, table })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn indices(&self) -> (f64, f64) {
        (self.ior1, self.ior2)
    }

    pub fn lookup(&self, cos_theta: f64) -> Result<f64, OpticsError> {
        check_cosine("cos_theta", cos_theta)?;
        if cos_theta < 0.0 {
            return Ok(fresnel_full(cos_theta, self.ior1, self.ior2)?.average());
        }
        let last = self.table.len() - 1;
        let x = cos_theta * last as f64;
        let i = (x.floor() as usize).min(last - 1);
        let t = x - i as f64;
        Ok(self.table[i] * (1.0 - t) + self.table[i + 1] * t)
    }
}
