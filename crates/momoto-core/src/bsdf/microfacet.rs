//! Anisotropic GGX microfacet building blocks.
//!
//! Normal distribution, Smith masking–shadowing, visible-normal sampling
//! and the resulting specular BRDF
//!
//! $$f(\omega_i, \omega_o) = \frac{D(h)\,G_2(\omega_i, \omega_o)\,F(\omega_i\cdot h)}
//!                             {4\,\cos\theta_i\,\cos\theta_o}$$
//!
//! which is symmetric in its two directions.
//!
//! # References
//! - Walter et al., "Microfacet Models for Refraction through Rough Surfaces" (2007).
//! - Heitz, "Understanding the Masking-Shadowing Function" (2014).
//! - Heitz, "Sampling the GGX Distribution of Visible Normals" (2018).

use std::f64::consts::PI;

use crate::types::{dot, normalize, Vec3};

/// Smallest roughness alpha; smoother surfaces are treated as this rough.
pub const MIN_ALPHA: f64 = 1e-3;

/// Perceptual roughness to GGX alpha ($\alpha = r^2$), floored at [`MIN_ALPHA`].
pub fn roughness_to_alpha(roughness: f64) -> f64 {
    (roughness * roughness).max(MIN_ALPHA)
}

/// GGX normal distribution $D(h)$.
pub fn ggx_ndf(h: &Vec3, alpha_x: f64, alpha_y: f64) -> f64 {
    if h[2] <= 0.0 {
        return 0.0;
    }
    let t = (h[0] / alpha_x).powi(2) + (h[1] / alpha_y).powi(2) + h[2] * h[2];
    1.0 / (PI * alpha_x * alpha_y * t * t)
}

/// Smith $\Lambda(v)$ for the anisotropic GGX distribution.
pub fn smith_lambda(v: &Vec3, alpha_x: f64, alpha_y: f64) -> f64 {
    let cos2 = v[2] * v[2];
    if cos2 == 0.0 {
        return f64::INFINITY;
    }
    let a2_tan2 = ((alpha_x * v[0]).powi(2) + (alpha_y * v[1]).powi(2)) / cos2;
    0.5 * (-1.0 + (1.0 + a2_tan2).sqrt())
}

/// Masking term $G_1(v) = 1 / (1 + \Lambda(v))$.
pub fn smith_g1(v: &Vec3, alpha_x: f64, alpha_y: f64) -> f64 {
    if v[2] <= 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + smith_lambda(v, alpha_x, alpha_y))
}

/// Height-correlated masking–shadowing $G_2 = 1 / (1 + \Lambda_i + \Lambda_o)$.
pub fn smith_g2(wi: &Vec3, wo: &Vec3, alpha_x: f64, alpha_y: f64) -> f64 {
    if wi[2] <= 0.0 || wo[2] <= 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + smith_lambda(wi, alpha_x, alpha_y) + smith_lambda(wo, alpha_x, alpha_y))
}

/// Half vector of two directions on the same side of the surface.
pub fn half_vector(wi: &Vec3, wo: &Vec3) -> Option<Vec3> {
    normalize(&[wi[0] + wo[0], wi[1] + wo[1], wi[2] + wo[2]])
}

/// Specular microfacet BRDF with Fresnel term `fresnel(cos_d)`, where
/// `cos_d` is the cosine between `wi` and the half vector.
pub fn microfacet_reflection(
    wi: &Vec3,
    wo: &Vec3,
    alpha_x: f64,
    alpha_y: f64,
    fresnel: impl Fn(f64) -> f64,
) -> f64 {
    let (cos_i, cos_o) = (wi[2], wo[2]);
    if cos_i <= 0.0 || cos_o <= 0.0 {
        return 0.0;
    }
    let Some(h) = half_vector(wi, wo) else {
        return 0.0;
    };
    let d = ggx_ndf(&h, alpha_x, alpha_y);
    let g = smith_g2(wi, wo, alpha_x, alpha_y);
    let f = fresnel(dot(wi, &h).clamp(0.0, 1.0));
    d * g * f / (4.0 * cos_i * cos_o)
}

/// Sample a visible microfacet normal for view direction `wi`.
pub fn sample_vndf(wi: &Vec3, alpha_x: f64, alpha_y: f64, u1: f64, u2: f64) -> Vec3 {
    // Stretch the view direction into the hemisphere configuration.
    let vh = normalize(&[alpha_x * wi[0], alpha_y * wi[1], wi[2]]).unwrap_or([0.0, 0.0, 1.0]);
    let lensq = vh[0] * vh[0] + vh[1] * vh[1];
    let t1 = if lensq > 0.0 {
        let inv = 1.0 / lensq.sqrt();
        [-vh[1] * inv, vh[0] * inv, 0.0]
    } else {
        [1.0, 0.0, 0.0]
    };
    let t2 = [
        vh[1] * t1[2] - vh[2] * t1[1],
        vh[2] * t1[0] - vh[0] * t1[2],
        vh[0] * t1[1] - vh[1] * t1[0],
    ];

    let r = u1.sqrt();
    let phi = 2.0 * PI * u2;
    let p1 = r * phi.cos();
    let s = 0.5 * (1.0 + vh[2]);
    let p2 = (1.0 - s) * (1.0 - p1 * p1).max(0.0).sqrt() + s * r * phi.sin();
    let pz = (1.0 - p1 * p1 - p2 * p2).max(0.0).sqrt();

    let nh = [
        p1 * t1[0] + p2 * t2[0] + pz * vh[0],
        p1 * t1[1] + p2 * t2[1] + pz * vh[1],
        p1 * t1[2] + p2 * t2[2] + pz * vh[2],
    ];
    normalize(&[alpha_x * nh[0], alpha_y * nh[1], nh[2].max(0.0)]).unwrap_or([0.0, 0.0, 1.0])
}

/// Reflect `v` about the unit normal `n`.
pub fn reflect(v: &Vec3, n: &Vec3) -> Vec3 {
    let d = 2.0 * dot(v, n);
    [d * n[0] - v[0], d * n[1] - v[1], d * n[2] - v[2]]
}

/// Directional albedo of the specular lobe for incidence `wi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LobeAlbedo {
    /// Albedo with $F = 1$: the fraction of light leaving after one bounce.
    /// Its complement is lost to multiple scattering.
    pub white: f64,
    /// Albedo with the supplied Fresnel term.
    pub reflected: f64,
}

/// Stratified visible-normal estimate of the lobe albedo on an
/// `n × n` grid.
pub fn directional_albedo(
    wi: &Vec3,
    alpha_x: f64,
    alpha_y: f64,
    samples_per_axis: usize,
    fresnel: impl Fn(f64) -> f64,
) -> LobeAlbedo {
    let n = samples_per_axis.max(1);
    let g1 = smith_g1(wi, alpha_x, alpha_y);
    if g1 <= 0.0 {
        return LobeAlbedo {
            white: 0.0,
            reflected: 0.0,
        };
    }

    let mut white = 0.0;
    let mut reflected = 0.0;
    for i in 0..n {
        for j in 0..n {
            let u1 = (i as f64 + 0.5) / n as f64;
            let u2 = (j as f64 + 0.5) / n as f64;
            let m = sample_vndf(wi, alpha_x, alpha_y, u1, u2);
            let wo = reflect(wi, &m);
            if wo[2] <= 0.0 {
                continue;
            }
            let w = smith_g2(wi, &wo, alpha_x, alpha_y) / g1;
            white += w;
            reflected += w * fresnel(dot(wi, &m).clamp(0.0, 1.0));
        }
    }
    let count = (n * n) as f64;
    LobeAlbedo {
        white: white / count,
        reflected: reflected / count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::spherical_direction;
    use approx::assert_abs_diff_eq;

    /// $\int D(h) \cos\theta_h \,d\omega_h$ by midpoint rule in $(\theta, \phi)$.
    fn projected_ndf_integral(ax: f64, ay: f64) -> f64 {
        let (nt, np) = (2000, 128);
        let dt = 0.5 * PI / nt as f64;
        let dp = 2.0 * PI / np as f64;
        let mut sum = 0.0;
        for i in 0..nt {
            let theta = (i as f64 + 0.5) * dt;
            for j in 0..np {
                let phi = (j as f64 + 0.5) * dp;
                let h = spherical_direction(theta, phi);
                sum += ggx_ndf(&h, ax, ay) * h[2] * theta.sin() * dt * dp;
            }
        }
        sum
    }

    #[test]
    fn test_ndf_is_normalised() {
        assert_abs_diff_eq!(projected_ndf_integral(0.3, 0.3), 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(projected_ndf_integral(0.2, 0.6), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_g1_at_normal_is_one() {
        assert_abs_diff_eq!(smith_g1(&[0.0, 0.0, 1.0], 0.5, 0.2), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_g2_bounded_by_g1() {
        let wi = spherical_direction(1.0, 0.3);
        let wo = spherical_direction(0.6, 2.0);
        let g2 = smith_g2(&wi, &wo, 0.4, 0.4);
        assert!(g2 <= smith_g1(&wi, 0.4, 0.4));
        assert!(g2 <= smith_g1(&wo, 0.4, 0.4));
        assert!(g2 > 0.0);
    }

    #[test]
    fn test_reflection_is_symmetric() {
        let wi = spherical_direction(0.9, 0.4);
        let wo = spherical_direction(0.3, 2.5);
        let f = |c: f64| 0.04 + 0.96 * (1.0 - c).powi(5);
        let a = microfacet_reflection(&wi, &wo, 0.3, 0.1, f);
        let b = microfacet_reflection(&wo, &wi, 0.3, 0.1, f);
        assert_abs_diff_eq!(a, b, epsilon = 1e-12 * a.max(1.0));
    }

    #[test]
    fn test_vndf_samples_face_the_viewer() {
        let wi = spherical_direction(1.2, 0.7);
        for i in 0..8 {
            for j in 0..8 {
                let m = sample_vndf(&wi, 0.5, 0.2, (i as f64 + 0.5) / 8.0, (j as f64 + 0.5) / 8.0);
                assert_abs_diff_eq!(dot(&m, &m), 1.0, epsilon = 1e-9);
                assert!(m[2] >= 0.0);
                assert!(dot(&m, &wi) >= -1e-9);
            }
        }
    }

    #[test]
    fn test_albedo_bounds() {
        let wi = spherical_direction(0.5, 0.0);
        let smooth = directional_albedo(&wi, 0.05, 0.05, 16, |_| 1.0);
        let rough = directional_albedo(&wi, 0.9, 0.9, 16, |_| 1.0);
        assert!(smooth.white <= 1.0 && smooth.white > 0.99, "smooth {}", smooth.white);
        assert!(rough.white < smooth.white, "rough lobes lose energy");
        assert!(rough.white > 0.3);
    }

    #[test]
    fn test_albedo_with_constant_fresnel_scales() {
        let wi = spherical_direction(0.8, 1.0);
        let a = directional_albedo(&wi, 0.3, 0.5, 8, |_| 0.25);
        assert_abs_diff_eq!(a.reflected, 0.25 * a.white, epsilon = 1e-12);
    }
}
