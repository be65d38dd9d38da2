//! Transfer-matrix method (TMM) for multilayer stacks.
//!
//! Each layer $j$ contributes a characteristic matrix
//!
//! $$M_j = \begin{pmatrix} \cos\delta_j & i\sin\delta_j/\eta_j \\
//!                         i\eta_j\sin\delta_j & \cos\delta_j \end{pmatrix},\qquad
//!   \delta_j = \frac{2\pi}{\lambda} n_j d_j \cos\theta_j$$
//!
//! with tilted admittances $\eta_s = n\cos\theta$ and $\eta_p = n/\cos\theta$.
//! The matrix assumes the $N = n - ik$ sign convention, so indices supplied
//! as $n + ik$ are conjugated before use.
//! The stack product gives $[B, C]^T = \prod M_j\,[1, \eta_{sub}]^T$, from
//! which
//!
//! $$r = \frac{\eta_0 B - C}{\eta_0 B + C},\qquad
//!   T = \frac{4\,\mathrm{Re}(\eta_0)\,\mathrm{Re}(\eta_{sub})}{|\eta_0 B + C|^2}$$
//!
//! # Reference
//! Macleod, *Thin-Film Optical Filters*, 4th ed., ch. 2.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{self, domain, BuildError, OpticsError};
use crate::types::{ComplexIor, IndexModel, MaterialResponse, Polarization};

use super::airy::complex_cos;

/// A homogeneous layer of a stack.
#[derive(Debug, Clone)]
pub struct FilmLayer {
    pub(crate) index: IndexModel,
    pub(crate) thickness_nm: f64,
}

impl FilmLayer {
    /// # Errors
    /// [`BuildError::InvalidLayer`] if the thickness is not finite and
    /// strictly positive. A standalone layer reports position 0.
    pub fn new(index: impl Into<IndexModel>, thickness_nm: f64) -> Result<Self, BuildError> {
        check_layer_thickness(0, thickness_nm)?;
        Ok(Self {
            index: index.into(),
            thickness_nm,
        })
    }

    pub fn index(&self) -> &IndexModel {
        &self.index
    }

    pub fn thickness_nm(&self) -> f64 {
        self.thickness_nm
    }
}

/// Polarised reflectance and transmittance of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TmmResult {
    pub reflectance_s: f64,
    pub reflectance_p: f64,
    pub transmittance_s: f64,
    pub transmittance_p: f64,
}

impl TmmResult {
    pub fn reflectance(&self, polarization: Polarization) -> f64 {
        match polarization {
            Polarization::Unpolarized => 0.5 * (self.reflectance_s + self.reflectance_p),
            Polarization::S => self.reflectance_s,
            Polarization::P => self.reflectance_p,
        }
    }

    pub fn transmittance(&self, polarization: Polarization) -> f64 {
        match polarization {
            Polarization::Unpolarized => 0.5 * (self.transmittance_s + self.transmittance_p),
            Polarization::S => self.transmittance_s,
            Polarization::P => self.transmittance_p,
        }
    }

    pub fn response(&self, polarization: Polarization) -> MaterialResponse {
        MaterialResponse::from_reflectance_transmittance(
            self.reflectance(polarization),
            self.transmittance(polarization),
        )
    }
}

/// A layer stack between an ambient medium and a semi-infinite substrate.
#[derive(Debug, Clone)]
pub struct TmmSolver {
    pub(crate) ambient_ior: f64,
    pub(crate) layers: Vec<FilmLayer>,
    pub(crate) substrate: IndexModel,
}

fn check_layer_thickness(index: usize, thickness_nm: f64) -> Result<(), BuildError> {
    if thickness_nm.is_finite() && thickness_nm > 0.0 {
        Ok(())
    } else {
        Err(BuildError::InvalidLayer {
            index,
            reason: format!("thickness {thickness_nm} nm must be finite and positive"),
        })
    }
}

type Matrix2 = [[Complex64; 2]; 2];

fn mat_mul(a: &Matrix2, b: &Matrix2) -> Matrix2 {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

impl TmmSolver {
    pub fn builder() -> TmmSolverBuilder {
        TmmSolverBuilder::default()
    }

    /// A stack in air.
    pub fn new(layers: Vec<FilmLayer>, substrate: impl Into<IndexModel>) -> Self {
        Self {
            ambient_ior: 1.0,
            layers,
            substrate: substrate.into(),
        }
    }

    pub fn layers(&self) -> &[FilmLayer] {
        &self.layers
    }

    pub fn substrate(&self) -> &IndexModel {
        &self.substrate
    }

    pub fn ambient_ior(&self) -> f64 {
        self.ambient_ior
    }

    pub fn total_thickness_nm(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness_nm).sum()
    }

    /// Whether energy entering the substrate is lost to absorption.
    pub fn substrate_absorbs(&self) -> bool {
        self.substrate.is_absorbing()
    }

    /// Solve at incidence angle `angle_rad` from the normal, in [0, π/2).
    pub fn solve(&self, wavelength_nm: f64, angle_rad: f64) -> Result<TmmResult, OpticsError> {
        if !(angle_rad.is_finite() && (0.0..PI / 2.0).contains(&angle_rad)) {
            return Err(domain("angle_rad", angle_rad, "[0, pi/2)"));
        }
        self.solve_cos(wavelength_nm, angle_rad.cos())
    }

    /// Solve for incidence cosine `cos_theta` in (0, 1].
    pub fn solve_cos(&self, wavelength_nm: f64, cos_theta: f64) -> Result<TmmResult, OpticsError> {
        self.solve_scaled(wavelength_nm, cos_theta, 1.0)
    }

    /// Solve with every layer thickness multiplied by `thickness_scale`.
    pub fn solve_scaled(
        &self,
        wavelength_nm: f64,
        cos_theta: f64,
        thickness_scale: f64,
    ) -> Result<TmmResult, OpticsError> {
        error::check_positive("wavelength_nm", wavelength_nm)?;
        error::check_non_negative("thickness_scale", thickness_scale)?;
        if !(cos_theta.is_finite() && cos_theta > 0.0 && cos_theta <= 1.0) {
            return Err(domain("cos_theta", cos_theta, "(0, 1]"));
        }

        let n0 = Complex64::new(self.ambient_ior, 0.0);
        let sin0 = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let c0 = Complex64::new(cos_theta, 0.0);

        // (index, cosine, phase thickness) per layer, shared by both
        // polarisations, all in the n - ik convention.
        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let n = layer.index.at(wavelength_nm)?;
            let c = complex_cos(n, n0, sin0);
            let delta = n * c * (2.0 * PI * layer.thickness_nm * thickness_scale / wavelength_nm);
            layers.push((n.conj(), c.conj(), delta.conj()));
        }
        let ns = self.substrate.at(wavelength_nm)?;
        let cs = complex_cos(ns, n0, sin0);
        let (ns, cs) = (ns.conj(), cs.conj());

        let (reflectance_s, transmittance_s) =
            Self::characteristic(&layers, (n0 * c0, ns * cs), |n, c| n * c);
        let (reflectance_p, transmittance_p) =
            Self::characteristic(&layers, (n0 / c0, ns / cs), |n, c| n / c);

        Ok(TmmResult {
            reflectance_s,
            reflectance_p,
            transmittance_s,
            transmittance_p,
        })
    }

    fn characteristic(
        layers: &[(Complex64, Complex64, Complex64)],
        (eta0, eta_sub): (Complex64, Complex64),
        admittance: impl Fn(Complex64, Complex64) -> Complex64,
    ) -> (f64, f64) {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let i = Complex64::new(0.0, 1.0);

        let mut m: Matrix2 = [[one, zero], [zero, one]];
        for &(n, c, delta) in layers {
            let eta = admittance(n, c);
            let (cd, sd) = (delta.cos(), delta.sin());
            let layer = [[cd, i * sd / eta], [i * eta * sd, cd]];
            m = mat_mul(&m, &layer);
        }

        let b = m[0][0] + m[0][1] * eta_sub;
        let c = m[1][0] + m[1][1] * eta_sub;
        let denom = eta0 * b + c;
        let r = (eta0 * b - c) / denom;
        let t = 4.0 * eta0.re * eta_sub.re / denom.norm_sqr();
        (r.norm_sqr().min(1.0), t.max(0.0))
    }

    /// Real film and substrate indices when the stack is a single lossless
    /// film in air, the case the Airy formula covers.
    pub(crate) fn single_lossless_film(&self) -> Option<(&FilmLayer, &IndexModel)> {
        if self.ambient_ior != 1.0 || self.layers.len() != 1 {
            return None;
        }
        let film = &self.layers[0];
        if film.index.is_absorbing() || self.substrate.is_absorbing() {
            return None;
        }
        Some((film, &self.substrate))
    }
}

/// Incremental construction of a [`TmmSolver`].
///
/// Layers are validated in [`build`](Self::build), which reports the
/// offending position.
#[derive(Debug, Clone, Default)]
pub struct TmmSolverBuilder {
    ambient_ior: Option<f64>,
    layers: Vec<(IndexModel, f64)>,
    substrate: Option<IndexModel>,
}

impl TmmSolverBuilder {
    pub fn ambient(mut self, n: f64) -> Self {
        self.ambient_ior = Some(n);
        self
    }

    pub fn layer(mut self, index: impl Into<IndexModel>, thickness_nm: f64) -> Self {
        self.layers.push((index.into(), thickness_nm));
        self
    }

    /// Append `count` repetitions of a two-layer period.
    pub fn periodic(
        mut self,
        high: (IndexModel, f64),
        low: (IndexModel, f64),
        count: usize,
    ) -> Self {
        for _ in 0..count {
            self.layers.push(high.clone());
            self.layers.push(low.clone());
        }
        self
    }

    pub fn substrate(mut self, index: impl Into<IndexModel>) -> Self {
        self.substrate = Some(index.into());
        self
    }

    pub fn build(self) -> Result<TmmSolver, BuildError> {
        let ambient_ior = error::require_positive("ambient_ior", self.ambient_ior.unwrap_or(1.0))?;
        let mut layers = Vec::with_capacity(self.layers.len());
        for (i, (index, thickness_nm)) in self.layers.into_iter().enumerate() {
            check_layer_thickness(i, thickness_nm)?;
            if let IndexModel::Constant(ComplexIor { n, k }) = index {
                if !(n > 0.0 && k >= 0.0) {
                    return Err(BuildError::InvalidLayer {
                        index: i,
                        reason: format!("index {n} + {k}i is not physical"),
                    });
                }
            }
            layers.push(FilmLayer {
                index,
                thickness_nm,
            });
        }
        let substrate = match self.substrate {
            Some(s) => s,
            None => IndexModel::Constant(ComplexIor { n: 1.0, k: 0.0 }),
        };
        Ok(TmmSolver {
            ambient_ior,
            layers,
            substrate,
        })
    }
}
