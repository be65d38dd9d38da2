//! Learned residual corrections over a physical model.
//!
//! A small SIREN network (sine activations, Sitzmann et al. 2020) maps
//! `[cos θᵢ, (λ − 550)/150, R, T]` to a raw output $y$. The reflectance is
//! nudged by
//!
//! $$\Delta R = c_{max} \tanh(y) \cdot h,\qquad h = \begin{cases} 1 - R & y > 0 \\ R & y \le 0 \end{cases}$$
//!
//! so the corrected value stays in [0, 1]. Transmittance and absorption are
//! rescaled by $(1 - R')/(1 - R)$, which keeps $R + T + A = 1$.
//!
//! Only the hemispherical response is corrected. The scattering density is
//! the inner model's, so reciprocity is untouched.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, OpticsError};
use crate::types::{
    BsdfContext, MaterialResponse, SpectralMode, Vec3, LUMINANCE_WEIGHTS,
    REFERENCE_WAVELENGTH_NM, RGB_WAVELENGTHS_NM,
};

use super::material::Material;
use super::Bsdf;

/// Number of input features fed to the network.
pub const FEATURE_COUNT: usize = 4;

/// Default bound on the reflectance correction.
pub const DEFAULT_MAX_CORRECTION: f64 = 0.2;

/// Shape and initialisation of a [`SirenMlp`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SirenConfig {
    /// Hidden layers, 1 or 2.
    pub hidden_layers: usize,
    pub hidden_width: usize,
    /// Frequency of the sine activations.
    pub omega0: f64,
    pub seed: u64,
}

impl Default for SirenConfig {
    fn default() -> Self {
        Self {
            hidden_layers: 2,
            hidden_width: 16,
            omega0: 30.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SineLayer {
    weights: Array2<f64>, // [out, in]
    bias: Array1<f64>,
}

/// A sinusoidal-activation multilayer perceptron with a scalar output.
#[derive(Debug, Clone, PartialEq)]
pub struct SirenMlp {
    hidden: Vec<SineLayer>,
    output_weights: Array1<f64>,
    output_bias: f64,
    omega0: f64,
}

impl SirenMlp {
    /// Build a network with the SIREN initialisation scheme, seeded for
    /// reproducibility.
    ///
    /// # Errors
    /// [`BuildError::InvalidNetwork`] for zero or more than two hidden
    /// layers, zero width or inputs, or a non-positive `omega0`.
    pub fn new(config: &SirenConfig, input_dim: usize) -> Result<Self, BuildError> {
        if !(1..=2).contains(&config.hidden_layers) {
            return Err(BuildError::InvalidNetwork(format!(
                "{} hidden layers, expected 1 or 2",
                config.hidden_layers
            )));
        }
        if config.hidden_width == 0 || input_dim == 0 {
            return Err(BuildError::InvalidNetwork("layers must be non-empty".into()));
        }
        if !(config.omega0.is_finite() && config.omega0 > 0.0) {
            return Err(BuildError::InvalidNetwork(format!(
                "omega0 must be positive, got {}",
                config.omega0
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let width = config.hidden_width;
        let mut hidden = Vec::with_capacity(config.hidden_layers);
        let mut fan_in = input_dim;
        for i in 0..config.hidden_layers {
            let bound = if i == 0 {
                1.0 / fan_in as f64
            } else {
                (6.0 / fan_in as f64).sqrt() / config.omega0
            };
            let weights =
                Array2::from_shape_fn((width, fan_in), |_| rng.gen_range(-bound..=bound));
            let bias = Array1::from_shape_fn(width, |_| rng.gen_range(-bound..=bound));
            hidden.push(SineLayer { weights, bias });
            fan_in = width;
        }
        let bound = (6.0 / width as f64).sqrt() / config.omega0;
        let output_weights = Array1::from_shape_fn(width, |_| rng.gen_range(-bound..=bound));

        Ok(Self {
            hidden,
            output_weights,
            output_bias: 0.0,
            omega0: config.omega0,
        })
    }

    /// A network that ignores its input and always returns `value`.
    pub fn with_constant_output(value: f64, input_dim: usize) -> Self {
        Self {
            hidden: vec![SineLayer {
                weights: Array2::zeros((1, input_dim)),
                bias: Array1::zeros(1),
            }],
            output_weights: Array1::zeros(1),
            output_bias: value,
            omega0: 30.0,
        }
    }

    pub fn input_dim(&self) -> usize {
        self.hidden.first().map_or(0, |l| l.weights.ncols())
    }

    pub fn hidden_layers(&self) -> usize {
        self.hidden.len()
    }

    /// Forward pass.
    ///
    /// # Errors
    /// Fails when `input` does not match the network's input width.
    pub fn forward(&self, input: &[f64]) -> Result<f64, OpticsError> {
        if input.len() != self.input_dim() {
            return Err(crate::error::domain(
                "input_len",
                input.len() as f64,
                "network input width",
            ));
        }
        let mut x = Array1::from(input.to_vec());
        for layer in &self.hidden {
            x = (layer.weights.dot(&x) + &layer.bias).mapv(|v| (self.omega0 * v).sin());
        }
        Ok(self.output_weights.dot(&x) + self.output_bias)
    }
}

/// The size of one applied correction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrectionSample {
    /// Signed change applied to the reflectance.
    pub delta: f64,
    /// $|\Delta R|$ as a fraction of the uncorrected total response.
    pub share: f64,
}

/// A physical model with a bounded neural residual.
#[derive(Debug, Clone)]
pub struct NeuralCorrected<B = Material> {
    inner: B,
    mlp: SirenMlp,
    max_correction: f64,
}

impl<B: Bsdf> NeuralCorrected<B> {
    /// # Errors
    /// Fails when `max_correction` is outside (0, 1] or the network does not
    /// take the four correction features.
    pub fn new(inner: B, mlp: SirenMlp, max_correction: f64) -> Result<Self, BuildError> {
        if !(max_correction > 0.0 && max_correction <= 1.0) {
            return Err(BuildError::InvalidParameter {
                name: "max_correction",
                value: max_correction,
                reason: "must lie in (0, 1]",
            });
        }
        if mlp.input_dim() != FEATURE_COUNT {
            return Err(BuildError::InvalidNetwork(format!(
                "network takes {} inputs, expected {FEATURE_COUNT}",
                mlp.input_dim()
            )));
        }
        Ok(Self {
            inner,
            mlp,
            max_correction,
        })
    }

    /// Wrap `inner` with a freshly initialised network.
    pub fn with_config(inner: B, config: &SirenConfig, max_correction: f64) -> Result<Self, BuildError> {
        let mlp = SirenMlp::new(config, FEATURE_COUNT)?;
        Self::new(inner, mlp, max_correction)
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn max_correction(&self) -> f64 {
        self.max_correction
    }

    fn correct(
        &self,
        base: MaterialResponse,
        cos_i: f64,
        wavelength_nm: f64,
    ) -> Result<(MaterialResponse, CorrectionSample), OpticsError> {
        let features = [
            cos_i,
            (wavelength_nm - REFERENCE_WAVELENGTH_NM) / 150.0,
            base.reflectance,
            base.transmittance,
        ];
        let y = self.mlp.forward(&features)?;
        let r = base.reflectance.clamp(0.0, 1.0);
        let headroom = if y > 0.0 { 1.0 - r } else { r };
        let delta = self.max_correction * y.tanh() * headroom;
        let corrected = r + delta;

        let remaining = 1.0 - r;
        let response = if remaining > 1e-12 {
            let scale = (1.0 - corrected) / remaining;
            MaterialResponse {
                reflectance: corrected,
                transmittance: base.transmittance * scale,
                absorption: base.absorption * scale,
            }
        } else {
            MaterialResponse::opaque(corrected)
        };
        let total = base.total();
        let share = if total > 0.0 { delta.abs() / total } else { 0.0 };
        Ok((response, CorrectionSample { delta, share }))
    }

    fn evaluate_corrected_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<(MaterialResponse, CorrectionSample), OpticsError> {
        let base = self.inner.evaluate_at(ctx, wavelength_nm)?;
        self.correct(base, ctx.cos_theta_i().abs(), wavelength_nm)
    }

    /// Evaluate and report the correction that was applied.
    pub fn evaluate_with_correction(
        &self,
        ctx: &BsdfContext,
    ) -> Result<(MaterialResponse, CorrectionSample), OpticsError> {
        match ctx.spectral() {
            SpectralMode::Wavelength(nm) => self.evaluate_corrected_at(ctx, nm),
            SpectralMode::Rgb => {
                let mut parts = Vec::with_capacity(3);
                let mut sample = CorrectionSample::default();
                for (&nm, &w) in RGB_WAVELENGTHS_NM.iter().zip(LUMINANCE_WEIGHTS.iter()) {
                    let (response, s) = self.evaluate_corrected_at(ctx, nm)?;
                    sample.delta += w * s.delta;
                    sample.share += w * s.share;
                    parts.push((w, response));
                }
                Ok((MaterialResponse::weighted_sum(&parts), sample))
            }
        }
    }
}

impl<B: Bsdf> Bsdf for NeuralCorrected<B> {
    fn name(&self) -> &str {
        "neural_corrected"
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        self.evaluate_corrected_at(ctx, wavelength_nm).map(|(r, _)| r)
    }

    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        self.inner.evaluate_f_at(wi, wo, wavelength_nm)
    }
}
