//! Composable spectral pipelines.
//!
//! A pipeline is an ordered list of stages. Each stage is a surface
//! material or a participating medium and contributes either its
//! reflectance or its transmittance; per band, the stage factors multiply
//! the illuminant. The quality tier in the context decides how many bands
//! are evaluated exactly (1, 3 or 31); the rest are interpolated.
//!
//! ```
//! use momoto_core::pipeline::SpectralPipeline;
//! use momoto_core::bsdf::{Dielectric, ThinFilm};
//! use momoto_core::{BsdfContext, Spectrum};
//!
//! let pipeline = SpectralPipeline::builder()
//!     .transmit(Dielectric::clear())
//!     .reflect(ThinFilm::soap_bubble())
//!     .build()
//!     .unwrap();
//! let ctx = BsdfContext::at_incidence(0.0, 550.0).unwrap();
//! let out = pipeline.evaluate(&Spectrum::d65(), &ctx).unwrap();
//! assert_eq!(out.len(), 31);
//! ```

use crate::bsdf::{Bsdf, Material, MieMedium};
use crate::error::{BuildError, OpticsError};
use crate::spectrum::{canonical_wavelengths, interpolate, Spectrum};
use crate::types::{BsdfContext, MaterialResponse, QualityTier, REFERENCE_WAVELENGTH_NM};

/// Largest energy tolerance accepted by
/// [`SpectralPipelineBuilder::require_exact_conservation`].
pub const EXACT_CONSERVATION_TOLERANCE: f64 = 1e-6;

/// What a stage is made of.
#[derive(Debug, Clone)]
pub enum StageElement {
    Surface(Material),
    Medium(MieMedium),
}

impl StageElement {
    fn evaluate_at(&self, ctx: &BsdfContext, wavelength_nm: f64) -> Result<MaterialResponse, OpticsError> {
        match self {
            StageElement::Surface(m) => m.evaluate_at(ctx, wavelength_nm),
            StageElement::Medium(m) => m.evaluate_at(ctx, wavelength_nm),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StageElement::Surface(m) => m.name(),
            StageElement::Medium(m) => m.name(),
        }
    }
}

/// Which part of a stage's response continues down the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageChannel {
    Reflect,
    Transmit,
}

#[derive(Debug, Clone)]
pub struct Stage {
    pub element: StageElement,
    pub channel: StageChannel,
}

impl Stage {
    fn factor(&self, ctx: &BsdfContext, wavelength_nm: f64) -> Result<f64, OpticsError> {
        let r = self.element.evaluate_at(ctx, wavelength_nm)?;
        Ok(match self.channel {
            StageChannel::Reflect => r.reflectance,
            StageChannel::Transmit => r.transmittance,
        })
    }
}

/// An immutable, ordered stack of stages.
#[derive(Debug, Clone)]
pub struct SpectralPipeline {
    stages: Vec<Stage>,
}

impl SpectralPipeline {
    pub fn builder() -> SpectralPipelineBuilder {
        SpectralPipelineBuilder::default()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Product of all stage factors at one wavelength.
    pub fn throughput_at(&self, ctx: &BsdfContext, wavelength_nm: f64) -> Result<f64, OpticsError> {
        self.stages
            .iter()
            .try_fold(1.0, |acc, stage| Ok(acc * stage.factor(ctx, wavelength_nm)?))
    }

    /// Filter `illuminant` through every stage.
    ///
    /// The output shares the illuminant's wavelengths.
    pub fn evaluate(&self, illuminant: &Spectrum, ctx: &BsdfContext) -> Result<Spectrum, OpticsError> {
        let bands = band_wavelengths(ctx.quality());
        let throughput = bands
            .iter()
            .map(|&nm| self.throughput_at(ctx, nm))
            .collect::<Result<Vec<_>, _>>()?;

        let values = illuminant
            .iter()
            .map(|(nm, e)| e * interpolate(&bands, &throughput, nm))
            .collect();
        Ok(Spectrum::from_parts(illuminant.wavelengths().to_vec(), values))
    }
}

/// Wavelengths evaluated exactly at a tier.
pub fn band_wavelengths(tier: QualityTier) -> Vec<f64> {
    match tier.spectral_bands() {
        1 => vec![REFERENCE_WAVELENGTH_NM],
        3 => vec![450.0, 550.0, 650.0],
        _ => canonical_wavelengths(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpectralPipelineBuilder {
    stages: Vec<Stage>,
    exact_for: Option<QualityTier>,
}

impl SpectralPipelineBuilder {
    /// Append a surface whose reflectance continues.
    pub fn reflect(mut self, material: impl Into<Material>) -> Self {
        self.stages.push(Stage {
            element: StageElement::Surface(material.into()),
            channel: StageChannel::Reflect,
        });
        self
    }

    /// Append a surface whose transmittance continues.
    pub fn transmit(mut self, material: impl Into<Material>) -> Self {
        self.stages.push(Stage {
            element: StageElement::Surface(material.into()),
            channel: StageChannel::Transmit,
        });
        self
    }

    /// Append a participating medium.
    pub fn scatter(mut self, medium: MieMedium, channel: StageChannel) -> Self {
        self.stages.push(Stage {
            element: StageElement::Medium(medium),
            channel,
        });
        self
    }

    /// Demand that `tier` conserves energy to within
    /// [`EXACT_CONSERVATION_TOLERANCE`].
    pub fn require_exact_conservation(mut self, tier: QualityTier) -> Self {
        self.exact_for = Some(tier);
        self
    }

    pub fn build(self) -> Result<SpectralPipeline, BuildError> {
        if self.stages.is_empty() {
            return Err(BuildError::EmptyPipeline);
        }
        if let Some(tier) = self.exact_for {
            let tolerance = tier.energy_tolerance();
            if tolerance > EXACT_CONSERVATION_TOLERANCE {
                return Err(BuildError::ApproximateTier {
                    tier,
                    tolerance,
                    required: EXACT_CONSERVATION_TOLERANCE,
                });
            }
        }
        log::debug!(
            "built spectral pipeline: {}",
            self.stages
                .iter()
                .map(|s| s.element.name())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(SpectralPipeline {
            stages: self.stages,
        })
    }
}
