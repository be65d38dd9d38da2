//! Error types for evaluation and construction.
//!
//! Evaluation paths return [`OpticsError`]; builders and constructors return
//! [`BuildError`]. Neither path panics on bad input.

use momoto_materials::MaterialError;
use thiserror::Error;

use crate::types::QualityTier;

/// Errors raised while evaluating a kernel or a material.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpticsError {
    #[error("{parameter} = {value} is outside its domain ({domain})")]
    Domain {
        parameter: &'static str,
        value: f64,
        domain: &'static str,
    },

    #[error("Material data error: {0}")]
    Material(#[from] MaterialError),
}

/// Errors raised while constructing materials, stacks, spectra and pipelines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid film layer {index}: {reason}")]
    InvalidLayer { index: usize, reason: String },

    #[error("Invalid spectrum: {0}")]
    InvalidSpectrum(String),

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Pipeline has no stages")]
    EmptyPipeline,

    #[error(
        "Quality tier {tier:?} tolerates an energy error of {tolerance:e}, \
         above the required {required:e}"
    )]
    ApproximateTier {
        tier: QualityTier,
        tolerance: f64,
        required: f64,
    },

    #[error("Material data error: {0}")]
    Material(#[from] MaterialError),

    #[error("Evaluation failed during construction: {0}")]
    Optics(#[from] OpticsError),
}

/// Shorthand for a [`OpticsError::Domain`].
pub(crate) fn domain(parameter: &'static str, value: f64, domain: &'static str) -> OpticsError {
    OpticsError::Domain {
        parameter,
        value,
        domain,
    }
}

/// Require `cos` to be a finite cosine in [-1, 1].
pub(crate) fn check_cosine(parameter: &'static str, cos: f64) -> Result<f64, OpticsError> {
    if cos.is_finite() && (-1.0..=1.0).contains(&cos) {
        Ok(cos)
    } else {
        Err(domain(parameter, cos, "[-1, 1]"))
    }
}

/// Require a finite, strictly positive value (indices, wavelengths).
pub(crate) fn check_positive(parameter: &'static str, value: f64) -> Result<f64, OpticsError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(domain(parameter, value, "(0, inf)"))
    }
}

/// Require a finite, non-negative value (distances, coefficients).
pub(crate) fn check_non_negative(parameter: &'static str, value: f64) -> Result<f64, OpticsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(domain(parameter, value, "[0, inf)"))
    }
}

/// Builder-side counterpart of [`check_positive`].
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, BuildError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(BuildError::InvalidParameter {
            name,
            value,
            reason: "must be finite and positive",
        })
    }
}

/// Builder-side counterpart of [`check_non_negative`].
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64, BuildError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(BuildError::InvalidParameter {
            name,
            value,
            reason: "must be finite and non-negative",
        })
    }
}

/// Require `value` to lie in the closed unit interval.
pub(crate) fn require_unit_interval(name: &'static str, value: f64) -> Result<f64, BuildError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(BuildError::InvalidParameter {
            name,
            value,
            reason: "must lie in [0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_message_names_parameter() {
        let err = check_cosine("cos_theta", 1.5).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cos_theta"), "message was: {msg}");
        assert!(msg.contains("1.5"), "message was: {msg}");
    }

    #[test]
    fn test_checks_reject_nan() {
        assert!(check_cosine("c", f64::NAN).is_err());
        assert!(check_positive("n", f64::NAN).is_err());
        assert!(check_non_negative("d", f64::INFINITY).is_err());
        assert!(require_unit_interval("r", f64::NAN).is_err());
    }

    #[test]
    fn test_material_error_converts() {
        let err: OpticsError = MaterialError::NotFound("unobtainium".into()).into();
        assert!(matches!(err, OpticsError::Material(_)));
    }
}
