//! Helmholtz reciprocity checks.

use serde::{Deserialize, Serialize};

use crate::bsdf::Bsdf;
use crate::types::{spherical_direction, Vec3};

/// Default relative tolerance for [`test_reciprocity`].
pub const DEFAULT_RECIPROCITY_TOLERANCE: f64 = 1e-6;

const POLAR_ANGLES_DEG: [f64; 4] = [15.0, 35.0, 55.0, 75.0];
const AZIMUTH_STEP_DEG: usize = 60;

/// Result of a reciprocity sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReciprocityReport {
    pub pairs_tested: usize,
    /// Largest relative asymmetry $|f_{io} - f_{oi}| / \max(|f_{io}|, |f_{oi}|)$.
    pub max_error: f64,
    pub tolerance: f64,
    pub passed: bool,
}

/// The fixed upper-hemisphere direction set: four polar angles times six
/// azimuths.
pub fn reciprocity_directions() -> Vec<Vec3> {
    POLAR_ANGLES_DEG
        .iter()
        .flat_map(|&theta| {
            (0..360).step_by(AZIMUTH_STEP_DEG).map(move |phi| {
                spherical_direction(theta.to_radians(), (phi as f64).to_radians())
            })
        })
        .collect()
}

fn relative_asymmetry(forward: f64, backward: f64) -> f64 {
    if !(forward.is_finite() && backward.is_finite()) {
        return f64::INFINITY;
    }
    let scale = forward.abs().max(backward.abs());
    if scale < 1e-300 {
        0.0
    } else {
        (forward - backward).abs() / scale
    }
}

/// Compare $f(\omega_i, \omega_o)$ with $f(\omega_o, \omega_i)$ for every
/// unordered pair of [`reciprocity_directions`].
pub fn reciprocity_report<B: Bsdf + ?Sized>(bsdf: &B, tolerance: f64) -> ReciprocityReport {
    let dirs = reciprocity_directions();
    let mut pairs_tested = 0;
    let mut max_error: f64 = 0.0;
    for (i, wi) in dirs.iter().enumerate() {
        for wo in &dirs[i + 1..] {
            let err = relative_asymmetry(bsdf.evaluate_f(wi, wo), bsdf.evaluate_f(wo, wi));
            max_error = max_error.max(err);
            pairs_tested += 1;
        }
    }
    let passed = max_error <= tolerance;
    if !passed {
        log::warn!(
            "{}: reciprocity error {:.3e} exceeds {:.0e}",
            bsdf.name(),
            max_error,
            tolerance
        );
    }
    ReciprocityReport {
        pairs_tested,
        max_error,
        tolerance,
        passed,
    }
}

/// True when every pair is reciprocal within `tolerance`.
pub fn test_reciprocity<B: Bsdf + ?Sized>(bsdf: &B, tolerance: f64) -> bool {
    reciprocity_report(bsdf, tolerance).passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::{AnisotropicGgx, Conductor, Dielectric};
    use crate::error::OpticsError;
    use crate::types::{BsdfContext, MaterialResponse};

    /// Prefers light arriving from +x.
    struct Lopsided;

    impl Bsdf for Lopsided {
        fn name(&self) -> &str {
            "lopsided"
        }

        fn evaluate_at(&self, _: &BsdfContext, _: f64) -> Result<MaterialResponse, OpticsError> {
            Ok(MaterialResponse::opaque(0.5))
        }

        fn evaluate_f_at(&self, wi: &Vec3, _: &Vec3, _: f64) -> f64 {
            1.0 + wi[0]
        }
    }

    #[test]
    fn test_direction_set() {
        let dirs = reciprocity_directions();
        assert_eq!(dirs.len(), 24);
        assert!(dirs.iter().all(|d| d[2] > 0.0));
    }

    #[test]
    fn test_physical_models_pass() {
        assert!(test_reciprocity(&Dielectric::frosted(), DEFAULT_RECIPROCITY_TOLERANCE));
        assert!(test_reciprocity(&Conductor::gold().with_roughness(0.3).unwrap(), DEFAULT_RECIPROCITY_TOLERANCE));
        let report = reciprocity_report(&AnisotropicGgx::brushed_aluminium(), DEFAULT_RECIPROCITY_TOLERANCE);
        assert_eq!(report.pairs_tested, 24 * 23 / 2);
        assert!(report.passed, "max error {}", report.max_error);
    }

    #[test]
    fn test_asymmetric_model_fails() {
        let report = reciprocity_report(&Lopsided, DEFAULT_RECIPROCITY_TOLERANCE);
        assert!(!report.passed);
        assert!(report.max_error > 0.1);
    }
}
