//! Energy conservation checks.

use serde::{Deserialize, Serialize};

use crate::bsdf::Bsdf;
use crate::error::{BuildError, OpticsError};
use crate::types::{BsdfContext, MaterialResponse, QualityTier};

/// Incidence angles (degrees) swept by [`validate_energy_sweep`].
pub const ENERGY_TEST_ANGLES_DEG: [f64; 7] = [0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 85.0];

/// Outcome of one energy check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyReport {
    pub conserved: bool,
    /// $R + T + A$.
    pub total: f64,
    /// $|1 - (R + T + A)|$.
    pub error: f64,
    pub tolerance: f64,
    pub response: MaterialResponse,
}

/// Check one evaluation against the tolerance of the context's tier.
///
/// Besides the sum, every component must be finite and lie in
/// `[-tol, 1 + tol]`.
pub fn validate_energy<B: Bsdf + ?Sized>(
    bsdf: &B,
    ctx: &BsdfContext,
) -> Result<EnergyReport, OpticsError> {
    let response = bsdf.evaluate(ctx)?;
    let tolerance = ctx.quality().energy_tolerance();
    let total = response.total();
    let error = (1.0 - total).abs();
    let in_range = |v: f64| v.is_finite() && v >= -tolerance && v <= 1.0 + tolerance;
    let conserved = error <= tolerance
        && in_range(response.reflectance)
        && in_range(response.transmittance)
        && in_range(response.absorption);
    if !conserved {
        log::warn!(
            "{}: energy not conserved (R={:.6}, T={:.6}, A={:.6}, error {:.3e} > {:.0e})",
            bsdf.name(),
            response.reflectance,
            response.transmittance,
            response.absorption,
            error,
            tolerance
        );
    }
    Ok(EnergyReport {
        conserved,
        total,
        error,
        tolerance,
        response,
    })
}

/// Check every angle of [`ENERGY_TEST_ANGLES_DEG`] at each wavelength.
pub fn validate_energy_sweep<B: Bsdf + ?Sized>(
    bsdf: &B,
    wavelengths_nm: &[f64],
    tier: QualityTier,
) -> Result<Vec<EnergyReport>, BuildError> {
    let mut reports = Vec::with_capacity(ENERGY_TEST_ANGLES_DEG.len() * wavelengths_nm.len());
    for &deg in &ENERGY_TEST_ANGLES_DEG {
        for &nm in wavelengths_nm {
            let ctx = BsdfContext::at_incidence(deg, nm)?.with_quality(tier);
            reports.push(validate_energy(bsdf, &ctx)?);
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::{Conductor, Dielectric};
    use crate::types::Vec3;

    struct Leaky;

    impl Bsdf for Leaky {
        fn name(&self) -> &str {
            "leaky"
        }

        fn evaluate_at(&self, _: &BsdfContext, _: f64) -> Result<MaterialResponse, OpticsError> {
            Ok(MaterialResponse {
                reflectance: 0.5,
                transmittance: 0.4,
                absorption: 0.0,
            })
        }

        fn evaluate_f_at(&self, _: &Vec3, _: &Vec3, _: f64) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_presets_pass() {
        let reports = validate_energy_sweep(&Dielectric::clear(), &[450.0, 550.0], QualityTier::High)
            .unwrap();
        assert_eq!(reports.len(), 14);
        assert!(reports.iter().all(|r| r.conserved));

        let gold = validate_energy(&Conductor::gold(), &BsdfContext::at_incidence(45.0, 600.0).unwrap())
            .unwrap();
        assert!(gold.conserved);
        assert!(gold.error < 1e-12);
    }

    #[test]
    fn test_leak_is_reported_not_raised() {
        let _ = env_logger::builder().is_test(true).try_init();
        let report = validate_energy(&Leaky, &BsdfContext::at_incidence(0.0, 550.0).unwrap()).unwrap();
        assert!(!report.conserved);
        assert!((report.error - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_report_serialises() {
        let report = validate_energy(&Dielectric::clear(), &BsdfContext::at_incidence(0.0, 550.0).unwrap())
            .unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let back: EnergyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.conserved, report.conserved);
        approx::assert_abs_diff_eq!(back.total, report.total, epsilon = 1e-15);
        approx::assert_abs_diff_eq!(
            back.response.reflectance,
            report.response.reflectance,
            epsilon = 1e-15
        );
    }
}
