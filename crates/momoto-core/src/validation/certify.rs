//! Self-certification over the built-in presets.

use serde::{Deserialize, Serialize};

use crate::bsdf::{
    AnisotropicGgx, Bsdf, Conductor, Dielectric, Material, MieMedium, NeuralCorrected,
    SirenConfig, SirenMlp, Subsurface, Temporal, ThinFilm,
};
use crate::bsdf::neural::FEATURE_COUNT;
use crate::error::BuildError;
use crate::optics::fresnel_schlick;
use crate::spectrum::rgb_to_spectrum;
use crate::types::{BsdfContext, CertificationLevel, QualityTier};

use super::audit::NeuralAuditor;
use super::drift::validate_drift;
use super::energy::validate_energy_sweep;
use super::reciprocity::{reciprocity_report, DEFAULT_RECIPROCITY_TOLERANCE};

/// Pass/fail summary of [`self_certify`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationSummary {
    pub passed: bool,
    pub tests_run: usize,
    pub tests_passed: usize,
    /// One line per failed check.
    pub failures: Vec<String>,
}

impl CertificationSummary {
    fn check(&mut self, name: &str, ok: bool, detail: impl FnOnce() -> String) {
        self.tests_run += 1;
        if ok {
            self.tests_passed += 1;
        } else {
            self.failures.push(format!("{name}: {}", detail()));
        }
    }
}

fn energy_checks(summary: &mut CertificationSummary) -> Result<(), BuildError> {
    let presets: [(&str, Material); 4] = [
        ("clear glass", Dielectric::clear().into()),
        ("gold", Conductor::gold().into()),
        ("soap bubble", ThinFilm::soap_bubble().into()),
        ("skin", Subsurface::skin().into()),
    ];
    for (name, material) in &presets {
        let reports = validate_energy_sweep(material, &[450.0, 550.0, 650.0], QualityTier::High)?;
        let worst = reports.iter().map(|r| r.error).fold(0.0, f64::max);
        summary.check(
            &format!("energy/{name}"),
            reports.iter().all(|r| r.conserved),
            || format!("max error {worst:.3e}"),
        );
    }
    Ok(())
}

fn reciprocity_checks(summary: &mut CertificationSummary) -> Result<(), BuildError> {
    let neural = NeuralCorrected::with_config(
        Material::from(Conductor::copper().with_roughness(0.4)?),
        &SirenConfig::default(),
        0.1,
    )?;
    let temporal = Temporal::new(Material::from(ThinFilm::oil_slick().with_roughness(0.3)?), 0.05)?;
    let models: Vec<(&str, Box<dyn Bsdf>)> = vec![
        ("dielectric", Box::new(Dielectric::frosted())),
        ("conductor", Box::new(Conductor::gold().with_roughness(0.3)?)),
        ("anisotropic_ggx", Box::new(AnisotropicGgx::brushed_gold())),
        ("subsurface", Box::new(Subsurface::marble())),
        ("thin_film", Box::new(ThinFilm::soap_bubble().with_roughness(0.2)?)),
        ("neural_corrected", Box::new(neural)),
        ("temporal", Box::new(temporal)),
        ("mie_medium", Box::new(MieMedium::dilute_milk())),
    ];
    for (name, model) in &models {
        let report = reciprocity_report(model, DEFAULT_RECIPROCITY_TOLERANCE);
        summary.check(&format!("reciprocity/{name}"), report.passed, || {
            format!("max error {:.3e}", report.max_error)
        });
    }
    Ok(())
}

fn golden_checks(summary: &mut CertificationSummary) -> Result<(), BuildError> {
    let schlick = fresnel_schlick(1.0, 1.0, 1.5)?;
    summary.check("golden/schlick_glass", (schlick - 0.04).abs() < 1e-3, || {
        format!("{schlick:.5} != 0.04")
    });

    let normal = BsdfContext::at_incidence(0.0, 550.0)?;
    let gold = Conductor::gold().evaluate(&normal)?.reflectance;
    summary.check("golden/gold_550", (gold - 0.912).abs() <= 0.002, || {
        format!("{gold:.5} != 0.912")
    });

    let bubble = ThinFilm::soap_bubble().evaluate(&normal)?.reflectance;
    summary.check("golden/soap_bubble_550", (bubble - 0.0754).abs() <= 0.002, || {
        format!("{bubble:.5} != 0.0754")
    });

    let ar = ThinFilm::ar_coating().evaluate(&normal)?.reflectance;
    summary.check("golden/ar_coating_550", ar < 0.015, || format!("{ar:.5} >= 0.015"));

    for rgb in [[0.8, 0.1, 0.1], [0.1, 0.8, 0.1], [0.5, 0.5, 0.5]] {
        let back = rgb_to_spectrum(rgb)?.to_linear_rgb();
        let worst = (0..3).map(|k| (back[k] - rgb[k]).abs()).fold(0.0, f64::max);
        summary.check("golden/rgb_round_trip", worst < 3e-3, || {
            format!("{rgb:?} came back as {back:?}")
        });
    }
    Ok(())
}

fn audit_checks(summary: &mut CertificationSummary) -> Result<(), BuildError> {
    let auditor = NeuralAuditor::new(CertificationLevel::Industrial);
    let contexts = [0.0, 20.0, 40.0, 60.0, 80.0]
        .iter()
        .map(|&deg| BsdfContext::at_incidence(deg, 550.0))
        .collect::<Result<Vec<_>, _>>()?;

    let bounded = NeuralCorrected::with_config(Subsurface::skin(), &SirenConfig::default(), 0.04)?;
    let report = auditor.audit_material(&bounded, &contexts)?;
    summary.check("audit/bounded_network", report.passed(), || {
        format!("{} violations, max share {:.3}", report.violations, report.max_correction_share)
    });

    // A network pinned at an 8 % correction must be flagged.
    let pinned = SirenMlp::with_constant_output(10.0, FEATURE_COUNT);
    let synthetic = NeuralCorrected::new(MieMedium::haze(), pinned, 0.08)?;
    let report = auditor.audit_material(&synthetic, &contexts)?;
    summary.check("audit/synthetic_violation", !report.passed(), || {
        "8% correction was not flagged".to_string()
    });
    Ok(())
}

fn drift_checks(summary: &mut CertificationSummary) -> Result<(), BuildError> {
    let glass = Temporal::new(Dielectric::regular(), 0.01)?;
    let mut tracker = glass.tracker();
    for step in 0..8 {
        let ctx = BsdfContext::at_incidence(30.0, 550.0)?.with_material_context(
            crate::types::EvalMaterialContext::default().with_time(step as f64)?,
        );
        glass.evaluate_tracked(&ctx, &mut tracker)?;
    }
    let report = validate_drift(&tracker, 1e-12);
    summary.check("drift/static_glass", report.bounded, || {
        format!("max step {:.3e}", report.max_step)
    });
    Ok(())
}

/// Run energy, reciprocity, golden-value, audit and drift checks on the
/// built-in presets.
///
/// # Errors
/// Only if a preset cannot be built or evaluated, which indicates a
/// defect rather than a failed check.
pub fn self_certify() -> Result<CertificationSummary, BuildError> {
    let mut summary = CertificationSummary::default();
    energy_checks(&mut summary)?;
    reciprocity_checks(&mut summary)?;
    golden_checks(&mut summary)?;
    audit_checks(&mut summary)?;
    drift_checks(&mut summary)?;
    summary.passed = summary.failures.is_empty();

    if summary.passed {
        log::info!("self-certification passed: {} checks", summary.tests_run);
    } else {
        log::warn!(
            "self-certification failed {} of {} checks: {}",
            summary.failures.len(),
            summary.tests_run,
            summary.failures.join("; ")
        );
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_certify_passes() {
        let _ = env_logger::builder().is_test(true).try_init();
        let summary = self_certify().unwrap();
        assert!(summary.passed, "failures: {:?}", summary.failures);
        assert_eq!(summary.tests_run, summary.tests_passed);
        assert_eq!(summary.tests_run, 4 + 8 + 7 + 2 + 1);
    }
}
