//! Integration test: JSON round trips of public value types and TOML
//! configuration.

use momoto_core::bsdf::{Bsdf, DriftStatus, Subsurface};
use momoto_core::config::EngineConfig;
use momoto_core::validation::{self_certify, CertificationSummary, NeuralAuditor};
use momoto_core::{
    BsdfContext, CertificationLevel, MaterialResponse, QualityTier, Spectrum,
};

#[test]
fn test_value_types_round_trip() {
    let response = Subsurface::jade()
        .evaluate(&BsdfContext::at_incidence(20.0, 520.0).unwrap())
        .unwrap();
    let json = serde_json::to_string(&response).unwrap();
    let back: MaterialResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(back, response);

    let spectrum = Spectrum::from_fn(|nm| (nm - 380.0) / 320.0).unwrap();
    let back: Spectrum = serde_json::from_str(&serde_json::to_string(&spectrum).unwrap()).unwrap();
    assert_eq!(back, spectrum);

    assert_eq!(serde_json::to_string(&QualityTier::UltraHigh).unwrap(), "\"ultra_high\"");
    assert_eq!(
        serde_json::from_str::<CertificationLevel>("\"research\"").unwrap(),
        CertificationLevel::Research
    );
    assert_eq!(serde_json::to_string(&DriftStatus::Warning).unwrap(), "\"warning\"");
}

#[test]
fn test_reports_serialise() {
    let summary = self_certify().unwrap();
    let json = serde_json::to_string_pretty(&summary).unwrap();
    let back: CertificationSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);

    let audit = NeuralAuditor::new(CertificationLevel::Reference).audit(&Default::default());
    let value = serde_json::to_value(audit).unwrap();
    assert_eq!(value["level"], "reference");
    assert_eq!(value["samples"], 0);
}

#[test]
fn test_config_drives_evaluation() {
    let config = EngineConfig::from_toml_str(
        r#"
        [evaluation]
        quality = "fast"

        [certification]
        level = "experimental"
        "#,
    )
    .unwrap();
    let ctx = BsdfContext::at_incidence(0.0, 550.0)
        .unwrap()
        .with_material_context(config.eval_context().unwrap());
    assert_eq!(ctx.quality(), QualityTier::Fast);
    assert_eq!(config.auditor().level(), CertificationLevel::Experimental);
    assert_eq!(config.drift.threshold, 0.05);

    let skin = config.neural_corrected(Subsurface::skin()).unwrap();
    let r = skin.evaluate(&ctx).unwrap();
    assert!((r.total() - 1.0).abs() < QualityTier::Fast.energy_tolerance());
}
