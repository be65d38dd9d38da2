//! Integration test: cheaper tiers stay within their reflectance budget of
//! the Reference tier.
//!
//! Incidence is limited to 60 degrees: past that, Schlick's approximation
//! for low-index media drifts beyond the Fast budget. The GGX albedo
//! estimator is covered by its own convergence test instead.

use momoto_core::bsdf::{Bsdf, Conductor, Dielectric, Subsurface, ThinFilm};
use momoto_core::pipeline::SpectralPipeline;
use momoto_core::{BsdfContext, EvalMaterialContext, Material, QualityTier, Spectrum};
use momoto_materials::CauchyDielectric;

const ANGLES_DEG: [f64; 5] = [0.0, 15.0, 30.0, 45.0, 60.0];
const WAVELENGTHS: [f64; 3] = [450.0, 550.0, 650.0];

fn materials() -> Vec<Material> {
    vec![
        Dielectric::clear().into(),
        Dielectric::thick().into(),
        Conductor::gold().into(),
        Conductor::copper().into(),
        Subsurface::skin().into(),
        Subsurface::marble().into(),
        Subsurface::milk().into(),
        ThinFilm::soap_bubble().into(),
        ThinFilm::oil_slick().into(),
    ]
}

#[test]
fn test_reflectance_within_tier_budget() {
    for material in materials() {
        for &deg in &ANGLES_DEG {
            for &wl in &WAVELENGTHS {
                let ctx = BsdfContext::at_incidence(deg, wl).unwrap();
                let reference = material
                    .evaluate(&ctx.with_quality(QualityTier::Reference))
                    .unwrap()
                    .reflectance;
                for tier in QualityTier::ALL {
                    let r = material.evaluate(&ctx.with_quality(tier)).unwrap().reflectance;
                    let budget = tier.reflectance_budget();
                    assert!(
                        (r - reference).abs() <= budget + 1e-12,
                        "{} at {deg} deg, {wl} nm, {tier:?}: {r} vs reference {reference}",
                        material.kind()
                    );
                }
            }
        }
    }
}

fn assert_within_budget(material: &dyn Bsdf, ctx: BsdfContext, label: &str) {
    let reference = material
        .evaluate(&ctx.with_quality(QualityTier::Reference))
        .unwrap()
        .reflectance;
    for tier in QualityTier::ALL {
        let r = material.evaluate(&ctx.with_quality(tier)).unwrap().reflectance;
        assert!(
            (r - reference).abs() <= tier.reflectance_budget() + 1e-12,
            "{label}, {tier:?}: {r} vs reference {reference}"
        );
    }
}

#[test]
fn test_strongly_dispersive_slab_within_budget() {
    // Cauchy TiO2: n runs from 2.95 at 400 nm down to 2.44 at 700 nm, far
    // from the index the Standard Fresnel table was built for.
    let tio2 = CauchyDielectric::new("TiO2", 2.2, 0.12, 0.0).unwrap();
    let slab = Dielectric::builder().ior(tio2).build().unwrap();
    for wl in (400..=700).step_by(25) {
        for deg in [0.0, 30.0, 60.0] {
            let ctx = BsdfContext::at_incidence(deg, wl as f64).unwrap();
            assert_within_budget(&slab, ctx, &format!("TiO2 at {deg} deg, {wl} nm"));
        }
    }
}

#[test]
fn test_heated_glass_within_budget() {
    let glass = Dielectric::builder().thermo_optic(2e-4).build().unwrap();
    for temperature_k in [200.0, 293.15, 500.0, 800.0] {
        for deg in [0.0, 30.0, 60.0] {
            let env = EvalMaterialContext::new(QualityTier::Reference)
                .with_temperature(temperature_k)
                .unwrap();
            let ctx = BsdfContext::at_incidence(deg, 550.0)
                .unwrap()
                .with_material_context(env);
            assert_within_budget(&glass, ctx, &format!("glass at {temperature_k} K, {deg} deg"));
        }
    }
}

#[test]
fn test_exact_tiers_agree_for_closed_form_models() {
    let gold = Conductor::gold();
    for tier in [QualityTier::Standard, QualityTier::High, QualityTier::UltraHigh] {
        let ctx = BsdfContext::at_incidence(35.0, 600.0).unwrap();
        let a = gold.evaluate(&ctx.with_quality(tier)).unwrap();
        let b = gold.evaluate(&ctx.with_quality(QualityTier::Reference)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_pipeline_band_count_follows_tier() {
    let pipeline = SpectralPipeline::builder()
        .reflect(Conductor::copper())
        .build()
        .unwrap();
    let ctx = BsdfContext::at_incidence(0.0, 550.0).unwrap();
    let coarse = pipeline
        .evaluate(&Spectrum::equal_energy(), &ctx.with_quality(QualityTier::Standard))
        .unwrap();
    let fine = pipeline
        .evaluate(&Spectrum::equal_energy(), &ctx.with_quality(QualityTier::Reference))
        .unwrap();
    // Three-band sampling is exact at its own knots.
    for (i, (nm, v)) in fine.iter().enumerate() {
        if [450.0, 550.0, 650.0].contains(&nm) {
            assert!((coarse.values()[i] - v).abs() < 1e-12);
        }
    }
}
