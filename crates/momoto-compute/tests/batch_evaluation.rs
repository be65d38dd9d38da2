//! Integration test: batch evaluation across backends and materials.

use approx::assert_abs_diff_eq;
use momoto_compute::{select_backend, BackendType, ComputeBackend, CpuBackend, SerialBackend};
use momoto_core::bsdf::{Conductor, Dielectric, Material, Subsurface, ThinFilm};
use momoto_core::{BsdfContext, QualityTier};

fn sweep(tier: QualityTier) -> Vec<BsdfContext> {
    [0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 85.0]
        .iter()
        .flat_map(|&deg| {
            [450.0, 550.0, 650.0].into_iter().map(move |nm| {
                BsdfContext::at_incidence(deg, nm).unwrap().with_quality(tier)
            })
        })
        .collect()
}

#[test]
fn test_backends_agree_on_every_preset() {
    let _ = env_logger::builder().is_test(true).try_init();
    let materials: Vec<Material> = vec![
        Dielectric::clear().into(),
        Conductor::gold().into(),
        ThinFilm::soap_bubble().into(),
        Subsurface::skin().into(),
    ];
    let cpu = select_backend(BackendType::Cpu).unwrap();
    for tier in [QualityTier::Fast, QualityTier::High] {
        let contexts = sweep(tier);
        for material in &materials {
            let serial = SerialBackend.evaluate_batch(material, &contexts).unwrap();
            let parallel = cpu.evaluate_batch(material, &contexts).unwrap();
            assert_eq!(serial, parallel, "{}", material.kind());
            for r in &parallel {
                assert_abs_diff_eq!(r.total(), 1.0, epsilon = tier.energy_tolerance());
            }
        }
    }
}

#[test]
fn test_large_batch_on_dedicated_pool() {
    let backend = CpuBackend::with_threads(3).unwrap();
    let contexts: Vec<_> = (0..2_000)
        .map(|i| BsdfContext::at_incidence((i % 89) as f64, 550.0).unwrap())
        .collect();
    let out = backend.evaluate_batch(&Dielectric::regular(), &contexts).unwrap();
    assert_eq!(out.len(), contexts.len());
    // Same angle, same answer, wherever it landed in the batch.
    assert_eq!(out[5], out[5 + 89]);
    assert!(out[88].reflectance > out[0].reflectance);
}
