//! Time-varying materials and drift tracking.
//!
//! [`Temporal`] evaluates its inner model at the time carried by the
//! context. The accumulated change between consecutive evaluations lives
//! in a [`DriftTracker`] owned by the caller, so the material itself stays
//! immutable and can be shared across threads. When several threads feed
//! one tracker, wrap it in a [`SharedDriftTracker`].

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{self, BuildError, OpticsError};
use crate::types::{BsdfContext, MaterialResponse, Vec3};

use super::material::Material;
use super::Bsdf;

/// Default cumulative drift above which a tracker warns.
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.05;

/// Advisory drift state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStatus {
    #[default]
    Ok,
    Warning,
}

/// Running sum of per-step response changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftTracker {
    cumulative_drift: f64,
    threshold: f64,
    max_step: f64,
    steps: usize,
    last: Option<MaterialResponse>,
}

/// A drift tracker behind a mutex, for evaluation from several threads.
pub type SharedDriftTracker = Arc<Mutex<DriftTracker>>;

impl DriftTracker {
    /// # Errors
    /// Fails when `threshold` is not positive.
    pub fn new(threshold: f64) -> Result<Self, BuildError> {
        Ok(Self {
            cumulative_drift: 0.0,
            threshold: error::require_positive("drift_threshold", threshold)?,
            max_step: 0.0,
            steps: 0,
            last: None,
        })
    }

    pub fn shared(self) -> SharedDriftTracker {
        Arc::new(Mutex::new(self))
    }

    /// Record one time step. The first sample only sets the baseline.
    pub fn record(&mut self, response: &MaterialResponse) -> DriftStatus {
        let before = self.status();
        if let Some(prev) = self.last {
            let step = (response.reflectance - prev.reflectance).abs()
                + (response.transmittance - prev.transmittance).abs()
                + (response.absorption - prev.absorption).abs();
            self.cumulative_drift += step;
            self.max_step = self.max_step.max(step);
            self.steps += 1;
        }
        self.last = Some(*response);

        let status = self.status();
        if before == DriftStatus::Ok && status == DriftStatus::Warning {
            log::warn!(
                "cumulative drift {:.4} exceeds threshold {:.4} after {} steps",
                self.cumulative_drift,
                self.threshold,
                self.steps
            );
        }
        status
    }

    pub fn status(&self) -> DriftStatus {
        if self.cumulative_drift > self.threshold {
            DriftStatus::Warning
        } else {
            DriftStatus::Ok
        }
    }

    pub fn cumulative_drift(&self) -> f64 {
        self.cumulative_drift
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Largest single-step change seen so far.
    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Number of recorded steps (samples after the baseline).
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Default for DriftTracker {
    fn default() -> Self {
        Self {
            cumulative_drift: 0.0,
            threshold: DEFAULT_DRIFT_THRESHOLD,
            max_step: 0.0,
            steps: 0,
            last: None,
        }
    }
}

/// A material whose response depends on time.
#[derive(Debug, Clone)]
pub struct Temporal<B = Material> {
    inner: B,
    drift_threshold: f64,
}

impl<B: Bsdf> Temporal<B> {
    pub fn new(inner: B, drift_threshold: f64) -> Result<Self, BuildError> {
        Ok(Self {
            inner,
            drift_threshold: error::require_positive("drift_threshold", drift_threshold)?,
        })
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn drift_threshold(&self) -> f64 {
        self.drift_threshold
    }

    /// A fresh tracker with this material's threshold.
    pub fn tracker(&self) -> DriftTracker {
        DriftTracker {
            threshold: self.drift_threshold,
            ..DriftTracker::default()
        }
    }

    /// Evaluate and record the step in `tracker`.
    pub fn evaluate_tracked(
        &self,
        ctx: &BsdfContext,
        tracker: &mut DriftTracker,
    ) -> Result<MaterialResponse, OpticsError> {
        let response = self.inner.evaluate(ctx)?;
        tracker.record(&response);
        Ok(response)
    }

    /// Evaluate and record the step in a shared tracker.
    pub fn evaluate_shared(
        &self,
        ctx: &BsdfContext,
        tracker: &SharedDriftTracker,
    ) -> Result<MaterialResponse, OpticsError> {
        let response = self.inner.evaluate(ctx)?;
        tracker.lock().record(&response);
        Ok(response)
    }
}

impl<B: Bsdf> Bsdf for Temporal<B> {
    fn name(&self) -> &str {
        "temporal"
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        self.inner.evaluate_at(ctx, wavelength_nm)
    }

    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        self.inner.evaluate_f_at(wi, wo, wavelength_nm)
    }

    fn evaluate(&self, ctx: &BsdfContext) -> Result<MaterialResponse, OpticsError> {
        self.inner.evaluate(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::{Dielectric, ThinFilm};
    use crate::types::EvalMaterialContext;
    use approx::assert_abs_diff_eq;

    fn ctx_at(time_s: f64) -> BsdfContext {
        BsdfContext::at_incidence(0.0, 550.0)
            .unwrap()
            .with_material_context(EvalMaterialContext::default().with_time(time_s).unwrap())
    }

    #[test]
    fn test_static_material_does_not_drift() {
        let glass = Temporal::new(Dielectric::clear(), 0.01).unwrap();
        let mut tracker = glass.tracker();
        for step in 0..20 {
            glass.evaluate_tracked(&ctx_at(step as f64), &mut tracker).unwrap();
        }
        assert_eq!(tracker.steps(), 19);
        assert_eq!(tracker.cumulative_drift(), 0.0);
        assert_eq!(tracker.status(), DriftStatus::Ok);
    }

    #[test]
    fn test_draining_film_raises_warning() {
        let _ = env_logger::builder().is_test(true).try_init();
        let film = ThinFilm::soap_bubble().with_drainage(30.0).unwrap();
        let temporal = Temporal::new(film, 0.05).unwrap();
        let mut tracker = temporal.tracker();
        let mut status = DriftStatus::Ok;
        for step in 0..60 {
            status = tracker.record(&temporal.evaluate(&ctx_at(step as f64)).unwrap());
        }
        assert_eq!(status, DriftStatus::Warning);
        assert!(tracker.max_step() > 0.0);
        assert!(tracker.max_step() <= tracker.cumulative_drift());
    }

    #[test]
    fn test_shared_tracker_matches_exclusive() {
        let film = ThinFilm::soap_bubble().with_drainage(20.0).unwrap();
        let temporal = Temporal::new(film, 0.05).unwrap();
        let mut exclusive = temporal.tracker();
        let shared = temporal.tracker().shared();
        for step in 0..10 {
            let ctx = ctx_at(step as f64 * 2.0);
            temporal.evaluate_tracked(&ctx, &mut exclusive).unwrap();
            temporal.evaluate_shared(&ctx, &shared).unwrap();
        }
        assert_abs_diff_eq!(
            shared.lock().cumulative_drift(),
            exclusive.cumulative_drift(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_drift_only_accumulates() {
        let mut tracker = DriftTracker::new(0.1).unwrap();
        tracker.record(&MaterialResponse::opaque(0.2));
        tracker.record(&MaterialResponse::opaque(0.5));
        assert_abs_diff_eq!(tracker.cumulative_drift(), 0.6, epsilon = 1e-12);
        assert_eq!(tracker.status(), DriftStatus::Warning);

        // Returning to the baseline adds drift rather than cancelling it.
        let mut previous = tracker.cumulative_drift();
        for r in [0.2, 0.2, 0.5, 0.2] {
            tracker.record(&MaterialResponse::opaque(r));
            assert!(tracker.cumulative_drift() >= previous);
            previous = tracker.cumulative_drift();
        }
        assert_abs_diff_eq!(tracker.cumulative_drift(), 2.4, epsilon = 1e-12);
        assert_eq!(tracker.steps(), 5);
        assert_eq!(tracker.status(), DriftStatus::Warning);

        // A fresh history needs a fresh tracker.
        let fresh = DriftTracker::new(0.1).unwrap();
        assert_eq!(fresh.cumulative_drift(), 0.0);
        assert_eq!(fresh.status(), DriftStatus::Ok);
        assert!(DriftTracker::new(0.0).is_err());
    }
}
