//! Bounded-growth check for temporal drift.

use serde::{Deserialize, Serialize};

use crate::bsdf::{DriftStatus, DriftTracker};

/// Snapshot of a tracker judged against a per-step bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub status: DriftStatus,
    pub cumulative_drift: f64,
    pub threshold: f64,
    pub steps: usize,
    pub max_step: f64,
    pub max_allowed_step: f64,
    /// No single step exceeded `max_allowed_step`.
    pub bounded: bool,
}

/// Check that no recorded step exceeded `max_step`.
///
/// The tracker's own [`DriftStatus`] is carried along as an advisory; it
/// does not affect `bounded`.
pub fn validate_drift(tracker: &DriftTracker, max_step: f64) -> DriftReport {
    let bounded = tracker.max_step() <= max_step;
    if !bounded {
        log::warn!(
            "drift step {:.4} exceeds bound {:.4} over {} steps",
            tracker.max_step(),
            max_step,
            tracker.steps()
        );
    }
    DriftReport {
        status: tracker.status(),
        cumulative_drift: tracker.cumulative_drift(),
        threshold: tracker.threshold(),
        steps: tracker.steps(),
        max_step: tracker.max_step(),
        max_allowed_step: max_step,
        bounded,
    }
}
