//! Neural correction auditing.
//!
//! Every [`CorrectionSample`] records how much of a response the network
//! changed. The auditor compares those shares with the ceiling of a
//! [`CertificationLevel`] and reports violations; it never clamps.

use serde::{Deserialize, Serialize};

use crate::bsdf::{Bsdf, CorrectionSample, NeuralCorrected};
use crate::error::OpticsError;
use crate::types::{BsdfContext, CertificationLevel};

/// Accumulated correction shares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionStats {
    shares: Vec<f64>,
}

impl CorrectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: &CorrectionSample) {
        self.shares.push(sample.share);
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn shares(&self) -> &[f64] {
        &self.shares
    }

    pub fn max_share(&self) -> f64 {
        self.shares.iter().copied().fold(0.0, f64::max)
    }

    pub fn mean_share(&self) -> f64 {
        if self.shares.is_empty() {
            0.0
        } else {
            self.shares.iter().sum::<f64>() / self.shares.len() as f64
        }
    }
}

impl Extend<CorrectionSample> for CorrectionStats {
    fn extend<I: IntoIterator<Item = CorrectionSample>>(&mut self, iter: I) {
        self.shares.extend(iter.into_iter().map(|s| s.share));
    }
}

/// Outcome of an audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub level: CertificationLevel,
    /// Largest share the level allows.
    pub ceiling: f64,
    pub samples: usize,
    /// Samples whose share exceeds the ceiling.
    pub violations: usize,
    pub max_correction_share: f64,
    pub mean_correction_share: f64,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.violations == 0
    }
}

/// Checks correction shares against a certification level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeuralAuditor {
    level: CertificationLevel,
}

impl NeuralAuditor {
    pub fn new(level: CertificationLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> CertificationLevel {
        self.level
    }

    pub fn audit(&self, stats: &CorrectionStats) -> AuditReport {
        let ceiling = self.level.max_correction_share();
        let violations = stats.shares().iter().filter(|&&s| s > ceiling).count();
        let report = AuditReport {
            level: self.level,
            ceiling,
            samples: stats.len(),
            violations,
            max_correction_share: stats.max_share(),
            mean_correction_share: stats.mean_share(),
        };
        if violations > 0 {
            log::warn!(
                "neural audit ({:?}): {} of {} corrections exceed {:.0}% (max {:.2}%)",
                self.level,
                violations,
                report.samples,
                ceiling * 100.0,
                report.max_correction_share * 100.0
            );
        }
        report
    }

    /// Evaluate `material` at every context and audit the corrections.
    pub fn audit_material<B: Bsdf>(
        &self,
        material: &NeuralCorrected<B>,
        contexts: &[BsdfContext],
    ) -> Result<AuditReport, OpticsError> {
        let mut stats = CorrectionStats::new();
        for ctx in contexts {
            let (_, sample) = material.evaluate_with_correction(ctx)?;
            stats.record(&sample);
        }
        Ok(self.audit(&stats))
    }
}
