//! Physical validation and self-certification.
//!
//! Problems found here are returned as reports rather than errors: a
//! material that leaks energy or loses reciprocity still evaluates, and the
//! caller decides what a violation means for them.
//!
//! - [`energy`]: $R + T + A = 1$ against the tier tolerance.
//! - [`reciprocity`]: $f(\omega_i, \omega_o) = f(\omega_o, \omega_i)$ over a
//!   fixed direction set.
//! - [`audit`]: neural correction shares against a certification ceiling.
//! - [`drift`]: bounded growth of a temporal drift tracker.
//! - [`certify`]: all of the above on the built-in presets.

pub mod audit;
pub mod certify;
pub mod drift;
pub mod energy;
pub mod reciprocity;

pub use audit::{AuditReport, CorrectionStats, NeuralAuditor};
pub use certify::{self_certify, CertificationSummary};
pub use drift::{validate_drift, DriftReport};
pub use energy::{validate_energy, validate_energy_sweep, EnergyReport, ENERGY_TEST_ANGLES_DEG};
pub use reciprocity::{
    reciprocity_directions, reciprocity_report, test_reciprocity, ReciprocityReport,
    DEFAULT_RECIPROCITY_TOLERANCE,
};
