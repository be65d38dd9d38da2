//! Thin-film interference.
//!
//! Light reflected from the top and bottom of a film interferes; the phase
//! difference $\delta$ depends on film index, thickness, angle and
//! wavelength, producing the iridescence of soap bubbles, oil slicks,
//! butterfly wings and nacre.
//!
//! - [`airy`]: closed-form single film on a substrate.
//! - [`tmm`]: transfer-matrix method for arbitrary layer stacks.
//! - [`presets`]: named stacks (soap bubble, oil slick, Morpho, Bragg
//!   mirror, nacre, anti-reflection coating).
//!
//! For a single lossless film the two methods agree to machine precision.

pub mod airy;
pub mod presets;
pub mod tmm;

pub use airy::{thin_film_reflectance, thin_film_reflectance_polarized};
pub use tmm::{FilmLayer, TmmResult, TmmSolver, TmmSolverBuilder};
