//! Pure optics kernels.
//!
//! Every function here is deterministic, side-effect free and safe to call
//! from any thread. Out-of-domain input yields [`OpticsError::Domain`](crate::error::OpticsError)
//! rather than a panic or a silent NaN.
//!
//! | Kernel | Module |
//! |--------|--------|
//! | Schlick / full dielectric Fresnel, conductor Fresnel, Fresnel LUT | [`fresnel`] |
//! | Beer–Lambert attenuation | [`absorption`] |
//! | Henyey–Greenstein phase function | [`phase`] |
//! | Lorenz–Mie sphere efficiencies | [`mie`] |

pub mod absorption;
pub mod fresnel;
pub mod mie;
pub mod phase;

pub use absorption::{absorption_coefficient, beer_lambert_transmittance};
pub use fresnel::{
    conductor_fresnel, conductor_fresnel_polarized, fresnel_full, fresnel_schlick,
    FresnelCoefficients, FresnelLut,
};
pub use mie::{mie_cross_sections, mie_efficiencies, MieCrossSections, MieEfficiencies};
pub use phase::{henyey_greenstein, hg_backscatter_fraction};
