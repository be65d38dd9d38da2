//! Named thin-film stacks.
//!
//! | Preset | Structure |
//! |--------|-----------|
//! | soap bubble | 300 nm water film, air on both sides |
//! | oil slick | 350 nm mineral oil on water |
//! | Morpho | 6 × (72 nm chitin / 112 nm air) on chitin |
//! | Bragg mirror | N × quarter-wave (TiO₂ / SiO₂) on glass |
//! | nacre | 10 × (400 nm aragonite / 25 nm organic) on aragonite |
//! | AR coating | quarter-wave MgF₂ at 550 nm on crown glass |

use momoto_materials::{CauchyDielectric, MaterialProvider};

use crate::error::{self, BuildError};
use crate::types::{ComplexIor, IndexModel};

use super::tmm::{FilmLayer, TmmSolver};

const AIR: IndexModel = IndexModel::Constant(ComplexIor { n: 1.0, k: 0.0 });

/// Substrate index used by the coating presets.
pub const GLASS_SUBSTRATE_IOR: f64 = 1.52;

/// Design wavelength of [`TmmSolver::ar_coating`].
pub const AR_DESIGN_WAVELENGTH_NM: f64 = 550.0;

fn layer(index: impl Into<IndexModel>, thickness_nm: f64) -> FilmLayer {
    FilmLayer {
        index: index.into(),
        thickness_nm,
    }
}

/// Quarter-wave thickness of `material` at `wavelength_nm`.
fn quarter_wave(material: &CauchyDielectric, wavelength_nm: f64) -> Result<f64, BuildError> {
    let n = material.refractive_index(wavelength_nm)?.re;
    Ok(wavelength_nm / (4.0 * n))
}

impl TmmSolver {
    /// Free-standing 300 nm soap film.
    pub fn soap_bubble() -> Self {
        Self::free_soap_film(layer(CauchyDielectric::soap_film(), 300.0))
    }

    /// Free-standing soap film of the given thickness.
    ///
    /// # Errors
    /// [`BuildError::InvalidLayer`] unless the thickness is finite and
    /// strictly positive.
    pub fn soap_film(thickness_nm: f64) -> Result<Self, BuildError> {
        let film = FilmLayer::new(CauchyDielectric::soap_film(), thickness_nm)?;
        Ok(Self::free_soap_film(film))
    }

    fn free_soap_film(film: FilmLayer) -> Self {
        Self {
            ambient_ior: 1.0,
            layers: vec![film],
            substrate: AIR,
        }
    }

    /// Mineral oil floating on water.
    pub fn oil_slick() -> Self {
        Self {
            ambient_ior: 1.0,
            layers: vec![layer(CauchyDielectric::mineral_oil(), 350.0)],
            substrate: CauchyDielectric::water().into(),
        }
    }

    /// Morpho butterfly wing scale: alternating chitin lamellae and air gaps.
    pub fn morpho() -> Self {
        let mut layers = Vec::with_capacity(12);
        for _ in 0..6 {
            layers.push(layer(CauchyDielectric::chitin(), 72.0));
            layers.push(layer(AIR, 112.0));
        }
        Self {
            ambient_ior: 1.0,
            layers,
            substrate: CauchyDielectric::chitin().into(),
        }
    }

    /// Quarter-wave dielectric mirror centred on `center_nm`.
    ///
    /// High-index TiO₂ faces the incident light; `pairs` counts TiO₂/SiO₂
    /// periods.
    pub fn bragg_mirror(center_nm: f64, pairs: usize) -> Result<Self, BuildError> {
        error::require_positive("center_nm", center_nm)?;
        if pairs == 0 {
            return Err(BuildError::InvalidParameter {
                name: "pairs",
                value: 0.0,
                reason: "a mirror needs at least one period",
            });
        }
        let high = CauchyDielectric::titanium_dioxide();
        let low = CauchyDielectric::fused_silica();
        let d_high = quarter_wave(&high, center_nm)?;
        let d_low = quarter_wave(&low, center_nm)?;

        let mut layers = Vec::with_capacity(2 * pairs);
        for _ in 0..pairs {
            layers.push(layer(high.clone(), d_high));
            layers.push(layer(low.clone(), d_low));
        }
        Ok(Self {
            ambient_ior: 1.0,
            layers,
            substrate: IndexModel::Constant(ComplexIor {
                n: GLASS_SUBSTRATE_IOR,
                k: 0.0,
            }),
        })
    }

    /// Mother-of-pearl: aragonite tablets separated by thin organic sheets.
    pub fn nacre() -> Self {
        let organic = IndexModel::Constant(ComplexIor { n: 1.43, k: 0.0 });
        let mut layers = Vec::with_capacity(20);
        for _ in 0..10 {
            layers.push(layer(CauchyDielectric::aragonite(), 400.0));
            layers.push(layer(organic.clone(), 25.0));
        }
        Self {
            ambient_ior: 1.0,
            layers,
            substrate: CauchyDielectric::aragonite().into(),
        }
    }

    /// Single-layer MgF₂ anti-reflection coating on crown glass.
    pub fn ar_coating() -> Self {
        let mgf2 = CauchyDielectric::magnesium_fluoride();
        // 550 nm lies inside the Cauchy validity range.
        let n = mgf2.real_index(AR_DESIGN_WAVELENGTH_NM);
        let d = AR_DESIGN_WAVELENGTH_NM / (4.0 * n);
        Self {
            ambient_ior: 1.0,
            layers: vec![layer(mgf2, d)],
            substrate: CauchyDielectric::crown_glass().into(),
        }
    }
}
