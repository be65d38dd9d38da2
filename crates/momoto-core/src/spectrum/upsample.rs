//! RGB to spectrum upsampling.
//!
//! A linear RGB triple is expanded over three non-overlapping box spectra
//! (blue 400–490 nm, green 500–580 nm, red 600–700 nm). The 3×3 map from
//! box weights to linear sRGB is inverted once; every entry of the inverse
//! is non-negative, so any non-negative RGB yields a non-negative spectrum,
//! and converting that spectrum back reproduces the input exactly.

use std::sync::OnceLock;

use crate::error::BuildError;

use super::{canonical_wavelengths, cie, Spectrum, CANONICAL_BANDS};

/// Inclusive canonical-band index ranges of the blue, green and red boxes.
const BOXES: [(usize, usize); 3] = [(0, 9), (10, 18), (20, 30)];

fn box_values(range: (usize, usize)) -> Vec<f64> {
    (0..CANONICAL_BANDS)
        .map(|i| if (range.0..=range.1).contains(&i) { 1.0 } else { 0.0 })
        .collect()
}

/// Inverse of the box-to-RGB matrix, columns ordered (blue, green, red).
fn rgb_to_box_weights() -> Option<&'static [[f64; 3]; 3]> {
    static INVERSE: OnceLock<Option<[[f64; 3]; 3]>> = OnceLock::new();
    INVERSE
        .get_or_init(|| {
            let columns: Vec<[f64; 3]> = BOXES
                .iter()
                .map(|&r| Spectrum::from_parts(canonical_wavelengths(), box_values(r)).to_linear_rgb())
                .collect();
            let forward = [
                [columns[0][0], columns[1][0], columns[2][0]],
                [columns[0][1], columns[1][1], columns[2][1]],
                [columns[0][2], columns[1][2], columns[2][2]],
            ];
            cie::mat3_inverse(&forward)
        })
        .as_ref()
}

/// Expand a linear sRGB triple into a canonical reflectance spectrum.
///
/// # Errors
/// Fails if any component is negative or non-finite.
pub fn rgb_to_spectrum(linear_rgb: [f64; 3]) -> Result<Spectrum, BuildError> {
    if let Some(c) = linear_rgb.iter().find(|c| !(c.is_finite() && **c >= 0.0)) {
        return Err(BuildError::InvalidSpectrum(format!(
            "RGB component {c} must be finite and non-negative"
        )));
    }
    let inverse = rgb_to_box_weights()
        .ok_or_else(|| BuildError::InvalidSpectrum("RGB basis is singular".into()))?;
    let weights = cie::mat3_mul_vec(inverse, &linear_rgb);

    let mut values = vec![0.0; CANONICAL_BANDS];
    for (&(lo, hi), &w) in BOXES.iter().zip(weights.iter()) {
        for v in &mut values[lo..=hi] {
            // Inverse entries are non-negative; clamp only round-off.
            *v = w.max(0.0);
        }
    }
    Spectrum::canonical(values)
}

/// Expand a gamma-encoded sRGB triple in [0, 1].
pub fn srgb_to_spectrum(srgb: [f64; 3]) -> Result<Spectrum, BuildError> {
    if let Some(c) = srgb.iter().find(|c| !(c.is_finite() && (0.0..=1.0).contains(*c))) {
        return Err(BuildError::InvalidSpectrum(format!(
            "sRGB component {c} must lie in [0, 1]"
        )));
    }
    rgb_to_spectrum(srgb.map(cie::srgb_decode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_inverse_is_non_negative() {
        let inv = rgb_to_box_weights().unwrap();
        for row in inv {
            for &v in row {
                assert!(v >= 0.0, "negative basis weight {v}");
            }
        }
    }

    #[test]
    fn test_round_trip_primaries_and_grey() {
        let colours = [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.18, 0.18, 0.18],
            [0.8, 0.4, 0.1],
        ];
        for rgb in colours {
            let s = rgb_to_spectrum(rgb).unwrap();
            assert!(s.values().iter().all(|&v| v >= 0.0));
            let back = s.to_linear_rgb();
            for k in 0..3 {
                assert_abs_diff_eq!(back[k], rgb[k], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_srgb_round_trip() {
        let srgb = [0.9, 0.5, 0.2];
        let back = srgb_to_spectrum(srgb).unwrap().to_srgb();
        for k in 0..3 {
            assert_abs_diff_eq!(back[k], srgb[k], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rejects_invalid_components() {
        assert!(rgb_to_spectrum([-0.1, 0.5, 0.5]).is_err());
        assert!(rgb_to_spectrum([f64::NAN, 0.5, 0.5]).is_err());
        assert!(srgb_to_spectrum([1.2, 0.5, 0.5]).is_err());
    }
}
