//! Render presets.

use momoto_core::{EvalMaterialContext, QualityTier};
use serde::{Deserialize, Serialize};

use crate::RenderError;

/// How a material should be drawn: evaluation tier, gradient resolution
/// and the blur applied to shadows and backdrops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRenderContext")]
pub struct RenderContext {
    pub quality: QualityTier,
    pub device_pixel_ratio: f64,
    /// Colour stops per gradient, at least two.
    pub gradient_stops: usize,
    /// Base blur radius in CSS pixels.
    pub blur_px: f64,
    /// Viewing angle mapped to the far end of a gradient.
    pub max_view_angle_deg: f64,
}

#[derive(Deserialize)]
struct RawRenderContext {
    quality: QualityTier,
    device_pixel_ratio: f64,
    gradient_stops: usize,
    blur_px: f64,
    max_view_angle_deg: f64,
}

impl TryFrom<RawRenderContext> for RenderContext {
    type Error = RenderError;

    fn try_from(raw: RawRenderContext) -> Result<Self, Self::Error> {
        Self::new(
            raw.quality,
            raw.device_pixel_ratio,
            raw.gradient_stops,
            raw.blur_px,
            raw.max_view_angle_deg,
        )
    }
}

impl RenderContext {
    pub fn new(
        quality: QualityTier,
        device_pixel_ratio: f64,
        gradient_stops: usize,
        blur_px: f64,
        max_view_angle_deg: f64,
    ) -> Result<Self, RenderError> {
        if !(device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0) {
            return Err(RenderError::InvalidContext(format!(
                "device pixel ratio {device_pixel_ratio} must be positive"
            )));
        }
        if gradient_stops < 2 {
            return Err(RenderError::InvalidContext(format!(
                "a gradient needs at least 2 stops, got {gradient_stops}"
            )));
        }
        if !(blur_px.is_finite() && blur_px >= 0.0) {
            return Err(RenderError::InvalidContext(format!("blur {blur_px}px must be non-negative")));
        }
        if !(max_view_angle_deg > 0.0 && max_view_angle_deg < 90.0) {
            return Err(RenderError::InvalidContext(format!(
                "view angle {max_view_angle_deg} must lie in (0, 90) degrees"
            )));
        }
        Ok(Self {
            quality,
            device_pixel_ratio,
            gradient_stops,
            blur_px,
            max_view_angle_deg,
        })
    }

    /// 1x display, High tier.
    pub fn desktop() -> Self {
        Self {
            quality: QualityTier::High,
            device_pixel_ratio: 1.0,
            gradient_stops: 8,
            blur_px: 16.0,
            max_view_angle_deg: 80.0,
        }
    }

    /// 3x handheld display, Standard tier with fewer stops.
    pub fn mobile() -> Self {
        Self {
            quality: QualityTier::Standard,
            device_pixel_ratio: 3.0,
            gradient_stops: 5,
            blur_px: 10.0,
            max_view_angle_deg: 75.0,
        }
    }

    /// 2x 4K display, UltraHigh tier.
    pub fn four_k() -> Self {
        Self {
            quality: QualityTier::UltraHigh,
            device_pixel_ratio: 2.0,
            gradient_stops: 16,
            blur_px: 24.0,
            max_view_angle_deg: 85.0,
        }
    }

    /// Evaluation context at this preset's tier.
    pub fn eval_context(&self) -> EvalMaterialContext {
        EvalMaterialContext::new(self.quality)
    }

    /// Viewing angle of stop `i`, from normal incidence to
    /// `max_view_angle_deg`.
    pub fn stop_angle_deg(&self, i: usize) -> f64 {
        let last = self.gradient_stops.saturating_sub(1).max(1);
        self.max_view_angle_deg * i.min(last) as f64 / last as f64
    }

    /// Blur radius in CSS pixels, snapped to the device pixel grid.
    pub fn device_blur_px(&self) -> f64 {
        (self.blur_px * self.device_pixel_ratio).round() / self.device_pixel_ratio
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::desktop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_presets() {
        let presets = [RenderContext::mobile(), RenderContext::desktop(), RenderContext::four_k()];
        assert!(presets.windows(2).all(|p| p[0].gradient_stops < p[1].gradient_stops));
        assert_eq!(RenderContext::mobile().quality, QualityTier::Standard);
        assert_eq!(RenderContext::four_k().eval_context().quality, QualityTier::UltraHigh);
        for p in presets {
            let rebuilt = RenderContext::new(
                p.quality,
                p.device_pixel_ratio,
                p.gradient_stops,
                p.blur_px,
                p.max_view_angle_deg,
            )
            .unwrap();
            assert_eq!(rebuilt, p);
        }
    }

    #[test]
    fn test_stop_angles_span_range() {
        let ctx = RenderContext::desktop();
        assert_eq!(ctx.stop_angle_deg(0), 0.0);
        assert_abs_diff_eq!(ctx.stop_angle_deg(7), 80.0);
        assert_abs_diff_eq!(ctx.stop_angle_deg(99), 80.0);
    }

    #[test]
    fn test_blur_snaps_to_device_pixels() {
        let ctx = RenderContext::new(QualityTier::Fast, 3.0, 2, 10.1, 60.0).unwrap();
        assert_abs_diff_eq!(ctx.device_blur_px(), 30.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(RenderContext::new(QualityTier::High, 0.0, 8, 4.0, 80.0).is_err());
        assert!(RenderContext::new(QualityTier::High, 1.0, 1, 4.0, 80.0).is_err());
        assert!(RenderContext::new(QualityTier::High, 1.0, 8, -1.0, 80.0).is_err());
        assert!(RenderContext::new(QualityTier::High, 1.0, 8, 4.0, 90.0).is_err());
        assert!(RenderContext::new(QualityTier::High, 1.0, 8, 4.0, f64::NAN).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&RenderContext::mobile()).unwrap();
        assert!(json.contains("\"standard\""));
        let back: RenderContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RenderContext::mobile());
    }

    #[test]
    fn test_deserialisation_validates_fields() {
        let valid = serde_json::to_value(RenderContext::desktop()).unwrap();
        let broken = [
            ("device_pixel_ratio", serde_json::json!(0.0)),
            ("gradient_stops", serde_json::json!(1)),
            ("blur_px", serde_json::json!(-2.0)),
            ("max_view_angle_deg", serde_json::json!(95.0)),
        ];
        for (field, value) in broken {
            let mut json = valid.clone();
            json[field] = value;
            let err = serde_json::from_value::<RenderContext>(json).unwrap_err();
            assert!(err.to_string().contains("Invalid render context"), "{field}: {err}");
        }
    }
}
