//! CSS backend.
//!
//! Colours come from the reflectance spectrum of a material seen under
//! D65, converted to sRGB. Gradients sweep the viewing angle from normal
//! incidence (first stop) to the context's maximum angle (last stop).

use std::fmt;

use momoto_core::bsdf::{Bsdf, ThinFilm};
use momoto_core::pipeline::band_wavelengths;
use momoto_core::spectrum::cie::{mat3_mul_vec, srgb_encode, XYZ_TO_LINEAR_SRGB};
use momoto_core::types::{BsdfContext, LUMINANCE_WEIGHTS, REFERENCE_WAVELENGTH_NM};
use momoto_core::{EvalMaterialContext, MaterialResponse, Spectrum};

use crate::context::RenderContext;
use crate::RenderError;

/// Below this transmittance no backdrop blur is emitted.
const BACKDROP_MIN_TRANSMITTANCE: f64 = 0.01;
const BUBBLE_PEAK_ALPHA: f64 = 0.85;
const SLICK_PEAK_ALPHA: f64 = 0.7;
/// Dark wet-asphalt base under an oil slick.
const SLICK_BASE: &str = "rgb(16, 20, 24)";
/// Half-width of the angular window shown around a structural colour.
const STRUCTURAL_SPREAD_DEG: f64 = 10.0;

/// An sRGB colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    /// Encode linear sRGB, clipping to gamut.
    pub fn from_linear(rgb: [f64; 3], alpha: f64) -> Self {
        let [r, g, b] = rgb.map(|c| (srgb_encode(c.clamp(0.0, 1.0)) * 255.0).round() as u8);
        Self {
            r,
            g,
            b,
            a: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

/// One gradient stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssStop {
    pub position_pct: f64,
    pub angle_deg: f64,
    pub color: Rgba,
}

impl fmt::Display for CssStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.1}%", self.color, self.position_pct)
    }
}

/// Evaluated colour state of a surface at one viewing angle.
#[derive(Debug, Clone, Copy)]
struct Sample {
    linear_rgb: [f64; 3],
    response: MaterialResponse,
}

fn sample<B: Bsdf + ?Sized>(
    bsdf: &B,
    eval: &EvalMaterialContext,
    angle_deg: f64,
) -> Result<Sample, RenderError> {
    let ctx = BsdfContext::at_incidence(angle_deg, REFERENCE_WAVELENGTH_NM)?.with_material_context(*eval);
    let bands = band_wavelengths(eval.quality);
    let values = bands
        .iter()
        .map(|&nm| -> Result<f64, RenderError> { Ok(bsdf.evaluate_at(&ctx, nm)?.reflectance) })
        .collect::<Result<Vec<_>, RenderError>>()?;
    let xyz = Spectrum::new(bands, values)?.reflected_xyz(&Spectrum::d65());
    Ok(Sample {
        linear_rgb: mat3_mul_vec(&XYZ_TO_LINEAR_SRGB, &xyz),
        response: bsdf.evaluate(&ctx)?,
    })
}

/// Scale so the brightest channel is 1, keeping hue and saturation.
fn chromatic(rgb: [f64; 3]) -> [f64; 3] {
    let rgb = rgb.map(|c| c.max(0.0));
    let peak = rgb.iter().copied().fold(0.0, f64::max);
    if peak > 0.0 {
        rgb.map(|c| c / peak)
    } else {
        rgb
    }
}

fn luminance(rgb: [f64; 3]) -> f64 {
    rgb.iter().zip(LUMINANCE_WEIGHTS).map(|(c, w)| c * w).sum()
}

fn join_stops(stops: &[CssStop]) -> String {
    stops.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Renders materials as CSS declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssRenderer {
    context: RenderContext,
}

impl CssRenderer {
    pub fn new(context: RenderContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Evaluate one stop per gradient position. Alpha is the opacity of
    /// the surface, `1 - T`.
    pub fn gradient_stops<B: Bsdf + ?Sized>(
        &self,
        bsdf: &B,
        eval: &EvalMaterialContext,
    ) -> Result<Vec<CssStop>, RenderError> {
        let n = self.context.gradient_stops;
        (0..n)
            .map(|i| -> Result<CssStop, RenderError> {
                let angle_deg = self.context.stop_angle_deg(i);
                let s = sample(bsdf, eval, angle_deg)?;
                Ok(CssStop {
                    position_pct: 100.0 * i as f64 / (n - 1) as f64,
                    angle_deg,
                    color: Rgba::from_linear(s.linear_rgb, 1.0 - s.response.transmittance),
                })
            })
            .collect()
    }

    /// Full declaration block: angle-dependent background, a drop shadow
    /// weighted by absorption, a specular rim weighted by normal
    /// reflectance, and a backdrop blur for transmissive surfaces.
    pub fn render<B: Bsdf + ?Sized>(&self, bsdf: &B, eval: &EvalMaterialContext) -> Result<String, RenderError> {
        let stops = self.gradient_stops(bsdf, eval)?;
        let normal = sample(bsdf, eval, 0.0)?.response;
        let blur = self.context.device_blur_px();

        let mut css = vec![
            format!("background: linear-gradient(180deg, {})", join_stops(&stops)),
            format!(
                "box-shadow: 0 {:.1}px {:.1}px {}, inset 0 1px 0 {}",
                blur / 4.0,
                blur,
                Rgba::from_linear([0.0; 3], 0.5 * normal.absorption),
                Rgba::from_linear([1.0; 3], normal.reflectance)
            ),
        ];
        if normal.transmittance > BACKDROP_MIN_TRANSMITTANCE {
            css.push(format!("backdrop-filter: blur({:.1}px)", blur * normal.transmittance));
        }
        Ok(css.into_iter().map(|d| d + ";").collect::<Vec<_>>().join("\n"))
    }

    /// Interference colours with alpha following relative brightness, so
    /// the brightest stop reaches `peak_alpha`.
    fn interference_stops(
        &self,
        film: &ThinFilm,
        peak_alpha: f64,
    ) -> Result<Vec<CssStop>, RenderError> {
        let eval = self.context.eval_context();
        let n = self.context.gradient_stops;
        let samples = (0..n)
            .map(|i| sample(film, &eval, self.context.stop_angle_deg(i)))
            .collect::<Result<Vec<_>, _>>()?;
        let brightest = samples
            .iter()
            .map(|s| luminance(s.linear_rgb))
            .fold(0.0, f64::max);
        Ok(samples
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let alpha = if brightest > 0.0 {
                    peak_alpha * luminance(s.linear_rgb) / brightest
                } else {
                    0.0
                };
                CssStop {
                    position_pct: 100.0 * i as f64 / (n - 1) as f64,
                    angle_deg: self.context.stop_angle_deg(i),
                    color: Rgba::from_linear(chromatic(s.linear_rgb), alpha),
                }
            })
            .collect())
    }
}

/// CSS renderers specialised for interference films.
pub trait ThinFilmCss {
    /// Radial bubble: normal incidence at the highlight, grazing at the rim.
    fn to_css_soap_bubble(&self, ctx: &RenderContext) -> Result<String, RenderError>;

    /// Diagonal iridescent bands over a dark base.
    fn to_css_oil_slick(&self, ctx: &RenderContext) -> Result<String, RenderError>;

    /// The hue seen at `angle_deg`, with a narrow gradient of its angular
    /// neighbourhood.
    fn to_css_structural_color(&self, angle_deg: f64, ctx: &RenderContext) -> Result<String, RenderError>;
}

impl ThinFilmCss for ThinFilm {
    fn to_css_soap_bubble(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let stops = CssRenderer::new(*ctx).interference_stops(self, BUBBLE_PEAK_ALPHA)?;
        Ok(format!(
            "background: radial-gradient(circle at 35% 35%, {});\nborder-radius: 50%;",
            join_stops(&stops)
        ))
    }

    fn to_css_oil_slick(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let stops = CssRenderer::new(*ctx).interference_stops(self, SLICK_PEAK_ALPHA)?;
        Ok(format!(
            "background: linear-gradient(135deg, {}), {SLICK_BASE};",
            join_stops(&stops)
        ))
    }

    fn to_css_structural_color(&self, angle_deg: f64, ctx: &RenderContext) -> Result<String, RenderError> {
        let eval = ctx.eval_context();
        let centre = sample(self, &eval, angle_deg)?;
        let colour = |deg: f64| -> Result<Rgba, RenderError> {
            let s = sample(self, &eval, deg)?;
            Ok(Rgba::from_linear(chromatic(s.linear_rgb), 1.0))
        };
        let lo = (angle_deg - STRUCTURAL_SPREAD_DEG).max(0.0);
        let hi = (angle_deg + STRUCTURAL_SPREAD_DEG).min(ctx.max_view_angle_deg.max(angle_deg));
        let main = Rgba::from_linear(chromatic(centre.linear_rgb), 1.0);
        Ok(format!(
            "color: rgb({}, {}, {});\nbackground: linear-gradient(90deg, {} 0%, {} 50%, {} 100%);",
            main.r,
            main.g,
            main.b,
            colour(lo)?,
            main,
            colour(hi)?
        ))
    }
}

/// Evaluate `material` under `eval_ctx` and render it with `render_ctx`.
///
/// `eval_ctx` governs the physics (tier, temperature, time); `render_ctx`
/// only controls the CSS resolution.
pub fn evaluate_and_render_css<B: Bsdf + ?Sized>(
    material: &B,
    eval_ctx: &EvalMaterialContext,
    render_ctx: &RenderContext,
) -> Result<String, RenderError> {
    log::debug!(
        "rendering {} as CSS ({} stops, {:?})",
        material.name(),
        render_ctx.gradient_stops,
        eval_ctx.quality
    );
    CssRenderer::new(*render_ctx).render(material, eval_ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use momoto_core::bsdf::{Conductor, Dielectric};
    use momoto_core::QualityTier;

    #[test]
    fn test_rgba_formatting() {
        assert_eq!(Rgba::from_linear([1.0, 0.0, 0.0], 0.5).to_css(), "rgba(255, 0, 0, 0.500)");
        assert_eq!(Rgba::from_linear([2.0, -1.0, 0.0], 3.0).to_css(), "rgba(255, 0, 0, 1.000)");
    }

    #[test]
    fn test_gold_is_opaque_and_warm() {
        let renderer = CssRenderer::new(RenderContext::desktop());
        let stops = renderer
            .gradient_stops(&Conductor::gold(), &EvalMaterialContext::default())
            .unwrap();
        assert_eq!(stops.len(), 8);
        assert_eq!(stops[0].position_pct, 0.0);
        assert_eq!(stops[7].position_pct, 100.0);
        for stop in &stops {
            assert_eq!(stop.color.a, 1.0);
            assert!(stop.color.r > stop.color.b, "{stop}");
        }
    }

    #[test]
    fn test_glass_gets_backdrop_and_gold_does_not() {
        let renderer = CssRenderer::new(RenderContext::desktop());
        let eval = EvalMaterialContext::default();
        let glass = renderer.render(&Dielectric::clear(), &eval).unwrap();
        assert!(glass.contains("backdrop-filter: blur("));
        let gold = renderer.render(&Conductor::gold(), &eval).unwrap();
        assert!(!gold.contains("backdrop-filter"));
        assert_eq!(gold.lines().count(), 2);
        assert!(gold.lines().all(|l| l.ends_with(';')));
    }

    #[test]
    fn test_glass_is_mostly_transparent_at_normal_incidence() {
        let stops = CssRenderer::new(RenderContext::mobile())
            .gradient_stops(&Dielectric::clear(), &EvalMaterialContext::new(QualityTier::Standard))
            .unwrap();
        assert!(stops[0].color.a < 0.2);
        assert!(stops[4].color.a > stops[0].color.a);
    }

    #[test]
    fn test_morpho_is_blue() {
        let css = ThinFilm::morpho()
            .to_css_structural_color(0.0, &RenderContext::desktop())
            .unwrap();
        assert!(css.starts_with("color: rgb("));
        let eval = RenderContext::desktop().eval_context();
        let rgb = chromatic(sample(&ThinFilm::morpho(), &eval, 0.0).unwrap().linear_rgb);
        assert_eq!(rgb[2], 1.0);
        assert!(rgb[0] < 0.5);
    }

    #[test]
    fn test_structural_colour_rejects_grazing_angle() {
        let err = ThinFilm::morpho()
            .to_css_structural_color(95.0, &RenderContext::desktop())
            .unwrap_err();
        assert!(matches!(err, RenderError::Build(_)));
    }

    #[test]
    fn test_bubble_and_slick() {
        let ctx = RenderContext::four_k();
        let bubble = ThinFilm::soap_bubble().to_css_soap_bubble(&ctx).unwrap();
        assert!(bubble.starts_with("background: radial-gradient(circle at 35% 35%, "));
        assert!(bubble.ends_with("border-radius: 50%;"));
        assert_eq!(bubble.matches("rgba(").count(), 16);
        assert!(bubble.contains("0.850)"));

        let slick = ThinFilm::oil_slick().to_css_oil_slick(&ctx).unwrap();
        assert!(slick.ends_with("rgb(16, 20, 24);"));
    }
}
