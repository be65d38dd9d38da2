//! Integration test: CSS output for presets across render contexts.

use momoto_core::bsdf::{Bsdf, Conductor, Dielectric, Material, Subsurface, ThinFilm};
use momoto_core::{EvalMaterialContext, QualityTier};
use momoto_render::{evaluate_and_render_css, CssRenderer, RenderContext, RenderError, ThinFilmCss};

fn presets() -> Vec<Material> {
    vec![
        Dielectric::clear().into(),
        Dielectric::frosted().into(),
        Conductor::gold().into(),
        Conductor::aluminium().into(),
        Subsurface::skin().into(),
        Subsurface::jade().into(),
        ThinFilm::soap_bubble().into(),
        ThinFilm::ar_coating().into(),
    ]
}

#[test]
fn test_every_preset_renders_in_every_context() {
    let _ = env_logger::builder().is_test(true).try_init();
    for render in [RenderContext::mobile(), RenderContext::desktop(), RenderContext::four_k()] {
        for material in presets() {
            let css = evaluate_and_render_css(&material, &render.eval_context(), &render).unwrap();
            let background = css.lines().next().unwrap();
            assert_eq!(
                background.matches("rgba(").count(),
                render.gradient_stops,
                "{}: {background}",
                material.kind()
            );
            assert!(css.contains("box-shadow: "));
        }
    }
}

#[test]
fn test_render_is_deterministic_and_object_safe() {
    let boxed: Box<dyn Bsdf> = Box::new(Conductor::copper());
    let eval = EvalMaterialContext::new(QualityTier::High);
    let render = RenderContext::desktop();
    let a = evaluate_and_render_css(&boxed, &eval, &render).unwrap();
    let b = evaluate_and_render_css(boxed.as_ref(), &eval, &render).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_draining_bubble_changes_colour() {
    let film = ThinFilm::soap_bubble().with_drainage(20.0).unwrap();
    let renderer = CssRenderer::new(RenderContext::desktop());
    let fresh = renderer.render(&film, &EvalMaterialContext::default()).unwrap();
    let drained = renderer
        .render(&film, &EvalMaterialContext::default().with_time(15.0).unwrap())
        .unwrap();
    assert_ne!(fresh, drained);
}

#[test]
fn test_thin_film_renderers() {
    let ctx = RenderContext::mobile();
    let bubble = ThinFilm::soap_bubble().to_css_soap_bubble(&ctx).unwrap();
    assert_eq!(bubble.matches("rgba(").count(), ctx.gradient_stops);
    let slick = ThinFilm::oil_slick().to_css_oil_slick(&ctx).unwrap();
    assert!(slick.starts_with("background: linear-gradient(135deg, "));
    for angle in [0.0, 30.0, 60.0] {
        let css = ThinFilm::nacre().to_css_structural_color(angle, &ctx).unwrap();
        assert_eq!(css.lines().count(), 2);
    }
    assert!(matches!(
        ThinFilm::nacre().to_css_structural_color(-5.0, &ctx),
        Err(RenderError::Build(_))
    ));
}
