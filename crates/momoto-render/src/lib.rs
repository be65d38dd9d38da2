//! # Momoto Render
//!
//! Turns evaluated material state into output for UI consumers.
//!
//! - [`context`]: named render presets (`desktop`, `mobile`, `four_k`)
//!   fixing the quality tier, gradient resolution and blur radius.
//! - [`css`]: the CSS backend, including the thin-film renderers of
//!   [`ThinFilmCss`].
//!
//! ```
//! use momoto_core::bsdf::Conductor;
//! use momoto_render::{evaluate_and_render_css, RenderContext};
//!
//! let render = RenderContext::desktop();
//! let css = evaluate_and_render_css(&Conductor::gold(), &render.eval_context(), &render).unwrap();
//! assert!(css.starts_with("background: linear-gradient("));
//! ```

pub mod context;
pub mod css;

use thiserror::Error;

use momoto_core::error::{BuildError, OpticsError};

pub use context::RenderContext;
pub use css::{evaluate_and_render_css, CssRenderer, CssStop, Rgba, ThinFilmCss};

/// Errors raised while rendering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Invalid render context: {0}")]
    InvalidContext(String),

    #[error("Evaluation failed: {0}")]
    Optics(#[from] OpticsError),

    #[error("Construction failed: {0}")]
    Build(#[from] BuildError),
}
