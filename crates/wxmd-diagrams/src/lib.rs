//! Diagram rendering for converted articles.
//!
//! Diagram blocks are rendered to SVG by an external [`DiagramEngine`]. The
//! [`DiagramRenderer`] wraps an engine with:
//!
//! - A render cache keyed by source, theme and background color
//! - One-time initialization per theme, serialized across threads
//! - A fresh render identifier per engine call
//! - Optional background color injection into the returned SVG
//!
//! [`KrokiEngine`] is the bundled engine; it renders Mermaid through a Kroki
//! server.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wxmd_diagrams::{DiagramRenderer, KrokiEngine, RenderOptions};
//!
//! let engine = Arc::new(KrokiEngine::new("https://kroki.io"));
//! let renderer = DiagramRenderer::new(engine);
//! let svg = renderer.render("graph TD; A-->B", &RenderOptions::default());
//! ```

mod cache;
mod consts;
mod engine;
mod kroki;
mod renderer;

pub use cache::{DiagramKey, RenderCache};
pub use consts::{DEFAULT_THEME, DEFAULT_TIMEOUT, MERMAID_THEMES, TRANSPARENT};
pub use engine::{DiagramEngine, EngineConfig, EngineError, SecurityLevel};
pub use kroki::KrokiEngine;
pub use renderer::{DiagramError, DiagramRenderer, RenderOptions, generate_render_id, inject_background};
