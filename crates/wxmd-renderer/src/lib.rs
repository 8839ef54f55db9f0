//! Theme-styled HTML rendering for the article editor.
//!
//! The editor strips stylesheets and `class` attributes, so every construct is
//! rendered with its style inlined from a [`Theme`]. Diagram nodes are handed
//! to a [`DiagramRenderer`](wxmd_diagrams::DiagramRenderer) and embedded as
//! base64 SVG data URIs, keeping the output free of external references.
//!
//! # Example
//!
//! ```
//! use wxmd_renderer::{HtmlRenderer, Theme};
//!
//! let tree = wxmd_adapter::adapt_document(&wxmd_mdast::parse("Hello *world*"));
//! let html = HtmlRenderer::new(Theme::by_name("clean")).render(&tree);
//! assert!(html.contains("<em>world</em>"));
//! ```

mod escape;
mod html;
mod theme;

pub use escape::escape_html;
pub use html::{DIAGRAM_ALT, DIAGRAM_FAILURE_PREFIX, HtmlRenderer};
pub use theme::{Theme, ThemeError};
