//! Markdown to article-editor HTML conversion.
//!
//! [`Converter`] wires the three pipeline stages together:
//!
//! 1. [`wxmd_mdast`] parses markdown into a generic document tree
//! 2. [`wxmd_adapter`] rewrites it into the platform tree
//! 3. [`wxmd_renderer`] renders the platform tree to inline-styled HTML,
//!    rendering diagram blocks through an optional
//!    [`DiagramRenderer`](wxmd_diagrams::DiagramRenderer)
//!
//! Each stage is also exposed on its own so callers can inspect intermediate
//! trees.
//!
//! # Example
//!
//! ```
//! use wxmd_converter::Converter;
//! use wxmd_renderer::Theme;
//!
//! let converter = Converter::new(Theme::wechat_clean());
//! let html = converter.convert("# Hello\n\nWorld");
//! assert!(html.starts_with("<div style="));
//! ```

use std::sync::Arc;

use wxmd_adapter::{EmojiListPolicy, PlatformNode, WechatAdapter};
use wxmd_config::Config;
use wxmd_diagrams::{DiagramRenderer, EngineError, KrokiEngine, SecurityLevel};
use wxmd_mdast::{MdNode, Parser};
use wxmd_renderer::{HtmlRenderer, Theme, ThemeError};

/// Error building a [`Converter`] from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error("invalid diagram engine setting: {0}")]
    Engine(#[from] EngineError),
}

/// Markdown to HTML converter for one theme.
///
/// Conversion itself never fails: unsupported constructs are dropped and
/// diagram failures are rendered as in-document notices.
#[derive(Debug)]
pub struct Converter {
    parser: Parser,
    adapter: WechatAdapter,
    theme: Theme,
    diagrams: Option<Arc<DiagramRenderer>>,
}

impl Converter {
    /// Create a converter without diagram rendering.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            parser: Parser::new(),
            adapter: WechatAdapter::new(),
            theme,
            diagrams: None,
        }
    }

    /// Replace the platform adapter.
    #[must_use]
    pub fn with_adapter(mut self, adapter: WechatAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    /// Render diagram blocks through a shared diagram renderer.
    ///
    /// The renderer's cache is shared with every converter holding it.
    #[must_use]
    pub fn with_diagrams(mut self, diagrams: Arc<DiagramRenderer>) -> Self {
        self.diagrams = Some(diagrams);
        self
    }

    /// Build a converter from loaded configuration.
    ///
    /// A custom theme file takes precedence over the theme name. Diagram
    /// rendering is enabled only when a Kroki URL is configured.
    pub fn from_config(config: &Config) -> Result<Self, ConvertError> {
        let theme = match &config.theme_resolved.file {
            Some(path) => Theme::from_file(path)?,
            None => Theme::by_name(&config.theme_resolved.name).clone(),
        };

        let emoji = &config.adapter.emoji_list;
        let adapter = WechatAdapter::new().with_emoji_policy(EmojiListPolicy {
            enabled: emoji.enabled,
            min_lines: emoji.min_lines,
            ranges: emoji.char_ranges(),
        });

        let mut converter = Self::new(theme).with_adapter(adapter);

        let diagrams = &config.diagrams_resolved;
        if let Some(kroki_url) = &diagrams.kroki_url {
            let security_level: SecurityLevel = diagrams.security_level.parse()?;
            let engine = KrokiEngine::new(kroki_url.as_str()).with_timeout(diagrams.timeout);
            let renderer = DiagramRenderer::new(Arc::new(engine)).with_security_level(security_level);
            converter = converter.with_diagrams(Arc::new(renderer));
        }

        Ok(converter)
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    #[must_use]
    pub fn diagrams(&self) -> Option<&Arc<DiagramRenderer>> {
        self.diagrams.as_ref()
    }

    /// Convert a markdown document to HTML.
    #[must_use]
    pub fn convert(&self, markdown: &str) -> String {
        let tree = self.parse(markdown);
        let platform = self.adapt(&tree);
        let html = self.render(&platform);
        let diagrams = platform.diagram_count();
        if diagrams > 0 && self.diagrams.is_none() {
            tracing::warn!(diagrams, "No diagram renderer attached, diagrams emitted as code blocks");
        }
        tracing::info!(
            theme = %self.theme.name,
            diagrams,
            input_bytes = markdown.len(),
            output_bytes = html.len(),
            "Converted document"
        );
        html
    }

    /// Parse stage: markdown to generic tree.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> MdNode {
        self.parser.parse(markdown)
    }

    /// Adapt stage: generic tree to platform tree.
    #[must_use]
    pub fn adapt(&self, tree: &MdNode) -> PlatformNode {
        self.adapter.adapt_document(tree)
    }

    /// Render stage: platform tree to HTML.
    #[must_use]
    pub fn render(&self, tree: &PlatformNode) -> String {
        let renderer = HtmlRenderer::new(&self.theme);
        match &self.diagrams {
            Some(diagrams) => renderer.with_diagrams(diagrams).render(tree),
            None => renderer.render(tree),
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}
