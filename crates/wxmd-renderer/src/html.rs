//! Inline-styled HTML rendering of the platform tree.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use rayon::prelude::*;
use wxmd_adapter::{DIAGRAM_LANGUAGE, PlatformNode};
use wxmd_diagrams::{DiagramRenderer, RenderOptions};

use crate::escape::escape_html;
use crate::theme::Theme;

/// Alt text of embedded diagram images.
pub const DIAGRAM_ALT: &str = "Mermaid Diagram";

/// Prefix of the notice shown in place of a failed diagram.
pub const DIAGRAM_FAILURE_PREFIX: &str = "Diagram rendering failed: ";

/// Tree depth down to which sibling subtrees render in parallel.
///
/// Diagrams sit at block level, near the root. Deeper levels render
/// sequentially so nested input does not stack pool frames on every level.
const PARALLEL_DEPTH: usize = 4;

/// Renders a [`PlatformNode`] tree to HTML with inline styles only.
///
/// Output uses a fixed tag set (`div p span em strong s table tr td pre img
/// ul ol li a`), never `class` attributes and never `<script>`. All text and
/// attribute values are escaped.
///
/// Sibling subtrees near the root are rendered in parallel and concatenated
/// in document order, so slow diagram renders in sibling blocks overlap.
#[derive(Clone, Copy, Debug)]
pub struct HtmlRenderer<'a> {
    theme: &'a Theme,
    diagrams: Option<&'a DiagramRenderer>,
}

impl<'a> HtmlRenderer<'a> {
    /// Create a renderer without diagram support.
    ///
    /// Diagram nodes then render as code blocks.
    #[must_use]
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            diagrams: None,
        }
    }

    /// Render diagram nodes through `diagrams`.
    #[must_use]
    pub fn with_diagrams(mut self, diagrams: &'a DiagramRenderer) -> Self {
        self.diagrams = Some(diagrams);
        self
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        self.theme
    }

    /// Render a node and its subtree.
    #[must_use]
    pub fn render(&self, node: &PlatformNode) -> String {
        self.render_node(node, 0)
    }

    fn render_node(&self, node: &PlatformNode, depth: usize) -> String {
        let theme = self.theme;
        match node {
            PlatformNode::Root { children } | PlatformNode::TableCell { children } => {
                self.render_children(children, depth)
            }
            PlatformNode::Heading { level, children } => {
                self.wrap("div", theme.heading(*level), children, depth)
            }
            PlatformNode::Paragraph { children } => self.wrap("p", &theme.paragraph, children, depth),
            PlatformNode::Text { value } => escape_html(value).into_owned(),
            PlatformNode::InlineCode { value } => format!(
                r#"<span style="{}">{}</span>"#,
                escape_html(&theme.inline_code),
                escape_html(value)
            ),
            PlatformNode::CodeBlock { value, .. } => self.render_code_block(value),
            PlatformNode::UnorderedList { children } => self.wrap("ul", &theme.ul, children, depth),
            PlatformNode::OrderedList { children } => self.wrap("ol", &theme.ol, children, depth),
            PlatformNode::ListItem { children } => self.wrap("li", &theme.li, children, depth),
            PlatformNode::Image { url, alt } => format!(
                r#"<img src="{}" alt="{}" style="{}" />"#,
                escape_html(url),
                escape_html(alt),
                escape_html(&theme.image)
            ),
            PlatformNode::Emphasis { children } => {
                format!("<em>{}</em>", self.render_children(children, depth))
            }
            PlatformNode::Strong { children } => {
                format!("<strong>{}</strong>", self.render_children(children, depth))
            }
            PlatformNode::Delete { children } => {
                format!("<s>{}</s>", self.render_children(children, depth))
            }
            PlatformNode::Table { children } => self.wrap("div", &theme.table, children, depth),
            PlatformNode::TableRow {
                is_header,
                children,
            } => self.render_row(*is_header, children, depth),
            PlatformNode::Link {
                url,
                title,
                children,
            } => {
                let title_attr = title
                    .as_deref()
                    .filter(|title| !title.is_empty())
                    .map(|title| format!(r#" title="{}""#, escape_html(title)))
                    .unwrap_or_default();
                format!(
                    r#"<a href="{}" style="{}"{title_attr}>{}</a>"#,
                    escape_html(url),
                    escape_html(&theme.link),
                    self.render_children(children, depth)
                )
            }
            PlatformNode::Blockquote { children } => {
                self.wrap("div", &theme.blockquote, children, depth)
            }
            PlatformNode::ThematicBreak => {
                format!(r#"<div style="{}"></div>"#, escape_html(&theme.thematic_break))
            }
            PlatformNode::Diagram { source } => match self.diagrams {
                Some(diagrams) => self.render_diagram(diagrams, source),
                None => {
                    tracing::debug!(lang = DIAGRAM_LANGUAGE, "No diagram renderer, emitting code block");
                    self.render_code_block(source)
                }
            },
        }
    }

    /// Render `children` of a node at `depth`.
    ///
    /// Only the top levels fan out to the thread pool; below
    /// [`PARALLEL_DEPTH`] children render sequentially on the current stack.
    fn render_children(&self, children: &[PlatformNode], depth: usize) -> String {
        let depth = depth + 1;
        if depth > PARALLEL_DEPTH {
            return children
                .iter()
                .map(|child| self.render_node(child, depth))
                .collect();
        }
        children
            .par_iter()
            .map(|child| self.render_node(child, depth))
            .collect::<Vec<_>>()
            .concat()
    }

    fn wrap(&self, tag: &str, style: &str, children: &[PlatformNode], depth: usize) -> String {
        format!(
            r#"<{tag} style="{}">{}</{tag}>"#,
            escape_html(style),
            self.render_children(children, depth)
        )
    }

    fn render_row(&self, is_header: bool, cells: &[PlatformNode], depth: usize) -> String {
        let cell_style = if is_header {
            &self.theme.table_header_cell
        } else {
            &self.theme.table_cell
        };
        let cell_style = escape_html(cell_style);
        let cells: String = cells
            .iter()
            .map(|cell| {
                format!(
                    r#"<div style="{cell_style}">{}</div>"#,
                    self.render_node(cell, depth + 1)
                )
            })
            .collect();
        format!(
            r#"<div style="{}">{cells}</div>"#,
            escape_html(&self.theme.table_row)
        )
    }

    /// Code blocks use a table layout; the platform keeps table styling but
    /// strips `<pre>` styling inconsistently.
    fn render_code_block(&self, value: &str) -> String {
        format!(
            r#"<table style="{}"><tr><td><pre style="{}">{}</pre></td></tr></table>"#,
            escape_html(&self.theme.code_table),
            escape_html(&self.theme.code_pre),
            escape_html(value)
        )
    }

    fn render_diagram(&self, diagrams: &DiagramRenderer, source: &str) -> String {
        let options = RenderOptions::new(
            self.theme.diagram_theme.as_str(),
            self.theme.diagram_background.as_str(),
        );
        match diagrams.render(source, &options) {
            Ok(svg) => format!(
                r#"<img src="data:image/svg+xml;base64,{}" alt="{DIAGRAM_ALT}" style="{}" />"#,
                BASE64_STANDARD.encode(svg.as_bytes()),
                escape_html(&self.theme.diagram)
            ),
            Err(e) => format!(
                r#"<div style="{}">{DIAGRAM_FAILURE_PREFIX}{}</div>"#,
                escape_html(&self.theme.diagram_error),
                escape_html(&e.to_string())
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use wxmd_diagrams::{DiagramEngine, EngineConfig, EngineError};

    use super::*;

    struct StubEngine {
        renders: AtomicUsize,
    }

    impl DiagramEngine for StubEngine {
        fn initialize(&self, _config: &EngineConfig) -> Result<(), EngineError> {
            Ok(())
        }

        fn render(&self, _id: &str, source: &str) -> Result<String, EngineError> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            if source.starts_with("invalid") {
                Err(EngineError::Syntax("Parse error on line 1 <here>".to_owned()))
            } else {
                Ok(format!("<svg>{source}</svg>"))
            }
        }
    }

    fn stub_renderer() -> DiagramRenderer {
        DiagramRenderer::new(Arc::new(StubEngine {
            renders: AtomicUsize::new(0),
        }))
    }

    fn text(value: &str) -> PlatformNode {
        PlatformNode::Text {
            value: value.to_owned(),
        }
    }

    fn render(node: &PlatformNode) -> String {
        HtmlRenderer::new(&Theme::wechat_default()).render(node)
    }

    #[test]
    fn test_root_has_no_wrapper() {
        let node = PlatformNode::Root {
            children: vec![text("a"), text("b")],
        };
        assert_eq!(render(&node), "ab");
    }

    #[test]
    fn test_heading_uses_level_style() {
        let theme = Theme::wechat_default();
        let node = PlatformNode::Heading {
            level: 2,
            children: vec![text("Title")],
        };
        assert_eq!(
            HtmlRenderer::new(&theme).render(&node),
            format!(r#"<div style="{}">Title</div>"#, theme.headings[1])
        );
    }

    #[test]
    fn test_heading_level_without_style_falls_back() {
        let theme = Theme::wechat_default();
        let node = PlatformNode::Heading {
            level: 5,
            children: vec![text("Deep")],
        };
        assert_eq!(
            HtmlRenderer::new(&theme).render(&node),
            format!(r#"<div style="{}">Deep</div>"#, theme.headings[0])
        );
    }

    #[test]
    fn test_paragraph_and_inline_code() {
        let theme = Theme::wechat_default();
        let node = PlatformNode::Paragraph {
            children: vec![
                text("Use "),
                PlatformNode::InlineCode {
                    value: "a<b".to_owned(),
                },
            ],
        };
        assert_eq!(
            HtmlRenderer::new(&theme).render(&node),
            format!(
                r#"<p style="{}">Use <span style="{}">a&lt;b</span></p>"#,
                theme.paragraph, theme.inline_code
            )
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(
            render(&text(r#"<script>alert("x's")</script> & more"#)),
            "&lt;script&gt;alert(&quot;x&#39;s&quot;)&lt;/script&gt; &amp; more"
        );
    }

    #[test]
    fn test_code_block_table_layout() {
        let theme = Theme::wechat_default();
        let node = PlatformNode::CodeBlock {
            value: "if a < b {}".to_owned(),
            lang: "rust".to_owned(),
        };
        let html = HtmlRenderer::new(&theme).render(&node);
        assert_eq!(
            html,
            format!(
                r#"<table style="{}"><tr><td><pre style="{}">if a &lt; b {{}}</pre></td></tr></table>"#,
                theme.code_table, theme.code_pre
            )
        );
        assert!(!html.contains("rust"));
    }

    #[test]
    fn test_lists() {
        let theme = Theme::wechat_default();
        let node = PlatformNode::OrderedList {
            children: vec![PlatformNode::ListItem {
                children: vec![text("one")],
            }],
        };
        assert_eq!(
            HtmlRenderer::new(&theme).render(&node),
            format!(
                r#"<ol style="{}"><li style="{}">one</li></ol>"#,
                theme.ol, theme.li
            )
        );
    }

    #[test]
    fn test_unstyled_inline_tags() {
        let node = PlatformNode::Paragraph {
            children: vec![
                PlatformNode::Emphasis {
                    children: vec![text("e")],
                },
                PlatformNode::Strong {
                    children: vec![text("s")],
                },
                PlatformNode::Delete {
                    children: vec![text("d")],
                },
            ],
        };
        assert!(render(&node).contains("<em>e</em><strong>s</strong><s>d</s>"));
    }

    #[test]
    fn test_image_escapes_attributes() {
        let theme = Theme::wechat_default();
        let node = PlatformNode::Image {
            url: "https://example.com/a.png?x=1&y=2".to_owned(),
            alt: r#"say "hi""#.to_owned(),
        };
        assert_eq!(
            HtmlRenderer::new(&theme).render(&node),
            format!(
                r#"<img src="https://example.com/a.png?x=1&amp;y=2" alt="say &quot;hi&quot;" style="{}" />"#,
                theme.image
            )
        );
    }

    #[test]
    fn test_table_cells_use_row_style() {
        let theme = Theme::wechat_default();
        let cell = |value: &str| PlatformNode::TableCell {
            children: vec![text(value)],
        };
        let node = PlatformNode::Table {
            children: vec![
                PlatformNode::TableRow {
                    is_header: true,
                    children: vec![cell("H")],
                },
                PlatformNode::TableRow {
                    is_header: false,
                    children: vec![cell("D")],
                },
            ],
        };
        assert_eq!(
            HtmlRenderer::new(&theme).render(&node),
            format!(
                concat!(
                    r#"<div style="{table}">"#,
                    r#"<div style="{row}"><div style="{header}">H</div></div>"#,
                    r#"<div style="{row}"><div style="{cell}">D</div></div>"#,
                    "</div>"
                ),
                table = theme.table,
                row = theme.table_row,
                header = theme.table_header_cell,
                cell = theme.table_cell,
            )
        );
    }

    #[test]
    fn test_link_with_and_without_title() {
        let theme = Theme::wechat_default();
        let link = |title: Option<&str>| PlatformNode::Link {
            url: "https://example.com".to_owned(),
            title: title.map(str::to_owned),
            children: vec![text("go")],
        };
        assert_eq!(
            HtmlRenderer::new(&theme).render(&link(Some("Ex"))),
            format!(
                r#"<a href="https://example.com" style="{}" title="Ex">go</a>"#,
                theme.link
            )
        );
        assert_eq!(
            HtmlRenderer::new(&theme).render(&link(None)),
            format!(r#"<a href="https://example.com" style="{}">go</a>"#, theme.link)
        );
    }

    #[test]
    fn test_blockquote_and_break() {
        let theme = Theme::wechat_clean();
        let node = PlatformNode::Root {
            children: vec![
                PlatformNode::Blockquote {
                    children: vec![text("q")],
                },
                PlatformNode::ThematicBreak,
            ],
        };
        assert_eq!(
            HtmlRenderer::new(&theme).render(&node),
            format!(
                r#"<div style="{}">q</div><div style="{}"></div>"#,
                theme.blockquote, theme.thematic_break
            )
        );
    }

    #[test]
    fn test_diagram_becomes_data_uri() {
        let theme = Theme::wechat_default();
        let diagrams = stub_renderer();
        let node = PlatformNode::Diagram {
            source: "graph TD".to_owned(),
        };
        let html = HtmlRenderer::new(&theme)
            .with_diagrams(&diagrams)
            .render(&node);

        let expected_payload = BASE64_STANDARD.encode("<svg>graph TD</svg>");
        assert_eq!(
            html,
            format!(
                r#"<img src="data:image/svg+xml;base64,{expected_payload}" alt="Mermaid Diagram" style="{}" />"#,
                theme.diagram
            )
        );
    }

    #[test]
    fn test_diagram_failure_notice_is_escaped() {
        let theme = Theme::wechat_default();
        let diagrams = stub_renderer();
        let node = PlatformNode::Diagram {
            source: "invalid".to_owned(),
        };
        let html = HtmlRenderer::new(&theme)
            .with_diagrams(&diagrams)
            .render(&node);

        assert_eq!(
            html,
            format!(
                r#"<div style="{}">Diagram rendering failed: syntax error: Parse error on line 1 &lt;here&gt;</div>"#,
                theme.diagram_error
            )
        );
    }

    #[test]
    fn test_diagram_without_renderer_is_code_block() {
        let html = render(&PlatformNode::Diagram {
            source: "graph TD".to_owned(),
        });
        assert!(html.starts_with("<table"));
        assert!(html.contains("graph TD"));
    }

    #[test]
    fn test_sibling_order_preserved() {
        let theme = Theme::wechat_default();
        let diagrams = stub_renderer();
        let children = (0..32)
            .map(|i| PlatformNode::Paragraph {
                children: vec![text(&format!("p{i}"))],
            })
            .collect();
        let html = HtmlRenderer::new(&theme)
            .with_diagrams(&diagrams)
            .render(&PlatformNode::Root { children });

        let positions: Vec<usize> = (0..32)
            .map(|i| html.find(&format!(">p{i}<")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_style_quotes_are_escaped() {
        let mut theme = Theme::wechat_default();
        theme.paragraph = r#"font-family:"PingFang SC";"#.to_owned();
        let html = HtmlRenderer::new(&theme).render(&PlatformNode::Paragraph {
            children: vec![text("x")],
        });
        assert_eq!(html, r#"<p style="font-family:&quot;PingFang SC&quot;;">x</p>"#);
    }

    #[test]
    fn test_parsed_document_end_to_end() {
        let theme = Theme::wechat_default();
        let tree = wxmd_mdast::parse("# Title\n\nBody `code` here.");
        let adapted = wxmd_adapter::adapt_document(&tree);
        assert_eq!(
            HtmlRenderer::new(&theme).render(&adapted),
            format!(
                r#"<div style="{}">Title</div><p style="{}">Body <span style="{}">code</span> here.</p>"#,
                theme.headings[0], theme.paragraph, theme.inline_code
            )
        );
    }

    #[test]
    fn test_deeply_nested_diagram_still_renders() {
        let theme = Theme::wechat_default();
        let diagrams = stub_renderer();
        let mut node = PlatformNode::Diagram {
            source: "graph TD".to_owned(),
        };
        for _ in 0..(PARALLEL_DEPTH * 3) {
            node = PlatformNode::Blockquote {
                children: vec![node],
            };
        }
        let html = HtmlRenderer::new(&theme)
            .with_diagrams(&diagrams)
            .render(&PlatformNode::Root {
                children: vec![node],
            });

        assert_eq!(html.matches("data:image/svg+xml;base64,").count(), 1);
        assert_eq!(html.matches("<div ").count(), PARALLEL_DEPTH * 3);
    }
}
