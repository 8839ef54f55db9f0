//! End-to-end conversion tests.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use wxmd_converter::Converter;
use wxmd_diagrams::{DiagramEngine, DiagramRenderer, EngineConfig, EngineError};
use wxmd_renderer::Theme;

const DATA_URI: &str = "data:image/svg+xml;base64,";
const FAILURE_NOTICE: &str = "Diagram rendering failed: ";

/// Engine that rejects sources containing "invalid" and counts calls.
#[derive(Default)]
struct MockEngine {
    init_calls: AtomicUsize,
    render_calls: AtomicUsize,
}

impl DiagramEngine for MockEngine {
    fn initialize(&self, _config: &EngineConfig) -> Result<(), EngineError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn render(&self, _id: &str, source: &str) -> Result<String, EngineError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        if source.contains("invalid") {
            return Err(EngineError::Syntax(
                "No diagram type detected matching given configuration".to_owned(),
            ));
        }
        Ok(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text>{}</text></svg>"#,
            source.len()
        ))
    }
}

fn converter_with_mock(theme: Theme) -> (Arc<MockEngine>, Converter) {
    let engine = Arc::new(MockEngine::default());
    let diagrams = DiagramRenderer::new(Arc::clone(&engine) as Arc<dyn DiagramEngine>);
    let converter = Converter::new(theme).with_diagrams(Arc::new(diagrams));
    (engine, converter)
}

/// Names of all opening tags in `html`.
fn tag_names(html: &str) -> BTreeSet<String> {
    html.split('<')
        .skip(1)
        .filter(|chunk| !chunk.starts_with('/'))
        .map(|chunk| {
            chunk
                .chars()
                .take_while(char::is_ascii_alphanumeric)
                .collect::<String>()
        })
        .collect()
}

#[test]
fn test_heading_and_paragraph() {
    let theme = Theme::wechat_default();
    let html = Converter::new(theme.clone()).convert("# Title\n\nBody `code` here.");

    assert_eq!(
        html,
        format!(
            r#"<div style="{}">Title</div><p style="{}">Body <span style="{}">code</span> here.</p>"#,
            theme.headings[0], theme.paragraph, theme.inline_code
        )
    );
}

#[test]
fn test_two_good_diagrams_and_one_malformed() {
    let markdown = "\
# Diagram 1

```mermaid
graph LR
  A --> B
```

# Broken

```mermaid
invalid mermaid syntax here
```

# Diagram 2

```mermaid
sequenceDiagram
  Alice->>Bob: Hello
```
";
    let (_, converter) = converter_with_mock(Theme::wechat_default());
    let html = converter.convert(markdown);

    assert_eq!(html.matches(DATA_URI).count(), 2);
    assert_eq!(html.matches(FAILURE_NOTICE).count(), 1);
    assert_eq!(html.matches(r#"alt="Mermaid Diagram""#).count(), 2);

    // Document order: image, notice, image
    let first_image = html.find(DATA_URI).unwrap();
    let notice = html.find(FAILURE_NOTICE).unwrap();
    let last_image = html.rfind(DATA_URI).unwrap();
    assert!(first_image < notice && notice < last_image);

    let broken_heading = html.find(">Broken<").unwrap();
    assert!(first_image < broken_heading && broken_heading < notice);
}

#[test]
fn test_failure_notice_uses_theme_style() {
    let theme = Theme::wechat_clean();
    let (_, converter) = converter_with_mock(theme.clone());
    let html = converter.convert("```mermaid\ninvalid\n```");

    assert_eq!(
        html,
        format!(
            r#"<div style="{}">Diagram rendering failed: syntax error: No diagram type detected matching given configuration</div>"#,
            theme.diagram_error
        )
    );
}

#[test]
fn test_repeated_conversion_hits_cache() {
    let markdown = "```mermaid\ngraph TD\n  A --> B\n```\n\n```mermaid\ngraph TD\n  A --> B\n```\n";
    let (engine, converter) = converter_with_mock(Theme::wechat_default());

    let first = converter.convert(markdown);
    // Identical siblings may race to the first render.
    let calls_after_first = engine.render_calls.load(Ordering::SeqCst);
    assert!((1..=2).contains(&calls_after_first));

    let second = converter.convert(markdown);
    assert_eq!(first, second);
    assert_eq!(first.matches(DATA_URI).count(), 2);
    assert_eq!(engine.render_calls.load(Ordering::SeqCst), calls_after_first);
    assert_eq!(engine.init_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_diagrams_are_retried() {
    let (engine, converter) = converter_with_mock(Theme::wechat_default());

    converter.convert("```mermaid\ninvalid\n```");
    converter.convert("```mermaid\ninvalid\n```");

    assert_eq!(engine.render_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_shared_renderer_across_themes() {
    let engine = Arc::new(MockEngine::default());
    let diagrams = Arc::new(DiagramRenderer::new(
        Arc::clone(&engine) as Arc<dyn DiagramEngine>
    ));
    let default = Converter::new(Theme::wechat_default()).with_diagrams(Arc::clone(&diagrams));
    let clean = Converter::new(Theme::wechat_clean()).with_diagrams(Arc::clone(&diagrams));

    let markdown = "```mermaid\ngraph TD\n```";
    default.convert(markdown);
    clean.convert(markdown);
    default.convert(markdown);

    // Different diagram themes produce separate cache entries.
    assert_eq!(diagrams.cache_len(), 2);
    assert_eq!(engine.render_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_script_is_never_emitted() {
    let markdown = "\
<script>alert(1)</script>

Inline <script>alert(2)</script> html.

```html
<script>alert(3)</script>
```
";
    let html = Converter::default().convert(markdown);

    assert!(!html.contains("<script"), "{html}");
    assert!(html.contains("&lt;script&gt;alert(3)&lt;/script&gt;"));
}

#[test]
fn test_output_uses_allowed_tags_only() {
    let markdown = "\
# Heading

Paragraph with *em*, **strong**, ~~gone~~, `code` and [a link](https://example.com \"Ex\").

- one
- two

1. first
2. second

> quoted

---

![alt](https://example.com/a.png)

| Name | Value |
| ---- | ----- |
| a    | 1     |

```rust
fn main() {}
```

```mermaid
graph TD
```
";
    let allowed: BTreeSet<String> = [
        "div", "p", "span", "em", "strong", "s", "table", "tr", "td", "pre", "img", "ul", "ol",
        "li", "a",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect();

    let (_, converter) = converter_with_mock(Theme::wechat_default());
    let html = converter.convert(markdown);

    let used = tag_names(&html);
    assert!(used.is_subset(&allowed), "unexpected tags: {used:?}");
    assert!(!html.contains("class="));
}

#[test]
fn test_table_header_row() {
    let theme = Theme::wechat_default();
    let markdown = "| H1 | H2 |\n| -- | -- |\n| a | b |\n| c | d |\n";
    let html = Converter::new(theme.clone()).convert(markdown);

    let header_cell = format!(r#"<div style="{}">"#, theme.table_header_cell);
    let data_cell = format!(r#"<div style="{}">"#, theme.table_cell);
    assert_eq!(html.matches(&header_cell).count(), 2);
    assert_eq!(html.matches(&data_cell).count(), 4);
    assert!(html.contains(&format!("{header_cell}H1</div>")));
}

#[test]
fn test_emoji_paragraph_becomes_list() {
    let theme = Theme::wechat_default();
    let html = Converter::new(theme.clone()).convert("🎉 Launch\n🚀 Ship\n✨ Polish");

    assert_eq!(
        html,
        format!(
            concat!(
                r#"<ul style="{ul}">"#,
                r#"<li style="{li}"><p style="{p}">🎉 Launch</p></li>"#,
                r#"<li style="{li}"><p style="{p}">🚀 Ship</p></li>"#,
                r#"<li style="{li}"><p style="{p}">✨ Polish</p></li>"#,
                "</ul>"
            ),
            ul = theme.ul,
            li = theme.li,
            p = theme.paragraph,
        )
    );
}

#[test]
fn test_diagrams_without_renderer_render_as_code() {
    let theme = Theme::wechat_default();
    let html = Converter::new(theme.clone()).convert("```mermaid\ngraph TD\n```");

    assert_eq!(
        html,
        format!(
            r#"<table style="{}"><tr><td><pre style="{}">graph TD</pre></td></tr></table>"#,
            theme.code_table, theme.code_pre
        )
    );
}

#[test]
fn test_from_config_with_theme_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("wxmd.toml"),
        "[theme]\nfile = \"custom.toml\"\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("custom.toml"),
        "name = \"custom\"\nparagraph = \"color:red;\"\n",
    )
    .unwrap();

    let config = wxmd_config::Config::load(Some(&dir.path().join("wxmd.toml")), None).unwrap();
    let converter = Converter::from_config(&config).unwrap();

    assert_eq!(converter.theme().name, "custom");
    assert_eq!(converter.convert("hi"), r#"<p style="color:red;">hi</p>"#);
}

#[test]
fn test_deeply_nested_blockquotes() {
    let theme = Theme::wechat_default();
    let markdown = format!("{}deep\n", "> ".repeat(5000));
    let html = Converter::new(theme.clone()).convert(&markdown);

    let quote = format!(r#"<div style="{}">"#, theme.blockquote);
    assert_eq!(
        html.matches(&quote).count(),
        wxmd_mdast::MAX_NESTING_DEPTH
    );
    assert!(html.contains(">deep</p>"));
}

#[test]
fn test_deeply_nested_lists_with_diagram_renderer() {
    let markdown: String = (0..2000)
        .map(|level| format!("{}- item {level}\n", "  ".repeat(level)))
        .collect();
    let (_, converter) = converter_with_mock(Theme::wechat_default());
    let html = converter.convert(&markdown);

    assert!(html.contains("item 0"));
    assert!(html.contains("item 1999"));
}
