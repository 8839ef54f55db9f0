//! Markdown parser producing the generic document tree.
//!
//! Tokenization is delegated to `pulldown-cmark`. This module only folds the
//! event stream into [`MdNode`]s, keeping engine-specific constructs out of
//! the tree.

use pulldown_cmark::{CodeBlockKind, Event, Options, Tag};

use crate::node::MdNode;
use crate::util::heading_level_to_num;

/// Deepest container nesting kept in the tree.
///
/// Blockquotes, lists, list items, emphasis, strong, strikethrough and links
/// opened below this depth are flattened: their content is spliced into the
/// enclosing container. Later stages walk the tree recursively, so this keeps
/// pathological input from exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Parse markdown into a generic document tree with GFM enabled.
///
/// Always returns [`MdNode::Root`].
#[must_use]
pub fn parse(markdown: &str) -> MdNode {
    Parser::new().parse(markdown)
}

/// Configurable markdown parser.
#[derive(Clone, Debug)]
pub struct Parser {
    gfm: bool,
}

impl Parser {
    /// Create a parser with GitHub Flavored Markdown enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
        } else {
            Options::empty()
        }
    }

    /// Parse markdown text into a [`MdNode::Root`].
    #[must_use]
    pub fn parse(&self, markdown: &str) -> MdNode {
        let mut builder = TreeBuilder::new();
        for event in pulldown_cmark::Parser::new_ext(markdown, self.parser_options()) {
            builder.event(event);
        }
        builder.finish()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Container currently being built.
enum Open {
    Root,
    Heading(u8),
    Paragraph,
    Blockquote,
    Code {
        lang: Option<String>,
        meta: Option<String>,
        body: String,
    },
    HtmlBlock(String),
    List {
        ordered: bool,
        start: Option<u64>,
    },
    Item,
    Table,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Delete,
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        title: Option<String>,
    },
    /// Construct outside the generic node set; its children are spliced into the parent.
    Transparent,
}

impl Open {
    /// Whether the container can directly contain another of its kind.
    fn is_nestable(&self) -> bool {
        matches!(
            self,
            Self::Blockquote
                | Self::List { .. }
                | Self::Item
                | Self::Emphasis
                | Self::Strong
                | Self::Delete
                | Self::Link { .. }
        )
    }
}

struct Frame {
    open: Open,
    children: Vec<MdNode>,
}

/// Folds `pulldown-cmark` events into a tree using a stack of open containers.
struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                open: Open::Root,
                children: Vec::new(),
            }],
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push(MdNode::InlineCode {
                value: code.into_string(),
            }),
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.push(MdNode::Break),
            Event::Rule => self.push(MdNode::ThematicBreak),
            Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_)
            | Event::TaskListMarker(_) => {
                // Not part of the generic node set
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph => Open::Paragraph,
            Tag::Heading { level, .. } => Open::Heading(heading_level_to_num(level)),
            Tag::BlockQuote(_) => Open::Blockquote,
            Tag::CodeBlock(kind) => {
                let (lang, meta) = match kind {
                    CodeBlockKind::Fenced(info) => split_fence_info(&info),
                    CodeBlockKind::Indented => (None, None),
                };
                Open::Code {
                    lang,
                    meta,
                    body: String::new(),
                }
            }
            Tag::HtmlBlock => Open::HtmlBlock(String::new()),
            Tag::List(start) => Open::List {
                ordered: start.is_some(),
                start,
            },
            Tag::Item => Open::Item,
            Tag::Table(_) => Open::Table,
            Tag::TableHead | Tag::TableRow => Open::TableRow,
            Tag::TableCell => Open::TableCell,
            Tag::Emphasis => Open::Emphasis,
            Tag::Strong => Open::Strong,
            Tag::Strikethrough => Open::Delete,
            Tag::Link {
                dest_url, title, ..
            } => Open::Link {
                url: dest_url.into_string(),
                title: non_empty(&title),
            },
            Tag::Image {
                dest_url, title, ..
            } => Open::Image {
                url: dest_url.into_string(),
                title: non_empty(&title),
            },
            Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => Open::Transparent,
        };
        let open = if self.stack.len() > MAX_NESTING_DEPTH && open.is_nestable() {
            Open::Transparent
        } else {
            open
        };
        self.stack.push(Frame {
            open,
            children: Vec::new(),
        });
    }

    fn end(&mut self) {
        // The root frame is never closed by an event.
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let children = frame.children;
        let node = match frame.open {
            Open::Root => MdNode::Root { children },
            Open::Heading(depth) => MdNode::Heading { depth, children },
            Open::Paragraph => MdNode::Paragraph { children },
            Open::Blockquote => MdNode::Blockquote { children },
            Open::Code {
                lang,
                meta,
                mut body,
            } => {
                if body.ends_with('\n') {
                    body.pop();
                }
                MdNode::Code {
                    value: body,
                    lang,
                    meta,
                }
            }
            Open::HtmlBlock(value) => MdNode::Html { value },
            Open::List { ordered, start } => MdNode::List {
                ordered,
                start,
                children,
            },
            Open::Item => MdNode::ListItem {
                children: wrap_phrasing(children),
            },
            Open::Table => MdNode::Table { children },
            Open::TableRow => MdNode::TableRow { children },
            Open::TableCell => MdNode::TableCell { children },
            Open::Emphasis => MdNode::Emphasis { children },
            Open::Strong => MdNode::Strong { children },
            Open::Delete => MdNode::Delete { children },
            Open::Link { url, title } => MdNode::Link {
                url,
                title,
                children,
            },
            Open::Image { url, title } => {
                let alt: String = children.iter().map(MdNode::plain_text).collect();
                MdNode::Image {
                    url,
                    alt: if alt.is_empty() { None } else { Some(alt) },
                    title,
                }
            }
            Open::Transparent => {
                for child in children {
                    self.push(child);
                }
                return;
            }
        };
        self.push(node);
    }

    fn text(&mut self, text: &str) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        if let Open::Code { body, .. } = &mut frame.open {
            body.push_str(text);
            return;
        }
        if let Some(MdNode::Text { value }) = frame.children.last_mut() {
            value.push_str(text);
        } else {
            frame.children.push(MdNode::Text {
                value: text.to_owned(),
            });
        }
    }

    fn html(&mut self, html: &str) {
        if let Some(Frame {
            open: Open::HtmlBlock(buf),
            ..
        }) = self.stack.last_mut()
        {
            buf.push_str(html);
        } else {
            self.push(MdNode::Html {
                value: html.to_owned(),
            });
        }
    }

    fn push(&mut self, node: MdNode) {
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(node);
        }
    }

    fn finish(mut self) -> MdNode {
        // Close anything left open by a truncated event stream.
        while self.stack.len() > 1 {
            self.end();
        }
        let children = self
            .stack
            .pop()
            .map(|frame| frame.children)
            .unwrap_or_default();
        MdNode::Root { children }
    }
}

/// Split a fence info string into language and meta.
///
/// `rust ignore title="x"` yields `(Some("rust"), Some("ignore title=\"x\""))`.
fn split_fence_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => (Some(lang.to_owned()), non_empty(meta.trim())),
        None => (non_empty(info), None),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Wrap runs of phrasing content in paragraphs.
///
/// Tight list items carry their text directly; the generic tree always
/// places it in a paragraph.
fn wrap_phrasing(children: Vec<MdNode>) -> Vec<MdNode> {
    let mut out = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children {
        if child.is_phrasing() {
            run.push(child);
        } else {
            if !run.is_empty() {
                out.push(MdNode::Paragraph {
                    children: std::mem::take(&mut run),
                });
            }
            out.push(child);
        }
    }
    if !run.is_empty() {
        out.push(MdNode::Paragraph { children: run });
    }
    out
}
