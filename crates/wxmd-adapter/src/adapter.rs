//! Generic tree to platform tree adaptation.

use wxmd_mdast::MdNode;

use crate::emoji::EmojiListPolicy;
use crate::node::PlatformNode;

/// Code fence language marking a diagram block.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// Adapt a node with the default adapter.
///
/// See [`WechatAdapter::adapt`].
#[must_use]
pub fn adapt(node: &MdNode) -> Option<PlatformNode> {
    WechatAdapter::new().adapt(node)
}

/// Adapt a document with the default adapter.
///
/// See [`WechatAdapter::adapt_document`].
#[must_use]
pub fn adapt_document(root: &MdNode) -> PlatformNode {
    WechatAdapter::new().adapt_document(root)
}

/// Adapter for the article editor platform.
///
/// A pure depth-first transform: it holds only policy, never state, and the
/// same input always yields the same output.
#[derive(Clone, Debug, Default)]
pub struct WechatAdapter {
    emoji_policy: EmojiListPolicy,
}

impl WechatAdapter {
    /// Create an adapter with the default emoji-list policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the emoji-list promotion policy.
    #[must_use]
    pub fn with_emoji_policy(mut self, policy: EmojiListPolicy) -> Self {
        self.emoji_policy = policy;
        self
    }

    /// Current emoji-list promotion policy.
    #[must_use]
    pub fn emoji_policy(&self) -> &EmojiListPolicy {
        &self.emoji_policy
    }

    /// Adapt a whole document, always returning a [`PlatformNode::Root`].
    ///
    /// A non-root input becomes the single child of a fresh root (or an
    /// empty root when it adapts to nothing).
    #[must_use]
    pub fn adapt_document(&self, root: &MdNode) -> PlatformNode {
        match root {
            MdNode::Root { children } => PlatformNode::Root {
                children: self.adapt_children(children),
            },
            other => PlatformNode::Root {
                children: self.adapt(other).into_iter().collect(),
            },
        }
    }

    /// Adapt a single node.
    ///
    /// Returns `None` for kinds the platform cannot represent (raw HTML and
    /// hard breaks). Parents drop `None` children entirely; nothing is
    /// inserted in their place. Adaptation never fails.
    #[must_use]
    pub fn adapt(&self, node: &MdNode) -> Option<PlatformNode> {
        let adapted = match node {
            MdNode::Root { children } => PlatformNode::Root {
                children: self.adapt_children(children),
            },
            MdNode::Heading { depth, children } => PlatformNode::Heading {
                level: *depth,
                children: self.adapt_children(children),
            },
            MdNode::Paragraph { children } => self.adapt_paragraph(children),
            MdNode::Text { value } => PlatformNode::Text {
                value: value.clone(),
            },
            MdNode::InlineCode { value } => PlatformNode::InlineCode {
                value: value.clone(),
            },
            MdNode::Code { value, lang, .. } => {
                if lang.as_deref() == Some(DIAGRAM_LANGUAGE) {
                    PlatformNode::Diagram {
                        source: value.clone(),
                    }
                } else {
                    PlatformNode::CodeBlock {
                        value: value.clone(),
                        lang: lang.clone().unwrap_or_default(),
                    }
                }
            }
            MdNode::List {
                ordered, children, ..
            } => {
                let children = self.adapt_children(children);
                if *ordered {
                    PlatformNode::OrderedList { children }
                } else {
                    PlatformNode::UnorderedList { children }
                }
            }
            MdNode::ListItem { children } => PlatformNode::ListItem {
                children: self.adapt_children(children),
            },
            MdNode::Image { url, alt, .. } => PlatformNode::Image {
                url: url.clone(),
                alt: alt.clone().unwrap_or_default(),
            },
            MdNode::Emphasis { children } => PlatformNode::Emphasis {
                children: self.adapt_children(children),
            },
            MdNode::Strong { children } => PlatformNode::Strong {
                children: self.adapt_children(children),
            },
            MdNode::Blockquote { children } => PlatformNode::Blockquote {
                children: self.adapt_children(children),
            },
            MdNode::Delete { children } => PlatformNode::Delete {
                children: self.adapt_children(children),
            },
            MdNode::Table { children } => PlatformNode::Table {
                children: self.adapt_rows(children),
            },
            // A row outside a table has no header position.
            MdNode::TableRow { children } => PlatformNode::TableRow {
                is_header: false,
                children: self.adapt_children(children),
            },
            MdNode::TableCell { children } => PlatformNode::TableCell {
                children: self.adapt_children(children),
            },
            MdNode::Link {
                url,
                title,
                children,
            } => PlatformNode::Link {
                url: url.clone(),
                title: title.clone(),
                children: self.adapt_children(children),
            },
            MdNode::ThematicBreak => PlatformNode::ThematicBreak,
            MdNode::Html { .. } | MdNode::Break => return None,
        };
        Some(adapted)
    }

    fn adapt_children(&self, children: &[MdNode]) -> Vec<PlatformNode> {
        children.iter().filter_map(|child| self.adapt(child)).collect()
    }

    /// Adapt table rows, marking the first row as the header.
    fn adapt_rows(&self, rows: &[MdNode]) -> Vec<PlatformNode> {
        rows.iter()
            .enumerate()
            .filter_map(|(index, row)| match row {
                MdNode::TableRow { children } => Some(PlatformNode::TableRow {
                    is_header: index == 0,
                    children: self.adapt_children(children),
                }),
                other => self.adapt(other),
            })
            .collect()
    }

    fn adapt_paragraph(&self, children: &[MdNode]) -> PlatformNode {
        match self.emoji_policy.list_lines(children) {
            Some(lines) => PlatformNode::UnorderedList {
                children: lines
                    .into_iter()
                    .map(|line| PlatformNode::ListItem {
                        children: vec![PlatformNode::Paragraph {
                            children: vec![PlatformNode::Text { value: line }],
                        }],
                    })
                    .collect(),
            },
            None => PlatformNode::Paragraph {
                children: self.adapt_children(children),
            },
        }
    }
}
