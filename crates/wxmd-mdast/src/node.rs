//! Generic document tree.

/// Node of the generic markdown document tree.
///
/// Mirrors the standard mdast node kinds. Container variants own their
/// children exclusively; the tree never shares nodes between parents.
///
/// `Html` and `Break` are standard CommonMark kinds kept so the tree stays
/// faithful to the source. Downstream consumers may drop them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum MdNode {
    Root {
        children: Vec<MdNode>,
    },
    Heading {
        /// Heading depth, 1 to 6.
        depth: u8,
        children: Vec<MdNode>,
    },
    Paragraph {
        children: Vec<MdNode>,
    },
    Text {
        value: String,
    },
    Emphasis {
        children: Vec<MdNode>,
    },
    Strong {
        children: Vec<MdNode>,
    },
    InlineCode {
        value: String,
    },
    Code {
        value: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        lang: Option<String>,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        meta: Option<String>,
    },
    List {
        ordered: bool,
        /// Start number of an ordered list.
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        start: Option<u64>,
        children: Vec<MdNode>,
    },
    ListItem {
        children: Vec<MdNode>,
    },
    Image {
        url: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        alt: Option<String>,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        title: Option<String>,
    },
    Link {
        url: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        title: Option<String>,
        children: Vec<MdNode>,
    },
    Blockquote {
        children: Vec<MdNode>,
    },
    ThematicBreak,
    Delete {
        children: Vec<MdNode>,
    },
    Table {
        children: Vec<MdNode>,
    },
    TableRow {
        children: Vec<MdNode>,
    },
    TableCell {
        children: Vec<MdNode>,
    },
    Html {
        value: String,
    },
    Break,
}

impl MdNode {
    /// mdast kind name of this node (`"heading"`, `"inlineCode"`, ...).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Root { .. } => "root",
            Self::Heading { .. } => "heading",
            Self::Paragraph { .. } => "paragraph",
            Self::Text { .. } => "text",
            Self::Emphasis { .. } => "emphasis",
            Self::Strong { .. } => "strong",
            Self::InlineCode { .. } => "inlineCode",
            Self::Code { .. } => "code",
            Self::List { .. } => "list",
            Self::ListItem { .. } => "listItem",
            Self::Image { .. } => "image",
            Self::Link { .. } => "link",
            Self::Blockquote { .. } => "blockquote",
            Self::ThematicBreak => "thematicBreak",
            Self::Delete { .. } => "delete",
            Self::Table { .. } => "table",
            Self::TableRow { .. } => "tableRow",
            Self::TableCell { .. } => "tableCell",
            Self::Html { .. } => "html",
            Self::Break => "break",
        }
    }

    /// Child nodes; empty for leaf kinds.
    #[must_use]
    pub fn children(&self) -> &[MdNode] {
        match self {
            Self::Root { children }
            | Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::Emphasis { children }
            | Self::Strong { children }
            | Self::List { children, .. }
            | Self::ListItem { children }
            | Self::Link { children, .. }
            | Self::Blockquote { children }
            | Self::Delete { children }
            | Self::Table { children }
            | Self::TableRow { children }
            | Self::TableCell { children } => children,
            Self::Text { .. }
            | Self::InlineCode { .. }
            | Self::Code { .. }
            | Self::Image { .. }
            | Self::ThematicBreak
            | Self::Html { .. }
            | Self::Break => &[],
        }
    }

    /// Whether this node is phrasing (inline) content.
    #[must_use]
    pub fn is_phrasing(&self) -> bool {
        matches!(
            self,
            Self::Text { .. }
                | Self::Emphasis { .. }
                | Self::Strong { .. }
                | Self::InlineCode { .. }
                | Self::Image { .. }
                | Self::Link { .. }
                | Self::Delete { .. }
                | Self::Html { .. }
                | Self::Break
        )
    }

    /// Plain-text content of this node and its descendants.
    ///
    /// Used for image alt text, where formatting is discarded.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { value } | Self::InlineCode { value } | Self::Code { value, .. } => {
                out.push_str(value);
            }
            Self::Image { alt, .. } => out.push_str(alt.as_deref().unwrap_or_default()),
            Self::Break => out.push('\n'),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}
