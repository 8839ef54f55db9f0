//! Platform node tree.

/// Node of the platform tree consumed by the HTML renderer.
///
/// Each variant corresponds to one construct the article editor can display.
/// Headings become styled `div`s, code blocks carry their language for later
/// use, and diagram blocks carry their raw source.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum PlatformNode {
    Root {
        children: Vec<PlatformNode>,
    },
    /// Heading rendered as a styled `div`.
    #[cfg_attr(feature = "serde", serde(rename = "div"))]
    Heading {
        level: u8,
        children: Vec<PlatformNode>,
    },
    #[cfg_attr(feature = "serde", serde(rename = "p"))]
    Paragraph {
        children: Vec<PlatformNode>,
    },
    Text {
        value: String,
    },
    InlineCode {
        value: String,
    },
    #[cfg_attr(feature = "serde", serde(rename = "codeblock"))]
    CodeBlock {
        value: String,
        /// Fence language, empty when absent.
        lang: String,
    },
    #[cfg_attr(feature = "serde", serde(rename = "ul"))]
    UnorderedList {
        children: Vec<PlatformNode>,
    },
    #[cfg_attr(feature = "serde", serde(rename = "ol"))]
    OrderedList {
        children: Vec<PlatformNode>,
    },
    #[cfg_attr(feature = "serde", serde(rename = "li"))]
    ListItem {
        children: Vec<PlatformNode>,
    },
    Image {
        url: String,
        alt: String,
    },
    Emphasis {
        children: Vec<PlatformNode>,
    },
    Strong {
        children: Vec<PlatformNode>,
    },
    Table {
        children: Vec<PlatformNode>,
    },
    TableRow {
        /// True only for the first row of its table.
        #[cfg_attr(feature = "serde", serde(rename = "isHeader"))]
        is_header: bool,
        children: Vec<PlatformNode>,
    },
    TableCell {
        children: Vec<PlatformNode>,
    },
    Link {
        url: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        title: Option<String>,
        children: Vec<PlatformNode>,
    },
    Blockquote {
        children: Vec<PlatformNode>,
    },
    ThematicBreak,
    Delete {
        children: Vec<PlatformNode>,
    },
    /// Diagram block awaiting rendering.
    Diagram {
        source: String,
    },
}

impl PlatformNode {
    /// Platform kind name of this node (`"div"`, `"p"`, `"codeblock"`, ...).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Root { .. } => "root",
            Self::Heading { .. } => "div",
            Self::Paragraph { .. } => "p",
            Self::Text { .. } => "text",
            Self::InlineCode { .. } => "inlineCode",
            Self::CodeBlock { .. } => "codeblock",
            Self::UnorderedList { .. } => "ul",
            Self::OrderedList { .. } => "ol",
            Self::ListItem { .. } => "li",
            Self::Image { .. } => "image",
            Self::Emphasis { .. } => "emphasis",
            Self::Strong { .. } => "strong",
            Self::Table { .. } => "table",
            Self::TableRow { .. } => "tableRow",
            Self::TableCell { .. } => "tableCell",
            Self::Link { .. } => "link",
            Self::Blockquote { .. } => "blockquote",
            Self::ThematicBreak => "thematicBreak",
            Self::Delete { .. } => "delete",
            Self::Diagram { .. } => "diagram",
        }
    }

    /// Child nodes; empty for leaf kinds.
    #[must_use]
    pub fn children(&self) -> &[PlatformNode] {
        match self {
            Self::Root { children }
            | Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::UnorderedList { children }
            | Self::OrderedList { children }
            | Self::ListItem { children }
            | Self::Emphasis { children }
            | Self::Strong { children }
            | Self::Table { children }
            | Self::TableRow { children, .. }
            | Self::TableCell { children }
            | Self::Link { children, .. }
            | Self::Blockquote { children }
            | Self::Delete { children } => children,
            Self::Text { .. }
            | Self::InlineCode { .. }
            | Self::CodeBlock { .. }
            | Self::Image { .. }
            | Self::ThematicBreak
            | Self::Diagram { .. } => &[],
        }
    }

    /// Count diagram nodes in this subtree.
    #[must_use]
    pub fn diagram_count(&self) -> usize {
        match self {
            Self::Diagram { .. } => 1,
            _ => self.children().iter().map(Self::diagram_count).sum(),
        }
    }
}
