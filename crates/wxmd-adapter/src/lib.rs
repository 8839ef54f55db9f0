//! Platform adapter for the article editor.
//!
//! Converts the generic [`MdNode`](wxmd_mdast::MdNode) tree into a
//! [`PlatformNode`] tree shaped for an editor that only keeps inline styles and
//! a narrow tag set. The adapter applies the structural rewrites the platform
//! needs before rendering:
//!
//! - Headings become level-carrying `div` nodes
//! - `mermaid` code blocks become [`PlatformNode::Diagram`] nodes
//! - Paragraphs of emoji-led lines become unordered lists ([`EmojiListPolicy`])
//! - Table rows learn whether they are the header row
//!
//! Kinds the platform cannot display are omitted rather than reported.
//!
//! # Example
//!
//! ```
//! use wxmd_adapter::{PlatformNode, adapt_document};
//!
//! let tree = wxmd_mdast::parse("# Hello");
//! let adapted = adapt_document(&tree);
//! assert!(matches!(adapted.children()[0], PlatformNode::Heading { level: 1, .. }));
//! ```

mod adapter;
mod emoji;
mod node;

pub use adapter::{DIAGRAM_LANGUAGE, WechatAdapter, adapt, adapt_document};
pub use emoji::{DEFAULT_EMOJI_RANGE, DEFAULT_MIN_LINES, EmojiListPolicy};
pub use node::PlatformNode;
