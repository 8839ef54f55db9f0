//! Generic markdown document tree.
//!
//! This crate turns markdown text into an [`MdNode`] tree shaped after the
//! standard mdast node kinds. Tokenization is done by `pulldown-cmark`; the
//! crate only folds its event stream into an owned tree so later stages can
//! pattern-match on node kinds instead of tracking parser state.
//!
//! # Example
//!
//! ```
//! use wxmd_mdast::parse;
//!
//! let root = parse("# Hello\n\n**Bold** text");
//! assert_eq!(root.kind(), "root");
//! assert_eq!(root.children()[0].kind(), "heading");
//! ```

mod node;
mod parser;
mod util;

pub use node::MdNode;
pub use parser::{MAX_NESTING_DEPTH, Parser, parse};
