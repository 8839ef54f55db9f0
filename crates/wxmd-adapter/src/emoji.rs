//! Emoji-prefixed paragraph detection.
//!
//! The article editor collapses consecutive emoji-led lines in a plain
//! paragraph into an uneven block. Paragraphs that look like such a list are
//! promoted to a real unordered list instead.

use std::ops::RangeInclusive;

use wxmd_mdast::MdNode;

/// Default number of emoji-led lines required for promotion.
pub const DEFAULT_MIN_LINES: usize = 2;

/// Default emoji code point range (Miscellaneous Symbols and Pictographs
/// through Supplemental Symbols and Pictographs).
pub const DEFAULT_EMOJI_RANGE: RangeInclusive<char> = '\u{1F300}'..='\u{1F9FF}';

/// Policy deciding when a paragraph is promoted to an emoji list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmojiListPolicy {
    /// Whether promotion is enabled at all.
    pub enabled: bool,
    /// Minimum number of non-blank lines that must start with an emoji.
    pub min_lines: usize,
    /// Code point ranges counted as emoji.
    pub ranges: Vec<RangeInclusive<char>>,
}

impl Default for EmojiListPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_lines: DEFAULT_MIN_LINES,
            ranges: vec![DEFAULT_EMOJI_RANGE],
        }
    }
}

impl EmojiListPolicy {
    /// Policy that never promotes.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether the line's first character falls in an emoji range.
    #[must_use]
    pub fn starts_with_emoji(&self, line: &str) -> bool {
        line.chars()
            .next()
            .is_some_and(|first| self.ranges.iter().any(|range| range.contains(&first)))
    }

    /// Decide whether a paragraph should become a list.
    ///
    /// Concatenates the paragraph's direct text children, splits on newlines
    /// and keeps the trimmed non-blank lines. Returns those lines when at
    /// least `min_lines` of them start with an emoji.
    #[must_use]
    pub fn list_lines(&self, paragraph_children: &[MdNode]) -> Option<Vec<String>> {
        if !self.enabled {
            return None;
        }

        let text: String = paragraph_children
            .iter()
            .filter_map(|child| match child {
                MdNode::Text { value } => Some(value.as_str()),
                _ => None,
            })
            .collect();

        let lines: Vec<&str> = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let emoji_lines = lines
            .iter()
            .filter(|line| self.starts_with_emoji(line))
            .count();

        (emoji_lines >= self.min_lines).then(|| lines.into_iter().map(str::to_owned).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> MdNode {
        MdNode::Text {
            value: value.to_owned(),
        }
    }

    #[test]
    fn test_starts_with_emoji() {
        let policy = EmojiListPolicy::default();
        assert!(policy.starts_with_emoji("🎉 party"));
        assert!(policy.starts_with_emoji("🚀"));
        assert!(!policy.starts_with_emoji("plain 🎉"));
        assert!(!policy.starts_with_emoji(""));
        // U+2705 is outside the default range
        assert!(!policy.starts_with_emoji("✅ done"));
    }

    #[test]
    fn test_two_emoji_lines_promote() {
        let policy = EmojiListPolicy::default();
        let lines = policy.list_lines(&[text("🎉 first\n  🚀 second  \n\nplain third")]);
        assert_eq!(
            lines,
            Some(vec![
                "🎉 first".to_owned(),
                "🚀 second".to_owned(),
                "plain third".to_owned(),
            ])
        );
    }

    #[test]
    fn test_single_emoji_line_does_not_promote() {
        let policy = EmojiListPolicy::default();
        assert_eq!(policy.list_lines(&[text("🎉 only one\nplain")]), None);
        assert_eq!(policy.list_lines(&[text("no emoji here")]), None);
    }

    #[test]
    fn test_only_direct_text_children_count() {
        let policy = EmojiListPolicy::default();
        let children = [
            text("🎉 first\n"),
            MdNode::Strong {
                children: vec![text("🚀 hidden")],
            },
        ];
        assert_eq!(policy.list_lines(&children), None);
    }

    #[test]
    fn test_text_split_across_nodes() {
        let policy = EmojiListPolicy::default();
        let children = [
            text("🎉 a\n"),
            MdNode::InlineCode {
                value: "x".to_owned(),
            },
            text("🚀 b"),
        ];
        assert_eq!(
            policy.list_lines(&children),
            Some(vec!["🎉 a".to_owned(), "🚀 b".to_owned()])
        );
    }

    #[test]
    fn test_disabled_policy() {
        let policy = EmojiListPolicy::disabled();
        assert_eq!(policy.list_lines(&[text("🎉 a\n🚀 b")]), None);
    }

    #[test]
    fn test_custom_threshold_and_range() {
        let policy = EmojiListPolicy {
            enabled: true,
            min_lines: 3,
            ranges: vec!['\u{2600}'..='\u{27BF}'],
        };
        assert_eq!(policy.list_lines(&[text("✅ a\n✅ b")]), None);
        assert_eq!(
            policy.list_lines(&[text("✅ a\n✅ b\n✨ c")]),
            Some(vec!["✅ a".to_owned(), "✅ b".to_owned(), "✨ c".to_owned()])
        );
    }
}
