//! Theme configuration.
//!
//! A theme maps each semantic style slot to a literal inline `style` string.
//! Two built-in themes ship with the crate; custom themes are loaded from TOML
//! files whose missing slots fall back to the default theme.
//!
//! ```toml
//! name = "mine"
//! paragraph = "font-size:16px;line-height:1.8;"
//! headings = ["font-size:24px;", "font-size:20px;"]
//! diagram_theme = "forest"
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::Deserialize;

static WECHAT_DEFAULT: LazyLock<Theme> = LazyLock::new(Theme::wechat_default);
static WECHAT_CLEAN: LazyLock<Theme> = LazyLock::new(Theme::wechat_clean);

/// Error loading a custom theme.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("failed to read theme file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid theme file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid theme: {0}")]
    Invalid(String),
}

/// Inline-style strings for every platform construct.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Theme {
    pub name: String,
    pub paragraph: String,
    /// Heading styles by level; index 0 is level 1.
    pub headings: Vec<String>,
    pub code_table: String,
    pub code_pre: String,
    pub inline_code: String,
    pub ul: String,
    pub ol: String,
    pub li: String,
    pub image: String,
    pub table: String,
    pub table_row: String,
    pub table_header_cell: String,
    pub table_cell: String,
    pub link: String,
    pub blockquote: String,
    pub thematic_break: String,
    /// Carried by theme files; `<s>` is rendered unstyled.
    pub strikethrough: String,
    /// Style of the `<img>` holding a rendered diagram.
    pub diagram: String,
    /// Style of the notice shown when a diagram fails to render.
    pub diagram_error: String,
    /// Diagram engine theme.
    pub diagram_theme: String,
    /// Background painted behind diagrams.
    pub diagram_background: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::wechat_default()
    }
}

impl Theme {
    /// Names accepted by [`Theme::by_name`].
    #[must_use]
    pub fn builtin_names() -> &'static [&'static str] {
        &["wechat-default", "wechat-clean"]
    }

    /// Look up a built-in theme by name or alias.
    ///
    /// Accepts `default`/`wechat-default` and `clean`/`wechat-clean`.
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static Theme> {
        match name {
            "clean" | "wechat-clean" => Some(&*WECHAT_CLEAN),
            "default" | "wechat-default" => Some(&*WECHAT_DEFAULT),
            _ => None,
        }
    }

    /// Look up a built-in theme, falling back to the default theme for
    /// unknown names.
    #[must_use]
    pub fn by_name(name: &str) -> &'static Theme {
        Self::lookup(name).unwrap_or_else(|| {
            tracing::debug!(theme = name, "Unknown theme, using default");
            &*WECHAT_DEFAULT
        })
    }

    /// Parse a theme from TOML. Missing slots take default-theme values.
    pub fn from_toml(content: &str) -> Result<Self, ThemeError> {
        let theme: Self = toml::from_str(content)?;
        theme.validate()?;
        Ok(theme)
    }

    /// Load a theme from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<(), ThemeError> {
        if self.headings.is_empty() {
            return Err(ThemeError::Invalid(
                "headings must define at least the level 1 style".to_owned(),
            ));
        }
        if self.diagram_theme.trim().is_empty() {
            return Err(ThemeError::Invalid("diagram_theme cannot be empty".to_owned()));
        }
        Ok(())
    }

    /// Style for a heading level, falling back to the level 1 style.
    #[must_use]
    pub fn heading(&self, level: u8) -> &str {
        usize::from(level)
            .checked_sub(1)
            .and_then(|index| self.headings.get(index))
            .or_else(|| self.headings.first())
            .map_or("", String::as_str)
    }

    /// The `wechat-default` theme.
    #[must_use]
    pub fn wechat_default() -> Self {
        Self {
            name: "wechat-default".to_owned(),
            paragraph: "font-size:15px;line-height:1.8;color:#333;margin:12px 0;".to_owned(),
            headings: vec![
                "font-size:22px;font-weight:600;margin:20px 0;".to_owned(),
                "font-size:18px;font-weight:600;margin:18px 0;".to_owned(),
                "font-size:16px;font-weight:600;margin:16px 0;".to_owned(),
            ],
            code_table: "width:100%;background:#f6f8fa;border-radius:6px;".to_owned(),
            code_pre: "font-size:13px;line-height:1.6;padding:12px;".to_owned(),
            inline_code: "background:#f6f8fa;padding:2px 4px;border-radius:3px;font-size:13px;"
                .to_owned(),
            ul: "margin:12px 0;padding-left:20px;".to_owned(),
            ol: "margin:12px 0;padding-left:20px;".to_owned(),
            li: "margin:6px 0;".to_owned(),
            image: "max-width:100%;height:auto;margin:12px 0;".to_owned(),
            table: "margin:12px 0;border:1px solid #dfe2e5;border-radius:6px;".to_owned(),
            table_row: "display:flex;".to_owned(),
            table_header_cell:
                "flex:1;background:#f6f8fa;padding:8px 12px;font-weight:600;border-bottom:1px solid #dfe2e5;"
                    .to_owned(),
            table_cell: "flex:1;padding:8px 12px;border-bottom:1px solid #eaecef;".to_owned(),
            link: "color:#576b95;text-decoration:none;".to_owned(),
            blockquote: "margin:12px 0;padding:8px 16px;border-left:4px solid #dfe2e5;color:#666;"
                .to_owned(),
            thematic_break: "height:1px;background:#eaecef;margin:24px 0;".to_owned(),
            strikethrough: "text-decoration:line-through;".to_owned(),
            diagram: "max-width:100%;height:auto;margin:12px auto;display:block;".to_owned(),
            diagram_error:
                "margin:12px 0;padding:12px;background:#fff5f5;border-left:4px solid #e53e3e;color:#c53030;font-size:13px;"
                    .to_owned(),
            diagram_theme: "default".to_owned(),
            diagram_background: "transparent".to_owned(),
        }
    }

    /// The `wechat-clean` theme.
    #[must_use]
    pub fn wechat_clean() -> Self {
        Self {
            name: "wechat-clean".to_owned(),
            paragraph: "font-size:15px;line-height:1.75;color:#222;margin:10px 0;".to_owned(),
            headings: vec![
                "font-size:20px;font-weight:500;margin:18px 0;color:#000;".to_owned(),
                "font-size:17px;font-weight:500;margin:16px 0;color:#000;".to_owned(),
                "font-size:15px;font-weight:500;margin:14px 0;color:#000;".to_owned(),
            ],
            code_table: "width:100%;background:#fafafa;border:1px solid #eaeaea;".to_owned(),
            code_pre: "font-size:14px;line-height:1.5;padding:16px;color:#333;".to_owned(),
            inline_code:
                "background:#f0f0f0;padding:2px 5px;border-radius:2px;font-size:13px;color:#d63384;"
                    .to_owned(),
            ul: "margin:10px 0;padding-left:22px;".to_owned(),
            ol: "margin:10px 0;padding-left:22px;".to_owned(),
            li: "margin:5px 0;".to_owned(),
            image: "max-width:100%;height:auto;margin:15px 0;".to_owned(),
            table: "margin:10px 0;border:1px solid #d0d0d0;border-radius:4px;".to_owned(),
            table_row: "display:flex;".to_owned(),
            table_header_cell:
                "flex:1;background:#f5f5f5;padding:8px 12px;font-weight:500;border-bottom:1px solid #d0d0d0;"
                    .to_owned(),
            table_cell: "flex:1;padding:8px 12px;border-bottom:1px solid #e5e5e5;".to_owned(),
            link: "color:#0066cc;text-decoration:none;border-bottom:1px solid transparent;"
                .to_owned(),
            blockquote:
                "margin:10px 0;padding:10px 14px;background:#fafafa;border-left:3px solid #999;color:#666;"
                    .to_owned(),
            thematic_break: "height:1px;background:#e0e0e0;margin:24px 0;".to_owned(),
            strikethrough: "text-decoration:line-through;color:#888;".to_owned(),
            diagram: "max-width:100%;height:auto;margin:15px auto;display:block;".to_owned(),
            diagram_error:
                "margin:10px 0;padding:10px 14px;background:#fafafa;border-left:3px solid #d63384;color:#d63384;font-size:13px;"
                    .to_owned(),
            diagram_theme: "neutral".to_owned(),
            diagram_background: "transparent".to_owned(),
        }
    }
}
