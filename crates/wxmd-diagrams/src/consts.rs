//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default timeout for a single engine HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default diagram theme.
pub const DEFAULT_THEME: &str = "default";

/// Background color meaning "leave the graphic untouched".
pub const TRANSPARENT: &str = "transparent";

/// Themes understood by the Mermaid engine.
pub const MERMAID_THEMES: &[&str] = &["default", "dark", "forest", "neutral", "base"];
