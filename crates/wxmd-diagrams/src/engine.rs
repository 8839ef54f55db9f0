//! Diagram engine boundary.
//!
//! A [`DiagramEngine`] turns diagram source into SVG markup. It is configured
//! once per theme with [`DiagramEngine::initialize`] and then asked to render
//! any number of diagrams. Engines must be thread-safe (`Send + Sync`) since
//! sibling subtrees are rendered in parallel.

use std::fmt;
use std::str::FromStr;

/// Engine configuration applied by [`DiagramEngine::initialize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Engine theme name (e.g. `"default"`, `"dark"`).
    pub theme: String,
    pub security_level: SecurityLevel,
}

/// How much the engine trusts diagram source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SecurityLevel {
    Strict,
    #[default]
    Loose,
    Antiscript,
    Sandbox,
}

impl SecurityLevel {
    /// Engine name of this level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
            Self::Antiscript => "antiscript",
            Self::Sandbox => "sandbox",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityLevel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            "antiscript" => Ok(Self::Antiscript),
            "sandbox" => Ok(Self::Sandbox),
            other => Err(EngineError::UnsupportedSecurityLevel(other.to_owned())),
        }
    }
}

/// Error reported by a diagram engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The diagram source is malformed.
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("unsupported theme: {0}")]
    UnsupportedTheme(String),
    #[error("unsupported security level: {0}")]
    UnsupportedSecurityLevel(String),
    /// `render` was called before a successful `initialize`.
    #[error("engine is not initialized")]
    NotInitialized,
}

/// External diagram-to-SVG capability.
pub trait DiagramEngine: Send + Sync {
    /// Configure the engine for a theme.
    ///
    /// Expensive; callers skip it when the theme is unchanged.
    fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError>;

    /// Render diagram source to SVG markup.
    ///
    /// `id` is unique per call and may be used by the engine for its internal
    /// element identifiers.
    fn render(&self, id: &str, source: &str) -> Result<String, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_level_round_trip_names() {
        for level in [
            SecurityLevel::Strict,
            SecurityLevel::Loose,
            SecurityLevel::Antiscript,
            SecurityLevel::Sandbox,
        ] {
            assert_eq!(level.as_str().parse::<SecurityLevel>(), Ok(level));
        }
    }

    #[test]
    fn test_security_level_default_is_loose() {
        assert_eq!(SecurityLevel::default(), SecurityLevel::Loose);
        assert_eq!(SecurityLevel::default().to_string(), "loose");
    }

    #[test]
    fn test_unknown_security_level() {
        assert_eq!(
            "paranoid".parse::<SecurityLevel>(),
            Err(EngineError::UnsupportedSecurityLevel("paranoid".to_owned()))
        );
    }
}
