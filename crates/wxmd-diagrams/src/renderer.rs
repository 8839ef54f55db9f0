//! Cached, theme-aware diagram rendering.

use std::borrow::Cow;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::cache::{DiagramKey, RenderCache};
use crate::consts::{DEFAULT_THEME, TRANSPARENT};
use crate::engine::{DiagramEngine, EngineConfig, EngineError, SecurityLevel};

/// Per-call rendering options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Engine theme.
    pub theme: String,
    /// CSS color painted behind the graphic; `transparent` leaves it as is.
    pub background_color: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_owned(),
            background_color: TRANSPARENT.to_owned(),
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn new(theme: impl Into<String>, background_color: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            background_color: background_color.into(),
        }
    }
}

/// Diagram rendering failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagramError {
    /// The engine could not be initialized for the requested theme.
    #[error("engine initialization failed: {0}")]
    Init(#[source] EngineError),
    /// The engine rejected the diagram.
    #[error("{0}")]
    Render(#[source] EngineError),
}

/// Renders diagram source through a [`DiagramEngine`], memoizing results.
///
/// One long-lived instance is shared by every render in a process (wrap it
/// in an [`Arc`]). It owns the two pieces of shared state:
///
/// - the render cache, keyed by source, theme and background color
/// - the theme the engine was last initialized with
///
/// Re-initialization happens only when the requested theme differs from the
/// last one. A theme switch holds the write side of the initialization lock,
/// and engine renders hold the read side, so a render always runs against the
/// theme it asked for even when callers on other threads use other themes.
pub struct DiagramRenderer {
    engine: Arc<dyn DiagramEngine>,
    security_level: SecurityLevel,
    initialized_theme: RwLock<Option<String>>,
    cache: RenderCache,
}

impl DiagramRenderer {
    /// Create a renderer with an empty cache and an uninitialized engine.
    #[must_use]
    pub fn new(engine: Arc<dyn DiagramEngine>) -> Self {
        Self {
            engine,
            security_level: SecurityLevel::default(),
            initialized_theme: RwLock::new(None),
            cache: RenderCache::new(),
        }
    }

    /// Set the security level passed to the engine on initialization.
    #[must_use]
    pub fn with_security_level(mut self, security_level: SecurityLevel) -> Self {
        self.security_level = security_level;
        self
    }

    /// Render diagram source to SVG markup.
    ///
    /// Cache hits return without touching the engine. Failures are returned
    /// as errors and never cached, so a later call retries.
    pub fn render(&self, source: &str, options: &RenderOptions) -> Result<String, DiagramError> {
        let key = DiagramKey {
            source,
            theme: &options.theme,
            background: &options.background_color,
        };

        if let Some(markup) = self.cache.get(key) {
            tracing::debug!(theme = %options.theme, "Diagram cache hit");
            return Ok(markup);
        }

        let svg = self.render_with_theme(&options.theme, source)?;
        let markup = inject_background(&svg, &options.background_color).into_owned();
        self.cache.insert(key, markup.clone());
        Ok(markup)
    }

    /// Drop every cached render.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached renders.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Theme the engine is currently initialized with.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn initialized_theme(&self) -> Option<String> {
        self.initialized_theme.read().unwrap().clone()
    }

    /// Run the engine under the read lock once it is initialized for `theme`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    fn render_with_theme(&self, theme: &str, source: &str) -> Result<String, DiagramError> {
        loop {
            {
                let current = self.initialized_theme.read().unwrap();
                if current.as_deref() == Some(theme) {
                    let id = generate_render_id();
                    return self.engine.render(&id, source).map_err(|e| {
                        tracing::warn!(error = %e, id = %id, "Diagram render failed");
                        DiagramError::Render(e)
                    });
                }
            }
            // Another thread may switch themes before the read lock is
            // re-taken; the loop re-checks.
            self.ensure_initialized(theme)?;
        }
    }

    fn ensure_initialized(&self, theme: &str) -> Result<(), DiagramError> {
        let mut current = self.initialized_theme.write().unwrap();
        if current.as_deref() == Some(theme) {
            return Ok(());
        }

        let config = EngineConfig {
            theme: theme.to_owned(),
            security_level: self.security_level,
        };
        tracing::debug!(theme, security_level = %self.security_level, "Initializing diagram engine");

        match self.engine.initialize(&config) {
            Ok(()) => {
                *current = Some(theme.to_owned());
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, theme, "Diagram engine initialization failed");
                *current = None;
                Err(DiagramError::Init(e))
            }
        }
    }
}

impl std::fmt::Debug for DiagramRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramRenderer")
            .field("security_level", &self.security_level)
            .field("initialized_theme", &self.initialized_theme)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Generate a render identifier unique per call.
///
/// Format: `diagram-{unix millis}-{9 random hex chars}`.
#[must_use]
pub fn generate_render_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random = Uuid::new_v4().simple().to_string();
    format!("diagram-{millis}-{}", &random[..9])
}

/// Paint `color` behind an SVG by styling its first `<svg` tag.
///
/// The declaration is prepended to an existing `style` attribute on that tag
/// so the markup never carries the attribute twice. Returns the input
/// unchanged when the color is empty or `transparent`, or when the markup has
/// no `<svg` tag.
#[must_use]
pub fn inject_background<'a>(svg: &'a str, color: &str) -> Cow<'a, str> {
    if color.is_empty() || color.eq_ignore_ascii_case(TRANSPARENT) {
        return Cow::Borrowed(svg);
    }
    let Some(start) = svg.find("<svg") else {
        return Cow::Borrowed(svg);
    };
    let tag_end = svg[start..].find('>').map_or(svg.len(), |offset| start + offset);

    let (insert_at, inserted) = match svg[start..tag_end].find(" style=\"") {
        Some(offset) => (
            start + offset + " style=\"".len(),
            format!("background-color:{color};"),
        ),
        None => (
            start + "<svg".len(),
            format!(" style=\"background-color:{color}\""),
        ),
    };

    let mut out = String::with_capacity(svg.len() + inserted.len());
    out.push_str(&svg[..insert_at]);
    out.push_str(&inserted);
    out.push_str(&svg[insert_at..]);
    Cow::Owned(out)
}
