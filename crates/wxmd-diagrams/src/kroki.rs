//! Mermaid rendering through a Kroki server.
//!
//! Kroki renders Mermaid source to SVG over HTTP. The theme chosen at
//! initialization is passed to Kroki as a diagram option header on every
//! request.

use std::fmt;
use std::sync::RwLock;
use std::time::Duration;

use ureq::Agent;

use crate::consts::{DEFAULT_TIMEOUT, MERMAID_THEMES};
use crate::engine::{DiagramEngine, EngineConfig, EngineError};

/// Kroki endpoint for Mermaid diagrams.
const MERMAID_ENDPOINT: &str = "mermaid";

/// Create HTTP agent with the specified timeout.
///
/// Status codes are inspected manually so error bodies can be reported.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`DiagramEngine`] backed by a Kroki server.
pub struct KrokiEngine {
    server_url: String,
    agent: Agent,
    config: RwLock<Option<EngineConfig>>,
}

impl KrokiEngine {
    /// Create an engine for the given Kroki server URL.
    ///
    /// A trailing slash on the URL is ignored.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url: String = server_url.into();
        Self {
            server_url: server_url.trim_end_matches('/').to_owned(),
            agent: create_agent(DEFAULT_TIMEOUT),
            config: RwLock::new(None),
        }
    }

    /// Set the per-request timeout (default 30 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn render_url(&self) -> String {
        format!("{}/{MERMAID_ENDPOINT}/svg", self.server_url)
    }
}

impl fmt::Debug for KrokiEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KrokiEngine")
            .field("server_url", &self.server_url)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DiagramEngine for KrokiEngine {
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError> {
        if !MERMAID_THEMES.contains(&config.theme.as_str()) {
            return Err(EngineError::UnsupportedTheme(config.theme.clone()));
        }
        tracing::debug!(
            theme = %config.theme,
            security_level = %config.security_level,
            server = %self.server_url,
            "Configured Kroki engine"
        );
        *self.config.write().unwrap() = Some(config.clone());
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    fn render(&self, id: &str, source: &str) -> Result<String, EngineError> {
        let config = self
            .config
            .read()
            .unwrap()
            .clone()
            .ok_or(EngineError::NotInitialized)?;

        tracing::debug!(id, theme = %config.theme, "Rendering diagram via Kroki");

        let response = self
            .agent
            .post(&self.render_url())
            .header("Content-Type", "text/plain")
            .header("Kroki-Diagram-Options-Theme", &config.theme)
            .send(source.as_bytes())
            .map_err(|e| EngineError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            let message = format!("HTTP {status}: {}", error_body.trim());
            // Kroki answers malformed source with a client error.
            return Err(if status < 500 {
                EngineError::Syntax(message)
            } else {
                EngineError::Http(message)
            });
        }

        let bytes = body
            .read_to_vec()
            .map_err(|e| EngineError::Io(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| EngineError::Io(e.to_string()))
    }
}
