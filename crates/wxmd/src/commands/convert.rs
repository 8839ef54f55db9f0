//! `wxmd convert` command implementation.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use wxmd_adapter::PlatformNode;
use wxmd_config::{CliSettings, Config};
use wxmd_converter::Converter;
use wxmd_mdast::MdNode;
use wxmd_renderer::Theme;

use crate::error::CliError;
use crate::output::{Output, write_stdout};

/// Pipeline stage to emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Emit {
    /// Inline-styled HTML.
    #[default]
    Html,
    /// Parsed markdown tree as JSON.
    Mdast,
    /// Platform tree as JSON.
    Platform,
}

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Path to the markdown file.
    input: PathBuf,

    /// Write output to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Built-in theme name (overrides config).
    #[arg(short, long)]
    theme: Option<String>,

    /// Kroki server URL for diagram rendering (overrides config).
    ///
    /// Without a URL here or in `diagrams.kroki_url`, mermaid blocks are
    /// emitted as code blocks.
    #[arg(long, env = "WXMD_KROKI_URL")]
    kroki_url: Option<String>,

    /// Render diagram blocks as plain code even when a Kroki URL is set.
    #[arg(long)]
    no_diagrams: bool,

    /// Pipeline stage to emit.
    #[arg(long, value_enum, default_value_t = Emit::Html)]
    emit: Emit,

    /// Path to configuration file (default: auto-discover wxmd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, configuration is invalid
    /// or the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if !self.input.is_file() {
            return Err(CliError::Validation(format!(
                "File not found: {}",
                self.input.display()
            )));
        }

        if let Some(theme) = &self.theme
            && Theme::lookup(theme).is_none()
        {
            output.warning(&format!(
                "Unknown theme '{theme}', using default. Available: {}",
                Theme::builtin_names().join(", ")
            ));
        }

        let cli_settings = CliSettings {
            theme: self.theme.clone(),
            kroki_url: self.kroki_url.clone(),
            diagrams_enabled: self.no_diagrams.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let converter = Converter::from_config(&config)?;

        tracing::info!(
            config = ?config.config_path,
            theme = %converter.theme().name,
            kroki_url = ?config.diagrams_resolved.kroki_url,
            "Loaded configuration"
        );

        let markdown = std::fs::read_to_string(&self.input)?;
        if self.verbose {
            output.info(&format!(
                "Converting {} with theme {}...",
                self.input.display(),
                converter.theme().name
            ));
        }

        let tree = converter.parse(&markdown);
        let platform = converter.adapt(&tree);

        let diagrams = platform.diagram_count();
        let missing_renderer = converter.diagrams().is_none() && !self.no_diagrams;
        if self.emit == Emit::Html && diagrams > 0 && missing_renderer {
            output.warning(&format!(
                "{diagrams} diagram block(s) emitted as code: set diagrams.kroki_url or --kroki-url to render them"
            ));
        }

        let rendered = render(&converter, &tree, &platform, self.emit)?;

        match &self.output {
            Some(path) => {
                write_file(path, &rendered)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => write_stdout(&rendered)?,
        }

        Ok(())
    }
}

/// Serialize the requested pipeline stage.
fn render(
    converter: &Converter,
    tree: &MdNode,
    platform: &PlatformNode,
    emit: Emit,
) -> Result<String, CliError> {
    Ok(match emit {
        Emit::Html => converter.render(platform),
        Emit::Mdast => serde_json::to_string_pretty(tree)?,
        Emit::Platform => serde_json::to_string_pretty(platform)?,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
