//! `copapatch config` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use copapatch_core::{CopapatchConfig, CopapatchError};

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show --section`.
const SECTIONS: &[&str] = &["general", "scanner", "patcher", "registry", "engine"];

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "copapatch.toml";

/// Where the configuration is read from.
///
/// Only the implicit default path falls back to built-in defaults when absent;
/// a path given with `--config` must exist.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub explicit: bool,
}

impl ConfigSource {
    pub fn from_arg(config: Option<PathBuf>) -> Self {
        match config {
            Some(path) => Self {
                path,
                explicit: true,
            },
            None => Self {
                path: PathBuf::from(DEFAULT_CONFIG_PATH),
                explicit: false,
            },
        }
    }

    /// Load the effective configuration (file + env overrides + defaults).
    ///
    /// # Errors
    ///
    /// `ConfigError::FileNotFound` when an explicit path does not exist, plus
    /// any parse or validation error.
    pub async fn load(&self) -> Result<CopapatchConfig, CopapatchError> {
        if self.explicit {
            CopapatchConfig::load(&self.path).await
        } else {
            CopapatchConfig::load_or_default(&self.path).await
        }
    }
}

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    source: &ConfigSource,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(&source.path, writer).await,
        ConfigAction::Show { section } => execute_show(source, section, writer).await,
    }
}

/// Load the file strictly (a missing file is an error) and report the result.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing file, invalid values, parse errors).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match CopapatchConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is unknown.
async fn execute_show(
    source: &ConfigSource,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %source.path.display(), explicit = source.explicit, "loading configuration");

    let config = source.load().await?;
    let report = show_report(&config, &source.path.display().to_string(), section)?;
    writer.render(&report)
}

/// Serialize the whole configuration or one section of it.
pub fn show_report(
    config: &CopapatchConfig,
    source: &str,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section.as_deref() {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("scanner") => toml::to_string_pretty(&config.scanner),
        Some("patcher") => toml::to_string_pretty(&config.patcher),
        Some("registry") => toml::to_string_pretty(&config.registry),
        Some("engine") => toml::to_string_pretty(&config.engine),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    }
    .unwrap_or_else(|e| format!("(serialization error: {})", e));

    Ok(ConfigReport {
        source: source.to_owned(),
        section,
        config_toml,
    })
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let title = match self.section.as_deref() {
            Some(section) => format!("# [{section}] from {}", self.source),
            None => format!("# effective configuration from {}", self.source),
        };
        writeln!(w, "{}", title.dimmed())?;
        write!(w, "{}", self.config_toml)
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let verdict = if self.valid {
            "VALID".green().bold()
        } else {
            "INVALID".red().bold()
        };
        writeln!(w, "{}: {verdict}", self.source)?;
        for err in &self.errors {
            writeln!(w, "  - {}", err.red())?;
        }
        Ok(())
    }
}
