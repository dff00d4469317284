//! Unified precedence resolution for the data directory and CLI preferences.
//!
//! ## Data Directory Precedence (highest to lowest)
//!
//! 1. `--data-dir` CLI flag
//! 2. `CV_DATA_DIR` environment variable
//! 3. Platform data directory (`~/.local/share/cutover` on Linux)
//!
//! ## Config Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. `CV_EDITOR_NAME` environment variable (editor name only)
//! 3. Data-dir config.kdl (`<data-dir>/config.kdl`)
//! 4. System config.kdl (`~/.config/cutover/config.kdl`)
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use crate::config::{CutoverConfig, OutputFormat};
use crate::storage::CONFIG_FILE;
use crate::{Error, Result};

/// Environment variable name for the data directory override.
pub const DATA_DIR_ENV: &str = "CV_DATA_DIR";

/// Environment variable name for the audit editor name.
pub const EDITOR_NAME_ENV: &str = "CV_EDITOR_NAME";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from the data-dir config.kdl
    Session,
    /// Value from system-level config.kdl
    System,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Session => write!(f, "session"),
            ValueSource::System => write!(f, "system"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Resolve the data directory.
pub fn resolve_data_dir(cli: Option<PathBuf>) -> Result<Resolved<PathBuf>> {
    resolve_data_dir_with(cli, std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
}

fn resolve_data_dir_with(cli: Option<PathBuf>, env: Option<PathBuf>) -> Result<Resolved<PathBuf>> {
    if let Some(path) = cli {
        return Ok(Resolved::new(path, ValueSource::CliFlag));
    }
    if let Some(path) = env.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(Resolved::new(
            path,
            ValueSource::EnvVar(DATA_DIR_ENV.to_string()),
        ));
    }
    let base = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(Resolved::new(base.join("cutover"), ValueSource::Default))
}

/// Path of the system-level config.kdl, if the platform has a config directory.
pub fn system_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cutover").join("config.kdl"))
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Name recorded in audit entries
    pub editor_name: Option<Resolved<String>>,
    /// Output format preference
    pub output_format: Resolved<OutputFormat>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            editor_name: None,
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Get the editor name, if set.
    pub fn editor_name(&self) -> Option<&str> {
        self.editor_name.as_ref().map(|r| r.value.as_str())
    }

    /// Get the output format value.
    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Editor name override from CLI flag
    pub editor_name: Option<String>,
    /// Output format override from CLI flag
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_editor_name(mut self, name: impl Into<String>) -> Self {
        self.editor_name = Some(name.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Resolve configuration with the full precedence chain.
///
/// Works on uninitialized data directories: missing files are skipped.
pub fn resolve_config(data_dir: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system = match system_config_path() {
        Some(path) => load_config_file(&path)?,
        None => CutoverConfig::default(),
    };
    let session = load_config_file(&data_dir.join(CONFIG_FILE))?;
    let env_editor = std::env::var(EDITOR_NAME_ENV).ok();
    Ok(resolve_layers(
        &system,
        &session,
        env_editor.as_deref(),
        overrides,
    ))
}

/// Read a config.kdl file; a missing file yields the empty config.
pub fn load_config_file(path: &Path) -> Result<CutoverConfig> {
    if !path.exists() {
        return Ok(CutoverConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let doc: kdl::KdlDocument = content.parse()?;
    Ok(CutoverConfig::from_kdl(&doc))
}

fn resolve_layers(
    system: &CutoverConfig,
    session: &CutoverConfig,
    env_editor: Option<&str>,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    let mut resolved = ResolvedConfig::default();

    if let Some(ref name) = system.editor_name {
        resolved.editor_name = Some(Resolved::new(name.clone(), ValueSource::System));
    }
    if let Some(ref format) = system.output_format {
        resolved.output_format = Resolved::new(format.clone(), ValueSource::System);
    }

    if let Some(ref name) = session.editor_name {
        resolved.editor_name = Some(Resolved::new(name.clone(), ValueSource::Session));
    }
    if let Some(ref format) = session.output_format {
        resolved.output_format = Resolved::new(format.clone(), ValueSource::Session);
    }

    if let Some(name) = env_editor.filter(|n| !n.trim().is_empty()) {
        resolved.editor_name = Some(Resolved::new(
            name.to_string(),
            ValueSource::EnvVar(EDITOR_NAME_ENV.to_string()),
        ));
    }

    if let Some(ref name) = overrides.editor_name {
        resolved.editor_name = Some(Resolved::new(name.clone(), ValueSource::CliFlag));
    }
    if let Some(ref format) = overrides.output_format {
        resolved.output_format = Resolved::new(format.clone(), ValueSource::CliFlag);
    }

    resolved
}
