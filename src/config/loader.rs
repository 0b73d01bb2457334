//! Configuration loading from disk.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ConfigDocument;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document does not have the descriptor's shape.
    #[error("malformed {format} descriptor: {message}")]
    Malformed { format: ConfigFormat, message: String },

    #[error("validation failed: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("failed to render {format} descriptor: {message}")]
    Export { format: ConfigFormat, message: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// On-disk representation of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML, everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Json => f.write_str("JSON"),
            ConfigFormat::Toml => f.write_str("TOML"),
        }
    }
}

/// Parse a descriptor document without validating it.
pub fn parse_document(content: &str, format: ConfigFormat) -> Result<ConfigDocument, ConfigError> {
    let parsed: Result<ConfigDocument, String> = match format {
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| ConfigError::Malformed { format, message })
}

/// Parse and validate a descriptor held in memory.
pub fn from_str(content: &str, format: ConfigFormat) -> Result<ConfigDocument, ConfigError> {
    let document = parse_document(content, format)?;

    validate_config(&document.config).map_err(ConfigError::Invalid)?;

    Ok(document)
}

/// Read and parse a descriptor file without validating it.
/// The format follows the file extension.
pub fn read_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_document(&content, ConfigFormat::from_path(path))
}

/// Load and validate a descriptor file.
pub fn load_config(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let document = read_document(path)?;

    validate_config(&document.config).map_err(ConfigError::Invalid)?;

    Ok(document)
}

/// Render a document in the given format.
pub fn render_document(document: &ConfigDocument, format: ConfigFormat) -> Result<String, ConfigError> {
    let rendered = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(document).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::to_string_pretty(document).map_err(|e| e.to_string()),
    };

    rendered.map_err(|message| ConfigError::Export { format, message })
}
