//! Parser for suite and settings files (YAML/TOML formats).
//!
//! Suites authored as files use the same shape as the in-memory [`Suite`]: a
//! `name`, an optional `description` and a list of `rules`, each tagged with a
//! snake-case `type` and carrying an optional `mostly` tolerance.
//!
//! # Example
//!
//! ```rust
//! use expectations_parser::parse_suite_yaml;
//!
//! let yaml = r#"
//! name: listings
//! rules:
//!   - type: not_null
//!     column: LotArea
//!   - type: value_between
//!     column: SalePrice
//!     min: 10000
//!     max: 1000000
//!     mostly: 0.95
//! "#;
//!
//! let suite = parse_suite_yaml(yaml).expect("Failed to parse suite");
//! assert_eq!(suite.name(), "listings");
//! assert_eq!(suite.rules()[1].tolerance, 0.95);
//! ```

use expectations_core::{Suite, ValidationSettings};
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading suite or settings files.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

fn from_yaml<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(serde_yaml_ng::from_str(content)?)
}

fn from_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))
}

fn from_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        FileFormat::Yaml => from_yaml(&content),
        FileFormat::Toml => from_toml(&content),
    }
}

/// Parse a suite from a YAML string.
pub fn parse_suite_yaml(content: &str) -> Result<Suite> {
    from_yaml(content)
}

/// Parse a suite from a TOML string.
///
/// # Example
///
/// ```rust
/// use expectations_parser::parse_suite_toml;
///
/// let toml = r#"
/// name = "shape"
///
/// [[rules]]
/// type = "row_count_between"
/// min = 10
///
/// [[rules]]
/// type = "column_count_equal"
/// value = 6
/// "#;
///
/// let suite = parse_suite_toml(toml).unwrap();
/// assert_eq!(suite.len(), 2);
/// assert_eq!(suite.rules()[0].name, "row_count_between");
/// ```
pub fn parse_suite_toml(content: &str) -> Result<Suite> {
    from_toml(content)
}

/// Parse a suite from a file with automatic format detection.
///
/// ```no_run
/// use expectations_parser::parse_suite_file;
/// use std::path::Path;
///
/// let suite = parse_suite_file(Path::new("suites/listings.yml")).unwrap();
/// println!("Loaded suite: {}", suite.name());
/// ```
pub fn parse_suite_file(path: &Path) -> Result<Suite> {
    from_file(path)
}

/// Parse validation settings from a YAML string. Omitted fields keep their defaults.
pub fn parse_settings_yaml(content: &str) -> Result<ValidationSettings> {
    from_yaml(content)
}

/// Parse validation settings from a TOML string. Omitted fields keep their defaults.
pub fn parse_settings_toml(content: &str) -> Result<ValidationSettings> {
    from_toml(content)
}

/// Parse validation settings from a file with automatic format detection.
pub fn parse_settings_file(path: &Path) -> Result<ValidationSettings> {
    from_file(path)
}

/// Detect the file format from a path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `FileFormat::Yaml`
/// * `.toml` → `FileFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}
