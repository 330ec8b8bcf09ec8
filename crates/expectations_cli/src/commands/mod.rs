pub mod run;
pub mod suite;
pub mod validate;

use anyhow::{Context, Result};
use expectations_core::ValidationSettings;
use expectations_parser::parse_settings_file;
use std::path::Path;

/// Loads settings from `path`, or the defaults when no file is given.
pub fn load_settings(path: Option<&str>) -> Result<ValidationSettings> {
    match path {
        Some(path) => parse_settings_file(Path::new(path))
            .with_context(|| format!("Failed to parse settings file: {}", path)),
        None => Ok(ValidationSettings::default()),
    }
}
