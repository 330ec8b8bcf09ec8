use anyhow::{Context, Result};
use expectations_core::StageError;
use expectations_parser::parse_suite_file;
use expectations_validator::StageValidator;
use std::path::Path;
use tracing::info;

use crate::{loader, output};

pub fn execute(
    suite_path: &str,
    data_path: &str,
    settings_path: Option<&str>,
    format: &str,
) -> Result<()> {
    info!("Running suite {} against {}", suite_path, data_path);

    let suite = parse_suite_file(Path::new(suite_path))
        .with_context(|| format!("Failed to parse suite file: {}", suite_path))?;
    let settings = super::load_settings(settings_path)?;
    let batch = loader::load_csv(Path::new(data_path))
        .with_context(|| format!("Failed to load data file: {}", data_path))?;

    if format != "json" {
        output::print_info(&format!(
            "Suite loaded: {} ({} rules)",
            suite.name(),
            suite.len()
        ));
    }

    let message = format!("Suite '{}' failed", suite.name());
    match StageValidator::new(settings).validate_suite(&batch, &suite, true, &message) {
        Ok(result) => output::print_validation_result(&result, format),
        Err(StageError::Failed(failure)) => {
            output::print_validation_result(failure.result(), format)?;
            output::print_error(&failure.message);
            std::process::exit(1);
        }
        Err(err @ StageError::Internal(_)) => Err(err.into()),
    }
}
