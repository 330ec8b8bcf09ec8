use anyhow::{Context, Result};
use expectations_core::StageError;
use expectations_validator::{Stage, StageValidator};
use std::path::Path;
use tracing::info;

use crate::{loader, output};

pub fn execute(
    data_path: &str,
    stage: &str,
    include_target: bool,
    expected_features: Option<usize>,
    settings_path: Option<&str>,
    sample_size: Option<usize>,
    format: &str,
) -> Result<()> {
    let stage: Stage = stage.parse()?;
    info!("Validating {} with the {} suite", data_path, stage);

    let settings = super::load_settings(settings_path)?;
    let mut batch = loader::load_csv(Path::new(data_path))
        .with_context(|| format!("Failed to load data file: {}", data_path))?;

    if let Some(size) = sample_size {
        info!("Sample size: {}", size);
        batch = batch.head(size);
    }

    if format != "json" {
        output::print_info(&format!(
            "Data loaded: {} rows, {} columns",
            batch.row_count(),
            batch.column_count()
        ));
    }

    let stages = StageValidator::new(settings);

    let outcome = match stage {
        Stage::Raw => stages.validate_raw(&batch, include_target, true),
        Stage::Engineered => stages.validate_engineered(&batch, include_target, true),
        Stage::Test => stages.validate_test(&batch, true),
        Stage::Preprocessed => stages.validate_preprocessed(&batch, expected_features, true),
        Stage::Monitor => {
            // Monitoring never fails the caller
            match stages.monitor(&batch) {
                Some(result) => output::print_validation_result(&result, format)?,
                None => output::print_warning("Monitoring validation produced no result"),
            }
            return Ok(());
        }
    };

    match outcome {
        Ok(result) => output::print_validation_result(&result, format),
        Err(StageError::Failed(failure)) => {
            output::print_validation_result(failure.result(), format)?;
            output::print_error(&failure.message);
            std::process::exit(1);
        }
        Err(err @ StageError::Internal(_)) => Err(err.into()),
    }
}
