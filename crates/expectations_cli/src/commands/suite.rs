use anyhow::Result;
use expectations_validator::{Stage, StageValidator};

use crate::output;

pub fn execute(
    stage: &str,
    include_target: bool,
    expected_features: Option<usize>,
    settings_path: Option<&str>,
    format: &str,
) -> Result<()> {
    let stage: Stage = stage.parse()?;
    let settings = super::load_settings(settings_path)?;

    let suite = StageValidator::new(settings).suite_for(stage, include_target, expected_features);
    output::print_suite(&suite, format)
}
