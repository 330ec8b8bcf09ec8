//! Suite factories for each pipeline stage.
//!
//! Each factory is a pure function of its arguments and the
//! [`ValidationSettings`]; the returned [`Suite`] is immutable.

use crate::predicates::{BOUNDED_AGE, DERIVED_AGE_CONSISTENCY, DERIVED_REMODEL_CONSISTENCY};
use expectations_core::columns::{
    FEATURES, LOT_AGE, LOT_AREA, NEVER_REMODELED, OVERALL_COND, OVERALL_QUAL, TARGET,
    YEAR_BUILT, YEAR_REMOD_ADD, YEAR_SOLD, YEARS_SINCE_REMOD,
};
use expectations_core::{ColumnSetMode, ExpectedType, Rule, RuleBuilder, Suite, ValidationSettings};

pub const RAW_SUITE: &str = "raw_housing_data";
pub const TEST_SUITE: &str = "test_housing_data";
pub const ENGINEERED_SUITE: &str = "engineered_housing_features";
pub const PREPROCESSED_SUITE: &str = "preprocessed_housing_features";
pub const MONITORING_SUITE: &str = "api_housing_data";

fn expected_columns(derived: &[&'static str], include_target: bool) -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = FEATURES.to_vec();
    columns.extend_from_slice(derived);
    if include_target {
        columns.push(TARGET);
    }
    columns
}

/// Rules for raw CSV input.
///
/// Covers column presence (extra columns allowed), declared types, value
/// ranges, non-null core inputs and the year ordering constraints.
/// `include_target` adds the `SalePrice` type and range rules.
pub fn raw_data_suite(name: &str, include_target: bool, settings: &ValidationSettings) -> Suite {
    let current_year = settings.resolved_current_year() as f64;

    let mut types = vec![RuleBuilder::of_type(LOT_AREA, ExpectedType::Float).build()];
    types.extend(
        [YEAR_BUILT, YEAR_REMOD_ADD, YEAR_SOLD, OVERALL_QUAL, OVERALL_COND]
            .into_iter()
            .map(|column| RuleBuilder::of_type(column, ExpectedType::Integer).build()),
    );

    let ranges = vec![
        RuleBuilder::between(LOT_AREA, settings.lot_area_min, settings.lot_area_max)
            .mostly(settings.outlier_tolerance)
            .build(),
        RuleBuilder::between(YEAR_BUILT, settings.year_built_min, current_year).build(),
        RuleBuilder::between(YEAR_REMOD_ADD, settings.year_built_min, current_year).build(),
        RuleBuilder::between(YEAR_SOLD, settings.year_sold_min, current_year).build(),
        RuleBuilder::between(OVERALL_QUAL, settings.quality_min, settings.quality_max).build(),
        RuleBuilder::between(OVERALL_COND, settings.quality_min, settings.quality_max).build(),
    ];

    let not_null = [LOT_AREA, YEAR_BUILT, YEAR_REMOD_ADD, OVERALL_QUAL, OVERALL_COND]
        .into_iter()
        .map(|column| RuleBuilder::not_null(column).build());

    Suite::builder(name)
        .description("Raw housing data as loaded from CSV")
        .rule(
            RuleBuilder::column_set(expected_columns(&[], include_target), ColumnSetMode::Subset)
                .build(),
        )
        .rules(types)
        .rule_if(include_target, || {
            RuleBuilder::of_type(TARGET, ExpectedType::Float).build()
        })
        .rules(ranges)
        .rule_if(include_target, || {
            RuleBuilder::between(TARGET, settings.sale_price_min, settings.sale_price_max)
                .mostly(settings.outlier_tolerance)
                .build()
        })
        .rules(not_null)
        .rule(RuleBuilder::pair_gte(YEAR_REMOD_ADD, YEAR_BUILT).build())
        .rule(RuleBuilder::pair_gte(YEAR_SOLD, YEAR_BUILT).build())
        .rule(RuleBuilder::pair_gte(YEAR_SOLD, YEAR_REMOD_ADD).build())
        .build()
}

/// Rules for the output of feature engineering.
///
/// Checks that `LotAge` and `YearsSinceRemod` are present, non-null and in
/// range (`-1` marks a house that was never remodeled). With
/// `derivation_checks`, the derived values are also recomputed from the year
/// columns and compared.
pub fn engineered_features_suite(
    name: &str,
    include_target: bool,
    derivation_checks: bool,
    settings: &ValidationSettings,
) -> Suite {
    let columns = expected_columns(&[LOT_AGE, YEARS_SINCE_REMOD], include_target);

    Suite::builder(name)
        .description("Engineered housing features")
        .rule(RuleBuilder::column_set(columns, ColumnSetMode::Subset).build())
        .rule(
            RuleBuilder::custom(BOUNDED_AGE, LOT_AGE)
                .param("max_age", settings.max_age)
                .build(),
        )
        .rule(RuleBuilder::not_null(LOT_AGE).build())
        .rule(
            RuleBuilder::between(YEARS_SINCE_REMOD, NEVER_REMODELED as f64, settings.max_age)
                .build(),
        )
        .rule(RuleBuilder::not_null(YEARS_SINCE_REMOD).build())
        .rules(if derivation_checks {
            derivation_rules()
        } else {
            Vec::new()
        })
        .build()
}

/// Recomputes both derived columns from the year columns.
pub fn derivation_rules() -> Vec<Rule> {
    vec![
        RuleBuilder::custom(DERIVED_AGE_CONSISTENCY, LOT_AGE).build(),
        RuleBuilder::custom(DERIVED_REMODEL_CONSISTENCY, YEARS_SINCE_REMOD).build(),
    ]
}

/// Table-level rules for model-ready features.
///
/// Feature names are not known ahead of time, so only the shape is checked.
/// Missing and non-finite values are caught by a separate scan.
/// An `expected_feature_count` of zero is treated as unknown.
pub fn preprocessed_features_suite(
    name: &str,
    expected_feature_count: Option<usize>,
    settings: &ValidationSettings,
) -> Suite {
    Suite::builder(name)
        .description("Model-ready feature matrix")
        .rule(
            RuleBuilder::row_count_between(
                Some(settings.preprocessed_min_rows),
                Some(settings.preprocessed_max_rows),
            )
            .build(),
        )
        .rules(
            expected_feature_count
                .filter(|&count| count > 0)
                .map(|count| RuleBuilder::column_count_equal(count).build()),
        )
        .build()
}

/// A permissive subset of the raw rules for live requests.
pub fn monitoring_suite(name: &str, settings: &ValidationSettings) -> Suite {
    let latest_year = (settings.resolved_current_year() + settings.monitoring_future_years) as f64;

    Suite::builder(name)
        .description("Lightweight checks for prediction requests")
        .rule(RuleBuilder::between(LOT_AREA, 0.0, settings.monitoring_lot_area_max).build())
        .rule(RuleBuilder::between(YEAR_BUILT, settings.year_built_min, latest_year).build())
        .rule(RuleBuilder::between(OVERALL_QUAL, settings.quality_min, settings.quality_max).build())
        .rule(RuleBuilder::between(OVERALL_COND, settings.quality_min, settings.quality_max).build())
        .build()
}
