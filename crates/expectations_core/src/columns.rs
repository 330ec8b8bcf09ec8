//! Column names shared with the feature-engineering and training stages.

/// Prediction target.
pub const TARGET: &str = "SalePrice";

pub const LOT_AREA: &str = "LotArea";
pub const YEAR_BUILT: &str = "YearBuilt";
pub const YEAR_REMOD_ADD: &str = "YearRemodAdd";
pub const YEAR_SOLD: &str = "YrSold";
pub const OVERALL_QUAL: &str = "OverallQual";
pub const OVERALL_COND: &str = "OverallCond";

/// Raw input features, in model order.
pub const FEATURES: [&str; 6] = [
    LOT_AREA,
    YEAR_BUILT,
    YEAR_REMOD_ADD,
    YEAR_SOLD,
    OVERALL_QUAL,
    OVERALL_COND,
];

/// Derived: `YrSold - YearBuilt`.
pub const LOT_AGE: &str = "LotAge";

/// Derived: `YrSold - YearRemodAdd`, or [`NEVER_REMODELED`].
pub const YEARS_SINCE_REMOD: &str = "YearsSinceRemod";

/// Sentinel for houses whose remodel year equals the build year.
pub const NEVER_REMODELED: i64 = -1;
