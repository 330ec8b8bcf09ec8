//! Business bounds used by the stage suites.
//!
//! Every field has a default, so a settings file only needs the values it
//! overrides.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Tunable bounds and thresholds for the stage suite factories.
///
/// # Example
///
/// ```rust
/// use expectations_core::ValidationSettings;
///
/// let settings = ValidationSettings::new().with_current_year(2010);
/// assert_eq!(settings.resolved_current_year(), 2010);
/// assert_eq!(settings.max_age, 200.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Upper bound for year columns; `None` uses the system clock
    pub current_year: Option<i32>,

    pub lot_area_min: f64,
    pub lot_area_max: f64,

    pub sale_price_min: f64,
    pub sale_price_max: f64,

    /// `mostly` applied to the lot-area and sale-price range rules
    pub outlier_tolerance: f64,

    pub year_built_min: f64,
    pub year_sold_min: f64,

    pub quality_min: f64,
    pub quality_max: f64,

    /// Oldest plausible house, in years
    pub max_age: f64,

    pub preprocessed_min_rows: usize,
    pub preprocessed_max_rows: usize,

    pub monitoring_lot_area_max: f64,
    /// Years past `current_year` tolerated by the monitoring suite
    pub monitoring_future_years: i32,

    /// Worker threads for rule evaluation; 1 evaluates sequentially
    pub parallelism: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            current_year: None,
            lot_area_min: 1000.0,
            lot_area_max: 250_000.0,
            sale_price_min: 10_000.0,
            sale_price_max: 1_000_000.0,
            outlier_tolerance: 0.95,
            year_built_min: 1800.0,
            year_sold_min: 2000.0,
            quality_min: 1.0,
            quality_max: 10.0,
            max_age: 200.0,
            preprocessed_min_rows: 10,
            preprocessed_max_rows: 10_000,
            monitoring_lot_area_max: 1_000_000.0,
            monitoring_future_years: 1,
            parallelism: 1,
        }
    }
}

impl ValidationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the current year instead of reading the clock.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers.max(1);
        self
    }

    /// The configured year, or the current UTC year.
    pub fn resolved_current_year(&self) -> i32 {
        self.current_year
            .unwrap_or_else(|| chrono::Utc::now().year())
    }
}
