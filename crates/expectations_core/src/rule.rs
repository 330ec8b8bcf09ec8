//! Rule (expectation) definitions.
//!
//! A [`Rule`] pairs an [`Expectation`], the kind-specific check with its
//! parameters, with a name and a `mostly` tolerance. Rules are plain data:
//! evaluation lives in the validator crate.

use crate::DataValue;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

/// Default tolerance: every evaluated row must pass.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// Declared runtime type for a type-match rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedType {
    /// 64-bit integers only
    #[serde(alias = "int64", alias = "int")]
    Integer,
    /// Any numeric value; integers are valid floats
    #[serde(alias = "float64", alias = "numeric")]
    Float,
    /// String values
    String,
    /// Boolean values
    #[serde(alias = "bool")]
    Boolean,
}

impl ExpectedType {
    /// Returns true if a non-null value satisfies this type.
    pub fn matches(&self, value: &DataValue) -> bool {
        match self {
            ExpectedType::Integer => matches!(value, DataValue::Int(_)),
            ExpectedType::Float => matches!(value, DataValue::Float(_) | DataValue::Int(_)),
            ExpectedType::String => matches!(value, DataValue::String(_)),
            ExpectedType::Boolean => matches!(value, DataValue::Bool(_)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectedType::Integer => "int64",
            ExpectedType::Float => "float64",
            ExpectedType::String => "string",
            ExpectedType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matching policy for a column-set rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSetMode {
    /// Batch columns must equal the expected set
    Exact,
    /// Expected columns must be present; extra columns are allowed
    #[default]
    Subset,
}

/// The closed catalog of rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    NotNull,
    TypeMatch,
    ValueBetween,
    ColumnPairGte,
    ColumnSetMatch,
    RowCountBetween,
    ColumnCountEqual,
    CustomPredicate,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::NotNull => "not_null",
            RuleKind::TypeMatch => "type_match",
            RuleKind::ValueBetween => "value_between",
            RuleKind::ColumnPairGte => "column_pair_gte",
            RuleKind::ColumnSetMatch => "column_set_match",
            RuleKind::RowCountBetween => "row_count_between",
            RuleKind::ColumnCountEqual => "column_count_equal",
            RuleKind::CustomPredicate => "custom_predicate",
        }
    }

    /// Table-level kinds produce one aggregate outcome instead of per-row results.
    pub fn is_table_level(&self) -> bool {
        matches!(
            self,
            RuleKind::ColumnSetMatch | RuleKind::RowCountBetween | RuleKind::ColumnCountEqual
        )
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A check and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expectation {
    /// Column values must not be missing
    NotNull { column: String },

    /// Column values must have the declared runtime type
    TypeMatch {
        column: String,
        expected: ExpectedType,
    },

    /// Column values must lie in `[min, max]`; an absent bound is open
    ValueBetween {
        column: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },

    /// Row-wise `column_a >= column_b`
    ColumnPairGte { column_a: String, column_b: String },

    /// Batch column names compared to an expected set
    ColumnSetMatch {
        columns: Vec<String>,
        #[serde(default)]
        mode: ColumnSetMode,
    },

    /// Batch row count within `[min, max]`
    RowCountBetween {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },

    /// Batch column count equals `value`
    ColumnCountEqual { value: usize },

    /// A registered business predicate applied to `column`
    CustomPredicate {
        predicate: String,
        column: String,
        #[serde(default)]
        params: BTreeMap<String, f64>,
    },
}

impl Expectation {
    pub fn kind(&self) -> RuleKind {
        match self {
            Expectation::NotNull { .. } => RuleKind::NotNull,
            Expectation::TypeMatch { .. } => RuleKind::TypeMatch,
            Expectation::ValueBetween { .. } => RuleKind::ValueBetween,
            Expectation::ColumnPairGte { .. } => RuleKind::ColumnPairGte,
            Expectation::ColumnSetMatch { .. } => RuleKind::ColumnSetMatch,
            Expectation::RowCountBetween { .. } => RuleKind::RowCountBetween,
            Expectation::ColumnCountEqual { .. } => RuleKind::ColumnCountEqual,
            Expectation::CustomPredicate { .. } => RuleKind::CustomPredicate,
        }
    }

    /// Columns the rule reads row values from. Table-level rules target none.
    pub fn target_columns(&self) -> Vec<&str> {
        match self {
            Expectation::NotNull { column }
            | Expectation::TypeMatch { column, .. }
            | Expectation::ValueBetween { column, .. }
            | Expectation::CustomPredicate { column, .. } => vec![column.as_str()],
            Expectation::ColumnPairGte { column_a, column_b } => {
                vec![column_a.as_str(), column_b.as_str()]
            }
            Expectation::ColumnSetMatch { .. }
            | Expectation::RowCountBetween { .. }
            | Expectation::ColumnCountEqual { .. } => Vec::new(),
        }
    }

    /// Kind-specific parameters as JSON, for failure reports.
    pub fn parameters(&self) -> serde_json::Value {
        match self {
            Expectation::NotNull { .. } | Expectation::ColumnPairGte { .. } => json!({}),
            Expectation::TypeMatch { expected, .. } => json!({ "expected": expected.as_str() }),
            Expectation::ValueBetween { min, max, .. } => json!({ "min": min, "max": max }),
            Expectation::ColumnSetMatch { columns, mode } => {
                json!({ "columns": columns, "mode": mode })
            }
            Expectation::RowCountBetween { min, max } => json!({ "min": min, "max": max }),
            Expectation::ColumnCountEqual { value } => json!({ "value": value }),
            Expectation::CustomPredicate {
                predicate, params, ..
            } => json!({ "predicate": predicate, "params": params }),
        }
    }

    fn default_name(&self) -> String {
        let targets = self.target_columns();
        if targets.is_empty() {
            self.kind().to_string()
        } else {
            format!("{}:{}", self.kind(), targets.join(","))
        }
    }
}

/// A named expectation with a `mostly` tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name, unique within a suite by convention
    #[serde(default)]
    pub name: String,

    /// The check and its parameters
    #[serde(flatten)]
    pub expectation: Expectation,

    /// Minimum fraction of rows that must pass, in `[0, 1]`
    #[serde(default = "default_tolerance", rename = "mostly")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Rule {
    /// Creates a rule with the default name and tolerance.
    pub fn new(expectation: Expectation) -> Self {
        Self {
            name: expectation.default_name(),
            expectation,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.expectation.kind()
    }

    pub fn target_columns(&self) -> Vec<&str> {
        self.expectation.target_columns()
    }

    /// Fills in a derived name for rules deserialized without one.
    pub(crate) fn normalized(mut self) -> Self {
        if self.name.trim().is_empty() {
            self.name = self.expectation.default_name();
        }
        self
    }
}

/// Fluent constructors for the rule catalog.
///
/// # Example
///
/// ```rust
/// use expectations_core::{RuleBuilder, RuleKind};
///
/// let rule = RuleBuilder::between("LotArea", 1000.0, 250000.0)
///     .mostly(0.95)
///     .build();
/// assert_eq!(rule.kind(), RuleKind::ValueBetween);
/// assert_eq!(rule.tolerance, 0.95);
/// ```
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    name: Option<String>,
    expectation: Expectation,
    tolerance: f64,
}

impl RuleBuilder {
    /// Starts from an arbitrary expectation.
    pub fn new(expectation: Expectation) -> Self {
        Self {
            name: None,
            expectation,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Self::new(Expectation::NotNull {
            column: column.into(),
        })
    }

    pub fn of_type(column: impl Into<String>, expected: ExpectedType) -> Self {
        Self::new(Expectation::TypeMatch {
            column: column.into(),
            expected,
        })
    }

    /// Inclusive range check on both ends.
    pub fn between(column: impl Into<String>, min: f64, max: f64) -> Self {
        Self::new(Expectation::ValueBetween {
            column: column.into(),
            min: Some(min),
            max: Some(max),
        })
    }

    /// `column_a >= column_b` for every row.
    pub fn pair_gte(column_a: impl Into<String>, column_b: impl Into<String>) -> Self {
        Self::new(Expectation::ColumnPairGte {
            column_a: column_a.into(),
            column_b: column_b.into(),
        })
    }

    pub fn column_set<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        mode: ColumnSetMode,
    ) -> Self {
        Self::new(Expectation::ColumnSetMatch {
            columns: columns.into_iter().map(Into::into).collect(),
            mode,
        })
    }

    pub fn row_count_between(min: Option<usize>, max: Option<usize>) -> Self {
        Self::new(Expectation::RowCountBetween { min, max })
    }

    pub fn column_count_equal(value: usize) -> Self {
        Self::new(Expectation::ColumnCountEqual { value })
    }

    /// A registered custom predicate applied to `column`.
    pub fn custom(predicate: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(Expectation::CustomPredicate {
            predicate: predicate.into(),
            column: column.into(),
            params: BTreeMap::new(),
        })
    }

    /// Sets a numeric parameter. Ignored for non-custom rules.
    pub fn param(mut self, key: impl Into<String>, value: f64) -> Self {
        if let Expectation::CustomPredicate { params, .. } = &mut self.expectation {
            params.insert(key.into(), value);
        }
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the `mostly` tolerance.
    pub fn mostly(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn build(self) -> Rule {
        Rule {
            name: self
                .name
                .unwrap_or_else(|| self.expectation.default_name()),
            expectation: self.expectation,
            tolerance: self.tolerance,
        }
    }
}
