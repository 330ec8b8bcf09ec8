//! Columnar batch representation for validation.
//!
//! A [`Batch`] is an in-memory, row-aligned table with uniquely named columns.
//! Rules read columns by name; table-level rules read the row and column counts.

use crate::BatchError;
use std::collections::HashSet;
use std::fmt;

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Null/missing value
    Null,
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// String value
    String(String),
}

impl DataValue {
    /// Returns true if this value is null or a floating NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Returns true for numeric values that are infinite.
    pub fn is_infinite(&self) -> bool {
        matches!(self, DataValue::Float(f) if f.is_infinite())
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Int(_) => "int64",
            DataValue::Float(_) => "float64",
            DataValue::Bool(_) => "boolean",
            DataValue::String(_) => "string",
        }
    }

    /// Attempts to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get this value as a float. Integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(v) => write!(f, "{}", v),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::String(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Int(i)
    }
}

impl From<i32> for DataValue {
    fn from(i: i32) -> Self {
        DataValue::Int(i as i64)
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DataValue::Null, Into::into)
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<DataValue>,
}

impl Column {
    /// Creates a column from any values convertible to [`DataValue`].
    pub fn new<V: Into<DataValue>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[DataValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&DataValue> {
        self.values.get(row)
    }
}

/// A row-aligned table of named columns.
///
/// Column names are unique and every column has the same number of rows.
/// Both properties are checked on construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    columns: Vec<Column>,
    row_count: usize,
}

impl Batch {
    /// Creates a new empty batch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a batch from columns, checking name uniqueness and row alignment.
    pub fn new(columns: Vec<Column>) -> Result<Self, BatchError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(BatchError::DuplicateColumn(column.name.clone()));
            }
        }

        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(BatchError::LengthMismatch {
                column: bad.name.clone(),
                expected: row_count,
                actual: bad.len(),
            });
        }

        Ok(Self { columns, row_count })
    }

    /// Starts a [`BatchBuilder`].
    pub fn builder() -> BatchBuilder {
        BatchBuilder::default()
    }

    /// Builds a batch from row-major data with a shared header.
    pub fn from_rows(names: &[String], rows: Vec<Vec<DataValue>>) -> Result<Self, BatchError> {
        let mut columns: Vec<Vec<DataValue>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(BatchError::RowWidth {
                    row: row_idx,
                    expected: names.len(),
                    actual: row.len(),
                });
            }
            for (slot, value) in columns.iter_mut().zip(row) {
                slot.push(value);
            }
        }

        Self::new(
            names
                .iter()
                .zip(columns)
                .map(|(name, values)| Column {
                    name: name.clone(),
                    values,
                })
                .collect(),
        )
    }

    /// Builds a batch from a numeric matrix, naming columns `feature_0..feature_n`.
    pub fn from_matrix(rows: &[Vec<f64>]) -> Result<Self, BatchError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let names: Vec<String> = (0..width).map(|i| format!("feature_{}", i)).collect();
        let rows = rows
            .iter()
            .map(|row| row.iter().copied().map(DataValue::Float).collect())
            .collect();
        Self::from_rows(&names, rows)
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the batch has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns true if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Returns the column names in batch order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns an iterator over the columns.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Returns a copy with `name` replaced, or appended when absent.
    pub fn with_column(&self, column: Column) -> Result<Self, BatchError> {
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(slot) => *slot = column,
            None => columns.push(column),
        }
        Self::new(columns)
    }

    /// Returns a copy without the named column.
    pub fn without_column(&self, name: &str) -> Self {
        let columns: Vec<Column> = self.columns.iter().filter(|c| c.name != name).cloned().collect();
        let row_count = if columns.is_empty() { 0 } else { self.row_count };
        Self { columns, row_count }
    }

    /// Takes the first `size` rows.
    ///
    /// If `size` is greater than the number of rows, returns all rows.
    pub fn head(&self, size: usize) -> Batch {
        let take = size.min(self.row_count);
        Batch {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values[..take].to_vec(),
                })
                .collect(),
            row_count: take,
        }
    }
}

/// Fluent builder for a [`Batch`].
///
/// ```rust
/// use expectations_core::Batch;
///
/// let batch = Batch::builder()
///     .column("LotArea", [8450.0, 9600.0])
///     .column("YearBuilt", [2003, 1976])
///     .build()
///     .unwrap();
/// assert_eq!(batch.row_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct BatchBuilder {
    columns: Vec<Column>,
}

impl BatchBuilder {
    /// Appends a column.
    pub fn column<V: Into<DataValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.columns.push(Column::new(name, values));
        self
    }

    pub fn build(self) -> Result<Batch, BatchError> {
        Batch::new(self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_value_types() {
        assert_eq!(DataValue::Null.type_name(), "null");
        assert_eq!(DataValue::String("test".into()).type_name(), "string");
        assert_eq!(DataValue::Int(42).type_name(), "int64");
        assert_eq!(DataValue::Float(3.5).type_name(), "float64");
        assert_eq!(DataValue::Bool(true).type_name(), "boolean");
    }

    #[test]
    fn test_missing_includes_nan() {
        assert!(DataValue::Null.is_missing());
        assert!(DataValue::Float(f64::NAN).is_missing());
        assert!(!DataValue::Float(f64::INFINITY).is_missing());
        assert!(DataValue::Float(f64::NEG_INFINITY).is_infinite());
        assert!(!DataValue::Int(0).is_missing());
    }

    #[test]
    fn test_data_value_conversions() {
        let val = DataValue::Int(42);
        assert_eq!(val.as_int(), Some(42));
        assert_eq!(val.as_float(), Some(42.0));
        assert_eq!(val.as_string(), None);

        assert_eq!(DataValue::from(None::<i64>), DataValue::Null);
        assert_eq!(DataValue::from(Some(2.5)), DataValue::Float(2.5));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Batch::builder()
            .column("a", [1, 2])
            .column("a", [3, 4])
            .build()
            .unwrap_err();
        assert!(matches!(err, BatchError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Batch::builder()
            .column("a", [1, 2])
            .column("b", [3])
            .build()
            .unwrap_err();
        assert!(matches!(err, BatchError::LengthMismatch { actual: 1, .. }));
    }

    #[test]
    fn test_from_rows_and_lookup() {
        let names = vec!["x".to_string(), "y".to_string()];
        let batch = Batch::from_rows(
            &names,
            vec![
                vec![DataValue::Int(1), DataValue::from("a")],
                vec![DataValue::Int(2), DataValue::Null],
            ],
        )
        .unwrap();

        assert_eq!(batch.row_count(), 2);
        assert_eq!(batch.column_count(), 2);
        assert_eq!(batch.column("y").unwrap().get(1), Some(&DataValue::Null));
        assert!(!batch.has_column("z"));
    }

    #[test]
    fn test_from_rows_rejects_ragged_row() {
        let names = vec!["x".to_string()];
        let err = Batch::from_rows(&names, vec![vec![DataValue::Int(1), DataValue::Int(2)]])
            .unwrap_err();
        assert!(matches!(err, BatchError::RowWidth { row: 0, .. }));
    }

    #[test]
    fn test_from_matrix_names_features() {
        let batch = Batch::from_matrix(&[vec![0.1, 0.2, 0.3], vec![1.0, 2.0, 3.0]]).unwrap();
        let names: Vec<&str> = batch.column_names().collect();
        assert_eq!(names, vec!["feature_0", "feature_1", "feature_2"]);
        assert_eq!(batch.row_count(), 2);
    }

    #[test]
    fn test_head() {
        let batch = Batch::builder().column("id", 0..10i64).build().unwrap();

        assert_eq!(batch.head(5).row_count(), 5);
        assert_eq!(batch.head(100).row_count(), 10); // Only has 10 rows
    }

    #[test]
    fn test_with_and_without_column() {
        let batch = Batch::builder().column("a", [1, 2]).build().unwrap();
        let replaced = batch.with_column(Column::new("a", [5, 6])).unwrap();
        assert_eq!(replaced.column("a").unwrap().get(0), Some(&DataValue::Int(5)));

        let added = batch.with_column(Column::new("b", [true, false])).unwrap();
        assert_eq!(added.column_count(), 2);
        assert_eq!(added.without_column("b"), batch);
    }
}
