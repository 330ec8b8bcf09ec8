//! # Expectations Validator
//!
//! Execution engine for declarative tabular validation. This crate provides:
//!
//! - Rule evaluation for every [`Expectation`](expectations_core::Expectation) kind
//! - A registry of named custom predicates (derived-value consistency checks)
//! - Suite factories for the raw, engineered, preprocessed and monitoring stages
//! - The [`Validator`] engine, sequential or parallel across rules
//! - [`StageValidator`] wrappers with blocking and monitoring semantics
//! - Conversion from Arrow `RecordBatch`
//!
//! ## Example
//!
//! ```rust
//! use expectations_core::{Batch, ValidationSettings};
//! use expectations_validator::StageValidator;
//!
//! let batch = Batch::builder()
//!     .column("LotArea", [8450, 9600, 11250])
//!     .column("YearBuilt", [2003, 1976, 2001])
//!     .column("YearRemodAdd", [2003, 1976, 2002])
//!     .column("YrSold", [2008, 2007, 2008])
//!     .column("OverallQual", [7, 6, 7])
//!     .column("OverallCond", [5, 8, 5])
//!     .column("SalePrice", [208500, 181500, 223500])
//!     .build()
//!     .unwrap();
//!
//! let stages = StageValidator::new(ValidationSettings::new().with_current_year(2010));
//! let result = stages.validate_raw(&batch, true, true).unwrap();
//! assert!(result.success);
//! println!("{}", result);
//! ```

mod arrow;
mod engine;
mod error;
mod evaluate;
mod hygiene;
mod predicates;
mod stages;
mod suites;

pub use arrow::*;
pub use engine::*;
pub use error::*;
pub use evaluate::*;
pub use hygiene::*;
pub use predicates::*;
pub use stages::*;
pub use suites::*;
