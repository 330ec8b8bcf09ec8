//! # Expectations Core
//!
//! Core data structures for declarative tabular validation.
//!
//! This crate holds the types shared by the validator, parser and CLI:
//!
//! - **Batch**: an in-memory, row-aligned table of named columns
//! - **Rule**: an atomic check (an [`Expectation`]) with a `mostly` tolerance
//! - **Suite**: a named, ordered collection of rules for one pipeline stage
//! - **ValidationResult**: success flag, rule statistics and failed-rule details
//!
//! ## Example
//!
//! ```rust
//! use expectations_core::{Batch, ColumnSetMode, RuleBuilder, Suite};
//!
//! let batch = Batch::builder()
//!     .column("YearBuilt", [2003, 1976])
//!     .column("YrSold", [2008, 2007])
//!     .build()
//!     .unwrap();
//!
//! let suite = Suite::builder("years")
//!     .rule(RuleBuilder::column_set(["YearBuilt", "YrSold"], ColumnSetMode::Subset).build())
//!     .rule(RuleBuilder::pair_gte("YrSold", "YearBuilt").build())
//!     .build();
//!
//! assert_eq!(batch.row_count(), 2);
//! assert_eq!(suite.rules().len(), 2);
//! ```

pub mod columns;
pub mod dataset;
pub mod error;
pub mod result;
pub mod rule;
pub mod settings;
pub mod suite;

pub use dataset::*;
pub use error::*;
pub use result::*;
pub use rule::*;
pub use settings::*;
pub use suite::*;
