//! DataLens: interactive tabular data cleansing, profiling, and prediction.
//!
//! The crate is the engine behind a data-cleaning UI: load a CSV (or JSON)
//! into a [`Table`], wrap it in a [`LazyFrame`], run a configurable
//! [`Cleaner`] pipeline over it, materialize the result for display or
//! export, profile it as HTML, and train a [`PredictionPipeline`] on it.
//!
//! ```no_run
//! use datalens::{materialize, CleanStage, Cleaner, LazyFrame, MissingPolicy};
//!
//! # fn main() -> datalens::Result<()> {
//! let table = datalens::read_csv("people.csv")?;
//! let cleaner = Cleaner::new()
//!     .with_stage(CleanStage::HandleMissing(MissingPolicy::replace_defaults()))
//!     .with_stage(CleanStage::Dedup { subset: None });
//! let cleaned = cleaner.apply(LazyFrame::new(table))?;
//! let result = materialize(cleaned)?;
//! let bytes = datalens::to_csv_bytes(&result.table)?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

// Core data model
pub mod column;
pub mod frame;

// Cleaning core
pub mod classify;
pub mod clean;

// I/O and reporting
pub mod io;
pub mod profile;
pub mod stats;

// Machine learning
pub mod ml;

// Ambient concerns
pub mod config;
pub mod error;

// Re-export core types
pub use column::{
    Cell, Column, ColumnType, DatetimeColumn, Float64Column, Int64Column, NestedColumn,
    StringColumn,
};
pub use error::{Error, Result};
pub use frame::lazy::{LazyFrame, Operation};
pub use frame::materialize::{materialize, Materialized};
pub use frame::Table;

// Cleaning pipeline
pub use classify::{classify_frame, classify_table, ColumnKind};
pub use clean::filter::{date_bounds, numeric_bounds, FilterPredicate, RowFilter};
pub use clean::{CleanStage, Cleaner, MissingPolicy};

// I/O and reporting
pub use io::csv::{read_csv, read_csv_from_reader, to_csv_bytes, write_csv, write_csv_path};
pub use io::json::read_json;
pub use profile::{ColumnSummary, ProfileReport};
pub use stats::{describe, DescriptiveStats};

// Machine learning
pub use ml::metrics::classification::{
    accuracy_score, f1_score, f1_weighted, precision_score, recall_score,
};
pub use ml::metrics::regression::{mean_absolute_error, mean_squared_error, r2_score};
pub use ml::{
    impute_for_training, infer_task, train_and_eval, train_and_eval_with, train_test_split,
    ModelRegistry, Prediction, PredictionPipeline, Preprocessor, RandomForest, Task, TrainOutcome,
};

// Ambient concerns
pub use config::Settings;

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
