//! # csvprep - delimited data cleaning
//!
//! csvprep loads a delimited data file into a polars [`DataFrame`], reports
//! (or removes) duplicate rows, rows with missing values and rows with blank
//! values, and writes the result to `<stem>_prepared.csv`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use csvprep::config::{PrepConfig, StageFlags};
//!
//! let mut config = PrepConfig::new("orders.csv", "rules.csv");
//! config.flags = StageFlags::all();
//!
//! let report = csvprep::pipeline::run(&config, &mut std::io::stdout())?;
//! assert_eq!(report.output_path.to_str(), Some("orders_prepared.csv"));
//! # Ok::<(), csvprep::error::PrepError>(())
//! ```
//!
//! ## Modules
//!
//! - [`io`]: loading delimited files and writing the prepared file
//! - [`rules`]: the `FIELD`-indexed rules table
//! - [`inspect`]: column names and shape of a table
//! - [`cleaning`]: the duplicate, missing-value and blank-value stages
//! - [`pipeline`]: running the stages in order over a working table
//! - [`report`]: report text for each stage
//! - [`config`]: separators, stage switches and the JSON config file
//! - [`error`]: the [`PrepError`](error::PrepError) type
//! - [`logging`]: tracing subscriber setup for the binary
//!
//! ## Missing versus blank
//!
//! A *missing* cell is a polars null; empty fields in the input are read as
//! null. A *blank* cell is a non-null cell whose text, trimmed, is empty.
//! A null cell is never blank, so the two stages match disjoint cells.
//!
//! [`DataFrame`]: polars::prelude::DataFrame

#![warn(clippy::all, rust_2018_idioms)]

pub mod cleaning;
pub mod config;
pub mod error;
pub mod inspect;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod rules;

pub use cleaning::{Findings, Removal, Stage};
pub use config::{PrepConfig, StageFlags};
pub use error::{PrepError, Result};
pub use pipeline::{RunReport, clean_table, run};
pub use rules::RulesTable;
