//! # csvprep entry point
//!
//! ```text
//! main()
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Initialize logging (tracing)
//!   └─> Run the cleaning pipeline, report on stdout
//! ```
//!
//! Any error ends the process with a non-zero status and the error chain on
//! stderr.

#![warn(clippy::all, rust_2018_idioms)]

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    csvprep::logging::init(cli.verbose, cli.log_dir.as_deref())?;
    cli::run(&cli)
}
