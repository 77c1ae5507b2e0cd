//! The cleaning run: load, inspect, apply the stages in order, write.
//!
//! ```text
//! data file ──load──▶ table ──▶ duplicates ──▶ missing ──▶ blank ──▶ <stem>_prepared.csv
//! rules file ─load──▶ RulesTable (validated and indexed, not applied)
//! ```
//!
//! Each stage either reports the rows it matches or removes them, depending
//! on [`StageFlags`]. A removal stage's output is the next stage's input.

use crate::cleaning::Stage;
use crate::config::{PrepConfig, StageFlags};
use crate::error::Result;
use crate::inspect::TableInfo;
use crate::io::{load_table, save_table};
use crate::report::{write_findings, write_removal};
use crate::rules::RulesTable;
use polars::prelude::DataFrame;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What a stage did to the working table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Rows were only reported; the table passed through unchanged.
    Reported { count: usize },
    /// Rows were dropped from the table.
    Removed { dropped: usize },
}

/// Per-stage outcomes, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub stages: Vec<(Stage, StageOutcome)>,
}

impl CleaningReport {
    pub fn outcome(&self, stage: Stage) -> Option<StageOutcome> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, outcome)| *outcome)
    }

    /// Total rows dropped by removal stages.
    pub fn dropped(&self) -> usize {
        self.stages
            .iter()
            .map(|(_, outcome)| match outcome {
                StageOutcome::Removed { dropped } => *dropped,
                StageOutcome::Reported { .. } => 0,
            })
            .sum()
    }
}

/// Apply the three stages to an in-memory table.
///
/// Report text for every stage is written to `out`. Returns the final working
/// table with the per-stage outcomes.
///
/// # Errors
///
/// Fails if a stage cannot evaluate its predicate or `out` cannot be written.
pub fn clean_table(
    table: DataFrame,
    flags: &StageFlags,
    out: &mut dyn Write,
) -> Result<(DataFrame, CleaningReport)> {
    let mut working = table;
    let mut report = CleaningReport::default();

    for stage in Stage::ORDER {
        let outcome = if flags.removes(stage) {
            let removal = stage.remove(&working)?;
            write_removal(out, stage, &removal)?;
            let dropped = removal.dropped;
            working = removal.table;
            StageOutcome::Removed { dropped }
        } else {
            let findings = stage.find(&working)?;
            write_findings(out, stage, &findings)?;
            StageOutcome::Reported {
                count: findings.count(),
            }
        };
        tracing::info!(%stage, ?outcome, rows = working.height(), "stage finished");
        report.stages.push((stage, outcome));
    }

    Ok((working, report))
}

/// Report generated after a cleaning run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Rows in the data file
    pub rows_before: usize,

    /// Rows written to the prepared file
    pub rows_after: usize,

    pub columns: usize,

    /// Number of indexed rules
    pub rules: usize,

    pub cleaning: CleaningReport,

    pub output_path: PathBuf,

    pub duration: Duration,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "Prepared {} of {} rows, {} columns, {} rules loaded, written to {} in {:.2}s",
            self.rows_after,
            self.rows_before,
            self.columns,
            self.rules,
            self.output_path.display(),
            self.duration.as_secs_f64()
        )
    }
}

/// Run the whole cleaning pipeline described by `config`.
///
/// The inspector summary and stage reports are written to `out`.
///
/// # Errors
///
/// Returns the first loader, stage or writer error; nothing is written to
/// the output path unless every earlier step succeeded.
pub fn run(config: &PrepConfig, out: &mut dyn Write) -> Result<RunReport> {
    let start = Instant::now();

    let table = load_table(&config.data_path, &config.data)?;
    let rules = RulesTable::load(&config.rules_path, &config.rules)?;

    if config.output_separator != config.data.separator {
        tracing::warn!(
            input = %config.data.separator,
            output = %config.output_separator,
            "prepared file uses a different separator than the data file"
        );
    }

    let info = TableInfo::of(&table);
    writeln!(out, "{info}")?;
    writeln!(out)?;

    let (mut cleaned, cleaning) = clean_table(table, &config.flags, out)?;

    let output_path = config.resolved_output_path();
    save_table(&mut cleaned, &output_path, config.output_separator)?;

    let report = RunReport {
        rows_before: info.rows,
        rows_after: cleaned.height(),
        columns: info.width(),
        rules: rules.len(),
        cleaning,
        output_path,
        duration: start.elapsed(),
    };
    tracing::info!("{}", report.summary());
    Ok(report)
}
