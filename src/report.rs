//! Text rendering of stage results.
//!
//! Report-only stages print the matched rows; removal stages print how many
//! rows were dropped.

use crate::cleaning::{ColumnCount, Findings, Removal, Stage};
use std::io::{self, Write};

fn write_distribution(out: &mut dyn Write, distribution: &[ColumnCount]) -> io::Result<()> {
    let width = distribution
        .iter()
        .map(|c| c.column.chars().count())
        .max()
        .unwrap_or(0);
    for entry in distribution {
        writeln!(out, "{:<width$}    {}", entry.column, entry.count)?;
    }
    Ok(())
}

/// Render a report-only stage.
///
/// # Errors
///
/// Propagates write failures on `out`.
pub fn write_findings(out: &mut dyn Write, stage: Stage, findings: &Findings) -> io::Result<()> {
    match stage {
        Stage::Duplicates => {
            writeln!(out, "Number of duplicated entries: {}", findings.count())?;
        }
        Stage::Missing => {
            writeln!(out, "Number of NaN entries: {}", findings.count())?;
            writeln!(out, "NaN distribution:")?;
            write_distribution(out, &findings.distribution)?;
            writeln!(out)?;
            writeln!(out, "Dataframe with NaN")?;
            writeln!(out, "{}", findings.rows)?;
        }
        Stage::Blank => {
            writeln!(out, "Number of empty entries: {}", findings.count())?;
            writeln!(out, "Empty entries distribution:")?;
            write_distribution(out, &findings.distribution)?;
            writeln!(out)?;
            writeln!(out, "Dataframe with empty entries")?;
            writeln!(out, "{}", findings.rows)?;
        }
    }
    writeln!(out)
}

/// Render a removal stage.
///
/// # Errors
///
/// Propagates write failures on `out`.
pub fn write_removal(out: &mut dyn Write, stage: Stage, removal: &Removal) -> io::Result<()> {
    let (title, message) = match stage {
        Stage::Duplicates => ("DUPLICATED ENTRIES", "duplicated rows have been deleted."),
        Stage::Missing => ("NaN ENTRIES", "rows with NaN entries have been deleted."),
        Stage::Blank => ("EMPTY ENTRIES", "rows with empty entries have been deleted."),
    };
    writeln!(out, "----- {title} -----")?;
    writeln!(out, "{} {message}", removal.dropped)?;
    writeln!(out)
}
