//! Row-level cleaning stages: duplicates, missing values and blank values.
//!
//! Each stage has a `find_*` function that returns the offending rows
//! ([`Findings`]) and a `remove_*` function that returns the table without
//! them ([`Removal`]). The missing and blank stages filter with one boolean
//! row mask for both; the duplicate stage keeps first occurrences with polars'
//! stable `unique`, and reports every row that is not a first occurrence.
//! Surviving rows are never reordered.
//!
//! ```
//! use csvprep::cleaning::{find_duplicates, remove_duplicates};
//! use polars::prelude::*;
//!
//! let df = df!("a" => &[1, 1, 3], "b" => &[2, 2, 4])?;
//! assert_eq!(find_duplicates(&df)?.count(), 1);
//!
//! let removal = remove_duplicates(&df)?;
//! assert_eq!(removal.dropped, 1);
//! assert_eq!(removal.table.height(), 2);
//! # Ok::<(), csvprep::error::PrepError>(())
//! ```

use crate::error::Result;
use polars::prelude::*;
use std::fmt;

/// The three cleaning stages, in the order a run applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Duplicates,
    Missing,
    Blank,
}

impl Stage {
    pub const ORDER: [Self; 3] = [Self::Duplicates, Self::Missing, Self::Blank];

    /// Rows the stage would remove.
    ///
    /// # Errors
    ///
    /// Fails if polars cannot process the table.
    pub fn find(self, df: &DataFrame) -> Result<Findings> {
        match self {
            Self::Duplicates => find_duplicates(df),
            Self::Missing => find_missing(df),
            Self::Blank => find_blank(df),
        }
    }

    /// The table without the rows the stage matches.
    ///
    /// # Errors
    ///
    /// Fails if polars cannot process the table.
    pub fn remove(self, df: &DataFrame) -> Result<Removal> {
        match self {
            Self::Duplicates => remove_duplicates(df),
            Self::Missing => remove_missing(df),
            Self::Blank => remove_blank(df),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Duplicates => "duplicates",
            Self::Missing => "missing",
            Self::Blank => "blank",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of matching cells in one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCount {
    pub column: String,
    pub count: usize,
}

/// Rows matched by a stage, with a per-column breakdown where the stage has
/// one (missing and blank values).
#[derive(Debug, Clone)]
pub struct Findings {
    pub rows: DataFrame,
    pub distribution: Vec<ColumnCount>,
}

impl Findings {
    /// Number of matched rows.
    pub fn count(&self) -> usize {
        self.rows.height()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.height() == 0
    }
}

/// A filtered table and how many rows the filter dropped.
#[derive(Debug, Clone)]
pub struct Removal {
    pub table: DataFrame,
    pub dropped: usize,
}

/// Whether a cell's display string is empty once surrounding whitespace is
/// trimmed.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Every column cast to its display string. Nulls stay null.
fn display_columns(df: &DataFrame) -> Result<Vec<Series>> {
    df.get_columns()
        .iter()
        .map(|column| {
            column
                .as_materialized_series()
                .cast(&DataType::String)
                .map_err(Into::into)
        })
        .collect()
}

/// Row index column added while locating first occurrences.
const ROW_INDEX: &str = "__csvprep_row";

/// `true` for each row equal, across all columns, to an earlier row.
///
/// Nulls compare equal to nulls.
pub fn duplicate_mask(df: &DataFrame) -> Result<BooleanChunked> {
    if df.width() == 0 || df.height() == 0 {
        return Ok(BooleanChunked::full("duplicated".into(), false, df.height()));
    }

    let columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let firsts = df
        .with_row_index(ROW_INDEX.into(), None)?
        .unique_stable(Some(&columns), UniqueKeepStrategy::First, None)?;

    let mut flags = vec![true; df.height()];
    for row in firsts.column(ROW_INDEX)?.idx()?.iter().flatten() {
        flags[row as usize] = false;
    }
    Ok(BooleanChunked::from_slice("duplicated".into(), &flags))
}

/// `true` for each row holding at least one null, plus per-column null counts.
pub fn missing_mask(df: &DataFrame) -> (BooleanChunked, Vec<ColumnCount>) {
    let mut mask = BooleanChunked::full("missing".into(), false, df.height());
    let mut distribution = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        distribution.push(ColumnCount {
            column: column.name().to_string(),
            count: series.null_count(),
        });
        mask = &mask | &series.is_null();
    }

    (mask, distribution)
}

/// `true` for each row holding at least one blank cell, plus per-column blank
/// counts.
pub fn blank_mask(df: &DataFrame) -> Result<(BooleanChunked, Vec<ColumnCount>)> {
    let mut flags = vec![false; df.height()];
    let mut distribution = Vec::with_capacity(df.width());

    for (name, series) in df.get_column_names().into_iter().zip(display_columns(df)?) {
        let mut count = 0;
        for (flag, value) in flags.iter_mut().zip(series.str()?) {
            if value.is_some_and(is_blank) {
                *flag = true;
                count += 1;
            }
        }
        distribution.push(ColumnCount {
            column: name.to_string(),
            count,
        });
    }

    Ok((BooleanChunked::from_slice("blank".into(), &flags), distribution))
}

fn matching_rows(df: &DataFrame, mask: &BooleanChunked) -> Result<DataFrame> {
    Ok(df.filter(mask)?)
}

fn without_matching_rows(df: &DataFrame, mask: &BooleanChunked) -> Result<Removal> {
    let table = df.filter(&!mask)?;
    let dropped = df.height() - table.height();
    Ok(Removal { table, dropped })
}

/// Rows that repeat an earlier row; the first occurrence is not included.
///
/// # Errors
///
/// Fails if polars cannot group the table's rows.
pub fn find_duplicates(df: &DataFrame) -> Result<Findings> {
    let mask = duplicate_mask(df)?;
    Ok(Findings {
        rows: matching_rows(df, &mask)?,
        distribution: Vec::new(),
    })
}

/// Keep only the first occurrence of each distinct row, in input order.
///
/// # Errors
///
/// Fails if polars cannot group the table's rows.
pub fn remove_duplicates(df: &DataFrame) -> Result<Removal> {
    let removal = if df.width() == 0 || df.height() == 0 {
        Removal {
            table: df.clone(),
            dropped: 0,
        }
    } else {
        let table = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let dropped = df.height() - table.height();
        Removal { table, dropped }
    };
    tracing::debug!(dropped = removal.dropped, "duplicates removed");
    Ok(removal)
}

/// Rows with at least one missing cell, and missing counts per column.
///
/// # Errors
///
/// Fails if polars cannot filter the table.
pub fn find_missing(df: &DataFrame) -> Result<Findings> {
    let (mask, distribution) = missing_mask(df);
    Ok(Findings {
        rows: matching_rows(df, &mask)?,
        distribution,
    })
}

/// Keep only rows without missing cells.
///
/// # Errors
///
/// Fails if polars cannot filter the table.
pub fn remove_missing(df: &DataFrame) -> Result<Removal> {
    let (mask, _) = missing_mask(df);
    let removal = without_matching_rows(df, &mask)?;
    tracing::debug!(dropped = removal.dropped, "rows with missing values removed");
    Ok(removal)
}

/// Rows with at least one blank cell, and blank counts per column.
///
/// # Errors
///
/// Fails if a column cannot be rendered as text.
pub fn find_blank(df: &DataFrame) -> Result<Findings> {
    let (mask, distribution) = blank_mask(df)?;
    Ok(Findings {
        rows: matching_rows(df, &mask)?,
        distribution,
    })
}

/// Keep only rows without blank cells.
///
/// # Errors
///
/// Fails if a column cannot be rendered as text.
pub fn remove_blank(df: &DataFrame) -> Result<Removal> {
    let (mask, _) = blank_mask(df)?;
    let removal = without_matching_rows(df, &mask)?;
    tracing::debug!(dropped = removal.dropped, "rows with blank values removed");
    Ok(removal)
}
