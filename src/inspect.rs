//! Table inspection: the column names and shape printed before any stage runs.

use polars::prelude::DataFrame;
use std::fmt;

/// Column names and shape of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub columns: Vec<String>,
    pub rows: usize,
}

impl TableInfo {
    pub fn of(df: &DataFrame) -> Self {
        Self {
            columns: df
                .get_column_names()
                .into_iter()
                .map(|name| name.to_string())
                .collect(),
            rows: df.height(),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.width())
    }
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.columns.iter().map(|c| format!("'{c}'")).collect();
        writeln!(f, "----- DATAFRAME INFORMATION -----")?;
        writeln!(f, "Columns: [{}]", quoted.join(", "))?;
        write!(f, "Shape: ({}, {})", self.rows, self.width())
    }
}
