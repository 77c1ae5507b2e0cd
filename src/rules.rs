//! The rules table: a secondary delimited file keyed by its `FIELD` column.
//!
//! Rules are loaded, validated and indexed so that a run fails early on a
//! malformed rules file, but no cleaning stage consults them yet.

use crate::config::ReadOptions;
use crate::error::{PrepError, Result};
use crate::io::load_table;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// Name of the key column every rules file must carry.
pub const FIELD_COLUMN: &str = "FIELD";

#[derive(Debug, Clone)]
pub struct RulesTable {
    table: DataFrame,
    fields: Vec<String>,
    index: HashMap<String, usize>,
}

impl RulesTable {
    /// Load a rules file and index it by [`FIELD_COLUMN`].
    ///
    /// # Errors
    ///
    /// Propagates loader errors, and returns [`PrepError::Schema`] when the
    /// key column is absent or holds null or repeated values.
    pub fn load(path: &Path, options: &ReadOptions) -> Result<Self> {
        let table = load_table(path, options)?;
        let rules = Self::from_table(table)?;
        tracing::info!(path = %path.display(), rules = rules.len(), "rules indexed");
        Ok(rules)
    }

    /// Index an already loaded table by [`FIELD_COLUMN`].
    ///
    /// # Errors
    ///
    /// See [`RulesTable::load`].
    pub fn from_table(table: DataFrame) -> Result<Self> {
        let key = table.column(FIELD_COLUMN).map_err(|_| {
            PrepError::Schema(format!(
                "rules file has no '{FIELD_COLUMN}' column (found: {})",
                column_list(&table)
            ))
        })?;
        let key = key.as_materialized_series().cast(&DataType::String)?;

        let mut fields = Vec::with_capacity(key.len());
        let mut index = HashMap::with_capacity(key.len());
        let mut repeated = Vec::new();
        let mut null_rows = Vec::new();

        for (row, value) in key.str()?.into_iter().enumerate() {
            let Some(value) = value else {
                null_rows.push(row + 1);
                continue;
            };
            if index.contains_key(value) {
                if !repeated.iter().any(|r: &String| r == value) {
                    repeated.push(value.to_owned());
                }
                continue;
            }
            index.insert(value.to_owned(), row);
            fields.push(value.to_owned());
        }

        if !null_rows.is_empty() {
            return Err(PrepError::Schema(format!(
                "'{FIELD_COLUMN}' is empty in rules row(s) {null_rows:?}"
            )));
        }
        if !repeated.is_empty() {
            return Err(PrepError::Schema(format!(
                "'{FIELD_COLUMN}' values must be unique, repeated: {}",
                repeated.join(", ")
            )));
        }

        Ok(Self {
            table,
            fields,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in file order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.index.contains_key(field)
    }

    /// The rule row for `field`, as a one-row table.
    pub fn get(&self, field: &str) -> Option<DataFrame> {
        let row = *self.index.get(field)?;
        let offset = i64::try_from(row).ok()?;
        Some(self.table.slice(offset, 1))
    }

    /// Rule attribute names: every column except the key.
    pub fn attributes(&self) -> Vec<String> {
        self.table
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != FIELD_COLUMN)
            .map(|name| name.to_string())
            .collect()
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }
}

fn column_list(df: &DataFrame) -> String {
    df.get_column_names()
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> Result<DataFrame> {
        Ok(df!(
            "FIELD" => &["id", "name", "age"],
            "TYPE" => &["int", "str", "int"],
            "NULLABLE" => &["N", "N", "Y"]
        )?)
    }

    #[test]
    fn test_index_by_field() -> Result<()> {
        let rules = RulesTable::from_table(sample_rules()?)?;

        assert_eq!(rules.len(), 3);
        assert_eq!(rules.fields(), ["id", "name", "age"]);
        assert!(rules.contains("name"));
        assert!(!rules.contains("email"));
        assert_eq!(rules.attributes(), vec!["TYPE".to_owned(), "NULLABLE".to_owned()]);

        let age = rules.get("age").expect("age rule exists");
        assert_eq!(age.height(), 1);
        let nullable = age.column("NULLABLE")?.as_materialized_series().clone();
        assert_eq!(nullable.str()?.get(0), Some("Y"));
        assert!(rules.get("email").is_none());
        Ok(())
    }

    #[test]
    fn test_missing_field_column() -> Result<()> {
        let df = df!("NAME" => &["id"], "TYPE" => &["int"])?;
        let err = RulesTable::from_table(df).expect_err("FIELD is required");
        match err {
            PrepError::Schema(msg) => assert!(msg.contains("NAME, TYPE"), "message: {msg}"),
            other => panic!("expected schema error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_repeated_field_is_rejected() -> Result<()> {
        let df = df!(
            "FIELD" => &["id", "name", "id", "id"],
            "TYPE" => &["int", "str", "str", "int"]
        )?;
        let err = RulesTable::from_table(df).expect_err("duplicate keys");
        match err {
            PrepError::Schema(msg) => assert!(msg.ends_with("repeated: id"), "message: {msg}"),
            other => panic!("expected schema error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_null_field_is_rejected() -> Result<()> {
        let df = df!(
            "FIELD" => &[Some("id"), None],
            "TYPE" => &["int", "str"]
        )?;
        let err = RulesTable::from_table(df).expect_err("null key");
        assert!(matches!(err, PrepError::Schema(_)));
        Ok(())
    }

    #[test]
    fn test_numeric_keys_are_indexed_as_text() -> Result<()> {
        let df = df!("FIELD" => &[10, 20], "TYPE" => &["a", "b"])?;
        let rules = RulesTable::from_table(df)?;
        assert!(rules.contains("10"));
        assert!(rules.get("20").is_some());
        Ok(())
    }
}
