use crate::config::{ReadOptions, Separator};
use crate::error::{PrepError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Suffix appended to the data file's stem for the cleaned output.
pub const PREPARED_SUFFIX: &str = "_prepared.csv";

/// Load a delimited file into a [`DataFrame`].
///
/// The file is first scanned record by record so that any row whose field
/// count differs from the header is rejected with its line number; polars
/// would otherwise pad short rows with nulls.
///
/// # Errors
///
/// - [`PrepError::FileNotFound`] if `path` does not exist or cannot be opened
/// - [`PrepError::Parse`] for an empty file or ragged records
/// - [`PrepError::DataProcessing`] if polars rejects the content, for example
///   a value that does not fit the type inferred from a limited row sample
pub fn load_table(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PrepError::FileNotFound(path.to_path_buf()));
    }

    let records = validate_records(path, options.separator)?;
    tracing::debug!(
        path = %path.display(),
        records,
        separator = %options.separator,
        "record lengths validated"
    );

    let null_values = if options.null_values.is_empty() {
        None
    } else {
        Some(NullValues::AllColumns(
            options.null_values.iter().map(|v| v.as_str().into()).collect(),
        ))
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(options.separator.as_byte())
                .with_quote_char(Some(b'"'))
                .with_missing_is_null(true)
                .with_null_values(null_values),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| read_error(path, &e))?
        .finish()
        .map_err(|e| read_error(path, &e))?;

    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "table loaded"
    );
    Ok(df)
}

fn read_error(path: &Path, err: &PolarsError) -> PrepError {
    match err {
        PolarsError::IO { .. } => PrepError::FileNotFound(path.to_path_buf()),
        PolarsError::NoData(_) | PolarsError::ShapeMismatch(_) => {
            PrepError::Parse(format!("{}: {err}", path.display()))
        }
        PolarsError::ComputeError(_) => PrepError::DataProcessing(format!(
            "{}: {err} (a larger --infer-schema-length may help)",
            path.display()
        )),
        _ => PrepError::DataProcessing(format!("{}: {err}", path.display())),
    }
}

/// Check that every record has as many fields as the header.
///
/// Returns the number of data records (header excluded).
fn validate_records(path: &Path, separator: Separator) -> Result<usize> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(separator.as_byte())
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .map_err(|_| PrepError::FileNotFound(path.to_path_buf()))?;

    let headers = rdr.headers().map_err(|e| prefixed(path, e.into()))?;
    if headers.is_empty() {
        return Err(PrepError::Parse(format!(
            "{}: file is empty or has no header row",
            path.display()
        )));
    }

    let mut count = 0;
    let mut record = csv::StringRecord::new();
    while rdr
        .read_record(&mut record)
        .map_err(|e| prefixed(path, e.into()))?
    {
        count += 1;
    }
    Ok(count)
}

fn prefixed(path: &Path, err: PrepError) -> PrepError {
    match err {
        PrepError::Parse(msg) => PrepError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    }
}

/// Write a table as a delimited text file with a header row and no index.
///
/// Missing values are written as empty fields.
///
/// # Errors
///
/// Returns [`PrepError::Io`] if the file cannot be created or written.
pub fn save_table(df: &mut DataFrame, path: &Path, separator: Separator) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| {
        PrepError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot create {}: {e}", path.display()),
        ))
    })?;

    CsvWriter::new(file)
        .include_header(true)
        .with_separator(separator.as_byte())
        .with_null_value(String::new())
        .finish(df)
        .map_err(|e| {
            PrepError::Io(std::io::Error::other(format!(
                "cannot write {}: {e}",
                path.display()
            )))
        })?;

    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        separator = %separator,
        "prepared table written"
    );
    Ok(())
}

/// Output path for a data file: its file name up to the first `.`, followed by
/// `_prepared.csv`, in the same directory.
///
/// ```
/// use csvprep::io::prepared_output_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     prepared_output_path(Path::new("data/sales.2024.csv")),
///     PathBuf::from("data/sales_prepared.csv")
/// );
/// ```
pub fn prepared_output_path(data_path: &Path) -> PathBuf {
    let file_name = data_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    data_path.with_file_name(format!("{stem}{PREPARED_SUFFIX}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create fixture");
        file.write_all(content.as_bytes()).expect("write fixture");
        path
    }

    #[test]
    fn test_load_pipe_separated() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "data.csv", "a|b\n1|x\n2|y\n");

        let df = load_table(&path, &ReadOptions::default())?;
        assert_eq!(df.shape(), (2, 2));
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn test_load_custom_separator() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "data.csv", "a,b,c\n1,2,3\n");
        let sep: Separator = ",".parse()?;

        let df = load_table(&path, &ReadOptions::with_separator(sep))?;
        assert_eq!(df.shape(), (1, 3));
        Ok(())
    }

    #[test]
    fn test_empty_field_is_missing() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "data.csv", "a|b\n1|2\n3|\n");

        let df = load_table(&path, &ReadOptions::default())?;
        assert_eq!(df.column("b")?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn test_extra_null_tokens() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "data.csv", "a|b\n1|NA\n2|x\n");
        let options = ReadOptions {
            null_values: vec!["NA".to_owned()],
            ..ReadOptions::default()
        };

        let df = load_table(&path, &options)?;
        assert_eq!(df.column("b")?.null_count(), 1);

        let plain = load_table(&path, &ReadOptions::default())?;
        assert_eq!(plain.column("b")?.null_count(), 0);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = load_table(Path::new("no/such/file.csv"), &ReadOptions::default())
            .expect_err("missing file should fail");
        assert!(matches!(err, PrepError::FileNotFound(_)));
    }

    #[test]
    fn test_long_row_is_parse_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "data.csv", "a|b\n1|2\n3|4|5\n");

        let err = load_table(&path, &ReadOptions::default()).expect_err("ragged row");
        assert!(matches!(err, PrepError::Parse(_)), "got {err:?}");
        Ok(())
    }

    #[test]
    fn test_short_row_is_parse_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "data.csv", "a|b|c\n1|2|3\n4|5\n");

        let err = load_table(&path, &ReadOptions::default()).expect_err("ragged row");
        match err {
            PrepError::Parse(msg) => assert!(msg.contains("line 3"), "message: {msg}"),
            other => panic!("expected parse error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_empty_file_is_parse_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "data.csv", "");

        let err = load_table(&path, &ReadOptions::default()).expect_err("empty file");
        assert!(matches!(err, PrepError::Parse(_)), "got {err:?}");
        Ok(())
    }

    fn ids_then_text(rows: usize) -> String {
        let mut content = String::from("id|name\n");
        for i in 0..rows {
            content.push_str(&format!("{i}|n{i}\n"));
        }
        content.push_str("abc|late\n");
        content
    }

    #[test]
    fn test_type_change_after_many_rows_loads() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "data.csv", &ids_then_text(10_050));

        let df = load_table(&path, &ReadOptions::default())?;
        assert_eq!(df.height(), 10_051);
        assert_eq!(df.column("id")?.dtype(), &DataType::String);
        assert_eq!(df.column("id")?.null_count(), 0);
        Ok(())
    }

    #[test]
    fn test_limited_inference_is_not_a_parse_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(&dir, "data.csv", &ids_then_text(200));
        let options = ReadOptions {
            infer_schema_length: Some(10),
            ..ReadOptions::default()
        };

        let err = load_table(&path, &options).expect_err("late text in an integer column");
        assert!(matches!(err, PrepError::DataProcessing(_)), "got {err:?}");
        Ok(())
    }

    #[test]
    fn test_write_then_read_keeps_values() -> Result<()> {
        let dir = TempDir::new()?;
        let mut df = df!(
            "id" => &["1", "2", "3"],
            "name" => &["alpha", "beta", "gamma"],
            "city" => &["Oslo", "Lima", "Pune"]
        )?;
        let path = dir.path().join("out.csv");
        save_table(&mut df, &path, Separator::default())?;

        let text = std::fs::read_to_string(&path)?;
        assert!(text.starts_with("id|name|city\n"), "header row: {text}");

        let options = ReadOptions {
            infer_schema_length: Some(0),
            ..ReadOptions::default()
        };
        let back = load_table(&path, &options)?;
        assert_eq!(back.shape(), df.shape());
        assert_eq!(back.get_column_names(), df.get_column_names());
        assert!(back.equals_missing(&df));
        Ok(())
    }

    #[test]
    fn test_write_to_missing_directory_is_io_error() -> Result<()> {
        let dir = TempDir::new()?;
        let mut df = df!("a" => &[1, 2])?;
        let path = dir.path().join("missing").join("out.csv");

        let err = save_table(&mut df, &path, Separator::default()).expect_err("unwritable");
        assert!(matches!(err, PrepError::Io(_)));
        Ok(())
    }

    #[test]
    fn test_prepared_output_path() {
        assert_eq!(
            prepared_output_path(Path::new("input.csv")),
            PathBuf::from("input_prepared.csv")
        );
        assert_eq!(
            prepared_output_path(Path::new("./runs/input.v2.txt")),
            PathBuf::from("./runs/input_prepared.csv")
        );
        assert_eq!(
            prepared_output_path(Path::new("noext")),
            PathBuf::from("noext_prepared.csv")
        );
    }
}
