use anyhow::{Context as _, Result};
use clap::Parser;
use csvprep::config::{ConfigFile, PrepConfig, ReadOptions, Separator, StageFlags};
use csvprep::pipeline;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "csvprep",
    version,
    about = "Report or remove duplicate, missing and blank rows from a delimited data file"
)]
pub struct Cli {
    /// Data file to clean
    pub data: PathBuf,

    /// Rules file; must contain a FIELD column
    pub rules: PathBuf,

    /// Remove every anomaly (same as --duplicates --empty --NaN)
    #[arg(long)]
    pub all: bool,

    /// Remove duplicated rows instead of only reporting them
    #[arg(long)]
    pub duplicates: bool,

    /// Remove rows with blank values instead of only reporting them
    #[arg(long)]
    pub empty: bool,

    /// Remove rows with missing values instead of only reporting them
    #[arg(long = "NaN", alias = "nan")]
    pub nan: bool,

    /// Field separator of the data file [default: |]
    #[arg(long, value_name = "CHAR")]
    pub sep: Option<Separator>,

    /// Field separator of the rules file [default: same as --sep, not a fixed |]
    #[arg(long, value_name = "CHAR")]
    pub rules_sep: Option<Separator>,

    /// Field separator of the prepared file [default: |]
    #[arg(long, value_name = "CHAR")]
    pub output_sep: Option<Separator>,

    /// Write the prepared table here instead of <data stem>_prepared.csv
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Extra token read as a missing value (repeatable)
    #[arg(long = "null-value", value_name = "TOKEN")]
    pub null_values: Vec<String>,

    /// Rows scanned to infer column types; 0 reads every column as text
    #[arg(long, value_name = "ROWS")]
    pub infer_schema_length: Option<usize>,

    /// JSON file with default settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write rotating log files to this directory
    #[arg(long, env = "CSVPREP_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Merge the command line with the optional config file.
    ///
    /// Stage switches from either source enable a stage; for every other
    /// setting the command line wins.
    pub fn resolve(&self) -> Result<PrepConfig> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config file");
                ConfigFile::load(path).context("Failed to load config file")?
            }
            None => ConfigFile::default(),
        };

        let requested = StageFlags {
            remove_duplicates: self.duplicates || file.duplicates,
            remove_missing: self.nan || file.nan,
            remove_blank: self.empty || file.empty,
        };
        let flags = StageFlags::resolve(self.all || file.all, requested);

        let data_sep = self.sep.or(file.sep).unwrap_or_default();
        let rules_sep = self.rules_sep.or(file.rules_sep).unwrap_or(data_sep);
        let output_sep = self.output_sep.or(file.output_sep).unwrap_or_default();

        let mut null_values = file.null_values;
        null_values.extend(self.null_values.iter().cloned());

        let defaults = ReadOptions::default();
        let infer_schema_length = self
            .infer_schema_length
            .or(file.infer_schema_length)
            .or(defaults.infer_schema_length);

        let data = ReadOptions {
            separator: data_sep,
            null_values,
            infer_schema_length,
        };
        let rules = ReadOptions {
            separator: rules_sep,
            ..data.clone()
        };

        let mut config = PrepConfig::new(&self.data, &self.rules);
        config.output_path.clone_from(&self.output);
        config.data = data;
        config.rules = rules;
        config.output_separator = output_sep;
        config.flags = flags;
        Ok(config)
    }
}

/// Run a cleaning pass, printing the report to stdout.
pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.resolve()?;
    tracing::debug!(?config, "resolved configuration");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = pipeline::run(&config, &mut out).with_context(|| {
        format!("Failed to prepare {}", config.data_path.display())
    })?;

    tracing::info!(
        output = %report.output_path.display(),
        dropped = report.cleaning.dropped(),
        "run complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let cli = Cli::try_parse_from(["csvprep", "data.csv", "rules.csv"])?;
        let config = cli.resolve()?;

        assert_eq!(config.flags, StageFlags::default());
        assert_eq!(config.data.separator.as_byte(), b'|');
        assert_eq!(config.rules.separator.as_byte(), b'|');
        assert_eq!(config.output_separator.as_byte(), b'|');
        assert_eq!(config.resolved_output_path(), PathBuf::from("data_prepared.csv"));
        Ok(())
    }

    #[test]
    fn test_all_flag() -> Result<()> {
        let cli = Cli::try_parse_from(["csvprep", "d.csv", "r.csv", "--all"])?;
        assert_eq!(cli.resolve()?.flags, StageFlags::all());
        Ok(())
    }

    #[test]
    fn test_nan_flag_spelling() -> Result<()> {
        let cli = Cli::try_parse_from(["csvprep", "d.csv", "r.csv", "--NaN"])?;
        let flags = cli.resolve()?.flags;
        assert!(flags.remove_missing);
        assert!(!flags.remove_duplicates);
        assert!(!flags.remove_blank);

        let cli = Cli::try_parse_from(["csvprep", "d.csv", "r.csv", "--nan", "--empty"])?;
        let flags = cli.resolve()?.flags;
        assert!(flags.remove_missing);
        assert!(flags.remove_blank);
        Ok(())
    }

    #[test]
    fn test_rules_separator_follows_data_separator() -> Result<()> {
        let cli = Cli::try_parse_from(["csvprep", "d.csv", "r.csv", "--sep", ","])?;
        let config = cli.resolve()?;
        assert_eq!(config.data.separator.as_byte(), b',');
        assert_eq!(config.rules.separator.as_byte(), b',');
        assert_eq!(config.output_separator.as_byte(), b'|');

        let cli = Cli::try_parse_from([
            "csvprep", "d.csv", "r.csv", "--sep", ",", "--rules-sep", ";",
        ])?;
        assert_eq!(cli.resolve()?.rules.separator.as_byte(), b';');
        Ok(())
    }

    #[test]
    fn test_rules_separator_help_names_its_default() {
        let command = Cli::command();
        let help = command
            .get_arguments()
            .find(|arg| arg.get_id() == "rules_sep")
            .and_then(|arg| arg.get_help())
            .map(ToString::to_string)
            .unwrap_or_default();
        assert!(help.contains("same as --sep"), "help: {help}");
    }

    #[test]
    fn test_invalid_separator_is_rejected() {
        assert!(Cli::try_parse_from(["csvprep", "d.csv", "r.csv", "--sep", "::"]).is_err());
    }

    #[test]
    fn test_config_file_merges_with_flags() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("csvprep.json");
        std::fs::write(
            &path,
            r#"{ "nan": true, "sep": ",", "null_values": ["NA"], "infer_schema_length": 0 }"#,
        )?;

        let cli = Cli::try_parse_from([
            "csvprep",
            "d.csv",
            "r.csv",
            "--duplicates",
            "--sep",
            ";",
            "--null-value",
            "n/a",
            "--config",
            path.to_str().expect("temp path is UTF-8"),
        ])?;
        let config = cli.resolve()?;

        assert!(config.flags.remove_duplicates);
        assert!(config.flags.remove_missing);
        assert!(!config.flags.remove_blank);
        assert_eq!(config.data.separator.as_byte(), b';');
        assert_eq!(config.data.null_values, vec!["NA".to_owned(), "n/a".to_owned()]);
        assert_eq!(config.data.infer_schema_length, Some(0));
        Ok(())
    }
}
