//! `quizbox results` - inspect and modify the results file from the command line

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use quizbox_store::{ResultRecord, ResultStore, StoreError};

use crate::config::Config;

/// Longest record preview shown in `results show`, in characters.
const PREVIEW_CHARS: usize = 80;

#[derive(Args, Debug)]
pub struct ResultsArgs {
    #[command(subcommand)]
    pub action: ResultsAction,
}

#[derive(Subcommand, Debug)]
pub enum ResultsAction {
    /// Create an empty results file if none exists
    Init {
        /// Directory holding the results file
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Print stored results
    Show {
        /// Directory holding the results file
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Print the raw JSON array instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Append one JSON object read from a file ("-" for stdin)
    Append {
        /// Directory holding the results file
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// File containing the record
        input: PathBuf,
    },
}

pub fn run(args: ResultsArgs, config: &Config) -> Result<()> {
    match args.action {
        ResultsAction::Init { data_dir } => init(&open_store(data_dir, config)),
        ResultsAction::Show { data_dir, json } => show(&open_store(data_dir, config), json),
        ResultsAction::Append { data_dir, input } => {
            append(&open_store(data_dir, config), &input)
        }
    }
}

fn open_store(data_dir: Option<PathBuf>, config: &Config) -> ResultStore {
    let dir = data_dir.unwrap_or_else(|| config.storage.data_dir.clone());
    ResultStore::with_file_name(&dir, &config.storage.file_name)
}

fn init(store: &ResultStore) -> Result<()> {
    if store.init_collection()? {
        eprintln!("Created empty results file at {}", store.path().display());
    } else {
        eprintln!("Results file already exists at {}", store.path().display());
    }
    Ok(())
}

fn show(store: &ResultStore, json: bool) -> Result<()> {
    let records = match store.load_all() {
        Ok(records) => records,
        Err(StoreError::NotFound { path }) => {
            eprintln!("No results file at {} yet.", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        eprintln!("No results stored.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("#").fg(Color::Cyan),
            Cell::new("Fields").fg(Color::Cyan),
            Cell::new("Record").fg(Color::Cyan),
        ]);

    for (i, record) in records.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(record.len()),
            Cell::new(preview(record)),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!("{} results total", records.len());
    Ok(())
}

/// Compact JSON of `record`, cut to `PREVIEW_CHARS`.
fn preview(record: &ResultRecord) -> String {
    let json = serde_json::to_string(record).unwrap_or_default();
    if json.chars().count() <= PREVIEW_CHARS {
        return json;
    }
    let mut cut: String = json.chars().take(PREVIEW_CHARS - 1).collect();
    cut.push('…');
    cut
}

fn append(store: &ResultStore, input: &Path) -> Result<()> {
    let content = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read record from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };

    let record = parse_record(&content)?;
    let count = store.append(record)?;
    eprintln!("Appended record #{count} to {}", store.path().display());
    Ok(())
}

fn parse_record(content: &str) -> Result<ResultRecord> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("record is not valid JSON")?;
    match ResultRecord::try_from(value) {
        Ok(record) => Ok(record),
        Err(other) => bail!("expected a JSON object, got {}", json_kind(&other)),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_record_accepts_objects_only() {
        let record = parse_record(r#"{"score": 7, "name": "Ana"}"#).unwrap();
        assert_eq!(record.len(), 2);

        let err = parse_record("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"));
        assert!(parse_record("{nope").is_err());
    }

    #[test]
    fn preview_truncates_long_records() {
        let short = parse_record(r#"{"id": 1}"#).unwrap();
        assert_eq!(preview(&short), r#"{"id":1}"#);

        let long = parse_record(&format!(r#"{{"answer": "{}"}}"#, "é".repeat(200))).unwrap();
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS);
        assert!(p.ends_with('…'));
    }

    #[test]
    fn append_from_file_then_show() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(&dir.path().join("data"));
        let input = dir.path().join("record.json");
        std::fs::write(&input, r#"{"id": 1}"#).unwrap();

        append(&store, &input).unwrap();
        append(&store, &input).unwrap();

        assert_eq!(store.load_all().unwrap().len(), 2);
        show(&store, false).unwrap();
        show(&store, true).unwrap();
    }

    #[test]
    fn show_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(&dir.path().join("data"));
        show(&store, false).unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn show_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        std::fs::write(store.path(), "garbage").unwrap();
        assert!(show(&store, false).is_err());
    }

    #[test]
    fn init_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(&dir.path().join("data"));
        init(&store).unwrap();
        init(&store).unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }
}
