//! sheetjson CLI
//!
//! Converts a spreadsheet file to JSON row records keyed by sheet name.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use sheetjson::{
    ConverterBuilder, DateMode, HeaderMode, OutputStyle, SheetJsonError, SheetSelector,
};
use tracing_subscriber::EnvFilter;

/// Convert XLS/XLSX files to JSON
#[derive(Parser)]
#[command(name = "sheetjson")]
#[command(author, version, about = "Convert spreadsheet files to JSON row records", long_about = None)]
struct Cli {
    /// Spreadsheet file (.xls, .xlsx)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Only convert the named sheet (repeatable)
    #[arg(short, long = "sheet", value_name = "NAME")]
    sheets: Vec<String>,

    /// How row keys are chosen
    #[arg(long, value_enum, default_value_t = HeaderArg::FirstRow)]
    header: HeaderArg,

    /// Fill empty cells with this text instead of omitting them
    #[arg(long, value_name = "TEXT")]
    defval: Option<String>,

    /// Keep rows that contain no values
    #[arg(long)]
    blank_rows: bool,

    /// How date cells are written
    #[arg(long, value_enum, default_value_t = DateArg::Serial)]
    dates: DateArg,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeaderArg {
    /// First non-empty row supplies the keys
    FirstRow,
    /// Column letters (A, B, ...) are the keys
    Letters,
    /// Each row is an array of values
    Arrays,
}

#[derive(Clone, Copy, ValueEnum)]
enum DateArg {
    /// Excel serial numbers
    Serial,
    /// ISO 8601 text
    Iso,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(&cli) {
        handle_error(&e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), SheetJsonError> {
    let mut builder = ConverterBuilder::new()
        .with_header_mode(match cli.header {
            HeaderArg::FirstRow => HeaderMode::FirstRow,
            HeaderArg::Letters => HeaderMode::ColumnLetters,
            HeaderArg::Arrays => HeaderMode::RowArrays,
        })
        .with_date_mode(match cli.dates {
            DateArg::Serial => DateMode::SerialNumber,
            DateArg::Iso => DateMode::Iso8601,
        })
        .with_output_style(if cli.pretty {
            OutputStyle::Pretty
        } else {
            OutputStyle::Compact
        });

    if !cli.sheets.is_empty() {
        builder = builder.with_sheet_selector(SheetSelector::Names(cli.sheets.clone()));
    }
    if let Some(defval) = &cli.defval {
        builder = builder.with_default_value(defval.as_str());
    }
    if cli.blank_rows {
        builder = builder.include_blank_rows(true);
    }

    let converter = builder.build()?;
    let file = converter.read_selected_file(&cli.input)?;
    let result = converter.convert_file(&file)?;

    match &cli.output {
        Some(path) => {
            let mut output = File::create(path)?;
            writeln!(output, "{}", result.json_output())?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", result.json_output())?;
            handle.flush()?;
        }
    }

    Ok(())
}

fn handle_error(error: &SheetJsonError) {
    match error {
        SheetJsonError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        SheetJsonError::Decode(decode_err) => {
            eprintln!("Decode Error: {}", decode_err);
            eprintln!("The file may not be a valid XLS/XLSX file or may be corrupted.");
        }
        SheetJsonError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
            eprintln!("Please check your sheet selection.");
        }
        SheetJsonError::SecurityViolation(msg) => {
            eprintln!("Security Violation: {}", msg);
        }
        other => eprintln!("Error: {}", other),
    }
}
