//! sheetcodec - Convert delimited text to spreadsheets and read tables back

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::warn;

use sheetcodec::config::{load_column_schema, ImportConfig, SourceFormat, TextExportConfig};
use sheetcodec::import::{self, sniff_delimiter};
use sheetcodec::model::{CellType, ColumnFormat, IntoTable, RawRecord, Record, Value};
use sheetcodec::{SimpleParser, Table, TableWriter, TextImporter, TextWriter};

/// Typed tabular data codec (XLSX, delimited text)
#[derive(Parser, Debug)]
#[command(name = "sheetcodec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert delimited text into a spreadsheet (or delimited text)
    Export {
        /// Delimited text file to read
        input: PathBuf,

        /// Destination file; .csv, .tsv and .txt produce delimited text
        #[arg(short, long)]
        output: PathBuf,

        /// JSON array of column formats (title, type, format, culture, ...)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Worksheet title (defaults to the input file name)
        #[arg(long)]
        title: Option<String>,

        /// The input has no header line and no header is written
        #[arg(long)]
        no_header: bool,

        /// Input field separator (detected when omitted)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Read a delimited text or spreadsheet file and print its rows
    Import {
        /// File to read
        input: PathBuf,

        /// The first line/row is data, not a header
        #[arg(long)]
        no_header: bool,

        /// Expected number of cells per row; other rows fail to parse
        #[arg(long)]
        columns: Option<usize>,

        /// Field separator for text input (detected when omitted)
        #[arg(short, long)]
        delimiter: Option<char>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(all_parsed) => {
            if all_parsed {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1) // Some rows failed to parse
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    match cli.command {
        Command::Export {
            input,
            output,
            schema,
            title,
            no_header,
            delimiter,
        } => {
            run_export(&input, &output, schema.as_deref(), title, !no_header, delimiter)?;
            Ok(true)
        }
        Command::Import {
            input,
            no_header,
            columns,
            delimiter,
        } => run_import(&input, !no_header, columns, delimiter),
    }
}

fn run_export(
    input: &Path,
    output: &Path,
    schema: Option<&Path>,
    title: Option<String>,
    has_header: bool,
    delimiter: Option<char>,
) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input: {}", input.display()))?;

    let schema = schema
        .map(|path| {
            load_column_schema(path)
                .with_context(|| format!("Failed to load column schema: {}", path.display()))
        })
        .transpose()?;

    let mut lines = source.lines();
    let header = if has_header { lines.next() } else { None };
    let mut data: Vec<&str> = lines.collect();
    while data.last().is_some_and(|line| line.trim().is_empty()) {
        data.pop();
    }

    let prototype = match &schema {
        Some(columns) => RawRecord::with_width(columns.len()),
        None => RawRecord::new(),
    };
    let delimiter = match (delimiter, data.first(), data.last()) {
        (Some(delimiter), _, _) => delimiter,
        (None, Some(first), Some(last)) => sniff_delimiter(&SimpleParser, &prototype, first, last)
            .context("Failed to detect the input delimiter")?,
        (None, _, _) => ';',
    };

    let titles: Vec<&str> = header.map(|h| h.split(delimiter).collect()).unwrap_or_default();
    let formats = match schema {
        Some(columns) => columns,
        None => {
            let width = data
                .iter()
                .map(|line| line.split(delimiter).count())
                .max()
                .unwrap_or(0)
                .max(titles.len());
            vec![ColumnFormat::new(); width]
        }
    };
    let formats: Vec<ColumnFormat> = formats
        .into_iter()
        .enumerate()
        .map(|(i, format)| resolve_format(format, titles.get(i).copied()))
        .collect();

    let config = ImportConfig::default()
        .with_headers(has_header)
        .with_delimiter(delimiter);
    let parsed = TextImporter::new(SimpleParser, config)
        .import_str(&source, &RawRecord::with_width(formats.len()))
        .with_context(|| format!("Failed to import: {}", input.display()))?;

    let mut rows = Vec::with_capacity(parsed.len());
    for (line, record) in parsed.iter().enumerate() {
        if !record.is_parsed() {
            warn!(
                line = line + 1 + usize::from(has_header),
                cells = record.cells.len(),
                expected = formats.len(),
                "Skipping row with unexpected cell count"
            );
            continue;
        }
        rows.push(convert_row(record, &formats, line)?);
    }

    let title = title.unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet1")
            .to_string()
    });
    let mut table = rows.into_table(has_header, Some(&title));
    for (i, format) in formats.into_iter().enumerate() {
        table = table.add_selected_column(format, move |row: &Vec<Value>| {
            row.get(i).cloned().unwrap_or(Value::Null)
        });
    }

    write_output(&table, output)
}

/// Fill the title from the header and default the type to text
fn resolve_format(mut format: ColumnFormat, header_title: Option<&str>) -> ColumnFormat {
    if format.title.is_none() {
        format.title = header_title.map(str::to_string);
    }
    if format.data_type.is_none() {
        format.data_type = Some(CellType::String);
    }
    format
}

fn convert_row(record: &RawRecord, formats: &[ColumnFormat], line: usize) -> Result<Vec<Value>> {
    record
        .cells
        .iter()
        .zip(formats)
        .map(|(text, format)| {
            let cell_type = format.data_type.unwrap_or(CellType::String);
            let culture = format.culture.unwrap_or_default();
            Value::parse_as(text, cell_type, &culture).with_context(|| {
                format!(
                    "Row {}: cannot read '{}' as {} for column '{}'",
                    line + 1,
                    text,
                    cell_type,
                    format.title.as_deref().unwrap_or_default()
                )
            })
        })
        .collect()
}

fn write_output(table: &Table<Vec<Value>>, output: &Path) -> Result<()> {
    let extension = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let written = match extension.as_deref() {
        Some(ext @ ("csv" | "tsv" | "txt")) => {
            let delimiter = match ext {
                "tsv" => '\t',
                "csv" => ',',
                _ => ';',
            };
            TextWriter::new(table, TextExportConfig::default().with_delimiter(delimiter))
                .save(output)
        }
        _ => TableWriter::new(table).save(output),
    }
    .with_context(|| format!("Failed to write output: {}", output.display()))?;

    if !written {
        bail!("Nothing to export: the input has no columns");
    }
    Ok(())
}

fn run_import(
    input: &Path,
    has_header: bool,
    columns: Option<usize>,
    delimiter: Option<char>,
) -> Result<bool> {
    if SourceFormat::from_path(input).is_none() {
        warn!(path = %input.display(), "Unknown extension, reading as delimited text");
    }

    let mut config = ImportConfig::default().with_headers(has_header);
    if let Some(delimiter) = delimiter {
        config = config.with_delimiter(delimiter);
    }
    let prototype = match columns {
        Some(width) => RawRecord::with_width(width),
        None => RawRecord::new(),
    };

    let table = import::import_path(input, &prototype, SimpleParser, &config)
        .with_context(|| format!("Failed to import: {}", input.display()))?;

    if !table.is_empty() {
        let width = table.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        let mut builder = Builder::default();
        for record in &table {
            let status = if record.is_parsed() { "ok" } else { "failed" };
            let mut cells = record.cells.clone();
            cells.resize(width, String::new());
            builder.push_record(std::iter::once(status.to_string()).chain(cells));
        }
        let mut grid = builder.build();
        grid.with(Style::modern());
        println!("{}", grid);
    }
    println!("parsed {} of {} rows", table.parsed_count(), table.len());

    Ok(table.failed_count() == 0)
}
