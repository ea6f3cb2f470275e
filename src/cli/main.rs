use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};

use exif_scan::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-scan",
    version,
    about = "Inspect image metadata (EXIF, PNG text) and strip it by re-encoding"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash an image and display its metadata
    Inspect {
        /// Image file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output the result record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a copy of an image with all metadata removed
    Strip {
        /// Image file to clean
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: <stem>_cleaned<ext> next to the input)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let written = config::Config::default().save(cli.config.as_deref())?;
        println!("Default config written to {}", written.display());
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("No command specified. Use --help for usage.");
    };

    let config = config::Config::load(cli.config.as_deref())?;

    match command {
        Command::Inspect { file, json } => inspect(&file, json, &config),
        Command::Strip { file, output } => strip(&file, output, &config),
    }
}

/// Read an upload from disk and enforce the size ceiling.
fn read_upload(path: &Path, config: &config::Config) -> Result<(Vec<u8>, String)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    pipeline::check_upload_size(bytes.len(), config.limits.max_upload_bytes)?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((bytes, filename))
}

fn inspect(path: &Path, json: bool, config: &config::Config) -> Result<()> {
    let (bytes, filename) = read_upload(path, config)?;
    log::debug!("Inspecting {} ({} bytes)", path.display(), bytes.len());

    let result = pipeline::inspect_image(&bytes, &filename, &config.decode_options());
    let status = result.as_ref().err().map(|e| e.status_code());

    if json {
        let record = pipeline::ResultRecord::from(result);
        let out = if config.output.pretty_json {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        println!("{out}");
        if let Some(status) = status {
            anyhow::bail!("{} could not be inspected (status {status})", path.display());
        }
        return Ok(());
    }

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("{e} (status {})", e.status_code())),
    }
}

fn strip(path: &Path, output: Option<PathBuf>, config: &config::Config) -> Result<()> {
    let (bytes, filename) = read_upload(path, config)?;

    let clean = pipeline::clean_image(&bytes, &config.decode_options(), &config.strip_options())
        .map_err(|e| anyhow::anyhow!("{e} (status {})", e.status_code()))?;

    let download_name = pipeline::cleaned_filename(&filename);
    let out_path = output.unwrap_or_else(|| path.with_file_name(&download_name));
    std::fs::write(&out_path, &clean.bytes)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    log::info!(
        "Cleaned {} → {} ({}, {} bytes, encoded as {})",
        path.display(),
        out_path.display(),
        pipeline::mime_type_for(&download_name),
        clean.bytes.len(),
        clean.kind.mime_type()
    );
    Ok(())
}

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Width of the tag column in the report table.
const TAG_WIDTH: usize = 22;
/// Values longer than this wrap onto continuation lines.
const VALUE_WIDTH: usize = 46;

/// Print an inspect report, one section per metadata directory.
fn print_report(report: &pipeline::InspectReport) {
    println!();
    println!("{BOLD}File:{RESET} {} ({})", report.filename, report.format);
    println!("{DIM}SHA-256:{RESET} {}", report.hash);
    println!("{DIM}{}{RESET}", "═".repeat(72));

    for (name, value) in &report.metadata {
        match value {
            Value::Object(fields) => {
                println!("  {BOLD}{name}{RESET}");
                println!("  {DIM}{}{RESET}", "─".repeat(70));
                if fields.is_empty() {
                    println!("  {DIM}(empty){RESET}");
                }
                for (tag, val) in fields {
                    print_row(tag, &display_value(val));
                }
                println!();
            }
            other => print_row(name, &display_value(other)),
        }
    }
    println!();
}

/// Strings print bare, everything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One `tag : value` row; long values continue under the value column.
fn print_row(tag: &str, value: &str) {
    let mut lines = wrap_words(value, VALUE_WIDTH).into_iter();
    let first = lines.next().unwrap_or_default();
    println!("  {tag:<TAG_WIDTH$} : {first}");
    for line in lines {
        println!("  {:TAG_WIDTH$}   {line}", "");
    }
}

/// Greedy word wrap; a single over-long word keeps its own line.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.chars().count() + 1 + word.chars().count() <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }
    if lines.is_empty() {
        lines.push(text.to_string());
    }
    lines
}
