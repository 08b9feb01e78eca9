//! Batch driver: converts a directory of report workbooks into JSON.
//!
//! Each source file maps one-to-one to a destination record; destination
//! presence is the sole idempotency check, so a re-run only processes
//! files that have not been converted yet.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize as _;
use tracing::{debug, error, info};

use impfmonitor::record::extract_record;
use impfmonitor::xlsx::workbook::WorkbookParts;

/// Source files this driver recognizes.
static SOURCE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^impfquotenmonitoring-202.*\.xlsx$").expect("source name pattern")
});

#[derive(Debug, Parser)]
#[command(name = "impfmonitor", version, about = "Convert RKI Impfquotenmonitoring reports to JSON")]
struct Args {
    /// Directory containing the source .xlsx reports.
    #[arg(long, default_value = "data/0_original")]
    source: PathBuf,

    /// Directory the .json records are written to.
    #[arg(long, default_value = "data/1_parsed")]
    dest: PathBuf,

    /// Re-convert reports whose destination file already exists.
    #[arg(long)]
    force: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(converted) => {
            info!(converted, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<usize, Box<dyn std::error::Error>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(&args.source)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    let mut converted = 0usize;
    for path in entries {
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !SOURCE_NAME.is_match(filename) {
            continue;
        }

        let dest = args.dest.join(Path::new(filename).with_extension("json"));
        if dest.exists() && !args.force {
            debug!(filename, "already converted, skipping");
            continue;
        }

        info!(filename, "parsing");
        let parts = WorkbookParts::open(&path)?;
        let record = extract_record(
            &parts.workbook_xml,
            &parts.data_sheet_xml,
            &parts.front_sheet_xml,
            &parts.shared_strings_xml,
            filename,
        )?;

        fs::create_dir_all(&args.dest)?;
        fs::write(&dest, to_tab_indented_json(&record)?)?;
        converted += 1;
    }
    Ok(converted)
}

fn to_tab_indented_json(record: &impfmonitor::Record) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut serializer)?;
    Ok(buf)
}
