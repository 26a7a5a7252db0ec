//! `landval`: headless land parcel valuation.
//!
//! ```text
//! landval analyze <request.json> [--rates <rates.json>] [--archive <out.lval>]
//! landval inspect <archive.lval>
//! landval --session [--rates <rates.json>]
//! ```
//!
//! Logs go to stderr (filter via `LANDVAL_LOG`); stdout carries only JSON.

mod session_mode;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bevy::log::{error, info, Level, LogPlugin};
use bevy::prelude::*;

use valuation::{run_analysis, AnalysisRequest, RateTables, ReportEnvelope};

#[derive(Debug, PartialEq)]
enum Mode {
    Analyze {
        request: PathBuf,
        archive: Option<PathBuf>,
    },
    Inspect {
        archive: PathBuf,
    },
    Session,
}

#[derive(Debug, PartialEq)]
struct Cli {
    mode: Mode,
    rates: Option<PathBuf>,
}

const USAGE: &str = "usage: landval analyze <request.json> [--rates <rates.json>] [--archive <out.lval>]\n       landval inspect <archive.lval>\n       landval --session [--rates <rates.json>]";

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let mut args = args.into_iter();
    let mut positional = Vec::new();
    let mut rates = None;
    let mut archive = None;
    let mut session = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--session" => session = true,
            "--rates" => {
                rates = Some(PathBuf::from(
                    args.next().ok_or("--rates needs a path")?,
                ))
            }
            "--archive" => {
                archive = Some(PathBuf::from(
                    args.next().ok_or("--archive needs a path")?,
                ))
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            _ => positional.push(arg),
        }
    }

    let mode = match (session, positional.as_slice()) {
        (true, []) => Mode::Session,
        (false, [cmd, path]) if cmd == "analyze" => Mode::Analyze {
            request: PathBuf::from(path),
            archive,
        },
        (false, [cmd, path]) if cmd == "inspect" => Mode::Inspect {
            archive: PathBuf::from(path),
        },
        _ => return Err(USAGE.to_string()),
    };
    Ok(Cli { mode, rates })
}

fn log_plugin() -> LogPlugin {
    LogPlugin {
        filter: std::env::var("LANDVAL_LOG").unwrap_or_else(|_| "info".to_string()),
        level: Level::INFO,
        ..default()
    }
}

fn load_rates(path: Option<&Path>) -> Result<RateTables, String> {
    match path {
        Some(path) => RateTables::load(path).map_err(|e| format!("{}: {e}", path.display())),
        None => Ok(RateTables::default()),
    }
}

fn print_json(report: &ReportEnvelope) -> Result<(), String> {
    let json = report.to_json_pretty().map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn analyze(request: &Path, archive_path: Option<&Path>, rates: &RateTables) -> Result<(), String> {
    let text = std::fs::read_to_string(request)
        .map_err(|e| format!("{}: {e}", request.display()))?;
    let request: AnalysisRequest =
        serde_json::from_str(&text).map_err(|e| format!("Invalid request: {e}"))?;
    let result = run_analysis(&request, rates).map_err(|e| e.to_string())?;
    if let Some(path) = archive_path {
        archive::write_archive(path, &result).map_err(|e| e.to_string())?;
    }
    print_json(&ReportEnvelope::from_result(&result))
}

fn inspect(path: &Path) -> Result<(), String> {
    let (header, result) = archive::read_archive(path).map_err(|e| e.to_string())?;
    info!(
        "Archive format v{}, written at {} (unix), {} bytes uncompressed",
        header.format_version, header.timestamp, header.uncompressed_size
    );
    print_json(&ReportEnvelope::from_result(&result))
}

fn main() -> ExitCode {
    // Installs the stderr subscriber for every mode.
    let mut app = App::new();
    app.add_plugins(log_plugin());

    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };

    let outcome = load_rates(cli.rates.as_deref()).and_then(|rates| match cli.mode {
        Mode::Analyze { request, archive: out } => analyze(&request, out.as_deref(), &rates),
        Mode::Inspect { archive: path } => inspect(&path),
        Mode::Session => {
            session_mode::run_session_mode(app, rates);
            Ok(())
        }
    });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            error!("{msg}");
            ExitCode::FAILURE
        }
    }
}
