//! Headless `--session` mode: a blocking loop that reads JSON commands from
//! stdin and writes JSON responses to stdout.
//!
//! Each stdin line is a [`SessionCommand`] with a `"cmd"` discriminator; each
//! stdout line carries `"protocol_version"` and `"type"`. Logs stay on stderr.
//! See [`valuation::session_protocol`] for the schema.

use std::io::{BufRead, Write};
use std::path::Path;

use bevy::log::{error, info, warn};
use bevy::prelude::*;

use valuation::session::{AnalysisRejected, AnalysisRequested, CurrentAnalysis, HorizonChanged};
use valuation::session_protocol::{
    make_response, AnalysisSummary, ResponsePayload, SessionCommand, SessionResponse,
    PROTOCOL_VERSION,
};
use valuation::slider::{GreenFractionChanged, LiveHybrid};
use valuation::{AnalysisResult, RateTables, ReportEnvelope, ValuationPlugin};

/// `app` already carries the log plugin.
pub fn run_session_mode(mut app: App, rates: RateTables) {
    app.add_plugins(MinimalPlugins);
    app.insert_resource(rates);
    app.add_plugins(ValuationPlugin);
    app.update();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    write_response(&mut stdout, &make_response(ResponsePayload::Ready));
    info!("landval session v{PROTOCOL_VERSION} ready, waiting for commands on stdin");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<SessionCommand>(&line) {
            Ok(cmd) => process_command(cmd, &mut app),
            Err(e) => make_response(ResponsePayload::Error {
                message: format!("Parse error: {e}"),
            }),
        };
        let is_goodbye = matches!(response.payload, ResponsePayload::Goodbye);
        write_response(&mut stdout, &response);

        if is_goodbye {
            break;
        }
    }

    info!("landval session shutting down");
}

fn write_response(out: &mut impl Write, response: &SessionResponse) {
    let line = serde_json::to_string(response).unwrap_or_else(|e| {
        warn!("failed to serialize response: {e}");
        serde_json::json!({
            "protocol_version": PROTOCOL_VERSION,
            "type": "error",
            "message": format!("Serialization error: {e}"),
        })
        .to_string()
    });
    if writeln!(out, "{line}").and_then(|()| out.flush()).is_err() {
        error!("stdout closed");
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

fn process_command(cmd: SessionCommand, app: &mut App) -> SessionResponse {
    match cmd {
        SessionCommand::Analyze { request } => {
            app.world_mut().send_event(AnalysisRequested { request: *request });
            settle_analysis(app)
        }

        SessionCommand::SetHorizon { years } => {
            if current(app).is_none() {
                return no_analysis();
            }
            app.world_mut().send_event(HorizonChanged { years });
            settle_analysis(app)
        }

        SessionCommand::SetGreenFraction { value } => {
            if current(app).is_none() {
                return no_analysis();
            }
            app.world_mut().send_event(GreenFractionChanged { value });
            app.update();
            match app.world().resource::<LiveHybrid>().scenario.clone() {
                Some(scenario) => make_response(ResponsePayload::Hybrid {
                    scenario: Box::new(scenario),
                }),
                None => no_analysis(),
            }
        }

        SessionCommand::Report => match at_slider(app) {
            Some(result) => make_response(ResponsePayload::Report {
                report: Box::new(ReportEnvelope::from_result(&result)),
            }),
            None => no_analysis(),
        },

        SessionCommand::Archive { path } => match at_slider(app) {
            Some(result) => match archive::write_archive(Path::new(&path), &result) {
                Ok(_) => make_response(ResponsePayload::Ok),
                Err(e) => make_response(ResponsePayload::Error {
                    message: format!("Archive failed: {e}"),
                }),
            },
            None => no_analysis(),
        },

        SessionCommand::Quit => make_response(ResponsePayload::Goodbye),
    }
}

/// Runs one frame, then reports either the first rejection or the summary of
/// the published analysis.
fn settle_analysis(app: &mut App) -> SessionResponse {
    app.update();
    let rejected: Vec<AnalysisRejected> = app
        .world_mut()
        .resource_mut::<Events<AnalysisRejected>>()
        .drain()
        .collect();
    if let Some(first) = rejected.into_iter().next() {
        return make_response(ResponsePayload::Error {
            message: first.message,
        });
    }
    match current(app) {
        Some(result) => make_response(ResponsePayload::Analysis {
            summary: AnalysisSummary::from(result),
        }),
        None => no_analysis(),
    }
}

fn current(app: &App) -> Option<&AnalysisResult> {
    app.world().resource::<CurrentAnalysis>().result.as_ref()
}

/// Current analysis with the hybrid at the live slider position.
fn at_slider(app: &App) -> Option<AnalysisResult> {
    let result = current(app)?;
    match app.world().resource::<LiveHybrid>().scenario.as_ref() {
        Some(live) if live.green_fraction != result.green_fraction => {
            Some(result.with_green_fraction(live.green_fraction))
        }
        _ => Some(result.clone()),
    }
}

fn no_analysis() -> SessionResponse {
    make_response(ResponsePayload::Error {
        message: "No analysis loaded; send an analyze command first".to_string(),
    })
}
