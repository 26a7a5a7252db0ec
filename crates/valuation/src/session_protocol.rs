//! Line protocol for the `--session` headless mode.
//!
//! External programs (front ends, scripts, test harnesses) drive an
//! interactive valuation session over newline-delimited JSON on stdin/stdout.
//! The types live here so they can be unit-tested without the app binary;
//! the I/O loop lives in `crates/app/src/session_mode.rs`.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisRequest;
use crate::report::ReportEnvelope;
use crate::scenario::Scenario;

// ---------------------------------------------------------------------------
// Commands (stdin → engine)
// ---------------------------------------------------------------------------

/// Each line of stdin is parsed as one `SessionCommand`; `cmd` is the tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd")]
pub enum SessionCommand {
    /// Run a full analysis and make it the current one.
    #[serde(rename = "analyze")]
    Analyze { request: Box<AnalysisRequest> },

    /// Move the green/development slider.
    #[serde(rename = "set_green_fraction")]
    SetGreenFraction { value: f64 },

    /// Re-discount the current analysis to a new headline horizon.
    #[serde(rename = "set_horizon")]
    SetHorizon { years: u32 },

    /// Emit the report envelope of the current analysis.
    #[serde(rename = "report")]
    Report,

    /// Write the current analysis to a binary archive.
    #[serde(rename = "archive")]
    Archive { path: String },

    #[serde(rename = "quit")]
    Quit,
}

// ---------------------------------------------------------------------------
// Responses (engine → stdout)
// ---------------------------------------------------------------------------

/// Every response includes the protocol version and a tagged payload.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

/// Headline numbers of a completed analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub composite_score: u8,
    pub environmental_npv: f64,
    pub financial_npv: f64,
    pub horizon_years: u32,
    pub optimal_green_fraction: f64,
    pub degraded: bool,
    pub confidence: f64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ResponsePayload {
    #[serde(rename = "ready")]
    Ready,

    #[serde(rename = "analysis")]
    Analysis { summary: AnalysisSummary },

    /// Slider recompute result.
    #[serde(rename = "hybrid")]
    Hybrid { scenario: Box<Scenario> },

    #[serde(rename = "report")]
    Report { report: Box<ReportEnvelope> },

    #[serde(rename = "ok")]
    Ok,

    #[serde(rename = "error")]
    Error { message: String },

    /// Response to `quit`.
    #[serde(rename = "goodbye")]
    Goodbye,
}

/// Bump when the command/response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

pub fn make_response(payload: ResponsePayload) -> SessionResponse {
    SessionResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

impl From<&crate::analysis::AnalysisResult> for AnalysisSummary {
    fn from(result: &crate::analysis::AnalysisResult) -> Self {
        Self {
            composite_score: result.composite_score,
            environmental_npv: result.environmental_npv,
            financial_npv: result.financial_npv,
            horizon_years: result.headline_horizon,
            optimal_green_fraction: result.plans.optimal_green_fraction,
            degraded: result.degraded,
            confidence: result.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_analyze_command() {
        let json = r#"{"cmd":"analyze","request":{
            "area_m2":10000.0,
            "polygon":[{"lat":18.52,"lng":73.85},{"lat":18.52,"lng":73.8509},{"lat":18.5209,"lng":73.8509}],
            "land_cover_distribution":{"forest":1.0}
        }}"#;
        let cmd: SessionCommand = serde_json::from_str(json).unwrap();
        let SessionCommand::Analyze { request } = cmd else {
            panic!("expected Analyze");
        };
        assert_eq!(request.area_m2, 10_000.0);
        assert_eq!(request.polygon.len(), 3);
    }

    #[test]
    fn deserialize_set_green_fraction_command() {
        let cmd: SessionCommand =
            serde_json::from_str(r#"{"cmd":"set_green_fraction","value":0.35}"#).unwrap();
        assert!(matches!(cmd, SessionCommand::SetGreenFraction { value } if value == 0.35));
    }

    #[test]
    fn deserialize_set_horizon_command() {
        let cmd: SessionCommand =
            serde_json::from_str(r#"{"cmd":"set_horizon","years":25}"#).unwrap();
        assert!(matches!(cmd, SessionCommand::SetHorizon { years: 25 }));
    }

    #[test]
    fn deserialize_simple_commands() {
        let report: SessionCommand = serde_json::from_str(r#"{"cmd":"report"}"#).unwrap();
        assert!(matches!(report, SessionCommand::Report));
        let quit: SessionCommand = serde_json::from_str(r#"{"cmd":"quit"}"#).unwrap();
        assert!(matches!(quit, SessionCommand::Quit));
        let archive: SessionCommand =
            serde_json::from_str(r#"{"cmd":"archive","path":"/tmp/a.lval"}"#).unwrap();
        assert!(matches!(archive, SessionCommand::Archive { .. }));
    }

    #[test]
    fn serialize_ready_response() {
        let json = serde_json::to_string(&make_response(ResponsePayload::Ready)).unwrap();
        assert!(json.contains("\"protocol_version\":1"));
        assert!(json.contains("\"type\":\"ready\""));
    }

    #[test]
    fn serialize_error_response() {
        let resp = make_response(ResponsePayload::Error {
            message: "Horizon must be between 1 and 100 years, got 0".to_string(),
        });
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("got 0"));
    }

    #[test]
    fn serialize_goodbye_response() {
        let json = serde_json::to_string(&make_response(ResponsePayload::Goodbye)).unwrap();
        assert!(json.contains("\"type\":\"goodbye\""));
    }

    #[test]
    fn unknown_command_is_parse_error() {
        assert!(serde_json::from_str::<SessionCommand>(r#"{"cmd":"nonexistent"}"#).is_err());
        assert!(serde_json::from_str::<SessionCommand>("{not valid json").is_err());
    }
}
