//! Wire format of the session protocol against real analysis output.

use crate::analysis::run_analysis;
use crate::rate_tables::RateTables;
use crate::report::ReportEnvelope;
use crate::session_protocol::*;
use crate::test_harness::reference_request;

#[test]
fn test_analysis_response_carries_summary() {
    let result = run_analysis(&reference_request(), &RateTables::default()).unwrap();
    let resp = make_response(ResponsePayload::Analysis {
        summary: AnalysisSummary::from(&result),
    });
    let value = serde_json::to_value(&resp).unwrap();
    assert_eq!(value["protocol_version"], PROTOCOL_VERSION);
    assert_eq!(value["type"], "analysis");
    assert_eq!(
        value["summary"]["composite_score"],
        u64::from(result.composite_score)
    );
    assert_eq!(value["summary"]["horizon_years"], 10);
}

#[test]
fn test_hybrid_response_serializes_scenario() {
    let result = run_analysis(&reference_request(), &RateTables::default()).unwrap();
    let resp = make_response(ResponsePayload::Hybrid {
        scenario: Box::new(result.scenarios.hybrid.clone()),
    });
    let value = serde_json::to_value(&resp).unwrap();
    assert_eq!(value["type"], "hybrid");
    assert_eq!(value["scenario"]["scenario_type"], "hybrid");
    assert_eq!(value["scenario"]["green_fraction"], 0.5);
}

#[test]
fn test_report_response_matches_envelope() {
    let result = run_analysis(&reference_request(), &RateTables::default()).unwrap();
    let report = ReportEnvelope::from_result(&result);
    let resp = make_response(ResponsePayload::Report {
        report: Box::new(report.clone()),
    });
    let value = serde_json::to_value(&resp).unwrap();
    assert_eq!(value["type"], "report");
    assert_eq!(value["report"], serde_json::to_value(&report).unwrap());
}

#[test]
fn test_analyze_command_round_trips_request() {
    let request = reference_request();
    let line = serde_json::json!({ "cmd": "analyze", "request": request }).to_string();
    let cmd: SessionCommand = serde_json::from_str(&line).unwrap();
    let SessionCommand::Analyze { request: parsed } = cmd else {
        panic!("expected Analyze");
    };
    assert_eq!(parsed.project, request.project);
    assert_eq!(parsed.area_m2, request.area_m2);
    assert_eq!(parsed.polygon.len(), request.polygon.len());
    assert_eq!(parsed.user_intent, request.user_intent);
    assert_eq!(parsed.horizon_years, request.horizon_years);
    assert_eq!(parsed.annual_rainfall_mm, request.annual_rainfall_mm);
}
