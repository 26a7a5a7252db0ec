//! Integration tests using the `TestSession` harness.
//!
//! These tests spin up a headless Bevy App with `ValuationPlugin` and verify
//! behavior across the analysis, horizon and slider systems working together.

mod session_protocol_tests;
mod slider_session_tests;

use crate::rate_tables::RateTables;
use crate::session::{AnalysisRejected, CurrentAnalysis};
use crate::slider::SliderBaselines;
use crate::test_harness::{reference_request, TestSession};

// ===========================================================================
// 1. Harness bootstrap
// ===========================================================================

#[test]
fn empty_session_has_no_analysis() {
    let session = TestSession::new();
    assert!(session.current().is_none());
    assert!(session.live_hybrid().is_none());
    assert_eq!(session.generation(), 0);
    assert!(session.cache().is_empty());
}

#[test]
fn plugin_keeps_preinserted_rate_tables() {
    let mut rates = RateTables::default();
    rates.carbon.scc_usd_per_tonne = 190.0;
    let session = TestSession::with_rates(rates.clone());
    assert_eq!(*session.resource::<RateTables>(), rates);
}

// ===========================================================================
// 2. Analysis flow
// ===========================================================================

#[test]
fn analysis_publishes_result_and_slider_baselines() {
    let mut session = TestSession::new().analyze(reference_request());

    let result = session.current().expect("analysis published").clone();
    assert_eq!(session.generation(), 1);
    session.assert_score_between(0, 100);

    let slider = session.resource::<SliderBaselines>();
    assert_eq!(slider.baselines.as_ref(), Some(&result.baselines));
    session.assert_live_green_fraction(0.5);

    let completed = session.completed();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].composite_score, result.composite_score);
    assert!(!completed[0].degraded);
}

#[test]
fn invalid_site_rejected_and_previous_result_kept() {
    let mut session = TestSession::new().analyze(reference_request());
    let before = session.current().cloned();

    let mut bad = reference_request();
    bad.area_m2 = 0.0;
    session.send_analyze(bad);

    let rejected = session.rejected();
    assert_eq!(rejected.len(), 1);
    assert!(
        rejected[0].message.contains("area"),
        "unexpected message: {}",
        rejected[0].message
    );
    assert_eq!(session.current().cloned(), before);
    assert_eq!(session.generation(), 1);
}

#[test]
fn repeated_site_hits_engine_cache() {
    let mut session = TestSession::new().analyze(reference_request());
    let mut moved = reference_request();
    moved.green_fraction = 0.3;
    moved.horizon_years = 25;
    session.send_analyze(moved);

    assert_eq!(session.cache().misses(), 1);
    assert_eq!(session.cache().hits(), 1);
    assert_eq!(session.generation(), 2);
}

#[test]
fn rate_table_change_drops_cache() {
    let mut session = TestSession::new().analyze(reference_request());
    assert_eq!(session.cache().len(), 1);

    session
        .world_mut()
        .resource_mut::<RateTables>()
        .carbon
        .market_usd_per_tonne = 25.0;
    session.tick(1);
    assert!(session.cache().is_empty());
}

// ===========================================================================
// 3. Horizon changes
// ===========================================================================

#[test]
fn horizon_change_republishes_at_new_horizon() {
    let mut session = TestSession::new().analyze(reference_request());
    session.completed();
    session.set_horizon(30);

    let result = session.current().expect("analysis published");
    assert_eq!(result.headline_horizon, 30);
    assert!(result.horizons.contains(&30));
    assert_eq!(session.generation(), 2);
    let completed = session.completed();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].headline_horizon, 30);
}

#[test]
fn out_of_range_horizon_rejected() {
    let mut session = TestSession::new().analyze(reference_request());
    session.set_horizon(0);
    let rejected: Vec<AnalysisRejected> = session.rejected();
    assert_eq!(rejected.len(), 1);
    assert_eq!(
        session
            .resource::<CurrentAnalysis>()
            .result
            .as_ref()
            .map(|r| r.headline_horizon),
        Some(10)
    );
}

#[test]
fn horizon_before_analysis_is_ignored() {
    let mut session = TestSession::new();
    session.set_horizon(25);
    assert!(session.current().is_none());
    assert!(session.rejected().is_empty());
}
