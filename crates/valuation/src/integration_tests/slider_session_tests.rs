//! Slider behavior through the ECS after a real analysis.

use crate::cash_flow::CashFlowCategory;
use crate::slider::reoptimize;
use crate::test_harness::{reference_request, TestSession};

#[test]
fn slider_before_analysis_publishes_nothing() {
    let mut session = TestSession::new();
    session.set_green_fraction(0.4);
    assert!(session.live_hybrid().is_none());
    assert_eq!(session.live_revision(), 0);
}

#[test]
fn slider_move_recomposes_hybrid_only() {
    let mut session = TestSession::new().analyze(reference_request());
    let revision = session.live_revision();
    let before = session.current().cloned().expect("analysis published");

    session.set_green_fraction(0.3);
    session.assert_live_green_fraction(0.3);
    assert_eq!(session.live_revision(), revision + 1);
    // The published analysis is not rewritten by the slider.
    assert_eq!(session.current(), Some(&before));
}

#[test]
fn horizon_change_keeps_slider_position() {
    let mut session = TestSession::new().analyze(reference_request());
    session.set_green_fraction(0.3);
    session.set_horizon(30);

    session.assert_live_green_fraction(0.3);
    let result = session.current().expect("analysis published");
    assert_eq!(result.headline_horizon, 30);
    assert_eq!(result.green_fraction, 0.3);
    let expected = reoptimize(&result.baselines, result.intent, 0.3);
    assert_eq!(result.scenarios.hybrid, expected);
}

#[test]
fn slider_matches_pure_reoptimize() {
    let mut session = TestSession::new().analyze(reference_request());
    session.set_green_fraction(0.63);
    let result = session.current().expect("analysis published");
    let expected = reoptimize(&result.baselines, result.intent, 0.63);
    assert_eq!(session.live_hybrid(), Some(&expected));
}

#[test]
fn slider_burst_applies_last_position() {
    let mut session = TestSession::new().analyze(reference_request());
    let revision = session.live_revision();
    session.burst_green_fraction(&[0.2, 0.8, 0.45]);
    session.assert_live_green_fraction(0.45);
    assert_eq!(session.live_revision(), revision + 1);
}

#[test]
fn slider_clamps_to_interactive_range() {
    let mut session = TestSession::new().analyze(reference_request());
    session.set_green_fraction(0.0);
    session.assert_live_green_fraction(0.10);
    session.set_green_fraction(1.0);
    session.assert_live_green_fraction(0.90);
}

#[test]
fn slider_flood_cost_grows_as_green_shrinks() {
    let mut session = TestSession::new().analyze(reference_request());
    let mut previous = f64::INFINITY;
    for step in (10..=90).rev().step_by(10) {
        session.set_green_fraction(step as f64 / 100.0);
        let hybrid = session.live_hybrid().expect("hybrid published");
        // Booked negative: more cost means a smaller value.
        let cost = hybrid.term_at(10, CashFlowCategory::FloodRiskCost);
        assert!(cost <= previous, "flood cost rose at g={step}%");
        previous = cost;
    }
}

#[test]
fn new_analysis_resets_live_hybrid() {
    let mut session = TestSession::new().analyze(reference_request());
    session.set_green_fraction(0.2);
    let mut request = reference_request();
    request.green_fraction = 0.7;
    session.send_analyze(request);
    session.assert_live_green_fraction(0.7);
}
