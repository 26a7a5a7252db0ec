//! # TestSession: headless harness for the valuation plugin
//!
//! Wraps `bevy::app::App` + `ValuationPlugin` so integration tests can drive a
//! session the way a front end would: send requests, move the slider, change
//! the horizon, then assert on the published resources and events.

use bevy::app::App;
use bevy::prelude::*;

use crate::analysis::{AnalysisRequest, AnalysisResult};
use crate::engine_cache::EngineCache;
use crate::intent::UserIntent;
use crate::land_cover::{LandCoverClass, LandCoverDistribution};
use crate::rate_tables::RateTables;
use crate::scenario::Scenario;
use crate::session::{
    AnalysisCompleted, AnalysisRejected, AnalysisRequested, CurrentAnalysis, HorizonChanged,
};
use crate::site::LatLng;
use crate::slider::{GreenFractionChanged, LiveHybrid};
use crate::ValuationPlugin;

/// Roughly 100 m × 100 m near Pune.
pub fn reference_polygon() -> Vec<LatLng> {
    let d = 0.0009;
    vec![
        LatLng::new(18.5200, 73.8500),
        LatLng::new(18.5200, 73.8500 + d),
        LatLng::new(18.5200 + d, 73.8500 + d),
        LatLng::new(18.5200 + d, 73.8500),
    ]
}

/// One hectare, 1200 mm rain, 5.4 kWh/m²/day, forest 0.6 / open land 0.4,
/// mixed use, 10-year horizon, 50 % green.
pub fn reference_request() -> AnalysisRequest {
    AnalysisRequest {
        project: Some("Reference parcel".to_string()),
        area_m2: 10_000.0,
        polygon: reference_polygon(),
        land_cover_distribution: LandCoverDistribution::from_pairs(&[
            (LandCoverClass::Forest, 0.6),
            (LandCoverClass::OpenLand, 0.4),
        ]),
        dominant_type: None,
        annual_rainfall_mm: Some(1200.0),
        avg_daily_irradiance_kwh_m2: Some(5.4),
        terrain: None,
        user_intent: UserIntent::Mixed,
        horizon_years: 10,
        green_fraction: 0.5,
        include_yearly: false,
    }
}

pub struct TestSession {
    app: App,
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSession {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Session with the built-in rate tables and no analysis yet.
    pub fn new() -> Self {
        Self::with_rates(RateTables::default())
    }

    pub fn with_rates(rates: RateTables) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(rates);
        app.add_plugins(ValuationPlugin);
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Driving the session
    // -----------------------------------------------------------------------

    /// Queue `request` and run one frame.
    pub fn analyze(mut self, request: AnalysisRequest) -> Self {
        self.send_analyze(request);
        self
    }

    pub fn send_analyze(&mut self, request: AnalysisRequest) {
        self.app
            .world_mut()
            .send_event(AnalysisRequested { request });
        self.app.update();
    }

    pub fn set_green_fraction(&mut self, value: f64) {
        self.app
            .world_mut()
            .send_event(GreenFractionChanged { value });
        self.app.update();
    }

    pub fn set_horizon(&mut self, years: u32) {
        self.app.world_mut().send_event(HorizonChanged { years });
        self.app.update();
    }

    /// Queue several slider positions and process them in one frame.
    pub fn burst_green_fraction(&mut self, values: &[f64]) {
        for &value in values {
            self.app
                .world_mut()
                .send_event(GreenFractionChanged { value });
        }
        self.app.update();
    }

    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.resource::<CurrentAnalysis>().result.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.resource::<CurrentAnalysis>().generation
    }

    pub fn live_hybrid(&self) -> Option<&Scenario> {
        self.resource::<LiveHybrid>().scenario.as_ref()
    }

    pub fn live_revision(&self) -> u64 {
        self.resource::<LiveHybrid>().revision
    }

    pub fn cache(&self) -> &EngineCache {
        self.resource::<EngineCache>()
    }

    /// Removes and returns every queued event of type `T`.
    pub fn drain_events<T: Event>(&mut self) -> Vec<T> {
        self.app
            .world_mut()
            .resource_mut::<Events<T>>()
            .drain()
            .collect()
    }

    pub fn completed(&mut self) -> Vec<AnalysisCompleted> {
        self.drain_events::<AnalysisCompleted>()
    }

    pub fn rejected(&mut self) -> Vec<AnalysisRejected> {
        self.drain_events::<AnalysisRejected>()
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_score_between(&self, min: u8, max: u8) {
        let score = self
            .current()
            .map(|r| r.composite_score)
            .unwrap_or_else(|| panic!("no analysis published"));
        assert!(
            (min..=max).contains(&score),
            "composite score {score} outside [{min}, {max}]"
        );
    }

    pub fn assert_live_green_fraction(&self, expected: f64) {
        let scenario = self
            .live_hybrid()
            .unwrap_or_else(|| panic!("no live hybrid"));
        assert!(
            (scenario.green_fraction - expected).abs() < 1e-12,
            "live hybrid at {} expected {expected}",
            scenario.green_fraction
        );
    }
}
