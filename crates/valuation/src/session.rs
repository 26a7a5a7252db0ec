//! ECS side of the analysis pipeline.
//!
//! A front end sends [`AnalysisRequested`] (or [`HorizonChanged`] once a result
//! exists) and reads [`CurrentAnalysis`]. Each completed run also refreshes the
//! slider's memoized baselines, so the next [`crate::slider::GreenFractionChanged`]
//! works against the new site.

use bevy::prelude::*;

use crate::analysis::{run_analysis_cached, AnalysisRequest, AnalysisResult};
use crate::engine_cache::EngineCache;
use crate::error::ValuationError;
use crate::rate_tables::RateTables;
use crate::slider::{LiveHybrid, SliderBaselines};

// =============================================================================
// Events
// =============================================================================

#[derive(Event, Debug, Clone)]
pub struct AnalysisRequested {
    pub request: AnalysisRequest,
}

/// Re-discount the current analysis to a new headline horizon.
#[derive(Event, Debug, Clone, Copy)]
pub struct HorizonChanged {
    pub years: u32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AnalysisCompleted {
    pub composite_score: u8,
    pub headline_horizon: u32,
    pub degraded: bool,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct AnalysisRejected {
    pub message: String,
}

// =============================================================================
// Resources
// =============================================================================

/// Most recent successful analysis. A rejected request leaves it untouched.
#[derive(Resource, Debug, Default)]
pub struct CurrentAnalysis {
    pub result: Option<AnalysisResult>,
    /// Number of analyses published so far.
    pub generation: u64,
}

impl CurrentAnalysis {
    fn publish(
        &mut self,
        result: AnalysisResult,
        slider: &mut SliderBaselines,
        live: &mut LiveHybrid,
        completed: &mut EventWriter<AnalysisCompleted>,
    ) {
        slider.baselines = Some(result.baselines.clone());
        slider.intent = result.intent;
        live.scenario = Some(result.scenarios.hybrid.clone());
        live.revision += 1;
        completed.send(AnalysisCompleted {
            composite_score: result.composite_score,
            headline_horizon: result.headline_horizon,
            degraded: result.degraded,
        });
        self.result = Some(result);
        self.generation += 1;
    }
}

fn reject(rejected: &mut EventWriter<AnalysisRejected>, err: &ValuationError) {
    warn!("Analysis rejected: {err}");
    rejected.send(AnalysisRejected {
        message: err.to_string(),
    });
}

// =============================================================================
// Systems
// =============================================================================

/// Runs every queued request in order; the last success wins.
pub fn process_analysis_requests(
    mut requests: EventReader<AnalysisRequested>,
    rates: Res<RateTables>,
    mut cache: ResMut<EngineCache>,
    mut current: ResMut<CurrentAnalysis>,
    mut slider: ResMut<SliderBaselines>,
    mut live: ResMut<LiveHybrid>,
    mut completed: EventWriter<AnalysisCompleted>,
    mut rejected: EventWriter<AnalysisRejected>,
) {
    for AnalysisRequested { request } in requests.read() {
        match run_analysis_cached(request, &rates, &mut cache) {
            Ok(result) => current.publish(result, &mut slider, &mut live, &mut completed),
            Err(err) => reject(&mut rejected, &err),
        }
    }
}

pub fn apply_horizon_change(
    mut changes: EventReader<HorizonChanged>,
    rates: Res<RateTables>,
    mut current: ResMut<CurrentAnalysis>,
    mut slider: ResMut<SliderBaselines>,
    mut live: ResMut<LiveHybrid>,
    mut completed: EventWriter<AnalysisCompleted>,
    mut rejected: EventWriter<AnalysisRejected>,
) {
    let Some(&HorizonChanged { years }) = changes.read().last() else {
        return;
    };
    let Some(existing) = current.result.as_ref() else {
        warn!("Horizon set to {years} before any analysis completed; ignoring");
        return;
    };
    let green = live
        .scenario
        .as_ref()
        .map_or(existing.green_fraction, |hybrid| hybrid.green_fraction);
    match existing.with_horizon_at(years, green, &rates) {
        Ok(result) => current.publish(result, &mut slider, &mut live, &mut completed),
        Err(err) => reject(&mut rejected, &err),
    }
}

/// Rate tables changed: cached engine runs are stale.
pub fn invalidate_engine_cache(rates: Res<RateTables>, mut cache: ResMut<EngineCache>) {
    if rates.is_changed() && !rates.is_added() && !cache.is_empty() {
        info!("Rate tables changed; dropping {} cached engine runs", cache.len());
        cache.clear();
    }
}
