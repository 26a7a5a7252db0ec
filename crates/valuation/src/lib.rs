//! Natural Capital vs. Market Capital valuation of land parcels.
//!
//! A parcel (polygon, land-cover mix, climate inputs) runs through three
//! ecosystem-service engines (hydrology, solar, carbon), is discounted over
//! several horizons, and is composed into preserve / hybrid / develop
//! scenarios with a composite score. The hybrid can be re-composed cheaply as
//! the user moves a green/development slider.
//!
//! The pure entry point is [`analysis::run_analysis`]. [`ValuationPlugin`]
//! wires the same pipeline into a Bevy `App` for interactive sessions.

use bevy::prelude::*;

pub mod allocation;
pub mod analysis;
pub mod cash_flow;
pub mod config;
pub mod development;
pub mod engine_cache;
pub mod engines;
pub mod error;
pub mod intent;
pub mod land_cover;
pub mod npv;
pub mod rate_tables;
pub mod report;
pub mod scenario;
pub mod scoring;
pub mod session;
pub mod session_protocol;
pub mod site;
pub mod slider;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use analysis::{run_analysis, run_analysis_cached, AnalysisRequest, AnalysisResult};
pub use error::{ConfigError, DegradedReason, InvalidSiteError, ValuationError};
pub use rate_tables::RateTables;
pub use report::ReportEnvelope;

use engine_cache::EngineCache;
use session::{
    AnalysisCompleted, AnalysisRejected, AnalysisRequested, CurrentAnalysis, HorizonChanged,
};
use slider::{GreenFractionChanged, LiveHybrid, SliderBaselines};

// ---------------------------------------------------------------------------
// System ordering
// ---------------------------------------------------------------------------

/// Ordered phases in the `Update` schedule: `Analyze` → `Reoptimize`.
///
/// A request and a slider move arriving in the same frame are applied in that
/// order, so the slider always acts on the freshest baselines.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValuationSet {
    /// Full analyses and horizon changes.
    Analyze,
    /// Slider recomputation over memoized baselines.
    Reoptimize,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct ValuationPlugin;

impl Plugin for ValuationPlugin {
    fn build(&self, app: &mut App) {
        // `init_resource` keeps a `RateTables` inserted before the plugin,
        // e.g. one loaded from a `--rates` override file.
        app.init_resource::<RateTables>()
            .init_resource::<EngineCache>()
            .init_resource::<CurrentAnalysis>()
            .init_resource::<SliderBaselines>()
            .init_resource::<LiveHybrid>()
            .add_event::<AnalysisRequested>()
            .add_event::<HorizonChanged>()
            .add_event::<AnalysisCompleted>()
            .add_event::<AnalysisRejected>()
            .add_event::<GreenFractionChanged>();

        app.configure_sets(
            Update,
            (ValuationSet::Analyze, ValuationSet::Reoptimize).chain(),
        );

        app.add_systems(
            Update,
            (
                session::invalidate_engine_cache,
                session::process_analysis_requests,
                session::apply_horizon_change,
            )
                .chain()
                .in_set(ValuationSet::Analyze),
        )
        .add_systems(
            Update,
            slider::apply_green_fraction.in_set(ValuationSet::Reoptimize),
        );
    }
}
