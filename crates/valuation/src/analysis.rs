//! One analysis run: request → validated site → engines → baselines →
//! scenarios → score.
//!
//! Only an invalid site or horizon aborts a run. Missing climate data
//! degrades the affected engine and lowers `confidence`, but the result is
//! still complete and internally consistent.
//!
//! An [`AnalysisResult`] is never mutated. `with_horizon` and
//! `with_green_fraction` return a new value so prior reports stay auditable.

use bevy::log::{debug, info};
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_GREEN_FRACTION, DEFAULT_HORIZON_YEARS, DEGRADED_CONFIDENCE_PENALTY, MAX_HORIZON_YEARS,
    STANDARD_HORIZONS,
};
use crate::development::{cost_breakdown, DevelopmentCostBreakdown};
use crate::engine_cache::EngineCache;
use crate::engines::{EngineBundle, EngineOutput};
use crate::error::{DegradedReason, ValuationError};
use crate::intent::UserIntent;
use crate::land_cover::{LandCoverClass, LandCoverDistribution};
use crate::npv::ScheduleRow;
use crate::rate_tables::RateTables;
use crate::scenario::{compare_plans, compose, PlanComparison, ScenarioBaselines, ScenarioSet};
use crate::scoring::{composite_score, ScoringWeights};
use crate::site::{LatLng, Site, SiteInput, TerrainProfile};
use crate::slider;

// =============================================================================
// Request
// =============================================================================

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_YEARS
}

fn default_green_fraction() -> f64 {
    DEFAULT_GREEN_FRACTION
}

/// Wire input for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub project: Option<String>,
    pub area_m2: f64,
    pub polygon: Vec<LatLng>,
    pub land_cover_distribution: LandCoverDistribution,
    #[serde(default)]
    pub dominant_type: Option<LandCoverClass>,
    #[serde(default, alias = "rainfall")]
    pub annual_rainfall_mm: Option<f64>,
    #[serde(default, alias = "irradiance")]
    pub avg_daily_irradiance_kwh_m2: Option<f64>,
    #[serde(default)]
    pub terrain: Option<TerrainProfile>,
    #[serde(default)]
    pub user_intent: UserIntent,
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
    #[serde(default = "default_green_fraction")]
    pub green_fraction: f64,
    /// Attach the year-by-year carbon credit schedule.
    #[serde(default)]
    pub include_yearly: bool,
}

impl AnalysisRequest {
    pub fn site_input(&self) -> SiteInput {
        SiteInput {
            area_m2: self.area_m2,
            polygon: self.polygon.clone(),
            land_cover_distribution: self.land_cover_distribution,
            dominant_type: self.dominant_type,
            annual_rainfall_mm: self.annual_rainfall_mm,
            avg_daily_irradiance_kwh_m2: self.avg_daily_irradiance_kwh_m2,
            terrain: self.terrain,
        }
    }
}

/// Standard horizons plus the headline one, ascending.
pub fn horizon_set(headline: u32) -> Result<Vec<u32>, ValuationError> {
    if headline == 0 || headline > MAX_HORIZON_YEARS {
        return Err(ValuationError::InvalidHorizon(headline));
    }
    let mut horizons = STANDARD_HORIZONS.to_vec();
    horizons.push(headline);
    horizons.sort_unstable();
    horizons.dedup();
    Ok(horizons)
}

// =============================================================================
// Result
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct AnalysisResult {
    pub project: Option<String>,
    pub site: Site,
    pub intent: UserIntent,
    pub headline_horizon: u32,
    pub horizons: Vec<u32>,
    pub green_fraction: f64,
    pub engines: EngineBundle,
    pub development: DevelopmentCostBreakdown,
    pub baselines: ScenarioBaselines,
    pub scenarios: ScenarioSet,
    pub plans: PlanComparison,
    pub environmental_npv: f64,
    pub financial_npv: f64,
    pub composite_score: u8,
    pub scoring: ScoringWeights,
    pub degraded: bool,
    pub degraded_reasons: Vec<DegradedReason>,
    pub confidence: f64,
    pub carbon_credit_schedule: Option<Vec<ScheduleRow>>,
}

/// Ecosystem-service PV at `horizon`: avoided flood damage, water
/// filtration, carbon and solar.
pub fn environmental_npv(engines: &EngineBundle, horizon: u32) -> f64 {
    engines.hydrology.summary().npv_at(horizon)
        + engines.hydrology.water_filtration.npv_at(horizon)
        + engines.carbon.summary().npv_at(horizon)
        + engines.solar.summary().npv_at(horizon)
}

/// Development PV at `horizon`: net profit less residual flood damage.
pub fn financial_npv(baselines: &ScenarioBaselines, horizon: u32) -> f64 {
    let b = baselines.at(horizon);
    b.dev_profit_100pct - b.flood_risk_cost_100pct
}

pub fn confidence(degraded_engines: usize) -> f64 {
    (1.0 - DEGRADED_CONFIDENCE_PENALTY * degraded_engines as f64).max(0.0)
}

struct Assembly<'a> {
    project: Option<String>,
    site: Site,
    intent: UserIntent,
    headline: u32,
    green: f64,
    include_yearly: bool,
    engines: EngineBundle,
    rates: &'a RateTables,
}

impl Assembly<'_> {
    fn finish(self) -> Result<AnalysisResult, ValuationError> {
        let horizons = horizon_set(self.headline)?;
        let rates = self.rates;
        let development = cost_breakdown(
            self.site.area_m2(),
            self.intent,
            &self.engines.hydrology,
            rates,
        );
        let baselines =
            ScenarioBaselines::from_engines(&self.engines, &development, rates, &horizons);
        let green = slider::clamp_to_interactive(&baselines, self.green);
        let scenarios = compose(&baselines, self.intent, green);
        let plans = compare_plans(&baselines, self.intent, self.headline);

        let environmental_npv = environmental_npv(&self.engines, self.headline);
        let financial_npv = financial_npv(&baselines, self.headline);
        let score = composite_score(
            environmental_npv,
            financial_npv,
            self.engines.hydrology.scoring_flood_risk(),
            &rates.scoring,
        );

        let degraded_reasons = self.engines.degraded_reasons();
        let carbon_credit_schedule = self
            .include_yearly
            .then(|| self.engines.carbon.credit_schedule(self.headline));

        debug!(
            "Optimal green split {:.2} at {} years",
            plans.optimal_green_fraction, self.headline
        );

        Ok(AnalysisResult {
            project: self.project,
            site: self.site,
            intent: self.intent,
            headline_horizon: self.headline,
            horizons,
            green_fraction: green,
            development,
            baselines,
            scenarios,
            plans,
            environmental_npv,
            financial_npv,
            composite_score: score,
            scoring: rates.scoring,
            degraded: !degraded_reasons.is_empty(),
            confidence: confidence(degraded_reasons.len()),
            degraded_reasons,
            carbon_credit_schedule,
            engines: self.engines,
        })
    }
}

/// Runs a full analysis without caching.
pub fn run_analysis(
    request: &AnalysisRequest,
    rates: &RateTables,
) -> Result<AnalysisResult, ValuationError> {
    run_analysis_cached(request, rates, &mut EngineCache::default())
}

/// Runs a full analysis, reusing engine results for a site seen before.
pub fn run_analysis_cached(
    request: &AnalysisRequest,
    rates: &RateTables,
    cache: &mut EngineCache,
) -> Result<AnalysisResult, ValuationError> {
    let site = Site::new(request.site_input())?;
    let horizons = horizon_set(request.horizon_years)?;
    let engines = cache.get_or_run(&site, rates, &horizons);

    let result = Assembly {
        project: request.project.clone(),
        site,
        intent: request.user_intent,
        headline: request.horizon_years,
        green: request.green_fraction,
        include_yearly: request.include_yearly,
        engines,
        rates,
    }
    .finish()?;

    info!(
        "Analysis complete: score {} (env ₹{:.0}, fin ₹{:.0}, {} yr){}",
        result.composite_score,
        result.environmental_npv,
        result.financial_npv,
        result.headline_horizon,
        if result.degraded { " [degraded]" } else { "" }
    );
    Ok(result)
}

impl AnalysisResult {
    /// Same site and inputs re-discounted to a new headline horizon.
    pub fn with_horizon(&self, years: u32, rates: &RateTables) -> Result<Self, ValuationError> {
        self.with_horizon_at(years, self.green_fraction, rates)
    }

    /// Re-discounted to `years` with the hybrid composed at `green`, for a
    /// slider that has moved since this result was published.
    pub fn with_horizon_at(
        &self,
        years: u32,
        green: f64,
        rates: &RateTables,
    ) -> Result<Self, ValuationError> {
        let horizons = horizon_set(years)?;
        Assembly {
            project: self.project.clone(),
            site: self.site.clone(),
            intent: self.intent,
            headline: years,
            green,
            include_yearly: self.carbon_credit_schedule.is_some(),
            engines: self.engines.rediscounted(&horizons),
            rates,
        }
        .finish()
    }

    /// Same analysis with the hybrid recomposed at a new green fraction.
    pub fn with_green_fraction(&self, green: f64) -> Self {
        let hybrid = slider::reoptimize(&self.baselines, self.intent, green);
        Self {
            green_fraction: hybrid.green_fraction,
            scenarios: ScenarioSet {
                hybrid,
                ..self.scenarios.clone()
            },
            ..self.clone()
        }
    }

    /// Recomputes the composite score from the stored NPVs and weights.
    pub fn rescore(&self) -> u8 {
        composite_score(
            self.environmental_npv,
            self.financial_npv,
            self.engines.hydrology.scoring_flood_risk(),
            &self.scoring,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
