//! Report shape handed to downstream consumers (storage, PDF export, UI).

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::engines::carbon::CarbonResult;
use crate::engines::hydrology::HydrologyResult;
use crate::engines::solar::SolarResult;
use crate::error::DegradedReason;
use crate::scenario::{PlanComparison, Scenario};
use crate::scoring::{composite_score, ScoringWeights};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub flood_json: HydrologyResult,
    pub solar_json: SolarResult,
    pub carbon_json: CarbonResult,
    pub composite_score: u8,
    pub financial_npv: f64,
    pub environmental_npv: f64,
    pub horizon_years: u32,
    pub green_fraction: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded_reasons: Vec<DegradedReason>,
    pub scoring: ScoringWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub project: Option<String>,
    pub analysis: AnalysisSection,
    /// Preserve, hybrid, develop in that order.
    pub scenarios: Vec<Scenario>,
    pub plans: PlanComparison,
}

impl ReportEnvelope {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let engines = &result.engines;
        Self {
            project: result.project.clone(),
            analysis: AnalysisSection {
                flood_json: engines.hydrology.clone(),
                solar_json: engines.solar.clone(),
                carbon_json: engines.carbon.clone(),
                composite_score: result.composite_score,
                financial_npv: result.financial_npv,
                environmental_npv: result.environmental_npv,
                horizon_years: result.headline_horizon,
                green_fraction: result.green_fraction,
                confidence: result.confidence,
                degraded_reasons: result.degraded_reasons.clone(),
                scoring: result.scoring,
            },
            scenarios: vec![
                result.scenarios.preserve.clone(),
                result.scenarios.hybrid.clone(),
                result.scenarios.develop.clone(),
            ],
            plans: result.plans.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Score recomputed from the stored NPVs; matches `composite_score` for
    /// any report this crate produced.
    pub fn rescore(&self) -> u8 {
        composite_score(
            self.analysis.environmental_npv,
            self.analysis.financial_npv,
            self.analysis.flood_json.scoring_flood_risk(),
            &self.analysis.scoring,
        )
    }
}
