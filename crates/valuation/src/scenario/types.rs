use std::collections::BTreeMap;
use std::fmt;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::allocation::Allocation;
use crate::cash_flow::{CashFlowBreakdown, CashFlowCategory};
use crate::npv::HorizonValues;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    Preserve,
    Hybrid,
    Develop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum RiskLabel {
    Low,
    Moderate,
    High,
}

impl RiskLabel {
    /// Hydrology thresholds: `< 0.33` Low, `< 0.66` Moderate.
    pub fn for_flood_score(score: f64) -> Self {
        if score < 0.33 {
            RiskLabel::Low
        } else if score < 0.66 {
            RiskLabel::Moderate
        } else {
            RiskLabel::High
        }
    }

    /// Scenario thresholds: `> 0.7` High, `> 0.35` Moderate.
    pub fn for_scenario_risk(risk: f64) -> Self {
        if risk > 0.7 {
            RiskLabel::High
        } else if risk > 0.35 {
            RiskLabel::Moderate
        } else {
            RiskLabel::Low
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::Low => write!(f, "Low"),
            RiskLabel::Moderate => write!(f, "Moderate"),
            RiskLabel::High => write!(f, "High"),
        }
    }
}

/// One named land-use outcome. `npv_by_horizon` is always the breakdown
/// total at that horizon: both are set together by [`Scenario::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Scenario {
    pub scenario_type: ScenarioType,
    pub title: String,
    pub green_fraction: f64,
    pub allocation: Allocation,
    pub npv_by_horizon: HorizonValues,
    pub breakdown_by_horizon: BTreeMap<u32, CashFlowBreakdown>,
    pub risk_score: f64,
    pub risk_label: RiskLabel,
}

impl Scenario {
    pub fn new(
        scenario_type: ScenarioType,
        title: impl Into<String>,
        green_fraction: f64,
        allocation: Allocation,
        breakdown_by_horizon: BTreeMap<u32, CashFlowBreakdown>,
        risk_score: f64,
    ) -> Self {
        let npv_by_horizon = breakdown_by_horizon
            .iter()
            .map(|(&h, b)| (h, b.total()))
            .collect();
        let risk_score = risk_score.clamp(0.0, 1.0);
        Self {
            scenario_type,
            title: title.into(),
            green_fraction,
            allocation,
            npv_by_horizon,
            breakdown_by_horizon,
            risk_score,
            risk_label: RiskLabel::for_scenario_risk(risk_score),
        }
    }

    /// NPV at `horizon`, zero when the horizon was not composed.
    pub fn npv_at(&self, horizon: u32) -> f64 {
        self.npv_by_horizon.get(&horizon).copied().unwrap_or(0.0)
    }

    pub fn breakdown_at(&self, horizon: u32) -> CashFlowBreakdown {
        self.breakdown_by_horizon
            .get(&horizon)
            .copied()
            .unwrap_or_default()
    }

    pub fn term_at(&self, horizon: u32, category: CashFlowCategory) -> f64 {
        self.breakdown_at(horizon).get(category)
    }

    /// True when every stored NPV equals its breakdown total.
    pub fn is_consistent(&self) -> bool {
        self.npv_by_horizon.len() == self.breakdown_by_horizon.len()
            && self
                .breakdown_by_horizon
                .iter()
                .all(|(h, b)| self.npv_by_horizon.get(h) == Some(&b.total()))
    }
}

/// The canonical three-way comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ScenarioSet {
    pub preserve: Scenario,
    pub hybrid: Scenario,
    pub develop: Scenario,
}

/// Plan-oriented comparison: the user's development-heavy plan, a
/// conservation plan and the NPV-optimal split between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PlanComparison {
    pub your_plan: Scenario,
    pub full_conserve: Scenario,
    pub smart_hybrid: Scenario,
    pub optimal_green_fraction: f64,
}
