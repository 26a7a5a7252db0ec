//! Pure scenario composition over [`ScenarioBaselines`].
//!
//! With green fraction `g` and the 100 % baselines at each horizon:
//!
//! | Term            | preserve | hybrid(g)                   | develop          |
//! |-----------------|----------|-----------------------------|------------------|
//! | carbon          | C        | C × g                       | 0                |
//! | flood savings   | F        | F × g                       | 0                |
//! | water filtration| W        | W × g                       | 0                |
//! | dev profit      | 0        | D × (1 − g)                 | D                |
//! | flood risk cost | 0        | −R × (1 − g)(1 + g)         | −R               |
//! | solar           | 0        | S if solar intent or g > t  | S if solar intent|
//!
//! The flood-risk term grows super-linearly as the green buffer shrinks:
//! more built area produces more runoff and less cover remains to absorb it.
//! Risk scores interpolate between preserve and develop with the same
//! `(1 − g)(1 + g)` weight.

use std::collections::BTreeMap;

use super::baselines::ScenarioBaselines;
use super::types::{Scenario, ScenarioSet, ScenarioType};
use crate::allocation::Allocation;
use crate::cash_flow::{CashFlowBreakdown, CashFlowCategory};
use crate::intent::UserIntent;

/// Flood-risk cost multiplier `(1 − g)(1 + g)`.
#[inline]
pub fn flood_risk_weight(green: f64) -> f64 {
    (1.0 - green) * (1.0 + green)
}

pub fn preserve_risk(flood_risk_score: f64) -> f64 {
    (flood_risk_score - 0.1).max(0.0)
}

pub fn develop_risk(flood_risk_score: f64) -> f64 {
    (flood_risk_score + 0.2).min(1.0)
}

pub fn hybrid_risk(flood_risk_score: f64, green: f64) -> f64 {
    let low = preserve_risk(flood_risk_score);
    let high = develop_risk(flood_risk_score);
    low + (high - low) * flood_risk_weight(green)
}

pub fn preserve(baselines: &ScenarioBaselines) -> Scenario {
    let breakdowns = baselines
        .by_horizon
        .iter()
        .map(|(&h, b)| {
            (
                h,
                CashFlowBreakdown::default()
                    .with(CashFlowCategory::Carbon, b.carbon_100pct)
                    .with(CashFlowCategory::FloodSavings, b.flood_100pct)
                    .with(CashFlowCategory::WaterFiltration, b.water_100pct),
            )
        })
        .collect();
    Scenario::new(
        ScenarioType::Preserve,
        "Preserve",
        1.0,
        Allocation::all_nature(),
        breakdowns,
        preserve_risk(baselines.flood_risk_score),
    )
}

pub fn develop(baselines: &ScenarioBaselines, intent: UserIntent) -> Scenario {
    let breakdowns = baselines
        .by_horizon
        .iter()
        .map(|(&h, b)| {
            let solar = if intent.is_solar() {
                b.solar_revenue_base
            } else {
                0.0
            };
            (
                h,
                CashFlowBreakdown::default()
                    .with(CashFlowCategory::DevProfit, b.dev_profit_100pct)
                    .with(CashFlowCategory::FloodRiskCost, -b.flood_risk_cost_100pct)
                    .with(CashFlowCategory::Solar, solar),
            )
        })
        .collect();
    Scenario::new(
        ScenarioType::Develop,
        "Develop",
        0.0,
        Allocation::all_development(),
        breakdowns,
        develop_risk(baselines.flood_risk_score),
    )
}

/// Breakdown of a `g`-green split at one horizon. `solar_share` scales the
/// solar term once it is included.
fn hybrid_breakdown(
    b: &super::baselines::HorizonBaseline,
    green: f64,
    solar_included: bool,
    solar_share: f64,
) -> CashFlowBreakdown {
    let dev = 1.0 - green;
    let solar = if solar_included {
        b.solar_revenue_base * solar_share
    } else {
        0.0
    };
    CashFlowBreakdown::default()
        .with(CashFlowCategory::DevProfit, b.dev_profit_100pct * dev)
        .with(
            CashFlowCategory::FloodRiskCost,
            -(b.flood_risk_cost_100pct * flood_risk_weight(green)),
        )
        .with(CashFlowCategory::Carbon, b.carbon_100pct * green)
        .with(CashFlowCategory::FloodSavings, b.flood_100pct * green)
        .with(CashFlowCategory::WaterFiltration, b.water_100pct * green)
        .with(CashFlowCategory::Solar, solar)
}

/// Whether the solar term applies at green fraction `g`.
pub fn solar_included(baselines: &ScenarioBaselines, intent: UserIntent, green: f64) -> bool {
    intent.is_solar() || green > baselines.policy.solar_green_threshold
}

/// Hybrid at green fraction `green`, clamped to `[0, 1]`.
pub fn hybrid(baselines: &ScenarioBaselines, intent: UserIntent, green: f64) -> Scenario {
    hybrid_titled(baselines, intent, green, "Hybrid", 1.0)
}

pub(crate) fn hybrid_titled(
    baselines: &ScenarioBaselines,
    intent: UserIntent,
    green: f64,
    title: &str,
    solar_share: f64,
) -> Scenario {
    let g = if green.is_nan() { 0.0 } else { green.clamp(0.0, 1.0) };
    let with_solar = solar_included(baselines, intent, g);
    let breakdowns: BTreeMap<u32, CashFlowBreakdown> = baselines
        .by_horizon
        .iter()
        .map(|(&h, b)| (h, hybrid_breakdown(b, g, with_solar, solar_share)))
        .collect();
    Scenario::new(
        ScenarioType::Hybrid,
        title,
        g,
        Allocation::split(g),
        breakdowns,
        hybrid_risk(baselines.flood_risk_score, g),
    )
}

/// Hybrid NPV at one horizon without building a [`Scenario`].
pub fn hybrid_npv(baselines: &ScenarioBaselines, intent: UserIntent, green: f64, horizon: u32) -> f64 {
    let g = green.clamp(0.0, 1.0);
    let with_solar = solar_included(baselines, intent, g);
    hybrid_breakdown(&baselines.at(horizon), g, with_solar, 1.0).total()
}

pub fn compose(baselines: &ScenarioBaselines, intent: UserIntent, green: f64) -> ScenarioSet {
    ScenarioSet {
        preserve: preserve(baselines),
        hybrid: hybrid(baselines, intent, green),
        develop: develop(baselines, intent),
    }
}
