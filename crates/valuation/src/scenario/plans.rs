//! Plan comparison and the optimal green split.

use super::baselines::ScenarioBaselines;
use super::composer::{hybrid_npv, hybrid_titled};
use super::types::PlanComparison;
use crate::config::OPTIMIZER_STEP;
use crate::intent::UserIntent;

/// Green fraction of the development-heavy plan the user started from.
pub const YOUR_PLAN_GREEN_FRACTION: f64 = 0.10;

/// Green fraction of the conservation plan.
pub const FULL_CONSERVE_GREEN_FRACTION: f64 = 0.90;

/// Green fraction in the interactive range that maximises hybrid NPV at
/// `horizon`. Candidates are exact hundredths, so the split scored is the
/// split reported; ties go to the greener split.
pub fn optimal_green_fraction(
    baselines: &ScenarioBaselines,
    intent: UserIntent,
    horizon: u32,
) -> f64 {
    let per_unit = (1.0 / OPTIMIZER_STEP).round();
    let lo = (baselines.policy.green_fraction_min * per_unit).ceil() as i64;
    let hi = (baselines.policy.green_fraction_max * per_unit).floor() as i64;

    let mut best_green = baselines.policy.green_fraction_min;
    let mut best_npv = f64::NEG_INFINITY;
    for k in lo..=hi {
        let g = k as f64 / per_unit;
        let npv = hybrid_npv(baselines, intent, g, horizon);
        if npv >= best_npv {
            best_npv = npv;
            best_green = g;
        }
    }
    best_green
}

pub fn compare_plans(
    baselines: &ScenarioBaselines,
    intent: UserIntent,
    horizon: u32,
) -> PlanComparison {
    let optimal = optimal_green_fraction(baselines, intent, horizon);
    PlanComparison {
        your_plan: hybrid_titled(baselines, intent, YOUR_PLAN_GREEN_FRACTION, intent.name(), 1.0),
        full_conserve: hybrid_titled(
            baselines,
            intent,
            FULL_CONSERVE_GREEN_FRACTION,
            "Keep it Natural",
            baselines.policy.off_grid_solar_share,
        ),
        smart_hybrid: hybrid_titled(baselines, intent, optimal, "Best of Both", 1.0),
        optimal_green_fraction: optimal,
    }
}
