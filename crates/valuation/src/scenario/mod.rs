//! Scenario composition: preserve / hybrid / develop and the plan comparison.

pub mod baselines;
pub mod composer;
pub mod plans;
pub mod types;

pub use baselines::{HorizonBaseline, ScenarioBaselines};
pub use composer::{compose, develop, hybrid, hybrid_npv, preserve};
pub use plans::{compare_plans, optimal_green_fraction};
pub use types::{PlanComparison, RiskLabel, Scenario, ScenarioSet, ScenarioType};
