//! The three site engines and the shape they report in.
//!
//! Each engine is a pure function `(&Site, &RateTables, &[u32]) -> Result`.
//! Missing inputs never fail an engine: it returns explicit zeros tagged
//! [`EngineStatus::Degraded`] so scenario composition stays total.

pub mod carbon;
pub mod hydrology;
pub mod solar;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::error::DegradedReason;
use crate::npv::{npv_by_horizon, HorizonValues};
use crate::rate_tables::RateTables;
use crate::site::Site;

pub use carbon::CarbonResult;
pub use hydrology::HydrologyResult;
pub use solar::SolarResult;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineStatus {
    #[default]
    Ok,
    Degraded { reason: DegradedReason },
}

impl EngineStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, EngineStatus::Degraded { .. })
    }
}

/// Fields every engine reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct EngineSummary {
    pub annual_value_inr: f64,
    /// Risk (hydrology) or efficiency (solar, carbon) in `[0, 1]`.
    pub score: f64,
    pub npv_by_horizon: HorizonValues,
    /// Rate the annual value is discounted at.
    pub discount_rate: f64,
    pub status: EngineStatus,
}

impl EngineSummary {
    pub fn new(annual_value_inr: f64, score: f64, discount_rate: f64, horizons: &[u32]) -> Self {
        Self {
            annual_value_inr,
            score: score.clamp(0.0, 1.0),
            npv_by_horizon: npv_by_horizon(annual_value_inr, discount_rate, horizons),
            discount_rate,
            status: EngineStatus::Ok,
        }
    }

    pub fn degraded(reason: DegradedReason, discount_rate: f64, horizons: &[u32]) -> Self {
        Self {
            status: EngineStatus::Degraded { reason },
            ..Self::new(0.0, 0.0, discount_rate, horizons)
        }
    }

    /// Present value at `years`, computed on demand when not cached.
    pub fn npv_at(&self, years: u32) -> f64 {
        match self.npv_by_horizon.get(&years) {
            Some(&v) => v,
            None => crate::npv::present_value(self.annual_value_inr, self.discount_rate, years),
        }
    }

    /// Re-discounts to a new horizon set without re-running the model.
    pub fn rediscount(&self, horizons: &[u32]) -> Self {
        Self {
            npv_by_horizon: npv_by_horizon(self.annual_value_inr, self.discount_rate, horizons),
            ..self.clone()
        }
    }
}

/// Uniform read access to any engine result.
pub trait EngineOutput {
    fn summary(&self) -> &EngineSummary;

    fn rediscounted(&self, horizons: &[u32]) -> Self
    where
        Self: Sized;

    fn is_degraded(&self) -> bool {
        self.summary().status.is_degraded()
    }
}

/// The three engine results for one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct EngineBundle {
    pub hydrology: HydrologyResult,
    pub solar: SolarResult,
    pub carbon: CarbonResult,
}

impl EngineBundle {
    pub fn run(site: &Site, rates: &RateTables, horizons: &[u32]) -> Self {
        Self {
            hydrology: hydrology::analyze(site, rates, horizons),
            solar: solar::analyze(site, rates, horizons),
            carbon: carbon::analyze(site, rates, horizons),
        }
    }

    pub fn rediscounted(&self, horizons: &[u32]) -> Self {
        Self {
            hydrology: self.hydrology.rediscounted(horizons),
            solar: self.solar.rediscounted(horizons),
            carbon: self.carbon.rediscounted(horizons),
        }
    }

    pub fn degraded_count(&self) -> usize {
        [
            self.hydrology.is_degraded(),
            self.solar.is_degraded(),
            self.carbon.is_degraded(),
        ]
        .iter()
        .filter(|&&d| d)
        .count()
    }

    pub fn degraded_reasons(&self) -> Vec<DegradedReason> {
        [
            self.hydrology.summary().status,
            self.solar.summary().status,
            self.carbon.summary().status,
        ]
        .into_iter()
        .filter_map(|s| match s {
            EngineStatus::Degraded { reason } => Some(reason),
            EngineStatus::Ok => None,
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::tests::{reference_input, reference_site};
    use crate::site::Site;

    #[test]
    fn test_degraded_summary_is_all_zero() {
        let s = EngineSummary::degraded(DegradedReason::MissingRainfall, 0.06, &[1, 10]);
        assert_eq!(s.annual_value_inr, 0.0);
        assert_eq!(s.score, 0.0);
        assert!(s.npv_by_horizon.values().all(|&v| v == 0.0));
        assert!(s.status.is_degraded());
    }

    #[test]
    fn test_npv_at_uncached_horizon() {
        let s = EngineSummary::new(1_000.0, 0.5, 0.06, &[10]);
        let direct = crate::npv::present_value(1_000.0, 0.06, 7);
        assert_eq!(s.npv_at(7), direct);
        assert_eq!(s.npv_at(10), s.npv_by_horizon[&10]);
    }

    #[test]
    fn test_rediscount_matches_fresh_run() {
        let rates = RateTables::default();
        let site = reference_site();
        let short = EngineBundle::run(&site, &rates, &[1, 10]);
        let long = EngineBundle::run(&site, &rates, &[5, 40]);
        assert_eq!(short.rediscounted(&[5, 40]), long);
    }

    #[test]
    fn test_reference_site_has_no_degraded_engines() {
        let bundle = EngineBundle::run(&reference_site(), &RateTables::default(), &[10]);
        assert_eq!(bundle.degraded_count(), 0);
        assert!(bundle.degraded_reasons().is_empty());
    }

    #[test]
    fn test_missing_climate_degrades_two_engines() {
        let mut input = reference_input();
        input.annual_rainfall_mm = None;
        input.avg_daily_irradiance_kwh_m2 = None;
        let site = Site::new(input).unwrap();
        let bundle = EngineBundle::run(&site, &RateTables::default(), &[10]);
        assert_eq!(bundle.degraded_count(), 2);
        assert_eq!(
            bundle.degraded_reasons(),
            vec![
                DegradedReason::MissingRainfall,
                DegradedReason::MissingIrradiance
            ]
        );
    }

    #[test]
    fn test_status_serializes_tagged() {
        let json = serde_json::to_value(EngineStatus::Degraded {
            reason: DegradedReason::MissingIrradiance,
        })
        .unwrap();
        assert_eq!(json["state"], "degraded");
        assert_eq!(json["reason"], "missing_irradiance");
    }
}
