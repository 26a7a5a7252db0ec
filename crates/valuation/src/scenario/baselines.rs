//! Per-site values at 100 % allocation, computed once and reused by every
//! scenario and every slider move.

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::development::DevelopmentCostBreakdown;
use crate::engines::{EngineBundle, EngineOutput};
use crate::rate_tables::{RateTables, ScenarioRates};

/// Present values at one horizon if the whole parcel went one way.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct HorizonBaseline {
    pub dev_profit_100pct: f64,
    /// Positive magnitude; scenarios book it as a negative term.
    pub flood_risk_cost_100pct: f64,
    pub carbon_100pct: f64,
    pub flood_100pct: f64,
    pub water_100pct: f64,
    pub solar_revenue_base: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ScenarioBaselines {
    pub flood_risk_score: f64,
    pub policy: ScenarioRates,
    pub by_horizon: BTreeMap<u32, HorizonBaseline>,
}

impl ScenarioBaselines {
    pub fn from_engines(
        engines: &EngineBundle,
        development: &DevelopmentCostBreakdown,
        rates: &RateTables,
        horizons: &[u32],
    ) -> Self {
        let by_horizon = horizons
            .iter()
            .map(|&h| {
                (
                    h,
                    HorizonBaseline {
                        dev_profit_100pct: development.profit_pv(h, rates),
                        flood_risk_cost_100pct: development.flood_risk_cost_pv(h, rates),
                        carbon_100pct: engines.carbon.summary().npv_at(h),
                        flood_100pct: engines.hydrology.summary().npv_at(h),
                        water_100pct: engines.hydrology.water_filtration.npv_at(h),
                        solar_revenue_base: engines.solar.summary().npv_at(h),
                    },
                )
            })
            .collect();
        Self {
            flood_risk_score: engines.hydrology.flood_risk_score,
            policy: rates.scenario,
            by_horizon,
        }
    }

    pub fn horizons(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_horizon.keys().copied()
    }

    pub fn at(&self, horizon: u32) -> HorizonBaseline {
        self.by_horizon.get(&horizon).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::development::cost_breakdown;
    use crate::intent::UserIntent;
    use crate::site::tests::reference_site;

    #[test]
    fn test_baselines_cover_requested_horizons() {
        let rates = RateTables::default();
        let site = reference_site();
        let engines = EngineBundle::run(&site, &rates, &[1, 10, 25, 30]);
        let dev = cost_breakdown(site.area_m2(), UserIntent::Mixed, &engines.hydrology, &rates);
        let baselines = ScenarioBaselines::from_engines(&engines, &dev, &rates, &[1, 10, 25, 30]);

        assert_eq!(baselines.horizons().collect::<Vec<_>>(), vec![1, 10, 25, 30]);
        let b10 = baselines.at(10);
        assert_eq!(b10.carbon_100pct, engines.carbon.summary.npv_by_horizon[&10]);
        assert_eq!(b10.flood_100pct, engines.hydrology.summary.npv_by_horizon[&10]);
        assert_eq!(b10.solar_revenue_base, engines.solar.summary.npv_by_horizon[&10]);
        assert_eq!(
            b10.water_100pct,
            engines.hydrology.water_filtration.npv_by_horizon[&10]
        );
        assert!(b10.water_100pct > 0.0);
        assert!(b10.dev_profit_100pct > 0.0);
        assert!(b10.flood_risk_cost_100pct > 0.0);
        assert!(baselines.at(30).carbon_100pct > b10.carbon_100pct);
    }

    #[test]
    fn test_missing_horizon_is_zero() {
        let rates = RateTables::default();
        let site = reference_site();
        let engines = EngineBundle::run(&site, &rates, &[10]);
        let dev = cost_breakdown(site.area_m2(), UserIntent::Mixed, &engines.hydrology, &rates);
        let baselines = ScenarioBaselines::from_engines(&engines, &dev, &rates, &[10]);
        assert_eq!(baselines.at(7), HorizonBaseline::default());
    }
}
