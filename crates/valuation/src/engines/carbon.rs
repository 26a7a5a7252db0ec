//! IPCC Tier 1 carbon accounting.
//!
//! Stored stock and annual sequestration both come from fixed per-class rate
//! tables (tC/ha and tC/ha/yr), converted to CO₂ with the 44/12 molecular
//! ratio. Sequestration is a rate, never a function of the current stock.
//!
//! | Output                     | Formula                                      |
//! |----------------------------|----------------------------------------------|
//! | `stored_co2_tons`          | Σ fraction × stock × area_ha × 44/12         |
//! | `annual_sequestration_...` | Σ fraction × flux × area_ha × 44/12          |
//! | `annual_carbon_value_inr`  | sequestration × SCC × USD→INR                |
//! | `annual_credit_revenue_inr`| sequestration × VCS price × USD→INR          |
//! | score                      | weighted stock density / densest class stock |

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::{EngineOutput, EngineSummary};
use crate::error::DegradedReason;
use crate::npv::{discount_schedule, npv_by_horizon, HorizonValues, ScheduleRow};
use crate::rate_tables::RateTables;
use crate::site::Site;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct CarbonResult {
    pub summary: EngineSummary,
    pub area_ha: f64,
    pub stored_co2_tons: f64,
    pub annual_sequestration_co2_tons: f64,
    pub annual_carbon_value_inr: f64,
    pub stored_carbon_value_inr: f64,
    /// Revenue if sequestration were sold as voluntary-market credits.
    pub annual_credit_revenue_inr: f64,
    pub credit_npv_by_horizon: HorizonValues,
}

impl CarbonResult {
    /// Undiscounted CO₂ sequestered over `years`.
    pub fn cumulative_sequestration(&self, years: u32) -> f64 {
        self.annual_sequestration_co2_tons * years as f64
    }

    /// Year-by-year credit revenue, discounted at the eco rate.
    pub fn credit_schedule(&self, years: u32) -> Vec<ScheduleRow> {
        discount_schedule(
            self.annual_credit_revenue_inr,
            self.summary.discount_rate,
            years,
        )
    }
}

impl EngineOutput for CarbonResult {
    fn summary(&self) -> &EngineSummary {
        &self.summary
    }

    fn rediscounted(&self, horizons: &[u32]) -> Self {
        Self {
            summary: self.summary.rediscount(horizons),
            credit_npv_by_horizon: npv_by_horizon(
                self.annual_credit_revenue_inr,
                self.summary.discount_rate,
                horizons,
            ),
            ..self.clone()
        }
    }
}

pub fn analyze(site: &Site, rates: &RateTables, horizons: &[u32]) -> CarbonResult {
    let c = &rates.carbon;
    let discount = rates.discount.eco;
    let area_ha = site.area_ha();

    if site.area_m2() <= 0.0 {
        return CarbonResult {
            summary: EngineSummary::degraded(DegradedReason::NonPositiveArea, discount, horizons),
            area_ha: 0.0,
            stored_co2_tons: 0.0,
            annual_sequestration_co2_tons: 0.0,
            annual_carbon_value_inr: 0.0,
            stored_carbon_value_inr: 0.0,
            annual_credit_revenue_inr: 0.0,
            credit_npv_by_horizon: npv_by_horizon(0.0, discount, horizons),
        };
    }

    let cover = site.land_cover();
    let stock_density = cover.weighted(&c.stock_tc_per_ha.to_array());
    let flux_density = cover.weighted(&c.flux_tc_per_ha_yr.to_array());

    let stored_co2_tons = stock_density * area_ha * c.c_to_co2;
    let annual_sequestration_co2_tons = flux_density * area_ha * c.c_to_co2;

    let scc_inr = c.scc_usd_per_tonne * c.usd_to_inr;
    let market_inr = c.market_usd_per_tonne * c.usd_to_inr;
    let annual_carbon_value_inr = annual_sequestration_co2_tons * scc_inr;
    let annual_credit_revenue_inr = annual_sequestration_co2_tons * market_inr;

    let densest = c.stock_tc_per_ha.max();
    let score = if densest > 0.0 {
        stock_density / densest
    } else {
        0.0
    };

    CarbonResult {
        summary: EngineSummary::new(annual_carbon_value_inr, score, discount, horizons),
        area_ha,
        stored_co2_tons,
        annual_sequestration_co2_tons,
        annual_carbon_value_inr,
        stored_carbon_value_inr: stored_co2_tons * scc_inr,
        annual_credit_revenue_inr,
        credit_npv_by_horizon: npv_by_horizon(annual_credit_revenue_inr, discount, horizons),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::land_cover::{LandCoverClass, LandCoverDistribution};
    use crate::site::tests::{reference_input, reference_site};

    #[test]
    fn test_reference_site_values() {
        let result = analyze(&reference_site(), &RateTables::default(), &[10]);
        // (0.6 × 150 + 0.4 × 25) tC/ha × 1 ha × 44/12
        let expected_stored = 100.0 * 44.0 / 12.0;
        assert!(
            (result.stored_co2_tons - expected_stored).abs() < 1e-9,
            "stored {}",
            result.stored_co2_tons
        );
        // (0.6 × 6 + 0.4 × 0.6) tC/ha/yr
        let expected_seq = 3.84 * 44.0 / 12.0;
        assert!((result.annual_sequestration_co2_tons - expected_seq).abs() < 1e-9);
        assert!((result.annual_carbon_value_inr - expected_seq * 51.0 * 83.0).abs() < 1e-6);
        assert!((result.annual_credit_revenue_inr - expected_seq * 10.0 * 83.0).abs() < 1e-6);
        assert!((result.summary.score - 100.0 / 250.0).abs() < 1e-12);
    }

    #[test]
    fn test_stored_co2_linear_in_area() {
        let site = reference_site();
        let rates = RateTables::default();
        let base = analyze(&site, &rates, &[10]);
        let doubled = analyze(&site.with_area(20_000.0).unwrap(), &rates, &[10]);
        assert!(
            (doubled.stored_co2_tons - 2.0 * base.stored_co2_tons).abs() < 1e-9,
            "doubling area must double stock"
        );
    }

    #[test]
    fn test_sequestration_independent_of_stock_table() {
        let site = reference_site();
        let mut rates = RateTables::default();
        let before = analyze(&site, &rates, &[10]).annual_sequestration_co2_tons;
        rates.carbon.stock_tc_per_ha.forest *= 3.0;
        let after = analyze(&site, &rates, &[10]).annual_sequestration_co2_tons;
        assert_eq!(before, after);
    }

    #[test]
    fn test_wetland_scores_one() {
        let mut input = reference_input();
        input.land_cover_distribution = LandCoverDistribution::uniform(LandCoverClass::Wetland);
        let site = Site::new(input).unwrap();
        let result = analyze(&site, &RateTables::default(), &[10]);
        assert_eq!(result.summary.score, 1.0);
    }

    #[test]
    fn test_cumulative_and_schedule() {
        let result = analyze(&reference_site(), &RateTables::default(), &[30]);
        assert_eq!(
            result.cumulative_sequestration(30),
            result.annual_sequestration_co2_tons * 30.0
        );
        let schedule = result.credit_schedule(30);
        assert_eq!(schedule.len(), 30);
        let last = schedule.last().unwrap().cumulative_npv;
        assert_eq!(last.to_bits(), result.credit_npv_by_horizon[&30].to_bits());
    }

    #[test]
    fn test_rediscount_updates_credit_npv() {
        let result = analyze(&reference_site(), &RateTables::default(), &[10]);
        let moved = result.rediscounted(&[25]);
        assert!(moved.credit_npv_by_horizon.contains_key(&25));
        assert!(!moved.credit_npv_by_horizon.contains_key(&10));
        assert_eq!(moved.stored_co2_tons, result.stored_co2_tons);
    }
}
