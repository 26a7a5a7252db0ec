//! Market-capital side: what developing the whole parcel for the stated
//! intent costs and returns.
//!
//! Phases, all scaled by parcel area:
//!   1. land acquisition at the intent's ₹/m² benchmark
//!   2. built-up area = area × FSI
//!   3. construction on the built-up area
//!   4. infrastructure and approvals as a share of construction
//!   5. drainage for the extra runoff, only on flood-exposed land
//!
//! Revenue is the built-up area at the intent's sale price. The one-time net
//! profit lands in the realization year; residual flood damage, a share of
//! gross revenue set by the flood risk label, lands with it.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::engines::HydrologyResult;
use crate::intent::UserIntent;
use crate::npv::discount_lump_sum;
use crate::rate_tables::{DevelopmentRates, RateTables};
use crate::scenario::RiskLabel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct DevelopmentCostBreakdown {
    pub intent: UserIntent,
    pub land_acquisition_cost_inr: f64,
    pub built_up_area_m2: f64,
    pub construction_cost_inr: f64,
    pub infrastructure_cost_inr: f64,
    pub flood_mitigation_cost_inr: f64,
    pub total_project_cost_inr: f64,
    pub gross_revenue_inr: f64,
    pub net_profit_inr: f64,
    pub profit_margin_pct: f64,
    pub roi_pct: f64,
    /// Share of gross revenue lost to residual flood damage.
    pub damage_rate: f64,
    /// Undiscounted residual flood damage (positive magnitude).
    pub flood_risk_cost_inr: f64,
}

/// Residual damage rate for a flood risk label.
pub fn damage_rate(label: RiskLabel, rates: &DevelopmentRates) -> f64 {
    match label {
        RiskLabel::Low => rates.damage_rate_low,
        RiskLabel::Moderate => rates.damage_rate_moderate,
        RiskLabel::High => rates.damage_rate_high,
    }
}

pub fn cost_breakdown(
    area_m2: f64,
    intent: UserIntent,
    hydrology: &HydrologyResult,
    rates: &RateTables,
) -> DevelopmentCostBreakdown {
    let d = &rates.development;

    let land_acquisition_cost_inr = area_m2 * d.land_cost_inr_per_m2.get(intent);
    let built_up_area_m2 = area_m2 * d.floor_space_index.get(intent);
    let construction_cost_inr = built_up_area_m2 * d.construction_cost_inr_per_m2.get(intent);
    let infrastructure_cost_inr = construction_cost_inr * d.infra_overhead.get(intent);

    let flood_mitigation_cost_inr = if hydrology.flood_risk_score > d.drainage_risk_threshold {
        let drainage_volume_m3 = hydrology.delta_runoff_mm / 1000.0 * area_m2;
        drainage_volume_m3 * d.drainage_cost_inr_per_m3
    } else {
        0.0
    };

    let total_project_cost_inr = land_acquisition_cost_inr
        + construction_cost_inr
        + infrastructure_cost_inr
        + flood_mitigation_cost_inr;
    let gross_revenue_inr = built_up_area_m2 * d.sale_price_inr_per_m2.get(intent);
    let net_profit_inr = gross_revenue_inr - total_project_cost_inr;

    let profit_margin_pct = if gross_revenue_inr > 0.0 {
        net_profit_inr / gross_revenue_inr * 100.0
    } else {
        0.0
    };
    let roi_pct = if total_project_cost_inr > 0.0 {
        net_profit_inr / total_project_cost_inr * 100.0
    } else {
        0.0
    };

    let damage_rate = damage_rate(hydrology.risk_label, d);

    DevelopmentCostBreakdown {
        intent,
        land_acquisition_cost_inr,
        built_up_area_m2,
        construction_cost_inr,
        infrastructure_cost_inr,
        flood_mitigation_cost_inr,
        total_project_cost_inr,
        gross_revenue_inr,
        net_profit_inr,
        profit_margin_pct,
        roi_pct,
        damage_rate,
        flood_risk_cost_inr: gross_revenue_inr * damage_rate,
    }
}

impl DevelopmentCostBreakdown {
    /// Year the profit is realised when the analysis stops at `horizon`.
    pub fn realization_year(horizon: u32, rates: &RateTables) -> u32 {
        rates.development.realization_year.min(horizon)
    }

    /// Net profit discounted at the infrastructure rate.
    pub fn profit_pv(&self, horizon: u32, rates: &RateTables) -> f64 {
        discount_lump_sum(
            self.net_profit_inr,
            rates.discount.infra,
            Self::realization_year(horizon, rates),
        )
    }

    /// Residual flood damage discounted like the profit it erodes.
    pub fn flood_risk_cost_pv(&self, horizon: u32, rates: &RateTables) -> f64 {
        discount_lump_sum(
            self.flood_risk_cost_inr,
            rates.discount.infra,
            Self::realization_year(horizon, rates),
        )
    }
}
