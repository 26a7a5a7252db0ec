//! Ground-mount and rooftop solar potential of the parcel.
//!
//! Usable area is open land plus a share of built-over roofs. Capacity,
//! yield, revenue and payback follow from the rate tables; an array that
//! earns nothing reports the payback sentinel instead of dividing by zero.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::{EngineOutput, EngineSummary};
use crate::config::{DAYS_PER_YEAR, HOURS_PER_YEAR};
use crate::error::DegradedReason;
use crate::land_cover::LandCoverClass;
use crate::rate_tables::RateTables;
use crate::site::Site;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SolarResult {
    pub summary: EngineSummary,
    pub avg_daily_irradiance_kwh_m2: f64,
    pub usable_area_m2: f64,
    pub panel_count: u64,
    pub installed_capacity_kwp: f64,
    pub annual_yield_kwh: f64,
    pub annual_revenue_inr: f64,
    pub capex_inr: f64,
    pub payback_years: f64,
    /// Capacity utilization factor, `yield / (capacity × 8760 h)`.
    pub capacity_utilization: f64,
}

impl EngineOutput for SolarResult {
    fn summary(&self) -> &EngineSummary {
        &self.summary
    }

    fn rediscounted(&self, horizons: &[u32]) -> Self {
        Self {
            summary: self.summary.rediscount(horizons),
            ..self.clone()
        }
    }
}

/// Area eligible for panels: all open land plus the rooftop share of urban cover.
pub fn usable_area_m2(site: &Site, rates: &RateTables) -> f64 {
    let cover = site.land_cover();
    site.area_m2()
        * (cover.fraction(LandCoverClass::OpenLand)
            + cover.fraction(LandCoverClass::Urban) * rates.solar.rooftop_availability)
}

pub fn analyze(site: &Site, rates: &RateTables, horizons: &[u32]) -> SolarResult {
    analyze_area(site, usable_area_m2(site, rates), rates, horizons)
}

/// Same model on an explicitly chosen panel area.
pub fn analyze_area(
    site: &Site,
    usable_area_m2: f64,
    rates: &RateTables,
    horizons: &[u32],
) -> SolarResult {
    let s = &rates.solar;
    let discount = rates.discount.infra;
    let usable = usable_area_m2.max(0.0);
    let installed_capacity_kwp = usable * s.capacity_density_kwp_per_m2;
    let capex_inr = installed_capacity_kwp * s.capex_inr_per_kwp;
    let panel_count = (usable / s.panel_area_m2).floor() as u64;

    let reason = if site.area_m2() <= 0.0 {
        Some(DegradedReason::NonPositiveArea)
    } else if site.avg_daily_irradiance_kwh_m2().is_none() {
        Some(DegradedReason::MissingIrradiance)
    } else {
        None
    };
    if let Some(reason) = reason {
        return SolarResult {
            summary: EngineSummary::degraded(reason, discount, horizons),
            avg_daily_irradiance_kwh_m2: 0.0,
            usable_area_m2: usable,
            panel_count,
            installed_capacity_kwp,
            annual_yield_kwh: 0.0,
            annual_revenue_inr: 0.0,
            capex_inr,
            payback_years: s.payback_sentinel_years,
            capacity_utilization: 0.0,
        };
    }

    let irradiance = site.avg_daily_irradiance_kwh_m2().unwrap_or(0.0);
    let annual_yield_kwh = installed_capacity_kwp * irradiance * DAYS_PER_YEAR * s.derating_factor;
    let annual_revenue_inr = annual_yield_kwh * s.feed_in_tariff_inr_per_kwh;
    let payback_years = if annual_revenue_inr > 0.0 {
        capex_inr / annual_revenue_inr
    } else {
        s.payback_sentinel_years
    };
    let capacity_utilization = if installed_capacity_kwp > 0.0 {
        (annual_yield_kwh / (installed_capacity_kwp * HOURS_PER_YEAR)).clamp(0.0, 1.0)
    } else {
        0.0
    };

    SolarResult {
        summary: EngineSummary::new(annual_revenue_inr, capacity_utilization, discount, horizons),
        avg_daily_irradiance_kwh_m2: irradiance,
        usable_area_m2: usable,
        panel_count,
        installed_capacity_kwp,
        annual_yield_kwh,
        annual_revenue_inr,
        capex_inr,
        payback_years,
        capacity_utilization,
    }
}
