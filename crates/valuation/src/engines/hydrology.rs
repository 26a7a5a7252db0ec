//! Flood hydrology: how much runoff the parcel's current cover holds back,
//! what that is worth, and how exposed the parcel is.
//!
//! Valuation uses the rational-method runoff coefficient `C`:
//!
//! ```text
//! C_nat   = Σ fraction_c × C_c
//! ΔQ (mm) = max(0, P × (C_dev − C_nat))
//! avoided = ΔQ × area_m2 × damage_rate          (₹/yr)
//! risk    = clamp(C_nat / C_max × slope_factor, 0, 1)
//! ```
//!
//! SCS TR-55 curve-number runoff depths for the current and fully developed
//! cover are reported alongside for reference; they do not feed the value.
//!
//! Water filtration is valued separately from a per-class ₹/ha/yr table and
//! needs no rainfall:
//!
//! ```text
//! filtration = Σ fraction_c × W_c × area_ha     (₹/yr)
//! ```

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::{EngineOutput, EngineSummary};
use crate::error::DegradedReason;
use crate::rate_tables::{HydrologyRates, RateTables};
use crate::scenario::RiskLabel;
use crate::site::{Site, TerrainProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct HydrologyResult {
    pub summary: EngineSummary,
    pub annual_rainfall_mm: f64,
    pub natural_runoff_coefficient: f64,
    pub developed_runoff_coefficient: f64,
    pub delta_runoff_mm: f64,
    pub flood_risk_score: f64,
    pub risk_label: RiskLabel,
    pub annual_damage_avoided_inr: f64,
    pub cn_current: f64,
    pub cn_developed: f64,
    pub runoff_current_mm: f64,
    pub runoff_developed_mm: f64,
    /// Water purification by the current cover; score is the cover's
    /// filtration density relative to the best class.
    pub water_filtration: EngineSummary,
}

impl HydrologyResult {
    /// Flood risk fed to the composite score. A degraded run reports a zero
    /// risk it never measured, so it scores as the neutral midpoint instead.
    pub fn scoring_flood_risk(&self) -> f64 {
        if self.is_degraded() {
            UNMEASURED_FLOOD_RISK
        } else {
            self.flood_risk_score
        }
    }
}

/// Flood risk assumed for scoring when rainfall or area was unavailable.
pub const UNMEASURED_FLOOD_RISK: f64 = 0.5;

impl EngineOutput for HydrologyResult {
    fn summary(&self) -> &EngineSummary {
        &self.summary
    }

    fn rediscounted(&self, horizons: &[u32]) -> Self {
        Self {
            summary: self.summary.rediscount(horizons),
            water_filtration: self.water_filtration.rediscount(horizons),
            ..self.clone()
        }
    }
}

/// SCS TR-55 runoff depth (mm) for rainfall `p_mm` on cover with curve
/// number `cn`. Curve numbers outside `(0, 100)` yield no runoff.
pub fn scs_runoff_mm(p_mm: f64, cn: f64) -> f64 {
    if cn <= 0.0 || cn >= 100.0 {
        return 0.0;
    }
    let s = 25_400.0 / cn - 254.0;
    let ia = 0.2 * s;
    if p_mm <= ia {
        return 0.0;
    }
    (p_mm - ia).powi(2) / (p_mm + 0.8 * s)
}

/// Multiplier `1 + w × clamp(slope / ref, 0, 1)`; 1.0 without terrain data.
pub fn slope_factor(terrain: Option<&TerrainProfile>, rates: &HydrologyRates) -> f64 {
    match terrain {
        Some(t) => 1.0 + rates.slope_weight * (t.slope_pct / rates.slope_reference_pct).clamp(0.0, 1.0),
        None => 1.0,
    }
}

/// Annual water filtration value (₹) and its density score in `[0, 1]`.
pub fn water_filtration(site: &Site, rates: &HydrologyRates) -> (f64, f64) {
    let table = &rates.water_filtration_inr_per_ha_yr;
    let per_ha = site.land_cover().weighted(&table.to_array());
    let best = table.max();
    let score = if best > 0.0 { per_ha / best } else { 0.0 };
    (per_ha * site.area_ha(), score)
}

/// Flood risk in `[0, 1]` from the cover-weighted runoff coefficient.
pub fn flood_risk_score(
    natural_coefficient: f64,
    terrain: Option<&TerrainProfile>,
    rates: &HydrologyRates,
) -> f64 {
    let base = natural_coefficient / rates.theoretical_max_runoff_coefficient;
    (base * slope_factor(terrain, rates)).clamp(0.0, 1.0)
}

pub fn analyze(site: &Site, rates: &RateTables, horizons: &[u32]) -> HydrologyResult {
    let h = &rates.hydrology;
    let discount = rates.discount.eco;
    let cover = site.land_cover();

    let natural = cover.weighted(&h.runoff_coefficient.to_array());
    let cn_current = cover.weighted(&h.curve_number.to_array());
    let risk = flood_risk_score(natural, site.terrain(), h);
    let (filtration_inr, filtration_score) = water_filtration(site, h);
    let filtration = EngineSummary::new(filtration_inr.max(0.0), filtration_score, discount, horizons);

    let degraded = |reason| HydrologyResult {
        summary: EngineSummary::degraded(reason, discount, horizons),
        annual_rainfall_mm: 0.0,
        natural_runoff_coefficient: natural,
        developed_runoff_coefficient: h.developed_runoff_coefficient,
        delta_runoff_mm: 0.0,
        flood_risk_score: 0.0,
        risk_label: RiskLabel::Low,
        annual_damage_avoided_inr: 0.0,
        cn_current,
        cn_developed: h.developed_curve_number,
        runoff_current_mm: 0.0,
        runoff_developed_mm: 0.0,
        water_filtration: filtration.clone(),
    };

    if site.area_m2() <= 0.0 {
        return degraded(DegradedReason::NonPositiveArea);
    }
    let Some(rainfall) = site.annual_rainfall_mm() else {
        return degraded(DegradedReason::MissingRainfall);
    };

    let delta_runoff_mm = (rainfall * (h.developed_runoff_coefficient - natural)).max(0.0);
    let annual_damage_avoided_inr = delta_runoff_mm * site.area_m2() * h.damage_inr_per_mm_m2;

    HydrologyResult {
        summary: EngineSummary::new(annual_damage_avoided_inr, risk, discount, horizons),
        annual_rainfall_mm: rainfall,
        natural_runoff_coefficient: natural,
        developed_runoff_coefficient: h.developed_runoff_coefficient,
        delta_runoff_mm,
        flood_risk_score: risk,
        risk_label: RiskLabel::for_flood_score(risk),
        annual_damage_avoided_inr,
        cn_current,
        cn_developed: h.developed_curve_number,
        runoff_current_mm: scs_runoff_mm(rainfall, cn_current),
        runoff_developed_mm: scs_runoff_mm(rainfall, h.developed_curve_number),
        water_filtration: filtration,
    }
}
