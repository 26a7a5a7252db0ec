//! Policy coefficients for every engine, held as a single [`RateTables`] resource.
//!
//! The built-in tables come from published Indian and international benchmarks:
//!
//! | Group        | Source                                                     |
//! |--------------|------------------------------------------------------------|
//! | Curve numbers| NRCS TR-55, antecedent moisture condition II              |
//! | Carbon stock | IPCC 2006 GL Vol.4 Table 4.7 (tropical defaults, tC/ha)    |
//! | Carbon flux  | IPCC Tier 1 mean net sequestration (tC/ha/yr)              |
//! | SCC          | US EPA 2023 central estimate, $51/tCO₂                     |
//! | Stormwater   | NMCG / CPHEEO treatment cost, ₹55/m³                       |
//! | Water filter | TEEB India ecosystem-service averages, annualised          |
//! | Solar        | CERC / MNRE 2024 capex and tariff benchmarks               |
//! | Development  | Knight Frank 2024 land prices, CPWD DSR 2024 build costs   |
//!
//! An override file must name every constant: a missing field is a
//! [`ConfigError::MissingConstant`] at startup, never a silent default.

use std::path::Path;

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::intent::UserIntent;
use crate::land_cover::LandCoverClass;
use crate::scoring::ScoringWeights;

// =============================================================================
// Keyed tables
// =============================================================================

/// One value per land-cover class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct ClassTable {
    pub forest: f64,
    pub wetland: f64,
    pub agriculture: f64,
    pub urban: f64,
    pub open_land: f64,
    pub water: f64,
}

impl ClassTable {
    /// Values in [`LandCoverClass::index`] order.
    pub fn to_array(&self) -> [f64; LandCoverClass::COUNT] {
        [
            self.forest,
            self.wetland,
            self.agriculture,
            self.urban,
            self.open_land,
            self.water,
        ]
    }

    pub fn get(&self, class: LandCoverClass) -> f64 {
        self.to_array()[class.index()]
    }

    pub fn max(&self) -> f64 {
        self.to_array().into_iter().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// One value per user intent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct IntentTable {
    pub housing: f64,
    pub industry: f64,
    pub solar: f64,
    pub agriculture: f64,
    pub preserve: f64,
    pub mixed: f64,
}

impl IntentTable {
    pub fn get(&self, intent: UserIntent) -> f64 {
        match intent {
            UserIntent::Housing => self.housing,
            UserIntent::Industry => self.industry,
            UserIntent::Solar => self.solar,
            UserIntent::Agriculture => self.agriculture,
            UserIntent::Preserve => self.preserve,
            UserIntent::Mixed => self.mixed,
        }
    }

    fn values(&self) -> [f64; 6] {
        [
            self.housing,
            self.industry,
            self.solar,
            self.agriculture,
            self.preserve,
            self.mixed,
        ]
    }
}

// =============================================================================
// Per-engine groups
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct HydrologyRates {
    /// Rational-method runoff coefficient of each class in its natural state.
    pub runoff_coefficient: ClassTable,
    /// SCS curve number of each class.
    pub curve_number: ClassTable,
    /// Runoff coefficient once the parcel is fully built over.
    pub developed_runoff_coefficient: f64,
    /// Curve number once the parcel is fully built over.
    pub developed_curve_number: f64,
    /// Largest physically meaningful runoff coefficient (sealed surface).
    pub theoretical_max_runoff_coefficient: f64,
    /// ₹ of flood damage per mm of runoff per m² (₹55/m³ × 0.001 m³).
    pub damage_inr_per_mm_m2: f64,
    /// Weight of the terrain slope factor on the risk score.
    pub slope_weight: f64,
    /// Slope (%) at which the slope factor saturates.
    pub slope_reference_pct: f64,
    /// Water purification value of each class (₹/ha/yr).
    pub water_filtration_inr_per_ha_yr: ClassTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct SolarRates {
    /// Installed kWp per m² of usable area (400 W panel on 2 m²).
    pub capacity_density_kwp_per_m2: f64,
    /// Footprint of one panel in m².
    pub panel_area_m2: f64,
    /// System losses (inverter, soiling, temperature).
    pub derating_factor: f64,
    /// Grid feed-in tariff in ₹/kWh.
    pub feed_in_tariff_inr_per_kwh: f64,
    /// Installed cost in ₹/kWp.
    pub capex_inr_per_kwp: f64,
    /// Share of built-over (urban) cover usable as rooftop.
    pub rooftop_availability: f64,
    /// Payback reported when the array never pays back.
    pub payback_sentinel_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct CarbonRates {
    /// Standing carbon stock per class (tC/ha).
    pub stock_tc_per_ha: ClassTable,
    /// Net annual sequestration per class (tC/ha/yr).
    pub flux_tc_per_ha_yr: ClassTable,
    /// Molecular weight ratio CO₂/C.
    pub c_to_co2: f64,
    /// Social cost of carbon ($/tCO₂).
    pub scc_usd_per_tonne: f64,
    /// Voluntary market credit price ($/tCO₂).
    pub market_usd_per_tonne: f64,
    /// ₹ per US$.
    pub usd_to_inr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct DiscountRates {
    /// Green-bond rate applied to ecosystem-service flows.
    pub eco: f64,
    /// Infrastructure WACC applied to development and solar flows.
    pub infra: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct DevelopmentRates {
    /// Land acquisition cost (₹/m² of parcel).
    pub land_cost_inr_per_m2: IntentTable,
    /// Civil works cost (₹/m² built-up).
    pub construction_cost_inr_per_m2: IntentTable,
    /// Floor space index (built-up m² per parcel m²).
    pub floor_space_index: IntentTable,
    /// Sale or capitalised lease value (₹/m² built-up).
    pub sale_price_inr_per_m2: IntentTable,
    /// Roads, utilities and approvals as a share of construction.
    pub infra_overhead: IntentTable,
    /// Drainage investment per m³ of additional runoff on risky land.
    pub drainage_cost_inr_per_m3: f64,
    /// Flood risk score above which drainage must be built.
    pub drainage_risk_threshold: f64,
    /// Year in which the one-time development profit is realised.
    pub realization_year: u32,
    /// Residual flood damage as a share of gross revenue, by risk label.
    pub damage_rate_low: f64,
    pub damage_rate_moderate: f64,
    pub damage_rate_high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct ScenarioRates {
    /// Lower bound of the interactive green fraction.
    pub green_fraction_min: f64,
    /// Upper bound of the interactive green fraction.
    pub green_fraction_max: f64,
    /// Green fraction above which solar is assumed compatible with the plan.
    pub solar_green_threshold: f64,
    /// Share of solar revenue kept by a full-conservation plan (off-grid).
    pub off_grid_solar_share: f64,
}

// =============================================================================
// RateTables resource
// =============================================================================

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct RateTables {
    pub hydrology: HydrologyRates,
    pub solar: SolarRates,
    pub carbon: CarbonRates,
    pub discount: DiscountRates,
    pub development: DevelopmentRates,
    pub scenario: ScenarioRates,
    pub scoring: ScoringWeights,
}

impl Default for RateTables {
    fn default() -> Self {
        Self {
            hydrology: HydrologyRates {
                runoff_coefficient: ClassTable {
                    forest: 0.15,
                    wetland: 0.30,
                    agriculture: 0.40,
                    urban: 0.90,
                    open_land: 0.35,
                    water: 0.95,
                },
                curve_number: ClassTable {
                    forest: 55.0,
                    wetland: 78.0,
                    agriculture: 75.0,
                    urban: 92.0,
                    open_land: 68.0,
                    water: 98.0,
                },
                developed_runoff_coefficient: 0.90,
                developed_curve_number: 92.0,
                theoretical_max_runoff_coefficient: 0.95,
                damage_inr_per_mm_m2: 0.055,
                slope_weight: 0.20,
                slope_reference_pct: 30.0,
                water_filtration_inr_per_ha_yr: ClassTable {
                    forest: 30_000.0,
                    wetland: 50_000.0,
                    agriculture: 8_000.0,
                    urban: 1_000.0,
                    open_land: 2_000.0,
                    water: 20_000.0,
                },
            },
            solar: SolarRates {
                capacity_density_kwp_per_m2: 0.2,
                panel_area_m2: 2.0,
                derating_factor: 0.75,
                feed_in_tariff_inr_per_kwh: 4.5,
                capex_inr_per_kwp: 60_000.0,
                rooftop_availability: 0.30,
                payback_sentinel_years: 99.0,
            },
            carbon: CarbonRates {
                stock_tc_per_ha: ClassTable {
                    forest: 150.0,
                    wetland: 250.0,
                    agriculture: 20.0,
                    urban: 8.0,
                    open_land: 25.0,
                    water: 2.0,
                },
                flux_tc_per_ha_yr: ClassTable {
                    forest: 6.0,
                    wetland: 3.5,
                    agriculture: 0.25,
                    urban: 0.15,
                    open_land: 0.6,
                    water: 0.1,
                },
                c_to_co2: 44.0 / 12.0,
                scc_usd_per_tonne: 51.0,
                market_usd_per_tonne: 10.0,
                usd_to_inr: 83.0,
            },
            discount: DiscountRates {
                eco: 0.06,
                infra: 0.09,
            },
            development: DevelopmentRates {
                land_cost_inr_per_m2: IntentTable {
                    housing: 2_500.0,
                    industry: 1_800.0,
                    solar: 600.0,
                    agriculture: 400.0,
                    preserve: 200.0,
                    mixed: 2_000.0,
                },
                construction_cost_inr_per_m2: IntentTable {
                    housing: 25_000.0,
                    industry: 18_000.0,
                    solar: 0.0,
                    agriculture: 500.0,
                    preserve: 200.0,
                    mixed: 20_000.0,
                },
                floor_space_index: IntentTable {
                    housing: 1.5,
                    industry: 1.0,
                    solar: 0.0,
                    agriculture: 0.05,
                    preserve: 0.01,
                    mixed: 2.0,
                },
                sale_price_inr_per_m2: IntentTable {
                    housing: 55_000.0,
                    industry: 30_000.0,
                    solar: 0.0,
                    agriculture: 2_000.0,
                    preserve: 1_000.0,
                    mixed: 45_000.0,
                },
                infra_overhead: IntentTable {
                    housing: 0.20,
                    industry: 0.25,
                    solar: 0.10,
                    agriculture: 0.08,
                    preserve: 0.05,
                    mixed: 0.22,
                },
                drainage_cost_inr_per_m3: 120.0,
                drainage_risk_threshold: 0.35,
                realization_year: 3,
                damage_rate_low: 0.02,
                damage_rate_moderate: 0.10,
                damage_rate_high: 0.25,
            },
            scenario: ScenarioRates {
                green_fraction_min: 0.10,
                green_fraction_max: 0.90,
                solar_green_threshold: 0.15,
                off_grid_solar_share: 0.20,
            },
            scoring: ScoringWeights::default(),
        }
    }
}

impl RateTables {
    /// xxh32 of the bitcode encoding; equal tables give equal fingerprints.
    pub fn fingerprint(&self) -> u32 {
        xxhash_rust::xxh32::xxh32(&bitcode::encode(self), 0)
    }

    /// Parses and validates an override document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tables: RateTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Reads, parses and validates an override file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let tables = Self::from_json(&text)?;
        info!("Loaded rate tables from {}", path.display());
        Ok(tables)
    }

    /// Rejects constants that would make an engine meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = &self.hydrology;
        for c in h.runoff_coefficient.to_array() {
            check_range("hydrology.runoff_coefficient", c, 0.0, 1.0)?;
        }
        for cn in h.curve_number.to_array() {
            check_open_range("hydrology.curve_number", cn, 0.0, 100.0)?;
        }
        check_range(
            "hydrology.developed_runoff_coefficient",
            h.developed_runoff_coefficient,
            0.0,
            1.0,
        )?;
        check_open_range(
            "hydrology.developed_curve_number",
            h.developed_curve_number,
            0.0,
            100.0,
        )?;
        check_open_range(
            "hydrology.theoretical_max_runoff_coefficient",
            h.theoretical_max_runoff_coefficient,
            0.0,
            f64::INFINITY,
        )?;
        check_non_negative("hydrology.damage_inr_per_mm_m2", h.damage_inr_per_mm_m2)?;
        check_non_negative("hydrology.slope_weight", h.slope_weight)?;
        check_open_range(
            "hydrology.slope_reference_pct",
            h.slope_reference_pct,
            0.0,
            f64::INFINITY,
        )?;
        for v in h.water_filtration_inr_per_ha_yr.to_array() {
            check_non_negative("hydrology.water_filtration_inr_per_ha_yr", v)?;
        }

        let s = &self.solar;
        check_non_negative("solar.capacity_density_kwp_per_m2", s.capacity_density_kwp_per_m2)?;
        check_open_range("solar.panel_area_m2", s.panel_area_m2, 0.0, f64::INFINITY)?;
        check_range("solar.derating_factor", s.derating_factor, 0.0, 1.0)?;
        check_non_negative("solar.feed_in_tariff_inr_per_kwh", s.feed_in_tariff_inr_per_kwh)?;
        check_non_negative("solar.capex_inr_per_kwp", s.capex_inr_per_kwp)?;
        check_range("solar.rooftop_availability", s.rooftop_availability, 0.0, 1.0)?;
        check_non_negative("solar.payback_sentinel_years", s.payback_sentinel_years)?;

        let c = &self.carbon;
        for v in c.stock_tc_per_ha.to_array() {
            check_non_negative("carbon.stock_tc_per_ha", v)?;
        }
        for v in c.flux_tc_per_ha_yr.to_array() {
            check_non_negative("carbon.flux_tc_per_ha_yr", v)?;
        }
        check_open_range("carbon.c_to_co2", c.c_to_co2, 0.0, f64::INFINITY)?;
        check_non_negative("carbon.scc_usd_per_tonne", c.scc_usd_per_tonne)?;
        check_non_negative("carbon.market_usd_per_tonne", c.market_usd_per_tonne)?;
        check_open_range("carbon.usd_to_inr", c.usd_to_inr, 0.0, f64::INFINITY)?;

        check_open_range("discount.eco", self.discount.eco, -1.0, f64::INFINITY)?;
        check_open_range("discount.infra", self.discount.infra, -1.0, f64::INFINITY)?;

        let d = &self.development;
        for (field, table) in [
            ("development.land_cost_inr_per_m2", &d.land_cost_inr_per_m2),
            (
                "development.construction_cost_inr_per_m2",
                &d.construction_cost_inr_per_m2,
            ),
            ("development.floor_space_index", &d.floor_space_index),
            ("development.sale_price_inr_per_m2", &d.sale_price_inr_per_m2),
            ("development.infra_overhead", &d.infra_overhead),
        ] {
            for v in table.values() {
                check_non_negative(field, v)?;
            }
        }
        check_non_negative("development.drainage_cost_inr_per_m3", d.drainage_cost_inr_per_m3)?;
        check_range(
            "development.drainage_risk_threshold",
            d.drainage_risk_threshold,
            0.0,
            1.0,
        )?;
        check_range("development.damage_rate_low", d.damage_rate_low, 0.0, 1.0)?;
        check_range(
            "development.damage_rate_moderate",
            d.damage_rate_moderate,
            0.0,
            1.0,
        )?;
        check_range("development.damage_rate_high", d.damage_rate_high, 0.0, 1.0)?;

        let sc = &self.scenario;
        check_range("scenario.green_fraction_min", sc.green_fraction_min, 0.0, 1.0)?;
        check_range(
            "scenario.green_fraction_max",
            sc.green_fraction_max,
            sc.green_fraction_min,
            1.0,
        )?;
        check_range(
            "scenario.solar_green_threshold",
            sc.solar_green_threshold,
            0.0,
            1.0,
        )?;
        check_range(
            "scenario.off_grid_solar_share",
            sc.off_grid_solar_share,
            0.0,
            1.0,
        )?;

        self.scoring.validate()
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn check_open_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    if value.is_finite() && value > min && value < max {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_range(field, value, 0.0, f64::MAX)
}

// =============================================================================
// Tests
// =============================================================================
