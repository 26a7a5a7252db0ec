//! Composite decision index blending environmental NPV, financial NPV and
//! flood exposure.
//!
//! Each NPV is mapped onto `[0, 1)` with a saturating curve
//! `1 − exp(−max(npv, 0) / reference)`, so a project worth `reference` rupees
//! scores about 0.63 on that axis and losses score 0. The two value axes are
//! blended with `environmental_weight`, then mixed with a safety axis
//! `1 − flood_risk` under `risk_weight`, and rescaled to `0..=100`:
//!
//! ```text
//! eco   = 1 − e^(−max(env, 0) / env_ref)
//! fin   = 1 − e^(−max(fin, 0) / fin_ref)
//! value = w × eco + (1 − w) × fin
//! score = round(100 × ((1 − ρ) × value + ρ × (1 − flood_risk)))
//! ```
//!
//! The environmental share of the blend is set by `w` against fixed
//! references rather than by `env / (env + fin)`, so the score stays defined
//! when both NPVs are zero or negative.
//!
//! Investors and conservationists weigh these differently, so every
//! parameter lives in [`ScoringWeights`] and travels with every result.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(deny_unknown_fields)]
pub struct ScoringWeights {
    /// Weight of the environmental axis in `[0, 1]`.
    pub environmental_weight: f64,
    /// Environmental NPV (₹) at which the eco axis reaches 1 − 1/e.
    pub environmental_reference_inr: f64,
    /// Financial NPV (₹) at which the financial axis reaches 1 − 1/e.
    pub financial_reference_inr: f64,
    /// Share of the score given to flood safety, `1 − flood_risk`, in `[0, 1]`.
    pub risk_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            environmental_weight: 0.5,
            environmental_reference_inr: 5_000_000.0,
            financial_reference_inr: 50_000_000.0,
            risk_weight: 0.20,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("scoring.environmental_weight", self.environmental_weight),
            ("scoring.risk_weight", self.risk_weight),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        for (field, value) in [
            (
                "scoring.environmental_reference_inr",
                self.environmental_reference_inr,
            ),
            (
                "scoring.financial_reference_inr",
                self.financial_reference_inr,
            ),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}

fn saturate(npv: f64, reference: f64) -> f64 {
    if !npv.is_finite() {
        return if npv > 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - (-npv.max(0.0) / reference).exp()
}

/// Environmental axis in `[0, 1)`.
pub fn environmental_axis(environmental_npv: f64, weights: &ScoringWeights) -> f64 {
    saturate(environmental_npv, weights.environmental_reference_inr)
}

/// Financial axis in `[0, 1)`.
pub fn financial_axis(financial_npv: f64, weights: &ScoringWeights) -> f64 {
    saturate(financial_npv, weights.financial_reference_inr)
}

/// Safety axis `1 − flood_risk`; an unknown (NaN) risk counts as certain.
pub fn safety_axis(flood_risk: f64) -> f64 {
    if flood_risk.is_nan() {
        return 0.0;
    }
    1.0 - flood_risk.clamp(0.0, 1.0)
}

/// Pure function of its inputs: re-scoring a stored result reproduces its
/// score exactly.
pub fn composite_score(
    environmental_npv: f64,
    financial_npv: f64,
    flood_risk: f64,
    weights: &ScoringWeights,
) -> u8 {
    let w = weights.environmental_weight;
    let value = w * environmental_axis(environmental_npv, weights)
        + (1.0 - w) * financial_axis(financial_npv, weights);
    let rho = weights.risk_weight;
    let blend = (1.0 - rho) * value + rho * safety_axis(flood_risk);
    (100.0 * blend).round().clamp(0.0, 100.0) as u8
}
