//! Signed per-category cash flows that make up a scenario's NPV.

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowCategory {
    /// Net development profit (positive).
    DevProfit,
    /// Residual flood damage borne by built area (negative).
    FloodRiskCost,
    /// Sequestration valued at the social cost of carbon (positive).
    Carbon,
    /// Flood damage avoided by retained green cover (positive).
    FloodSavings,
    /// Feed-in revenue (positive).
    Solar,
    /// Water purification by retained cover (positive).
    WaterFiltration,
}

impl CashFlowCategory {
    pub const COUNT: usize = 6;

    pub const ALL: [CashFlowCategory; Self::COUNT] = [
        CashFlowCategory::DevProfit,
        CashFlowCategory::FloodRiskCost,
        CashFlowCategory::Carbon,
        CashFlowCategory::FloodSavings,
        CashFlowCategory::Solar,
        CashFlowCategory::WaterFiltration,
    ];

    pub fn index(self) -> usize {
        match self {
            CashFlowCategory::DevProfit => 0,
            CashFlowCategory::FloodRiskCost => 1,
            CashFlowCategory::Carbon => 2,
            CashFlowCategory::FloodSavings => 3,
            CashFlowCategory::Solar => 4,
            CashFlowCategory::WaterFiltration => 5,
        }
    }

    /// Ecosystem-service categories credited to natural capital.
    pub fn is_environmental(self) -> bool {
        matches!(
            self,
            CashFlowCategory::Carbon
                | CashFlowCategory::FloodSavings
                | CashFlowCategory::WaterFiltration
        )
    }
}

/// Present value of each category at one horizon. Every category is always
/// present in the serialized map, zero or not.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
#[serde(
    from = "BTreeMap<CashFlowCategory, f64>",
    into = "BTreeMap<CashFlowCategory, f64>"
)]
pub struct CashFlowBreakdown {
    values: [f64; CashFlowCategory::COUNT],
}

impl CashFlowBreakdown {
    #[inline]
    pub fn get(&self, category: CashFlowCategory) -> f64 {
        self.values[category.index()]
    }

    pub fn set(&mut self, category: CashFlowCategory, value: f64) {
        self.values[category.index()] = value;
    }

    pub fn with(mut self, category: CashFlowCategory, value: f64) -> Self {
        self.set(category, value);
        self
    }

    /// Sum of every category, in category order.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn environmental(&self) -> f64 {
        CashFlowCategory::ALL
            .iter()
            .filter(|c| c.is_environmental())
            .map(|&c| self.get(c))
            .sum()
    }
}

impl From<BTreeMap<CashFlowCategory, f64>> for CashFlowBreakdown {
    fn from(map: BTreeMap<CashFlowCategory, f64>) -> Self {
        let mut breakdown = Self::default();
        for (category, value) in map {
            breakdown.set(category, value);
        }
        breakdown
    }
}

impl From<CashFlowBreakdown> for BTreeMap<CashFlowCategory, f64> {
    fn from(breakdown: CashFlowBreakdown) -> Self {
        CashFlowCategory::ALL
            .iter()
            .map(|&c| (c, breakdown.get(c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_signed_sum() {
        let b = CashFlowBreakdown::default()
            .with(CashFlowCategory::DevProfit, 1_000.0)
            .with(CashFlowCategory::FloodRiskCost, -250.0)
            .with(CashFlowCategory::Carbon, 40.0);
        assert!((b.total() - 790.0).abs() < 1e-9, "total was {}", b.total());
    }

    #[test]
    fn test_environmental_only_counts_eco_terms() {
        let b = CashFlowBreakdown::default()
            .with(CashFlowCategory::DevProfit, 1_000.0)
            .with(CashFlowCategory::Carbon, 40.0)
            .with(CashFlowCategory::FloodSavings, 60.0)
            .with(CashFlowCategory::WaterFiltration, 25.0)
            .with(CashFlowCategory::Solar, 5.0);
        assert_eq!(b.environmental(), 125.0);
    }

    #[test]
    fn test_serialized_map_has_every_category() {
        let json = serde_json::to_value(CashFlowBreakdown::default()).unwrap();
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), CashFlowCategory::COUNT);
        assert!(map.contains_key("flood_risk_cost"));
        assert!(map.contains_key("dev_profit"));
        assert!(map.contains_key("water_filtration"));
    }
}
