//! Fractional split of a parcel between nature, development and solar.

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum AllocationCategory {
    Nature,
    Development,
    Solar,
}

impl AllocationCategory {
    pub const COUNT: usize = 3;

    pub const ALL: [AllocationCategory; Self::COUNT] = [
        AllocationCategory::Nature,
        AllocationCategory::Development,
        AllocationCategory::Solar,
    ];

    pub fn index(self) -> usize {
        match self {
            AllocationCategory::Nature => 0,
            AllocationCategory::Development => 1,
            AllocationCategory::Solar => 2,
        }
    }
}

/// Share of the parcel given to each category. Serialized as a map of the
/// non-zero shares (`{"nature": 0.4, "development": 0.6}`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
#[serde(
    from = "BTreeMap<AllocationCategory, f64>",
    into = "BTreeMap<AllocationCategory, f64>"
)]
pub struct Allocation {
    shares: [f64; AllocationCategory::COUNT],
}

impl Allocation {
    pub fn all_nature() -> Self {
        Self::split(1.0)
    }

    pub fn all_development() -> Self {
        Self::split(0.0)
    }

    /// `green` to nature, the remainder to development.
    pub fn split(green: f64) -> Self {
        let mut alloc = Self::default();
        alloc.shares[AllocationCategory::Nature.index()] = green;
        alloc.shares[AllocationCategory::Development.index()] = 1.0 - green;
        alloc
    }

    #[inline]
    pub fn share(&self, category: AllocationCategory) -> f64 {
        self.shares[category.index()]
    }

    pub fn total(&self) -> f64 {
        self.shares.iter().sum()
    }
}

impl From<BTreeMap<AllocationCategory, f64>> for Allocation {
    fn from(map: BTreeMap<AllocationCategory, f64>) -> Self {
        let mut alloc = Self::default();
        for (category, share) in map {
            alloc.shares[category.index()] = share;
        }
        alloc
    }
}

impl From<Allocation> for BTreeMap<AllocationCategory, f64> {
    fn from(alloc: Allocation) -> Self {
        AllocationCategory::ALL
            .iter()
            .map(|&c| (c, alloc.share(c)))
            .filter(|&(_, share)| share != 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sums_to_one() {
        for green in [0.0, 0.1, 0.37, 0.9, 1.0] {
            let alloc = Allocation::split(green);
            assert!(
                (alloc.total() - 1.0).abs() < 1e-12,
                "split({green}) sums to {}",
                alloc.total()
            );
        }
    }

    #[test]
    fn test_pure_allocations_serialize_single_key() {
        let json = serde_json::to_string(&Allocation::all_nature()).unwrap();
        assert_eq!(json, r#"{"nature":1.0}"#);
        let json = serde_json::to_string(&Allocation::all_development()).unwrap();
        assert_eq!(json, r#"{"development":1.0}"#);
    }

    #[test]
    fn test_map_roundtrip() {
        let alloc = Allocation::split(0.25);
        let json = serde_json::to_string(&alloc).unwrap();
        let back: Allocation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alloc);
    }
}
