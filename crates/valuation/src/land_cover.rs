//! Land-cover classes and the fractional distribution of a parcel across them.
//!
//! The class list is closed: upstream classifiers map whatever tags they see
//! onto these six buckets, and every per-class rate table in [`crate::rate_tables`]
//! is a fixed array indexed by [`LandCoverClass::index`].

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::DISTRIBUTION_TOLERANCE;

// =============================================================================
// LandCoverClass
// =============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum LandCoverClass {
    Forest,
    Wetland,
    Agriculture,
    Urban,
    OpenLand,
    Water,
}

impl LandCoverClass {
    pub const COUNT: usize = 6;

    pub const ALL: [LandCoverClass; Self::COUNT] = [
        LandCoverClass::Forest,
        LandCoverClass::Wetland,
        LandCoverClass::Agriculture,
        LandCoverClass::Urban,
        LandCoverClass::OpenLand,
        LandCoverClass::Water,
    ];

    /// Position of this class in every per-class table.
    pub fn index(self) -> usize {
        match self {
            LandCoverClass::Forest => 0,
            LandCoverClass::Wetland => 1,
            LandCoverClass::Agriculture => 2,
            LandCoverClass::Urban => 3,
            LandCoverClass::OpenLand => 4,
            LandCoverClass::Water => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LandCoverClass::Forest => "Forest",
            LandCoverClass::Wetland => "Wetland",
            LandCoverClass::Agriculture => "Agriculture",
            LandCoverClass::Urban => "Urban",
            LandCoverClass::OpenLand => "Open Land",
            LandCoverClass::Water => "Water",
        }
    }

    /// True for cover that is already built over.
    pub fn is_developed(self) -> bool {
        matches!(self, LandCoverClass::Urban)
    }
}

// =============================================================================
// LandCoverDistribution
// =============================================================================

/// Fraction of the parcel covered by each class.
///
/// Serialized as a map (`{"forest": 0.6, "open_land": 0.4}`); classes absent
/// from the map are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
#[serde(
    from = "BTreeMap<LandCoverClass, f64>",
    into = "BTreeMap<LandCoverClass, f64>"
)]
pub struct LandCoverDistribution {
    fractions: [f64; LandCoverClass::COUNT],
}

impl LandCoverDistribution {
    pub fn from_pairs(pairs: &[(LandCoverClass, f64)]) -> Self {
        let mut dist = Self::default();
        for &(class, fraction) in pairs {
            dist.fractions[class.index()] += fraction;
        }
        dist
    }

    /// A parcel entirely covered by one class.
    pub fn uniform(class: LandCoverClass) -> Self {
        Self::from_pairs(&[(class, 1.0)])
    }

    #[inline]
    pub fn fraction(&self, class: LandCoverClass) -> f64 {
        self.fractions[class.index()]
    }

    pub fn sum(&self) -> f64 {
        self.fractions.iter().sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= DISTRIBUTION_TOLERANCE
    }

    /// Classes with a non-zero share, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (LandCoverClass, f64)> + '_ {
        LandCoverClass::ALL
            .iter()
            .map(|&class| (class, self.fraction(class)))
            .filter(|&(_, fraction)| fraction != 0.0)
    }

    /// Area-weighted mean of a per-class table.
    pub fn weighted(&self, table: &[f64; LandCoverClass::COUNT]) -> f64 {
        LandCoverClass::ALL
            .iter()
            .map(|&class| self.fraction(class) * table[class.index()])
            .sum()
    }

    /// Class with the largest share. Ties resolve to the earlier class in
    /// table order.
    pub fn dominant(&self) -> LandCoverClass {
        let mut best = LandCoverClass::OpenLand;
        let mut best_fraction = f64::NEG_INFINITY;
        for &class in LandCoverClass::ALL.iter() {
            let fraction = self.fraction(class);
            if fraction > best_fraction {
                best = class;
                best_fraction = fraction;
            }
        }
        best
    }
}

impl From<BTreeMap<LandCoverClass, f64>> for LandCoverDistribution {
    fn from(map: BTreeMap<LandCoverClass, f64>) -> Self {
        let pairs: Vec<(LandCoverClass, f64)> = map.into_iter().collect();
        Self::from_pairs(&pairs)
    }
}

impl From<LandCoverDistribution> for BTreeMap<LandCoverClass, f64> {
    fn from(dist: LandCoverDistribution) -> Self {
        dist.iter().collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
