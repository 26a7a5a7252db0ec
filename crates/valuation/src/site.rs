//! The validated, immutable parcel every engine reads.
//!
//! A [`Site`] can only be built through [`Site::new`], which rejects bad
//! geometry and bad land-cover distributions before any engine runs. Missing
//! climate inputs are *not* errors here: they are carried as `None` and the
//! affected engine degrades.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::{DISTRIBUTION_TOLERANCE, EARTH_RADIUS_M, M2_PER_HA};
use crate::error::InvalidSiteError;
use crate::land_cover::{LandCoverClass, LandCoverDistribution};

/// Enclosed areas below this many m² are treated as degenerate.
const MIN_POLYGON_AREA_M2: f64 = 1e-3;

// =============================================================================
// Geometry
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn in_range(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// An ordered ring of vertices. A closing vertex equal to the first is
/// dropped on validation, so GeoJSON-style rings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(try_from = "Vec<LatLng>", into = "Vec<LatLng>")]
pub struct Polygon {
    vertices: Vec<LatLng>,
}

impl TryFrom<Vec<LatLng>> for Polygon {
    type Error = InvalidSiteError;

    fn try_from(vertices: Vec<LatLng>) -> Result<Self, Self::Error> {
        Self::validated(vertices)
    }
}

impl From<Polygon> for Vec<LatLng> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices
    }
}

impl Polygon {
    pub fn validated(mut vertices: Vec<LatLng>) -> Result<Self, InvalidSiteError> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(InvalidSiteError::TooFewVertices(vertices.len()));
        }
        for (index, v) in vertices.iter().enumerate() {
            if !v.in_range() {
                return Err(InvalidSiteError::CoordinateOutOfRange {
                    index,
                    lat: v.lat,
                    lng: v.lng,
                });
            }
        }
        let polygon = Self { vertices };
        // A bow-tie's lobes cancel in the shoelace sum, so crossings come first.
        if let Some((first_edge, second_edge)) = polygon.first_crossing() {
            return Err(InvalidSiteError::SelfIntersecting {
                first_edge,
                second_edge,
            });
        }
        if polygon.area_m2() < MIN_POLYGON_AREA_M2 {
            return Err(InvalidSiteError::DegeneratePolygon);
        }
        Ok(polygon)
    }

    pub fn vertices(&self) -> &[LatLng] {
        &self.vertices
    }

    pub fn centroid(&self) -> LatLng {
        let n = self.vertices.len() as f64;
        let (lat, lng) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(a, b), v| (a + v.lat, b + v.lng));
        LatLng::new(lat / n, lng / n)
    }

    /// Vertices projected to local metres (equirectangular about the centroid).
    fn projected(&self) -> Vec<(f64, f64)> {
        let origin = self.centroid();
        let cos_lat = origin.lat.to_radians().cos();
        self.vertices
            .iter()
            .map(|v| {
                let x = (v.lng - origin.lng).to_radians() * EARTH_RADIUS_M * cos_lat;
                let y = (v.lat - origin.lat).to_radians() * EARTH_RADIUS_M;
                (x, y)
            })
            .collect()
    }

    /// Enclosed area estimate in m² (shoelace on the local projection).
    pub fn area_m2(&self) -> f64 {
        let pts = self.projected();
        let n = pts.len();
        let mut twice_area = 0.0;
        for i in 0..n {
            let (x0, y0) = pts[i];
            let (x1, y1) = pts[(i + 1) % n];
            twice_area += x0 * y1 - x1 * y0;
        }
        (twice_area * 0.5).abs()
    }

    /// First pair of non-adjacent edges that touch or cross, if any.
    /// Edge `i` runs from vertex `i` to vertex `i + 1`.
    fn first_crossing(&self) -> Option<(usize, usize)> {
        let pts = self.projected();
        let n = pts.len();
        for i in 0..n {
            let a = (pts[i], pts[(i + 1) % n]);
            for j in (i + 1)..n {
                // Adjacent edges share a vertex by construction.
                if j == i + 1 || (i == 0 && j == n - 1) {
                    continue;
                }
                let b = (pts[j], pts[(j + 1) % n]);
                if segments_intersect(a.0, a.1, b.0, b.1) {
                    return Some((i, j));
                }
            }
        }
        None
    }
}

fn orientation(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
    (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
}

fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
    r.0 >= p.0.min(q.0) && r.0 <= p.0.max(q.0) && r.1 >= p.1.min(q.1) && r.1 <= p.1.max(q.1)
}

fn segments_intersect(p1: (f64, f64), p2: (f64, f64), p3: (f64, f64), p4: (f64, f64)) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(p3, p4, p1))
        || (d2 == 0.0 && on_segment(p3, p4, p2))
        || (d3 == 0.0 && on_segment(p1, p2, p3))
        || (d4 == 0.0 && on_segment(p1, p2, p4))
}

// =============================================================================
// Terrain
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TerrainProfile {
    pub mean_elevation_m: f64,
    pub slope_pct: f64,
}

impl TerrainProfile {
    pub fn terrain_type(&self) -> &'static str {
        if self.slope_pct < 2.0 {
            "Flat"
        } else if self.slope_pct < 10.0 {
            "Hilly"
        } else {
            "Mountainous"
        }
    }
}

// =============================================================================
// Site
// =============================================================================

/// Raw site inputs before validation. Also the serde shape a stored [`Site`]
/// is read back through.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteInput {
    pub area_m2: f64,
    pub polygon: Vec<LatLng>,
    pub land_cover_distribution: LandCoverDistribution,
    #[serde(default)]
    pub dominant_type: Option<LandCoverClass>,
    #[serde(default)]
    pub annual_rainfall_mm: Option<f64>,
    #[serde(default)]
    pub avg_daily_irradiance_kwh_m2: Option<f64>,
    #[serde(default)]
    pub terrain: Option<TerrainProfile>,
}

/// Deserializing re-runs [`Site::new`], so a stored site is as trustworthy as
/// a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(try_from = "SiteInput")]
pub struct Site {
    area_m2: f64,
    polygon: Polygon,
    land_cover_distribution: LandCoverDistribution,
    dominant_type: LandCoverClass,
    annual_rainfall_mm: Option<f64>,
    avg_daily_irradiance_kwh_m2: Option<f64>,
    terrain: Option<TerrainProfile>,
}

impl Site {
    pub fn new(input: SiteInput) -> Result<Self, InvalidSiteError> {
        if !input.area_m2.is_finite() || input.area_m2 <= 0.0 {
            return Err(InvalidSiteError::NonPositiveArea(input.area_m2));
        }
        let polygon = Polygon::validated(input.polygon)?;

        let dist = input.land_cover_distribution;
        for class in LandCoverClass::ALL {
            let fraction = dist.fraction(class);
            if !fraction.is_finite() || fraction < 0.0 {
                return Err(InvalidSiteError::NegativeFraction {
                    class: class.name(),
                    fraction,
                });
            }
        }
        if (dist.sum() - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(InvalidSiteError::DistributionSum(dist.sum()));
        }

        for (field, value) in [
            ("annual_rainfall_mm", input.annual_rainfall_mm),
            (
                "avg_daily_irradiance_kwh_m2",
                input.avg_daily_irradiance_kwh_m2,
            ),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(InvalidSiteError::NegativeClimateValue { field, value: v });
                }
            }
        }
        if let Some(terrain) = input.terrain {
            if !terrain.slope_pct.is_finite() || terrain.slope_pct < 0.0 {
                return Err(InvalidSiteError::NegativeClimateValue {
                    field: "slope_pct",
                    value: terrain.slope_pct,
                });
            }
        }

        Ok(Self {
            area_m2: input.area_m2,
            polygon,
            dominant_type: input.dominant_type.unwrap_or_else(|| dist.dominant()),
            land_cover_distribution: dist,
            annual_rainfall_mm: input.annual_rainfall_mm,
            avg_daily_irradiance_kwh_m2: input.avg_daily_irradiance_kwh_m2,
            terrain: input.terrain,
        })
    }

    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    pub fn area_ha(&self) -> f64 {
        self.area_m2 / M2_PER_HA
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn land_cover(&self) -> &LandCoverDistribution {
        &self.land_cover_distribution
    }

    pub fn dominant_type(&self) -> LandCoverClass {
        self.dominant_type
    }

    pub fn annual_rainfall_mm(&self) -> Option<f64> {
        self.annual_rainfall_mm
    }

    pub fn avg_daily_irradiance_kwh_m2(&self) -> Option<f64> {
        self.avg_daily_irradiance_kwh_m2
    }

    pub fn terrain(&self) -> Option<&TerrainProfile> {
        self.terrain.as_ref()
    }

    /// Same parcel with its area scaled; used by linearity checks.
    pub fn with_area(&self, area_m2: f64) -> Result<Self, InvalidSiteError> {
        if !area_m2.is_finite() || area_m2 <= 0.0 {
            return Err(InvalidSiteError::NonPositiveArea(area_m2));
        }
        Ok(Self {
            area_m2,
            ..self.clone()
        })
    }

    pub fn key(&self) -> SiteKey {
        SiteKey(xxhash_rust::xxh32::xxh32(&bitcode::encode(self), 0))
    }
}

impl TryFrom<SiteInput> for Site {
    type Error = InvalidSiteError;

    fn try_from(input: SiteInput) -> Result<Self, Self::Error> {
        Self::new(input)
    }
}

/// Content hash of a [`Site`], used to memoize engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct SiteKey(pub u32);

// =============================================================================
// Tests
// =============================================================================
