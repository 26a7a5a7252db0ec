// ---------------------------------------------------------------------------
// Error types: site rejection, engine degradation, configuration
// ---------------------------------------------------------------------------

use std::fmt;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Reasons a site is rejected before any engine runs.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidSiteError {
    /// Declared parcel area is zero, negative or not finite.
    NonPositiveArea(f64),
    /// Polygon has fewer than three vertices.
    TooFewVertices(usize),
    /// A vertex lies outside lat [-90, 90] / lng [-180, 180].
    CoordinateOutOfRange { index: usize, lat: f64, lng: f64 },
    /// Polygon encloses no area (collinear or repeated vertices).
    DegeneratePolygon,
    /// Two non-adjacent edges cross.
    SelfIntersecting { first_edge: usize, second_edge: usize },
    /// A land-cover fraction is negative or not finite.
    NegativeFraction { class: &'static str, fraction: f64 },
    /// Fractions do not sum to 1.0 within tolerance.
    DistributionSum(f64),
    /// Rainfall or irradiance is present but negative or not finite.
    NegativeClimateValue { field: &'static str, value: f64 },
}

impl fmt::Display for InvalidSiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSiteError::NonPositiveArea(area) => {
                write!(f, "Site area must be positive, got {area} m²")
            }
            InvalidSiteError::TooFewVertices(n) => {
                write!(f, "Polygon needs at least 3 vertices, got {n}")
            }
            InvalidSiteError::CoordinateOutOfRange { index, lat, lng } => {
                write!(f, "Vertex {index} ({lat}, {lng}) is outside valid lat/lng range")
            }
            InvalidSiteError::DegeneratePolygon => write!(f, "Polygon encloses no area"),
            InvalidSiteError::SelfIntersecting {
                first_edge,
                second_edge,
            } => write!(
                f,
                "Polygon is self-intersecting: edge {first_edge} crosses edge {second_edge}"
            ),
            InvalidSiteError::NegativeFraction { class, fraction } => {
                write!(f, "Land-cover fraction for {class} is invalid: {fraction}")
            }
            InvalidSiteError::DistributionSum(sum) => {
                write!(f, "Land-cover fractions must sum to 1.0, got {sum:.4}")
            }
            InvalidSiteError::NegativeClimateValue { field, value } => {
                write!(f, "{field} must be non-negative, got {value}")
            }
        }
    }
}

impl std::error::Error for InvalidSiteError {}

/// Why an engine returned a zeroed result instead of a modeled one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    MissingRainfall,
    MissingIrradiance,
    NonPositiveArea,
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradedReason::MissingRainfall => write!(f, "annual rainfall unavailable"),
            DegradedReason::MissingIrradiance => write!(f, "solar irradiance unavailable"),
            DegradedReason::NonPositiveArea => write!(f, "site area is not positive"),
        }
    }
}

/// Rate-table problems. Only ever raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A constant is absent from the override file.
    MissingConstant(String),
    /// A constant is present but outside its valid range.
    InvalidValue { field: &'static str, value: f64 },
    /// The override file is not valid JSON for the rate-table schema.
    Parse(String),
    /// The override file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingConstant(name) => write!(f, "Missing rate-table constant: {name}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Rate-table constant {field} has invalid value {value}")
            }
            ConfigError::Parse(msg) => write!(f, "Rate-table parse error: {msg}"),
            ConfigError::Io(e) => write!(f, "Rate-table I/O error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        // serde reports absent struct fields as "missing field `name`".
        let msg = e.to_string();
        match msg
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
        {
            Some(name) => ConfigError::MissingConstant(name.to_string()),
            None => ConfigError::Parse(msg),
        }
    }
}

/// Top-level error for an analysis request.
#[derive(Debug)]
pub enum ValuationError {
    InvalidSite(InvalidSiteError),
    /// Requested horizon is zero or beyond the supported maximum.
    InvalidHorizon(u32),
    Config(ConfigError),
}

impl fmt::Display for ValuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuationError::InvalidSite(e) => write!(f, "Invalid site: {e}"),
            ValuationError::InvalidHorizon(years) => write!(
                f,
                "Horizon must be between 1 and {} years, got {years}",
                crate::config::MAX_HORIZON_YEARS
            ),
            ValuationError::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for ValuationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValuationError::InvalidSite(e) => Some(e),
            ValuationError::InvalidHorizon(_) => None,
            ValuationError::Config(e) => Some(e),
        }
    }
}

impl From<InvalidSiteError> for ValuationError {
    fn from(e: InvalidSiteError) -> Self {
        ValuationError::InvalidSite(e)
    }
}

impl From<ConfigError> for ValuationError {
    fn from(e: ConfigError) -> Self {
        ValuationError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_site_display_area() {
        let err = InvalidSiteError::NonPositiveArea(0.0);
        let msg = format!("{err}");
        assert!(msg.contains("positive"), "got: {msg}");
    }

    #[test]
    fn test_invalid_site_display_distribution() {
        let err = InvalidSiteError::DistributionSum(0.8);
        let msg = format!("{err}");
        assert!(msg.contains("0.8000"), "got: {msg}");
    }

    #[test]
    fn test_config_error_from_missing_field() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Needs {
            discount_rate: f64,
        }
        let parse: Result<Needs, _> = serde_json::from_str("{}");
        let err: ConfigError = parse.unwrap_err().into();
        match err {
            ConfigError::MissingConstant(name) => assert_eq!(name, "discount_rate"),
            other => panic!("expected MissingConstant, got {other:?}"),
        }
    }

    #[test]
    fn test_config_error_from_syntax_error() {
        let parse: Result<f64, _> = serde_json::from_str("{not json");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_error_io_has_source() {
        let err = ConfigError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_valuation_error_wraps_site_error() {
        let err: ValuationError = InvalidSiteError::TooFewVertices(2).into();
        let msg = format!("{err}");
        assert!(msg.starts_with("Invalid site"), "got: {msg}");
        assert!(msg.contains("got 2"), "got: {msg}");
    }

    #[test]
    fn test_degraded_reason_serializes_snake_case() {
        let json = serde_json::to_string(&DegradedReason::MissingRainfall).unwrap();
        assert_eq!(json, "\"missing_rainfall\"");
    }
}
