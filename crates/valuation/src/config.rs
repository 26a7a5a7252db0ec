/// Horizons (years) every analysis discounts to unless the request asks for more.
pub const STANDARD_HORIZONS: [u32; 4] = [1, 10, 25, 30];

/// Headline horizon when a request does not name one.
pub const DEFAULT_HORIZON_YEARS: u32 = 10;

/// Longest horizon accepted from a request.
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Green fraction used when a request does not carry a slider position.
pub const DEFAULT_GREEN_FRACTION: f64 = 0.5;

/// Tolerance on the land-cover distribution summing to 1.0.
pub const DISTRIBUTION_TOLERANCE: f64 = 0.01;

/// Square metres per hectare.
pub const M2_PER_HA: f64 = 10_000.0;

/// Days per year used for energy yield.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Hours per year used for the solar capacity utilization factor.
pub const HOURS_PER_YEAR: f64 = 8_760.0;

/// Step of the optimal-split search over the interactive green range.
pub const OPTIMIZER_STEP: f64 = 0.01;

/// Engine bundles kept by the session cache before the oldest is evicted.
pub const MAX_CACHED_ENGINE_RUNS: usize = 64;

/// Confidence deducted from an analysis for every degraded engine.
pub const DEGRADED_CONFIDENCE_PENALTY: f64 = 0.25;

/// Mean Earth radius in metres, for the polygon area estimate.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;
