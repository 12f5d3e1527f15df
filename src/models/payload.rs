//! The cached domain record.

use serde::{Deserialize, Serialize};

/// Latest sampled conditions for one lake.
///
/// The cache stores and returns this whole; only `lake_id` is meaningful to
/// callers as the cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LakeConditions {
    /// Sample date as reported by the buoy feed
    pub sample_date: String,
    pub lake_name: String,
    pub lake_id: String,
    /// Air temperature, °C
    pub air_temp: f64,
    /// Surface water temperature, °C
    pub water_temp: f64,
    /// Wind speed, m/s
    pub wind_speed: f64,
    /// Wind direction, degrees
    pub wind_dir: i32,
    /// Estimated Secchi depth, m
    pub secchi_est: f64,
    /// Median phycocyanin reading
    pub phyco_median: f64,
    /// Thermocline depth, m
    pub thermocline_depth: f64,
}
