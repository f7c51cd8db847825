//! Pipeline configuration
//!
//! Every number that shapes a result is configuration: date range, months,
//! danger threshold, cloud cover, scale, bin edges and mask class. Configs
//! deserialize from TOML and are validated before any grid is touched.

use crate::classification::BinEdges;
use crate::landcover::LandCoverClass;
use crate::statistics::Scale;
use climstress_core::{DateRange, Error, MonthSet, Result};
use serde::{Deserialize, Serialize};

/// Plausible range for a heat-index danger threshold, °C
pub const THRESHOLD_RANGE_C: (f64, f64) = (-60.0, 80.0);

/// Which boundary to work in, and how much to simplify it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyArea {
    /// Name looked up in the boundary archive
    pub boundary: String,
    /// Douglas-Peucker tolerance in CRS units; `None` keeps the full geometry
    #[serde(default)]
    pub simplify_tolerance: Option<f64>,
}

impl StudyArea {
    pub fn named(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            simplify_tolerance: None,
        }
    }

    pub fn simplified(mut self, tolerance: f64) -> Self {
        self.simplify_tolerance = Some(tolerance);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.boundary.trim().is_empty() {
            return Err(Error::invalid_param("boundary", "\"\"", "a boundary name is required"));
        }
        if let Some(t) = self.simplify_tolerance {
            if !t.is_finite() || t < 0.0 {
                return Err(Error::invalid_param(
                    "simplify_tolerance",
                    t,
                    "must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// Heat-danger day count configuration
///
/// ```toml
/// threshold_c = 40.0
/// months = [3, 4, 5, 6, 7]
///
/// [study_area]
/// boundary = "Bangladesh"
///
/// [period]
/// start = "2020-03-01"
/// end = "2025-07-31"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatDangerConfig {
    pub study_area: StudyArea,
    pub period: DateRange,
    pub months: MonthSet,
    /// Days with a heat index strictly above this (°C) are counted
    pub threshold_c: f64,
}

impl HeatDangerConfig {
    pub fn validate(&self) -> Result<()> {
        self.study_area.validate()?;
        let (lo, hi) = THRESHOLD_RANGE_C;
        if !(lo..=hi).contains(&self.threshold_c) {
            return Err(Error::invalid_param(
                "threshold_c",
                self.threshold_c,
                format!("outside the plausible range [{lo}, {hi}] °C"),
            ));
        }
        Ok(())
    }
}

/// Urban heat island classification configuration
///
/// ```toml
/// months = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
/// max_cloud_cover = 10.0
/// scale = 100.0
/// bin_edges = [0.0, 0.005, 0.010, 0.015, 0.020]
/// mask_class = "built"
///
/// [study_area]
/// boundary = "Sylhet"
/// simplify_tolerance = 1000.0
///
/// [period]
/// start = "2022-01-01"
/// end = "2024-01-01"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UhiConfig {
    pub study_area: StudyArea,
    pub period: DateRange,
    pub months: MonthSet,
    /// Thermal scenes cloudier than this percentage are dropped
    pub max_cloud_cover: f64,
    /// Resolution of the regional mean, CRS units
    pub scale: f64,
    pub bin_edges: BinEdges,
    /// Only pixels of this land-cover class are classified
    pub mask_class: LandCoverClass,
}

impl UhiConfig {
    pub fn validate(&self) -> Result<()> {
        self.study_area.validate()?;
        if !(0.0..=100.0).contains(&self.max_cloud_cover) {
            return Err(Error::invalid_param(
                "max_cloud_cover",
                self.max_cloud_cover,
                "must be a percentage in [0, 100]",
            ));
        }
        Scale::new(self.scale)?;
        Ok(())
    }

    pub fn scale(&self) -> Result<Scale> {
        Scale::new(self.scale)
    }
}
