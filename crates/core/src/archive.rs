//! Interfaces to the external data archives.
//!
//! Archives are read-only collaborators. An archive may answer a query
//! coarsely (e.g. return whole months); callers re-apply the query as a
//! [`SeriesFilter`] so the series they reduce is exact. Archive failures are
//! reported as [`Error::Archive`] and are terminal for a pipeline run; no
//! retrying happens on this side.

use crate::error::{Error, Result};
use crate::raster::RasterElement;
use crate::region::Region;
use crate::series::{DateRange, GridTimeSeries, MonthSet, SeriesFilter};
use std::collections::HashMap;
use std::fmt;

/// Daily weather variables, both in Kelvin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherVariable {
    /// Daily maximum 2 m air temperature
    MaxTemperature,
    /// Daily mean 2 m dewpoint temperature
    MeanDewpoint,
}

impl WeatherVariable {
    pub fn band_name(&self) -> &'static str {
        match self {
            WeatherVariable::MaxTemperature => "temperature_2m_max",
            WeatherVariable::MeanDewpoint => "dewpoint_temperature_2m",
        }
    }
}

impl fmt::Display for WeatherVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.band_name())
    }
}

/// Date, month and spatial constraints of an archive query
#[derive(Debug, Clone)]
pub struct ArchiveQuery {
    pub range: DateRange,
    pub months: MonthSet,
    pub bounds: Option<Region>,
}

impl ArchiveQuery {
    pub fn new(range: DateRange, months: MonthSet) -> Self {
        Self {
            range,
            months,
            bounds: None,
        }
    }

    pub fn within(mut self, region: &Region) -> Self {
        self.bounds = Some(region.clone());
        self
    }

    /// The query expressed as a series filter
    pub fn filter(&self) -> SeriesFilter {
        let filter = SeriesFilter::new().date(self.range).months(self.months);
        match &self.bounds {
            Some(region) => filter.bounds(region.clone()),
            None => filter,
        }
    }
}

/// Daily reanalysis grids
pub trait WeatherArchive {
    fn daily(&self, variable: WeatherVariable, query: &ArchiveQuery) -> Result<GridTimeSeries<f64>>;
}

/// Categorical land-cover observations (see `LandCoverClass` in the algorithms crate)
pub trait LandCoverArchive {
    fn labels(&self, query: &ArchiveQuery) -> Result<GridTimeSeries<u8>>;
}

/// Raw thermal-band scenes with cloud cover and calibration metadata
pub trait ThermalArchive {
    fn scenes(&self, query: &ArchiveQuery) -> Result<GridTimeSeries<f64>>;
}

/// Administrative boundaries by name
pub trait BoundaryArchive {
    fn boundary(&self, name: &str) -> Result<Region>;
}

/// Archive backed by series already held in memory.
///
/// Answers every query exactly by applying the query filter.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    weather: HashMap<WeatherVariable, GridTimeSeries<f64>>,
    land_cover: Option<GridTimeSeries<u8>>,
    thermal: Option<GridTimeSeries<f64>>,
    boundaries: HashMap<String, Region>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weather(mut self, variable: WeatherVariable, series: GridTimeSeries<f64>) -> Self {
        self.weather.insert(variable, series);
        self
    }

    pub fn with_land_cover(mut self, series: GridTimeSeries<u8>) -> Self {
        self.land_cover = Some(series);
        self
    }

    pub fn with_thermal(mut self, series: GridTimeSeries<f64>) -> Self {
        self.thermal = Some(series);
        self
    }

    pub fn with_boundary(mut self, region: Region) -> Self {
        self.boundaries.insert(region.name().to_string(), region);
        self
    }
}

fn answer<T: RasterElement>(
    series: Option<&GridTimeSeries<T>>,
    what: &str,
    query: &ArchiveQuery,
) -> Result<GridTimeSeries<T>> {
    series
        .map(|s| query.filter().apply(s))
        .ok_or_else(|| Error::Archive(format!("no {what} data loaded")))
}

impl WeatherArchive for MemoryArchive {
    fn daily(&self, variable: WeatherVariable, query: &ArchiveQuery) -> Result<GridTimeSeries<f64>> {
        answer(self.weather.get(&variable), variable.band_name(), query)
    }
}

impl LandCoverArchive for MemoryArchive {
    fn labels(&self, query: &ArchiveQuery) -> Result<GridTimeSeries<u8>> {
        answer(self.land_cover.as_ref(), "land-cover", query)
    }
}

impl ThermalArchive for MemoryArchive {
    fn scenes(&self, query: &ArchiveQuery) -> Result<GridTimeSeries<f64>> {
        answer(self.thermal.as_ref(), "thermal", query)
    }
}

impl BoundaryArchive for MemoryArchive {
    fn boundary(&self, name: &str) -> Result<Region> {
        self.boundaries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Archive(format!("unknown boundary '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{GeoTransform, GridDomain};
    use crate::series::Timestep;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_memory_archive_applies_query() {
        let domain = GridDomain::new(1, 1, GeoTransform::new(0.0, 1.0, 1.0, -1.0));
        let steps = [date(2020, 2, 1), date(2020, 3, 1), date(2020, 4, 1)]
            .into_iter()
            .map(|d| Timestep::new(d, domain.filled(300.0)))
            .collect();
        let series = GridTimeSeries::new("t2m", domain, steps).unwrap();
        let archive = MemoryArchive::new().with_weather(WeatherVariable::MaxTemperature, series);

        let query = ArchiveQuery::new(
            DateRange::new(date(2020, 1, 1), date(2021, 1, 1)).unwrap(),
            MonthSet::from_months(&[3, 4]).unwrap(),
        );
        let got = archive.daily(WeatherVariable::MaxTemperature, &query).unwrap();
        assert_eq!(got.dates(), vec![date(2020, 3, 1), date(2020, 4, 1)]);

        assert!(matches!(
            archive.daily(WeatherVariable::MeanDewpoint, &query),
            Err(Error::Archive(_))
        ));
    }

    #[test]
    fn test_unknown_boundary() {
        let archive = MemoryArchive::new();
        assert!(matches!(archive.boundary("Sylhet"), Err(Error::Archive(_))));
    }
}
