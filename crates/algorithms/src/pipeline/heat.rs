//! Heat-danger day count
//!
//! Daily maximum temperature and daily mean dewpoint are paired by date,
//! turned into an approximate heat index, and every day above the danger
//! threshold is counted per pixel. The count is clipped to the study area.

use super::config::HeatDangerConfig;
use super::study_area::resolve_region;
use crate::climate::{approximate_daily_heat_index, DewpointPairing};
use crate::imagery::clip_to_region;
use crate::temporal::count_exceedances;
use chrono::NaiveDate;
use climstress_core::archive::{ArchiveQuery, BoundaryArchive, WeatherArchive, WeatherVariable};
use climstress_core::raster::Raster;
use climstress_core::{GridTimeSeries, Region, Result, Timestep};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Output of a heat-danger run
#[derive(Debug, Clone)]
pub struct HeatDangerResult {
    /// Days above the threshold per pixel; `u32::MAX` outside the study area
    pub days: Raster<u32>,
    /// Number of days that entered the count
    pub days_considered: usize,
    /// How temperature and dewpoint were paired; the count inherits its bias
    pub pairing: DewpointPairing,
    pub region: Region,
}

/// Heat-danger pipeline with a validated configuration
#[derive(Debug, Clone)]
pub struct HeatDangerPipeline {
    config: HeatDangerConfig,
}

impl HeatDangerPipeline {
    /// Fails fast on an invalid configuration
    pub fn new(config: HeatDangerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HeatDangerConfig {
        &self.config
    }

    pub fn run<A>(&self, archive: &A) -> Result<HeatDangerResult>
    where
        A: WeatherArchive + BoundaryArchive + ?Sized,
    {
        let cfg = &self.config;
        let region = resolve_region(archive, &cfg.study_area)?;
        let query = ArchiveQuery::new(cfg.period, cfg.months).within(&region);
        let filter = query.filter();

        let tmax = filter.apply(&archive.daily(WeatherVariable::MaxTemperature, &query)?);
        let dewpoint = filter.apply(&archive.daily(WeatherVariable::MeanDewpoint, &query)?);
        tmax.domain().check_matches(dewpoint.domain())?;
        info!(
            period = %cfg.period,
            months = ?cfg.months,
            tmax_days = tmax.len(),
            dewpoint_days = dewpoint.len(),
            "weather series loaded"
        );

        let heat_index = daily_heat_index(&tmax, &dewpoint)?;
        let pairing = DewpointPairing::DailyMeanWithDailyMax;
        warn!(pairing = %pairing, "heat index uses daily aggregates; day counts are approximate");

        let counts = count_exceedances(&heat_index, cfg.threshold_c)?;
        let days = clip_to_region(&counts, &region)?;
        info!(
            days_considered = heat_index.len(),
            threshold_c = cfg.threshold_c,
            "heat-danger days counted"
        );

        Ok(HeatDangerResult {
            days,
            days_considered: heat_index.len(),
            pairing,
            region,
        })
    }
}

/// Approximate heat index for every date present in both series.
///
/// Dates with only one of the two variables are skipped. A date listed more
/// than once in either series contributes once: its first timestep is used
/// and the rest are dropped, so one calendar day never counts twice.
pub fn daily_heat_index(
    tmax: &GridTimeSeries<f64>,
    dewpoint: &GridTimeSeries<f64>,
) -> Result<GridTimeSeries<f64>> {
    let mut by_date: BTreeMap<NaiveDate, &Timestep<f64>> = BTreeMap::new();
    let mut duplicates = 0usize;
    for step in dewpoint.iter() {
        if by_date.contains_key(&step.date) {
            duplicates += 1;
        } else {
            by_date.insert(step.date, step);
        }
    }

    let mut steps: Vec<Timestep<f64>> = Vec::with_capacity(tmax.len());
    let mut unpaired = 0usize;
    let mut previous: Option<NaiveDate> = None;
    for step in tmax.iter() {
        // sorted by date, so repeats are adjacent
        if previous.replace(step.date) == Some(step.date) {
            duplicates += 1;
            continue;
        }
        let Some(td) = by_date.get(&step.date) else {
            unpaired += 1;
            continue;
        };
        let hi = approximate_daily_heat_index(&step.raster, &td.raster)?;
        steps.push(Timestep::new(step.date, hi));
    }
    if unpaired > 0 {
        debug!(unpaired, "temperature days without a matching dewpoint day skipped");
    }
    if duplicates > 0 {
        warn!(duplicates, "repeated weather dates dropped; first timestep per date kept");
    }

    GridTimeSeries::new("approx_heat_index", tmax.domain().clone(), steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::config::StudyArea;
    use climstress_core::archive::MemoryArchive;
    use climstress_core::{DateRange, Error, GeoTransform, GridDomain, MonthSet};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn domain() -> GridDomain {
        GridDomain::new(2, 2, GeoTransform::new(0.0, 2.0, 1.0, -1.0))
    }

    fn weather(variable: &str, days: &[(NaiveDate, f64)]) -> GridTimeSeries<f64> {
        let steps = days
            .iter()
            .map(|&(d, k)| Timestep::new(d, domain().filled(k)))
            .collect();
        GridTimeSeries::new(variable, domain(), steps).unwrap()
    }

    fn config(threshold_c: f64) -> HeatDangerConfig {
        HeatDangerConfig {
            study_area: StudyArea::named("box"),
            period: DateRange::new(date(2020, 3, 1), date(2020, 8, 1)).unwrap(),
            months: MonthSet::from_months(&[3, 4, 5, 6, 7]).unwrap(),
            threshold_c,
        }
    }

    fn archive() -> MemoryArchive {
        // 35 °C with a 28 °C dewpoint is far above 40 °C heat index; 25 °C / 10 °C is not
        let tmax = weather(
            "tmax",
            &[
                (date(2020, 2, 15), 308.15),
                (date(2020, 4, 1), 308.15),
                (date(2020, 4, 2), 298.15),
                (date(2020, 5, 1), 308.15),
                (date(2020, 6, 1), 308.15),
            ],
        );
        let dew = weather(
            "tdmean",
            &[
                (date(2020, 2, 15), 301.15),
                (date(2020, 4, 1), 301.15),
                (date(2020, 4, 2), 283.15),
                (date(2020, 5, 1), 301.15),
            ],
        );
        // left column only
        let region =
            Region::from_exterior("box", &[[0.0, 0.0], [1.0, 0.0], [1.0, 2.0], [0.0, 2.0]]).unwrap();
        MemoryArchive::new()
            .with_weather(WeatherVariable::MaxTemperature, tmax)
            .with_weather(WeatherVariable::MeanDewpoint, dew)
            .with_boundary(region)
    }

    #[test]
    fn test_counts_hot_days_in_window() {
        let result = HeatDangerPipeline::new(config(40.0)).unwrap().run(&archive()).unwrap();
        // Feb is outside the months, June has no dewpoint
        assert_eq!(result.days_considered, 3);
        assert_eq!(result.days.get(0, 0).unwrap(), 2);
        assert_eq!(result.days.valid_at(0, 1).unwrap(), None);
        assert_eq!(result.pairing, DewpointPairing::DailyMeanWithDailyMax);
    }

    #[test]
    fn test_invalid_threshold_fails_before_running() {
        assert!(matches!(
            HeatDangerPipeline::new(config(120.0)),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_missing_variable_is_archive_error() {
        let archive = MemoryArchive::new()
            .with_boundary(Region::from_exterior("box", &[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0]]).unwrap());
        let result = HeatDangerPipeline::new(config(40.0)).unwrap().run(&archive);
        assert!(matches!(result, Err(Error::Archive(_))));
    }

    #[test]
    fn test_repeated_dates_count_once() {
        let tmax = weather(
            "tmax",
            &[
                (date(2020, 4, 1), 308.15),
                (date(2020, 4, 1), 308.15),
                (date(2020, 4, 2), 308.15),
            ],
        );
        let dew = weather(
            "tdmean",
            &[
                (date(2020, 4, 1), 301.15),
                (date(2020, 4, 2), 301.15),
                (date(2020, 4, 2), 283.15),
            ],
        );

        let hi = daily_heat_index(&tmax, &dew).unwrap();
        assert_eq!(hi.len(), 2);
        // first dewpoint on 2020-04-02 is the humid one
        assert!(hi.steps()[1].raster.get(0, 0).unwrap() > 40.0);

        let archive = MemoryArchive::new()
            .with_weather(WeatherVariable::MaxTemperature, tmax)
            .with_weather(WeatherVariable::MeanDewpoint, dew)
            .with_boundary(
                Region::from_exterior("box", &[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]).unwrap(),
            );
        let result = HeatDangerPipeline::new(config(40.0)).unwrap().run(&archive).unwrap();
        assert_eq!(result.days_considered, 2);
        assert_eq!(result.days.get(0, 0).unwrap(), 2);
    }
}
