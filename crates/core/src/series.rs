//! Date-ordered grid time series and the filters applied before reduction.
//!
//! A [`GridTimeSeries`] is never mutated in place: filtering and mapping
//! return a new series. Timesteps are kept sorted by date with a stable sort,
//! so timesteps sharing a date stay in the order the archive produced them.
//! Every temporal reducer walks timesteps in this order, which is what makes
//! reductions reproducible.

use crate::error::{Error, Result};
use crate::raster::{GridDomain, Raster, RasterElement};
use crate::region::Region;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open date interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = Error;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Fails unless `start < end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(Error::invalid_param(
                "date_range",
                format!("{start}..{end}"),
                "start must be before end",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Set of calendar months (1 = January).
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct MonthSet(u16);

impl MonthSet {
    const ALL_BITS: u16 = 0b1_1111_1111_1110;

    /// Every month; the degenerate "no month filter" case
    pub fn all() -> Self {
        Self(Self::ALL_BITS)
    }

    /// Explicit list of months, each in `1..=12`
    pub fn from_months(months: &[u32]) -> Result<Self> {
        let mut bits = 0u16;
        for &m in months {
            if !(1..=12).contains(&m) {
                return Err(Error::invalid_param("month", m, "months are numbered 1..=12"));
            }
            bits |= 1 << m;
        }
        if bits == 0 {
            return Err(Error::invalid_param("months", "[]", "at least one month is required"));
        }
        Ok(Self(bits))
    }

    /// Inclusive calendar range. When `start > end` the range wraps over the
    /// year boundary, so `range(11, 2)` is November through February.
    pub fn range(start: u32, end: u32) -> Result<Self> {
        for (name, m) in [("month_start", start), ("month_end", end)] {
            if !(1..=12).contains(&m) {
                return Err(Error::invalid_param(name, m, "months are numbered 1..=12"));
            }
        }
        let months: Vec<u32> = if start <= end {
            (start..=end).collect()
        } else {
            (start..=12).chain(1..=end).collect()
        };
        Self::from_months(&months)
    }

    pub fn contains(&self, month: u32) -> bool {
        (1..=12).contains(&month) && self.0 & (1 << month) != 0
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(date.month())
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL_BITS
    }

    pub fn months(&self) -> Vec<u32> {
        (1..=12).filter(|&m| self.contains(m)).collect()
    }
}

impl Default for MonthSet {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for MonthSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MonthSet").field(&self.months()).finish()
    }
}

impl TryFrom<Vec<u32>> for MonthSet {
    type Error = Error;

    fn try_from(months: Vec<u32>) -> Result<Self> {
        Self::from_months(&months)
    }
}

impl From<MonthSet> for Vec<u32> {
    fn from(set: MonthSet) -> Self {
        set.months()
    }
}

/// Linear radiometric calibration: `calibrated = raw * gain + offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub gain: f64,
    pub offset: f64,
}

impl Calibration {
    pub fn new(gain: f64, offset: f64) -> Self {
        Self { gain, offset }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        raw * self.gain + self.offset
    }
}

/// Per-scene scalar metadata carried alongside each grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneMetadata {
    /// Scene cloud cover, percent
    pub cloud_cover: Option<f64>,
    pub calibration: Option<Calibration>,
}

impl SceneMetadata {
    pub fn with_cloud_cover(mut self, percent: f64) -> Self {
        self.cloud_cover = Some(percent);
        self
    }

    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }
}

/// One dated grid of a series
#[derive(Debug, Clone)]
pub struct Timestep<T: RasterElement> {
    pub date: NaiveDate,
    pub raster: Raster<T>,
    pub meta: SceneMetadata,
}

impl<T: RasterElement> Timestep<T> {
    pub fn new(date: NaiveDate, raster: Raster<T>) -> Self {
        Self {
            date,
            raster,
            meta: SceneMetadata::default(),
        }
    }

    pub fn with_meta(mut self, meta: SceneMetadata) -> Self {
        self.meta = meta;
        self
    }
}

/// Grids of one variable over a declared domain, ordered by date.
#[derive(Debug, Clone)]
pub struct GridTimeSeries<T: RasterElement> {
    variable: String,
    domain: GridDomain,
    steps: Vec<Timestep<T>>,
}

impl<T: RasterElement> GridTimeSeries<T> {
    /// Build a series, checking every grid against `domain` and sorting by date.
    pub fn new(
        variable: impl Into<String>,
        domain: GridDomain,
        mut steps: Vec<Timestep<T>>,
    ) -> Result<Self> {
        for step in &steps {
            domain.check_matches(&step.raster.domain())?;
        }
        steps.sort_by_key(|s| s.date);
        Ok(Self {
            variable: variable.into(),
            domain,
            steps,
        })
    }

    /// Series with no timesteps over `domain`
    pub fn empty(variable: impl Into<String>, domain: GridDomain) -> Self {
        Self {
            variable: variable.into(),
            domain,
            steps: Vec::new(),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn domain(&self) -> &GridDomain {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timestep<T>> {
        self.steps.iter()
    }

    pub fn steps(&self) -> &[Timestep<T>] {
        &self.steps
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.steps.iter().map(|s| s.date).collect()
    }

    /// Keep the timesteps matching `keep`
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Timestep<T>) -> bool,
    {
        Self {
            variable: self.variable.clone(),
            domain: self.domain.clone(),
            steps: self.steps.iter().filter(|s| keep(*s)).cloned().collect(),
        }
    }

    pub fn filter_date(&self, range: DateRange) -> Self {
        self.filter(|s| range.contains(s.date))
    }

    pub fn filter_months(&self, months: MonthSet) -> Self {
        self.filter(|s| months.contains_date(s.date))
    }

    /// Keep timesteps whose grid extent overlaps the region's bounding box
    pub fn filter_bounds(&self, region: &Region) -> Self {
        self.filter(|s| region.intersects_bounds(s.raster.bounds()))
    }

    /// Transform each grid, keeping dates and metadata
    pub fn map<U, F>(&self, variable: impl Into<String>, mut f: F) -> Result<GridTimeSeries<U>>
    where
        U: RasterElement,
        F: FnMut(&Timestep<T>) -> Raster<U>,
    {
        self.try_map(variable, |s| Ok(f(s)))
    }

    /// Fallible [`GridTimeSeries::map`]; the first error aborts the mapping
    pub fn try_map<U, F>(&self, variable: impl Into<String>, mut f: F) -> Result<GridTimeSeries<U>>
    where
        U: RasterElement,
        F: FnMut(&Timestep<T>) -> Result<Raster<U>>,
    {
        let steps = self
            .steps
            .iter()
            .map(|s| {
                Ok(Timestep {
                    date: s.date,
                    raster: f(s)?,
                    meta: s.meta,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        GridTimeSeries::new(variable, self.domain.clone(), steps)
    }
}

/// Composed date, month and spatial predicates, applied in one pass.
#[derive(Debug, Clone, Default)]
pub struct SeriesFilter {
    range: Option<DateRange>,
    months: Option<MonthSet>,
    bounds: Option<Region>,
}

impl SeriesFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn months(mut self, months: MonthSet) -> Self {
        self.months = Some(months);
        self
    }

    pub fn bounds(mut self, region: Region) -> Self {
        self.bounds = Some(region);
        self
    }

    pub fn matches<T: RasterElement>(&self, step: &Timestep<T>) -> bool {
        self.range.map_or(true, |r| r.contains(step.date))
            && self.months.map_or(true, |m| m.contains_date(step.date))
            && self
                .bounds
                .as_ref()
                .map_or(true, |r| r.intersects_bounds(step.raster.bounds()))
    }

    pub fn apply<T: RasterElement>(&self, series: &GridTimeSeries<T>) -> GridTimeSeries<T> {
        series.filter(|s| self.matches(s))
    }
}
