//! Regional statistics at an explicit scale
//!
//! A region-wide scalar depends on the resolution it is sampled at, so the
//! scale is a required argument and travels with the result. Sampling lays a
//! lattice of `scale`-sized cells, anchored on the raster origin, over the
//! part of the raster extent covered by the region's bounding box. Every
//! lattice cell whose centre falls inside the region samples the raster
//! pixel under that centre. When `scale` equals the raster cell size the
//! lattice centres are the pixel centres.

use crate::maybe_rayon::*;
use crate::temporal::median_of;
use climstress_core::raster::Raster;
use climstress_core::{Error, Region, Result};
use std::fmt;

/// Sampling resolution in CRS units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Scale {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::invalid_param("scale", value, "must be finite and positive"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reduction applied to the sampled values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Median,
    Min,
    Max,
}

impl Reducer {
    pub fn name(&self) -> &'static str {
        match self {
            Reducer::Mean => "mean",
            Reducer::Median => "median",
            Reducer::Min => "min",
            Reducer::Max => "max",
        }
    }

    fn reduce(&self, samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        match self {
            Reducer::Mean => Some(samples.iter().sum::<f64>() / samples.len() as f64),
            Reducer::Median => median_of(samples),
            Reducer::Min => samples.iter().copied().reduce(f64::min),
            Reducer::Max => samples.iter().copied().reduce(f64::max),
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A grid summarised over a region, together with how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalScalar {
    pub value: f64,
    pub reducer: Reducer,
    pub scale: Scale,
    pub sample_count: usize,
    /// Name of the region the value was reduced over
    pub region: String,
}

impl fmt::Display for RegionalScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} over {} at scale {}: {} ({} samples)",
            self.reducer, self.region, self.scale, self.value, self.sample_count
        )
    }
}

/// Valid raster values under the lattice centres that fall inside `region`
pub fn sample_region(raster: &Raster<f64>, region: &Region, scale: Scale) -> Vec<f64> {
    let (rows, cols) = raster.shape();
    let (rx0, ry0, rx1, ry1) = raster.bounds();
    let bbox = region.bounding_rect();
    let (x0, y0) = (rx0.max(bbox.min().x), ry0.max(bbox.min().y));
    let (x1, y1) = (rx1.min(bbox.max().x), ry1.min(bbox.max().y));
    if x0 > x1 || y0 > y1 {
        return Vec::new();
    }

    let transform = *raster.transform();
    let lattice = transform.with_cell_size(scale.value());
    let (ca, ra) = lattice.geo_to_pixel(x0, y0);
    let (cb, rb) = lattice.geo_to_pixel(x1, y1);
    // lattice index i has its centre at fractional position i + 0.5
    let first = |a: f64, b: f64| (a.min(b) - 0.5).ceil().max(0.0) as usize;
    let last = |a: f64, b: f64| (a.max(b) - 0.5).floor();
    let (col_start, col_end) = (first(ca, cb), last(ca, cb));
    let (row_start, row_end) = (first(ra, rb), last(ra, rb));
    if col_end < 0.0 || row_end < 0.0 {
        return Vec::new();
    }
    let (col_end, row_end) = (col_end as usize, row_end as usize);
    if col_start > col_end || row_start > row_end {
        return Vec::new();
    }

    (row_start..=row_end)
        .into_par_iter()
        .flat_map(|lrow| {
            let mut row_samples = Vec::new();
            for lcol in col_start..=col_end {
                let (x, y) = lattice.pixel_to_geo(lcol, lrow);
                if !region.contains(x, y) {
                    continue;
                }
                let Some((row, col)) = transform.cell_at(x, y, rows, cols) else {
                    continue;
                };
                let val = unsafe { raster.get_unchecked(row, col) };
                if !raster.is_nodata(val) {
                    row_samples.push(val);
                }
            }
            row_samples
        })
        .collect()
}

/// Reduce `raster` over `region` at `scale`.
///
/// Returns [`Error::EmptyReduction`] when no valid pixel is sampled, e.g.
/// when the region does not intersect the raster.
pub fn reduce_region(
    raster: &Raster<f64>,
    region: &Region,
    scale: Scale,
    reducer: Reducer,
) -> Result<RegionalScalar> {
    let samples = sample_region(raster, region, scale);
    let value = reducer.reduce(&samples).ok_or_else(|| {
        Error::EmptyReduction(format!(
            "no valid pixels of the grid fall inside region '{}' at scale {}",
            region.name(),
            scale
        ))
    })?;

    Ok(RegionalScalar {
        value,
        reducer,
        scale,
        sample_count: samples.len(),
        region: region.name().to_string(),
    })
}

/// Arithmetic mean of `raster` over `region` at `scale`
pub fn regional_mean(raster: &Raster<f64>, region: &Region, scale: Scale) -> Result<RegionalScalar> {
    reduce_region(raster, region, scale, Reducer::Mean)
}
