//! Temporal threshold counter
//!
//! Turns a series of grids into a per-pixel count of timesteps whose value
//! strictly exceeds a threshold. No-data never counts as an exceedance.

use crate::maybe_rayon::*;
use climstress_core::raster::Raster;
use climstress_core::{Algorithm, Error, GridTimeSeries, Result};

/// Parameters for threshold counting
#[derive(Debug, Clone, Copy)]
pub struct ThresholdParams {
    /// Values strictly greater than this count as exceedances
    pub threshold: f64,
}

/// Threshold counting stage
#[derive(Debug, Clone, Default)]
pub struct ThresholdCount;

impl Algorithm for ThresholdCount {
    type Input = GridTimeSeries<f64>;
    type Output = Raster<u32>;
    type Params = ThresholdParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Threshold Count"
    }

    fn description(&self) -> &'static str {
        "Count timesteps per pixel whose value exceeds a threshold"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        count_exceedances(&input, params.threshold)
    }
}

fn check_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() {
        return Err(Error::invalid_param("threshold", threshold, "must be finite"));
    }
    Ok(())
}

/// 1 where `value > threshold`, 0 elsewhere (no-data included)
pub fn exceedance_indicator(raster: &Raster<f64>, threshold: f64) -> Result<Raster<u8>> {
    check_threshold(threshold)?;
    let (rows, cols) = raster.shape();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols];
            for col in 0..cols {
                let val = unsafe { raster.get_unchecked(row, col) };
                if !raster.is_nodata(val) && val > threshold {
                    row_data[col] = 1;
                }
            }
            row_data
        })
        .collect();

    raster.with_data(data, None)
}

/// Number of timesteps per pixel with `value > threshold`.
///
/// An empty series gives an all-zero grid over the series domain. The
/// output carries no no-data marker; clip it to a region afterwards to
/// mark the outside.
pub fn count_exceedances(series: &GridTimeSeries<f64>, threshold: f64) -> Result<Raster<u32>> {
    check_threshold(threshold)?;
    let template = series.domain().filled(0u32);
    let (rows, cols) = template.shape();
    let steps = series.steps();

    let data: Vec<u32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u32; cols];
            for step in steps {
                let raster = &step.raster;
                for (col, count) in row_data.iter_mut().enumerate() {
                    let val = unsafe { raster.get_unchecked(row, col) };
                    if !raster.is_nodata(val) && val > threshold {
                        *count += 1;
                    }
                }
            }
            row_data
        })
        .collect();

    template.with_data(data, None)
}
