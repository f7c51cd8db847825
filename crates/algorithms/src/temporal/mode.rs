//! Categorical (mode) compositor
//!
//! Reduces a series of class-code grids to the most frequent code per
//! pixel. Ties go to the lowest code so the result never depends on
//! timestep order.

use super::combine::ClassHistogram;
use crate::maybe_rayon::*;
use climstress_core::raster::Raster;
use climstress_core::{Algorithm, Error, GridTimeSeries, Result, SeriesFilter};

/// Marker for pixels with no valid observation
pub const LABEL_NODATA: u8 = u8::MAX;

/// Mode compositing stage. The series filter is applied before reduction.
#[derive(Debug, Clone, Default)]
pub struct ModeComposite;

impl Algorithm for ModeComposite {
    type Input = GridTimeSeries<u8>;
    type Output = Raster<u8>;
    type Params = SeriesFilter;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Mode Composite"
    }

    fn description(&self) -> &'static str {
        "Most frequent class code per pixel, lowest code winning ties"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        mode_composite(&params.apply(&input))
    }
}

/// Most frequent code per pixel across the series.
///
/// Pixels without a valid observation (including every pixel of an empty
/// series) are [`LABEL_NODATA`].
pub fn mode_composite(series: &GridTimeSeries<u8>) -> Result<Raster<u8>> {
    let template = series.domain().filled(LABEL_NODATA);
    let (rows, cols) = template.shape();
    let steps = series.steps();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_hist = vec![ClassHistogram::new(); cols];
            for step in steps {
                let raster = &step.raster;
                for (col, hist) in row_hist.iter_mut().enumerate() {
                    let code = unsafe { raster.get_unchecked(row, col) };
                    if code == LABEL_NODATA || raster.is_nodata(code) {
                        continue;
                    }
                    hist.add(code);
                }
            }
            row_hist
                .iter()
                .map(|hist| hist.mode().unwrap_or(LABEL_NODATA))
                .collect::<Vec<u8>>()
        })
        .collect();

    template.with_data(data, Some(LABEL_NODATA))
}
