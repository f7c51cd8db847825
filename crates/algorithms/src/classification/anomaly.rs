//! Normalized anomaly and its classification
//!
//! `anomaly = (value - mean) / mean`, binned with [`BinEdges`] and
//! optionally restricted to one land-cover class.

use super::bins::BinEdges;
use crate::imagery::{band_math, clip_to_region, update_mask};
use crate::landcover::CategoryMask;
use crate::maybe_rayon::*;
use climstress_core::raster::Raster;
use climstress_core::{Algorithm, Error, Region, Result};
use tracing::warn;

/// Class code for pixels with no class (no-data, masked out)
pub const CLASS_NODATA: u8 = u8::MAX;

/// `(value - mean) / mean` per pixel.
///
/// A zero or non-finite mean leaves nothing to normalize by: every pixel of
/// the result is no-data.
pub fn normalized_anomaly(raster: &Raster<f64>, mean: f64) -> Result<Raster<f64>> {
    if mean == 0.0 || !mean.is_finite() {
        warn!(mean, "regional mean cannot normalize; anomaly is no-data everywhere");
        return raster.with_data(vec![f64::NAN; raster.len()], Some(f64::NAN));
    }
    band_math(raster, move |v| (v - mean) / mean)
}

/// Class grid together with the edges that produced it
#[derive(Debug, Clone)]
pub struct ClassifiedGrid {
    raster: Raster<u8>,
    edges: BinEdges,
}

impl ClassifiedGrid {
    pub fn raster(&self) -> &Raster<u8> {
        &self.raster
    }

    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    pub fn into_raster(self) -> Raster<u8> {
        self.raster
    }

    /// Set every pixel outside `mask` to [`CLASS_NODATA`]
    pub fn apply_mask(&self, mask: &CategoryMask) -> Result<ClassifiedGrid> {
        Ok(ClassifiedGrid {
            raster: update_mask(&self.raster, mask.mask())?,
            edges: self.edges.clone(),
        })
    }

    /// Set every pixel outside `region` to [`CLASS_NODATA`]
    pub fn clip_to_region(&self, region: &Region) -> Result<ClassifiedGrid> {
        Ok(ClassifiedGrid {
            raster: clip_to_region(&self.raster, region)?,
            edges: self.edges.clone(),
        })
    }

    /// Pixel count per class code `0..=n`; no-data is not counted
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.edges.max_class() as usize + 1];
        for &code in self.raster.data().iter() {
            if code != CLASS_NODATA {
                counts[code as usize] += 1;
            }
        }
        counts
    }
}

/// Bin an anomaly grid. NaN anomalies become [`CLASS_NODATA`].
pub fn classify_anomaly(anomaly: &Raster<f64>, edges: &BinEdges) -> Result<ClassifiedGrid> {
    let (rows, cols) = anomaly.shape();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![CLASS_NODATA; cols];
            for col in 0..cols {
                let val = unsafe { anomaly.get_unchecked(row, col) };
                if anomaly.is_nodata(val) {
                    continue;
                }
                if let Some(class) = edges.classify(val) {
                    row_data[col] = class;
                }
            }
            row_data
        })
        .collect();

    Ok(ClassifiedGrid {
        raster: anomaly.with_data(data, Some(CLASS_NODATA))?,
        edges: edges.clone(),
    })
}

/// Parameters for anomaly classification
#[derive(Debug, Clone)]
pub struct AnomalyParams {
    /// Baseline the anomaly is relative to
    pub mean: f64,
    pub edges: BinEdges,
}

/// Anomaly classification stage
#[derive(Debug, Clone, Default)]
pub struct AnomalyClassifier;

impl Algorithm for AnomalyClassifier {
    type Input = Raster<f64>;
    type Output = ClassifiedGrid;
    type Params = AnomalyParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Anomaly Classifier"
    }

    fn description(&self) -> &'static str {
        "Bin the normalized anomaly against a regional baseline"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let anomaly = normalized_anomaly(&input, params.mean)?;
        classify_anomaly(&anomaly, &params.edges)
    }
}
