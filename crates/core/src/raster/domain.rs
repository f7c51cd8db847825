//! Grid domain: the shape and georeference shared by aligned rasters

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};

/// Shape, transform and CRS of a grid, without any cell data.
///
/// A time series declares its domain up front so that reductions over an
/// empty series can still produce a grid of the right extent.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDomain {
    pub rows: usize,
    pub cols: usize,
    pub transform: GeoTransform,
    pub crs: Option<CRS>,
}

impl GridDomain {
    pub fn new(rows: usize, cols: usize, transform: GeoTransform) -> Self {
        Self {
            rows,
            cols,
            transform,
            crs: None,
        }
    }

    pub fn with_crs(mut self, crs: CRS) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Domain of an existing raster
    pub fn of<T: RasterElement>(raster: &Raster<T>) -> Self {
        Self {
            rows: raster.rows(),
            cols: raster.cols(),
            transform: *raster.transform(),
            crs: raster.crs().cloned(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols, self.rows)
    }

    /// A raster over this domain with every cell set to `value`
    pub fn filled<T: RasterElement>(&self, value: T) -> Raster<T> {
        let mut raster = Raster::filled(self.rows, self.cols, value);
        raster.set_transform(self.transform);
        raster.set_crs(self.crs.clone());
        raster
    }

    /// Fail unless `other` places the same cells at the same locations.
    ///
    /// A missing CRS on either side is treated as "same as the other".
    pub fn check_matches(&self, other: &GridDomain) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::SizeMismatch {
                er: self.rows,
                ec: self.cols,
                ar: other.rows,
                ac: other.cols,
            });
        }
        if !self.transform.is_aligned_with(&other.transform) {
            return Err(Error::GridMisaligned(format!(
                "transform {:?} vs {:?}",
                self.transform, other.transform
            )));
        }
        if let (Some(a), Some(b)) = (&self.crs, &other.crs) {
            if !a.is_equivalent(b) {
                return Err(Error::CrsMismatch(a.identifier(), b.identifier()));
            }
        }
        Ok(())
    }
}
