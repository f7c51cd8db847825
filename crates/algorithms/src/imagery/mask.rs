//! Masking and clipping
//!
//! Masked cells become no-data; they are never silently zeroed.

use crate::maybe_rayon::*;
use climstress_core::raster::{Raster, RasterElement};
use climstress_core::{Region, Result};

/// Set every cell where `mask` is 0 (or no-data) to no-data.
///
/// The output keeps the input's no-data marker, or takes the type's default
/// marker (NaN, or `MAX` for integers) if the input had none.
pub fn update_mask<T: RasterElement>(raster: &Raster<T>, mask: &Raster<u8>) -> Result<Raster<T>> {
    raster.ensure_aligned(mask)?;
    let (rows, cols) = raster.shape();
    let nodata = raster.nodata().unwrap_or_else(T::default_nodata);

    let data: Vec<T> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![nodata; cols];
            for col in 0..cols {
                let m = unsafe { mask.get_unchecked(row, col) };
                if m == 0 || mask.is_nodata(m) {
                    continue;
                }
                let val = unsafe { raster.get_unchecked(row, col) };
                if !raster.is_nodata(val) {
                    row_data[col] = val;
                }
            }
            row_data
        })
        .collect();

    raster.with_data(data, Some(nodata))
}

/// Restrict a raster to a region: cells whose centre lies outside the
/// region's geometry become no-data.
pub fn clip_to_region<T: RasterElement>(raster: &Raster<T>, region: &Region) -> Result<Raster<T>> {
    let inside = region.rasterize(&raster.domain());
    update_mask(raster, &inside)
}
