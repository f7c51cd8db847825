//! Band math operations
//!
//! Pixelwise raster algebra: apply a function to one raster, or combine two
//! aligned rasters cell by cell. No-data in any input produces NaN in the
//! output; no-data never aborts the computation.

use crate::maybe_rayon::*;
use climstress_core::raster::Raster;
use climstress_core::Result;

/// Binary operations for band math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandMathOp {
    Add,
    Subtract,
    Multiply,
    /// Division by (near) zero yields no-data
    Divide,
}

impl BandMathOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BandMathOp::Add => a + b,
            BandMathOp::Subtract => a - b,
            BandMathOp::Multiply => a * b,
            BandMathOp::Divide => {
                if b.abs() < 1e-10 {
                    f64::NAN
                } else {
                    a / b
                }
            }
        }
    }
}

/// Apply a unary function to every cell in a raster.
///
/// No-data cells stay no-data (NaN).
///
/// # Example
/// ```ignore
/// let celsius = band_math(&kelvin, |k| k - 273.15)?;
/// ```
pub fn band_math<F>(raster: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    let (rows, cols) = raster.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let val = unsafe { raster.get_unchecked(row, col) };
                if raster.is_nodata(val) {
                    continue;
                }
                row_data[col] = f(val);
            }
            row_data
        })
        .collect();

    raster.with_data(data, Some(f64::NAN))
}

/// Combine two aligned rasters cell by cell with `f(a, b)`.
///
/// Both rasters must share a domain. No-data in either input produces
/// no-data in the output.
pub fn band_math_zip<F>(a: &Raster<f64>, b: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64, f64) -> f64 + Sync + Send,
{
    a.ensure_aligned(b)?;
    let (rows, cols) = a.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let va = unsafe { a.get_unchecked(row, col) };
                let vb = unsafe { b.get_unchecked(row, col) };
                if a.is_nodata(va) || b.is_nodata(vb) {
                    continue;
                }
                row_data[col] = f(va, vb);
            }
            row_data
        })
        .collect();

    a.with_data(data, Some(f64::NAN))
}

/// Apply a binary operation between two aligned rasters element-wise.
pub fn band_math_binary(a: &Raster<f64>, b: &Raster<f64>, op: BandMathOp) -> Result<Raster<f64>> {
    band_math_zip(a, b, move |va, vb| op.apply(va, vb))
}
