//! Pixelwise raster algebra
//!
//! - Band math: unary and binary cell-by-cell functions
//! - Masking: no-data outside a boolean mask or a region

mod band_math;
mod mask;

pub use band_math::{band_math, band_math_binary, band_math_zip, BandMathOp};
pub use mask::{clip_to_region, update_mask};
