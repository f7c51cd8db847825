//! Raster data structures and operations

mod domain;
mod element;
mod geotransform;
mod grid;

pub use domain::GridDomain;
pub use element::RasterElement;
pub use geotransform::{GeoTransform, ALIGNMENT_TOLERANCE};
pub use grid::{Raster, RasterStatistics};
