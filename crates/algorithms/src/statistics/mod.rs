//! Spatial statistics
//!
//! - **regional**: scalar reduction of a grid over a region at a fixed scale

pub mod regional;

pub use regional::{reduce_region, regional_mean, sample_region, Reducer, RegionalScalar, Scale};
