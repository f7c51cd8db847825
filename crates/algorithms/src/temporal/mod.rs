//! Temporal reductions over a date-ordered series of grids
//!
//! - **threshold**: count of timesteps exceeding a threshold
//! - **mode**: most frequent class code (land-cover composites)
//! - **median**: cloud-screened, calibrated thermal median
//! - **combine**: the per-pixel combine functions behind mode and median

pub mod combine;
pub mod median;
pub mod mode;
pub mod threshold;

pub use combine::{median_of, mode_of, ClassHistogram};
pub use median::{
    calibrate, median_composite, screen_cloud_cover, thermal_composite, ThermalComposite,
    ThermalCompositeParams,
};
pub use mode::{mode_composite, ModeComposite, LABEL_NODATA};
pub use threshold::{count_exceedances, exceedance_indicator, ThresholdCount, ThresholdParams};
