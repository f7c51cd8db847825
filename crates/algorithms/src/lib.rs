//! # climstress algorithms
//!
//! Climate-stress stages over `climstress_core` grids.
//!
//! ## Modules
//!
//! - **climate**: unit conversion, Magnus humidity, Steadman heat index
//! - **temporal**: threshold counts, mode and median composites
//! - **statistics**: regional reductions at an explicit scale
//! - **classification**: normalized anomaly and half-open binning
//! - **imagery**: band math, masking and clipping
//! - **landcover**: class codes and class masks
//! - **pipeline**: heat-danger and UHI runs with validated configs

pub mod classification;
pub mod climate;
pub mod imagery;
pub mod landcover;
pub mod pipeline;
pub mod statistics;
pub mod temporal;

pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classification::{
        classify_anomaly, normalized_anomaly, AnomalyClassifier, AnomalyParams, BinEdges,
        ClassifiedGrid, CLASS_NODATA,
    };
    pub use crate::climate::{
        approximate_daily_heat_index, convert_air_and_dewpoint, heat_index, relative_humidity,
        steadman_heat_index_f, DewpointPairing, HeatIndex,
    };
    pub use crate::imagery::{band_math, band_math_binary, clip_to_region, update_mask, BandMathOp};
    pub use crate::landcover::{CategoryMask, LandCoverClass};
    pub use crate::pipeline::{
        HeatDangerConfig, HeatDangerPipeline, HeatDangerResult, StudyArea, UhiConfig, UhiPipeline,
        UhiResult,
    };
    pub use crate::statistics::{reduce_region, regional_mean, Reducer, RegionalScalar, Scale};
    pub use crate::temporal::{
        count_exceedances, mode_composite, thermal_composite, ModeComposite, ThermalComposite,
        ThresholdCount,
    };
    pub use climstress_core::prelude::*;
}
