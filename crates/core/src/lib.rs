//! # climstress core
//!
//! Core types shared by every climstress stage:
//! - `Raster<T>`: georeferenced grid with a no-data marker
//! - `GridDomain`: shape + georeference, the unit of alignment checks
//! - `Region`: boundary geometry for clipping, masking and regional statistics
//! - `GridTimeSeries<T>`: date-ordered grids with per-scene metadata
//! - Archive traits describing the external data sources
//! - Native GeoTIFF I/O

pub mod archive;
pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod region;
pub mod series;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, GridDomain, Raster, RasterElement};
pub use region::Region;
pub use series::{
    Calibration, DateRange, GridTimeSeries, MonthSet, SceneMetadata, SeriesFilter, Timestep,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::archive::{
        ArchiveQuery, BoundaryArchive, LandCoverArchive, MemoryArchive, ThermalArchive,
        WeatherArchive, WeatherVariable,
    };
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, GridDomain, Raster, RasterElement};
    pub use crate::region::Region;
    pub use crate::series::{DateRange, GridTimeSeries, MonthSet, SeriesFilter, Timestep};
    pub use crate::Algorithm;
}

/// Common shape of every climstress stage.
///
/// Stages are pure: they read their input and parameters and return a new
/// value. Parameters have no defaults; every threshold, scale and bin edge
/// comes from the caller.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;
}
