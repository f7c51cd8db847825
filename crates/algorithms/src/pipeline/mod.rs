//! End-to-end runs against the archive traits
//!
//! - **heat**: days per pixel with a heat index above the danger threshold
//! - **uhi**: urban heat island classes on built-up land
//! - **config**: TOML configuration, validated at pipeline construction
//! - **study_area**: boundary lookup and simplification

pub mod config;
pub mod heat;
pub mod study_area;
pub mod uhi;

pub use config::{HeatDangerConfig, StudyArea, UhiConfig, THRESHOLD_RANGE_C};
pub use heat::{daily_heat_index, HeatDangerPipeline, HeatDangerResult};
pub use study_area::resolve_region;
pub use uhi::{UhiPipeline, UhiResult};
