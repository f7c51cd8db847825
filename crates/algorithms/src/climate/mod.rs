//! Physical indices from gridded weather
//!
//! - Units: Kelvin, Celsius and Fahrenheit conversions
//! - Humidity: Magnus-formula vapour pressure and relative humidity
//! - Heat index: Steadman regression, with the daily-aggregate approximation

pub mod heat_index;
pub mod humidity;
pub mod units;

pub use heat_index::{
    approximate_daily_heat_index, heat_index, heat_index_f, steadman_heat_index_f,
    DewpointPairing, HeatIndex,
};
pub use humidity::{
    convert_air_and_dewpoint, relative_humidity, relative_humidity_scalar,
    saturation_vapor_pressure, ConvertedInputs,
};
pub use units::{
    celsius_to_fahrenheit, celsius_to_fahrenheit_raster, fahrenheit_to_celsius,
    fahrenheit_to_celsius_raster, kelvin_to_celsius, kelvin_to_celsius_raster, KELVIN_OFFSET,
};
