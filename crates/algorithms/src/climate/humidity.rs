//! Humidity from temperature and dewpoint (Magnus formula)
//!
//! Vapour pressures are in hPa, temperatures in °C. Relative humidity is a
//! percentage and is not clamped: a dewpoint above the air temperature gives
//! values over 100.

use super::units::{celsius_to_fahrenheit_raster, kelvin_to_celsius_raster};
use crate::imagery::{band_math, band_math_binary, BandMathOp};
use climstress_core::raster::Raster;
use climstress_core::Result;

const MAGNUS_E0: f64 = 6.11;
const MAGNUS_A: f64 = 7.5;
const MAGNUS_B: f64 = 237.3;

/// Saturation vapour pressure (hPa) at `t_c` °C.
///
/// Returns NaN where `237.3 + t_c` vanishes.
pub fn saturation_vapor_pressure(t_c: f64) -> f64 {
    let denom = MAGNUS_B + t_c;
    if denom.abs() < 1e-10 {
        return f64::NAN;
    }
    MAGNUS_E0 * 10f64.powf(MAGNUS_A * t_c / denom)
}

/// Relative humidity (%) from air temperature and dewpoint, both °C
pub fn relative_humidity_scalar(t_c: f64, td_c: f64) -> f64 {
    let es = saturation_vapor_pressure(t_c);
    if es.abs() < 1e-10 {
        return f64::NAN;
    }
    saturation_vapor_pressure(td_c) / es * 100.0
}

/// Relative humidity grid (%) from aligned air-temperature and dewpoint
/// grids in °C.
pub fn relative_humidity(t_c: &Raster<f64>, td_c: &Raster<f64>) -> Result<Raster<f64>> {
    t_c.ensure_aligned(td_c)?;
    let e = band_math(td_c, saturation_vapor_pressure)?;
    let es = band_math(t_c, saturation_vapor_pressure)?;
    let ratio = band_math_binary(&e, &es, BandMathOp::Divide)?;
    band_math(&ratio, |r| r * 100.0)
}

/// Everything the heat-index evaluator needs, derived from Kelvin inputs
#[derive(Debug, Clone)]
pub struct ConvertedInputs {
    pub t_c: Raster<f64>,
    pub t_f: Raster<f64>,
    pub td_c: Raster<f64>,
    /// Relative humidity, percent
    pub rh: Raster<f64>,
}

/// Convert an air-temperature and a dewpoint grid (Kelvin, same domain)
/// into Celsius, Fahrenheit and relative humidity.
pub fn convert_air_and_dewpoint(t_k: &Raster<f64>, td_k: &Raster<f64>) -> Result<ConvertedInputs> {
    t_k.ensure_aligned(td_k)?;
    let t_c = kelvin_to_celsius_raster(t_k)?;
    let td_c = kelvin_to_celsius_raster(td_k)?;
    let t_f = celsius_to_fahrenheit_raster(&t_c)?;
    let rh = relative_humidity(&t_c, &td_c)?;
    Ok(ConvertedInputs { t_c, t_f, td_c, rh })
}
