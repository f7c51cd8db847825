//! Steadman Heat Index
//!
//! Rothfusz's regression of Steadman's apparent temperature tables, as used
//! by the US National Weather Service:
//!
//! ```text
//! HI_f = -42.379 + 2.04901523*T + 10.14333127*R
//!        - 0.22475541*T*R - 0.00683783*T^2 - 0.05481717*R^2
//!        + 0.00122874*T^2*R + 0.00085282*T*R^2 - 0.00000199*T^2*R^2
//! ```
//!
//! with `T` in °F and `R` relative humidity in percent. The regression is
//! applied everywhere without the NWS low-temperature adjustments.
//!
//! Reference:
//! Rothfusz, L.P. (1990). The heat index "equation". NWS Technical Attachment SR 90-23.

use super::humidity::convert_air_and_dewpoint;
use super::units::fahrenheit_to_celsius;
use crate::imagery::band_math_zip;
use climstress_core::raster::Raster;
use climstress_core::{Algorithm, Error, Result};
use std::fmt;

/// Heat index in °F from temperature (°F) and relative humidity (%)
pub fn steadman_heat_index_f(t_f: f64, rh: f64) -> f64 {
    let t2 = t_f * t_f;
    let r2 = rh * rh;
    -42.379 + 2.04901523 * t_f + 10.14333127 * rh
        - 0.22475541 * t_f * rh
        - 0.00683783 * t2
        - 0.05481717 * r2
        + 0.00122874 * t2 * rh
        + 0.00085282 * t_f * r2
        - 0.00000199 * t2 * r2
}

/// Heat index grid in °F
pub fn heat_index_f(t_f: &Raster<f64>, rh: &Raster<f64>) -> Result<Raster<f64>> {
    band_math_zip(t_f, rh, steadman_heat_index_f)
}

/// Heat index grid in °C from temperature (°F) and relative humidity (%)
pub fn heat_index(t_f: &Raster<f64>, rh: &Raster<f64>) -> Result<Raster<f64>> {
    band_math_zip(t_f, rh, |t, r| fahrenheit_to_celsius(steadman_heat_index_f(t, r)))
}

/// How the temperature and dewpoint feeding the heat index were sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DewpointPairing {
    /// Temperature and dewpoint observed at the same instant
    Coincident,
    /// Daily maximum temperature paired with the daily mean dewpoint.
    ///
    /// The dewpoint at the hour of peak temperature usually differs from the
    /// daily mean, so the relative humidity (and hence the heat index) is
    /// biased. The result is an approximation, not an instantaneous heat index.
    DailyMeanWithDailyMax,
}

impl DewpointPairing {
    pub fn is_approximate(&self) -> bool {
        matches!(self, DewpointPairing::DailyMeanWithDailyMax)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DewpointPairing::Coincident => "coincident temperature and dewpoint",
            DewpointPairing::DailyMeanWithDailyMax => {
                "approximate: daily max temperature with daily mean dewpoint"
            }
        }
    }
}

impl fmt::Display for DewpointPairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Approximate daily heat index (°C) from a daily maximum temperature grid
/// and a daily mean dewpoint grid, both in Kelvin.
///
/// This is the [`DewpointPairing::DailyMeanWithDailyMax`] approximation:
/// the humidity is computed as if the mean dewpoint occurred at the time of
/// maximum temperature. Treat day counts derived from it as indicative.
pub fn approximate_daily_heat_index(tmax_k: &Raster<f64>, tdmean_k: &Raster<f64>) -> Result<Raster<f64>> {
    let inputs = convert_air_and_dewpoint(tmax_k, tdmean_k)?;
    heat_index(&inputs.t_f, &inputs.rh)
}

/// Heat index stage: Kelvin temperature and dewpoint grids in, °C out
#[derive(Debug, Clone, Default)]
pub struct HeatIndex;

impl Algorithm for HeatIndex {
    type Input = (Raster<f64>, Raster<f64>);
    type Output = Raster<f64>;
    type Params = DewpointPairing;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Heat Index"
    }

    fn description(&self) -> &'static str {
        "Steadman heat index in Celsius from air temperature and dewpoint"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        if params.is_approximate() {
            tracing::debug!(pairing = %params, "heat index from daily aggregates");
        }
        let (t_k, td_k) = input;
        approximate_daily_heat_index(&t_k, &td_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_regression_check_value() {
        // NWS heat index table: 95 °F at 50 % RH reads 105 °F
        assert_relative_eq!(steadman_heat_index_f(95.0, 50.0), 105.2, epsilon = 0.1);
    }

    #[test]
    fn test_heat_index_celsius_grid() {
        let t_f = Raster::filled(3, 3, 95.0);
        let mut rh = Raster::filled(3, 3, 50.0);
        rh.set(2, 2, f64::NAN).unwrap();

        let hi = heat_index(&t_f, &rh).unwrap();
        let expected = fahrenheit_to_celsius(steadman_heat_index_f(95.0, 50.0));
        assert_relative_eq!(hi.get(0, 0).unwrap(), expected, epsilon = 1e-12);
        assert!(hi.get(2, 2).unwrap().is_nan());

        let hi_f = heat_index_f(&t_f, &rh).unwrap();
        assert_relative_eq!(hi_f.get(0, 0).unwrap(), steadman_heat_index_f(95.0, 50.0));
    }

    #[test]
    fn test_humid_heat_exceeds_air_temperature() {
        // 35 °C air, 28 °C mean dewpoint: well past the 40 °C danger level
        let tmax = Raster::filled(2, 2, 308.15);
        let td = Raster::filled(2, 2, 301.15);
        let hi = approximate_daily_heat_index(&tmax, &td).unwrap();
        let v = hi.get(0, 0).unwrap();
        assert!(v > 40.0, "got {v}");
    }

    #[test]
    fn test_algorithm_matches_function() {
        let tmax = Raster::filled(2, 2, 305.0);
        let td = Raster::filled(2, 2, 295.0);
        let direct = approximate_daily_heat_index(&tmax, &td).unwrap();
        let staged = HeatIndex
            .execute((tmax, td), DewpointPairing::DailyMeanWithDailyMax)
            .unwrap();
        assert_eq!(staged.get(1, 1).unwrap(), direct.get(1, 1).unwrap());
        assert_eq!(HeatIndex.name(), "Heat Index");
    }

    #[test]
    fn test_pairing_label() {
        assert!(DewpointPairing::DailyMeanWithDailyMax.is_approximate());
        assert!(!DewpointPairing::Coincident.is_approximate());
        assert!(DewpointPairing::DailyMeanWithDailyMax
            .to_string()
            .starts_with("approximate"));
    }
}
