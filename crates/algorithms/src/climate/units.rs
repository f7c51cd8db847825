//! Temperature unit conversions

use crate::imagery::band_math;
use climstress_core::raster::Raster;
use climstress_core::Result;

/// Offset between the Kelvin and Celsius scales
pub const KELVIN_OFFSET: f64 = 273.15;

#[inline]
pub fn kelvin_to_celsius(k: f64) -> f64 {
    k - KELVIN_OFFSET
}

#[inline]
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

#[inline]
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn kelvin_to_celsius_raster(kelvin: &Raster<f64>) -> Result<Raster<f64>> {
    band_math(kelvin, kelvin_to_celsius)
}

pub fn celsius_to_fahrenheit_raster(celsius: &Raster<f64>) -> Result<Raster<f64>> {
    band_math(celsius, celsius_to_fahrenheit)
}

pub fn fahrenheit_to_celsius_raster(fahrenheit: &Raster<f64>) -> Result<Raster<f64>> {
    band_math(fahrenheit, fahrenheit_to_celsius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fahrenheit_round_trip() {
        for c in [-40.0, -12.5, 0.0, 21.3, 37.0, 48.9] {
            assert_relative_eq!(fahrenheit_to_celsius(celsius_to_fahrenheit(c)), c, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_known_points() {
        assert_relative_eq!(kelvin_to_celsius(273.15), 0.0);
        assert_relative_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_relative_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn test_raster_conversion_keeps_nodata() {
        let mut kelvin = Raster::filled(3, 3, 313.15);
        kelvin.set(1, 1, f64::NAN).unwrap();
        let f = celsius_to_fahrenheit_raster(&kelvin_to_celsius_raster(&kelvin).unwrap()).unwrap();
        assert_relative_eq!(f.get(0, 0).unwrap(), 104.0, epsilon = 1e-9);
        assert!(f.get(1, 1).unwrap().is_nan());
    }
}
