//! Thermal (median) compositor
//!
//! Cloud screening, radiometric calibration and a per-pixel median over the
//! surviving scenes. Pixels with no contributing observation are NaN.

use super::combine::median_of;
use crate::imagery::band_math;
use crate::maybe_rayon::*;
use climstress_core::raster::Raster;
use climstress_core::{Algorithm, Error, GridTimeSeries, Result};
use tracing::debug;

/// Parameters for the thermal composite
#[derive(Debug, Clone, Copy)]
pub struct ThermalCompositeParams {
    /// Scenes with cloud cover above this percentage are dropped
    pub max_cloud_cover: f64,
}

/// Thermal compositing stage: raw scenes in, calibrated median out
#[derive(Debug, Clone, Default)]
pub struct ThermalComposite;

impl Algorithm for ThermalComposite {
    type Input = GridTimeSeries<f64>;
    type Output = Raster<f64>;
    type Params = ThermalCompositeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Thermal Composite"
    }

    fn description(&self) -> &'static str {
        "Cloud-screened, calibrated per-pixel median of thermal scenes"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        thermal_composite(&input, params.max_cloud_cover)
    }
}

/// Keep scenes whose cloud cover is at most `max_cloud_cover` percent.
///
/// Scenes without cloud-cover metadata cannot be screened and are dropped.
pub fn screen_cloud_cover(
    series: &GridTimeSeries<f64>,
    max_cloud_cover: f64,
) -> Result<GridTimeSeries<f64>> {
    if !(0.0..=100.0).contains(&max_cloud_cover) {
        return Err(Error::invalid_param(
            "max_cloud_cover",
            max_cloud_cover,
            "must be a percentage in [0, 100]",
        ));
    }
    let kept = series.filter(|s| s.meta.cloud_cover.is_some_and(|c| c <= max_cloud_cover));
    debug!(
        scenes = series.len(),
        kept = kept.len(),
        max_cloud_cover,
        "cloud screening"
    );
    Ok(kept)
}

/// Apply each scene's `raw * gain + offset` calibration.
///
/// A scene without calibration metadata is an error, not a silent pass-through.
pub fn calibrate(series: &GridTimeSeries<f64>) -> Result<GridTimeSeries<f64>> {
    series.try_map(series.variable(), |step| {
        let cal = step.meta.calibration.ok_or(Error::MissingMetadata {
            date: step.date,
            field: "calibration",
        })?;
        band_math(&step.raster, move |raw| cal.apply(raw))
    })
}

/// Per-pixel median across the series, ignoring no-data samples
pub fn median_composite(series: &GridTimeSeries<f64>) -> Result<Raster<f64>> {
    let template = series.domain().filled(f64::NAN);
    let (rows, cols) = template.shape();
    let steps = series.steps();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            let mut samples = Vec::with_capacity(steps.len());
            for col in 0..cols {
                samples.clear();
                for step in steps {
                    let val = unsafe { step.raster.get_unchecked(row, col) };
                    if !step.raster.is_nodata(val) {
                        samples.push(val);
                    }
                }
                if let Some(m) = median_of(&samples) {
                    row_data[col] = m;
                }
            }
            row_data
        })
        .collect();

    template.with_data(data, Some(f64::NAN))
}

/// Screen by cloud cover, calibrate, then take the per-pixel median
pub fn thermal_composite(series: &GridTimeSeries<f64>, max_cloud_cover: f64) -> Result<Raster<f64>> {
    let screened = screen_cloud_cover(series, max_cloud_cover)?;
    let calibrated = calibrate(&screened)?;
    median_composite(&calibrated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use climstress_core::{Calibration, GeoTransform, GridDomain, SceneMetadata, Timestep};

    const GAIN: f64 = 0.00341802;
    const OFFSET: f64 = 149.0;

    fn domain() -> GridDomain {
        GridDomain::new(2, 2, GeoTransform::new(91.8, 24.9, 0.001, -0.001))
    }

    fn scene(day: u32, dn: f64, cloud: Option<f64>) -> Timestep<f64> {
        let mut meta = SceneMetadata::default().with_calibration(Calibration::new(GAIN, OFFSET));
        if let Some(c) = cloud {
            meta = meta.with_cloud_cover(c);
        }
        let date = NaiveDate::from_ymd_opt(2023, 3, day).unwrap();
        Timestep::new(date, domain().filled(dn)).with_meta(meta)
    }

    fn scenes(steps: Vec<Timestep<f64>>) -> GridTimeSeries<f64> {
        GridTimeSeries::new("ST_B10", domain(), steps).unwrap()
    }

    #[test]
    fn test_cloud_screen_boundary() {
        let s = scenes(vec![
            scene(1, 44000.0, Some(9.99)),
            scene(2, 44000.0, Some(10.0)),
            scene(3, 44000.0, Some(10.01)),
            scene(4, 44000.0, None),
        ]);
        let kept = screen_cloud_cover(&s, 10.0).unwrap();
        assert_eq!(kept.len(), 2);
        assert!(screen_cloud_cover(&s, 120.0).is_err());
    }

    #[test]
    fn test_calibration() {
        let s = scenes(vec![scene(1, 44000.0, Some(1.0))]);
        let cal = calibrate(&s).unwrap();
        assert_relative_eq!(cal.steps()[0].raster.get(0, 0).unwrap(), 44000.0 * GAIN + OFFSET);
    }

    #[test]
    fn test_missing_calibration_is_an_error() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 9).unwrap();
        let bare = Timestep::new(date, domain().filled(1.0))
            .with_meta(SceneMetadata::default().with_cloud_cover(0.0));
        let s = scenes(vec![bare]);
        assert!(matches!(
            calibrate(&s),
            Err(Error::MissingMetadata { field: "calibration", .. })
        ));
    }

    #[test]
    fn test_median_of_calibrated_scenes() {
        let s = scenes(vec![
            scene(1, 40000.0, Some(2.0)),
            scene(2, 42000.0, Some(3.0)),
            scene(3, 46000.0, Some(4.0)),
            scene(4, 60000.0, Some(80.0)), // screened out
        ]);
        let out = thermal_composite(&s, 10.0).unwrap();
        assert_relative_eq!(out.get(1, 1).unwrap(), 42000.0 * GAIN + OFFSET, epsilon = 1e-9);
    }

    #[test]
    fn test_pixel_without_observations_is_nodata() {
        let mut a = scene(1, 40000.0, Some(0.0));
        a.raster.set(0, 0, f64::NAN).unwrap();
        let out = thermal_composite(&scenes(vec![a]), 10.0).unwrap();
        assert!(out.get(0, 0).unwrap().is_nan());
        assert!(!out.get(0, 1).unwrap().is_nan());

        let cloudy = scenes(vec![scene(1, 40000.0, Some(95.0))]);
        let out = thermal_composite(&cloudy, 10.0).unwrap();
        assert!(out.data().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_even_count_averages_middle_values() {
        let s = scenes(vec![scene(1, 1.0, Some(0.0)), scene(2, 3.0, Some(0.0))]);
        let out = median_composite(&s).unwrap();
        assert_relative_eq!(out.get(0, 0).unwrap(), 2.0);
    }
}
