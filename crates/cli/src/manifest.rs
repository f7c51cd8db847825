//! Archive manifest: a TOML listing of GeoTIFF scenes and boundary rings,
//! loaded into a `MemoryArchive`.
//!
//! ```toml
//! crs_epsg = 4326
//!
//! [[weather]]
//! variable = "temperature_2m_max"
//! date = "2020-03-01"
//! path = "era5/tmax_20200301.tif"
//!
//! [[land_cover]]
//! date = "2022-01-10"
//! path = "dw/label_20220110.tif"
//!
//! [[thermal]]
//! date = "2022-02-03"
//! path = "landsat/st_b10_20220203.tif"
//! cloud_cover = 3.2
//! gain = 0.00341802
//! offset = 149.0
//!
//! [[boundary]]
//! name = "Sylhet"
//! exterior = [[91.0, 24.0], [92.5, 24.0], [92.5, 25.2], [91.0, 25.2]]
//! ```
//!
//! Relative paths resolve against the manifest's directory. Boundary entries
//! sharing a name are merged into one multipolygon.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use climstress_core::archive::{MemoryArchive, WeatherVariable};
use climstress_core::io::read_geotiff;
use climstress_core::{
    Calibration, GridDomain, GridTimeSeries, Raster, RasterElement, Region, SceneMetadata,
    Timestep, CRS,
};
use geo::{LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Assigned to every raster read; GeoTIFF CRS keys are not parsed
    #[serde(default)]
    pub crs_epsg: Option<u32>,
    #[serde(default)]
    pub weather: Vec<WeatherEntry>,
    #[serde(default)]
    pub land_cover: Vec<SceneEntry>,
    #[serde(default)]
    pub thermal: Vec<ThermalEntry>,
    #[serde(default)]
    pub boundary: Vec<BoundaryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherEntry {
    /// Band name: `temperature_2m_max` or `dewpoint_temperature_2m`
    pub variable: String,
    pub date: NaiveDate,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneEntry {
    pub date: NaiveDate,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThermalEntry {
    pub date: NaiveDate,
    pub path: PathBuf,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
    #[serde(default)]
    pub gain: Option<f64>,
    #[serde(default)]
    pub offset: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundaryEntry {
    pub name: String,
    pub exterior: Vec<[f64; 2]>,
    #[serde(default)]
    pub holes: Vec<Vec<[f64; 2]>>,
}

fn parse_variable(name: &str) -> Result<WeatherVariable> {
    [WeatherVariable::MaxTemperature, WeatherVariable::MeanDewpoint]
        .into_iter()
        .find(|v| v.band_name() == name)
        .with_context(|| {
            format!("Unknown weather variable '{name}' (expected temperature_2m_max or dewpoint_temperature_2m)")
        })
}

fn ring(points: &[[f64; 2]]) -> LineString<f64> {
    points.iter().map(|&[x, y]| (x, y)).collect::<Vec<_>>().into()
}

impl Manifest {
    pub fn from_path(path: &Path) -> Result<(Self, PathBuf)> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest: Manifest = toml::from_str(&text)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok((manifest, base))
    }

    /// Read every listed scene and assemble the in-memory archive
    pub fn load(&self, base: &Path) -> Result<MemoryArchive> {
        let crs = self.crs_epsg.map(CRS::from_epsg);
        let mut archive = MemoryArchive::new();

        let mut weather: BTreeMap<&str, Vec<(NaiveDate, &Path)>> = BTreeMap::new();
        for entry in &self.weather {
            weather
                .entry(entry.variable.as_str())
                .or_default()
                .push((entry.date, entry.path.as_path()));
        }
        for (name, entries) in weather {
            let variable = parse_variable(name)?;
            let steps = entries
                .into_iter()
                .map(|(date, path)| Ok(Timestep::new(date, read_scene(base, path, &crs)?)))
                .collect::<Result<Vec<_>>>()?;
            archive = archive.with_weather(variable, series(name, steps)?);
        }

        if !self.land_cover.is_empty() {
            let steps = self
                .land_cover
                .iter()
                .map(|e| Ok(Timestep::new(e.date, read_scene::<u8>(base, &e.path, &crs)?)))
                .collect::<Result<Vec<_>>>()?;
            archive = archive.with_land_cover(series("label", steps)?);
        }

        if !self.thermal.is_empty() {
            let steps = self
                .thermal
                .iter()
                .map(|e| {
                    let mut meta = SceneMetadata::default();
                    if let Some(cloud) = e.cloud_cover {
                        meta = meta.with_cloud_cover(cloud);
                    }
                    if let (Some(gain), Some(offset)) = (e.gain, e.offset) {
                        meta = meta.with_calibration(Calibration::new(gain, offset));
                    }
                    Ok(Timestep::new(e.date, read_scene(base, &e.path, &crs)?).with_meta(meta))
                })
                .collect::<Result<Vec<_>>>()?;
            archive = archive.with_thermal(series("thermal", steps)?);
        }

        for region in self.regions()? {
            archive = archive.with_boundary(region);
        }

        info!(
            weather_days = self.weather.len(),
            land_cover_scenes = self.land_cover.len(),
            thermal_scenes = self.thermal.len(),
            boundaries = self.boundary.len(),
            "manifest loaded"
        );
        Ok(archive)
    }

    /// Boundary entries grouped by name
    pub fn regions(&self) -> Result<Vec<Region>> {
        let mut grouped: BTreeMap<&str, Vec<Polygon<f64>>> = BTreeMap::new();
        for entry in &self.boundary {
            if entry.exterior.len() < 3 {
                bail!("Boundary '{}' needs at least 3 exterior vertices", entry.name);
            }
            let holes = entry.holes.iter().map(|h| ring(h)).collect();
            grouped
                .entry(entry.name.as_str())
                .or_default()
                .push(Polygon::new(ring(&entry.exterior), holes));
        }
        grouped
            .into_iter()
            .map(|(name, polygons)| {
                Region::new(name, MultiPolygon::new(polygons))
                    .with_context(|| format!("Invalid boundary '{name}'"))
            })
            .collect()
    }
}

fn read_scene<T: RasterElement>(base: &Path, path: &Path, crs: &Option<CRS>) -> Result<Raster<T>> {
    let full = base.join(path);
    let mut raster: Raster<T> =
        read_geotiff(&full).with_context(|| format!("Failed to read {}", full.display()))?;
    if crs.is_some() {
        raster.set_crs(crs.clone());
    }
    debug!(path = %full.display(), rows = raster.rows(), cols = raster.cols(), "scene read");
    Ok(raster)
}

/// Series over the first scene's domain; every other scene must align with it
fn series<T: RasterElement>(name: &str, steps: Vec<Timestep<T>>) -> Result<GridTimeSeries<T>> {
    let Some(first) = steps.first() else {
        bail!("No scenes listed for {name}");
    };
    let domain = GridDomain::of(&first.raster);
    GridTimeSeries::new(name, domain, steps)
        .with_context(|| format!("Scenes of {name} are not on one grid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use climstress_core::archive::{BoundaryArchive, ThermalArchive, WeatherArchive, ArchiveQuery};
    use climstress_core::io::write_geotiff;
    use climstress_core::{DateRange, GeoTransform, MonthSet};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("climstress-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_scene(dir: &Path, file: &str, value: f64) {
        let raster = Raster::filled(3, 3, value).with_transform(GeoTransform::new(91.0, 25.0, 0.5, -0.5));
        write_geotiff(&raster, dir.join(file)).unwrap();
    }

    #[test]
    fn test_load_manifest() {
        let dir = scratch_dir("manifest");
        write_scene(&dir, "tmax.tif", 310.0);
        write_scene(&dir, "td.tif", 295.0);
        write_scene(&dir, "st.tif", 44000.0);

        let text = r#"
            crs_epsg = 4326

            [[weather]]
            variable = "temperature_2m_max"
            date = "2020-04-01"
            path = "tmax.tif"

            [[weather]]
            variable = "dewpoint_temperature_2m"
            date = "2020-04-01"
            path = "td.tif"

            [[thermal]]
            date = "2022-02-03"
            path = "st.tif"
            cloud_cover = 3.2
            gain = 0.00341802
            offset = 149.0

            [[boundary]]
            name = "Sylhet"
            exterior = [[91.0, 23.5], [92.5, 23.5], [92.5, 25.0], [91.0, 25.0]]
        "#;
        let manifest: Manifest = toml::from_str(text).unwrap();
        let archive = manifest.load(&dir).unwrap();

        let query = ArchiveQuery::new(
            DateRange::new(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            )
            .unwrap(),
            MonthSet::all(),
        );
        let tmax = archive.daily(WeatherVariable::MaxTemperature, &query).unwrap();
        assert_eq!(tmax.len(), 1);
        assert_eq!(tmax.domain().crs.as_ref().and_then(|c| c.epsg()), Some(4326));

        let scenes = archive.scenes(&query).unwrap();
        let meta = scenes.steps()[0].meta;
        assert_eq!(meta.cloud_cover, Some(3.2));
        assert_eq!(meta.calibration, Some(Calibration::new(0.00341802, 149.0)));

        assert!(archive.boundary("Sylhet").unwrap().contains(92.0, 24.0));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_boundary_parts_merge() {
        let text = r#"
            [[boundary]]
            name = "Delta"
            exterior = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]

            [[boundary]]
            name = "Delta"
            exterior = [[5.0, 5.0], [6.0, 5.0], [6.0, 6.0]]
        "#;
        let manifest: Manifest = toml::from_str(text).unwrap();
        let regions = manifest.regions().unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].geometry().0.len(), 2);
    }

    #[test]
    fn test_unknown_variable() {
        assert!(parse_variable("total_precipitation").is_err());
        assert_eq!(
            parse_variable("dewpoint_temperature_2m").unwrap(),
            WeatherVariable::MeanDewpoint
        );
    }
}
