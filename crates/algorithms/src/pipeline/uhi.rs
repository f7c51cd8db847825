//! Urban heat island classification
//!
//! Land cover is mode-composited, thermal scenes are median-composited into
//! a surface temperature, and the temperature's anomaly against the
//! region-wide mean is binned and kept only on the configured land-cover
//! class. Land-cover and thermal series must share one grid; they are not
//! resampled onto each other.

use super::config::UhiConfig;
use super::study_area::resolve_region;
use crate::classification::{classify_anomaly, normalized_anomaly, ClassifiedGrid};
use crate::imagery::clip_to_region;
use crate::landcover::CategoryMask;
use crate::statistics::{regional_mean, RegionalScalar};
use crate::temporal::{mode_composite, thermal_composite};
use climstress_core::archive::{ArchiveQuery, BoundaryArchive, LandCoverArchive, ThermalArchive};
use climstress_core::raster::Raster;
use climstress_core::{Region, Result};
use tracing::info;

/// Output of a UHI run, with the intermediate composites
#[derive(Debug, Clone)]
pub struct UhiResult {
    /// Mode land cover, clipped to the study area
    pub land_cover: Raster<u8>,
    /// Median calibrated surface temperature (unclipped)
    pub surface_temperature: Raster<f64>,
    pub regional_mean: RegionalScalar,
    /// UHI classes on the mask class only, clipped to the study area
    pub classes: ClassifiedGrid,
    pub region: Region,
}

/// UHI pipeline with a validated configuration
#[derive(Debug, Clone)]
pub struct UhiPipeline {
    config: UhiConfig,
}

impl UhiPipeline {
    /// Fails fast on an invalid configuration
    pub fn new(config: UhiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &UhiConfig {
        &self.config
    }

    pub fn run<A>(&self, archive: &A) -> Result<UhiResult>
    where
        A: LandCoverArchive + ThermalArchive + BoundaryArchive + ?Sized,
    {
        let cfg = &self.config;
        let region = resolve_region(archive, &cfg.study_area)?;
        let query = ArchiveQuery::new(cfg.period, cfg.months).within(&region);
        let filter = query.filter();

        let labels = filter.apply(&archive.labels(&query)?);
        info!(observations = labels.len(), "land-cover series loaded");
        let land_cover = mode_composite(&labels)?;

        let scenes = filter.apply(&archive.scenes(&query)?);
        info!(
            scenes = scenes.len(),
            max_cloud_cover = cfg.max_cloud_cover,
            "thermal series loaded"
        );
        let surface_temperature = thermal_composite(&scenes, cfg.max_cloud_cover)?;

        let mean = regional_mean(&surface_temperature, &region, cfg.scale()?)?;
        info!(
            mean = mean.value,
            scale = %mean.scale,
            samples = mean.sample_count,
            "regional mean"
        );

        let anomaly = normalized_anomaly(&surface_temperature, mean.value)?;
        let mask = CategoryMask::from_labels(&land_cover, cfg.mask_class)?;
        let classes = classify_anomaly(&anomaly, &cfg.bin_edges)?
            .apply_mask(&mask)?
            .clip_to_region(&region)?;
        info!(
            mask_class = %cfg.mask_class,
            mask_pixels = mask.coverage(),
            class_counts = ?classes.class_counts(),
            "UHI classes assigned"
        );

        Ok(UhiResult {
            land_cover: clip_to_region(&land_cover, &region)?,
            surface_temperature,
            regional_mean: mean,
            classes,
            region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{BinEdges, CLASS_NODATA};
    use crate::landcover::LandCoverClass;
    use crate::pipeline::config::StudyArea;
    use chrono::NaiveDate;
    use climstress_core::archive::MemoryArchive;
    use climstress_core::{
        Calibration, DateRange, Error, GeoTransform, GridDomain, GridTimeSeries, MonthSet,
        SceneMetadata, Timestep,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn domain() -> GridDomain {
        GridDomain::new(1, 4, GeoTransform::new(0.0, 1.0, 1.0, -1.0))
    }

    fn config() -> UhiConfig {
        UhiConfig {
            study_area: StudyArea::named("district"),
            period: DateRange::new(date(2022, 1, 1), date(2024, 1, 1)).unwrap(),
            months: MonthSet::all(),
            max_cloud_cover: 10.0,
            scale: 1.0,
            bin_edges: BinEdges::uhi_default(),
            mask_class: LandCoverClass::Built,
        }
    }

    fn archive() -> MemoryArchive {
        let labels = |codes: Vec<u8>| Raster::from_vec(codes, 1, 4).unwrap().with_transform(domain().transform);
        let land = GridTimeSeries::new(
            "label",
            domain(),
            vec![
                Timestep::new(date(2022, 3, 1), labels(vec![6, 6, 1, 6])),
                Timestep::new(date(2022, 9, 1), labels(vec![6, 2, 1, 6])),
                Timestep::new(date(2023, 3, 1), labels(vec![6, 2, 1, 0])),
            ],
        )
        .unwrap();

        // calibrated kelvin = dn (gain 1, offset 0); mean of [300, 303, 297, 300] = 300
        let thermal_meta = |cloud| {
            SceneMetadata::default()
                .with_cloud_cover(cloud)
                .with_calibration(Calibration::new(1.0, 0.0))
        };
        let dn = Raster::from_vec(vec![300.0, 303.0, 297.0, 300.0], 1, 4)
            .unwrap()
            .with_transform(domain().transform);
        let thermal = GridTimeSeries::new(
            "ST_B10",
            domain(),
            vec![
                Timestep::new(date(2022, 5, 1), dn.clone()).with_meta(thermal_meta(2.0)),
                Timestep::new(date(2022, 6, 1), dn.like(400.0)).with_meta(thermal_meta(60.0)),
            ],
        )
        .unwrap();

        MemoryArchive::new()
            .with_land_cover(land)
            .with_thermal(thermal)
            .with_boundary(Region::from_exterior("district", &[[0.0, 0.0], [4.0, 0.0], [4.0, 1.0], [0.0, 1.0]]).unwrap())
            // leaves out the built pixel in the last column
            .with_boundary(Region::from_exterior("west", &[[0.0, 0.0], [3.0, 0.0], [3.0, 1.0], [0.0, 1.0]]).unwrap())
    }

    #[test]
    fn test_uhi_classes_on_built_pixels() {
        let result = UhiPipeline::new(config()).unwrap().run(&archive()).unwrap();

        assert_eq!(result.land_cover.data().as_slice().unwrap(), &[6, 2, 1, 6]);
        assert_eq!(result.regional_mean.value, 300.0);
        assert_eq!(result.regional_mean.sample_count, 4);

        let classes = result.classes.raster();
        assert_eq!(classes.get(0, 0).unwrap(), 1); // anomaly 0.0
        assert_eq!(classes.get(0, 1).unwrap(), CLASS_NODATA); // crops
        assert_eq!(classes.get(0, 2).unwrap(), CLASS_NODATA); // trees
        assert_eq!(classes.get(0, 3).unwrap(), 1);
    }

    #[test]
    fn test_classes_outside_region_are_nodata() {
        let mut cfg = config();
        cfg.study_area = StudyArea::named("west");
        let result = UhiPipeline::new(cfg).unwrap().run(&archive()).unwrap();

        // mean over the first three pixels is still 300
        assert_eq!(result.regional_mean.value, 300.0);
        assert_eq!(result.regional_mean.sample_count, 3);

        let classes = result.classes.raster();
        assert_eq!(classes.get(0, 0).unwrap(), 1);
        // built with anomaly 0.0, but outside the region
        assert_eq!(result.surface_temperature.get(0, 3).unwrap(), 300.0);
        assert_eq!(classes.get(0, 3).unwrap(), CLASS_NODATA);
        assert_eq!(result.land_cover.valid_at(0, 3).unwrap(), None);
        assert_eq!(result.classes.class_counts().iter().sum::<usize>(), 1);
    }

    #[test]
    fn test_zero_thermal_scenes_is_empty_reduction() {
        let mut cfg = config();
        cfg.max_cloud_cover = 1.0;
        let result = UhiPipeline::new(cfg).unwrap().run(&archive());
        assert!(matches!(result, Err(Error::EmptyReduction(_))));
    }

    #[test]
    fn test_bad_scale_fails_fast() {
        let mut cfg = config();
        cfg.scale = -5.0;
        assert!(UhiPipeline::new(cfg).is_err());
    }
}
