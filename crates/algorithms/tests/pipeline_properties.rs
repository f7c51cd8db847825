//! End-to-end properties of the heat-danger and UHI pipelines over a
//! synthetic in-memory archive.

use chrono::{Days, NaiveDate};
use climstress_algorithms::classification::{BinEdges, CLASS_NODATA};
use climstress_algorithms::landcover::LandCoverClass;
use climstress_algorithms::pipeline::{
    HeatDangerConfig, HeatDangerPipeline, StudyArea, UhiConfig, UhiPipeline,
};
use climstress_algorithms::statistics::{regional_mean, Scale};
use climstress_core::archive::{MemoryArchive, WeatherVariable};
use climstress_core::{
    Calibration, DateRange, Error, GeoTransform, GridDomain, GridTimeSeries, MonthSet, Raster,
    Region, SceneMetadata, Timestep,
};

const SIZE: usize = 16;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn domain() -> GridDomain {
    GridDomain::new(SIZE, SIZE, GeoTransform::new(0.0, SIZE as f64, 1.0, -1.0))
}

/// Deterministic field varying by pixel and day
fn field(base: f64, spread: f64, day: u64) -> Raster<f64> {
    let mut r = domain().filled(0.0);
    for row in 0..SIZE {
        for col in 0..SIZE {
            let k = ((row * 31 + col * 17 + day as usize * 13) % 23) as f64 / 22.0;
            r.set(row, col, base + spread * k).unwrap();
        }
    }
    r
}

fn daily(base: f64, spread: f64) -> GridTimeSeries<f64> {
    let start = date(2020, 3, 1);
    let steps = (0..150)
        .map(|d| Timestep::new(start + Days::new(d), field(base, spread, d)))
        .collect();
    GridTimeSeries::new("daily", domain(), steps).unwrap()
}

fn land_cover() -> GridTimeSeries<u8> {
    let steps = (0..6)
        .map(|i| {
            let mut r = domain().filled(1u8);
            for row in 0..SIZE {
                for col in 0..SIZE {
                    // built-up core with noisy edges
                    let core = (4..12).contains(&row) && (4..12).contains(&col);
                    let code = if core || (row + col + i) % 9 == 0 { 6 } else { ((row + i) % 3) as u8 };
                    r.set(row, col, code).unwrap();
                }
            }
            Timestep::new(date(2022, 1 + i as u32 * 2, 10), r)
        })
        .collect();
    GridTimeSeries::new("label", domain(), steps).unwrap()
}

fn thermal() -> GridTimeSeries<f64> {
    let steps = (0..8u64)
        .map(|i| {
            let meta = SceneMetadata::default()
                .with_cloud_cover((i * 7) as f64)
                .with_calibration(Calibration::new(0.00341802, 149.0));
            Timestep::new(date(2022, 2, 1) + Days::new(i * 16), field(43000.0, 1200.0, i)).with_meta(meta)
        })
        .collect();
    GridTimeSeries::new("ST_B10", domain(), steps).unwrap()
}

fn district() -> Region {
    Region::from_exterior(
        "district",
        &[[1.0, 1.0], [15.0, 2.0], [14.0, 15.0], [2.0, 14.0]],
    )
    .unwrap()
}

fn archive() -> MemoryArchive {
    MemoryArchive::new()
        .with_weather(WeatherVariable::MaxTemperature, daily(300.0, 15.0))
        .with_weather(WeatherVariable::MeanDewpoint, daily(290.0, 12.0))
        .with_land_cover(land_cover())
        .with_thermal(thermal())
        .with_boundary(district())
}

fn heat_config() -> HeatDangerConfig {
    HeatDangerConfig {
        study_area: StudyArea::named("district"),
        period: DateRange::new(date(2020, 3, 1), date(2020, 7, 31)).unwrap(),
        months: MonthSet::from_months(&[3, 4, 5, 6, 7]).unwrap(),
        threshold_c: 40.0,
    }
}

fn uhi_config() -> UhiConfig {
    UhiConfig {
        study_area: StudyArea::named("district").simplified(0.5),
        period: DateRange::new(date(2022, 1, 1), date(2024, 1, 1)).unwrap(),
        months: MonthSet::range(1, 12).unwrap(),
        max_cloud_cover: 10.0,
        scale: 2.0,
        bin_edges: BinEdges::uhi_default(),
        mask_class: LandCoverClass::Built,
    }
}

#[test]
fn heat_danger_is_bit_identical_across_runs() {
    let pipeline = HeatDangerPipeline::new(heat_config()).unwrap();
    let archive = archive();
    let a = pipeline.run(&archive).unwrap();
    let b = pipeline.run(&archive).unwrap();
    assert_eq!(a.days.data(), b.days.data());
    assert_eq!(a.days_considered, b.days_considered);
}

#[test]
fn heat_danger_counts_are_bounded_and_clipped() {
    let result = HeatDangerPipeline::new(heat_config()).unwrap().run(&archive()).unwrap();
    // every synthetic day falls inside the window
    assert_eq!(result.days_considered, 150);

    let region = district();
    let mut some_hot = false;
    for row in 0..SIZE {
        for col in 0..SIZE {
            let (x, y) = result.days.pixel_to_geo(col, row);
            match result.days.valid_at(row, col).unwrap() {
                Some(days) => {
                    assert!(region.contains(x, y));
                    assert!(days as usize <= result.days_considered);
                    some_hot |= days > 0;
                }
                None => assert!(!region.contains(x, y)),
            }
        }
    }
    assert!(some_hot, "synthetic weather should produce dangerous days");
}

#[test]
fn uhi_is_bit_identical_across_runs() {
    let pipeline = UhiPipeline::new(uhi_config()).unwrap();
    let archive = archive();
    let a = pipeline.run(&archive).unwrap();
    let b = pipeline.run(&archive).unwrap();

    assert_eq!(a.regional_mean.value.to_bits(), b.regional_mean.value.to_bits());
    assert_eq!(a.classes.raster().data(), b.classes.raster().data());
    assert_eq!(a.land_cover.data(), b.land_cover.data());
    let bits = |r: &Raster<f64>| r.data().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a.surface_temperature), bits(&b.surface_temperature));
}

#[test]
fn uhi_classes_only_on_built_land() {
    let result = UhiPipeline::new(uhi_config()).unwrap().run(&archive()).unwrap();
    let classes = result.classes.raster();
    let max_class = result.classes.edges().max_class();

    let mut classified = 0;
    for row in 0..SIZE {
        for col in 0..SIZE {
            let class = classes.get(row, col).unwrap();
            let (x, y) = classes.pixel_to_geo(col, row);
            if !result.region.contains(x, y) {
                assert_eq!(class, CLASS_NODATA);
                assert_eq!(result.land_cover.valid_at(row, col).unwrap(), None);
            }
            if class == CLASS_NODATA {
                continue;
            }
            classified += 1;
            assert!(class <= max_class);
            assert_eq!(result.land_cover.get(row, col).unwrap(), LandCoverClass::Built.code());
        }
    }
    assert!(classified > 0);
    assert_eq!(result.regional_mean.scale, Scale::new(2.0).unwrap());
}

#[test]
fn regional_mean_outside_grid_is_empty() {
    let lst = field(300.0, 5.0, 0);
    let far = Region::from_exterior("far", &[[100.0, 100.0], [110.0, 100.0], [110.0, 110.0]]).unwrap();
    assert!(matches!(
        regional_mean(&lst, &far, Scale::new(1.0).unwrap()),
        Err(Error::EmptyReduction(_))
    ));
}
