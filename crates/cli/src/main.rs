//! climstress CLI - heat-danger days and urban heat island classes

mod manifest;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use climstress_algorithms::classification::CLASS_NODATA;
use climstress_algorithms::landcover::LandCoverClass;
use climstress_algorithms::pipeline::{
    HeatDangerConfig, HeatDangerPipeline, UhiConfig, UhiPipeline,
};
use climstress_core::io::{read_geotiff, write_geotiff};
use climstress_core::{Raster, RasterElement};
use manifest::Manifest;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "climstress")]
#[command(author, version, about = "Per-pixel climate-stress indices", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Count days with a dangerous heat index per pixel
    HeatDays {
        /// Archive manifest (TOML)
        #[arg(short, long)]
        manifest: PathBuf,
        /// Heat-danger configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
        /// Output day-count GeoTIFF
        output: PathBuf,
    },
    /// Classify urban heat island intensity on built-up land
    Uhi {
        /// Archive manifest (TOML)
        #[arg(short, long)]
        manifest: PathBuf,
        /// UHI configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
        /// Output class GeoTIFF
        output: PathBuf,
        /// Also write the mode land-cover composite
        #[arg(long)]
        land_cover: Option<PathBuf>,
        /// Also write the median surface-temperature composite
        #[arg(long)]
        surface_temperature: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} {}", what, path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse {} {}", what, path.display()))
}

fn load_archive(path: &Path) -> Result<climstress_core::archive::MemoryArchive> {
    let pb = spinner("Loading archive...");
    let (manifest, base) = Manifest::from_path(path)?;
    let archive = manifest.load(&base);
    pb.finish_and_clear();
    archive
}

fn write_result<T: RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn class_label(class: usize, edges: &[f64]) -> String {
    match class {
        0 => format!("< {}", edges[0]),
        c if c == edges.len() => format!(">= {}", edges[c - 1]),
        c => format!("[{}, {})", edges[c - 1], edges[c]),
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let raster: Raster<f64> = read_geotiff(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }

        Commands::HeatDays {
            manifest,
            config,
            output,
        } => {
            let config: HeatDangerConfig = load_toml(&config, "heat-danger config")?;
            let pipeline = HeatDangerPipeline::new(config).context("Invalid heat-danger config")?;
            let archive = load_archive(&manifest)?;

            let start = Instant::now();
            let pb = spinner("Counting heat-danger days...");
            let result = pipeline.run(&archive);
            pb.finish_and_clear();
            let result = result.context("Heat-danger run failed")?;
            let elapsed = start.elapsed();

            let stats = result.days.statistics();
            info!(
                region = %result.region.name(),
                days_considered = result.days_considered,
                "heat-danger run finished"
            );
            println!("Region: {}", result.region.name());
            println!("Days considered: {}", result.days_considered);
            println!("Pairing: {}", result.pairing);
            if let (Some(min), Some(max)) = (stats.min, stats.max) {
                println!("Days above {} °C: {} - {}", pipeline.config().threshold_c, min, max);
            }
            write_result(&result.days, &output)?;
            done("Heat-danger days", &output, elapsed);
        }

        Commands::Uhi {
            manifest,
            config,
            output,
            land_cover,
            surface_temperature,
        } => {
            let config: UhiConfig = load_toml(&config, "UHI config")?;
            let pipeline = UhiPipeline::new(config).context("Invalid UHI config")?;
            let archive = load_archive(&manifest)?;

            let start = Instant::now();
            let pb = spinner("Classifying urban heat island...");
            let result = pipeline.run(&archive);
            pb.finish_and_clear();
            let result = result.context("UHI run failed")?;
            let elapsed = start.elapsed();

            println!("Region: {}", result.region.name());
            println!("Regional mean: {}", result.regional_mean);
            let mask_class: LandCoverClass = pipeline.config().mask_class;
            println!("Classes on {} pixels:", mask_class);
            let edges = result.classes.edges().edges();
            for (class, count) in result.classes.class_counts().into_iter().enumerate() {
                println!("  {} {:<16} {}", class, class_label(class, edges), count);
            }
            let unclassified = result
                .classes
                .raster()
                .data()
                .iter()
                .filter(|&&c| c == CLASS_NODATA)
                .count();
            println!("  no-data          {}", unclassified);

            write_result(result.classes.raster(), &output)?;
            done("UHI classes", &output, elapsed);
            if let Some(path) = land_cover {
                write_result(&result.land_cover, &path)?;
                println!("Land cover saved to: {}", path.display());
            }
            if let Some(path) = surface_temperature {
                write_result(&result.surface_temperature, &path)?;
                println!("Surface temperature saved to: {}", path.display());
            }
        }
    }

    Ok(())
}
