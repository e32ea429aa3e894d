//! map-snapshot: fetch OpenStreetMap data around a point and render a map.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use map_snapshot::bbox::BoundsMode;
use map_snapshot::config::{DEFAULT_CENTER, DEFAULT_OUTPUT_DIR, DEFAULT_RADIUS_M, MapConfig};
use map_snapshot::logging::init_logging;
use map_snapshot::overpass::{
    DEFAULT_ENDPOINT, OverpassClient, QueryService, ReplayService, RetryPolicy,
};
use map_snapshot::pipeline::run;
use map_snapshot::render::RenderOptions;
use map_snapshot::types::{Category, GeoPoint};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Bounds {
    /// Project through the local UTM zone
    Utm,
    /// Degrees from kilometres with a cos(latitude) correction
    Approx,
}

impl From<Bounds> for BoundsMode {
    fn from(bounds: Bounds) -> Self {
        match bounds {
            Bounds::Utm => BoundsMode::Utm,
            Bounds::Approx => BoundsMode::Approximate,
        }
    }
}

#[derive(Parser)]
#[command(name = "map-snapshot")]
#[command(about = "Render a map snapshot from OpenStreetMap data", long_about = None)]
struct Args {
    /// Center latitude in decimal degrees
    #[arg(long, default_value_t = DEFAULT_CENTER.lat, allow_negative_numbers = true)]
    lat: f64,

    /// Center longitude in decimal degrees
    #[arg(long, default_value_t = DEFAULT_CENTER.lon, allow_negative_numbers = true)]
    lon: f64,

    /// Half-width of the map in meters
    #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
    radius: f64,

    /// Bounding box strategy
    #[arg(long, value_enum, default_value = "utm")]
    bounds: Bounds,

    /// Output directory for snapshots and images
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Overpass API interpreter URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Attempts per category before giving up
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 5)]
    backoff: u64,

    /// Comma separated categories to fetch, in order
    #[arg(long, value_delimiter = ',')]
    categories: Option<Vec<String>>,

    /// Raster height in pixels
    #[arg(long, default_value_t = 2400)]
    size: u32,

    /// Map title
    #[arg(long)]
    title: Option<String>,

    /// Do not keep raw responses
    #[arg(long)]
    no_raw: bool,

    /// Do not write map.svg
    #[arg(long)]
    no_svg: bool,

    /// Export clipped features as GeoJSON
    #[arg(long)]
    geojson: bool,

    /// Read raw responses from this directory instead of the network
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Debug level logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> MapConfig {
        let defaults = MapConfig::default();
        let center = GeoPoint::new(self.lat, self.lon);
        MapConfig {
            center,
            radius_m: self.radius,
            bounds_mode: self.bounds.into(),
            output_dir: self.output,
            endpoint: self.endpoint,
            timeout: Duration::from_secs(self.timeout),
            retry: RetryPolicy {
                max_attempts: self.attempts,
                backoff: Duration::from_secs(self.backoff),
            },
            categories: self.categories.unwrap_or(defaults.categories),
            render: RenderOptions {
                height_px: self.size,
                title: self
                    .title
                    .unwrap_or_else(|| format!("Map around {center}")),
                write_svg: !self.no_svg,
                ..defaults.render
            },
            save_raw: !self.no_raw,
            write_geojson: self.geojson,
            replay_dir: self.replay,
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = args.into_config();

    let service: Box<dyn QueryService> = match &config.replay_dir {
        Some(dir) => {
            info!("Replaying responses from {}", dir.display());
            Box::new(ReplayService::new(dir))
        }
        None => Box::new(OverpassClient::new(&config.endpoint, config.timeout)),
    };

    match run(&config, service.as_ref()) {
        Ok(report) => {
            for category in &report.categories {
                info!(
                    "{}: {} elements, {} features after clipping",
                    category.category, category.elements, category.clipped
                );
            }
            let empty: Vec<Category> = report
                .categories
                .iter()
                .filter(|c| !c.fetched)
                .map(|c| c.category)
                .collect();
            if !empty.is_empty() {
                info!("Drawn without data: {empty:?}");
            }
            for file in &report.render.files {
                info!("Wrote {}", file.display());
            }
        }
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
