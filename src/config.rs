use std::path::PathBuf;
use std::time::Duration;

use crate::bbox::BoundsMode;
use crate::overpass::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, RetryPolicy};
use crate::render::RenderOptions;
use crate::types::{Category, GeoPoint};

/// Salaspils, Latvia.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(56.855, 24.305);
pub const DEFAULT_RADIUS_M: f64 = 500.0;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Everything one run needs. `Default` reproduces the stock snapshot.
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub bounds_mode: BoundsMode,
    pub output_dir: PathBuf,
    pub endpoint: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Category names in fetch order. Unknown names are skipped with a warning.
    pub categories: Vec<String>,
    pub render: RenderOptions,
    /// Keep each raw response as `<output>/<category>.json`.
    pub save_raw: bool,
    pub write_geojson: bool,
    /// Read responses from this directory instead of the network.
    pub replay_dir: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            radius_m: DEFAULT_RADIUS_M,
            bounds_mode: BoundsMode::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            categories: Category::ALL.iter().map(|c| c.name().to_string()).collect(),
            render: RenderOptions::default(),
            save_raw: true,
            write_geojson: false,
            replay_dir: None,
        }
    }
}

impl MapConfig {
    /// Raw snapshots are never rewritten while replaying them.
    pub fn snapshot_dir(&self) -> Option<&PathBuf> {
        (self.save_raw && self.replay_dir.is_none()).then_some(&self.output_dir)
    }
}
