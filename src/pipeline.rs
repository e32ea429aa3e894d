//! One complete snapshot run: bounds, per-category fetch/convert/clip, render.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::bbox::bounding_box;
use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::features::{clip_collection, convert_response, write_geojson};
use crate::overpass::{Fetcher, QueryService, build_query};
use crate::render::{RenderSummary, Renderer};
use crate::types::{BoundingBox, Category, FeatureCollection};

/// Per-category counts for one run.
#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub category: Category,
    pub attempts: u32,
    /// False when every attempt failed and the category was drawn empty.
    pub fetched: bool,
    pub elements: usize,
    pub converted: usize,
    pub clipped: usize,
    pub geojson: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub bbox: BoundingBox,
    pub categories: Vec<CategoryReport>,
    /// Requested names that matched no category.
    pub skipped: Vec<String>,
    pub render: RenderSummary,
}

impl RunReport {
    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Runs the whole snapshot against `service`.
///
/// Fetch failures degrade to empty categories. Errors computing the box or
/// writing output end the run.
pub fn run(config: &MapConfig, service: &dyn QueryService) -> Result<RunReport> {
    fs::create_dir_all(&config.output_dir).map_err(|e| MapError::io(&config.output_dir, e))?;

    let bbox = bounding_box(config.center, config.radius_m, config.bounds_mode)?;
    info!(
        "Bounding box around {} ({} m, {:?}): {bbox}",
        config.center, config.radius_m, config.bounds_mode
    );

    let mut fetcher = Fetcher::new(service, config.retry);
    if let Some(dir) = config.snapshot_dir() {
        fetcher = fetcher.with_snapshots(dir);
    }

    let mut collections = Vec::new();
    let mut categories = Vec::new();
    let mut skipped = Vec::new();

    for name in &config.categories {
        let Some(category) = Category::from_name(name) else {
            warn!("Unknown category {name:?}, skipping");
            skipped.push(name.clone());
            continue;
        };
        let Some(query) = build_query(category, &bbox) else {
            warn!("No query template for {category}, skipping");
            skipped.push(name.clone());
            continue;
        };

        let outcome = fetcher.fetch(category, &query);
        let elements = outcome
            .response
            .as_ref()
            .map_or(0, |response| response.elements.len());
        if outcome.failed() {
            warn!("No data for {category}");
        }

        let converted = convert_response(outcome.response.as_ref(), category);
        info!("Converted {} of {elements} {category} elements", converted.len());
        let clipped = clip_collection(&converted, &bbox);

        let geojson = if config.write_geojson {
            let path = write_geojson(&config.output_dir, &clipped)?;
            info!("Exported {category} to {}", path.display());
            Some(path)
        } else {
            None
        };

        categories.push(CategoryReport {
            category,
            attempts: outcome.attempts,
            fetched: !outcome.failed(),
            elements,
            converted: converted.len(),
            clipped: clipped.len(),
            geojson,
        });
        collections.push(clipped);
    }

    info!(
        "Collected {} features in {} categories",
        collections.iter().map(FeatureCollection::len).sum::<usize>(),
        collections.len()
    );

    let render = Renderer::new(config.render.clone()).render(
        &collections,
        &bbox,
        &config.output_dir,
    )?;

    Ok(RunReport {
        bbox,
        categories,
        skipped,
        render,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::overpass::{QueryRequest, RetryPolicy};
    use crate::render::RenderOptions;
    use std::cell::RefCell;
    use std::time::Duration;

    /// Serves a fixed body per category and records the order of requests.
    struct CannedService {
        seen: RefCell<Vec<Category>>,
    }

    impl QueryService for CannedService {
        fn execute(&self, request: &QueryRequest<'_>) -> std::result::Result<String, FetchError> {
            self.seen.borrow_mut().push(request.category);
            match request.category {
                Category::Roads => Ok(r#"{"elements": [
                    {"type": "way", "id": 1, "tags": {"highway": "primary"},
                     "geometry": [{"lat": 56.855, "lon": 24.300}, {"lat": 56.855, "lon": 24.310}]},
                    {"type": "way", "id": 2, "tags": {"highway": "service"},
                     "geometry": [{"lat": 57.5, "lon": 25.0}, {"lat": 57.6, "lon": 25.1}]}
                ]}"#
                .to_string()),
                Category::Lakes => Err(FetchError::Transport("timed out".to_string())),
                _ => Ok(r#"{"elements": []}"#.to_string()),
            }
        }
    }

    fn config(dir: &std::path::Path, categories: &[&str]) -> MapConfig {
        MapConfig {
            output_dir: dir.to_path_buf(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            retry: RetryPolicy {
                max_attempts: 2,
                backoff: Duration::ZERO,
            },
            render: RenderOptions {
                height_px: 200,
                ..Default::default()
            },
            write_geojson: true,
            ..Default::default()
        }
    }

    #[test]
    fn run_fetches_clips_and_renders() {
        let dir = tempfile::tempdir().unwrap();
        let service = CannedService {
            seen: RefCell::new(Vec::new()),
        };
        let config = config(dir.path(), &["roads", "lakes", "volcanoes", "water"]);

        let report = run(&config, &service).unwrap();

        assert_eq!(report.skipped, vec!["volcanoes".to_string()]);
        assert_eq!(
            *service.seen.borrow(),
            vec![Category::Roads, Category::Lakes, Category::Lakes, Category::Water]
        );

        let roads = report.category(Category::Roads).unwrap();
        assert_eq!((roads.elements, roads.converted, roads.clipped), (2, 2, 1));
        let lakes = report.category(Category::Lakes).unwrap();
        assert!(!lakes.fetched);
        assert_eq!(lakes.attempts, 2);

        assert!(report.render.layer("primary road").is_some());
        assert!(dir.path().join("map.png").exists());
        assert!(dir.path().join("roads.json").exists());
        assert!(dir.path().join("roads.geojson").exists());
        assert!(!dir.path().join("lakes.json").exists());
    }

    #[test]
    fn invalid_center_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let service = CannedService {
            seen: RefCell::new(Vec::new()),
        };
        let mut config = config(dir.path(), &["roads"]);
        config.center = crate::types::GeoPoint::new(f64::NAN, 0.0);
        assert!(matches!(run(&config, &service), Err(MapError::Bounds(_))));
        assert!(service.seen.borrow().is_empty());
    }
}
