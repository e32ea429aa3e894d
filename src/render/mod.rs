//! Map rendering: drawing plan, raster canvas and SVG output.

mod canvas;
mod plan;
mod style;
mod svg;

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{info, warn};

pub use canvas::{RasterCanvas, scale_bar_endpoints};
pub use plan::{Layer, LegendEntry, Viewport, default_plan, legend_entries, plan_layers};
pub use style::{CategoryStyle, Edge, RoadClass, Rgb, STYLE_SPEC, Style, StyleSpec};
pub use svg::SvgDocument;

use crate::error::{MapError, Result};
use crate::types::{BoundingBox, Category, FeatureCollection};

pub const RASTER_FILE: &str = "map.png";
pub const JPEG_FILE: &str = "map.jpg";
pub const SVG_FILE: &str = "map.svg";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Raster height in pixels. The width follows the box's aspect ratio.
    pub height_px: u32,
    pub title: String,
    pub write_svg: bool,
    pub write_jpeg: bool,
    pub scale_bar_km: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            height_px: 2400,
            title: "Map snapshot".to_string(),
            write_svg: true,
            write_jpeg: true,
            scale_bar_km: 0.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerSummary {
    pub category: Category,
    pub label: String,
    pub style: Style,
    pub features: usize,
    /// False when the layer failed to draw and was skipped.
    pub drawn: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RenderSummary {
    pub layers: Vec<LayerSummary>,
    pub legend: Vec<LegendEntry>,
    pub files: Vec<PathBuf>,
}

impl RenderSummary {
    pub fn layer(&self, label: &str) -> Option<&LayerSummary> {
        self.layers.iter().find(|l| l.label == label)
    }
}

pub struct Renderer {
    options: RenderOptions,
    styles: &'static StyleSpec,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            styles: &STYLE_SPEC,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Draws all collections onto a map covering exactly `bbox` and saves it
    /// under `out_dir`. A layer that fails to draw is logged and skipped;
    /// failing to allocate the canvas or write a file ends the render.
    pub fn render(
        &self,
        collections: &[FeatureCollection],
        bbox: &BoundingBox,
        out_dir: &Path,
    ) -> Result<RenderSummary> {
        let viewport = Viewport::new(*bbox, self.options.height_px);
        let layers = plan_layers(collections, self.styles);
        let legend = legend_entries(&layers);
        info!(
            "Rendering {} layers on a {}x{} canvas",
            layers.len(),
            viewport.width,
            viewport.height
        );

        let mut canvas = RasterCanvas::new(viewport)?;
        let mut svg = SvgDocument::new(viewport);
        let mut summary = RenderSummary::default();

        for layer in &layers {
            let drawn = match canvas.draw_layer(layer) {
                Ok(()) => {
                    svg.add_layer(layer);
                    info!("Plotted {} {} features", layer.features.len(), layer.label);
                    true
                }
                Err(e) => {
                    warn!("Skipping layer {}: {e}", layer.label);
                    false
                }
            };
            summary.layers.push(LayerSummary {
                category: layer.category,
                label: layer.label.clone(),
                style: layer.style,
                features: layer.features.len(),
                drawn,
            });
        }
        if layers.is_empty() {
            warn!("No features to draw; saving an empty map");
        }

        canvas.draw_legend(&legend);
        canvas.draw_scale_bar(self.options.scale_bar_km);
        canvas.draw_north_arrow();
        svg.add_legend(&legend);
        svg.add_scale_bar(self.options.scale_bar_km);
        svg.add_north_arrow();

        let image = DynamicImage::ImageRgba8(canvas.to_image()?);
        let png = out_dir.join(RASTER_FILE);
        image.save(&png)?;
        info!("Saved {}", png.display());
        summary.files.push(png);

        if self.options.write_jpeg {
            let jpg = out_dir.join(JPEG_FILE);
            DynamicImage::ImageRgb8(image.to_rgb8()).save(&jpg)?;
            info!("Saved {}", jpg.display());
            summary.files.push(jpg);
        }

        if self.options.write_svg {
            let path = out_dir.join(SVG_FILE);
            fs::write(&path, svg.finish(&self.options.title))
                .map_err(|e| MapError::io(&path, e))?;
            info!("Saved {}", path.display());
            summary.files.push(path);
        }

        summary.legend = legend;
        Ok(summary)
    }
}
