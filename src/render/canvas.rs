//! Raster output on a tiny-skia pixmap.

use geo::LineString;
use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect, Shader, Stroke,
    StrokeDash, Transform,
};

use super::plan::{Layer, LegendEntry, Viewport};
use super::style::{Rgb, Style};
use crate::error::RenderError;
use crate::types::{GeoPoint, Shape, ShapeKind};

/// Figure margins and legend geometry, in points.
const LEGEND_MARGIN_PT: f32 = 12.0;
const LEGEND_ROW_PT: f32 = 16.0;
const LEGEND_SWATCH_PT: f32 = 24.0;

pub struct RasterCanvas {
    pixmap: Pixmap,
    viewport: Viewport,
}

fn paint(color: Rgb, alpha: u8) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(Color::from_rgba8(color.0, color.1, color.2, alpha)),
        anti_alias: true,
        ..Default::default()
    }
}

fn stroke(width: f32, dashed: bool) -> Stroke {
    Stroke {
        width,
        line_cap: if dashed { LineCap::Butt } else { LineCap::Round },
        line_join: LineJoin::Round,
        // Same on/off ratio as a typical plotting "--" line.
        dash: if dashed {
            StrokeDash::new(vec![3.7 * width, 1.6 * width], 0.0)
        } else {
            None
        },
        ..Default::default()
    }
}

impl RasterCanvas {
    pub fn new(viewport: Viewport) -> Result<Self, RenderError> {
        let mut pixmap =
            Pixmap::new(viewport.width, viewport.height).ok_or(RenderError::Canvas {
                width: viewport.width,
                height: viewport.height,
            })?;
        pixmap.fill(Color::WHITE);
        Ok(Self { pixmap, viewport })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn ring(&self, builder: &mut PathBuilder, ring: &LineString<f64>, close: bool) {
        for (i, coord) in ring.0.iter().enumerate() {
            let (x, y) = self.viewport.to_px(*coord);
            if i == 0 {
                builder.move_to(x, y);
            } else {
                builder.line_to(x, y);
            }
        }
        if close {
            builder.close();
        }
    }

    fn shape_path(&self, shape: &Shape) -> Option<Path> {
        let mut builder = PathBuilder::new();
        match shape {
            Shape::Line(line) => self.ring(&mut builder, line, false),
            Shape::Polygon(polygon) => {
                self.ring(&mut builder, polygon.exterior(), true);
                for interior in polygon.interiors() {
                    self.ring(&mut builder, interior, true);
                }
            }
        }
        builder.finish()
    }

    /// Draws every feature of `layer`. Paths are built up front so a bad
    /// feature leaves the canvas untouched.
    pub fn draw_layer(&mut self, layer: &Layer<'_>) -> Result<(), RenderError> {
        let paths = layer
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                self.shape_path(&feature.shape)
                    .map(|path| (path, &feature.shape))
                    .ok_or_else(|| RenderError::InvalidPath {
                        layer: layer.label.clone(),
                        index,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (path, shape) in &paths {
            match shape {
                Shape::Polygon(_) => self.fill(path, &layer.style),
                Shape::Line(_) => self.stroke(path, &layer.style),
            }
        }
        Ok(())
    }

    fn fill(&mut self, path: &Path, style: &Style) {
        let fill_paint = paint(style.color, style.alpha_u8());
        self.pixmap
            .fill_path(path, &fill_paint, FillRule::EvenOdd, Transform::identity(), None);

        if let Some(edge) = style.edge {
            let edge_paint = paint(edge.color, 255);
            let edge_stroke = stroke(edge.width * self.viewport.px_per_pt(), false);
            self.pixmap
                .stroke_path(path, &edge_paint, &edge_stroke, Transform::identity(), None);
        }
    }

    fn stroke(&mut self, path: &Path, style: &Style) {
        let line_paint = paint(style.color, style.alpha_u8());
        let line_stroke = stroke(style.line_width * self.viewport.px_per_pt(), style.dashed);
        self.pixmap
            .stroke_path(path, &line_paint, &line_stroke, Transform::identity(), None);
    }

    /// Legend box in the top-left corner with one swatch per entry.
    pub fn draw_legend(&mut self, entries: &[LegendEntry]) {
        if entries.is_empty() {
            return;
        }
        let pt = self.viewport.px_per_pt();
        let margin = LEGEND_MARGIN_PT * pt;
        let row = LEGEND_ROW_PT * pt;
        let swatch = LEGEND_SWATCH_PT * pt;

        let frame_w = swatch + 2.0 * margin;
        let frame_h = row * entries.len() as f32 + margin;
        if let Some(frame) = Rect::from_xywh(margin, margin, frame_w, frame_h) {
            // framealpha 0.8
            self.pixmap.fill_rect(
                frame,
                &paint(Rgb::WHITE, 204),
                Transform::identity(),
                None,
            );
        }

        for (i, entry) in entries.iter().enumerate() {
            let x = 2.0 * margin;
            let cy = margin + margin / 2.0 + row * i as f32 + row / 2.0;
            let mut builder = PathBuilder::new();
            match entry.kind {
                ShapeKind::Line => {
                    builder.move_to(x, cy);
                    builder.line_to(x + swatch, cy);
                    if let Some(path) = builder.finish() {
                        self.stroke(&path, &entry.style);
                    }
                }
                ShapeKind::Polygon => {
                    if let Some(rect) = Rect::from_xywh(x, cy - row / 3.0, swatch, row * 2.0 / 3.0)
                    {
                        self.fill(&PathBuilder::from_rect(rect), &entry.style);
                    }
                }
            }
        }
    }

    /// Horizontal bar of `length_km` near the bottom-left corner.
    pub fn draw_scale_bar(&mut self, length_km: f64) {
        let (start, end) = scale_bar_endpoints(&self.viewport, length_km);
        let (x0, y0) = self.viewport.to_px(start.to_coord());
        let (x1, y1) = self.viewport.to_px(end.to_coord());

        let mut builder = PathBuilder::new();
        builder.move_to(x0, y0);
        builder.line_to(x1, y1);
        if let Some(path) = builder.finish() {
            let bar = stroke(3.0 * self.viewport.px_per_pt(), false);
            self.pixmap
                .stroke_path(&path, &paint(Rgb::BLACK, 255), &bar, Transform::identity(), None);
        }
    }

    /// Arrow pointing north in the top-right corner.
    pub fn draw_north_arrow(&mut self) {
        let (w, h) = (self.viewport.width as f32, self.viewport.height as f32);
        let pt = self.viewport.px_per_pt();
        let x = 0.95 * w;
        let tip = 0.05 * h;
        let base = 0.15 * h;
        let head = 15.0 * pt;

        let mut shaft = PathBuilder::new();
        shaft.move_to(x, base);
        shaft.line_to(x, tip + head);
        if let Some(path) = shaft.finish() {
            let line = stroke(5.0 * pt, false);
            self.pixmap
                .stroke_path(&path, &paint(Rgb::BLACK, 255), &line, Transform::identity(), None);
        }

        let mut arrow = PathBuilder::new();
        arrow.move_to(x, tip);
        arrow.line_to(x - head / 2.0, tip + head);
        arrow.line_to(x + head / 2.0, tip + head);
        arrow.close();
        if let Some(path) = arrow.finish() {
            self.pixmap.fill_path(
                &path,
                &paint(Rgb::BLACK, 255),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Straight (non-premultiplied) RGBA copy of the canvas.
    pub fn to_image(&self) -> Result<RgbaImage, RenderError> {
        let mut buffer = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for pixel in self.pixmap.pixels() {
            let color = pixel.demultiply();
            buffer.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        rgba_image(self.pixmap.width(), self.pixmap.height(), buffer)
    }
}

fn rgba_image(width: u32, height: u32, buffer: Vec<u8>) -> Result<RgbaImage, RenderError> {
    let len = buffer.len();
    RgbaImage::from_raw(width, height, buffer).ok_or(RenderError::PixelBuffer { width, height, len })
}

/// Start and end of the scale bar: 5% in from the west and south edges,
/// converted with the same degree-per-kilometre rule as the approximate box.
pub fn scale_bar_endpoints(viewport: &Viewport, length_km: f64) -> (GeoPoint, GeoPoint) {
    let bbox = &viewport.bbox;
    let lat = bbox.south() + 0.05 * bbox.height_deg();
    let lon = bbox.west() + 0.05 * bbox.width_deg();
    let length_deg = length_km
        / (crate::bbox::KM_PER_DEGREE * bbox.center().lat.to_radians().cos());
    (GeoPoint::new(lat, lon), GeoPoint::new(lat, lon + length_deg))
}
