//! Vector copy of the map with text: title, axis labels and legend.

use std::fmt::Write as _;

use chrono::Utc;
use geo::LineString;

use super::canvas::scale_bar_endpoints;
use super::plan::{Layer, LegendEntry, Viewport};
use super::style::Style;
use crate::types::{Shape, ShapeKind};

const FONT_PT: f32 = 11.0;

pub struct SvgDocument {
    viewport: Viewport,
    body: String,
}

/// XML id for a layer label: lowercase ASCII words joined by `-`.
fn layer_id(label: &str) -> String {
    let words: Vec<String> = label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    format!("layer-{}", words.join("-"))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn stroke_attrs(style: &Style, width: f32) -> String {
    let mut attrs = format!(
        r#"fill="none" stroke="{}" stroke-opacity="{:.2}" stroke-width="{:.2}" stroke-linecap="round" stroke-linejoin="round""#,
        style.color.hex(),
        style.alpha,
        width
    );
    if style.dashed {
        let _ = write!(
            attrs,
            r#" stroke-dasharray="{:.2} {:.2}""#,
            3.7 * width,
            1.6 * width
        );
    }
    attrs
}

fn fill_attrs(style: &Style, pt: f32) -> String {
    let mut attrs = format!(
        r#"fill="{}" fill-opacity="{:.2}" fill-rule="evenodd""#,
        style.color.hex(),
        style.alpha
    );
    match style.edge {
        Some(edge) => {
            let _ = write!(
                attrs,
                r#" stroke="{}" stroke-width="{:.2}""#,
                edge.color.hex(),
                edge.width * pt
            );
        }
        None => attrs.push_str(r#" stroke="none""#),
    }
    attrs
}

impl SvgDocument {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            body: String::new(),
        }
    }

    fn ring_data(&self, data: &mut String, ring: &LineString<f64>, close: bool) {
        for (i, coord) in ring.0.iter().enumerate() {
            let (x, y) = self.viewport.to_px(*coord);
            let op = if i == 0 { 'M' } else { 'L' };
            let _ = write!(data, "{op}{x:.2},{y:.2} ");
        }
        if close {
            data.push('Z');
        }
    }

    fn path_data(&self, shape: &Shape) -> String {
        let mut data = String::new();
        match shape {
            Shape::Line(line) => self.ring_data(&mut data, line, false),
            Shape::Polygon(polygon) => {
                self.ring_data(&mut data, polygon.exterior(), true);
                for interior in polygon.interiors() {
                    self.ring_data(&mut data, interior, true);
                }
            }
        }
        data.trim_end().to_string()
    }

    pub fn add_layer(&mut self, layer: &Layer<'_>) {
        let pt = self.viewport.px_per_pt();
        let attrs = match layer.kind() {
            ShapeKind::Line => stroke_attrs(&layer.style, layer.style.line_width * pt),
            ShapeKind::Polygon => fill_attrs(&layer.style, pt),
        };
        let label = escape(&layer.label);
        let _ = writeln!(
            self.body,
            r#"<g id="{}" data-label="{label}" {attrs}>"#,
            layer_id(&layer.label)
        );
        let _ = writeln!(self.body, "  <title>{label}</title>");
        for feature in &layer.features {
            let data = self.path_data(&feature.shape);
            if data.is_empty() {
                continue;
            }
            // Ways too short for a ring sit in polygon layers as lines.
            let open = matches!(feature.shape, Shape::Line(_)) && layer.kind() == ShapeKind::Polygon;
            if open {
                let _ = writeln!(
                    self.body,
                    r#"  <path d="{data}" fill="none" stroke="{}"/>"#,
                    layer.style.color.hex()
                );
            } else {
                let _ = writeln!(self.body, r#"  <path d="{data}"/>"#);
            }
        }
        self.body.push_str("</g>\n");
    }

    pub fn add_legend(&mut self, entries: &[LegendEntry]) {
        if entries.is_empty() {
            return;
        }
        let pt = self.viewport.px_per_pt();
        let margin = 12.0 * pt;
        let row = 16.0 * pt;
        let swatch = 24.0 * pt;
        let font = FONT_PT * pt;
        let longest = entries.iter().map(|e| e.label.len()).max().unwrap_or(0) as f32;
        let frame_w = swatch + 3.0 * margin + longest * font * 0.6;
        let frame_h = row * entries.len() as f32 + margin;

        let _ = writeln!(
            self.body,
            r#"<g id="legend"><rect x="{margin:.2}" y="{margin:.2}" width="{frame_w:.2}" height="{frame_h:.2}" fill="white" fill-opacity="0.8" stroke="lightgray"/>"#
        );
        for (i, entry) in entries.iter().enumerate() {
            let x = 2.0 * margin;
            let cy = margin + margin / 2.0 + row * i as f32 + row / 2.0;
            match entry.kind {
                ShapeKind::Line => {
                    let attrs = stroke_attrs(&entry.style, entry.style.line_width * pt);
                    let _ = writeln!(
                        self.body,
                        r#"  <path d="M{x:.2},{cy:.2} L{:.2},{cy:.2}" {attrs}/>"#,
                        x + swatch
                    );
                }
                ShapeKind::Polygon => {
                    let attrs = fill_attrs(&entry.style, pt);
                    let _ = writeln!(
                        self.body,
                        r#"  <rect x="{x:.2}" y="{:.2}" width="{swatch:.2}" height="{:.2}" {attrs}/>"#,
                        cy - row / 3.0,
                        row * 2.0 / 3.0
                    );
                }
            }
            let _ = writeln!(
                self.body,
                r#"  <text x="{:.2}" y="{:.2}" font-size="{font:.2}">{}</text>"#,
                x + swatch + margin,
                cy + font / 3.0,
                escape(&entry.label)
            );
        }
        self.body.push_str("</g>\n");
    }

    pub fn add_scale_bar(&mut self, length_km: f64) {
        let (start, end) = scale_bar_endpoints(&self.viewport, length_km);
        let (x0, y0) = self.viewport.to_px(start.to_coord());
        let (x1, _) = self.viewport.to_px(end.to_coord());
        let pt = self.viewport.px_per_pt();
        let _ = writeln!(
            self.body,
            r#"<g id="scale-bar"><path d="M{x0:.2},{y0:.2} L{x1:.2},{y0:.2}" stroke="black" stroke-width="{:.2}"/><text x="{:.2}" y="{:.2}" font-size="{:.2}" text-anchor="middle">{length_km} km</text></g>"#,
            3.0 * pt,
            (x0 + x1) / 2.0,
            y0 - 6.0 * pt,
            FONT_PT * pt
        );
    }

    pub fn add_north_arrow(&mut self) {
        let (w, h) = (self.viewport.width as f32, self.viewport.height as f32);
        let pt = self.viewport.px_per_pt();
        let x = 0.95 * w;
        let tip = 0.05 * h;
        let base = 0.15 * h;
        let head = 15.0 * pt;
        let _ = writeln!(
            self.body,
            r#"<g id="north-arrow"><path d="M{x:.2},{base:.2} L{x:.2},{:.2}" stroke="black" stroke-width="{:.2}"/><path d="M{x:.2},{tip:.2} L{:.2},{:.2} L{:.2},{:.2} Z" fill="black"/><text x="{x:.2}" y="{:.2}" font-size="{:.2}" text-anchor="middle">N</text></g>"#,
            tip + head,
            5.0 * pt,
            x - head / 2.0,
            tip + head,
            x + head / 2.0,
            tip + head,
            base + 20.0 * pt,
            2.0 * FONT_PT * pt
        );
    }

    /// Complete document. The map occupies the inner area; title and axis
    /// labels sit in the surrounding margin.
    pub fn finish(&self, title: &str) -> String {
        let (w, h) = (self.viewport.width as f32, self.viewport.height as f32);
        let pt = self.viewport.px_per_pt();
        let pad = 60.0 * pt;
        let font = FONT_PT * pt;
        let bbox = &self.viewport.bbox;

        let mut doc = String::new();
        let _ = writeln!(
            doc,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="{:.2} {:.2} {:.2} {:.2}">"#,
            w + 2.0 * pad,
            h + 2.0 * pad,
            -pad,
            -pad,
            w + 2.0 * pad,
            h + 2.0 * pad
        );
        let _ = writeln!(doc, "<title>{}</title>", escape(title));
        let _ = writeln!(
            doc,
            "<desc>{bbox}, generated {}</desc>",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            doc,
            r#"<rect x="0" y="0" width="{w:.2}" height="{h:.2}" fill="white" stroke="black"/>"#
        );
        doc.push_str(&self.body);
        let _ = writeln!(
            doc,
            r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}" text-anchor="middle">{}</text>"#,
            w / 2.0,
            -pad / 2.0,
            1.4 * font,
            escape(title)
        );
        let _ = writeln!(
            doc,
            r#"<text x="{:.2}" y="{:.2}" font-size="{font:.2}" text-anchor="middle">Longitude</text>"#,
            w / 2.0,
            h + pad / 2.0
        );
        let _ = writeln!(
            doc,
            r#"<text x="{:.2}" y="{:.2}" font-size="{font:.2}" text-anchor="middle" transform="rotate(-90 {:.2} {:.2})">Latitude</text>"#,
            -pad / 2.0,
            h / 2.0,
            -pad / 2.0,
            h / 2.0
        );
        doc.push_str("</svg>\n");
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::plan::{default_plan, legend_entries};
    use crate::types::{Attributes, BoundingBox, Category, Feature, FeatureCollection};
    use geo::line_string;

    #[test]
    fn document_carries_layers_and_labels() {
        let mut attributes = Attributes::new();
        attributes.insert("highway".to_string(), "track".to_string());
        let collections = vec![FeatureCollection {
            category: Category::Roads,
            features: vec![Feature {
                id: None,
                shape: Shape::Line(line_string![(x: 0.1, y: 0.1), (x: 0.9, y: 0.9)]),
                attributes,
            }],
        }];
        let layers = default_plan(&collections);
        let viewport = Viewport::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap(), 300);

        let mut svg = SvgDocument::new(viewport);
        for layer in &layers {
            svg.add_layer(layer);
        }
        svg.add_legend(&legend_entries(&layers));
        svg.add_scale_bar(0.25);
        svg.add_north_arrow();
        let doc = svg.finish("Roads & <more>");

        assert!(doc.starts_with("<svg"));
        assert!(doc.trim_end().ends_with("</svg>"));
        assert!(doc.contains("Roads &amp; &lt;more&gt;"));
        assert!(doc.contains(r#"<g id="layer-track" data-label="track""#));
        assert!(doc.contains("stroke-dasharray"));
        assert!(doc.contains(">0.25 km</text>"));
        assert!(doc.contains(">N</text>"));
        assert!(doc.contains(">Latitude</text>"));
    }

    #[test]
    fn layer_ids_are_valid_xml_names() {
        assert_eq!(layer_id("motorway road"), "layer-motorway-road");
        assert_eq!(layer_id("Buildings"), "layer-buildings");
        assert_eq!(layer_id("footway; steps"), "layer-footway-steps");
        assert_eq!(layer_id("ceļš"), "layer-ce");
    }
}
