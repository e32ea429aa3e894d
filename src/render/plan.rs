//! Drawing plan: which features are drawn, in what order, with which style.

use super::style::{STYLE_SPEC, Style, StyleSpec};
use crate::types::{BoundingBox, Category, Feature, FeatureCollection, ShapeKind};

/// Features drawn together with one style and legend label.
#[derive(Debug, Clone)]
pub struct Layer<'a> {
    pub category: Category,
    pub label: String,
    pub style: Style,
    pub features: Vec<&'a Feature>,
}

impl Layer<'_> {
    pub fn kind(&self) -> ShapeKind {
        self.category.shape_kind()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub style: Style,
    pub kind: ShapeKind,
}

/// Orders the collections back to front and splits roads by `highway` value.
/// Empty collections produce no layer.
pub fn plan_layers<'a>(collections: &'a [FeatureCollection], styles: &StyleSpec) -> Vec<Layer<'a>> {
    let mut ordered: Vec<&FeatureCollection> =
        collections.iter().filter(|c| !c.is_empty()).collect();
    ordered.sort_by_key(|c| c.category.draw_rank());

    let mut layers = Vec::new();
    for collection in ordered {
        if collection.category == Category::Roads {
            layers.extend(road_layers(collection, styles));
            continue;
        }
        let Some(category_style) = styles.category(collection.category) else {
            continue;
        };
        layers.push(Layer {
            category: collection.category,
            label: category_style.label.to_string(),
            style: category_style.style,
            features: collection.features.iter().collect(),
        });
    }
    layers
}

/// [`plan_layers`] with the built-in style table.
pub fn default_plan(collections: &[FeatureCollection]) -> Vec<Layer<'_>> {
    plan_layers(collections, &STYLE_SPEC)
}

fn road_layers<'a>(collection: &'a FeatureCollection, styles: &StyleSpec) -> Vec<Layer<'a>> {
    // Grouped by subtype in order of first appearance.
    let mut groups: Vec<(Option<&str>, Vec<&Feature>)> = Vec::new();
    for feature in &collection.features {
        let subtype = feature.tag("highway");
        match groups.iter_mut().find(|(s, _)| *s == subtype) {
            Some((_, features)) => features.push(feature),
            None => groups.push((subtype, vec![feature])),
        }
    }

    groups
        .into_iter()
        .map(|(subtype, features)| {
            let (label, style) = styles.road(subtype);
            Layer {
                category: Category::Roads,
                label,
                style,
                features,
            }
        })
        .collect()
}

/// One legend entry per distinct label, first appearance wins.
pub fn legend_entries(layers: &[Layer<'_>]) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = Vec::new();
    for layer in layers {
        if entries.iter().any(|e| e.label == layer.label) {
            continue;
        }
        entries.push(LegendEntry {
            label: layer.label.clone(),
            style: layer.style,
            kind: layer.kind(),
        });
    }
    entries
}

/// Maps geographic coordinates onto an image whose extent is exactly the
/// bounding box. The width follows the box's ground aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub bbox: BoundingBox,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(bbox: BoundingBox, height: u32) -> Self {
        let height = height.max(1);
        let aspect = bbox.width_km() / bbox.height_km();
        let width = (height as f64 * aspect).round().clamp(1.0, u32::MAX as f64) as u32;
        Self {
            bbox,
            width,
            height,
        }
    }

    pub fn to_px(&self, coord: geo::Coord<f64>) -> (f32, f32) {
        let x = (coord.x - self.bbox.west()) / self.bbox.width_deg() * self.width as f64;
        let y = (self.bbox.north() - coord.y) / self.bbox.height_deg() * self.height as f64;
        (x as f32, y as f32)
    }

    /// Pixels per typographic point, treating the image as ten inches tall.
    pub fn px_per_pt(&self) -> f32 {
        self.height as f32 / 720.0
    }
}
