use geo::{BooleanOps, Intersects, LineString, MapCoordsInPlace, MultiLineString, Polygon};
use tracing::info;

use crate::types::{BoundingBox, Feature, FeatureCollection, Shape};

/// Restricts every feature to `bbox`.
///
/// Features entirely outside are dropped. A feature cut into several pieces
/// becomes several features, each carrying a copy of the attributes, in the
/// order the geometry library returns the pieces.
pub fn clip_collection(collection: &FeatureCollection, bbox: &BoundingBox) -> FeatureCollection {
    let frame = bbox.to_rect().to_polygon();
    let features: Vec<Feature> = collection
        .features
        .iter()
        .flat_map(|feature| clip_feature(feature, bbox, &frame))
        .collect();

    info!(
        "Clipped {}: {} features before, {} after",
        collection.category,
        collection.len(),
        features.len()
    );

    FeatureCollection {
        category: collection.category,
        features,
    }
}

/// Clips a single feature against `bbox`, returning zero or more pieces.
pub fn clip_feature(feature: &Feature, bbox: &BoundingBox, frame: &Polygon<f64>) -> Vec<Feature> {
    let rect = bbox.to_rect();
    let Some(extent) = feature.shape.bounding_rect() else {
        return Vec::new();
    };
    if !rect.intersects(&extent) {
        return Vec::new();
    }

    let fully_inside = extent.min().x >= bbox.west()
        && extent.max().x <= bbox.east()
        && extent.min().y >= bbox.south()
        && extent.max().y <= bbox.north();
    if fully_inside {
        return vec![feature.clone()];
    }

    let pieces: Vec<Shape> = match &feature.shape {
        Shape::Line(line) => clip_line(line, frame)
            .into_iter()
            .map(Shape::Line)
            .collect(),
        Shape::Polygon(polygon) => clip_polygon(polygon, frame)
            .into_iter()
            .map(Shape::Polygon)
            .collect(),
    };

    pieces
        .into_iter()
        .map(|mut shape| {
            snap_into(&mut shape, bbox);
            Feature {
                id: feature.id,
                shape,
                attributes: feature.attributes.clone(),
            }
        })
        .collect()
}

fn clip_line(line: &LineString<f64>, frame: &Polygon<f64>) -> Vec<LineString<f64>> {
    let clipped = frame.clip(&MultiLineString::new(vec![line.clone()]), false);
    clipped
        .0
        .into_iter()
        .filter(|piece| piece.0.len() >= 2)
        .collect()
}

fn clip_polygon(polygon: &Polygon<f64>, frame: &Polygon<f64>) -> Vec<Polygon<f64>> {
    polygon
        .intersection(frame)
        .0
        .into_iter()
        .filter(|piece| piece.exterior().0.len() >= 4)
        .collect()
}

// Intersection points can land a few ulps outside the frame.
fn snap_into(shape: &mut Shape, bbox: &BoundingBox) {
    match shape {
        Shape::Line(line) => line.map_coords_in_place(|c| bbox.clamp_coord(c)),
        Shape::Polygon(polygon) => polygon.map_coords_in_place(|c| bbox.clamp_coord(c)),
    }
}
