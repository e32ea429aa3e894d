use std::fs;
use std::path::{Path, PathBuf};

use geojson::{Geometry, JsonObject, JsonValue};

use crate::error::MapError;
use crate::types::{Feature, FeatureCollection, Shape};

/// Location of the GeoJSON export for a collection under `dir`.
pub fn geojson_path(dir: &Path, collection: &FeatureCollection) -> PathBuf {
    dir.join(format!("{}.geojson", collection.category.name()))
}

/// Converts a collection into a GeoJSON feature collection with the tags as
/// properties.
pub fn to_geojson(collection: &FeatureCollection) -> geojson::FeatureCollection {
    geojson::FeatureCollection {
        bbox: None,
        features: collection.features.iter().map(to_geojson_feature).collect(),
        foreign_members: None,
    }
}

fn to_geojson_feature(feature: &Feature) -> geojson::Feature {
    let value = match &feature.shape {
        Shape::Line(line) => geojson::Value::from(line),
        Shape::Polygon(polygon) => geojson::Value::from(polygon),
    };

    let mut properties: JsonObject = feature
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
        .collect();
    if let Some(id) = feature.id {
        properties.insert("osm_id".to_string(), JsonValue::from(id));
    }

    geojson::Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Writes `<dir>/<category>.geojson` and returns its path.
pub fn write_geojson(dir: &Path, collection: &FeatureCollection) -> Result<PathBuf, MapError> {
    let path = geojson_path(dir, collection);
    fs::write(&path, to_geojson(collection).to_string()).map_err(|e| MapError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attributes, Category};
    use geo::line_string;

    #[test]
    fn tags_become_properties() {
        let mut attributes = Attributes::new();
        attributes.insert("highway".to_string(), "residential".to_string());
        let collection = FeatureCollection {
            category: Category::Roads,
            features: vec![Feature {
                id: Some(42),
                shape: Shape::Line(line_string![(x: 24.3, y: 56.85), (x: 24.31, y: 56.86)]),
                attributes,
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = write_geojson(dir.path(), &collection).unwrap();
        assert_eq!(path.file_name().unwrap(), "roads.geojson");

        let parsed: geojson::GeoJson = fs::read_to_string(&path).unwrap().parse().unwrap();
        let geojson::GeoJson::FeatureCollection(fc) = parsed else {
            panic!("expected a feature collection");
        };
        assert_eq!(fc.features.len(), 1);
        let feature = &fc.features[0];
        assert_eq!(
            feature.property("highway").and_then(|v| v.as_str()),
            Some("residential")
        );
        assert_eq!(feature.property("osm_id").and_then(|v| v.as_i64()), Some(42));
        assert!(matches!(
            feature.geometry.as_ref().map(|g| &g.value),
            Some(geojson::Value::LineString(_))
        ));
    }
}
