use geo::{LineString, Polygon};
use tracing::debug;

use crate::types::{
    Category, Feature, FeatureCollection, GeoPoint, OverpassResponse, RawElement, Shape, ShapeKind,
};

/// Converts a fetch result into features of `category`'s shape kind.
///
/// Elements that are not ways, have no usable geometry or fewer than two
/// points are skipped. An absent response yields an empty collection.
pub fn convert_response(response: Option<&OverpassResponse>, category: Category) -> FeatureCollection {
    convert_elements(response, category, category.shape_kind())
}

/// Same as [`convert_response`] with an explicit shape kind.
pub fn convert_elements(
    response: Option<&OverpassResponse>,
    category: Category,
    kind: ShapeKind,
) -> FeatureCollection {
    let Some(response) = response else {
        return FeatureCollection::empty(category);
    };

    let features: Vec<Feature> = response
        .elements
        .iter()
        .filter_map(|element| convert_element(element, kind))
        .collect();

    let skipped = response.elements.len() - features.len();
    if skipped > 0 {
        debug!("Skipped {skipped} of {} {category} elements", response.elements.len());
    }

    FeatureCollection { category, features }
}

/// Builds one feature from a way element, or `None` if it is unusable.
pub fn convert_element(element: &RawElement, kind: ShapeKind) -> Option<Feature> {
    if !element.is_way() {
        return None;
    }
    let points = element.points()?;
    if points.len() < 2 {
        return None;
    }

    Some(Feature {
        id: element.id,
        shape: build_shape(&points, kind),
        attributes: element.tags.clone().unwrap_or_default(),
    })
}

fn build_shape(points: &[GeoPoint], kind: ShapeKind) -> Shape {
    let mut coords: Vec<geo::Coord<f64>> = points.iter().map(GeoPoint::to_coord).collect();

    if kind == ShapeKind::Polygon && coords.len() >= 3 {
        // Close the ring if needed
        if coords.first() != coords.last() {
            coords.push(coords[0]);
        }
        Shape::Polygon(Polygon::new(LineString(coords), vec![]))
    } else {
        Shape::Line(LineString(coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> OverpassResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn absent_response_is_empty() {
        let collection = convert_response(None, Category::Roads);
        assert!(collection.is_empty());
        assert_eq!(collection.category, Category::Roads);
    }

    #[test]
    fn single_point_way_is_skipped() {
        let data = response(r#"{"elements": [{"type": "way", "geometry": [{"lat": 1.0, "lon": 2.0}]}]}"#);
        assert!(convert_response(Some(&data), Category::Roads).is_empty());
    }

    #[test]
    fn three_points_close_into_a_polygon() {
        let data = response(
            r#"{"elements": [{"type": "way", "id": 3, "tags": {"building": "yes"},
                "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 1.0}, {"lat": 1.0, "lon": 1.0}]}]}"#,
        );
        let collection = convert_response(Some(&data), Category::Buildings);
        assert_eq!(collection.len(), 1);

        let feature = &collection.features[0];
        assert_eq!(feature.id, Some(3));
        assert_eq!(feature.tag("building"), Some("yes"));
        let Shape::Polygon(polygon) = &feature.shape else {
            panic!("expected a polygon, got {:?}", feature.shape);
        };
        let ring = &polygon.exterior().0;
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn already_closed_ring_is_not_closed_twice() {
        let data = response(
            r#"{"elements": [{"type": "way", "geometry": [
                {"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 1.0},
                {"lat": 1.0, "lon": 1.0}, {"lat": 0.0, "lon": 0.0}]}]}"#,
        );
        let collection = convert_response(Some(&data), Category::Forests);
        let Shape::Polygon(polygon) = &collection.features[0].shape else {
            panic!("expected a polygon");
        };
        assert_eq!(polygon.exterior().0.len(), 4);
    }

    #[test]
    fn two_point_polygon_request_falls_back_to_a_line() {
        let data = response(
            r#"{"elements": [{"type": "way", "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 1.0, "lon": 1.0}]}]}"#,
        );
        let collection = convert_response(Some(&data), Category::Lakes);
        assert_eq!(collection.features[0].shape.kind(), ShapeKind::Line);
    }

    #[test]
    fn line_coordinates_are_lon_lat() {
        let data = response(
            r#"{"elements": [{"type": "way", "tags": {"highway": "motorway"},
                "geometry": [{"lat": 56.85, "lon": 24.30}, {"lat": 56.86, "lon": 24.31}]}]}"#,
        );
        let collection = convert_response(Some(&data), Category::Roads);
        let Shape::Line(line) = &collection.features[0].shape else {
            panic!("expected a line");
        };
        assert_eq!(line.0[0], geo::Coord { x: 24.30, y: 56.85 });
    }

    #[test]
    fn malformed_elements_are_dropped_silently() {
        let data = response(
            r#"{"elements": [
                {"type": "node", "lat": 1.0, "lon": 1.0},
                {"type": "relation", "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 1.0, "lon": 1.0}]},
                {"type": "way"},
                {"type": "way", "geometry": []},
                {"type": "way", "geometry": [{"lat": 0.0}, {"lat": 1.0, "lon": 1.0}]},
                {"type": "way", "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 1.0, "lon": 1.0}]}
            ]}"#,
        );
        let collection = convert_response(Some(&data), Category::Roads);
        assert_eq!(collection.len(), 1);
        assert!(collection.features[0].attributes.is_empty());
    }

    #[test]
    fn mistyped_element_does_not_cost_its_neighbours() {
        let data = response(
            r#"{"elements": [
                {"type": "way", "id": "x", "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 1.0, "lon": 1.0}]},
                {"type": "way", "id": 9, "tags": {"highway": "service"},
                 "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 1.0, "lon": 1.0}]}
            ]}"#,
        );
        let collection = convert_response(Some(&data), Category::Roads);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features[0].id, Some(9));
        assert_eq!(collection.features[0].tag("highway"), Some("service"));
    }
}
