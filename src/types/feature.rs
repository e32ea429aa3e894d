use std::collections::BTreeMap;

use geo::{BoundingRect, LineString, Polygon};

use super::{Category, ShapeKind};

/// Tag mapping carried through from the source element.
pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line(LineString<f64>),
    Polygon(Polygon<f64>),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Line(_) => ShapeKind::Line,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    pub fn bounding_rect(&self) -> Option<geo::Rect<f64>> {
        match self {
            Shape::Line(line) => line.bounding_rect(),
            Shape::Polygon(polygon) => polygon.bounding_rect(),
        }
    }

    /// Every coordinate of the shape, interior rings included.
    pub fn coords(&self) -> Vec<geo::Coord<f64>> {
        match self {
            Shape::Line(line) => line.0.clone(),
            Shape::Polygon(polygon) => polygon
                .exterior()
                .0
                .iter()
                .chain(polygon.interiors().iter().flat_map(|ring| ring.0.iter()))
                .copied()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<i64>,
    pub shape: Shape,
    pub attributes: Attributes,
}

impl Feature {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Features of one category, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub category: Category,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
