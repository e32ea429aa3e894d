use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::GeoPoint;

/// Overpass `out geom` response.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverpassResponse {
    pub version: Option<f64>,
    pub generator: Option<String>,
    pub osm3s: Option<Osm3s>,
    /// Set by the server when a query ran into a runtime error or timeout.
    pub remark: Option<String>,
    /// A response without an `elements` key is treated as empty. Elements
    /// that do not fit [`RawElement`] are dropped one by one.
    #[serde(default, deserialize_with = "lenient_elements")]
    pub elements: Vec<RawElement>,
}

fn lenient_elements<'de, D>(deserializer: D) -> Result<Vec<RawElement>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = values.len();
    let elements: Vec<RawElement> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if elements.len() < total {
        debug!("Dropped {} malformed elements", total - elements.len());
    }
    Ok(elements)
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Osm3s {
    #[serde(rename = "timestamp_osm_base")]
    pub timestamp_osm_base: Option<String>,
    #[serde(rename = "timestamp_areas_base")]
    pub timestamp_areas_base: Option<String>,
    pub copyright: Option<String>,
}

/// One element of an `out geom` response. Every field is optional; an element
/// whose fields have the wrong JSON types is skipped by the response parser.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type", default)]
    pub type_field: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub geometry: Option<Vec<Option<RawNode>>>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl RawNode {
    pub fn to_point(&self) -> Option<GeoPoint> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)).filter(|p| p.is_finite()),
            _ => None,
        }
    }
}

impl RawElement {
    pub fn is_way(&self) -> bool {
        self.type_field == "way"
    }

    /// The element's points, or `None` if the geometry is missing or any
    /// node lacks usable coordinates.
    pub fn points(&self) -> Option<Vec<GeoPoint>> {
        let geometry = self.geometry.as_ref()?;
        geometry
            .iter()
            .map(|node| node.as_ref().and_then(RawNode::to_point))
            .collect()
    }
}
