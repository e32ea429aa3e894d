use map_snapshot::features::{clip_collection, convert_response};
use map_snapshot::render::{RenderOptions, Renderer, default_plan};
use map_snapshot::types::{BoundingBox, Category, OverpassResponse, ShapeKind};

const ROADS: &str = r#"{
  "version": 0.6,
  "elements": [
    {"type": "way", "id": 101, "tags": {"highway": "motorway"},
     "geometry": [{"lat": 56.852, "lon": 24.300}, {"lat": 56.858, "lon": 24.310}]}
  ]
}"#;

const BUILDINGS: &str = r#"{
  "version": 0.6,
  "elements": [
    {"type": "way", "id": 202, "tags": {"building": "yes"},
     "geometry": [
       {"lat": 56.854, "lon": 24.304}, {"lat": 56.854, "lon": 24.306},
       {"lat": 56.856, "lon": 24.306}, {"lat": 56.856, "lon": 24.304}
     ]}
  ]
}"#;

#[test]
fn synthetic_response_renders_motorway_and_building() {
    let bbox = BoundingBox::new(56.85, 24.29, 56.86, 24.32).unwrap();
    let roads: OverpassResponse = serde_json::from_str(ROADS).unwrap();
    let buildings: OverpassResponse = serde_json::from_str(BUILDINGS).unwrap();

    let collections = vec![
        clip_collection(&convert_response(Some(&roads), Category::Roads), &bbox),
        clip_collection(&convert_response(Some(&buildings), Category::Buildings), &bbox),
    ];
    assert_eq!(collections[0].len(), 1);
    assert_eq!(collections[1].len(), 1);

    let layers = default_plan(&collections);
    let labels: Vec<&str> = layers.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, vec!["motorway road", "Buildings"]);
    assert_eq!(layers[0].kind(), ShapeKind::Line);
    assert_eq!(layers[1].kind(), ShapeKind::Polygon);

    let dir = tempfile::tempdir().unwrap();
    let renderer = Renderer::new(RenderOptions {
        height_px: 300,
        ..Default::default()
    });
    let summary = renderer.render(&collections, &bbox, dir.path()).unwrap();

    let motorway = summary.layer("motorway road").unwrap();
    assert!(motorway.drawn);
    assert_eq!(motorway.features, 1);
    assert_eq!(motorway.style.line_width, 2.5);

    let building = summary.layer("Buildings").unwrap();
    assert!(building.drawn);
    assert!(building.style.edge.is_some());

    for name in ["map.png", "map.jpg", "map.svg"] {
        assert!(dir.path().join(name).exists(), "{name} missing");
    }
    let png = image::open(dir.path().join("map.png")).unwrap();
    assert_eq!(png.height(), 300);
}
