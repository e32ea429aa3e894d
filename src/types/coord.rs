use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Equatorial WGS84 radius used for great-circle distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Haversine distance to `other` in kilometres.
    // https://stackoverflow.com/questions/639695/how-to-convert-latitude-or-longitude-to-meters
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat * PI / 180.0;
        let lat2 = other.lat * PI / 180.0;
        let d_lat = lat2 - lat1;
        let d_lon = (other.lon - self.lon) * PI / 180.0;

        let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
            + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin() * (d_lon / 2.0).sin();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Geometry coordinate with x = longitude, y = latitude.
    pub fn to_coord(&self) -> geo::Coord<f64> {
        geo::Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Rectangular geographic extent. Always satisfies `south < north` and
/// `west < east`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

impl BoundingBox {
    /// Returns `None` unless all bounds are finite and strictly ordered.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Option<Self> {
        let finite = [south, west, north, east].iter().all(|v| v.is_finite());
        if finite && south < north && west < east {
            Some(Self {
                south,
                west,
                north,
                east,
            })
        } else {
            None
        }
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn width_deg(&self) -> f64 {
        self.east - self.west
    }

    pub fn height_deg(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }

    /// East-west extent measured along the box's central parallel.
    pub fn width_km(&self) -> f64 {
        let lat = self.center().lat;
        GeoPoint::new(lat, self.west).distance_km(&GeoPoint::new(lat, self.east))
    }

    pub fn height_km(&self) -> f64 {
        let lon = self.center().lon;
        GeoPoint::new(self.south, lon).distance_km(&GeoPoint::new(self.north, lon))
    }

    /// Bounds in Overpass order: `south,west,north,east`.
    pub fn overpass_bounds(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }

    pub fn to_rect(&self) -> geo::Rect<f64> {
        geo::Rect::new(
            geo::Coord {
                x: self.west,
                y: self.south,
            },
            geo::Coord {
                x: self.east,
                y: self.north,
            },
        )
    }

    /// Pulls a coordinate onto the box when it sits marginally outside.
    pub fn clamp_coord(&self, coord: geo::Coord<f64>) -> geo::Coord<f64> {
        geo::Coord {
            x: coord.x.clamp(self.west, self.east),
            y: coord.y.clamp(self.south, self.north),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S={:.6}, W={:.6}, N={:.6}, E={:.6}",
            self.south, self.west, self.north, self.east
        )
    }
}
