//! WGS84 Universal Transverse Mercator projection.
//!
//! Forward and inverse series after Snyder, "Map Projections: A Working
//! Manual" (USGS Professional Paper 1395), pp. 61-64. Accurate to well under a
//! metre inside a zone, which is all the bounding-box calculator needs.

use crate::types::GeoPoint;

const A: f64 = 6_378_137.0;
const F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// UTM is defined between 80°S and 84°N; we use a symmetric limit.
pub const MAX_LATITUDE: f64 = 84.0;

/// A planar position inside one UTM zone, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmPoint {
    pub easting: f64,
    pub northing: f64,
    pub zone: u8,
    pub north: bool,
}

fn e2() -> f64 {
    F * (2.0 - F)
}

fn ep2() -> f64 {
    e2() / (1.0 - e2())
}

/// Zone number (1-60) containing `lon`.
pub fn zone_for(lon: f64) -> u8 {
    let wrapped = (lon + 180.0).rem_euclid(360.0);
    ((wrapped / 6.0).floor() as u8).min(59) + 1
}

fn central_meridian(zone: u8) -> f64 {
    (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

fn meridian_arc(phi: f64) -> f64 {
    let e2 = e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    A * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Projects a point into the zone that contains it.
pub fn project(point: GeoPoint) -> UtmPoint {
    project_in_zone(point, zone_for(point.lon), point.lat >= 0.0)
}

/// Projects a point into a specific zone and hemisphere, so that nearby
/// points can share one planar frame even across a zone edge.
pub fn project_in_zone(point: GeoPoint, zone: u8, north: bool) -> UtmPoint {
    let e2 = e2();
    let ep2 = ep2();
    let phi = point.lat.to_radians();
    let lambda = point.lon.to_radians();
    let lambda0 = central_meridian(zone).to_radians();

    let n = A / (1.0 - e2 * phi.sin().powi(2)).sqrt();
    let t = phi.tan().powi(2);
    let c = ep2 * phi.cos().powi(2);
    let a = phi.cos() * (lambda - lambda0);
    let m = meridian_arc(phi);

    let easting = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + FALSE_EASTING;

    let mut northing = K0
        * (m + n
            * phi.tan()
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    if !north {
        northing += FALSE_NORTHING_SOUTH;
    }

    UtmPoint {
        easting,
        northing,
        zone,
        north,
    }
}

/// Inverse of [`project_in_zone`].
pub fn unproject(point: UtmPoint) -> GeoPoint {
    let e2 = e2();
    let ep2 = ep2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    let x = point.easting - FALSE_EASTING;
    let y = if point.north {
        point.northing
    } else {
        point.northing - FALSE_NORTHING_SOUTH
    };

    let m = y / K0;
    let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin1 = phi1.sin();
    let cos1 = phi1.cos();
    let tan1 = phi1.tan();
    let c1 = ep2 * cos1 * cos1;
    let t1 = tan1 * tan1;
    let n1 = A / (1.0 - e2 * sin1 * sin1).sqrt();
    let r1 = A * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
    let d = x / (n1 * K0);

    let phi = phi1
        - (n1 * tan1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);

    let lambda = central_meridian(point.zone).to_radians()
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos1;

    GeoPoint::new(phi.to_degrees(), lambda.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zone_numbers() {
        assert_eq!(zone_for(-180.0), 1);
        assert_eq!(zone_for(-177.0), 1);
        assert_eq!(zone_for(0.0), 31);
        assert_eq!(zone_for(24.305), 35);
        assert_eq!(zone_for(179.999), 60);
        assert_eq!(zone_for(180.0), 1);
    }

    #[test]
    fn central_meridian_projects_to_false_easting() {
        let p = project(GeoPoint::new(45.0, 27.0));
        assert_eq!(p.zone, 35);
        assert_abs_diff_eq!(p.easting, 500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn west_of_central_meridian_has_smaller_easting() {
        let p = project(GeoPoint::new(56.949, 24.105));
        assert_eq!(p.zone, 35);
        assert!(p.north);
        assert!(p.easting < 500_000.0);
        assert!(project(GeoPoint::new(-33.9, 151.2)).northing > 5_000_000.0);
    }

    #[test]
    fn one_kilometre_north_is_one_kilometre_on_the_ground() {
        let start = GeoPoint::new(56.855, 24.305);
        let mut p = project(start);
        p.northing += 1_000.0;
        let moved = unproject(p);
        assert_abs_diff_eq!(start.distance_km(&moved), 1.0, epsilon = 0.01);
    }

    #[test]
    fn inverse_recovers_the_input() {
        let points = [
            GeoPoint::new(56.855, 24.305),
            GeoPoint::new(-33.8688, 151.2093),
            GeoPoint::new(0.5, -0.5),
            GeoPoint::new(47.6062, -122.3321),
        ];
        for point in points {
            let back = unproject(project(point));
            assert_abs_diff_eq!(back.lat, point.lat, epsilon = 1e-5);
            assert_abs_diff_eq!(back.lon, point.lon, epsilon = 1e-5);
        }
    }
}
