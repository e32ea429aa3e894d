//! Bounding box around a center point.
//!
//! Two strategies are available. [`BoundsMode::Utm`] projects the center into
//! its UTM zone, offsets by the radius on both axes and projects the corners
//! back. [`BoundsMode::Approximate`] skips the projection and converts
//! kilometres to degrees directly with a cosine-of-latitude correction.

pub mod utm;

use tracing::debug;

use crate::error::BoundsError;
use crate::types::{BoundingBox, GeoPoint};

/// Kilometres per degree of latitude used by the approximate mode.
pub const KM_PER_DEGREE: f64 = 111.3;

/// Latitude limit for the approximate mode, where `cos(lat)` stays usable.
pub const APPROX_MAX_LATITUDE: f64 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsMode {
    /// Project through the local UTM zone.
    #[default]
    Utm,
    /// Degree-per-kilometre approximation.
    Approximate,
}

/// Square box of half-width `radius_m` metres around `center`.
pub fn bounding_box(
    center: GeoPoint,
    radius_m: f64,
    mode: BoundsMode,
) -> Result<BoundingBox, BoundsError> {
    match mode {
        BoundsMode::Utm => utm_bounds(center, radius_m),
        BoundsMode::Approximate => approximate_bounds(center, 2.0 * radius_m / 1000.0),
    }
}

fn check_center(center: GeoPoint, limit: f64) -> Result<(), BoundsError> {
    if !center.is_finite() {
        return Err(BoundsError::NonFiniteCenter {
            lat: center.lat,
            lon: center.lon,
        });
    }
    if center.lat.abs() >= limit {
        return Err(BoundsError::UnsupportedLatitude {
            lat: center.lat,
            limit,
        });
    }
    Ok(())
}

fn check_extent(extent: f64) -> Result<(), BoundsError> {
    if extent.is_finite() && extent > 0.0 {
        Ok(())
    } else {
        Err(BoundsError::NonPositiveExtent(extent))
    }
}

/// Projects the center, offsets by ±`radius_m` and takes the rectangle
/// enclosing the four unprojected corners.
pub fn utm_bounds(center: GeoPoint, radius_m: f64) -> Result<BoundingBox, BoundsError> {
    check_center(center, utm::MAX_LATITUDE)?;
    check_extent(radius_m)?;

    let origin = utm::project(center);
    let corners = [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)].map(|(dx, dy)| {
        utm::unproject(utm::UtmPoint {
            easting: origin.easting + dx * radius_m,
            northing: origin.northing + dy * radius_m,
            ..origin
        })
    });

    let south = corners.iter().map(|c| c.lat).fold(f64::INFINITY, f64::min);
    let north = corners.iter().map(|c| c.lat).fold(f64::NEG_INFINITY, f64::max);
    let west = corners.iter().map(|c| c.lon).fold(f64::INFINITY, f64::min);
    let east = corners.iter().map(|c| c.lon).fold(f64::NEG_INFINITY, f64::max);

    debug!(
        zone = origin.zone,
        easting = origin.easting,
        northing = origin.northing,
        "Projected center into UTM"
    );

    checked_box(south, west, north, east)
}

/// Square of side `size_km` centered on `center`, without a projection.
pub fn approximate_bounds(center: GeoPoint, size_km: f64) -> Result<BoundingBox, BoundsError> {
    check_center(center, APPROX_MAX_LATITUDE)?;
    check_extent(size_km)?;

    let delta_lat = size_km / KM_PER_DEGREE;
    let delta_lon = size_km / (KM_PER_DEGREE * center.lat.to_radians().cos());

    checked_box(
        center.lat - delta_lat / 2.0,
        center.lon - delta_lon / 2.0,
        center.lat + delta_lat / 2.0,
        center.lon + delta_lon / 2.0,
    )
}

// Overpass only accepts longitudes in [-180, 180], so a box cannot wrap.
fn checked_box(south: f64, west: f64, north: f64, east: f64) -> Result<BoundingBox, BoundsError> {
    if west < -180.0 || east > 180.0 {
        return Err(BoundsError::CrossesAntimeridian { west, east });
    }
    BoundingBox::new(south, west, north, east).ok_or(BoundsError::Degenerate)
}
