//! Geographic math for proximity queries.
//!
//! Distances are great-circle distances on a sphere of radius 6371 km computed
//! with the haversine formula. Everything in this module is pure so it can be
//! tested without a database, whatever backend the proximity repository uses.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used for all distance computations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees north, -90 to 90
    pub latitude: f64,
    /// Degrees east, -180 to 180
    pub longitude: f64,
}

impl GeoPoint {
    /// Builds a validated point.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCoordinates`] when either value is not finite
    /// or lies outside its range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(Error::InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }

    /// Builds a point from optional request parameters.
    ///
    /// Both absent means "no reference point". Exactly one present is an
    /// error, reported with `NaN` standing in for the missing value.
    pub fn from_optional(latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<Self>> {
        match (latitude, longitude) {
            (None, None) => Ok(None),
            (Some(lat), Some(lon)) => Self::new(lat, lon).map(Some),
            (lat, lon) => Err(Error::InvalidCoordinates {
                latitude: lat.unwrap_or(f64::NAN),
                longitude: lon.unwrap_or(f64::NAN),
            }),
        }
    }
}

/// Great-circle distance between two points in kilometers, unrounded.
#[must_use]
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    // Rounding can push `a` just past 1 for near-antipodal points
    let a = ((d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2))
        .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Rounds to one decimal place, halves away from zero.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Display distance: haversine rounded to one decimal.
#[must_use]
pub fn distance_km(from: GeoPoint, to: GeoPoint) -> f64 {
    round_one_decimal(haversine_km(from, to))
}

/// A candidate paired with its rounded distance from the reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    /// The ranked candidate
    pub item: T,
    /// Rounded distance in kilometers, `None` when the candidate has no point
    pub distance_km: Option<f64>,
}

/// Orders candidates by distance from `origin`.
///
/// `candidates` must already be in their fallback order (creation order for
/// suppliers, price for products); the sort is stable so that order breaks
/// distance ties. Candidates strictly farther than `radius_km` are dropped,
/// comparing the unrounded distance. With a radius, candidates without a
/// stored point are dropped too; without one they trail the located
/// candidates in fallback order.
pub fn rank_by_distance<T, F>(
    candidates: Vec<T>,
    origin: GeoPoint,
    radius_km: Option<f64>,
    point_of: F,
) -> Vec<Ranked<T>>
where
    F: Fn(&T) -> Option<GeoPoint>,
{
    let mut located = Vec::new();
    let mut unlocated = Vec::new();

    for item in candidates {
        match point_of(&item) {
            Some(point) => {
                let exact = haversine_km(origin, point);
                if radius_km.is_some_and(|radius| exact > radius) {
                    continue;
                }
                located.push((exact, item));
            }
            None if radius_km.is_none() => unlocated.push(item),
            None => {}
        }
    }

    located.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    located
        .into_iter()
        .map(|(exact, item)| Ranked {
            item,
            distance_km: Some(round_one_decimal(exact)),
        })
        .chain(unlocated.into_iter().map(|item| Ranked {
            item,
            distance_km: None,
        }))
        .collect()
}
