//! Spherical-earth distance and bearing math.

use crate::models::Position;

/// Mean earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the great-circle distance between two points in kilometers.
///
/// Haversine formula on a sphere of radius [`EARTH_RADIUS_KM`].
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Sum of great-circle distances between consecutive positions.
///
/// Paths with fewer than two points have zero length.
pub fn path_distance_km<'a, I>(positions: I) -> f64
where
    I: IntoIterator<Item = &'a Position>,
{
    let mut iter = positions.into_iter();
    let Some(mut prev) = iter.next() else {
        return 0.0;
    };

    let mut total = 0.0;
    for next in iter {
        total += haversine_distance_km(prev.lat, prev.lon, next.lat, next.lon);
        prev = next;
    }
    total
}

/// Initial bearing from `from` to `to`, normalized to [0, 360) degrees.
pub fn initial_bearing_deg(from: &Position, to: &Position) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let dlambda = (to.lon - from.lon).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}
