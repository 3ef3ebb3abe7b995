//! Great-circle distance accumulation along a track

use crate::{Track, TrackPoint};

/// Earth's radius in statute miles
pub const EARTH_RADIUS_MILES: f64 = 3963.19;

/// Calculate the Haversine distance between two points in statute miles
///
/// `a` is clamped to `[0, 1]` so that rounding on near-duplicate or antipodal points
/// cannot push the square roots out of their domain.
#[inline]
pub fn haversine_miles(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    let lat1 = p1.latitude().to_radians();
    let lat2 = p2.latitude().to_radians();
    let delta_lat = (p2.latitude() - p1.latitude()).to_radians();
    let delta_lon = (p2.longitude() - p1.longitude()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Cumulative along-track distance in statute miles, one entry per track point
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceProfile {
    distances: Vec<f64>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl DistanceProfile {
    pub fn from_track(track: &Track) -> Self {
        Self::accumulate(track.points())
    }

    /// Accumulate pairwise haversine distances, starting at exactly 0.0
    pub fn accumulate(points: &[TrackPoint]) -> Self {
        let mut distances = Vec::with_capacity(points.len());
        if points.is_empty() {
            return Self { distances };
        }

        let mut total = 0.0;
        distances.push(total);
        for pair in points.windows(2) {
            total += haversine_miles(&pair[0], &pair[1]);
            distances.push(total);
        }

        Self { distances }
    }

    #[inline]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Total distance in miles (0.0 for an empty profile)
    #[inline]
    pub fn total(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }
}
