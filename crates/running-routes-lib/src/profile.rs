//! Elevation-vs-distance series for profile plotting

use crate::{DistanceProfile, Track};

/// Meters to feet conversion factor
pub const METERS_TO_FEET: f64 = 3.28084;

/// A [`DistanceProfile`] paired positionally with elevations in feet
///
/// Points without elevation keep their slot (as `None`) so that distances stay aligned
/// with the source track; they are skipped by [`ElevationProfile::samples`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElevationProfile {
    distance: DistanceProfile,
    elevations_ft: Vec<Option<f64>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl ElevationProfile {
    pub fn from_track(track: &Track) -> Self {
        let distance = DistanceProfile::from_track(track);
        let elevations_ft = track
            .iter()
            .map(|p| p.elevation().map(|meters| meters * METERS_TO_FEET))
            .collect();
        Self {
            distance,
            elevations_ft,
        }
    }

    #[inline]
    pub fn distance(&self) -> &DistanceProfile {
        &self.distance
    }

    #[inline]
    pub fn elevations_ft(&self) -> &[Option<f64>] {
        &self.elevations_ft
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elevations_ft.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elevations_ft.is_empty()
    }

    /// `(distance_mi, elevation_ft)` pairs for points that carry an elevation
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.distance
            .distances()
            .iter()
            .zip(&self.elevations_ft)
            .filter_map(|(&d, &e)| e.map(|e| (d, e)))
    }

    /// Total distance in miles
    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.distance.total()
    }

    /// Minimum and maximum elevation in feet
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.elevations_ft.iter().flatten().fold(None, |acc, &e| match acc {
            None => Some((e, e)),
            Some((min, max)) => Some((min.min(e), max.max(e))),
        })
    }

    /// Total ascent in feet over consecutive points that both carry an elevation
    pub fn gain_ft(&self) -> f64 {
        self.elevations_ft
            .windows(2)
            .filter_map(|w| match (w[0], w[1]) {
                (Some(a), Some(b)) if b > a => Some(b - a),
                _ => None,
            })
            .sum()
    }
}
