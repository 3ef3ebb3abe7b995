//! Track reading module
//!
//! This module provides the `Track` struct: every point of every segment of every track
//! in one GPX file, flattened in file order.

use crate::{Result, RouteError};
use std::io::{BufReader, Read};
use std::path::Path;

/// A single recorded GPS sample
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPoint {
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
    /// Elevation in meters, absent when the GPX point has no `<ele>`
    elevation: Option<f64>,
}

impl TrackPoint {
    /// Create a point without range validation
    pub fn new(latitude: f64, longitude: f64, elevation: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Elevation in meters
    #[inline]
    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    /// The point as a `geo::Point` (x = longitude, y = latitude)
    #[inline]
    pub fn point(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }

    /// Whether both coordinates are finite and within geographic bounds
    #[inline]
    pub fn is_valid(&self) -> bool {
        valid_latitude(self.latitude) && valid_longitude(self.longitude)
    }

    fn from_waypoint(waypoint: &gpx::Waypoint) -> Self {
        let point = waypoint.point();
        Self::new(point.y(), point.x(), waypoint.elevation)
    }
}

/// One recorded route: all points of one GPX file in file order
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    points: Vec<TrackPoint>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Flatten an already parsed GPX document
    ///
    /// # Returns
    /// The points of every track and segment, or `OutOfRangeCoordinate` for the first
    /// point with non-finite or out-of-bounds coordinates
    pub fn from_gpx(gpx: &gpx::Gpx) -> Result<Self> {
        let capacity = gpx
            .tracks
            .iter()
            .flat_map(|track| &track.segments)
            .map(|segment| segment.points.len())
            .sum();
        let mut points = Vec::with_capacity(capacity);

        for track in &gpx.tracks {
            for segment in &track.segments {
                for waypoint in &segment.points {
                    let point = TrackPoint::from_waypoint(waypoint);
                    if !point.is_valid() {
                        let (axis, value) = if valid_latitude(point.latitude) {
                            ("longitude", point.longitude)
                        } else {
                            ("latitude", point.latitude)
                        };
                        return Err(RouteError::OutOfRangeCoordinate {
                            index: Some(points.len()),
                            axis,
                            value,
                        });
                    }
                    points.push(point);
                }
            }
        }

        Ok(Self { points })
    }

    /// Open and parse a GPX file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        read_track(BufReader::new(file))
    }

    #[inline]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackPoint> {
        self.points.iter()
    }

    /// Number of points that carry an elevation
    pub fn elevation_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.elevation.is_some())
            .count()
    }

    /// Bounding box in degrees (x = longitude, y = latitude)
    pub fn bounding_box(&self) -> Option<geo::Rect<f64>> {
        let first = self.points.first()?;
        let (mut min, mut max) = (first.point(), first.point());
        for point in &self.points[1..] {
            min = geo::Point::new(min.x().min(point.longitude), min.y().min(point.latitude));
            max = geo::Point::new(max.x().max(point.longitude), max.y().max(point.latitude));
        }
        Some(geo::Rect::new(min.0, max.0))
    }
}

impl From<Vec<TrackPoint>> for Track {
    fn from(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a TrackPoint;
    type IntoIter = std::slice::Iter<'a, TrackPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[inline]
fn valid_latitude(latitude: f64) -> bool {
    latitude.is_finite() && (-90.0..=90.0).contains(&latitude)
}

#[inline]
fn valid_longitude(longitude: f64) -> bool {
    longitude.is_finite() && (-180.0..=180.0).contains(&longitude)
}

/// Parse a GPX stream into a [`Track`]
///
/// Fails with `Parse` on malformed XML or points lacking `lat`/`lon`, and with
/// `OutOfRangeCoordinate` (without a point index) on out-of-bounds or non-finite
/// coordinates; never returns a partial track.
pub fn read_track<R: Read>(reader: R) -> Result<Track> {
    #[cfg(feature = "profiling")]
    profiling::scope!("read_track");
    let gpx = gpx::read(reader).map_err(from_gpx_error)?;
    let track = Track::from_gpx(&gpx)?;
    tracing::trace!("Parsed track with {} points", track.len());
    Ok(track)
}

/// Surface the parser's coordinate bounds check as `OutOfRangeCoordinate`
fn from_gpx_error(error: gpx::errors::GpxError) -> RouteError {
    match error {
        gpx::errors::GpxError::LonLatOutOfBoundsError(axis, _, value) => {
            let axis = if axis.eq_ignore_ascii_case("latitude") {
                "latitude"
            } else {
                "longitude"
            };
            RouteError::OutOfRangeCoordinate {
                index: None,
                axis,
                value,
            }
        }
        other => RouteError::Parse(other),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use gpx::{Gpx, Track as GpxTrack, TrackSegment, Waypoint};

    pub(crate) const TWO_SEGMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Morning Run</name>
    <trkseg>
      <trkpt lat="37.8775" lon="-122.2760"><ele>50.0</ele></trkpt>
      <trkpt lat="37.8800" lon="-122.2760"><ele>55.5</ele></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="37.8810" lon="-122.2750"></trkpt>
    </trkseg>
  </trk>
  <trk>
    <trkseg>
      <trkpt lat="37.8820" lon="-122.2740"><ele>61.0</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    fn create_test_waypoint(lat: f64, lon: f64) -> Waypoint {
        Waypoint::new(geo::Point::new(lon, lat))
    }

    #[test]
    fn test_reads_all_points_in_file_order() {
        let track = read_track(TWO_SEGMENTS.as_bytes()).unwrap();

        assert_eq!(track.len(), 4);
        let lats: Vec<f64> = track.iter().map(|p| p.latitude()).collect();
        assert_eq!(lats, vec![37.8775, 37.8800, 37.8810, 37.8820]);
        assert_eq!(track.points()[0].longitude(), -122.2760);
    }

    #[test]
    fn test_missing_elevation_is_none() {
        let track = read_track(TWO_SEGMENTS.as_bytes()).unwrap();

        assert_eq!(track.points()[0].elevation(), Some(50.0));
        assert_eq!(track.points()[2].elevation(), None);
        assert_eq!(track.elevation_count(), 3);
    }

    #[test]
    fn test_empty_document_yields_empty_track() {
        let xml = r#"<?xml version="1.0"?><gpx version="1.1" creator="test"></gpx>"#;
        let track = read_track(xml.as_bytes()).unwrap();
        assert!(track.is_empty());
        assert!(track.bounding_box().is_none());
    }

    #[test]
    fn test_missing_longitude_fails() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="37.8775" lon="-122.2760"></trkpt>
    <trkpt lat="37.8800"></trkpt>
  </trkseg></trk>
</gpx>"#;
        let result = read_track(xml.as_bytes());
        assert!(matches!(result, Err(RouteError::Parse(_))));
    }

    #[test]
    fn test_malformed_xml_fails() {
        let result = read_track("<gpx version=\"1.1\"><trk><trkseg>".as_bytes());
        assert!(matches!(result, Err(RouteError::Parse(_))));
    }

    #[test]
    fn test_out_of_range_coordinate_rejected() {
        let mut gpx = Gpx::default();
        let mut track = GpxTrack::default();
        let mut segment = TrackSegment::default();
        segment.points.push(create_test_waypoint(51.5074, -0.1278));
        segment.points.push(create_test_waypoint(51.5076, 200.0));
        track.segments.push(segment);
        gpx.tracks.push(track);

        match Track::from_gpx(&gpx) {
            Err(RouteError::OutOfRangeCoordinate { index, axis, value }) => {
                assert_eq!(index, Some(1));
                assert_eq!(axis, "longitude");
                assert_eq!(value, 200.0);
            }
            other => panic!("expected OutOfRangeCoordinate, got {other:?}"),
        }
    }

    fn single_point_xml(lat: &str, lon: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="37.8775" lon="-122.2760"></trkpt>
    <trkpt lat="{lat}" lon="{lon}"></trkpt>
  </trkseg></trk>
</gpx>"#
        )
    }

    #[test]
    fn test_read_track_rejects_out_of_range_latitude() {
        let xml = single_point_xml("91.0", "-122.0");
        match read_track(xml.as_bytes()) {
            Err(RouteError::OutOfRangeCoordinate { index, axis, value }) => {
                assert_eq!(index, None);
                assert_eq!(axis, "latitude");
                assert_eq!(value, 91.0);
            }
            other => panic!("expected OutOfRangeCoordinate, got {other:?}"),
        }
    }

    #[test]
    fn test_read_track_rejects_out_of_range_longitude() {
        let xml = single_point_xml("37.0", "-200.0");
        assert!(matches!(
            read_track(xml.as_bytes()),
            Err(RouteError::OutOfRangeCoordinate {
                axis: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn test_read_track_rejects_non_finite_latitude() {
        let xml = single_point_xml("NaN", "-122.0");
        match read_track(xml.as_bytes()) {
            Err(RouteError::OutOfRangeCoordinate { axis, value, .. }) => {
                assert_eq!(axis, "latitude");
                assert!(value.is_nan());
            }
            other => panic!("expected OutOfRangeCoordinate, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_point_is_invalid() {
        assert!(!TrackPoint::new(f64::NAN, 0.0, None).is_valid());
        assert!(!TrackPoint::new(0.0, f64::INFINITY, None).is_valid());
        assert!(TrackPoint::new(-90.0, 180.0, None).is_valid());
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let first = read_track(TWO_SEGMENTS.as_bytes()).unwrap();
        let second = read_track(TWO_SEGMENTS.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bounding_box() {
        let track = read_track(TWO_SEGMENTS.as_bytes()).unwrap();
        let bbox = track.bounding_box().unwrap();

        assert_eq!(bbox.min().y, 37.8775);
        assert_eq!(bbox.max().y, 37.8820);
        assert_eq!(bbox.min().x, -122.2760);
        assert_eq!(bbox.max().x, -122.2740);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = Track::from_path("/definitely/not/here.gpx");
        assert!(matches!(result, Err(RouteError::Io(_))));
    }
}
