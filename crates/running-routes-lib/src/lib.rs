//! Running Routes Library - Core Data Structures for a Personal GPX Route Collection
//!
//! This library reads GPX track logs, accumulates great-circle distances along them and
//! assigns every route a deterministic color, so that a presentation layer can draw the
//! routes on a map and plot their elevation profiles.
//!
//! # Architecture
//!
//! - **[`Track`]**: Flattened, order-preserving sequence of [`TrackPoint`]s from one GPX file
//! - **[`DistanceProfile`]**: Cumulative haversine distances in statute miles
//! - **[`ElevationProfile`]**: Distance profile paired with elevations in feet
//! - **[`Colormap`]**: Index-to-color sampling for route coloring
//! - **[`RouteLibrary`]**: Directory scanner that loads, colors and keeps every route
//! - **[`Visibility`]**: Explicit route-name to visibility mapping, plus [`visible_profiles`]
//!
//! # Units
//!
//! - Coordinates: WGS84 degrees
//! - Elevation: meters in [`TrackPoint`], feet in [`ElevationProfile`]
//! - Distance: statute miles

mod colormap;
mod distance;
mod library;
mod profile;
mod track;
pub mod utils;
mod visibility;

// Public API exports
pub use colormap::{Colormap, Rgb};
pub use distance::{DistanceProfile, EARTH_RADIUS_MILES, haversine_miles};
pub use library::{LibraryInfo, LoadFailure, Route, RouteLibrary};
pub use profile::{ElevationProfile, METERS_TO_FEET};
pub use track::{Track, TrackPoint, read_track};
pub use visibility::{ProfileSeries, Visibility, visible_profiles};

/// Error types for route loading
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("GPX parsing error: {0}")]
    Parse(#[from] gpx::errors::GpxError),

    /// A non-finite or out-of-bounds latitude or longitude
    ///
    /// `index` is the point's position in the flattened track when known. The GPX parser
    /// rejects such points while reading XML without reporting where, so errors from
    /// [`read_track`] carry `None`.
    #[error("Coordinate out of range{}: {axis} = {value}", at_point(.index))]
    OutOfRangeCoordinate {
        index: Option<usize>,
        axis: &'static str,
        value: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RouteError>;

fn at_point(index: &Option<usize>) -> String {
    index.map(|i| format!(" at point {i}")).unwrap_or_default()
}
