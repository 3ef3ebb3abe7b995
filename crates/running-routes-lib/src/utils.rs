//! Utility functions for route file names and geographic extents

use std::path::Path;

/// File extension of route files (matched case-insensitively)
pub const GPX_EXTENSION: &str = "gpx";

/// Check whether a path names a GPX file
#[inline]
pub fn is_gpx_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(GPX_EXTENSION))
}

/// Human-readable label for a route file name
///
/// Route files are named after the day they were recorded, e.g. `r_20230601.gpx`;
/// a stem ending in an eight-digit date is shown as `2023/06/01`. Any other name is
/// shown as its stem.
pub fn route_label(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let bytes = stem.as_bytes();
    if bytes.len() >= 8 && bytes[bytes.len() - 8..].iter().all(u8::is_ascii_digit) {
        let date = &stem[stem.len() - 8..];
        return format!("{}/{}/{}", &date[0..4], &date[4..6], &date[6..8]);
    }

    stem.to_string()
}

/// Merge two `(min_lat, min_lon, max_lat, max_lon)` boxes
#[inline]
pub fn union_bounds(
    a: (f64, f64, f64, f64),
    b: (f64, f64, f64, f64),
) -> (f64, f64, f64, f64) {
    (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3))
}

/// Map zoom level that fits a `(min_lat, min_lon, max_lat, max_lon)` box
pub fn fit_zoom(bounds: (f64, f64, f64, f64)) -> f64 {
    let lat_span = (bounds.2 - bounds.0).abs();
    let lon_span = (bounds.3 - bounds.1).abs();
    let max_span = lat_span.max(lon_span);

    if max_span > 0.0 {
        let zoom_estimate = (4.0 * 360.0 / max_span).log2();
        (zoom_estimate - 0.5).clamp(1.0, 18.0)
    } else {
        14.0
    }
}
