//! RouteLibrary - Top-level manager for a directory of route files
//!
//! This module provides the high-level API for loading every `.gpx` file of a
//! directory, in sorted file-name order, into colored routes with precomputed
//! elevation profiles. A file that fails to load is recorded and skipped so that one
//! bad file never hides the rest of the collection.

use crate::{Colormap, ElevationProfile, Result, Rgb, Track, utils};

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded route with its display color and profile
#[derive(Clone, Debug)]
pub struct Route {
    /// File name, the stable route identifier
    name: String,
    path: PathBuf,
    /// Position in sorted file order, used for coloring
    slot: usize,
    color: Rgb,
    track: Track,
    profile: ElevationProfile,
    /// `(min_lat, min_lon, max_lat, max_lon)`, computed once at load
    bounds: Option<(f64, f64, f64, f64)>,
}

impl Route {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label derived from the file name
    pub fn label(&self) -> String {
        utils::route_label(&self.name)
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn color(&self) -> Rgb {
        self.color
    }

    #[inline]
    pub fn track(&self) -> &Track {
        &self.track
    }

    #[inline]
    pub fn profile(&self) -> &ElevationProfile {
        &self.profile
    }

    /// Total length in statute miles
    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.profile.total_distance()
    }

    /// Bounding box as `(min_lat, min_lon, max_lat, max_lon)`
    #[inline]
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.bounds
    }
}

/// A route file that could not be loaded
#[derive(Clone, Debug)]
pub struct LoadFailure {
    pub name: String,
    pub path: PathBuf,
    pub error: String,
}

/// Summary of the library
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryInfo {
    pub route_count: usize,
    pub failed_count: usize,
    pub total_points: usize,
    pub total_distance_miles: f64,
}

/// All routes of a collection, in sorted file-name order
#[derive(Clone, Debug, Default)]
pub struct RouteLibrary {
    routes: Vec<Arc<Route>>,
    failures: Vec<LoadFailure>,
    colormap: Colormap,
    /// Number of files that were attempted; the color denominator
    listed: usize,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RouteLibrary {
    /// Load every `.gpx` file directly inside `dir`
    ///
    /// Only failing to list the directory is an error; unreadable or malformed files
    /// end up in [`RouteLibrary::failures`].
    pub fn load_dir(dir: impl AsRef<Path>, colormap: Colormap) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("library::load_dir");

        let dir = dir.as_ref();
        let paths = list_gpx_files(dir)?;
        tracing::info!("Found {} route files in {}", paths.len(), dir.display());
        Ok(Self::from_paths(paths, colormap))
    }

    /// Load an explicit list of route files
    ///
    /// Files are parsed in parallel and kept in sorted file-name order. A file whose
    /// name duplicates an earlier one is recorded as a failure.
    pub fn from_paths(mut paths: Vec<PathBuf>, colormap: Colormap) -> Self {
        #[cfg(feature = "profiling")]
        profiling::scope!("library::from_paths");

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        let listed = paths.len();

        let results: Vec<(PathBuf, Result<Track>)> = paths
            .into_par_iter()
            .map(|path| {
                let track = Track::from_path(&path);
                (path, track)
            })
            .collect();

        let mut routes: Vec<Arc<Route>> = Vec::with_capacity(listed);
        let mut failures = Vec::new();
        // Every name seen so far, including files that failed to load
        let mut seen: HashSet<String> = HashSet::with_capacity(listed);

        for (slot, (path, result)) in results.into_iter().enumerate() {
            let name = file_name(&path);

            if !seen.insert(name.clone()) {
                tracing::warn!("Skipping {}: duplicate route name {}", path.display(), name);
                failures.push(LoadFailure {
                    name,
                    path,
                    error: "Duplicate route name".to_string(),
                });
                continue;
            }

            match result {
                Ok(track) => {
                    tracing::debug!("Loaded {} ({} points)", name, track.len());
                    let profile = ElevationProfile::from_track(&track);
                    let bounds = track
                        .bounding_box()
                        .map(|r| (r.min().y, r.min().x, r.max().y, r.max().x));
                    routes.push(Arc::new(Route {
                        color: colormap.color_for(slot, listed),
                        name,
                        path,
                        slot,
                        track,
                        profile,
                        bounds,
                    }));
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", path.display(), e);
                    failures.push(LoadFailure {
                        name,
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        let library = Self {
            routes,
            failures,
            colormap,
            listed,
        };
        let info = library.info();
        tracing::info!(
            "Loaded {} routes ({} failed, {} points, {:.2} mi)",
            info.route_count,
            info.failed_count,
            info.total_points,
            info.total_distance_miles
        );
        library
    }

    /// Reassign every route's color from a different colormap
    pub fn recolor(&mut self, colormap: Colormap) {
        self.colormap = colormap;
        let listed = self.listed;
        for route in &mut self.routes {
            let color = colormap.color_for(route.slot, listed);
            Arc::make_mut(route).color = color;
        }
    }

    #[inline]
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    #[inline]
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    #[inline]
    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    /// Find a route by file name
    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Route names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.routes.iter().map(|r| r.name.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn info(&self) -> LibraryInfo {
        LibraryInfo {
            route_count: self.routes.len(),
            failed_count: self.failures.len(),
            total_points: self.routes.iter().map(|r| r.track.len()).sum(),
            total_distance_miles: self.routes.iter().map(|r| r.total_distance()).sum(),
        }
    }

    /// Bounding box of all routes as `(min_lat, min_lon, max_lat, max_lon)`
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        self.routes
            .iter()
            .filter_map(|r| r.bounds())
            .reduce(utils::union_bounds)
    }
}

/// List the `.gpx` files directly inside `dir`, sorted by file name
pub fn list_gpx_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && utils::is_gpx_file(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::tests::TWO_SEGMENTS;
    use std::fs;

    const SHORT_RUN: &str = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="37.8700" lon="-122.2600"><ele>12.0</ele></trkpt>
    <trkpt lat="37.8710" lon="-122.2610"><ele>14.0</ele></trkpt>
  </trkseg></trk>
</gpx>"#;

    const BROKEN: &str = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="37.8700"></trkpt>
  </trkseg></trk>
</gpx>"#;

    fn write_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_dir_sorted_and_filtered() {
        let dir = write_dir(&[
            ("r_20230603.gpx", SHORT_RUN),
            ("r_20230601.gpx", TWO_SEGMENTS),
            ("notes.txt", "not a route"),
            ("r_20230602.GPX", SHORT_RUN),
        ]);

        let library = RouteLibrary::load_dir(dir.path(), Colormap::Gnuplot2).unwrap();
        let names: Vec<&str> = library.names().collect();

        assert_eq!(
            names,
            vec!["r_20230601.gpx", "r_20230602.GPX", "r_20230603.gpx"]
        );
        assert!(library.failures().is_empty());
        assert_eq!(library.get("r_20230601.gpx").unwrap().track().len(), 4);
        assert_eq!(library.routes()[0].label(), "2023/06/01");
    }

    #[test]
    fn test_failed_file_is_skipped_and_recorded() {
        let dir = write_dir(&[
            ("a.gpx", SHORT_RUN),
            ("b.gpx", BROKEN),
            ("c.gpx", SHORT_RUN),
        ]);

        let library = RouteLibrary::load_dir(dir.path(), Colormap::Gnuplot2).unwrap();

        assert_eq!(library.len(), 2);
        assert_eq!(library.failures().len(), 1);
        assert_eq!(library.failures()[0].name, "b.gpx");
        assert!(library.get("b.gpx").is_none());

        // Colors keep their sorted-file slot even when a neighbour fails
        let c = library.get("c.gpx").unwrap();
        assert_eq!(c.color(), Colormap::Gnuplot2.color_for(2, 3));
    }

    #[test]
    fn test_colors_follow_sorted_index() {
        let dir = write_dir(&[
            ("x3.gpx", SHORT_RUN),
            ("x1.gpx", SHORT_RUN),
            ("x2.gpx", SHORT_RUN),
        ]);

        let library = RouteLibrary::load_dir(dir.path(), Colormap::Gnuplot2).unwrap();
        let hex: Vec<String> = library.routes().iter().map(|r| r.color().to_hex()).collect();

        assert_eq!(hex, vec!["#000000", "#4200ff", "#ff7d81"]);
    }

    #[test]
    fn test_recolor() {
        let dir = write_dir(&[("a.gpx", SHORT_RUN), ("b.gpx", SHORT_RUN)]);
        let mut library = RouteLibrary::load_dir(dir.path(), Colormap::Gnuplot2).unwrap();

        library.recolor(Colormap::Gnuplot);

        assert_eq!(library.colormap(), Colormap::Gnuplot);
        assert_eq!(library.routes()[1].color(), Colormap::Gnuplot.color_for(1, 2));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let result = RouteLibrary::load_dir("/definitely/not/a/dir", Colormap::Gnuplot2);
        assert!(result.is_err());
    }

    #[test]
    fn test_info_and_bounds() {
        let dir = write_dir(&[("a.gpx", SHORT_RUN), ("b.gpx", TWO_SEGMENTS)]);
        let library = RouteLibrary::load_dir(dir.path(), Colormap::Gnuplot2).unwrap();

        let info = library.info();
        assert_eq!(info.route_count, 2);
        assert_eq!(info.failed_count, 0);
        assert_eq!(info.total_points, 6);
        assert!(info.total_distance_miles > 0.0);

        let (min_lat, min_lon, max_lat, max_lon) = library.bounding_box().unwrap();
        assert_eq!(min_lat, 37.8700);
        assert_eq!(max_lat, 37.8820);
        assert_eq!(min_lon, -122.2760);
        assert_eq!(max_lon, -122.2600);
    }

    #[test]
    fn test_duplicate_names_from_paths() {
        let first = write_dir(&[("same.gpx", SHORT_RUN)]);
        let second = write_dir(&[("same.gpx", TWO_SEGMENTS)]);

        let library = RouteLibrary::from_paths(
            vec![
                first.path().join("same.gpx"),
                second.path().join("same.gpx"),
            ],
            Colormap::Gnuplot2,
        );

        assert_eq!(library.len(), 1);
        assert_eq!(library.failures().len(), 1);
    }

    #[test]
    fn test_duplicate_of_failed_file_is_rejected() {
        let first = write_dir(&[("same.gpx", BROKEN)]);
        let second = write_dir(&[("same.gpx", SHORT_RUN)]);

        let library = RouteLibrary::from_paths(
            vec![
                first.path().join("same.gpx"),
                second.path().join("same.gpx"),
            ],
            Colormap::Gnuplot2,
        );

        assert!(library.is_empty());
        assert_eq!(library.failures().len(), 2);
        assert_eq!(library.failures()[1].error, "Duplicate route name");
        assert_eq!(library.failures()[1].path, second.path().join("same.gpx"));
    }

    #[test]
    fn test_empty_library() {
        let dir = write_dir(&[]);
        let library = RouteLibrary::load_dir(dir.path(), Colormap::Gnuplot2).unwrap();

        assert!(library.is_empty());
        assert_eq!(library.bounding_box(), None);
        assert_eq!(library.info(), LibraryInfo::default());
    }
}
