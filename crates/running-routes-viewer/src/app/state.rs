//! Application state management
//!
//! This module owns the single mutable state of the viewer: the loaded route library,
//! the per-route visibility map and the UI settings. Everything drawn on screen is
//! derived from it each frame.

use crate::app::settings::{DEFAULT_ROUTES_DIR, Settings};
use egui::Color32;
use running_routes_lib::{
    Colormap, ProfileSeries, Rgb, RouteLibrary, Visibility, visible_profiles,
};
use std::path::PathBuf;

/// Main application state
pub struct AppState {
    /// Directory the routes were loaded from
    pub routes_dir: PathBuf,

    /// All loaded routes, in sorted file order
    pub library: RouteLibrary,

    /// Which routes are drawn on the map and in the profile chart
    pub visibility: Visibility,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Elevation chart content, recomputed whenever visibility or colors change
    pub profiles: Vec<ProfileSeries>,

    /// Error listing the routes directory itself
    pub load_error: Option<String>,

    /// Zoom the map to the loaded routes on the next frame
    pub pending_fit_bounds: bool,

    /// Show the folder picker on the next frame
    pub show_picker: bool,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone, Debug, PartialEq)]
pub struct UiSettings {
    /// Route line width in pixels
    pub line_width: f32,

    /// Draw a light outline under routes
    pub show_outline: bool,

    /// Draw hidden routes as faint lines that can be clicked to show them again
    pub show_hidden_ghosts: bool,

    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Colormap used for route colors
    pub colormap: Colormap,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Whether the elevation chart panel is shown
    pub show_profile: bool,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }

    pub fn from_name(name: &str) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .unwrap_or(Self::OpenStreetMap)
    }
}

impl AppState {
    /// Create new application state and load the routes directory
    pub fn new(settings: &Settings) -> Self {
        let defaults = UiSettings::default();
        let ui_settings = UiSettings {
            line_width: settings.line_width.unwrap_or(defaults.line_width),
            colormap: settings.colormap.unwrap_or_default(),
            ..defaults
        };
        let routes_dir = settings
            .routes_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROUTES_DIR));

        Self::with_visibility(routes_dir, ui_settings, Visibility::default())
    }

    /// Create state with previously saved visibility flags
    ///
    /// Saved flags are kept for routes that still exist; new routes start visible.
    pub fn with_visibility(
        routes_dir: PathBuf,
        ui_settings: UiSettings,
        visibility: Visibility,
    ) -> Self {
        let mut state = Self {
            routes_dir,
            library: RouteLibrary::default(),
            visibility,
            ui_settings,
            profiles: Vec::new(),
            load_error: None,
            pending_fit_bounds: false,
            show_picker: false,
        };
        state.reload();
        state
    }

    /// Re-scan the routes directory
    pub fn reload(&mut self) {
        profiling::scope!("reload");

        match RouteLibrary::load_dir(&self.routes_dir, self.ui_settings.colormap) {
            Ok(library) => {
                self.library = library;
                self.load_error = None;
            }
            Err(e) => {
                tracing::error!(
                    "Failed to read routes directory {}: {}",
                    self.routes_dir.display(),
                    e
                );
                self.library = RouteLibrary::default();
                self.load_error = Some(format!(
                    "Failed to read {}: {}",
                    self.routes_dir.display(),
                    e
                ));
            }
        }

        self.visibility.sync_with(self.library.names());
        self.refresh_profiles();
    }

    /// Switch to another routes directory
    pub fn set_routes_dir(&mut self, dir: PathBuf) {
        tracing::info!("Switching routes directory to {}", dir.display());
        self.routes_dir = dir;
        self.reload();
        self.pending_fit_bounds = !self.library.is_empty();
    }

    /// Toggle one route by name (map click or legend)
    pub fn toggle_route(&mut self, name: &str) {
        let visible = self.visibility.toggle(name);
        tracing::debug!("Route {} is now {}", name, if visible { "shown" } else { "hidden" });
        self.refresh_profiles();
    }

    pub fn set_route_visible(&mut self, name: &str, visible: bool) {
        self.visibility.set(name, visible);
        self.refresh_profiles();
    }

    pub fn show_all(&mut self) {
        self.visibility.show_all();
        self.refresh_profiles();
    }

    pub fn hide_all(&mut self) {
        self.visibility.hide_all();
        self.refresh_profiles();
    }

    /// Recolor all routes with a different colormap
    pub fn set_colormap(&mut self, colormap: Colormap) {
        if self.ui_settings.colormap == colormap {
            return;
        }
        self.ui_settings.colormap = colormap;
        // Release shared routes so recoloring updates them in place
        self.profiles.clear();
        self.library.recolor(colormap);
        self.refresh_profiles();
    }

    /// Recompute the elevation chart content from the library and visibility
    pub fn refresh_profiles(&mut self) {
        self.profiles = visible_profiles(&self.library, &self.visibility);
    }

    /// Map zoom level and center fitting all loaded routes
    pub fn fit_view(&self) -> Option<(f64, f64, f64)> {
        let bounds = self.library.bounding_box()?;
        let (min_lat, min_lon, max_lat, max_lon) = bounds;
        let zoom = running_routes_lib::utils::fit_zoom(bounds);
        Some(((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0, zoom))
    }

    /// Format the collection's total distance
    pub fn format_distance(&self) -> String {
        format_miles(self.library.info().total_distance_miles)
    }

    /// Format the collection's point count with thousands separators
    pub fn format_points(&self) -> String {
        format_number_with_commas(self.library.info().total_points)
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            line_width: 5.0,
            show_outline: true,
            show_hidden_ghosts: true,
            tiles_provider: TilesProvider::OpenStreetMap,
            colormap: Colormap::default(),
            sidebar_open: true,
            show_profile: true,
        }
    }
}

/// Convert a route color for painting
#[inline]
pub fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

/// Format a distance in statute miles
pub fn format_miles(miles: f64) -> String {
    if miles < 10.0 {
        format!("{:.2} mi", miles)
    } else if miles < 1000.0 {
        format!("{:.1} mi", miles)
    } else {
        format!("{:.0} mi", miles)
    }
}

/// Helper to format numbers with comma separators
fn format_number_with_commas(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const RUN: &str = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="37.8775" lon="-122.2760"><ele>10.0</ele></trkpt>
    <trkpt lat="37.8800" lon="-122.2760"><ele>12.0</ele></trkpt>
  </trkseg></trk>
</gpx>"#;

    fn state_with(files: &[&str]) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        for name in files {
            fs::write(dir.path().join(name), RUN).unwrap();
        }
        let settings = Settings {
            routes_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let state = AppState::new(&settings);
        (dir, state)
    }

    #[test]
    fn test_loads_all_routes_visible() {
        let (_dir, state) = state_with(&["a.gpx", "b.gpx"]);

        assert_eq!(state.library.len(), 2);
        assert_eq!(state.visibility.visible_count(), 2);
        assert_eq!(state.profiles.len(), 2);
        assert!(state.load_error.is_none());
    }

    #[test]
    fn test_toggle_updates_profiles() {
        let (_dir, mut state) = state_with(&["a.gpx", "b.gpx", "c.gpx"]);

        state.toggle_route("b.gpx");
        let names: Vec<&str> = state.profiles.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a.gpx", "c.gpx"]);

        state.hide_all();
        assert!(state.profiles.is_empty());

        state.show_all();
        assert_eq!(state.profiles.len(), 3);

        state.set_route_visible("a.gpx", false);
        assert_eq!(state.profiles.len(), 2);
    }

    #[test]
    fn test_reload_keeps_visibility_and_picks_up_new_files() {
        let (dir, mut state) = state_with(&["a.gpx", "b.gpx"]);
        state.toggle_route("a.gpx");

        fs::write(dir.path().join("c.gpx"), RUN).unwrap();
        state.reload();

        assert_eq!(state.library.len(), 3);
        assert!(!state.visibility.is_visible("a.gpx"));
        assert!(state.visibility.is_visible("c.gpx"));
    }

    #[test]
    fn test_missing_directory_reports_error() {
        let settings = Settings {
            routes_dir: Some(PathBuf::from("/definitely/not/a/routes/dir")),
            ..Settings::default()
        };
        let state = AppState::new(&settings);

        assert!(state.library.is_empty());
        assert!(state.load_error.is_some());
        assert!(state.fit_view().is_none());
    }

    #[test]
    fn test_set_colormap_recolors_profiles() {
        let (_dir, mut state) = state_with(&["a.gpx", "b.gpx"]);
        let before = state.profiles[1].color();

        state.set_colormap(Colormap::Gnuplot);

        assert_eq!(state.profiles[1].color(), Colormap::Gnuplot.color_for(1, 2));
        assert_ne!(state.profiles[1].color(), before);
    }

    #[test]
    fn test_fit_view_centers_on_routes() {
        let (_dir, state) = state_with(&["a.gpx"]);
        let (lat, lon, zoom) = state.fit_view().unwrap();

        assert!((lat - 37.87875).abs() < 1e-9);
        assert!((lon + 122.2760).abs() < 1e-9);
        assert!((1.0..=18.0).contains(&zoom));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_miles(0.172), "0.17 mi");
        assert_eq!(format_miles(123.46), "123.5 mi");
        assert_eq!(format_number_with_commas(1234567), "1,234,567");
        assert_eq!(format_number_with_commas(12), "12");
    }

    #[test]
    fn test_tiles_provider_names() {
        for provider in TilesProvider::all() {
            assert_eq!(TilesProvider::from_name(provider.name()), *provider);
        }
        assert_eq!(TilesProvider::from_name("unknown"), TilesProvider::OpenStreetMap);
    }
}
