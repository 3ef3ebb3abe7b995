//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map with every route drawn in its color
//! - Click a route on the map to toggle it
//! - Toggleable sidebar with the route legend, statistics and settings
//! - Elevation chart of the visible routes in a bottom panel

mod plugin;
mod profile_plot;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::plugin::{ClickedRoute, RoutePlugin};
use crate::app::settings::Settings;
use crate::app::state::{AppState, TilesProvider, UiSettings};
use eframe::egui;
use running_routes_lib::{Colormap, Visibility};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Storage key of the persisted settings
const STORAGE_KEY: &str = "running_routes_settings";

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// Persisted settings (lightweight, no route data)
#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    routes_dir: PathBuf,
    colormap: String,
    line_width: f32,
    show_outline: bool,
    show_hidden_ghosts: bool,
    sidebar_open: bool,
    show_profile: bool,
    tiles_provider: String,
    /// Route name to visibility, reapplied to routes that still exist
    visibility: Visibility,
}

impl PersistedSettings {
    fn from_state(state: &AppState) -> Self {
        let ui = &state.ui_settings;
        Self {
            routes_dir: state.routes_dir.clone(),
            colormap: ui.colormap.name().to_string(),
            line_width: ui.line_width,
            show_outline: ui.show_outline,
            show_hidden_ghosts: ui.show_hidden_ghosts,
            sidebar_open: ui.sidebar_open,
            show_profile: ui.show_profile,
            tiles_provider: ui.tiles_provider.name().to_string(),
            visibility: state.visibility.clone(),
        }
    }

    /// Rebuild the state, letting command line arguments override what was saved
    fn into_state(self, cli_args: &Settings) -> AppState {
        let colormap = cli_args
            .colormap
            .or_else(|| self.colormap.parse::<Colormap>().ok())
            .unwrap_or_default();

        let ui_settings = UiSettings {
            line_width: cli_args.line_width.unwrap_or(self.line_width),
            show_outline: self.show_outline,
            show_hidden_ghosts: self.show_hidden_ghosts,
            tiles_provider: TilesProvider::from_name(&self.tiles_provider),
            colormap,
            sidebar_open: self.sidebar_open,
            show_profile: self.show_profile,
        };

        let routes_dir = cli_args.routes_dir.clone().unwrap_or(self.routes_dir);

        AppState::with_visibility(routes_dir, ui_settings, self.visibility)
    }
}

/// Main application structure
pub struct RunningRoutesApp {
    /// Application state (routes, visibility, UI settings)
    state: AppState,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Initial map center from the command line
    home: walkers::Position,

    /// Show help overlay
    show_help: bool,

    /// Route clicked on the map, filled in by the plugin
    clicked_route: ClickedRoute,
}

impl RunningRoutesApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let state = if !cli_args.ignore_persisted {
            if let Some(storage) = cc.storage {
                Self::load_persisted_settings(storage, &cli_args)
            } else {
                AppState::new(&cli_args)
            }
        } else {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            AppState::new(&cli_args)
        };

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        let mut map_memory = MapMemory::default();
        if map_memory.set_zoom(cli_args.zoom).is_err() {
            tracing::warn!("Invalid zoom level {}, using default", cli_args.zoom);
        }

        tracing::info!(
            "Loaded {} routes from {} ({} failed)",
            state.library.len(),
            state.routes_dir.display(),
            state.library.failures().len()
        );

        Self {
            state,
            tiles_osm,
            tiles_otm,
            map_memory,
            home: walkers::lat_lon(cli_args.center_lat, cli_args.center_lon),
            show_help: false,
            clicked_route: Arc::new(RwLock::new(None)),
        }
    }

    /// Load persisted settings from storage (fast, no route data)
    fn load_persisted_settings(storage: &dyn eframe::Storage, cli_args: &Settings) -> AppState {
        if let Some(json) = storage.get_string(STORAGE_KEY)
            && !json.is_empty()
        {
            match serde_json::from_str::<PersistedSettings>(&json) {
                Ok(settings) => {
                    tracing::info!("Restored settings, reloading routes");
                    return settings.into_state(cli_args);
                }
                Err(e) => tracing::warn!("Ignoring unreadable persisted settings: {}", e),
            }
        }

        tracing::info!("No persisted settings found, starting fresh");
        AppState::new(cli_args)
    }

    /// Fit the map view to the bounding box of all loaded routes
    fn fit_to_bounds(&mut self) {
        if let Some((center_lat, center_lon, zoom)) = self.state.fit_view() {
            self.map_memory
                .center_at(walkers::lat_lon(center_lat, center_lon));
            let _ = self.map_memory.set_zoom(zoom);

            tracing::trace!(
                "Auto-zoomed to ({:.4}, {:.4}), zoom: {:.1}",
                center_lat,
                center_lon,
                zoom
            );
        }
    }

    /// Apply a route toggle requested by the map plugin last frame
    fn consume_clicked_route(&mut self) {
        let clicked = match self.clicked_route.write() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(name) = clicked {
            self.state.toggle_route(&name);
        }
    }
}

#[profiling::all_functions]
impl eframe::App for RunningRoutesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.show_help = !self.show_help;
            }
            if i.key_pressed(egui::Key::H) && i.modifiers.ctrl {
                self.show_help = !self.show_help;
            }
        });
        if ctx.input(|i| i.key_pressed(egui::Key::F5)) {
            self.state.reload();
        }

        if self.state.pending_fit_bounds {
            self.state.pending_fit_bounds = false;
            self.fit_to_bounds();
        }

        ui_panels::show_folder_picker(&mut self.state);

        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }

        // Side and bottom panels must be added before the central panel
        ui_panels::render_sidebar(ctx, &mut self.state);
        profile_plot::render_profile_panel(ctx, &self.state);

        let tiles_provider = self.state.ui_settings.tiles_provider;
        let attribution_text = tiles_provider.attribution();
        let route_plugin = RoutePlugin::new(&self.state, self.clicked_route.clone());

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(Some(tiles), &mut self.map_memory, self.home)
                    .with_plugin(route_plugin);

                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        self.consume_clicked_route();
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings::from_state(&self.state);

        match serde_json::to_string(&settings) {
            Ok(json) => {
                storage.set_string(STORAGE_KEY, json);
                tracing::debug!("Saved settings");
            }
            Err(e) => tracing::warn!("Failed to serialize settings: {}", e),
        }
    }
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

    fn routes_dir(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in files {
            fs::write(dir.path().join(name), RUN).unwrap();
        }
        dir
    }

    #[test]
    fn test_persisted_settings_restore_visibility() {
        let dir = routes_dir(&["a.gpx", "b.gpx"]);
        let settings = Settings {
            routes_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let mut state = AppState::new(&settings);
        state.toggle_route("b.gpx");
        state.ui_settings.tiles_provider = TilesProvider::OpenTopoMap;
        state.ui_settings.show_profile = false;

        let json = serde_json::to_string(&PersistedSettings::from_state(&state)).unwrap();
        let restored: PersistedSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, PersistedSettings::from_state(&state));

        let state = restored.into_state(&Settings::default());
        assert_eq!(state.routes_dir, dir.path());
        assert!(state.visibility.is_visible("a.gpx"));
        assert!(!state.visibility.is_visible("b.gpx"));
        assert_eq!(state.ui_settings.tiles_provider, TilesProvider::OpenTopoMap);
        assert!(!state.ui_settings.show_profile);
        assert_eq!(state.profiles.len(), 1);
    }

    #[test]
    fn test_cli_overrides_persisted_settings() {
        let saved_dir = routes_dir(&["a.gpx"]);
        let cli_dir = routes_dir(&["x.gpx", "y.gpx"]);

        let settings = Settings {
            routes_dir: Some(saved_dir.path().to_path_buf()),
            line_width: Some(8.0),
            ..Settings::default()
        };
        let persisted = PersistedSettings::from_state(&AppState::new(&settings));
        assert_eq!(persisted.line_width, 8.0);

        let cli_args = Settings {
            routes_dir: Some(cli_dir.path().to_path_buf()),
            colormap: Some(Colormap::Gnuplot),
            line_width: Some(3.0),
            ..Settings::default()
        };
        let state = persisted.into_state(&cli_args);

        assert_eq!(state.routes_dir, cli_dir.path());
        assert_eq!(state.library.len(), 2);
        assert_eq!(state.ui_settings.colormap, Colormap::Gnuplot);
        assert_eq!(state.ui_settings.line_width, 3.0);
        assert!(state.visibility.is_visible("x.gpx"));
    }

    #[test]
    fn test_saved_line_width_used_without_cli_flag() {
        let dir = routes_dir(&["a.gpx"]);
        let settings = Settings {
            routes_dir: Some(dir.path().to_path_buf()),
            line_width: Some(8.0),
            ..Settings::default()
        };
        let persisted = PersistedSettings::from_state(&AppState::new(&settings));

        let state = persisted.into_state(&Settings::default());
        assert_eq!(state.ui_settings.line_width, 8.0);
    }
}
