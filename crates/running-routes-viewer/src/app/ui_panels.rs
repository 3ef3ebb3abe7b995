//! UI panels for the application
//!
//! The sidebar holds the route legend with its bulk visibility buttons, the collection
//! statistics and the display settings. The map itself is drawn in the central panel.

use crate::app::state::{AppState, TilesProvider, format_miles, to_color32};
use egui::{Color32, RichText, Ui};
use running_routes_lib::Colormap;

const ON_COLOR: Color32 = Color32::from_rgb(46, 160, 67);
const OFF_COLOR: Color32 = Color32::from_rgb(200, 55, 55);

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui
        .allocate_rect(button_rect, egui::Sense::click())
        .on_hover_text("Toggle sidebar");

    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the sidebar on the right of the map
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    egui::SidePanel::right("main_sidebar")
        .default_width(300.0)
        .min_width(260.0)
        .max_width(450.0)
        .resizable(true)
        .show(ctx, |ui| {
            profiling::scope!("sidebar");
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| render_sidebar_content(ui, state));
        });
}

fn render_sidebar_content(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Running Routes");
    ui.label(
        RichText::new(state.routes_dir.display().to_string())
            .small()
            .weak(),
    );
    ui.add_space(6.0);

    render_action_buttons(ui, state);

    ui.add_space(8.0);
    ui.separator();

    render_stats_section(ui, state);

    ui.add_space(8.0);
    ui.separator();

    render_errors_section(ui, state);
    render_legend(ui, state);

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    egui::CollapsingHeader::new(RichText::new("⚙ Settings").strong())
        .default_open(false)
        .show(ui, |ui| render_settings_section(ui, state));
}

fn render_action_buttons(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        let on = egui::Button::new(RichText::new("Turn On All Routes").color(Color32::WHITE))
            .fill(ON_COLOR);
        if ui.add(on).clicked() {
            state.show_all();
        }

        let off = egui::Button::new(RichText::new("Turn Off All Routes").color(Color32::WHITE))
            .fill(OFF_COLOR);
        if ui.add(off).clicked() {
            state.hide_all();
        }
    });

    ui.horizontal(|ui| {
        #[cfg(not(target_os = "android"))]
        if ui.button("📂 Open Folder...").clicked() {
            state.show_picker = true;
        }
        if ui.button("🔄 Reload").on_hover_text("F5").clicked() {
            state.reload();
        }
        if ui.button("🎯 Fit to Bounds").clicked() {
            state.pending_fit_bounds = true;
        }
    });
}

/// Render statistics section
fn render_stats_section(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new("📊 Statistics").strong());
    ui.add_space(4.0);

    let info = state.library.info();

    egui::Grid::new("stats_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Routes:");
            ui.label(
                RichText::new(format!(
                    "{} ({} shown)",
                    info.route_count,
                    state.visibility.visible_count()
                ))
                .strong(),
            );
            ui.end_row();

            ui.label("Total Points:");
            ui.label(RichText::new(state.format_points()).strong());
            ui.end_row();

            ui.label("Distance:");
            ui.label(RichText::new(state.format_distance()).strong());
            ui.end_row();

            if info.failed_count > 0 {
                ui.label("Failed:");
                ui.label(RichText::new(info.failed_count.to_string()).color(Color32::RED));
                ui.end_row();
            }
        });
}

fn render_errors_section(ui: &mut Ui, state: &AppState) {
    if let Some(error) = &state.load_error {
        ui.label(RichText::new(format!("⚠ {}", error)).color(Color32::RED));
        ui.add_space(8.0);
        ui.separator();
    }

    let failures = state.library.failures();
    if failures.is_empty() {
        return;
    }

    ui.label(
        RichText::new(format!("⚠ Errors ({} files)", failures.len()))
            .strong()
            .color(Color32::RED),
    );
    ui.add_space(4.0);

    egui::ScrollArea::vertical()
        .id_salt("errors_scroll")
        .max_height(100.0)
        .show(ui, |ui| {
            for failure in failures {
                ui.label(
                    RichText::new(format!("• {}: {}", failure.name, failure.error))
                        .small()
                        .color(Color32::RED),
                );
            }
        });

    ui.add_space(8.0);
    ui.separator();
}

/// One legend row per route: checkbox, color swatch, label and distance
fn render_legend(ui: &mut Ui, state: &mut AppState) {
    if state.library.is_empty() {
        ui.label(RichText::new("No routes loaded").weak());
        return;
    }

    let mut changes: Vec<(String, bool)> = Vec::new();

    egui::ScrollArea::vertical()
        .id_salt("legend_scroll")
        .max_height(ui.available_height().max(120.0))
        .show(ui, |ui| {
            for route in state.library.routes() {
                let color = to_color32(route.color());
                let mut visible = state.visibility.is_visible(route.name());

                ui.horizontal(|ui| {
                    if ui.checkbox(&mut visible, "").changed() {
                        changes.push((route.name().to_string(), visible));
                    }

                    let (swatch, _) =
                        ui.allocate_exact_size(egui::vec2(18.0, 10.0), egui::Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, color);

                    let text = RichText::new(route.label()).color(color);
                    let text = if visible { text.strong() } else { text.weak() };
                    let response = ui
                        .add(egui::Label::new(text).sense(egui::Sense::click()))
                        .on_hover_text(format!(
                            "{}\nAscent: {:.0} ft",
                            route.path().display(),
                            route.profile().gain_ft()
                        ));
                    if response.clicked() {
                        changes.push((route.name().to_string(), !visible));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(format_miles(route.total_distance())).small());
                    });
                });
            }
        });

    for (name, visible) in changes {
        state.set_route_visible(&name, visible);
    }
}

fn render_settings_section(ui: &mut Ui, state: &mut AppState) {
    egui::Grid::new("appearance_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Line Width:");
            ui.add(
                egui::Slider::new(&mut state.ui_settings.line_width, 0.5..=12.0)
                    .suffix(" px")
                    .step_by(0.5),
            );
            ui.end_row();

            ui.label("Show Outline:");
            ui.checkbox(&mut state.ui_settings.show_outline, "Light border under routes");
            ui.end_row();

            ui.label("Hidden Routes:");
            ui.checkbox(
                &mut state.ui_settings.show_hidden_ghosts,
                "Draw faintly (click to show)",
            );
            ui.end_row();

            ui.label("Elevation Chart:");
            ui.checkbox(&mut state.ui_settings.show_profile, "Show");
            ui.end_row();

            ui.label("Colormap:");
            let mut colormap = state.ui_settings.colormap;
            egui::ComboBox::from_id_salt("colormap_combo")
                .selected_text(colormap.name())
                .show_ui(ui, |ui| {
                    for option in Colormap::all() {
                        ui.selectable_value(&mut colormap, *option, option.name());
                    }
                });
            if colormap != state.ui_settings.colormap {
                state.set_colormap(colormap);
            }
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(4.0);

    for provider in TilesProvider::all() {
        let selected = state.ui_settings.tiles_provider == *provider;
        if ui.selectable_label(selected, provider.name()).clicked() {
            state.ui_settings.tiles_provider = *provider;
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(state.ui_settings.tiles_provider.attribution())
            .small()
            .italics()
            .weak(),
    );
}

/// Show folder picker dialog
#[cfg(not(target_os = "android"))]
pub fn show_folder_picker(state: &mut AppState) {
    if state.show_picker {
        state.show_picker = false;

        if let Some(dir) = rfd::FileDialog::new()
            .set_title("Select Routes Folder")
            .set_directory(&state.routes_dir)
            .pick_folder()
        {
            state.set_routes_dir(dir);
        }
    }
}

#[cfg(target_os = "android")]
pub fn show_folder_picker(state: &mut AppState) {
    state.show_picker = false;
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Running Routes");
            ui.add_space(8.0);

            ui.label("Every .gpx file in the routes folder is drawn in its own color.");
            ui.add_space(12.0);

            ui.label(RichText::new("Routes").strong());
            ui.label("• Click a route on the map to hide or show it");
            ui.label("• Use the legend checkboxes or the On/Off buttons");
            ui.label("• 'Open Folder...' loads another routes folder");
            ui.add_space(8.0);

            ui.label(RichText::new("Navigation").strong());
            ui.label("• Scroll wheel to zoom");
            ui.label("• Click and drag to pan");
            ui.label("• 'Fit to Bounds' to see all routes");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.label("• F5 - Reload routes folder");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}
