//! Elevation chart panel
//!
//! One line per visible route, distance along the route in miles against elevation in
//! feet, in the route's map color.

use crate::app::state::{AppState, to_color32};
use egui::{RichText, Ui};
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints};
use running_routes_lib::{ElevationProfile, ProfileSeries};

pub const X_AXIS_LABEL: &str = "Distance [mi]";
pub const Y_AXIS_LABEL: &str = "Elevation [feet]";

/// Render the elevation chart as a resizable bottom panel
pub fn render_profile_panel(ctx: &egui::Context, state: &AppState) {
    if !state.ui_settings.show_profile {
        return;
    }

    egui::TopBottomPanel::bottom("elevation_profile")
        .default_height(220.0)
        .min_height(120.0)
        .max_height(ctx.viewport_rect().height() * 0.5)
        .resizable(true)
        .show(ctx, |ui| {
            profiling::scope!("profile_panel");
            render_profile_chart(ui, &state.profiles);
        });
}

fn render_profile_chart(ui: &mut Ui, profiles: &[ProfileSeries]) {
    let charted: Vec<(&ProfileSeries, Vec<[f64; 2]>)> = profiles
        .iter()
        .map(|series| (series, chart_points(series.profile())))
        .filter(|(_, points)| !points.is_empty())
        .collect();

    if charted.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label(RichText::new("No visible routes with elevation data").weak());
        });
        return;
    }

    Plot::new("elevation_profile_plot")
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_label(X_AXIS_LABEL)
        .y_axis_label(Y_AXIS_LABEL)
        .include_x(0.0)
        .allow_scroll(false)
        .label_formatter(|name, value| {
            if name.is_empty() {
                format!("{:.2} mi\n{:.0} ft", value.x, value.y)
            } else {
                format!("{}\n{:.2} mi\n{:.0} ft", name, value.x, value.y)
            }
        })
        .show(ui, |plot_ui| {
            for (series, points) in charted {
                let line = Line::new(series.label(), PlotPoints::from(points))
                    .color(to_color32(series.color()))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

/// Chart samples of one profile as `[miles, feet]`
///
/// Points without elevation are left out; the line joins their neighbours.
pub fn chart_points(profile: &ElevationProfile) -> Vec<[f64; 2]> {
    profile.samples().map(|(miles, feet)| [miles, feet]).collect()
}
