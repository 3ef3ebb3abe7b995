//! Walkers plugin for drawing routes on the map and picking them by click
//!
//! Visible routes are drawn in their colors; hidden routes are drawn as faint ghosts so
//! a click can bring them back. A click selects the nearest route line within a pixel
//! tolerance and reports its name back through a shared slot.

use crate::app::state::{AppState, to_color32};
use egui::{Color32, Pos2, Stroke};
use running_routes_lib::Route;
use std::sync::{Arc, RwLock};
use walkers::{Plugin, Projector};

/// Maximum distance in pixels between a click and a route line for it to count
pub const CLICK_TOLERANCE_PX: f32 = 8.0;

/// Alpha of hidden routes drawn as ghosts
const GHOST_ALPHA: u8 = 70;

/// Route name clicked during the last map frame
pub type ClickedRoute = Arc<RwLock<Option<String>>>;

/// One route prepared for drawing
struct RouteLine {
    route: Arc<Route>,
    color: Color32,
    visible: bool,
}

/// Plugin for rendering routes on the map
pub struct RoutePlugin {
    lines: Vec<RouteLine>,
    /// Line width for rendering routes
    width: f32,
    /// Whether to draw an outline under visible routes
    show_outline: bool,
    /// Whether to draw hidden routes at all
    show_ghosts: bool,
    /// Where a clicked route name is reported
    clicked: ClickedRoute,
}

impl RoutePlugin {
    /// Create a plugin from the current state
    pub fn new(state: &AppState, clicked: ClickedRoute) -> Self {
        let lines = state
            .library
            .routes()
            .iter()
            .map(|route| RouteLine {
                color: to_color32(route.color()),
                visible: state.visibility.is_visible(route.name()),
                route: route.clone(),
            })
            .collect();

        Self {
            lines,
            width: state.ui_settings.line_width,
            show_outline: state.ui_settings.show_outline,
            show_ghosts: state.ui_settings.show_hidden_ghosts,
            clicked,
        }
    }

    fn stroke_for(&self, line: &RouteLine) -> Stroke {
        if line.visible {
            Stroke::new(self.width, line.color)
        } else {
            let [r, g, b, _] = line.color.to_array();
            Stroke::new(
                (self.width * 0.5).max(1.0),
                Color32::from_rgba_unmultiplied(r, g, b, GHOST_ALPHA),
            )
        }
    }
}

impl Plugin for RoutePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RoutePlugin::run");

        let painter = ui.painter().with_clip_rect(response.rect);
        let viewport = viewport_bounds(projector, response.rect);
        let click_pos = if response.clicked() {
            response.interact_pointer_pos()
        } else {
            None
        };

        // Hidden routes first so visible routes are painted on top
        let mut order: Vec<&RouteLine> = self
            .lines
            .iter()
            .filter(|line| line.visible || self.show_ghosts)
            .collect();
        order.sort_by_key(|line| line.visible);

        let mut candidates: Vec<(usize, Vec<Pos2>)> = Vec::new();

        for (index, line) in order.iter().enumerate() {
            let on_screen = line
                .route
                .bounds()
                .is_some_and(|bounds| bounds_intersect(bounds, viewport));
            if !on_screen {
                continue;
            }

            let screen_points: Vec<Pos2> = line
                .route
                .track()
                .iter()
                .map(|point| {
                    let screen_vec = projector.project(walkers::lat_lon(
                        point.latitude(),
                        point.longitude(),
                    ));
                    Pos2::new(screen_vec.x, screen_vec.y)
                })
                .collect();

            if screen_points.len() >= 2 {
                if line.visible && self.show_outline {
                    let outline = Stroke::new(self.width + 2.0, Color32::from_white_alpha(160));
                    painter.add(egui::Shape::line(screen_points.clone(), outline));
                }
                painter.add(egui::Shape::line(
                    screen_points.clone(),
                    self.stroke_for(line),
                ));
            } else if let Some(&only) = screen_points.first() {
                painter.circle_filled(only, self.width, self.stroke_for(line).color);
            }

            if click_pos.is_some() {
                candidates.push((index, screen_points));
            }
        }

        if let Some(click) = click_pos {
            // Later entries are painted on top, so prefer them on ties
            candidates.reverse();
            if let Some(hit) = nearest_polyline(click, &candidates, CLICK_TOLERANCE_PX) {
                let name = order[hit].route.name().to_string();
                tracing::debug!("Clicked route {}", name);
                if let Ok(mut clicked) = self.clicked.write() {
                    *clicked = Some(name);
                }
            }
        }
    }
}

/// Geographic bounds `(min_lat, min_lon, max_lat, max_lon)` of the map viewport
fn viewport_bounds(projector: &Projector, rect: egui::Rect) -> (f64, f64, f64, f64) {
    let top_left = projector.unproject(egui::Vec2::new(rect.min.x, rect.min.y));
    let bottom_right = projector.unproject(egui::Vec2::new(rect.max.x, rect.max.y));
    (
        top_left.y().min(bottom_right.y()),
        top_left.x().min(bottom_right.x()),
        top_left.y().max(bottom_right.y()),
        top_left.x().max(bottom_right.x()),
    )
}

/// Whether two `(min_lat, min_lon, max_lat, max_lon)` boxes overlap
fn bounds_intersect(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> bool {
    a.0 <= b.2 && a.2 >= b.0 && a.1 <= b.3 && a.3 >= b.1
}

/// Distance in pixels from `p` to the segment `a`-`b`
fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Key of the polyline closest to `click`, if any lies within `tolerance`
///
/// On equal distance the first candidate wins.
fn nearest_polyline(click: Pos2, candidates: &[(usize, Vec<Pos2>)], tolerance: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (key, points) in candidates {
        let distance = match points.as_slice() {
            [] => continue,
            [only] => click.distance(*only),
            _ => points
                .windows(2)
                .map(|w| distance_to_segment(click, w[0], w[1]))
                .fold(f32::INFINITY, f32::min),
        };

        if distance <= tolerance && best.is_none_or(|(_, d)| distance < d) {
            best = Some((*key, distance));
        }
    }

    best.map(|(key, _)| key)
}
