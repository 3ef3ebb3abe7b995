use clap::Parser;
use running_routes_lib::Colormap;
use std::path::PathBuf;

/// Directory scanned when neither the command line nor persisted settings name one
pub const DEFAULT_ROUTES_DIR: &str = "data";

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Running Routes - An interactive map and elevation-profile viewer for a GPX route collection
pub struct Settings {
    /// Directory containing the .gpx route files [default: ./data]
    #[clap(short, long, value_name = "DIR")]
    pub routes_dir: Option<PathBuf>,

    /// Colormap used to color routes in sorted file order (gnuplot2, gnuplot)
    #[clap(short, long)]
    pub colormap: Option<Colormap>,

    /// Route line width in pixels [default: 5.0, or the last used width]
    #[clap(long, value_name = "PX")]
    pub line_width: Option<f32>,

    /// Initial map center latitude
    #[clap(long, default_value = "37.87754", allow_negative_numbers = true)]
    pub center_lat: f64,

    /// Initial map center longitude
    #[clap(long, default_value = "-122.276", allow_negative_numbers = true)]
    pub center_lon: f64,

    /// Initial map zoom level
    #[clap(long, default_value = "14")]
    pub zoom: f64,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::parse_from(["running-routes"])
    }
}
