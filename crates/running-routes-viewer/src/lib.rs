//! Running Routes - Application Library
//!
//! Ties the route library to an eframe window: a walkers map with every route drawn in
//! its color, a legend sidebar and an elevation chart.

mod app;

pub use app::RunningRoutesApp;

const APP_NAME: &str = "Running Routes";

/// Setup logging before anything else logs
///
/// `RUST_LOG` takes precedence over the default filter.
fn setup_logging() {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,wgpu_hal=warn,eframe=warn"));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter))
        .try_init();
}

/// Entry point for desktop platforms
pub fn run_native() -> eframe::Result {
    setup_logging();

    tracing::info!(
        "{} v{} starting",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title(APP_NAME),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(RunningRoutesApp::new(cc)))),
    )
}
