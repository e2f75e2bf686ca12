mod app;
mod asset;
mod form;
mod model;
mod raster;
mod session;

use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "QR Placement",
        native_options,
        Box::new(|cc| Ok(Box::new(app::PlacementApp::new(cc)))),
    )
}
