mod analysis;
mod app;
mod audio;
mod processing;
mod session;
mod types;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = eframe::NativeOptions::default();
    let app = app::PitchApp::new()?;
    if let Err(err) = eframe::run_native("Voice Pitch", options, Box::new(|_| Box::new(app))) {
        return Err(anyhow::anyhow!(err.to_string()));
    }
    Ok(())
}
