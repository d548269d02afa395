//! Cardioform: heart disease risk assessment
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardioform::adapters::sanitize::SanitizingMakeWriter;
use cardioform::adapters::{JsonArtifactSource, PdfReportRenderer};
use cardioform::application::PredictionService;
use cardioform::config::AppConfig;
use cardioform::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Logs on the terminal would corrupt the alternate screen, so an
    // interactive session logs to a file by default.
    let use_file = config.log_mode.use_file(std::io::stdout().is_terminal());

    let (writer, _guard) = if use_file {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces on open below.
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Cannot open log file {:?}", config.log_file))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting Cardioform...");

    // Refuse to start without valid parameters.
    let source = JsonArtifactSource::new(&config.artifact_dir, config.integrity_policy());
    let service = PredictionService::from_source(&source, PdfReportRenderer::new())
        .with_context(|| format!("Failed to load model artifacts from {:?}", config.artifact_dir))?;

    let mut app = App::new(service, config.report_dir.clone());
    app.run()?;

    tracing::info!("Cardioform shutdown complete.");
    Ok(())
}
