//! Booth planner - terminal layout editor for exhibition booth sales
//!
//! Module structure:
//! - `domain/` - Booths, layouts, sales reps, status colors and seed data
//! - `services/` - Layout store, statistics, editor session, AI summary
//! - `io/` - External interfaces (Gemini API, PDF reports)
//! - `infra/` - Infrastructure (Config, logging)
//! - `ui/` - Terminal editor

use booth_planner::infra::{logging, Config};
use booth_planner::io::{GeminiClient, GeminiConfig, PdfRenderer, ReportExporter};
use booth_planner::services::{EditorSession, LayoutStore, SummaryRequester};
use booth_planner::ui::{self, App};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

/// Booth planner - exhibition booth layout and sales editor
#[derive(Parser, Debug)]
#[command(name = "booth-planner", version, about)]
struct Args {
    /// Path to TOML configuration file (default: $CONFIG_FILE or config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config_path = Config::resolve_config_path(args.config.as_deref());

    // The editor owns the terminal, so config errors are logged once the log file is open
    let (config, config_error) = match Config::from_file(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    logging::init_file(config.log_file())?;
    if let Some(e) = config_error {
        warn!(path = %config_path, error = %e, "config_load_failed_using_defaults");
    }

    info!(version = env!("CARGO_PKG_VERSION"), git_hash = env!("GIT_HASH"), "booth-planner starting");
    info!(
        config_file = %config.config_file(),
        seed_file = ?config.layout_seed_file(),
        summary_model = %config.summary_model(),
        summary_language = ?config.summary_language(),
        report_output_dir = %config.report_output_dir(),
        "config_loaded"
    );

    let store = LayoutStore::from_config(&config)?;
    let gemini = GeminiConfig::from_config(&config);
    if gemini.api_key.is_none() {
        warn!(env = %config.summary_api_key_env(), "summary_api_key_missing");
    }
    let requester = Arc::new(SummaryRequester::new(
        Arc::new(GeminiClient::new(gemini)?),
        config.summary_language(),
    ));
    let exporter = ReportExporter::new(
        config.report_output_dir(),
        PdfRenderer::new(config.report_font_path().map(Into::into)),
    );

    let app = App::new(EditorSession::new(store), requester, exporter);
    let result = ui::run(app).await;

    info!("booth-planner stopped");
    result
}
