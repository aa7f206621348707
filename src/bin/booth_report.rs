//! Booth report - headless PDF export of the configured layout
//!
//! Usage:
//!   booth-report [--config config/dev.toml] [--summary] [--output reports/]
//!
//! Prints the path of the written report. With `--summary` an AI sales
//! summary is requested first and embedded in the report.

use booth_planner::infra::{logging, Config};
use booth_planner::io::{GeminiClient, GeminiConfig, PdfRenderer, ReportExporter};
use booth_planner::services::{LayoutStore, SummaryRequester};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "booth-report", version, about = "Export the booth layout and sales statistics as PDF")]
struct Args {
    /// Path to TOML configuration file (default: $CONFIG_FILE or config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Request an AI sales summary and include it in the report
    #[arg(long)]
    summary: bool,

    /// Output directory (overrides [report] output_dir)
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_stderr();
    let args = Args::parse();
    let config_path = Config::resolve_config_path(args.config.as_deref());

    let mut config = Config::load_from_path(&config_path);
    if let Some(dir) = args.output.as_deref() {
        config = config.with_report_output_dir(dir);
    }

    let store = LayoutStore::from_config(&config)?;

    let summary = if args.summary {
        let gemini = GeminiConfig::from_config(&config);
        if gemini.api_key.is_none() {
            warn!(env = %config.summary_api_key_env(), "summary_api_key_missing");
        }
        let requester = SummaryRequester::new(Arc::new(GeminiClient::new(gemini)?), config.summary_language());
        requester.request(store.booths(), store.sales_reps()).await
    } else {
        None
    };

    let exporter = ReportExporter::new(
        config.report_output_dir(),
        PdfRenderer::new(config.report_font_path().map(Into::into)),
    );
    match exporter.export(store.layout(), summary.as_deref())? {
        Some(path) => println!("{}", path.display()),
        None => info!(layout_id = %store.layout().id, "nothing_to_export"),
    }
    Ok(())
}
