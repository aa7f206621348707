//! End-to-end tests: edit a layout, summarize it, export it

use async_trait::async_trait;
use booth_planner::domain::seed;
use booth_planner::domain::types::{BoothId, BoothStatus};
use booth_planner::io::{GeminiClient, GeminiConfig, PdfRenderer, ReportExporter};
use booth_planner::services::{
    EditorField, EditorSession, LayoutStore, SummaryLanguage, SummaryRequester, TextGenerator,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session() -> EditorSession {
    EditorSession::new(LayoutStore::new(seed::layout(1_000), seed::sales_reps()))
}

fn gemini(base_url: &str) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_key: Some("test-key".to_string()),
        base_url: base_url.to_string(),
        model: "gemini-test".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

/// Records the prompt it was given
struct CapturingGenerator(std::sync::Mutex<Option<String>>);

#[async_trait]
impl TextGenerator for CapturingGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        *self.0.lock().unwrap() = Some(prompt.to_string());
        Ok("Occupancy is healthy.".to_string())
    }
}

#[test]
fn test_sales_edits_update_stats() {
    let mut session = session();
    for (id, rep) in [("A-1", "sr1"), ("A-2", "sr1"), ("B-1", "sr2"), ("B-2", "sr3"), ("C-1", "sr4")] {
        session.select(&BoothId::new(id));
        session.set_status(BoothStatus::Sold).unwrap();
        session.edit(EditorField::SalesRep, rep).unwrap();
    }
    session.select(&BoothId::new("C-2"));
    session.set_status(BoothStatus::Negotiating).unwrap();

    let stats = session.stats();
    assert_eq!(stats.total, 22);
    assert_eq!(stats.sold, 5);
    assert_eq!(stats.negotiating, 1);
    assert_eq!(stats.available, 16);
    assert_eq!(stats.occupancy_display(), "22.7");
}

#[test]
fn test_design_edits_then_export() {
    let dir = tempdir().unwrap();
    let mut session = session();
    session.toggle_design_mode();

    let id = session.create_booth().unwrap();
    session.edit(EditorField::X, "600").unwrap();
    session.edit(EditorField::Label, "Stage").unwrap();
    session.delete_booth(&BoothId::new("C-8"), |booth| booth.is_some()).unwrap();

    let booth = session.store().booth(&id).unwrap();
    assert_eq!(booth.x, 600.0);
    assert_eq!(booth.label, "Stage");
    assert_eq!(session.store().booths().len(), 22);

    let exporter = ReportExporter::new(dir.path(), PdfRenderer::new(None));
    let path = exporter
        .export_at(session.store().layout(), None, 1_700_000_000_000)
        .unwrap()
        .unwrap();

    assert_eq!(path.file_name().unwrap(), "exhibition-layout-1700000000000.pdf");
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_export_without_surface_writes_nothing() {
    let dir = tempdir().unwrap();
    let mut layout = seed::layout(0);
    layout.width = 0.0;

    let exporter = ReportExporter::new(dir.path().join("reports"), PdfRenderer::new(None));
    assert_eq!(exporter.export(&layout, Some("ignored")).unwrap(), None);
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn test_summary_prompt_reflects_current_state() {
    let mut session = session();
    session.select(&BoothId::new("A-1"));
    session.set_status(BoothStatus::Sold).unwrap();
    session.edit(EditorField::SalesRep, "sr2").unwrap();

    let generator = Arc::new(CapturingGenerator(std::sync::Mutex::new(None)));
    let requester = SummaryRequester::new(generator.clone(), SummaryLanguage::En);
    let text = requester
        .request(session.store().booths(), session.store().sales_reps())
        .await;

    assert_eq!(text.as_deref(), Some("Occupancy is healthy."));
    let prompt = generator.0.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("Total Booths: 22"));
    assert!(prompt.contains("Sold Booths: 1"));
    assert!(prompt.contains("Occupancy: 4.5%"));
    assert!(prompt.contains(r#"{"name":"佐藤 花子","count":1}"#));
}

#[tokio::test]
async fn test_gemini_summary_into_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Row A leads sales; push row C."}]}}]
        })))
        .mount(&server)
        .await;

    let session = session();
    let requester = SummaryRequester::new(Arc::new(gemini(&server.uri())), SummaryLanguage::En);
    let summary = requester
        .request(session.store().booths(), session.store().sales_reps())
        .await
        .unwrap();
    assert_eq!(summary, "Row A leads sales; push row C.");

    let dir = tempdir().unwrap();
    let exporter = ReportExporter::new(dir.path(), PdfRenderer::new(None));
    let path = exporter.export(session.store().layout(), Some(&summary)).unwrap();
    assert!(path.is_some_and(|p| p.exists()));
}

#[tokio::test]
async fn test_gemini_failure_yields_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let session = session();
    let requester = SummaryRequester::new(Arc::new(gemini(&server.uri())), SummaryLanguage::Ja);
    let summary = requester
        .request(session.store().booths(), session.store().sales_reps())
        .await;

    assert_eq!(summary.as_deref(), Some("分析データの取得に失敗しました。"));
    assert!(!requester.is_busy());
}
