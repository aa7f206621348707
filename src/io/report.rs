//! PDF report export
//!
//! The exporter turns the current layout (and optionally the last AI summary)
//! into a `Report` model, then hands it to a `DocumentRenderer`:
//! - page 1: layout name and the floor plan drawn as status-colored rectangles
//! - page 2: sales statistics and the wrapped AI summary (continued on further
//!   pages if it does not fit)
//!
//! Output files are named `exhibition-layout-{epoch_ms}.pdf`.

use crate::domain::palette::{self, Rgb};
use crate::domain::types::{epoch_ms, BoothStatus, ExhibitionLayout};
use crate::services::stats::{deal_value_total, BoothStats};
use anyhow::{anyhow, Context};
use chrono::TimeZone;
use printpdf::path::PaintMode;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect};
use std::borrow::Cow;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthChar;

// A4 landscape, millimetres
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 10.0;
const PLAN_TOP_MM: f32 = 20.0;

const TITLE_PT: f32 = 18.0;
const BODY_PT: f32 = 12.0;
const LABEL_PT: f32 = 7.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const PT_TO_MM: f32 = 0.3528;

/// Width of one display column of body text (half an em)
const BODY_COLUMN_MM: f32 = BODY_PT * PT_TO_MM * 0.5;

pub const STATS_TITLE: &str = "Sales Statistics Report";
pub const SUMMARY_HEADING: &str = "AI summary:";

/// One booth as drawn on the floor plan page, in layout units
#[derive(Debug, Clone, PartialEq)]
pub struct PlanShape {
    pub label: String,
    pub company: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Rgb,
    pub border: Rgb,
    pub text: Rgb,
}

/// Snapshot of the layout's visual surface
#[derive(Debug, Clone, PartialEq)]
pub struct FloorPlan {
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<PlanShape>,
}

impl FloorPlan {
    /// Capture the drawable surface. `None` when the canvas has no positive area.
    pub fn capture(layout: &ExhibitionLayout) -> Option<Self> {
        if !layout.has_surface() {
            return None;
        }
        let shapes = layout
            .booths
            .iter()
            .map(|booth| PlanShape {
                label: booth.label.clone(),
                company: booth.short_company_name(),
                // Negative sizes are drawn from the other corner
                x: booth.x.min(booth.x + booth.width),
                y: booth.y.min(booth.y + booth.height),
                width: booth.width.abs(),
                height: booth.height.abs(),
                fill: palette::fill(booth.status),
                border: palette::border(booth.status),
                text: palette::label_text(booth.status),
            })
            .collect();
        Some(Self { width: layout.width, height: layout.height, shapes })
    }
}

/// Everything needed to render the report, independent of the output format
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub plan: FloorPlan,
    pub stats_lines: Vec<String>,
    /// Summary text already wrapped to the page width
    pub summary_lines: Option<Vec<String>>,
}

impl Report {
    pub fn build(layout: &ExhibitionLayout, summary: Option<&str>, now_ms: u64) -> Option<Self> {
        let plan = FloorPlan::capture(layout)?;
        let stats = BoothStats::from_booths(&layout.booths);

        let mut stats_lines = vec![
            format!("Total booths: {}", stats.total),
            format!("Sold: {}", stats.sold),
            format!("Occupancy: {}%", stats.occupancy_display()),
            format!(
                "Negotiating: {}  Reserved: {}  Available: {}",
                stats.negotiating, stats.reserved, stats.available
            ),
            format!(
                "Deal value (10k JPY): sold {}  negotiating {}",
                deal_value_total(&layout.booths, BoothStatus::Sold),
                deal_value_total(&layout.booths, BoothStatus::Negotiating)
            ),
        ];
        if let Some(generated) = chrono::Local.timestamp_millis_opt(now_ms as i64).single() {
            stats_lines.push(format!("Generated: {}", generated.format("%Y-%m-%d %H:%M")));
        }

        let summary_lines = summary
            .filter(|text| !text.trim().is_empty())
            .map(|text| wrap_text(text, body_columns()));

        Some(Self { title: layout.name.clone(), plan, stats_lines, summary_lines })
    }
}

/// Number of body-text columns that fit between the page margins
fn body_columns() -> usize {
    ((PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / BODY_COLUMN_MM) as usize
}

/// Greedy word wrap by display width. Wide (CJK) characters may break anywhere;
/// other text breaks at whitespace unless a single word exceeds the line.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut width = 0usize;
        let mut pending_space = false;

        for token in tokenize(paragraph) {
            if token == " " {
                pending_space = !line.is_empty();
                continue;
            }
            let token_width = display_width(&token);
            let space = usize::from(pending_space);

            if !line.is_empty() && width + space + token_width > columns {
                lines.push(std::mem::take(&mut line));
                width = 0;
            } else if pending_space {
                line.push(' ');
                width += 1;
            }
            pending_space = false;

            if token_width <= columns - width {
                line.push_str(&token);
                width += token_width;
                continue;
            }

            // Word longer than a full line: hard break by character
            for ch in token.chars() {
                let w = ch.width().unwrap_or(0);
                if width + w > columns && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    width = 0;
                }
                line.push(ch);
                width += w;
            }
        }
        lines.push(line);
    }
    lines
}

/// Split into words, single spaces and individual wide characters
fn tokenize(paragraph: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for ch in paragraph.chars() {
        if ch.is_whitespace() || ch.width().unwrap_or(0) > 1 {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            tokens.push(if ch.is_whitespace() { " ".to_string() } else { ch.to_string() });
        } else {
            word.push(ch);
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Output format of an exported report
pub trait DocumentRenderer {
    fn render(&self, report: &Report, path: &Path) -> anyhow::Result<()>;

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

/// Writes reports as A4 landscape PDF documents
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    /// TrueType font for non-Latin text; Helvetica is used when unset
    font_path: Option<PathBuf>,
}

impl PdfRenderer {
    pub fn new(font_path: Option<PathBuf>) -> Self {
        Self { font_path }
    }

    fn uses_builtin_font(&self) -> bool {
        self.font_path.is_none()
    }

    /// Characters of `report` this renderer cannot draw. Always 0 with an external font.
    pub fn missing_glyphs(&self, report: &Report) -> usize {
        if !self.uses_builtin_font() {
            return 0;
        }
        report_text(report).map(|text| text.chars().filter(|c| !is_win_ansi(*c)).count()).sum()
    }
}

/// Every string the renderer prints
fn report_text(report: &Report) -> impl Iterator<Item = &str> {
    let labels = report
        .plan
        .shapes
        .iter()
        .flat_map(|shape| std::iter::once(shape.label.as_str()).chain(shape.company.as_deref()));
    std::iter::once(report.title.as_str())
        .chain(labels)
        .chain(report.stats_lines.iter().map(String::as_str))
        .chain(report.summary_lines.iter().flatten().map(String::as_str))
}

/// Whether the builtin fonts' WinAnsi encoding has a glyph for `c`
fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}')
        || "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ".contains(c)
}

/// Text as drawn with a builtin font: characters outside WinAnsi become `?`
/// instead of silently disappearing
pub fn to_win_ansi(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_win_ansi) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().map(|c| if is_win_ansi(c) { c } else { '?' }).collect())
    }
}

fn pdf_error(e: printpdf::Error) -> anyhow::Error {
    anyhow!("PDF rendering failed: {e:?}")
}

fn pdf_color(rgb: Rgb) -> Color {
    let (r, g, b) = rgb.unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

/// Distance from the top edge to PDF's bottom-left based y
fn from_top(mm: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - mm)
}

fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    display_width(text) as f32 * size_pt * PT_TO_MM * 0.5
}

fn encode(text: &str, builtin: bool) -> Cow<'_, str> {
    if builtin {
        to_win_ansi(text)
    } else {
        Cow::Borrowed(text)
    }
}

fn draw_plan(layer: &PdfLayerReference, plan: &FloorPlan, font: &IndirectFontRef, builtin: bool) {
    let avail_w = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) as f64;
    let avail_h = (PAGE_HEIGHT_MM - PLAN_TOP_MM - MARGIN_MM) as f64;
    let scale = (avail_w / plan.width).min(avail_h / plan.height);

    // Canvas outline
    layer.set_outline_color(pdf_color(palette::border(BoothStatus::Available)));
    layer.set_outline_thickness(0.5);
    layer.add_rect(
        Rect::new(
            Mm(MARGIN_MM),
            from_top(PLAN_TOP_MM + (plan.height * scale) as f32),
            Mm(MARGIN_MM + (plan.width * scale) as f32),
            from_top(PLAN_TOP_MM),
        )
        .with_mode(PaintMode::Stroke),
    );

    for shape in &plan.shapes {
        if shape.width <= 0.0 || shape.height <= 0.0 {
            continue;
        }
        let left = MARGIN_MM + (shape.x * scale) as f32;
        let top = PLAN_TOP_MM + (shape.y * scale) as f32;
        let right = left + (shape.width * scale) as f32;
        let bottom = top + (shape.height * scale) as f32;

        layer.set_fill_color(pdf_color(shape.fill));
        layer.set_outline_color(pdf_color(shape.border));
        layer.set_outline_thickness(1.0);
        layer.add_rect(
            Rect::new(Mm(left), from_top(bottom), Mm(right), from_top(top))
                .with_mode(PaintMode::FillStroke),
        );

        let center_x = (left + right) / 2.0;
        let center_y = (top + bottom) / 2.0;
        layer.set_fill_color(pdf_color(shape.text));
        let label = encode(&shape.label, builtin);
        layer.use_text(
            label.as_ref(),
            LABEL_PT,
            Mm(center_x - text_width_mm(&label, LABEL_PT) / 2.0),
            from_top(center_y),
            font,
        );
        if let Some(company) = &shape.company {
            let company = encode(company, builtin);
            layer.use_text(
                company.as_ref(),
                LABEL_PT - 1.0,
                Mm(center_x - text_width_mm(&company, LABEL_PT - 1.0) / 2.0),
                from_top(center_y + 4.0),
                font,
            );
        }
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, report: &Report, path: &Path) -> anyhow::Result<()> {
        let (doc, page, layer) = PdfDocument::new(
            report.title.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "floor plan",
        );
        let font = match &self.font_path {
            Some(font_path) => {
                let file = File::open(font_path)
                    .with_context(|| format!("Failed to open font {}", font_path.display()))?;
                doc.add_external_font(file).map_err(pdf_error)?
            }
            None => doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
        };
        let builtin = self.uses_builtin_font();
        let missing = self.missing_glyphs(report);
        if missing > 0 {
            warn!(
                missing_glyphs = missing,
                hint = "set [report] font_path to a TrueType font with CJK glyphs",
                "report_font_lacks_glyphs"
            );
        }
        let black = pdf_color(Rgb(0, 0, 0));

        // Page 1: title and floor plan
        let plan_layer = doc.get_page(page).get_layer(layer);
        plan_layer.set_fill_color(black.clone());
        plan_layer.use_text(encode(&report.title, builtin), TITLE_PT, Mm(MARGIN_MM), from_top(15.0), &font);
        draw_plan(&plan_layer, &report.plan, &font, builtin);

        // Page 2: statistics and summary
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "statistics");
        let mut text_layer = doc.get_page(page).get_layer(layer);
        text_layer.set_fill_color(black.clone());
        text_layer.use_text(STATS_TITLE, TITLE_PT, Mm(MARGIN_MM), from_top(15.0), &font);

        let mut y = 30.0;
        for line in &report.stats_lines {
            text_layer.use_text(encode(line, builtin), BODY_PT, Mm(MARGIN_MM), from_top(y), &font);
            y += 10.0;
        }

        if let Some(summary) = &report.summary_lines {
            y += 10.0;
            text_layer.use_text(SUMMARY_HEADING, BODY_PT, Mm(MARGIN_MM), from_top(y), &font);
            y += 10.0;
            for line in summary {
                if y > PAGE_HEIGHT_MM - MARGIN_MM {
                    let (page, layer) =
                        doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "summary");
                    text_layer = doc.get_page(page).get_layer(layer);
                    text_layer.set_fill_color(black.clone());
                    y = 15.0;
                }
                text_layer.use_text(encode(line, builtin), BODY_PT, Mm(MARGIN_MM), from_top(y), &font);
                y += LINE_HEIGHT_MM;
            }
        }

        let bytes = doc.save_to_bytes().map_err(pdf_error)?;
        fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Builds reports from the current layout and writes them into `output_dir`
pub struct ReportExporter<R: DocumentRenderer = PdfRenderer> {
    output_dir: PathBuf,
    renderer: R,
}

impl<R: DocumentRenderer> ReportExporter<R> {
    pub fn new(output_dir: impl Into<PathBuf>, renderer: R) -> Self {
        Self { output_dir: output_dir.into(), renderer }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Export the layout now. See `export_at`.
    pub fn export(&self, layout: &ExhibitionLayout, summary: Option<&str>) -> anyhow::Result<Option<PathBuf>> {
        self.export_at(layout, summary, epoch_ms())
    }

    /// Export the layout with `now_ms` as the file timestamp.
    ///
    /// Returns `Ok(None)` without writing anything when the layout has no drawable surface.
    pub fn export_at(
        &self,
        layout: &ExhibitionLayout,
        summary: Option<&str>,
        now_ms: u64,
    ) -> anyhow::Result<Option<PathBuf>> {
        let Some(report) = Report::build(layout, summary, now_ms) else {
            debug!(layout_id = %layout.id, "report_export_skipped_no_surface");
            return Ok(None);
        };

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create report directory {}", self.output_dir.display())
        })?;
        let path = self
            .output_dir
            .join(format!("exhibition-layout-{}.{}", now_ms, self.renderer.extension()));

        self.renderer.render(&report, &path)?;
        info!(
            path = %path.display(),
            booths = layout.booths.len(),
            with_summary = report.summary_lines.is_some(),
            "report_exported"
        );
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Keeps rendered reports in memory and writes a marker file
    #[derive(Default)]
    struct RecordingRenderer {
        reports: Mutex<Vec<Report>>,
    }

    impl DocumentRenderer for RecordingRenderer {
        fn render(&self, report: &Report, path: &Path) -> anyhow::Result<()> {
            self.reports.lock().unwrap().push(report.clone());
            fs::write(path, b"report")?;
            Ok(())
        }
    }

    #[test]
    fn test_report_for_empty_layout() {
        let mut layout = seed::layout(0);
        layout.booths.clear();

        let report = Report::build(&layout, None, 0).unwrap();
        assert_eq!(report.stats_lines[0], "Total booths: 0");
        assert_eq!(report.stats_lines[2], "Occupancy: 0.0%");
        assert!(report.stats_lines.iter().all(|l| !l.contains("NaN")));
        assert_eq!(report.stats_lines[4], "Deal value (10k JPY): sold 0  negotiating 0");
        assert!(report.plan.shapes.is_empty());
    }

    #[test]
    fn test_report_statistics() {
        let mut layout = seed::layout(0);
        for booth in layout.booths.iter_mut().take(11) {
            booth.status = BoothStatus::Sold;
        }
        layout.booths[0].deal_value = Some(120.0);
        layout.booths[21].status = BoothStatus::Negotiating;
        layout.booths[21].deal_value = Some(35.5);
        let report = Report::build(&layout, Some("Good quarter."), 0).unwrap();
        assert_eq!(report.title, seed::SEED_LAYOUT_NAME);
        assert_eq!(report.stats_lines[0], "Total booths: 22");
        assert_eq!(report.stats_lines[1], "Sold: 11");
        assert_eq!(report.stats_lines[2], "Occupancy: 50.0%");
        assert_eq!(report.stats_lines[4], "Deal value (10k JPY): sold 120  negotiating 35.5");
        assert_eq!(report.summary_lines, Some(vec!["Good quarter.".to_string()]));
        assert_eq!(report.plan.shapes.len(), 22);
        assert_eq!(report.plan.shapes[0].fill, palette::fill(BoothStatus::Sold));
    }

    #[test]
    fn test_blank_summary_is_omitted() {
        let report = Report::build(&seed::layout(0), Some("  \n"), 0).unwrap();
        assert_eq!(report.summary_lines, None);
    }

    #[test]
    fn test_no_surface_is_silent_noop() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("reports");
        let exporter = ReportExporter::new(&out, RecordingRenderer::default());

        let mut layout = seed::layout(0);
        layout.width = 0.0;

        assert_eq!(exporter.export_at(&layout, None, 1).unwrap(), None);
        assert!(exporter.renderer().reports.lock().unwrap().is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn test_export_file_name_uses_timestamp() {
        let dir = tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path().join("nested"), RecordingRenderer::default());

        let path = exporter.export_at(&seed::layout(0), None, 1_700_000_000_123).unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), "exhibition-layout-1700000000123.pdf");
        assert!(path.exists());

        // A second export with a later timestamp does not collide
        let second = exporter.export_at(&seed::layout(0), None, 1_700_000_000_124).unwrap().unwrap();
        assert_ne!(path, second);
        assert_eq!(exporter.renderer().reports.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_negative_size_is_normalized() {
        let mut layout = seed::layout(0);
        layout.booths[0].width = -40.0;
        let plan = FloorPlan::capture(&layout).unwrap();
        assert_eq!(plan.shapes[0].x, 10.0);
        assert_eq!(plan.shapes[0].width, 40.0);
    }

    #[test]
    fn test_wrap_text_ascii() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
    }

    #[test]
    fn test_wrap_text_wide_chars() {
        // Each CJK character is two columns wide
        let lines = wrap_text("成約率が向上しています", 8);
        assert_eq!(lines, vec!["成約率が", "向上して", "います"]);
    }

    #[test]
    fn test_wrap_text_long_word_and_paragraphs() {
        let lines = wrap_text("abcdefghij\n\nok", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "", "ok"]);
    }

    #[test]
    fn test_pdf_renderer_writes_document() {
        let dir = tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path(), PdfRenderer::default());

        let mut layout = seed::layout(0);
        layout.name = "Main Hall 2024".to_string();
        layout.booths[0].status = BoothStatus::Sold;
        layout.booths[0].company_name = Some("Acme".to_string());
        let summary = "Sales are on track. ".repeat(200);

        let path = exporter.export_at(&layout, Some(&summary), 42).unwrap().unwrap();
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_to_win_ansi_replaces_unencodable_chars() {
        assert_eq!(to_win_ansi("分析 OK"), "?? OK");
        assert_eq!(to_win_ansi("Café – 100€"), "Café – 100€");
        assert!(matches!(to_win_ansi("A-1"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_missing_glyphs_only_with_builtin_font() {
        let report = Report::build(&seed::layout(0), Some("会場の稼働率は良好です。"), 0).unwrap();

        assert!(PdfRenderer::default().missing_glyphs(&report) >= 12);
        assert_eq!(PdfRenderer::new(Some(PathBuf::from("NotoSansJP.ttf"))).missing_glyphs(&report), 0);
    }

    #[test]
    fn test_japanese_summary_with_builtin_font() {
        let dir = tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path(), PdfRenderer::default());

        let mut layout = seed::layout(0);
        layout.name = "東京ビッグサイト 展示会".to_string();
        let summary = "成約率は50%です。B列の交渉中ブースを優先してください。";

        let path = exporter.export_at(&layout, Some(summary), 7).unwrap().unwrap();
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
