//! Screen layout and panels

use crate::domain::palette;
use crate::domain::types::BoothStatus;
use crate::services::session::EditorField;
use crate::services::stats::{sales_by_rep, BoothStats};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::App;
use super::canvas::{self, Projection};

const SIDEBAR_WIDTH: u16 = 42;

/// Draw the whole screen; returns the floor plan projection for hit testing
pub fn draw_ui(f: &mut Frame, app: &App) -> Option<Projection> {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_header(f, main_chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(SIDEBAR_WIDTH)])
        .split(main_chunks[1]);

    let summary_height = if app.summary().is_some() { 6 } else { 0 };
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),              // Stat cards
            Constraint::Length(summary_height), // AI insight
            Constraint::Min(0),                 // Floor plan
        ])
        .split(body[0]);

    draw_stat_cards(f, left[0], app);
    if let Some(summary) = app.summary() {
        draw_summary(f, left[1], summary);
    }
    let projection = draw_map(f, left[2], app);

    draw_sidebar(f, body[1], app);
    draw_footer(f, main_chunks[2], app);

    if app.pending_delete().is_some() {
        draw_delete_confirm(f, app);
    }
    projection
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let layout = app.session().store().layout();
    let (mode_text, mode_color) = if app.session().is_design_mode() {
        (" [m] レイアウト編集中 ", Color::Blue)
    } else {
        (" [m] 配置を編集 ", Color::DarkGray)
    };
    let (ai_text, ai_color) = if app.summary_busy() {
        (" [s] 分析中... ", Color::DarkGray)
    } else {
        (" [s] AI営業分析 ", Color::Magenta)
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(layout.name.clone(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled("Booth Management System", Style::default().fg(Color::Gray)),
        Span::raw(" |"),
        Span::styled(mode_text, Style::default().fg(mode_color).add_modifier(Modifier::BOLD)),
        Span::styled(ai_text, Style::default().fg(ai_color)),
        Span::styled(" [p] PDF出力 ", Style::default().fg(Color::Cyan)),
        Span::raw("| 'q' to quit"),
    ]))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

/// Title, value and color of each dashboard card, in display order
fn stat_cards(stats: &BoothStats) -> [(&'static str, String, Color); 6] {
    [
        ("全ブース", stats.total.to_string(), Color::White),
        ("成約済", stats.sold.to_string(), Color::Green),
        ("交渉中", stats.negotiating.to_string(), Color::Blue),
        ("予約", stats.reserved.to_string(), Color::Yellow),
        ("空き", stats.available.to_string(), Color::Gray),
        ("成約率", format!("{}%", stats.occupancy_display()), Color::Cyan),
    ]
}

fn draw_stat_cards(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.session().stats();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 6); 6])
        .split(area);

    for ((title, value, color), area) in stat_cards(&stats).into_iter().zip(cards.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().title(format!(" {title} ")).borders(Borders::ALL));
        f.render_widget(card, *area);
    }
}

fn draw_summary(f: &mut Frame, area: Rect, summary: &str) {
    let insight = Paragraph::new(summary.to_string())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" AI Insight ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        );
    f.render_widget(insight, area);
}

fn draw_map(f: &mut Frame, area: Rect, app: &App) -> Option<Projection> {
    let session = app.session();
    let border = if session.is_design_mode() { Color::Blue } else { Color::DarkGray };
    let block = Block::default()
        .title(" Floor Plan ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    canvas::draw_floor_plan(f, inner, session.store().layout(), session.selected_id())
}

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let design = app.session().is_design_mode();
    let constraints = if design {
        vec![Constraint::Min(0)]
    } else {
        vec![
            Constraint::Min(0),    // Editor
            Constraint::Length(8), // Sales by rep
            Constraint::Length(6), // Legend
        ]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_editor(f, chunks[0], app);
    if !design {
        draw_rep_sales(f, chunks[1], app);
        draw_legend(f, chunks[2]);
    }
}

fn draw_editor(f: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let Some(booth) = session.selected_booth() else {
        let hint = Paragraph::new(vec![
            Line::from("ブースを選択してください"),
            Line::from(""),
            Line::styled("Tab / click: select booth", Style::default().fg(Color::DarkGray)),
            Line::styled("a: add booth (design mode)", Style::default().fg(Color::DarkGray)),
        ])
        .block(Block::default().title(" Editor ").borders(Borders::ALL));
        f.render_widget(hint, area);
        return;
    };

    let title = if session.is_design_mode() {
        format!(" 配置編集: {} ", booth.label)
    } else {
        format!(" 詳細編集: {} ", booth.label)
    };

    let focused = app.focused_field();
    let mut lines = Vec::new();
    for field in session.editor_fields() {
        let is_focused = focused == Some(*field);
        let value = match app.input() {
            Some(input) if input.field == *field => format!("{}_", input.buffer),
            _ => app.field_value(*field),
        };
        let marker = if is_focused { "> " } else { "  " };
        let value_style = if is_focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(field.caption(), Style::default().fg(Color::Gray)),
        ]));
        let value_line = if *field == EditorField::Status {
            Span::styled(
                format!("    {value}"),
                value_style.fg(canvas::color(palette::border(booth.status))),
            )
        } else {
            Span::styled(format!("    {value}"), value_style)
        };
        lines.push(Line::from(value_line));
    }

    lines.push(Line::from(""));
    let hints = if session.is_design_mode() {
        "↑↓ field  Enter edit  a add  d delete  c close"
    } else {
        "↑↓ field  Enter edit  ←→ change  1-4 status  c close"
    };
    lines.push(Line::styled(hints, Style::default().fg(Color::DarkGray)));

    let editor = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    f.render_widget(editor, area);
}

fn draw_rep_sales(f: &mut Frame, area: Rect, app: &App) {
    let store = app.session().store();
    let items: Vec<ListItem> = sales_by_rep(store.booths(), store.sales_reps())
        .into_iter()
        .zip(store.sales_reps())
        .map(|(sales, rep)| {
            let color = palette::Rgb::from_hex(&rep.color).map_or(Color::White, canvas::color);
            ListItem::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::raw(format!("{:<10}", sales.name)),
                Span::styled(format!("{:>3}", sales.count), Style::default().add_modifier(Modifier::BOLD)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" 担当者別成約数 ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );
    f.render_widget(list, area);
}

fn draw_legend(f: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = [BoothStatus::Sold, BoothStatus::Negotiating, BoothStatus::Reserved, BoothStatus::Available]
        .into_iter()
        .map(|status| {
            ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(canvas::color(palette::border(status)))),
                Span::raw(status.label()),
            ]))
        })
        .collect();

    let legend = List::new(items).block(Block::default().title(" 凡例 ").borders(Borders::ALL));
    f.render_widget(legend, area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let (indicator, color) = if app.session().is_design_mode() {
        ("● DESIGN MODE ACTIVE", Color::Blue)
    } else {
        ("● REAL-TIME ACTIVE", Color::Green)
    };
    let mut spans = vec![Span::styled(indicator, Style::default().fg(color).add_modifier(Modifier::BOLD))];
    if let Some(message) = app.status_message() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(message.to_string(), Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_delete_confirm(f: &mut Frame, app: &App) {
    let Some(id) = app.pending_delete() else {
        return;
    };
    let area = centered(f.area(), 40, 5);
    let dialog = Paragraph::new(vec![
        Line::from(format!("ブース {id} を削除しますか？")),
        Line::styled("y: delete   n / Esc: cancel", Style::default().fg(Color::DarkGray)),
    ])
    .block(
        Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed;
    use crate::io::report::{PdfRenderer, ReportExporter};
    use crate::services::layout_store::LayoutStore;
    use crate::services::session::EditorSession;
    use crate::services::summary::{SummaryLanguage, SummaryRequester, TextGenerator};
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    struct NoGenerator;

    #[async_trait]
    impl TextGenerator for NoGenerator {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            anyhow::bail!("offline")
        }
    }

    fn render(app: &App) -> (String, Option<Projection>) {
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();
        let mut projection = None;
        terminal.draw(|f| projection = draw_ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let text = buffer.content().iter().map(|cell| cell.symbol()).collect::<String>();
        (text, projection)
    }

    fn app() -> App {
        let session = EditorSession::new(LayoutStore::new(seed::layout(0), seed::sales_reps()));
        let requester = Arc::new(SummaryRequester::new(Arc::new(NoGenerator), SummaryLanguage::En));
        App::new(session, requester, ReportExporter::new("reports", PdfRenderer::new(None)))
    }

    #[test]
    fn test_mode_indicator() {
        let mut app = app();
        let (text, projection) = render(&app);
        assert!(text.contains("REAL-TIME ACTIVE"));
        assert!(projection.is_some());

        app.handle_key(KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE));
        let (text, _) = render(&app);
        assert!(text.contains("DESIGN MODE ACTIVE"));
    }

    #[test]
    fn test_stat_cards_include_every_status() {
        let mut layout = seed::layout(0);
        layout.booths[0].status = BoothStatus::Reserved;
        layout.booths[1].status = BoothStatus::Reserved;
        layout.booths[2].status = BoothStatus::Sold;
        let stats = BoothStats::from_booths(&layout.booths);

        let cards = stat_cards(&stats);
        let value = |title: &str| {
            cards.iter().find(|(t, _, _)| *t == title).map(|(_, v, _)| v.clone())
        };
        assert_eq!(value("全ブース").as_deref(), Some("22"));
        assert_eq!(value("成約済").as_deref(), Some("1"));
        assert_eq!(value("交渉中").as_deref(), Some("0"));
        assert_eq!(value("予約").as_deref(), Some("2"));
        assert_eq!(value("空き").as_deref(), Some("19"));
        assert_eq!(value("成約率").as_deref(), Some("4.5%"));
    }

    #[test]
    fn test_booth_labels_drawn() {
        let (text, _) = render(&app());
        assert!(text.contains("A-1"));
        assert!(text.contains("C-8"));
    }

    #[test]
    fn test_delete_dialog() {
        let mut app = app();
        for code in [KeyCode::Char('m'), KeyCode::Tab, KeyCode::Char('d')] {
            app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
        }
        let (text, _) = render(&app);
        assert!(text.contains("Confirm"));
    }
}
