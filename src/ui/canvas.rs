//! Floor plan canvas: layout coordinates projected onto terminal cells
//!
//! Booths are drawn in layout order, so later booths sit on top of earlier
//! ones. Hit testing walks the same order backwards, topmost first.

use crate::domain::palette::{self, Rgb};
use crate::domain::types::{Booth, BoothId, ExhibitionLayout};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

pub fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Maps layout units onto a terminal area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    area: Rect,
    scale_x: f64,
    scale_y: f64,
}

impl Projection {
    /// `None` when the layout has no surface or the area is empty
    pub fn new(layout: &ExhibitionLayout, area: Rect) -> Option<Self> {
        if !layout.has_surface() || area.width == 0 || area.height == 0 {
            return None;
        }
        Some(Self {
            area,
            scale_x: area.width as f64 / layout.width,
            scale_y: area.height as f64 / layout.height,
        })
    }

    /// Cell rectangle of a booth, clipped to the canvas. `None` if fully outside or degenerate.
    pub fn booth_rect(&self, booth: &Booth) -> Option<Rect> {
        let (x0, x1) = ordered(booth.x, booth.x + booth.width);
        let (y0, y1) = ordered(booth.y, booth.y + booth.height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let (width, height) = (self.area.width as f64, self.area.height as f64);
        let (x0, x1) = (x0 * self.scale_x, x1 * self.scale_x);
        let (y0, y1) = (y0 * self.scale_y, y1 * self.scale_y);
        if x1 <= 0.0 || y1 <= 0.0 || x0 >= width || y0 >= height {
            return None;
        }

        let left = x0.round().clamp(0.0, width - 1.0);
        let top = y0.round().clamp(0.0, height - 1.0);
        // Every visible booth gets at least one cell
        let right = x1.round().max(left + 1.0).min(width);
        let bottom = y1.round().max(top + 1.0).min(height);

        Some(Rect::new(
            self.area.x + left as u16,
            self.area.y + top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }

    /// Booth under the given terminal cell, topmost first
    pub fn booth_at<'a>(&self, booths: &'a [Booth], column: u16, row: u16) -> Option<&'a BoothId> {
        booths
            .iter()
            .rev()
            .find(|booth| {
                self.booth_rect(booth).is_some_and(|r| {
                    column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
                })
            })
            .map(|booth| &booth.id)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Draw all booths; returns the projection used so clicks can be resolved later
pub fn draw_floor_plan(
    f: &mut Frame,
    area: Rect,
    layout: &ExhibitionLayout,
    selected: Option<&BoothId>,
) -> Option<Projection> {
    let projection = Projection::new(layout, area)?;

    for booth in &layout.booths {
        let Some(rect) = projection.booth_rect(booth) else {
            continue;
        };
        let is_selected = selected == Some(&booth.id);
        let fill = color(palette::fill(booth.status));
        let border = if is_selected {
            palette::SELECTED_BORDER
        } else {
            palette::border(booth.status)
        };
        let text_style = Style::default()
            .fg(color(palette::label_text(booth.status)))
            .bg(fill)
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![Line::styled(booth.label.clone(), text_style)];
        if let Some(company) = booth.short_company_name() {
            lines.push(Line::styled(company, Style::default().fg(color(palette::STRONG_TEXT)).bg(fill)));
        }

        if rect.width >= 3 && rect.height >= 3 {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(if is_selected { BorderType::Thick } else { BorderType::Rounded })
                .border_style(Style::default().fg(color(border)).bg(fill))
                .style(Style::default().bg(fill));
            let inner = block.inner(rect);
            // Vertically center the label block
            let pad = inner.height.saturating_sub(lines.len() as u16) / 2;
            let mut padded = vec![Line::default(); pad as usize];
            padded.extend(lines);
            f.render_widget(Paragraph::new(padded).alignment(Alignment::Center).block(block), rect);
        } else {
            let style = if is_selected { text_style.add_modifier(Modifier::REVERSED) } else { text_style };
            f.render_widget(
                Paragraph::new(Line::styled(booth.label.clone(), style)).style(Style::default().bg(fill)),
                rect,
            );
        }
    }

    Some(projection)
}
