//! Editor application state and input handling
//!
//! Everything here is synchronous except the summary request, which runs in
//! a spawned task and posts its text back over a channel drained by
//! `poll_summary` on every tick.

use crate::domain::types::{BoothId, BoothStatus};
use crate::io::report::ReportExporter;
use crate::services::session::{EditorField, EditorSession};
use crate::services::summary::SummaryRequester;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::canvas::Projection;

/// Text being typed into a free-text field
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    pub field: EditorField,
    pub buffer: String,
}

pub struct App {
    session: EditorSession,
    requester: Arc<SummaryRequester>,
    exporter: ReportExporter,
    summary: Option<String>,
    summary_tx: mpsc::Sender<String>,
    summary_rx: mpsc::Receiver<String>,
    focus: usize,
    input: Option<InputState>,
    pending_delete: Option<BoothId>,
    status_message: Option<String>,
    projection: Option<Projection>,
    should_quit: bool,
}

impl App {
    pub fn new(session: EditorSession, requester: Arc<SummaryRequester>, exporter: ReportExporter) -> Self {
        let (summary_tx, summary_rx) = mpsc::channel(4);
        Self {
            session,
            requester,
            exporter,
            summary: None,
            summary_tx,
            summary_rx,
            focus: 0,
            input: None,
            pending_delete: None,
            status_message: None,
            projection: None,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn summary_busy(&self) -> bool {
        self.requester.is_busy()
    }

    pub fn focused_field(&self) -> Option<EditorField> {
        self.session.selected_booth()?;
        self.session.editor_fields().get(self.focus).copied()
    }

    pub fn input(&self) -> Option<&InputState> {
        self.input.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&BoothId> {
        self.pending_delete.as_ref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Remember where the floor plan was last drawn, for mouse hit testing
    pub fn set_projection(&mut self, projection: Option<Projection>) {
        self.projection = projection;
    }

    /// Current value of `field` on the selected booth, as shown and edited in the panel
    pub fn field_value(&self, field: EditorField) -> String {
        let Some(booth) = self.session.selected_booth() else {
            return String::new();
        };
        match field {
            EditorField::Label => booth.label.clone(),
            EditorField::X => format_number(booth.x),
            EditorField::Y => format_number(booth.y),
            EditorField::Width => format_number(booth.width),
            EditorField::Height => format_number(booth.height),
            EditorField::Status => booth.status.label().to_string(),
            EditorField::CompanyName => booth.company_name.clone().unwrap_or_default(),
            EditorField::SalesRep => booth
                .sales_rep_id
                .as_ref()
                .and_then(|id| self.session.store().sales_rep(id))
                .map(|rep| rep.name.clone())
                .unwrap_or_else(|| "未割当".to_string()),
            EditorField::DealValue => booth.deal_value.map(format_number).unwrap_or_default(),
        }
    }

    /// Drain finished summary requests
    pub fn poll_summary(&mut self) {
        while let Ok(text) = self.summary_rx.try_recv() {
            self.summary = Some(text);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.pending_delete.is_some() {
            self.handle_confirm_key(key.code);
            return;
        }
        if self.input.is_some() {
            self.handle_input_key(key.code);
            return;
        }

        self.status_message = None;
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.select_relative(true),
            KeyCode::BackTab => self.select_relative(false),
            KeyCode::Esc | KeyCode::Char('c') => self.session.close_editor(),
            KeyCode::Char('m') => {
                self.session.toggle_design_mode();
                self.focus = 0;
            }
            KeyCode::Char('a') => match self.session.create_booth() {
                Ok(_) => self.focus = 0,
                Err(e) => self.status_message = Some(e.to_string()),
            },
            KeyCode::Char('d') => self.request_delete(),
            KeyCode::Up => self.focus = self.focus.saturating_sub(1),
            KeyCode::Down => {
                let last = self.session.editor_fields().len().saturating_sub(1);
                self.focus = (self.focus + 1).min(last);
            }
            KeyCode::Enter => self.activate_field(),
            KeyCode::Left => self.step_field(false),
            KeyCode::Right => self.step_field(true),
            KeyCode::Char(c @ '1'..='4') => {
                let status = BoothStatus::ALL[(c as u8 - b'1') as usize];
                let result = self.session.set_status(status);
                self.report(result);
            }
            KeyCode::Char('s') => self.start_summary(),
            KeyCode::Char('p') => self.export_report(),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.pending_delete.is_some() || self.input.is_some() {
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let Some(projection) = self.projection else {
                return;
            };
            let hit = projection
                .booth_at(self.session.store().booths(), mouse.column, mouse.row)
                .cloned();
            if let Some(id) = hit {
                self.session.select(&id);
                self.focus = 0;
            }
        }
    }

    fn select_relative(&mut self, forward: bool) {
        self.session.select_relative(forward);
        self.focus = 0;
    }

    fn request_delete(&mut self) {
        if !self.session.is_design_mode() {
            self.status_message = Some("booths can only be deleted in design mode".to_string());
            return;
        }
        match self.session.selected_id() {
            Some(id) => self.pending_delete = Some(id.clone()),
            None => self.status_message = Some("no booth selected".to_string()),
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode) {
        let confirmed = match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };
        if let Some(id) = self.pending_delete.take() {
            let result = self.session.delete_booth(&id, |_| confirmed).map(|_| ());
            self.report(result);
            self.focus = 0;
        }
    }

    fn handle_input_key(&mut self, code: KeyCode) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        match code {
            KeyCode::Char(c) => input.buffer.push(c),
            KeyCode::Backspace => {
                input.buffer.pop();
            }
            KeyCode::Esc => self.input = None,
            KeyCode::Enter => {
                if let Some(input) = self.input.take() {
                    let result = self.session.edit(input.field, &input.buffer);
                    self.report(result);
                }
            }
            _ => {}
        }
    }

    fn activate_field(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        match field {
            EditorField::Status => self.step_field(true),
            EditorField::SalesRep => self.step_field(true),
            _ => {
                let buffer = self.field_value(field);
                self.input = Some(InputState { field, buffer });
            }
        }
    }

    fn step_field(&mut self, forward: bool) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let result = match field {
            EditorField::Status => match self.session.selected_booth() {
                Some(booth) => {
                    let status = if forward { booth.status.next() } else { booth.status.prev() };
                    self.session.set_status(status)
                }
                None => return,
            },
            EditorField::SalesRep => self.session.cycle_sales_rep(forward),
            _ => return,
        };
        self.report(result);
    }

    fn start_summary(&mut self) {
        if self.requester.is_busy() {
            self.status_message = Some("analysis already running".to_string());
            return;
        }
        let booths = self.session.store().booths().to_vec();
        let reps = self.session.store().sales_reps().to_vec();
        let requester = Arc::clone(&self.requester);
        let tx = self.summary_tx.clone();
        tokio::spawn(async move {
            if let Some(text) = requester.request(&booths, &reps).await {
                let _ = tx.send(text).await;
            }
        });
    }

    fn export_report(&mut self) {
        let layout = self.session.store().layout();
        match self.exporter.export(layout, self.summary.as_deref()) {
            Ok(Some(path)) => {
                self.status_message = Some(format!("report saved to {}", path.display()));
            }
            Ok(None) => {
                info!("report_export_skipped");
            }
            Err(e) => {
                warn!(error = %e, "report_export_failed");
                self.status_message = Some(format!("report export failed: {e}"));
            }
        }
    }

    fn report<E: std::fmt::Display>(&mut self, result: Result<(), E>) {
        if let Err(e) = result {
            self.status_message = Some(e.to_string());
        }
    }
}

/// Whole numbers without a fractional part, everything else as-is
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
