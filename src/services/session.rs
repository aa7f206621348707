//! Editor session: selection and mode state on top of the layout store
//!
//! The session owns the store and is the only writer of layout state.
//! Design mode exposes geometry, label and deletion; operation mode
//! exposes sales data. Both views write through `LayoutStore::update_booth`.

use crate::domain::types::{
    coerce_number, epoch_ms, Booth, BoothId, BoothPatch, BoothStatus, SalesRepId,
};
use crate::services::layout_store::LayoutStore;
use crate::services::stats::BoothStats;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no booth selected")]
    NothingSelected,
    #[error("{0} is only editable in {1} mode")]
    WrongMode(&'static str, &'static str),
    #[error("booth {0} no longer exists")]
    UnknownBooth(BoothId),
}

/// A field shown in the editor panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Label,
    X,
    Y,
    Width,
    Height,
    Status,
    CompanyName,
    SalesRep,
    DealValue,
}

impl EditorField {
    pub const DESIGN: [EditorField; 5] =
        [EditorField::X, EditorField::Y, EditorField::Width, EditorField::Height, EditorField::Label];

    pub const OPERATION: [EditorField; 4] = [
        EditorField::Status,
        EditorField::CompanyName,
        EditorField::SalesRep,
        EditorField::DealValue,
    ];

    pub fn is_design_field(&self) -> bool {
        Self::DESIGN.contains(self)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorField::Label => "label",
            EditorField::X => "x",
            EditorField::Y => "y",
            EditorField::Width => "width",
            EditorField::Height => "height",
            EditorField::Status => "status",
            EditorField::CompanyName => "company name",
            EditorField::SalesRep => "sales rep",
            EditorField::DealValue => "deal value",
        }
    }

    /// Japanese caption used in the editor panel
    pub fn caption(&self) -> &'static str {
        match self {
            EditorField::Label => "ラベル名",
            EditorField::X => "X座標",
            EditorField::Y => "Y座標",
            EditorField::Width => "幅 (Width)",
            EditorField::Height => "高さ (Height)",
            EditorField::Status => "ステータス",
            EditorField::CompanyName => "出展社名",
            EditorField::SalesRep => "担当営業",
            EditorField::DealValue => "受注見込額 (万円)",
        }
    }

    /// Whether the field takes free text (as opposed to a picker)
    pub fn is_text(&self) -> bool {
        !matches!(self, EditorField::Status | EditorField::SalesRep)
    }

    /// Translate raw editor input into a patch
    fn to_patch(self, input: &str) -> BoothPatch {
        match self {
            EditorField::Label => BoothPatch::label(input),
            EditorField::X => BoothPatch { x: Some(coerce_number(input)), ..Default::default() },
            EditorField::Y => BoothPatch { y: Some(coerce_number(input)), ..Default::default() },
            EditorField::Width => BoothPatch { width: Some(coerce_number(input)), ..Default::default() },
            EditorField::Height => BoothPatch { height: Some(coerce_number(input)), ..Default::default() },
            EditorField::Status => BoothPatch {
                status: input.parse::<BoothStatus>().ok(),
                ..Default::default()
            },
            EditorField::CompanyName => BoothPatch::company_name(Some(input)),
            EditorField::SalesRep => {
                let id = input.trim();
                BoothPatch::sales_rep((!id.is_empty()).then(|| SalesRepId::new(id)))
            }
            EditorField::DealValue => {
                if input.trim().is_empty() {
                    BoothPatch::deal_value(None)
                } else {
                    BoothPatch::deal_value(Some(coerce_number(input)))
                }
            }
        }
    }
}

pub struct EditorSession {
    store: LayoutStore,
    selected: Option<BoothId>,
    design_mode: bool,
}

impl EditorSession {
    pub fn new(store: LayoutStore) -> Self {
        Self { store, selected: None, design_mode: false }
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    pub fn stats(&self) -> BoothStats {
        BoothStats::from_booths(self.store.booths())
    }

    pub fn is_design_mode(&self) -> bool {
        self.design_mode
    }

    pub fn selected_id(&self) -> Option<&BoothId> {
        self.selected.as_ref()
    }

    pub fn selected_booth(&self) -> Option<&Booth> {
        self.selected.as_ref().and_then(|id| self.store.booth(id))
    }

    /// Select a booth regardless of mode. Unknown ids are ignored.
    pub fn select(&mut self, id: &BoothId) {
        if self.store.contains(id) {
            self.selected = Some(id.clone());
        }
    }

    /// Select the booth after (or before) the current one in layout order
    pub fn select_relative(&mut self, forward: bool) {
        let booths = self.store.booths();
        if booths.is_empty() {
            return;
        }
        let current = self.selected.as_ref().and_then(|id| booths.iter().position(|b| &b.id == id));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => booths.len() - 1,
            (Some(i), true) => (i + 1) % booths.len(),
            (Some(i), false) => (i + booths.len() - 1) % booths.len(),
        };
        self.selected = Some(booths[next].id.clone());
    }

    /// Toggle design mode. The selection is kept.
    pub fn toggle_design_mode(&mut self) -> bool {
        self.design_mode = !self.design_mode;
        info!(design_mode = self.design_mode, "design_mode_toggled");
        self.design_mode
    }

    pub fn close_editor(&mut self) {
        self.selected = None;
    }

    /// Fields exposed by the editor for the current mode
    pub fn editor_fields(&self) -> &'static [EditorField] {
        if self.design_mode {
            &EditorField::DESIGN
        } else {
            &EditorField::OPERATION
        }
    }

    /// Add a booth at the default position and select it (design mode only)
    pub fn create_booth(&mut self) -> Result<BoothId, SessionError> {
        if !self.design_mode {
            return Err(SessionError::WrongMode("adding booths", "design"));
        }
        let booth = self.store.create_booth(epoch_ms());
        self.selected = Some(booth.id.clone());
        Ok(booth.id)
    }

    /// Delete a booth after confirmation (design mode only).
    ///
    /// A confirmed deletion always clears the selection, whichever booth was selected.
    pub fn delete_booth<F>(&mut self, id: &BoothId, confirm: F) -> Result<bool, SessionError>
    where
        F: FnOnce(Option<&Booth>) -> bool,
    {
        if !self.design_mode {
            return Err(SessionError::WrongMode("deleting booths", "design"));
        }
        let deleted = self.store.delete_booth(id, confirm);
        if deleted {
            self.selected = None;
        }
        Ok(deleted)
    }

    /// Apply raw editor input for `field` to the selected booth
    pub fn edit(&mut self, field: EditorField, input: &str) -> Result<(), SessionError> {
        let id = self.selected.clone().ok_or(SessionError::NothingSelected)?;
        match (field.is_design_field(), self.design_mode) {
            (true, false) => return Err(SessionError::WrongMode(field.name(), "design")),
            (false, true) => return Err(SessionError::WrongMode(field.name(), "operation")),
            _ => {}
        }

        if self.store.update_booth(&id, &field.to_patch(input), epoch_ms()) {
            Ok(())
        } else {
            Err(SessionError::UnknownBooth(id))
        }
    }

    /// Set the selected booth's status (operation mode only)
    pub fn set_status(&mut self, status: BoothStatus) -> Result<(), SessionError> {
        self.edit(EditorField::Status, status.as_str())
    }

    /// Step the selected booth's sales rep through "unassigned" and each rep in order
    pub fn cycle_sales_rep(&mut self, forward: bool) -> Result<(), SessionError> {
        let booth = self.selected_booth().ok_or(SessionError::NothingSelected)?;
        let reps = self.store.sales_reps();

        // Slot 0 is "unassigned"; dangling ids also count as unassigned
        let slots = reps.len() + 1;
        let current = booth
            .sales_rep_id
            .as_ref()
            .and_then(|id| reps.iter().position(|r| &r.id == id))
            .map_or(0, |i| i + 1);
        let next = if forward { (current + 1) % slots } else { (current + slots - 1) % slots };
        let input = if next == 0 { String::new() } else { reps[next - 1].id.0.clone() };

        self.edit(EditorField::SalesRep, &input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed;

    fn session() -> EditorSession {
        EditorSession::new(LayoutStore::new(seed::layout(1_000), seed::sales_reps()))
    }

    fn id(s: &str) -> BoothId {
        BoothId::new(s)
    }

    #[test]
    fn test_select_in_any_mode() {
        let mut s = session();
        s.select(&id("A-1"));
        assert_eq!(s.selected_id(), Some(&id("A-1")));

        s.toggle_design_mode();
        s.select(&id("B-2"));
        assert_eq!(s.selected_id(), Some(&id("B-2")));
    }

    #[test]
    fn test_select_unknown_is_ignored() {
        let mut s = session();
        s.select(&id("A-1"));
        s.select(&id("nope"));
        assert_eq!(s.selected_id(), Some(&id("A-1")));
    }

    #[test]
    fn test_toggle_keeps_selection() {
        let mut s = session();
        s.select(&id("C-4"));
        assert!(s.toggle_design_mode());
        assert_eq!(s.selected_id(), Some(&id("C-4")));
        assert!(!s.toggle_design_mode());
        assert_eq!(s.selected_id(), Some(&id("C-4")));
    }

    #[test]
    fn test_close_editor_clears_selection() {
        let mut s = session();
        s.select(&id("C-4"));
        s.close_editor();
        assert!(s.selected_booth().is_none());
    }

    #[test]
    fn test_delete_clears_selection_even_for_other_booth() {
        let mut s = session();
        s.toggle_design_mode();
        s.select(&id("A-1"));

        assert_eq!(s.delete_booth(&id("C-8"), |_| true), Ok(true));
        assert_eq!(s.selected_id(), None);
        assert_eq!(s.store().booths().len(), 21);
    }

    #[test]
    fn test_delete_declined_keeps_selection() {
        let mut s = session();
        s.toggle_design_mode();
        s.select(&id("A-1"));

        assert_eq!(s.delete_booth(&id("A-1"), |_| false), Ok(false));
        assert_eq!(s.selected_id(), Some(&id("A-1")));
        assert_eq!(s.store().booths().len(), 22);
    }

    #[test]
    fn test_delete_requires_design_mode() {
        let mut s = session();
        let result = s.delete_booth(&id("A-1"), |_| panic!("confirmation must not be asked"));
        assert!(matches!(result, Err(SessionError::WrongMode(..))));
        assert_eq!(s.store().booths().len(), 22);
    }

    #[test]
    fn test_create_requires_design_mode_and_selects() {
        let mut s = session();
        assert!(s.create_booth().is_err());

        s.toggle_design_mode();
        let new_id = s.create_booth().unwrap();
        assert_eq!(new_id, id("N-23"));
        assert_eq!(s.selected_id(), Some(&new_id));
    }

    #[test]
    fn test_editor_fields_follow_mode() {
        let mut s = session();
        assert_eq!(s.editor_fields(), &EditorField::OPERATION);
        s.toggle_design_mode();
        assert_eq!(s.editor_fields(), &EditorField::DESIGN);
    }

    #[test]
    fn test_invalid_numeric_input_sets_zero() {
        let mut s = session();
        s.toggle_design_mode();
        s.select(&id("A-3"));

        s.edit(EditorField::X, "abc").unwrap();
        s.edit(EditorField::Width, "").unwrap();
        let booth = s.selected_booth().unwrap();
        assert_eq!(booth.x, 0.0);
        assert_eq!(booth.width, 0.0);
    }

    #[test]
    fn test_wrong_mode_edit_rejected_without_mutation() {
        let mut s = session();
        s.select(&id("A-3"));
        let before = s.store().layout().clone();

        let err = s.edit(EditorField::X, "10").unwrap_err();
        assert_eq!(err, SessionError::WrongMode("x", "design"));
        assert_eq!(s.store().layout(), &before);

        s.toggle_design_mode();
        let err = s.set_status(BoothStatus::Sold).unwrap_err();
        assert_eq!(err, SessionError::WrongMode("status", "operation"));
        assert_eq!(s.store().layout(), &before);
    }

    #[test]
    fn test_edit_without_selection() {
        let mut s = session();
        assert_eq!(s.set_status(BoothStatus::Sold), Err(SessionError::NothingSelected));
    }

    #[test]
    fn test_operation_edits() {
        let mut s = session();
        s.select(&id("B-1"));

        s.set_status(BoothStatus::Negotiating).unwrap();
        s.edit(EditorField::CompanyName, "Acme Corp").unwrap();
        s.edit(EditorField::DealValue, "250").unwrap();

        let booth = s.selected_booth().unwrap();
        assert_eq!(booth.status, BoothStatus::Negotiating);
        assert_eq!(booth.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(booth.deal_value, Some(250.0));

        s.edit(EditorField::DealValue, "lots").unwrap();
        assert_eq!(s.selected_booth().unwrap().deal_value, Some(0.0));

        s.edit(EditorField::DealValue, "").unwrap();
        assert_eq!(s.selected_booth().unwrap().deal_value, None);
    }

    #[test]
    fn test_cycle_sales_rep_wraps_through_unassigned() {
        let mut s = session();
        s.select(&id("B-1"));

        s.cycle_sales_rep(true).unwrap();
        assert_eq!(s.selected_booth().unwrap().sales_rep_id, Some(SalesRepId::new("sr1")));

        s.cycle_sales_rep(false).unwrap();
        assert_eq!(s.selected_booth().unwrap().sales_rep_id, None);

        s.cycle_sales_rep(false).unwrap();
        assert_eq!(s.selected_booth().unwrap().sales_rep_id, Some(SalesRepId::new("sr4")));
    }

    #[test]
    fn test_select_relative_wraps() {
        let mut s = session();
        s.select_relative(false);
        assert_eq!(s.selected_id(), Some(&id("C-8")));
        s.select_relative(true);
        assert_eq!(s.selected_id(), Some(&id("A-1")));
    }
}
