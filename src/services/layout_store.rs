//! Canonical layout state and booth mutations
//!
//! The store is the single writer of the `ExhibitionLayout`. Callers pass the
//! current time into every mutation so behavior is deterministic under test.
//!
//! Key behaviors:
//! - New booth ids follow `N-{count+1}`; a taken id advances the suffix
//! - `updated_at` is strictly increasing per booth, even with a frozen clock
//! - Updates to unknown ids are silent no-ops
//! - Deletion asks the caller for confirmation first

use crate::domain::seed;
use crate::domain::types::{epoch_ms, Booth, BoothId, BoothPatch, ExhibitionLayout, SalesRep, SalesRepId};
use crate::infra::config::Config;
use tracing::{debug, info};

/// Default geometry of a freshly created booth
const NEW_BOOTH_X: f64 = 100.0;
const NEW_BOOTH_Y: f64 = 100.0;
const NEW_BOOTH_SIZE: f64 = 80.0;

pub struct LayoutStore {
    layout: ExhibitionLayout,
    sales_reps: Vec<SalesRep>,
}

impl LayoutStore {
    pub fn new(layout: ExhibitionLayout, sales_reps: Vec<SalesRep>) -> Self {
        info!(
            layout_id = %layout.id,
            booths = layout.booths.len(),
            sales_reps = sales_reps.len(),
            "layout_loaded"
        );
        Self { layout, sales_reps }
    }

    /// Load the configured layout file, or the built-in seed when none is set.
    ///
    /// A layout file without its own sales team uses the built-in reps.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.layout_seed_file() {
            Some(path) => {
                let (layout, reps) = seed::load_from_file(path)?;
                Ok(Self::new(layout, reps.unwrap_or_else(seed::sales_reps)))
            }
            None => Ok(Self::new(seed::layout(epoch_ms()), seed::sales_reps())),
        }
    }

    pub fn layout(&self) -> &ExhibitionLayout {
        &self.layout
    }

    pub fn booths(&self) -> &[Booth] {
        &self.layout.booths
    }

    pub fn booth(&self, id: &BoothId) -> Option<&Booth> {
        self.layout.booths.iter().find(|b| &b.id == id)
    }

    pub fn contains(&self, id: &BoothId) -> bool {
        self.booth(id).is_some()
    }

    pub fn sales_reps(&self) -> &[SalesRep] {
        &self.sales_reps
    }

    /// Resolve a weak sales rep reference. Dangling ids resolve to `None`.
    pub fn sales_rep(&self, id: &SalesRepId) -> Option<&SalesRep> {
        self.sales_reps.iter().find(|sr| &sr.id == id)
    }

    /// Create a booth at the default position and append it.
    pub fn create_booth(&mut self, now: u64) -> Booth {
        let id = self.next_booth_id();
        let booth = Booth::new(id.as_str(), NEW_BOOTH_X, NEW_BOOTH_Y, NEW_BOOTH_SIZE, NEW_BOOTH_SIZE, now);
        self.layout.booths.push(booth.clone());

        info!(booth_id = %booth.id, total = self.layout.booths.len(), "booth_created");
        booth
    }

    /// Merge `patch` into the booth with `id` and stamp `updated_at`.
    ///
    /// Returns false (and changes nothing) if the id is unknown.
    pub fn update_booth(&mut self, id: &BoothId, patch: &BoothPatch, now: u64) -> bool {
        let Some(booth) = self.layout.booths.iter_mut().find(|b| &b.id == id) else {
            debug!(booth_id = %id, "booth_update_unknown_id");
            return false;
        };

        booth.apply(patch);
        booth.updated_at = now.max(booth.updated_at.saturating_add(1));

        debug!(
            booth_id = %booth.id,
            status = booth.status.as_str(),
            updated_at = booth.updated_at,
            "booth_updated"
        );
        true
    }

    /// Remove a booth after `confirm` approves it.
    ///
    /// Returns true when the user confirmed. Declining leaves the layout untouched.
    pub fn delete_booth<F>(&mut self, id: &BoothId, confirm: F) -> bool
    where
        F: FnOnce(Option<&Booth>) -> bool,
    {
        if !confirm(self.booth(id)) {
            debug!(booth_id = %id, "booth_delete_declined");
            return false;
        }

        let before = self.layout.booths.len();
        self.layout.booths.retain(|b| &b.id != id);
        info!(
            booth_id = %id,
            removed = before - self.layout.booths.len(),
            total = self.layout.booths.len(),
            "booth_deleted"
        );
        true
    }

    /// `N-{count+1}`, advancing past ids still in use after deletions
    fn next_booth_id(&self) -> BoothId {
        let mut n = self.layout.booths.len() + 1;
        loop {
            let candidate = BoothId(format!("N-{n}"));
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
