//! Booth statistics derived from the current booth collection
//!
//! Everything here is a pure function of its inputs and is recomputed on
//! every read; nothing is cached between store mutations.

use crate::domain::types::{Booth, BoothStatus, SalesRep};
use serde::Serialize;

/// Count of booths per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoothStats {
    pub total: usize,
    pub sold: usize,
    pub negotiating: usize,
    pub reserved: usize,
    pub available: usize,
}

impl BoothStats {
    pub fn from_booths(booths: &[Booth]) -> Self {
        let mut stats = Self { total: booths.len(), ..Default::default() };
        for booth in booths {
            match booth.status {
                BoothStatus::Sold => stats.sold += 1,
                BoothStatus::Negotiating => stats.negotiating += 1,
                BoothStatus::Reserved => stats.reserved += 1,
                BoothStatus::Available => stats.available += 1,
            }
        }
        stats
    }

    pub fn count(&self, status: BoothStatus) -> usize {
        match status {
            BoothStatus::Sold => self.sold,
            BoothStatus::Negotiating => self.negotiating,
            BoothStatus::Reserved => self.reserved,
            BoothStatus::Available => self.available,
        }
    }

    pub fn occupancy_percent(&self) -> f64 {
        occupancy_percent(self.sold, self.total)
    }

    /// Occupancy with one decimal place, e.g. `22.7`
    pub fn occupancy_display(&self) -> String {
        format_occupancy(self.occupancy_percent())
    }
}

/// Share of SOLD booths in percent; 0 when there are no booths
pub fn occupancy_percent(sold: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    sold as f64 / total as f64 * 100.0
}

pub fn format_occupancy(percent: f64) -> String {
    format!("{percent:.1}")
}

/// Sold booths attributed to one sales rep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepSales {
    pub name: String,
    pub count: usize,
}

/// Per-rep SOLD counts in sales rep order. Booths with dangling or no rep are not counted.
pub fn sales_by_rep(booths: &[Booth], reps: &[SalesRep]) -> Vec<RepSales> {
    reps.iter()
        .map(|rep| RepSales {
            name: rep.name.clone(),
            count: booths
                .iter()
                .filter(|b| b.status == BoothStatus::Sold && b.sales_rep_id.as_ref() == Some(&rep.id))
                .count(),
        })
        .collect()
}

/// Sum of deal values over booths with the given status
pub fn deal_value_total(booths: &[Booth], status: BoothStatus) -> f64 {
    // Folding from +0.0 keeps an empty total from printing as "-0"
    booths
        .iter()
        .filter(|b| b.status == status)
        .filter_map(|b| b.deal_value)
        .fold(0.0, |total, value| total + value)
}
