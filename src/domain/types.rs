//! Shared types for the booth planner

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current epoch milliseconds
#[inline]
pub fn epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Newtype wrapper for booth IDs to provide type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoothId(pub String);

impl BoothId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BoothId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Newtype wrapper for sales rep IDs. A lookup key, never ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesRepId(pub String);

impl SalesRepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SalesRepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sales status of a booth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoothStatus {
    #[default]
    Available,
    Reserved,
    Negotiating,
    Sold,
}

impl BoothStatus {
    /// All statuses in editor order
    pub const ALL: [BoothStatus; 4] =
        [BoothStatus::Available, BoothStatus::Reserved, BoothStatus::Negotiating, BoothStatus::Sold];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoothStatus::Available => "AVAILABLE",
            BoothStatus::Reserved => "RESERVED",
            BoothStatus::Negotiating => "NEGOTIATING",
            BoothStatus::Sold => "SOLD",
        }
    }

    /// Japanese display label used by the editor and legend
    pub fn label(&self) -> &'static str {
        match self {
            BoothStatus::Available => "空き",
            BoothStatus::Reserved => "予約",
            BoothStatus::Negotiating => "交渉中",
            BoothStatus::Sold => "成約済",
        }
    }

    /// Next status in editor order, wrapping around
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous status in editor order, wrapping around
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::str::FromStr for BoothStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(BoothStatus::Available),
            "RESERVED" => Ok(BoothStatus::Reserved),
            "NEGOTIATING" => Ok(BoothStatus::Negotiating),
            "SOLD" => Ok(BoothStatus::Sold),
            other => Err(format!("unknown booth status: {other}")),
        }
    }
}

/// A sales staff member. Externally supplied and never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRep {
    pub id: SalesRepId,
    pub name: String,
    /// Display color as `#RRGGBB`
    pub color: String,
}

impl SalesRep {
    pub fn new(id: &str, name: &str, color: &str) -> Self {
        Self { id: SalesRepId::new(id), name: name.to_string(), color: color.to_string() }
    }
}

/// A rectangular unit of exhibition space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booth {
    pub id: BoothId,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub status: BoothStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_rep_id: Option<SalesRepId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_value: Option<f64>,
    /// Epoch milliseconds of the last mutation
    #[serde(default)]
    pub updated_at: u64,
}

impl Booth {
    /// Create an AVAILABLE booth whose label equals its id
    pub fn new(id: &str, x: f64, y: f64, width: f64, height: f64, updated_at: u64) -> Self {
        Self {
            id: BoothId::new(id),
            label: id.to_string(),
            x,
            y,
            width,
            height,
            status: BoothStatus::Available,
            company_name: None,
            sales_rep_id: None,
            deal_value: None,
            updated_at,
        }
    }

    /// Company name shortened for the floor plan: over 10 chars shows 8 plus "..."
    pub fn short_company_name(&self) -> Option<String> {
        let name = self.company_name.as_deref()?;
        if name.chars().count() > 10 {
            let head: String = name.chars().take(8).collect();
            Some(format!("{head}..."))
        } else {
            Some(name.to_string())
        }
    }

    /// Apply a patch without touching `updated_at`
    pub(crate) fn apply(&mut self, patch: &BoothPatch) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(x) = patch.x {
            self.x = finite_or_zero(x);
        }
        if let Some(y) = patch.y {
            self.y = finite_or_zero(y);
        }
        if let Some(width) = patch.width {
            self.width = finite_or_zero(width);
        }
        if let Some(height) = patch.height {
            self.height = finite_or_zero(height);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(company_name) = &patch.company_name {
            self.company_name = company_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string);
        }
        if let Some(sales_rep_id) = &patch.sales_rep_id {
            self.sales_rep_id = sales_rep_id.clone().filter(|id| !id.0.is_empty());
        }
        if let Some(deal_value) = patch.deal_value {
            self.deal_value = deal_value.map(finite_or_zero);
        }
    }
}

/// Partial update for a booth.
///
/// The outer `Option` means "leave unchanged"; for optional booth fields the inner
/// `Option` distinguishes "set" from "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoothPatch {
    pub label: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub status: Option<BoothStatus>,
    pub company_name: Option<Option<String>>,
    pub sales_rep_id: Option<Option<SalesRepId>>,
    pub deal_value: Option<Option<f64>>,
}

impl BoothPatch {
    pub fn status(status: BoothStatus) -> Self {
        Self { status: Some(status), ..Default::default() }
    }

    pub fn label(label: &str) -> Self {
        Self { label: Some(label.to_string()), ..Default::default() }
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Default::default() }
    }

    pub fn company_name(name: Option<&str>) -> Self {
        Self { company_name: Some(name.map(str::to_string)), ..Default::default() }
    }

    pub fn sales_rep(id: Option<SalesRepId>) -> Self {
        Self { sales_rep_id: Some(id), ..Default::default() }
    }

    pub fn deal_value(value: Option<f64>) -> Self {
        Self { deal_value: Some(value), ..Default::default() }
    }
}

/// Aggregate root: one exhibition floor plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExhibitionLayout {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub booths: Vec<Booth>,
}

impl ExhibitionLayout {
    /// Whether the layout has a drawable canvas
    pub fn has_surface(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Coerce free-form numeric input. Unparseable or non-finite text becomes 0.
pub fn coerce_number(input: &str) -> f64 {
    input.trim().parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_screaming_case() {
        let json = serde_json::to_string(&BoothStatus::Negotiating).unwrap();
        assert_eq!(json, "\"NEGOTIATING\"");
        let parsed: BoothStatus = serde_json::from_str("\"SOLD\"").unwrap();
        assert_eq!(parsed, BoothStatus::Sold);
        assert!(serde_json::from_str::<BoothStatus>("\"PENDING\"").is_err());
    }

    #[test]
    fn test_status_cycle_wraps() {
        assert_eq!(BoothStatus::Sold.next(), BoothStatus::Available);
        assert_eq!(BoothStatus::Available.prev(), BoothStatus::Sold);
        assert_eq!(BoothStatus::Reserved.next(), BoothStatus::Negotiating);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("120"), 120.0);
        assert_eq!(coerce_number(" -15.5 "), -15.5);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
    }

    #[test]
    fn test_short_company_name() {
        let mut booth = Booth::new("A-1", 0.0, 0.0, 10.0, 10.0, 0);
        assert_eq!(booth.short_company_name(), None);

        booth.company_name = Some("Acme".to_string());
        assert_eq!(booth.short_company_name().as_deref(), Some("Acme"));

        booth.company_name = Some("株式会社サンプル商事ホールディングス".to_string());
        assert_eq!(booth.short_company_name().as_deref(), Some("株式会社サンプル..."));
    }

    #[test]
    fn test_apply_clears_blank_optionals() {
        let mut booth = Booth::new("A-1", 0.0, 0.0, 10.0, 10.0, 0);
        booth.apply(&BoothPatch::company_name(Some("Acme")));
        booth.apply(&BoothPatch::sales_rep(Some(SalesRepId::new("sr1"))));
        assert_eq!(booth.company_name.as_deref(), Some("Acme"));

        booth.apply(&BoothPatch::company_name(Some("   ")));
        booth.apply(&BoothPatch::sales_rep(Some(SalesRepId::new(""))));
        assert_eq!(booth.company_name, None);
        assert_eq!(booth.sales_rep_id, None);
    }

    #[test]
    fn test_booth_json_shape() {
        let mut booth = Booth::new("B-2", 130.0, 200.0, 70.0, 70.0, 42);
        booth.deal_value = Some(0.0);
        let value = serde_json::to_value(&booth).unwrap();
        assert_eq!(value["id"], "B-2");
        assert_eq!(value["status"], "AVAILABLE");
        assert_eq!(value["dealValue"], 0.0);
        assert_eq!(value["updatedAt"], 42);
        assert!(value.get("companyName").is_none());
    }
}
