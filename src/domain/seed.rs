//! Built-in floor plan and sales team used when no layout file is configured

use crate::domain::types::{Booth, ExhibitionLayout, SalesRep};
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const SEED_LAYOUT_ID: &str = "main-hall-2024";
pub const SEED_LAYOUT_NAME: &str = "メインホール展示会 2024秋";

pub fn sales_reps() -> Vec<SalesRep> {
    vec![
        SalesRep::new("sr1", "田中 太郎", "#3B82F6"),
        SalesRep::new("sr2", "佐藤 花子", "#10B981"),
        SalesRep::new("sr3", "鈴木 一郎", "#F59E0B"),
        SalesRep::new("sr4", "高橋 健一", "#8B5CF6"),
    ]
}

/// Three rows: A (6 premium booths), B and C (8 booths each)
pub fn layout(now: u64) -> ExhibitionLayout {
    let mut booths = Vec::with_capacity(22);

    for i in 0..6 {
        let id = format!("A-{}", i + 1);
        booths.push(Booth::new(&id, 50.0 + i as f64 * 110.0, 50.0, 100.0, 100.0, now));
    }
    for (row, y) in [("B", 200.0), ("C", 300.0)] {
        for i in 0..8 {
            let id = format!("{}-{}", row, i + 1);
            booths.push(Booth::new(&id, 50.0 + i as f64 * 80.0, y, 70.0, 70.0, now));
        }
    }

    ExhibitionLayout {
        id: SEED_LAYOUT_ID.to_string(),
        name: SEED_LAYOUT_NAME.to_string(),
        width: 800.0,
        height: 600.0,
        booths,
    }
}

/// Layout file contents: the layout itself plus an optional sales team
#[derive(Debug, Deserialize)]
struct LayoutFile {
    #[serde(flatten)]
    layout: ExhibitionLayout,
    #[serde(default, rename = "salesReps")]
    sales_reps: Option<Vec<SalesRep>>,
}

/// Load a layout (and optionally its sales reps) from a JSON file.
///
/// Duplicate booth ids are rejected so the store starts from a valid state.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<(ExhibitionLayout, Option<Vec<SalesRep>>)> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file {}", path.display()))?;
    let file: LayoutFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse layout file {}", path.display()))?;

    let mut seen = std::collections::HashSet::new();
    for booth in &file.layout.booths {
        if !seen.insert(&booth.id) {
            anyhow::bail!("Duplicate booth id {} in {}", booth.id, path.display());
        }
    }

    Ok((file.layout, file.sales_reps))
}
