//! AI sales summary requests
//!
//! Builds a statistical snapshot of the current booths, turns it into a prompt
//! and asks a `TextGenerator` for a management summary. Failures never reach the
//! caller: they are logged and replaced by a fixed localized message.
//!
//! Only one request may be outstanding at a time. A trigger that arrives while
//! a request is in flight is ignored and `request` returns `None`.

use crate::domain::types::{Booth, BoothStatus, SalesRep};
use crate::services::stats::{format_occupancy, occupancy_percent, sales_by_rep, RepSales};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Single prompt in, single text out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Output language of the summary and of the failure message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLanguage {
    #[default]
    Ja,
    En,
}

impl SummaryLanguage {
    pub fn fallback_message(&self) -> &'static str {
        match self {
            SummaryLanguage::Ja => "分析データの取得に失敗しました。",
            SummaryLanguage::En => "Failed to retrieve the sales analysis.",
        }
    }

    fn prompt_name(&self) -> &'static str {
        match self {
            SummaryLanguage::Ja => "Japanese",
            SummaryLanguage::En => "English",
        }
    }
}

/// Statistics sent to the generator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySnapshot {
    pub total_booths: usize,
    pub sold_count: usize,
    /// Percentage with one decimal place
    pub occupancy_rate: String,
    pub sales_distribution: Vec<RepSales>,
}

impl SummarySnapshot {
    pub fn capture(booths: &[Booth], reps: &[SalesRep]) -> Self {
        let sold_count = booths.iter().filter(|b| b.status == BoothStatus::Sold).count();
        Self {
            total_booths: booths.len(),
            sold_count,
            occupancy_rate: format_occupancy(occupancy_percent(sold_count, booths.len())),
            sales_distribution: sales_by_rep(booths, reps),
        }
    }

    pub fn to_prompt(&self, language: SummaryLanguage) -> String {
        let distribution =
            serde_json::to_string(&self.sales_distribution).unwrap_or_else(|_| "[]".to_string());
        format!(
            "Analyze the following exhibition booth sales data and provide a professional, \
             concise management summary in {language}.\n\
             Data:\n\
             - Total Booths: {total}\n\
             - Sold Booths: {sold}\n\
             - Occupancy: {occupancy}%\n\
             - Sales by Rep: {distribution}\n\n\
             Focus on identifying high-performing sales reps and suggestions to fill remaining booths.\n\
             Keep the tone professional for a manager.",
            language = language.prompt_name(),
            total = self.total_booths,
            sold = self.sold_count,
            occupancy = self.occupancy_rate,
        )
    }
}

/// Resets the in-flight flag when the request settles, including on panic
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SummaryRequester {
    generator: Arc<dyn TextGenerator>,
    language: SummaryLanguage,
    busy: AtomicBool,
}

impl SummaryRequester {
    pub fn new(generator: Arc<dyn TextGenerator>, language: SummaryLanguage) -> Self {
        Self { generator, language, busy: AtomicBool::new(false) }
    }

    /// Whether a request is outstanding; the UI disables its trigger while true
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn language(&self) -> SummaryLanguage {
        self.language
    }

    /// Request a summary of `booths`.
    ///
    /// Returns `None` if another request is already in flight. Otherwise returns
    /// the generator's text verbatim, or the fallback message on any failure.
    pub async fn request(&self, booths: &[Booth], reps: &[SalesRep]) -> Option<String> {
        if self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            debug!("summary_request_ignored_busy");
            return None;
        }
        let _in_flight = InFlight(&self.busy);

        let snapshot = SummarySnapshot::capture(booths, reps);
        let prompt = snapshot.to_prompt(self.language);
        info!(
            total_booths = snapshot.total_booths,
            sold = snapshot.sold_count,
            occupancy = %snapshot.occupancy_rate,
            "summary_requested"
        );

        let text = match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                info!(chars = text.chars().count(), "summary_received");
                text
            }
            Ok(_) => {
                warn!("summary_request_failed_empty_response");
                self.language.fallback_message().to_string()
            }
            Err(e) => {
                warn!(error = %e, "summary_request_failed");
                self.language.fallback_message().to_string()
            }
        };
        Some(text)
    }
}
