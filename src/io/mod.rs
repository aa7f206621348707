//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `gemini` - HTTP client for the Gemini text generation API
//! - `report` - Report model and PDF output

pub mod gemini;
pub mod report;

// Re-export commonly used types
pub use gemini::{GeminiClient, GeminiConfig};
pub use report::{DocumentRenderer, PdfRenderer, Report, ReportExporter};
