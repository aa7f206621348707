//! Services - business logic and state management
//!
//! This module contains the core business logic services:
//! - `layout_store` - Canonical layout state and booth mutations
//! - `stats` - Status counts, occupancy and per-rep sales
//! - `session` - Selection and design/operation mode on top of the store
//! - `summary` - AI sales summary requests with failure containment

pub mod layout_store;
pub mod session;
pub mod stats;
pub mod summary;

// Re-export commonly used types
pub use layout_store::LayoutStore;
pub use session::{EditorField, EditorSession, SessionError};
pub use stats::BoothStats;
pub use summary::{SummaryLanguage, SummaryRequester, TextGenerator};
