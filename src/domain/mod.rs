//! Domain models - core layout types
//!
//! This module contains the canonical data types used throughout the system:
//! - `Booth` - a rectangular unit of floor space with a sales status
//! - `ExhibitionLayout` - the aggregate root holding all booths
//! - `SalesRep` - static sales staff reference data
//! - `palette` - fixed status colors
//! - `seed` - the built-in floor plan and layout file loading

pub mod palette;
pub mod seed;
pub mod types;

// Re-export commonly used types at module level
pub use types::{
    coerce_number, epoch_ms, Booth, BoothId, BoothPatch, BoothStatus, ExhibitionLayout, SalesRep,
    SalesRepId,
};
