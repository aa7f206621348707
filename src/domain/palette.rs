//! Fixed status color mapping shared by the terminal canvas and the PDF report

use crate::domain::types::BoothStatus;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self(r, g, b))
    }

    /// Components scaled to 0.0..=1.0
    pub fn unit(&self) -> (f32, f32, f32) {
        (self.0 as f32 / 255.0, self.1 as f32 / 255.0, self.2 as f32 / 255.0)
    }
}

/// Border of the currently selected booth
pub const SELECTED_BORDER: Rgb = Rgb(0x25, 0x63, 0xEB);

/// Label text on AVAILABLE booths (slate-500)
pub const MUTED_TEXT: Rgb = Rgb(0x64, 0x74, 0x8B);

/// Label text on every other status (slate-800)
pub const STRONG_TEXT: Rgb = Rgb(0x1E, 0x29, 0x3B);

pub fn fill(status: BoothStatus) -> Rgb {
    match status {
        BoothStatus::Available => Rgb(0xFF, 0xFF, 0xFF),
        BoothStatus::Reserved => Rgb(0xFE, 0xF3, 0xC7),
        BoothStatus::Negotiating => Rgb(0xDB, 0xEA, 0xFE),
        BoothStatus::Sold => Rgb(0xDC, 0xFC, 0xE7),
    }
}

pub fn border(status: BoothStatus) -> Rgb {
    match status {
        BoothStatus::Available => Rgb(0xE2, 0xE8, 0xF0),
        BoothStatus::Reserved => Rgb(0xF5, 0x9E, 0x0B),
        BoothStatus::Negotiating => Rgb(0x3B, 0x82, 0xF6),
        BoothStatus::Sold => Rgb(0x10, 0xB9, 0x81),
    }
}

pub fn label_text(status: BoothStatus) -> Rgb {
    if status == BoothStatus::Available {
        MUTED_TEXT
    } else {
        STRONG_TEXT
    }
}
