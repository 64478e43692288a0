//! # Color Map
//!
//! The structured description of an Orb artwork: a radial gradient with up
//! to seven color stops, a focal point and a background.

use serde::{Deserialize, Serialize};

/// Number of color stops in every map.
pub const COLOR_SLOTS: usize = 7;

/// Largest valid focal coordinate (degrees).
pub const MAX_COORDINATE: u16 = 360;

/// One gradient stop.
///
/// `domain` is the stop position (0-100 in practice). Domain 0 is reserved:
/// a non-empty stop at 0 is rejected by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorEntry {
    /// Stop is unused. Its other fields are still carried by the identifier.
    pub empty: bool,
    /// Stop position, 7 bits.
    pub domain: u8,
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl ColorEntry {
    /// An unused, zeroed stop. This is what an all-zero slot decodes to.
    pub const EMPTY: Self = Self {
        empty: true,
        domain: 0,
        r: 0,
        g: 0,
        b: 0,
    };

    /// A used stop.
    #[must_use]
    pub const fn new(domain: u8, r: u8, g: u8, b: u8) -> Self {
        Self {
            empty: false,
            domain,
            r,
            g,
            b,
        }
    }

    /// `#RRGGBB` in upper-case hex.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for ColorEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Full description of an Orb artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorMap {
    /// Focal x coordinate, 0..=360.
    pub x: u16,
    /// Focal y coordinate, 0..=360.
    pub y: u16,
    /// Animation class, 2 bits.
    pub speed: u8,
    /// Declared number of non-empty colors.
    pub color_count: u8,
    /// Background is transparent.
    pub bg_transparent: bool,
    /// Gray level of the background.
    pub bg_scalar: u8,
    /// The seven stops, slot 0 first.
    pub colors: [ColorEntry; COLOR_SLOTS],
}

impl ColorMap {
    /// Builds a map whose `color_count` matches `colors`.
    #[must_use]
    pub fn new(
        x: u16,
        y: u16,
        speed: u8,
        bg_transparent: bool,
        bg_scalar: u8,
        colors: [ColorEntry; COLOR_SLOTS],
    ) -> Self {
        let mut map = Self {
            x,
            y,
            speed,
            color_count: 0,
            bg_transparent,
            bg_scalar,
            colors,
        };
        map.color_count = map.non_empty_count();
        map
    }

    /// Number of stops in use.
    #[must_use]
    pub fn non_empty_count(&self) -> u8 {
        // At most COLOR_SLOTS, so the narrowing is lossless.
        self.colors.iter().filter(|c| !c.empty).count() as u8
    }

    /// Returns true if no stop is in use.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.colors.iter().all(|c| c.empty)
    }

    /// Used stops with their slot index.
    pub fn used_colors(&self) -> impl Iterator<Item = (usize, &ColorEntry)> {
        self.colors.iter().enumerate().filter(|(_, c)| !c.empty)
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            speed: 0,
            color_count: 0,
            bg_transparent: false,
            bg_scalar: 0,
            colors: [ColorEntry::EMPTY; COLOR_SLOTS],
        }
    }
}
