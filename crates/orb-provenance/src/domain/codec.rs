//! # Bit Codec
//!
//! Canonical packing of a [`ColorMap`] into a 256-bit [`TokenId`], and of the
//! two packed economic fields ([`MaxSupply`], [`Price`]).
//!
//! ## Identifier Layout
//!
//! | Bits | Content |
//! |------|---------|
//! | `32*i .. 32*i+32` (i = 0..7) | color slot `i` |
//! | `224 .. 256` | map metadata |
//!
//! Color slot (32 bits):
//!
//! | Bits | Field |
//! |------|-------|
//! | 31 | 1 = in use (NOT empty) |
//! | 24-30 | domain |
//! | 16-23 | r |
//! | 8-15 | g |
//! | 0-7 | b |
//!
//! Metadata (32 bits):
//!
//! | Bits | Field |
//! |------|-------|
//! | 0-8 | y |
//! | 9-17 | x |
//! | 18-19 | speed |
//! | 20-22 | color count |
//! | 23 | background transparent |
//! | 24-31 | background scalar |
//!
//! This layout is shared with every other implementation that mints Orbs and
//! must stay bit-for-bit stable.

use crate::domain::color_map::{ColorEntry, ColorMap, COLOR_SLOTS};
use crate::errors::OrbError;
use orb_types::{TokenId, U256};
use serde::{Deserialize, Serialize};

// =============================================================================
// LAYOUT CONSTANTS
// =============================================================================

const SLOT_BITS: usize = 32;
const METADATA_OFFSET: usize = SLOT_BITS * COLOR_SLOTS;

const IN_USE_BIT: u32 = 1 << 31;
const DOMAIN_MASK: u32 = 0x7f;
const COORDINATE_MASK: u32 = 0x1ff;
const SPEED_MASK: u32 = 0x3;
const COUNT_MASK: u32 = 0x7;

const X_SHIFT: u32 = 9;
const SPEED_SHIFT: u32 = 18;
const COUNT_SHIFT: u32 = 20;
const BG_TRANSPARENT_BIT: u32 = 1 << 23;
const BG_SCALAR_SHIFT: u32 = 24;

const POWER_BITS: usize = 6;
const POWER_MASK: u64 = (1 << POWER_BITS) - 1;
const DECIMALS_BITS: usize = 5;
const DECIMALS_MASK: u64 = (1 << DECIMALS_BITS) - 1;
const WORD_BITS: usize = 256;

// =============================================================================
// COLOR MAP
// =============================================================================

/// Pack one stop into its 32-bit slot.
#[must_use]
pub fn encode_color(color: &ColorEntry) -> u32 {
    let in_use = if color.empty { 0 } else { IN_USE_BIT };
    in_use
        | ((u32::from(color.domain) & DOMAIN_MASK) << 24)
        | (u32::from(color.r) << 16)
        | (u32::from(color.g) << 8)
        | u32::from(color.b)
}

/// Unpack one 32-bit slot.
#[must_use]
pub fn decode_color(slot: u32) -> ColorEntry {
    ColorEntry {
        empty: slot & IN_USE_BIT == 0,
        domain: ((slot >> 24) & DOMAIN_MASK) as u8,
        r: (slot >> 16) as u8,
        g: (slot >> 8) as u8,
        b: slot as u8,
    }
}

fn encode_metadata(map: &ColorMap) -> u32 {
    let transparent = if map.bg_transparent {
        BG_TRANSPARENT_BIT
    } else {
        0
    };
    (u32::from(map.y) & COORDINATE_MASK)
        | ((u32::from(map.x) & COORDINATE_MASK) << X_SHIFT)
        | ((u32::from(map.speed) & SPEED_MASK) << SPEED_SHIFT)
        | ((u32::from(map.color_count) & COUNT_MASK) << COUNT_SHIFT)
        | transparent
        | (u32::from(map.bg_scalar) << BG_SCALAR_SHIFT)
}

/// Encode a color map into its identifier.
///
/// Every field is masked to its bit width. Fails with
/// [`OrbError::InvalidColorMap`] when no stop is in use.
pub fn encode(map: &ColorMap) -> Result<TokenId, OrbError> {
    if map.is_blank() {
        return Err(OrbError::InvalidColorMap);
    }

    let mut id = U256::from(encode_metadata(map)) << METADATA_OFFSET;
    for (i, color) in map.colors.iter().enumerate() {
        id |= U256::from(encode_color(color)) << (i * SLOT_BITS);
    }
    Ok(TokenId::new(id))
}

/// Decode any identifier into a color map. Never fails; use the validator to
/// find out whether the result is a real artwork.
#[must_use]
pub fn decode(id: TokenId) -> ColorMap {
    let raw = id.as_u256();
    let mut colors = [ColorEntry::EMPTY; COLOR_SLOTS];
    for (i, color) in colors.iter_mut().enumerate() {
        *color = decode_color((raw >> (i * SLOT_BITS)).low_u32());
    }

    let meta = (raw >> METADATA_OFFSET).low_u32();
    ColorMap {
        x: ((meta >> X_SHIFT) & COORDINATE_MASK) as u16,
        y: (meta & COORDINATE_MASK) as u16,
        speed: ((meta >> SPEED_SHIFT) & SPEED_MASK) as u8,
        color_count: ((meta >> COUNT_SHIFT) & COUNT_MASK) as u8,
        bg_transparent: meta & BG_TRANSPARENT_BIT != 0,
        bg_scalar: (meta >> BG_SCALAR_SHIFT) as u8,
        colors,
    }
}

// =============================================================================
// PACKED ECONOMIC FIELDS
// =============================================================================

/// Supply cap, packed as `(supply << 6) | power`.
///
/// `supply` is the cap on minted units. `power` is display-only: wallets show
/// `supply * 10^power`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaxSupply {
    /// Units that may ever be minted.
    pub supply: U256,
    /// Decimal exponent for display, 6 bits.
    pub power: u8,
}

impl MaxSupply {
    /// Create a supply cap.
    #[must_use]
    pub fn new(supply: impl Into<U256>, power: u8) -> Self {
        Self {
            supply: supply.into(),
            power,
        }
    }

    /// Pack into the on-ledger word. `power` is masked to 6 bits.
    ///
    /// `supply` must be below `2^250`: higher bits are shifted out of the
    /// word. Use [`MaxSupply::checked_pack`] for untrusted input.
    #[must_use]
    pub fn pack(&self) -> U256 {
        (self.supply << POWER_BITS) | U256::from(u64::from(self.power) & POWER_MASK)
    }

    /// Pack, or `None` if `supply` does not fit in 250 bits.
    #[must_use]
    pub fn checked_pack(&self) -> Option<U256> {
        (self.supply >> (WORD_BITS - POWER_BITS)).is_zero().then(|| self.pack())
    }

    /// Unpack an on-ledger word.
    #[must_use]
    pub fn unpack(packed: U256) -> Self {
        Self {
            supply: packed >> POWER_BITS,
            power: (packed.low_u64() & POWER_MASK) as u8,
        }
    }

    /// `supply * 10^power`, or `None` on overflow.
    #[must_use]
    pub fn display_supply(&self) -> Option<U256> {
        self.supply
            .checked_mul(U256::exp10(usize::from(self.power)))
    }
}

/// Unit price, packed as `(base << 5) | decimals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Price {
    /// Mantissa.
    pub base: U256,
    /// Decimal exponent, 5 bits.
    pub decimals: u8,
}

impl Price {
    /// Create a price.
    #[must_use]
    pub fn new(base: impl Into<U256>, decimals: u8) -> Self {
        Self {
            base: base.into(),
            decimals,
        }
    }

    /// Pack into the on-ledger word. `decimals` is masked to 5 bits.
    ///
    /// `base` must be below `2^251`: higher bits are shifted out of the word.
    /// Use [`Price::checked_pack`] for untrusted input.
    #[must_use]
    pub fn pack(&self) -> U256 {
        (self.base << DECIMALS_BITS) | U256::from(u64::from(self.decimals) & DECIMALS_MASK)
    }

    /// Pack, or `None` if `base` does not fit in 251 bits.
    #[must_use]
    pub fn checked_pack(&self) -> Option<U256> {
        (self.base >> (WORD_BITS - DECIMALS_BITS)).is_zero().then(|| self.pack())
    }

    /// Unpack an on-ledger word.
    #[must_use]
    pub fn unpack(packed: U256) -> Self {
        Self {
            base: packed >> DECIMALS_BITS,
            decimals: (packed.low_u64() & DECIMALS_MASK) as u8,
        }
    }

    /// Funds owed for one unit: `base * 10^decimals`, or `None` on overflow.
    #[must_use]
    pub fn amount(&self) -> Option<U256> {
        self.base
            .checked_mul(U256::exp10(usize::from(self.decimals)))
    }

    /// Funds owed for `units` units, or `None` on overflow.
    #[must_use]
    pub fn amount_for(&self, units: u64) -> Option<U256> {
        self.amount()?.checked_mul(U256::from(units))
    }
}

/// Pack a supply cap.
#[must_use]
pub fn pack_max_supply(supply: impl Into<U256>, power: u8) -> U256 {
    MaxSupply::new(supply, power).pack()
}

/// Unpack a supply cap into `(supply, power)`.
#[must_use]
pub fn unpack_max_supply(packed: U256) -> (U256, u8) {
    let max = MaxSupply::unpack(packed);
    (max.supply, max.power)
}

/// Pack a price.
#[must_use]
pub fn pack_price(base: impl Into<U256>, decimals: u8) -> U256 {
    Price::new(base, decimals).pack()
}

/// Unpack a price into `(base, decimals)`.
#[must_use]
pub fn unpack_price(packed: U256) -> (U256, u8) {
    let price = Price::unpack(packed);
    (price.base, price.decimals)
}

// =============================================================================
// TESTS
// =============================================================================
