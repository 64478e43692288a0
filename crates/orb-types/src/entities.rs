//! # Core Entities
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `TokenId`
//! - **Time**: `Timestamp`
//! - **Economics**: `Provenance`

use crate::errors::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 20-byte Ethereum-style address.
///
/// Identifies callers, token holders and vaults. The zero address is the
/// "nobody" identity used as `from` on mints and `to` on burns.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address whose every byte is `byte`. Handy for fixtures.
    #[must_use]
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes).ok_or(ParseError::InvalidLength {
            expected: 20,
            actual: bytes.len(),
        })
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// The 256-bit identifier of an Orb token.
///
/// The value is the bit-packed color map of the artwork, so two tokens share
/// an id exactly when they share an artwork.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TokenId(pub U256);

impl TokenId {
    /// The zero identifier. Never valid: it decodes to a map with no colors.
    pub const ZERO: Self = Self(U256([0u64; 4]));

    /// Wraps a raw 256-bit value.
    #[must_use]
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Returns the raw 256-bit value.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Returns true if every bit is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({:#x})", self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenId {
    type Err = ParseError;

    /// Accepts decimal (`1155...`) or `0x`-prefixed hexadecimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.strip_prefix("0x") {
            Some(digits) => U256::from_str_radix(digits, 16).map_err(|e| format!("{e:?}")),
            None => U256::from_dec_str(s).map_err(|e| format!("{e:?}")),
        };
        parsed.map(Self).map_err(ParseError::InvalidInteger)
    }
}

impl From<U256> for TokenId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<TokenId> for U256 {
    fn from(id: TokenId) -> Self {
        id.0
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Repr::Number(n) => Ok(Self::from(n)),
        }
    }
}

// =============================================================================
// CLUSTER B: TIME
// =============================================================================

/// Unix timestamp in seconds.
pub type Timestamp = u64;

// =============================================================================
// CLUSTER C: ECONOMICS
// =============================================================================

/// Economic terms attached to a token id.
///
/// `max_supply` and `price` are kept in their packed on-ledger form
/// (`(supply << 6) | power` and `(base << 5) | decimals`). A zeroed record is
/// the "unset" provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Provenance {
    /// Packed supply cap.
    #[serde(default)]
    pub max_supply: U256,
    /// Packed unit price.
    #[serde(default)]
    pub price: U256,
    /// Units minted so far. Ignored on input; the engine owns this counter.
    #[serde(default)]
    pub total_supply: u64,
    /// Unix timestamp after which minting stops, 0 = unlimited.
    #[serde(default)]
    pub closure: Timestamp,
    /// Beneficiary and controller of the terms.
    #[serde(default)]
    pub vault: Address,
}

impl Provenance {
    /// Returns true if every field is zero.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_and_display() {
        let addr: Address = "0x0101010101010101010101010101010101010101".parse().unwrap();
        assert_eq!(addr, Address::repeat_byte(1));
        assert_eq!(
            addr.to_string(),
            "0x0101010101010101010101010101010101010101"
        );
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        let err = "0x0102".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLength {
                expected: 20,
                actual: 2
            }
        );
    }

    #[test]
    fn test_token_id_parses_decimal_and_hex() {
        let dec: TokenId = "255".parse().unwrap();
        let hex: TokenId = "0xff".parse().unwrap();
        assert_eq!(dec, hex);
        assert_eq!(dec.to_string(), "255");
    }

    #[test]
    fn test_token_id_serde_as_decimal_string() {
        let id = TokenId::from(42u64);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");

        let back: TokenId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let from_number: TokenId = serde_json::from_str("42").unwrap();
        assert_eq!(from_number, id);
    }

    #[test]
    fn test_provenance_default_is_unset() {
        assert!(Provenance::default().is_unset());

        let provenance = Provenance {
            closure: 1,
            ..Provenance::default()
        };
        assert!(!provenance.is_unset());
    }

    #[test]
    fn test_provenance_deserializes_with_missing_fields() {
        let json = r#"{"vault":"0x0202020202020202020202020202020202020202"}"#;
        let provenance: Provenance = serde_json::from_str(json).unwrap();
        assert_eq!(provenance.vault, Address::repeat_byte(2));
        assert!(provenance.price.is_zero());
    }
}
