//! # Token Metadata
//!
//! Marketplace-style JSON metadata derived from a decoded color map. The
//! image itself is produced elsewhere.

use crate::domain::color_map::ColorMap;
use orb_types::TokenId;
use serde::{Deserialize, Serialize};

/// Metadata document for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// `"<collection> #<id>"`.
    pub name: String,
    /// Human-readable summary.
    pub description: String,
    /// Link to the hosted viewer.
    pub external_url: String,
    /// Traits, in display order.
    pub attributes: Vec<Attribute>,
}

/// One trait of the artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Set to `"number"` for numeric traits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    /// Trait name.
    pub trait_type: String,
    /// Trait value.
    pub value: AttributeValue,
}

/// A trait value: text or number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(u64),
}

impl Attribute {
    fn text(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display_type: None,
            trait_type: trait_type.into(),
            value: AttributeValue::Text(value.into()),
        }
    }

    fn number(trait_type: impl Into<String>, value: u64) -> Self {
        Self {
            display_type: Some("number".to_string()),
            trait_type: trait_type.into(),
            value: AttributeValue::Number(value),
        }
    }
}

/// Build the metadata document for a validated identifier.
#[must_use]
pub fn token_metadata(
    id: TokenId,
    map: &ColorMap,
    collection_name: &str,
    ipfs_hash: &str,
) -> TokenMetadata {
    let background = if map.bg_transparent {
        "Transparent".to_string()
    } else {
        let s = map.bg_scalar;
        format!("#{s:02X}{s:02X}{s:02X}")
    };

    let mut attributes = vec![
        Attribute::text("Coordinates", format!("({}, {})", map.x, map.y)),
        Attribute::number("Speed", u64::from(map.speed)),
        Attribute::number("Colors", u64::from(map.color_count)),
        Attribute::text("Background", background),
    ];
    attributes.extend(map.used_colors().map(|(slot, color)| {
        Attribute::text(
            format!("Color #{}", slot + 1),
            format!("{}:{}", color.hex(), color.domain),
        )
    }));

    TokenMetadata {
        name: format!("{collection_name} #{id}"),
        description: format!(
            "{collection_name} is a generative gradient whose token id is its own color map."
        ),
        external_url: format!("ipfs://{ipfs_hash}/?id={id}"),
        attributes,
    }
}
