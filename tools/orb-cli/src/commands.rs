//! # One-shot Commands
//!
//! Stateless codec, validation and metadata commands. Each returns a JSON
//! value for the binary to print; numbers wider than 64 bits are rendered as
//! decimal strings with a `0x` form alongside where useful.

use anyhow::{Context, Result};
use orb_provenance::prelude::*;
use serde_json::{json, Value};

/// Parse a 256-bit integer given in decimal or `0x` hexadecimal.
pub fn parse_u256(text: &str) -> Result<U256> {
    let text = text.trim();
    match text.strip_prefix("0x") {
        Some(digits) => U256::from_str_radix(digits, 16)
            .map_err(|e| anyhow::anyhow!("invalid hex integer {text:?}: {e:?}")),
        None => U256::from_dec_str(text)
            .map_err(|e| anyhow::anyhow!("invalid decimal integer {text:?}: {e:?}")),
    }
}

/// Parse a token id given in decimal or `0x` hexadecimal.
pub fn parse_id(text: &str) -> Result<TokenId> {
    text.trim()
        .parse::<TokenId>()
        .with_context(|| format!("invalid token id {text:?}"))
}

fn id_json(id: TokenId) -> Value {
    json!({
        "id": id.to_string(),
        "hex": format!("{:#x}", id.as_u256()),
    })
}

/// Encode a color map given as JSON (camelCase fields).
///
/// When `recount` is set, `colorCount` is recomputed from the colors
/// instead of taken from the input.
pub fn encode_map(map_json: &str, recount: bool) -> Result<Value> {
    let mut map: ColorMap = serde_json::from_str(map_json).context("invalid color map JSON")?;
    if recount {
        map.color_count = map.non_empty_count();
    }

    let id = encode(&map)?;
    let mut out = id_json(id);
    out["valid"] = json!(is_valid(id).is_ok());
    Ok(out)
}

/// Decode any identifier and report whether it is valid.
pub fn decode_id(text: &str) -> Result<Value> {
    let id = parse_id(text)?;
    let map = decode(id);

    let mut out = id_json(id);
    out["map"] = serde_json::to_value(map)?;
    match is_valid(id) {
        Ok(_) => out["valid"] = json!(true),
        Err(e) => {
            out["valid"] = json!(false);
            out["error"] = json!(e.kind().as_str());
            out["reason"] = json!(e.to_string());
        }
    }
    Ok(out)
}

/// Validate an identifier. Invalid ids are an error.
pub fn validate_id(text: &str) -> Result<Value> {
    let id = parse_id(text)?;
    let map = is_valid(id).with_context(|| format!("token id {id} is not a valid color map"))?;

    let mut out = id_json(id);
    out["valid"] = json!(true);
    out["colors"] = json!(map.color_count);
    Ok(out)
}

/// Metadata document for a valid identifier.
pub fn metadata(text: &str, config: &EngineConfig) -> Result<Value> {
    let id = parse_id(text)?;
    let map = is_valid(id)?;
    let doc = orb_provenance::domain::metadata::token_metadata(
        id,
        &map,
        &config.collection_name,
        &config.ipfs_hash,
    );
    Ok(serde_json::to_value(doc)?)
}

/// Pack a supply cap.
pub fn pack_supply(supply: &str, power: u8) -> Result<Value> {
    let max = MaxSupply::new(parse_u256(supply)?, power);
    if max.checked_pack().is_none() {
        anyhow::bail!("supply {supply} does not fit in 250 bits");
    }
    Ok(supply_json(max))
}

/// Unpack a packed supply cap.
pub fn unpack_supply(packed: &str) -> Result<Value> {
    Ok(supply_json(MaxSupply::unpack(parse_u256(packed)?)))
}

fn supply_json(max: MaxSupply) -> Value {
    json!({
        "packed": max.pack().to_string(),
        "supply": max.supply.to_string(),
        "power": max.power,
        "display": max.display_supply().map(|d| d.to_string()),
    })
}

/// Pack a unit price.
pub fn pack_price(base: &str, decimals: u8) -> Result<Value> {
    let price = Price::new(parse_u256(base)?, decimals);
    if price.checked_pack().is_none() {
        anyhow::bail!("price base {base} does not fit in 251 bits");
    }
    Ok(price_json(price))
}

/// Unpack a packed unit price.
pub fn unpack_price(packed: &str) -> Result<Value> {
    Ok(price_json(Price::unpack(parse_u256(packed)?)))
}

fn price_json(price: Price) -> Value {
    json!({
        "packed": price.pack().to_string(),
        "base": price.base.to_string(),
        "decimals": price.decimals,
        "amount": price.amount().map(|a| a.to_string()),
    })
}
