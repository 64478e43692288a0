//! # Validator
//!
//! Structural validity of an identifier. Stateless: the answer depends on
//! the identifier bits alone, never on stored provenance.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. some color slot carries bits (`NoColors`)
//! 2. no addressed slot at domain 0, whatever its in-use flag (`InvalidColorDomain`)
//! 3. at least one stop in use (`NoColors`)
//! 4. declared count matches the in-use stops (`InvalidColorCount`)
//! 5. focal point within `0..=360` (`InvalidCoordinates`)

use crate::domain::codec::{decode, encode_color};
use crate::domain::color_map::{ColorMap, MAX_COORDINATE};
use crate::errors::OrbError;
use orb_types::TokenId;

/// Decode `id` and check that it describes a real artwork.
pub fn is_valid(id: TokenId) -> Result<ColorMap, OrbError> {
    let map = decode(id);

    if map.colors.iter().all(|c| encode_color(c) == 0) {
        return Err(OrbError::NoColors);
    }

    // Domain 0 doubles as the "unknown identifier" signal.
    if let Some(slot) = map
        .colors
        .iter()
        .position(|c| encode_color(c) != 0 && c.domain == 0)
    {
        return Err(OrbError::InvalidColorDomain { slot });
    }

    if map.is_blank() {
        return Err(OrbError::NoColors);
    }

    let actual = map.non_empty_count();
    if map.color_count != actual {
        return Err(OrbError::InvalidColorCount {
            declared: map.color_count,
            actual,
        });
    }

    if map.x > MAX_COORDINATE || map.y > MAX_COORDINATE {
        return Err(OrbError::InvalidCoordinates { x: map.x, y: map.y });
    }

    Ok(map)
}
