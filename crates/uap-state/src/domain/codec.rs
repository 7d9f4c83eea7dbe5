//! # Tuple Codec
//!
//! Binary layouts of every value the configuration schema stores.
//!
//! | Value | Layout |
//! |-------|--------|
//! | executive record | `address(20) ‖ config` |
//! | screener record | `executive(20) ‖ screener(20) ‖ config` |
//! | address array | ABI `address[]`: offset word, length word, padded words |
//! | string | ABI `string`: offset word, length word, padded UTF-8 |
//! | boolean | one byte, `0x01` / `0x00` |
//! | counter | `uint128` big-endian, 16 bytes |

use super::errors::ConfigError;
use super::value_objects::{Address, Bytes};

const WORD: usize = 32;
const ADDRESS_LEN: usize = 20;

// =============================================================================
// EXECUTIVE / SCREENER RECORDS
// =============================================================================

/// Encode an executive record.
pub fn encode_executive(address: Address, config: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(ADDRESS_LEN + config.len());
    out.extend_from_slice(&address.0);
    out.extend_from_slice(config);
    out
}

/// Decode an executive record. A missing tail decodes to empty config.
pub fn decode_executive(data: &[u8]) -> Result<(Address, Bytes), ConfigError> {
    if data.len() < ADDRESS_LEN {
        return Err(ConfigError::malformed(
            "executive",
            format!("{} bytes, need at least {ADDRESS_LEN}", data.len()),
        ));
    }
    let (head, tail) = data.split_at(ADDRESS_LEN);
    let address = Address::from_slice(head)
        .ok_or_else(|| ConfigError::malformed("executive", "address prefix"))?;
    Ok((address, tail.to_vec()))
}

/// Encode a screener record.
pub fn encode_screener_record(executive: Address, screener: Address, config: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(2 * ADDRESS_LEN + config.len());
    out.extend_from_slice(&executive.0);
    out.extend_from_slice(&screener.0);
    out.extend_from_slice(config);
    out
}

/// Decode a screener record into `(executive, screener, config)`.
pub fn decode_screener_record(data: &[u8]) -> Result<(Address, Address, Bytes), ConfigError> {
    if data.len() < 2 * ADDRESS_LEN {
        return Err(ConfigError::malformed(
            "screener",
            format!("{} bytes, need at least {}", data.len(), 2 * ADDRESS_LEN),
        ));
    }
    let (executive, rest) = data.split_at(ADDRESS_LEN);
    let (screener, config) = rest.split_at(ADDRESS_LEN);
    match (Address::from_slice(executive), Address::from_slice(screener)) {
        (Some(executive), Some(screener)) => Ok((executive, screener, config.to_vec())),
        _ => Err(ConfigError::malformed("screener", "address prefix")),
    }
}

// =============================================================================
// ABI HELPERS
// =============================================================================

fn word_from_usize(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

/// Read a word as usize; upper bytes must be zero.
fn usize_from_word(word: &[u8], record: &'static str) -> Result<usize, ConfigError> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(ConfigError::malformed(record, "word overflows usize"));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(raw))
        .map_err(|_| ConfigError::malformed(record, "word overflows usize"))
}

fn word_at<'a>(data: &'a [u8], offset: usize, record: &'static str) -> Result<&'a [u8], ConfigError> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| ConfigError::malformed(record, format!("truncated at byte {offset}")))
}

/// Locate the dynamic payload: returns `(length, body_start)`.
fn dynamic_header(data: &[u8], record: &'static str) -> Result<(usize, usize), ConfigError> {
    let offset = usize_from_word(word_at(data, 0, record)?, record)?;
    let length = usize_from_word(word_at(data, offset, record)?, record)?;
    Ok((length, offset + WORD))
}

// =============================================================================
// ADDRESS ARRAYS
// =============================================================================

/// ABI-encode `address[]`.
pub fn encode_address_array(addresses: &[Address]) -> Bytes {
    let mut out = Vec::with_capacity(WORD * (2 + addresses.len()));
    out.extend_from_slice(&word_from_usize(WORD));
    out.extend_from_slice(&word_from_usize(addresses.len()));
    for address in addresses {
        out.extend_from_slice(&[0u8; WORD - ADDRESS_LEN]);
        out.extend_from_slice(&address.0);
    }
    out
}

/// Decode ABI `address[]`. Empty input is an empty array.
pub fn decode_address_array(data: &[u8]) -> Result<Vec<Address>, ConfigError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let (length, start) = dynamic_header(data, "address array")?;
    let needed = length
        .checked_mul(WORD)
        .and_then(|n| n.checked_add(start))
        .ok_or_else(|| ConfigError::malformed("address array", "length overflow"))?;
    if data.len() < needed {
        return Err(ConfigError::malformed(
            "address array",
            format!("{length} elements need {needed} bytes, have {}", data.len()),
        ));
    }
    (0..length)
        .map(|i| {
            let word = word_at(data, start + i * WORD, "address array")?;
            if word[..WORD - ADDRESS_LEN].iter().any(|b| *b != 0) {
                return Err(ConfigError::malformed(
                    "address array",
                    format!("element {i} has dirty padding"),
                ));
            }
            Address::from_slice(&word[WORD - ADDRESS_LEN..])
                .ok_or_else(|| ConfigError::malformed("address array", "element width"))
        })
        .collect()
}

// =============================================================================
// STRINGS
// =============================================================================

/// ABI-encode a UTF-8 string.
pub fn encode_string(value: &str) -> Bytes {
    let bytes = value.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(2 * WORD + padded);
    out.extend_from_slice(&word_from_usize(WORD));
    out.extend_from_slice(&word_from_usize(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(2 * WORD + padded, 0);
    out
}

/// Decode an ABI string.
pub fn decode_string(data: &[u8]) -> Result<String, ConfigError> {
    let (length, start) = dynamic_header(data, "string")?;
    let body = start
        .checked_add(length)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| ConfigError::malformed("string", "truncated body"))?;
    String::from_utf8(body.to_vec()).map_err(|e| ConfigError::malformed("string", e.to_string()))
}

// =============================================================================
// SCALARS
// =============================================================================

pub fn encode_bool(value: bool) -> Bytes {
    vec![u8::from(value)]
}

/// Decode a boolean; only `[0x00]` and `[0x01]` are valid.
pub fn decode_bool(data: &[u8]) -> Result<bool, ConfigError> {
    match data {
        [0x01] => Ok(true),
        [0x00] => Ok(false),
        other => Err(ConfigError::malformed(
            "boolean",
            format!("expected 0x00 or 0x01, got {} bytes", other.len()),
        )),
    }
}

pub fn encode_u128(value: u128) -> Bytes {
    value.to_be_bytes().to_vec()
}

/// Decode a `uint128` counter. Unset (empty) reads as zero.
pub fn decode_u128(data: &[u8]) -> Result<u128, ConfigError> {
    if data.is_empty() {
        return Ok(0);
    }
    let raw: [u8; 16] = data
        .try_into()
        .map_err(|_| ConfigError::malformed("uint128", format!("{} bytes", data.len())))?;
    Ok(u128::from_be_bytes(raw))
}
