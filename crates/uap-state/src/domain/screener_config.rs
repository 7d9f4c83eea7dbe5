//! # Screener Config Variants
//!
//! Typed per-screener payloads. Each kind has a fixed byte contract, so the
//! stored tail of a screener record is decoded by kind, not by inspection.

use super::codec::{decode_bool, encode_bool};
use super::errors::ConfigError;
use super::value_objects::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// Screener implementations with a known payload contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenerKind {
    /// Passes when the sender is (or is not) in a named address list.
    AddressList,
    /// Passes when the sender is (or is not) curated in a curation registry.
    CurationChecker,
    /// Any other screener; payload kept verbatim.
    Opaque,
}

/// Configuration payload of one screener.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenerConfig {
    /// `return_value_when_in_list(1)`
    AddressList { return_value_when_in_list: bool },
    /// `curated_list(20) ‖ return_value_when_curated(1)`
    CurationChecker {
        curated_list: Address,
        return_value_when_curated: bool,
    },
    Opaque { data: Bytes },
}

impl ScreenerConfig {
    pub fn kind(&self) -> ScreenerKind {
        match self {
            Self::AddressList { .. } => ScreenerKind::AddressList,
            Self::CurationChecker { .. } => ScreenerKind::CurationChecker,
            Self::Opaque { .. } => ScreenerKind::Opaque,
        }
    }

    /// Returns true if the screener reads a named address list.
    #[must_use]
    pub fn needs_address_list(&self) -> bool {
        matches!(self, Self::AddressList { .. })
    }

    pub fn encode(&self) -> Bytes {
        match self {
            Self::AddressList {
                return_value_when_in_list,
            } => encode_bool(*return_value_when_in_list),
            Self::CurationChecker {
                curated_list,
                return_value_when_curated,
            } => {
                let mut out = curated_list.0.to_vec();
                out.extend(encode_bool(*return_value_when_curated));
                out
            }
            Self::Opaque { data } => data.clone(),
        }
    }

    pub fn decode(kind: ScreenerKind, data: &[u8]) -> Result<Self, ConfigError> {
        match kind {
            ScreenerKind::AddressList => Ok(Self::AddressList {
                return_value_when_in_list: decode_bool(data)?,
            }),
            ScreenerKind::CurationChecker => {
                if data.len() != 21 {
                    return Err(ConfigError::malformed(
                        "curation checker config",
                        format!("expected 21 bytes, got {}", data.len()),
                    ));
                }
                let (list, flag) = data.split_at(20);
                Ok(Self::CurationChecker {
                    curated_list: Address::from_slice(list)
                        .ok_or_else(|| ConfigError::malformed("curation checker config", "list"))?,
                    return_value_when_curated: decode_bool(flag)?,
                })
            }
            ScreenerKind::Opaque => Ok(Self::Opaque {
                data: data.to_vec(),
            }),
        }
    }
}
