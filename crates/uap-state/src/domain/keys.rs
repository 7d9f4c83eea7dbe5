//! # Key Derivation
//!
//! Deterministic storage keys from a named template and its dynamic
//! parameters. Layouts follow the LSP2 key scheme:
//!
//! ```text
//! Name                 keccak256("Name")
//! Name:<T>             keccak256("Name")[..10] ‖ 0000 ‖ param[20]
//! Name:<T1>:<T2>       keccak256("Name")[..6]  ‖ param[4] ‖ 0000 ‖ param[20]
//! Name[]               keccak256("Name[]")
//! Name[] index i       keccak256("Name[]")[..16] ‖ uint128(i)
//! ```

use super::errors::ConfigError;
use super::value_objects::{Address, DataKey, TypeId};
use primitive_types::U256;
use sha3::{Digest, Keccak256};

// =============================================================================
// TEMPLATES
// =============================================================================

/// Ordered executive addresses for a transaction type.
pub const TYPE_CONFIG: &str = "UAPTypeConfig:<bytes32>";
/// Executive record at a position.
pub const EXECUTIVE_CONFIG: &str = "UAPExecutiveConfig:<bytes32>:<uint256>";
/// Screener addresses gating a position.
pub const EXECUTIVE_SCREENERS: &str = "UAPExecutiveScreeners:<bytes32>:<uint256>";
/// AND/OR combine flag for a position's screeners.
pub const EXECUTIVE_SCREENERS_AND_LOGIC: &str =
    "UAPExecutiveScreenersANDLogic:<bytes32>:<uint256>";
/// Screener record at a screener order.
pub const SCREENER_CONFIG: &str = "UAPScreenerConfig:<bytes32>:<uint256>";
/// Address list name used by the screener at a screener order.
pub const ADDRESS_LIST_NAME: &str = "UAPAddressListName:<bytes32>:<uint256>";

/// Compute Keccak256 hash.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Declared type of a dynamic template slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Bytes32,
    Uint256,
    Address,
}

impl ParamType {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "<bytes32>" => Some(Self::Bytes32),
            "<uint256>" => Some(Self::Uint256),
            "<address>" => Some(Self::Address),
            _ => None,
        }
    }
}

/// A dynamic parameter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyParam {
    Bytes32([u8; 32]),
    Uint256(U256),
    Address(Address),
}

impl KeyParam {
    fn param_type(&self) -> ParamType {
        match self {
            Self::Bytes32(_) => ParamType::Bytes32,
            Self::Uint256(_) => ParamType::Uint256,
            Self::Address(_) => ParamType::Address,
        }
    }

    /// Fit the value into `N` bytes.
    ///
    /// bytes32 and address keep their left-most bytes, uint256 its right-most.
    fn fit<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        match self {
            Self::Bytes32(bytes) => out.copy_from_slice(&bytes[..N]),
            Self::Address(addr) => out.copy_from_slice(&addr.0[..N]),
            Self::Uint256(value) => {
                let mut word = [0u8; 32];
                value.to_big_endian(&mut word);
                out.copy_from_slice(&word[32 - N..]);
            }
        }
        out
    }
}

impl From<TypeId> for KeyParam {
    fn from(id: TypeId) -> Self {
        Self::Bytes32(id.0)
    }
}

impl From<Address> for KeyParam {
    fn from(addr: Address) -> Self {
        Self::Address(addr)
    }
}

impl From<u64> for KeyParam {
    fn from(value: u64) -> Self {
        Self::Uint256(U256::from(value))
    }
}

// =============================================================================
// TEMPLATE
// =============================================================================

/// A parsed key template: name plus up to two typed dynamic slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyTemplate {
    name: String,
    params: Vec<ParamType>,
}

impl KeyTemplate {
    /// Parse `Name`, `Name:<T>` or `Name:<T1>:<T2>`.
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let mut parts = template.split(':');
        let name = parts.next().unwrap_or_default();
        if name.is_empty() || name.contains('<') || name.ends_with("[]") {
            return Err(ConfigError::InvalidTemplate(template.to_string()));
        }
        let params = parts
            .map(|token| {
                ParamType::parse(token)
                    .ok_or_else(|| ConfigError::InvalidTemplate(template.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if params.len() > 2 {
            return Err(ConfigError::InvalidTemplate(template.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            params,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Derive the key for concrete parameter values.
    pub fn derive(&self, params: &[KeyParam]) -> Result<DataKey, ConfigError> {
        if params.len() != self.params.len() {
            return Err(ConfigError::InvalidTemplate(format!(
                "{} expects {} parameters, got {}",
                self.name,
                self.params.len(),
                params.len()
            )));
        }
        for (index, (declared, given)) in self.params.iter().zip(params).enumerate() {
            if *declared != given.param_type() {
                return Err(ConfigError::InvalidTemplate(format!(
                    "{} parameter {index}: expected {declared:?}, got {:?}",
                    self.name,
                    given.param_type()
                )));
            }
        }

        Ok(match params {
            [] => singleton_key(&self.name),
            [single] => mapping_key(&self.name, single),
            [first, second] => grouping_key(&self.name, first, second),
            _ => return Err(ConfigError::InvalidTemplate(self.name.clone())),
        })
    }
}

fn singleton_key(name: &str) -> DataKey {
    DataKey(keccak256(name.as_bytes()))
}

fn mapping_key(name: &str, param: &KeyParam) -> DataKey {
    let hash = keccak256(name.as_bytes());
    let mut key = [0u8; 32];
    key[..10].copy_from_slice(&hash[..10]);
    key[12..].copy_from_slice(&param.fit::<20>());
    DataKey(key)
}

fn grouping_key(name: &str, first: &KeyParam, second: &KeyParam) -> DataKey {
    let hash = keccak256(name.as_bytes());
    let mut key = [0u8; 32];
    key[..6].copy_from_slice(&hash[..6]);
    key[6..10].copy_from_slice(&first.fit::<4>());
    key[12..].copy_from_slice(&second.fit::<20>());
    DataKey(key)
}

/// Derive a key from a template string and its parameters.
pub fn derive_key(template: &str, params: &[KeyParam]) -> Result<DataKey, ConfigError> {
    KeyTemplate::parse(template)?.derive(params)
}

// =============================================================================
// ARRAY KEYS
// =============================================================================

/// Length key of the array `name[]`.
pub fn array_length_key(name: &str) -> DataKey {
    DataKey(keccak256(format!("{name}[]").as_bytes()))
}

/// Element key of `name[]` at `index`.
pub fn array_index_key(name: &str, index: u128) -> DataKey {
    let hash = keccak256(format!("{name}[]").as_bytes());
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(&hash[..16]);
    key[16..].copy_from_slice(&index.to_be_bytes());
    DataKey(key)
}

/// Reverse-lookup key `nameMap:<address>`.
pub fn array_map_key(name: &str, address: Address) -> DataKey {
    mapping_key(&format!("{name}Map"), &KeyParam::Address(address))
}

// =============================================================================
// SCHEMA SHORTCUTS
// =============================================================================

pub fn type_config_key(type_id: TypeId) -> DataKey {
    mapping_key("UAPTypeConfig", &type_id.into())
}

pub fn executive_config_key(type_id: TypeId, position: u64) -> DataKey {
    grouping_key("UAPExecutiveConfig", &type_id.into(), &position.into())
}

pub fn executive_screeners_key(type_id: TypeId, position: u64) -> DataKey {
    grouping_key("UAPExecutiveScreeners", &type_id.into(), &position.into())
}

pub fn screeners_logic_key(type_id: TypeId, position: u64) -> DataKey {
    grouping_key("UAPExecutiveScreenersANDLogic", &type_id.into(), &position.into())
}

pub fn screener_config_key(type_id: TypeId, screener_order: u64) -> DataKey {
    grouping_key("UAPScreenerConfig", &type_id.into(), &screener_order.into())
}

pub fn address_list_name_key(type_id: TypeId, screener_order: u64) -> DataKey {
    grouping_key("UAPAddressListName", &type_id.into(), &screener_order.into())
}
