//! # Domain Entities
//!
//! Desired-state specs handed to the target builder, and the reconstructed
//! attachment returned by the configuration reader.

use super::screener_config::ScreenerConfig;
use super::value_objects::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// How sibling screeners of one executive combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CombineLogic {
    #[default]
    And,
    Or,
}

impl CombineLogic {
    /// Stored flag value: true means AND.
    #[must_use]
    pub fn is_and(self) -> bool {
        matches!(self, Self::And)
    }

    #[must_use]
    pub fn from_and_flag(and: bool) -> Self {
        if and {
            Self::And
        } else {
            Self::Or
        }
    }
}

/// Named ordered address set referenced by a screener.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressListSpec {
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

/// Desired screener attached to an executive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenerSpec {
    pub address: Address,
    pub config: ScreenerConfig,
    #[serde(default)]
    pub address_list: Option<AddressListSpec>,
}

/// Desired executive at one chain position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveSpec {
    pub address: Address,
    #[serde(default)]
    pub config: Bytes,
    #[serde(default)]
    pub screeners: Vec<ScreenerSpec>,
    #[serde(default)]
    pub combine: CombineLogic,
}

impl ExecutiveSpec {
    pub fn new(address: Address, config: Bytes) -> Self {
        Self {
            address,
            config,
            screeners: Vec::new(),
            combine: CombineLogic::default(),
        }
    }

    pub fn with_screener(mut self, screener: ScreenerSpec) -> Self {
        self.screeners.push(screener);
        self
    }

    pub fn with_combine(mut self, combine: CombineLogic) -> Self {
        self.combine = combine;
        self
    }
}

/// A screener as reconstructed from storage.
///
/// `config` is `None` when its slot was unset or unreadable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenerAttachment {
    pub address: Address,
    pub config: Option<Bytes>,
    pub address_list: Option<String>,
}

/// One assistant's current attachment to a transaction type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantAttachment {
    pub address: Address,
    pub position: usize,
    /// `None` when the executive record was unset or unreadable.
    pub config: Option<Bytes>,
    pub screeners: Vec<ScreenerAttachment>,
    /// `None` when no screeners are attached or the flag was unreadable.
    pub combine: Option<CombineLogic>,
}
