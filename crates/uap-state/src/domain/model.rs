//! # State Model
//!
//! In-memory snapshot of one transaction type's configuration, shared by the
//! analyzer (current) and the target builder (desired). The diff engine only
//! ever compares two of these; neither is persisted directly.

use super::address_list::StoredList;
use super::codec::{decode_address_array, decode_bool, decode_executive, decode_screener_record, decode_string};
use super::entities::{AddressListSpec, CombineLogic, ExecutiveSpec, ScreenerSpec};
use super::errors::ConfigError;
use super::keys;
use super::order::screener_order;
use super::screener_config::ScreenerConfig;
use super::value_objects::{Address, Bytes, DataKey, TypeId};
use std::collections::BTreeMap;
use tracing::warn;

// =============================================================================
// SLOTS
// =============================================================================

/// A per-position or per-screener storage slot of a transaction type.
///
/// Variant order is the order writes are emitted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    ExecutiveRecord { position: u64 },
    ScreenerAddresses { position: u64 },
    ScreenerLogic { position: u64 },
    ScreenerConfig { order: u64 },
    AddressListName { order: u64 },
}

impl Slot {
    pub fn key(&self, type_id: TypeId) -> DataKey {
        match *self {
            Self::ExecutiveRecord { position } => keys::executive_config_key(type_id, position),
            Self::ScreenerAddresses { position } => keys::executive_screeners_key(type_id, position),
            Self::ScreenerLogic { position } => keys::screeners_logic_key(type_id, position),
            Self::ScreenerConfig { order } => keys::screener_config_key(type_id, order),
            Self::AddressListName { order } => keys::address_list_name_key(type_id, order),
        }
    }
}

// =============================================================================
// STATE MODEL
// =============================================================================

/// Every key one transaction type's configuration occupies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateModel {
    pub type_id: TypeId,
    /// Ordered executive addresses stored at the type key.
    pub executives: Vec<Address>,
    /// The type key holds a value that does not decode as an address array.
    pub malformed_type_array: bool,
    /// Occupied slots. Values are never empty.
    slots: BTreeMap<Slot, Bytes>,
    /// Address lists referenced by any screener, by name.
    pub address_lists: BTreeMap<String, Vec<Address>>,
    /// Lists read back lossily, with the element count their length key claims.
    damaged_lists: BTreeMap<String, usize>,
}

impl StateModel {
    pub fn new(type_id: TypeId) -> Self {
        Self {
            type_id,
            executives: Vec::new(),
            malformed_type_array: false,
            slots: BTreeMap::new(),
            address_lists: BTreeMap::new(),
            damaged_lists: BTreeMap::new(),
        }
    }

    /// Record an occupied slot. Empty values mean unset and are dropped.
    pub fn insert_slot(&mut self, slot: Slot, value: Bytes) {
        if value.is_empty() {
            self.slots.remove(&slot);
        } else {
            self.slots.insert(slot, value);
        }
    }

    pub fn slot(&self, slot: &Slot) -> Option<&Bytes> {
        self.slots.get(slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&Slot, &Bytes)> {
        self.slots.iter()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing is stored for the type.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executives.is_empty()
            && !self.malformed_type_array
            && self.slots.is_empty()
            && self.address_lists.is_empty()
    }

    /// Record a list read back from storage. Lossy reads are remembered so
    /// the diff rewrites the list whatever the target holds.
    pub fn insert_stored_list(&mut self, name: String, list: StoredList) {
        if list.complete {
            self.damaged_lists.remove(&name);
        } else {
            self.damaged_lists.insert(name.clone(), list.stored_len);
        }
        self.address_lists.insert(name, list.addresses);
    }

    /// Claimed length of `name` if it was read back lossily.
    pub fn damaged_list_len(&self, name: &str) -> Option<usize> {
        self.damaged_lists.get(name).copied()
    }

    pub fn position_of(&self, address: Address) -> Option<usize> {
        self.executives.iter().position(|a| *a == address)
    }

    /// Invert the model into executive specs.
    ///
    /// Screener payloads come back as opaque bytes since the stored record
    /// does not carry the screener kind. Unreadable slots fall back to empty
    /// values, so building a target from the result and diffing rewrites them.
    /// Screener arrays longer than `max_screeners` are cut to that length;
    /// the diff then clears the dropped screeners' slots.
    pub fn executive_specs(&self, max_screeners: usize) -> Result<Vec<ExecutiveSpec>, ConfigError> {
        self.executives
            .iter()
            .enumerate()
            .map(|(position, address)| self.executive_spec(position, *address, max_screeners))
            .collect()
    }

    fn executive_spec(
        &self,
        position: usize,
        address: Address,
        max_screeners: usize,
    ) -> Result<ExecutiveSpec, ConfigError> {
        let pos = position as u64;
        let config = self
            .slot(&Slot::ExecutiveRecord { position: pos })
            .and_then(|raw| decode_executive(raw).ok())
            .map(|(_, config)| config)
            .unwrap_or_default();
        let mut screeners = self
            .slot(&Slot::ScreenerAddresses { position: pos })
            .and_then(|raw| decode_address_array(raw).ok())
            .unwrap_or_default();
        if screeners.len() > max_screeners {
            warn!(
                position,
                stored = screeners.len(),
                max = max_screeners,
                "Trimming screeners above capacity"
            );
            screeners.truncate(max_screeners);
        }
        let combine = self
            .slot(&Slot::ScreenerLogic { position: pos })
            .and_then(|raw| decode_bool(raw).ok())
            .map(CombineLogic::from_and_flag)
            .unwrap_or_default();

        let screeners = screeners
            .into_iter()
            .enumerate()
            .map(|(sibling, screener)| {
                let order = screener_order(position, sibling)?;
                let data = self
                    .slot(&Slot::ScreenerConfig { order })
                    .and_then(|raw| decode_screener_record(raw).ok())
                    .map(|(_, _, config)| config)
                    .unwrap_or_default();
                let address_list = self
                    .slot(&Slot::AddressListName { order })
                    .and_then(|raw| decode_string(raw).ok())
                    .map(|name| AddressListSpec {
                        addresses: self.address_lists.get(&name).cloned().unwrap_or_default(),
                        name,
                    });
                Ok(ScreenerSpec {
                    address: screener,
                    config: ScreenerConfig::Opaque { data },
                    address_list,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(ExecutiveSpec {
            address,
            config,
            screeners,
            combine,
        })
    }
}

// =============================================================================
// WRITE BATCH
// =============================================================================

/// What a single write touches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteTarget {
    TypeArray,
    Slot(Slot),
    ListLength { name: String },
    ListElement { name: String, index: u128 },
    ListMap { name: String, address: Address },
}

/// One key/value write. An empty value clears the key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataWrite {
    pub key: DataKey,
    pub value: Bytes,
    pub target: WriteTarget,
}

impl DataWrite {
    pub fn set(key: DataKey, value: Bytes, target: WriteTarget) -> Self {
        Self { key, value, target }
    }

    pub fn clear(key: DataKey, target: WriteTarget) -> Self {
        Self {
            key,
            value: Vec::new(),
            target,
        }
    }

    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.value.is_empty()
    }
}

/// Ordered writes meant to be applied as one atomic multi-key write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<DataWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, write: DataWrite) {
        self.writes.push(write);
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataWrite> {
        self.writes.iter()
    }

    pub fn clear_count(&self) -> usize {
        self.writes.iter().filter(|w| w.is_clear()).count()
    }

    /// First write touching `target`, if any.
    pub fn find(&self, target: &WriteTarget) -> Option<&DataWrite> {
        self.writes.iter().find(|w| &w.target == target)
    }

    /// Split into the parallel key/value arrays the writer expects.
    pub fn to_parts(&self) -> (Vec<DataKey>, Vec<Bytes>) {
        self.writes
            .iter()
            .map(|w| (w.key, w.value.clone()))
            .unzip()
    }
}

impl Extend<DataWrite> for WriteBatch {
    fn extend<I: IntoIterator<Item = DataWrite>>(&mut self, iter: I) {
        self.writes.extend(iter);
    }
}

impl IntoIterator for WriteBatch {
    type Item = DataWrite;
    type IntoIter = std::vec::IntoIter<DataWrite>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::{encode_address_array, encode_bool, encode_executive, encode_screener_record, encode_string};

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn test_empty_values_are_not_slots() {
        let mut model = StateModel::new(TypeId::new([1; 32]));
        model.insert_slot(Slot::ExecutiveRecord { position: 0 }, vec![]);
        assert_eq!(model.slot_count(), 0);
        assert!(model.is_empty());
    }

    #[test]
    fn test_slot_order_groups_by_kind() {
        let mut slots = vec![
            Slot::ScreenerConfig { order: 0 },
            Slot::ExecutiveRecord { position: 3 },
            Slot::ScreenerLogic { position: 0 },
            Slot::ExecutiveRecord { position: 1 },
        ];
        slots.sort();
        assert_eq!(slots[0], Slot::ExecutiveRecord { position: 1 });
        assert_eq!(slots[3], Slot::ScreenerConfig { order: 0 });
    }

    #[test]
    fn test_executive_specs_inverts_stored_slots() {
        let type_id = TypeId::new([1; 32]);
        let mut model = StateModel::new(type_id);
        model.executives = vec![addr(0xE1)];
        model.insert_slot(Slot::ExecutiveRecord { position: 0 }, encode_executive(addr(0xE1), &[5]));
        model.insert_slot(
            Slot::ScreenerAddresses { position: 0 },
            encode_address_array(&[addr(0x51)]),
        );
        model.insert_slot(Slot::ScreenerLogic { position: 0 }, encode_bool(false));
        model.insert_slot(
            Slot::ScreenerConfig { order: 0 },
            encode_screener_record(addr(0xE1), addr(0x51), &[1]),
        );
        model.insert_slot(Slot::AddressListName { order: 0 }, encode_string("Friends"));
        model.address_lists.insert("Friends".to_string(), vec![addr(0xF1)]);

        let specs = model.executive_specs(1000).unwrap();
        assert_eq!(specs.len(), 1);
        let spec = &specs[0];
        assert_eq!(spec.config, vec![5]);
        assert_eq!(spec.combine, CombineLogic::Or);
        assert_eq!(spec.screeners[0].config, ScreenerConfig::Opaque { data: vec![1] });
        let list = spec.screeners[0].address_list.as_ref().unwrap();
        assert_eq!(list.name, "Friends");
        assert_eq!(list.addresses, vec![addr(0xF1)]);
    }

    #[test]
    fn test_executive_specs_trim_screeners_above_cap() {
        let mut model = StateModel::new(TypeId::new([1; 32]));
        model.executives = vec![addr(0xE1)];
        model.insert_slot(
            Slot::ScreenerAddresses { position: 0 },
            encode_address_array(&[addr(0x51), addr(0x52), addr(0x53)]),
        );
        let specs = model.executive_specs(2).unwrap();
        assert_eq!(
            specs[0].screeners.iter().map(|s| s.address).collect::<Vec<_>>(),
            vec![addr(0x51), addr(0x52)]
        );
    }

    #[test]
    fn test_lossy_list_is_remembered_until_read_cleanly() {
        let mut model = StateModel::new(TypeId::new([1; 32]));
        model.insert_stored_list(
            "L".to_string(),
            StoredList {
                addresses: vec![addr(1)],
                stored_len: 2,
                complete: false,
            },
        );
        assert_eq!(model.damaged_list_len("L"), Some(2));
        model.insert_stored_list(
            "L".to_string(),
            StoredList {
                addresses: vec![addr(1)],
                stored_len: 1,
                complete: true,
            },
        );
        assert_eq!(model.damaged_list_len("L"), None);
    }

    #[test]
    fn test_batch_parts_are_parallel() {
        let mut batch = WriteBatch::new();
        batch.push(DataWrite::set(DataKey::new([1; 32]), vec![1], WriteTarget::TypeArray));
        batch.push(DataWrite::clear(
            DataKey::new([2; 32]),
            WriteTarget::Slot(Slot::ExecutiveRecord { position: 0 }),
        ));
        let (keys, values) = batch.to_parts();
        assert_eq!(keys.len(), values.len());
        assert_eq!(batch.clear_count(), 1);
        assert!(values[1].is_empty());
    }
}
