//! # State Analyzer
//!
//! Snapshots the complete stored configuration of one transaction type into
//! a [`StateModel`]. Reads run in three phases, each batched:
//!
//! 1. per-position slots (record, screener addresses, logic)
//! 2. per-screener slots (screener record, list name)
//! 3. every referenced address list
//!
//! An undecodable type array snapshots as an empty chain, but the positions
//! holding executive records are still scanned so their slots get cleared.
//! Provider errors abort the snapshot; a half-read snapshot is never diffed.
//! Malformed values are still recorded as occupied slots, but slots that
//! depend on decoding them (a corrupt screener array's children) are left
//! out.

use super::address_list::AddressListManager;
use super::read_chunked;
use crate::domain::{
    decode_address_array, decode_string, executive_config_key, screener_order, type_config_key,
    Address, ConfigError, PlannerConfig, Slot, StateModel, TypeId, MAX_SCREENERS_PER_EXECUTIVE,
};
use crate::ports::KeyValueReader;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Builds current-state models from storage.
pub struct StateAnalyzer<'a, R: KeyValueReader + ?Sized> {
    reader: &'a R,
    config: &'a PlannerConfig,
}

impl<'a, R: KeyValueReader + ?Sized> StateAnalyzer<'a, R> {
    pub fn new(reader: &'a R, config: &'a PlannerConfig) -> Self {
        Self { reader, config }
    }

    /// Snapshot everything `type_id` currently occupies.
    pub async fn snapshot(&self, type_id: TypeId) -> Result<StateModel, ConfigError> {
        let mut model = StateModel::new(type_id);

        let raw = self.reader.read(type_config_key(type_id)).await?;
        let positions = match decode_address_array(&raw) {
            Ok(executives) => {
                model.executives = executives;
                model.executives.len()
            }
            Err(e) => {
                warn!(type_id = %type_id, error = %e, "Unreadable type array, scanning stored records");
                model.malformed_type_array = true;
                self.scan_positions(type_id).await?
            }
        };

        // Phase 1: per-position slots
        let position_slots: Vec<Slot> = (0..positions as u64)
            .flat_map(|position| {
                [
                    Slot::ExecutiveRecord { position },
                    Slot::ScreenerAddresses { position },
                    Slot::ScreenerLogic { position },
                ]
            })
            .collect();
        self.read_slots(&mut model, &position_slots).await?;

        // Phase 2: per-screener slots
        let mut screener_slots = Vec::new();
        for position in 0..positions {
            let screeners = self.screener_addresses(&model, position);
            for sibling in 0..screeners.len() {
                let order = screener_order(position, sibling)?;
                screener_slots.push(Slot::ScreenerConfig { order });
                screener_slots.push(Slot::AddressListName { order });
            }
        }
        self.read_slots(&mut model, &screener_slots).await?;

        // Phase 3: referenced address lists
        let names: BTreeSet<String> = model
            .slots()
            .filter(|(slot, _)| matches!(slot, Slot::AddressListName { .. }))
            .filter_map(|(slot, raw)| match decode_string(raw) {
                Ok(name) => Some(name),
                Err(e) => {
                    warn!(?slot, error = %e, "Unreadable address list name");
                    None
                }
            })
            .collect();
        self.include_lists(&mut model, names).await?;

        debug!(
            type_id = %type_id,
            executives = model.executives.len(),
            slots = model.slot_count(),
            lists = model.address_lists.len(),
            "Snapshot complete"
        );
        Ok(model)
    }

    /// Read the named lists into `model` unless already present.
    pub async fn include_lists(
        &self,
        model: &mut StateModel,
        names: impl IntoIterator<Item = String>,
    ) -> Result<(), ConfigError> {
        let lists = AddressListManager::new(
            self.reader,
            self.config.read_batch_size,
            self.config.max_address_list_len,
        );
        for name in names {
            if model.address_lists.contains_key(&name) {
                continue;
            }
            let stored = lists.read_stored(&name).await?;
            model.insert_stored_list(name, stored);
        }
        Ok(())
    }

    /// Number of consecutive positions holding an executive record, for a
    /// type whose executive array no longer decodes.
    async fn scan_positions(&self, type_id: TypeId) -> Result<usize, ConfigError> {
        let step = self.config.read_batch_size.max(1);
        let mut found = 0;
        while found < self.config.max_executives {
            let end = (found + step).min(self.config.max_executives);
            let keys: Vec<_> = (found..end)
                .map(|position| executive_config_key(type_id, position as u64))
                .collect();
            let values = read_chunked(self.reader, &keys, step).await?;
            match values.iter().position(|value| value.is_empty()) {
                Some(gap) => return Ok(found + gap),
                None => found = end,
            }
        }
        Ok(found)
    }

    /// Decoded screener addresses of `position`, capped at the order
    /// ceiling so slots past a lowered configured cap are still seen.
    /// Missing or malformed arrays yield no screeners.
    fn screener_addresses(&self, model: &StateModel, position: usize) -> Vec<Address> {
        let Some(raw) = model.slot(&Slot::ScreenerAddresses {
            position: position as u64,
        }) else {
            return Vec::new();
        };
        let mut screeners = decode_address_array(raw).unwrap_or_else(|e| {
            warn!(position, error = %e, "Unreadable screener array, skipping its screeners");
            Vec::new()
        });
        if screeners.len() > MAX_SCREENERS_PER_EXECUTIVE {
            warn!(
                position,
                stored = screeners.len(),
                max = MAX_SCREENERS_PER_EXECUTIVE,
                "Screener array above capacity, ignoring the excess"
            );
            screeners.truncate(MAX_SCREENERS_PER_EXECUTIVE);
        }
        screeners
    }

    async fn read_slots(&self, model: &mut StateModel, slots: &[Slot]) -> Result<(), ConfigError> {
        let keys: Vec<_> = slots.iter().map(|slot| slot.key(model.type_id)).collect();
        let values = read_chunked(self.reader, &keys, self.config.read_batch_size).await?;
        for (slot, value) in slots.iter().zip(values) {
            model.insert_slot(*slot, value);
        }
        Ok(())
    }
}
