//! # State Target Builder
//!
//! Converts a desired executive chain into the same [`StateModel`] shape the
//! analyzer produces, so insert/remove/reorder all reduce to one diff.

use super::codec::{encode_address_array, encode_bool, encode_executive, encode_screener_record, encode_string};
use super::config::PlannerConfig;
use super::entities::{ExecutiveSpec, ScreenerSpec};
use super::errors::ConfigError;
use super::model::{Slot, StateModel};
use super::order::screener_order;
use super::value_objects::{Address, TypeId};
use std::collections::{BTreeMap, HashSet};

/// Builds target models under a planner configuration.
#[derive(Clone, Debug, Default)]
pub struct TargetBuilder {
    config: PlannerConfig,
}

impl TargetBuilder {
    pub fn new(config: PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Model of the desired end state for `type_id`.
    pub fn build(&self, type_id: TypeId, specs: &[ExecutiveSpec]) -> Result<StateModel, ConfigError> {
        if specs.len() > self.config.max_executives {
            return Err(ConfigError::TooManyExecutives {
                count: specs.len(),
                max: self.config.max_executives,
            });
        }

        let mut seen = HashSet::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.address) {
                return Err(ConfigError::DuplicateExecutive(spec.address));
            }
        }

        let mut model = StateModel::new(type_id);
        model.executives = specs.iter().map(|s| s.address).collect();

        for (position, spec) in specs.iter().enumerate() {
            self.add_executive(&mut model, position, spec)?;
        }

        Ok(model)
    }

    fn add_executive(
        &self,
        model: &mut StateModel,
        position: usize,
        spec: &ExecutiveSpec,
    ) -> Result<(), ConfigError> {
        let pos = position as u64;
        model.insert_slot(
            Slot::ExecutiveRecord { position: pos },
            encode_executive(spec.address, &spec.config),
        );

        if spec.screeners.is_empty() {
            return Ok(());
        }
        if spec.screeners.len() > self.config.max_screeners_per_executive {
            return Err(ConfigError::CapacityExceeded {
                sibling_index: self.config.max_screeners_per_executive,
                max: self.config.max_screeners_per_executive,
            });
        }

        let addresses: Vec<Address> = spec.screeners.iter().map(|s| s.address).collect();
        model.insert_slot(
            Slot::ScreenerAddresses { position: pos },
            encode_address_array(&addresses),
        );
        model.insert_slot(
            Slot::ScreenerLogic { position: pos },
            encode_bool(spec.combine.is_and()),
        );

        for (sibling, screener) in spec.screeners.iter().enumerate() {
            let order = screener_order(position, sibling)?;
            add_screener(model, order, spec.address, screener, self.config.max_address_list_len)?;
        }
        Ok(())
    }
}

fn add_screener(
    model: &mut StateModel,
    order: u64,
    executive: Address,
    screener: &ScreenerSpec,
    max_list_len: usize,
) -> Result<(), ConfigError> {
    model.insert_slot(
        Slot::ScreenerConfig { order },
        encode_screener_record(executive, screener.address, &screener.config.encode()),
    );

    let Some(list) = &screener.address_list else {
        if screener.config.needs_address_list() {
            return Err(ConfigError::MissingAddressList(screener.address));
        }
        return Ok(());
    };

    if list.addresses.len() > max_list_len {
        return Err(ConfigError::AddressListTooLong {
            list: list.name.clone(),
            len: list.addresses.len(),
            max: max_list_len,
        });
    }

    let mut unique = HashSet::with_capacity(list.addresses.len());
    for address in &list.addresses {
        if !unique.insert(*address) {
            return Err(ConfigError::DuplicateListEntry {
                list: list.name.clone(),
                address: *address,
            });
        }
    }

    model.insert_slot(Slot::AddressListName { order }, encode_string(&list.name));
    merge_list(&mut model.address_lists, &list.name, &list.addresses)
}

/// Register a list; two screeners may share a name only with equal contents.
fn merge_list(
    lists: &mut BTreeMap<String, Vec<Address>>,
    name: &str,
    addresses: &[Address],
) -> Result<(), ConfigError> {
    match lists.get(name) {
        Some(existing) if existing.as_slice() != addresses => {
            Err(ConfigError::ConflictingAddressList(name.to_string()))
        }
        Some(_) => Ok(()),
        None => {
            lists.insert(name.to_string(), addresses.to_vec());
            Ok(())
        }
    }
}
