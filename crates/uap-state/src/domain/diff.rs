//! # State Diff Engine
//!
//! Minimal write batch moving a transaction type from one [`StateModel`] to
//! another.
//!
//! ## Algorithm: Union Diff
//!
//! ```text
//! type array    rewrite iff the ordered executive list differs or the
//!               stored array is malformed
//! slots         for every slot in current ∪ target:
//!                 only current        -> clear
//!                 only target / diff  -> target value
//!                 identical           -> nothing
//! address lists for every list the target references:
//!                 differs from current -> replacing rewrite
//!                 read back lossily    -> rewrite up to the stored length
//! ```
//!
//! Insertion, removal and reordering are not special-cased: a removal is a
//! shorter target, and every later slot cascades because its key at the new
//! position now holds a different value.

use super::address_list::{repairing_list_writes, replacing_list_writes};
use super::codec::encode_address_array;
use super::keys::type_config_key;
use super::model::{DataWrite, StateModel, WriteBatch, WriteTarget};
use std::collections::BTreeSet;
use tracing::debug;

/// Compute the writes that turn `current` into `target`.
///
/// Both models must describe the same transaction type; keys are derived
/// from `target.type_id`. The engine never writes; the returned batch is
/// meant to be applied atomically.
pub fn diff_states(current: &StateModel, target: &StateModel) -> WriteBatch {
    debug_assert_eq!(current.type_id, target.type_id, "diffing different types");
    let type_id = target.type_id;
    let mut batch = WriteBatch::new();

    // Type array
    if current.executives != target.executives || current.malformed_type_array {
        let key = type_config_key(type_id);
        if target.executives.is_empty() {
            batch.push(DataWrite::clear(key, WriteTarget::TypeArray));
        } else {
            batch.push(DataWrite::set(
                key,
                encode_address_array(&target.executives),
                WriteTarget::TypeArray,
            ));
        }
    }

    // Executive records and screener slots
    let union: BTreeSet<_> = current
        .slots()
        .map(|(slot, _)| *slot)
        .chain(target.slots().map(|(slot, _)| *slot))
        .collect();
    for slot in union {
        let key = slot.key(type_id);
        match (current.slot(&slot), target.slot(&slot)) {
            (Some(_), None) => batch.push(DataWrite::clear(key, WriteTarget::Slot(slot))),
            (None, Some(value)) => {
                batch.push(DataWrite::set(key, value.clone(), WriteTarget::Slot(slot)));
            }
            (Some(old), Some(new)) if old != new => {
                batch.push(DataWrite::set(key, new.clone(), WriteTarget::Slot(slot)));
            }
            _ => {}
        }
    }

    // Address lists
    for (name, addresses) in &target.address_lists {
        let previous = current
            .address_lists
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default();
        match current.damaged_list_len(name) {
            Some(stored_len) => {
                batch.extend(repairing_list_writes(name, previous, stored_len, addresses));
            }
            None if previous != addresses.as_slice() => {
                batch.extend(replacing_list_writes(name, previous, addresses));
            }
            None => {}
        }
    }

    debug!(
        type_id = %type_id,
        writes = batch.len(),
        clears = batch.clear_count(),
        "Computed configuration diff"
    );

    batch
}
