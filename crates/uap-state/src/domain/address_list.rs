//! # Address List Writes
//!
//! A list `name` occupies:
//!
//! - `name[]`: element count (`uint128`)
//! - `name[]` index `i`: the raw 20-byte address
//! - `nameMap:<address>`: the address's index (`uint128`)
//!
//! Writes are always full replacements of the array; the surrounding diff
//! decides whether a list needs rewriting at all.

use super::codec::encode_u128;
use super::keys::{array_index_key, array_length_key, array_map_key};
use super::model::{DataWrite, WriteTarget};
use super::value_objects::Address;

/// Writes storing `addresses` as list `name`.
pub fn list_writes(name: &str, addresses: &[Address]) -> Vec<DataWrite> {
    replacing_list_writes(name, &[], addresses)
}

/// A list as read back from storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredList {
    /// Decodable elements in stored order.
    pub addresses: Vec<Address>,
    /// Element count claimed by the length key, capped at the read limit.
    pub stored_len: usize,
    /// False when the length or any element failed to decode.
    pub complete: bool,
}

/// Writes replacing list `previous` by `addresses`.
///
/// Besides the full rewrite, positional keys past the new length and reverse
/// entries of addresses that left the list are cleared, so array and reverse
/// map stay in agreement.
pub fn replacing_list_writes(name: &str, previous: &[Address], addresses: &[Address]) -> Vec<DataWrite> {
    repairing_list_writes(name, previous, previous.len(), addresses)
}

/// [`replacing_list_writes`] for a list whose stored length may exceed the
/// decodable `previous` elements. Every positional key below `stored_len`
/// that the new list does not cover is cleared as well.
pub fn repairing_list_writes(
    name: &str,
    previous: &[Address],
    stored_len: usize,
    addresses: &[Address],
) -> Vec<DataWrite> {
    let stored_len = stored_len.max(previous.len());
    let mut writes = Vec::with_capacity(1 + 2 * addresses.len().max(stored_len));

    let length_target = WriteTarget::ListLength {
        name: name.to_string(),
    };
    if addresses.is_empty() {
        writes.push(DataWrite::clear(array_length_key(name), length_target));
    } else {
        writes.push(DataWrite::set(
            array_length_key(name),
            encode_u128(addresses.len() as u128),
            length_target,
        ));
    }

    for (index, address) in addresses.iter().enumerate() {
        let index = index as u128;
        writes.push(DataWrite::set(
            array_index_key(name, index),
            address.0.to_vec(),
            WriteTarget::ListElement {
                name: name.to_string(),
                index,
            },
        ));
        writes.push(DataWrite::set(
            array_map_key(name, *address),
            encode_u128(index),
            WriteTarget::ListMap {
                name: name.to_string(),
                address: *address,
            },
        ));
    }

    for index in addresses.len()..stored_len {
        let index = index as u128;
        writes.push(DataWrite::clear(
            array_index_key(name, index),
            WriteTarget::ListElement {
                name: name.to_string(),
                index,
            },
        ));
    }

    for stale in previous.iter().filter(|a| !addresses.contains(a)) {
        writes.push(DataWrite::clear(
            array_map_key(name, *stale),
            WriteTarget::ListMap {
                name: name.to_string(),
                address: *stale,
            },
        ));
    }

    writes
}
