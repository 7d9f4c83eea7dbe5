//! # Address List Manager
//!
//! Reads named ordered address sets and their reverse `address -> index`
//! map. Reads are best effort: empty or malformed elements are skipped
//! instead of failing the whole list. The write side lives in
//! [`crate::domain::address_list`].

use super::read_chunked;
use crate::domain::{
    array_index_key, array_length_key, array_map_key, decode_u128, Address, ConfigError, StoredList,
};
use crate::ports::KeyValueReader;
use tracing::{debug, warn};

/// Reads address lists through a key/value reader.
pub struct AddressListManager<'a, R: KeyValueReader + ?Sized> {
    reader: &'a R,
    batch_size: usize,
    max_len: usize,
}

impl<'a, R: KeyValueReader + ?Sized> AddressListManager<'a, R> {
    pub fn new(reader: &'a R, batch_size: usize, max_len: usize) -> Self {
        Self {
            reader,
            batch_size,
            max_len,
        }
    }

    /// Read list `name` in stored order, skipping unreadable elements.
    pub async fn read(&self, name: &str) -> Result<Vec<Address>, ConfigError> {
        Ok(self.read_stored(name).await?.addresses)
    }

    /// Read list `name` along with how much of it decoded.
    pub async fn read_stored(&self, name: &str) -> Result<StoredList, ConfigError> {
        let raw_len = self.reader.read(array_length_key(name)).await?;
        let stored = match decode_u128(&raw_len) {
            Ok(len) => len,
            Err(e) => {
                warn!(list = name, error = %e, "Unreadable list length, treating list as empty");
                return Ok(StoredList::default());
            }
        };
        let mut complete = true;
        let len = usize::try_from(stored).unwrap_or(usize::MAX);
        let len = if len > self.max_len {
            warn!(list = name, stored = %stored, max = self.max_len, "List length above limit, truncating read");
            complete = false;
            self.max_len
        } else {
            len
        };

        let keys: Vec<_> = (0..len as u128).map(|i| array_index_key(name, i)).collect();
        let values = read_chunked(self.reader, &keys, self.batch_size).await?;

        let mut addresses = Vec::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            match Address::from_slice(value) {
                Some(address) => addresses.push(address),
                None => {
                    debug!(list = name, index, bytes = value.len(), "Skipping unreadable list element");
                    complete = false;
                }
            }
        }
        Ok(StoredList {
            addresses,
            stored_len: len,
            complete,
        })
    }

    /// Stored index of `address` in list `name`, if any.
    pub async fn position_of(&self, name: &str, address: Address) -> Result<Option<u128>, ConfigError> {
        let raw = self.reader.read(array_map_key(name, address)).await?;
        if raw.is_empty() {
            return Ok(None);
        }
        match decode_u128(&raw) {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                warn!(list = name, %address, error = %e, "Unreadable reverse entry");
                Ok(None)
            }
        }
    }
}
