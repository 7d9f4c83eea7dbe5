//! # Services
//!
//! Storage-facing components. Everything here reads through the
//! [`KeyValueReader`](crate::ports::KeyValueReader) port; only
//! [`AssistantConfigService`] ever submits a write batch.

pub mod address_list;
pub mod analyzer;
pub mod assistant_service;
pub mod config_reader;

pub use address_list::*;
pub use analyzer::*;
pub use assistant_service::*;
pub use config_reader::*;

use crate::domain::{Bytes, DataKey, ProviderError};
use crate::ports::KeyValueReader;

/// `read_batch` in chunks of at most `chunk` keys.
pub(crate) async fn read_chunked<R: KeyValueReader + ?Sized>(
    reader: &R,
    keys: &[DataKey],
    chunk: usize,
) -> Result<Vec<Bytes>, ProviderError> {
    let mut values = Vec::with_capacity(keys.len());
    for part in keys.chunks(chunk.max(1)) {
        let read = reader.read_batch(part).await?;
        if read.len() != part.len() {
            return Err(ProviderError::BatchLengthMismatch {
                keys: part.len(),
                values: read.len(),
            });
        }
        values.extend(read);
    }
    Ok(values)
}
