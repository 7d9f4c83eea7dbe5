//! # Configuration Reader
//!
//! Reconstructs one assistant's attachment to a transaction type. Each slot
//! is read on its own; a slot that fails to read or decode degrades to
//! absent without affecting its siblings.

use crate::domain::{
    address_list_name_key, decode_address_array, decode_bool, decode_executive,
    decode_screener_record, decode_string, executive_config_key, executive_screeners_key,
    screener_config_key, screener_order, screeners_logic_key, type_config_key, Address,
    AssistantAttachment, Bytes, CombineLogic, ConfigError, DataKey, ScreenerAttachment, TypeId,
};
use crate::ports::KeyValueReader;
use tracing::{debug, warn};

/// Reads single-assistant attachments.
pub struct ConfigurationReader<'a, R: KeyValueReader + ?Sized> {
    reader: &'a R,
}

impl<'a, R: KeyValueReader + ?Sized> ConfigurationReader<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Current attachment of `assistant` to `type_id`, or `None` when the
    /// assistant is not in the type's chain.
    ///
    /// Failure to read the type array itself propagates.
    pub async fn read_assistant(
        &self,
        type_id: TypeId,
        assistant: Address,
    ) -> Result<Option<AssistantAttachment>, ConfigError> {
        let raw = self.reader.read(type_config_key(type_id)).await?;
        let executives = match decode_address_array(&raw) {
            Ok(executives) => executives,
            Err(e) => {
                warn!(type_id = %type_id, error = %e, "Unreadable type array, treating type as unconfigured");
                return Ok(None);
            }
        };

        let Some(position) = executives.iter().position(|a| *a == assistant) else {
            debug!(type_id = %type_id, %assistant, "Assistant not configured for type");
            return Ok(None);
        };
        let pos = position as u64;

        let config = self
            .slot(executive_config_key(type_id, pos), "executive")
            .await
            .and_then(|raw| decode_or_warn(decode_executive(&raw), "executive"))
            .and_then(|(stored, config)| {
                if stored == assistant {
                    Some(config)
                } else {
                    warn!(%stored, %assistant, position, "Executive record belongs to another assistant");
                    None
                }
            });

        let screener_addresses = self
            .slot(executive_screeners_key(type_id, pos), "screener addresses")
            .await
            .and_then(|raw| decode_or_warn(decode_address_array(&raw), "screener addresses"))
            .unwrap_or_default();

        let combine = if screener_addresses.is_empty() {
            None
        } else {
            self.slot(screeners_logic_key(type_id, pos), "screener logic")
                .await
                .and_then(|raw| decode_or_warn(decode_bool(&raw), "screener logic"))
                .map(CombineLogic::from_and_flag)
        };

        let mut screeners = Vec::with_capacity(screener_addresses.len());
        for (sibling, screener) in screener_addresses.into_iter().enumerate() {
            let order = match screener_order(position, sibling) {
                Ok(order) => order,
                Err(e) => {
                    warn!(position, sibling, error = %e, "Dropping screeners past capacity");
                    break;
                }
            };
            screeners.push(self.read_screener(type_id, order, assistant, screener).await);
        }

        Ok(Some(AssistantAttachment {
            address: assistant,
            position,
            config,
            screeners,
            combine,
        }))
    }

    async fn read_screener(
        &self,
        type_id: TypeId,
        order: u64,
        executive: Address,
        screener: Address,
    ) -> ScreenerAttachment {
        let config = self
            .slot(screener_config_key(type_id, order), "screener")
            .await
            .and_then(|raw| decode_or_warn(decode_screener_record(&raw), "screener"))
            .and_then(|(stored_exec, stored_screener, config)| {
                if stored_exec == executive && stored_screener == screener {
                    Some(config)
                } else {
                    warn!(order, %screener, "Screener record belongs to another pairing");
                    None
                }
            });
        let address_list = self
            .slot(address_list_name_key(type_id, order), "address list name")
            .await
            .and_then(|raw| decode_or_warn(decode_string(&raw), "address list name"));

        ScreenerAttachment {
            address: screener,
            config,
            address_list,
        }
    }

    /// Non-empty value at `key`; read failures degrade to `None`.
    async fn slot(&self, key: DataKey, what: &'static str) -> Option<Bytes> {
        match self.reader.read(key).await {
            Ok(value) if value.is_empty() => None,
            Ok(value) => Some(value),
            Err(e) => {
                warn!(slot = what, %key, error = %e, "Slot read failed, treating as absent");
                None
            }
        }
    }
}

fn decode_or_warn<T>(result: Result<T, ConfigError>, what: &'static str) -> Option<T> {
    result
        .map_err(|e| warn!(slot = what, error = %e, "Slot decode failed, treating as absent"))
        .ok()
}
