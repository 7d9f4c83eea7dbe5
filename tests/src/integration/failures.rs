//! # Failure Handling
//!
//! Provider failures abort a migration before anything is written, while
//! corrupted slots only degrade the slots themselves and are repaired by
//! the next migration.

#[cfg(test)]
mod tests {
    use crate::integration::*;
    use std::sync::Arc;
    use uap_state::domain::{executive_config_key, type_config_key};
    use uap_state::prelude::*;

    fn plain(bytes: &[u8]) -> Vec<ExecutiveSpec> {
        bytes
            .iter()
            .map(|b| ExecutiveSpec::new(addr(*b), vec![*b]))
            .collect()
    }

    #[tokio::test]
    async fn test_read_failure_mid_snapshot_aborts() {
        let store = Arc::new(FlakyStore::new());
        let service = service_over(store.clone());
        service.apply(token_transfer(), &plain(&[1, 2])).await.unwrap();
        let stored = store.inner.len();

        // the type array and two per-position slots, then time out
        store.fail_reads_after(3);
        let result = service.apply(token_transfer(), &plain(&[2])).await;
        assert_eq!(
            result.unwrap_err(),
            ConfigError::Provider(ProviderError::Timeout)
        );
        assert_eq!(store.inner.len(), stored);
        assert_eq!(store.inner.batches_applied(), 1);
    }

    #[tokio::test]
    async fn test_rejected_batch_leaves_store_untouched_and_can_be_retried() {
        let store = Arc::new(FlakyStore::new());
        let service = service_over(store.clone());
        service.apply(token_transfer(), &plain(&[1, 2, 3])).await.unwrap();
        let before = service.snapshot(token_transfer()).await.unwrap();

        store.reject_writes(true);
        assert!(matches!(
            service.remove_assistant(token_transfer(), addr(1)).await,
            Err(ConfigError::Provider(ProviderError::Rejected(_)))
        ));
        assert_eq!(service.snapshot(token_transfer()).await.unwrap(), before);

        store.heal();
        let outcome = service
            .remove_assistant(token_transfer(), addr(1))
            .await
            .unwrap();
        assert_eq!(outcome.plan.target.executives, vec![addr(2), addr(3)]);
        assert_eq!(service.stats().await.failed_commits, 1);
    }

    #[tokio::test]
    async fn test_reader_degrades_slot_read_failures() {
        let store = Arc::new(FlakyStore::new());
        let service = service_over(store.clone());
        service.apply(token_transfer(), &plain(&[1, 2])).await.unwrap();

        // only the type array can be read
        store.fail_reads_after(1);
        let attachment = service
            .read_assistant(token_transfer(), addr(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attachment.position, 1);
        assert_eq!(attachment.config, None);
        assert!(attachment.screeners.is_empty());

        // the same failure while snapshotting is fatal
        store.fail_reads_after(1);
        assert!(matches!(
            service.snapshot(token_transfer()).await,
            Err(ConfigError::Provider(ProviderError::Timeout))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_repaired_by_next_migration() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let service = service_over(store.clone());
        let desired = plain(&[1, 2, 3]);
        service.apply(token_transfer(), &desired).await.unwrap();

        store
            .insert_raw(executive_config_key(token_transfer(), 1), vec![0xEE; 5])
            .unwrap();
        let attachment = service
            .read_assistant(token_transfer(), addr(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attachment.config, None);

        let outcome = service.apply(token_transfer(), &desired).await.unwrap();
        assert_eq!(outcome.plan.batch.len(), 1);
        assert_eq!(
            outcome.plan.batch.iter().next().map(|w| w.key),
            Some(executive_config_key(token_transfer(), 1))
        );
        assert!(service.plan(token_transfer(), &desired).await.unwrap().is_noop());
    }

    #[tokio::test]
    async fn test_corrupt_type_array_is_rewritten() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let service = service_over(store.clone());
        let desired = plain(&[1, 2]);
        service.apply(token_transfer(), &desired).await.unwrap();

        store
            .insert_raw(type_config_key(token_transfer()), vec![0xEE; 3])
            .unwrap();
        let snapshot = service.snapshot(token_transfer()).await.unwrap();
        assert!(snapshot.executives.is_empty());
        assert!(snapshot.malformed_type_array);
        assert_eq!(
            service.read_assistant(token_transfer(), addr(1)).await.unwrap(),
            None
        );

        // stored records still match, only the array is rewritten
        let outcome = service.apply(token_transfer(), &desired).await.unwrap();
        assert_eq!(outcome.plan.batch.len(), 1);
        assert!(outcome.plan.batch.find(&WriteTarget::TypeArray).is_some());
        assert!(service.plan(token_transfer(), &desired).await.unwrap().is_noop());
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected_before_reading() {
        let store = Arc::new(FlakyStore::new());
        let service = service_over(store.clone());
        store.fail_reads_after(0);

        let unknown = TypeId::new([0x01; 32]);
        assert_eq!(
            service.apply(unknown, &plain(&[1])).await.unwrap_err(),
            ConfigError::UnsupportedTransactionType(unknown)
        );
        assert_eq!(
            service.read_assistant(unknown, addr(1)).await.unwrap_err(),
            ConfigError::UnsupportedTransactionType(unknown)
        );
    }
}
