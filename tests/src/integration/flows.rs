//! # Assistant Lifecycle Flows
//!
//! Full configure / insert / move / update / remove / clear sequences
//! against one in-memory store. After every step the stored state must
//! snapshot back to exactly the planned target, so planning the same chain
//! again is a no-op.

#[cfg(test)]
mod tests {
    use crate::integration::*;
    use std::sync::Arc;
    use uap_state::domain::{executive_config_key, type_config_key};
    use uap_state::prelude::*;

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn plain(bytes: &[u8]) -> Vec<ExecutiveSpec> {
        bytes
            .iter()
            .map(|b| ExecutiveSpec::new(addr(*b), vec![*b, *b]))
            .collect()
    }

    async fn assert_settled<S: KeyValueStore>(
        service: &AssistantConfigService<S, StaticTypeCatalog>,
        outcome: &MigrationOutcome,
    ) {
        let snapshot = service.snapshot(outcome.plan.type_id).await.unwrap();
        assert_eq!(snapshot.executives, outcome.plan.target.executives);
        assert!(diff_states(&snapshot, &outcome.plan.target).is_empty());
    }

    const CHAIN_JSON: &str = r#"[
        {
            "address": "0x0101010101010101010101010101010101010101",
            "config": [1, 2]
        },
        {
            "address": "0x0202020202020202020202020202020202020202",
            "combine": "OR",
            "screeners": [
                {
                    "address": "0x5151515151515151515151515151515151515151",
                    "config": { "kind": "address_list", "return_value_when_in_list": false },
                    "address_list": {
                        "name": "Blocked",
                        "addresses": [
                            "0xb1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1",
                            "0xB2B2B2B2B2B2B2B2B2B2B2B2B2B2B2B2B2B2B2B2"
                        ]
                    }
                },
                {
                    "address": "0x5252525252525252525252525252525252525252",
                    "config": {
                        "kind": "curation_checker",
                        "curated_list": "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0",
                        "return_value_when_curated": true
                    }
                }
            ]
        }
    ]"#;

    // =========================================================================
    // FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_json_chain_configures_and_reads_back() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let service = service_over(store.clone());
        let desired: Vec<ExecutiveSpec> = serde_json::from_str(CHAIN_JSON).unwrap();

        let outcome = service.apply(token_transfer(), &desired).await.unwrap();
        // array + 2 records + screener array + logic + 2 screener records
        // + list name + list (length, 2 elements, 2 reverse entries)
        let receipt = outcome.receipt.clone().unwrap();
        assert_eq!(receipt.keys_set, 13);
        assert_eq!(receipt.keys_cleared, 0);
        assert_eq!(store.len(), 13);
        assert_settled(&service, &outcome).await;

        let attachment = service
            .read_assistant(token_transfer(), addr(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attachment.position, 1);
        assert_eq!(attachment.combine, Some(CombineLogic::Or));
        assert_eq!(attachment.screeners.len(), 2);
        assert_eq!(attachment.screeners[0].address_list.as_deref(), Some("Blocked"));
        assert_eq!(attachment.screeners[0].config, Some(vec![0x00]));
        assert_eq!(attachment.screeners[1].address_list, None);

        let decoded = ScreenerConfig::decode(
            ScreenerKind::CurationChecker,
            attachment.screeners[1].config.as_deref().unwrap(),
        )
        .unwrap();
        assert_eq!(decoded, desired[1].screeners[1].config);

        let lists = AddressListManager::new(store.as_ref(), 4, 1024);
        assert_eq!(
            lists.read("Blocked").await.unwrap(),
            vec![addr(0xB1), addr(0xB2)]
        );
        assert_eq!(lists.position_of("Blocked", addr(0xB2)).await.unwrap(), Some(1));

        assert!(service.plan(token_transfer(), &desired).await.unwrap().is_noop());
    }

    #[tokio::test]
    async fn test_full_lifecycle_ends_with_empty_store() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let service = service_over(store.clone());
        let ty = token_transfer();

        let outcome = service.apply(ty, &plain(&[0xA, 0xB, 0xC])).await.unwrap();
        assert_settled(&service, &outcome).await;

        let outcome = service
            .insert_assistant(ty, ExecutiveSpec::new(addr(0xD), vec![0xD]), Some(1))
            .await
            .unwrap();
        assert_eq!(
            outcome.plan.target.executives,
            vec![addr(0xA), addr(0xD), addr(0xB), addr(0xC)]
        );
        // array + records at 1, 2 and the new 3
        assert_eq!(outcome.plan.batch.len(), 4);
        assert_settled(&service, &outcome).await;

        let outcome = service.move_assistant(ty, addr(0xC), 0).await.unwrap();
        assert_eq!(
            outcome.plan.target.executives,
            vec![addr(0xC), addr(0xA), addr(0xD), addr(0xB)]
        );
        assert_settled(&service, &outcome).await;

        let outcome = service
            .update_assistant(ty, ExecutiveSpec::new(addr(0xA), vec![0xAA, 0xAA, 0xAA]))
            .await
            .unwrap();
        assert_eq!(outcome.plan.batch.len(), 1);
        assert_settled(&service, &outcome).await;

        let outcome = service.remove_assistant(ty, addr(0xD)).await.unwrap();
        assert_eq!(outcome.plan.batch.clear_count(), 1);
        assert_settled(&service, &outcome).await;
        assert_eq!(
            store.get(&executive_config_key(ty, 1)),
            Some(uap_state::domain::encode_executive(addr(0xA), &[0xAA, 0xAA, 0xAA]))
        );

        let outcome = service.apply(ty, &[]).await.unwrap();
        assert_eq!(outcome.plan.batch.clear_count(), outcome.plan.batch.len());
        assert!(store.is_empty());
        assert!(service.snapshot(ty).await.unwrap().is_empty());

        let stats = service.stats().await;
        assert_eq!(stats.batches_committed, 6);
        assert_eq!(stats.failed_commits, 0);
    }

    #[tokio::test]
    async fn test_types_are_independent() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let service = service_over(store.clone());

        service.apply(token_transfer(), &plain(&[1, 2])).await.unwrap();
        service.apply(value_received(), &plain(&[1, 2])).await.unwrap();
        let before = store.get(&type_config_key(value_received()));

        service.remove_assistant(token_transfer(), addr(1)).await.unwrap();
        assert_eq!(store.get(&type_config_key(value_received())), before);
        assert_eq!(
            service.snapshot(value_received()).await.unwrap().executives,
            vec![addr(1), addr(2)]
        );
        assert_eq!(
            service.snapshot(token_transfer()).await.unwrap().executives,
            vec![addr(2)]
        );
    }

    #[tokio::test]
    async fn test_shrinking_a_list_keeps_reverse_map_consistent() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let service = service_over(store.clone());
        let with_friends = |members: Vec<Address>| {
            ExecutiveSpec::new(addr(1), vec![]).with_screener(ScreenerSpec {
                address: addr(0x51),
                config: ScreenerConfig::AddressList {
                    return_value_when_in_list: true,
                },
                address_list: Some(AddressListSpec {
                    name: "Friends".to_string(),
                    addresses: members,
                }),
            })
        };

        service
            .apply(
                token_transfer(),
                &[with_friends(vec![addr(0xF1), addr(0xF2), addr(0xF3)])],
            )
            .await
            .unwrap();

        let outcome = service
            .update_assistant(token_transfer(), with_friends(vec![addr(0xF3)]))
            .await
            .unwrap();
        // length, element 0, reverse entry of F3; elements 1 and 2 and the
        // reverse entries of F1 and F2 cleared
        assert_eq!(outcome.plan.batch.len(), 7);
        assert_eq!(outcome.plan.batch.clear_count(), 4);
        assert_settled(&service, &outcome).await;

        let lists = AddressListManager::new(store.as_ref(), 4, 1024);
        assert_eq!(lists.read("Friends").await.unwrap(), vec![addr(0xF3)]);
        assert_eq!(lists.position_of("Friends", addr(0xF3)).await.unwrap(), Some(0));
        assert_eq!(lists.position_of("Friends", addr(0xF1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_removing_screened_executive_clears_its_screeners() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let service = service_over(store.clone());
        let screened = ExecutiveSpec::new(addr(0xB), vec![0xB])
            .with_screener(ScreenerSpec {
                address: addr(0x51),
                config: ScreenerConfig::Opaque { data: vec![7] },
                address_list: None,
            })
            .with_combine(CombineLogic::Or);
        service
            .apply(
                token_transfer(),
                &[
                    ExecutiveSpec::new(addr(0xA), vec![0xA]),
                    screened,
                    ExecutiveSpec::new(addr(0xC), vec![0xC]),
                ],
            )
            .await
            .unwrap();

        let outcome = service
            .remove_assistant(token_transfer(), addr(0xB))
            .await
            .unwrap();
        // array, record 1 rewritten, record 2 cleared, plus the three
        // screener slots of position 1
        assert_eq!(outcome.plan.batch.len(), 6);
        assert_eq!(outcome.plan.batch.clear_count(), 4);
        assert_settled(&service, &outcome).await;
        assert_eq!(store.len(), 3);
    }
}
