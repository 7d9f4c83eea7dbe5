//! # Assistant Config Service
//!
//! Entry point for reading and migrating a transaction type's assistant
//! chain. Every mutating operation follows the same path:
//!
//! ```text
//! catalog check -> snapshot -> desired specs -> target model -> diff -> apply_batch
//! ```
//!
//! `insert_assistant`, `remove_assistant`, `move_assistant` and
//! `update_assistant` only differ in how they derive the desired specs from
//! a single snapshot. The batch is submitted once; a failed write leaves the
//! store untouched and the caller retries the whole operation.

use super::analyzer::StateAnalyzer;
use super::config_reader::ConfigurationReader;
use crate::domain::{
    diff_states, Address, AssistantAttachment, ConfigError, ExecutiveSpec, PlannerConfig,
    StateModel, TargetBuilder, TypeId, WriteBatch,
};
use crate::ports::{KeyValueStore, Receipt, TransactionTypeCatalog};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// A computed, not yet applied, migration.
#[derive(Clone, Debug)]
pub struct MigrationPlan {
    /// Correlation id carried through the logs of plan and commit.
    pub plan_id: Uuid,
    pub type_id: TypeId,
    /// Snapshot the plan was computed against.
    pub current: StateModel,
    pub target: StateModel,
    pub batch: WriteBatch,
}

impl MigrationPlan {
    /// True when the store already holds the target.
    pub fn is_noop(&self) -> bool {
        self.batch.is_empty()
    }
}

/// A plan together with the receipt of its batch, if one was submitted.
#[derive(Clone, Debug)]
pub struct MigrationOutcome {
    pub plan: MigrationPlan,
    pub receipt: Option<Receipt>,
}

/// Counters for the service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Plans computed, including no-ops.
    pub plans_computed: u64,
    /// Plans that needed no writes.
    pub noop_plans: u64,
    /// Batches accepted by the store.
    pub batches_committed: u64,
    /// Batches the store rejected.
    pub failed_commits: u64,
    /// Keys given a value across all committed batches.
    pub keys_set: u64,
    /// Keys cleared across all committed batches.
    pub keys_cleared: u64,
}

/// Reads and migrates assistant configurations.
pub struct AssistantConfigService<S: KeyValueStore, C: TransactionTypeCatalog> {
    store: Arc<S>,
    catalog: Arc<C>,
    config: PlannerConfig,
    builder: TargetBuilder,
    stats: Arc<RwLock<ServiceStats>>,
}

impl<S: KeyValueStore, C: TransactionTypeCatalog> AssistantConfigService<S, C> {
    /// Create a service; fails if `config` does not validate.
    pub fn new(store: Arc<S>, catalog: Arc<C>, config: PlannerConfig) -> Result<Self, ConfigError> {
        let builder = TargetBuilder::new(config.clone())?;
        Ok(Self {
            store,
            catalog,
            config,
            builder,
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    fn ensure_supported(&self, type_id: TypeId) -> Result<(), ConfigError> {
        if self.catalog.is_supported(&type_id) {
            Ok(())
        } else {
            warn!(type_id = %type_id, "Rejected unsupported transaction type");
            Err(ConfigError::UnsupportedTransactionType(type_id))
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// One assistant's attachment to `type_id`.
    pub async fn read_assistant(
        &self,
        type_id: TypeId,
        assistant: Address,
    ) -> Result<Option<AssistantAttachment>, ConfigError> {
        self.ensure_supported(type_id)?;
        ConfigurationReader::new(self.store.as_ref())
            .read_assistant(type_id, assistant)
            .await
    }

    /// Everything `type_id` currently occupies.
    pub async fn snapshot(&self, type_id: TypeId) -> Result<StateModel, ConfigError> {
        self.ensure_supported(type_id)?;
        StateAnalyzer::new(self.store.as_ref(), &self.config)
            .snapshot(type_id)
            .await
    }

    // =========================================================================
    // PLANNING
    // =========================================================================

    /// Plan the migration of `type_id` to the `desired` chain.
    pub async fn plan(
        &self,
        type_id: TypeId,
        desired: &[ExecutiveSpec],
    ) -> Result<MigrationPlan, ConfigError> {
        let current = self.snapshot(type_id).await?;
        self.plan_from(current, desired).await
    }

    /// Plan against an existing snapshot.
    ///
    /// Lists the target references but the snapshot never read (because no
    /// stored screener pointed at them) are read first, so a list that is
    /// already stored with the desired contents is not rewritten.
    #[instrument(skip(self, current, desired), fields(plan_id = tracing::field::Empty, type_id = %current.type_id))]
    pub async fn plan_from(
        &self,
        mut current: StateModel,
        desired: &[ExecutiveSpec],
    ) -> Result<MigrationPlan, ConfigError> {
        let plan_id = Uuid::new_v4();
        tracing::Span::current().record("plan_id", tracing::field::display(plan_id));

        let type_id = current.type_id;
        let target = self.builder.build(type_id, desired)?;

        let missing: Vec<String> = target
            .address_lists
            .keys()
            .filter(|name| !current.address_lists.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            debug!(lists = missing.len(), "Reading lists referenced only by the target");
            StateAnalyzer::new(self.store.as_ref(), &self.config)
                .include_lists(&mut current, missing)
                .await?;
        }

        let batch = diff_states(&current, &target);
        info!(
            executives = target.executives.len(),
            writes = batch.len(),
            clears = batch.clear_count(),
            "Migration planned"
        );

        {
            let mut stats = self.stats.write().await;
            stats.plans_computed += 1;
            if batch.is_empty() {
                stats.noop_plans += 1;
            }
        }

        Ok(MigrationPlan {
            plan_id,
            type_id,
            current,
            target,
            batch,
        })
    }

    /// Submit a plan's batch. No-op plans submit nothing and return `None`.
    #[instrument(skip(self, plan), fields(plan_id = %plan.plan_id, type_id = %plan.type_id))]
    pub async fn commit(&self, plan: &MigrationPlan) -> Result<Option<Receipt>, ConfigError> {
        if plan.is_noop() {
            debug!("Nothing to write");
            return Ok(None);
        }

        match self.store.apply(&plan.batch).await {
            Ok(receipt) => {
                info!(
                    keys_set = receipt.keys_set,
                    keys_cleared = receipt.keys_cleared,
                    "Migration committed"
                );
                let mut stats = self.stats.write().await;
                stats.batches_committed += 1;
                stats.keys_set += receipt.keys_set as u64;
                stats.keys_cleared += receipt.keys_cleared as u64;
                Ok(Some(receipt))
            }
            Err(e) => {
                error!(error = %e, "Migration batch rejected");
                self.stats.write().await.failed_commits += 1;
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // MIGRATIONS
    // =========================================================================

    /// Replace the whole chain of `type_id` by `desired`.
    pub async fn apply(
        &self,
        type_id: TypeId,
        desired: &[ExecutiveSpec],
    ) -> Result<MigrationOutcome, ConfigError> {
        let plan = self.plan(type_id, desired).await?;
        let receipt = self.commit(&plan).await?;
        Ok(MigrationOutcome { plan, receipt })
    }

    /// Insert `spec` at position `at` (appended when `None`).
    pub async fn insert_assistant(
        &self,
        type_id: TypeId,
        spec: ExecutiveSpec,
        at: Option<usize>,
    ) -> Result<MigrationOutcome, ConfigError> {
        let current = self.snapshot(type_id).await?;
        if current.position_of(spec.address).is_some() {
            return Err(ConfigError::DuplicateExecutive(spec.address));
        }

        let mut desired = current.executive_specs(self.config.max_screeners_per_executive)?;
        let position = at.unwrap_or(desired.len());
        if position > desired.len() {
            return Err(ConfigError::PositionOutOfRange {
                position,
                len: desired.len(),
            });
        }
        debug!(type_id = %type_id, assistant = %spec.address, position, "Inserting assistant");
        desired.insert(position, spec);
        self.migrate(current, &desired).await
    }

    /// Detach `assistant`; every later executive shifts down one position.
    pub async fn remove_assistant(
        &self,
        type_id: TypeId,
        assistant: Address,
    ) -> Result<MigrationOutcome, ConfigError> {
        let current = self.snapshot(type_id).await?;
        let position = current
            .position_of(assistant)
            .ok_or(ConfigError::AssistantNotFound { type_id, assistant })?;

        let mut desired = current.executive_specs(self.config.max_screeners_per_executive)?;
        debug!(type_id = %type_id, %assistant, position, "Removing assistant");
        desired.remove(position);
        self.migrate(current, &desired).await
    }

    /// Move `assistant` to position `to` of the resulting chain.
    pub async fn move_assistant(
        &self,
        type_id: TypeId,
        assistant: Address,
        to: usize,
    ) -> Result<MigrationOutcome, ConfigError> {
        let current = self.snapshot(type_id).await?;
        let from = current
            .position_of(assistant)
            .ok_or(ConfigError::AssistantNotFound { type_id, assistant })?;
        if to >= current.executives.len() {
            return Err(ConfigError::PositionOutOfRange {
                position: to,
                len: current.executives.len(),
            });
        }

        let mut desired = current.executive_specs(self.config.max_screeners_per_executive)?;
        debug!(type_id = %type_id, %assistant, from, to, "Moving assistant");
        let spec = desired.remove(from);
        desired.insert(to, spec);
        self.migrate(current, &desired).await
    }

    /// Replace the configuration of an attached assistant in place.
    pub async fn update_assistant(
        &self,
        type_id: TypeId,
        spec: ExecutiveSpec,
    ) -> Result<MigrationOutcome, ConfigError> {
        let current = self.snapshot(type_id).await?;
        let position = current
            .position_of(spec.address)
            .ok_or(ConfigError::AssistantNotFound {
                type_id,
                assistant: spec.address,
            })?;

        let mut desired = current.executive_specs(self.config.max_screeners_per_executive)?;
        debug!(type_id = %type_id, assistant = %spec.address, position, "Updating assistant");
        desired[position] = spec;
        self.migrate(current, &desired).await
    }

    async fn migrate(
        &self,
        current: StateModel,
        desired: &[ExecutiveSpec],
    ) -> Result<MigrationOutcome, ConfigError> {
        let plan = self.plan_from(current, desired).await?;
        let receipt = self.commit(&plan).await?;
        Ok(MigrationOutcome { plan, receipt })
    }
}
