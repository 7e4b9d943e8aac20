//! The update selection engine.
//!
//! Every validated update takes one of two paths. With supermajority
//! participation it is applied at once. Otherwise it competes for the single
//! `best_valid_update` slot, and a candidate left there for longer than the
//! configured timeout is force-applied on the next clock tick.

use std::sync::Arc;

use alloy_primitives::B256;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::LightClientConfig;
use crate::consensus::bootstrap::{bootstrap, BootstrapError};
use crate::consensus::period::compute_sync_committee_period_at_slot;
use crate::consensus::store::{BestValidUpdate, LightClientStore};
use crate::consensus::validation::{validate_update, ValidationError, ValidationOutcome};
use crate::types::beacon::*;
use crate::types::update::GenericUpdate;

/// Store fields changed by one application of an update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppliedChanges {
    pub optimistic_slot: Option<u64>,
    pub finalized_slot: Option<u64>,
    pub sync_committee: Option<CommitteeChange>,
}

impl AppliedChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitteeChange {
    /// The committee of `period` became known as the next committee.
    Learned { period: u64 },
    /// The committee of `period` became the current committee.
    Rotated { period: u64 },
}

/// What happened to a validated update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    Applied(AppliedChanges),
    /// Held as `best_valid_update`.
    Candidate,
    /// Valid, but neither advancing the store nor better than the candidate.
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub disposition: Disposition,
    /// Changes from a timed-out candidate force-applied after this update.
    pub forced: Option<AppliedChanges>,
}

/// Total order of candidates on the deferred path, compared field by field:
/// the number of claims (finality, next committee), then the signature slot,
/// then participation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct UpdateRank {
    claims: u8,
    signature_slot: u64,
    participants: usize,
}

impl UpdateRank {
    pub fn of(update: &GenericUpdate) -> Self {
        let claims =
            u8::from(update.finality().is_some()) + u8::from(update.next_sync_committee().is_some());
        Self {
            claims,
            signature_slot: update.signature_slot,
            participants: update.sync_aggregate.num_participants(),
        }
    }
}

/// A bootstrapped light client: configuration plus the store it advances.
#[derive(Clone, Debug)]
pub struct LightClient {
    config: LightClientConfig,
    store: LightClientStore,
}

impl LightClient {
    pub fn bootstrap(
        config: LightClientConfig,
        snapshot: &LightClientBootstrap,
        trusted_block_root: &B256,
    ) -> Result<Self, BootstrapError> {
        let store = bootstrap(snapshot, trusted_block_root, &config)?;
        Ok(Self { config, store })
    }

    /// Bootstrap against the checkpoint root set in the configuration.
    pub fn from_checkpoint(
        config: LightClientConfig,
        snapshot: &LightClientBootstrap,
    ) -> Result<Self, BootstrapError> {
        let trusted_block_root = config
            .trusted_checkpoint
            .ok_or(BootstrapError::MissingTrustedCheckpoint)?;
        Self::bootstrap(config, snapshot, &trusted_block_root)
    }

    pub fn config(&self) -> &LightClientConfig {
        &self.config
    }

    pub fn store(&self) -> &LightClientStore {
        &self.store
    }

    pub fn finalized_header(&self) -> &BeaconBlockHeader {
        self.store.finalized_header()
    }

    pub fn optimistic_header(&self) -> &BeaconBlockHeader {
        self.store.optimistic_header()
    }

    /// Process a full update. Its fork is the one active at the attested slot.
    pub fn process_full_update(
        &mut self,
        update: &LightClientUpdate,
        current_slot: u64,
    ) -> Result<ProcessOutcome, ValidationError> {
        let version = self
            .config
            .chain
            .version_at_slot(update.attested_header.slot);
        self.process_update(&GenericUpdate::from_full(update, version), current_slot)
    }

    pub fn process_finality_update(
        &mut self,
        update: &Versioned<LightClientFinalityUpdate>,
        current_slot: u64,
    ) -> Result<ProcessOutcome, ValidationError> {
        self.process_update(&update.into(), current_slot)
    }

    pub fn process_optimistic_update(
        &mut self,
        update: &Versioned<LightClientOptimisticUpdate>,
        current_slot: u64,
    ) -> Result<ProcessOutcome, ValidationError> {
        self.process_update(&update.into(), current_slot)
    }

    /// Validate `update`, then apply it, hold it as the candidate, or ignore
    /// it. A rejected update leaves the store untouched. After a valid update
    /// the timeout rule runs for `current_slot`.
    pub fn process_update(
        &mut self,
        update: &GenericUpdate,
        current_slot: u64,
    ) -> Result<ProcessOutcome, ValidationError> {
        let outcome = validate_update(&self.store, update, current_slot, &self.config)
            .inspect_err(|err| {
                debug!(
                    attested_slot = update.attested_header.slot,
                    signature_slot = update.signature_slot,
                    kind = ?update.kind(),
                    %err,
                    "Rejected light client update"
                );
            })?;

        let disposition = self.select(update, &outcome, current_slot);
        let forced = self.process_slot(current_slot);
        Ok(ProcessOutcome {
            disposition,
            forced,
        })
    }

    /// Clock tick: force-apply the candidate once it has waited longer than
    /// the update timeout. Returns the changes when a force-apply happened.
    pub fn process_slot(&mut self, current_slot: u64) -> Option<AppliedChanges> {
        let recorded_at_slot = self.store.best_valid_update.as_ref()?.recorded_at_slot;
        if current_slot.saturating_sub(recorded_at_slot) <= self.config.update_timeout_slots() {
            return None;
        }
        let BestValidUpdate { mut update, .. } = self.store.best_valid_update.take()?;

        let finality_is_newer = update
            .finalized_header()
            .is_some_and(|header| header.slot > self.store.finalized_header.slot);
        if !finality_is_newer {
            update = update.with_attested_as_finalized();
        }

        warn!(
            attested_slot = update.attested_header.slot,
            recorded_at_slot,
            current_slot,
            "Update timeout elapsed, force-applying best valid update"
        );
        let attested_period =
            compute_sync_committee_period_at_slot(&self.config.chain, update.attested_header.slot);
        let participants = update.sync_aggregate.num_participants();
        Some(self.apply(&update, participants, attested_period, true))
    }

    fn select(
        &mut self,
        update: &GenericUpdate,
        outcome: &ValidationOutcome,
        current_slot: u64,
    ) -> Disposition {
        let store = &mut self.store;
        store.current_max_active_participants = store
            .current_max_active_participants
            .max(outcome.participants);

        let committee_size = self.config.chain.sync_committee_size;
        if self
            .config
            .sync
            .supermajority
            .is_met(outcome.participants, committee_size)
        {
            if !self.advances_store(update, outcome.attested_period) {
                debug!(
                    attested_slot = update.attested_header.slot,
                    "Supermajority update does not advance the store"
                );
                return Disposition::Ignored;
            }
            let changes = self.apply(
                update,
                outcome.participants,
                outcome.attested_period,
                false,
            );
            self.store.best_valid_update = None;
            return Disposition::Applied(changes);
        }

        let rank = UpdateRank::of(update);
        if let Some(best) = &mut self.store.best_valid_update {
            if rank <= UpdateRank::of(&best.update) {
                return Disposition::Ignored;
            }
            debug!(
                attested_slot = update.attested_header.slot,
                participants = outcome.participants,
                current_slot,
                "Replacing best valid update"
            );
            *best = BestValidUpdate {
                update: update.clone(),
                recorded_at_slot: current_slot,
            };
            return Disposition::Candidate;
        }

        debug!(
            attested_slot = update.attested_header.slot,
            participants = outcome.participants,
            current_slot,
            "Recording best valid update"
        );
        self.store.best_valid_update = Some(BestValidUpdate {
            update: update.clone(),
            recorded_at_slot: current_slot,
        });
        Disposition::Candidate
    }

    fn advances_store(&self, update: &GenericUpdate, attested_period: u64) -> bool {
        let store = &self.store;
        let newer_optimistic = update.attested_header.slot > store.optimistic_header.slot;
        let newer_finality = update
            .finalized_header()
            .is_some_and(|header| header.slot > store.finalized_header.slot);
        let learns_next_committee = update.next_sync_committee().is_some()
            && !store.is_next_sync_committee_known()
            && attested_period == store.current_period(&self.config.chain);
        newer_optimistic || newer_finality || learns_next_committee
    }

    /// Apply a validated update to the store.
    fn apply(
        &mut self,
        update: &GenericUpdate,
        participants: usize,
        attested_period: u64,
        forced: bool,
    ) -> AppliedChanges {
        let chain = &self.config.chain;
        let store = &mut self.store;
        let store_period = store.current_period(chain);
        let mut changes = AppliedChanges::default();

        let attested = &update.attested_header;
        if attested.slot > store.optimistic_header.slot
            && (forced || participants > store.safety_threshold())
        {
            store.optimistic_header = attested.clone();
            changes.optimistic_slot = Some(attested.slot);
            info!(slot = attested.slot, "Optimistic header advanced");
        }

        if let Some(proof) = update.next_sync_committee() {
            if !store.is_next_sync_committee_known() && attested_period == store_period {
                store.next_sync_committee = Some(proof.committee.clone());
                changes.sync_committee = Some(CommitteeChange::Learned {
                    period: store_period + 1,
                });
                info!(period = store_period + 1, "Learned next sync committee");
            }
        }

        if let Some(finalized) = update.finalized_header() {
            if finalized.slot > store.finalized_header.slot {
                let finalized_period = compute_sync_committee_period_at_slot(chain, finalized.slot);
                if finalized_period == store_period + 1 {
                    let next = store
                        .next_sync_committee
                        .take()
                        .expect("finality crossed into a period whose committee is unknown");
                    store.current_sync_committee = next;
                    store.next_sync_committee = update
                        .next_sync_committee()
                        .map(|proof| proof.committee.clone());
                    store.previous_max_active_participants = store.current_max_active_participants;
                    store.current_max_active_participants = 0;
                    changes.sync_committee = Some(CommitteeChange::Rotated {
                        period: finalized_period,
                    });
                    info!(period = finalized_period, "Sync committee rotated");
                }

                store.finalized_header = finalized.clone();
                changes.finalized_slot = Some(finalized.slot);
                info!(slot = finalized.slot, forced, "Finalized header advanced");

                if store.optimistic_header.slot < finalized.slot {
                    store.optimistic_header = finalized.clone();
                    changes.optimistic_slot = Some(finalized.slot);
                }
            }
        }

        changes
    }
}

/// A light client shared between one writer and many readers.
///
/// Each `process_*` call holds the write lock from validation through
/// application, so two updates never interleave.
#[derive(Clone, Debug)]
pub struct SharedLightClient {
    inner: Arc<RwLock<LightClient>>,
}

impl SharedLightClient {
    pub fn new(client: LightClient) -> Self {
        Self {
            inner: Arc::new(RwLock::new(client)),
        }
    }

    pub fn process_update(
        &self,
        update: &GenericUpdate,
        current_slot: u64,
    ) -> Result<ProcessOutcome, ValidationError> {
        self.inner.write().process_update(update, current_slot)
    }

    pub fn process_full_update(
        &self,
        update: &LightClientUpdate,
        current_slot: u64,
    ) -> Result<ProcessOutcome, ValidationError> {
        self.inner.write().process_full_update(update, current_slot)
    }

    pub fn process_finality_update(
        &self,
        update: &Versioned<LightClientFinalityUpdate>,
        current_slot: u64,
    ) -> Result<ProcessOutcome, ValidationError> {
        self.inner.write().process_finality_update(update, current_slot)
    }

    pub fn process_optimistic_update(
        &self,
        update: &Versioned<LightClientOptimisticUpdate>,
        current_slot: u64,
    ) -> Result<ProcessOutcome, ValidationError> {
        self.inner.write().process_optimistic_update(update, current_slot)
    }

    pub fn process_slot(&self, current_slot: u64) -> Option<AppliedChanges> {
        self.inner.write().process_slot(current_slot)
    }

    pub fn finalized_header(&self) -> BeaconBlockHeader {
        self.inner.read().finalized_header().clone()
    }

    pub fn optimistic_header(&self) -> BeaconBlockHeader {
        self.inner.read().optimistic_header().clone()
    }

    pub fn store_snapshot(&self) -> LightClientStore {
        self.inner.read().store().clone()
    }
}
