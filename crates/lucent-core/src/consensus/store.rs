use serde::{Deserialize, Serialize};

use crate::config::ChainSpec;
use crate::consensus::period::compute_sync_committee_period_at_slot;
use crate::types::beacon::*;
use crate::types::update::GenericUpdate;

/// The pending candidate of the deferred path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestValidUpdate {
    pub update: GenericUpdate,
    /// Clock slot at which this candidate was last set. A better candidate
    /// replacing it restarts the timeout.
    pub recorded_at_slot: u64,
}

/// Light client state: the trusted headers, the sync committees and the
/// bookkeeping the selection engine needs between updates.
///
/// Created by bootstrap and mutated only by the light client. The current
/// sync committee always serves the period of `finalized_header`, and the
/// next one, once known, serves the period after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightClientStore {
    pub(crate) finalized_header: BeaconBlockHeader,
    pub(crate) optimistic_header: BeaconBlockHeader,
    pub(crate) current_sync_committee: SyncCommittee,
    pub(crate) next_sync_committee: Option<SyncCommittee>,
    pub(crate) best_valid_update: Option<BestValidUpdate>,
    pub(crate) previous_max_active_participants: usize,
    pub(crate) current_max_active_participants: usize,
}

impl LightClientStore {
    pub(crate) fn new(header: BeaconBlockHeader, current_sync_committee: SyncCommittee) -> Self {
        Self {
            finalized_header: header.clone(),
            optimistic_header: header,
            current_sync_committee,
            next_sync_committee: None,
            best_valid_update: None,
            previous_max_active_participants: 0,
            current_max_active_participants: 0,
        }
    }

    pub fn finalized_header(&self) -> &BeaconBlockHeader {
        &self.finalized_header
    }

    pub fn optimistic_header(&self) -> &BeaconBlockHeader {
        &self.optimistic_header
    }

    pub fn current_sync_committee(&self) -> &SyncCommittee {
        &self.current_sync_committee
    }

    pub fn next_sync_committee(&self) -> Option<&SyncCommittee> {
        self.next_sync_committee.as_ref()
    }

    pub fn best_valid_update(&self) -> Option<&BestValidUpdate> {
        self.best_valid_update.as_ref()
    }

    pub fn previous_max_active_participants(&self) -> usize {
        self.previous_max_active_participants
    }

    pub fn current_max_active_participants(&self) -> usize {
        self.current_max_active_participants
    }

    /// Sync committee period of the finalized header.
    pub fn current_period(&self, spec: &ChainSpec) -> u64 {
        compute_sync_committee_period_at_slot(spec, self.finalized_header.slot)
    }

    pub fn is_next_sync_committee_known(&self) -> bool {
        self.next_sync_committee.is_some()
    }

    /// Participation an update must exceed to move the optimistic header
    /// outside a forced update: half the best participation seen over the
    /// current and previous periods.
    pub fn safety_threshold(&self) -> usize {
        self.previous_max_active_participants
            .max(self.current_max_active_participants)
            / 2
    }
}
