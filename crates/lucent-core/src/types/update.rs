//! The engine's single internal update shape.
//!
//! The three wire messages (full, finality, optimistic) all funnel into
//! [`GenericUpdate`]; [`UpdatePayload`] keeps only the fields the source
//! message actually carried, so validation and selection are written once.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::types::beacon::*;

/// A sync committee together with its inclusion proof in the attested state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCommitteeProof {
    pub committee: SyncCommittee,
    pub branch: Vec<B256>,
}

/// A finalized header together with its inclusion proof in the attested state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalityProof {
    pub header: BeaconBlockHeader,
    pub branch: Vec<B256>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdatePayload {
    Full {
        next_sync_committee: Option<SyncCommitteeProof>,
        finality: Option<FinalityProof>,
    },
    Finality(FinalityProof),
    Optimistic,
}

/// Which wire message an update came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateKind {
    Full,
    Finality,
    Optimistic,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericUpdate {
    pub version: Version,
    pub attested_header: BeaconBlockHeader,
    pub sync_aggregate: SyncAggregate,
    pub signature_slot: u64,
    pub payload: UpdatePayload,
}

impl GenericUpdate {
    pub fn kind(&self) -> UpdateKind {
        match self.payload {
            UpdatePayload::Full { .. } => UpdateKind::Full,
            UpdatePayload::Finality(_) => UpdateKind::Finality,
            UpdatePayload::Optimistic => UpdateKind::Optimistic,
        }
    }

    pub fn finality(&self) -> Option<&FinalityProof> {
        match &self.payload {
            UpdatePayload::Full { finality, .. } => finality.as_ref(),
            UpdatePayload::Finality(proof) => Some(proof),
            UpdatePayload::Optimistic => None,
        }
    }

    pub fn next_sync_committee(&self) -> Option<&SyncCommitteeProof> {
        match &self.payload {
            UpdatePayload::Full {
                next_sync_committee,
                ..
            } => next_sync_committee.as_ref(),
            _ => None,
        }
    }

    pub fn finalized_header(&self) -> Option<&BeaconBlockHeader> {
        self.finality().map(|proof| &proof.header)
    }

    /// Build from a full update. The version is not part of the full message,
    /// so the caller resolves it from the fork schedule.
    pub fn from_full(update: &LightClientUpdate, version: Version) -> Self {
        let finality_claimed = !update.finalized_header.is_empty()
            || update.finality_branch.iter().any(|node| !node.is_zero());
        let finality = finality_claimed.then(|| FinalityProof {
            header: update.finalized_header.clone(),
            branch: update.finality_branch.clone(),
        });
        let next_sync_committee =
            update
                .next_sync_committee
                .as_ref()
                .map(|committee| SyncCommitteeProof {
                    committee: committee.clone(),
                    branch: update.next_sync_committee_branch.clone(),
                });

        Self {
            version,
            attested_header: update.attested_header.clone(),
            sync_aggregate: update.sync_aggregate.clone(),
            signature_slot: update.signature_slot,
            payload: UpdatePayload::Full {
                next_sync_committee,
                finality,
            },
        }
    }

    /// Copy of this update whose finalized header is its own attested header.
    /// Used when a stalled candidate is force-applied without a newer finality proof.
    pub(crate) fn with_attested_as_finalized(&self) -> Self {
        let finality = Some(FinalityProof {
            header: self.attested_header.clone(),
            branch: Vec::new(),
        });
        Self {
            payload: UpdatePayload::Full {
                next_sync_committee: self.next_sync_committee().cloned(),
                finality,
            },
            ..self.clone()
        }
    }
}

impl From<&Versioned<LightClientFinalityUpdate>> for GenericUpdate {
    fn from(update: &Versioned<LightClientFinalityUpdate>) -> Self {
        let data = &update.data;
        Self {
            version: update.version,
            attested_header: data.attested_header.clone(),
            sync_aggregate: data.sync_aggregate.clone(),
            signature_slot: data.signature_slot,
            payload: UpdatePayload::Finality(FinalityProof {
                header: data.finalized_header.clone(),
                branch: data.finality_branch.clone(),
            }),
        }
    }
}

impl From<&Versioned<LightClientOptimisticUpdate>> for GenericUpdate {
    fn from(update: &Versioned<LightClientOptimisticUpdate>) -> Self {
        let data = &update.data;
        Self {
            version: update.version,
            attested_header: data.attested_header.clone(),
            sync_aggregate: data.sync_aggregate.clone(),
            signature_slot: data.signature_slot,
            payload: UpdatePayload::Optimistic,
        }
    }
}
