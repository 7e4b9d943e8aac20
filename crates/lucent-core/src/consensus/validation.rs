//! Stateless validation of light client updates against a store.
//!
//! [`validate_update`] runs every structural, period, participation, proof and
//! signature check an update must pass before the selection engine may look at
//! it. It never mutates the store.

use std::fmt;

use thiserror::Error;

use crate::config::LightClientConfig;
use crate::consensus::merkle::{verify_merkle_branch, HashTreeRoot};
use crate::consensus::period::compute_sync_committee_period_at_slot;
use crate::consensus::store::LightClientStore;
use crate::consensus::sync_committee::{sync_committee_domain, verify_sync_aggregate};
use crate::types::beacon::Version;
use crate::types::update::GenericUpdate;

/// Errors that reject an update. None of them touch the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Fork {0} has no light client support")]
    UnsupportedVersion(Version),

    #[error("Malformed update: {0}")]
    MalformedUpdate(Malformation),

    #[error("Update outside the acceptable slot window: {0}")]
    StaleOrFutureSlot(SlotWindow),

    #[error("Attested period {attested_period} is not usable from store period {store_period}")]
    UnknownPeriod {
        attested_period: u64,
        store_period: u64,
    },

    #[error("Insufficient sync committee participation: {participants} < {required}")]
    InsufficientParticipation { participants: usize, required: usize },

    #[error("Invalid Merkle proof for {0}")]
    InvalidMerkleProof(ProofKind),

    #[error("Invalid sync committee aggregate signature")]
    InvalidSignature,
}

/// Structural defects of an update.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Malformation {
    #[error("signature slot {signature_slot} is not after attested slot {attested_slot}")]
    SignatureSlotNotAfterAttested {
        signature_slot: u64,
        attested_slot: u64,
    },

    #[error("finalized slot {finalized_slot} is after attested slot {attested_slot}")]
    FinalizedAfterAttested {
        finalized_slot: u64,
        attested_slot: u64,
    },

    #[error("participation bitfield has {got} bytes, expected {expected}")]
    ParticipationBitsLength { expected: usize, got: usize },

    #[error("participation bitfield has bits set past the committee")]
    ParticipationPadding,

    #[error("next sync committee has {got} members, expected {expected}")]
    SyncCommitteeSize { expected: usize, got: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotWindow {
    #[error("signature slot {signature_slot} is ahead of current slot {current_slot}")]
    Future {
        signature_slot: u64,
        current_slot: u64,
    },

    #[error("attested slot {attested_slot} does not advance finalized slot {finalized_slot}")]
    Stale {
        attested_slot: u64,
        finalized_slot: u64,
    },
}

/// Which Merkle proof of an update failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofKind {
    NextSyncCommittee,
    FinalizedHeader,
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofKind::NextSyncCommittee => f.write_str("next sync committee"),
            ProofKind::FinalizedHeader => f.write_str("finalized header"),
        }
    }
}

/// The committee whose aggregate signature was checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningCommittee {
    Current,
    Next,
}

/// What the selection engine needs to know about an accepted update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub participants: usize,
    pub signing_committee: SigningCommittee,
    pub attested_period: u64,
}

/// Validate `update` against `store` at the wall-clock `current_slot`.
///
/// Checks run in a fixed order and stop at the first failure: fork support,
/// slot ordering, slot window and relevance, period, participation, the next
/// sync committee proof, the finality proof and finally the aggregate
/// signature.
pub fn validate_update(
    store: &LightClientStore,
    update: &GenericUpdate,
    current_slot: u64,
    config: &LightClientConfig,
) -> Result<ValidationOutcome, ValidationError> {
    let chain = &config.chain;
    let layout = update
        .version
        .light_client_layout()
        .ok_or(ValidationError::UnsupportedVersion(update.version))?;

    // 1. Slot ordering.
    let attested = &update.attested_header;
    if update.signature_slot <= attested.slot {
        return Err(ValidationError::MalformedUpdate(
            Malformation::SignatureSlotNotAfterAttested {
                signature_slot: update.signature_slot,
                attested_slot: attested.slot,
            },
        ));
    }
    if let Some(finalized) = update.finalized_header() {
        if finalized.slot > attested.slot {
            return Err(ValidationError::MalformedUpdate(
                Malformation::FinalizedAfterAttested {
                    finalized_slot: finalized.slot,
                    attested_slot: attested.slot,
                },
            ));
        }
    }

    // 2. Slot window.
    if update.signature_slot > current_slot.saturating_add(config.sync.max_clock_drift_slots) {
        return Err(ValidationError::StaleOrFutureSlot(SlotWindow::Future {
            signature_slot: update.signature_slot,
            current_slot,
        }));
    }
    let store_period = store.current_period(chain);
    let attested_period = compute_sync_committee_period_at_slot(chain, attested.slot);
    let teaches_next_committee = update.next_sync_committee().is_some()
        && !store.is_next_sync_committee_known()
        && attested_period == store_period;
    if attested.slot <= store.finalized_header().slot && !teaches_next_committee {
        return Err(ValidationError::StaleOrFutureSlot(SlotWindow::Stale {
            attested_slot: attested.slot,
            finalized_slot: store.finalized_header().slot,
        }));
    }

    // 3. Period discipline.
    let signing_committee = if attested_period == store_period {
        SigningCommittee::Current
    } else if attested_period == store_period + 1 && store.is_next_sync_committee_known() {
        SigningCommittee::Next
    } else {
        return Err(ValidationError::UnknownPeriod {
            attested_period,
            store_period,
        });
    };

    // 4. Participation.
    let committee_size = chain.sync_committee_size;
    let bits = &update.sync_aggregate.sync_committee_bits;
    let expected_len = committee_size.div_ceil(8);
    if bits.len() != expected_len {
        return Err(ValidationError::MalformedUpdate(
            Malformation::ParticipationBitsLength {
                expected: expected_len,
                got: bits.len(),
            },
        ));
    }
    if update.sync_aggregate.bits()[committee_size..].any() {
        return Err(ValidationError::MalformedUpdate(
            Malformation::ParticipationPadding,
        ));
    }
    let participants = update.sync_aggregate.num_participants();
    if participants < config.sync.min_sync_committee_participants {
        return Err(ValidationError::InsufficientParticipation {
            participants,
            required: config.sync.min_sync_committee_participants,
        });
    }

    // 5. Next sync committee proof.
    if let Some(proof) = update.next_sync_committee() {
        if proof.committee.pubkeys.len() != committee_size {
            return Err(ValidationError::MalformedUpdate(
                Malformation::SyncCommitteeSize {
                    expected: committee_size,
                    got: proof.committee.pubkeys.len(),
                },
            ));
        }
        if !verify_merkle_branch(
            &proof.committee.hash_tree_root(),
            &proof.branch,
            layout.next_sync_committee,
            &attested.state_root,
        ) {
            return Err(ValidationError::InvalidMerkleProof(
                ProofKind::NextSyncCommittee,
            ));
        }
    }

    // 6. Finality proof.
    if let Some(proof) = update.finality() {
        if !verify_merkle_branch(
            &proof.header.hash_tree_root(),
            &proof.branch,
            layout.finalized_root,
            &attested.state_root,
        ) {
            return Err(ValidationError::InvalidMerkleProof(
                ProofKind::FinalizedHeader,
            ));
        }
    }

    // 7. Aggregate signature.
    let committee = match signing_committee {
        SigningCommittee::Current => store.current_sync_committee(),
        SigningCommittee::Next => store
            .next_sync_committee()
            .ok_or(ValidationError::UnknownPeriod {
                attested_period,
                store_period,
            })?,
    };
    // Signers vote on the block before the signature slot, under its fork.
    let signing_version = chain.version_at_slot(update.signature_slot.saturating_sub(1));
    let domain = sync_committee_domain(chain, signing_version);
    if !verify_sync_aggregate(
        committee,
        update.sync_aggregate.bits(),
        &attested.hash_tree_root(),
        &update.sync_aggregate.sync_committee_signature,
        &domain,
    ) {
        return Err(ValidationError::InvalidSignature);
    }

    Ok(ValidationOutcome {
        participants,
        signing_committee,
        attested_period,
    })
}
