//! Slot, epoch and sync committee period arithmetic.
//!
//! Divisors come from a validated [`ChainSpec`] and are never zero.

use crate::config::ChainSpec;

pub fn compute_epoch_at_slot(spec: &ChainSpec, slot: u64) -> u64 {
    slot / spec.slots_per_epoch
}

pub fn compute_sync_committee_period(spec: &ChainSpec, epoch: u64) -> u64 {
    epoch / spec.epochs_per_sync_committee_period
}

pub fn compute_sync_committee_period_at_slot(spec: &ChainSpec, slot: u64) -> u64 {
    compute_sync_committee_period(spec, compute_epoch_at_slot(spec, slot))
}

pub fn slots_per_sync_committee_period(spec: &ChainSpec) -> u64 {
    spec.slots_per_epoch
        .saturating_mul(spec.epochs_per_sync_committee_period)
}

/// First slot of a sync committee period.
pub fn compute_start_slot_at_period(spec: &ChainSpec, period: u64) -> u64 {
    period.saturating_mul(slots_per_sync_committee_period(spec))
}

/// Wall-clock slot at a unix timestamp, `None` before genesis.
pub fn compute_slot_at_timestamp(spec: &ChainSpec, timestamp: u64) -> Option<u64> {
    timestamp
        .checked_sub(spec.genesis_time)
        .map(|since_genesis| since_genesis / spec.seconds_per_slot)
}
