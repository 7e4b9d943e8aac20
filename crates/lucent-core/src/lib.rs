//! # Lucent Core
//!
//! Ethereum beacon-chain light client sync engine.
//!
//! This crate contains **no networking code**. Callers hand it already
//! decoded bootstrap snapshots and updates together with the current slot,
//! and it decides whether each update advances the optimistic head, the
//! finalized head and the sync committee.
//!
//! ## Trust Model
//!
//! - **Bootstrap** (`consensus::bootstrap`): the only trusted input is the
//!   checkpoint block root, obtained out of band. Everything in the bootstrap
//!   snapshot is proven against it.
//!
//! - **Updates** (`consensus::validation`, `consensus::light_client`):
//!   verified with Merkle proofs against the attested state root and a BLS12-381
//!   aggregate signature from the sync committee the store already trusts.
//!   Updates with a supermajority apply at once; weaker ones wait as a
//!   candidate until a timeout.
//!
//! ## Usage
//!
//! ```ignore
//! use lucent_core::{LightClient, LightClientConfig, Network};
//!
//! let config = LightClientConfig::load(Network::Mainnet, None)?;
//! let mut client = LightClient::from_checkpoint(config, &bootstrap)?;
//! client.process_full_update(&update, current_slot)?;
//! ```

pub mod config;
pub mod consensus;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{ChainSpec, ConfigError, LightClientConfig, Network, SyncParams, Threshold};
pub use consensus::{
    bootstrap::{bootstrap, BootstrapError},
    checkpoint::{parse_checkpoint_root, select_trusted_checkpoint, CheckpointError, VerifiedCheckpoint},
    light_client::{
        AppliedChanges, CommitteeChange, Disposition, LightClient, ProcessOutcome, SharedLightClient,
    },
    store::LightClientStore,
    validation::{validate_update, ValidationError},
};
pub use types::{beacon::*, update::*};
