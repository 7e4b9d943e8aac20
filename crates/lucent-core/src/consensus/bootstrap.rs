use alloy_primitives::B256;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, LightClientConfig};
use crate::consensus::merkle::{verify_merkle_branch, HashTreeRoot};
use crate::consensus::store::LightClientStore;
use crate::types::beacon::*;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Fork {0} at the bootstrap slot has no light client support")]
    UnsupportedVersion(Version),

    #[error("Invalid sync committee: {reason}")]
    InvalidSyncCommittee { reason: String },

    #[error("Bootstrap header root {actual} does not match trusted root {expected}")]
    RootMismatch { expected: B256, actual: B256 },

    #[error("Current sync committee branch does not verify against the bootstrap state root")]
    ProofInvalid,

    #[error("No trusted checkpoint configured")]
    MissingTrustedCheckpoint,
}

/// Seed a store from a bootstrap snapshot.
///
/// `trusted_block_root` is the one externally anchored value: the snapshot
/// header must hash to it, and the current sync committee must be proven
/// against that header's state root. On any failure no store is produced.
pub fn bootstrap(
    snapshot: &LightClientBootstrap,
    trusted_block_root: &B256,
    config: &LightClientConfig,
) -> Result<LightClientStore, BootstrapError> {
    config.validate()?;

    let header = &snapshot.header;
    let version = config.chain.version_at_slot(header.slot);
    let layout = version
        .light_client_layout()
        .ok_or(BootstrapError::UnsupportedVersion(version))?;

    let header_root = header.hash_tree_root();
    if header_root != *trusted_block_root {
        return Err(BootstrapError::RootMismatch {
            expected: *trusted_block_root,
            actual: header_root,
        });
    }

    let committee = &snapshot.current_sync_committee;
    committee
        .validate(config.chain.sync_committee_size)
        .map_err(|reason| BootstrapError::InvalidSyncCommittee { reason })?;

    if !verify_merkle_branch(
        &committee.hash_tree_root(),
        &snapshot.current_sync_committee_branch,
        layout.current_sync_committee,
        &header.state_root,
    ) {
        return Err(BootstrapError::ProofInvalid);
    }

    info!(slot = header.slot, root = %header_root, %version, "Light client bootstrapped");
    Ok(LightClientStore::new(header.clone(), committee.clone()))
}
