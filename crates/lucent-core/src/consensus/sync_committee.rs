use alloy_primitives::B256;
use bitvec::prelude::*;
use blst::min_pk::{AggregatePublicKey, PublicKey, Signature};
use blst::BLST_ERROR;
use tracing::debug;

use crate::config::ChainSpec;
use crate::consensus::merkle::{sha256_pair, HashTreeRoot};
use crate::types::beacon::*;

/// Domain separation tag for Ethereum BLS signatures (proof-of-possession scheme).
pub const BLS_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// Compute the signing root: hash_tree_root(SigningData { object_root, domain }).
/// This is what the sync committee actually signs.
pub fn compute_signing_root(object_root: &B256, domain: &B256) -> B256 {
    sha256_pair(object_root, domain)
}

/// Compute a signing domain: domain_type + fork_data_root[:28].
pub fn compute_domain(
    domain_type: &[u8; 4],
    fork_version: &[u8; 4],
    genesis_validators_root: &B256,
) -> B256 {
    let fork_data_root = compute_fork_data_root(fork_version, genesis_validators_root);
    let mut domain = [0u8; 32];
    domain[..4].copy_from_slice(domain_type);
    domain[4..].copy_from_slice(&fork_data_root[..28]);
    B256::from(domain)
}

/// hash_tree_root(ForkData { current_version, genesis_validators_root }).
pub fn compute_fork_data_root(fork_version: &[u8; 4], genesis_validators_root: &B256) -> B256 {
    // The 4-byte version is a single chunk, right-padded with zeros.
    let mut version_chunk = [0u8; 32];
    version_chunk[..4].copy_from_slice(fork_version);
    sha256_pair(&B256::from(version_chunk), genesis_validators_root)
}

/// Sync committee signing domain for updates produced under `version`.
pub fn sync_committee_domain(spec: &ChainSpec, version: Version) -> B256 {
    compute_domain(
        &DOMAIN_SYNC_COMMITTEE,
        &spec.forks.fork_version(version).0,
        &spec.genesis_validators_root,
    )
}

/// Verify a sync committee aggregate signature over `object_root`.
///
/// Only the public keys whose participation bit is set are aggregated. An
/// empty participation set, a bit beyond the committee, an undecodable key or
/// signature all count as an invalid signature.
pub fn verify_sync_aggregate(
    committee: &SyncCommittee,
    participation: &BitSlice<u8, Lsb0>,
    object_root: &B256,
    signature: &BlsSignature,
    domain: &B256,
) -> bool {
    let participants: Vec<&BlsPublicKey> = match participation
        .iter_ones()
        .map(|index| committee.pubkeys.get(index))
        .collect::<Option<Vec<_>>>()
    {
        Some(keys) => keys,
        None => {
            debug!("participation bit set beyond the committee");
            return false;
        }
    };
    if participants.is_empty() {
        return false;
    }

    let signing_root = compute_signing_root(object_root, domain);
    match verify_aggregate_bls_signature(&participants, &signing_root, signature) {
        Ok(()) => true,
        Err(err) => {
            debug!(?err, "sync aggregate rejected");
            false
        }
    }
}

/// Verify an aggregate BLS12-381 signature with blst.
fn verify_aggregate_bls_signature(
    pubkeys: &[&BlsPublicKey],
    message: &B256,
    signature: &BlsSignature,
) -> Result<(), BLST_ERROR> {
    // The signature comes from an untrusted peer, so it is group-checked.
    let sig = Signature::from_bytes(&signature.0)?;

    // Committee keys are proven against a trusted state root; decoding is enough.
    let pks = pubkeys
        .iter()
        .map(|pk| PublicKey::from_bytes(&pk.0))
        .collect::<Result<Vec<_>, _>>()?;

    let pk_refs: Vec<&PublicKey> = pks.iter().collect();
    let agg_pk = AggregatePublicKey::aggregate(&pk_refs, false)?.to_public_key();

    match sig.verify(true, message.as_slice(), BLS_DST, &[], &agg_pk, false) {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        err => Err(err),
    }
}

/// Header root the committee signs for `header`.
pub fn header_signing_root(header: &BeaconBlockHeader, domain: &B256) -> B256 {
    compute_signing_root(&header.hash_tree_root(), domain)
}
