//! SSZ merkleization and Merkle branch verification.
//!
//! Only the containers the light client touches are hashed here: beacon block
//! headers, BLS public keys and sync committees, plus the two-field signing
//! and fork-data containers used for signature domains.

use alloy_primitives::B256;
use sha2::{Digest, Sha256};

use crate::types::beacon::*;

/// Position of a node in a binary Merkle tree: the root is 1 and the children
/// of `g` are `2g` and `2g + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneralizedIndex(pub u64);

impl GeneralizedIndex {
    /// Distance from the root, or `None` for the invalid index 0.
    pub fn depth(self) -> Option<usize> {
        (self.0 != 0).then(|| (u64::BITS - 1 - self.0.leading_zeros()) as usize)
    }

    /// Index of the node among the nodes of its depth.
    pub fn subtree_index(self) -> Option<u64> {
        self.depth().map(|depth| self.0 - (1u64 << depth))
    }
}

/// Anything with an SSZ `hash_tree_root`.
pub trait HashTreeRoot {
    fn hash_tree_root(&self) -> B256;
}

impl HashTreeRoot for BeaconBlockHeader {
    /// Five fields, each one 32-byte leaf, padded to eight leaves.
    fn hash_tree_root(&self) -> B256 {
        merkleize(&[
            uint64_to_leaf(self.slot),
            uint64_to_leaf(self.proposer_index),
            self.parent_root,
            self.state_root,
            self.body_root,
        ])
    }
}

impl HashTreeRoot for BlsPublicKey {
    fn hash_tree_root(&self) -> B256 {
        let mut chunks = [0u8; 64];
        chunks[..BLS_PUBKEY_LEN].copy_from_slice(&self.0);
        sha256_hash(&chunks)
    }
}

impl HashTreeRoot for SyncCommittee {
    fn hash_tree_root(&self) -> B256 {
        let pubkey_roots: Vec<B256> = self.pubkeys.iter().map(|pk| pk.hash_tree_root()).collect();
        sha256_pair(
            &merkleize(&pubkey_roots),
            &self.aggregate_pubkey.hash_tree_root(),
        )
    }
}

/// Verify a Merkle branch (SSZ proof) against an expected root.
///
/// `branch[0]` is the sibling of the leaf; the bit of the generalized index at
/// each depth decides whether the running hash sits on the left or the right.
/// Returns false when the branch length does not match the index depth.
pub fn verify_merkle_branch(
    leaf: &B256,
    branch: &[B256],
    gindex: GeneralizedIndex,
    root: &B256,
) -> bool {
    match merkle_root_from_branch(leaf, branch, gindex) {
        Some(computed) => computed == *root,
        None => false,
    }
}

/// Recompute the root implied by `leaf` and `branch` at `gindex`.
pub fn merkle_root_from_branch(
    leaf: &B256,
    branch: &[B256],
    gindex: GeneralizedIndex,
) -> Option<B256> {
    if gindex.depth()? != branch.len() {
        return None;
    }

    let mut current = *leaf;
    for (i, node) in branch.iter().enumerate() {
        if (gindex.0 >> i) & 1 == 1 {
            current = sha256_pair(node, &current);
        } else {
            current = sha256_pair(&current, node);
        }
    }
    Some(current)
}

/// Merkleize chunks, padding with zero chunks to the next power of two.
pub fn merkleize(chunks: &[B256]) -> B256 {
    if chunks.is_empty() {
        return B256::ZERO;
    }

    let width = chunks.len().next_power_of_two();
    let mut layer: Vec<B256> = chunks.to_vec();
    layer.resize(width, B256::ZERO);

    while layer.len() > 1 {
        layer = layer
            .chunks_exact(2)
            .map(|pair| sha256_pair(&pair[0], &pair[1]))
            .collect();
    }
    layer[0]
}

/// SHA256 hash of arbitrary data.
pub(crate) fn sha256_hash(data: &[u8]) -> B256 {
    B256::from_slice(&Sha256::digest(data))
}

/// SHA256 hash of two 32-byte values concatenated.
pub(crate) fn sha256_pair(a: &B256, b: &B256) -> B256 {
    let mut hasher = Sha256::new();
    hasher.update(a);
    hasher.update(b);
    B256::from_slice(&hasher.finalize())
}

/// Encode a u64 as a 32-byte SSZ leaf (little-endian, zero-padded).
fn uint64_to_leaf(value: u64) -> B256 {
    let mut leaf = [0u8; 32];
    leaf[..8].copy_from_slice(&value.to_le_bytes());
    B256::from(leaf)
}
