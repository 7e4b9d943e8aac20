use alloy_primitives::B256;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of bytes in a BLS12-381 public key (compressed).
pub const BLS_PUBKEY_LEN: usize = 48;

/// Number of bytes in a BLS12-381 signature (compressed).
pub const BLS_SIGNATURE_LEN: usize = 96;

/// Domain type for sync committee signatures.
pub const DOMAIN_SYNC_COMMITTEE: [u8; 4] = [0x07, 0x00, 0x00, 0x00];

/// A BLS12-381 public key (48 bytes, compressed G1 point).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlsPublicKey(pub [u8; BLS_PUBKEY_LEN]);

impl Serialize for BlsPublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for BlsPublicKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

impl BlsPublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, &'static str> {
        let arr: [u8; BLS_PUBKEY_LEN] = bytes
            .try_into()
            .map_err(|_| "Invalid BLS public key length")?;
        Ok(Self(arr))
    }
}

/// A BLS12-381 signature (96 bytes, compressed G2 point).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlsSignature(pub [u8; BLS_SIGNATURE_LEN]);

impl Serialize for BlsSignature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for BlsSignature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

impl BlsSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, &'static str> {
        let arr: [u8; BLS_SIGNATURE_LEN] = bytes
            .try_into()
            .map_err(|_| "Invalid BLS signature length")?;
        Ok(Self(arr))
    }
}

/// A beacon chain block header.
///
/// The all-zero header (`Default`) is the "no finality claim" sentinel used by
/// full updates that do not carry a finalized header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlockHeader {
    /// Slot number of this block.
    pub slot: u64,
    /// Index of the validator who proposed this block.
    pub proposer_index: u64,
    /// Root hash of the parent beacon block.
    pub parent_root: B256,
    /// Root hash of the beacon state after processing this block.
    pub state_root: B256,
    /// Root hash of the block body.
    pub body_root: B256,
}

impl BeaconBlockHeader {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The sync committee: the validators that sign off on the chain head for one period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCommittee {
    /// BLS public keys of committee members, in committee order.
    pub pubkeys: Vec<BlsPublicKey>,
    /// Aggregate of all member keys.
    pub aggregate_pubkey: BlsPublicKey,
}

impl SyncCommittee {
    /// Validate the sync committee has the configured number of members.
    pub fn validate(&self, expected_size: usize) -> Result<(), String> {
        if self.pubkeys.len() != expected_size {
            return Err(format!(
                "Sync committee must have exactly {} members, got {}",
                expected_size,
                self.pubkeys.len()
            ));
        }
        Ok(())
    }
}

/// The aggregate BLS signature from the sync committee.
/// `sync_committee_bits` is an SSZ bitvector: bit `i` (LSB-first within each
/// byte) marks committee member `i` as a signer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAggregate {
    pub sync_committee_bits: Vec<u8>,
    pub sync_committee_signature: BlsSignature,
}

impl SyncAggregate {
    /// View of the participation bitfield.
    pub fn bits(&self) -> &BitSlice<u8, Lsb0> {
        self.sync_committee_bits.view_bits::<Lsb0>()
    }

    /// Count how many sync committee members participated (set bits).
    pub fn num_participants(&self) -> usize {
        self.bits().count_ones()
    }
}

/// Fork tag attached to finality and optimistic updates. It selects the
/// header/state layout the payload was produced under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
    Electra,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Version::Phase0 => "phase0",
            Version::Altair => "altair",
            Version::Bellatrix => "bellatrix",
            Version::Capella => "capella",
            Version::Deneb => "deneb",
            Version::Electra => "electra",
        };
        f.write_str(name)
    }
}

/// A light client update from the beacon chain.
/// Every field must be cryptographically verified before accepting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightClientUpdate {
    /// The header that the sync committee is attesting to.
    pub attested_header: BeaconBlockHeader,
    /// The next sync committee (present only when the update carries a rotation claim).
    pub next_sync_committee: Option<SyncCommittee>,
    /// Merkle branch proving next_sync_committee against the attested state.
    pub next_sync_committee_branch: Vec<B256>,
    /// The finalized header referenced by the attested state, or the empty header.
    pub finalized_header: BeaconBlockHeader,
    /// Merkle branch proving finalized_header against the attested state.
    pub finality_branch: Vec<B256>,
    /// The aggregate signature from the sync committee.
    pub sync_aggregate: SyncAggregate,
    /// The slot at which the signature was produced.
    pub signature_slot: u64,
}

/// Finality-only projection of [`LightClientUpdate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightClientFinalityUpdate {
    pub attested_header: BeaconBlockHeader,
    pub finalized_header: BeaconBlockHeader,
    pub finality_branch: Vec<B256>,
    pub sync_aggregate: SyncAggregate,
    pub signature_slot: u64,
}

/// Optimistic-only projection of [`LightClientUpdate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightClientOptimisticUpdate {
    pub attested_header: BeaconBlockHeader,
    pub sync_aggregate: SyncAggregate,
    pub signature_slot: u64,
}

/// A payload paired with the fork version whose layout it uses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: Version,
    pub data: T,
}

/// A light client bootstrap: the initial data needed to start syncing.
/// Contains the trusted checkpoint header and the current sync committee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightClientBootstrap {
    /// The beacon block header at the checkpoint.
    pub header: BeaconBlockHeader,
    /// The current sync committee at the checkpoint.
    pub current_sync_committee: SyncCommittee,
    /// Merkle branch proving current_sync_committee against the checkpoint state.
    pub current_sync_committee_branch: Vec<B256>,
}
