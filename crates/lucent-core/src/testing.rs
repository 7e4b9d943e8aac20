//! Deterministic fixtures for unit tests: BLS test committees that really
//! sign, a sparse beacon-state tree that yields consistent proofs, and a
//! builder for signed updates.

use alloy_primitives::B256;
use blst::min_pk::{AggregatePublicKey, AggregateSignature, PublicKey, SecretKey, Signature};

use crate::config::{networks, LightClientConfig, Threshold};
use crate::consensus::merkle::{sha256_pair, GeneralizedIndex, HashTreeRoot};
use crate::consensus::period::compute_sync_committee_period_at_slot;
use crate::consensus::sync_committee::{header_signing_root, sync_committee_domain, BLS_DST};
use crate::types::beacon::*;
use crate::types::update::*;

/// Compressed G2 point at infinity, what an empty aggregate serializes to.
const INFINITY_SIGNATURE: [u8; 96] = {
    let mut bytes = [0u8; 96];
    bytes[0] = 0xc0;
    bytes
};

/// Committee of 4, periods of 64 slots, supermajority 3 of 4, minimum 1.
pub(crate) fn test_config() -> LightClientConfig {
    let mut config = networks::minimal();
    config.chain.sync_committee_size = 4;
    config.chain.genesis_validators_root = B256::repeat_byte(0x5a);
    config.sync.min_sync_committee_participants = 1;
    config.sync.supermajority = Threshold {
        numerator: 3,
        denominator: 4,
    };
    config.sync.update_timeout_periods = 1;
    config
}

/// Bitfield from a pattern such as `"1101"`, where character `i` is member `i`.
pub(crate) fn participation_bits(pattern: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; pattern.len().div_ceil(8)];
    for (index, bit) in pattern.chars().enumerate() {
        if bit == '1' {
            bytes[index / 8] |= 1 << (index % 8);
        }
    }
    bytes
}

pub(crate) struct TestCommittee {
    secret_keys: Vec<SecretKey>,
    pub committee: SyncCommittee,
}

impl TestCommittee {
    pub fn new(seed: u8, size: usize) -> Self {
        let secret_keys: Vec<SecretKey> = (0..size)
            .map(|index| {
                let mut ikm = [seed; 32];
                ikm[..8].copy_from_slice(&(index as u64).to_le_bytes());
                SecretKey::key_gen(&ikm, &[]).expect("ikm is 32 bytes")
            })
            .collect();
        let public_keys: Vec<PublicKey> = secret_keys.iter().map(|sk| sk.sk_to_pk()).collect();
        let refs: Vec<&PublicKey> = public_keys.iter().collect();
        let aggregate = AggregatePublicKey::aggregate(&refs, false)
            .expect("non-empty committee")
            .to_public_key();

        Self {
            secret_keys,
            committee: SyncCommittee {
                pubkeys: public_keys
                    .iter()
                    .map(|pk| BlsPublicKey(pk.to_bytes()))
                    .collect(),
                aggregate_pubkey: BlsPublicKey(aggregate.to_bytes()),
            },
        }
    }

    /// Aggregate signature over `signing_root` by the members marked in `pattern`.
    pub fn sign(&self, pattern: &str, signing_root: &B256) -> BlsSignature {
        let signatures: Vec<Signature> = pattern
            .chars()
            .zip(&self.secret_keys)
            .filter(|(bit, _)| *bit == '1')
            .map(|(_, sk)| sk.sign(signing_root.as_slice(), BLS_DST, &[]))
            .collect();
        if signatures.is_empty() {
            return BlsSignature(INFINITY_SIGNATURE);
        }
        let refs: Vec<&Signature> = signatures.iter().collect();
        let aggregate = AggregateSignature::aggregate(&refs, false)
            .expect("non-empty signature set")
            .to_signature();
        BlsSignature(aggregate.to_bytes())
    }
}

/// A beacon state tree holding only the leaves a test cares about. Every
/// other subtree is a deterministic filler node.
#[derive(Default)]
pub(crate) struct TestStateTree {
    leaves: Vec<(GeneralizedIndex, B256)>,
}

impl TestStateTree {
    pub fn with_leaf(mut self, gindex: GeneralizedIndex, leaf: B256) -> Self {
        self.leaves.push((gindex, leaf));
        self
    }

    pub fn root(&self) -> B256 {
        self.node(1)
    }

    pub fn branch(&self, gindex: GeneralizedIndex) -> Vec<B256> {
        let mut branch = Vec::new();
        let mut index = gindex.0;
        while index > 1 {
            branch.push(self.node(index ^ 1));
            index >>= 1;
        }
        branch
    }

    fn node(&self, index: u64) -> B256 {
        if let Some((_, leaf)) = self.leaves.iter().find(|(g, _)| g.0 == index) {
            return *leaf;
        }
        if self.leaves.iter().any(|(g, _)| is_descendant(g.0, index)) {
            return sha256_pair(&self.node(2 * index), &self.node(2 * index + 1));
        }
        let mut filler = [0xf0u8; 32];
        filler[..8].copy_from_slice(&index.to_le_bytes());
        B256::from(filler)
    }
}

fn is_descendant(node: u64, ancestor: u64) -> bool {
    let (Some(node_depth), Some(ancestor_depth)) = (
        GeneralizedIndex(node).depth(),
        GeneralizedIndex(ancestor).depth(),
    ) else {
        return false;
    };
    node_depth > ancestor_depth && node >> (node_depth - ancestor_depth) == ancestor
}

pub(crate) fn test_header(slot: u64, state_root: B256) -> BeaconBlockHeader {
    BeaconBlockHeader {
        slot,
        proposer_index: slot % 7,
        parent_root: B256::repeat_byte(0x11),
        state_root,
        body_root: B256::repeat_byte(0x22),
    }
}

/// Chain of test committees, one per sync committee period.
pub(crate) struct Fixture {
    pub config: LightClientConfig,
    committees: Vec<TestCommittee>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: LightClientConfig) -> Self {
        let size = config.chain.sync_committee_size;
        let committees = (0..6).map(|period| TestCommittee::new(period as u8 + 1, size)).collect();
        Self { config, committees }
    }

    pub fn committee(&self, period: u64) -> &TestCommittee {
        &self.committees[period as usize]
    }

    pub fn period_at(&self, slot: u64) -> u64 {
        compute_sync_committee_period_at_slot(&self.config.chain, slot)
    }

    /// Bootstrap snapshot at `slot` and the root to trust for it.
    pub fn bootstrap(&self, slot: u64) -> (LightClientBootstrap, B256) {
        let version = self.config.chain.version_at_slot(slot);
        let gindex = version
            .light_client_layout()
            .expect("test forks have a layout")
            .current_sync_committee;
        let committee = self.committee(self.period_at(slot)).committee.clone();
        let tree = TestStateTree::default().with_leaf(gindex, committee.hash_tree_root());
        let header = test_header(slot, tree.root());
        let trusted_root = header.hash_tree_root();
        (
            LightClientBootstrap {
                header,
                current_sync_committee: committee,
                current_sync_committee_branch: tree.branch(gindex),
            },
            trusted_root,
        )
    }

    pub fn update(&self, attested_slot: u64, signature_slot: u64) -> UpdateBuilder<'_> {
        UpdateBuilder {
            fixture: self,
            attested_slot,
            signature_slot,
            finalized_slot: None,
            next_committee_period: None,
            pattern: "1111".to_string(),
            signer_period: None,
            version: None,
            signing_version: None,
            kind: UpdateKind::Full,
        }
    }
}

pub(crate) struct UpdateBuilder<'a> {
    fixture: &'a Fixture,
    attested_slot: u64,
    signature_slot: u64,
    finalized_slot: Option<u64>,
    next_committee_period: Option<u64>,
    pattern: String,
    signer_period: Option<u64>,
    version: Option<Version>,
    signing_version: Option<Version>,
    kind: UpdateKind,
}

impl UpdateBuilder<'_> {
    pub fn finalized(mut self, slot: u64) -> Self {
        self.finalized_slot = Some(slot);
        self
    }

    /// Carry the committee of `period` as the next sync committee.
    pub fn next_committee(mut self, period: u64) -> Self {
        self.next_committee_period = Some(period);
        self
    }

    pub fn bits(mut self, pattern: &str) -> Self {
        self.pattern = pattern.to_string();
        self
    }

    /// Sign with the committee of `period` instead of the attested period's.
    pub fn signed_by(mut self, period: u64) -> Self {
        self.signer_period = Some(period);
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Sign under the domain of `version` instead of the fork active one
    /// slot before the signature slot.
    pub fn signed_under(mut self, version: Version) -> Self {
        self.signing_version = Some(version);
        self
    }

    pub fn finality_only(mut self) -> Self {
        self.kind = UpdateKind::Finality;
        self
    }

    pub fn optimistic_only(mut self) -> Self {
        self.kind = UpdateKind::Optimistic;
        self
    }

    pub fn build(self) -> GenericUpdate {
        let fixture = self.fixture;
        let chain = &fixture.config.chain;
        let version = self
            .version
            .unwrap_or_else(|| chain.version_at_slot(self.attested_slot));
        let layout = version
            .light_client_layout()
            .unwrap_or_else(|| Version::Deneb.light_client_layout().expect("deneb layout"));

        let finalized_header = self
            .finalized_slot
            .map(|slot| test_header(slot, B256::repeat_byte(slot as u8)));
        let next_committee = self
            .next_committee_period
            .map(|period| fixture.committee(period).committee.clone());

        let mut tree = TestStateTree::default();
        if let Some(header) = &finalized_header {
            tree = tree.with_leaf(layout.finalized_root, header.hash_tree_root());
        }
        if let Some(committee) = &next_committee {
            tree = tree.with_leaf(layout.next_sync_committee, committee.hash_tree_root());
        }
        let attested_header = test_header(self.attested_slot, tree.root());

        let signer = fixture.committee(
            self.signer_period
                .unwrap_or_else(|| fixture.period_at(self.attested_slot)),
        );
        let signing_version = self
            .signing_version
            .unwrap_or_else(|| chain.version_at_slot(self.signature_slot.saturating_sub(1)));
        let domain = sync_committee_domain(chain, signing_version);
        let signature = signer.sign(&self.pattern, &header_signing_root(&attested_header, &domain));

        let finality = finalized_header.map(|header| FinalityProof {
            header,
            branch: tree.branch(layout.finalized_root),
        });
        let next_sync_committee = next_committee.map(|committee| SyncCommitteeProof {
            committee,
            branch: tree.branch(layout.next_sync_committee),
        });
        let payload = match self.kind {
            UpdateKind::Full => UpdatePayload::Full {
                next_sync_committee,
                finality,
            },
            UpdateKind::Finality => {
                UpdatePayload::Finality(finality.expect("finality-only update needs a finalized slot"))
            }
            UpdateKind::Optimistic => UpdatePayload::Optimistic,
        };

        GenericUpdate {
            version,
            attested_header,
            sync_aggregate: SyncAggregate {
                sync_committee_bits: participation_bits(&self.pattern),
                sync_committee_signature: signature,
            },
            signature_slot: self.signature_slot,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::merkle::verify_merkle_branch;

    #[test]
    fn test_state_tree_proves_several_leaves() {
        let a = B256::repeat_byte(0xaa);
        let b = B256::repeat_byte(0xbb);
        let tree = TestStateTree::default()
            .with_leaf(GeneralizedIndex(105), a)
            .with_leaf(GeneralizedIndex(55), b);
        let root = tree.root();

        assert!(verify_merkle_branch(&a, &tree.branch(GeneralizedIndex(105)), GeneralizedIndex(105), &root));
        assert!(verify_merkle_branch(&b, &tree.branch(GeneralizedIndex(55)), GeneralizedIndex(55), &root));
    }

    #[test]
    fn test_participation_bits() {
        assert_eq!(participation_bits("1101"), vec![0b0000_1011]);
        assert_eq!(participation_bits("000000001"), vec![0, 1]);
    }
}
