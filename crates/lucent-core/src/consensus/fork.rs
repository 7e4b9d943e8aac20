//! Per-fork positions of the light client fields inside the beacon state.

use crate::consensus::merkle::GeneralizedIndex;
use crate::types::beacon::Version;

/// Generalized indices of the beacon state fields a light client proves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightClientLayout {
    pub finalized_root: GeneralizedIndex,
    pub current_sync_committee: GeneralizedIndex,
    pub next_sync_committee: GeneralizedIndex,
}

/// Altair through Deneb: the beacon state has 32 or fewer fields.
const ALTAIR_LAYOUT: LightClientLayout = LightClientLayout {
    finalized_root: GeneralizedIndex(105),
    current_sync_committee: GeneralizedIndex(54),
    next_sync_committee: GeneralizedIndex(55),
};

/// Electra grew the beacon state past 32 fields, adding one tree level.
const ELECTRA_LAYOUT: LightClientLayout = LightClientLayout {
    finalized_root: GeneralizedIndex(169),
    current_sync_committee: GeneralizedIndex(86),
    next_sync_committee: GeneralizedIndex(87),
};

impl Version {
    /// Layout for this fork, `None` before Altair introduced sync committees.
    pub const fn light_client_layout(self) -> Option<LightClientLayout> {
        match self {
            Version::Phase0 => None,
            Version::Altair | Version::Bellatrix | Version::Capella | Version::Deneb => {
                Some(ALTAIR_LAYOUT)
            }
            Version::Electra => Some(ELECTRA_LAYOUT),
        }
    }
}
