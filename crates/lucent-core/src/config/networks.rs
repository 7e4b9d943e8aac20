use alloy_primitives::{b256, fixed_bytes};
use serde::{Deserialize, Serialize};

use super::{ChainSpec, Fork, ForkSchedule, LightClientConfig, FAR_FUTURE_EPOCH};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Sepolia,
    /// Small committee and short periods, for local networks and tests.
    Minimal,
}

impl Network {
    pub fn to_config(self) -> LightClientConfig {
        match self {
            Self::Mainnet => mainnet(),
            Self::Sepolia => sepolia(),
            Self::Minimal => minimal(),
        }
    }
}

pub fn mainnet() -> LightClientConfig {
    LightClientConfig::new(ChainSpec {
        slots_per_epoch: 32,
        epochs_per_sync_committee_period: 256,
        sync_committee_size: 512,
        seconds_per_slot: 12,
        genesis_time: 1606824023,
        genesis_validators_root: b256!(
            "4b363db94e286120d76eb905340fdd4e54bfe9f06bf33ff6cf5ad27f511bfe95"
        ),
        forks: ForkSchedule {
            genesis: Fork {
                epoch: 0,
                fork_version: fixed_bytes!("00000000"),
            },
            altair: Fork {
                epoch: 74240,
                fork_version: fixed_bytes!("01000000"),
            },
            bellatrix: Fork {
                epoch: 144896,
                fork_version: fixed_bytes!("02000000"),
            },
            capella: Fork {
                epoch: 194048,
                fork_version: fixed_bytes!("03000000"),
            },
            deneb: Fork {
                epoch: 269568,
                fork_version: fixed_bytes!("04000000"),
            },
            electra: Fork {
                epoch: 364032,
                fork_version: fixed_bytes!("05000000"),
            },
        },
    })
}

pub fn sepolia() -> LightClientConfig {
    LightClientConfig::new(ChainSpec {
        slots_per_epoch: 32,
        epochs_per_sync_committee_period: 256,
        sync_committee_size: 512,
        seconds_per_slot: 12,
        genesis_time: 1655733600,
        genesis_validators_root: b256!(
            "d8ea171f3c94aea21ebc42a1ed61052acf3f9209c00e4efbaaddac09ed9b8078"
        ),
        forks: ForkSchedule {
            genesis: Fork {
                epoch: 0,
                fork_version: fixed_bytes!("90000069"),
            },
            altair: Fork {
                epoch: 50,
                fork_version: fixed_bytes!("90000070"),
            },
            bellatrix: Fork {
                epoch: 100,
                fork_version: fixed_bytes!("90000071"),
            },
            capella: Fork {
                epoch: 56832,
                fork_version: fixed_bytes!("90000072"),
            },
            deneb: Fork {
                epoch: 132608,
                fork_version: fixed_bytes!("90000073"),
            },
            electra: Fork {
                epoch: 222464,
                fork_version: fixed_bytes!("90000074"),
            },
        },
    })
}

/// Minimal preset: Altair through Deneb from genesis, Electra unscheduled.
pub fn minimal() -> LightClientConfig {
    LightClientConfig::new(ChainSpec {
        slots_per_epoch: 8,
        epochs_per_sync_committee_period: 8,
        sync_committee_size: 32,
        seconds_per_slot: 6,
        genesis_time: 0,
        genesis_validators_root: Default::default(),
        forks: ForkSchedule {
            genesis: Fork {
                epoch: 0,
                fork_version: fixed_bytes!("00000001"),
            },
            altair: Fork {
                epoch: 0,
                fork_version: fixed_bytes!("01000001"),
            },
            bellatrix: Fork {
                epoch: 0,
                fork_version: fixed_bytes!("02000001"),
            },
            capella: Fork {
                epoch: 0,
                fork_version: fixed_bytes!("03000001"),
            },
            deneb: Fork {
                epoch: 0,
                fork_version: fixed_bytes!("04000001"),
            },
            electra: Fork {
                epoch: FAR_FUTURE_EPOCH,
                fork_version: fixed_bytes!("05000001"),
            },
        },
    })
}
