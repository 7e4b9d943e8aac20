//! Chain parameters and sync thresholds.
//!
//! A configuration starts from a network preset (see [`networks`]) and is
//! layered with an optional TOML file and `LUCENT_`-prefixed environment
//! variables. Nested keys use `__` in the environment, for example
//! `LUCENT_SYNC__MIN_SYNC_COMMITTEE_PARTICIPANTS=2`.

pub mod networks;

use std::path::Path;

use alloy_primitives::{FixedBytes, B256};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::beacon::Version;

pub use networks::Network;

/// Epoch value used for forks that are not scheduled.
pub const FAR_FUTURE_EPOCH: u64 = u64::MAX;

const ENV_PREFIX: &str = "LUCENT_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot parse configuration: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Fork {
    pub epoch: u64,
    pub fork_version: FixedBytes<4>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ForkSchedule {
    pub genesis: Fork,
    pub altair: Fork,
    pub bellatrix: Fork,
    pub capella: Fork,
    pub deneb: Fork,
    pub electra: Fork,
}

impl ForkSchedule {
    pub fn fork(&self, version: Version) -> &Fork {
        match version {
            Version::Phase0 => &self.genesis,
            Version::Altair => &self.altair,
            Version::Bellatrix => &self.bellatrix,
            Version::Capella => &self.capella,
            Version::Deneb => &self.deneb,
            Version::Electra => &self.electra,
        }
    }

    pub fn fork_version(&self, version: Version) -> FixedBytes<4> {
        self.fork(version).fork_version
    }

    /// The latest fork active at `epoch`.
    pub fn version_at_epoch(&self, epoch: u64) -> Version {
        if epoch >= self.electra.epoch {
            Version::Electra
        } else if epoch >= self.deneb.epoch {
            Version::Deneb
        } else if epoch >= self.capella.epoch {
            Version::Capella
        } else if epoch >= self.bellatrix.epoch {
            Version::Bellatrix
        } else if epoch >= self.altair.epoch {
            Version::Altair
        } else {
            Version::Phase0
        }
    }
}

/// Consensus constants of one network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainSpec {
    pub slots_per_epoch: u64,
    pub epochs_per_sync_committee_period: u64,
    pub sync_committee_size: usize,
    pub seconds_per_slot: u64,
    pub genesis_time: u64,
    pub genesis_validators_root: B256,
    pub forks: ForkSchedule,
}

impl ChainSpec {
    pub fn version_at_slot(&self, slot: u64) -> Version {
        self.forks
            .version_at_epoch(crate::consensus::period::compute_epoch_at_slot(self, slot))
    }
}

/// A participation fraction, `numerator / denominator` of the committee.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub numerator: u64,
    pub denominator: u64,
}

impl Threshold {
    pub const TWO_THIRDS: Threshold = Threshold {
        numerator: 2,
        denominator: 3,
    };

    /// Whether `participants` out of `committee_size` reaches this fraction.
    pub fn is_met(&self, participants: usize, committee_size: usize) -> bool {
        (participants as u128) * (self.denominator as u128)
            >= (committee_size as u128) * (self.numerator as u128)
    }
}

/// Quorum and liveness parameters of the selection engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SyncParams {
    /// Fewest participating members an update may have and still be considered.
    pub min_sync_committee_participants: usize,
    /// Participation at which an update is adopted immediately.
    pub supermajority: Threshold,
    /// Sync periods a pending candidate may wait before it is force-applied.
    pub update_timeout_periods: u64,
    /// How many slots ahead of the local clock a signature slot may be.
    pub max_clock_drift_slots: u64,
}

impl Default for SyncParams {
    fn default() -> Self {
        Self {
            min_sync_committee_participants: 1,
            supermajority: Threshold::TWO_THIRDS,
            update_timeout_periods: 1,
            max_clock_drift_slots: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LightClientConfig {
    pub chain: ChainSpec,
    #[serde(default)]
    pub sync: SyncParams,
    /// Block root of the checkpoint to bootstrap from, obtained out of band.
    #[serde(default)]
    pub trusted_checkpoint: Option<B256>,
}

impl LightClientConfig {
    pub fn new(chain: ChainSpec) -> Self {
        Self {
            chain,
            sync: SyncParams::default(),
            trusted_checkpoint: None,
        }
    }

    /// Layer a network preset, an optional TOML file and the environment.
    pub fn load(network: Network, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(network.to_config()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        let config: LightClientConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let chain = &self.chain;
        let sync = &self.sync;
        let invalid = |reason: String| Err(ConfigError::Invalid { reason });

        if chain.slots_per_epoch == 0 || chain.epochs_per_sync_committee_period == 0 {
            return invalid("slots_per_epoch and epochs_per_sync_committee_period must be non-zero".into());
        }
        if chain.seconds_per_slot == 0 {
            return invalid("seconds_per_slot must be non-zero".into());
        }
        if chain.sync_committee_size == 0 {
            return invalid("sync_committee_size must be non-zero".into());
        }
        if sync.min_sync_committee_participants == 0 {
            return invalid("min_sync_committee_participants must be at least 1".into());
        }
        if sync.min_sync_committee_participants > chain.sync_committee_size {
            return invalid(format!(
                "min_sync_committee_participants {} exceeds sync_committee_size {}",
                sync.min_sync_committee_participants, chain.sync_committee_size
            ));
        }
        let Threshold {
            numerator,
            denominator,
        } = sync.supermajority;
        if denominator == 0 || numerator > denominator || numerator.saturating_mul(2) <= denominator {
            return invalid(format!(
                "supermajority {numerator}/{denominator} must be above one half and at most one"
            ));
        }
        Ok(())
    }

    /// Slots in one sync committee period.
    pub fn slots_per_period(&self) -> u64 {
        crate::consensus::period::slots_per_sync_committee_period(&self.chain)
    }

    /// Slots a pending candidate may wait before it is force-applied.
    pub fn update_timeout_slots(&self) -> u64 {
        self.sync
            .update_timeout_periods
            .saturating_mul(self.slots_per_period())
    }
}
