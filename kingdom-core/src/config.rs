//! Roller configuration.
//!
//! Rigged values can be seeded from a URL query string at startup, from
//! environment variables, or from JSON. Each config builds an independent
//! [`Roller`], so concurrent sessions and test runs never share queues.

use crate::dice::{RigQueues, RollMode, Roller};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Environment variable holding the RNG seed.
pub const SEED_VAR: &str = "KINGDOM_DICE_SEED";
/// Environment variable holding comma-separated rigged die faces.
pub const RIG_DICE_VAR: &str = "KINGDOM_RIG_DICE";
/// Environment variable holding comma-separated rigged pool totals.
pub const RIG_POOLS_VAR: &str = "KINGDOM_RIG_POOLS";

/// Errors from reading roller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How to build a [`Roller`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RollConfig {
    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
    /// Whether rolls consult the rig queues.
    pub rigged: bool,
    /// Queued die faces.
    pub dice: Vec<i32>,
    /// Queued pool totals.
    pub pools: Vec<i32>,
}

impl RollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Queue die faces and turn on rigged mode.
    pub fn with_dice(mut self, dice: impl IntoIterator<Item = i32>) -> Self {
        self.dice.extend(dice);
        self.rigged = true;
        self
    }

    /// Queue pool totals and turn on rigged mode.
    pub fn with_pools(mut self, pools: impl IntoIterator<Item = i32>) -> Self {
        self.pools.extend(pools);
        self.rigged = true;
        self
    }

    /// Parse a query string such as `?rig=1,20&rigPool=15&seed=7`.
    ///
    /// Unknown keys are ignored so the whole page query can be passed in.
    pub fn from_query(query: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let query = query.trim().trim_start_matches('?');
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            config.apply(key, value)?;
        }
        Ok(config)
    }

    /// Read the `KINGDOM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let vars = [
            (SEED_VAR, "seed"),
            (RIG_DICE_VAR, "rig"),
            (RIG_POOLS_VAR, "rigPool"),
        ];
        for (var, key) in vars {
            if let Ok(value) = env::var(var) {
                config.apply(key, &value)?;
            }
        }
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a roller owning fresh rig queues.
    pub fn into_roller(self) -> Roller<StdRng> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mode = if self.rigged {
            RollMode::Rigged
        } else {
            RollMode::Random
        };
        let rig = RigQueues::new().with_dice(self.dice).with_pools(self.pools);
        Roller::new(rng).with_rig(rig).with_mode(mode)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "seed" => {
                let seed = value.trim().parse().map_err(|_| invalid(key, value))?;
                self.seed = Some(seed);
            }
            "rig" => {
                let dice = parse_list(key, value)?;
                *self = std::mem::take(self).with_dice(dice);
            }
            "rigPool" => {
                let pools = parse_list(key, value)?;
                *self = std::mem::take(self).with_pools(pools);
            }
            _ => {}
        }
        Ok(())
    }
}

fn parse_list(key: &str, value: &str) -> Result<Vec<i32>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse().map_err(|_| invalid(key, value)))
        .collect()
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
