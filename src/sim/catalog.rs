//! Obstacle catalog and the value-selection policy
//!
//! The catalog is ordered by ascending value and the order is load-bearing:
//! obstacle difficulty is picked by index distance from the player's own
//! entry, so obstacles cluster around the player's current power level.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::FALLBACK_VALUE;
use crate::error::{Result, SimError};

/// How many catalog steps below/above the player an obstacle may be
pub const SELECTION_RADIUS: usize = 2;

/// Opaque handle the renderer maps to a material/mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VisualHandle(pub u32);

/// One obstacle tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    /// Power-of-two value shown on the vehicle
    pub value: u32,
    /// Display speed factor (the player drives at `speed * speed_scale` at this value)
    pub speed: f32,
    pub visual: VisualHandle,
}

/// Validated, ascending list of obstacle tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ObstacleConfig>", into = "Vec<ObstacleConfig>")]
pub struct ObstacleCatalog {
    configs: Vec<ObstacleConfig>,
}

impl ObstacleCatalog {
    /// Build a catalog; values must be positive and strictly ascending
    pub fn new(configs: Vec<ObstacleConfig>) -> Result<Self> {
        if let Some(index) = configs.iter().position(|c| c.value == 0) {
            return Err(SimError::UnorderedCatalog { index });
        }
        if let Some(index) = configs
            .windows(2)
            .position(|pair| pair[0].value >= pair[1].value)
        {
            return Err(SimError::UnorderedCatalog { index: index + 1 });
        }
        Ok(Self { configs })
    }

    /// 2, 4, 8, ... `2^tiers`, each tier a little faster than the last
    pub fn doubling(tiers: u32) -> Self {
        let configs = (1..=tiers.min(31))
            .map(|exp| ObstacleConfig {
                value: 1 << exp,
                speed: 3.5 + 0.5 * (exp - 1) as f32,
                visual: VisualHandle(exp - 1),
            })
            .collect();
        Self { configs }
    }

    pub fn configs(&self) -> &[ObstacleConfig] {
        &self.configs
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Catalog index holding exactly `value`
    pub fn index_of(&self, value: u32) -> Option<usize> {
        self.configs.binary_search_by_key(&value, |c| c.value).ok()
    }

    pub fn find(&self, value: u32) -> Option<&ObstacleConfig> {
        self.index_of(value).map(|i| &self.configs[i])
    }

    /// Inclusive index window around `index`, clamped to the catalog
    ///
    /// Callers must pass a valid index of a non-empty catalog.
    pub fn selection_window(&self, index: usize) -> RangeInclusive<usize> {
        let last = self.configs.len().saturating_sub(1);
        let lo = index.saturating_sub(SELECTION_RADIUS);
        let hi = (index + SELECTION_RADIUS).min(last);
        lo..=hi
    }

    /// Pick an obstacle value near `player_value`
    pub fn try_select_value<R: Rng + ?Sized>(&self, player_value: u32, rng: &mut R) -> Result<u32> {
        let index = self
            .index_of(player_value)
            .ok_or(SimError::ConfigNotFound {
                value: player_value,
            })?;
        let picked = rng.random_range(self.selection_window(index));
        Ok(self.configs[picked].value)
    }

    /// Like [`try_select_value`](Self::try_select_value) but falls back to
    /// [`FALLBACK_VALUE`] when the player's value has no catalog entry
    pub fn select_value<R: Rng + ?Sized>(&self, player_value: u32, rng: &mut R) -> u32 {
        match self.try_select_value(player_value, rng) {
            Ok(value) => value,
            Err(e) => {
                log::error!("{e}; falling back to value {FALLBACK_VALUE}");
                FALLBACK_VALUE
            }
        }
    }
}

impl Default for ObstacleCatalog {
    fn default() -> Self {
        Self::doubling(17)
    }
}

impl TryFrom<Vec<ObstacleConfig>> for ObstacleCatalog {
    type Error = SimError;

    fn try_from(configs: Vec<ObstacleConfig>) -> Result<Self> {
        Self::new(configs)
    }
}

impl From<ObstacleCatalog> for Vec<ObstacleConfig> {
    fn from(catalog: ObstacleCatalog) -> Self {
        catalog.configs
    }
}
