//! Atmosphere configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `atmos.ron` file (if exists)
//! 3. Environment variables prefixed with `ATMOS_`
//!
//! Example environment variable: `ATMOS_SPREAD_FACTOR=0.2`

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::AtmosError;
use crate::simulation::DEFAULT_TILE_VOLUME;

pub const DEFAULT_CHUNK_SIZE: i32 = 16;
pub const DEFAULT_SPREAD_FACTOR: f64 = 0.175;

/// Simulation parameters for an [`Atmosphere`](crate::world::Atmosphere)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosConfig {
    /// Tiles per chunk edge
    pub chunk_size: i32,
    /// Volume of one tile
    pub tile_volume: f64,
    /// Fraction of the pressure difference equalized per neighbor per tick
    pub spread_factor: f64,
    /// Drop chunks that stayed empty this many ticks (None = keep forever)
    #[serde(default)]
    pub evict_after_idle_ticks: Option<u32>,
}

impl Default for AtmosConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            tile_volume: DEFAULT_TILE_VOLUME,
            spread_factor: DEFAULT_SPREAD_FACTOR,
            evict_after_idle_ticks: None,
        }
    }
}

impl AtmosConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `atmos.ron` file (if exists)
    /// 3. Environment variables prefixed with `ATMOS_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::build(File::with_name("atmos").format(FileFormat::Ron).required(false))
    }

    /// Same layering as [`AtmosConfig::load`], with an explicit file that must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::build(File::from(path).format(FileFormat::Ron).required(true))
    }

    fn build(file: File<config::FileSourceFile, FileFormat>) -> Result<Self> {
        let defaults = Self::default();
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("chunk_size", defaults.chunk_size as i64)?
            .set_default("tile_volume", defaults.tile_volume)?
            .set_default("spread_factor", defaults.spread_factor)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (ATMOS_SPREAD_FACTOR, etc.)
            .add_source(
                Environment::with_prefix("ATMOS")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let config = builder.build().context("Failed to build configuration")?;

        let loaded: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        loaded.validate().context("Invalid atmosphere configuration")?;
        Ok(loaded)
    }

    /// Reject values that would make the simulation meaningless
    pub fn validate(&self) -> Result<(), AtmosError> {
        if self.chunk_size <= 0 {
            return Err(AtmosError::InvalidChunkSize(self.chunk_size));
        }
        if !(self.tile_volume.is_finite() && self.tile_volume > 0.0) {
            return Err(AtmosError::InvalidTileVolume(self.tile_volume));
        }
        if !(self.spread_factor > 0.0 && self.spread_factor < 1.0) {
            return Err(AtmosError::InvalidSpreadFactor(self.spread_factor));
        }
        if self.evict_after_idle_ticks == Some(0) {
            return Err(AtmosError::InvalidEvictionDelay);
        }
        Ok(())
    }

    /// Pretty RON, suitable for writing an `atmos.ron` template
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, Default::default())
            .context("Failed to serialize configuration")
    }
}
