//! Simulation kernels - gas records, pairwise transfer, injection

pub mod compression;
pub mod gas;
pub mod transfer;

pub use compression::{inject, HEAT_CAPACITY_RATIO};
pub use gas::{
    GasMix, GasRecord, Species, DEFAULT_TILE_VOLUME, GAS_CONSTANT, ROOM_TEMPERATURE,
    STANDARD_MOLES_PER_TILE, STANDARD_PRESSURE,
};
pub use transfer::{absorb, apportion, exchange, spread};
