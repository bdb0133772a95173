//! Errors raised when constructing or restoring an atmosphere

use glam::IVec2;
use thiserror::Error;

/// Programmer-misuse failures. Steady-state simulation never produces these.
#[derive(Debug, Error, PartialEq)]
pub enum AtmosError {
    #[error("chunk size must be positive, got {0}")]
    InvalidChunkSize(i32),

    #[error("tile volume must be positive and finite, got {0}")]
    InvalidTileVolume(f64),

    #[error("spread factor must be within (0, 1), got {0}")]
    InvalidSpreadFactor(f64),

    #[error("idle eviction delay must be at least one tick")]
    InvalidEvictionDelay,

    #[error("chunk {position} snapshot holds {actual} tiles, expected {expected}")]
    SnapshotSizeMismatch {
        position: IVec2,
        expected: usize,
        actual: usize,
    },
}
