//! # atmos-grid - chunked tile atmosphere simulation
//!
//! Gas lives in sparse, lazily activated chunks of tiles. Each tick every
//! tile exchanges gas with its open neighbors in parallel, reading one
//! buffer and writing the other.

pub mod config;
pub mod demo;
pub mod error;
pub mod simulation;
pub mod world;

/// Common imports for internal use
pub mod prelude {
    pub use crate::config::AtmosConfig;
    pub use crate::error::AtmosError;
    pub use crate::simulation::{GasMix, GasRecord, Species};
    pub use crate::world::{Atmosphere, Direction, Flow, FlowMask, StepReport, TileKind, WallMask};
    pub use glam::IVec2;
}
