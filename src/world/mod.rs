//! World management - chunked atmosphere, wall masks, stepping

mod atmosphere;
mod chunk;
pub mod flow;
mod snapshot;
pub mod step;

pub use atmosphere::Atmosphere;
pub use chunk::{local_index, world_to_chunk_coords, Chunk};
pub use flow::{derive_flow, Direction, Flow, FlowMask, TileKind, WallMask};
pub use snapshot::ChunkSnapshot;
pub use step::{Generation, StepReport};
