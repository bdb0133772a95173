//! Directional wall and flow masks
//!
//! The same bitset type serves two roles: a tile's wall mask (authoritative,
//! set by map edits) and its flow mask (derived: which neighbors the tile may
//! exchange gas with). A set bit in a wall mask blocks that edge; a set bit in
//! a flow mask opens it.

use bitflags::bitflags;
use glam::IVec2;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-tile set of cardinal edges
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Flow: u8 {
        const NORTH = 1 << 0;
        const SOUTH = 1 << 1;
        const EAST = 1 << 2;
        const WEST = 1 << 3;
    }
}

/// Authoritative per-tile blockage. `Flow::all()` seals the tile.
pub type WallMask = Flow;

/// Derived per-tile passability. `Flow::all()` is fully open.
pub type FlowMask = Flow;

impl Default for Flow {
    fn default() -> Self {
        Flow::empty()
    }
}

/// Cardinal direction in world space. North is +y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Order in which a tile evaluates its neighbors each tick
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Order in which a tile being sealed looks for a neighbor to take its gas
    pub const EVICTION_ORDER: [Direction; 4] = [
        Direction::West,
        Direction::East,
        Direction::South,
        Direction::North,
    ];

    #[inline]
    pub fn flag(self) -> Flow {
        match self {
            Direction::North => Flow::NORTH,
            Direction::South => Flow::SOUTH,
            Direction::East => Flow::EAST,
            Direction::West => Flow::WEST,
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// World-space step toward the neighbor in this direction
    #[inline]
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::North => IVec2::new(0, 1),
            Direction::South => IVec2::new(0, -1),
            Direction::East => IVec2::new(1, 0),
            Direction::West => IVec2::new(-1, 0),
        }
    }
}

/// Derive the flow mask of a tile from its own walls and its neighbors' walls.
///
/// Edge `D` is open iff `own` does not block `D` and the neighbor across `D`
/// does not block the opposite edge. `neighbor_wall` is queried once per
/// direction.
pub fn derive_flow(own: WallMask, mut neighbor_wall: impl FnMut(Direction) -> WallMask) -> FlowMask {
    let mut flow = Flow::empty();
    for dir in Direction::ALL {
        if own.contains(dir.flag()) {
            continue;
        }
        if !neighbor_wall(dir).contains(dir.opposite().flag()) {
            flow |= dir.flag();
        }
    }
    flow
}

/// Map-layer tile categories that feed wall edits into the atmosphere
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Space,
    Floor,
    Wall,
}

impl TileKind {
    /// Wall mask a tile of this kind imposes: walls seal every edge
    pub fn wall_mask(self) -> WallMask {
        match self {
            TileKind::Wall => Flow::all(),
            TileKind::Space | TileKind::Floor => Flow::empty(),
        }
    }
}
