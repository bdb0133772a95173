//! Chunk - square block of atmosphere tiles with ping-pong gas buffers

use glam::IVec2;

use super::flow::{Flow, FlowMask, WallMask};
use crate::simulation::GasRecord;

/// Convert world tile coordinates to chunk coordinates + local tile index.
///
/// Chunk coordinates are `floor(world / size)` per axis. Local rows are
/// stored top-down: row 0 is the chunk's highest world y.
#[inline]
pub fn world_to_chunk_coords(world_x: i32, world_y: i32, size: i32) -> (IVec2, usize) {
    let chunk = IVec2::new(world_x.div_euclid(size), world_y.div_euclid(size));
    let local_x = world_x.rem_euclid(size);
    let local_y = world_y.rem_euclid(size);
    (chunk, local_index(size as usize, local_x as usize, local_y as usize))
}

/// Index of a tile from its column and its world-relative row (0 = bottom)
#[inline]
pub fn local_index(size: usize, local_x: usize, local_y: usize) -> usize {
    debug_assert!(local_x < size && local_y < size);
    let row = (size - 1) - local_y;
    local_x + row * size
}

/// A `size × size` block of tiles, owned by the atmosphere's chunk map
#[derive(Clone, Debug)]
pub struct Chunk {
    /// Chunk coordinates (in chunk space, not tile space)
    pub x: i32,
    pub y: i32,

    size: usize,

    /// Two gas buffers; which one is current is decided by the generation,
    /// not by the chunk
    pub(crate) gas: [Vec<GasRecord>; 2],

    pub(crate) walls: Vec<WallMask>,

    /// Derived from `walls` of this tile and its neighbors, never set directly
    pub(crate) flows: Vec<FlowMask>,

    /// Pressure of each tile as of the last write
    pub(crate) pressure: Vec<f64>,

    /// Consecutive ticks this chunk has held zero moles
    pub(crate) idle_ticks: u32,
}

impl Chunk {
    pub fn new(x: i32, y: i32, size: usize) -> Self {
        let area = size * size;
        Self {
            x,
            y,
            size,
            gas: [vec![GasRecord::VACUUM; area], vec![GasRecord::VACUUM; area]],
            walls: vec![Flow::empty(); area],
            flows: vec![Flow::all(); area],
            pressure: vec![0.0; area],
            idle_ticks: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.size * self.size
    }

    /// Gas records of one buffer, row-major, top row first
    #[inline]
    pub fn gas(&self, buffer: usize) -> &[GasRecord] {
        &self.gas[buffer]
    }

    #[inline]
    pub fn walls(&self) -> &[WallMask] {
        &self.walls
    }

    #[inline]
    pub fn flows(&self) -> &[FlowMask] {
        &self.flows
    }

    #[inline]
    pub fn pressures(&self) -> &[f64] {
        &self.pressure
    }

    /// Write a record into both buffers so it is visible whichever is current
    pub fn set_gas_everywhere(&mut self, index: usize, record: GasRecord, volume: f64) {
        self.gas[0][index] = record;
        self.gas[1][index] = record;
        self.pressure[index] = record.pressure(volume);
    }

    /// Total moles held in one buffer
    pub fn total_moles(&self, buffer: usize) -> u64 {
        self.gas[buffer].iter().map(GasRecord::moles).sum()
    }

    /// True when no tile carries any wall
    pub fn walls_pristine(&self) -> bool {
        self.walls.iter().all(Flow::is_empty)
    }

    /// Rebuild the pressure cache from one buffer
    pub fn recompute_pressure(&mut self, buffer: usize, volume: f64) {
        for (pressure, record) in self.pressure.iter_mut().zip(&self.gas[buffer]) {
            *pressure = record.pressure(volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{GasMix, Species};

    #[test]
    fn test_new_chunk_is_open_vacuum() {
        let chunk = Chunk::new(2, -1, 4);
        assert_eq!(chunk.area(), 16);
        assert_eq!(chunk.position(), IVec2::new(2, -1));
        assert!(chunk.flows().iter().all(|f| *f == Flow::all()));
        assert!(chunk.walls_pristine());
        assert_eq!(chunk.total_moles(0), 0);
        assert_eq!(chunk.total_moles(1), 0);
    }

    #[test]
    fn test_local_rows_are_flipped() {
        // Bottom-left tile lives in the last row
        assert_eq!(local_index(4, 0, 0), 12);
        // Top-left tile is index 0
        assert_eq!(local_index(4, 0, 3), 0);
        assert_eq!(local_index(4, 3, 3), 3);
        assert_eq!(local_index(4, 3, 0), 15);
    }

    #[test]
    fn test_world_to_chunk_coords_floors_negatives() {
        let (chunk, index) = world_to_chunk_coords(0, 0, 16);
        assert_eq!(chunk, IVec2::new(0, 0));
        assert_eq!(index, 15 * 16);

        let (chunk, index) = world_to_chunk_coords(-1, -1, 16);
        assert_eq!(chunk, IVec2::new(-1, -1));
        // local (15, 15): top row, last column
        assert_eq!(index, 15);

        let (chunk, _) = world_to_chunk_coords(-16, 16, 16);
        assert_eq!(chunk, IVec2::new(-1, 1));

        let (chunk, _) = world_to_chunk_coords(-17, 31, 16);
        assert_eq!(chunk, IVec2::new(-2, 1));
    }

    #[test]
    fn test_set_gas_everywhere_updates_both_buffers() {
        let mut chunk = Chunk::new(0, 0, 4);
        let record = GasRecord::new(GasMix::pure(Species::Oxygen, 100), 300.0);
        chunk.set_gas_everywhere(5, record, 2500.0);

        assert_eq!(chunk.gas(0)[5], record);
        assert_eq!(chunk.gas(1)[5], record);
        assert_eq!(chunk.total_moles(0), 100);
        assert!(chunk.pressures()[5] > 0.0);
    }
}
