//! Bulk chunk export/import for save files and scene setup

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::atmosphere::Atmosphere;
use super::chunk::Chunk;
use super::flow::{Direction, WallMask};
use crate::error::AtmosError;
use crate::simulation::GasRecord;

/// Gas and walls of one chunk, in local row order (row 0 is the top row)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub position: IVec2,
    pub gas: Vec<GasRecord>,
    pub walls: Vec<WallMask>,
}

impl Atmosphere {
    /// Current-buffer snapshot of one chunk, if it is active
    pub fn export_chunk(&self, cx: i32, cy: i32) -> Option<ChunkSnapshot> {
        let buffer = self.generation().current();
        self.get_chunk(cx, cy).map(|chunk| ChunkSnapshot {
            position: chunk.position(),
            gas: chunk.gas(buffer).to_vec(),
            walls: chunk.walls().to_vec(),
        })
    }

    /// Snapshots of every active chunk, ordered by (y, x)
    pub fn export_chunks(&self) -> Vec<ChunkSnapshot> {
        let mut positions: Vec<IVec2> = self.chunks().map(Chunk::position).collect();
        positions.sort_by_key(|p| (p.y, p.x));
        positions
            .into_iter()
            .filter_map(|p| self.export_chunk(p.x, p.y))
            .collect()
    }

    /// Insert a chunk from a snapshot. An already active chunk is left as is
    /// and `Ok(false)` is returned.
    ///
    /// Gas is copied into both buffers; flows of the chunk and of the
    /// neighbor tiles facing it are re-derived.
    pub fn import_chunk(&mut self, snapshot: ChunkSnapshot) -> Result<bool, AtmosError> {
        let size = self.chunk_size() as usize;
        let expected = size * size;
        for actual in [snapshot.gas.len(), snapshot.walls.len()] {
            if actual != expected {
                return Err(AtmosError::SnapshotSizeMismatch {
                    position: snapshot.position,
                    expected,
                    actual,
                });
            }
        }

        let position = snapshot.position;
        if self.chunks.contains_key(&position) {
            log::debug!(
                "[IMPORT] Chunk ({}, {}) already active, keeping it",
                position.x,
                position.y
            );
            return Ok(false);
        }

        let mut chunk = Chunk::new(position.x, position.y, size);
        chunk.gas = [snapshot.gas.clone(), snapshot.gas];
        chunk.walls = snapshot.walls;
        chunk.recompute_pressure(0, self.config().tile_volume);
        self.chunks.insert(position, chunk);

        let size = self.chunk_size();
        let origin = position * size;
        for y in origin.y..origin.y + size {
            for x in origin.x..origin.x + size {
                self.refresh_tile(x, y);
            }
        }
        for dir in Direction::ALL {
            self.refresh_edge(position + dir.offset(), dir.opposite());
        }

        log::debug!("[IMPORT] Chunk ({}, {})", position.x, position.y);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AtmosConfig;
    use crate::simulation::{GasMix, Species, ROOM_TEMPERATURE};
    use crate::world::flow::Flow;

    fn atmosphere() -> Atmosphere {
        Atmosphere::new(AtmosConfig {
            chunk_size: 4,
            ..Default::default()
        })
        .expect("valid config")
    }

    #[test]
    fn test_export_chunks_sorted() {
        let mut atmos = atmosphere();
        atmos.activate(1, 0);
        atmos.activate(0, 1);
        atmos.activate(-1, 0);

        let positions: Vec<IVec2> = atmos.export_chunks().iter().map(|s| s.position).collect();
        assert_eq!(
            positions,
            vec![IVec2::new(-1, 0), IVec2::new(1, 0), IVec2::new(0, 1)]
        );
    }

    #[test]
    fn test_import_restores_gas_walls_and_flows() {
        let mut source = atmosphere();
        source.set_gas(
            GasRecord::new(GasMix::pure(Species::Plasma, 900), ROOM_TEMPERATURE),
            2,
            2,
        );
        source.change_tile(Flow::all(), 3, 1);
        let snapshot = source.export_chunk(0, 0).expect("chunk is active");

        let mut target = atmosphere();
        target.activate(1, 0);
        assert_eq!(target.import_chunk(snapshot), Ok(true));

        assert_eq!(target.get_gas(2, 2).mix.plasma, 900);
        assert!(target.get_pressure(2, 2) > 0.0);
        assert_eq!(target.get_wall(3, 1), Flow::all());
        assert_eq!(target.get_flow(2, 1), Flow::NORTH | Flow::SOUTH | Flow::WEST);
        // Tile (4, 1) in the pre-existing neighbor chunk now sees the wall
        assert_eq!(target.get_flow(4, 1), Flow::NORTH | Flow::SOUTH | Flow::EAST);
        assert_eq!(target.count_moles(), 900);
    }

    #[test]
    fn test_import_keeps_existing_chunk() {
        let mut atmos = atmosphere();
        atmos.set_gas(
            GasRecord::new(GasMix::pure(Species::Oxygen, 10), ROOM_TEMPERATURE),
            0,
            0,
        );
        let snapshot = ChunkSnapshot {
            position: IVec2::ZERO,
            gas: vec![GasRecord::VACUUM; 16],
            walls: vec![Flow::empty(); 16],
        };
        assert_eq!(atmos.import_chunk(snapshot), Ok(false));
        assert_eq!(atmos.get_gas(0, 0).mix.oxygen, 10);
    }

    #[test]
    fn test_import_rejects_wrong_size() {
        let mut atmos = atmosphere();
        let snapshot = ChunkSnapshot {
            position: IVec2::new(3, 3),
            gas: vec![GasRecord::VACUUM; 9],
            walls: vec![Flow::empty(); 16],
        };
        assert_eq!(
            atmos.import_chunk(snapshot),
            Err(AtmosError::SnapshotSizeMismatch {
                position: IVec2::new(3, 3),
                expected: 16,
                actual: 9,
            })
        );
        assert_eq!(atmos.chunk_count(), 0);
    }
}
