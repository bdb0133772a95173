//! Atmosphere - sparse chunk store plus the injection/query API

use std::collections::{HashMap, HashSet};

use glam::IVec2;

use super::chunk::{world_to_chunk_coords, Chunk};
use super::flow::{derive_flow, Direction, Flow, FlowMask, WallMask};
use super::step::{self, Generation, StepParams, StepReport};
use crate::config::AtmosConfig;
use crate::error::AtmosError;
use crate::simulation::{inject, GasMix, GasRecord};

/// The gas layer of a world, composed of lazily activated chunks
pub struct Atmosphere {
    config: AtmosConfig,

    /// Active chunks, keyed by chunk coordinates
    pub(super) chunks: HashMap<IVec2, Chunk>,

    /// Buffer selector shared by every chunk
    generation: Generation,

    /// World-wide moles as of the last step
    total_moles: u64,
}

impl Atmosphere {
    pub fn new(config: AtmosConfig) -> Result<Self, AtmosError> {
        config.validate()?;
        log::info!(
            "Atmosphere: {}x{} tile chunks, volume {}, spread factor {}",
            config.chunk_size,
            config.chunk_size,
            config.tile_volume,
            config.spread_factor
        );
        if let Some(ticks) = config.evict_after_idle_ticks {
            log::info!("  Idle chunks evicted after {} ticks", ticks);
        }

        Ok(Self {
            config,
            chunks: HashMap::new(),
            generation: Generation::default(),
            total_moles: 0,
        })
    }

    pub fn config(&self) -> &AtmosConfig {
        &self.config
    }

    #[inline]
    pub fn chunk_size(&self) -> i32 {
        self.config.chunk_size
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Moles counted by the last step's reduction
    pub fn total_moles(&self) -> u64 {
        self.total_moles
    }

    /// Recount moles in the current buffers (includes injections since the last step)
    pub fn count_moles(&self) -> u64 {
        let buffer = self.generation.current();
        self.chunks.values().map(|chunk| chunk.total_moles(buffer)).sum()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn get_chunk(&self, cx: i32, cy: i32) -> Option<&Chunk> {
        self.chunks.get(&IVec2::new(cx, cy))
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Chunk containing world tile (`x`, `y`)
    pub fn chunk_coordinate(&self, x: i32, y: i32) -> IVec2 {
        world_to_chunk_coords(x, y, self.chunk_size()).0
    }

    #[inline]
    fn locate(&self, x: i32, y: i32) -> (IVec2, usize) {
        world_to_chunk_coords(x, y, self.chunk_size())
    }

    /// Insert an empty, fully open chunk at (`cx`, `cy`) if none exists.
    /// Returns true if a chunk was created.
    pub fn activate(&mut self, cx: i32, cy: i32) -> bool {
        self.activate_at(IVec2::new(cx, cy))
    }

    fn activate_at(&mut self, position: IVec2) -> bool {
        if self.chunks.contains_key(&position) {
            return false;
        }
        self.chunks.insert(
            position,
            Chunk::new(position.x, position.y, self.chunk_size() as usize),
        );
        // Neighbors may already have walls facing us
        for dir in Direction::ALL {
            let blocked = self
                .chunks
                .get(&(position + dir.offset()))
                .is_some_and(|neighbor| !neighbor.walls_pristine());
            if blocked {
                self.refresh_edge(position, dir);
            }
        }
        log::debug!("[ACTIVATE] Chunk ({}, {})", position.x, position.y);
        true
    }

    /// Activate the chunk if needed and hand it out. Only `None` if
    /// activation failed to insert, which it never does.
    fn ensure_chunk(&mut self, position: IVec2) -> Option<&mut Chunk> {
        self.activate_at(position);
        self.chunks.get_mut(&position)
    }

    /// World coordinates of the tiles along one side of a chunk
    pub(super) fn edge_tiles(&self, position: IVec2, side: Direction) -> impl Iterator<Item = IVec2> {
        let size = self.chunk_size();
        let origin = position * size;
        (0..size).map(move |i| match side {
            Direction::North => IVec2::new(origin.x + i, origin.y + size - 1),
            Direction::South => IVec2::new(origin.x + i, origin.y),
            Direction::East => IVec2::new(origin.x + size - 1, origin.y + i),
            Direction::West => IVec2::new(origin.x, origin.y + i),
        })
    }

    pub(super) fn refresh_edge(&mut self, position: IVec2, side: Direction) {
        let tiles: Vec<IVec2> = self.edge_tiles(position, side).collect();
        for tile in tiles {
            self.refresh_tile(tile.x, tile.y);
        }
    }

    /// Re-derive one tile's flow mask from its walls and its neighbors'.
    /// Tiles in inactive chunks are skipped; activation derives them.
    pub(super) fn refresh_tile(&mut self, x: i32, y: i32) {
        let (position, index) = self.locate(x, y);
        let Some(own) = self.chunks.get(&position).map(|chunk| chunk.walls[index]) else {
            return;
        };
        let tile = IVec2::new(x, y);
        let flow = derive_flow(own, |dir| {
            let neighbor = tile + dir.offset();
            self.get_wall(neighbor.x, neighbor.y)
        });
        if let Some(chunk) = self.chunks.get_mut(&position) {
            chunk.flows[index] = flow;
        }
    }

    /// Set the wall mask of a tile and re-derive flows around it.
    ///
    /// Sealing a tile that holds gas moves the whole record into the first
    /// open neighbor (west, east, south, north).
    pub fn change_tile(&mut self, wall: WallMask, x: i32, y: i32) {
        let (position, index) = self.locate(x, y);
        if let Some(chunk) = self.ensure_chunk(position) {
            chunk.walls[index] = wall;
        }

        if wall == Flow::all() {
            self.evict_sealed_gas(x, y);
        }

        let tile = IVec2::new(x, y);
        self.refresh_tile(x, y);
        for dir in Direction::ALL {
            let neighbor = tile + dir.offset();
            self.refresh_tile(neighbor.x, neighbor.y);
        }
    }

    fn evict_sealed_gas(&mut self, x: i32, y: i32) {
        let record = self.get_gas(x, y);
        if record.is_vacuum() {
            return;
        }

        let tile = IVec2::new(x, y);
        let receiver = Direction::EVICTION_ORDER.into_iter().find(|dir| {
            let neighbor = tile + dir.offset();
            !self
                .get_wall(neighbor.x, neighbor.y)
                .contains(dir.opposite().flag())
        });

        let Some(dir) = receiver else {
            log::warn!(
                "[SEAL] Tile ({}, {}) sealed with {} moles and no open neighbor; gas stays in place",
                x,
                y,
                record.moles()
            );
            return;
        };

        let target = tile + dir.offset();
        let mut merged = self.get_gas(target.x, target.y);
        merged.merge(&record);
        self.set_gas(merged, target.x, target.y);
        self.set_gas(GasRecord::VACUUM, x, y);
        log::debug!(
            "[SEAL] Moved {} moles from ({}, {}) to ({}, {})",
            record.moles(),
            x,
            y,
            target.x,
            target.y
        );
    }

    /// Gas at a tile in the current buffer (vacuum for inactive chunks)
    pub fn get_gas(&self, x: i32, y: i32) -> GasRecord {
        let (position, index) = self.locate(x, y);
        self.chunks
            .get(&position)
            .map_or(GasRecord::VACUUM, |chunk| chunk.gas(self.generation.current())[index])
    }

    /// Flow mask of a tile (fully open for inactive chunks)
    pub fn get_flow(&self, x: i32, y: i32) -> FlowMask {
        let (position, index) = self.locate(x, y);
        self.chunks
            .get(&position)
            .map_or(Flow::all(), |chunk| chunk.flows[index])
    }

    /// Wall mask of a tile (no walls for inactive chunks)
    pub fn get_wall(&self, x: i32, y: i32) -> WallMask {
        let (position, index) = self.locate(x, y);
        self.chunks
            .get(&position)
            .map_or(Flow::empty(), |chunk| chunk.walls[index])
    }

    /// Cached pressure of a tile (0 for inactive chunks)
    pub fn get_pressure(&self, x: i32, y: i32) -> f64 {
        let (position, index) = self.locate(x, y);
        self.chunks
            .get(&position)
            .map_or(0.0, |chunk| chunk.pressure[index])
    }

    /// Overwrite a tile's gas in both buffers
    pub fn set_gas(&mut self, record: GasRecord, x: i32, y: i32) {
        let volume = self.config.tile_volume;
        let (position, index) = self.locate(x, y);
        if let Some(chunk) = self.ensure_chunk(position) {
            chunk.set_gas_everywhere(index, record, volume);
        }
    }

    /// Mix gas into a tile. With `compress`, the gas is released at double
    /// volume and compressed back, heating it.
    pub fn add_gas(&mut self, mix: GasMix, temperature: f64, x: i32, y: i32, compress: bool) {
        if mix.is_empty() {
            return;
        }
        let volume = self.config.tile_volume;
        let buffer = self.generation.current();
        let (position, index) = self.locate(x, y);
        let Some(chunk) = self.ensure_chunk(position) else {
            return;
        };

        let mut record = chunk.gas[buffer][index];
        inject(&mut record, &GasRecord::new(mix, temperature), volume, compress);
        chunk.set_gas_everywhere(index, record, volume);
    }

    fn step_params(&self) -> StepParams {
        StepParams {
            size: self.chunk_size() as usize,
            volume: self.config.tile_volume,
            factor: self.config.spread_factor,
        }
    }

    /// Advance the simulation by one generation
    pub fn step(&mut self) -> StepReport {
        let params = self.step_params();
        let totals = step::step_chunks(&mut self.chunks, self.generation, params);
        let active_chunks = totals.len();
        let total_moles: u64 = totals.iter().map(|&(_, moles)| moles).sum();

        // Expansion: gas can reach every neighbor of an occupied chunk next tick
        let frontier: Vec<IVec2> = totals
            .iter()
            .filter(|&&(_, moles)| moles > 0)
            .flat_map(|&(position, _)| Direction::ALL.map(|dir| position + dir.offset()))
            .collect();
        let activated = frontier
            .into_iter()
            .filter(|&position| self.activate_at(position))
            .count();

        let evicted = self.evict_idle_chunks(&totals);

        self.generation = self.generation.advance();
        self.total_moles = total_moles;

        let report = StepReport {
            tick: self.generation.tick(),
            total_moles,
            active_chunks,
            activated,
            evicted,
        };
        log::debug!(
            "[STEP] Tick {}: {} chunks, {} moles (+{} / -{} chunks)",
            report.tick,
            report.active_chunks,
            report.total_moles,
            report.activated,
            report.evicted
        );
        report
    }

    fn evict_idle_chunks(&mut self, totals: &[(IVec2, u64)]) -> usize {
        for &(position, moles) in totals {
            if let Some(chunk) = self.chunks.get_mut(&position) {
                chunk.idle_ticks = if moles == 0 {
                    chunk.idle_ticks.saturating_add(1)
                } else {
                    0
                };
            }
        }

        let Some(limit) = self.config.evict_after_idle_ticks else {
            return 0;
        };

        let occupied: HashSet<IVec2> = totals
            .iter()
            .filter(|&&(_, moles)| moles > 0)
            .map(|&(position, _)| position)
            .collect();

        let idle: Vec<IVec2> = self
            .chunks
            .iter()
            .filter(|(position, chunk)| {
                chunk.idle_ticks >= limit
                    && !occupied.contains(*position)
                    && chunk.walls_pristine()
                    && !Direction::ALL
                        .iter()
                        .any(|dir| occupied.contains(&(**position + dir.offset())))
            })
            .map(|(&position, _)| position)
            .collect();

        for position in &idle {
            self.chunks.remove(position);
            log::debug!("[EVICT] Chunk ({}, {})", position.x, position.y);
        }
        idle.len()
    }
}
