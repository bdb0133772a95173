//! Parallel step scheduler - one generation of the gas simulation
//!
//! A generation runs: gather neighbors -> compute every tile in parallel ->
//! barrier -> reduce mole totals. Expansion and the buffer flip are done by
//! the caller once this returns, on a single thread.
//!
//! Each chunk's output buffer (and pressure cache) is moved out of the chunk
//! map for the duration of the compute phase, so all workers share the map
//! immutably and every output slot has exactly one writer.

use std::collections::HashMap;

use glam::IVec2;
use rayon::prelude::*;

use super::chunk::Chunk;
use super::flow::{Direction, FlowMask};
use crate::simulation::{exchange, GasRecord};

/// Which of the two gas buffers is current, plus the tick counter.
///
/// Passed into the step explicitly; the atmosphere flips it after the
/// barrier, for all chunks at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Generation {
    buffer: usize,
    tick: u64,
}

impl Generation {
    /// Buffer read during this generation
    #[inline]
    pub fn current(self) -> usize {
        self.buffer
    }

    /// Buffer written during this generation
    #[inline]
    pub fn next(self) -> usize {
        self.buffer ^ 1
    }

    /// Number of completed generations
    #[inline]
    pub fn tick(self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn advance(self) -> Self {
        Self {
            buffer: self.next(),
            tick: self.tick + 1,
        }
    }
}

/// Per-tick constants shared by every tile computation
#[derive(Clone, Copy, Debug)]
pub struct StepParams {
    pub size: usize,
    pub volume: f64,
    pub factor: f64,
}

/// Summary of one completed generation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Tick number of the generation that just completed (1-based)
    pub tick: u64,
    /// World-wide moles after the step
    pub total_moles: u64,
    /// Chunks simulated this tick
    pub active_chunks: usize,
    /// Chunks added by expansion
    pub activated: usize,
    /// Chunks dropped by idle eviction
    pub evicted: usize,
}

/// Read-only view of a chunk's current buffer and its four neighbors'.
/// A missing neighbor reads as vacuum.
struct Neighborhood<'a> {
    center: &'a [GasRecord],
    flows: &'a [FlowMask],
    north: Option<&'a [GasRecord]>,
    south: Option<&'a [GasRecord]>,
    east: Option<&'a [GasRecord]>,
    west: Option<&'a [GasRecord]>,
}

impl<'a> Neighborhood<'a> {
    fn gather(chunks: &'a HashMap<IVec2, Chunk>, position: IVec2, buffer: usize) -> Option<Self> {
        let center = chunks.get(&position)?;
        let side = move |dir: Direction| {
            chunks
                .get(&(position + dir.offset()))
                .map(|chunk| chunk.gas(buffer))
        };
        Some(Self {
            center: center.gas(buffer),
            flows: center.flows(),
            north: side(Direction::North),
            south: side(Direction::South),
            east: side(Direction::East),
            west: side(Direction::West),
        })
    }

    /// Record across `dir` from the tile at (`col`, `row`). Rows run top-down.
    #[inline]
    fn neighbor(&self, size: usize, col: usize, row: usize, dir: Direction) -> GasRecord {
        let edge = |side: Option<&[GasRecord]>, index: usize| {
            side.map_or(GasRecord::VACUUM, |buffer| buffer[index])
        };
        match dir {
            Direction::North if row == 0 => edge(self.north, col + (size - 1) * size),
            Direction::North => self.center[col + (row - 1) * size],
            Direction::South if row == size - 1 => edge(self.south, col),
            Direction::South => self.center[col + (row + 1) * size],
            Direction::East if col == size - 1 => edge(self.east, row * size),
            Direction::East => self.center[col + 1 + row * size],
            Direction::West if col == 0 => edge(self.west, (size - 1) + row * size),
            Direction::West => self.center[col - 1 + row * size],
        }
    }

    /// Next-generation record of one tile. Pure function of the snapshot.
    fn compute_tile(&self, index: usize, params: &StepParams) -> GasRecord {
        let size = params.size;
        let (col, row) = (index % size, index / size);

        let original = self.center[index];
        let mut current = original;
        let flow = self.flows[index];

        for dir in Direction::ALL {
            if !flow.contains(dir.flag()) {
                continue;
            }
            let neighbor = self.neighbor(size, col, row, dir);
            exchange(&mut current, &original, &neighbor, params.volume, params.factor);
        }

        current
    }
}

/// Output buffers of one chunk, owned by the step while it runs
struct ChunkJob {
    position: IVec2,
    output: Vec<GasRecord>,
    pressure: Vec<f64>,
    moles: u64,
}

/// Run the compute, barrier and reduce phases of one generation.
///
/// Reads `generation.current()` of every chunk and writes
/// `generation.next()`. Returns each chunk's mole total in the written buffer.
pub(crate) fn step_chunks(
    chunks: &mut HashMap<IVec2, Chunk>,
    generation: Generation,
    params: StepParams,
) -> Vec<(IVec2, u64)> {
    let input = generation.current();
    let output = generation.next();

    let mut jobs: Vec<ChunkJob> = chunks
        .iter_mut()
        .map(|(&position, chunk)| ChunkJob {
            position,
            output: std::mem::take(&mut chunk.gas[output]),
            pressure: std::mem::take(&mut chunk.pressure),
            moles: 0,
        })
        .collect();

    {
        let snapshot: &HashMap<IVec2, Chunk> = chunks;
        jobs.par_iter_mut().for_each(|job| {
            let Some(neighborhood) = Neighborhood::gather(snapshot, job.position, input) else {
                return;
            };
            job.output
                .par_iter_mut()
                .zip(job.pressure.par_iter_mut())
                .enumerate()
                .for_each(|(index, (record, pressure))| {
                    *record = neighborhood.compute_tile(index, &params);
                    *pressure = record.pressure(params.volume);
                });
        });
    }

    // Every tile of every chunk is written before any total is taken
    jobs.par_iter_mut().for_each(|job| {
        job.moles = job.output.iter().map(GasRecord::moles).sum();
    });

    jobs.into_iter()
        .map(|job| {
            if let Some(chunk) = chunks.get_mut(&job.position) {
                chunk.gas[output] = job.output;
                chunk.pressure = job.pressure;
            }
            (job.position, job.moles)
        })
        .collect()
}
