//! Non-blocking incremental stepping with tiled work distribution.
//!
//! Splits a generation step into bounded work quanta (16³ tiles) that can be
//! processed across multiple host ticks without blocking frames.
//!
//! Core invariant: every tile reads the published generation N and writes the
//! back buffer. Nothing becomes visible until the last tile is done and the
//! buffers flip, so readers between ticks always see a whole generation N.
//! Tile processing order doesn't affect the result.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, trace};

use super::grid::linear_index;
use super::stepping::split_buffers;
use crate::config::SimulationConfig;
use crate::error::{GridError, Result};
use crate::state::Grid;

pub const TILE_SIZE: i32 = 16;

/// 3D tile coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileCoord {
    pub tx: u32,
    pub ty: u32,
    pub tz: u32,
}

/// Tracks the state of an in-progress incremental generation step.
struct IncrementalStep {
    /// Ordered list of tile coordinates to process, in Morton order.
    tile_queue: Vec<TileCoord>,

    /// Index into tile_queue: next tile to process.
    next_tile: usize,

    /// The generation number this step will produce.
    target_generation: u64,
}

/// Manages the lifecycle of incremental steps for a Grid.
pub struct StepController {
    grid: Grid,

    /// In-progress step state, or None if idle.
    active_step: Option<IncrementalStep>,

    thread_pool: rayon::ThreadPool,
}

/// Interleave the low 21 bits of x, y, z into a Morton code.
fn morton_encode(x: u32, y: u32, z: u32) -> u64 {
    fn spread_bits(v: u32) -> u64 {
        let mut x = (v as u64) & 0x1F_FFFF;
        x = (x | (x << 32)) & 0x001F_0000_0000_FFFF;
        x = (x | (x << 16)) & 0x001F_0000_FF00_00FF;
        x = (x | (x << 8)) & 0x100F_00F0_0F00_F00F;
        x = (x | (x << 4)) & 0x10C3_0C30_C30C_30C3;
        x = (x | (x << 2)) & 0x1249_2492_4924_9249;
        x
    }
    spread_bits(x) | (spread_bits(y) << 1) | (spread_bits(z) << 2)
}

/// Build a list of all tile coordinates, sorted by Morton code.
fn build_tile_queue(tiles_x: u32, tiles_y: u32, tiles_z: u32) -> Vec<TileCoord> {
    let mut tiles = Vec::with_capacity(tiles_x as usize * tiles_y as usize * tiles_z as usize);

    for tz in 0..tiles_z {
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                tiles.push(TileCoord { tx, ty, tz });
            }
        }
    }

    // Ties only occur past 2^21 tiles per axis; the linear order breaks them.
    tiles.sort_by_key(|t| (morton_encode(t.tx, t.ty, t.tz), t.tz, t.ty, t.tx));
    tiles
}

fn tiles_along(extent: i32) -> u32 {
    (extent as u32).div_ceil(TILE_SIZE as u32)
}

/// Compute one tile of the next generation into the grid's back buffers.
fn process_tile(grid: &mut Grid, pool: &rayon::ThreadPool, tile: TileCoord) {
    let x_start = tile.tx as i32 * TILE_SIZE;
    let y_start = tile.ty as i32 * TILE_SIZE;
    let z_start = tile.tz as i32 * TILE_SIZE;

    let x_end = (x_start + TILE_SIZE).min(grid.width);
    let y_end = (y_start + TILE_SIZE).min(grid.height);
    let z_end = (z_start + TILE_SIZE).min(grid.depth);

    let (width, height) = (grid.width, grid.height);
    let (source, next_levels, next_dying) = split_buffers(grid);

    let mut indices = Vec::with_capacity((TILE_SIZE * TILE_SIZE * TILE_SIZE) as usize);
    for z in z_start..z_end {
        for y in y_start..y_end {
            for x in x_start..x_end {
                indices.push(linear_index(width, height, x, y, z));
            }
        }
    }

    let results: Vec<(u8, bool)> =
        pool.install(|| indices.par_iter().map(|&idx| source.next_cell(idx)).collect());

    for (&idx, (level, dying)) in indices.iter().zip(results) {
        next_levels[idx] = level;
        next_dying[idx] = dying;
    }
}

impl StepController {
    /// Wrap a grid with a stepper using `num_threads` worker threads (at least one).
    pub fn new(grid: Grid, num_threads: usize) -> Result<Self> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1))
            .build()
            .map_err(|e| GridError::ThreadPool(e.to_string()))?;

        Ok(StepController {
            grid,
            active_step: None,
            thread_pool,
        })
    }

    /// Build the grid described by `config` and wrap it with `config.step_threads` workers.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        Self::new(Grid::from_config(config)?, config.step_threads)
    }

    /// The published generation. Unchanged while a step is in progress.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access to the grid, refused while a step is in progress.
    pub fn grid_mut(&mut self) -> Option<&mut Grid> {
        if self.is_stepping() {
            None
        } else {
            Some(&mut self.grid)
        }
    }

    /// Extract the inner grid, discarding any unfinished step.
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Query whether a step is currently in progress.
    pub fn is_stepping(&self) -> bool {
        self.active_step.is_some()
    }

    /// Tiles processed and total tiles of the active step, or None if idle.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.active_step
            .as_ref()
            .map(|s| (s.next_tile, s.tile_queue.len()))
    }

    /// Begin a new incremental step. Fails if a step is already in progress.
    pub fn begin_step(&mut self) -> Result<()> {
        if self.is_stepping() {
            return Err(GridError::StepInProgress);
        }

        let tile_queue = build_tile_queue(
            tiles_along(self.grid.width),
            tiles_along(self.grid.height),
            tiles_along(self.grid.depth),
        );

        self.active_step = Some(IncrementalStep {
            tile_queue,
            next_tile: 0,
            target_generation: self.grid.generation + 1,
        });
        Ok(())
    }

    /// Do bounded work within the given time budget.
    /// Returns true if the step completed during this tick (or none was active),
    /// false if more work remains.
    pub fn tick(&mut self, budget: Duration) -> bool {
        let step = match &mut self.active_step {
            Some(s) => s,
            None => return true,
        };

        let started = Instant::now();
        let deadline = started.checked_add(budget);
        let first_tile = step.next_tile;

        loop {
            if step.next_tile >= step.tile_queue.len() {
                // All tiles done. Publish.
                self.finalize_step();
                return true;
            }

            let tile = step.tile_queue[step.next_tile];
            step.next_tile += 1;
            process_tile(&mut self.grid, &self.thread_pool, tile);

            if deadline.is_some_and(|d| Instant::now() >= d) {
                trace!(
                    tiles = step.next_tile - first_tile,
                    remaining = step.tile_queue.len() - step.next_tile,
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "step budget exhausted"
                );
                return false; // Budget exhausted, yield to the host.
            }
        }
    }

    /// Blocking full step (begin if idle, then tick until done).
    pub fn step_blocking(&mut self) {
        if !self.is_stepping() {
            // Cannot fail: no step is active.
            let _ = self.begin_step();
        }
        while !self.tick(Duration::MAX) {}
    }

    /// Flip the back buffers in and advance the generation.
    fn finalize_step(&mut self) {
        if let Some(step) = self.active_step.take() {
            self.grid.publish();
            debug_assert_eq!(self.grid.generation, step.target_generation);
            debug!(
                generation = self.grid.generation,
                population = self.grid.population(),
                tiles = step.tile_queue.len(),
                "incremental step published"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_morton_order() {
        assert_eq!(morton_encode(0, 0, 0), 0);
        assert_eq!(morton_encode(1, 0, 0), 1);
        assert_eq!(morton_encode(0, 1, 0), 2);
        assert_eq!(morton_encode(0, 0, 1), 4);
        assert_eq!(morton_encode(1, 1, 1), 7);
        assert_eq!(morton_encode(2, 0, 0), 8);

        let queue = build_tile_queue(2, 2, 2);
        assert_eq!(queue.len(), 8);
        assert_eq!(queue[0], TileCoord { tx: 0, ty: 0, tz: 0 });
        assert_eq!(queue[1], TileCoord { tx: 1, ty: 0, tz: 0 });
        assert_eq!(queue[7], TileCoord { tx: 1, ty: 1, tz: 1 });
    }

    #[test]
    fn test_create_step_controller() {
        let ctrl = StepController::new(Grid::empty(16, 16, 16).unwrap(), 1).unwrap();
        assert_eq!(ctrl.grid().width(), 16);
        assert!(!ctrl.is_stepping());
        assert_eq!(ctrl.progress(), None);
    }

    #[test]
    fn test_begin_step() {
        let mut ctrl = StepController::new(Grid::empty(16, 16, 16).unwrap(), 1).unwrap();
        assert!(ctrl.begin_step().is_ok());
        assert!(ctrl.is_stepping());
        assert_eq!(ctrl.progress(), Some((0, 1)));

        // Second begin should fail
        assert_eq!(ctrl.begin_step(), Err(GridError::StepInProgress));
    }

    #[test]
    fn test_tick_without_step_is_done() {
        let mut ctrl = StepController::new(Grid::empty(4, 4, 4).unwrap(), 1).unwrap();
        assert!(ctrl.tick(Duration::ZERO));
        assert_eq!(ctrl.grid().generation(), 0);
    }

    #[test]
    fn test_blocking_matches_whole_grid_step() {
        let grid = Grid::with_seed(20, 17, 33, 99).unwrap();
        let mut expected = grid.clone();
        let mut ctrl = StepController::new(grid, 2).unwrap();

        for _ in 0..6 {
            expected.advance_generation();
            ctrl.step_blocking();
            assert_eq!(ctrl.grid().cells(), expected.cells());
            assert_eq!(ctrl.grid().dying_flags(), expected.dying_flags());
        }
        assert_eq!(ctrl.grid().generation(), 6);
    }

    #[test]
    fn test_incremental_ticking_matches_blocking() {
        // Zero budget forces exactly one tile per tick
        let grid = Grid::with_seed(40, 40, 40, 5).unwrap();

        let mut blocking = StepController::new(grid.clone(), 1).unwrap();
        blocking.step_blocking();

        let mut ticking = StepController::new(grid, 1).unwrap();
        ticking.begin_step().unwrap();
        let (_, total) = ticking.progress().unwrap();
        assert_eq!(total, 27);

        let mut ticks = 0;
        while !ticking.tick(Duration::ZERO) {
            ticks += 1;
        }

        assert_eq!(ticks, total);
        assert_eq!(ticking.grid().cells(), blocking.grid().cells());
        assert_eq!(ticking.grid().dying_flags(), blocking.grid().dying_flags());
    }

    #[test]
    fn test_readers_see_previous_generation_mid_step() {
        let grid = Grid::with_seed(32, 32, 32, 11).unwrap();
        let before = grid.cells().to_vec();

        let mut ctrl = StepController::new(grid, 1).unwrap();
        ctrl.begin_step().unwrap();
        assert!(!ctrl.tick(Duration::ZERO));
        assert!(!ctrl.tick(Duration::ZERO));

        assert_eq!(ctrl.grid().cells(), &before[..]);
        assert_eq!(ctrl.grid().generation(), 0);
        assert!(ctrl.grid_mut().is_none());

        ctrl.step_blocking();
        assert_eq!(ctrl.grid().generation(), 1);
        assert!(ctrl.grid_mut().is_some());
    }

    #[test]
    fn test_thread_count_does_not_change_result() {
        let grid = Grid::with_seed(24, 24, 24, 77).unwrap();

        let mut single = StepController::new(grid.clone(), 1).unwrap();
        let mut multi = StepController::new(grid, 4).unwrap();
        for _ in 0..4 {
            single.step_blocking();
            multi.step_blocking();
        }

        assert_eq!(single.grid().cells(), multi.grid().cells());
    }

    #[test]
    fn test_from_config() {
        let config = SimulationConfig {
            width: 5,
            height: 6,
            depth: 7,
            seed: Some(9),
            step_threads: 2,
            ..SimulationConfig::default()
        };
        let ctrl = StepController::from_config(&config).unwrap();
        assert_eq!(ctrl.grid().len(), 210);
        assert_eq!(ctrl.grid().cells(), Grid::with_seed(5, 6, 7, 9).unwrap().cells());
    }

    #[test]
    fn test_zero_threads_means_one() {
        let mut ctrl = StepController::new(Grid::empty(3, 3, 3).unwrap(), 0).unwrap();
        ctrl.step_blocking();
        assert_eq!(ctrl.into_grid().generation(), 1);
    }
}
