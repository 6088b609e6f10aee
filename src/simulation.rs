//! Host-side simulation state and scheduling.
//!
//! A renderer drives two independent loops: a fixed-cadence simulation tick
//! that advances generations, and a per-frame display pass that reads cells.
//! [`Simulation`] serves single-threaded hosts that poll from their frame
//! loop; [`SharedGrid`] serves hosts that step on a background thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::state::Grid;

/// Everything a single-threaded host owns about the running automaton.
pub struct Simulation {
    grid: Grid,
    tick_interval: Duration,
    max_catch_up: u32,
    last_step: Option<Instant>,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        Self::from_grid(Grid::from_config(config)?, config)
    }

    /// Schedule an existing grid with the cadence from `config`.
    /// The grid's own dimensions win over the ones in `config`.
    pub fn from_grid(grid: Grid, config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Simulation {
            grid,
            tick_interval: config.tick_interval(),
            max_catch_up: config.max_catch_up.max(1),
            last_step: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Advance one generation per whole tick interval elapsed since the last
    /// step, independent of how often the host calls this. The first call only
    /// starts the clock. Returns the number of generations advanced.
    pub fn update(&mut self, now: Instant) -> u32 {
        let Some(last) = self.last_step else {
            self.last_step = Some(now);
            return 0;
        };

        let elapsed = now.saturating_duration_since(last);
        let due = elapsed.as_nanos() / self.tick_interval.as_nanos();
        if due == 0 {
            return 0;
        }

        let steps = due.min(self.max_catch_up as u128) as u32;
        for _ in 0..steps {
            self.grid.advance_generation();
        }

        if due > steps as u128 {
            warn!(
                due = due as u64,
                advanced = steps,
                "simulation fell behind, dropping ticks"
            );
            self.last_step = Some(now);
        } else {
            self.last_step = Some(last + self.tick_interval * steps);
        }

        steps
    }
}

/// A grid shared between a stepping thread and reader threads.
///
/// The write lock is held for the whole step, so every reader observes
/// either all of generation N or all of generation N+1.
#[derive(Clone)]
pub struct SharedGrid {
    inner: Arc<RwLock<Grid>>,
}

impl SharedGrid {
    pub fn new(grid: Grid) -> Self {
        SharedGrid {
            inner: Arc::new(RwLock::new(grid)),
        }
    }

    /// Compute and publish the next generation.
    pub fn advance(&self) {
        self.inner.write().advance_generation();
    }

    /// Run `f` against a consistent view of the current generation.
    pub fn read<T>(&self, f: impl FnOnce(&Grid) -> T) -> T {
        f(&*self.inner.read())
    }

    /// Run `f` with exclusive access, e.g. to seed cells.
    pub fn write<T>(&self, f: impl FnOnce(&mut Grid) -> T) -> T {
        f(&mut *self.inner.write())
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation()
    }

    /// Start a background thread that advances the grid every `interval`.
    pub fn spawn_ticker(&self, interval: Duration) -> TickerHandle {
        let grid = self.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            info!(interval_ms = interval.as_millis() as u64, "ticker started");
            let mut next = Instant::now() + interval;

            while !stop_flag.load(Ordering::Acquire) {
                let now = Instant::now();
                if now < next {
                    thread::park_timeout(next - now);
                    continue;
                }

                grid.advance();
                next += interval;
                if next < now {
                    // Behind by more than a tick: skip ahead rather than burst
                    next = now + interval;
                }
            }

            debug!(generation = grid.generation(), "ticker stopped");
        });

        TickerHandle {
            stop,
            handle: Some(handle),
        }
    }
}

/// Stops and joins the ticker thread when dropped.
pub struct TickerHandle {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickerHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("ticker thread panicked");
            }
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
