//! Core grid structure and accessors.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::automaton::grid::{self, Coord};
use crate::automaton::rules::{health_to_level, level_to_health, FULL_HEALTH, INITIAL_DENSITY};
use crate::automaton::stepping;
use crate::config::SimulationConfig;
use crate::error::{GridError, Result};

/// A toroidal 3D grid of cells, double-buffered across generations.
///
/// `levels[front]` / `dying[front]` hold the published generation. A step
/// writes the other pair and then flips `front`.
#[derive(Clone)]
pub struct Grid {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) depth: i32,
    pub(crate) levels: [Vec<u8>; 2], // 0 = dead, FULL_HEALTH = alive
    pub(crate) dying: [Vec<bool>; 2],
    pub(crate) front: usize,
    pub(crate) generation: u64,
}

impl Grid {
    /// Create a grid where each cell is alive with probability 0.3.
    pub fn new(width: i32, height: i32, depth: i32) -> Result<Self> {
        Self::from_rng(width, height, depth, &mut rand::thread_rng())
    }

    /// Create a randomly filled grid from a fixed seed.
    pub fn with_seed(width: i32, height: i32, depth: i32, seed: u64) -> Result<Self> {
        Self::from_rng(width, height, depth, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    /// Create the grid described by a validated config, seeded if it names a seed.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        match config.seed {
            Some(seed) => Self::with_seed(config.width, config.height, config.depth, seed),
            None => Self::new(config.width, config.height, config.depth),
        }
    }

    /// Create a randomly filled grid drawing from `rng`.
    pub fn from_rng<R: Rng>(
        width: i32,
        height: i32,
        depth: i32,
        rng: &mut R,
    ) -> Result<Self> {
        let mut grid = Self::empty(width, height, depth)?;

        for level in grid.levels[grid.front].iter_mut() {
            if rng.gen_bool(INITIAL_DENSITY) {
                *level = FULL_HEALTH;
            }
        }

        info!(
            width,
            height,
            depth,
            population = grid.population(),
            "created grid"
        );
        Ok(grid)
    }

    /// Create a grid with every cell dead.
    pub fn empty(width: i32, height: i32, depth: i32) -> Result<Self> {
        for (axis, value) in [("width", width), ("height", height), ("depth", depth)] {
            if value < 1 {
                return Err(GridError::InvalidDimension { axis, value });
            }
        }

        let too_large = GridError::TooLarge {
            width,
            height,
            depth,
        };
        let size = (width as usize)
            .checked_mul(height as usize)
            .and_then(|s| s.checked_mul(depth as usize))
            .ok_or_else(|| too_large.clone())?;

        let levels = [
            filled(size, 0u8).ok_or_else(|| too_large.clone())?,
            filled(size, 0u8).ok_or_else(|| too_large.clone())?,
        ];
        let dying = [
            filled(size, false).ok_or_else(|| too_large.clone())?,
            filled(size, false).ok_or(too_large)?,
        ];

        Ok(Grid {
            width,
            height,
            depth,
            levels,
            dying,
            front: 0,
            generation: 0,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.levels[self.front].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of completed generation steps.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Linear index of a coordinate, wrapping it onto the torus first.
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        grid::index_of(self, x, y, z)
    }

    /// Current health in `[0, 1]` at the wrapped coordinate.
    pub fn get(&self, x: i32, y: i32, z: i32) -> f32 {
        level_to_health(self.level(x, y, z))
    }

    /// Current health level (`0..=FULL_HEALTH`) at the wrapped coordinate.
    pub fn level(&self, x: i32, y: i32, z: i32) -> u8 {
        self.levels[self.front][self.index(x, y, z)]
    }

    /// Set the health of one cell in the published generation.
    pub fn set(&mut self, x: i32, y: i32, z: i32, value: f32) {
        self.set_level(x, y, z, health_to_level(value));
    }

    /// Set the health level of one cell, clamped to `FULL_HEALTH`.
    pub fn set_level(&mut self, x: i32, y: i32, z: i32, level: u8) {
        let idx = self.index(x, y, z);
        self.levels[self.front][idx] = level.min(FULL_HEALTH);
    }

    /// Whether a transitional cell is fading out (true) or in (false).
    pub fn is_dying(&self, x: i32, y: i32, z: i32) -> bool {
        self.dying[self.front][self.index(x, y, z)]
    }

    /// Set the fade direction of one cell.
    pub fn set_dying(&mut self, x: i32, y: i32, z: i32, dying: bool) {
        let idx = self.index(x, y, z);
        self.dying[self.front][idx] = dying;
    }

    /// The 26 wrapped coordinates surrounding a cell.
    pub fn neighbors(&self, x: i32, y: i32, z: i32) -> [Coord; 26] {
        grid::neighbors(self, x, y, z)
    }

    /// Count neighbors with non-zero health. Partial health counts as one.
    pub fn count_living_neighbors(&self, x: i32, y: i32, z: i32) -> u8 {
        grid::count_living_neighbors(self, x, y, z)
    }

    /// Compute and publish the next generation.
    pub fn advance_generation(&mut self) {
        stepping::advance_generation(self);
    }

    /// Number of cells with non-zero health.
    pub fn population(&self) -> usize {
        self.levels[self.front].iter().filter(|&&l| l > 0).count()
    }

    /// Published health levels in linear index order.
    pub fn cells(&self) -> &[u8] {
        &self.levels[self.front]
    }

    /// Published fade flags in linear index order.
    pub fn dying_flags(&self) -> &[bool] {
        &self.dying[self.front]
    }

    /// Install the back buffers as the published generation.
    pub(crate) fn publish(&mut self) {
        self.front ^= 1;
        self.generation += 1;
    }
}

/// A buffer of `size` copies of `fill`, or None if it cannot be allocated.
fn filled<T: Clone>(size: usize, fill: T) -> Option<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size).ok()?;
    buf.resize(size, fill);
    Some(buf)
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.depth)
            .field("generation", &self.generation)
            .field("population", &self.population())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid() {
        let grid = Grid::empty(8, 8, 8).unwrap();
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 8);
        assert_eq!(grid.depth(), 8);
        assert_eq!(grid.len(), 512);
        assert_eq!(grid.generation(), 0);
        assert_eq!(grid.population(), 0);
        assert!(grid.dying_flags().iter().all(|&d| !d));
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert_eq!(
            Grid::new(0, 4, 4).unwrap_err(),
            GridError::InvalidDimension {
                axis: "width",
                value: 0
            }
        );
        assert_eq!(
            Grid::empty(4, -2, 4).unwrap_err(),
            GridError::InvalidDimension {
                axis: "height",
                value: -2
            }
        );
        assert!(matches!(
            Grid::with_seed(4, 4, 0, 1),
            Err(GridError::InvalidDimension { axis: "depth", .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_volume() {
        #[cfg(target_pointer_width = "32")]
        assert!(matches!(
            Grid::empty(i32::MAX, i32::MAX, 2),
            Err(GridError::TooLarge { .. })
        ));
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            Grid::empty(i32::MAX, i32::MAX, i32::MAX),
            Err(GridError::TooLarge { .. })
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_unallocatable_volume_is_an_error() {
        // 2^60 cells fits in usize but not in memory
        assert_eq!(
            Grid::empty(1 << 20, 1 << 20, 1 << 20).unwrap_err(),
            GridError::TooLarge {
                width: 1 << 20,
                height: 1 << 20,
                depth: 1 << 20
            }
        );
    }

    #[test]
    fn test_random_fill_density() {
        let grid = Grid::with_seed(32, 32, 32, 7).unwrap();
        let density = grid.population() as f64 / grid.len() as f64;
        assert!((0.27..0.33).contains(&density), "density was {}", density);
        assert!(grid.cells().iter().all(|&l| l == 0 || l == FULL_HEALTH));
        assert!(grid.dying_flags().iter().all(|&d| !d));
    }

    #[test]
    fn test_seeded_fill_is_reproducible() {
        let a = Grid::with_seed(10, 12, 14, 42).unwrap();
        let b = Grid::with_seed(10, 12, 14, 42).unwrap();
        let c = Grid::with_seed(10, 12, 14, 43).unwrap();
        assert_eq!(a.cells(), b.cells());
        assert_ne!(a.cells(), c.cells());
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::empty(4, 4, 4).unwrap();

        grid.set(1, 2, 3, 1.0);
        assert_eq!(grid.get(1, 2, 3), 1.0);
        assert_eq!(grid.level(1, 2, 3), FULL_HEALTH);

        grid.set(0, 0, 0, 0.3);
        assert_eq!(grid.level(0, 0, 0), 3);

        // Out-of-range values are clamped
        grid.set(0, 0, 0, 4.0);
        assert_eq!(grid.get(0, 0, 0), 1.0);
        grid.set(0, 0, 0, -1.0);
        assert_eq!(grid.get(0, 0, 0), 0.0);
    }

    #[test]
    fn test_access_wraps_coordinates() {
        let mut grid = Grid::empty(4, 5, 6).unwrap();
        grid.set(-1, -1, -1, 1.0);

        assert_eq!(grid.get(3, 4, 5), 1.0);
        assert_eq!(grid.get(7, 9, 11), 1.0);
        assert_eq!(grid.index(-1, -1, -1), grid.index(3, 4, 5));

        grid.set_dying(4, 5, 6, true);
        assert!(grid.is_dying(0, 0, 0));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut grid = Grid::empty(3, 3, 3).unwrap();
        let snapshot = grid.clone();
        grid.set(0, 0, 0, 1.0);
        assert_eq!(snapshot.get(0, 0, 0), 0.0);
        assert_eq!(grid.get(0, 0, 0), 1.0);
    }
}
