//! Whole-grid generation stepping.
//!
//! Every cell of generation N+1 is computed from generation N only: the
//! published buffers are read, the back buffers are written, and the two
//! swap roles in a single flip once every cell is done.

use rayon::prelude::*;
use tracing::{debug, enabled, Level};

use super::grid::count_living_in;
use super::rules::{next_state, FULL_HEALTH};
use crate::state::Grid;

/// Read-only view of a published generation.
#[derive(Clone, Copy)]
pub(crate) struct Source<'a> {
    pub levels: &'a [u8],
    pub dying: &'a [bool],
    pub width: i32,
    pub height: i32,
    pub depth: i32,
}

impl Source<'_> {
    /// Next `(level, dying)` of the cell at linear index `idx`.
    #[inline]
    pub fn next_cell(&self, idx: usize) -> (u8, bool) {
        let w = self.width as usize;
        let h = self.height as usize;
        let x = (idx % w) as i32;
        let y = ((idx / w) % h) as i32;
        let z = (idx / (w * h)) as i32;

        let living = count_living_in(self.levels, self.width, self.height, self.depth, x, y, z);
        next_state(self.levels[idx], self.dying[idx], living)
    }
}

/// Split a grid into its published generation and writable back buffers.
pub(crate) fn split_buffers(grid: &mut Grid) -> (Source<'_>, &mut [u8], &mut [bool]) {
    let front = grid.front;
    let (levels_a, levels_b) = grid.levels.split_at_mut(1);
    let (dying_a, dying_b) = grid.dying.split_at_mut(1);

    let (src_levels, dst_levels, src_dying, dst_dying) = if front == 0 {
        (&levels_a[0][..], &mut levels_b[0][..], &dying_a[0][..], &mut dying_b[0][..])
    } else {
        (&levels_b[0][..], &mut levels_a[0][..], &dying_b[0][..], &mut dying_a[0][..])
    };

    let source = Source {
        levels: src_levels,
        dying: src_dying,
        width: grid.width,
        height: grid.height,
        depth: grid.depth,
    };
    (source, dst_levels, dst_dying)
}

/// Step the automaton forward by one generation.
pub fn advance_generation(grid: &mut Grid) {
    if grid.is_empty() {
        return;
    }

    {
        let (source, next_levels, next_dying) = split_buffers(grid);

        next_levels
            .par_iter_mut()
            .zip(next_dying.par_iter_mut())
            .enumerate()
            .for_each(|(idx, (level, dying))| {
                (*level, *dying) = source.next_cell(idx);
            });
    }

    if enabled!(Level::DEBUG) {
        let (births, deaths) = transition_counts(grid);
        grid.publish();
        debug!(
            generation = grid.generation,
            population = grid.population(),
            births,
            deaths,
            "advanced generation"
        );
    } else {
        grid.publish();
    }
}

/// Count cells about to start fading in (births) and out (deaths).
fn transition_counts(grid: &Grid) -> (usize, usize) {
    let front = &grid.levels[grid.front];
    let back = &grid.levels[grid.front ^ 1];

    front
        .par_iter()
        .zip(back.par_iter())
        .map(|(&now, &next)| match (now, next) {
            (0, 1) => (1, 0),
            (FULL_HEALTH, l) if l == FULL_HEALTH - 1 => (0, 1),
            _ => (0, 0),
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
}
