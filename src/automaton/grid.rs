//! Toroidal coordinate helpers and neighbor counting.

use crate::state::Grid;

/// A cell coordinate `(x, y, z)`.
pub type Coord = (i32, i32, i32);

/// Moore neighborhood offsets: the 3x3x3 cube minus its center.
pub const NEIGHBOR_OFFSETS: [Coord; 26] = build_offsets();

const fn build_offsets() -> [Coord; 26] {
    let mut offsets = [(0, 0, 0); 26];
    let mut i = 0;
    let mut dz = -1;
    while dz <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dx = -1;
            while dx <= 1 {
                // Skip the center cell
                if !(dx == 0 && dy == 0 && dz == 0) {
                    offsets[i] = (dx, dy, dz);
                    i += 1;
                }
                dx += 1;
            }
            dy += 1;
        }
        dz += 1;
    }
    offsets
}

/// Floored modulo: maps any `a` into `[0, n)` for positive `n`.
#[inline]
pub fn wrap(a: i32, n: i32) -> i32 {
    a.rem_euclid(n)
}

/// Linear index of an in-range coordinate (x fastest, z slowest).
#[inline]
pub(crate) fn linear_index(width: i32, height: i32, x: i32, y: i32, z: i32) -> usize {
    x as usize + width as usize * (y as usize + height as usize * z as usize)
}

/// Calculate the linear index for a 3D coordinate, wrapping it first.
#[inline]
pub fn index_of(grid: &Grid, x: i32, y: i32, z: i32) -> usize {
    linear_index(
        grid.width,
        grid.height,
        wrap(x, grid.width),
        wrap(y, grid.height),
        wrap(z, grid.depth),
    )
}

/// The 26 wrapped coordinates surrounding `(x, y, z)`.
pub fn neighbors(grid: &Grid, x: i32, y: i32, z: i32) -> [Coord; 26] {
    // Wrap first so offsets never overflow near i32::MAX
    let (x, y, z) = (wrap(x, grid.width), wrap(y, grid.height), wrap(z, grid.depth));
    NEIGHBOR_OFFSETS.map(|(dx, dy, dz)| {
        (
            wrap(x + dx, grid.width),
            wrap(y + dy, grid.height),
            wrap(z + dz, grid.depth),
        )
    })
}

/// Count neighbors with non-zero health in the published generation.
pub fn count_living_neighbors(grid: &Grid, x: i32, y: i32, z: i32) -> u8 {
    count_living_in(
        grid.cells(),
        grid.width,
        grid.height,
        grid.depth,
        wrap(x, grid.width),
        wrap(y, grid.height),
        wrap(z, grid.depth),
    )
}

/// Count living neighbors of an in-range cell against an arbitrary buffer.
///
/// Every offset is counted, so on axes shorter than 3 the same cell (or the
/// center itself) can be seen through more than one offset.
pub(crate) fn count_living_in(
    cells: &[u8],
    width: i32,
    height: i32,
    depth: i32,
    x: i32,
    y: i32,
    z: i32,
) -> u8 {
    let mut count = 0;

    for (dx, dy, dz) in NEIGHBOR_OFFSETS {
        let nx = wrap(x + dx, width);
        let ny = wrap(y + dy, height);
        let nz = wrap(z + dz, depth);

        if cells[linear_index(width, height, nx, ny, nz)] > 0 {
            count += 1;
        }
    }

    count
}
