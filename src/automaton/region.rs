//! Region extraction and import operations.

use super::grid::linear_index;
use super::rules::FULL_HEALTH;
use crate::state::Grid;

/// Inclusive-exclusive box of cells, `[min, max)` on each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub min: (i32, i32, i32),
    pub max: (i32, i32, i32),
}

impl Region {
    pub fn new(min: (i32, i32, i32), max: (i32, i32, i32)) -> Self {
        Region { min, max }
    }

    /// The whole grid.
    pub fn of(grid: &Grid) -> Self {
        Region::new((0, 0, 0), (grid.width, grid.height, grid.depth))
    }

    /// Clamp to grid bounds. Returns None for an empty or inverted box.
    pub fn clamp_to(&self, grid: &Grid) -> Option<Region> {
        let clamp = |v: i32, n: i32| v.clamp(0, n);

        let min = (
            clamp(self.min.0, grid.width),
            clamp(self.min.1, grid.height),
            clamp(self.min.2, grid.depth),
        );
        let max = (
            clamp(self.max.0, grid.width),
            clamp(self.max.1, grid.height),
            clamp(self.max.2, grid.depth),
        );

        if min.0 >= max.0 || min.1 >= max.1 || min.2 >= max.2 {
            return None;
        }
        Some(Region { min, max })
    }

    /// Number of cells in the box. 0 if empty, inverted, or too large to count.
    pub fn volume(&self) -> usize {
        let extent = |lo: i32, hi: i32| (hi as i64 - lo as i64).max(0) as u64;
        extent(self.min.0, self.max.0)
            .checked_mul(extent(self.min.1, self.max.1))
            .and_then(|v| v.checked_mul(extent(self.min.2, self.max.2)))
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(0)
    }

    /// Linear grid indices of the box in z,y,x order.
    fn indices<'a>(&self, grid: &'a Grid) -> impl Iterator<Item = usize> + 'a {
        let Region { min, max } = *self;
        let (width, height) = (grid.width, grid.height);
        (min.2..max.2).flat_map(move |z| {
            (min.1..max.1).flat_map(move |y| {
                (min.0..max.0).map(move |x| linear_index(width, height, x, y, z))
            })
        })
    }
}

/// Copy the health levels of a region into a flat buffer.
///
/// # Layout
/// The buffer is filled in z,y,x order (z changes slowest, x changes fastest).
/// This order matches the order used by `import_region` for symmetry.
///
/// # Returns
/// Number of cells written, or 0 for an empty region or a short buffer.
pub fn extract_region(grid: &Grid, out_buf: &mut [u8], region: Region) -> usize {
    let Some(region) = region.clamp_to(grid) else {
        return 0;
    };
    if out_buf.len() < region.volume() {
        return 0;
    }

    let levels = grid.cells();
    let mut written = 0;
    for (slot, idx) in out_buf.iter_mut().zip(region.indices(grid)) {
        *slot = levels[idx];
        written += 1;
    }
    written
}

/// Copy the fade-out flags of a region into a flat buffer (1 = dying).
///
/// Same layout and return value as `extract_region`.
pub fn extract_dying(grid: &Grid, out_buf: &mut [u8], region: Region) -> usize {
    let Some(region) = region.clamp_to(grid) else {
        return 0;
    };
    if out_buf.len() < region.volume() {
        return 0;
    }

    let dying = grid.dying_flags();
    let mut written = 0;
    for (slot, idx) in out_buf.iter_mut().zip(region.indices(grid)) {
        *slot = dying[idx] as u8;
        written += 1;
    }
    written
}

/// Write health levels from a flat buffer into a region of the published generation.
///
/// # Layout
/// The buffer is expected to be in z,y,x order (matching `extract_region`).
/// Levels above `FULL_HEALTH` are clamped, and every written cell starts
/// fading in if transitional.
///
/// # Returns
/// Number of cells read from the buffer, or 0 for an empty region or a short buffer.
pub fn import_region(grid: &mut Grid, in_buf: &[u8], region: Region) -> usize {
    let Some(region) = region.clamp_to(grid) else {
        return 0;
    };
    if in_buf.len() < region.volume() {
        return 0;
    }

    let indices: Vec<usize> = region.indices(grid).collect();
    let front = grid.front;
    for (&idx, &value) in indices.iter().zip(in_buf) {
        grid.levels[front][idx] = value.min(FULL_HEALTH);
        grid.dying[front][idx] = false;
    }
    indices.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_region_basic() {
        let mut grid = Grid::empty(8, 8, 8).unwrap();

        grid.set(2, 2, 2, 1.0);
        grid.set(3, 2, 2, 0.4);
        grid.set(2, 3, 2, 1.0);

        // Extract a 4x4x4 region
        let mut buffer = vec![0u8; 64];
        let written = extract_region(&grid, &mut buffer, Region::new((2, 2, 2), (6, 6, 6)));

        assert_eq!(written, 64);
        assert_eq!(buffer[0], FULL_HEALTH); // (2,2,2)
        assert_eq!(buffer[1], 4); // (3,2,2)
        assert_eq!(buffer[4], FULL_HEALTH); // (2,3,2)
        assert_eq!(buffer.iter().filter(|&&l| l > 0).count(), 3);
    }

    #[test]
    fn test_extract_region_full_grid() {
        let mut grid = Grid::empty(4, 4, 4).unwrap();
        let whole = Region::of(&grid);
        let all = vec![FULL_HEALTH; 64];
        assert_eq!(import_region(&mut grid, &all, whole), 64);

        let mut buffer = vec![0u8; 64];
        assert_eq!(extract_region(&grid, &mut buffer, Region::of(&grid)), 64);
        assert!(buffer.iter().all(|&c| c == FULL_HEALTH));
        assert_eq!(grid.population(), 64);
    }

    #[test]
    fn test_extract_region_clamps_bounds() {
        let grid = Grid::empty(4, 4, 4).unwrap();

        let mut buffer = vec![0u8; 8 * 8 * 8];
        let written = extract_region(&grid, &mut buffer, Region::new((-2, -2, -2), (10, 10, 10)));
        assert_eq!(written, 64);
    }

    #[test]
    fn test_extract_region_empty_or_short() {
        let grid = Grid::empty(4, 4, 4).unwrap();
        let mut buffer = vec![0u8; 64];

        // Inverted region
        assert_eq!(extract_region(&grid, &mut buffer, Region::new((3, 0, 0), (1, 4, 4))), 0);
        // Buffer too small
        let mut short = vec![0u8; 10];
        assert_eq!(extract_region(&grid, &mut short, Region::of(&grid)), 0);
    }

    #[test]
    fn test_volume_of_extreme_boxes() {
        assert_eq!(Region::new((1, 1, 1), (3, 4, 5)).volume(), 24);
        assert_eq!(Region::new((3, 0, 0), (1, 4, 4)).volume(), 0);
        assert_eq!(
            Region::new((i32::MIN, 0, 0), (i32::MAX, 1, 1)).volume(),
            u32::MAX as usize
        );
        // Overflows u64: reported as empty
        assert_eq!(
            Region::new((i32::MIN, i32::MIN, i32::MIN), (i32::MAX, i32::MAX, i32::MAX)).volume(),
            0
        );

        let grid = Grid::empty(4, 4, 4).unwrap();
        let clamped = Region::new((i32::MIN, 0, 0), (i32::MAX, 4, 4)).clamp_to(&grid);
        assert_eq!(clamped, Some(Region::of(&grid)));
    }

    #[test]
    fn test_extract_dying() {
        let mut grid = Grid::empty(3, 3, 3).unwrap();
        grid.set(0, 0, 0, 1.0);
        grid.advance_generation();

        let mut buffer = vec![0u8; 27];
        assert_eq!(extract_dying(&grid, &mut buffer, Region::of(&grid)), 27);
        assert_eq!(buffer[0], 1);
        assert!(buffer[1..].iter().all(|&d| d == 0));
    }

    #[test]
    fn test_import_region() {
        let mut grid = Grid::empty(6, 6, 6).unwrap();
        grid.set_dying(1, 1, 1, true);

        let input = [3u8, 200, 0, 10, 7, 1, 0, 0];
        let read = import_region(&mut grid, &input, Region::new((1, 1, 1), (3, 3, 3)));

        assert_eq!(read, 8);
        assert_eq!(grid.level(1, 1, 1), 3);
        assert!(!grid.is_dying(1, 1, 1));
        assert_eq!(grid.level(2, 1, 1), FULL_HEALTH); // clamped
        assert_eq!(grid.level(1, 2, 1), 0);
        assert_eq!(grid.level(2, 2, 1), 10);
        assert_eq!(grid.level(1, 1, 2), 7);
        assert_eq!(grid.population(), 5);
    }
}
