//! Region extraction and import FFI functions.

use crate::automaton::{self, Region};
use crate::state::Grid;

/// The requested box clamped to the grid, with its cell count.
/// None if nothing of the box lies inside the grid.
fn clamped_region(
    grid: &Grid,
    min: (i32, i32, i32),
    max: (i32, i32, i32),
) -> Option<(Region, usize)> {
    let region = Region::new(min, max).clamp_to(grid)?;
    Some((region, region.volume()))
}

/// Extracts the health levels (0..=10) of a box of cells into a flat buffer.
///
/// # Layout
/// The box is clamped to the grid, then filled in z,y,x order (z changes
/// slowest, x changes fastest). This matches the layout expected by
/// `vl_import_region`.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Grid, or null
/// - `out_buf` must point to a buffer with at least as many bytes as the box
///   has cells once clamped to the grid
///
/// # Returns
/// Number of cells written, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn vl_extract_region(
    ptr: *const Grid,
    out_buf: *mut u8,
    min_x: i32,
    min_y: i32,
    min_z: i32,
    max_x: i32,
    max_y: i32,
    max_z: i32,
) -> u64 {
    if ptr.is_null() || out_buf.is_null() {
        return 0;
    }

    let grid = &*ptr;
    let Some((region, len)) = clamped_region(grid, (min_x, min_y, min_z), (max_x, max_y, max_z))
    else {
        return 0;
    };
    let buf_slice = std::slice::from_raw_parts_mut(out_buf, len);
    automaton::extract_region(grid, buf_slice, region) as u64
}

/// Extracts the fade-out flags (1 = dying) of a box of cells into a flat buffer.
///
/// # Safety
/// Same requirements as `vl_extract_region`.
///
/// # Returns
/// Number of cells written, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn vl_extract_dying(
    ptr: *const Grid,
    out_buf: *mut u8,
    min_x: i32,
    min_y: i32,
    min_z: i32,
    max_x: i32,
    max_y: i32,
    max_z: i32,
) -> u64 {
    if ptr.is_null() || out_buf.is_null() {
        return 0;
    }

    let grid = &*ptr;
    let Some((region, len)) = clamped_region(grid, (min_x, min_y, min_z), (max_x, max_y, max_z))
    else {
        return 0;
    };
    let buf_slice = std::slice::from_raw_parts_mut(out_buf, len);
    automaton::extract_dying(grid, buf_slice, region) as u64
}

/// Imports health levels for a box of cells from a flat buffer.
///
/// # Layout
/// The buffer is expected to be in z,y,x order (matching `vl_extract_region`).
/// Levels above 10 are clamped to 10 (fully alive).
///
/// # Safety
/// - `ptr` must be a valid pointer to a Grid, or null
/// - `in_buf` must point to a buffer with at least as many bytes as the box
///   has cells once clamped to the grid
///
/// # Returns
/// Number of cells read, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn vl_import_region(
    ptr: *mut Grid,
    in_buf: *const u8,
    min_x: i32,
    min_y: i32,
    min_z: i32,
    max_x: i32,
    max_y: i32,
    max_z: i32,
) -> u64 {
    if ptr.is_null() || in_buf.is_null() {
        return 0;
    }

    let grid = &mut *ptr;
    let Some((region, len)) = clamped_region(grid, (min_x, min_y, min_z), (max_x, max_y, max_z))
    else {
        return 0;
    };
    let buf_slice = std::slice::from_raw_parts(in_buf, len);
    automaton::import_region(grid, buf_slice, region) as u64
}
