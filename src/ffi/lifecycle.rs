//! Grid creation, destruction, and generation queries.

use tracing::warn;

use crate::state::Grid;
use crate::telemetry;

/// Creates a randomly filled grid and returns an opaque pointer.
///
/// # Returns
/// A pointer to a new Grid, or null if any dimension is below 1 or the
/// volume is too large.
///
/// # Safety
/// The returned pointer must eventually be freed with `vl_destroy()`.
#[no_mangle]
pub extern "C" fn vl_create(width: i32, height: i32, depth: i32) -> *mut Grid {
    match Grid::new(width, height, depth) {
        Ok(grid) => Box::into_raw(Box::new(grid)),
        Err(e) => {
            warn!(error = %e, "vl_create rejected");
            std::ptr::null_mut()
        }
    }
}

/// Creates a grid whose random fill is determined by `seed`.
///
/// Same return value and ownership rules as `vl_create()`.
#[no_mangle]
pub extern "C" fn vl_create_seeded(width: i32, height: i32, depth: i32, seed: u64) -> *mut Grid {
    match Grid::with_seed(width, height, depth, seed) {
        Ok(grid) => Box::into_raw(Box::new(grid)),
        Err(e) => {
            warn!(error = %e, "vl_create_seeded rejected");
            std::ptr::null_mut()
        }
    }
}

/// Destroys a grid and frees its memory.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `vl_create()`, or null
/// - `ptr` must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn vl_destroy(ptr: *mut Grid) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

/// Gets the current generation counter from a grid.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Grid, or null
///
/// # Returns
/// The generation counter, or 0 if ptr is null.
#[no_mangle]
pub unsafe extern "C" fn vl_get_generation(ptr: *const Grid) -> u64 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).generation()
}

/// Writes the grid dimensions into the three output pointers.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Grid, or null
/// - each output pointer must be valid for a write of one `i32`, or null
///
/// # Returns
/// 0 on success, 1 if any pointer is null.
#[no_mangle]
pub unsafe extern "C" fn vl_get_dimensions(
    ptr: *const Grid,
    width: *mut i32,
    height: *mut i32,
    depth: *mut i32,
) -> i32 {
    if ptr.is_null() || width.is_null() || height.is_null() || depth.is_null() {
        return 1;
    }

    let grid = &*ptr;
    *width = grid.width();
    *height = grid.height();
    *depth = grid.depth();
    0
}

/// Installs a `tracing` subscriber filtered by `RUST_LOG`.
///
/// # Returns
/// 1 if installed, 0 if a subscriber was already present.
#[no_mangle]
pub extern "C" fn vl_init_logging() -> i32 {
    telemetry::init_logging() as i32
}
