//! Cell access, neighbor queries, and stepping.

use crate::state::Grid;

/// Gets the health of a cell in `[0, 1]`. Coordinates wrap around the torus.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Grid, or null
///
/// # Returns
/// The cell's health, or 0.0 for a null pointer.
#[no_mangle]
pub unsafe extern "C" fn vl_get(ptr: *const Grid, x: i32, y: i32, z: i32) -> f32 {
    if ptr.is_null() {
        return 0.0;
    }
    (*ptr).get(x, y, z)
}

/// Gets the fade direction of a cell (1 = fading out, 0 = fading in).
///
/// # Safety
/// - `ptr` must be a valid pointer to a Grid, or null
///
/// # Returns
/// 0 for a null pointer.
#[no_mangle]
pub unsafe extern "C" fn vl_is_dying(ptr: *const Grid, x: i32, y: i32, z: i32) -> u8 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).is_dying(x, y, z) as u8
}

/// Sets the health of a cell. Values are clamped to `[0, 1]` and rounded to
/// the nearest tenth.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Grid, or null
#[no_mangle]
pub unsafe extern "C" fn vl_set(ptr: *mut Grid, x: i32, y: i32, z: i32, value: f32) {
    if ptr.is_null() {
        return;
    }
    (*ptr).set(x, y, z, value);
}

/// Counts the living neighbors of a cell in the current generation.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Grid, or null
///
/// # Returns
/// 0 for a null pointer.
#[no_mangle]
pub unsafe extern "C" fn vl_count_living_neighbors(
    ptr: *const Grid,
    x: i32,
    y: i32,
    z: i32,
) -> u8 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).count_living_neighbors(x, y, z)
}

/// Advances the automaton by one generation.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Grid, or null
///
/// Birth on exactly 6 living neighbors, survival on 5 to 7, with
/// one-tenth fades in and out.
#[no_mangle]
pub unsafe extern "C" fn vl_advance(ptr: *mut Grid) {
    if ptr.is_null() {
        return;
    }
    (*ptr).advance_generation();
}
