//! FFI interface for incremental, time-budgeted stepping.

use std::time::Duration;

use tracing::warn;

use crate::automaton::incremental::StepController;
use crate::state::Grid;

/// Create a StepController around a seeded grid with `num_threads` workers.
/// Returns a pointer to the allocated StepController, or NULL on invalid
/// dimensions or if the worker pool cannot be built.
#[no_mangle]
pub extern "C" fn vl_create_step_controller(
    width: i32,
    height: i32,
    depth: i32,
    seed: u64,
    num_threads: u8,
) -> *mut StepController {
    let ctrl = Grid::with_seed(width, height, depth, seed)
        .and_then(|grid| StepController::new(grid, num_threads as usize));

    match ctrl {
        Ok(ctrl) => Box::into_raw(Box::new(ctrl)),
        Err(e) => {
            warn!(error = %e, "vl_create_step_controller rejected");
            std::ptr::null_mut()
        }
    }
}

/// Destroy a StepController and free its memory.
/// Safe to call with null pointer (no-op).
///
/// # Safety
/// - `ctrl` must be a pointer returned by `vl_create_step_controller()`, or null
/// - `ctrl` must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn vl_destroy_step_controller(ctrl: *mut StepController) {
    if !ctrl.is_null() {
        drop(Box::from_raw(ctrl));
    }
}

/// Set a cell's health in the published grid.
/// Ignored while a step is active (prevent mid-step mutation).
///
/// # Safety
/// - `ctrl` must be a valid pointer to a StepController, or null
#[no_mangle]
pub unsafe extern "C" fn vl_sc_set(ctrl: *mut StepController, x: i32, y: i32, z: i32, value: f32) {
    if ctrl.is_null() {
        return;
    }

    if let Some(grid) = (*ctrl).grid_mut() {
        grid.set(x, y, z, value);
    }
}

/// Get a cell's health from the published generation.
/// Returns 0.0 for a null pointer.
///
/// # Safety
/// - `ctrl` must be a valid pointer to a StepController, or null
#[no_mangle]
pub unsafe extern "C" fn vl_sc_get(ctrl: *const StepController, x: i32, y: i32, z: i32) -> f32 {
    if ctrl.is_null() {
        return 0.0;
    }
    (*ctrl).grid().get(x, y, z)
}

/// Get a cell's fade direction from the published generation.
///
/// # Safety
/// - `ctrl` must be a valid pointer to a StepController, or null
#[no_mangle]
pub unsafe extern "C" fn vl_sc_is_dying(ctrl: *const StepController, x: i32, y: i32, z: i32) -> u8 {
    if ctrl.is_null() {
        return 0;
    }
    (*ctrl).grid().is_dying(x, y, z) as u8
}

/// Get the published generation number.
///
/// # Safety
/// - `ctrl` must be a valid pointer to a StepController, or null
#[no_mangle]
pub unsafe extern "C" fn vl_sc_get_generation(ctrl: *const StepController) -> u64 {
    if ctrl.is_null() {
        return 0;
    }
    (*ctrl).grid().generation()
}

/// Begin a new incremental step.
/// Returns 0 on success, 1 if a step is already in progress, -1 for null.
///
/// # Safety
/// - `ctrl` must be a valid pointer to a StepController, or null
#[no_mangle]
pub unsafe extern "C" fn vl_sc_begin_step(ctrl: *mut StepController) -> i32 {
    if ctrl.is_null() {
        return -1;
    }

    match (*ctrl).begin_step() {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Do bounded work within the given time budget (microseconds).
/// Returns 1 if the step completed during this tick, 0 if more work remains,
/// -1 if no step is active.
///
/// # Safety
/// - `ctrl` must be a valid pointer to a StepController, or null
#[no_mangle]
pub unsafe extern "C" fn vl_sc_tick(ctrl: *mut StepController, budget_us: u64) -> i32 {
    if ctrl.is_null() {
        return -1;
    }

    let ctrl = &mut *ctrl;
    if !ctrl.is_stepping() {
        return -1;
    }
    if ctrl.tick(Duration::from_micros(budget_us)) {
        1
    } else {
        0
    }
}

/// Query whether a step is currently in progress.
/// Returns 1 if stepping, 0 if idle, -1 if null pointer.
///
/// # Safety
/// - `ctrl` must be a valid pointer to a StepController, or null
#[no_mangle]
pub unsafe extern "C" fn vl_sc_is_stepping(ctrl: *const StepController) -> i32 {
    if ctrl.is_null() {
        return -1;
    }
    (*ctrl).is_stepping() as i32
}

/// Blocking full step: finishes the active step, or runs a whole new one.
///
/// # Safety
/// - `ctrl` must be a valid pointer to a StepController, or null
#[no_mangle]
pub unsafe extern "C" fn vl_sc_step_blocking(ctrl: *mut StepController) {
    if ctrl.is_null() {
        return;
    }
    (*ctrl).step_blocking();
}
