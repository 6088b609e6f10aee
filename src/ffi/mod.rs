//! C FFI layer for embedding hosts.
//!
//! All functions are marked with `#[no_mangle]` and use `extern "C"`.
//! Handles are opaque pointers; every function tolerates null.
//!
//! The actual logic is in the `automaton` module. These functions are thin wrappers
//! that handle null checks, pointer safety, and C-to-Rust conversions.

pub mod grid;
pub mod incremental;
pub mod lifecycle;
pub mod region;

pub use grid::{vl_advance, vl_count_living_neighbors, vl_get, vl_is_dying, vl_set};
pub use incremental::{
    vl_create_step_controller, vl_destroy_step_controller, vl_sc_begin_step, vl_sc_get,
    vl_sc_get_generation, vl_sc_is_dying, vl_sc_is_stepping, vl_sc_set, vl_sc_step_blocking,
    vl_sc_tick,
};
pub use lifecycle::{
    vl_create, vl_create_seeded, vl_destroy, vl_get_dimensions, vl_get_generation,
    vl_init_logging,
};
pub use region::{vl_extract_dying, vl_extract_region, vl_import_region};
