//! Core automaton logic and grid operations.
//!
//! This module contains the actual logic for counting neighbors, applying
//! the rules, stepping generations and copying regions in and out.
//! The FFI layer in `ffi/` calls these functions.

pub mod grid;
pub mod incremental;
pub mod region;
pub mod rules;
pub mod stepping;

pub use grid::{count_living_neighbors, index_of, neighbors, wrap, Coord, NEIGHBOR_OFFSETS};
pub use incremental::StepController;
pub use region::{extract_dying, extract_region, import_region, Region};
pub use rules::{next_state, BIRTH_NEIGHBORS, FULL_HEALTH, INITIAL_DENSITY, SURVIVAL_NEIGHBORS};
pub use stepping::advance_generation;
