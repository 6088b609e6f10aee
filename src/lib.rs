//! Voxel Life - 3D toroidal Game of Life with fading health
//!
//! Cells live on a `width x height x depth` grid that wraps on every axis.
//! Each cell carries a health level that fades in on birth and fades out on
//! death, one tenth per generation. Generations are double buffered so a
//! reader only ever sees a complete generation.
//!
//! The library can be used from Rust directly ([`Grid`], [`Simulation`],
//! [`SharedGrid`], [`StepController`]) or through the C ABI in [`ffi`].

pub mod automaton;
pub mod config;
pub mod error;
pub mod ffi;
pub mod simulation;
pub mod state;
pub mod telemetry;


pub use automaton::{next_state, wrap, Region, StepController};
pub use config::SimulationConfig;
pub use error::{GridError, Result};
pub use simulation::{SharedGrid, Simulation, TickerHandle};
pub use state::Grid;
