//! Fixed 3D life rules with animated birth and death.
//!
//! Health is quantised into levels `0..=FULL_HEALTH`, one level per tenth:
//! - Dead (level 0): born with exactly 6 living neighbors, entering at 0.1 and fading in
//! - Alive (level 10): survives with 5, 6 or 7 living neighbors, otherwise starts fading out at 0.9
//! - Transitional (1..=9): moves one level per generation in its fade direction, ignoring neighbors

use std::ops::RangeInclusive;

/// Level of a fully alive cell. Health is `level / FULL_HEALTH`.
pub const FULL_HEALTH: u8 = 10;

/// Living neighbors needed for a dead cell to be born.
pub const BIRTH_NEIGHBORS: u8 = 6;

/// Living neighbor counts that keep a fully alive cell alive.
pub const SURVIVAL_NEIGHBORS: RangeInclusive<u8> = 5..=7;

/// Probability that a cell starts alive in a randomly filled grid.
pub const INITIAL_DENSITY: f64 = 0.3;

/// Compute a cell's next `(level, dying)` from its current level, its fade
/// direction and the number of living neighbors in the current generation.
#[inline]
pub fn next_state(level: u8, dying: bool, living: u8) -> (u8, bool) {
    if level == 0 {
        if living == BIRTH_NEIGHBORS {
            (1, false)
        } else {
            (0, dying)
        }
    } else if level >= FULL_HEALTH {
        if SURVIVAL_NEIGHBORS.contains(&living) {
            (FULL_HEALTH, dying)
        } else {
            (FULL_HEALTH - 1, true)
        }
    } else if dying {
        (level - 1, true)
    } else {
        (level + 1, false)
    }
}

/// Convert a stored level to the public health value in `[0, 1]`.
#[inline]
pub fn level_to_health(level: u8) -> f32 {
    level as f32 / FULL_HEALTH as f32
}

/// Convert a health value to the nearest level, clamped to `0..=FULL_HEALTH`.
/// Non-finite input maps to 0.
#[inline]
pub fn health_to_level(health: f32) -> u8 {
    if !health.is_finite() {
        return 0;
    }
    (health * FULL_HEALTH as f32)
        .round()
        .clamp(0.0, FULL_HEALTH as f32) as u8
}
