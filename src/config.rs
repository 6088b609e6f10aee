//! Configuration types for a simulation host.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Simulation parameters supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cells along x
    pub width: i32,
    /// Cells along y
    pub height: i32,
    /// Cells along z
    pub depth: i32,
    /// Seed for the initial fill; random when absent
    pub seed: Option<u64>,
    /// Wall-clock time between generations
    pub tick_interval_ms: u64,
    /// Most generations a single `update` may advance to catch up
    pub max_catch_up: u32,
    /// Worker threads for incremental stepping
    pub step_threads: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            depth: 32,
            seed: None,
            tick_interval_ms: 200,
            max_catch_up: 5,
            step_threads: 1,
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the values a grid and scheduler can run with.
    pub fn validate(&self) -> Result<()> {
        for (axis, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
        ] {
            if value < 1 {
                return Err(GridError::InvalidDimension { axis, value });
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(GridError::Config("tick_interval_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!((config.width, config.height, config.depth), (32, 32, 32));
        assert_eq!(config.tick_interval(), Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json(r#"{ "width": 10, "seed": 42 }"#).unwrap();
        assert_eq!(config.width, 10);
        assert_eq!(config.height, 32);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_catch_up, 5);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimulationConfig {
            width: 7,
            height: 8,
            depth: 9,
            seed: Some(3),
            tick_interval_ms: 50,
            max_catch_up: 2,
            step_threads: 4,
        };
        let json = config.to_json().unwrap();
        assert_eq!(SimulationConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            SimulationConfig::from_json(r#"{ "depth": 0 }"#),
            Err(GridError::InvalidDimension { axis: "depth", value: 0 })
        ));
        assert!(matches!(
            SimulationConfig::from_json(r#"{ "tick_interval_ms": 0 }"#),
            Err(GridError::Config(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json("not json"),
            Err(GridError::Config(_))
        ));
    }
}
