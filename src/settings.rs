//! Harness settings
//!
//! Read from an optional JSON file. Missing fields take their defaults, and
//! an unreadable or malformed file falls back to defaults entirely.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::TICK_MS;

/// Settings for the headless harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    /// World RNG seed
    pub seed: u64,
    /// Ticks to run before printing the summary
    pub ticks: u64,
    /// Drive ticks from a wall-clock timer instead of back to back
    pub realtime: bool,
    /// Timer period in realtime mode
    pub tick_ms: u64,

    // === Autopilot ===
    /// Chance per tick that the fire button is down
    pub fire_chance: f64,
    /// Chance per tick that a turn button is down
    pub turn_chance: f64,
    /// Chance per tick that thrust is down
    pub thrust_chance: f64,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            ticks: 1200,
            realtime: false,
            tick_ms: TICK_MS,

            fire_chance: 0.5,
            turn_chance: 0.3,
            thrust_chance: 0.2,
        }
    }
}

impl HarnessSettings {
    /// Load from `path`, or defaults when there is no path or it can't be used
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Can't read {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Bad settings in {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::clamped)
    }

    /// Probabilities into 0..=1, period at least 1 ms
    fn clamped(mut self) -> Self {
        for chance in [
            &mut self.fire_chance,
            &mut self.turn_chance,
            &mut self.thrust_chance,
        ] {
            *chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
        }
        self.tick_ms = self.tick_ms.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = HarnessSettings::from_json(r#"{ "seed": 7, "ticks": 10 }"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.ticks, 10);
        assert_eq!(settings.tick_ms, TICK_MS);
        assert_eq!(settings.fire_chance, HarnessSettings::default().fire_chance);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let json = r#"{ "fire_chance": 3.0, "thrust_chance": -1, "tick_ms": 0 }"#;
        let settings = HarnessSettings::from_json(json).unwrap();
        assert_eq!(settings.fire_chance, 1.0);
        assert_eq!(settings.thrust_chance, 0.0);
        assert_eq!(settings.tick_ms, 1);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(HarnessSettings::from_json("{ seed: ").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = HarnessSettings::load(Some(Path::new("/nonexistent/vector-rocks.json")));
        assert_eq!(settings, HarnessSettings::default());
        assert_eq!(HarnessSettings::load(None), HarnessSettings::default());
    }
}
