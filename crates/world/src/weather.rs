//! Deterministic weather for the vegetation simulation.
//!
//! Weather rolls happen at fixed intervals from a stream derived from the
//! world seed and the tick, so two worlds with the same seed share the same
//! weather history regardless of what the plants do.

use crate::chunk::{Chunk, ATTRIBUTE_MAX};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use wildgrove_core::{scoped_rng, Seed, SimTick};

/// Ticks between weather rolls.
pub const WEATHER_ROLL_INTERVAL: u64 = 60;

/// Weather state affecting moisture, wind and light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherState {
    #[default]
    Clear,
    Rain,
    Storm,
    Drought,
}

impl WeatherState {
    const ALL: [WeatherState; 4] = [
        WeatherState::Clear,
        WeatherState::Rain,
        WeatherState::Storm,
        WeatherState::Drought,
    ];

    /// Relative odds of moving to each state in `ALL` order.
    fn transition_weights(self) -> [f64; 4] {
        match self {
            WeatherState::Clear => [60.0, 25.0, 5.0, 10.0],
            WeatherState::Rain => [40.0, 40.0, 15.0, 5.0],
            WeatherState::Storm => [30.0, 50.0, 20.0, 0.0],
            WeatherState::Drought => [45.0, 10.0, 0.0, 45.0],
        }
    }

    /// Moisture added to each chunk per tick.
    pub fn moisture_delta(self) -> f64 {
        match self {
            WeatherState::Clear => -0.05,
            WeatherState::Rain => 0.4,
            WeatherState::Storm => 0.8,
            WeatherState::Drought => -0.3,
        }
    }

    /// Wind level the chunks drift toward.
    pub fn wind_target(self) -> f64 {
        match self {
            WeatherState::Clear => 10.0,
            WeatherState::Rain => 25.0,
            WeatherState::Storm => 80.0,
            WeatherState::Drought => 15.0,
        }
    }

    /// Share of daylight reaching the ground.
    pub fn light_modifier(self) -> f64 {
        match self {
            WeatherState::Clear | WeatherState::Drought => 1.0,
            WeatherState::Rain => 0.8,
            WeatherState::Storm => 0.6,
        }
    }
}

impl fmt::Display for WeatherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeatherState::Clear => "clear",
            WeatherState::Rain => "rainy",
            WeatherState::Storm => "stormy",
            WeatherState::Drought => "dry",
        };
        f.write_str(name)
    }
}

/// Event emitted when weather changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherChanged {
    pub from: WeatherState,
    pub to: WeatherState,
}

/// World weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Weather {
    pub state: WeatherState,
}

impl Weather {
    pub fn new(state: WeatherState) -> Self {
        Self { state }
    }

    /// Roll for a transition on interval ticks. Returns the change, if any.
    pub fn step(&mut self, world_seed: Seed, tick: SimTick) -> Option<WeatherChanged> {
        if tick.0 == 0 || tick.0 % WEATHER_ROLL_INTERVAL != 0 {
            return None;
        }
        let mut rng = scoped_rng(world_seed, "weather", tick);
        let weights = self.state.transition_weights();
        let next = match rng.pick_weighted(&WeatherState::ALL, &weights) {
            Ok(state) => *state,
            Err(err) => {
                warn!(state = %self.state, %err, "invalid weather transition weights");
                self.state
            }
        };
        if next == self.state {
            return None;
        }
        let change = WeatherChanged {
            from: self.state,
            to: next,
        };
        self.state = next;
        Some(change)
    }

    /// Nudge a chunk's moisture and wind toward the current weather.
    pub fn apply_to_chunk(&self, chunk: &mut Chunk) {
        chunk.moisture = (chunk.moisture + self.state.moisture_delta()).clamp(0.0, ATTRIBUTE_MAX);
        let target = self.state.wind_target();
        chunk.wind_level = (chunk.wind_level + (target - chunk.wind_level) * 0.1).clamp(0.0, ATTRIBUTE_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildgrove_core::weighted_random;

    #[test]
    fn every_state_has_usable_transition_weights() {
        for state in WeatherState::ALL {
            let weights = state.transition_weights();
            assert!(
                weighted_random(Seed::new(9), &WeatherState::ALL, &weights).is_ok(),
                "{state} weights rejected"
            );
        }
    }

    #[test]
    fn weather_only_rolls_on_interval() {
        let mut weather = Weather::default();
        for t in 1..WEATHER_ROLL_INTERVAL {
            assert_eq!(weather.step(Seed::new(1), SimTick(t)), None);
        }
        assert_eq!(weather.state, WeatherState::Clear);
    }

    #[test]
    fn weather_history_is_reproducible() {
        let history = |seed: u64| {
            let mut weather = Weather::default();
            (1..=100)
                .map(|i| {
                    weather.step(Seed::new(seed), SimTick(i * WEATHER_ROLL_INTERVAL));
                    weather.state
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(history(42), history(42));
        assert!(history(42).iter().any(|s| *s != WeatherState::Clear));
    }

    #[test]
    fn rain_wets_and_drought_dries() {
        let mut chunk = Chunk::new(0, 0);
        Weather::new(WeatherState::Rain).apply_to_chunk(&mut chunk);
        assert!(chunk.moisture > 50.0);

        let mut chunk = Chunk::new(0, 0);
        Weather::new(WeatherState::Drought).apply_to_chunk(&mut chunk);
        assert!(chunk.moisture < 50.0);
    }

    #[test]
    fn storms_raise_wind() {
        let mut chunk = Chunk::new(0, 0);
        for _ in 0..50 {
            Weather::new(WeatherState::Storm).apply_to_chunk(&mut chunk);
        }
        assert!(chunk.wind_level > 60.0);
        assert!(chunk.wind_level <= 80.0);
    }
}
