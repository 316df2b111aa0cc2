//! Seasons and world-level environmental bias.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Season of the simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// All seasons in calendar order.
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
    ];

    /// Season for a zero-based season counter (wraps every four).
    pub fn from_index(index: u64) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    /// Scales how fast plants mature.
    pub fn growth_multiplier(self) -> f64 {
        match self {
            Season::Spring => 1.25,
            Season::Summer => 1.0,
            Season::Autumn => 0.7,
            Season::Winter => 0.3,
        }
    }

    /// Scales environmental suitability.
    pub fn suitability_factor(self) -> f64 {
        match self {
            Season::Spring | Season::Summer => 1.0,
            Season::Autumn => 0.85,
            Season::Winter => 0.6,
        }
    }

    /// Offset applied to chunk temperatures, in degrees Celsius.
    pub fn temperature_shift(self) -> f64 {
        match self {
            Season::Spring => 0.0,
            Season::Summer => 6.0,
            Season::Autumn => -2.0,
            Season::Winter => -10.0,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        };
        f.write_str(name)
    }
}

/// World-wide bias applied on top of every chunk (e.g. an arid or lush world).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldProfile {
    /// Added to chunk moisture before suitability is assessed.
    pub moisture_offset: f64,
    /// Added to chunk temperature before suitability is assessed.
    pub temperature_offset: f64,
    /// Multiplies plant growth.
    pub growth_multiplier: f64,
}

impl Default for WorldProfile {
    fn default() -> Self {
        Self {
            moisture_offset: 0.0,
            temperature_offset: 0.0,
            growth_multiplier: 1.0,
        }
    }
}
