//! Deterministic simulation clock.
//!
//! Tracks ticks, the day/night cycle and the season. All time advancement is
//! tick-based so replays stay deterministic.

use crate::environment::Season;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use wildgrove_core::SimTick;

/// Minimum daylight at midnight, as a share of full daylight.
const NIGHT_LIGHT: f64 = 0.2;

/// Simulation time state tracking days and seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimClock {
    /// Current simulation tick.
    pub tick: SimTick,
    /// Ticks per in-game day.
    pub ticks_per_day: u64,
    /// Days per season.
    pub days_per_season: u64,
}

impl SimClock {
    pub fn new(ticks_per_day: u64, days_per_season: u64) -> Self {
        Self {
            tick: SimTick::ZERO,
            ticks_per_day: ticks_per_day.max(1),
            days_per_season: days_per_season.max(1),
        }
    }

    /// Advance time by one tick.
    pub fn advance(&mut self) {
        self.tick = self.tick.advance(1);
    }

    /// Zero-based day counter.
    pub fn day(&self) -> u64 {
        self.tick.0 / self.ticks_per_day
    }

    /// Current time of day as a fraction (0.0 = midnight, 0.5 = noon).
    pub fn time_of_day(&self) -> f64 {
        let tick_in_day = self.tick.0 % self.ticks_per_day;
        tick_in_day as f64 / self.ticks_per_day as f64
    }

    pub fn season(&self) -> Season {
        Season::from_index(self.day() / self.days_per_season)
    }

    /// Daylight on a 0-100 scale, peaking at noon and bottoming out at midnight.
    pub fn daylight_level(&self) -> f64 {
        // -1 at midnight, 0 at sunrise/sunset, 1 at noon.
        let sun = ((self.time_of_day() - 0.25) * 2.0 * PI).sin();
        let normalized = (sun + 1.0) / 2.0;
        100.0 * (NIGHT_LIGHT + (1.0 - NIGHT_LIGHT) * normalized)
    }
}

impl Default for SimClock {
    /// 240 ticks per day, seven days per season.
    fn default() -> Self {
        Self::new(240, 7)
    }
}
